//! Cost estimator page
//!
//! Combines the tuition range of one institution with the user's
//! scholarship, living cost and duration inputs into a cost projection.

use sdk::errors::AppError;
use sdk::host::HostHandle;
use sdk::payload::HostPayload;
use sdk::types::{Institution, InstitutionId, NOT_AVAILABLE};
use std::sync::Arc;
use tracing::{debug, info};

use super::{render_notice, track_notice, PageController};
use crate::config::EstimatorConfig;
use crate::dataset::Dataset;
use crate::markup::{escape_html, format_money, labels, option};

/// User actions on the estimator page
#[derive(Debug, Clone, PartialEq)]
pub enum EstimatorCommand {
    /// Institution selector; `None` is the placeholder option
    SelectInstitution(Option<InstitutionId>),
    /// Category selector as `(faculty group, option)`; `None` is the placeholder
    SelectCategory(Option<(usize, usize)>),
    SetScholarship(u8),
    SetMonthlyLiving(u32),
    SetYears(u8),
    Compute,
    Share,
}

/// Majors of one faculty, shown as an option group
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryGroup {
    pub faculty: String,
    pub options: Vec<String>,
}

/// Cost projection for one year and for the whole program
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    pub yearly_tuition: f64,
    pub yearly_living: f64,
    pub yearly_total: f64,
    pub total_program_cost: f64,
}

/// Projection figures rounded to whole currency units
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundedProjection {
    pub yearly_tuition: i64,
    pub yearly_living: i64,
    pub yearly_total: i64,
    pub total_program_cost: i64,
}

impl Projection {
    /// Compute a projection from an average yearly tuition
    pub fn compute(
        average_tuition: f64,
        scholarship_percent: u8,
        monthly_living: u32,
        years: u8,
    ) -> Self {
        let scholarship = f64::from(scholarship_percent.min(100)) / 100.0;
        let yearly_tuition = average_tuition * (1.0 - scholarship);
        let yearly_living = f64::from(monthly_living) * 12.0;
        let yearly_total = yearly_tuition + yearly_living;

        Self {
            yearly_tuition,
            yearly_living,
            yearly_total,
            total_program_cost: yearly_total * f64::from(years),
        }
    }

    pub fn rounded(&self) -> RoundedProjection {
        RoundedProjection {
            yearly_tuition: self.yearly_tuition.round() as i64,
            yearly_living: self.yearly_living.round() as i64,
            yearly_total: self.yearly_total.round() as i64,
            total_program_cost: self.total_program_cost.round() as i64,
        }
    }
}

/// Estimator page state
pub struct EstimatorPage {
    dataset: Arc<Dataset>,
    host: HostHandle,
    selected: Option<InstitutionId>,
    categories: Vec<CategoryGroup>,
    category: Option<(usize, usize)>,
    scholarship_percent: u8,
    monthly_living: u32,
    years: u8,
    max_years: u8,
    projection: Option<Projection>,
    notice: Option<String>,
}

impl EstimatorPage {
    pub fn new(dataset: Arc<Dataset>, host: HostHandle, defaults: &EstimatorConfig) -> Self {
        let max_years = defaults.max_years.max(1);
        Self {
            dataset,
            host,
            selected: None,
            categories: Vec::new(),
            category: None,
            scholarship_percent: defaults.scholarship_percent.min(100),
            monthly_living: defaults.monthly_living,
            years: defaults.years.clamp(1, max_years),
            max_years,
            projection: None,
            notice: None,
        }
    }

    /// Select an institution and repopulate the category selector
    ///
    /// An absent or unknown id clears the selection and disables the
    /// category selector.
    pub fn select_institution(&mut self, id: Option<InstitutionId>) {
        self.categories.clear();
        self.category = None;

        let record = id.and_then(|id| self.dataset.get(id));
        match record {
            Some(record) => {
                self.selected = Some(record.id);
                self.categories = category_groups(record);
                debug!(
                    "Estimator institution {} with {} category groups",
                    record.id,
                    self.categories.len()
                );
            }
            None => {
                self.selected = None;
                debug!("Estimator institution cleared (requested {:?})", id);
            }
        }
    }

    pub fn selected_institution(&self) -> Option<&Institution> {
        self.selected.and_then(|id| self.dataset.get(id))
    }

    pub fn categories(&self) -> &[CategoryGroup] {
        &self.categories
    }

    /// Category selector is only usable once an institution is selected
    pub fn category_enabled(&self) -> bool {
        self.selected.is_some()
    }

    /// Label of the current category choice, "N/A" when nothing is chosen
    pub fn category_label(&self) -> &str {
        self.category
            .and_then(|(g, o)| self.categories.get(g)?.options.get(o))
            .map(String::as_str)
            .unwrap_or(NOT_AVAILABLE)
    }

    fn select_category(&mut self, choice: Option<(usize, usize)>) {
        self.category = choice.filter(|&(g, o)| {
            self.categories
                .get(g)
                .map(|group| o < group.options.len())
                .unwrap_or(false)
        });
    }

    pub fn set_scholarship(&mut self, percent: u8) {
        self.scholarship_percent = percent.min(100);
    }

    pub fn set_monthly_living(&mut self, amount: u32) {
        self.monthly_living = amount;
    }

    pub fn set_years(&mut self, years: u8) {
        self.years = years.clamp(1, self.max_years);
    }

    pub fn years(&self) -> u8 {
        self.years
    }

    /// Projection from the current inputs
    pub fn compute_projection(&mut self) -> Result<Projection, AppError> {
        let record = self
            .selected_institution()
            .ok_or(AppError::NoInstitutionSelected)?;
        let projection = Projection::compute(
            record.average_tuition(),
            self.scholarship_percent,
            self.monthly_living,
            self.years,
        );
        self.projection = Some(projection);
        Ok(projection)
    }

    /// Last displayed projection
    pub fn projection(&self) -> Option<&Projection> {
        self.projection.as_ref()
    }

    /// Emit the share payload with freshly computed figures
    pub fn share_result(&mut self) -> Result<HostPayload, AppError> {
        if self.selected.is_none() {
            return Err(AppError::NothingToShare);
        }
        let figures = self.compute_projection()?.rounded();
        let record = self
            .selected_institution()
            .ok_or(AppError::NothingToShare)?;

        let payload = HostPayload::ShareEstimate {
            institution_id: record.id,
            institution_name: record.display_name().to_string(),
            category_label: self.category_label().to_string(),
            yearly_cost: figures.yearly_total,
            total_cost: figures.total_program_cost,
            years: self.years,
        };
        self.host.send(&payload)?;
        info!("Shared estimate for institution {}", record.id);
        Ok(payload)
    }

    fn render_institution_select(&self) -> String {
        let mut html = option("", labels::PICK_INSTITUTION, self.selected.is_none());
        for record in self.dataset.records() {
            html.push_str(&option(
                &record.id.to_string(),
                record.display_name(),
                self.selected == Some(record.id),
            ));
        }
        format!(r#"<select id="university-select">{}</select>"#, html)
    }

    fn render_category_select(&self) -> String {
        if !self.category_enabled() {
            return format!(
                r#"<select id="major-select" disabled>{}</select>"#,
                option("", labels::PICK_INSTITUTION_FIRST, true)
            );
        }

        let mut html = option("", labels::PICK_CATEGORY, self.category.is_none());
        for (g, group) in self.categories.iter().enumerate() {
            html.push_str(&format!(
                r#"<optgroup label="{}">"#,
                escape_html(&group.faculty)
            ));
            for (o, label) in group.options.iter().enumerate() {
                html.push_str(&option(
                    &format!("{}:{}", g, o),
                    label,
                    self.category == Some((g, o)),
                ));
            }
            html.push_str("</optgroup>");
        }
        format!(r#"<select id="major-select">{}</select>"#, html)
    }

    fn render_inputs(&self) -> String {
        let years: String = (1..=self.max_years)
            .map(|y| option(&y.to_string(), &y.to_string(), y == self.years))
            .collect();
        format!(
            r#"<label>{}: <span id="scholarship-value">{}%</span></label><input type="range" id="scholarships" min="0" max="100" value="{}"><label>{}: <span id="living-value">${}</span></label><input type="range" id="living-expenses" value="{}"><label>{}</label><select id="years">{}</select><button id="calculate-btn">{}</button>"#,
            labels::SCHOLARSHIP,
            self.scholarship_percent,
            self.scholarship_percent,
            labels::LIVING_COST,
            self.monthly_living,
            self.monthly_living,
            labels::YEARS,
            years,
            labels::CALCULATE
        )
    }

    fn render_figures(&self) -> String {
        let cell = |id: &str, label: &str, value: Option<i64>| {
            format!(
                r#"<div class="result-row"><span>{}</span><strong id="{}">{}</strong></div>"#,
                label,
                id,
                value.map(format_money).unwrap_or_else(|| "$0".to_string())
            )
        };
        let figures = self.projection.map(|p| p.rounded());
        [
            cell("yearly-tuition", labels::YEARLY_TUITION, figures.map(|f| f.yearly_tuition)),
            cell("yearly-living", labels::YEARLY_LIVING, figures.map(|f| f.yearly_living)),
            cell("yearly-total", labels::YEARLY_TOTAL, figures.map(|f| f.yearly_total)),
            cell("total-cost", labels::PROGRAM_TOTAL, figures.map(|f| f.total_program_cost)),
        ]
        .concat()
    }
}

impl PageController for EstimatorPage {
    type Command = EstimatorCommand;

    fn apply(&mut self, command: EstimatorCommand) -> Result<(), AppError> {
        let result = match command {
            EstimatorCommand::SelectInstitution(id) => {
                self.select_institution(id);
                Ok(())
            }
            EstimatorCommand::SelectCategory(choice) => {
                self.select_category(choice);
                Ok(())
            }
            EstimatorCommand::SetScholarship(percent) => {
                self.set_scholarship(percent);
                Ok(())
            }
            EstimatorCommand::SetMonthlyLiving(amount) => {
                self.set_monthly_living(amount);
                Ok(())
            }
            EstimatorCommand::SetYears(years) => {
                self.set_years(years);
                Ok(())
            }
            EstimatorCommand::Compute => self.compute_projection().map(|_| ()),
            EstimatorCommand::Share => self.share_result().map(|_| ()),
        };
        track_notice(&mut self.notice, result)
    }

    fn render(&self) -> String {
        format!(
            r#"{}<div class="calculator-form">{}{}{}</div><div class="calculator-results">{}</div><button id="share-results" class="share-button">{}</button>"#,
            render_notice(self.notice()),
            self.render_institution_select(),
            self.render_category_select(),
            self.render_inputs(),
            self.render_figures(),
            labels::SHARE
        )
    }

    fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }
}

/// Option groups for a record: faculties without majors are left out
fn category_groups(record: &Institution) -> Vec<CategoryGroup> {
    record
        .faculties
        .iter()
        .filter(|f| !f.majors.is_empty())
        .map(|faculty| CategoryGroup {
            faculty: faculty.display_name().to_string(),
            options: faculty
                .majors
                .iter()
                .map(|m| m.display_name().to_string())
                .collect(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::MemoryHost;
    use sdk::types::{Faculty, Major, TuitionFees};

    fn major(name: &str) -> Major {
        Major {
            name_km: Some(name.to_string()),
            name_en: None,
            category_km: None,
        }
    }

    fn page() -> (EstimatorPage, Arc<MemoryHost>) {
        let mut itc = Institution::new(1, "វិទ្យាស្ថានបច្ចេកវិទ្យាកម្ពុជា", "ITC");
        itc.tuition_fees = Some(TuitionFees::new(2000.0, 4000.0));
        itc.faculties = vec![
            Faculty {
                name_km: Some("វិស្វកម្ម".to_string()),
                name_en: None,
                majors: vec![major("វិស្វកម្មស៊ីវិល"), major("វិស្វកម្មអគ្គិសនី")],
            },
            Faculty {
                name_km: Some("ទទេ".to_string()),
                name_en: None,
                majors: Vec::new(),
            },
        ];
        let dataset = Dataset::from_records(vec![itc, Institution::new(2, "", "No Fees")]);
        let host = MemoryHost::new();
        let page = EstimatorPage::new(
            Arc::new(dataset),
            host.handle(),
            &EstimatorConfig::default(),
        );
        (page, host)
    }

    #[test]
    fn test_worked_example() {
        let figures = Projection::compute(3000.0, 25, 300, 4).rounded();
        assert_eq!(
            figures,
            RoundedProjection {
                yearly_tuition: 2250,
                yearly_living: 3600,
                yearly_total: 5850,
                total_program_cost: 23400,
            }
        );
    }

    #[test]
    fn test_compute_without_institution_is_rejected() {
        let (mut page, _) = page();
        let result = page.apply(EstimatorCommand::Compute);
        assert!(matches!(result, Err(AppError::NoInstitutionSelected)));
        assert!(page.projection().is_none());
        assert_eq!(page.notice(), Some("សូមជ្រើសរើសសាកលវិទ្យាល័យ"));
    }

    #[test]
    fn test_category_groups_skip_empty_faculties() {
        let (mut page, _) = page();
        assert!(!page.category_enabled());

        page.apply(EstimatorCommand::SelectInstitution(Some(1))).unwrap();
        assert!(page.category_enabled());
        assert_eq!(page.categories().len(), 1);
        assert_eq!(page.categories()[0].options.len(), 2);
    }

    #[test]
    fn test_unknown_institution_clears_selection() {
        let (mut page, _) = page();
        page.select_institution(Some(1));
        page.apply(EstimatorCommand::SelectCategory(Some((0, 1)))).unwrap();
        assert_eq!(page.category_label(), "វិស្វកម្មអគ្គិសនី");

        page.select_institution(Some(99));
        assert!(page.selected_institution().is_none());
        assert!(!page.category_enabled());
        assert!(page.categories().is_empty());
        assert_eq!(page.category_label(), "N/A");
        assert!(page.render().contains(r#"<select id="major-select" disabled>"#));
    }

    #[test]
    fn test_out_of_range_category_is_ignored() {
        let (mut page, _) = page();
        page.select_institution(Some(1));
        page.apply(EstimatorCommand::SelectCategory(Some((3, 0)))).unwrap();
        assert_eq!(page.category_label(), "N/A");
    }

    #[test]
    fn test_inputs_are_clamped() {
        let (mut page, _) = page();
        page.apply(EstimatorCommand::SetYears(0)).unwrap();
        assert_eq!(page.years(), 1);
        page.apply(EstimatorCommand::SetYears(12)).unwrap();
        assert_eq!(page.years(), 7);

        page.select_institution(Some(1));
        page.apply(EstimatorCommand::SetScholarship(250)).unwrap();
        let projection = page.compute_projection().unwrap();
        assert_eq!(projection.yearly_tuition, 0.0);
    }

    #[test]
    fn test_missing_fees_count_as_zero() {
        let (mut page, _) = page();
        page.select_institution(Some(2));
        page.set_monthly_living(100);
        page.set_years(2);
        let figures = page.compute_projection().unwrap().rounded();
        assert_eq!(figures.yearly_tuition, 0);
        assert_eq!(figures.total_program_cost, 2400);
    }

    #[test]
    fn test_share_emits_rounded_figures() {
        let (mut page, host) = page();
        page.apply(EstimatorCommand::SelectInstitution(Some(1))).unwrap();
        page.apply(EstimatorCommand::SelectCategory(Some((0, 0)))).unwrap();
        page.apply(EstimatorCommand::SetScholarship(25)).unwrap();
        page.apply(EstimatorCommand::SetMonthlyLiving(300)).unwrap();
        page.apply(EstimatorCommand::SetYears(4)).unwrap();
        page.apply(EstimatorCommand::Share).unwrap();

        assert_eq!(
            host.payloads().unwrap(),
            vec![HostPayload::ShareEstimate {
                institution_id: 1,
                institution_name: "វិទ្យាស្ថានបច្ចេកវិទ្យាកម្ពុជា".to_string(),
                category_label: "វិស្វកម្មស៊ីវិល".to_string(),
                yearly_cost: 5850,
                total_cost: 23400,
                years: 4,
            }]
        );
        assert!(page.render().contains("$23,400"));
    }

    #[test]
    fn test_share_without_institution_is_rejected() {
        let (mut page, host) = page();
        let result = page.apply(EstimatorCommand::Share);
        assert!(matches!(result, Err(AppError::NothingToShare)));
        assert!(host.is_empty());
        assert_eq!(page.notice(), Some("សូមជ្រើសរើសសាកលវិទ្យាល័យ និងគណនាមុន"));
    }
}
