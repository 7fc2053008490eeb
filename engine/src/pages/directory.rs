//! Directory page
//!
//! Filterable grid of institutions with a detail overlay. The grid is
//! recomputed from the full dataset on every filter change; an empty result
//! renders the "no results" placeholder instead of an empty grid.

use sdk::errors::AppError;
use sdk::host::HostHandle;
use sdk::payload::HostPayload;
use sdk::types::{Institution, InstitutionId};
use std::sync::Arc;
use tracing::{debug, info};

use super::{render_notice, track_notice, PageController};
use crate::dataset::Dataset;
use crate::markup::{
    display_style, escape_html, format_amount, labels, option, text_or_na, value_or_na,
};

/// User actions on the directory page
#[derive(Debug, Clone, PartialEq)]
pub enum DirectoryCommand {
    /// Search box input
    Search(String),
    /// Location filter change; empty string means all locations
    FilterLocation(String),
    /// Card click
    Open(InstitutionId),
    /// Overlay close button
    CloseDetails,
    /// Overlay share button
    Share,
}

/// Directory page state
pub struct DirectoryPage {
    dataset: Arc<Dataset>,
    host: HostHandle,
    search: String,
    location: String,
    /// Indexes into the dataset, in dataset order
    filtered: Vec<usize>,
    /// Record shown in the overlay
    detail: Option<usize>,
    notice: Option<String>,
}

impl DirectoryPage {
    pub fn new(dataset: Arc<Dataset>, host: HostHandle) -> Self {
        let filtered = (0..dataset.len()).collect();
        Self {
            dataset,
            host,
            search: String::new(),
            location: String::new(),
            filtered,
            detail: None,
            notice: None,
        }
    }

    /// Recompute the filtered grid
    ///
    /// A record passes when either name contains `search_text`
    /// (case-insensitive) and its location equals `location_tag`; an empty
    /// `location_tag` passes every location.
    pub fn apply_filter(&mut self, search_text: &str, location_tag: &str) {
        self.search = search_text.to_string();
        self.location = location_tag.to_string();

        let needle = search_text.to_lowercase();
        self.filtered = self
            .dataset
            .records()
            .iter()
            .enumerate()
            .filter(|(_, record)| {
                record.name_contains(&needle)
                    && (location_tag.is_empty()
                        || record.location.as_deref() == Some(location_tag))
            })
            .map(|(index, _)| index)
            .collect();

        debug!(
            "Directory filter search={:?} location={:?}: {} of {}",
            search_text,
            location_tag,
            self.filtered.len(),
            self.dataset.len()
        );
    }

    /// Records currently in the grid
    pub fn filtered(&self) -> impl Iterator<Item = &Institution> {
        self.filtered.iter().map(|&i| &self.dataset.records()[i])
    }

    pub fn filtered_len(&self) -> usize {
        self.filtered.len()
    }

    /// Open the detail overlay for a record
    pub fn select_institution(&mut self, id: InstitutionId) -> Result<&Institution, AppError> {
        let index = self
            .dataset
            .records()
            .iter()
            .position(|r| r.id == id)
            .ok_or(AppError::UnknownInstitution(id))?;
        self.detail = Some(index);
        Ok(&self.dataset.records()[index])
    }

    /// Record shown in the overlay, if it is open
    pub fn detail(&self) -> Option<&Institution> {
        self.detail.map(|i| &self.dataset.records()[i])
    }

    pub fn close_details(&mut self) {
        self.detail = None;
    }

    /// Emit the share payload for the record in the overlay
    pub fn share(&self) -> Result<HostPayload, AppError> {
        let record = self.detail().ok_or(AppError::NothingToShare)?;
        let payload = HostPayload::ShareInstitution {
            id: record.id,
            name: record.display_name().to_string(),
        };
        self.host.send(&payload)?;
        info!("Shared institution {}", record.id);
        Ok(payload)
    }

    /// Grid markup: one card per filtered record, or the placeholder
    pub fn render_grid(&self) -> String {
        if self.filtered.is_empty() {
            return format!(r#"<p class="no-results">{}</p>"#, labels::NO_RESULTS);
        }
        self.filtered().map(render_card).collect()
    }

    /// Overlay content for the open record
    pub fn render_details(&self) -> String {
        match self.detail() {
            Some(record) => render_details(record),
            None => String::new(),
        }
    }

    fn render_filters(&self) -> String {
        let mut locations = option("", labels::ALL_LOCATIONS, self.location.is_empty());
        for location in self.dataset.locations() {
            locations.push_str(&option(&location, &location, location == self.location));
        }
        format!(
            r#"<div class="filters"><input type="search" id="search-input" placeholder="{}" value="{}"><select id="filter-location">{}</select></div>"#,
            labels::SEARCH_PLACEHOLDER,
            escape_html(&self.search),
            locations
        )
    }
}

impl PageController for DirectoryPage {
    type Command = DirectoryCommand;

    fn apply(&mut self, command: DirectoryCommand) -> Result<(), AppError> {
        let result = match command {
            DirectoryCommand::Search(text) => {
                let location = self.location.clone();
                self.apply_filter(&text, &location);
                Ok(())
            }
            DirectoryCommand::FilterLocation(location) => {
                let search = self.search.clone();
                self.apply_filter(&search, &location);
                Ok(())
            }
            DirectoryCommand::Open(id) => self.select_institution(id).map(|_| ()),
            DirectoryCommand::CloseDetails => {
                self.close_details();
                Ok(())
            }
            DirectoryCommand::Share => self.share().map(|_| ()),
        };
        track_notice(&mut self.notice, result)
    }

    fn render(&self) -> String {
        format!(
            r#"{}{}<div id="university-grid" class="university-grid">{}</div><div id="university-details" class="modal" {}><div class="modal-content"><button id="close-details" class="close-button">&times;</button><div class="details-content">{}</div></div></div>"#,
            render_notice(self.notice()),
            self.render_filters(),
            self.render_grid(),
            display_style(self.detail.is_some(), "flex"),
            self.render_details()
        )
    }

    fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }
}

fn tuition_range(record: &Institution) -> String {
    match &record.tuition_fees {
        Some(fees) => format!(
            "${} - ${}{}",
            fees.range_min.map(format_amount).unwrap_or_else(|| "N/A".to_string()),
            fees.range_max.map(format_amount).unwrap_or_else(|| "N/A".to_string()),
            labels::PER_YEAR
        ),
        None => String::new(),
    }
}

fn render_card(record: &Institution) -> String {
    format!(
        r#"<div class="university-card" data-id="{id}"><div class="card-header"><h2>{name}</h2><div class="card-location">{location}</div></div><div class="card-body"><div class="card-info"><p><strong>{l_en}:</strong> {name_en}</p><p><strong>{l_year}:</strong> {year}</p><p><strong>{l_tuition}:</strong> {tuition}</p></div></div></div>"#,
        id = record.id,
        name = escape_html(record.display_name()),
        location = text_or_na(record.location.as_deref()),
        l_en = labels::ENGLISH_NAME,
        name_en = text_or_na(record.name_en.as_deref()),
        l_year = labels::ESTABLISHED,
        year = value_or_na(record.established_year),
        l_tuition = labels::TUITION,
        tuition = escape_html(&tuition_range(record)),
    )
}

fn render_details(record: &Institution) -> String {
    let mut html = format!(
        r#"<h2>{}</h2><p class="university-type">{} • {} {}</p>"#,
        escape_html(record.display_name()),
        text_or_na(record.kind.as_deref()),
        labels::ESTABLISHED_IN,
        value_or_na(record.established_year)
    );

    let fees = record.tuition_fees.as_ref();
    html.push_str(&format!(
        r#"<div class="details-section"><h3>{}</h3><p><strong>{}:</strong> {}</p><p><strong>{}:</strong> ${} - ${}{}</p><p><strong>{}:</strong> {}</p></div>"#,
        labels::GENERAL_INFO,
        labels::LOCATION,
        text_or_na(record.location.as_deref()),
        labels::TUITION,
        value_or_na(fees.and_then(|f| f.range_min).map(format_amount)),
        value_or_na(fees.and_then(|f| f.range_max).map(format_amount)),
        labels::PER_YEAR,
        labels::TOTAL_MAJORS,
        value_or_na(record.total_majors)
    ));

    if !record.faculties.is_empty() {
        html.push_str(&format!("<h3>{}</h3><ul>", labels::FACULTIES_AND_MAJORS));
        for faculty in &record.faculties {
            html.push_str(&format!(
                "<li><strong>{}</strong>",
                escape_html(faculty.display_name())
            ));
            if !faculty.majors.is_empty() {
                html.push_str("<ul>");
                for major in &faculty.majors {
                    html.push_str(&format!(
                        "<li>{} ({})</li>",
                        escape_html(major.display_name()),
                        escape_html(major.category())
                    ));
                }
                html.push_str("</ul>");
            }
            html.push_str("</li>");
        }
        html.push_str("</ul>");
    }

    if let Some(contact) = &record.contact {
        html.push_str(&format!("<h3>{}</h3><ul>", labels::CONTACT));
        if !contact.phones.is_empty() {
            html.push_str(&format!(
                "<li><strong>{}:</strong> {}</li>",
                labels::PHONE,
                escape_html(&contact.phones.join(", "))
            ));
        }
        if let Some(email) = contact.email.as_deref().filter(|e| !e.is_empty()) {
            html.push_str(&format!(
                "<li><strong>{}:</strong> {}</li>",
                labels::EMAIL,
                escape_html(email)
            ));
        }
        if let Some(website) = contact.website.as_deref().filter(|w| !w.is_empty()) {
            html.push_str(&format!(
                r#"<li><strong>{}:</strong> <a href="{url}" target="_blank">{url}</a></li>"#,
                labels::WEBSITE,
                url = escape_html(website)
            ));
        }
        html.push_str("</ul>");
    }

    if !record.admission_requirements_km.is_empty() {
        html.push_str(&format!("<h3>{}</h3><ul>", labels::ADMISSION));
        for requirement in &record.admission_requirements_km {
            html.push_str(&format!("<li>{}</li>", escape_html(requirement)));
        }
        html.push_str("</ul>");
    }

    html.push_str(&format!(
        r#"<button class="share-button" id="share-university" data-id="{}">{}</button>"#,
        record.id,
        labels::SHARE
    ));

    html
}
