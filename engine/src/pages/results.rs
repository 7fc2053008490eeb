//! Results page
//!
//! Shows a stored result document: the profile that produced it and the
//! ranked recommendations, in the order they were stored. Any failure to
//! obtain the document replaces every section with the same error block.

use sdk::errors::{AppError, AppErrorExt};
use sdk::types::{InstitutionId, Recommendation, ResultDocument, StoredProfile, NOT_AVAILABLE};
use tracing::{info, warn};

use super::{render_notice, PageController};
use crate::markup::{escape_html, format_amount, labels, text_or_na, value_or_na};
use crate::source::ResultSource;

/// Directory of the results page under the pages base URL
pub const RESULTS_DIR: &str = "results";

/// Query parameters of the results page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageQuery {
    /// Result document id
    pub id: Option<String>,
    /// Bot username for the return link
    pub bot: Option<String>,
}

impl PageQuery {
    /// Parse a query string, with or without the leading `?`
    pub fn parse(query: &str) -> Self {
        let mut url = match reqwest::Url::parse("http://results.local/") {
            Ok(url) => url,
            Err(_) => return Self::default(),
        };
        url.set_query(Some(query.trim_start_matches('?')));

        let mut parsed = Self::default();
        for (key, value) in url.query_pairs() {
            if value.is_empty() {
                continue;
            }
            match key.as_ref() {
                "id" if parsed.id.is_none() => parsed.id = Some(value.into_owned()),
                "bot" if parsed.bot.is_none() => parsed.bot = Some(value.into_owned()),
                _ => {}
            }
        }
        parsed
    }
}

/// What the results page currently shows
#[derive(Debug, Clone, PartialEq)]
pub enum ResultsView {
    Loading,
    Ready(ResultDocument),
    /// Uniform error view with the message shown to the user
    Failed(String),
}

/// User actions on the results page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultsCommand {
    /// "View Details" on a recommendation card
    ViewDetails(InstitutionId),
}

/// Results page state
pub struct ResultsPage {
    query: PageQuery,
    bot_username: String,
    view: ResultsView,
    notice: Option<String>,
}

impl ResultsPage {
    /// `default_bot` is used when the query carries no `bot` parameter
    pub fn new(query: PageQuery, default_bot: &str) -> Self {
        let bot_username = query
            .bot
            .clone()
            .unwrap_or_else(|| default_bot.to_string());
        Self {
            query,
            bot_username,
            view: ResultsView::Loading,
            notice: None,
        }
    }

    pub fn view(&self) -> &ResultsView {
        &self.view
    }

    /// Return link to the bot
    pub fn bot_link(&self) -> String {
        format!("https://t.me/{}", self.bot_username)
    }

    /// Load the document named by the page query
    pub async fn load_from_query(&mut self, source: &dyn ResultSource) -> Result<(), AppError> {
        let id = self.query.id.clone();
        self.load(source, id.as_deref()).await
    }

    /// Load one document and switch to the ready or failed view
    pub async fn load(
        &mut self,
        source: &dyn ResultSource,
        id: Option<&str>,
    ) -> Result<(), AppError> {
        self.view = ResultsView::Loading;

        let outcome = match id.filter(|id| !id.is_empty()) {
            Some(id) => source.fetch(id).await,
            None => Err(AppError::MissingResultId),
        };

        match outcome {
            Ok(document) => {
                info!(
                    "Loaded result {:?} with {} recommendations",
                    document.result_id,
                    document.recommendations.len()
                );
                self.view = ResultsView::Ready(document);
                Ok(())
            }
            Err(e) => {
                warn!("Results unavailable: {}", e);
                self.view = ResultsView::Failed(e.user_hint().to_string());
                Err(e)
            }
        }
    }

    /// Placeholder for the per-institution detail view
    pub fn view_details(&mut self, id: InstitutionId) -> &str {
        self.notice
            .insert(format!(
                "Detail view not implemented in this demo. University ID: {}",
                id
            ))
            .as_str()
    }

    fn render_error(&self, message: &str) -> String {
        format!(
            r#"<div class="error-message"><p>{}</p><a href="{}" class="button button-primary">{}</a></div>"#,
            escape_html(message),
            escape_html(&self.bot_link()),
            labels::RETURN_TO_BOT
        )
    }
}

impl PageController for ResultsPage {
    type Command = ResultsCommand;

    fn apply(&mut self, command: ResultsCommand) -> Result<(), AppError> {
        match command {
            ResultsCommand::ViewDetails(id) => {
                self.view_details(id);
                Ok(())
            }
        }
    }

    fn render(&self) -> String {
        let (profile, recommendations) = match &self.view {
            ResultsView::Loading => (
                "<p>Loading...</p>".to_string(),
                "<p>Loading...</p>".to_string(),
            ),
            ResultsView::Failed(message) => (self.render_error(message), self.render_error(message)),
            ResultsView::Ready(document) => (
                render_profile(document.user_profile.as_ref()),
                render_recommendations(&document.recommendations),
            ),
        };

        format!(
            r#"{}<section id="profile-section"><div id="user-profile">{}</div></section><section id="recommendations-section"><div id="university-list">{}</div></section>"#,
            render_notice(self.notice()),
            profile,
            recommendations
        )
    }

    fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }
}

fn info_item(label: &str, value: &str) -> String {
    format!(
        r#"<div class="info-item"><span class="label">{}:</span><span>{}</span></div>"#,
        label, value
    )
}

fn render_profile(profile: Option<&StoredProfile>) -> String {
    let Some(profile) = profile else {
        return format!("<p>{}</p>", labels::PROFILE_UNAVAILABLE);
    };
    [
        info_item("Location", &text_or_na(profile.location.as_deref())),
        info_item(
            "Maximum Budget",
            &profile
                .max_budget
                .map(|budget| format!("${} / year", budget))
                .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
        ),
        info_item("Field of Study", &text_or_na(profile.core_field.as_deref())),
        info_item("Career Goal", &text_or_na(profile.career_goal.as_deref())),
        info_item(
            "English Proficiency",
            &profile
                .english_proficiency
                .map(|score| format!("{}/10", score))
                .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
        ),
    ]
    .concat()
}

fn render_recommendations(recommendations: &[Recommendation]) -> String {
    if recommendations.is_empty() {
        return format!("<p>{}</p>", labels::NO_RECOMMENDATIONS);
    }
    recommendations.iter().map(render_card).collect()
}

fn render_card(recommendation: &Recommendation) -> String {
    let institution = &recommendation.institution;
    let percentage = recommendation.match_percentage();
    let fees = institution.tuition_fees.as_ref();

    format!(
        r#"<div class="university-card"><div class="card-header"><h2 class="khmer">{name}</h2><div class="university-type">{kind} • Established {year} • {location}</div></div><div class="card-body"><div class="card-info"><p><span class="label">English Name:</span> {name_en}</p><p><span class="label">Tuition Range:</span> ${min} - ${max} / year</p><p><span class="label">Total Majors:</span> {majors}</p></div><div class="match-score"><div class="match-bar"><div class="match-bar-fill" style="width: {pct}%"></div></div><div class="percentage">{pct}%</div></div><div class="card-actions"><button class="button button-primary view-details" data-id="{id}">View Details</button></div></div></div>"#,
        name = escape_html(institution.display_name()),
        kind = text_or_na(institution.kind.as_deref()),
        year = value_or_na(institution.established_year),
        location = text_or_na(institution.location.as_deref()),
        name_en = text_or_na(institution.name_en.as_deref()),
        min = value_or_na(fees.and_then(|f| f.range_min).map(format_amount)),
        max = value_or_na(fees.and_then(|f| f.range_max).map(format_amount)),
        majors = value_or_na(institution.total_majors),
        pct = percentage,
        id = institution.id,
    )
}
