//! Inbox for payloads sent back by the pages
//!
//! The chat client delivers each page payload to the bot as `web_app_data`.
//! The inbox decodes it and produces the reply text: a recommendation list
//! for a completed profile, institution details for a shared record, or a
//! cost summary for a shared estimate.

use sdk::errors::AppError;
use sdk::payload::HostPayload;
use sdk::types::{Institution, InstitutionId, Recommendation, UserProfile};
use std::fmt::Write;
use tracing::{info, warn};

use crate::markup::{format_amount, format_money};
use crate::recommender::{Recommender, ResultStore};

/// Faculties listed in a details reply
const MAX_LISTED_FACULTIES: usize = 3;

/// Decodes page payloads and builds replies
#[derive(Debug, Clone)]
pub struct Inbox {
    recommender: Recommender,
    store: Option<ResultStore>,
    results_url: Option<String>,
}

impl Inbox {
    pub fn new(recommender: Recommender) -> Self {
        Self {
            recommender,
            store: None,
            results_url: None,
        }
    }

    /// Persist recommendation results and link to the results page
    ///
    /// `results_url` is the page URL without query; the result id and bot
    /// name are appended to it.
    pub fn with_results(mut self, store: ResultStore, results_url: impl Into<String>) -> Self {
        self.store = Some(store);
        self.results_url = Some(results_url.into());
        self
    }

    /// Handle one raw `web_app_data` string
    pub fn handle_web_app_data(&self, raw: &str, bot_username: &str) -> Result<String, AppError> {
        let payload = HostPayload::from_json(raw).map_err(|e| {
            warn!("Undecodable web app data: {}", e);
            e
        })?;
        info!("Received {} from page", payload.action());

        match payload {
            HostPayload::UniversityRecommendations { user_profile } => {
                self.recommendations_reply(user_profile, bot_username)
            }
            HostPayload::ShareInstitution { id, .. } => self.institution_reply(id),
            HostPayload::ShareEstimate {
                institution_name,
                category_label,
                yearly_cost,
                total_cost,
                years,
                ..
            } => Ok(estimate_reply(
                &institution_name,
                &category_label,
                yearly_cost,
                total_cost,
                years,
            )),
        }
    }

    fn recommendations_reply(
        &self,
        profile: UserProfile,
        bot_username: &str,
    ) -> Result<String, AppError> {
        let recommendations = self.recommender.recommend(&profile);
        let mut reply = format_recommendations(&recommendations);

        if let (Some(store), Some(url)) = (&self.store, &self.results_url) {
            let document = ResultStore::document(None, profile, recommendations);
            let id = store.save(&document)?;
            let _ = write!(reply, "\n\n{}?id={}&bot={}", url, id, bot_username);
        }

        Ok(reply)
    }

    fn institution_reply(&self, id: InstitutionId) -> Result<String, AppError> {
        self.recommender
            .dataset()
            .get(id)
            .map(format_institution)
            .ok_or(AppError::UnknownInstitution(id))
    }
}

/// Ranked list, one line per institution
pub fn format_recommendations(recommendations: &[Recommendation]) -> String {
    if recommendations.is_empty() {
        return "No recommendations found based on your profile.".to_string();
    }

    let mut text = String::from("🎓 សាកលវិទ្យាល័យដែលសមស្របសម្រាប់អ្នក:\n");
    for (rank, rec) in recommendations.iter().enumerate() {
        let _ = write!(
            text,
            "\n{}. {} ({}%)",
            rank + 1,
            rec.institution.display_name(),
            rec.match_percentage()
        );
        if let Some(location) = rec.institution.location.as_deref() {
            let _ = write!(text, " - {}", location);
        }
    }
    text
}

/// Details message for one institution
pub fn format_institution(institution: &Institution) -> String {
    let na = || "N/A".to_string();
    let mut text = format!(
        "🏫 {} ({})\n📍 {}\n\n",
        institution.display_name(),
        institution.name_en.as_deref().unwrap_or(""),
        institution.location.as_deref().unwrap_or("N/A")
    );
    let _ = writeln!(
        text,
        "• ប្រភេទ: {}",
        institution.kind.as_deref().unwrap_or("N/A")
    );
    let _ = writeln!(
        text,
        "• ឆ្នាំបង្កើត: {}",
        institution
            .established_year
            .map(|y| y.to_string())
            .unwrap_or_else(na)
    );
    let fees = institution.tuition_fees.as_ref();
    let _ = writeln!(
        text,
        "• ថ្លៃសិក្សា: ${} - ${} /ឆ្នាំ",
        fees.and_then(|f| f.range_min).map(format_amount).unwrap_or_else(na),
        fees.and_then(|f| f.range_max).map(format_amount).unwrap_or_else(na)
    );

    if !institution.faculties.is_empty() {
        text.push_str("\nមហាវិទ្យាល័យសំខាន់ៗ:\n");
        for faculty in institution.faculties.iter().take(MAX_LISTED_FACULTIES) {
            let _ = writeln!(text, "- {}", faculty.display_name());
        }
    }

    if let Some(contact) = &institution.contact {
        text.push_str("\nទំនាក់ទំនង:\n");
        if let Some(website) = contact.website.as_deref().filter(|w| !w.is_empty()) {
            let _ = writeln!(text, "  - គេហទំព័រ: {}", website);
        }
        if !contact.phones.is_empty() {
            let _ = writeln!(text, "  - ទូរស័ព្ទ: {}", contact.phones.join(", "));
        }
    }

    text
}

/// Cost summary for a shared estimate
pub fn estimate_reply(
    institution_name: &str,
    category_label: &str,
    yearly_cost: i64,
    total_cost: i64,
    years: u8,
) -> String {
    format!(
        "💰 ការគណនាថ្លៃសិក្សា\n\n🏫 {}\n📚 {}\n• សរុបប្រចាំឆ្នាំ: {}\n• សរុប {} ឆ្នាំ: {}",
        institution_name,
        category_label,
        format_money(yearly_cost),
        years,
        format_money(total_cost)
    )
}
