//! Recommendation scoring
//!
//! A completed intake profile is turned into a ranked list of institutions
//! in two passes:
//!
//! 1. **Hard filter**: location must match (unless the profile accepts any
//!    location) and the cheapest tuition must fit the budget.
//! 2. **Scoring**: points for matching majors, career fit, budget headroom,
//!    English-medium instruction and field specialists.
//!
//! Results are sorted by score (ties keep dataset order) and truncated.

use sdk::types::{Institution, InstitutionId, Recommendation, UserProfile};
use std::cmp::Ordering;
use std::sync::Arc;
use tracing::debug;

use crate::dataset::Dataset;

pub mod store;

pub use store::ResultStore;

/// Location choice that disables the location filter
pub const ANY_LOCATION: &str = "Any";

/// Location choices offered by the intake wizard
pub const LOCATIONS: [&str; 4] = ["Phnom Penh", "Siem Reap", "Battambang", ANY_LOCATION];

/// Career goals and the field category each one leads to
pub const CAREER_FIELDS: [(&str, &str); 5] = [
    ("វិស្វករ", "វិស្វកម្ម"),
    ("អ្នកគ្រប់គ្រង", "ធុរកិច្ច"),
    ("វេជ្ជបណ្ឌិត", "វេជ្ជសាស្ត្រ"),
    ("គ្រូបង្រៀន", "អប់រំ"),
    ("អ្នកច្បាប់", "ច្បាប់"),
];

/// Institutions known as specialists in a field category
const SPECIALISTS: [(&str, &[InstitutionId]); 6] = [
    ("វិស្វកម្ម", &[10, 27]),
    ("បច្ចេកវិទ្យា", &[10, 27]),
    ("វេជ្ជសាស្ត្រ", &[14, 15]),
    ("សុខភាព", &[14, 15]),
    ("ច្បាប់", &[12]),
    ("ធុរកិច្ច", &[16, 35]),
];

/// Institutions teaching in English
const ENGLISH_MEDIUM: [InstitutionId; 4] = [4, 28, 36, 32];

const POINTS_PER_MAJOR: f64 = 5.0;
const MAX_FIELD_POINTS: f64 = 30.0;
const CAREER_POINTS: f64 = 25.0;
const WIDE_BUDGET_POINTS: f64 = 20.0;
const TIGHT_BUDGET_POINTS: f64 = 10.0;
const WIDE_BUDGET_MARGIN: f64 = 500.0;
const ENGLISH_POINTS: f64 = 15.0;
const ENGLISH_THRESHOLD: u8 = 8;
const SPECIALIST_POINTS: f64 = 20.0;

/// Field category a career goal leads to
pub fn career_field(career_goal: &str) -> Option<&'static str> {
    CAREER_FIELDS
        .iter()
        .find(|(career, _)| *career == career_goal)
        .map(|(_, field)| *field)
}

fn is_specialist(id: InstitutionId, field: &str) -> bool {
    SPECIALISTS
        .iter()
        .any(|(f, ids)| *f == field && ids.contains(&id))
}

/// Points awarded to one institution, per criterion
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ScoreBreakdown {
    pub field: f64,
    pub career: f64,
    pub budget: f64,
    pub english: f64,
    pub specialist: f64,
}

impl ScoreBreakdown {
    pub fn total(&self) -> f64 {
        self.field + self.career + self.budget + self.english + self.specialist
    }
}

/// Ranks institutions against a user profile
#[derive(Debug, Clone)]
pub struct Recommender {
    dataset: Arc<Dataset>,
    top_n: usize,
}

impl Recommender {
    pub fn new(dataset: Arc<Dataset>, top_n: usize) -> Self {
        Self { dataset, top_n }
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    /// Best matching institutions, highest score first
    pub fn recommend(&self, profile: &UserProfile) -> Vec<Recommendation> {
        let mut scored: Vec<Recommendation> = self
            .candidates(profile)
            .map(|institution| Recommendation {
                total_score: self.score(institution, profile).total(),
                institution: institution.clone(),
            })
            .collect();

        scored.sort_by(|a, b| {
            b.total_score
                .partial_cmp(&a.total_score)
                .unwrap_or(Ordering::Equal)
        });
        scored.truncate(self.top_n);

        debug!(
            "Recommended {} institutions for field {:?}",
            scored.len(),
            profile.core_field
        );
        scored
    }

    /// Institutions passing the hard filter, in dataset order
    pub fn candidates<'a>(
        &'a self,
        profile: &'a UserProfile,
    ) -> impl Iterator<Item = &'a Institution> + 'a {
        let any_location = profile.location.is_empty() || profile.location == ANY_LOCATION;
        let budget = f64::from(profile.max_budget);

        self.dataset.records().iter().filter(move |institution| {
            let location_ok =
                any_location || institution.location.as_deref() == Some(profile.location.as_str());
            let budget_ok = profile.max_budget == 0
                || institution
                    .tuition_fees
                    .as_ref()
                    .map(|fees| fees.min_or_zero())
                    .unwrap_or(0.0)
                    <= budget;
            location_ok && budget_ok
        })
    }

    /// Score one institution
    pub fn score(&self, institution: &Institution, profile: &UserProfile) -> ScoreBreakdown {
        let mut breakdown = ScoreBreakdown::default();

        let matching_majors = institution
            .majors()
            .filter(|m| m.category_km.as_deref() == Some(profile.core_field.as_str()))
            .count();
        breakdown.field = (matching_majors as f64 * POINTS_PER_MAJOR).min(MAX_FIELD_POINTS);

        if let Some(field) = career_field(&profile.career_goal) {
            if institution
                .majors()
                .any(|m| m.category_km.as_deref() == Some(field))
            {
                breakdown.career = CAREER_POINTS;
            }
        }

        let tuition_max = institution
            .tuition_fees
            .as_ref()
            .map(|fees| fees.max_or_zero())
            .unwrap_or(0.0);
        let headroom = f64::from(profile.max_budget) - tuition_max;
        if headroom > WIDE_BUDGET_MARGIN {
            breakdown.budget = WIDE_BUDGET_POINTS;
        } else if headroom > 0.0 {
            breakdown.budget = TIGHT_BUDGET_POINTS;
        }

        if profile.english_proficiency >= ENGLISH_THRESHOLD
            && ENGLISH_MEDIUM.contains(&institution.id)
        {
            breakdown.english = ENGLISH_POINTS;
        }

        if is_specialist(institution.id, &profile.core_field) {
            breakdown.specialist = SPECIALIST_POINTS;
        }

        breakdown
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sdk::types::{Faculty, Major, TuitionFees};

    fn institution(id: InstitutionId, location: &str, fees: (f64, f64), categories: &[&str]) -> Institution {
        let mut record = Institution::new(id, format!("សាកលវិទ្យាល័យ {}", id), format!("University {}", id));
        record.location = Some(location.to_string());
        record.tuition_fees = Some(TuitionFees::new(fees.0, fees.1));
        record.faculties = vec![Faculty {
            name_km: Some("មហាវិទ្យាល័យ".to_string()),
            name_en: None,
            majors: categories
                .iter()
                .map(|c| Major {
                    name_km: Some(format!("ជំនាញ {}", c)),
                    name_en: None,
                    category_km: Some(c.to_string()),
                })
                .collect(),
        }];
        record
    }

    fn profile(location: &str, budget: u32, field: &str, career: &str, english: u8) -> UserProfile {
        UserProfile {
            location: location.to_string(),
            max_budget: budget,
            core_field: field.to_string(),
            career_goal: career.to_string(),
            english_proficiency: english,
        }
    }

    fn recommender(records: Vec<Institution>, top_n: usize) -> Recommender {
        Recommender::new(Arc::new(Dataset::from_records(records)), top_n)
    }

    #[test]
    fn test_hard_filter_location_and_budget() {
        let r = recommender(
            vec![
                institution(1, "Phnom Penh", (500.0, 900.0), &[]),
                institution(2, "Battambang", (300.0, 600.0), &[]),
                institution(3, "Phnom Penh", (2500.0, 3000.0), &[]),
            ],
            5,
        );

        let ids: Vec<_> = r
            .candidates(&profile("Phnom Penh", 1000, "", "", 5))
            .map(|i| i.id)
            .collect();
        assert_eq!(ids, vec![1]);

        let ids: Vec<_> = r
            .candidates(&profile(ANY_LOCATION, 0, "", "", 5))
            .map(|i| i.id)
            .collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn test_field_points_are_capped() {
        let r = recommender(vec![], 5);
        let many = institution(1, "Phnom Penh", (0.0, 0.0), &["វិស្វកម្ម"; 9]);
        let score = r.score(&many, &profile("", 0, "វិស្វកម្ម", "", 1));
        assert_eq!(score.field, 30.0);
    }

    #[test]
    fn test_full_breakdown() {
        let r = recommender(vec![], 5);
        let itc = institution(10, "Phnom Penh", (800.0, 1200.0), &["វិស្វកម្ម", "វិស្វកម្ម"]);
        let score = r.score(&itc, &profile("Phnom Penh", 2000, "វិស្វកម្ម", "វិស្វករ", 9));

        assert_eq!(
            score,
            ScoreBreakdown {
                field: 10.0,
                career: 25.0,
                budget: 20.0,
                english: 0.0,
                specialist: 20.0,
            }
        );
        assert_eq!(score.total(), 75.0);
    }

    #[test]
    fn test_budget_and_english_tiers() {
        let r = recommender(vec![], 5);
        let aupp = institution(4, "Phnom Penh", (4000.0, 5000.0), &[]);

        let tight = r.score(&aupp, &profile("", 5200, "", "", 8));
        assert_eq!(tight.budget, 10.0);
        assert_eq!(tight.english, 15.0);

        let over = r.score(&aupp, &profile("", 4500, "", "", 7));
        assert_eq!(over.budget, 0.0);
        assert_eq!(over.english, 0.0);
    }

    #[test]
    fn test_ranking_is_sorted_and_truncated() {
        let r = recommender(
            vec![
                institution(1, "Phnom Penh", (100.0, 200.0), &[]),
                institution(2, "Phnom Penh", (100.0, 200.0), &["ធុរកិច្ច"]),
                institution(3, "Phnom Penh", (100.0, 200.0), &["ធុរកិច្ច", "ធុរកិច្ច"]),
            ],
            2,
        );
        let ranked = r.recommend(&profile("Phnom Penh", 1000, "ធុរកិច្ច", "", 5));
        let ids: Vec<_> = ranked.iter().map(|rec| rec.institution.id).collect();
        assert_eq!(ids, vec![3, 2]);
        assert_eq!(ranked[0].total_score, 30.0);
    }

    #[test]
    fn test_career_field_lookup() {
        assert_eq!(career_field("វេជ្ជបណ្ឌិត"), Some("វេជ្ជសាស្ត្រ"));
        assert_eq!(career_field("Researcher"), None);
    }
}
