//! Dataset and profile types
//!
//! Institution records are supplied externally and only ever read. Every
//! field except the identifier is optional: absent, `null` or wrongly typed
//! values are rendered as "N/A" by the pages instead of failing the dataset.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;

/// Identifier of an institution record
pub type InstitutionId = i64;

/// Placeholder shown for any absent field
pub const NOT_AVAILABLE: &str = "N/A";

/// Treat an explicit JSON `null` like a missing field
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Read an optional field, turning a value of the wrong shape into `None`
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

/// Like [`lenient`] for list fields: anything but a well-formed list is empty
fn lenient_or_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).unwrap_or_default())
}

/// One educational institution from the injected dataset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Institution {
    pub id: InstitutionId,

    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub name_km: Option<String>,

    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub name_en: Option<String>,

    /// Location tag used by the directory filter
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,

    /// Public/private designation
    #[serde(
        default,
        rename = "type",
        deserialize_with = "lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub kind: Option<String>,

    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub established_year: Option<i32>,

    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub tuition_fees: Option<TuitionFees>,

    #[serde(default, deserialize_with = "lenient_or_default")]
    pub faculties: Vec<Faculty>,

    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub contact: Option<Contact>,

    #[serde(default, deserialize_with = "lenient_or_default")]
    pub admission_requirements_km: Vec<String>,

    /// Total program count
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub total_majors: Option<u32>,
}

impl Institution {
    /// Create a record with only an id and names
    pub fn new(id: InstitutionId, name_km: impl Into<String>, name_en: impl Into<String>) -> Self {
        Self {
            id,
            name_km: Some(name_km.into()),
            name_en: Some(name_en.into()),
            location: None,
            kind: None,
            established_year: None,
            tuition_fees: None,
            faculties: Vec::new(),
            contact: None,
            admission_requirements_km: Vec::new(),
            total_majors: None,
        }
    }

    /// Khmer name, falling back to the English name
    pub fn display_name(&self) -> &str {
        non_empty(&self.name_km)
            .or_else(|| non_empty(&self.name_en))
            .unwrap_or(NOT_AVAILABLE)
    }

    /// Case-insensitive substring match against either name field
    ///
    /// `needle` must already be lowercase. Empty names are ignored, so a
    /// record without any name never matches, not even the empty needle.
    pub fn name_contains(&self, needle: &str) -> bool {
        [&self.name_km, &self.name_en]
            .into_iter()
            .filter_map(non_empty)
            .any(|name| name.to_lowercase().contains(needle))
    }

    /// Midpoint of the tuition range; absent bounds count as zero
    pub fn average_tuition(&self) -> f64 {
        self.tuition_fees
            .as_ref()
            .map(|fees| (fees.min_or_zero() + fees.max_or_zero()) / 2.0)
            .unwrap_or(0.0)
    }

    /// All majors across faculties
    pub fn majors(&self) -> impl Iterator<Item = &Major> {
        self.faculties.iter().flat_map(|f| f.majors.iter())
    }
}

/// Yearly tuition range
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TuitionFees {
    #[serde(default, deserialize_with = "lenient")]
    pub range_min: Option<f64>,

    #[serde(default, deserialize_with = "lenient")]
    pub range_max: Option<f64>,
}

impl TuitionFees {
    pub fn new(range_min: f64, range_max: f64) -> Self {
        Self {
            range_min: Some(range_min),
            range_max: Some(range_max),
        }
    }

    pub fn min_or_zero(&self) -> f64 {
        self.range_min.unwrap_or(0.0)
    }

    pub fn max_or_zero(&self) -> f64 {
        self.range_max.unwrap_or(0.0)
    }
}

/// Faculty nested under an institution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Faculty {
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub name_km: Option<String>,

    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub name_en: Option<String>,

    #[serde(default, deserialize_with = "lenient_or_default")]
    pub majors: Vec<Major>,
}

impl Faculty {
    pub fn display_name(&self) -> &str {
        non_empty(&self.name_km)
            .or_else(|| non_empty(&self.name_en))
            .unwrap_or(NOT_AVAILABLE)
    }
}

/// Major nested under a faculty
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Major {
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub name_km: Option<String>,

    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub name_en: Option<String>,

    /// Category label used for field matching
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub category_km: Option<String>,
}

impl Major {
    pub fn display_name(&self) -> &str {
        non_empty(&self.name_km)
            .or_else(|| non_empty(&self.name_en))
            .unwrap_or(NOT_AVAILABLE)
    }

    pub fn category(&self) -> &str {
        non_empty(&self.category_km).unwrap_or(NOT_AVAILABLE)
    }
}

/// Contact block of an institution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Contact {
    #[serde(default, deserialize_with = "lenient_or_default")]
    pub phones: Vec<String>,

    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
}

/// The three choices the intake wizard requires before completion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequiredChoice {
    Location,
    Field,
    Career,
}

impl RequiredChoice {
    /// All required choices, in wizard order
    pub const ALL: [RequiredChoice; 3] = [Self::Location, Self::Field, Self::Career];

    /// Blocking notice shown when the choice is missing
    pub fn notice(self) -> &'static str {
        match self {
            Self::Location => "សូមជ្រើសរើសទីតាំង",
            Self::Field => "សូមជ្រើសរើសផ្នែកសិក្សា",
            Self::Career => "សូមជ្រើសរើសគោលដៅអាជីព",
        }
    }
}

impl fmt::Display for RequiredChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Location => write!(f, "location"),
            Self::Field => write!(f, "field of study"),
            Self::Career => write!(f, "career goal"),
        }
    }
}

/// Completed intake profile
///
/// Only constructed once every required choice is present; the wizard's
/// in-progress accumulator is a separate type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub location: String,
    pub max_budget: u32,
    pub core_field: String,
    pub career_goal: String,
    pub english_proficiency: u8,
}

/// Profile echoed back inside a stored result document
///
/// Documents are written by other processes and may predate the current
/// profile shape, so every field is optional and rendered as "N/A" when
/// missing or unreadable.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StoredProfile {
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,

    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub max_budget: Option<u32>,

    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub core_field: Option<String>,

    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub career_goal: Option<String>,

    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub english_proficiency: Option<u8>,
}

impl From<UserProfile> for StoredProfile {
    fn from(profile: UserProfile) -> Self {
        Self {
            location: Some(profile.location),
            max_budget: Some(profile.max_budget),
            core_field: Some(profile.core_field),
            career_goal: Some(profile.career_goal),
            english_proficiency: Some(profile.english_proficiency),
        }
    }
}

/// A scored institution, precomputed by the recommender
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    #[serde(rename = "university")]
    pub institution: Institution,

    pub total_score: f64,
}

impl Recommendation {
    /// Score as a whole percentage clamped to `[0, 100]`
    pub fn match_percentage(&self) -> u8 {
        if !self.total_score.is_finite() {
            return if self.total_score > 0.0 { 100 } else { 0 };
        }
        self.total_score.round().clamp(0.0, 100.0) as u8
    }
}

/// Result document fetched by the results page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultDocument {
    #[serde(default, deserialize_with = "lenient")]
    pub user_profile: Option<StoredProfile>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub recommendations: Vec<Recommendation>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result_id: Option<String>,

    #[serde(default)]
    pub timestamp: Option<String>,
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_institution_tolerates_nulls_and_missing_fields() {
        let record: Institution = serde_json::from_value(json!({
            "id": 7,
            "name_en": "Royal University",
            "faculties": null,
            "contact": {"phones": null, "email": "info@example.edu"}
        }))
        .unwrap();

        assert_eq!(record.id, 7);
        assert!(record.faculties.is_empty());
        assert_eq!(record.display_name(), "Royal University");
        assert_eq!(record.average_tuition(), 0.0);
        assert!(record.contact.unwrap().phones.is_empty());
    }

    #[test]
    fn test_wrongly_typed_optional_fields_become_absent() {
        let record: Institution = serde_json::from_value(json!({
            "id": 2,
            "name_en": "University of Battambang",
            "established_year": "1998",
            "total_majors": "12+",
            "tuition_fees": {"range_min": "contact us", "range_max": 900},
            "contact": "call us",
            "faculties": {"name_km": "not a list"},
            "location": 42
        }))
        .unwrap();

        assert_eq!(record.display_name(), "University of Battambang");
        assert_eq!(record.established_year, None);
        assert_eq!(record.total_majors, None);
        assert_eq!(record.location, None);
        assert_eq!(record.contact, None);
        assert!(record.faculties.is_empty());
        let fees = record.tuition_fees.unwrap();
        assert_eq!(fees.range_min, None);
        assert_eq!(fees.range_max, Some(900.0));
    }

    #[test]
    fn test_display_name_prefers_khmer() {
        let record = Institution::new(1, "សាកលវិទ្យាល័យ", "University");
        assert_eq!(record.display_name(), "សាកលវិទ្យាល័យ");

        let mut record = Institution::new(2, "", "Fallback");
        assert_eq!(record.display_name(), "Fallback");
        record.name_en = None;
        assert_eq!(record.display_name(), NOT_AVAILABLE);
    }

    #[test]
    fn test_name_contains_either_field() {
        let record = Institution::new(1, "សាកលវិទ្យាល័យភូមិន្ទ", "Royal University of Phnom Penh");
        assert!(record.name_contains("phnom"));
        assert!(record.name_contains("ភូមិន្ទ"));
        assert!(record.name_contains(""));
        assert!(!record.name_contains("battambang"));

        let blank = Institution::new(3, "", "");
        assert!(!blank.name_contains(""));
        assert!(Institution::new(4, "", "Battambang").name_contains(""));

        let mut nameless = Institution::new(2, "", "");
        nameless.name_km = None;
        nameless.name_en = None;
        assert!(!nameless.name_contains(""));
    }

    #[test]
    fn test_average_tuition() {
        let mut record = Institution::new(1, "a", "b");
        record.tuition_fees = Some(TuitionFees::new(2000.0, 4000.0));
        assert_eq!(record.average_tuition(), 3000.0);

        record.tuition_fees = Some(TuitionFees {
            range_min: None,
            range_max: Some(1000.0),
        });
        assert_eq!(record.average_tuition(), 500.0);
    }

    #[test]
    fn test_match_percentage_is_clamped() {
        let rec = |score: f64| Recommendation {
            institution: Institution::new(1, "a", "b"),
            total_score: score,
        };
        assert_eq!(rec(137.0).match_percentage(), 100);
        assert_eq!(rec(64.4).match_percentage(), 64);
        assert_eq!(rec(-5.0).match_percentage(), 0);
        assert_eq!(rec(f64::INFINITY).match_percentage(), 100);
    }

    #[test]
    fn test_partial_stored_profile_keeps_document() {
        let document: ResultDocument = serde_json::from_value(json!({
            "user_profile": {"location": "Phnom Penh", "max_budget": 1000},
            "recommendations": []
        }))
        .unwrap();
        let profile = document.user_profile.unwrap();
        assert_eq!(profile.location.as_deref(), Some("Phnom Penh"));
        assert_eq!(profile.max_budget, Some(1000));
        assert_eq!(profile.core_field, None);

        let document: ResultDocument =
            serde_json::from_value(json!({"user_profile": "gone", "recommendations": []})).unwrap();
        assert_eq!(document.user_profile, None);
    }

    #[test]
    fn test_recommendation_uses_university_key() {
        let rec: Recommendation = serde_json::from_value(json!({
            "university": {"id": 3, "name_km": "x"},
            "total_score": 55
        }))
        .unwrap();
        assert_eq!(rec.institution.id, 3);
        assert_eq!(rec.total_score, 55.0);
    }
}
