//! Tagged payloads sent to the host application
//!
//! Each page returns at most one payload per completion event. The `action`
//! field is the discriminant; the remaining fields depend on the action.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::errors::AppError;
use crate::types::{InstitutionId, UserProfile};

/// Outbound payload handed to the host channel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum HostPayload {
    /// Directory detail overlay "share" button
    #[serde(alias = "share_university")]
    ShareInstitution { id: InstitutionId, name: String },

    /// Estimator "share" button
    ///
    /// The older calculator tag carried display strings such as `"$5,850"`;
    /// those are read back as whole numbers.
    #[serde(alias = "share_calculation")]
    ShareEstimate {
        #[serde(alias = "university_id")]
        institution_id: InstitutionId,
        #[serde(alias = "university_name")]
        institution_name: String,
        #[serde(alias = "major")]
        category_label: String,
        #[serde(deserialize_with = "whole_amount")]
        yearly_cost: i64,
        #[serde(deserialize_with = "whole_amount")]
        total_cost: i64,
        #[serde(deserialize_with = "whole_amount")]
        years: u8,
    },

    /// Intake wizard completion
    #[serde(rename = "university_recommendations")]
    UniversityRecommendations { user_profile: UserProfile },
}

impl HostPayload {
    /// The `action` discriminant as written on the wire
    pub fn action(&self) -> &'static str {
        match self {
            Self::ShareInstitution { .. } => "share_institution",
            Self::ShareEstimate { .. } => "share_estimate",
            Self::UniversityRecommendations { .. } => "university_recommendations",
        }
    }

    /// Encode as the JSON string handed to the host
    pub fn to_json(&self) -> Result<String, AppError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Decode a JSON string received from a page
    pub fn from_json(data: &str) -> Result<Self, AppError> {
        Ok(serde_json::from_str(data)?)
    }
}

/// Accept a JSON number or a formatted amount like `"$1,200"`
fn whole_amount<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: TryFrom<i64>,
{
    let number = match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_f64(),
        Value::String(text) => {
            let digits: String = text
                .chars()
                .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
                .collect();
            digits.parse::<f64>().ok()
        }
        _ => None,
    };
    number
        .filter(|n| n.is_finite())
        .and_then(|n| T::try_from(n.round() as i64).ok())
        .ok_or_else(|| D::Error::custom("expected a whole amount"))
}
