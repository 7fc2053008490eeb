//! Error types and handling
//!
//! This module provides the error type shared by every page controller, the
//! result sources and the bot. All errors implement the `AppErrorExt` trait
//! which provides the notice shown to the user and indicates whether the
//! user can recover by acting again.
//!
//! Every recoverable condition needs a new user action: nothing in this
//! workspace retries on its own.

use thiserror::Error;

use crate::types::RequiredChoice;

/// Trait for EduGuide error extensions
pub trait AppErrorExt {
    /// Returns the notice displayed to the user for this error
    ///
    /// Selection notices are the Khmer literals shown by the pages. The
    /// notice never contains file paths or tokens.
    fn user_hint(&self) -> &str;

    /// Returns whether the error is recoverable
    ///
    /// Recoverable errors leave the page usable: the user can fix the input
    /// and try again. Non-recoverable errors end in a static error view or
    /// abort a command.
    fn is_recoverable(&self) -> bool;
}

/// Main error type
///
/// # Error Categories
///
/// - **Selection**: a guarded transition was attempted without input
/// - **Results**: missing id, unknown result, transport failure
/// - **Dataset / Config**: unreadable or invalid local files
/// - **Host**: the outbound channel refused a payload
///
/// # Examples
///
/// ```
/// use sdk::errors::{AppError, AppErrorExt};
/// use sdk::types::RequiredChoice;
///
/// let error = AppError::MissingSelection(RequiredChoice::Location);
/// assert_eq!(error.user_hint(), "សូមជ្រើសរើសទីតាំង");
/// assert!(error.is_recoverable());
///
/// let fatal_error = AppError::ResultNotFound("abc".to_string());
/// assert!(!fatal_error.is_recoverable());
/// ```
#[derive(Debug, Error)]
pub enum AppError {
    // Selection errors
    #[error("Missing selection: {0}")]
    MissingSelection(RequiredChoice),

    #[error("Profile incomplete: {0} not set")]
    IncompleteProfile(RequiredChoice),

    #[error("No institution selected")]
    NoInstitutionSelected,

    #[error("No institution selected to share")]
    NothingToShare,

    #[error("Unknown institution: {0}")]
    UnknownInstitution(i64),

    #[error("Invalid transition: {0}")]
    InvalidTransition(String),

    // Results errors
    #[error("No result id supplied")]
    MissingResultId,

    #[error("Result not found: {0}")]
    ResultNotFound(String),

    #[error("Network error: {0}")]
    Network(String),

    // Local data errors
    #[error("Dataset error: {0}")]
    Dataset(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Template error: {0}")]
    Template(String),

    // Outbound errors
    #[error("Host channel error: {0}")]
    HostChannel(String),

    #[error("Telegram error: {0}")]
    Telegram(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // Generic IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl AppErrorExt for AppError {
    fn user_hint(&self) -> &str {
        match self {
            // Selection errors
            Self::MissingSelection(choice) => choice.notice(),
            Self::IncompleteProfile(_) => "សូមបំពេញព័ត៌មានទាំងអស់",
            Self::NoInstitutionSelected => "សូមជ្រើសរើសសាកលវិទ្យាល័យ",
            Self::NothingToShare => "សូមជ្រើសរើសសាកលវិទ្យាល័យ និងគណនាមុន",
            Self::UnknownInstitution(_) => "សូមជ្រើសរើសសាកលវិទ្យាល័យ",
            Self::InvalidTransition(_) => "This action is not available right now",

            // Results errors
            Self::MissingResultId => {
                "No result ID found in the URL. Please start from the Telegram bot."
            }
            Self::ResultNotFound(_) | Self::Network(_) => {
                "Error loading recommendations: Result not found"
            }

            // Local data errors
            Self::Dataset(_) => "University data could not be loaded",
            Self::Config(_) => "Check your config.toml file for errors",
            Self::Template(_) => "Page template could not be processed",

            // Outbound errors
            Self::HostChannel(_) => "Could not send data back to the chat",
            Self::Telegram(_) => "Telegram API request failed. Check your token and network",
            Self::Serialization(_) => "Data could not be encoded",

            Self::Io(_) => "File system operation failed",
        }
    }

    fn is_recoverable(&self) -> bool {
        match self {
            // Terminal states: the page shows a static error view
            Self::MissingResultId
            | Self::ResultNotFound(_)
            | Self::Network(_)
            | Self::Config(_)
            | Self::Serialization(_) => false,

            // The user can fix the input and act again
            _ => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selection_notices_are_per_step() {
        assert_eq!(
            AppError::MissingSelection(RequiredChoice::Field).user_hint(),
            "សូមជ្រើសរើសផ្នែកសិក្សា"
        );
        assert_eq!(
            AppError::MissingSelection(RequiredChoice::Career).user_hint(),
            "សូមជ្រើសរើសគោលដៅអាជីព"
        );
    }

    #[test]
    fn test_not_found_and_network_share_a_notice() {
        let not_found = AppError::ResultNotFound("x".to_string());
        let network = AppError::Network("connection refused".to_string());
        assert_eq!(not_found.user_hint(), network.user_hint());
        assert!(!not_found.is_recoverable());
        assert!(!network.is_recoverable());
    }

    #[test]
    fn test_estimator_notices() {
        assert!(AppError::NoInstitutionSelected.is_recoverable());
        assert_ne!(
            AppError::NoInstitutionSelected.user_hint(),
            AppError::NothingToShare.user_hint()
        );
    }

    #[test]
    fn test_display() {
        let err = AppError::IncompleteProfile(RequiredChoice::Career);
        assert_eq!(err.to_string(), "Profile incomplete: career goal not set");
    }
}
