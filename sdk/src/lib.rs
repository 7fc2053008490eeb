//! EduGuide SDK
//!
//! Shared library providing the data model, outbound payloads, error types and
//! the host channel handle used by the page controllers and the bot.

/// Error types and handling
pub mod errors;

/// Dataset and profile types
pub mod types;

/// Tagged payloads sent to the host application
pub mod payload;

/// Host channel handle
pub mod host;

// Re-export commonly used types
pub use errors::{AppError, AppErrorExt};
pub use host::{HostChannelImpl, HostHandle};
pub use payload::HostPayload;
pub use types::{
    Contact, Faculty, Institution, InstitutionId, Major, Recommendation, RequiredChoice,
    ResultDocument, StoredProfile, TuitionFees, UserProfile,
};
