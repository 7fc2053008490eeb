//! Page controllers
//!
//! Each page is an explicit state object built once at page initialization.
//! User actions arrive as discrete commands; a command either succeeds and
//! updates the state, or is rejected with an [`AppError`] whose
//! `user_hint()` becomes the blocking notice. Rendering is a pure function
//! of the current state.
//!
//! Controllers share no state with each other. The only things they have in
//! common are the institution record shape and the host payload type.

use sdk::errors::{AppError, AppErrorExt};

pub mod directory;
pub mod estimator;
pub mod results;
pub mod wizard;

pub use directory::{DirectoryCommand, DirectoryPage};
pub use estimator::{EstimatorCommand, EstimatorPage, Projection};
pub use results::{PageQuery, ResultsCommand, ResultsPage, ResultsView, RESULTS_DIR};
pub use wizard::{IntakeWizard, ProfileDraft, WizardCommand, WizardOptions, WizardStep};

/// Common surface of the page controllers
pub trait PageController {
    /// Commands understood by this page
    type Command;

    /// Apply one user action
    fn apply(&mut self, command: Self::Command) -> Result<(), AppError>;

    /// Render the whole page body from the current state
    fn render(&self) -> String;

    /// Notice raised by the last rejected command, if any
    fn notice(&self) -> Option<&str>;
}

/// Record an outcome in a page's notice slot
///
/// A rejection stores its user hint; a success clears the previous notice.
pub(crate) fn track_notice<T>(
    slot: &mut Option<String>,
    result: Result<T, AppError>,
) -> Result<T, AppError> {
    match &result {
        Ok(_) => *slot = None,
        Err(e) => *slot = Some(e.user_hint().to_string()),
    }
    result
}

/// Blocking notice markup, empty when there is nothing to show
pub(crate) fn render_notice(notice: Option<&str>) -> String {
    match notice {
        Some(text) => format!(
            r#"<div class="notice" role="alert">{}</div>"#,
            crate::markup::escape_html(text)
        ),
        None => String::new(),
    }
}
