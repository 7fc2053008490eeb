//! Intake wizard page
//!
//! Step sequencer over `Location → Field → Career → Preferences`, followed
//! by a transient `Loading` view and the terminal `Submitted` state.
//!
//! # Transitions
//!
//! | From          | Command  | Guard                       | To           |
//! |---------------|----------|-----------------------------|--------------|
//! | `Location`    | `Next`   | location chosen             | `Field`      |
//! | `Field`       | `Next`   | field chosen                | `Career`     |
//! | `Career`      | `Next`   | career chosen               | `Preferences`|
//! | `Preferences` | `Submit` | all three choices committed | `Loading`    |
//! | `Loading`     | (delay)  | payload delivered           | `Submitted`  |
//!
//! A failed guard forces the view back to the step that failed and leaves
//! the profile accumulator untouched. A failed submission returns to
//! `Preferences`. No other navigation exists.

use sdk::errors::AppError;
use sdk::host::HostHandle;
use sdk::payload::HostPayload;
use sdk::types::{RequiredChoice, UserProfile};
use std::collections::BTreeSet;
use tracing::{debug, info, warn};

use super::{render_notice, track_notice, PageController};
use crate::config::WizardConfig;
use crate::dataset::Dataset;
use crate::markup::{display_style, escape_html, labels, option};
use crate::recommender::{CAREER_FIELDS, LOCATIONS};

/// Wizard views, in order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum WizardStep {
    Location,
    Field,
    Career,
    /// Budget and proficiency sliders, with the submit button
    Preferences,
    Loading,
    Submitted,
}

impl WizardStep {
    /// Element id of the step container
    pub fn element_id(self) -> &'static str {
        match self {
            Self::Location => "step-location",
            Self::Field => "step-field",
            Self::Career => "step-career",
            Self::Preferences => "step-preferences",
            Self::Loading => "step-loading",
            Self::Submitted => "step-submitted",
        }
    }

    /// The choice guarded by this step's "next" button
    fn required_choice(self) -> Option<RequiredChoice> {
        match self {
            Self::Location => Some(RequiredChoice::Location),
            Self::Field => Some(RequiredChoice::Field),
            Self::Career => Some(RequiredChoice::Career),
            _ => None,
        }
    }

    fn next(self) -> Self {
        match self {
            Self::Location => Self::Field,
            Self::Field => Self::Career,
            Self::Career => Self::Preferences,
            Self::Preferences => Self::Loading,
            Self::Loading | Self::Submitted => Self::Submitted,
        }
    }

    /// Input is frozen once the profile has been handed off
    fn accepts_input(self) -> bool {
        self < Self::Loading
    }
}

/// User actions on the wizard page
#[derive(Debug, Clone, PartialEq)]
pub enum WizardCommand {
    /// Location radio group; `None` clears the selection
    ChooseLocation(Option<String>),
    /// Field selector; `None` is the placeholder option
    ChooseField(Option<String>),
    /// Career radio group
    ChooseCareer(Option<String>),
    SetBudget(u32),
    SetProficiency(u32),
    /// "Next" button of the visible step
    Next,
    Submit,
}

/// In-progress profile accumulator
///
/// Choices are committed only when their step's guard passes; sliders
/// update it on every change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileDraft {
    pub location: Option<String>,
    pub max_budget: u32,
    pub core_field: Option<String>,
    pub career_goal: Option<String>,
    pub english_proficiency: u8,
}

impl ProfileDraft {
    pub fn new(max_budget: u32, english_proficiency: u8) -> Self {
        Self {
            location: None,
            max_budget,
            core_field: None,
            career_goal: None,
            english_proficiency,
        }
    }

    /// First required choice that has not been committed
    pub fn missing(&self) -> Option<RequiredChoice> {
        RequiredChoice::ALL
            .into_iter()
            .find(|choice| self.choice(*choice).is_none())
    }

    fn choice(&self, choice: RequiredChoice) -> Option<&str> {
        let value = match choice {
            RequiredChoice::Location => &self.location,
            RequiredChoice::Field => &self.core_field,
            RequiredChoice::Career => &self.career_goal,
        };
        value.as_deref().filter(|v| !v.is_empty())
    }

    fn commit(&mut self, choice: RequiredChoice, value: String) {
        match choice {
            RequiredChoice::Location => self.location = Some(value),
            RequiredChoice::Field => self.core_field = Some(value),
            RequiredChoice::Career => self.career_goal = Some(value),
        }
    }

    /// The completed profile, or the first missing choice
    pub fn complete(&self) -> Result<UserProfile, AppError> {
        if let Some(choice) = self.missing() {
            return Err(AppError::IncompleteProfile(choice));
        }
        Ok(UserProfile {
            location: self.location.clone().unwrap_or_default(),
            max_budget: self.max_budget,
            core_field: self.core_field.clone().unwrap_or_default(),
            career_goal: self.career_goal.clone().unwrap_or_default(),
            english_proficiency: self.english_proficiency,
        })
    }
}

/// Choices offered on the three selection steps
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WizardOptions {
    pub locations: Vec<String>,
    pub fields: Vec<String>,
    pub careers: Vec<String>,
}

impl WizardOptions {
    /// Fixed locations and careers; fields are the major categories in the dataset
    pub fn from_dataset(dataset: &Dataset) -> Self {
        let fields: BTreeSet<String> = dataset
            .records()
            .iter()
            .flat_map(|r| r.majors())
            .filter_map(|m| m.category_km.clone())
            .filter(|c| !c.is_empty())
            .collect();

        Self {
            locations: LOCATIONS.iter().map(|l| l.to_string()).collect(),
            fields: fields.into_iter().collect(),
            careers: CAREER_FIELDS.iter().map(|(c, _)| c.to_string()).collect(),
        }
    }
}

/// Intake wizard state
pub struct IntakeWizard {
    host: HostHandle,
    config: WizardConfig,
    options: WizardOptions,
    visible: WizardStep,
    location_choice: Option<String>,
    field_choice: Option<String>,
    career_choice: Option<String>,
    draft: ProfileDraft,
    /// Profile captured at submission, delivered after the loading delay
    pending: Option<UserProfile>,
    notice: Option<String>,
}

impl IntakeWizard {
    pub fn new(host: HostHandle, config: WizardConfig, options: WizardOptions) -> Self {
        let draft = ProfileDraft::new(
            config.budget.clamp(config.budget.default),
            to_score(config.proficiency.clamp(config.proficiency.default)),
        );
        Self {
            host,
            config,
            options,
            visible: WizardStep::Location,
            location_choice: None,
            field_choice: None,
            career_choice: None,
            draft,
            pending: None,
            notice: None,
        }
    }

    pub fn visible_step(&self) -> WizardStep {
        self.visible
    }

    pub fn draft(&self) -> &ProfileDraft {
        &self.draft
    }

    fn ensure_input(&self) -> Result<(), AppError> {
        if self.visible.accepts_input() {
            Ok(())
        } else {
            Err(AppError::InvalidTransition(format!(
                "input is closed in step {:?}",
                self.visible
            )))
        }
    }

    fn selection(&self, choice: RequiredChoice) -> Option<&String> {
        match choice {
            RequiredChoice::Location => self.location_choice.as_ref(),
            RequiredChoice::Field => self.field_choice.as_ref(),
            RequiredChoice::Career => self.career_choice.as_ref(),
        }
    }

    fn choose(&mut self, choice: RequiredChoice, value: Option<String>) -> Result<(), AppError> {
        self.ensure_input()?;
        let value = value.filter(|v| !v.is_empty());
        match choice {
            RequiredChoice::Location => self.location_choice = value,
            RequiredChoice::Field => self.field_choice = value,
            RequiredChoice::Career => self.career_choice = value,
        }
        Ok(())
    }

    /// Advance from the visible step if its selection exists
    fn next(&mut self) -> Result<(), AppError> {
        let step = self.visible;
        let choice = step.required_choice().ok_or_else(|| {
            AppError::InvalidTransition(format!("no next step from {:?}", step))
        })?;

        match self.selection(choice).cloned() {
            Some(value) => {
                self.draft.commit(choice, value);
                self.visible = step.next();
                debug!("Wizard {:?} -> {:?}", step, self.visible);
                Ok(())
            }
            None => {
                self.visible = step;
                warn!("Wizard guard rejected {:?}: no {}", step, choice);
                Err(AppError::MissingSelection(choice))
            }
        }
    }

    /// Final guard, then switch to the loading view
    fn begin_submit(&mut self) -> Result<(), AppError> {
        if self.visible != WizardStep::Preferences {
            return Err(AppError::InvalidTransition(format!(
                "cannot submit from {:?}",
                self.visible
            )));
        }

        match self.draft.complete() {
            Ok(profile) => {
                self.pending = Some(profile);
                self.visible = WizardStep::Loading;
                debug!("Wizard submitted, loading");
                Ok(())
            }
            Err(e) => {
                self.visible = WizardStep::Preferences;
                warn!("Wizard final guard rejected submission: {}", e);
                Err(e)
            }
        }
    }

    /// Deliver the captured profile after the loading delay
    pub async fn finish_loading(&mut self) -> Result<HostPayload, AppError> {
        let profile = match (&self.pending, self.visible) {
            (Some(profile), WizardStep::Loading) => profile.clone(),
            _ => {
                return Err(AppError::InvalidTransition(
                    "nothing is waiting to be delivered".to_string(),
                ))
            }
        };

        tokio::time::sleep(self.config.loading_delay()).await;

        let payload = HostPayload::UniversityRecommendations {
            user_profile: profile,
        };
        let sent = self.host.send(&payload);
        track_notice(&mut self.notice, sent)?;

        self.pending = None;
        self.visible = WizardStep::Submitted;
        info!("Wizard profile delivered");
        Ok(payload)
    }

    /// Submit and deliver in one go
    pub async fn submit(&mut self) -> Result<HostPayload, AppError> {
        self.apply(WizardCommand::Submit)?;
        self.finish_loading().await
    }

    fn render_radio_group(&self, name: &str, values: &[String], selected: Option<&String>) -> String {
        values
            .iter()
            .map(|value| {
                format!(
                    r#"<label class="option"><input type="radio" name="{}" value="{v}"{}> {v}</label>"#,
                    name,
                    if selected == Some(value) { " checked" } else { "" },
                    v = escape_html(value)
                )
            })
            .collect()
    }

    fn render_step(&self, step: WizardStep, body: &str) -> String {
        format!(
            r#"<div class="quiz-step" id="{}" {}>{}</div>"#,
            step.element_id(),
            display_style(self.visible == step, "block"),
            body
        )
    }
}

impl PageController for IntakeWizard {
    type Command = WizardCommand;

    fn apply(&mut self, command: WizardCommand) -> Result<(), AppError> {
        let result = match command {
            WizardCommand::ChooseLocation(value) => self.choose(RequiredChoice::Location, value),
            WizardCommand::ChooseField(value) => self.choose(RequiredChoice::Field, value),
            WizardCommand::ChooseCareer(value) => self.choose(RequiredChoice::Career, value),
            WizardCommand::SetBudget(value) => self.ensure_input().map(|_| {
                self.draft.max_budget = self.config.budget.clamp(value);
            }),
            WizardCommand::SetProficiency(value) => self.ensure_input().map(|_| {
                self.draft.english_proficiency = to_score(self.config.proficiency.clamp(value));
            }),
            WizardCommand::Next => self.next(),
            WizardCommand::Submit => self.begin_submit(),
        };
        track_notice(&mut self.notice, result)
    }

    fn render(&self) -> String {
        let location = format!(
            "<h2>{}</h2>{}<button class=\"next-btn location-next\">{}</button>",
            labels::LOCATION_QUESTION,
            self.render_radio_group("location", &self.options.locations, self.location_choice.as_ref()),
            labels::NEXT
        );

        let mut fields = option("", labels::PICK_CATEGORY, self.field_choice.is_none());
        for field in &self.options.fields {
            fields.push_str(&option(field, field, self.field_choice.as_ref() == Some(field)));
        }
        let field = format!(
            "<h2>{}</h2><select id=\"field-select\">{}</select><button class=\"next-btn field-next\">{}</button>",
            labels::FIELD_QUESTION,
            fields,
            labels::NEXT
        );

        let career = format!(
            "<h2>{}</h2>{}<button class=\"next-btn career-next\">{}</button>",
            labels::CAREER_QUESTION,
            self.render_radio_group("career", &self.options.careers, self.career_choice.as_ref()),
            labels::NEXT
        );

        let preferences = format!(
            r#"<label>{}: <span id="budget-display">${}</span></label><input type="range" id="budget-range" min="{}" max="{}" value="{}"><label>{}: <span id="english-display">{}</span></label><input type="range" id="english-range" min="{}" max="{}" value="{}"><button id="submit-quiz">{}</button>"#,
            labels::BUDGET,
            self.draft.max_budget,
            self.config.budget.min,
            self.config.budget.max,
            self.draft.max_budget,
            labels::ENGLISH_LEVEL,
            self.draft.english_proficiency,
            self.config.proficiency.min,
            self.config.proficiency.max,
            self.draft.english_proficiency,
            labels::SUBMIT
        );

        let loading = format!(r#"<div class="spinner"></div><p>{}</p>"#, labels::LOADING);

        [
            render_notice(self.notice()),
            self.render_step(WizardStep::Location, &location),
            self.render_step(WizardStep::Field, &field),
            self.render_step(WizardStep::Career, &career),
            self.render_step(WizardStep::Preferences, &preferences),
            self.render_step(WizardStep::Loading, &loading),
        ]
        .concat()
    }

    fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }
}

fn to_score(value: u32) -> u8 {
    u8::try_from(value).unwrap_or(u8::MAX)
}
