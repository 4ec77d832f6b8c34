// ********* Records ***********

use std::error::Error;
use std::fmt::Display;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// The number of days in a study window.
pub const STUDY_DAYS: u32 = 28;

/// The named causes of odor a participant can select in the questionnaire.
/// The order is the order of the columns in the exports.
pub const ODOR_CAUSES: [&str; 6] = [
    "Transpiration excessive",
    "Port de foulard/hijab",
    "Shampooing peu fréquent",
    "Excès de sébum",
    "Changements hormonaux",
    "Produit inapproprié",
];

/// The cause that unlocks the free-text field.
pub const OTHER_CAUSE: &str = "Autre";

/// Returns true if the code is exactly 4 ASCII digits.
pub fn is_valid_code(code: &str) -> bool {
    code.len() == 4 && code.chars().all(|c| c.is_ascii_digit())
}

/// Returns true if the cause belongs to the vocabulary (including the "Autre" sentinel).
pub fn is_known_cause(cause: &str) -> bool {
    cause == OTHER_CAUSE || ODOR_CAUSES.contains(&cause)
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct Participant {
    pub code: String,
    #[serde(rename = "firstName")]
    pub first_name: String,
    #[serde(rename = "lastName")]
    pub last_name: String,
    pub email: String,
    pub phone: String,
    /// Day 1 of the study window. When missing, the study start date from the
    /// settings is used.
    #[serde(rename = "startDate")]
    pub start_date: Option<NaiveDate>,
}

impl Participant {
    pub fn start_date_or(&self, settings: &Settings) -> NaiveDate {
        self.start_date.unwrap_or(settings.study_start_date)
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Copy, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum EntryStatus {
    Draft,
    /// Rows written before the status column existed are complete.
    #[default]
    Complete,
}

/// The answers to the daily questionnaire.
///
/// The default value is the blank form: every yes/no question is unanswered,
/// the odor intensity slider sits in the middle and the severities at zero.
#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct Questionnaire {
    #[serde(rename = "hasOdor")]
    pub has_odor: Option<bool>,
    #[serde(rename = "odorIntensity")]
    pub odor_intensity: Option<u8>,
    #[serde(rename = "odorCauses", default)]
    pub odor_causes: Vec<String>,
    #[serde(rename = "otherCause")]
    pub other_cause: Option<String>,
    #[serde(rename = "hasSymptoms")]
    pub has_symptoms: Option<bool>,
    pub itching: Option<u8>,
    pub irritation: Option<u8>,
    pub redness: Option<u8>,
    pub dryness: Option<u8>,
    #[serde(rename = "washedHair")]
    pub washed_hair: Option<bool>,
}

impl Default for Questionnaire {
    fn default() -> Self {
        Questionnaire {
            has_odor: None,
            odor_intensity: Some(5),
            odor_causes: Vec::new(),
            other_cause: None,
            has_symptoms: None,
            itching: Some(0),
            irritation: Some(0),
            redness: Some(0),
            dryness: Some(0),
            washed_hair: None,
        }
    }
}

impl Questionnaire {
    pub fn has_cause(&self, cause: &str) -> bool {
        self.odor_causes.iter().any(|c| c == cause)
    }
}

/// One response of one participant for one study day.
///
/// There is at most one entry per (participant_code, day) pair.
#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct Entry {
    #[serde(rename = "participantCode")]
    pub participant_code: String,
    pub day: u32,
    /// Submission timestamp
    pub date: DateTime<Utc>,
    #[serde(default)]
    pub status: EntryStatus,
    #[serde(flatten)]
    pub answers: Questionnaire,
}

impl Entry {
    pub fn is_complete(&self) -> bool {
        self.status == EntryStatus::Complete
    }
}

// ********* Settings **********

fn default_study_start_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 12, 6).unwrap_or_default()
}

fn default_true() -> bool {
    true
}

fn default_company_name() -> String {
    "Lab Capillaire".to_string()
}

fn default_primary_color() -> String {
    "#3b82f6".to_string()
}

/// The study-wide configuration.
///
/// Missing fields take their default value, and an empty store yields
/// `Settings::default()`.
#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    #[serde(rename = "studyStartDate", default = "default_study_start_date")]
    pub study_start_date: NaiveDate,
    #[serde(rename = "showProgressBar", default = "default_true")]
    pub show_progress_bar: bool,
    #[serde(rename = "companyName", default = "default_company_name")]
    pub company_name: String,
    #[serde(rename = "primaryColor", default = "default_primary_color")]
    pub primary_color: String,
    /// Not enforced: missed days can always be filled in.
    #[serde(rename = "allowRetroactive", default = "default_true")]
    pub allow_retroactive: bool,
    /// Not enforced.
    #[serde(rename = "autoComplete", default = "default_true")]
    pub auto_complete: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            study_start_date: default_study_start_date(),
            show_progress_bar: true,
            company_name: default_company_name(),
            primary_color: default_primary_color(),
            allow_retroactive: true,
            auto_complete: true,
        }
    }
}

/// A partial update of the settings. Only the fields that are set are changed.
#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct SettingsPatch {
    #[serde(rename = "studyStartDate")]
    pub study_start_date: Option<NaiveDate>,
    #[serde(rename = "showProgressBar")]
    pub show_progress_bar: Option<bool>,
    #[serde(rename = "companyName")]
    pub company_name: Option<String>,
    #[serde(rename = "primaryColor")]
    pub primary_color: Option<String>,
    #[serde(rename = "allowRetroactive")]
    pub allow_retroactive: Option<bool>,
    #[serde(rename = "autoComplete")]
    pub auto_complete: Option<bool>,
}

impl Settings {
    pub fn apply(&self, patch: &SettingsPatch) -> Settings {
        Settings {
            study_start_date: patch.study_start_date.unwrap_or(self.study_start_date),
            show_progress_bar: patch.show_progress_bar.unwrap_or(self.show_progress_bar),
            company_name: patch
                .company_name
                .clone()
                .unwrap_or_else(|| self.company_name.clone()),
            primary_color: patch
                .primary_color
                .clone()
                .unwrap_or_else(|| self.primary_color.clone()),
            allow_retroactive: patch.allow_retroactive.unwrap_or(self.allow_retroactive),
            auto_complete: patch.auto_complete.unwrap_or(self.auto_complete),
        }
    }
}

// ******** Output data structures *********

/// The state of one day in the calendar of a participant.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub enum DayStatus {
    Completed,
    Current,
    Missed,
    Future,
}

impl DayStatus {
    /// Future days cannot be opened.
    pub fn is_interactive(&self) -> bool {
        !matches!(self, DayStatus::Future)
    }
}

impl Display for DayStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            DayStatus::Completed => "completed",
            DayStatus::Current => "current",
            DayStatus::Missed => "missed",
            DayStatus::Future => "future",
        };
        write!(f, "{}", s)
    }
}

/// Errors raised by the rules of the study.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum LogbookErrors {
    /// A day outside of 1..=28
    InvalidDay(u32),
    /// A participant code that is not exactly 4 digits
    InvalidCode(String),
    /// An answer outside of its scale
    OutOfRange {
        field: &'static str,
        value: u8,
    },
    UnknownCause(String),
}

impl Error for LogbookErrors {}

impl Display for LogbookErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogbookErrors::InvalidDay(day) => {
                write!(f, "day {} is outside of the study (1-{})", day, STUDY_DAYS)
            }
            LogbookErrors::InvalidCode(code) => {
                write!(f, "code {:?} must contain exactly 4 digits", code)
            }
            LogbookErrors::OutOfRange { field, value } => {
                write!(f, "{} cannot be {}", field, value)
            }
            LogbookErrors::UnknownCause(cause) => write!(f, "unknown odor cause {:?}", cause),
        }
    }
}
