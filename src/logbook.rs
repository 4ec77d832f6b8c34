use log::{debug, info, warn};

use snafu::{prelude::*, Snafu};

use study_logbook::*;

pub mod admin;
pub mod config_reader;
pub mod io_common;
pub mod io_csv;
pub mod io_xlsx;
pub mod participant;
pub mod store;

use crate::logbook::store::Store;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum LogbookError {
    #[snafu(display("Error opening the store {path}"))]
    OpeningStore {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error writing the store {path}"))]
    WritingStore {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("The store is not a valid logbook document"))]
    ParsingStore { source: serde_json::Error },
    #[snafu(display("Error opening file {path}"))]
    OpeningFile {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error parsing JSON"))]
    ParsingJson { source: serde_json::Error },
    #[snafu(display("Error writing CSV"))]
    CsvWrite { source: csv::Error },
    #[snafu(display("Error writing file {path}"))]
    WritingFile {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error opening file {path}"))]
    OpeningExcel {
        source: calamine::XlsxError,
        path: String,
    },
    #[snafu(display("The Excel file does not contain the worksheet"))]
    EmptyExcel {},
    #[snafu(display("The roster does not contain any participant"))]
    EmptyRoster {},

    // Validation of the input
    #[snafu(display("Line {lineno}: expected at least {expected} fields but found {found}"))]
    WrongFieldCount {
        lineno: usize,
        expected: usize,
        found: usize,
    },
    #[snafu(display("The code {code:?} must contain exactly 4 digits"))]
    InvalidCode { code: String },
    #[snafu(display("The code {code} is reserved"))]
    ReservedCode { code: String },
    #[snafu(display("Invalid date {value:?} (expected YYYY-MM-DD)"))]
    InvalidDate {
        source: chrono::ParseError,
        value: String,
    },
    #[snafu(display("{source}"))]
    Questionnaire { source: LogbookErrors },
    #[snafu(display("Day {day} is not open yet"))]
    FutureDay { day: u32 },

    #[snafu(display("The code {code} already exists"))]
    DuplicateCode { code: String },
    #[snafu(display("Invalid code. Check your 4-digit code."))]
    ParticipantNotFound {},

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

pub type LogbookResult<T> = Result<T, LogbookError>;

/// A row of a roster, as parsed by the readers.
/// This is before checking the codes and the dates.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct RosterRow {
    /// The line (or spreadsheet row) number, starting at 1.
    pub lineno: usize,
    pub fields: Vec<String>,
}

/// Everything the screens need, loaded at once.
///
/// A failed load never blocks: it falls back to empty collections and the
/// default settings.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct Snapshot {
    pub participants: Vec<Participant>,
    pub entries: Vec<Entry>,
    pub settings: Settings,
}

impl Snapshot {
    pub fn load(store: &impl Store) -> Snapshot {
        let participants = store.list_participants().unwrap_or_else(|e| {
            warn!("Could not load the participants: {}", e);
            vec![]
        });
        let entries = store.list_entries(None).unwrap_or_else(|e| {
            warn!("Could not load the entries: {}", e);
            vec![]
        });
        let settings = store.get_settings().unwrap_or_else(|e| {
            warn!("Could not load the settings, using the defaults: {}", e);
            Settings::default()
        });
        info!(
            "Loaded {} participants and {} entries",
            participants.len(),
            entries.len()
        );
        debug!("settings: {:?}", settings);
        Snapshot {
            participants,
            entries,
            settings,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logbook::store::JsonStore;

    // A store where every read fails.
    struct BrokenStore {}

    impl Store for BrokenStore {
        fn list_participants(&self) -> LogbookResult<Vec<Participant>> {
            whatever!("connection refused")
        }
        fn find_participant_by_code(&self, _code: &str) -> LogbookResult<Participant> {
            whatever!("connection refused")
        }
        fn create_participant(&mut self, _p: Participant) -> LogbookResult<Participant> {
            whatever!("connection refused")
        }
        fn delete_participant(&mut self, _code: &str) -> LogbookResult<()> {
            whatever!("connection refused")
        }
        fn list_entries(&self, _code: Option<&str>) -> LogbookResult<Vec<Entry>> {
            whatever!("connection refused")
        }
        fn upsert_entry(&mut self, _entry: Entry) -> LogbookResult<Entry> {
            whatever!("connection refused")
        }
        fn get_settings(&self) -> LogbookResult<Settings> {
            whatever!("connection refused")
        }
        fn update_settings(&mut self, _patch: &SettingsPatch) -> LogbookResult<Settings> {
            whatever!("connection refused")
        }
    }

    #[test]
    fn failed_loads_degrade_to_defaults() {
        let snap = Snapshot::load(&BrokenStore {});
        assert_eq!(snap, Snapshot::default());
        assert_eq!(snap.settings.company_name, "Lab Capillaire");
    }

    #[test]
    fn empty_store_has_default_settings() {
        let store = JsonStore::in_memory();
        let snap = Snapshot::load(&store);
        assert!(snap.participants.is_empty());
        assert_eq!(snap.settings, Settings::default());
    }
}
