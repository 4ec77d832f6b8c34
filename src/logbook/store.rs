// The persistence of the participants, the entries and the settings.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::logbook::*;

/// The operations the logbook needs from its backend.
///
/// Implementations hold whole records: no computation is pushed to the store.
pub trait Store {
    fn list_participants(&self) -> LogbookResult<Vec<Participant>>;

    /// Fails with `ParticipantNotFound` when no participant has this code.
    fn find_participant_by_code(&self, code: &str) -> LogbookResult<Participant>;

    /// Fails with `DuplicateCode` when the code is already used.
    fn create_participant(&mut self, participant: Participant) -> LogbookResult<Participant>;

    /// Deletes the participant and all their entries.
    fn delete_participant(&mut self, code: &str) -> LogbookResult<()>;

    /// All the entries, or only the ones of one participant.
    fn list_entries(&self, participant_code: Option<&str>) -> LogbookResult<Vec<Entry>>;

    /// Inserts the entry, or replaces the entry for the same participant and day.
    /// Fails with `Questionnaire` when the day is outside the study.
    fn upsert_entry(&mut self, entry: Entry) -> LogbookResult<Entry>;

    /// The stored settings, or the defaults when nothing is stored.
    fn get_settings(&self) -> LogbookResult<Settings>;

    fn update_settings(&mut self, patch: &SettingsPatch) -> LogbookResult<Settings>;
}

#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
struct StoreDocument {
    #[serde(default)]
    participants: Vec<Participant>,
    #[serde(default)]
    entries: Vec<Entry>,
    settings: Option<Settings>,
}

/// A store kept in memory and written to a JSON document after each change.
///
/// Without a path, nothing is written (this is what the tests use).
#[derive(Debug)]
pub struct JsonStore {
    path: Option<PathBuf>,
    doc: StoreDocument,
}

impl JsonStore {
    pub fn in_memory() -> JsonStore {
        JsonStore {
            path: None,
            doc: StoreDocument::default(),
        }
    }

    /// Opens the store at this location. A missing file is an empty store.
    pub fn open(path: &Path) -> LogbookResult<JsonStore> {
        let path_s = path.display().to_string();
        let doc = if path.exists() {
            info!("Opening store {:?}", path_s);
            let contents = fs::read_to_string(path).context(OpeningStoreSnafu {
                path: path_s.clone(),
            })?;
            serde_json::from_str(contents.as_str()).context(ParsingStoreSnafu {})?
        } else {
            info!("Store {:?} does not exist yet, starting empty", path_s);
            StoreDocument::default()
        };
        Ok(JsonStore {
            path: Some(path.to_path_buf()),
            doc,
        })
    }

    fn save(&self) -> LogbookResult<()> {
        if let Some(path) = &self.path {
            let path_s = path.display().to_string();
            let contents =
                serde_json::to_string_pretty(&self.doc).context(ParsingStoreSnafu {})?;
            fs::write(path, contents).context(WritingStoreSnafu { path: path_s })?;
            debug!("save: wrote {:?}", path);
        }
        Ok(())
    }
}

impl Store for JsonStore {
    fn list_participants(&self) -> LogbookResult<Vec<Participant>> {
        Ok(self.doc.participants.clone())
    }

    fn find_participant_by_code(&self, code: &str) -> LogbookResult<Participant> {
        self.doc
            .participants
            .iter()
            .find(|p| p.code == code)
            .cloned()
            .context(ParticipantNotFoundSnafu {})
    }

    fn create_participant(&mut self, participant: Participant) -> LogbookResult<Participant> {
        ensure!(
            is_valid_code(&participant.code),
            InvalidCodeSnafu {
                code: participant.code.clone()
            }
        );
        ensure!(
            !self.doc.participants.iter().any(|p| p.code == participant.code),
            DuplicateCodeSnafu {
                code: participant.code.clone()
            }
        );
        self.doc.participants.push(participant.clone());
        self.save()?;
        Ok(participant)
    }

    fn delete_participant(&mut self, code: &str) -> LogbookResult<()> {
        let before = self.doc.participants.len();
        self.doc.participants.retain(|p| p.code != code);
        ensure!(
            self.doc.participants.len() < before,
            ParticipantNotFoundSnafu {}
        );
        let entries_before = self.doc.entries.len();
        self.doc.entries.retain(|e| e.participant_code != code);
        info!(
            "Deleted participant {} and {} entries",
            code,
            entries_before - self.doc.entries.len()
        );
        self.save()
    }

    fn list_entries(&self, participant_code: Option<&str>) -> LogbookResult<Vec<Entry>> {
        Ok(self
            .doc
            .entries
            .iter()
            .filter(|e| participant_code.map_or(true, |c| e.participant_code == c))
            .cloned()
            .collect())
    }

    fn upsert_entry(&mut self, entry: Entry) -> LogbookResult<Entry> {
        check_day(entry.day).context(QuestionnaireSnafu {})?;
        let existing = self
            .doc
            .entries
            .iter_mut()
            .find(|e| e.participant_code == entry.participant_code && e.day == entry.day);
        match existing {
            Some(e) => {
                debug!(
                    "upsert_entry: replacing day {} of {}",
                    entry.day, entry.participant_code
                );
                *e = entry.clone();
            }
            None => {
                self.doc.entries.push(entry.clone());
            }
        }
        self.save()?;
        Ok(entry)
    }

    fn get_settings(&self) -> LogbookResult<Settings> {
        Ok(self.doc.settings.clone().unwrap_or_default())
    }

    fn update_settings(&mut self, patch: &SettingsPatch) -> LogbookResult<Settings> {
        let updated = self.get_settings()?.apply(patch);
        self.doc.settings = Some(updated.clone());
        self.save()?;
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone, Utc};

    fn participant(code: &str) -> Participant {
        Participant {
            code: code.to_string(),
            first_name: "Marie".to_string(),
            last_name: "Dupont".to_string(),
            email: "marie@example.com".to_string(),
            phone: "0612345678".to_string(),
            start_date: NaiveDate::from_ymd_opt(2025, 12, 6),
        }
    }

    fn entry(code: &str, day: u32, intensity: u8) -> Entry {
        let mut answers = Questionnaire::default();
        answers.has_odor = Some(true);
        answers.odor_intensity = Some(intensity);
        Entry {
            participant_code: code.to_string(),
            day,
            date: Utc.with_ymd_and_hms(2025, 12, 6, 9, 0, 0).unwrap(),
            status: EntryStatus::Complete,
            answers,
        }
    }

    #[test]
    fn create_and_find() {
        let mut store = JsonStore::in_memory();
        store.create_participant(participant("1234")).unwrap();
        assert_eq!(
            store.find_participant_by_code("1234").unwrap().first_name,
            "Marie"
        );
        assert!(matches!(
            store.find_participant_by_code("5678"),
            Err(LogbookError::ParticipantNotFound {})
        ));
        assert!(matches!(
            store.create_participant(participant("1234")),
            Err(LogbookError::DuplicateCode { .. })
        ));
        assert!(matches!(
            store.create_participant(participant("12a4")),
            Err(LogbookError::InvalidCode { .. })
        ));
    }

    #[test]
    fn upsert_replaces_the_same_day() {
        let mut store = JsonStore::in_memory();
        store.upsert_entry(entry("1234", 1, 3)).unwrap();
        store.upsert_entry(entry("1234", 2, 4)).unwrap();
        store.upsert_entry(entry("1234", 1, 9)).unwrap();
        store.upsert_entry(entry("5678", 1, 2)).unwrap();
        let entries = store.list_entries(Some("1234")).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].answers.odor_intensity, Some(9));
        assert_eq!(store.list_entries(None).unwrap().len(), 3);
    }

    #[test]
    fn days_outside_the_study_are_refused() {
        let mut store = JsonStore::in_memory();
        for day in [0, 29] {
            assert!(matches!(
                store.upsert_entry(entry("1234", day, 3)),
                Err(LogbookError::Questionnaire {
                    source: LogbookErrors::InvalidDay(d)
                }) if d == day
            ));
        }
        store.upsert_entry(entry("1234", 28, 3)).unwrap();
        assert_eq!(store.list_entries(None).unwrap().len(), 1);
    }

    #[test]
    fn delete_cascades_to_entries() {
        let mut store = JsonStore::in_memory();
        store.create_participant(participant("1234")).unwrap();
        store.create_participant(participant("5678")).unwrap();
        store.upsert_entry(entry("1234", 1, 3)).unwrap();
        store.upsert_entry(entry("5678", 1, 3)).unwrap();
        store.delete_participant("1234").unwrap();
        assert_eq!(store.list_participants().unwrap().len(), 1);
        let entries = store.list_entries(None).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].participant_code, "5678");
        assert!(matches!(
            store.delete_participant("1234"),
            Err(LogbookError::ParticipantNotFound {})
        ));
    }

    #[test]
    fn settings_patch() {
        let mut store = JsonStore::in_memory();
        assert_eq!(store.get_settings().unwrap(), Settings::default());
        let patch = SettingsPatch {
            company_name: Some("Institut".to_string()),
            show_progress_bar: Some(false),
            ..Default::default()
        };
        let s = store.update_settings(&patch).unwrap();
        assert_eq!(s.company_name, "Institut");
        assert!(!s.show_progress_bar);
        assert_eq!(s.primary_color, "#3b82f6");
        assert_eq!(store.get_settings().unwrap(), s);
    }

    #[test]
    fn reads_legacy_documents() {
        // Entries without status are complete, settings missing fields get defaults.
        let js = r#"{
            "participants": [{"code": "1234", "firstName": "Marie", "lastName": "Dupont",
                "email": "", "phone": "", "startDate": "2025-12-06"}],
            "entries": [{"participantCode": "1234", "day": 1, "date": "2025-12-06T09:00:00Z",
                "hasOdor": false, "odorIntensity": null, "hasSymptoms": null,
                "itching": null, "irritation": null, "redness": null, "dryness": null,
                "otherCause": null, "washedHair": true}],
            "settings": {"companyName": "Institut"}
        }"#;
        let doc: StoreDocument = serde_json::from_str(js).unwrap();
        assert_eq!(doc.entries[0].status, EntryStatus::Complete);
        assert!(doc.entries[0].answers.odor_causes.is_empty());
        let settings = doc.settings.unwrap();
        assert_eq!(settings.company_name, "Institut");
        assert!(settings.allow_retroactive);
    }
}
