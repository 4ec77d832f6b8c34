// The operations of the administration panel.

use std::collections::HashSet;
use std::fmt::Display;

use chrono::{NaiveDate, TimeZone};

use study_logbook::stats::{participant_progress, study_stats, ParticipantProgress, StudyStats};

use crate::logbook::{
    io_common::{export_file_name, start_date_or},
    io_csv::{export_csv, CODE_COLUMN},
    store::Store,
    *,
};

/// The minimum number of cells of a roster row. The start date may be omitted.
pub const MIN_ROSTER_FIELDS: usize = 5;

/// The outcome of a bulk import.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Default)]
pub struct ImportSummary {
    pub created: u32,
    /// Rows whose code was already used
    pub ignored: u32,
    pub errors: u32,
}

/// The fields typed in the "new participant" form.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct NewParticipant {
    pub code: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub start_date: Option<NaiveDate>,
}

/// Adds one participant. Any problem is reported right away.
pub fn add_participant(
    store: &mut impl Store,
    new: NewParticipant,
    admin_code: &str,
) -> LogbookResult<Participant> {
    let code = new.code.trim().to_string();
    ensure!(is_valid_code(&code), InvalidCodeSnafu { code });
    ensure!(code != admin_code, ReservedCodeSnafu { code });
    let existing = store.list_participants()?;
    ensure!(
        !existing.iter().any(|p| p.code == code),
        DuplicateCodeSnafu { code }
    );
    let settings = store.get_settings()?;
    let participant = Participant {
        code,
        first_name: new.first_name.trim().to_string(),
        last_name: new.last_name.trim().to_string(),
        email: new.email.trim().to_string(),
        phone: new.phone.trim().to_string(),
        start_date: Some(new.start_date.unwrap_or(settings.study_start_date)),
    };
    let created = store.create_participant(participant)?;
    info!("Added participant {} ({})", created.code, created.full_name());
    Ok(created)
}

/// Removes a participant together with all their entries.
pub fn delete_participant(store: &mut impl Store, code: &str) -> LogbookResult<()> {
    store.delete_participant(code)
}

/// Imports a roster, one row after the other.
///
/// A row that fails is counted and the import goes on with the next one. The
/// codes created by earlier rows of the same batch count as already used, and
/// the administrator code is never given to a participant.
pub fn import_roster(
    store: &mut impl Store,
    rows: &[RosterRow],
    default_start: NaiveDate,
    admin_code: &str,
) -> LogbookResult<ImportSummary> {
    ensure!(!rows.is_empty(), EmptyRosterSnafu {});
    let mut known: HashSet<String> = store
        .list_participants()?
        .into_iter()
        .map(|p| p.code)
        .collect();

    let mut summary = ImportSummary::default();
    for row in rows.iter() {
        if row.fields.len() > CODE_COLUMN && known.contains(row.fields[CODE_COLUMN].as_str()) {
            debug!(
                "import_roster: line {}: code {} already exists",
                row.lineno, row.fields[CODE_COLUMN]
            );
            summary.ignored += 1;
            continue;
        }
        let created = participant_from_row(row, default_start, admin_code)
            .and_then(|p| store.create_participant(p));
        match created {
            Ok(p) => {
                debug!("import_roster: line {}: created {}", row.lineno, p.code);
                known.insert(p.code);
                summary.created += 1;
            }
            Err(LogbookError::DuplicateCode { code }) => {
                debug!("import_roster: line {}: code {} taken", row.lineno, code);
                known.insert(code);
                summary.ignored += 1;
            }
            Err(e) => {
                warn!("import_roster: line {}: {}", row.lineno, e);
                summary.errors += 1;
            }
        }
    }
    info!(
        "Import finished: {} created, {} ignored, {} errors",
        summary.created, summary.ignored, summary.errors
    );
    Ok(summary)
}

fn participant_from_row(
    row: &RosterRow,
    default_start: NaiveDate,
    admin_code: &str,
) -> LogbookResult<Participant> {
    let f = &row.fields;
    ensure!(
        f.len() >= MIN_ROSTER_FIELDS,
        WrongFieldCountSnafu {
            lineno: row.lineno,
            expected: MIN_ROSTER_FIELDS,
            found: f.len()
        }
    );
    let code = f[CODE_COLUMN].clone();
    ensure!(is_valid_code(&code), InvalidCodeSnafu { code });
    ensure!(code != admin_code, ReservedCodeSnafu { code });
    let start_date = start_date_or(f.get(5), default_start)?;
    Ok(Participant {
        code,
        first_name: f[0].clone(),
        last_name: f[1].clone(),
        email: f[2].clone(),
        phone: f[3].clone(),
        start_date: Some(start_date),
    })
}

/// The dashboard: the totals and the progress of every participant.
pub fn dashboard(snapshot: &Snapshot) -> (StudyStats, Vec<ParticipantProgress>) {
    (
        study_stats(&snapshot.participants, &snapshot.entries),
        participant_progress(&snapshot.participants, &snapshot.entries),
    )
}

/// An export ready to be written: the file name and its content.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Export {
    pub file_name: String,
    pub content: String,
    pub rows: usize,
}

/// Exports the complete entries of everyone, or of one participant. The
/// submission dates are written as calendar dates in `tz`.
pub fn export<Tz: TimeZone>(
    snapshot: &Snapshot,
    participant_code: Option<&str>,
    export_date: NaiveDate,
    tz: &Tz,
) -> LogbookResult<Export>
where
    Tz::Offset: Display,
{
    let rows = io_csv::select_export_entries(&snapshot.entries, participant_code).len();
    if rows == 0 {
        whatever!("No data to export");
    }
    let content = export_csv(
        &snapshot.entries,
        &snapshot.participants,
        participant_code,
        tz,
    )?;
    Ok(Export {
        file_name: export_file_name(export_date),
        content,
        rows,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logbook::io_csv::read_csv_roster;
    use crate::logbook::store::JsonStore;
    use chrono::Utc;

    fn start() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 12, 6).unwrap()
    }

    fn rows(text: &str) -> Vec<RosterRow> {
        read_csv_roster(text.as_bytes()).unwrap()
    }

    const BATCH: &str = "firstName,lastName,email,phone,code,startDate
Marie,Dupont,marie@example.com,0612345678,1234,2025-12-06
Jean,Martin,jean@example.com,0623456789,5678,
Lina,Haddad,lina@example.com,0634567890,4321,2026-01-05
";

    #[test]
    fn import_then_reimport() {
        let mut store = JsonStore::in_memory();
        let s = import_roster(&mut store, &rows(BATCH), start(), "9999").unwrap();
        assert_eq!(
            s,
            ImportSummary {
                created: 3,
                ignored: 0,
                errors: 0
            }
        );
        let jean = store.find_participant_by_code("5678").unwrap();
        assert_eq!(jean.start_date, Some(start()));
        let lina = store.find_participant_by_code("4321").unwrap();
        assert_eq!(lina.start_date, NaiveDate::from_ymd_opt(2026, 1, 5));

        let s = import_roster(&mut store, &rows(BATCH), start(), "9999").unwrap();
        assert_eq!(
            s,
            ImportSummary {
                created: 0,
                ignored: 3,
                errors: 0
            }
        );
        assert_eq!(store.list_participants().unwrap().len(), 3);
    }

    #[test]
    fn bad_rows_are_counted_not_fatal() {
        let text = "prenom,nom,email,telephone,code,date_debut
Marie,Dupont,marie@example.com,0612345678,1234
Jean,Martin,jean@example.com
Paul,Durand,paul@example.com,0600000000,12345
Anne,Petit,anne@example.com,0600000001,12a4
Luc,Roux,luc@example.com,0600000002,1234
Eva,Blanc,eva@example.com,0600000003,2222,06/12/2025
Noe,Noir,noe@example.com,0600000004,3333
";
        let mut store = JsonStore::in_memory();
        let s = import_roster(&mut store, &rows(text), start(), "9999").unwrap();
        assert_eq!(
            s,
            ImportSummary {
                created: 2,
                ignored: 1,
                errors: 4
            }
        );
        let codes: Vec<String> = store
            .list_participants()
            .unwrap()
            .into_iter()
            .map(|p| p.code)
            .collect();
        assert_eq!(codes, vec!["1234".to_string(), "3333".to_string()]);
    }

    #[test]
    fn admin_code_is_not_imported() {
        let text = "Ana,Bernard,ana@example.com,0600000005,9999
Marie,Dupont,marie@example.com,0612345678,1234
";
        let mut store = JsonStore::in_memory();
        let s = import_roster(&mut store, &rows(text), start(), "9999").unwrap();
        assert_eq!(
            s,
            ImportSummary {
                created: 1,
                ignored: 0,
                errors: 1
            }
        );
        assert!(matches!(
            store.find_participant_by_code("9999"),
            Err(LogbookError::ParticipantNotFound {})
        ));
    }

    #[test]
    fn empty_roster() {
        let mut store = JsonStore::in_memory();
        let header_only = rows("prenom,nom,email,telephone,code\n");
        let r = import_roster(&mut store, &header_only, start(), "9999");
        assert!(matches!(r, Err(LogbookError::EmptyRoster {})));
    }

    #[test]
    fn manual_add() {
        let mut store = JsonStore::in_memory();
        let new = NewParticipant {
            code: "1234".to_string(),
            first_name: "Marie".to_string(),
            last_name: "Dupont".to_string(),
            ..Default::default()
        };
        let p = add_participant(&mut store, new.clone(), "9999").unwrap();
        assert_eq!(p.start_date, Some(start()));
        assert!(matches!(
            add_participant(&mut store, new.clone(), "9999"),
            Err(LogbookError::DuplicateCode { .. })
        ));
        let bad = NewParticipant {
            code: "123".to_string(),
            ..new.clone()
        };
        assert!(matches!(
            add_participant(&mut store, bad, "9999"),
            Err(LogbookError::InvalidCode { .. })
        ));
        let admin = NewParticipant {
            code: "9999".to_string(),
            ..new
        };
        assert!(matches!(
            add_participant(&mut store, admin, "9999"),
            Err(LogbookError::ReservedCode { .. })
        ));
    }

    #[test]
    fn export_after_delete() {
        let mut store = JsonStore::in_memory();
        import_roster(&mut store, &rows(BATCH), start(), "9999").unwrap();
        for code in ["1234", "5678"] {
            let e = study_logbook::builder::EntryBuilder::new(code, 1)
                .unwrap()
                .no_odor()
                .build(Utc.with_ymd_and_hms(2025, 12, 6, 12, 0, 0).unwrap());
            store.upsert_entry(e).unwrap();
        }
        delete_participant(&mut store, "1234").unwrap();

        let snapshot = Snapshot::load(&store);
        let export_date = NaiveDate::from_ymd_opt(2025, 12, 20).unwrap();
        let out = export(&snapshot, None, export_date, &Utc).unwrap();
        assert_eq!(out.file_name, "export_2025-12-20.csv");
        assert_eq!(out.rows, 1);
        assert!(out.content.contains("\"5678\",\"Jean\""));
        assert!(!out.content.contains("\"1234\""));

        assert!(export(&snapshot, Some("4321"), export_date, &Utc).is_err());

        let (stats, progress) = dashboard(&snapshot);
        assert_eq!(stats.total_participants, 2);
        assert_eq!(stats.active_participants, 1);
        assert_eq!(stats.completion_rate, 2);
        assert_eq!(progress.len(), 2);
    }
}
