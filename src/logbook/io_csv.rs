// Primitives for reading rosters and writing exports in CSV.

use std::fmt::Display;
use std::fs::File;
use std::io::{Read, Write};

use chrono::TimeZone;
use csv::{QuoteStyle, ReaderBuilder, Terminator, Trim, WriterBuilder};

use crate::logbook::{
    io_common::{french_date, yes_no},
    *,
};

/// The byte order mark, so that spreadsheets open the export as UTF-8.
const BOM: &str = "\u{feff}";

/// The column that holds the code in a roster.
pub const CODE_COLUMN: usize = 4;

pub const EXPORT_HEADERS: [&str; 22] = [
    "code_participant",
    "prenom",
    "nom",
    "email",
    "jour",
    "date",
    "odeur_presente",
    "intensite_odeur",
    "transpiration",
    "foulard",
    "shampooing_rare",
    "sebum",
    "hormones",
    "produit_inapproprie",
    "autre_cause",
    "autre_cause_details",
    "symptomes_presents",
    "demangeaisons",
    "irritation",
    "rougeurs",
    "secheresse",
    "cheveux_laves",
];

/// The file offered to the administrators to fill in.
pub fn roster_template() -> String {
    [
        "prenom,nom,email,telephone,code,date_debut",
        "Marie,Dupont,marie@example.com,0612345678,1234,2025-12-06",
        "Jean,Martin,jean@example.com,0623456789,5678,2025-12-06",
    ]
    .join("\n")
}

/// A roster row is a header when its code cell starts with `code`
/// (`code`, `Code participant`, `code_participant`...).
pub fn is_header(fields: &[String]) -> bool {
    fields
        .get(CODE_COLUMN)
        .map(|s| s.trim().to_lowercase().starts_with("code"))
        .unwrap_or(false)
}

pub fn read_csv_roster_path(path: &str) -> LogbookResult<Vec<RosterRow>> {
    info!("Attempting to read roster file {:?}", path);
    let f = File::open(path).context(OpeningFileSnafu { path })?;
    read_csv_roster(f)
}

/// Reads all the rows of a roster. Rows are not validated here, except that
/// a leading header row is dropped.
pub fn read_csv_roster<R: Read>(rdr: R) -> LogbookResult<Vec<RosterRow>> {
    let reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(rdr);

    let mut res: Vec<RosterRow> = Vec::new();
    for (idx, line_r) in reader.into_records().enumerate() {
        let lineno = idx + 1;
        let fields: Vec<String> = match line_r {
            Ok(line) => line.iter().map(|s| s.to_string()).collect(),
            Err(e) => {
                // Kept as an empty row, so that it is counted as an error.
                warn!("read_csv_roster: line {}: could not be read: {}", lineno, e);
                vec![]
            }
        };
        if idx == 0 && is_header(&fields) {
            debug!("read_csv_roster: skipping header {:?}", fields);
            continue;
        }
        debug!("read_csv_roster: lineno: {:?} row: {:?}", lineno, &fields);
        res.push(RosterRow { lineno, fields });
    }
    Ok(res)
}

/// The complete entries to export, ordered by participant and day.
pub fn select_export_entries<'a>(
    entries: &'a [Entry],
    participant_code: Option<&str>,
) -> Vec<&'a Entry> {
    let mut selected: Vec<&Entry> = entries
        .iter()
        .filter(|e| e.is_complete())
        .filter(|e| participant_code.map_or(true, |c| e.participant_code == c))
        .collect();
    selected.sort_by(|a, b| {
        (a.participant_code.as_str(), a.day).cmp(&(b.participant_code.as_str(), b.day))
    });
    selected
}

/// The cells of one exported row. The participant is `None` when they have
/// been removed from the roster. The date is the calendar date in `tz`.
pub fn export_record<Tz: TimeZone>(
    entry: &Entry,
    participant: Option<&Participant>,
    tz: &Tz,
) -> Vec<String>
where
    Tz::Offset: Display,
{
    let a = &entry.answers;
    let has_odor = a.has_odor == Some(true);
    let has_symptoms = a.has_symptoms == Some(true);
    let has_other = a.has_cause(OTHER_CAUSE);
    // Only shown when the question that gates them was answered yes.
    let gated = |gate: bool, value: Option<u8>| -> String {
        match value {
            Some(v) if gate => v.to_string(),
            _ => String::new(),
        }
    };

    let mut row: Vec<String> = vec![
        entry.participant_code.clone(),
        participant.map(|p| p.first_name.clone()).unwrap_or_default(),
        participant.map(|p| p.last_name.clone()).unwrap_or_default(),
        participant.map(|p| p.email.clone()).unwrap_or_default(),
        entry.day.to_string(),
        french_date(&entry.date, tz),
        yes_no(a.has_odor).to_string(),
        gated(has_odor, a.odor_intensity),
    ];
    for cause in ODOR_CAUSES.iter() {
        row.push(yes_no(Some(a.has_cause(cause))).to_string());
    }
    row.push(yes_no(Some(has_other)).to_string());
    row.push(if has_other {
        a.other_cause.clone().unwrap_or_default()
    } else {
        String::new()
    });
    row.push(yes_no(a.has_symptoms).to_string());
    row.push(gated(has_symptoms, a.itching));
    row.push(gated(has_symptoms, a.irritation));
    row.push(gated(has_symptoms, a.redness));
    row.push(gated(has_symptoms, a.dryness));
    row.push(yes_no(a.washed_hair).to_string());
    row
}

/// Writes the export: a byte order mark, the header and one quoted row per entry.
pub fn write_export<W: Write, Tz: TimeZone>(
    mut w: W,
    entries: &[&Entry],
    participants: &[Participant],
    tz: &Tz,
) -> LogbookResult<()>
where
    Tz::Offset: Display,
{
    w.write_all(BOM.as_bytes())
        .context(WritingFileSnafu { path: "export" })?;
    let mut wtr = WriterBuilder::new()
        .quote_style(QuoteStyle::Always)
        .terminator(Terminator::CRLF)
        .from_writer(w);
    wtr.write_record(EXPORT_HEADERS).context(CsvWriteSnafu {})?;
    for entry in entries.iter() {
        let participant = participants
            .iter()
            .find(|p| p.code == entry.participant_code);
        if participant.is_none() {
            debug!(
                "write_export: participant {} is not in the roster",
                entry.participant_code
            );
        }
        wtr.write_record(export_record(entry, participant, tz))
            .context(CsvWriteSnafu {})?;
    }
    wtr.flush().context(WritingFileSnafu { path: "export" })?;
    Ok(())
}

/// The whole export as text.
pub fn export_csv<Tz: TimeZone>(
    entries: &[Entry],
    participants: &[Participant],
    participant_code: Option<&str>,
    tz: &Tz,
) -> LogbookResult<String>
where
    Tz::Offset: Display,
{
    let selected = select_export_entries(entries, participant_code);
    info!("Exporting {} entries", selected.len());
    let mut buf: Vec<u8> = Vec::new();
    write_export(&mut buf, &selected, participants, tz)?;
    // The writer only ever receives valid UTF-8.
    Ok(String::from_utf8_lossy(&buf).into_owned())
}
