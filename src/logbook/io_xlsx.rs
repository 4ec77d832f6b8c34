use calamine::{open_workbook, DataType, Range, Reader, Xlsx};
use chrono::{Days, NaiveDate};

use crate::logbook::{io_csv::is_header, *};

/// Reads a roster from an Excel file.
///
/// The rows follow the same layout as the CSV rosters. Without a worksheet
/// name, the first worksheet is used.
pub fn read_xlsx_roster(path: &str, worksheet: Option<&str>) -> LogbookResult<Vec<RosterRow>> {
    info!("Attempting to read roster workbook {:?}", path);
    let wrange = get_range(path, worksheet)?;
    Ok(roster_rows(&wrange))
}

/// The rows of a worksheet, without the empty rows and the header.
fn roster_rows(wrange: &Range<DataType>) -> Vec<RosterRow> {
    let mut res: Vec<RosterRow> = Vec::new();
    for (idx, row) in wrange.rows().enumerate() {
        let lineno = idx + 1;
        let mut fields: Vec<String> = row.iter().map(read_cell).collect();
        // Spreadsheets pad the rows with empty cells up to the widest row.
        while fields.last().map(|s| s.is_empty()).unwrap_or(false) {
            fields.pop();
        }
        if fields.is_empty() {
            debug!("read_xlsx_roster: skipping empty row {}", lineno);
            continue;
        }
        if idx == 0 && is_header(&fields) {
            debug!("read_xlsx_roster: skipping header {:?}", fields);
            continue;
        }
        debug!("read_xlsx_roster: lineno: {:?} row: {:?}", lineno, &fields);
        res.push(RosterRow { lineno, fields });
    }
    res
}

fn get_range(path: &str, worksheet: Option<&str>) -> LogbookResult<Range<DataType>> {
    let mut workbook: Xlsx<_> = open_workbook(path).context(OpeningExcelSnafu { path })?;
    let wrange = match worksheet {
        Some(name) => workbook.worksheet_range(name),
        None => workbook.worksheet_range_at(0),
    };
    wrange
        .context(EmptyExcelSnafu {})?
        .context(OpeningExcelSnafu { path })
}

/// The text of a cell, as it would appear in a CSV export of the sheet.
fn read_cell(cell: &DataType) -> String {
    match cell {
        DataType::String(s) => s.trim().to_string(),
        // Codes and phone numbers typed as numbers.
        DataType::Int(i) => i.to_string(),
        DataType::Float(f) if f.fract() == 0.0 => format!("{}", *f as i64),
        DataType::Float(f) => f.to_string(),
        DataType::DateTime(serial) => excel_date(*serial)
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_default(),
        DataType::Bool(b) => b.to_string(),
        DataType::Empty => String::new(),
        _ => {
            warn!("read_cell: could not understand cell {:?}", cell);
            String::new()
        }
    }
}

/// Converts the serial number of a date in Excel to a calendar date.
fn excel_date(serial: f64) -> Option<NaiveDate> {
    // Valid for every date after February 1900.
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    if serial < 0.0 {
        return None;
    }
    epoch.checked_add_days(Days::new(serial.floor() as u64))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cells() {
        assert_eq!(read_cell(&DataType::String(" Marie ".to_string())), "Marie");
        assert_eq!(read_cell(&DataType::Float(1234.0)), "1234");
        assert_eq!(read_cell(&DataType::Int(5678)), "5678");
        assert_eq!(read_cell(&DataType::Empty), "");
        assert_eq!(read_cell(&DataType::DateTime(45_997.25)), "2025-12-06");
    }

    fn sheet(cells: &[&[DataType]]) -> Range<DataType> {
        let width = cells.iter().map(|r| r.len()).max().unwrap_or(1) as u32;
        let mut range = Range::new((0, 0), (cells.len() as u32 - 1, width - 1));
        for (r, row) in cells.iter().enumerate() {
            for (c, cell) in row.iter().enumerate() {
                range.set_value((r as u32, c as u32), cell.clone());
            }
        }
        range
    }

    fn text(s: &str) -> DataType {
        DataType::String(s.to_string())
    }

    #[test]
    fn worksheet_rows() {
        let range = sheet(&[
            &[
                text("Prénom"),
                text("Nom"),
                text("Email"),
                text("Téléphone"),
                text("Code"),
                text("Date début"),
            ],
            &[
                text("Marie"),
                text("Dupont"),
                text("marie@example.com"),
                text("0612345678"),
                DataType::Float(1234.0),
                DataType::DateTime(45_997.0),
            ],
            &[],
            &[
                text("Jean"),
                text("Martin"),
                text("jean@example.com"),
                text("0623456789"),
                text("5678"),
                DataType::Empty,
            ],
        ]);
        let rows = roster_rows(&range);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].lineno, 2);
        assert_eq!(
            rows[0].fields,
            vec![
                "Marie",
                "Dupont",
                "marie@example.com",
                "0612345678",
                "1234",
                "2025-12-06"
            ]
        );
        // Trailing empty cells are dropped.
        assert_eq!(rows[1].lineno, 4);
        assert_eq!(rows[1].fields.len(), 5);
        assert_eq!(rows[1].fields[4], "5678");
    }

    #[test]
    fn worksheet_without_header() {
        let range = sheet(&[&[
            text("Marie"),
            text("Dupont"),
            text("marie@example.com"),
            text("0612345678"),
            text("1234"),
        ]]);
        let rows = roster_rows(&range);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].lineno, 1);
    }

    #[test]
    fn dates() {
        assert_eq!(excel_date(45_997.0), NaiveDate::from_ymd_opt(2025, 12, 6));
        assert_eq!(excel_date(-3.0), None);
    }
}
