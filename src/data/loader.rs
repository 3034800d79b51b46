use std::io::Cursor;
use std::path::Path;

use anyhow::{Context, Result};
use calamine::{open_workbook_from_rs, Data, ExcelDateTime, Reader, Xlsx};
use chrono::{NaiveDateTime, Timelike};
use thiserror::Error;

use super::model::{Column, DataType, SchemaError, Table, Value};

/// Cell texts treated as missing values.
const MISSING_MARKERS: &[&str] = &[
    "", "NA", "N/A", "n/a", "NaN", "nan", "-NaN", "null", "NULL", "None", "#N/A", "<NA>",
];

/// Why an upload could not be turned into a [`Table`].
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("unsupported file type '{0}': expected a .csv or .xlsx file")]
    UnsupportedExtension(String),
    #[error("malformed CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("malformed spreadsheet: {0}")]
    Spreadsheet(#[from] calamine::XlsxError),
    #[error("workbook contains no worksheet")]
    NoWorksheet,
    #[error("file has no header row")]
    MissingHeader,
    #[error("inconsistent table shape: {0}")]
    Shape(#[from] SchemaError),
}

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Parse an uploaded file into a table.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`  – comma separated, header row defines the column names
/// * `.xlsx` – first worksheet, first row defines the column names
pub fn load(file_name: &str, bytes: &[u8]) -> Result<Table, LoadError> {
    let ext = Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "csv" => load_csv(bytes),
        "xlsx" => load_xlsx(bytes),
        _ => Err(LoadError::UnsupportedExtension(file_name.to_owned())),
    }
}

/// Read an upload from disk. Returns the file's base name, which [`load`]
/// dispatches on, together with its bytes.
pub fn read_upload(path: &Path) -> Result<(String, Vec<u8>)> {
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .with_context(|| format!("invalid file name: {}", path.display()))?
        .to_owned();
    let bytes = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    Ok((file_name, bytes))
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

fn load_csv(bytes: &[u8]) -> Result<Table, LoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(bytes);

    let raw_headers: Vec<String> = reader.headers()?.iter().map(str::to_owned).collect();
    if raw_headers.is_empty() {
        return Err(LoadError::MissingHeader);
    }
    let headers = clean_headers(raw_headers);

    let mut cells: Vec<Vec<String>> = vec![Vec::new(); headers.len()];
    for result in reader.records() {
        let record = result?;
        for (col, field) in cells.iter_mut().zip(record.iter()) {
            col.push(field.to_owned());
        }
    }

    let columns = headers
        .into_iter()
        .zip(cells)
        .map(|(name, col)| infer_column(name, col))
        .collect();
    Ok(Table::new(columns)?)
}

fn is_missing(cell: &str) -> bool {
    MISSING_MARKERS.contains(&cell.trim())
}

fn parse_bool(s: &str) -> Option<bool> {
    if s.eq_ignore_ascii_case("true") {
        Some(true)
    } else if s.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

/// Guess a column type from its text cells and parse every cell to it.
/// Spellings of NaN the float parser accepts (`NAN`, `+nan`) end up missing.
fn infer_column(name: String, cells: Vec<String>) -> Column {
    let present: Vec<&str> = cells
        .iter()
        .map(String::as_str)
        .filter(|c| !is_missing(c))
        .map(str::trim)
        .collect();

    let dtype = if present.is_empty() {
        DataType::Float
    } else if present.iter().all(|s| s.parse::<i64>().is_ok()) {
        DataType::Integer
    } else if present.iter().all(|s| s.parse::<f64>().is_ok()) {
        DataType::Float
    } else if present.iter().all(|s| parse_bool(s).is_some()) {
        DataType::Boolean
    } else {
        DataType::Text
    };

    let values = cells
        .into_iter()
        .map(|cell| {
            if is_missing(&cell) {
                return Value::Null;
            }
            let trimmed = cell.trim();
            match dtype {
                DataType::Integer => trimmed.parse().map_or(Value::Null, Value::Integer),
                DataType::Float => trimmed.parse().map_or(Value::Null, Value::Float),
                DataType::Boolean => parse_bool(trimmed).map_or(Value::Null, Value::Boolean),
                DataType::Text => Value::Text(cell),
            }
        })
        .collect();

    Column::new(name, dtype, values)
}

/// Blank headers become `Unnamed: <i>`, repeated headers get `.1`, `.2`, …
fn clean_headers(raw: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(raw.len());
    for (i, header) in raw.into_iter().enumerate() {
        let base = if header.trim().is_empty() {
            format!("Unnamed: {i}")
        } else {
            header
        };
        let mut name = base.clone();
        let mut n = 1;
        while out.contains(&name) {
            name = format!("{base}.{n}");
            n += 1;
        }
        out.push(name);
    }
    out
}

// ---------------------------------------------------------------------------
// XLSX loader
// ---------------------------------------------------------------------------

/// Load the first worksheet of an `.xlsx` workbook. Cells keep the
/// workbook's own types; integral floats are read back as integers and
/// dates as text.
fn load_xlsx(bytes: &[u8]) -> Result<Table, LoadError> {
    let mut workbook: Xlsx<_> = open_workbook_from_rs(Cursor::new(bytes))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or(LoadError::NoWorksheet)??;

    let mut rows = range.rows();
    let header_row = rows.next().ok_or(LoadError::MissingHeader)?;
    let headers = clean_headers(header_row.iter().map(header_text).collect());

    let mut cells: Vec<Vec<Value>> = vec![Vec::new(); headers.len()];
    for row in rows {
        for (i, col) in cells.iter_mut().enumerate() {
            col.push(row.get(i).map_or(Value::Null, spreadsheet_value));
        }
    }

    let columns = headers
        .into_iter()
        .zip(cells)
        .map(|(name, values)| Column::from_values(name, values))
        .collect();
    Ok(Table::new(columns)?)
}

fn header_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn spreadsheet_value(cell: &Data) -> Value {
    match cell {
        Data::Empty | Data::Error(_) => Value::Null,
        Data::Int(i) => Value::Integer(*i),
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 9.0e15 => Value::Integer(*f as i64),
        Data::Float(f) => Value::Float(*f),
        Data::Bool(b) => Value::Boolean(*b),
        Data::String(s) if is_missing(s) => Value::Null,
        Data::String(s) => Value::Text(s.clone()),
        Data::DateTime(dt) => excel_datetime_text(dt).map_or(Value::Null, Value::Text),
        Data::DateTimeIso(s) | Data::DurationIso(s) => Value::Text(s.clone()),
    }
}

/// `2024-03-15` for a date at midnight, `2024-03-15 09:30:00` otherwise,
/// `H:MM:SS` for a duration.
fn excel_datetime_text(dt: &ExcelDateTime) -> Option<String> {
    if dt.is_duration() {
        let total = (dt.as_f64() * 86_400.0).round() as i64;
        let (h, m, s) = (total / 3600, total % 3600 / 60, total % 60);
        return Some(format!("{h}:{m:02}:{s:02}"));
    }
    dt.as_datetime().map(datetime_text)
}

fn datetime_text(dt: NaiveDateTime) -> String {
    if dt.num_seconds_from_midnight() == 0 && dt.nanosecond() == 0 {
        dt.format("%Y-%m-%d").to_string()
    } else {
        dt.format("%Y-%m-%d %H:%M:%S").to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn csv_types_are_inferred_per_column() {
        let csv = b"id,score,name,active\n1,1.5,ann,true\n2,,bob,False\n3,2,,TRUE\n";
        let table = load("people.csv", csv).unwrap();

        assert_eq!(table.n_rows(), 3);
        let types: Vec<DataType> = table.columns().iter().map(|c| c.dtype).collect();
        assert_eq!(
            types,
            vec![DataType::Integer, DataType::Float, DataType::Text, DataType::Boolean]
        );
        assert_eq!(table.column("score").unwrap().values[2], Value::Float(2.0));
        assert!(table.column("name").unwrap().values[2].is_null());
        assert_eq!(table.column("active").unwrap().values[1], Value::Boolean(false));
    }

    #[test]
    fn nan_spellings_are_missing() {
        let table = load("n.csv", b"a,b\n1,10\n2,\n3,NAN\n4,30\n5,+nan\n").unwrap();
        let b = table.column("b").unwrap();
        assert_eq!(b.dtype, DataType::Float);
        assert_eq!(b.null_count(), 3);
        assert_eq!(b.mean(), Some(20.0));
        assert!(b.values.iter().all(|v| !matches!(v, Value::Float(f) if f.is_nan())));
    }

    #[test]
    fn missing_markers_become_null() {
        let table = load("m.csv", b"a\n1\nNA\nnull\n4\n").unwrap();
        let a = table.column("a").unwrap();
        assert_eq!(a.dtype, DataType::Integer);
        assert_eq!(a.null_count(), 2);
    }

    #[test]
    fn text_cells_keep_original_spelling() {
        let table = load("t.csv", b"code\n007\nabc\n").unwrap();
        let code = table.column("code").unwrap();
        assert_eq!(code.dtype, DataType::Text);
        assert_eq!(code.values[0], Value::Text("007".into()));
    }

    #[test]
    fn headers_are_cleaned() {
        let table = load("h.csv", b"a,,a\n1,2,3\n").unwrap();
        assert_eq!(
            table.column_names(),
            vec!["a".to_owned(), "Unnamed: 1".to_owned(), "a.1".to_owned()]
        );
    }

    #[test]
    fn extension_dispatch_is_case_insensitive() {
        assert!(load("DATA.CSV", b"a\n1\n").is_ok());
        let err = load("data.json", b"[]").unwrap_err();
        assert!(matches!(err, LoadError::UnsupportedExtension(_)));
        assert!(err.to_string().contains("data.json"));
    }

    #[test]
    fn ragged_csv_is_rejected() {
        let err = load("bad.csv", b"a,b\n1,2\n3\n").unwrap_err();
        assert!(matches!(err, LoadError::Csv(_)));
    }

    #[test]
    fn empty_csv_has_no_header() {
        let err = load("empty.csv", b"").unwrap_err();
        assert!(matches!(err, LoadError::MissingHeader));
    }

    #[test]
    fn garbage_xlsx_is_rejected() {
        let err = load("broken.xlsx", b"definitely not a zip archive").unwrap_err();
        assert!(matches!(err, LoadError::Spreadsheet(_)));
    }

    #[test]
    fn loading_is_idempotent() {
        let csv = b"a,b\n1,x\n2,y\n";
        assert_eq!(load("a.csv", csv).unwrap(), load("a.csv", csv).unwrap());
    }

    #[test]
    fn spreadsheet_cells_map_to_values() {
        assert_eq!(spreadsheet_value(&Data::Float(3.0)), Value::Integer(3));
        assert_eq!(spreadsheet_value(&Data::Float(3.5)), Value::Float(3.5));
        assert_eq!(spreadsheet_value(&Data::Empty), Value::Null);
        assert_eq!(spreadsheet_value(&Data::String("NA".into())), Value::Null);
        assert_eq!(spreadsheet_value(&Data::Bool(true)), Value::Boolean(true));
    }

    #[test]
    fn spreadsheet_nan_is_missing() {
        assert_eq!(
            Column::from_values("x", vec![spreadsheet_value(&Data::Float(f64::NAN))]).values,
            vec![Value::Null]
        );
    }

    #[test]
    fn midnight_dates_drop_the_time() {
        let date = NaiveDateTime::parse_from_str("2024-03-15 00:00:00", "%Y-%m-%d %H:%M:%S").unwrap();
        assert_eq!(datetime_text(date), "2024-03-15");
        let stamp = NaiveDateTime::parse_from_str("2024-03-15 09:30:05", "%Y-%m-%d %H:%M:%S").unwrap();
        assert_eq!(datetime_text(stamp), "2024-03-15 09:30:05");
    }

    #[test]
    fn xlsx_first_sheet_is_loaded() {
        use rust_xlsxwriter::{ExcelDateTime, Format, Workbook};

        let date_format = Format::new().set_num_format("yyyy-mm-dd");
        let stamp_format = Format::new().set_num_format("yyyy-mm-dd hh:mm:ss");
        let mut workbook = Workbook::new();

        let people = workbook.add_worksheet();
        people.set_name("people").unwrap();
        for (c, header) in ["id", "score", "name", "active", "when"].iter().enumerate() {
            people.write_string(0, c as u16, *header).unwrap();
        }
        people.write_number(1, 0, 1.0).unwrap();
        people.write_number(1, 1, 1.5).unwrap();
        people.write_string(1, 2, "ann").unwrap();
        people.write_boolean(1, 3, true).unwrap();
        let date = ExcelDateTime::from_ymd(2024, 3, 15).unwrap();
        people.write_datetime_with_format(1, 4, &date, &date_format).unwrap();

        people.write_number(2, 0, 2.0).unwrap();
        people.write_string(2, 2, "bob").unwrap();
        people.write_boolean(2, 3, false).unwrap();
        let stamp = ExcelDateTime::parse_from_str("2024-03-15 12:00:00").unwrap();
        people.write_datetime_with_format(2, 4, &stamp, &stamp_format).unwrap();

        people.write_number(3, 0, 3.0).unwrap();
        people.write_number(3, 1, 2.0).unwrap();
        people.write_string(3, 2, "NA").unwrap();
        people.write_boolean(3, 3, true).unwrap();

        let other = workbook.add_worksheet();
        other.set_name("other").unwrap();
        other.write_string(0, 0, "ignored").unwrap();
        other.write_number(1, 0, 99.0).unwrap();

        let bytes = workbook.save_to_buffer().unwrap();
        let table = load("people.xlsx", &bytes).unwrap();

        assert_eq!(table.column_names(), vec!["id", "score", "name", "active", "when"]);
        assert_eq!(table.n_rows(), 3);

        let id = table.column("id").unwrap();
        assert_eq!(id.dtype, DataType::Integer);
        assert_eq!(id.values, vec![Value::Integer(1), Value::Integer(2), Value::Integer(3)]);

        let score = table.column("score").unwrap();
        assert_eq!(score.dtype, DataType::Float);
        assert_eq!(score.values, vec![Value::Float(1.5), Value::Null, Value::Float(2.0)]);

        let name = table.column("name").unwrap();
        assert_eq!(name.dtype, DataType::Text);
        assert_eq!(name.values[2], Value::Null);

        let active = table.column("active").unwrap();
        assert_eq!(active.dtype, DataType::Boolean);
        assert_eq!(active.values[1], Value::Boolean(false));

        let when = table.column("when").unwrap();
        assert_eq!(when.dtype, DataType::Text);
        assert_eq!(
            when.values,
            vec![
                Value::Text("2024-03-15".into()),
                Value::Text("2024-03-15 12:00:00".into()),
                Value::Null
            ]
        );
    }

    #[test]
    fn empty_first_sheet_has_no_header() {
        let mut workbook = rust_xlsxwriter::Workbook::new();
        workbook.add_worksheet();
        workbook.add_worksheet().write_string(0, 0, "later").unwrap();
        let bytes = workbook.save_to_buffer().unwrap();

        let err = load("empty.xlsx", &bytes).unwrap_err();
        assert!(matches!(err, LoadError::MissingHeader), "{err}");
    }
}
