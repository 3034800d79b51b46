use std::io;

use thiserror::Error;

use super::model::Table;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("no data loaded")]
    NoData,
    #[error("failed to write CSV: {0}")]
    Csv(#[from] csv::Error),
}

/// Name offered for the processed download.
pub fn export_file_name(original: &str) -> String {
    format!("processed_{original}")
}

/// Serialise `table` as UTF-8 CSV: header row in column order, one record
/// per row, missing values as empty fields. A table without columns has
/// nothing to write and serialises to no bytes.
pub fn to_csv(table: &Table) -> Result<Vec<u8>, ExportError> {
    if table.n_cols() == 0 {
        return Ok(Vec::new());
    }
    let mut writer = csv::Writer::from_writer(Vec::new());
    write_records(&mut writer, table)?;
    writer
        .into_inner()
        .map_err(|e| ExportError::Csv(e.into_error().into()))
}

fn write_records<W: io::Write>(writer: &mut csv::Writer<W>, table: &Table) -> Result<(), ExportError> {
    writer.write_record(table.columns().iter().map(|c| c.name.as_str()))?;
    for row in 0..table.n_rows() {
        let record: Vec<String> = table
            .columns()
            .iter()
            .map(|c| c.values.get(row).map(ToString::to_string).unwrap_or_default())
            .collect();
        writer.write_record(&record)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader::load;

    #[test]
    fn export_round_trips_cell_values() {
        let csv = "id,name,score,ok\n1,ann,1.5,True\n2,,,False\n";
        let table = load("in.csv", csv.as_bytes()).unwrap();
        let out = to_csv(&table).unwrap();
        assert_eq!(String::from_utf8(out.clone()).unwrap(), csv);
        assert_eq!(load("out.csv", &out).unwrap(), table);
    }

    #[test]
    fn integral_floats_keep_decimal_point() {
        let table = load("in.csv", b"x\n1.0\n2.5\n").unwrap();
        let out = String::from_utf8(to_csv(&table).unwrap()).unwrap();
        assert_eq!(out, "x\n1.0\n2.5\n");
    }

    #[test]
    fn export_name_is_prefixed() {
        assert_eq!(export_file_name("sales.csv"), "processed_sales.csv");
    }

    #[test]
    fn table_without_columns_exports_nothing() {
        let table = load("in.csv", b"a\n1\n2\n").unwrap();
        let empty = table.without_columns(&["a".to_owned()].into());
        assert_eq!(empty.n_rows(), 2);
        assert!(to_csv(&empty).unwrap().is_empty());
    }
}
