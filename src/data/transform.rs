//! Table transformations.
//!
//! Every request is evaluated against the current table and yields either a
//! brand-new table or a [`TransformError`]; the input is never touched, so a
//! rejected request leaves the session exactly as it was.

use std::collections::BTreeSet;
use std::fmt;

use thiserror::Error;

use super::filter::{filtered_indices, present_indices, RangeFilter};
use super::model::{Column, DataType, SchemaError, Table, Value};

/// How to treat missing values in a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImputeMethod {
    DropRows,
    FillZero,
    FillMean,
}

impl ImputeMethod {
    pub const ALL: [ImputeMethod; 3] = [
        ImputeMethod::DropRows,
        ImputeMethod::FillZero,
        ImputeMethod::FillMean,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ImputeMethod::DropRows => "Drop Rows",
            ImputeMethod::FillZero => "Fill with 0",
            ImputeMethod::FillMean => "Fill with Mean",
        }
    }
}

impl fmt::Display for ImputeMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One discrete mutation of the table.
#[derive(Debug, Clone, PartialEq)]
pub enum Transformation {
    /// Remove columns; names that do not exist are ignored.
    DropColumns(BTreeSet<String>),
    ImputeColumn {
        column: String,
        method: ImputeMethod,
    },
    /// Keep rows whose value lies in `[low, high]`.
    FilterRange {
        column: String,
        low: f64,
        high: f64,
    },
}

impl fmt::Display for Transformation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Transformation::DropColumns(names) => {
                let names: Vec<&str> = names.iter().map(String::as_str).collect();
                write!(f, "drop columns [{}]", names.join(", "))
            }
            Transformation::ImputeColumn { column, method } => {
                write!(f, "{} on '{column}'", method.label().to_lowercase())
            }
            Transformation::FilterRange { column, low, high } => {
                write!(f, "filter '{column}' to [{low}, {high}]")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum TransformError {
    #[error("no data loaded")]
    NoData,
    #[error("column '{0}' does not exist")]
    MissingColumn(String),
    #[error("cannot compute mean for non-numeric column '{0}'")]
    NonNumericMean(String),
    #[error("column '{0}' has no values to average")]
    NoValuesToAverage(String),
    #[error("cannot filter non-numeric column '{0}' by range")]
    NonNumericFilter(String),
    #[error("invalid range [{low}, {high}]: bounds must be finite and low <= high")]
    InvalidRange { low: f64, high: f64 },
    #[error(transparent)]
    Schema(#[from] SchemaError),
}

/// Apply one request to `table`, returning the transformed copy.
pub fn apply(table: &Table, request: &Transformation) -> Result<Table, TransformError> {
    match request {
        Transformation::DropColumns(names) => Ok(table.without_columns(names)),
        Transformation::ImputeColumn { column, method } => impute(table, column, *method),
        Transformation::FilterRange { column, low, high } => {
            filter_range(table, column, RangeFilter::new(*low, *high))
        }
    }
}

fn lookup<'t>(table: &'t Table, column: &str) -> Result<(usize, &'t Column), TransformError> {
    table
        .column_index(column)
        .and_then(|i| table.columns().get(i).map(|c| (i, c)))
        .ok_or_else(|| TransformError::MissingColumn(column.to_owned()))
}

fn impute(table: &Table, column: &str, method: ImputeMethod) -> Result<Table, TransformError> {
    let (index, col) = lookup(table, column)?;

    match method {
        ImputeMethod::DropRows => Ok(table.take_rows(&present_indices(col))),
        ImputeMethod::FillZero => {
            let zero = match col.dtype {
                DataType::Integer => Value::Integer(0),
                DataType::Float => Value::Float(0.0),
                DataType::Boolean => Value::Boolean(false),
                DataType::Text => Value::Text("0".to_owned()),
            };
            Ok(table.with_column(index, fill_nulls(col, col.dtype, &zero))?)
        }
        ImputeMethod::FillMean => {
            if !col.is_numeric() {
                return Err(TransformError::NonNumericMean(column.to_owned()));
            }
            let mean = col
                .mean()
                .ok_or_else(|| TransformError::NoValuesToAverage(column.to_owned()))?;
            Ok(table.with_column(index, fill_nulls(col, DataType::Float, &Value::Float(mean)))?)
        }
    }
}

/// Copy of `col` retyped to `dtype` with every null replaced by `fill`.
fn fill_nulls(col: &Column, dtype: DataType, fill: &Value) -> Column {
    let values = col
        .values
        .iter()
        .map(|v| match (v, dtype) {
            (Value::Null, _) => fill.clone(),
            (Value::Integer(i), DataType::Float) => Value::Float(*i as f64),
            (other, _) => other.clone(),
        })
        .collect();
    Column::new(col.name.clone(), dtype, values)
}

fn filter_range(table: &Table, column: &str, range: RangeFilter) -> Result<Table, TransformError> {
    let (_, col) = lookup(table, column)?;
    if !col.is_numeric() {
        return Err(TransformError::NonNumericFilter(column.to_owned()));
    }
    if !range.is_valid() {
        return Err(TransformError::InvalidRange {
            low: range.low,
            high: range.high,
        });
    }
    Ok(table.take_rows(&filtered_indices(col, range)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Table {
        Table::new(vec![
            Column::from_values(
                "a",
                vec![Value::Integer(1), Value::Integer(2), Value::Integer(3)],
            ),
            Column::from_values("b", vec![Value::Integer(10), Value::Null, Value::Integer(30)]),
            Column::from_values(
                "name",
                vec![Value::Text("x".into()), Value::Null, Value::Text("z".into())],
            ),
        ])
        .unwrap()
    }

    fn impute_req(column: &str, method: ImputeMethod) -> Transformation {
        Transformation::ImputeColumn {
            column: column.to_owned(),
            method,
        }
    }

    #[test]
    fn fill_mean_replaces_missing_with_average() {
        let out = apply(&sample(), &impute_req("b", ImputeMethod::FillMean)).unwrap();
        let b = out.column("b").unwrap();
        assert_eq!(b.dtype, DataType::Float);
        let vals: Vec<f64> = b.numeric_values().collect();
        assert_eq!(vals, vec![10.0, 20.0, 30.0]);
    }

    #[test]
    fn fill_mean_rejects_text_and_leaves_table_alone() {
        let table = sample();
        let err = apply(&table, &impute_req("name", ImputeMethod::FillMean)).unwrap_err();
        assert_eq!(err, TransformError::NonNumericMean("name".into()));
        assert!(err.to_string().contains("cannot compute mean"));
        assert_eq!(table, sample());
    }

    #[test]
    fn fill_zero_uses_column_type() {
        let table = sample();
        let out = apply(&table, &impute_req("b", ImputeMethod::FillZero)).unwrap();
        assert_eq!(out.column("b").unwrap().values[1], Value::Integer(0));

        let out = apply(&table, &impute_req("name", ImputeMethod::FillZero)).unwrap();
        assert_eq!(out.column("name").unwrap().values[1], Value::Text("0".into()));
    }

    #[test]
    fn drop_rows_removes_missing_rows() {
        let out = apply(&sample(), &impute_req("b", ImputeMethod::DropRows)).unwrap();
        assert_eq!(out.n_rows(), 2);
        assert_eq!(out.column("b").unwrap().null_count(), 0);
        assert_eq!(out.column("a").unwrap().values[1], Value::Integer(3));
    }

    #[test]
    fn impute_on_unknown_column_fails() {
        let err = apply(&sample(), &impute_req("nope", ImputeMethod::DropRows)).unwrap_err();
        assert_eq!(err, TransformError::MissingColumn("nope".into()));
    }

    #[test]
    fn fill_mean_on_all_missing_column_fails() {
        let table = Table::new(vec![Column::from_values("e", vec![Value::Null])]).unwrap();
        let err = apply(&table, &impute_req("e", ImputeMethod::FillMean)).unwrap_err();
        assert_eq!(err, TransformError::NoValuesToAverage("e".into()));
    }

    #[test]
    fn drop_columns_ignores_unknown_names_and_is_idempotent() {
        let req = Transformation::DropColumns(["b".to_owned(), "ghost".to_owned()].into());
        let once = apply(&sample(), &req).unwrap();
        let twice = apply(&once, &req).unwrap();
        assert_eq!(once.column_names(), vec!["a".to_owned(), "name".to_owned()]);
        assert_eq!(once, twice);
    }

    #[test]
    fn filter_range_is_idempotent() {
        let req = Transformation::FilterRange {
            column: "a".into(),
            low: 2.0,
            high: 3.0,
        };
        let once = apply(&sample(), &req).unwrap();
        let twice = apply(&once, &req).unwrap();
        assert_eq!(once.n_rows(), 2);
        assert_eq!(once, twice);
    }

    #[test]
    fn filter_range_rejects_bad_requests() {
        let table = sample();
        let text = Transformation::FilterRange {
            column: "name".into(),
            low: 0.0,
            high: 1.0,
        };
        assert_eq!(
            apply(&table, &text).unwrap_err(),
            TransformError::NonNumericFilter("name".into())
        );

        let inverted = Transformation::FilterRange {
            column: "a".into(),
            low: 3.0,
            high: 1.0,
        };
        assert!(matches!(
            apply(&table, &inverted).unwrap_err(),
            TransformError::InvalidRange { .. }
        ));
    }

    #[test]
    fn fill_mean_treats_nan_cells_as_missing() {
        let table = crate::data::loader::load("n.csv", b"a,b\n1,10\n2,\n3,NAN\n4,30\n").unwrap();
        let out = apply(&table, &impute_req("b", ImputeMethod::FillMean)).unwrap();
        assert_eq!(
            out.column("b").unwrap().values,
            vec![
                Value::Float(10.0),
                Value::Float(20.0),
                Value::Float(20.0),
                Value::Float(30.0)
            ]
        );
    }

    #[test]
    fn dropping_every_column_keeps_rows() {
        let all: BTreeSet<String> = ["a", "b", "name"].iter().map(|s| s.to_string()).collect();
        let out = apply(&sample(), &Transformation::DropColumns(all)).unwrap();
        assert_eq!((out.n_rows(), out.n_cols()), (3, 0));
    }
}
