use std::collections::BTreeSet;
use std::fmt;

use thiserror::Error;

// ---------------------------------------------------------------------------
// DataType – the closed set of column type tags
// ---------------------------------------------------------------------------

/// Column type tag, decided once when a table is loaded.
///
/// Every type admits missing values; `Integer` and `Float` are the numeric
/// types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DataType {
    Integer,
    Float,
    Boolean,
    Text,
}

impl DataType {
    pub fn is_numeric(self) -> bool {
        matches!(self, DataType::Integer | DataType::Float)
    }

    pub fn label(self) -> &'static str {
        match self {
            DataType::Integer => "integer",
            DataType::Float => "float",
            DataType::Boolean => "boolean",
            DataType::Text => "text",
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// Value – a single cell
// ---------------------------------------------------------------------------

/// A single cell. Within a [`Column`] every non-null value matches the
/// column's [`DataType`], and a `Float` is never NaN: NaN is a missing value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Integer(i64),
    Float(f64),
    Boolean(bool),
    Text(String),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Numeric view of the value; `None` for nulls and non-numeric cells.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Integer(i) => Some(*i as f64),
            Value::Float(v) => Some(*v),
            _ => None,
        }
    }

    /// Type tag of a non-null value.
    pub fn data_type(&self) -> Option<DataType> {
        match self {
            Value::Null => None,
            Value::Integer(_) => Some(DataType::Integer),
            Value::Float(_) => Some(DataType::Float),
            Value::Boolean(_) => Some(DataType::Boolean),
            Value::Text(_) => Some(DataType::Text),
        }
    }
}

/// Cell rendering used by previews and CSV export. Nulls render empty,
/// integral floats keep a trailing `.0` so the column still reads as float.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Integer(i) => write!(f, "{i}"),
            Value::Float(v) if v.is_finite() && v.fract() == 0.0 && v.abs() < 1e16 => {
                write!(f, "{v:.1}")
            }
            Value::Float(v) => write!(f, "{v}"),
            Value::Boolean(true) => f.write_str("True"),
            Value::Boolean(false) => f.write_str("False"),
            Value::Text(s) => f.write_str(s),
        }
    }
}

// ---------------------------------------------------------------------------
// Column
// ---------------------------------------------------------------------------

/// A named, homogeneous sequence of cells.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub dtype: DataType,
    pub values: Vec<Value>,
}

impl Column {
    /// NaN floats are stored as [`Value::Null`].
    pub fn new(name: impl Into<String>, dtype: DataType, values: Vec<Value>) -> Self {
        let values = values
            .into_iter()
            .map(|v| match v {
                Value::Float(f) if f.is_nan() => Value::Null,
                other => other,
            })
            .collect();
        Self {
            name: name.into(),
            dtype,
            values,
        }
    }

    /// Build a column from already-typed cells, unifying their types:
    /// integers and floats promote to `Float`, any other mix falls back to
    /// `Text`, and a column with no values at all is `Float`.
    pub fn from_values(name: impl Into<String>, values: Vec<Value>) -> Self {
        let tags: BTreeSet<DataType> = values.iter().filter_map(Value::data_type).collect();
        let dtype = match tags.len() {
            0 => DataType::Float,
            1 => tags.into_iter().next().unwrap_or(DataType::Text),
            2 if tags.contains(&DataType::Integer) && tags.contains(&DataType::Float) => {
                DataType::Float
            }
            _ => DataType::Text,
        };
        let values = values.into_iter().map(|v| coerce(v, dtype)).collect();
        Self::new(name, dtype, values)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn is_numeric(&self) -> bool {
        self.dtype.is_numeric()
    }

    pub fn null_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_null()).count()
    }

    /// Non-missing numeric values in row order.
    pub fn numeric_values(&self) -> impl Iterator<Item = f64> + '_ {
        self.values.iter().filter_map(Value::as_f64)
    }

    /// Mean of the non-missing values, `None` for non-numeric or empty columns.
    pub fn mean(&self) -> Option<f64> {
        if !self.is_numeric() {
            return None;
        }
        let (sum, n) = self
            .numeric_values()
            .fold((0.0, 0usize), |(sum, n), v| (sum + v, n + 1));
        (n > 0).then(|| sum / n as f64)
    }
}

/// Convert a value to the representation of `dtype`. Only called with
/// conversions `from_values` can produce.
fn coerce(value: Value, dtype: DataType) -> Value {
    match (value, dtype) {
        (Value::Null, _) => Value::Null,
        (Value::Integer(i), DataType::Float) => Value::Float(i as f64),
        (Value::Text(s), DataType::Text) => Value::Text(s),
        (other, DataType::Text) => Value::Text(other.to_string()),
        (other, _) => other,
    }
}

// ---------------------------------------------------------------------------
// Table – the complete loaded dataset
// ---------------------------------------------------------------------------

/// Violations of the table shape invariant.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("duplicate column name '{0}'")]
    DuplicateColumn(String),
    #[error("column '{column}' has {found} rows, expected {expected}")]
    RaggedColumn {
        column: String,
        expected: usize,
        found: usize,
    },
}

/// Ordered, uniquely named columns of equal length.
///
/// The row count is stored, so a table whose columns were all dropped still
/// has its rows.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    columns: Vec<Column>,
    n_rows: usize,
}

impl Table {
    /// Build a table, checking that names are unique and lengths agree.
    pub fn new(columns: Vec<Column>) -> Result<Self, SchemaError> {
        let n_rows = columns.first().map_or(0, Column::len);
        let table = Self { columns, n_rows };
        table.validate()?;
        Ok(table)
    }

    pub fn validate(&self) -> Result<(), SchemaError> {
        let mut seen = BTreeSet::new();
        let expected = self.n_rows;
        for col in &self.columns {
            if !seen.insert(col.name.as_str()) {
                return Err(SchemaError::DuplicateColumn(col.name.clone()));
            }
            if col.len() != expected {
                return Err(SchemaError::RaggedColumn {
                    column: col.name.clone(),
                    expected,
                    found: col.len(),
                });
            }
        }
        Ok(())
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    pub fn n_cols(&self) -> usize {
        self.columns.len()
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    pub fn numeric_columns(&self) -> impl Iterator<Item = &Column> {
        self.columns.iter().filter(|c| c.is_numeric())
    }

    /// New table containing only the given rows, in the given order.
    /// Out-of-range indices are skipped.
    pub fn take_rows(&self, rows: &[usize]) -> Self {
        let rows: Vec<usize> = rows.iter().copied().filter(|&r| r < self.n_rows).collect();
        let columns = self
            .columns
            .iter()
            .map(|c| {
                let values = rows
                    .iter()
                    .filter_map(|&r| c.values.get(r).cloned())
                    .collect();
                Column::new(c.name.clone(), c.dtype, values)
            })
            .collect();
        Self {
            columns,
            n_rows: rows.len(),
        }
    }

    /// New table without the named columns; unknown names are ignored.
    pub fn without_columns(&self, names: &BTreeSet<String>) -> Self {
        let columns = self
            .columns
            .iter()
            .filter(|c| !names.contains(&c.name))
            .cloned()
            .collect();
        Self {
            columns,
            n_rows: self.n_rows,
        }
    }

    /// New table restricted to the named columns, in the order given.
    pub fn select(&self, names: &[&str]) -> Self {
        let columns = names
            .iter()
            .filter_map(|name| self.column(name).cloned())
            .collect();
        Self {
            columns,
            n_rows: self.n_rows,
        }
    }

    /// New table with the column at `index` swapped for `column`.
    /// The replacement must keep the name unique and the row count.
    pub fn with_column(&self, index: usize, column: Column) -> Result<Self, SchemaError> {
        let mut columns = self.columns.clone();
        if let Some(slot) = columns.get_mut(index) {
            *slot = column;
        }
        let table = Self {
            columns,
            n_rows: self.n_rows,
        };
        table.validate()?;
        Ok(table)
    }
}
