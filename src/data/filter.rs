use super::model::{Column, Table};

// ---------------------------------------------------------------------------
// Range predicate over a numeric column
// ---------------------------------------------------------------------------

/// Inclusive numeric range `[low, high]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RangeFilter {
    pub low: f64,
    pub high: f64,
}

impl RangeFilter {
    pub fn new(low: f64, high: f64) -> Self {
        Self { low, high }
    }

    /// Both bounds finite and ordered.
    pub fn is_valid(&self) -> bool {
        self.low.is_finite() && self.high.is_finite() && self.low <= self.high
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.low && value <= self.high
    }
}

/// Return indices of rows whose value in `column` passes the range.
///
/// A row passes when:
/// * its value is numeric and lies in `[low, high]` → passes
/// * its value is missing → fails (a missing value never compares true)
pub fn filtered_indices(column: &Column, range: RangeFilter) -> Vec<usize> {
    column
        .values
        .iter()
        .enumerate()
        .filter(|(_, v)| v.as_f64().is_some_and(|x| range.contains(x)))
        .map(|(i, _)| i)
        .collect()
}

/// Return indices of rows where `column` has a value.
pub fn present_indices(column: &Column) -> Vec<usize> {
    column
        .values
        .iter()
        .enumerate()
        .filter(|(_, v)| !v.is_null())
        .map(|(i, _)| i)
        .collect()
}

/// Min and max of a numeric column, used to seed the range slider.
/// `None` when the column is absent, non-numeric, or has no values.
pub fn numeric_range(table: &Table, column: &str) -> Option<(f64, f64)> {
    let col = table.column(column).filter(|c| c.is_numeric())?;
    col.numeric_values().fold(None, |acc, v| match acc {
        None => Some((v, v)),
        Some((lo, hi)) => Some((f64::min(lo, v), f64::max(hi, v))),
    })
}
