//! Read-only profiling queries over a [`Table`].
//!
//! Every function here is pure: it borrows the table for the duration of one
//! computation and returns an owned result.

use std::collections::{BTreeMap, HashSet};

use super::model::{Column, DataType, Table, Value};

// ---------------------------------------------------------------------------
// Overview telemetry
// ---------------------------------------------------------------------------

/// Headline numbers shown after an upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Overview {
    pub rows: usize,
    pub columns: usize,
    /// Missing cells across the whole table.
    pub missing: usize,
    /// Rows identical to an earlier row.
    pub duplicate_rows: usize,
}

pub fn overview(table: &Table) -> Overview {
    Overview {
        rows: table.n_rows(),
        columns: table.n_cols(),
        missing: table.columns().iter().map(Column::null_count).sum(),
        duplicate_rows: duplicate_rows(table),
    }
}

fn duplicate_rows(table: &Table) -> usize {
    let mut seen: HashSet<Vec<String>> = HashSet::with_capacity(table.n_rows());
    (0..table.n_rows())
        .filter(|&row| {
            let key: Vec<String> = table
                .columns()
                .iter()
                .map(|c| match c.values.get(row) {
                    Some(Value::Null) | None => "\u{0}null".to_owned(),
                    Some(v) => v.to_string(),
                })
                .collect();
            !seen.insert(key)
        })
        .count()
}

// ---------------------------------------------------------------------------
// Descriptive statistics
// ---------------------------------------------------------------------------

/// Descriptive statistics of one numeric column. Undefined statistics
/// (no values, or a spread from a single value) are `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnSummary {
    pub name: String,
    pub count: usize,
    pub mean: Option<f64>,
    pub std: Option<f64>,
    pub min: Option<f64>,
    pub q25: Option<f64>,
    pub median: Option<f64>,
    pub q75: Option<f64>,
    pub max: Option<f64>,
}

/// Summary statistics for every numeric column, in column order.
pub fn summary_statistics(table: &Table) -> Vec<ColumnSummary> {
    table.numeric_columns().map(summarize).collect()
}

fn summarize(col: &Column) -> ColumnSummary {
    let sorted = sorted_values(col);
    let count = sorted.len();
    let mean = col.mean();
    let std = mean.filter(|_| count > 1).map(|m| {
        let ss: f64 = sorted.iter().map(|v| (v - m).powi(2)).sum();
        (ss / (count - 1) as f64).sqrt()
    });

    ColumnSummary {
        name: col.name.clone(),
        count,
        mean,
        std,
        min: sorted.first().copied(),
        q25: quantile(&sorted, 0.25),
        median: quantile(&sorted, 0.5),
        q75: quantile(&sorted, 0.75),
        max: sorted.last().copied(),
    }
}

pub(crate) fn sorted_values(col: &Column) -> Vec<f64> {
    let mut values: Vec<f64> = col.numeric_values().filter(|v| !v.is_nan()).collect();
    values.sort_by(f64::total_cmp);
    values
}

/// Quantile of ascending `sorted` data with linear interpolation between
/// the two nearest ranks.
pub(crate) fn quantile(sorted: &[f64], q: f64) -> Option<f64> {
    let last = sorted.len().checked_sub(1)?;
    let pos = q.clamp(0.0, 1.0) * last as f64;
    let lower = pos.floor() as usize;
    let upper = pos.ceil() as usize;
    let lo = *sorted.get(lower)?;
    let hi = *sorted.get(upper)?;
    Some(lo + (hi - lo) * (pos - lower as f64))
}

// ---------------------------------------------------------------------------
// Missing values and types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NullCount {
    pub column: String,
    pub missing: usize,
}

/// Missing-value count for every column, in column order.
pub fn null_counts(table: &Table) -> Vec<NullCount> {
    table
        .columns()
        .iter()
        .map(|c| NullCount {
            column: c.name.clone(),
            missing: c.null_count(),
        })
        .collect()
}

/// Only the columns that have missing values, for charting.
pub fn missing_only(counts: &[NullCount]) -> Vec<&NullCount> {
    counts.iter().filter(|c| c.missing > 0).collect()
}

/// Number of columns per type tag.
pub fn type_distribution(table: &Table) -> BTreeMap<DataType, usize> {
    let mut dist = BTreeMap::new();
    for col in table.columns() {
        *dist.entry(col.dtype).or_insert(0) += 1;
    }
    dist
}

// ---------------------------------------------------------------------------
// Correlation
// ---------------------------------------------------------------------------

/// Pearson correlations between numeric columns. `values[i][j]` is `None`
/// when the pair has fewer than two complete observations or no variance.
#[derive(Debug, Clone, PartialEq)]
pub struct CorrelationMatrix {
    pub columns: Vec<String>,
    pub values: Vec<Vec<Option<f64>>>,
}

impl CorrelationMatrix {
    pub fn get(&self, i: usize, j: usize) -> Option<f64> {
        self.values.get(i).and_then(|row| row.get(j)).copied().flatten()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Correlation {
    Matrix(CorrelationMatrix),
    /// Fewer than two numeric columns; nothing to correlate.
    InsufficientNumericColumns { found: usize },
}

pub fn correlation_matrix(table: &Table) -> Correlation {
    let numeric: Vec<&Column> = table.numeric_columns().collect();
    if numeric.len() < 2 {
        return Correlation::InsufficientNumericColumns {
            found: numeric.len(),
        };
    }

    let n = numeric.len();
    let mut values = vec![vec![None; n]; n];
    for (i, a) in numeric.iter().enumerate() {
        for (j, b) in numeric.iter().enumerate().skip(i) {
            let r = pearson(a, b);
            if let Some(cell) = values.get_mut(i).and_then(|row| row.get_mut(j)) {
                *cell = r;
            }
            if let Some(cell) = values.get_mut(j).and_then(|row| row.get_mut(i)) {
                *cell = r;
            }
        }
    }

    Correlation::Matrix(CorrelationMatrix {
        columns: numeric.iter().map(|c| c.name.clone()).collect(),
        values,
    })
}

/// Pearson correlation over rows where both columns have a value.
fn pearson(a: &Column, b: &Column) -> Option<f64> {
    let pairs: Vec<(f64, f64)> = a
        .values
        .iter()
        .zip(&b.values)
        .filter_map(|(x, y)| Some((x.as_f64()?, y.as_f64()?)))
        .filter(|(x, y)| !x.is_nan() && !y.is_nan())
        .collect();
    if pairs.len() < 2 {
        return None;
    }

    let n = pairs.len() as f64;
    let mean_x = pairs.iter().map(|p| p.0).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|p| p.1).sum::<f64>() / n;
    let (mut sxy, mut sxx, mut syy) = (0.0, 0.0, 0.0);
    for (x, y) in &pairs {
        let dx = x - mean_x;
        let dy = y - mean_y;
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }
    if sxx == 0.0 || syy == 0.0 {
        return None;
    }
    Some((sxy / (sxx * syy).sqrt()).clamp(-1.0, 1.0))
}
