//! Chart construction.
//!
//! [`render`] turns a table plus the user's axis selections into a
//! renderer-independent [`Chart`]: positioned marks grouped into series.
//! The UI layer only has to draw them.

use std::collections::BTreeMap;
use std::fmt;

use thiserror::Error;

use super::model::{Column, Table, Value};
use super::profile::quantile;

const BAR_WIDTH: f64 = 0.8;
const MISSING_GROUP: &str = "(missing)";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    Bar,
    Line,
    Scatter,
    Histogram,
    Box,
}

impl ChartKind {
    pub const ALL: [ChartKind; 5] = [
        ChartKind::Bar,
        ChartKind::Line,
        ChartKind::Scatter,
        ChartKind::Histogram,
        ChartKind::Box,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ChartKind::Bar => "Bar",
            ChartKind::Line => "Line",
            ChartKind::Scatter => "Scatter",
            ChartKind::Histogram => "Histogram",
            ChartKind::Box => "Box",
        }
    }

    /// Whether the y-axis selection is used at all.
    pub fn uses_y(self) -> bool {
        !matches!(self, ChartKind::Histogram)
    }
}

impl fmt::Display for ChartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChartError {
    #[error("column '{column}' selected for the {kind} chart does not exist")]
    MissingColumn { column: String, kind: ChartKind },
    #[error("column '{column}' must be numeric for the {axis} axis of a {kind} chart")]
    NonNumericAxis {
        column: String,
        axis: &'static str,
        kind: ChartKind,
    },
}

// ---------------------------------------------------------------------------
// Chart description
// ---------------------------------------------------------------------------

/// How x positions map back to labels.
#[derive(Debug, Clone, PartialEq)]
pub enum XAxis {
    Numeric,
    /// Category `i` sits at x = `i`.
    Categorical(Vec<String>),
}

impl XAxis {
    /// Label for a tick at `x`, if it falls on a category.
    pub fn label_at(&self, x: f64) -> Option<&str> {
        match self {
            XAxis::Numeric => None,
            XAxis::Categorical(labels) => {
                if (x - x.round()).abs() > 1e-6 || x < 0.0 {
                    return None;
                }
                labels.get(x.round() as usize).map(String::as_str)
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BarMark {
    pub x: f64,
    pub height: f64,
    pub width: f64,
}

/// Five-number summary of one box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxMark {
    pub x: f64,
    pub width: f64,
    pub lower_whisker: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub upper_whisker: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Marks {
    /// Connected points, in data order.
    Line(Vec<[f64; 2]>),
    Points(Vec<[f64; 2]>),
    Bars(Vec<BarMark>),
    Boxes(Vec<BoxMark>),
}

impl Marks {
    pub fn len(&self) -> usize {
        match self {
            Marks::Line(p) | Marks::Points(p) => p.len(),
            Marks::Bars(b) => b.len(),
            Marks::Boxes(b) => b.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// One colour group.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub name: String,
    pub marks: Marks,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Chart {
    pub kind: ChartKind,
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub x_axis: XAxis,
    pub series: Vec<Series>,
}

// ---------------------------------------------------------------------------
// Building
// ---------------------------------------------------------------------------

/// Build a chart of `kind` over the selected columns. Histograms ignore `y`;
/// every other kind needs a numeric `y`. `color` splits the marks into one
/// series per distinct value.
pub fn render(
    table: &Table,
    kind: ChartKind,
    x: &str,
    y: &str,
    color: Option<&str>,
) -> Result<Chart, ChartError> {
    let find = |name: &str| {
        table.column(name).ok_or_else(|| ChartError::MissingColumn {
            column: name.to_owned(),
            kind,
        })
    };

    let x_col = find(x)?;
    let y_col = if kind.uses_y() {
        let col = find(y)?;
        if !col.is_numeric() {
            return Err(ChartError::NonNumericAxis {
                column: y.to_owned(),
                axis: "y",
                kind,
            });
        }
        Some(col)
    } else {
        None
    };
    let color_col = color.map(find).transpose()?;

    let (x_axis, positions) = x_positions(x_col);
    let groups = group_rows(table.n_rows(), color_col, y_col.unwrap_or(x_col).name.as_str());

    let series = match (kind, y_col) {
        (ChartKind::Histogram, _) => histogram(x_col, &positions, &x_axis, &groups),
        (_, Some(y_col)) => {
            let ys: Vec<Option<f64>> = y_col.values.iter().map(Value::as_f64).collect();
            match kind {
                ChartKind::Bar => bars(&positions, &ys, &groups),
                ChartKind::Line => points(&positions, &ys, &groups, Marks::Line),
                ChartKind::Scatter => points(&positions, &ys, &groups, Marks::Points),
                _ => boxes(&positions, &ys, &groups),
            }
        }
        (_, None) => Vec::new(),
    };

    let title = match kind {
        ChartKind::Bar => format!("{y} by {x}"),
        ChartKind::Line => format!("{y} Trends"),
        ChartKind::Scatter => format!("Correlation: {y} vs {x}"),
        ChartKind::Histogram => format!("Distribution of {x}"),
        ChartKind::Box => format!("Distribution of {y} by {x}"),
    };
    let y_label = if kind.uses_y() { y.to_owned() } else { "count".to_owned() };

    log::debug!(
        "built {kind} chart '{title}' with {} series over {} rows",
        series.len(),
        table.n_rows()
    );

    Ok(Chart {
        kind,
        title,
        x_label: x.to_owned(),
        y_label,
        x_axis,
        series,
    })
}

/// Numeric columns plot at their value; anything else is categorical and
/// plots at the category's first-appearance index.
fn x_positions(col: &Column) -> (XAxis, Vec<Option<f64>>) {
    if col.is_numeric() {
        return (XAxis::Numeric, col.values.iter().map(Value::as_f64).collect());
    }

    let mut labels: Vec<String> = Vec::new();
    let mut index: BTreeMap<String, usize> = BTreeMap::new();
    let positions = col
        .values
        .iter()
        .map(|v| {
            if v.is_null() {
                return None;
            }
            let label = v.to_string();
            let next = labels.len();
            let i = *index.entry(label.clone()).or_insert_with(|| {
                labels.push(label);
                next
            });
            Some(i as f64)
        })
        .collect();
    (XAxis::Categorical(labels), positions)
}

/// Rows split by colour group, groups in first-appearance order. Without a
/// colour column every row belongs to one group named `default_name`.
struct Groups {
    names: Vec<String>,
    of_row: Vec<usize>,
}

fn group_rows(n_rows: usize, color: Option<&Column>, default_name: &str) -> Groups {
    let Some(col) = color else {
        return Groups {
            names: vec![default_name.to_owned()],
            of_row: vec![0; n_rows],
        };
    };

    let mut names: Vec<String> = Vec::new();
    let of_row = col
        .values
        .iter()
        .map(|v| {
            let name = if v.is_null() {
                MISSING_GROUP.to_owned()
            } else {
                v.to_string()
            };
            match names.iter().position(|n| *n == name) {
                Some(i) => i,
                None => {
                    names.push(name);
                    names.len() - 1
                }
            }
        })
        .collect();
    Groups { names, of_row }
}

impl Groups {
    fn len(&self) -> usize {
        self.names.len()
    }

    /// Side-by-side offset and width for group `g` inside a slot of `width`.
    fn dodge(&self, g: usize, width: f64) -> (f64, f64) {
        let n = self.len().max(1) as f64;
        let w = width / n;
        (-width / 2.0 + w * (g as f64 + 0.5), w)
    }

    fn series(&self, marks: impl Fn(usize) -> Marks) -> Vec<Series> {
        self.names
            .iter()
            .enumerate()
            .map(|(g, name)| Series {
                name: name.clone(),
                marks: marks(g),
            })
            .collect()
    }
}

fn points(
    xs: &[Option<f64>],
    ys: &[Option<f64>],
    groups: &Groups,
    make: fn(Vec<[f64; 2]>) -> Marks,
) -> Vec<Series> {
    groups.series(|g| {
        let pts = xs
            .iter()
            .zip(ys)
            .zip(&groups.of_row)
            .filter(|(_, row_group)| **row_group == g)
            .filter_map(|((x, y), _)| Some([(*x)?, (*y)?]))
            .collect();
        make(pts)
    })
}

/// Smallest gap between distinct x positions, the natural bar slot width.
fn slot_width(xs: &[Option<f64>]) -> f64 {
    let mut distinct: Vec<f64> = xs.iter().flatten().copied().collect();
    distinct.sort_by(f64::total_cmp);
    distinct.dedup();
    distinct
        .windows(2)
        .filter_map(|w| match w {
            [a, b] => Some(b - a),
            _ => None,
        })
        .fold(None, |acc: Option<f64>, gap| Some(acc.map_or(gap, |a| a.min(gap))))
        .unwrap_or(1.0)
}

fn bars(xs: &[Option<f64>], ys: &[Option<f64>], groups: &Groups) -> Vec<Series> {
    let slot = slot_width(xs) * BAR_WIDTH;
    groups.series(|g| {
        // Sum y per x position, keeping first-appearance order.
        let mut sums: Vec<(f64, f64)> = Vec::new();
        for ((x, y), &row_group) in xs.iter().zip(ys).zip(&groups.of_row) {
            let (Some(x), Some(y)) = (x, y) else { continue };
            if row_group != g {
                continue;
            }
            match sums.iter_mut().find(|(sx, _)| sx == x) {
                Some((_, total)) => *total += y,
                None => sums.push((*x, *y)),
            }
        }
        let (offset, width) = groups.dodge(g, slot);
        Marks::Bars(
            sums.into_iter()
                .map(|(x, height)| BarMark {
                    x: x + offset,
                    height,
                    width,
                })
                .collect(),
        )
    })
}

fn boxes(xs: &[Option<f64>], ys: &[Option<f64>], groups: &Groups) -> Vec<Series> {
    let slot = slot_width(xs) * BAR_WIDTH;
    groups.series(|g| {
        let mut by_x: Vec<(f64, Vec<f64>)> = Vec::new();
        for ((x, y), &row_group) in xs.iter().zip(ys).zip(&groups.of_row) {
            let (Some(x), Some(y)) = (x, y) else { continue };
            if row_group != g || y.is_nan() {
                continue;
            }
            match by_x.iter_mut().find(|(bx, _)| bx == x) {
                Some((_, vals)) => vals.push(*y),
                None => by_x.push((*x, vec![*y])),
            }
        }
        let (offset, width) = groups.dodge(g, slot);
        Marks::Boxes(
            by_x.into_iter()
                .filter_map(|(x, mut vals)| {
                    vals.sort_by(f64::total_cmp);
                    box_mark(x + offset, width, &vals)
                })
                .collect(),
        )
    })
}

/// Quartiles plus Tukey whiskers: the furthest data points within 1.5 IQR
/// of the box.
fn box_mark(x: f64, width: f64, sorted: &[f64]) -> Option<BoxMark> {
    let q1 = quantile(sorted, 0.25)?;
    let median = quantile(sorted, 0.5)?;
    let q3 = quantile(sorted, 0.75)?;
    let fence = 1.5 * (q3 - q1);
    let lower_whisker = sorted
        .iter()
        .copied()
        .find(|v| *v >= q1 - fence)
        .unwrap_or(q1);
    let upper_whisker = sorted
        .iter()
        .rev()
        .copied()
        .find(|v| *v <= q3 + fence)
        .unwrap_or(q3);
    Some(BoxMark {
        x,
        width,
        lower_whisker,
        q1,
        median,
        q3,
        upper_whisker,
    })
}

fn histogram(x_col: &Column, xs: &[Option<f64>], axis: &XAxis, groups: &Groups) -> Vec<Series> {
    if matches!(axis, XAxis::Categorical(_)) {
        let ones: Vec<Option<f64>> = xs.iter().map(|x| x.map(|_| 1.0)).collect();
        return bars(xs, &ones, groups);
    }

    let Some(bins) = Bins::for_column(x_col) else {
        return groups.series(|_| Marks::Bars(Vec::new()));
    };
    groups.series(|g| {
        let mut counts = vec![0usize; bins.count];
        for (x, &row_group) in xs.iter().zip(&groups.of_row) {
            let Some(x) = x else { continue };
            if row_group != g {
                continue;
            }
            if let Some(slot) = bins.index(*x).and_then(|i| counts.get_mut(i)) {
                *slot += 1;
            }
        }
        Marks::Bars(
            counts
                .into_iter()
                .enumerate()
                .map(|(i, count)| BarMark {
                    x: bins.center(i),
                    height: count as f64,
                    width: bins.width,
                })
                .collect(),
        )
    })
}

/// Equal-width bins shared by every histogram series.
struct Bins {
    start: f64,
    width: f64,
    count: usize,
}

impl Bins {
    /// Freedman–Diaconis width, clamped to 5..=50 bins. A column with a
    /// single distinct value gets one unit-wide bin centred on it.
    fn for_column(col: &Column) -> Option<Self> {
        let sorted = super::profile::sorted_values(col);
        let (&min, &max) = (sorted.first()?, sorted.last()?);
        if (max - min).abs() < f64::EPSILON {
            return Some(Self {
                start: min - 0.5,
                width: 1.0,
                count: 1,
            });
        }

        let n = sorted.len() as f64;
        let iqr = quantile(&sorted, 0.75)? - quantile(&sorted, 0.25)?;
        let h = if iqr > 0.0 {
            2.0 * iqr / n.cbrt()
        } else {
            (max - min) / n.sqrt()
        };
        let count = (((max - min) / h).ceil() as usize).clamp(5, 50);
        Some(Self {
            start: min,
            width: (max - min) / count as f64,
            count,
        })
    }

    fn index(&self, x: f64) -> Option<usize> {
        if !x.is_finite() || x < self.start {
            return None;
        }
        let i = ((x - self.start) / self.width).floor() as usize;
        // The maximum lands on the closing edge of the last bin.
        Some(i.min(self.count - 1))
    }

    fn center(&self, i: usize) -> f64 {
        self.start + (i as f64 + 0.5) * self.width
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> Table {
        Table::new(vec![
            Column::from_values(
                "city",
                ["a", "b", "a", "c"]
                    .iter()
                    .map(|s| Value::Text((*s).into()))
                    .collect(),
            ),
            Column::from_values(
                "sales",
                vec![
                    Value::Integer(1),
                    Value::Integer(2),
                    Value::Integer(3),
                    Value::Null,
                ],
            ),
            Column::from_values(
                "flag",
                vec![
                    Value::Boolean(true),
                    Value::Boolean(false),
                    Value::Boolean(true),
                    Value::Null,
                ],
            ),
        ])
        .unwrap()
    }

    #[test]
    fn bar_sums_per_category() {
        let chart = render(&table(), ChartKind::Bar, "city", "sales", None).unwrap();
        assert_eq!(chart.title, "sales by city");
        assert_eq!(
            chart.x_axis,
            XAxis::Categorical(vec!["a".into(), "b".into(), "c".into()])
        );
        assert_eq!(chart.series.len(), 1);
        let Marks::Bars(bars) = &chart.series[0].marks else {
            panic!("expected bars");
        };
        let heights: Vec<f64> = bars.iter().map(|b| b.height).collect();
        assert_eq!(heights, vec![4.0, 2.0], "row with missing y is skipped");
    }

    #[test]
    fn non_numeric_y_names_column_and_kind() {
        let err = render(&table(), ChartKind::Scatter, "sales", "city", None).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("city"), "{msg}");
        assert!(msg.contains("Scatter"), "{msg}");
    }

    #[test]
    fn unknown_columns_are_rejected() {
        let err = render(&table(), ChartKind::Line, "nope", "sales", None).unwrap_err();
        assert!(matches!(err, ChartError::MissingColumn { .. }));
        let err = render(&table(), ChartKind::Line, "city", "sales", Some("ghost")).unwrap_err();
        assert!(matches!(err, ChartError::MissingColumn { .. }));
    }

    #[test]
    fn histogram_ignores_y() {
        let chart = render(&table(), ChartKind::Histogram, "sales", "city", None).unwrap();
        assert_eq!(chart.title, "Distribution of sales");
        let total: f64 = match &chart.series[0].marks {
            Marks::Bars(b) => b.iter().map(|b| b.height).sum(),
            other => panic!("unexpected marks {other:?}"),
        };
        assert_eq!(total, 3.0);
    }

    #[test]
    fn color_splits_series() {
        let chart = render(&table(), ChartKind::Scatter, "sales", "sales", Some("flag")).unwrap();
        let names: Vec<&str> = chart.series.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["True", "False", "(missing)"]);
        assert_eq!(chart.series[0].marks.len(), 2);
        assert!(chart.series[2].marks.is_empty());
    }

    #[test]
    fn box_uses_quartiles_and_whiskers() {
        let sorted = [1.0, 2.0, 3.0, 4.0, 100.0];
        let b = box_mark(0.0, 0.8, &sorted).unwrap();
        assert_eq!(b.median, 3.0);
        assert_eq!(b.q1, 2.0);
        assert_eq!(b.q3, 4.0);
        assert_eq!(b.upper_whisker, 4.0, "outlier excluded from whisker");
        assert_eq!(b.lower_whisker, 1.0);
    }

    #[test]
    fn categorical_axis_labels() {
        let axis = XAxis::Categorical(vec!["a".into(), "b".into()]);
        assert_eq!(axis.label_at(1.0), Some("b"));
        assert_eq!(axis.label_at(0.5), None);
        assert_eq!(axis.label_at(-1.0), None);
        assert_eq!(XAxis::Numeric.label_at(1.0), None);
    }
}
