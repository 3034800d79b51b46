//! End-to-end tests driving a session the way the dashboard does:
//! upload → transform → profile → chart → export.

use datanexus::data::chart::{self, ChartKind, Marks};
use datanexus::data::export::to_csv;
use datanexus::data::loader::load;
use datanexus::data::model::{Table, Value};
use datanexus::data::profile::{self, Correlation};
use datanexus::data::transform::{ImputeMethod, Transformation, TransformError};
use datanexus::session::Session;

const SMALL: &[u8] = b"a,b\n1,10\n2,\n3,30\n";

fn session() -> Session {
    let mut session = Session::new();
    session.load("small.csv", SMALL).expect("small CSV should load");
    session
}

fn column_f64(table: &Table, name: &str) -> Vec<Option<f64>> {
    table
        .column(name)
        .expect("column exists")
        .values
        .iter()
        .map(Value::as_f64)
        .collect()
}

#[test]
fn upload_keeps_rows_and_headers() {
    let session = session();
    let table = session.table().expect("table loaded");
    assert_eq!(table.n_rows(), 3);
    assert_eq!(table.column_names(), vec!["a".to_owned(), "b".to_owned()]);
    assert_eq!(session.file_name(), Some("small.csv"));
}

#[test]
fn fill_mean_end_to_end() {
    let mut session = session();
    session
        .apply(&Transformation::ImputeColumn {
            column: "b".into(),
            method: ImputeMethod::FillMean,
        })
        .expect("b is numeric");

    let table = session.table().expect("table loaded");
    assert_eq!(column_f64(table, "a"), vec![Some(1.0), Some(2.0), Some(3.0)]);
    assert_eq!(column_f64(table, "b"), vec![Some(10.0), Some(20.0), Some(30.0)]);
}

#[test]
fn filter_range_end_to_end() {
    let mut session = session();
    session
        .apply(&Transformation::FilterRange {
            column: "a".into(),
            low: 2.0,
            high: 3.0,
        })
        .expect("a is numeric");

    let table = session.table().expect("table loaded");
    assert_eq!(column_f64(table, "a"), vec![Some(2.0), Some(3.0)]);
    assert_eq!(column_f64(table, "b"), vec![None, Some(30.0)]);
}

#[test]
fn drop_columns_end_to_end() {
    let mut session = session();
    session
        .apply(&Transformation::DropColumns(["b".to_owned()].into()))
        .expect("drop never fails");

    let table = session.table().expect("table loaded");
    assert_eq!(table.column_names(), vec!["a".to_owned()]);
    assert_eq!(table.n_rows(), 3);
}

#[test]
fn rejected_request_leaves_session_unchanged() {
    let mut session = Session::new();
    session
        .load("mixed.csv", b"name,score\nann,1\nbob,\n")
        .expect("loads");
    let before = session.table().cloned();

    let err = session
        .apply(&Transformation::ImputeColumn {
            column: "name".into(),
            method: ImputeMethod::FillMean,
        })
        .unwrap_err();
    assert_eq!(err, TransformError::NonNumericMean("name".into()));
    assert_eq!(session.table().cloned(), before);

    let err = session
        .apply(&Transformation::FilterRange {
            column: "ghost".into(),
            low: 0.0,
            high: 1.0,
        })
        .unwrap_err();
    assert_eq!(err, TransformError::MissingColumn("ghost".into()));
    assert_eq!(session.table().cloned(), before);
}

#[test]
fn export_reproduces_loaded_cells() {
    let csv = "id,city,temp,ok\n1,Oslo,-3.5,True\n2,Lima,,False\n3,,18.25,\n";
    let table = load("weather.csv", csv.as_bytes()).expect("loads");
    let exported = to_csv(&table).expect("exports");
    assert_eq!(String::from_utf8(exported).expect("utf-8"), csv);
}

#[test]
fn profiling_after_transformations() {
    let mut session = session();
    let table = session.table().expect("table loaded");

    let o = profile::overview(table);
    assert_eq!((o.rows, o.columns, o.missing), (3, 2, 1));
    assert!(matches!(
        profile::correlation_matrix(table),
        Correlation::Matrix(_)
    ));

    session
        .apply(&Transformation::DropColumns(["b".to_owned()].into()))
        .expect("drop never fails");
    let table = session.table().expect("table loaded");
    assert_eq!(
        profile::correlation_matrix(table),
        Correlation::InsufficientNumericColumns { found: 1 }
    );
    assert_eq!(profile::summary_statistics(table).len(), 1);
}

#[test]
fn charts_follow_the_current_table() {
    let mut session = session();
    let before = session.table().cloned().expect("table loaded");
    let built = chart::render(&before, ChartKind::Scatter, "a", "b", None).expect("numeric axes");
    assert_eq!(built.series[0].marks, Marks::Points(vec![[1.0, 10.0], [3.0, 30.0]]));
    assert_eq!(session.table(), Some(&before), "charting never mutates");

    session
        .apply(&Transformation::ImputeColumn {
            column: "b".into(),
            method: ImputeMethod::FillZero,
        })
        .expect("b exists");
    let after = session.table().expect("table loaded");
    let built = chart::render(after, ChartKind::Line, "a", "b", None).expect("numeric axes");
    assert_eq!(
        built.series[0].marks,
        Marks::Line(vec![[1.0, 10.0], [2.0, 0.0], [3.0, 30.0]])
    );
}

#[test]
fn export_after_cleaning_is_named_after_source() {
    let mut session = session();
    session
        .apply(&Transformation::ImputeColumn {
            column: "b".into(),
            method: ImputeMethod::DropRows,
        })
        .expect("b exists");
    let exported = session.export().expect("exports");
    assert_eq!(exported.file_name, "processed_small.csv");
    assert_eq!(
        String::from_utf8(exported.bytes).expect("utf-8"),
        "a,b\n1,10\n3,30\n"
    );
}
