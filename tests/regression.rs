mod common;

use csv_insight::{
    AnalysisError,
    parser::parse_delimited,
    regression::{CorrelationBand, Point, correlate, linear_trend, pearson},
};

use common::load_fixture;

#[test]
fn pearson_reference_cases() {
    assert_eq!(
        pearson(&[1.0, 2.0, 3.0], &[2.0, 4.0, 6.0]).expect("pearson"),
        Some(1.0)
    );
    assert_eq!(
        pearson(&[1.0, 2.0, 3.0], &[1.0, 1.0, 1.0]).expect("pearson"),
        None
    );
}

#[test]
fn horizontal_data_with_fractional_values_is_not_computable() {
    let table = parse_delimited("x,y\n1,0.1\n2,0.1\n3,0.1\n").expect("parse");
    let result = correlate(&table, "x", "y").expect("correlate");
    assert_eq!(result.pair.len(), 3);
    assert_eq!(result.coefficient, None);
    assert_eq!(result.band, CorrelationBand::NotComputable);
}

#[test]
fn linear_trend_constant_x_uses_first_y_not_mean() {
    assert_eq!(
        linear_trend(&[1.0, 1.0, 1.0], &[2.0, 5.0, 9.0]).expect("trend"),
        vec![2.0, 2.0, 2.0]
    );
}

#[test]
fn mismatched_lengths_are_invalid_input() {
    assert!(matches!(
        pearson(&[1.0, 2.0], &[1.0]),
        Err(AnalysisError::InvalidInput(_))
    ));
    assert!(matches!(
        linear_trend(&[], &[1.0]),
        Err(AnalysisError::InvalidInput(_))
    ));
}

#[test]
fn correlate_pairs_only_fully_numeric_rows() {
    let table = load_fixture("sales.csv");
    let result = correlate(&table, "units", "sales").expect("correlate");

    // The "n/a" sales row is skipped rather than zero-filled.
    assert_eq!(
        result.pair,
        vec![
            Point { x: 4.0, y: 10.0 },
            Point { x: 5.0, y: 20.0 },
            Point { x: 2.0, y: 5.0 },
            Point { x: 6.0, y: 12.0 },
        ]
    );
    let r = result.coefficient.expect("coefficient");
    assert!((-1.0..=1.0).contains(&r));
    assert_eq!(result.trend_endpoints.len(), 2);
    assert_eq!(result.trend_endpoints[0].x, 2.0);
    assert_eq!(result.trend_endpoints[1].x, 6.0);
    assert_ne!(result.band, CorrelationBand::NotComputable);
}

#[test]
fn correlate_without_numeric_pairs_is_not_computable() {
    let table = load_fixture("sales.csv");
    let result = correlate(&table, "region", "sales").expect("correlate");
    assert!(result.pair.is_empty());
    assert_eq!(result.coefficient, None);
    assert_eq!(result.band, CorrelationBand::NotComputable);
    assert!(result.trend_endpoints.is_empty());
}

#[test]
fn correlate_rejects_unknown_columns() {
    let table = load_fixture("sales.csv");
    assert!(matches!(
        correlate(&table, "units", "profit"),
        Err(AnalysisError::InvalidInput(_))
    ));
}

#[test]
fn correlate_is_idempotent() {
    let table = load_fixture("sales.csv");
    let first = correlate(&table, "units", "sales").expect("first");
    let second = correlate(&table, "units", "sales").expect("second");
    assert_eq!(first, second);
}
