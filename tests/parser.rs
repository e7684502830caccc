mod common;

use csv_insight::{
    Value,
    parser::{self, ParseOptions},
    workbook::SheetGrid,
};
use encoding_rs::UTF_8;

use common::{fixture_path, load_fixture};

#[test]
fn two_row_input_keeps_every_header_in_every_row() {
    let table = parser::parse_delimited("h1,h2\n1,x\n2,y\n").expect("parse");
    assert_eq!(table.rows.len(), 2);
    for row in &table.rows {
        assert_eq!(row.len(), 2);
        assert!(row.get("h1").is_some());
        assert!(row.get("h2").is_some());
    }
}

#[test]
fn fixture_drops_blank_lines_and_pads_short_rows() {
    let table = load_fixture("sales.csv");
    assert_eq!(
        table.headers,
        vec!["region", "month", "sales", "units", "note"]
    );
    assert_eq!(table.row_count(), 5);

    let last = &table.rows[4];
    assert_eq!(last.value("region"), &Value::Text("east".into()));
    assert_eq!(last.get("note"), Some(&Value::Empty));

    let missing = &table.rows[3];
    assert_eq!(missing.value("sales"), &Value::Text("n/a".into()));
    assert_eq!(missing.value("units"), &Value::Number(3.0));
}

#[test]
fn semicolon_fixture_reads_decimal_commas() {
    let bytes = std::fs::read(fixture_path("precios_semicolon.csv")).expect("read fixture");
    let table = parser::parse_delimited_bytes(
        &bytes,
        ParseOptions {
            delimiter: b';',
            encoding: UTF_8,
        },
    )
    .expect("parse");
    assert_eq!(table.numeric_values("precio"), vec![1.25, 2.5, 3.75]);
    assert_eq!(table.numeric_values("cantidad"), vec![10.0, 4.0, 2.0]);
}

#[test]
fn decimal_comma_in_comma_delimited_text_splits_fields() {
    // With a comma delimiter the decimal comma never survives as one field.
    let table = parser::parse_delimited("a,b\n1,5\n").expect("parse");
    assert_eq!(table.rows[0].value("a"), &Value::Number(1.0));
    assert_eq!(table.rows[0].value("b"), &Value::Number(5.0));
}

#[test]
fn invalid_utf8_is_a_decode_error() {
    let err = parser::parse_delimited_bytes(b"a\n\xff\xfe\n", ParseOptions::default())
        .expect_err("invalid bytes");
    assert!(matches!(err, csv_insight::AnalysisError::Decode { .. }));
}

#[test]
fn grid_and_text_protocols_agree_on_the_same_cells() {
    let text = parser::parse_delimited("name,score\nana,3,5\nluis,\n").expect("parse");
    let grid = SheetGrid::new(vec![
        vec!["name".into(), "score".into()],
        vec!["ana".into(), "3".into()],
        vec!["luis".into(), "".into()],
    ]);
    assert_eq!(grid.to_table(0, &[]), text);
}

#[test]
fn grid_skips_rows_without_content() {
    let grid = SheetGrid::new(vec![
        vec!["a".into(), "b".into()],
        vec!["".into(), "  ".into()],
        vec![],
        vec!["1".into()],
    ]);
    let table = grid.to_table(0, &[]);
    assert_eq!(table.row_count(), 1);
    assert_eq!(table.rows[0].value("b"), &Value::Empty);
}
