//! Schema inference tests

use super::*;
use crate::error::Error;
use crate::types::{ColumnType, Compression, Encoding, Row};
use arrow::datatypes::{DataType, TimeUnit};
use pretty_assertions::assert_eq;
use test_case::test_case;

fn headers(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| (*s).to_string()).collect()
}

fn row(pairs: &[(&str, &str)]) -> Row {
    pairs
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect()
}

// ============================================================================
// Single value typing
// ============================================================================

#[test_case("30", ColumnType::Numeric ; "integer")]
#[test_case("-3.25", ColumnType::Numeric ; "negative decimal")]
#[test_case("1e5", ColumnType::Numeric ; "exponent")]
#[test_case(" 42 ", ColumnType::Numeric ; "padded number")]
#[test_case("20240101", ColumnType::Numeric ; "digits that look like a date")]
#[test_case("2024-01-01", ColumnType::Timestamp ; "iso date")]
#[test_case("2024/01/01", ColumnType::Timestamp ; "slash date")]
#[test_case("2024-01-15T10:30:00Z", ColumnType::Timestamp ; "rfc3339")]
#[test_case("2024-01-15T10:30:00.123+02:00", ColumnType::Timestamp ; "rfc3339 offset")]
#[test_case("2024-01-15 10:30:00", ColumnType::Timestamp ; "naive datetime")]
#[test_case("Mon, 15 Jan 2024 10:30:00 +0000", ColumnType::Timestamp ; "rfc2822")]
#[test_case("Alice", ColumnType::String ; "word")]
#[test_case("", ColumnType::String ; "empty")]
#[test_case("   ", ColumnType::String ; "blank")]
#[test_case("NaN", ColumnType::String ; "nan spelling")]
#[test_case("inf", ColumnType::String ; "inf spelling")]
#[test_case("2024-13-45", ColumnType::String ; "impossible date")]
#[test_case("not-a-date", ColumnType::String ; "dashed words")]
fn test_infer_type(value: &str, expected: ColumnType) {
    let inferrer = SchemaInferrer::new();
    assert_eq!(inferrer.infer_type(Some(value)), expected);
}

#[test]
fn test_missing_value_is_string() {
    assert_eq!(SchemaInferrer::new().infer_type(None), ColumnType::String);
}

#[test]
fn test_timestamp_detection_disabled() {
    let inferrer = SchemaInferrer::new().with_timestamp_detection(false);
    assert_eq!(inferrer.infer_type(Some("2024-01-01")), ColumnType::String);
    assert_eq!(inferrer.infer_type(Some("7")), ColumnType::Numeric);
}

// ============================================================================
// Schema inference
// ============================================================================

#[test]
fn test_infer_name_age() {
    let schema = infer_schema(
        &headers(&["name", "age"]),
        &row(&[("name", "Alice"), ("age", "30")]),
    )
    .unwrap();

    let names: Vec<&str> = schema.names().collect();
    assert_eq!(names, vec!["name", "age"]);
    assert_eq!(schema.column("name").unwrap().column_type, ColumnType::String);
    assert_eq!(schema.column("age").unwrap().column_type, ColumnType::Numeric);
}

#[test]
fn test_infer_keeps_header_order() {
    let h = headers(&["z", "a", "m"]);
    let schema = infer_schema(&h, &row(&[("z", "1"), ("a", "x"), ("m", "2024-01-01")])).unwrap();

    let types: Vec<ColumnType> = schema.columns().iter().map(|c| c.column_type).collect();
    assert_eq!(
        types,
        vec![ColumnType::Numeric, ColumnType::String, ColumnType::Timestamp]
    );
}

#[test]
fn test_header_without_sample_value_is_string() {
    let schema = infer_schema(&headers(&["id", "note"]), &row(&[("id", "1")])).unwrap();
    assert_eq!(schema.column("note").unwrap().column_type, ColumnType::String);
}

#[test]
fn test_fixed_encoding_and_compression_policy() {
    let schema = infer_schema(&headers(&["a", "b"]), &row(&[("a", "1"), ("b", "x")])).unwrap();
    for column in schema.columns() {
        assert_eq!(column.encoding, Encoding::Plain);
        assert_eq!(column.compression, Compression::Snappy);
    }

    let schema = SchemaInferrer::new()
        .with_compression(Compression::Uncompressed)
        .infer(&headers(&["a"]), &row(&[("a", "1")]))
        .unwrap();
    assert_eq!(schema.columns()[0].compression, Compression::Uncompressed);
}

#[test]
fn test_infer_is_deterministic() {
    let h = headers(&["id", "created", "label"]);
    let sample = row(&[("id", "7"), ("created", "2024-01-01"), ("label", "x")]);

    let first = infer_schema(&h, &sample).unwrap();
    let second = infer_schema(&h, &sample).unwrap();
    assert_eq!(first, second);
    assert_eq!(first.to_json_pretty(), second.to_json_pretty());
}

#[test]
fn test_duplicate_header_rejected() {
    let err = infer_schema(&headers(&["a", "a"]), &row(&[("a", "1")])).unwrap_err();
    assert!(matches!(err, Error::SchemaInference { .. }));
    assert!(err.to_string().contains("duplicate column name 'a'"));
}

#[test]
fn test_empty_header_rejected() {
    let err = infer_schema(&headers(&["a", ""]), &row(&[("a", "1")])).unwrap_err();
    assert!(matches!(err, Error::SchemaInference { .. }));
}

// ============================================================================
// Arrow conversion
// ============================================================================

#[test]
fn test_to_arrow() {
    let schema = infer_schema(
        &headers(&["name", "age", "created"]),
        &row(&[("name", "Bob"), ("age", "25"), ("created", "2024-01-01")]),
    )
    .unwrap();

    let arrow = schema.to_arrow();
    assert_eq!(arrow.fields().len(), 3);
    assert_eq!(arrow.field(0).data_type(), &DataType::Utf8);
    assert_eq!(arrow.field(1).data_type(), &DataType::Float64);
    assert_eq!(
        arrow.field(2).data_type(),
        &DataType::Timestamp(TimeUnit::Millisecond, Some(TIMESTAMP_TZ.into()))
    );
    assert!(arrow.fields().iter().all(|f| !f.is_nullable()));
}

// ============================================================================
// Value parsers
// ============================================================================

#[test]
fn test_parse_timestamp_millis_values() {
    assert_eq!(parse_timestamp_millis("1970-01-01"), Some(0));
    assert_eq!(parse_timestamp_millis("2024-01-01"), Some(1_704_067_200_000));
    assert_eq!(
        parse_timestamp_millis("2024-01-01T00:00:01.5Z"),
        Some(1_704_067_201_500)
    );
    assert_eq!(
        parse_timestamp_millis("2024-01-01T02:00:00+02:00"),
        Some(1_704_067_200_000)
    );
    assert_eq!(parse_timestamp_millis("yesterday"), None);
}

#[test]
fn test_parse_numeric_values() {
    assert_eq!(parse_numeric("30"), Some(30.0));
    assert_eq!(parse_numeric("\t2.5 "), Some(2.5));
    assert_eq!(parse_numeric("1e400"), None);
    assert_eq!(parse_numeric("12abc"), None);
}
