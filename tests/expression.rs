//! Tests for the dynamic-expression parser and engine.
use ahash::AHashMap;
use keiro::error::ExprError;
use keiro::expr::{Condition, Count, ExprEngine, Options, parse, parse_opt, scan_refs};
use keiro::value::Value;
use std::collections::BTreeMap;

fn data(entries: &[(&str, Value)]) -> AHashMap<String, Value> {
    entries
        .iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect()
}

fn eval(text: &str, data: &AHashMap<String, Value>) -> Result<Value, ExprError> {
    ExprEngine::new(Some(data)).eval(&parse(text)?)
}

#[test]
fn test_arithmetic_and_precedence() {
    let data = data(&[]);
    assert_eq!(eval("1 + 2 * 3", &data).unwrap(), Value::Number(7.0));
    assert_eq!(eval("(1 + 2) * 3", &data).unwrap(), Value::Number(9.0));
    assert_eq!(eval("-4 / 2", &data).unwrap(), Value::Number(-2.0));
}

#[test]
fn test_key_references_are_slugified() {
    let data = data(&[("orders_table", Value::from(10.0))]);
    assert_eq!(eval("$Orders Table$ + 1", &data).unwrap(), Value::Number(11.0));
}

#[test]
fn test_missing_key_is_an_error() {
    let data = data(&[]);
    assert!(matches!(
        eval("$missing$ + 1", &data),
        Err(ExprError::KeyNotFound(_))
    ));
}

#[test]
fn test_field_access_on_objects() {
    let mut table = BTreeMap::new();
    table.insert("file".to_string(), Value::from("orders.csv"));
    table.insert(
        "columns".to_string(),
        Value::from(vec!["id", "amount"]),
    );
    let data = data(&[("orders", Value::Object(table))]);

    assert_eq!(
        eval("$orders$.columns", &data).unwrap(),
        Value::from(vec!["id", "amount"])
    );
    assert!(matches!(
        eval("$orders$.rows", &data),
        Err(ExprError::FieldNotFound { .. })
    ));
}

#[test]
fn test_comparisons_and_logic() {
    let data = data(&[("a", Value::from(2.0))]);
    assert_eq!(eval("$a$ > 1", &data).unwrap(), Value::Bool(true));
    assert_eq!(eval("$a$ == 2 and $a$ < 3", &data).unwrap(), Value::Bool(true));
    assert_eq!(eval("$a$ != 2 or $a$ >= 2", &data).unwrap(), Value::Bool(true));
    assert_eq!(eval("not ($a$ > 1)", &data).unwrap(), Value::Bool(false));
}

#[test]
fn test_logic_short_circuits() {
    // The right operand references a missing key; short-circuiting means
    // it is never looked up.
    let data = data(&[("a", Value::from(true))]);
    assert_eq!(eval("$a$ or $missing$", &data).unwrap(), Value::Bool(true));
    assert_eq!(
        eval("not $a$ and $missing$", &data).unwrap(),
        Value::Bool(false)
    );
}

#[test]
fn test_allowed_functions() {
    let data = data(&[("files", Value::from(vec!["a.csv", "b.csv"]))]);
    assert_eq!(eval("len($files$)", &data).unwrap(), Value::Number(2.0));
    assert_eq!(eval("len(\"abc\")", &data).unwrap(), Value::Number(3.0));
    assert_eq!(eval("abs(-3)", &data).unwrap(), Value::Number(3.0));
    assert_eq!(eval("min(3, 1, 2)", &data).unwrap(), Value::Number(1.0));
    assert_eq!(eval("max(3, 1, 2)", &data).unwrap(), Value::Number(3.0));
}

#[test]
fn test_unknown_function_is_rejected() {
    assert!(matches!(
        parse("exec($a$)"),
        Err(ExprError::UnknownFunction(_))
    ));
}

#[test]
fn test_scan_refs_orders_and_dedupes() {
    let refs = scan_refs("len($My Files$) + $a$ - $my_files$");
    assert_eq!(refs, vec!["my_files".to_string(), "a".to_string()]);
}

#[test]
fn test_scan_refs_without_markers_is_empty() {
    assert!(scan_refs("plain text, no references").is_empty());
}

#[test]
fn test_parse_opt_passes_none_through() {
    assert_eq!(parse_opt(None).unwrap(), None);
    assert!(parse_opt(Some("1 +")).is_err());
}

#[test]
fn test_count_resolution() {
    let data = data(&[("files", Value::from(vec!["a", "b", "c"]))]);
    assert_eq!(Count::from(4).resolve(Some(&data)).unwrap(), 4);
    let count = Count::parse("len($files$)").unwrap();
    assert_eq!(count.resolve(Some(&data)).unwrap(), 3);

    // Counts must be non-negative whole numbers.
    let bad = Count::parse("1 / 2").unwrap();
    assert!(matches!(
        bad.resolve(Some(&data)),
        Err(ExprError::InvalidCount(_))
    ));
}

#[test]
fn test_condition_resolution() {
    let data = data(&[("a", Value::from(2.0))]);
    let condition = Condition::parse("$a$ > 1").unwrap();
    assert_eq!(condition.resolve(Some(&data)).unwrap(), true);
    assert!(matches!(
        Condition::parse("$a$ + 1").unwrap().resolve(Some(&data)),
        Err(ExprError::InvalidCondition(_))
    ));
}

#[test]
fn test_options_resolution() {
    let mut table = BTreeMap::new();
    table.insert("columns".to_string(), Value::from(vec!["id", "amount"]));
    let data = data(&[("orders", Value::Object(table))]);

    let options = Options::parse("$orders$.columns").unwrap();
    assert_eq!(
        options.resolve(Some(&data)).unwrap(),
        vec![Value::from("id"), Value::from("amount")]
    );
    assert!(matches!(
        Options::parse("len($orders$.columns)")
            .unwrap()
            .resolve(Some(&data)),
        Err(ExprError::InvalidOptions(_))
    ));
}

#[test]
fn test_type_mismatch_reports_operation() {
    let data = data(&[("a", Value::from("text"))]);
    let err = eval("$a$ * 2", &data).unwrap_err();
    assert!(matches!(err, ExprError::TypeMismatch { .. }));
}

#[test]
fn test_type_mismatch_names_the_offending_operand() {
    let data = data(&[("a", Value::from("text"))]);
    match eval("2 * $a$", &data).unwrap_err() {
        ExprError::TypeMismatch { found, .. } => assert_eq!(found, Value::from("text")),
        other => panic!("unexpected error: {other}"),
    }
    match eval("1 < $a$", &data).unwrap_err() {
        ExprError::TypeMismatch { found, .. } => assert_eq!(found, Value::from("text")),
        other => panic!("unexpected error: {other}"),
    }
}
