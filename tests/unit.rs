//! Unit tests for values, modes, keys and element construction.
mod common;
use keiro::prelude::*;
use keiro::slug::slug;
use std::collections::BTreeSet;

#[test]
fn test_value_display() {
    assert_eq!(format!("{}", Value::Number(42.0)), "42");
    assert_eq!(format!("{}", Value::Number(0.5)), "0.5");
    assert_eq!(format!("{}", Value::Bool(true)), "true");
    assert_eq!(format!("{}", Value::Null), "null");
    assert_eq!(format!("{}", Value::from(vec![1.0, 2.0])), "[1, 2]");
}

#[test]
fn test_value_type_matching() {
    assert!(ValueType::Number.matches(&Value::Number(1.0)));
    assert!(!ValueType::Number.matches(&Value::Text("1".to_string())));
    assert!(ValueType::text_or_number().matches(&Value::Text("a".to_string())));
    assert!(ValueType::text_or_number().matches(&Value::Number(1.0)));
    assert!(ValueType::Any.matches(&Value::Null));
    assert!(!ValueType::Text.matches(&Value::Null));
}

#[test]
fn test_mode_round_trip() {
    assert_eq!(Mode::from("execute"), Mode::Execute);
    assert_eq!(Mode::from("extract_values"), Mode::ExtractValues);
    assert_eq!(Mode::Execute.to_string(), "execute");
    // Unrecognized tags become custom modes and survive the round trip.
    let custom = Mode::from("publish_gallery");
    assert_eq!(custom, Mode::Custom("publish_gallery".to_string()));
    assert_eq!(custom.to_string(), "publish_gallery");
}

#[test]
fn test_slug_normalization() {
    assert_eq!(slug("My Parameter"), "my_parameter");
    assert_eq!(slug("  CSV -- File!  "), "csv_file");
    assert_eq!(slug("already_slugged"), "already_slugged");
}

#[test]
fn test_element_key_is_slugified_label_is_verbatim() {
    let spec = InputSpec::new("My Parameter", Value::from(1.0)).unwrap();
    assert_eq!(spec.key(), "my_parameter");
    assert_eq!(spec.label(), "My Parameter");
}

#[test]
fn test_element_rejects_empty_and_reserved_keys() {
    assert!(matches!(
        InputSpec::new("   ", Value::Null),
        Err(ElementError::EmptyKey)
    ));
    assert!(matches!(
        InputSpec::new("_internal", Value::Null),
        Err(ElementError::ReservedKey(_))
    ));
}

#[test]
fn test_element_rejects_keys_that_slugify_to_nothing() {
    // Symbol-only labels would otherwise produce an empty key and the
    // resolved value could never be recorded in the data map.
    assert!(matches!(
        InputSpec::new("!!!", Value::from(1.0)),
        Err(ElementError::EmptyKey)
    ));
    assert!(matches!(
        InputSpec::new("--- ***", Value::Null),
        Err(ElementError::EmptyKey)
    ));
}

#[test]
fn test_metadata_rejects_reserved_names() {
    let spec = InputSpec::new("x", Value::from(1.0)).unwrap();
    let err = spec.clone().with_metadata("kind", Value::from("custom"));
    assert!(matches!(err, Err(ElementError::ReservedMetadata(_))));

    let spec = spec.with_metadata("unit", Value::from("mm")).unwrap();
    assert_eq!(spec.metadata().get("unit"), Some(&Value::from("mm")));
}

#[test]
fn test_slider_rejects_inverted_range() {
    let err = common::slider("x", 1.0).with_range(10.0, 5.0).unwrap_err();
    assert_eq!(
        err.to_string(),
        "[x] Minimum cannot be greater than maximum: 10 > 5"
    );
}

#[test]
fn test_slider_validates_bounds() {
    let slider = common::slider("x", 50.0);
    assert!(slider.validate(&Value::from(50.0)).is_ok());

    let err = slider.validate(&Value::from(-1.0)).unwrap_err();
    assert_eq!(err.to_string(), "[x] Value lower than minimum: -1 < 0");

    let err = slider.validate(&Value::from(101.0)).unwrap_err();
    assert_eq!(err.to_string(), "[x] Value greater than maximum: 101 > 100");
}

#[test]
fn test_text_input_character_limit() {
    let input = TextInput::new(InputSpec::new("name", Value::from("ok")).unwrap())
        .with_max_chars(3);
    assert!(input.validate(&Value::from("abc")).is_ok());
    let err = input.validate(&Value::from("abcd")).unwrap_err();
    assert_eq!(err.to_string(), "[name] Too many characters: 4 > 3");
}

#[test]
fn test_dropdown_rejects_unknown_choice() {
    let dropdown = Dropdown::new(
        InputSpec::new("color", Value::from("red")).unwrap(),
        Options::from(vec!["red", "green", "blue"]),
    );
    assert!(dropdown.validate(&Value::from("green")).is_ok());
    let err = dropdown.validate(&Value::from("yellow")).unwrap_err();
    assert_eq!(err.to_string(), "[color] Not a valid choice: yellow");
}

#[test]
fn test_dropdown_multiple_validates_each_item() {
    let dropdown = Dropdown::new(
        InputSpec::new("colors", Value::from(vec!["red"])).unwrap(),
        Options::from(vec!["red", "green"]),
    )
    .with_multiple(true);
    assert!(dropdown.validate(&Value::from(vec!["red", "green"])).is_ok());
    assert!(dropdown.validate(&Value::from(vec!["red", "pink"])).is_err());
}

#[test]
fn test_dynamic_options_skip_choice_validation() {
    let dropdown = Dropdown::new(
        InputSpec::new("column", Value::Null).unwrap(),
        Options::parse("$table$.columns").unwrap(),
    );
    assert!(dropdown.validate(&Value::from("anything")).is_ok());
}

#[test]
fn test_dependencies_cover_all_expression_attributes() {
    let element = NumberInput::new(
        InputSpec::new("c", Value::from(1.0))
            .unwrap()
            .with_optional_expr("$a$ > 1")
            .unwrap()
            .with_count_expr("len($b$)")
            .unwrap(),
    );
    let expected: BTreeSet<String> = ["a".to_string(), "b".to_string()].into();
    assert_eq!(element.dependencies(), expected);
}

#[test]
fn test_dropdown_dependencies_include_options() {
    let dropdown = Dropdown::new(
        InputSpec::new("column", Value::Null)
            .unwrap()
            .with_optional_expr("$a$ > 1")
            .unwrap(),
        Options::parse("$orders table$.columns").unwrap(),
    );
    let expected: BTreeSet<String> = ["a".to_string(), "orders_table".to_string()].into();
    assert_eq!(dropdown.dependencies(), expected);
}

#[test]
fn test_output_extension_checks() {
    let csv = CsvOutput::new(ElementSpec::new("table", Value::from("out.csv")).unwrap());
    assert!(csv.validate(&Value::from("out.csv")).is_ok());
    assert!(csv.validate(&Value::from("out.json")).is_err());

    let image = ImageOutput::new(ElementSpec::new("plot", Value::from("plot.png")).unwrap());
    assert!(image.validate(&Value::from("plot.PNG")).is_ok());
    assert!(image.validate(&Value::from("plot.bmp")).is_err());

    let file = FileOutput::new(ElementSpec::new("blob", Value::from("data.bin")).unwrap());
    assert!(file.validate(&Value::from("data.bin")).is_ok());
    assert!(file.validate(&Value::from("")).is_err());
}
