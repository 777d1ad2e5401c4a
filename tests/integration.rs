//! End-to-end tests running flow programs through every mode.
mod common;
use keiro::error::{ElementError, RunError};
use keiro::manifest::read_manifest;
use keiro::prelude::*;

#[test]
fn test_execute_resolves_and_records_values() {
    let (dir, mut project) = common::test_project();
    let mut programs = vec![common::sample_program()];

    let values = execute(&mut project, &mut programs).unwrap();
    assert_eq!(values.get("threshold"), Some(&Value::from(42.0)));
    assert_eq!(values.get("run_label"), Some(&Value::from("nightly")));
    // Output keys never land in the value map.
    assert!(!values.contains_key("report"));

    // The output element appended its resolved path to the flow manifest.
    let manifest = dir
        .path()
        .join("outputs")
        .join("quality_check")
        .join("MANIFEST.txt");
    let entries = read_manifest(&manifest).unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].key, "report");
    assert_eq!(entries[0].kind, "FileOutput");
    assert_eq!(
        entries[0].value,
        Value::from(
            dir.path()
                .join("outputs")
                .join("report.json")
                .to_string_lossy()
                .into_owned()
        )
    );
}

#[test]
fn test_execute_fails_on_missing_required_value() {
    let (_dir, mut project) = common::test_project();
    let required = NumberInput::new(InputSpec::new("threshold", Value::Null).unwrap());
    let mut programs =
        vec![FlowProgram::new("strict").with_statement(Statement::input("run", required))];

    let err = execute(&mut project, &mut programs).unwrap_err();
    assert!(matches!(
        err,
        RunError::Element(ElementError::ValueRequired { .. })
    ));
}

#[test]
fn test_execute_tolerates_missing_optional_value() {
    let (_dir, mut project) = common::test_project();
    let optional = NumberInput::new(
        InputSpec::new("threshold", Value::Null)
            .unwrap()
            .with_optional(true),
    );
    let mut programs =
        vec![FlowProgram::new("lenient").with_statement(Statement::input("run", optional))];

    let values = execute(&mut project, &mut programs).unwrap();
    assert_eq!(values.get("threshold"), Some(&Value::Null));
}

#[test]
fn test_counted_element_requires_a_typed_list() {
    let (_dir, mut project) = common::test_project();
    let weights = NumberInput::new(
        InputSpec::new("weights", Value::from(vec![1.0, 2.0]))
            .unwrap()
            .with_count(2),
    );
    let mut programs =
        vec![FlowProgram::new("weights").with_statement(Statement::input("run", weights))];
    assert!(execute(&mut project, &mut programs).is_ok());

    // A scalar where a list is expected.
    let (_dir, mut project) = common::test_project();
    let scalar = NumberInput::new(
        InputSpec::new("weights", Value::from(3.0))
            .unwrap()
            .with_count(2),
    );
    let mut programs =
        vec![FlowProgram::new("weights").with_statement(Statement::input("run", scalar))];
    let err = execute(&mut project, &mut programs).unwrap_err();
    assert!(matches!(
        err,
        RunError::Element(ElementError::ListExpected { .. })
    ));

    // A list with a mistyped item names the expected type.
    let (_dir, mut project) = common::test_project();
    let mixed = NumberInput::new(
        InputSpec::new(
            "weights",
            Value::List(vec![Value::from(1.0), Value::from("two")]),
        )
        .unwrap()
        .with_count(2),
    );
    let mut programs =
        vec![FlowProgram::new("weights").with_statement(Statement::input("run", mixed))];
    match execute(&mut project, &mut programs).unwrap_err() {
        RunError::Element(ElementError::TypeMismatch { expected, .. }) => {
            assert_eq!(expected.to_string(), "number");
        }
        other => panic!("expected a type mismatch, got {other:?}"),
    }
}

#[test]
fn test_dynamic_attributes_follow_earlier_statements() {
    let (_dir, mut project) = common::test_project();
    // `gate` disables the threshold requirement; `files` drives the count.
    let gate = NumberInput::new(InputSpec::new("a", Value::from(2.0)).unwrap());
    let files = Dropdown::new(
        InputSpec::new("b", Value::from(vec!["x", "y"])).unwrap(),
        Options::from(vec!["x", "y", "z"]),
    )
    .with_multiple(true);
    let threshold = NumberInput::new(
        InputSpec::new("threshold", Value::Null)
            .unwrap()
            .with_optional_expr("$a$ > 1")
            .unwrap(),
    );
    let weights = NumberInput::new(
        InputSpec::new("weights", Value::from(vec![0.1, 0.9]))
            .unwrap()
            .with_count_expr("len($b$)")
            .unwrap(),
    );

    let mut programs = vec![
        FlowProgram::new("pipeline")
            .with_statement(Statement::input("run", gate))
            .with_statement(Statement::input("run", files))
            .with_statement(Statement::input("run", threshold))
            .with_statement(Statement::input("run", weights)),
    ];

    let values = execute(&mut project, &mut programs).unwrap();
    assert_eq!(values.get("threshold"), Some(&Value::Null));
    assert_eq!(values.get("weights"), Some(&Value::from(vec![0.1, 0.9])));
}

#[test]
fn test_extract_then_replay_is_idempotent() {
    let (dir, mut project) = common::test_project();
    let mut programs = vec![common::sample_program()];

    let extracted = extract_values(&mut project, &mut programs).unwrap();
    assert_eq!(extracted.get("threshold"), Some(&Value::from(42.0)));
    assert_eq!(extracted.get("run_label"), Some(&Value::from("nightly")));

    let parameters = dir.path().join("parameters.json");
    write_parameters(&parameters, &extracted).unwrap();

    let (_dir2, mut project) = common::test_project();
    let mut programs = vec![common::sample_program()];
    let replayed = replay(&mut project, &parameters, &mut programs).unwrap();
    assert_eq!(replayed.get("threshold"), extracted.get("threshold"));
    assert_eq!(replayed.get("run_label"), extracted.get("run_label"));
}

#[test]
fn test_extraction_skips_validation() {
    let (_dir, mut project) = common::test_project();
    // Out-of-range default: execute would reject it, extraction must not.
    let slider = Slider::new(InputSpec::new("threshold", Value::from(400.0)).unwrap())
        .with_range(0.0, 100.0)
        .unwrap();
    let mut programs =
        vec![FlowProgram::new("raw").with_statement(Statement::input("run", slider))];

    let extracted = extract_values(&mut project, &mut programs).unwrap();
    assert_eq!(extracted.get("threshold"), Some(&Value::from(400.0)));
}

#[test]
fn test_extract_metadata_builds_full_descriptors() {
    let (_dir, mut project) = common::test_project();
    let slider = Slider::new(
        InputSpec::new("Noise Threshold", Value::from(42.0))
            .unwrap()
            .with_optional(true)
            .with_metadata("unit", Value::from("dB"))
            .unwrap(),
    );
    let mut programs =
        vec![FlowProgram::new("meta").with_statement(Statement::input("run", slider))];

    let descriptors = extract_metadata(&mut project, &mut programs).unwrap();
    let descriptor = &descriptors["noise_threshold"];
    assert_eq!(descriptor["key"], "noise_threshold");
    assert_eq!(descriptor["kind"], "Slider");
    assert_eq!(descriptor["label"], "Noise Threshold");
    assert_eq!(descriptor["value"], 42.0);
    assert_eq!(descriptor["count"], serde_json::Value::Null);
    assert_eq!(descriptor["optional"], true);
    assert_eq!(descriptor["disabled"], "_optional_noise_threshold");
    assert_eq!(descriptor["unit"], "dB");
}

#[test]
fn test_cross_flow_duplicate_key_reuses_the_recorded_value() {
    let (_dir, mut project) = common::test_project();
    let mut programs = vec![
        FlowProgram::new("first").with_statement(Statement::input(
            "run",
            NumberInput::new(InputSpec::new("threshold", Value::from(1.0)).unwrap()),
        )),
        FlowProgram::new("second").with_statement(Statement::input(
            "run",
            NumberInput::new(InputSpec::new("threshold", Value::from(2.0)).unwrap()),
        )),
    ];

    let extracted = extract_values(&mut project, &mut programs).unwrap();
    // Flows share one data map: once the first flow records the key, the
    // second flow's declaration reuses it instead of re-recording.
    assert_eq!(extracted.get("threshold"), Some(&Value::from(1.0)));
}

#[test]
fn test_build_descriptor_emits_one_schema_per_flow() {
    let (_dir, mut project) = common::test_project();
    let mut programs = vec![common::sample_program()];

    let document = build_descriptor(&mut project, &mut programs).unwrap();
    let schema = &document["quality_check"];
    assert_eq!(schema["title"], "Quality check");
    assert_eq!(schema["type"], "object");
    assert_eq!(schema["required"], serde_json::json!(["threshold"]));
    assert_eq!(schema["properties"]["threshold"]["kind"], "Slider");
    assert_eq!(schema["properties"]["threshold"]["minimum"], 0.0);
    assert_eq!(schema["properties"]["run_label"]["type"], "string");
    assert_eq!(schema["defaults"]["threshold"], 42.0);
}

#[test]
fn test_build_descriptor_dedupes_output_fragments() {
    let (_dir, mut project) = common::test_project();
    let mut programs = vec![
        FlowProgram::new("outputs")
            .with_statement(Statement::output(
                "run",
                FileOutput::new(ElementSpec::new("first", Value::from("a.bin")).unwrap()),
            ))
            .with_statement(Statement::output(
                "run",
                FileOutput::new(ElementSpec::new("second", Value::from("b.bin")).unwrap()),
            ))
            .with_statement(Statement::output(
                "run",
                CsvOutput::new(ElementSpec::new("table", Value::from("t.csv")).unwrap()),
            )),
    ];

    let document = build_descriptor(&mut project, &mut programs).unwrap();
    let outputs = document["outputs"]["outputs"].as_array().unwrap();
    assert_eq!(outputs.len(), 2);
}

#[test]
fn test_build_descriptor_rejects_flow_key_collision() {
    let (_dir, mut project) = common::test_project();
    let mut programs = vec![FlowProgram::new("threshold").with_statement(Statement::input(
        "run",
        NumberInput::new(InputSpec::new("threshold", Value::from(1.0)).unwrap()),
    ))];

    let err = build_descriptor(&mut project, &mut programs).unwrap_err();
    assert!(matches!(err, RunError::FlowKeyCollision { .. }));
}

#[test]
fn test_file_input_resolves_against_the_data_root() {
    let (dir, mut project) = common::test_project();
    std::fs::write(dir.path().join("orders.csv"), "id,amount\n1,10\n").unwrap();

    let file = FileInput::new(InputSpec::new("orders", Value::from("orders.csv")).unwrap())
        .with_extensions(["csv"]);
    let mut programs =
        vec![FlowProgram::new("load").with_statement(Statement::input("run", file))];

    let values = execute(&mut project, &mut programs).unwrap();
    assert_eq!(
        values.get("orders"),
        Some(&Value::from(
            dir.path().join("orders.csv").to_string_lossy().into_owned()
        ))
    );
}

#[test]
fn test_csv_reader_exposes_columns_to_later_expressions() {
    let (dir, mut project) = common::test_project();
    std::fs::write(dir.path().join("orders.csv"), "id,amount,region\n1,10,EU\n").unwrap();

    let reader = CsvReader::new(InputSpec::new("orders", Value::from("orders.csv")).unwrap());
    let column = Dropdown::new(
        InputSpec::new("group by", Value::from("region")).unwrap(),
        Options::parse("$orders$.columns").unwrap(),
    );
    let mut programs = vec![
        FlowProgram::new("aggregate")
            .with_statement(Statement::input("run", reader))
            .with_statement(Statement::input("run", column)),
    ];

    let values = execute(&mut project, &mut programs).unwrap();
    let table = values.get("orders").unwrap().as_object().unwrap();
    assert_eq!(
        table.get("columns"),
        Some(&Value::from(vec!["id", "amount", "region"]))
    );
    assert_eq!(values.get("group_by"), Some(&Value::from("region")));
}

#[test]
fn test_csv_reader_rejects_a_file_without_a_header() {
    let (dir, mut project) = common::test_project();
    std::fs::write(dir.path().join("empty.csv"), "").unwrap();

    let reader = CsvReader::new(InputSpec::new("orders", Value::from("empty.csv")).unwrap());
    let mut programs =
        vec![FlowProgram::new("aggregate").with_statement(Statement::input("run", reader))];

    match execute(&mut project, &mut programs).unwrap_err() {
        RunError::Element(ElementError::Invalid { key, message }) => {
            assert_eq!(key, "orders");
            assert_eq!(message, "CSV source has no columns");
        }
        other => panic!("expected a validation error, got {other:?}"),
    }
}

#[test]
fn test_false_optional_condition_still_requires_a_value() {
    let (_dir, mut project) = common::test_project();
    let gate = NumberInput::new(InputSpec::new("a", Value::from(0.0)).unwrap());
    let threshold = NumberInput::new(
        InputSpec::new("threshold", Value::Null)
            .unwrap()
            .with_optional_expr("$a$ > 1")
            .unwrap(),
    );
    let mut programs = vec![
        FlowProgram::new("strict")
            .with_statement(Statement::input("run", gate))
            .with_statement(Statement::input("run", threshold)),
    ];

    let err = execute(&mut project, &mut programs).unwrap_err();
    assert!(matches!(
        err,
        RunError::Element(ElementError::ValueRequired { .. })
    ));
}

#[test]
fn test_unresolvable_optional_condition_tolerates_a_missing_value() {
    let (_dir, mut project) = common::test_project();
    let threshold = NumberInput::new(
        InputSpec::new("threshold", Value::Null)
            .unwrap()
            .with_optional_expr("$absent$ > 1")
            .unwrap(),
    );
    let mut programs =
        vec![FlowProgram::new("lenient").with_statement(Statement::input("run", threshold))];

    let values = execute(&mut project, &mut programs).unwrap();
    assert_eq!(values.get("threshold"), Some(&Value::Null));
}
