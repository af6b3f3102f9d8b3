//! Integration tests for common bodymass workflows.
//!
//! These tests run the validation engine and the BMI form the way callers
//! do: build the maps, validate, read the messages, compute.

use bodymass::prelude::*;
use bodymass::{FormError, HEIGHT_VALUE, WEIGHT_VALUE};
use bodymass_validation::validate_groups;
use serde_json::{Value, json};
use std::collections::BTreeMap;
use std::io::Write;

fn values(entries: [(&str, &str); 4]) -> BTreeMap<String, Value> {
    entries
        .into_iter()
        .map(|(k, v)| (k.to_string(), json!(v)))
        .collect()
}

fn rules() -> BTreeMap<String, String> {
    [
        ("weight", "Required,Numeric,Min:1"),
        ("height", "Required,Numeric,Min:1"),
        ("weightUnit", "Required"),
        ("heightUnit", "Required"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}

// =============================================================================
// Validator End-to-End
// =============================================================================

#[test]
fn test_end_to_end_success() {
    let input = values([
        ("weight", "70"),
        ("height", "1.75"),
        ("weightUnit", "kg"),
        ("heightUnit", "m"),
    ]);
    let validator = Validator::new(input.clone(), rules(), BTreeMap::new());

    assert!(!validator.fails().unwrap());
    assert_eq!(validator.validate().unwrap(), &input);

    let bmi = bodymass::compute_bmi(70.0, 1.75);
    assert!((bmi - 22.86).abs() < 0.01);
    assert_eq!(Category::from_bmi(bmi), Category::HealthyWeight);
}

#[test]
fn test_end_to_end_failure() {
    let validator = Validator::new(
        values([
            ("weight", ""),
            ("height", "1.75"),
            ("weightUnit", "kg"),
            ("heightUnit", "m"),
        ]),
        rules(),
        BTreeMap::new(),
    );

    assert!(validator.fails().unwrap());
    assert_eq!(validator.invalid_fields().unwrap(), ["weight"]);
    assert_eq!(
        validator.errors().unwrap().first("weight"),
        "The weight field is required"
    );
}

// =============================================================================
// BMI Form
// =============================================================================

#[test]
fn test_form_success_message() {
    let outcome = BmiForm::new()
        .submit_input(FormInput::new("70", "1.75", "kg", "m"))
        .unwrap();

    match outcome {
        FormOutcome::Computed(result) => {
            assert_eq!(result.category, Category::HealthyWeight);
            assert_eq!(
                result.to_string(),
                "Your BMI is 22.86 which means you're Healthy Weight."
            );
        }
        other => panic!("expected a BMI, got {:?}", other),
    }
}

#[test]
fn test_form_categories() {
    let form = BmiForm::new();
    let cases = [
        ("50", Category::Underweight),
        ("70", Category::HealthyWeight),
        ("85", Category::Overweight),
        ("110", Category::Obese),
    ];

    for (weight, expected) in cases {
        let outcome = form
            .submit_input(FormInput::new(weight, "180", "kg", "cm"))
            .unwrap();
        let FormOutcome::Computed(result) = outcome else {
            panic!("{} kg should validate", weight);
        };
        assert_eq!(result.category, expected, "{} kg", weight);
    }
}

#[test]
fn test_form_failure_lists_first_messages() {
    let outcome = BmiForm::new()
        .submit_input(FormInput::new("", "0", "kg", ""))
        .unwrap();

    let FormOutcome::Invalid { errors } = outcome else {
        panic!("expected validation errors");
    };
    assert_eq!(errors[WEIGHT_VALUE], "The weight is required.");
    assert_eq!(errors[HEIGHT_VALUE], "The value should be no less than 1.");
    assert_eq!(errors["height_spinner"], "The height type is required.");
    assert!(!errors.contains_key("weight_spinner"));
}

#[test]
fn test_form_from_config_file() {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    write!(
        file,
        r#"
[form.rules]
weight_value = "Required|Numeric|Min:20|Max:400"

[form.messages]
"weight_value.Min" = "A weight under :min kg is not plausible."
"#
    )
    .unwrap();

    let service = ConfigService::builder()
        .add_auto_file(file.path())
        .build()
        .unwrap();
    let form = BmiForm::from_config(&service).unwrap();

    let FormOutcome::Invalid { errors } = form
        .submit_input(FormInput::new("5", "1.75", "kg", "m"))
        .unwrap()
    else {
        panic!("expected validation errors");
    };
    assert_eq!(errors[WEIGHT_VALUE], "A weight under 20 kg is not plausible.");

    // Unchanged defaults still apply
    assert_eq!(form.messages()["height_value.Required"], "The height is required.");
}

#[test]
fn test_form_rejects_misconfigured_rules() {
    let form = BmiForm::new().with_rule(WEIGHT_VALUE, "Required|Min");
    let err = form
        .submit_input(FormInput::new("70", "1.75", "kg", "m"))
        .unwrap_err();
    assert!(matches!(err, FormError::Validation(_)));
}

// =============================================================================
// Message Bags Across Groups
// =============================================================================

#[tokio::test]
async fn test_groups_merge_into_one_bag() {
    let weight = Validator::builder()
        .value("weight", "")
        .rule("weight", "Required")
        .build();
    let height = Validator::builder()
        .value("height", "tall")
        .rule("height", "Numeric")
        .build();

    let report = validate_groups([weight, height]).await.unwrap();
    assert!(report.failed);

    let mut expected = MessageBag::new();
    expected
        .add("weight", "The weight field is required")
        .add("height", "The height should be a number");
    assert_eq!(report.errors, expected);
}
