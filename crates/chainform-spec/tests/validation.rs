use serde_json::json;

use chainform_spec::{FieldSet, MirrorValidator, SubmittedValues, validate_submission};

fn signup_fixture() -> FieldSet {
    FieldSet::from_json_str(
        &json!([
            {
                "id": 1,
                "name": "Account type",
                "field_type": "dropdown",
                "required": true,
                "has_custom_validation": true,
                "options": ["personal", "business"],
                "conditional_fields": [
                    { "show_values": ["business"], "target_user_field_ids": [2, 3] }
                ]
            },
            {
                "id": 2,
                "name": "Company",
                "field_type": "text",
                "required": true
            },
            {
                "id": 3,
                "name": "VAT number",
                "field_type": "text",
                "required": true,
                "value_validation_regex": "^[A-Z]{2}[0-9]{8,12}$"
            },
            {
                "id": 4,
                "name": "Accept terms",
                "field_type": "confirm",
                "required": true
            }
        ])
        .to_string(),
    )
    .expect("fixture should load")
}

#[test]
fn hidden_required_fields_are_waived() {
    let fields = signup_fixture();
    let submitted = SubmittedValues::from_json(&json!({ "1": "personal", "4": true }));
    let result = validate_submission(&MirrorValidator::new(&fields), &submitted);

    assert!(result.valid, "{result:?}");
    assert_eq!(result.hidden, vec![2, 3]);
    assert!(result.missing_required.is_empty());
}

#[test]
fn visible_required_fields_must_be_present() {
    let fields = signup_fixture();
    let submitted = SubmittedValues::from_json(&json!({ "1": "business", "2": "  ", "4": true }));
    let result = validate_submission(&MirrorValidator::new(&fields), &submitted);

    assert!(!result.valid);
    assert!(result.hidden.is_empty());
    assert_eq!(result.missing_required, vec![2, 3]);
}

#[test]
fn pattern_mismatch_is_reported() {
    let fields = signup_fixture();
    let submitted = SubmittedValues::from_json(&json!({
        "1": "business",
        "2": "Acme",
        "3": "not-a-vat",
        "4": true
    }));
    let result = validate_submission(&MirrorValidator::new(&fields), &submitted);

    assert!(!result.valid);
    assert_eq!(result.errors.len(), 1);
    assert_eq!(result.errors[0].field_id, 3);
    assert_eq!(result.errors[0].code.as_deref(), Some("pattern_mismatch"));

    let submitted = SubmittedValues::from_json(&json!({
        "1": "business",
        "2": "Acme",
        "3": "DE123456789",
        "4": true
    }));
    assert!(validate_submission(&MirrorValidator::new(&fields), &submitted).valid);
}

#[test]
fn dropdown_values_must_be_options() {
    let fields = signup_fixture();
    let submitted = SubmittedValues::from_json(&json!({ "1": "enterprise", "4": true }));
    let result = validate_submission(&MirrorValidator::new(&fields), &submitted);

    assert!(!result.valid);
    assert_eq!(result.errors[0].field_id, 1);
    assert_eq!(result.errors[0].code.as_deref(), Some("option_mismatch"));
}

#[test]
fn unticked_required_confirm_is_missing() {
    let fields = signup_fixture();
    let submitted = SubmittedValues::from_json(&json!({ "1": "personal", "4": false }));
    let result = validate_submission(&MirrorValidator::new(&fields), &submitted);

    assert!(!result.valid);
    assert_eq!(result.missing_required, vec![4]);
}

#[test]
fn unknown_keys_invalidate_the_submission() {
    let fields = signup_fixture();
    let submitted = SubmittedValues::from_json(&json!({ "1": "personal", "4": true, "99": "x" }));
    let result = validate_submission(&MirrorValidator::new(&fields), &submitted);

    assert!(!result.valid);
    assert_eq!(result.unknown_fields, vec!["99".to_string()]);
}

#[test]
fn disabled_mirror_enforces_every_required_field() {
    let fields = signup_fixture();
    let submitted = SubmittedValues::from_json(&json!({ "1": "personal", "4": true }));
    let mirror = MirrorValidator::new(&fields).with_enabled(false);
    let result = validate_submission(&mirror, &submitted);

    assert!(!result.valid);
    assert!(result.hidden.is_empty());
    assert_eq!(result.missing_required, vec![2, 3]);
}

#[test]
fn result_serializes_without_empty_sections() {
    let fields = signup_fixture();
    let submitted = SubmittedValues::from_json(&json!({ "1": "personal", "4": true }));
    let result = validate_submission(&MirrorValidator::new(&fields), &submitted);

    assert_eq!(
        serde_json::to_value(&result).unwrap(),
        json!({ "valid": true, "hidden": [2, 3] })
    );
}
