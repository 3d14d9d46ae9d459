use std::collections::BTreeSet;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::mirror::{MirrorValidator, SubmittedValues};
use crate::spec::field::{Field, FieldId, FieldType};

/// Validation error metadata reported for a submitted field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ValidationError {
    pub field_id: FieldId,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

/// Result returned from [`validate_submission`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ValidationResult {
    pub valid: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<ValidationError>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub missing_required: Vec<FieldId>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub hidden: Vec<FieldId>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub unknown_fields: Vec<String>,
}

/// Server-side check of a signup submission. Fields the mirror validator
/// reports as hidden are skipped entirely, whatever their required flag.
pub fn validate_submission(
    mirror: &MirrorValidator<'_>,
    submitted: &SubmittedValues,
) -> ValidationResult {
    let fields = mirror.fields();
    let mut errors = Vec::new();
    let mut missing_required = Vec::new();
    let mut hidden = Vec::new();

    for field in fields.iter() {
        if mirror.is_hidden(field, submitted) {
            hidden.push(field.id);
            continue;
        }

        let value = submitted.get(field.id);
        if !is_present(field, value) {
            if field.required {
                missing_required.push(field.id);
            }
            continue;
        }

        if let Some(error) = value.and_then(|value| validate_value(field, value)) {
            errors.push(error);
        }
    }

    let known = fields
        .iter()
        .map(|field| field.id.to_string())
        .collect::<BTreeSet<_>>();
    let unknown_fields = submitted
        .keys()
        .filter(|key| !known.contains(*key))
        .map(str::to_string)
        .collect::<Vec<_>>();

    ValidationResult {
        valid: errors.is_empty() && missing_required.is_empty() && unknown_fields.is_empty(),
        errors,
        missing_required,
        hidden,
        unknown_fields,
    }
}

// A required confirm box only counts when it is ticked.
fn is_present(field: &Field, value: Option<&str>) -> bool {
    match (field.field_type, value) {
        (_, None) => false,
        (FieldType::Confirm, Some(value)) => value == "true",
        (_, Some(value)) => !value.trim().is_empty(),
    }
}

fn validate_value(field: &Field, value: &str) -> Option<ValidationError> {
    if let Some(regex) = &field.value_validation_regex
        && !regex.is_match(value)
    {
        return Some(ValidationError {
            field_id: field.id,
            message: format!("value for '{}' does not match the required format", field.name),
            code: Some("pattern_mismatch".into()),
        });
    }

    if field.field_type == FieldType::Dropdown
        && !field.options.is_empty()
        && !field.options.iter().any(|option| option == value)
    {
        return Some(ValidationError {
            field_id: field.id,
            message: format!("'{value}' is not an option of '{}'", field.name),
            code: Some("option_mismatch".into()),
        });
    }

    None
}
