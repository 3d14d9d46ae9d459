use std::collections::BTreeSet;

use regex::Regex;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::RuleError;
use crate::spec::field::{Field, FieldId, FieldType};
use crate::spec::rules::{Rule, RuleSet, ShowValues};
use crate::value::scalar_to_show_value;

/// One `conditional_fields` entry as stored by the admin surface.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
pub struct RawRule {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_values: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_value: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_user_field_ids: Option<Value>,
}

/// Field record as stored by the admin surface, before normalization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RawField {
    pub id: FieldId,
    pub name: String,
    #[serde(default = "default_field_type", alias = "type")]
    pub field_type: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub has_custom_validation: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_values: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_user_field_ids: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conditional_fields: Option<Vec<RawRule>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_validation_regex: Option<String>,
}

fn default_field_type() -> String {
    "text".into()
}

/// Field configuration documents are either a bare list or the site payload
/// shape `{ "user_fields": [...] }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum FieldDocument {
    List(Vec<RawField>),
    Site { user_fields: Vec<RawField> },
}

impl FieldDocument {
    pub fn into_fields(self) -> Vec<RawField> {
        match self {
            Self::List(fields) => fields,
            Self::Site { user_fields } => user_fields,
        }
    }
}

/// Normalizes a stored field record. A non-empty rule-list replaces the
/// legacy attributes, which are then not read at all.
pub fn normalize(raw: &RawField) -> Result<Field, RuleError> {
    let rules = match raw.conditional_fields.as_deref() {
        Some(entries) if !entries.is_empty() => {
            let rules = entries
                .iter()
                .enumerate()
                .map(|(idx, entry)| normalize_rule(raw.id, idx, entry))
                .collect::<Result<Vec<_>, _>>()?;
            RuleSet::rule_list(rules)
        }
        _ => RuleSet::Legacy {
            show_values: parse_show_values(raw.show_values.as_ref())
                .map_err(|reason| RuleError::malformed(raw.id, format!("show_values: {reason}")))?,
            target_field_ids: parse_target_ids(raw.target_user_field_ids.as_ref()).map_err(
                |reason| RuleError::malformed(raw.id, format!("target_user_field_ids: {reason}")),
            )?,
        },
    };

    let value_validation_regex = match raw.value_validation_regex.as_deref().map(str::trim) {
        Some(pattern) if !pattern.is_empty() => {
            Some(
                Regex::new(pattern).map_err(|source| RuleError::InvalidRegex {
                    field_id: raw.id,
                    source,
                })?,
            )
        }
        _ => None,
    };

    Ok(Field {
        id: raw.id,
        name: raw.name.clone(),
        field_type: FieldType::from_raw(&raw.field_type),
        current_value: None,
        required: raw.required,
        originally_required: None,
        has_custom_validation: raw.has_custom_validation,
        rules,
        options: raw.options.clone(),
        value_validation_regex,
    })
}

fn normalize_rule(field_id: FieldId, idx: usize, entry: &RawRule) -> Result<Rule, RuleError> {
    let show_values = entry
        .show_values
        .as_ref()
        .filter(|value| !is_blank(value))
        .or(entry.show_value.as_ref());
    let show_values = parse_show_values(show_values).map_err(|reason| {
        RuleError::malformed(field_id, format!("conditional_fields[{idx}].show_values: {reason}"))
    })?;
    let target_field_ids = parse_target_ids(entry.target_user_field_ids.as_ref()).map_err(
        |reason| {
            RuleError::malformed(
                field_id,
                format!("conditional_fields[{idx}].target_user_field_ids: {reason}"),
            )
        },
    )?;
    Ok(Rule {
        show_values,
        target_field_ids,
    })
}

// `null`, `false` and `""` defer to `show_value`; `0` does not.
fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null | Value::Bool(false) => true,
        Value::String(text) => text.is_empty(),
        _ => false,
    }
}

fn parse_show_values(value: Option<&Value>) -> Result<ShowValues, String> {
    match value {
        None | Some(Value::Null) => Ok(ShowValues::default()),
        Some(Value::Array(items)) => {
            let values = items
                .iter()
                .map(|item| {
                    scalar_to_show_value(item)
                        .ok_or_else(|| format!("expected a scalar, found {item}"))
                })
                .collect::<Result<Vec<_>, _>>()?;
            Ok(ShowValues::new(values))
        }
        Some(Value::Object(_)) => Err("expected a scalar or an array of scalars".into()),
        Some(scalar) => Ok(ShowValues::new(scalar_to_show_value(scalar))),
    }
}

fn parse_target_ids(value: Option<&Value>) -> Result<BTreeSet<FieldId>, String> {
    match value {
        None | Some(Value::Null) => Ok(BTreeSet::new()),
        Some(Value::Array(items)) => items.iter().map(parse_target_id).collect(),
        Some(scalar) => parse_target_id(scalar).map(|id| BTreeSet::from([id])),
    }
}

fn parse_target_id(value: &Value) -> Result<FieldId, String> {
    match value {
        Value::Number(number) => number
            .as_i64()
            .ok_or_else(|| format!("{number} is not an integer id")),
        Value::String(text) => text
            .trim()
            .parse::<FieldId>()
            .map_err(|_| format!("'{text}' is not an integer id")),
        other => Err(format!("{other} is not an integer id")),
    }
}
