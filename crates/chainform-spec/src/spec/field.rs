use std::collections::BTreeSet;

use regex::Regex;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::spec::rules::RuleSet;

/// Stable identifier of a signup field.
pub type FieldId = i64;

/// Control kinds the engine distinguishes when clearing a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    Text,
    Dropdown,
    Confirm,
    Other,
}

impl FieldType {
    pub fn from_raw(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "text" => Self::Text,
            "dropdown" => Self::Dropdown,
            "confirm" | "checkbox" => Self::Confirm,
            _ => Self::Other,
        }
    }
}

/// How a hidden field's control is reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ClearKind {
    Uncheck,
    FirstOption,
    Empty,
}

/// A normalized signup field.
#[derive(Debug, Clone)]
pub struct Field {
    pub id: FieldId,
    pub name: String,
    pub field_type: FieldType,
    pub current_value: Option<String>,
    pub required: bool,
    pub originally_required: Option<bool>,
    pub has_custom_validation: bool,
    pub rules: RuleSet,
    pub options: Vec<String>,
    pub value_validation_regex: Option<Regex>,
}

impl Field {
    pub fn new(id: FieldId, name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            id,
            name: name.into(),
            field_type,
            current_value: None,
            required: false,
            originally_required: None,
            has_custom_validation: false,
            rules: RuleSet::default(),
            options: Vec::new(),
            value_validation_regex: None,
        }
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    /// Attaches conditional rules and marks the field as a custom validation parent.
    pub fn with_rules(mut self, rules: RuleSet) -> Self {
        self.has_custom_validation = true;
        self.rules = rules;
        self
    }

    pub fn with_options<I, S>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options = options.into_iter().map(Into::into).collect();
        self
    }

    /// Records the configured required flag the first time the field is
    /// touched. Later calls return the recorded flag unchanged.
    pub fn capture_originally_required(&mut self) -> bool {
        *self.originally_required.get_or_insert(self.required)
    }

    pub fn candidate_targets(&self) -> BTreeSet<FieldId> {
        self.rules.candidate_targets()
    }

    pub fn clear_kind(&self) -> ClearKind {
        match self.field_type {
            FieldType::Confirm => ClearKind::Uncheck,
            FieldType::Dropdown => ClearKind::FirstOption,
            FieldType::Text | FieldType::Other => ClearKind::Empty,
        }
    }

    /// Value the field holds after its control has been cleared.
    pub fn cleared_value(&self) -> Option<String> {
        match self.clear_kind() {
            ClearKind::Uncheck => Some("false".to_string()),
            ClearKind::FirstOption => self.options.first().cloned(),
            ClearKind::Empty => Some(String::new()),
        }
    }
}
