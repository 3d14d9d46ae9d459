use std::collections::{BTreeMap, BTreeSet};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::trace;

use crate::spec::field::{Field, FieldId};
use crate::spec::form::FieldSet;
use crate::value::{NullMatching, field_value};

/// Raw values posted with a signup, keyed by field id as a string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct SubmittedValues(BTreeMap<String, Option<String>>);

impl SubmittedValues {
    pub fn new() -> Self {
        Self::default()
    }

    /// Canonicalizes a posted object; anything else is an empty submission.
    pub fn from_json(value: &Value) -> Self {
        let values = value
            .as_object()
            .map(|object| {
                object
                    .iter()
                    .map(|(key, value)| (key.trim().to_string(), field_value(value)))
                    .collect()
            })
            .unwrap_or_default();
        Self(values)
    }

    pub fn with(mut self, field_id: FieldId, value: Option<&str>) -> Self {
        self.insert(field_id, value.map(str::to_string));
        self
    }

    pub fn insert(&mut self, field_id: FieldId, value: Option<String>) {
        self.0.insert(field_id.to_string(), value);
    }

    /// Value submitted for `field_id`; absent and null are the same.
    pub fn get(&self, field_id: FieldId) -> Option<&str> {
        self.0
            .get(&field_id.to_string())
            .and_then(|value| value.as_deref())
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

/// Re-derives field visibility from a submission alone, so required-field
/// checks can be waived for fields the signup form had hidden.
#[derive(Debug, Clone, Copy)]
pub struct MirrorValidator<'a> {
    fields: &'a FieldSet,
    null_matching: NullMatching,
    enabled: bool,
}

impl<'a> MirrorValidator<'a> {
    pub fn new(fields: &'a FieldSet) -> Self {
        Self {
            fields,
            null_matching: NullMatching::default(),
            enabled: true,
        }
    }

    pub fn with_null_matching(mut self, null_matching: NullMatching) -> Self {
        self.null_matching = null_matching;
        self
    }

    /// When disabled no field is ever hidden.
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn fields(&self) -> &'a FieldSet {
        self.fields
    }

    /// A field is hidden when any qualifying parent hides it. If any parent
    /// uses a rule-list only rule-list parents qualify; legacy parents are
    /// consulted only when no rule-list parent targets the field.
    pub fn is_hidden(&self, field: &Field, submitted: &SubmittedValues) -> bool {
        if !self.enabled {
            return false;
        }

        let parents = self.fields.parents_of(field.id).collect::<Vec<_>>();
        let rule_list_parents = parents
            .iter()
            .copied()
            .filter(|parent| parent.rules.is_rule_list())
            .collect::<Vec<_>>();
        let qualifying = if rule_list_parents.is_empty() {
            parents
        } else {
            rule_list_parents
        };

        qualifying.into_iter().any(|parent| {
            let value = submitted.get(parent.id);
            let hides = !parent
                .rules
                .shows_target(value, field.id, self.null_matching);
            trace!(parent = parent.id, target = field.id, value = ?value, hides, "mirror decision");
            hides
        })
    }

    pub fn hidden_fields(&self, submitted: &SubmittedValues) -> BTreeSet<FieldId> {
        self.fields
            .iter()
            .filter(|field| self.is_hidden(field, submitted))
            .map(|field| field.id)
            .collect()
    }
}
