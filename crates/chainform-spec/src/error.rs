use thiserror::Error;

use crate::spec::field::FieldId;

/// Errors raised while loading field configuration.
#[derive(Debug, Error)]
pub enum RuleError {
    #[error("field {field_id}: malformed rule ({reason})")]
    MalformedRule { field_id: FieldId, reason: String },
    #[error("field {field_id}: invalid value validation regex")]
    InvalidRegex {
        field_id: FieldId,
        #[source]
        source: regex::Error,
    },
    #[error("duplicate field id {0}")]
    DuplicateFieldId(FieldId),
    #[error("field configuration is not valid json: {0}")]
    Parse(#[from] serde_json::Error),
}

impl RuleError {
    pub(crate) fn malformed(field_id: FieldId, reason: impl Into<String>) -> Self {
        Self::MalformedRule {
            field_id,
            reason: reason.into(),
        }
    }
}

/// A rule points at a field id that does not exist in the loaded form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("field {parent_id} targets unknown field {target_id}")]
pub struct UnresolvedTargetReference {
    pub parent_id: FieldId,
    pub target_id: FieldId,
}

/// Registration that the barrier could not count. The controller clamps and
/// keeps working; the value is informational.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RegistrationMismatch {
    #[error("field {0} is not part of this form")]
    UnknownField(FieldId),
    #[error("field {field_id} registered beyond the {expected} expected custom validation fields")]
    Overflow { field_id: FieldId, expected: usize },
}
