#![allow(missing_docs)]

pub mod cascade;
pub mod error;
pub mod mirror;
pub mod spec;
pub mod validate;
pub mod value;
pub mod visibility;

pub use cascade::{BarrierState, CascadeController, CascadeOutcome, Effect, EffectLog, FieldEffects};
pub use error::{RegistrationMismatch, RuleError, UnresolvedTargetReference};
pub use mirror::{MirrorValidator, SubmittedValues};
pub use spec::{
    ClearKind, Field, FieldDocument, FieldId, FieldSet, FieldType, RawField, RawRule, Rule,
    RuleSet, ShowValues, normalize,
};
pub use validate::{ValidationError, ValidationResult, validate_submission};
pub use value::{NULL_TOKEN, NullMatching};
pub use visibility::{VisibilityMap, evaluate, evaluate_with};

/// JSON schema of the stored field configuration document.
pub fn field_config_schema() -> schemars::Schema {
    schemars::schema_for!(FieldDocument)
}

/// JSON schema of a signup submission.
pub fn submission_schema() -> schemars::Schema {
    schemars::schema_for!(SubmittedValues)
}
