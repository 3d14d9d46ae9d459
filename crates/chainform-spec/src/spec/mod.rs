pub mod field;
pub mod form;
pub mod raw;
pub mod rules;

pub use field::{ClearKind, Field, FieldId, FieldType};
pub use form::FieldSet;
pub use raw::{FieldDocument, RawField, RawRule, normalize};
pub use rules::{Rule, RuleSet, ShowValues};
