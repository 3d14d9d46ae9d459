use std::collections::BTreeMap;

use tracing::trace;

use crate::spec::field::{Field, FieldId};
use crate::spec::form::FieldSet;
use crate::value::NullMatching;

/// Shown (`true`) or hidden (`false`) decision per candidate target.
pub type VisibilityMap = BTreeMap<FieldId, bool>;

/// Evaluates `field`'s rules for `value` with lenient null matching.
pub fn evaluate(field: &Field, value: Option<&str>, fields: &FieldSet) -> VisibilityMap {
    evaluate_with(field, value, fields, NullMatching::default())
}

/// Decides every candidate target of `field` and nothing else. Targets that
/// are missing from `fields` are still decided; applying the decision is the
/// caller's concern.
pub fn evaluate_with(
    field: &Field,
    value: Option<&str>,
    fields: &FieldSet,
    null_matching: NullMatching,
) -> VisibilityMap {
    let mut map = VisibilityMap::new();

    for target in field.candidate_targets() {
        let shown = field.rules.shows_target(value, target, null_matching);
        trace!(
            parent = field.id,
            target,
            shown,
            resolved = fields.contains(target),
            "visibility decision"
        );
        map.insert(target, shown);
    }

    map
}
