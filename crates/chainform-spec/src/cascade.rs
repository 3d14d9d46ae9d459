use std::collections::BTreeSet;

use serde::Serialize;
use tracing::{debug, warn};

use crate::error::{RegistrationMismatch, UnresolvedTargetReference};
use crate::spec::field::{ClearKind, Field, FieldId};
use crate::spec::form::FieldSet;
use crate::value::NullMatching;
use crate::visibility::{VisibilityMap, evaluate_with};

/// Effects the controller requests from whatever renders the form.
pub trait FieldEffects {
    fn show(&mut self, field_id: FieldId);
    fn hide(&mut self, field_id: FieldId);
    fn clear(&mut self, field_id: FieldId, kind: ClearKind);
}

/// A single requested UI effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "effect", rename_all = "snake_case")]
pub enum Effect {
    Show { field_id: FieldId },
    Hide { field_id: FieldId },
    Clear { field_id: FieldId, kind: ClearKind },
}

/// `FieldEffects` sink that records effects in request order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EffectLog {
    effects: Vec<Effect>,
}

impl EffectLog {
    pub fn effects(&self) -> &[Effect] {
        &self.effects
    }

    pub fn take(&mut self) -> Vec<Effect> {
        std::mem::take(&mut self.effects)
    }
}

impl FieldEffects for EffectLog {
    fn show(&mut self, field_id: FieldId) {
        self.effects.push(Effect::Show { field_id });
    }

    fn hide(&mut self, field_id: FieldId) {
        self.effects.push(Effect::Hide { field_id });
    }

    fn clear(&mut self, field_id: FieldId, kind: ClearKind) {
        self.effects.push(Effect::Clear { field_id, kind });
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BarrierState {
    Registering,
    Ready,
}

/// What one flushed value change did to the form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CascadeOutcome {
    pub parent_id: FieldId,
    pub value: Option<String>,
    pub decisions: VisibilityMap,
    pub hidden_direct: Vec<FieldId>,
    pub hidden_nested: Vec<FieldId>,
}

/// Per-form orchestrator for value changes.
///
/// Value changes of custom validation fields are queued and only evaluated by
/// [`CascadeController::settle`], and only once every custom validation field
/// has registered. Each evaluation applies the parent's decisions to its
/// direct targets, then hides and clears the targets of every direct target
/// that became hidden. The sweep stops there; it is not a transitive closure.
#[derive(Debug, Clone)]
pub struct CascadeController {
    fields: FieldSet,
    null_matching: NullMatching,
    enabled: bool,
    expected: usize,
    registered: BTreeSet<FieldId>,
    pending: Vec<(FieldId, Option<String>)>,
    hidden: BTreeSet<FieldId>,
}

impl CascadeController {
    pub fn new(mut fields: FieldSet) -> Self {
        let parents = fields
            .custom_validation_fields()
            .map(|field| field.id)
            .collect::<Vec<_>>();
        for id in &parents {
            if let Some(field) = fields.get_mut(*id) {
                field.capture_originally_required();
            }
        }

        Self {
            fields,
            null_matching: NullMatching::default(),
            enabled: true,
            expected: parents.len(),
            registered: BTreeSet::new(),
            pending: Vec::new(),
            hidden: BTreeSet::new(),
        }
    }

    pub fn with_null_matching(mut self, null_matching: NullMatching) -> Self {
        self.null_matching = null_matching;
        self
    }

    /// A disabled controller still tracks values and registrations but
    /// requests no effects.
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn state(&self) -> BarrierState {
        if self.registered.len() >= self.expected {
            BarrierState::Ready
        } else {
            BarrierState::Registering
        }
    }

    pub fn expected_count(&self) -> usize {
        self.expected
    }

    pub fn registered_count(&self) -> usize {
        self.registered.len()
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    pub fn fields(&self) -> &FieldSet {
        &self.fields
    }

    pub fn field(&self, field_id: FieldId) -> Option<&Field> {
        self.fields.get(field_id)
    }

    pub fn is_hidden(&self, field_id: FieldId) -> bool {
        self.hidden.contains(&field_id)
    }

    pub fn hidden_fields(&self) -> &BTreeSet<FieldId> {
        &self.hidden
    }

    /// Announces a custom validation field. Repeated registrations are no-ops.
    /// A mismatch is reported but never blocks the barrier: the registration
    /// is simply not counted.
    pub fn register(&mut self, field_id: FieldId) -> Result<BarrierState, RegistrationMismatch> {
        let Some(field) = self.fields.get(field_id) else {
            let mismatch = RegistrationMismatch::UnknownField(field_id);
            debug!(%mismatch, "registration ignored");
            return Err(mismatch);
        };
        if self.registered.contains(&field_id) {
            return Ok(self.state());
        }
        if !field.has_custom_validation {
            let mismatch = RegistrationMismatch::Overflow {
                field_id,
                expected: self.expected,
            };
            warn!(%mismatch, "registration clamped");
            return Err(mismatch);
        }

        self.registered.insert(field_id);
        let state = self.state();
        if state == BarrierState::Ready {
            debug!(
                registered = self.registered.len(),
                "all custom validation fields registered"
            );
        }
        Ok(state)
    }

    /// Records a new value for `field_id`. Custom validation fields are
    /// registered on their first change and queue an evaluation; a later
    /// change of the same field before [`settle`](Self::settle) drops the
    /// queued entry and queues the new value behind every other change.
    pub fn change_value(
        &mut self,
        field_id: FieldId,
        value: Option<String>,
    ) -> Result<BarrierState, RegistrationMismatch> {
        let field = self
            .fields
            .get_mut(field_id)
            .ok_or(RegistrationMismatch::UnknownField(field_id))?;
        field.capture_originally_required();
        field.current_value = value.clone();
        if !field.has_custom_validation {
            return Ok(self.state());
        }

        let state = self.register(field_id)?;
        self.pending.retain(|(id, _)| *id != field_id);
        self.pending.push((field_id, value));
        Ok(state)
    }

    /// Flushes queued evaluations. Runs nothing while registrations are
    /// outstanding; the queue is kept for a later call.
    pub fn settle<E>(&mut self, effects: &mut E) -> Vec<CascadeOutcome>
    where
        E: FieldEffects + ?Sized,
    {
        if self.state() == BarrierState::Registering {
            debug!(
                pending = self.pending.len(),
                registered = self.registered.len(),
                expected = self.expected,
                "waiting for registrations"
            );
            return Vec::new();
        }

        let pending = std::mem::take(&mut self.pending);
        if !self.enabled {
            debug!(dropped = pending.len(), "conditional fields disabled");
            return Vec::new();
        }

        let mut outcomes = Vec::with_capacity(pending.len());
        for (parent_id, value) in pending {
            if let Some(outcome) = self.cascade(parent_id, value, effects) {
                outcomes.push(outcome);
            }
        }
        outcomes
    }

    fn cascade<E>(
        &mut self,
        parent_id: FieldId,
        value: Option<String>,
        effects: &mut E,
    ) -> Option<CascadeOutcome>
    where
        E: FieldEffects + ?Sized,
    {
        let parent = self.fields.get(parent_id)?;
        let decisions = evaluate_with(parent, value.as_deref(), &self.fields, self.null_matching);

        let mut hidden_direct = Vec::new();
        for (&target, &shown) in &decisions {
            if shown {
                self.show_field(parent_id, target, effects);
            } else if self.hide_field(parent_id, target, effects) {
                hidden_direct.push(target);
            }
        }

        let mut hidden_nested = Vec::new();
        for &direct in &hidden_direct {
            let grandchildren = self
                .fields
                .get(direct)
                .map(Field::candidate_targets)
                .unwrap_or_default();
            for nested in grandchildren {
                if !hidden_nested.contains(&nested) && self.hide_field(direct, nested, effects) {
                    hidden_nested.push(nested);
                }
            }
        }

        Some(CascadeOutcome {
            parent_id,
            value,
            decisions,
            hidden_direct,
            hidden_nested,
        })
    }

    fn show_field<E>(&mut self, parent_id: FieldId, target: FieldId, effects: &mut E) -> bool
    where
        E: FieldEffects + ?Sized,
    {
        let Some(field) = self.fields.get_mut(target) else {
            skip_unresolved(parent_id, target);
            return false;
        };
        field.required = field.capture_originally_required();
        effects.show(target);
        self.hidden.remove(&target);
        true
    }

    fn hide_field<E>(&mut self, parent_id: FieldId, target: FieldId, effects: &mut E) -> bool
    where
        E: FieldEffects + ?Sized,
    {
        let Some(field) = self.fields.get_mut(target) else {
            skip_unresolved(parent_id, target);
            return false;
        };
        field.capture_originally_required();
        field.required = false;
        field.current_value = field.cleared_value();
        effects.clear(target, field.clear_kind());
        effects.hide(target);
        self.hidden.insert(target);
        true
    }
}

fn skip_unresolved(parent_id: FieldId, target_id: FieldId) {
    let reference = UnresolvedTargetReference {
        parent_id,
        target_id,
    };
    debug!(%reference, "skipping target");
}
