use std::collections::BTreeMap;

use crate::error::{RuleError, UnresolvedTargetReference};
use crate::spec::field::{Field, FieldId};
use crate::spec::raw::{FieldDocument, RawField, normalize};

/// The fields of one signup form, indexed by id and kept in display order.
#[derive(Debug, Clone, Default)]
pub struct FieldSet {
    fields: Vec<Field>,
    index: BTreeMap<FieldId, usize>,
}

impl FieldSet {
    pub fn new(fields: Vec<Field>) -> Result<Self, RuleError> {
        let mut index = BTreeMap::new();
        for (position, field) in fields.iter().enumerate() {
            if index.insert(field.id, position).is_some() {
                return Err(RuleError::DuplicateFieldId(field.id));
            }
        }
        Ok(Self { fields, index })
    }

    /// Normalizes every stored record, failing on the first malformed one.
    pub fn from_raw(raw: &[RawField]) -> Result<Self, RuleError> {
        let fields = raw.iter().map(normalize).collect::<Result<Vec<_>, _>>()?;
        Self::new(fields)
    }

    pub fn from_json_str(json: &str) -> Result<Self, RuleError> {
        let document: FieldDocument = serde_json::from_str(json)?;
        Self::from_raw(&document.into_fields())
    }

    pub fn get(&self, id: FieldId) -> Option<&Field> {
        let position = *self.index.get(&id)?;
        self.fields.get(position)
    }

    pub fn get_mut(&mut self, id: FieldId) -> Option<&mut Field> {
        let position = *self.index.get(&id)?;
        self.fields.get_mut(position)
    }

    pub fn contains(&self, id: FieldId) -> bool {
        self.index.contains_key(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Field> {
        self.fields.iter()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Fields whose value drives other fields.
    pub fn custom_validation_fields(&self) -> impl Iterator<Item = &Field> {
        self.fields.iter().filter(|field| field.has_custom_validation)
    }

    /// Parents whose candidate targets include `target`.
    pub fn parents_of(&self, target: FieldId) -> impl Iterator<Item = &Field> {
        self.custom_validation_fields()
            .filter(move |field| field.rules.references(target))
    }

    pub fn unresolved_references(&self) -> Vec<UnresolvedTargetReference> {
        self.fields
            .iter()
            .flat_map(|field| {
                let parent_id = field.id;
                field
                    .candidate_targets()
                    .into_iter()
                    .filter(move |target| !self.contains(*target))
                    .map(move |target_id| UnresolvedTargetReference {
                        parent_id,
                        target_id,
                    })
            })
            .collect()
    }
}
