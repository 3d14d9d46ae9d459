use std::collections::BTreeSet;

use serde::Serialize;

use crate::spec::field::FieldId;
use crate::value::{NULL_TOKEN, NullMatching};

/// Stringified values that make a rule match.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ShowValues(BTreeSet<String>);

impl ShowValues {
    pub fn new<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(values.into_iter().map(Into::into).collect())
    }

    /// A missing value matches only the null token. Under lenient matching
    /// the literal string `"null"` matches it as well.
    pub fn matches(&self, value: Option<&str>, null_matching: NullMatching) -> bool {
        match value {
            None => self.0.contains(NULL_TOKEN),
            Some(NULL_TOKEN) if null_matching == NullMatching::Strict => false,
            Some(text) => self.0.contains(text),
        }
    }

    pub fn contains_null_token(&self) -> bool {
        self.0.contains(NULL_TOKEN)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// One entry of a rule-list: when the parent value is one of `show_values`,
/// every id in `target_field_ids` is shown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Rule {
    pub show_values: ShowValues,
    pub target_field_ids: BTreeSet<FieldId>,
}

impl Rule {
    pub fn new<I, S, T>(show_values: I, target_field_ids: T) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
        T: IntoIterator<Item = FieldId>,
    {
        Self {
            show_values: ShowValues::new(show_values),
            target_field_ids: target_field_ids.into_iter().collect(),
        }
    }
}

/// Conditional configuration of a field. The two shapes are never merged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "format", rename_all = "snake_case")]
pub enum RuleSet {
    Legacy {
        show_values: ShowValues,
        target_field_ids: BTreeSet<FieldId>,
    },
    RuleList { rules: Vec<Rule> },
}

impl Default for RuleSet {
    fn default() -> Self {
        Self::Legacy {
            show_values: ShowValues::default(),
            target_field_ids: BTreeSet::new(),
        }
    }
}

impl RuleSet {
    pub fn legacy<I, S, T>(show_values: I, target_field_ids: T) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
        T: IntoIterator<Item = FieldId>,
    {
        Self::Legacy {
            show_values: ShowValues::new(show_values),
            target_field_ids: target_field_ids.into_iter().collect(),
        }
    }

    /// Builds a rule-list set; an empty list yields an empty legacy set.
    pub fn rule_list(rules: Vec<Rule>) -> Self {
        if rules.is_empty() {
            Self::default()
        } else {
            Self::RuleList { rules }
        }
    }

    pub fn is_rule_list(&self) -> bool {
        matches!(self, Self::RuleList { rules } if !rules.is_empty())
    }

    /// Every target id referenced by this set.
    pub fn candidate_targets(&self) -> BTreeSet<FieldId> {
        match self {
            Self::Legacy {
                target_field_ids, ..
            } => target_field_ids.clone(),
            Self::RuleList { rules } => rules
                .iter()
                .flat_map(|rule| rule.target_field_ids.iter().copied())
                .collect(),
        }
    }

    pub fn references(&self, target: FieldId) -> bool {
        match self {
            Self::Legacy {
                target_field_ids, ..
            } => target_field_ids.contains(&target),
            Self::RuleList { rules } => rules
                .iter()
                .any(|rule| rule.target_field_ids.contains(&target)),
        }
    }

    /// Decides whether `target` is shown for the parent value. All rules are
    /// scanned; any matching rule that lists the target shows it.
    pub fn shows_target(
        &self,
        value: Option<&str>,
        target: FieldId,
        null_matching: NullMatching,
    ) -> bool {
        match self {
            Self::Legacy {
                show_values,
                target_field_ids,
            } => target_field_ids.contains(&target) && show_values.matches(value, null_matching),
            Self::RuleList { rules } => rules.iter().any(|rule| {
                rule.show_values.matches(value, null_matching)
                    && rule.target_field_ids.contains(&target)
            }),
        }
    }

    /// Show-value sets carried by this rule set, in declaration order.
    pub fn show_value_sets(&self) -> Vec<&ShowValues> {
        match self {
            Self::Legacy { show_values, .. } => vec![show_values],
            Self::RuleList { rules } => rules.iter().map(|rule| &rule.show_values).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_token_matches_missing_value() {
        let values = ShowValues::new(["null"]);
        assert!(values.matches(None, NullMatching::Lenient));
        assert!(values.matches(None, NullMatching::Strict));
    }

    #[test]
    fn literal_null_string_depends_on_matching_mode() {
        let values = ShowValues::new(["null"]);
        assert!(values.matches(Some("null"), NullMatching::Lenient));
        assert!(!values.matches(Some("null"), NullMatching::Strict));
    }

    #[test]
    fn later_rule_can_show_a_target() {
        let rules = RuleSet::rule_list(vec![
            Rule::new(["a"], [1]),
            Rule::new(["b"], [2]),
            Rule::new(["b"], [1]),
        ]);
        assert!(rules.shows_target(Some("b"), 1, NullMatching::Lenient));
        assert!(rules.shows_target(Some("b"), 2, NullMatching::Lenient));
        assert!(!rules.shows_target(Some("a"), 2, NullMatching::Lenient));
    }

    #[test]
    fn empty_rule_list_falls_back_to_empty_legacy() {
        let rules = RuleSet::rule_list(Vec::new());
        assert!(!rules.is_rule_list());
        assert!(rules.candidate_targets().is_empty());
    }
}
