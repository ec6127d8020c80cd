//! Rule registry and the success-count table that orders it.
//!
//! Rules are registered explicitly, per goal kind, by each module under
//! `crate::rules`. Registration order is the default trial order; the
//! priority table moves rules that keep winning to the front.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, OnceLock, PoisonError};

use crate::core::capability::Constants;
use crate::core::goal::{Goal, GoalKind};

/// Expand a goal into a plan. Pure: no oracle access, no state.
pub type RuleFn = fn(&Constants, &Goal) -> Vec<Goal>;

#[derive(Debug, Clone, Copy)]
pub struct Rule {
    pub name: &'static str,
    pub kind: GoalKind,
    pub expand: RuleFn,
}

/// Closed, enum-keyed table of rules.
#[derive(Debug, Default)]
pub struct RuleRegistry {
    rules: BTreeMap<GoalKind, Vec<Rule>>,
}

impl RuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every rule module in `crate::rules`.
    pub fn standard() -> Self {
        let mut registry = Self::new();
        crate::rules::register_all(&mut registry);
        registry
    }

    /// Process-wide standard registry, built on first use.
    pub fn shared() -> Arc<RuleRegistry> {
        static SHARED: OnceLock<Arc<RuleRegistry>> = OnceLock::new();
        Arc::clone(SHARED.get_or_init(|| Arc::new(RuleRegistry::standard())))
    }

    pub fn add(&mut self, kind: GoalKind, name: &'static str, expand: RuleFn) {
        self.rules
            .entry(kind)
            .or_default()
            .push(Rule { name, kind, expand });
    }

    /// Rules for a kind, in registration order.
    pub fn rules_for(&self, kind: GoalKind) -> &[Rule] {
        self.rules.get(&kind).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.rules.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn find(&self, name: &str) -> Option<&Rule> {
        self.rules.values().flatten().find(|rule| rule.name == name)
    }
}

/// Success counters keyed by rule name.
///
/// Shared by every session that holds the same `Arc`; counters never persist
/// beyond the process.
#[derive(Debug, Default)]
pub struct RulePriorityTable {
    counts: Mutex<HashMap<&'static str, u64>>,
}

/// Weights seeded in fast mode: rules that are cheap and usually accepted.
pub const FAST_MODE_WEIGHTS: &[(&str, u64)] = &[
    ("percent_lower_c_concat", 100),
    ("lower_c_joiner_batch", 100),
    ("percent_urlencode_escape", 100),
    ("string_two_part_concat", 100),
    ("string_char_concat", 100),
    ("string_char_concat_tilde", 100),
    ("string_format_percent", 100),
    ("attribute_attr_filter", 100),
    ("item_dunder_getitem", 100),
];

impl RulePriorityTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process-wide table, for hosts that want learned priorities shared
    /// across sessions.
    pub fn global() -> Arc<RulePriorityTable> {
        static GLOBAL: OnceLock<Arc<RulePriorityTable>> = OnceLock::new();
        Arc::clone(GLOBAL.get_or_init(|| Arc::new(RulePriorityTable::new())))
    }

    /// Raise counters to at least the given weights.
    pub fn seed(&self, weights: &[(&str, u64)], registry: &RuleRegistry) {
        let mut counts = self.counts.lock().unwrap_or_else(PoisonError::into_inner);
        for (name, weight) in weights {
            if let Some(rule) = registry.find(name) {
                let count = counts.entry(rule.name).or_insert(0);
                *count = (*count).max(*weight);
            }
        }
    }

    pub fn record_success(&self, rule: &'static str) {
        let mut counts = self.counts.lock().unwrap_or_else(PoisonError::into_inner);
        *counts.entry(rule).or_insert(0) += 1;
    }

    pub fn count(&self, rule: &str) -> u64 {
        let counts = self.counts.lock().unwrap_or_else(PoisonError::into_inner);
        counts.get(rule).copied().unwrap_or(0)
    }

    /// Rules ordered by descending success count; ties keep registration
    /// order.
    pub fn ordered(&self, rules: &[Rule]) -> Vec<Rule> {
        let counts = self.counts.lock().unwrap_or_else(PoisonError::into_inner);
        let mut ordered = rules.to_vec();
        ordered.sort_by_key(|rule| {
            std::cmp::Reverse(counts.get(rule.name).copied().unwrap_or(0))
        });
        ordered
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::goal::{expr_lit, unsat};
    use crate::core::precedence::Precedence;

    fn first(_: &Constants, _: &Goal) -> Vec<Goal> {
        vec![expr_lit(Precedence::Atom, "0")]
    }

    fn second(_: &Constants, _: &Goal) -> Vec<Goal> {
        unsat()
    }

    fn registry() -> RuleRegistry {
        let mut registry = RuleRegistry::new();
        registry.add(GoalKind::Zero, "zero_a", first);
        registry.add(GoalKind::Zero, "zero_b", second);
        registry.add(GoalKind::Zero, "zero_c", first);
        registry
    }

    fn names(rules: &[Rule]) -> Vec<&'static str> {
        rules.iter().map(|rule| rule.name).collect()
    }

    #[test]
    fn fresh_table_keeps_registration_order() {
        let registry = registry();
        let table = RulePriorityTable::new();
        let ordered = table.ordered(registry.rules_for(GoalKind::Zero));
        assert_eq!(names(&ordered), vec!["zero_a", "zero_b", "zero_c"]);
    }

    #[test]
    fn successful_rules_move_forward_ties_stable() {
        let registry = registry();
        let table = RulePriorityTable::new();
        table.record_success("zero_c");
        table.record_success("zero_c");
        table.record_success("zero_b");
        let ordered = table.ordered(registry.rules_for(GoalKind::Zero));
        assert_eq!(names(&ordered), vec!["zero_c", "zero_b", "zero_a"]);
    }

    #[test]
    fn seed_raises_but_never_lowers() {
        let registry = registry();
        let table = RulePriorityTable::new();
        for _ in 0..5 {
            table.record_success("zero_b");
        }
        table.seed(&[("zero_b", 3), ("zero_a", 2), ("missing", 9)], &registry);
        assert_eq!(table.count("zero_b"), 5);
        assert_eq!(table.count("zero_a"), 2);
        assert_eq!(table.count("missing"), 0);
    }

    #[test]
    fn unknown_kind_has_no_rules() {
        assert!(registry().rules_for(GoalKind::OsModule).is_empty());
    }

    #[test]
    fn standard_registry_covers_every_rule_kind() {
        let registry = RuleRegistry::standard();
        for kind in [
            GoalKind::Zero,
            GoalKind::PositiveInteger,
            GoalKind::Integer,
            GoalKind::StringValue,
            GoalKind::Character,
            GoalKind::AttributeOf,
            GoalKind::ItemOf,
            GoalKind::BuiltinsTable,
            GoalKind::OsModule,
            GoalKind::ProcessSpawnAndRead,
        ] {
            assert!(!registry.rules_for(kind).is_empty(), "{kind} has no rules");
        }
    }

    #[test]
    fn fast_mode_weights_name_registered_rules() {
        let registry = RuleRegistry::standard();
        for (name, _) in FAST_MODE_WEIGHTS {
            assert!(registry.find(name).is_some(), "{name} is not registered");
        }
    }
}
