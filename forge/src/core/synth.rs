//! Recursive, memoizing goal resolution against an oracle.
//!
//! A goal resolves by trying its rules in priority order. Each rule yields a
//! plan (a list of sub-goals); a plan resolves when every part resolves and
//! the concatenated text is accepted. Literal text is the only thing the
//! oracle ever sees.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::core::capability::{Capabilities, Constant, Constants, names_bound_to};
use crate::core::derivation::{Node, Subexpressions, unparse};
use crate::core::goal::{Goal, expr, lit};
use crate::core::precedence::Precedence;
use crate::core::registry::{FAST_MODE_WEIGHTS, RulePriorityTable, RuleRegistry};
use crate::oracle::Oracle;

/// Separators a whitespace slot may become, in trial order.
pub const WHITESPACE: [&str; 4] = ["", " ", "\t", "\n"];

/// How the rule priority table starts out.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DetectMode {
    /// Start from registration order.
    #[default]
    Accurate,
    /// Seed cheap, usually-accepted rules to the front.
    Fast,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynthOptions {
    pub capabilities: Capabilities,
    pub detect_mode: DetectMode,
    /// Deepest goal nesting explored before a branch is abandoned.
    pub max_depth: usize,
}

impl Default for SynthOptions {
    fn default() -> Self {
        Self {
            capabilities: Capabilities::default(),
            detect_mode: DetectMode::Accurate,
            max_depth: 256,
        }
    }
}

/// A resolved goal: its text, the context variables it relies on, and the
/// derivation that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Resolution {
    pub text: String,
    pub used: BTreeSet<String>,
    pub tree: Node,
}

impl Resolution {
    pub fn subexpressions(&self) -> Subexpressions<'_> {
        Subexpressions::new(std::slice::from_ref(&self.tree))
    }
}

#[derive(Debug, Clone)]
struct Resolved {
    node: Node,
    used: BTreeSet<String>,
}

struct PlanResult {
    nodes: Vec<Node>,
    used: BTreeSet<String>,
}

pub struct Synthesizer<O> {
    oracle: O,
    registry: Arc<RuleRegistry>,
    priorities: Arc<RulePriorityTable>,
    options: SynthOptions,
    constants: Constants,
    cache: HashMap<Goal, Option<Resolved>>,
    /// Failures caused by the recursion guard; valid for one top-level call.
    provisional_failures: HashSet<Goal>,
    verdicts: HashMap<String, bool>,
    pinned: HashMap<Goal, (String, Precedence)>,
    in_progress: HashSet<Goal>,
    depth: usize,
    guard_trips: u64,
    oracle_calls: u64,
}

impl<O: Oracle> Synthesizer<O> {
    /// Synthesizer over the standard rules with a private priority table.
    pub fn new(oracle: O, options: SynthOptions) -> Self {
        Self::with_parts(
            oracle,
            RuleRegistry::shared(),
            Arc::new(RulePriorityTable::new()),
            options,
        )
    }

    pub fn with_parts(
        oracle: O,
        registry: Arc<RuleRegistry>,
        priorities: Arc<RulePriorityTable>,
        options: SynthOptions,
    ) -> Self {
        if options.detect_mode == DetectMode::Fast {
            priorities.seed(FAST_MODE_WEIGHTS, &registry);
        }
        Self {
            oracle,
            registry,
            priorities,
            options,
            constants: Constants::new(),
            cache: HashMap::new(),
            provisional_failures: HashSet::new(),
            verdicts: HashMap::new(),
            pinned: HashMap::new(),
            in_progress: HashSet::new(),
            depth: 0,
            guard_trips: 0,
            oracle_calls: 0,
        }
    }

    pub fn oracle(&self) -> &O {
        &self.oracle
    }

    pub fn options(&self) -> &SynthOptions {
        &self.options
    }

    pub fn priorities(&self) -> &Arc<RulePriorityTable> {
        &self.priorities
    }

    pub fn constants(&self) -> &Constants {
        &self.constants
    }

    /// Replace the known constants. Cached outcomes depended on the old set,
    /// so the cache is dropped.
    pub fn set_constants(&mut self, constants: Constants) {
        self.constants = constants;
        self.clear_cache();
    }

    /// Drop memoized resolutions. Oracle verdicts are kept: the oracle is
    /// assumed stable for the session.
    pub fn clear_cache(&mut self) {
        self.cache.clear();
        self.provisional_failures.clear();
    }

    /// Number of times the oracle has actually been invoked.
    pub fn oracle_calls(&self) -> u64 {
        self.oracle_calls
    }

    /// Register known-good text for a goal, used by `CachedReference`.
    pub fn pin_expression(
        &mut self,
        goal: Goal,
        text: impl Into<String>,
        precedence: Precedence,
    ) {
        self.pinned.insert(goal, (text.into(), precedence));
    }

    /// Resolve a goal into text, used variables and a derivation tree.
    pub fn resolve(&mut self, goal: &Goal) -> Option<Resolution> {
        self.provisional_failures.clear();
        let resolved = self.resolve_goal(goal)?;
        Some(Resolution {
            text: resolved.node.text.clone(),
            used: resolved.used,
            tree: resolved.node,
        })
    }

    /// Oracle verdict for text, memoized. Empty text is always accepted.
    pub fn check(&mut self, text: &str) -> bool {
        if text.is_empty() {
            return true;
        }
        if let Some(verdict) = self.verdicts.get(text) {
            return *verdict;
        }
        let verdict = self.oracle.accepts(text);
        self.oracle_calls += 1;
        trace!(text, verdict, "oracle verdict");
        self.verdicts.insert(text.to_string(), verdict);
        verdict
    }

    fn resolve_goal(&mut self, goal: &Goal) -> Option<Resolved> {
        if let Goal::Literal(text) = goal {
            return self.check(text).then(|| Resolved {
                node: Node::leaf(goal.clone(), text.clone()),
                used: BTreeSet::new(),
            });
        }
        if let Some(hit) = self.cache.get(goal) {
            return hit.clone();
        }
        if self.provisional_failures.contains(goal) {
            return None;
        }
        if self.depth >= self.options.max_depth || self.in_progress.contains(goal) {
            self.guard_trips += 1;
            trace!(kind = %goal.kind(), depth = self.depth, "recursion guard tripped");
            return None;
        }

        let trips_before = self.guard_trips;
        self.in_progress.insert(goal.clone());
        self.depth += 1;
        let outcome = self.dispatch(goal);
        self.depth -= 1;
        self.in_progress.remove(goal);

        if outcome.is_none() && self.guard_trips != trips_before {
            self.provisional_failures.insert(goal.clone());
        } else {
            self.cache.insert(goal.clone(), outcome.clone());
        }
        outcome
    }

    fn dispatch(&mut self, goal: &Goal) -> Option<Resolved> {
        match goal {
            Goal::Literal(_) | Goal::Unsatisfiable => None,
            Goal::Expression(_, parts) => {
                let plan = self.resolve_plan(parts)?;
                Some(Self::composite(goal.clone(), None, plan))
            }
            Goal::EncloseUnder(precedence, inner) => {
                self.resolve_enclose_under(*precedence, inner)
            }
            Goal::Alternatives(plans) => self.resolve_alternatives(plans),
            Goal::WithContextVariable(name) => {
                if !self.constants.contains_key(name) {
                    return None;
                }
                Some(Resolved {
                    node: Node::leaf(goal.clone(), ""),
                    used: BTreeSet::from([name.clone()]),
                })
            }
            Goal::VariableOf(value) => self.resolve_variable_of(value),
            Goal::TemplateGlobal(name) => self.resolve_global(goal, name, true),
            Goal::FrameworkGlobal(name) => {
                let framework = self.options.capabilities.framework;
                self.resolve_global(goal, name, framework)
            }
            Goal::RequireCapability(capability) => {
                let met = self.options.capabilities.satisfies(*capability);
                if !met {
                    debug!(?capability, "capability unmet");
                }
                met.then(|| Resolved {
                    node: Node::leaf(goal.clone(), ""),
                    used: BTreeSet::new(),
                })
            }
            Goal::WhitespaceSlot => {
                let plans: Vec<Vec<Goal>> = WHITESPACE.iter().map(|ws| vec![lit(*ws)]).collect();
                let resolved = self.resolve_alternatives(&plans)?;
                Some(Self::wrap_single(goal.clone(), resolved))
            }
            Goal::CachedReference(inner) => self.resolve_cached_reference(goal, inner),
            _ => self.resolve_by_rules(goal),
        }
    }

    fn resolve_by_rules(&mut self, goal: &Goal) -> Option<Resolved> {
        let kind = goal.kind();
        let rules = self.priorities.ordered(self.registry.rules_for(kind));
        for rule in rules {
            let plan = (rule.expand)(&self.constants, goal);
            if plan.iter().any(|part| matches!(part, Goal::Unsatisfiable)) {
                continue;
            }
            if let Some(result) = self.resolve_plan(&plan) {
                self.priorities.record_success(rule.name);
                debug!(%kind, rule = rule.name, "rule accepted");
                return Some(Self::composite(goal.clone(), Some(rule.name), result));
            }
            trace!(%kind, rule = rule.name, "rule rejected");
        }
        debug!(%kind, "no rule resolved goal");
        None
    }

    fn resolve_plan(&mut self, plan: &[Goal]) -> Option<PlanResult> {
        if !plan.contains(&Goal::WhitespaceSlot) {
            return self.resolve_parts(plan);
        }
        // Every top-level slot in a plan takes the same separator.
        WHITESPACE.iter().find_map(|ws| {
            let concrete: Vec<Goal> = plan
                .iter()
                .map(|part| match part {
                    Goal::WhitespaceSlot => lit(*ws),
                    other => other.clone(),
                })
                .collect();
            self.resolve_parts(&concrete)
        })
    }

    fn resolve_parts(&mut self, parts: &[Goal]) -> Option<PlanResult> {
        let mut nodes = Vec::with_capacity(parts.len());
        let mut used = BTreeSet::new();
        for part in parts {
            let resolved = self.resolve_goal(part)?;
            used.extend(resolved.used);
            nodes.push(resolved.node);
        }
        if nodes.len() > 1 {
            let text = unparse(&nodes);
            if !self.check(&text) {
                return None;
            }
        }
        Some(PlanResult { nodes, used })
    }

    fn resolve_alternatives(&mut self, plans: &[Vec<Goal>]) -> Option<Resolved> {
        for plan in plans {
            if plan.iter().any(|part| matches!(part, Goal::Unsatisfiable)) {
                continue;
            }
            if let Some(result) = self.resolve_plan(plan) {
                return Some(Self::composite(
                    Goal::Alternatives(vec![plan.clone()]),
                    None,
                    result,
                ));
            }
        }
        None
    }

    fn resolve_enclose_under(&mut self, outer: Precedence, inner: &Goal) -> Option<Resolved> {
        let resolved = self.resolve_goal(inner)?;
        let needs_parens = resolved
            .node
            .realized_precedence()
            .is_some_and(|realized| realized.needs_enclosing_under(outer));
        let goal = Goal::EncloseUnder(outer, Box::new(inner.clone()));
        if !needs_parens {
            return Some(Self::wrap_single(goal, resolved));
        }
        let enclosed = self.resolve_goal(&Goal::Enclose(Box::new(inner.clone())))?;
        Some(Self::wrap_single(goal, enclosed))
    }

    fn resolve_variable_of(&mut self, value: &Constant) -> Option<Resolved> {
        let plans: Vec<Vec<Goal>> = names_bound_to(&self.constants, value)
            .map(|name| vec![lit(name), Goal::WithContextVariable(name.to_string())])
            .collect();
        if plans.is_empty() {
            return None;
        }
        self.resolve_goal(&expr(Precedence::Atom, vec![Goal::Alternatives(plans)]))
    }

    fn resolve_global(&mut self, goal: &Goal, name: &str, available: bool) -> Option<Resolved> {
        if !available || !self.check(name) {
            return None;
        }
        Some(Resolved {
            node: Node::leaf(goal.clone(), name),
            used: BTreeSet::new(),
        })
    }

    fn resolve_cached_reference(&mut self, goal: &Goal, inner: &Goal) -> Option<Resolved> {
        if let Some((text, precedence)) = self.pinned.get(inner).cloned() {
            if self.check(&text) {
                let pinned = Resolved {
                    node: Node {
                        goal: expr(precedence, vec![lit(text.clone())]),
                        rule: None,
                        text: text.clone(),
                        children: vec![Node::leaf(lit(text.clone()), text)],
                    },
                    used: BTreeSet::new(),
                };
                return Some(Self::wrap_single(goal.clone(), pinned));
            }
        }
        let resolved = self.resolve_goal(inner)?;
        Some(Self::wrap_single(goal.clone(), resolved))
    }

    fn composite(goal: Goal, rule: Option<&'static str>, plan: PlanResult) -> Resolved {
        Resolved {
            node: Node {
                goal,
                rule,
                text: unparse(&plan.nodes),
                children: plan.nodes,
            },
            used: plan.used,
        }
    }

    fn wrap_single(goal: Goal, child: Resolved) -> Resolved {
        Resolved {
            node: Node {
                goal,
                rule: None,
                text: child.node.text.clone(),
                children: vec![child.node],
            },
            used: child.used,
        }
    }
}
