//! One-element lists.

use crate::core::capability::Constants;
use crate::core::goal::{Goal, GoalKind, expr, int, lit, unsat, ws};
use crate::core::precedence::Precedence;
use crate::core::registry::RuleRegistry;

pub(super) fn register(registry: &mut RuleRegistry) {
    registry.add(GoalKind::Listify, "listify_brackets", listify_brackets);
    registry.add(GoalKind::Listify, "listify_tuple_list", listify_tuple_list);
    registry.add(GoalKind::Listify, "listify_items_map", listify_items_map);
}

fn listify_brackets(_: &Constants, goal: &Goal) -> Vec<Goal> {
    let Goal::Listify(obj) = goal else {
        return unsat();
    };
    vec![expr(
        Precedence::Atom,
        vec![lit("["), ws(), (**obj).clone(), ws(), lit("]")],
    )]
}

fn listify_tuple_list(_: &Constants, goal: &Goal) -> Vec<Goal> {
    let Goal::Listify(obj) = goal else {
        return unsat();
    };
    vec![expr(
        Precedence::PlainFilter,
        vec![lit("("), (**obj).clone(), lit(",)|list")],
    )]
}

/// `{1:obj}|items|list|map('last')|list`
fn listify_items_map(_: &Constants, goal: &Goal) -> Vec<Goal> {
    let Goal::Listify(obj) = goal else {
        return unsat();
    };
    vec![expr(
        Precedence::PlainFilter,
        vec![
            lit("{"),
            int(1),
            lit(":"),
            (**obj).clone(),
            lit("}|items|list|map("),
            Goal::string("last"),
            lit(")|list"),
        ],
    )]
}
