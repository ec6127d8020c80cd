//! Grouping, concatenation, arithmetic operators and calls.
//!
//! Operators have an infix form and a dunder-method form; the method form is
//! expressed through `AttributeOf`/`FunctionCall` goals so that every access
//! strategy in `access` applies to it.

use crate::core::capability::{Constant, Constants};
use crate::core::goal::{
    Goal, GoalKind, expr, join_goals, lit, one_of, under, unsat, ws,
};
use crate::core::precedence::Precedence;
use crate::core::registry::RuleRegistry;

pub(super) fn register(registry: &mut RuleRegistry) {
    registry.add(GoalKind::Enclose, "enclose_parens", enclose_parens);
    registry.add(GoalKind::Wrap, "wrap_parens", wrap_parens);

    registry.add(GoalKind::Concat, "concat_plus", concat_plus);
    registry.add(GoalKind::Concat, "concat_tilde", concat_tilde);
    registry.add(GoalKind::Concat, "concat_tuple_join", concat_tuple_join);
    registry.add(GoalKind::Concat, "concat_format", concat_format);

    registry.add(GoalKind::ConcatMany, "concat_many_single", concat_many_single);
    registry.add(GoalKind::ConcatMany, "concat_many_pairwise", concat_many_pairwise);
    registry.add(GoalKind::ConcatMany, "concat_many_join", concat_many_join);
    registry.add(GoalKind::ConcatMany, "concat_many_lipsum", concat_many_lipsum);

    registry.add(GoalKind::Sum, "plus_infix", plus_infix);
    registry.add(GoalKind::Sum, "plus_dunder_call", plus_dunder_call);
    registry.add(GoalKind::Product, "multiply_infix", multiply_infix);
    registry.add(GoalKind::Product, "multiply_dunder_call", multiply_dunder_call);
    registry.add(GoalKind::Modulo, "modulo_infix", modulo_infix);
    registry.add(GoalKind::Modulo, "modulo_dunder_call", modulo_dunder_call);

    registry.add(GoalKind::FunctionCall, "call_parens", call_parens);
    registry.add(GoalKind::FunctionCall, "call_trailing_comma", call_trailing_comma);
}

fn enclose_parens(_: &Constants, goal: &Goal) -> Vec<Goal> {
    let Goal::Enclose(inner) = goal else {
        return unsat();
    };
    vec![expr(
        Precedence::Atom,
        vec![lit("("), ws(), (**inner).clone(), ws(), lit(")")],
    )]
}

fn wrap_parens(_: &Constants, goal: &Goal) -> Vec<Goal> {
    let Goal::Wrap(parts) = goal else {
        return unsat();
    };
    let mut plan = vec![lit("("), ws()];
    plan.extend(parts.iter().cloned());
    plan.extend([ws(), lit(")")]);
    plan
}

fn operands(goal: &Goal) -> Option<(Goal, Goal)> {
    match goal {
        Goal::Concat(a, b) | Goal::Sum(a, b) | Goal::Product(a, b) | Goal::Modulo(a, b) => {
            Some(((**a).clone(), (**b).clone()))
        }
        _ => None,
    }
}

fn infix(goal: &Goal, precedence: Precedence, operator: &str) -> Vec<Goal> {
    let Some((a, b)) = operands(goal) else {
        return unsat();
    };
    vec![expr(
        precedence,
        vec![
            under(precedence, a),
            ws(),
            lit(operator),
            ws(),
            under(precedence, b),
        ],
    )]
}

fn dunder_call(goal: &Goal, method: &str) -> Vec<Goal> {
    let Some((a, b)) = operands(goal) else {
        return unsat();
    };
    vec![Goal::call(Goal::attribute(a, method), vec![b])]
}

fn concat_plus(_: &Constants, goal: &Goal) -> Vec<Goal> {
    match operands(goal) {
        Some((a, b)) => vec![Goal::sum(a, b)],
        None => unsat(),
    }
}

fn concat_tilde(_: &Constants, goal: &Goal) -> Vec<Goal> {
    infix(goal, Precedence::Tilde, "~")
}

fn concat_tuple_join(_: &Constants, goal: &Goal) -> Vec<Goal> {
    let Some((a, b)) = operands(goal) else {
        return unsat();
    };
    vec![expr(
        Precedence::PlainFilter,
        vec![lit("("), a, lit(","), b, lit(")|join")],
    )]
}

fn concat_format(_: &Constants, goal: &Goal) -> Vec<Goal> {
    let Some((a, b)) = operands(goal) else {
        return unsat();
    };
    let format = one_of(vec![
        vec![lit("'%s%s'")],
        vec![lit("\"%s%s\"")],
        vec![Goal::VariableOf(Constant::str("%s%s"))],
    ]);
    vec![expr(
        Precedence::Modulo,
        vec![
            format,
            ws(),
            lit("%"),
            ws(),
            Goal::Wrap(vec![a, lit(","), b]),
        ],
    )]
}

fn concat_many_single(_: &Constants, goal: &Goal) -> Vec<Goal> {
    match goal {
        Goal::ConcatMany(parts) if parts.len() == 1 => parts.clone(),
        _ => unsat(),
    }
}

fn concat_many_pairwise(_: &Constants, goal: &Goal) -> Vec<Goal> {
    let Goal::ConcatMany(parts) = goal else {
        return unsat();
    };
    let Some((first, rest)) = parts.split_first() else {
        return unsat();
    };
    if rest.is_empty() {
        return unsat();
    }
    let tail = if rest.len() == 1 {
        rest[0].clone()
    } else {
        Goal::ConcatMany(rest.to_vec())
    };
    vec![Goal::concat(first.clone(), tail)]
}

fn concat_many_join(_: &Constants, goal: &Goal) -> Vec<Goal> {
    let Goal::ConcatMany(parts) = goal else {
        return unsat();
    };
    if parts.len() < 2 {
        return unsat();
    }
    let mut inner = vec![lit("(")];
    inner.extend(join_goals(lit(","), parts.clone()));
    inner.push(lit(")|join"));
    vec![expr(Precedence::PlainFilter, inner)]
}

/// The template utilities module exports `concat` (`"".join`).
fn concat_many_lipsum(_: &Constants, goal: &Goal) -> Vec<Goal> {
    let Goal::ConcatMany(parts) = goal else {
        return unsat();
    };
    if parts.len() < 2 {
        return unsat();
    }
    let mut tuple = join_goals(lit(","), parts.clone());
    tuple.push(lit(","));
    let concat = Goal::attribute(
        Goal::attribute(Goal::TemplateGlobal("lipsum".into()), "__globals__"),
        "concat",
    );
    vec![Goal::call(concat, vec![Goal::Wrap(tuple)])]
}

fn plus_infix(_: &Constants, goal: &Goal) -> Vec<Goal> {
    infix(goal, Precedence::Plus, "+")
}

fn plus_dunder_call(_: &Constants, goal: &Goal) -> Vec<Goal> {
    dunder_call(goal, "__add__")
}

fn multiply_infix(_: &Constants, goal: &Goal) -> Vec<Goal> {
    infix(goal, Precedence::Multiply, "*")
}

fn multiply_dunder_call(_: &Constants, goal: &Goal) -> Vec<Goal> {
    dunder_call(goal, "__mul__")
}

fn modulo_infix(_: &Constants, goal: &Goal) -> Vec<Goal> {
    infix(goal, Precedence::Modulo, "%")
}

fn modulo_dunder_call(_: &Constants, goal: &Goal) -> Vec<Goal> {
    dunder_call(goal, "__mod__")
}

fn call_plan(goal: &Goal, trailing_comma: bool) -> Vec<Goal> {
    let Goal::FunctionCall(callee, args) = goal else {
        return unsat();
    };
    if trailing_comma && args.is_empty() {
        return unsat();
    }
    let mut plan = vec![
        under(Precedence::FunctionCall, (**callee).clone()),
        lit("("),
        ws(),
    ];
    plan.extend(join_goals(lit(","), args.clone()));
    if trailing_comma {
        plan.push(lit(","));
    }
    plan.extend([ws(), lit(")")]);
    vec![expr(Precedence::FunctionCall, plan)]
}

fn call_parens(_: &Constants, goal: &Goal) -> Vec<Goal> {
    call_plan(goal, false)
}

fn call_trailing_comma(_: &Constants, goal: &Goal) -> Vec<Goal> {
    call_plan(goal, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::goal::int;

    #[test]
    fn infix_encloses_both_operands() {
        let plan = plus_infix(&Constants::new(), &Goal::sum(int(1), int(2)));
        let Goal::Expression(Precedence::Plus, parts) = &plan[0] else {
            panic!("expected a plus expression: {plan:?}");
        };
        assert_eq!(parts[0], under(Precedence::Plus, int(1)));
        assert_eq!(parts[2], lit("+"));
    }

    #[test]
    fn dunder_form_goes_through_attribute_goal() {
        let plan = modulo_dunder_call(&Constants::new(), &Goal::modulo(int(7), int(2)));
        assert_eq!(
            plan,
            vec![Goal::call(Goal::attribute(int(7), "__mod__"), vec![int(2)])]
        );
    }

    #[test]
    fn trailing_comma_needs_arguments() {
        let call = Goal::call(Goal::TemplateGlobal("lipsum".into()), Vec::new());
        assert_eq!(call_trailing_comma(&Constants::new(), &call), unsat());
        assert_ne!(call_parens(&Constants::new(), &call), unsat());
    }

    #[test]
    fn pairwise_concat_shrinks() {
        let goal = Goal::ConcatMany(vec![int(1), int(2), int(3)]);
        let plan = concat_many_pairwise(&Constants::new(), &goal);
        assert_eq!(
            plan,
            vec![Goal::concat(int(1), Goal::ConcatMany(vec![int(2), int(3)]))]
        );
        let single = concat_many_single(&Constants::new(), &Goal::ConcatMany(vec![int(4)]));
        assert_eq!(single, vec![int(4)]);
    }

    #[test]
    fn unrelated_goal_is_unsatisfiable() {
        assert_eq!(concat_tilde(&Constants::new(), &Goal::Zero), unsat());
        assert_eq!(enclose_parens(&Constants::new(), &Goal::Zero), unsat());
    }

    #[test]
    fn format_concat_offers_variable_alternative() {
        let plan = concat_format(&Constants::new(), &Goal::concat(int(1), int(2)));
        let Goal::Expression(_, parts) = &plan[0] else {
            panic!("expected expression");
        };
        assert!(matches!(&parts[0], Goal::Alternatives(plans) if plans.len() == 3));
    }
}
