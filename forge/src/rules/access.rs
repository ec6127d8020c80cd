//! Attribute and item access.
//!
//! The template engine falls back from attribute to item lookup and back, so
//! most goals here have a dotted form, a subscript form, a filter form and a
//! dunder-method form.

use super::is_identifier;
use crate::core::capability::Constants;
use crate::core::goal::{Access, Goal, GoalKind, expr, lit, under, unsat, ws};
use crate::core::precedence::Precedence;
use crate::core::registry::RuleRegistry;

pub(super) fn register(registry: &mut RuleRegistry) {
    registry.add(GoalKind::AttributeOf, "attribute_dot", attribute_dot);
    registry.add(GoalKind::AttributeOf, "attribute_subscript", attribute_subscript);
    registry.add(GoalKind::AttributeOf, "attribute_attr_filter", attribute_attr_filter);
    registry.add(GoalKind::AttributeOf, "attribute_map", attribute_map);
    registry.add(
        GoalKind::AttributeOf,
        "attribute_getattribute_call",
        attribute_getattribute_call,
    );

    registry.add(GoalKind::ItemOf, "item_dot", item_dot);
    registry.add(GoalKind::ItemOf, "item_subscript", item_subscript);
    registry.add(GoalKind::ItemOf, "item_dunder_getitem", item_dunder_getitem);
    registry.add(GoalKind::ItemOf, "item_get_method", item_get_method);

    registry.add(
        GoalKind::ClassAttributeOf,
        "class_attribute_via_class",
        class_attribute_via_class,
    );
    registry.add(GoalKind::ClassAttributeOf, "class_attribute_direct", class_attribute_direct);

    registry.add(GoalKind::ChainedAccess, "chained_nest", chained_nest);
}

fn target(goal: &Goal) -> Option<(Goal, &str)> {
    match goal {
        Goal::AttributeOf(obj, name) | Goal::ItemOf(obj, name) | Goal::ClassAttributeOf(obj, name) => {
            Some(((**obj).clone(), name.as_str()))
        }
        _ => None,
    }
}

fn dotted(goal: &Goal) -> Vec<Goal> {
    match target(goal) {
        Some((obj, name)) if is_identifier(name) => vec![expr(
            Precedence::Access,
            vec![under(Precedence::Access, obj), lit("."), lit(name)],
        )],
        _ => unsat(),
    }
}

fn subscript(goal: &Goal) -> Vec<Goal> {
    let Some((obj, name)) = target(goal) else {
        return unsat();
    };
    vec![expr(
        Precedence::Access,
        vec![
            under(Precedence::Access, obj),
            lit("["),
            ws(),
            Goal::string(name),
            ws(),
            lit("]"),
        ],
    )]
}

fn method_call(goal: &Goal, method: &str) -> Vec<Goal> {
    let Some((obj, name)) = target(goal) else {
        return unsat();
    };
    vec![Goal::call(
        Goal::attribute(obj, method),
        vec![Goal::string(name)],
    )]
}

fn attribute_dot(_: &Constants, goal: &Goal) -> Vec<Goal> {
    dotted(goal)
}

fn attribute_subscript(_: &Constants, goal: &Goal) -> Vec<Goal> {
    subscript(goal)
}

/// A called filter binds like a function call.
fn attribute_attr_filter(_: &Constants, goal: &Goal) -> Vec<Goal> {
    let Some((obj, name)) = target(goal) else {
        return unsat();
    };
    vec![expr(
        Precedence::FunctionCall,
        vec![
            under(Precedence::PlainFilter, obj),
            lit("|attr("),
            ws(),
            Goal::string(name),
            ws(),
            lit(")"),
        ],
    )]
}

fn attribute_map(_: &Constants, goal: &Goal) -> Vec<Goal> {
    let Some((obj, name)) = target(goal) else {
        return unsat();
    };
    vec![expr(
        Precedence::PlainFilter,
        vec![
            lit("("),
            obj,
            lit(",)|map(attribute="),
            Goal::string(name),
            lit(")|first"),
        ],
    )]
}

fn attribute_getattribute_call(_: &Constants, goal: &Goal) -> Vec<Goal> {
    match target(goal) {
        Some((_, "__getattribute__")) | None => unsat(),
        Some(_) => method_call(goal, "__getattribute__"),
    }
}

fn item_dot(_: &Constants, goal: &Goal) -> Vec<Goal> {
    dotted(goal)
}

fn item_subscript(_: &Constants, goal: &Goal) -> Vec<Goal> {
    subscript(goal)
}

fn item_dunder_getitem(_: &Constants, goal: &Goal) -> Vec<Goal> {
    method_call(goal, "__getitem__")
}

fn item_get_method(_: &Constants, goal: &Goal) -> Vec<Goal> {
    method_call(goal, "get")
}

fn class_attribute_via_class(_: &Constants, goal: &Goal) -> Vec<Goal> {
    let Some((obj, name)) = target(goal) else {
        return unsat();
    };
    vec![Goal::attribute(Goal::attribute(obj, "__class__"), name)]
}

fn class_attribute_direct(_: &Constants, goal: &Goal) -> Vec<Goal> {
    let Some((obj, name)) = target(goal) else {
        return unsat();
    };
    vec![Goal::attribute(obj, name)]
}

fn chained_nest(_: &Constants, goal: &Goal) -> Vec<Goal> {
    let Goal::ChainedAccess(obj, steps) = goal else {
        return unsat();
    };
    let nested = steps.iter().fold((**obj).clone(), |inner, step| match step {
        Access::Attribute(name) => Goal::attribute(inner, name.as_str()),
        Access::Item(name) => Goal::item(inner, name.as_str()),
        Access::ClassAttribute(name) => Goal::class_attribute(inner, name.as_str()),
    });
    vec![nested]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::goal::{attr_step, class_step, item_step};

    fn lipsum() -> Goal {
        Goal::TemplateGlobal("lipsum".into())
    }

    #[test]
    fn dotted_access_needs_identifier() {
        let goal = Goal::item(lipsum(), "a-b");
        assert_eq!(item_dot(&Constants::new(), &goal), unsat());
        let goal = Goal::attribute(lipsum(), "__globals__");
        assert_eq!(
            attribute_dot(&Constants::new(), &goal),
            vec![expr(
                Precedence::Access,
                vec![under(Precedence::Access, lipsum()), lit("."), lit("__globals__")],
            )]
        );
    }

    #[test]
    fn getitem_goes_through_attribute_and_call() {
        let goal = Goal::item(lipsum(), "os");
        assert_eq!(
            item_dunder_getitem(&Constants::new(), &goal),
            vec![Goal::call(
                Goal::attribute(lipsum(), "__getitem__"),
                vec![Goal::string("os")],
            )]
        );
    }

    #[test]
    fn attr_filter_binds_like_a_call() {
        let goal = Goal::attribute(lipsum(), "__globals__");
        let plan = attribute_attr_filter(&Constants::new(), &goal);
        let Goal::Expression(precedence, _) = &plan[0] else {
            panic!("expected expression: {plan:?}");
        };
        assert_eq!(*precedence, Precedence::FunctionCall);
        assert!(!precedence.needs_enclosing_under(Precedence::FunctionCall));
        assert!(precedence.needs_enclosing_under(Precedence::Access));
    }

    #[test]
    fn getattribute_does_not_nest_itself() {
        let goal = Goal::attribute(lipsum(), "__getattribute__");
        assert_eq!(attribute_getattribute_call(&Constants::new(), &goal), unsat());
    }

    #[test]
    fn chain_nests_left_to_right() {
        let goal = Goal::chained(
            lipsum(),
            vec![attr_step("__globals__"), item_step("os"), class_step("x")],
        );
        assert_eq!(
            chained_nest(&Constants::new(), &goal),
            vec![Goal::class_attribute(
                Goal::item(Goal::attribute(lipsum(), "__globals__"), "os"),
                "x",
            )]
        );
        let empty = Goal::chained(lipsum(), Vec::new());
        assert_eq!(chained_nest(&Constants::new(), &empty), vec![lipsum()]);
    }
}
