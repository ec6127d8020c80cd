//! Reaching interpreter primitives from template globals: the builtins table,
//! `__import__`, `eval`, the framework config and the `os` module.

use crate::core::capability::{Capability, Constants};
use crate::core::goal::{
    Access, Goal, GoalKind, attr_step, class_step, expr, item_step, lit, one_of, one_of_lits,
    unsat,
};
use crate::core::precedence::Precedence;
use crate::core::registry::RuleRegistry;

/// Template globals whose method `__globals__` reach the builtins table.
const TEMPLATE_GLOBAL_METHODS: [(&str, &str); 5] = [
    ("cycler", "next"),
    ("cycler", "reset"),
    ("cycler", "__init__"),
    ("joiner", "__init__"),
    ("namespace", "__init__"),
];

/// Framework globals whose method `__globals__` reach the builtins table.
const FRAMEWORK_GLOBAL_METHODS: [(&str, &str); 4] = [
    ("g", "pop"),
    ("g", "get"),
    ("session", "get"),
    ("request", "close"),
];

/// Names unlikely to be defined in the template context.
const UNDEFINED_NAMES: [&str; 3] = ["x", "a", "undefined"];

pub(super) fn register(registry: &mut RuleRegistry) {
    registry.add(
        GoalKind::BuiltinsTable,
        "builtins_template_globals",
        builtins_template_globals,
    );
    registry.add(GoalKind::BuiltinsTable, "builtins_lipsum", builtins_lipsum);
    registry.add(
        GoalKind::BuiltinsTable,
        "builtins_framework_globals",
        builtins_framework_globals,
    );
    registry.add(GoalKind::BuiltinsTable, "builtins_url_for", builtins_url_for);
    registry.add(GoalKind::BuiltinsTable, "builtins_undefined", builtins_undefined);
    registry.add(GoalKind::BuiltinsTable, "builtins_markup_method", builtins_markup_method);

    registry.add(GoalKind::ImportPrimitive, "import_from_builtins", import_from_builtins);
    registry.add(GoalKind::EvalPrimitive, "eval_from_builtins", eval_from_builtins);
    registry.add(GoalKind::Eval, "eval_call", eval_call);

    registry.add(GoalKind::ConfigObject, "config_framework_global", config_framework_global);
    registry.add(GoalKind::ConfigObject, "config_current_app", config_current_app);
    registry.add(
        GoalKind::ConfigObject,
        "config_template_reference",
        config_template_reference,
    );

    registry.add(GoalKind::OsModule, "os_import", os_import);
    registry.add(GoalKind::OsModule, "os_lipsum_globals", os_lipsum_globals);
    registry.add(GoalKind::OsModule, "os_config_globals", os_config_globals);
    registry.add(GoalKind::OsModule, "os_url_for_globals", os_url_for_globals);
    registry.add(GoalKind::OsModule, "os_framework_methods", os_framework_methods);
    registry.add(GoalKind::OsModule, "os_eval_import", os_eval_import);
}

fn globals_builtins() -> [Access; 2] {
    [attr_step("__globals__"), item_step("__builtins__")]
}

fn method_builtins(obj: Goal, method: &str) -> Vec<Goal> {
    let mut steps = vec![attr_step(method)];
    steps.extend(globals_builtins());
    vec![Goal::chained(obj, steps)]
}

fn builtins_template_globals(_: &Constants, _: &Goal) -> Vec<Goal> {
    let plans = TEMPLATE_GLOBAL_METHODS
        .iter()
        .map(|(global, method)| method_builtins(Goal::TemplateGlobal((*global).into()), method))
        .collect();
    vec![one_of(plans)]
}

fn builtins_lipsum(_: &Constants, _: &Goal) -> Vec<Goal> {
    vec![Goal::chained(
        Goal::TemplateGlobal("lipsum".into()),
        globals_builtins().to_vec(),
    )]
}

fn builtins_framework_globals(_: &Constants, _: &Goal) -> Vec<Goal> {
    let plans = FRAMEWORK_GLOBAL_METHODS
        .iter()
        .map(|(global, method)| method_builtins(Goal::FrameworkGlobal((*global).into()), method))
        .collect();
    vec![one_of(plans)]
}

fn builtins_url_for(_: &Constants, _: &Goal) -> Vec<Goal> {
    vec![Goal::chained(
        Goal::FrameworkGlobal("url_for".into()),
        globals_builtins().to_vec(),
    )]
}

/// An undefined name is a `jinja2.runtime.Undefined`; its `__init__`
/// globals are the runtime module's.
fn builtins_undefined(_: &Constants, _: &Goal) -> Vec<Goal> {
    let undefined = expr(Precedence::Atom, vec![one_of_lits(&UNDEFINED_NAMES)]);
    method_builtins(undefined, "__init__")
}

/// `{}|escape` is a `Markup`; its methods are plain module functions.
fn builtins_markup_method(_: &Constants, _: &Goal) -> Vec<Goal> {
    let markup = expr(Precedence::PlainFilter, vec![lit("{}|escape")]);
    method_builtins(markup, "__html__")
}

fn import_from_builtins(_: &Constants, _: &Goal) -> Vec<Goal> {
    vec![Goal::item(Goal::BuiltinsTable, "__import__")]
}

fn eval_from_builtins(_: &Constants, _: &Goal) -> Vec<Goal> {
    vec![Goal::item(Goal::BuiltinsTable, "eval")]
}

fn eval_call(_: &Constants, goal: &Goal) -> Vec<Goal> {
    let Goal::Eval(code) = goal else {
        return unsat();
    };
    vec![Goal::call(Goal::EvalPrimitive, vec![(**code).clone()])]
}

fn config_framework_global(_: &Constants, _: &Goal) -> Vec<Goal> {
    vec![Goal::FrameworkGlobal("config".into())]
}

fn config_current_app(_: &Constants, _: &Goal) -> Vec<Goal> {
    vec![Goal::chained(
        Goal::FrameworkGlobal("url_for".into()),
        vec![
            attr_step("__globals__"),
            item_step("current_app"),
            attr_step("config"),
        ],
    )]
}

/// `self` is the template reference; its context holds the config.
fn config_template_reference(_: &Constants, _: &Goal) -> Vec<Goal> {
    vec![
        Goal::RequireCapability(Capability::Framework),
        Goal::chained(
            Goal::TemplateGlobal("self".into()),
            vec![
                attr_step("_TemplateReference__context"),
                item_step("config"),
            ],
        ),
    ]
}

fn os_import(_: &Constants, _: &Goal) -> Vec<Goal> {
    vec![Goal::call(Goal::ImportPrimitive, vec![Goal::string("os")])]
}

fn os_lipsum_globals(_: &Constants, _: &Goal) -> Vec<Goal> {
    vec![Goal::chained(
        Goal::TemplateGlobal("lipsum".into()),
        vec![attr_step("__globals__"), item_step("os")],
    )]
}

fn os_config_globals(_: &Constants, _: &Goal) -> Vec<Goal> {
    vec![Goal::chained(
        Goal::ConfigObject,
        vec![
            class_step("__init__"),
            attr_step("__globals__"),
            item_step("os"),
        ],
    )]
}

fn os_url_for_globals(_: &Constants, _: &Goal) -> Vec<Goal> {
    vec![Goal::chained(
        Goal::FrameworkGlobal("url_for".into()),
        vec![attr_step("__globals__"), item_step("os")],
    )]
}

fn os_framework_methods(_: &Constants, _: &Goal) -> Vec<Goal> {
    let plans = FRAMEWORK_GLOBAL_METHODS
        .iter()
        .map(|(global, method)| {
            vec![Goal::chained(
                Goal::FrameworkGlobal((*global).into()),
                vec![attr_step(method), attr_step("__globals__"), item_step("os")],
            )]
        })
        .collect();
    vec![one_of(plans)]
}

fn os_eval_import(_: &Constants, _: &Goal) -> Vec<Goal> {
    vec![Goal::eval(Goal::string("__import__('os')"))]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn template_globals_offer_every_method() {
        let plan = builtins_template_globals(&Constants::new(), &Goal::BuiltinsTable);
        let Goal::Alternatives(plans) = &plan[0] else {
            panic!("expected alternatives");
        };
        assert_eq!(plans.len(), TEMPLATE_GLOBAL_METHODS.len());
        assert_eq!(
            plans[0],
            vec![Goal::chained(
                Goal::TemplateGlobal("cycler".into()),
                vec![
                    attr_step("next"),
                    attr_step("__globals__"),
                    item_step("__builtins__"),
                ],
            )]
        );
    }

    #[test]
    fn template_reference_requires_framework() {
        let plan = config_template_reference(&Constants::new(), &Goal::ConfigObject);
        assert_eq!(plan[0], Goal::RequireCapability(Capability::Framework));
    }

    #[test]
    fn eval_calls_the_primitive() {
        let goal = Goal::eval(Goal::string("1"));
        assert_eq!(
            eval_call(&Constants::new(), &goal),
            vec![Goal::call(Goal::EvalPrimitive, vec![Goal::string("1")])]
        );
        assert_eq!(eval_call(&Constants::new(), &Goal::OsModule), unsat());
    }

    #[test]
    fn undefined_name_is_an_atom() {
        let plan = builtins_undefined(&Constants::new(), &Goal::BuiltinsTable);
        let Goal::ChainedAccess(obj, steps) = &plan[0] else {
            panic!("expected chained access");
        };
        assert_eq!(obj.fixed_precedence(), Some(Precedence::Atom));
        assert_eq!(steps[0], attr_step("__init__"));
        assert!(matches!(&**obj, Goal::Expression(_, parts) if parts.len() == 1));
    }
}
