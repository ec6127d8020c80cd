//! Short strings that many other rules are built from: `%`, `c`, `%c`,
//! runs of `%c` and `{:c}`, and underscores.
//!
//! Each of these can be pulled out of the string form of some template
//! object, which is what most rules here do.

use crate::core::capability::{Constant, Constants};
use crate::core::goal::{
    Goal, GoalKind, expr, expr_lit, int, join_goals, lit, one_of_lits, pattern, under, unsat, ws,
};
use crate::core::precedence::Precedence;
use crate::core::registry::RuleRegistry;

/// Objects whose string form starts with `<class`.
const CLASS_GLOBALS: [&str; 4] = ["range", "cycler", "joiner", "namespace"];

pub(super) fn register(registry: &mut RuleRegistry) {
    registry.add(GoalKind::Percent, "percent_single_quoted", percent_single_quoted);
    registry.add(GoalKind::Percent, "percent_double_quoted", percent_double_quoted);
    registry.add(GoalKind::Percent, "percent_context", percent_context);
    registry.add(GoalKind::Percent, "percent_urlencode_lipsum", percent_urlencode_lipsum);
    registry.add(GoalKind::Percent, "percent_urlencode_escape", percent_urlencode_escape);
    registry.add(GoalKind::Percent, "percent_builtin_chr", percent_builtin_chr);
    registry.add(GoalKind::Percent, "percent_character", percent_character);

    registry.add(GoalKind::LowerC, "lower_c_single_quoted", lower_c_single_quoted);
    registry.add(GoalKind::LowerC, "lower_c_double_quoted", lower_c_double_quoted);
    registry.add(GoalKind::LowerC, "lower_c_dict_join", lower_c_dict_join);
    registry.add(GoalKind::LowerC, "lower_c_lipsum_batch", lower_c_lipsum_batch);
    registry.add(GoalKind::LowerC, "lower_c_joiner_batch", lower_c_joiner_batch);
    registry.add(GoalKind::LowerC, "lower_c_class_escape_batch", lower_c_class_escape_batch);
    registry.add(GoalKind::LowerC, "lower_c_character", lower_c_character);

    registry.add(GoalKind::PercentLowerC, "percent_lower_c_literal", percent_lower_c_literal);
    registry.add(
        GoalKind::PercentLowerC,
        "percent_lower_c_juxtaposed",
        percent_lower_c_juxtaposed,
    );
    registry.add(GoalKind::PercentLowerC, "percent_lower_c_context", percent_lower_c_context);
    registry.add(GoalKind::PercentLowerC, "percent_lower_c_concat", percent_lower_c_concat);
    registry.add(GoalKind::PercentLowerC, "percent_lower_c_list_join", percent_lower_c_list_join);
    registry.add(GoalKind::PercentLowerC, "percent_lower_c_tuple_join", percent_lower_c_tuple_join);
    registry.add(GoalKind::PercentLowerC, "percent_lower_c_replace", percent_lower_c_replace);

    registry.add(GoalKind::ManyPercentLowerC, "many_percent_lower_c_single", many_single);
    registry.add(GoalKind::ManyPercentLowerC, "many_percent_lower_c_literal", many_literal);
    registry.add(GoalKind::ManyPercentLowerC, "many_percent_lower_c_multiply", many_multiply);
    registry.add(GoalKind::ManyPercentLowerC, "many_percent_lower_c_join", many_join);
    registry.add(GoalKind::ManyPercentLowerC, "many_percent_lower_c_null_join", many_null_join);
    registry.add(GoalKind::ManyPercentLowerC, "many_percent_lower_c_center", many_center);
    registry.add(GoalKind::ManyPercentLowerC, "many_percent_lower_c_concat", many_concat);

    registry.add(GoalKind::ManyFormatC, "many_format_c_literal", many_format_literal);
    registry.add(GoalKind::ManyFormatC, "many_format_c_multiply", many_format_multiply);

    registry.add(GoalKind::Underline, "underline_single_quoted", underline_single_quoted);
    registry.add(GoalKind::Underline, "underline_double_quoted", underline_double_quoted);
    registry.add(GoalKind::Underline, "underline_context", underline_context);
    registry.add(GoalKind::Underline, "underline_format", underline_format);
    registry.add(GoalKind::Underline, "underline_lipsum_batch", underline_lipsum_batch);
    registry.add(GoalKind::Underline, "underline_select_batch", underline_select_batch);
    registry.add(GoalKind::Underline, "underline_select_index", underline_select_index);
    registry.add(GoalKind::Underline, "underline_framework_get", underline_framework_get);
    registry.add(GoalKind::Underline, "underline_character", underline_character);

    registry.add(GoalKind::DoubleUnderline, "double_underline_quoted", double_underline_quoted);
    registry.add(GoalKind::DoubleUnderline, "double_underline_context", double_underline_context);
    registry.add(GoalKind::DoubleUnderline, "double_underline_concat", double_underline_concat);
    registry.add(
        GoalKind::DoubleUnderline,
        "double_underline_multiply",
        double_underline_multiply,
    );
    registry.add(GoalKind::DoubleUnderline, "double_underline_format", double_underline_format);
    registry.add(
        GoalKind::DoubleUnderline,
        "double_underline_format_filter",
        double_underline_format_filter,
    );
}

fn atom(text: &str) -> Vec<Goal> {
    vec![expr_lit(Precedence::Atom, text)]
}

fn filter(text: &str) -> Vec<Goal> {
    vec![expr_lit(Precedence::PlainFilter, text)]
}

fn variable_of(value: &str) -> Vec<Goal> {
    vec![Goal::VariableOf(Constant::str(value))]
}

fn percent_single_quoted(_: &Constants, _: &Goal) -> Vec<Goal> {
    atom("'%'")
}

fn percent_double_quoted(_: &Constants, _: &Goal) -> Vec<Goal> {
    atom("\"%\"")
}

fn percent_context(_: &Constants, _: &Goal) -> Vec<Goal> {
    variable_of("%")
}

fn percent_urlencode_lipsum(_: &Constants, _: &Goal) -> Vec<Goal> {
    filter("lipsum()|urlencode|first")
}

fn percent_urlencode_escape(_: &Constants, _: &Goal) -> Vec<Goal> {
    filter("{}|escape|urlencode|first")
}

fn percent_builtin_chr(_: &Constants, _: &Goal) -> Vec<Goal> {
    vec![Goal::call(
        Goal::item(Goal::BuiltinsTable, "chr"),
        vec![int(37)],
    )]
}

fn percent_character(_: &Constants, _: &Goal) -> Vec<Goal> {
    vec![Goal::Character('%')]
}

fn lower_c_single_quoted(_: &Constants, _: &Goal) -> Vec<Goal> {
    atom("'c'")
}

fn lower_c_double_quoted(_: &Constants, _: &Goal) -> Vec<Goal> {
    atom("\"c\"")
}

fn lower_c_dict_join(_: &Constants, _: &Goal) -> Vec<Goal> {
    filter("dict(c=i)|join")
}

/// `&lt;function generate_lorem_ipsum ...`: the eighth character is `c`.
fn lower_c_lipsum_batch(_: &Constants, _: &Goal) -> Vec<Goal> {
    vec![expr(
        Precedence::PlainFilter,
        vec![lit("lipsum|escape|batch("), int(8), lit(")|first|last")],
    )]
}

/// `<class ...>`: the second character is `c`.
fn lower_c_joiner_batch(_: &Constants, _: &Goal) -> Vec<Goal> {
    vec![expr(
        Precedence::PlainFilter,
        pattern(
            "CLASS|TOSTRING|batch(TWO)|first|last",
            &[
                ("CLASS", one_of_lits(&CLASS_GLOBALS)),
                ("TOSTRING", one_of_lits(&["trim", "string"])),
                ("TWO", int(2)),
            ],
        ),
    )]
}

fn lower_c_class_escape_batch(_: &Constants, _: &Goal) -> Vec<Goal> {
    vec![expr(
        Precedence::PlainFilter,
        pattern(
            "CLASS|e|batch(FIVE)|first|last",
            &[("CLASS", one_of_lits(&CLASS_GLOBALS)), ("FIVE", int(5))],
        ),
    )]
}

fn lower_c_character(_: &Constants, _: &Goal) -> Vec<Goal> {
    vec![Goal::Character('c')]
}

fn percent_lower_c_literal(_: &Constants, _: &Goal) -> Vec<Goal> {
    vec![expr(
        Precedence::Atom,
        vec![one_of_lits(&["'%c'", "\"%c\"", "\"%\"\"c\"", "'%''c'"])],
    )]
}

fn percent_lower_c_juxtaposed(_: &Constants, _: &Goal) -> Vec<Goal> {
    vec![expr(
        Precedence::Atom,
        vec![
            one_of_lits(&["'%'", "\"%\""]),
            one_of_lits(&[" ", "\t", "\n", "\r"]),
            one_of_lits(&["'c'", "\"c\""]),
        ],
    )]
}

fn percent_lower_c_context(_: &Constants, _: &Goal) -> Vec<Goal> {
    variable_of("%c")
}

fn percent_lower_c_concat(_: &Constants, _: &Goal) -> Vec<Goal> {
    vec![Goal::concat(Goal::Percent, Goal::LowerC)]
}

fn percent_lower_c_list_join(_: &Constants, _: &Goal) -> Vec<Goal> {
    vec![expr(
        Precedence::PlainFilter,
        vec![
            lit("["),
            Goal::Percent,
            lit(","),
            Goal::LowerC,
            lit("]|join"),
        ],
    )]
}

fn percent_lower_c_tuple_join(_: &Constants, _: &Goal) -> Vec<Goal> {
    vec![expr(
        Precedence::PlainFilter,
        vec![
            lit("("),
            Goal::Percent,
            lit(","),
            Goal::LowerC,
            lit(")|join"),
        ],
    )]
}

/// `'c'|replace(x|trim,'%',1)`: an undefined name trims to the empty string.
fn percent_lower_c_replace(_: &Constants, _: &Goal) -> Vec<Goal> {
    vec![expr(
        Precedence::PlainFilter,
        vec![
            under(Precedence::PlainFilter, Goal::LowerC),
            lit("|replace(x|trim,"),
            Goal::Percent,
            lit(","),
            int(1),
            lit(")"),
        ],
    )]
}

fn count_of(goal: &Goal) -> Option<usize> {
    match goal {
        Goal::ManyPercentLowerC(count) | Goal::ManyFormatC(count) if *count > 0 => Some(*count),
        _ => None,
    }
}

fn many_single(_: &Constants, goal: &Goal) -> Vec<Goal> {
    match count_of(goal) {
        Some(1) => vec![Goal::PercentLowerC],
        _ => unsat(),
    }
}

fn many_literal(_: &Constants, goal: &Goal) -> Vec<Goal> {
    let Some(count) = count_of(goal) else {
        return unsat();
    };
    let run = "%c".repeat(count);
    let (single, double) = (format!("'{run}'"), format!("\"{run}\""));
    vec![expr(
        Precedence::Atom,
        vec![one_of_lits(&[single.as_str(), double.as_str()])],
    )]
}

fn many_multiply(_: &Constants, goal: &Goal) -> Vec<Goal> {
    match count_of(goal) {
        Some(count) if count >= 2 => match i64::try_from(count) {
            Ok(count) => vec![Goal::product(Goal::PercentLowerC, int(count))],
            Err(_) => unsat(),
        },
        _ => unsat(),
    }
}

fn many_join(_: &Constants, goal: &Goal) -> Vec<Goal> {
    let Some(count) = count_of(goal).filter(|count| (2..=8).contains(count)) else {
        return unsat();
    };
    let mut plan = vec![lit("("), ws()];
    plan.extend(join_goals(lit(","), vec![Goal::PercentLowerC; count]));
    plan.extend([ws(), lit(")|join")]);
    vec![expr(Precedence::PlainFilter, plan)]
}

/// `(x,x,x)|join('%c')`: undefined names join as empty strings.
fn many_null_join(_: &Constants, goal: &Goal) -> Vec<Goal> {
    let Some(count) = count_of(goal).filter(|count| *count >= 2) else {
        return unsat();
    };
    let names = vec!["x"; count + 1].join(",");
    vec![expr(
        Precedence::PlainFilter,
        vec![
            lit(format!("({names})|join(")),
            ws(),
            Goal::PercentLowerC,
            ws(),
            lit(")"),
        ],
    )]
}

/// `x|center(3)|replace(x|center|first,'%c')`: centering the empty string
/// yields spaces.
fn many_center(_: &Constants, goal: &Goal) -> Vec<Goal> {
    let Some(count) = count_of(goal).and_then(|count| i64::try_from(count).ok()) else {
        return unsat();
    };
    vec![expr(
        Precedence::PlainFilter,
        vec![
            lit("x|center("),
            ws(),
            int(count),
            ws(),
            lit(")|replace(x|center|first,"),
            Goal::PercentLowerC,
            ws(),
            lit(")"),
        ],
    )]
}

fn many_concat(_: &Constants, goal: &Goal) -> Vec<Goal> {
    match count_of(goal) {
        Some(count) if count >= 2 => vec![Goal::ConcatMany(vec![Goal::PercentLowerC; count])],
        _ => unsat(),
    }
}

fn many_format_literal(_: &Constants, goal: &Goal) -> Vec<Goal> {
    let Some(count) = count_of(goal) else {
        return unsat();
    };
    let run = "{:c}".repeat(count);
    let (single, double) = (format!("'{run}'"), format!("\"{run}\""));
    vec![expr(
        Precedence::Atom,
        vec![one_of_lits(&[single.as_str(), double.as_str()])],
    )]
}

fn many_format_multiply(_: &Constants, goal: &Goal) -> Vec<Goal> {
    let Some(count) = count_of(goal).and_then(|count| i64::try_from(count).ok()) else {
        return unsat();
    };
    let single = expr(Precedence::Atom, vec![one_of_lits(&["'{:c}'", "\"{:c}\""])]);
    vec![Goal::product(single, int(count))]
}

fn underline_single_quoted(_: &Constants, _: &Goal) -> Vec<Goal> {
    atom("'_'")
}

fn underline_double_quoted(_: &Constants, _: &Goal) -> Vec<Goal> {
    atom("\"_\"")
}

fn underline_context(_: &Constants, _: &Goal) -> Vec<Goal> {
    variable_of("_")
}

fn underline_format(_: &Constants, _: &Goal) -> Vec<Goal> {
    vec![expr(
        Precedence::Modulo,
        vec![
            one_of_lits(&["\"%c\"%", "\"%\"\"c\"%", "'%c'%", "'%''c'%"]),
            under(Precedence::Modulo, int(95)),
        ],
    )]
}

/// `&lt;function generate_lorem_ipsum`: the 22nd character is `_`.
fn underline_lipsum_batch(_: &Constants, _: &Goal) -> Vec<Goal> {
    vec![expr(
        Precedence::PlainFilter,
        vec![
            lit("lipsum|escape|batch("),
            int(22),
            lit(")|list|first|last"),
        ],
    )]
}

fn underline_select_batch(_: &Constants, _: &Goal) -> Vec<Goal> {
    vec![expr(
        Precedence::PlainFilter,
        vec![
            lit("()|select|string|batch("),
            int(25),
            lit(")|first|last"),
        ],
    )]
}

/// `<generator object select_or_reject ...>` indexed at 24.
fn underline_select_index(_: &Constants, _: &Goal) -> Vec<Goal> {
    vec![expr(
        Precedence::Access,
        vec![lit("({}|select()|trim|list)["), int(24), lit("]")],
    )]
}

fn underline_framework_get(_: &Constants, _: &Goal) -> Vec<Goal> {
    vec![expr(
        Precedence::PlainFilter,
        vec![
            Goal::FrameworkGlobal("g".into()),
            lit("|attr("),
            Goal::string("get"),
            lit(")|e|batch("),
            int(18),
            lit(")|first|last"),
        ],
    )]
}

fn underline_character(_: &Constants, _: &Goal) -> Vec<Goal> {
    vec![Goal::Character('_')]
}

fn double_underline_quoted(_: &Constants, _: &Goal) -> Vec<Goal> {
    vec![expr(Precedence::Atom, vec![one_of_lits(&["'__'", "\"__\""])])]
}

fn double_underline_context(_: &Constants, _: &Goal) -> Vec<Goal> {
    variable_of("__")
}

fn double_underline_concat(_: &Constants, _: &Goal) -> Vec<Goal> {
    vec![Goal::concat(Goal::Underline, Goal::Underline)]
}

fn double_underline_multiply(_: &Constants, _: &Goal) -> Vec<Goal> {
    vec![Goal::product(Goal::Underline, int(2))]
}

fn double_underline_format(_: &Constants, _: &Goal) -> Vec<Goal> {
    vec![expr(
        Precedence::Modulo,
        vec![
            under(Precedence::Modulo, Goal::string("%s%%s")),
            lit("%"),
            under(Precedence::Modulo, Goal::Underline),
            lit("%"),
            under(Precedence::Modulo, Goal::Underline),
        ],
    )]
}

fn double_underline_format_filter(_: &Constants, _: &Goal) -> Vec<Goal> {
    vec![expr(
        Precedence::PlainFilter,
        vec![
            under(Precedence::PlainFilter, Goal::string("%s%%s")),
            lit("|format("),
            ws(),
            Goal::Underline,
            ws(),
            lit(")|format("),
            ws(),
            Goal::Underline,
            ws(),
            lit(")"),
        ],
    )]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn joiner_batch_expands_class_alternatives() {
        let plan = lower_c_joiner_batch(&Constants::new(), &Goal::LowerC);
        let Goal::Expression(Precedence::PlainFilter, parts) = &plan[0] else {
            panic!("expected filter expression: {plan:?}");
        };
        assert_eq!(parts[0], one_of_lits(&CLASS_GLOBALS));
        assert_eq!(parts[1], lit("|"));
        assert!(parts.contains(&int(2)));
    }

    #[test]
    fn many_percent_lower_c_single_and_multiply() {
        let constants = Constants::new();
        assert_eq!(
            many_single(&constants, &Goal::ManyPercentLowerC(1)),
            vec![Goal::PercentLowerC]
        );
        assert_eq!(many_single(&constants, &Goal::ManyPercentLowerC(2)), unsat());
        assert_eq!(
            many_multiply(&constants, &Goal::ManyPercentLowerC(3)),
            vec![Goal::product(Goal::PercentLowerC, int(3))]
        );
        assert_eq!(many_multiply(&constants, &Goal::ManyPercentLowerC(0)), unsat());
    }

    #[test]
    fn many_literal_repeats_the_run() {
        let plan = many_literal(&Constants::new(), &Goal::ManyPercentLowerC(2));
        assert_eq!(
            plan,
            vec![expr(
                Precedence::Atom,
                vec![one_of_lits(&["'%c%c'", "\"%c%c\""])],
            )]
        );
    }

    #[test]
    fn null_join_uses_one_more_name_than_runs() {
        let plan = many_null_join(&Constants::new(), &Goal::ManyPercentLowerC(2));
        let Goal::Expression(_, parts) = &plan[0] else {
            panic!("expected expression");
        };
        assert_eq!(parts[0], lit("(x,x,x)|join("));
    }
}
