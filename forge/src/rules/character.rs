//! Single characters, mostly indexed out of the string or escaped form of a
//! template global.

use crate::core::capability::{Constant, Constants, names_bound_to};
use crate::core::goal::{
    Goal, GoalKind, expr, expr_lit, int, lit, one_of, pattern, quoted, under, unsat, ws,
};
use crate::core::precedence::Precedence;
use crate::core::registry::{RuleFn, RuleRegistry};

/// `lipsum|escape`, up to the address.
const LIPSUM_ESCAPED: &str = "&lt;function generate_lorem_ipsum at 0x";
/// `x|slice(0)|e` for an undefined `x`.
const SLICE_ESCAPED: &str = "&lt;generator object sync_do_slice at 0x";
/// `{}|select()|trim`.
const SELECT_TEXT: &str = "<generator object select_or_reject at 0x";
/// `g|e` in the web framework.
const FRAMEWORK_G_ESCAPED: &str = "&lt;flask.g of";
const LIPSUM_DOC: &str = "Generate some lorem ipsum for the template.";

/// Expressions with a fixed one-character value.
const CONSTANT_EXPRESSIONS: [(&str, Precedence, char); 6] = [
    ("{}|escape|first", Precedence::PlainFilter, '{'),
    ("()|string|first", Precedence::PlainFilter, '('),
    ("lipsum|string|first", Precedence::PlainFilter, '<'),
    ("{}|escape|urlencode|first", Precedence::PlainFilter, '%'),
    ("lipsum|escape|first", Precedence::PlainFilter, '&'),
    ("{}|int|string", Precedence::PlainFilter, '0'),
];

const RULES: &[(&str, RuleFn)] = &[
    ("char_single_quoted", char_single_quoted),
    ("char_double_quoted", char_double_quoted),
    ("char_context", char_context),
    ("char_constant_expression", char_constant_expression),
    ("char_dict_join", char_dict_join),
    ("char_namespace_join", char_namespace_join),
    ("char_digit_string", char_digit_string),
    ("char_digit_str_method", char_digit_str_method),
    ("char_lipsum_escape_batch", char_lipsum_escape_batch),
    ("char_slice_escape_batch", char_slice_escape_batch),
    ("char_select_index", char_select_index),
    ("char_framework_g_batch", char_framework_g_batch),
    ("char_lipsum_doc", char_lipsum_doc),
    ("char_format", char_format),
    ("char_builtin_chr", char_builtin_chr),
];

pub(super) fn register(registry: &mut RuleRegistry) {
    for (name, rule) in RULES {
        registry.add(GoalKind::Character, name, *rule);
    }
}

fn char_of(goal: &Goal) -> Option<char> {
    match goal {
        Goal::Character(c) => Some(*c),
        _ => None,
    }
}

fn code_of(c: char) -> i64 {
    i64::from(u32::from(c))
}

/// Zero-based positions of `c` in `text`.
fn positions(text: &str, c: char) -> impl Iterator<Item = i64> + '_ {
    text.chars()
        .zip(0_i64..)
        .filter(move |(found, _)| *found == c)
        .map(|(_, index)| index)
}

/// One alternative per position of `c` in `text`, or `None` if absent.
fn indexed(text: &str, c: char, build: impl Fn(i64) -> Vec<Goal>) -> Option<Goal> {
    let plans: Vec<Vec<Goal>> = positions(text, c).map(build).collect();
    (!plans.is_empty()).then(|| one_of(plans))
}

fn char_single_quoted(_: &Constants, goal: &Goal) -> Vec<Goal> {
    match char_of(goal) {
        Some(c) => vec![expr_lit(Precedence::Atom, quoted(&c.to_string(), '\''))],
        None => unsat(),
    }
}

fn char_double_quoted(_: &Constants, goal: &Goal) -> Vec<Goal> {
    match char_of(goal) {
        Some(c) => vec![expr_lit(Precedence::Atom, quoted(&c.to_string(), '"'))],
        None => unsat(),
    }
}

fn char_context(constants: &Constants, goal: &Goal) -> Vec<Goal> {
    let Some(c) = char_of(goal) else {
        return unsat();
    };
    let value = Constant::str(c.to_string());
    if names_bound_to(constants, &value).next().is_none() {
        return unsat();
    }
    vec![Goal::VariableOf(value)]
}

fn char_constant_expression(_: &Constants, goal: &Goal) -> Vec<Goal> {
    let Some(c) = char_of(goal) else {
        return unsat();
    };
    let plans: Vec<Vec<Goal>> = CONSTANT_EXPRESSIONS
        .iter()
        .filter(|(_, _, value)| *value == c)
        .map(|(text, precedence, _)| vec![expr_lit(*precedence, *text)])
        .collect();
    if plans.is_empty() {
        return unsat();
    }
    vec![one_of(plans)]
}

fn char_dict_join(_: &Constants, goal: &Goal) -> Vec<Goal> {
    match char_of(goal) {
        Some(c) if c.is_ascii_alphabetic() => {
            vec![expr_lit(Precedence::PlainFilter, format!("dict({c}=x)|join"))]
        }
        _ => unsat(),
    }
}

fn char_namespace_join(_: &Constants, goal: &Goal) -> Vec<Goal> {
    match char_of(goal) {
        Some(c) if c.is_ascii_alphabetic() => vec![expr(
            Precedence::PlainFilter,
            vec![
                Goal::TemplateGlobal("namespace".into()),
                lit(format!("({c}=x)._Namespace__attrs|join")),
            ],
        )],
        _ => unsat(),
    }
}

fn digit_of(goal: &Goal) -> Option<i64> {
    char_of(goal)?.to_digit(10).map(i64::from)
}

fn char_digit_string(_: &Constants, goal: &Goal) -> Vec<Goal> {
    match digit_of(goal) {
        Some(digit) => vec![expr(
            Precedence::PlainFilter,
            vec![lit("("), int(digit), lit(")|string")],
        )],
        None => unsat(),
    }
}

fn char_digit_str_method(_: &Constants, goal: &Goal) -> Vec<Goal> {
    match digit_of(goal) {
        Some(digit) => vec![expr(
            Precedence::FunctionCall,
            vec![
                under(Precedence::Access, int(digit)),
                lit(".__str__("),
                ws(),
                lit(")"),
            ],
        )],
        None => unsat(),
    }
}

/// `batch(n)|first|last` picks the character at zero-based index `n - 1`.
fn batch_pick(text: &str, c: char, prefix: Goal, suffix: &'static str) -> Vec<Goal> {
    let picked = indexed(text, c, |index| {
        vec![lit("|batch("), int(index + 1), lit(suffix)]
    });
    match picked {
        Some(batch) => vec![expr(Precedence::PlainFilter, vec![prefix, batch])],
        None => unsat(),
    }
}

fn char_lipsum_escape_batch(_: &Constants, goal: &Goal) -> Vec<Goal> {
    let Some(c) = char_of(goal) else {
        return unsat();
    };
    batch_pick(
        LIPSUM_ESCAPED,
        c,
        expr_lit(Precedence::PlainFilter, "lipsum|escape"),
        ")|first|last",
    )
}

fn char_slice_escape_batch(_: &Constants, goal: &Goal) -> Vec<Goal> {
    let Some(c) = char_of(goal) else {
        return unsat();
    };
    let prefix = expr(
        Precedence::PlainFilter,
        pattern("x|slice(ZERO)|e|list", &[("ZERO", int(0))]),
    );
    batch_pick(SLICE_ESCAPED, c, prefix, ")|first|last")
}

fn char_select_index(_: &Constants, goal: &Goal) -> Vec<Goal> {
    let Some(c) = char_of(goal) else {
        return unsat();
    };
    let picked = indexed(SELECT_TEXT, c, |index| {
        vec![lit("({}|select()|trim|list)["), int(index), lit("]")]
    });
    match picked {
        Some(select) => vec![expr(Precedence::Access, vec![select])],
        None => unsat(),
    }
}

fn char_framework_g_batch(_: &Constants, goal: &Goal) -> Vec<Goal> {
    let Some(c) = char_of(goal) else {
        return unsat();
    };
    let prefix = expr(
        Precedence::PlainFilter,
        vec![Goal::FrameworkGlobal("g".into()), lit("|e")],
    );
    batch_pick(FRAMEWORK_G_ESCAPED, c, prefix, ")|first|last")
}

fn char_lipsum_doc(_: &Constants, goal: &Goal) -> Vec<Goal> {
    let Some(c) = char_of(goal) else {
        return unsat();
    };
    let Some(index) = positions(LIPSUM_DOC, c).next() else {
        return unsat();
    };
    let doc = Goal::attribute(Goal::TemplateGlobal("lipsum".into()), "__doc__");
    vec![expr(
        Precedence::Access,
        vec![
            under(Precedence::Access, doc),
            lit("["),
            int(index),
            lit("]"),
        ],
    )]
}

/// `'%c'%99`. The `%` and `c` pieces are themselves built from characters,
/// so they are left to other rules.
fn char_format(_: &Constants, goal: &Goal) -> Vec<Goal> {
    match char_of(goal) {
        Some(c) if c != '%' && c != 'c' => {
            vec![Goal::modulo(Goal::PercentLowerC, int(code_of(c)))]
        }
        _ => unsat(),
    }
}

fn char_builtin_chr(_: &Constants, goal: &Goal) -> Vec<Goal> {
    match char_of(goal) {
        Some(c) => vec![Goal::call(
            Goal::item(Goal::BuiltinsTable, "chr"),
            vec![int(code_of(c))],
        )],
        None => unsat(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expand(rule: RuleFn, c: char) -> Vec<Goal> {
        rule(&Constants::new(), &Goal::Character(c))
    }

    #[test]
    fn lipsum_batch_is_one_based() {
        let plan = expand(char_lipsum_escape_batch, 'c');
        let Goal::Expression(_, parts) = &plan[0] else {
            panic!("expected expression: {plan:?}");
        };
        let Goal::Alternatives(plans) = &parts[1] else {
            panic!("expected alternatives");
        };
        assert_eq!(plans[0][1], int(8));
    }

    #[test]
    fn select_index_offers_every_position() {
        let plan = expand(char_select_index, 'e');
        let Goal::Expression(Precedence::Access, parts) = &plan[0] else {
            panic!("expected access expression");
        };
        let Goal::Alternatives(plans) = &parts[0] else {
            panic!("expected alternatives");
        };
        let expected = SELECT_TEXT.chars().filter(|c| *c == 'e').count();
        assert_eq!(plans.len(), expected);
    }

    #[test]
    fn absent_characters_are_unsatisfiable() {
        assert_eq!(expand(char_lipsum_escape_batch, 'Z'), unsat());
        assert_eq!(expand(char_constant_expression, 'q'), unsat());
        assert_eq!(expand(char_digit_string, 'a'), unsat());
    }

    #[test]
    fn format_skips_its_own_pieces() {
        assert_eq!(expand(char_format, 'c'), unsat());
        assert_eq!(
            expand(char_format, 'a'),
            vec![Goal::modulo(Goal::PercentLowerC, int(97))]
        );
    }

    #[test]
    fn constant_expression_lookup() {
        assert_eq!(
            expand(char_constant_expression, '<'),
            vec![one_of(vec![vec![expr_lit(
                Precedence::PlainFilter,
                "lipsum|string|first",
            )]])]
        );
    }
}
