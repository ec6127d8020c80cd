//! Integers: zero, positive numbers, signed numbers and sums of parts.
//!
//! Positive integers have many spellings because digits are a common
//! blacklist entry. Most rules cap the value they handle; beyond the caps the
//! expansion would grow faster than it helps.

use crate::core::capability::{Capability, Constant, Constants, names_bound_to};
use crate::core::goal::{
    Goal, GoalKind, expr, expr_lit, int, join_goals, lit, one_of, one_of_lits, pattern, under,
    unsat, ws,
};
use crate::core::precedence::Precedence;
use crate::core::registry::{RuleFn, RuleRegistry};

/// Largest value the context and arithmetic decompositions try.
const DECOMPOSE_LIMIT: i64 = 1000;

/// Zero code points of digit blocks the runtime's lexer accepts as `\d`.
const UNICODE_ZEROS: [u32; 6] = [0xFF10, 0x0660, 0x06F0, 0x0966, 0x09E6, 0x1D7CE];

pub(super) fn register(registry: &mut RuleRegistry) {
    registry.add(GoalKind::Zero, "zero_literal", zero_literal);
    registry.add(GoalKind::Zero, "zero_int_filter", zero_int_filter);
    registry.add(GoalKind::Zero, "zero_framework_length", zero_framework_length);
    registry.add(GoalKind::Zero, "zero_urlencode_count", zero_urlencode_count);
    registry.add(GoalKind::Zero, "zero_cycler_pos", zero_cycler_pos);
    registry.add(GoalKind::Zero, "zero_empty_length_filter", zero_empty_length_filter);
    registry.add(GoalKind::Zero, "zero_empty_len_method", zero_empty_len_method);

    let positive: [(&'static str, RuleFn); 23] = [
        ("positive_decimal", positive_decimal),
        ("positive_hex", positive_hex),
        ("positive_underscore_digits", positive_underscore_digits),
        ("positive_unicode_digits", positive_unicode_digits),
        ("positive_unicode_hex", positive_unicode_hex),
        ("positive_hex_underscore", positive_hex_underscore),
        ("positive_octal_underscore", positive_octal_underscore),
        ("positive_context_sum", positive_context_sum),
        ("positive_factor_product", positive_factor_product),
        ("positive_factor_remainder", positive_factor_remainder),
        ("positive_length_of_literal", positive_length_of_literal),
        ("positive_len_method", positive_len_method),
        ("positive_digit_sum", positive_digit_sum),
        ("positive_digit_tuple_sum", positive_digit_tuple_sum),
        ("positive_char_digits", positive_char_digits),
        ("positive_tuple_count", positive_tuple_count),
        ("positive_string_count", positive_string_count),
        ("positive_ones_sum", positive_ones_sum),
        ("positive_ones_tuple_sum", positive_ones_tuple_sum),
        ("positive_true_sum", positive_true_sum),
        ("positive_true_tuple_sum", positive_true_tuple_sum),
        ("positive_bool", positive_bool),
        ("positive_small_factors", positive_small_factors),
    ];
    for (name, rule) in positive {
        registry.add(GoalKind::PositiveInteger, name, rule);
    }

    registry.add(GoalKind::Integer, "integer_literal", integer_literal);
    registry.add(GoalKind::Integer, "integer_context", integer_context);
    registry.add(GoalKind::Integer, "integer_zero", integer_zero);
    registry.add(GoalKind::Integer, "integer_positive", integer_positive);
    registry.add(GoalKind::Integer, "integer_negative", integer_negative);
    registry.add(
        GoalKind::Integer,
        "integer_context_difference",
        integer_context_difference,
    );

    registry.add(GoalKind::FormulaSum, "formula_infix", formula_infix);
    registry.add(GoalKind::FormulaSum, "formula_tuple_sum", formula_tuple_sum);
    registry.add(GoalKind::FormulaSum, "formula_pairwise", formula_pairwise);
}

const EMPTIES: [&str; 5] = ["''", "\"\"", "()", "[]", "{}"];

fn zero_literal(_: &Constants, _: &Goal) -> Vec<Goal> {
    vec![expr_lit(Precedence::Atom, "0")]
}

fn zero_int_filter(_: &Constants, _: &Goal) -> Vec<Goal> {
    vec![expr_lit(Precedence::PlainFilter, "{}|int")]
}

fn zero_framework_length(_: &Constants, _: &Goal) -> Vec<Goal> {
    vec![expr(
        Precedence::PlainFilter,
        vec![Goal::FrameworkGlobal("g".into()), lit("|urlencode|length")],
    )]
}

fn zero_urlencode_count(_: &Constants, _: &Goal) -> Vec<Goal> {
    vec![expr_lit(Precedence::PlainFilter, "{}|urlencode|count")]
}

fn zero_cycler_pos(_: &Constants, _: &Goal) -> Vec<Goal> {
    vec![expr(
        Precedence::Access,
        vec![
            Goal::TemplateGlobal("cycler".into()),
            lit("(cycler).pos"),
        ],
    )]
}

fn zero_empty_length_filter(_: &Constants, _: &Goal) -> Vec<Goal> {
    vec![expr(
        Precedence::PlainFilter,
        vec![one_of_lits(&EMPTIES), one_of_lits(&["|length", "|count"])],
    )]
}

fn zero_empty_len_method(_: &Constants, _: &Goal) -> Vec<Goal> {
    vec![expr(
        Precedence::FunctionCall,
        vec![one_of_lits(&EMPTIES), lit(".__len__("), ws(), lit(")")],
    )]
}

fn positive_value(goal: &Goal) -> Option<i64> {
    match goal {
        Goal::PositiveInteger(value) if *value >= 0 => Some(*value),
        _ => None,
    }
}

fn positive_decimal(_: &Constants, goal: &Goal) -> Vec<Goal> {
    match positive_value(goal) {
        Some(value) => vec![expr_lit(Precedence::Atom, value.to_string())],
        None => unsat(),
    }
}

fn positive_hex(_: &Constants, goal: &Goal) -> Vec<Goal> {
    match positive_value(goal) {
        Some(value) => vec![expr_lit(Precedence::Atom, format!("{value:#x}"))],
        None => unsat(),
    }
}

fn underscored(digits: &str) -> String {
    let chars: Vec<String> = digits.chars().map(String::from).collect();
    chars.join("_")
}

fn positive_underscore_digits(_: &Constants, goal: &Goal) -> Vec<Goal> {
    match positive_value(goal) {
        Some(value) if value >= 10 => {
            vec![expr_lit(Precedence::Atom, underscored(&value.to_string()))]
        }
        _ => unsat(),
    }
}

/// Replace ASCII digits with the same digit from the block starting at `zero`.
fn unicode_digits(text: &str, zero: u32) -> Option<String> {
    text.chars()
        .map(|c| match c.to_digit(10) {
            Some(digit) => char::from_u32(zero + digit),
            None => Some(c),
        })
        .collect()
}

fn unicode_alternatives(text: &str) -> Goal {
    one_of(
        UNICODE_ZEROS
            .iter()
            .filter_map(|zero| unicode_digits(text, *zero))
            .map(|digits| vec![lit(digits)])
            .collect(),
    )
}

fn positive_unicode_digits(_: &Constants, goal: &Goal) -> Vec<Goal> {
    let Some(value) = positive_value(goal).filter(|value| *value >= 10) else {
        return unsat();
    };
    let decimal = value.to_string();
    let (first, rest) = decimal.split_at(1);
    vec![
        Goal::RequireCapability(Capability::RuntimeMajor(3)),
        expr(
            Precedence::Atom,
            vec![lit(first), unicode_alternatives(rest)],
        ),
    ]
}

fn positive_unicode_hex(_: &Constants, goal: &Goal) -> Vec<Goal> {
    let Some(value) = positive_value(goal).filter(|value| *value > 0) else {
        return unsat();
    };
    vec![
        Goal::RequireCapability(Capability::RuntimeMajor(3)),
        expr(
            Precedence::Atom,
            vec![lit("0x"), unicode_alternatives(&format!("{value:x}"))],
        ),
    ]
}

fn positive_hex_underscore(_: &Constants, goal: &Goal) -> Vec<Goal> {
    match positive_value(goal) {
        Some(value) => vec![expr_lit(
            Precedence::Atom,
            format!("0x_{}", underscored(&format!("{value:x}"))),
        )],
        None => unsat(),
    }
}

fn positive_octal_underscore(_: &Constants, goal: &Goal) -> Vec<Goal> {
    match positive_value(goal) {
        Some(value) => vec![expr_lit(
            Precedence::Atom,
            format!("0o_{}", underscored(&format!("{value:o}"))),
        )],
        None => unsat(),
    }
}

/// Positive integer constants, largest first.
fn positive_constants(constants: &Constants) -> Vec<(&str, i64)> {
    let mut ints: Vec<(&str, i64)> = constants
        .iter()
        .filter_map(|(name, value)| match value {
            Constant::Int(value) if *value > 0 => Some((name.as_str(), *value)),
            _ => None,
        })
        .collect();
    ints.sort_by_key(|(_, value)| std::cmp::Reverse(*value));
    ints
}

/// Greedy decomposition of `value` into a sum of the given constants.
fn greedy_terms<'a>(mut ints: &[(&'a str, i64)], mut value: i64) -> Option<Vec<&'a str>> {
    let mut terms = Vec::new();
    while value != 0 {
        while let Some((_, first)) = ints.first() {
            if *first <= value {
                break;
            }
            ints = &ints[1..];
        }
        let (name, bound) = ints.first()?;
        value -= bound;
        terms.push(*name);
    }
    Some(terms)
}

fn variable(name: &str) -> Goal {
    expr(
        Precedence::Atom,
        vec![lit(name), Goal::WithContextVariable(name.to_string())],
    )
}

fn positive_context_sum(constants: &Constants, goal: &Goal) -> Vec<Goal> {
    let Some(value) = positive_value(goal).filter(|value| *value <= DECOMPOSE_LIMIT) else {
        return unsat();
    };
    let ints = positive_constants(constants);
    match greedy_terms(&ints, value) {
        Some(terms) if !terms.is_empty() => {
            vec![Goal::FormulaSum(terms.into_iter().map(variable).collect())]
        }
        _ => unsat(),
    }
}

fn positive_factor_product(_: &Constants, goal: &Goal) -> Vec<Goal> {
    let Some(value) = positive_value(goal).filter(|v| (20..=DECOMPOSE_LIMIT).contains(v)) else {
        return unsat();
    };
    let mut factors: Vec<i64> = (3..value / 2).filter(|x| value % x == 0).collect();
    if factors.is_empty() {
        return unsat();
    }
    factors.sort_by_key(|x| (*x).max(value / x));
    vec![one_of(
        factors
            .into_iter()
            .map(|x| {
                vec![Goal::product(
                    Goal::PositiveInteger(value / x),
                    Goal::PositiveInteger(x),
                )]
            })
            .collect(),
    )]
}

fn positive_factor_remainder(_: &Constants, goal: &Goal) -> Vec<Goal> {
    let Some(value) = positive_value(goal).filter(|v| (21..=DECOMPOSE_LIMIT).contains(v)) else {
        return unsat();
    };
    let plans = (4..=9)
        .rev()
        .map(|factor| {
            let product = Goal::product(
                Goal::PositiveInteger(value / factor),
                Goal::PositiveInteger(factor),
            );
            match value % factor {
                0 => vec![product],
                rest => vec![Goal::sum(product, Goal::PositiveInteger(rest))],
            }
        })
        .collect();
    vec![one_of(plans)]
}

fn positive_length_of_literal(_: &Constants, goal: &Goal) -> Vec<Goal> {
    let Some(value) = positive_value(goal).filter(|v| (4..=9).contains(v)) else {
        return unsat();
    };
    let count = usize::try_from(value).unwrap_or_default();
    let xs = "x".repeat(count);
    let listed = vec!["x"; count].join(",");
    let lengthy = one_of(vec![
        vec![lit(format!("dict({xs}=x)|join"))],
        vec![lit(format!("({listed})"))],
        vec![lit(format!("cycler({listed}).items"))],
    ]);
    vec![expr(
        Precedence::PlainFilter,
        vec![lengthy, one_of_lits(&["|length", "|count"])],
    )]
}

fn positive_len_method(_: &Constants, goal: &Goal) -> Vec<Goal> {
    let Some(value) = positive_value(goal).filter(|v| (2..=9).contains(v)) else {
        return unsat();
    };
    let count = usize::try_from(value).unwrap_or_default();
    let mut tuples: Vec<Vec<Goal>> = ('a'..='z')
        .map(|c| vec![lit(vec![c.to_string(); count].join(","))])
        .collect();
    tuples.push(join_goals(lit(","), vec![Goal::Zero; count]));
    vec![expr(
        Precedence::FunctionCall,
        vec![
            lit("("),
            one_of(tuples),
            lit(").__len__("),
            ws(),
            lit(")"),
        ],
    )]
}

/// `value` written as repeated `part` plus remainder, for each part size.
fn repeated_parts(value: i64) -> Vec<Vec<String>> {
    (4..=(value - 1).min(40))
        .rev()
        .map(|part| {
            let count = usize::try_from(value / part).unwrap_or_default();
            let mut numbers = vec![part.to_string(); count];
            if value % part != 0 {
                numbers.push((value % part).to_string());
            }
            numbers
        })
        .collect()
}

fn positive_digit_sum(_: &Constants, goal: &Goal) -> Vec<Goal> {
    let Some(value) = positive_value(goal).filter(|v| (5..=DECOMPOSE_LIMIT).contains(v)) else {
        return unsat();
    };
    let plans = repeated_parts(value)
        .into_iter()
        .map(|numbers| vec![lit(numbers.join("+"))])
        .collect();
    vec![expr(Precedence::Plus, vec![one_of(plans)])]
}

fn positive_digit_tuple_sum(_: &Constants, goal: &Goal) -> Vec<Goal> {
    let Some(value) = positive_value(goal).filter(|v| (5..=DECOMPOSE_LIMIT).contains(v)) else {
        return unsat();
    };
    let plans = repeated_parts(value)
        .into_iter()
        .map(|numbers| vec![lit(format!("({})|sum", numbers.join(",")))])
        .collect();
    vec![expr(Precedence::PlainFilter, vec![one_of(plans)])]
}

fn positive_char_digits(_: &Constants, goal: &Goal) -> Vec<Goal> {
    let Some(value) = positive_value(goal).filter(|v| *v >= 10) else {
        return unsat();
    };
    let digits = value
        .to_string()
        .chars()
        .filter_map(|c| c.to_digit(10))
        .map(|digit| int(i64::from(digit)))
        .collect();
    vec![expr(
        Precedence::PlainFilter,
        vec![Goal::Wrap(join_goals(lit("~"), digits)), lit("|int")],
    )]
}

fn positive_tuple_count(_: &Constants, goal: &Goal) -> Vec<Goal> {
    let Some(value) = positive_value(goal).filter(|v| *v <= 10) else {
        return unsat();
    };
    let count = usize::try_from(value).unwrap_or_default();
    let mut items = vec!["x"; count].join(",");
    if value == 1 {
        items.push(',');
    }
    vec![expr_lit(Precedence::PlainFilter, format!("({items})|count"))]
}

fn positive_string_count(_: &Constants, goal: &Goal) -> Vec<Goal> {
    let Some(value) = positive_value(goal).filter(|v| (3..=9).contains(v)) else {
        return unsat();
    };
    let pairs = usize::try_from(value / 2).unwrap_or_default();
    let mut joined = vec!["{}"; pairs].join("~");
    if value % 2 == 1 {
        joined.push_str("~{}|int");
    }
    let parts = pattern(
        &format!("({joined})|count"),
        &[
            ("{}", one_of_lits(&["{}", "()", "{ }", "( )"])),
            ("count", one_of_lits(&["count", "length"])),
        ],
    );
    vec![expr(Precedence::PlainFilter, parts)]
}

fn repeated(goal: &Goal, word: &str) -> Option<String> {
    let value = positive_value(goal).filter(|v| (2..=10).contains(v))?;
    Some(vec![word; usize::try_from(value).ok()?].join("+"))
}

fn positive_ones_sum(_: &Constants, goal: &Goal) -> Vec<Goal> {
    match repeated(goal, "1") {
        Some(text) => vec![expr_lit(Precedence::Plus, text)],
        None => unsat(),
    }
}

fn positive_ones_tuple_sum(_: &Constants, goal: &Goal) -> Vec<Goal> {
    match repeated(goal, "1") {
        Some(text) => vec![expr_lit(
            Precedence::PlainFilter,
            format!("({},)|sum", text.replace('+', ",")),
        )],
        None => unsat(),
    }
}

fn positive_true_sum(_: &Constants, goal: &Goal) -> Vec<Goal> {
    match repeated(goal, "True") {
        Some(text) => vec![expr_lit(Precedence::Plus, text)],
        None => unsat(),
    }
}

fn positive_true_tuple_sum(_: &Constants, goal: &Goal) -> Vec<Goal> {
    match repeated(goal, "True") {
        Some(text) => vec![expr_lit(
            Precedence::PlainFilter,
            format!("({},)|sum", text.replace('+', ",")),
        )],
        None => unsat(),
    }
}

fn positive_bool(_: &Constants, goal: &Goal) -> Vec<Goal> {
    match positive_value(goal) {
        Some(0) => vec![expr_lit(Precedence::Plus, "False+False")],
        Some(1) => vec![expr_lit(Precedence::Plus, "True+False")],
        _ => unsat(),
    }
}

/// `a*b+c` with both factors near the square root, for values too large for
/// the counting rules.
fn positive_small_factors(_: &Constants, goal: &Goal) -> Vec<Goal> {
    let Some(value) = positive_value(goal).filter(|v| (21..=DECOMPOSE_LIMIT).contains(v)) else {
        return unsat();
    };
    let limit = value.isqrt() + 2;
    let mut exact = Vec::new();
    let mut inexact = Vec::new();
    for factor in 3..limit {
        let (times, rest) = (value / factor, value % factor);
        if times > limit {
            continue;
        }
        let product = Goal::product(
            Goal::PositiveInteger(times),
            Goal::PositiveInteger(factor),
        );
        if rest == 0 {
            exact.push(vec![product]);
        } else {
            inexact.push(vec![Goal::sum(product, Goal::PositiveInteger(rest))]);
        }
    }
    exact.reverse();
    exact.extend(inexact);
    if exact.is_empty() {
        return unsat();
    }
    vec![one_of(exact)]
}

fn integer_literal(_: &Constants, goal: &Goal) -> Vec<Goal> {
    match goal {
        Goal::Integer(value) if *value >= 0 => vec![expr_lit(Precedence::Atom, value.to_string())],
        Goal::Integer(value) => vec![expr_lit(Precedence::Unary, value.to_string())],
        _ => unsat(),
    }
}

fn integer_context(constants: &Constants, goal: &Goal) -> Vec<Goal> {
    let Goal::Integer(value) = goal else {
        return unsat();
    };
    let value = Constant::Int(*value);
    if names_bound_to(constants, &value).next().is_none() {
        return unsat();
    }
    vec![Goal::VariableOf(value)]
}

fn integer_zero(_: &Constants, goal: &Goal) -> Vec<Goal> {
    match goal {
        Goal::Integer(0) => vec![Goal::Zero],
        _ => unsat(),
    }
}

fn integer_positive(_: &Constants, goal: &Goal) -> Vec<Goal> {
    match goal {
        Goal::Integer(value) if *value > 0 => vec![Goal::PositiveInteger(*value)],
        _ => unsat(),
    }
}

/// Negation binds looser than filters, so the operand is kept at call
/// strength: `-x|f` would otherwise negate the filtered value.
fn integer_negative(_: &Constants, goal: &Goal) -> Vec<Goal> {
    match goal {
        Goal::Integer(value) if *value < 0 => match value.checked_neg() {
            Some(magnitude) => vec![expr(
                Precedence::Unary,
                vec![
                    lit("-"),
                    under(Precedence::FunctionCall, Goal::PositiveInteger(magnitude)),
                ],
            )],
            None => unsat(),
        },
        _ => unsat(),
    }
}

fn integer_context_difference(constants: &Constants, goal: &Goal) -> Vec<Goal> {
    let Goal::Integer(value) = goal else {
        return unsat();
    };
    let value = *value;
    if value.unsigned_abs() > DECOMPOSE_LIMIT.unsigned_abs() {
        return unsat();
    }
    let ints = positive_constants(constants);
    let Some(&(minuend, bound)) = ints
        .iter()
        .filter(|(_, bound)| *bound >= value)
        .min_by_key(|(_, bound)| *bound)
    else {
        return unsat();
    };
    let smaller: Vec<(&str, i64)> = ints.into_iter().filter(|(_, v)| *v <= bound).collect();
    let Some(subtrahends) = greedy_terms(&smaller, bound - value) else {
        return unsat();
    };
    let names: Vec<&str> = std::iter::once(minuend).chain(subtrahends).collect();
    let mut parts = vec![lit(format!("({})", names.join("-")))];
    parts.extend(
        names
            .iter()
            .map(|name| Goal::WithContextVariable((*name).to_string())),
    );
    vec![expr(Precedence::Atom, parts)]
}

fn formula_infix(_: &Constants, goal: &Goal) -> Vec<Goal> {
    let Goal::FormulaSum(parts) = goal else {
        return unsat();
    };
    match parts.as_slice() {
        [] => unsat(),
        [single] => vec![single.clone()],
        _ => {
            let enclosed = parts
                .iter()
                .map(|part| under(Precedence::Plus, part.clone()))
                .collect();
            vec![expr(Precedence::Plus, join_goals(lit("+"), enclosed))]
        }
    }
}

fn formula_tuple_sum(_: &Constants, goal: &Goal) -> Vec<Goal> {
    let Goal::FormulaSum(parts) = goal else {
        return unsat();
    };
    if parts.is_empty() {
        return unsat();
    }
    let mut plan = vec![lit("(")];
    plan.extend(join_goals(lit(","), parts.clone()));
    plan.push(lit(",)|sum"));
    vec![expr(Precedence::PlainFilter, plan)]
}

fn formula_pairwise(_: &Constants, goal: &Goal) -> Vec<Goal> {
    let Goal::FormulaSum(parts) = goal else {
        return unsat();
    };
    let mut parts = parts.iter().cloned();
    let Some(first) = parts.next() else {
        return unsat();
    };
    vec![parts.fold(first, Goal::sum)]
}
