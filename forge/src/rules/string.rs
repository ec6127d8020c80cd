//! String values.
//!
//! Rules are ordered roughly by output length: plain literals first, then
//! filter tricks over identifiers, then character-by-character and
//! `%c`-formatting constructions that work for any text.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

use super::is_identifier;
use crate::core::capability::{Capability, Constant, Constants, names_bound_to};
use crate::core::goal::{
    Goal, GoalKind, expr, expr_lit, int, join_goals, lit, one_of, quoted, under, unsat, ws,
};
use crate::core::precedence::Precedence;
use crate::core::registry::{RuleFn, RuleRegistry};

/// Longest value split into two adjacent literals.
const TWO_PART_LIMIT: usize = 20;
/// Longest value packed into a single integer for `to_bytes`.
const INT_BYTES_LIMIT: usize = 7;

static DUNDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^__[A-Za-z0-9_]+__$").expect("dunder regex"));
static DUNDER_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^__[A-Za-z][A-Za-z0-9]+__$").expect("dunder word regex"));
static LETTERS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_]+$").expect("letters regex"));

const RULES: &[(&str, RuleFn)] = &[
    ("string_single_quoted", string_single_quoted),
    ("string_double_quoted", string_double_quoted),
    ("string_percent_lower_c_run", string_percent_lower_c_run),
    ("string_two_part_concat", string_two_part_concat),
    ("string_dunder_literal_split", string_dunder_literal_split),
    ("string_context", string_context),
    ("string_piece_alias", string_piece_alias),
    ("string_dunder_pieces", string_dunder_pieces),
    ("string_dunder_format", string_dunder_format),
    ("string_dunder_format_filter", string_dunder_format_filter),
    ("string_reversed_literal", string_reversed_literal),
    ("string_dict_join", string_dict_join),
    ("string_dict_first", string_dict_first),
    ("string_dict_reverse", string_dict_reverse),
    ("string_lower_method", string_lower_method),
    ("string_lower_filter", string_lower_filter),
    ("string_dict_lower", string_dict_lower),
    ("string_char_plus", string_char_plus),
    ("string_char_juxtaposed", string_char_juxtaposed),
    ("string_hex_escapes", string_hex_escapes),
    ("string_unicode_escapes", string_unicode_escapes),
    ("string_octal_escapes", string_octal_escapes),
    ("string_single_character", string_single_character),
    ("string_namespace_lower", string_namespace_lower),
    ("string_split_dict_join", string_split_dict_join),
    ("string_split_dict_concat", string_split_dict_concat),
    ("string_letters_dict_join", string_letters_dict_join),
    ("string_namespace_split_join", string_namespace_split_join),
    ("string_format_percent_char", string_format_percent_char),
    ("string_format_percent", string_format_percent),
    ("string_format_filter", string_format_filter),
    ("string_format_method", string_format_method),
    ("string_char_concat", string_char_concat),
    ("string_char_tuple_join", string_char_tuple_join),
    ("string_char_concat_tilde", string_char_concat_tilde),
    ("string_join_by_replace", string_join_by_replace),
    ("string_int_bytes", string_int_bytes),
    ("string_builtin_bytes", string_builtin_bytes),
];

pub(super) fn register(registry: &mut RuleRegistry) {
    for (name, rule) in RULES {
        registry.add(GoalKind::StringValue, name, *rule);
    }
}

fn value_of(goal: &Goal) -> Option<&str> {
    match goal {
        Goal::StringValue(value) => Some(value),
        _ => None,
    }
}

/// Run `build` on the goal's value, or report the rule inapplicable.
fn with_value(goal: &Goal, build: impl FnOnce(&str) -> Option<Vec<Goal>>) -> Vec<Goal> {
    value_of(goal).and_then(build).unwrap_or_else(unsat)
}

fn both_quotes(build: impl Fn(char) -> String) -> Goal {
    one_of(vec![vec![lit(build('\''))], vec![lit(build('"'))]])
}

fn string_single_quoted(_: &Constants, goal: &Goal) -> Vec<Goal> {
    with_value(goal, |value| {
        Some(vec![expr_lit(Precedence::Atom, quoted(value, '\''))])
    })
}

fn string_double_quoted(_: &Constants, goal: &Goal) -> Vec<Goal> {
    with_value(goal, |value| {
        Some(vec![expr_lit(Precedence::Atom, quoted(value, '"'))])
    })
}

fn string_percent_lower_c_run(_: &Constants, goal: &Goal) -> Vec<Goal> {
    with_value(goal, |value| {
        let count = value.matches("%c").count();
        (count > 0 && value.len() == count * 2).then(|| vec![Goal::ManyPercentLowerC(count)])
    })
}

fn string_two_part_concat(_: &Constants, goal: &Goal) -> Vec<Goal> {
    with_value(goal, |value| {
        let chars: Vec<char> = value.chars().collect();
        if !(2..=TWO_PART_LIMIT).contains(&chars.len()) {
            return None;
        }
        let mut plans = Vec::new();
        for quote in ['\'', '"'] {
            for split in 1..chars.len() {
                let head: String = chars[..split].iter().collect();
                let tail: String = chars[split..].iter().collect();
                plans.push(vec![lit(quoted(&head, quote)), lit(quoted(&tail, quote))]);
            }
        }
        Some(vec![expr(Precedence::Atom, vec![one_of(plans)])])
    })
}

fn string_dunder_literal_split(_: &Constants, goal: &Goal) -> Vec<Goal> {
    with_value(goal, |value| {
        if !DUNDER.is_match(value) {
            return None;
        }
        let inner = &value[1..value.len() - 1];
        let plans = ['\'', '"']
            .into_iter()
            .map(|quote| {
                vec![
                    lit(quoted("_", quote)),
                    lit(quoted(inner, quote)),
                    lit(quoted("_", quote)),
                ]
            })
            .collect();
        Some(vec![expr(Precedence::Atom, vec![one_of(plans)])])
    })
}

fn string_context(constants: &Constants, goal: &Goal) -> Vec<Goal> {
    with_value(goal, |value| {
        let value = Constant::str(value);
        names_bound_to(constants, &value).next()?;
        Some(vec![Goal::VariableOf(value)])
    })
}

fn string_piece_alias(_: &Constants, goal: &Goal) -> Vec<Goal> {
    with_value(goal, |value| {
        let piece = match value {
            "__" => Goal::DoubleUnderline,
            "_" => Goal::Underline,
            "%" => Goal::Percent,
            "%c" => Goal::PercentLowerC,
            _ => return None,
        };
        Some(vec![piece])
    })
}

fn string_dunder_pieces(_: &Constants, goal: &Goal) -> Vec<Goal> {
    with_value(goal, |value| {
        if !DUNDER.is_match(value) {
            return None;
        }
        Some(vec![Goal::ConcatMany(vec![
            Goal::DoubleUnderline,
            Goal::string(&value[2..value.len() - 2]),
            Goal::DoubleUnderline,
        ])])
    })
}

/// `"%sclass%%s"%"__"%"__"`: the doubled percent survives the first format.
fn string_dunder_format(_: &Constants, goal: &Goal) -> Vec<Goal> {
    with_value(goal, |value| {
        if !DUNDER_WORD.is_match(value) {
            return None;
        }
        let template = Goal::string(format!("%s{}%%s", &value[2..value.len() - 2]));
        let dunder = || under(Precedence::Modulo, Goal::DoubleUnderline);
        Some(vec![expr(
            Precedence::Modulo,
            vec![
                under(Precedence::Modulo, template),
                lit("%"),
                dunder(),
                lit("%"),
                dunder(),
            ],
        )])
    })
}

fn string_dunder_format_filter(_: &Constants, goal: &Goal) -> Vec<Goal> {
    with_value(goal, |value| {
        if !DUNDER_WORD.is_match(value) {
            return None;
        }
        let template = Goal::string(format!("%s{}%%s", &value[2..value.len() - 2]));
        Some(vec![expr(
            Precedence::PlainFilter,
            vec![
                under(Precedence::PlainFilter, template),
                lit("|format("),
                ws(),
                Goal::DoubleUnderline,
                ws(),
                lit(")|format("),
                ws(),
                Goal::DoubleUnderline,
                ws(),
                lit(")"),
            ],
        )])
    })
}

fn string_reversed_literal(_: &Constants, goal: &Goal) -> Vec<Goal> {
    with_value(goal, |value| {
        let reversed: String = value.chars().rev().collect();
        Some(vec![expr(
            Precedence::Access,
            vec![
                both_quotes(|quote| quoted(&reversed, quote)),
                lit("[::-1]"),
            ],
        )])
    })
}

fn letters(value: &str) -> Option<&str> {
    LETTERS.is_match(value).then_some(value)
}

fn string_dict_join(_: &Constants, goal: &Goal) -> Vec<Goal> {
    with_value(goal, |value| {
        let value = letters(value)?;
        Some(vec![expr_lit(
            Precedence::PlainFilter,
            format!("dict({value}=i)|join"),
        )])
    })
}

fn string_dict_first(_: &Constants, goal: &Goal) -> Vec<Goal> {
    with_value(goal, |value| {
        let value = letters(value)?;
        Some(vec![expr_lit(
            Precedence::PlainFilter,
            format!("dict({value}=i)|first"),
        )])
    })
}

fn string_dict_reverse(_: &Constants, goal: &Goal) -> Vec<Goal> {
    with_value(goal, |value| {
        let value = letters(value)?;
        let reversed: String = value.chars().rev().collect();
        Some(vec![expr(
            Precedence::PlainFilter,
            vec![
                lit(format!("dict({reversed}=i)|")),
                one_of(vec![vec![lit("first")], vec![lit("last")]]),
                lit("|reverse"),
            ],
        )])
    })
}

/// Uppercase form that lowercases back to the value, if it differs.
fn upper_form(value: &str) -> Option<String> {
    let upper = value.to_uppercase();
    (upper != value && upper.to_lowercase() == value).then_some(upper)
}

fn string_lower_method(_: &Constants, goal: &Goal) -> Vec<Goal> {
    with_value(goal, |value| {
        let upper = upper_form(value)?;
        Some(vec![expr(
            Precedence::FunctionCall,
            vec![
                both_quotes(|quote| quoted(&upper, quote)),
                lit(".lower("),
                ws(),
                lit(")"),
            ],
        )])
    })
}

fn string_lower_filter(_: &Constants, goal: &Goal) -> Vec<Goal> {
    with_value(goal, |value| {
        let upper = upper_form(value)?;
        Some(vec![expr(
            Precedence::PlainFilter,
            vec![both_quotes(|quote| quoted(&upper, quote)), lit("|lower")],
        )])
    })
}

fn string_dict_lower(_: &Constants, goal: &Goal) -> Vec<Goal> {
    with_value(goal, |value| {
        let upper = upper_form(value).filter(|upper| is_identifier(upper))?;
        Some(vec![expr(
            Precedence::PlainFilter,
            vec![
                lit(format!("dict({upper}=i)|")),
                one_of(vec![vec![lit("first")], vec![lit("last")]]),
                lit("|lower"),
            ],
        )])
    })
}

fn quoted_chars(value: &str, quote: char, separator: &str) -> String {
    let chars: Vec<String> = value
        .chars()
        .map(|c| quoted(&c.to_string(), quote))
        .collect();
    chars.join(separator)
}

fn string_char_plus(_: &Constants, goal: &Goal) -> Vec<Goal> {
    with_value(goal, |value| {
        (value.chars().count() >= 2).then(|| {
            vec![expr(
                Precedence::Plus,
                vec![both_quotes(|quote| quoted_chars(value, quote, "+"))],
            )]
        })
    })
}

fn string_char_juxtaposed(_: &Constants, goal: &Goal) -> Vec<Goal> {
    with_value(goal, |value| {
        (value.chars().count() >= 2).then(|| {
            let plans = ['"', '\'']
                .into_iter()
                .flat_map(|quote| {
                    ["", " "].map(|separator| vec![lit(quoted_chars(value, quote, separator))])
                })
                .collect();
            vec![expr(Precedence::Atom, vec![one_of(plans)])]
        })
    })
}

fn escaped(value: &str, escape: impl Fn(u32) -> String) -> Option<Goal> {
    if !value.is_ascii() || value.is_empty() {
        return None;
    }
    let body: String = value.chars().map(|c| escape(u32::from(c))).collect();
    Some(expr(
        Precedence::Atom,
        vec![one_of(vec![
            vec![lit(format!("'{body}'"))],
            vec![lit(format!("\"{body}\""))],
        ])],
    ))
}

fn string_hex_escapes(_: &Constants, goal: &Goal) -> Vec<Goal> {
    with_value(goal, |value| {
        escaped(value, |code| format!("\\x{code:02x}")).map(|goal| vec![goal])
    })
}

fn string_unicode_escapes(_: &Constants, goal: &Goal) -> Vec<Goal> {
    with_value(goal, |value| {
        escaped(value, |code| format!("\\u{code:04x}")).map(|goal| vec![goal])
    })
}

fn string_octal_escapes(_: &Constants, goal: &Goal) -> Vec<Goal> {
    with_value(goal, |value| {
        escaped(value, |code| format!("\\{code:03o}")).map(|goal| vec![goal])
    })
}

fn string_single_character(_: &Constants, goal: &Goal) -> Vec<Goal> {
    with_value(goal, |value| {
        let mut chars = value.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Some(vec![Goal::Character(c)]),
            _ => None,
        }
    })
}

fn string_namespace_lower(_: &Constants, goal: &Goal) -> Vec<Goal> {
    with_value(goal, |value| {
        let upper = upper_form(value).filter(|upper| is_identifier(upper))?;
        Some(vec![expr(
            Precedence::PlainFilter,
            vec![
                Goal::TemplateGlobal("namespace".into()),
                lit(format!("({upper}=x)._Namespace__attrs|")),
                one_of(vec![vec![lit("first")], vec![lit("last")]]),
                lit("|lower"),
            ],
        )])
    })
}

/// Chunks of at most `size` characters, if they are pairwise distinct.
fn distinct_chunks(value: &str, size: usize) -> Option<Vec<String>> {
    let chars: Vec<char> = value.chars().collect();
    let chunks: Vec<String> = chars
        .chunks(size)
        .map(|chunk| chunk.iter().collect())
        .collect();
    let unique: HashSet<&String> = chunks.iter().collect();
    (unique.len() == chunks.len()).then_some(chunks)
}

fn keyword_list(chunks: &[String]) -> String {
    let pairs: Vec<String> = chunks.iter().map(|chunk| format!("{chunk}=x")).collect();
    pairs.join(",")
}

/// Keyword order is preserved by dicts only on runtime 3.
fn string_split_dict_join(_: &Constants, goal: &Goal) -> Vec<Goal> {
    with_value(goal, |value| {
        let chunks = distinct_chunks(letters(value)?, 3)?;
        Some(vec![
            Goal::RequireCapability(Capability::RuntimeMajor(3)),
            expr_lit(
                Precedence::PlainFilter,
                format!("dict({})|join", keyword_list(&chunks)),
            ),
        ])
    })
}

fn string_split_dict_concat(_: &Constants, goal: &Goal) -> Vec<Goal> {
    with_value(goal, |value| {
        let value = letters(value)?;
        let chars: Vec<char> = value.chars().collect();
        if chars.len() <= 3 {
            return None;
        }
        let parts = chars
            .chunks(3)
            .map(|chunk| {
                let chunk: String = chunk.iter().collect();
                expr_lit(Precedence::PlainFilter, format!("dict({chunk}=i)|join"))
            })
            .collect();
        Some(vec![Goal::ConcatMany(parts)])
    })
}

fn string_letters_dict_join(_: &Constants, goal: &Goal) -> Vec<Goal> {
    with_value(goal, |value| {
        let chunks = distinct_chunks(letters(value)?, 1)?;
        Some(vec![
            Goal::RequireCapability(Capability::RuntimeMajor(3)),
            expr_lit(
                Precedence::PlainFilter,
                format!("dict({})|join", keyword_list(&chunks)),
            ),
        ])
    })
}

fn string_namespace_split_join(_: &Constants, goal: &Goal) -> Vec<Goal> {
    with_value(goal, |value| {
        let chunks = distinct_chunks(letters(value)?, 3)?;
        Some(vec![
            Goal::RequireCapability(Capability::RuntimeMajor(3)),
            expr(
                Precedence::PlainFilter,
                vec![
                    Goal::TemplateGlobal("namespace".into()),
                    lit(format!(
                        "({})._Namespace__attrs|join",
                        keyword_list(&chunks)
                    )),
                ],
            ),
        ])
    })
}

fn char_codes(value: &str) -> Vec<Goal> {
    value.chars().map(|c| int(i64::from(u32::from(c)))).collect()
}

fn string_format_percent_char(_: &Constants, goal: &Goal) -> Vec<Goal> {
    with_value(goal, |value| {
        let mut chars = value.chars();
        let (Some(c), None) = (chars.next(), chars.next()) else {
            return None;
        };
        if c == '%' || c == 'c' {
            return None;
        }
        Some(vec![Goal::modulo(
            Goal::PercentLowerC,
            int(i64::from(u32::from(c))),
        )])
    })
}

fn string_format_percent(_: &Constants, goal: &Goal) -> Vec<Goal> {
    with_value(goal, |value| {
        let count = value.chars().count();
        (count >= 2).then(|| {
            vec![Goal::modulo(
                Goal::ManyPercentLowerC(count),
                Goal::Wrap(join_goals(lit(","), char_codes(value))),
            )]
        })
    })
}

fn string_format_filter(_: &Constants, goal: &Goal) -> Vec<Goal> {
    with_value(goal, |value| {
        let count = value.chars().count();
        if count == 0 {
            return None;
        }
        let mut plan = vec![
            under(Precedence::PlainFilter, Goal::ManyPercentLowerC(count)),
            lit("|format("),
        ];
        plan.extend(join_goals(lit(","), char_codes(value)));
        plan.push(lit(")"));
        Some(vec![expr(Precedence::PlainFilter, plan)])
    })
}

fn string_format_method(_: &Constants, goal: &Goal) -> Vec<Goal> {
    with_value(goal, |value| {
        let count = value.chars().count();
        if count == 0 || value.chars().all(|c| c.is_ascii_lowercase()) {
            return None;
        }
        let format = Goal::attribute(Goal::ManyFormatC(count), "format");
        Some(vec![Goal::call(format, char_codes(value))])
    })
}

fn characters(value: &str) -> Option<Vec<Goal>> {
    (value.chars().count() >= 2).then(|| value.chars().map(Goal::Character).collect())
}

fn string_char_concat(_: &Constants, goal: &Goal) -> Vec<Goal> {
    with_value(goal, |value| {
        characters(value).map(|chars| vec![Goal::ConcatMany(chars)])
    })
}

fn string_char_tuple_join(_: &Constants, goal: &Goal) -> Vec<Goal> {
    with_value(goal, |value| {
        let chars = characters(value)?;
        let mut plan = vec![lit("(")];
        plan.extend(join_goals(lit(","), chars));
        plan.push(lit(")|join"));
        Some(vec![expr(Precedence::PlainFilter, plan)])
    })
}

fn string_char_concat_tilde(_: &Constants, goal: &Goal) -> Vec<Goal> {
    with_value(goal, |value| {
        let chars = characters(value)?
            .into_iter()
            .map(|c| under(Precedence::Tilde, c))
            .collect();
        Some(vec![expr(Precedence::Tilde, join_goals(lit("~"), chars))])
    })
}

/// `12|replace(1,"__")|replace(2,"init")` for values with a dunder at one end.
fn string_join_by_replace(_: &Constants, goal: &Goal) -> Vec<Goal> {
    with_value(goal, |value| {
        if value.chars().any(|c| c.is_ascii_digit()) || value.len() <= 2 {
            return None;
        }
        let split = if value.starts_with("__") {
            2
        } else if value.ends_with("__") {
            value.len() - 2
        } else {
            return None;
        };
        let (head, tail) = value.split_at(split);
        let comma = one_of(vec![vec![lit("")], vec![lit(",")]]);
        Some(vec![expr(
            Precedence::PlainFilter,
            vec![
                under(Precedence::PlainFilter, int(12)),
                lit("|replace("),
                int(1),
                lit(","),
                Goal::string(head),
                comma.clone(),
                lit(")|replace("),
                int(2),
                lit(","),
                Goal::string(tail),
                comma,
                lit(")"),
            ],
        )])
    })
}

fn string_int_bytes(_: &Constants, goal: &Goal) -> Vec<Goal> {
    with_value(goal, |value| {
        if !value.is_ascii()
            || value.is_empty()
            || value.len() > INT_BYTES_LIMIT
            || (value.len() == 1 && value.chars().all(|c| c.is_ascii_alphanumeric()))
        {
            return None;
        }
        let packed = value
            .bytes()
            .fold(0_i64, |acc, byte| (acc << 8) | i64::from(byte));
        let length = i64::try_from(value.len()).ok()?;
        let arguments = one_of(vec![
            vec![
                int(length),
                Goal::RequireCapability(Capability::RuntimeMinorAtLeast(11)),
            ],
            vec![int(length), lit(","), Goal::cached(Goal::string("big"))],
        ]);
        Some(vec![
            Goal::RequireCapability(Capability::RuntimeMajor(3)),
            expr(
                Precedence::FunctionCall,
                vec![
                    under(Precedence::Access, int(packed)),
                    lit(".to_bytes("),
                    arguments,
                    lit(").decode()"),
                ],
            ),
        ])
    })
}

fn string_builtin_bytes(_: &Constants, goal: &Goal) -> Vec<Goal> {
    with_value(goal, |value| {
        if value.is_empty() || !value.is_ascii() {
            return None;
        }
        let mut codes = join_goals(lit(","), char_codes(value));
        codes.push(lit(","));
        let bytes = Goal::call(
            Goal::item(Goal::BuiltinsTable, "bytes"),
            vec![Goal::Wrap(codes)],
        );
        Some(vec![
            Goal::RequireCapability(Capability::RuntimeMajor(3)),
            Goal::call(Goal::attribute(bytes, "decode"), Vec::new()),
        ])
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expand(rule: RuleFn, value: &str) -> Vec<Goal> {
        rule(&Constants::new(), &Goal::string(value))
    }

    #[test]
    fn registration_order_starts_with_plain_literals() {
        assert_eq!(RULES[0].0, "string_single_quoted");
        assert_eq!(RULES[1].0, "string_double_quoted");
    }

    #[test]
    fn percent_runs_become_many_percent_lower_c() {
        assert_eq!(
            expand(string_percent_lower_c_run, "%c%c%c"),
            vec![Goal::ManyPercentLowerC(3)]
        );
        assert_eq!(expand(string_percent_lower_c_run, "%c%"), unsat());
        assert_eq!(expand(string_percent_lower_c_run, ""), unsat());
    }

    #[test]
    fn dunder_names_split_into_pieces() {
        assert_eq!(
            expand(string_dunder_pieces, "__class__"),
            vec![Goal::ConcatMany(vec![
                Goal::DoubleUnderline,
                Goal::string("class"),
                Goal::DoubleUnderline,
            ])]
        );
        assert_eq!(expand(string_dunder_pieces, "class"), unsat());
    }

    #[test]
    fn dict_join_needs_letters() {
        assert_eq!(
            expand(string_dict_join, "ab"),
            vec![expr_lit(Precedence::PlainFilter, "dict(ab=i)|join")]
        );
        assert_eq!(expand(string_dict_join, "a b"), unsat());
    }

    #[test]
    fn lower_rules_need_a_case_round_trip() {
        assert_eq!(upper_form("popen").as_deref(), Some("POPEN"));
        assert_eq!(upper_form("POPEN"), None);
        assert_eq!(upper_form("123"), None);
        assert_eq!(upper_form("ß"), None);
    }

    #[test]
    fn escapes_cover_ascii_only() {
        let plan = expand(string_hex_escapes, "ab");
        let Goal::Expression(_, parts) = &plan[0] else {
            panic!("expected expression");
        };
        assert_eq!(
            parts[0],
            one_of(vec![
                vec![lit("'\\x61\\x62'")],
                vec![lit("\"\\x61\\x62\"")],
            ])
        );
        assert_eq!(expand(string_octal_escapes, "é"), unsat());
    }

    #[test]
    fn distinct_chunks_reject_repeats() {
        assert_eq!(
            distinct_chunks("popen", 3),
            Some(vec!["pop".to_string(), "en".to_string()])
        );
        assert_eq!(distinct_chunks("abcabc", 3), None);
    }

    #[test]
    fn int_bytes_packs_big_endian() {
        let plan = expand(string_int_bytes, "id");
        let Goal::Expression(_, parts) = &plan[1] else {
            panic!("expected expression: {plan:?}");
        };
        assert_eq!(parts[0], under(Precedence::Access, int(0x6964)));
        assert_eq!(expand(string_int_bytes, "a"), unsat());
    }

    #[test]
    fn join_by_replace_splits_at_dunder() {
        let plan = expand(string_join_by_replace, "__init");
        let Goal::Expression(_, parts) = &plan[0] else {
            panic!("expected expression");
        };
        assert!(parts.contains(&Goal::string("__")));
        assert!(parts.contains(&Goal::string("init")));
        assert_eq!(expand(string_join_by_replace, "plain"), unsat());
    }
}
