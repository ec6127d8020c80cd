//! The goal vocabulary: what a payload fragment must mean, and the partially
//! resolved plans rules rewrite goals into.
//!
//! Goals are immutable values. They derive `Hash`/`Eq`, so a goal is its own
//! cache key in the synthesizer.

use std::fmt;

use serde::Serialize;

use crate::core::capability::{Capability, Constant};
use crate::core::precedence::Precedence;

/// One step of a [`Goal::ChainedAccess`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "via", content = "name", rename_all = "snake_case")]
pub enum Access {
    Attribute(String),
    Item(String),
    ClassAttribute(String),
}

/// A synthesis goal or plan element.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", content = "args", rename_all = "snake_case")]
pub enum Goal {
    /// Text emitted verbatim; accepted only if the oracle accepts it.
    Literal(String),
    /// Never resolvable. A rule returns it to declare itself inapplicable.
    Unsatisfiable,

    /// Parts concatenated in order, realized at the given precedence class.
    Expression(Precedence, Vec<Goal>),
    /// Parenthesize the inner goal if it binds looser than the class.
    EncloseUnder(Precedence, Box<Goal>),
    /// Parenthesize unconditionally.
    Enclose(Box<Goal>),
    /// Parenthesize a part list.
    Wrap(Vec<Goal>),
    /// Candidate plans tried in order; the first that resolves wins.
    Alternatives(Vec<Vec<Goal>>),
    /// Marks a plan as depending on a preamble variable.
    WithContextVariable(String),
    /// Any known context variable bound to the constant.
    VariableOf(Constant),
    /// A global every template environment provides (`lipsum`, `cycler`, ...).
    TemplateGlobal(String),
    /// A global only the web framework provides (`g`, `config`, ...).
    FrameworkGlobal(String),
    RequireCapability(Capability),
    /// Empty text or a whitespace character.
    WhitespaceSlot,
    /// Reuse a pinned or previously resolved expression for the goal.
    CachedReference(Box<Goal>),

    Zero,
    PositiveInteger(i64),
    Integer(i64),
    /// Sum of integer-valued parts.
    FormulaSum(Vec<Goal>),
    StringValue(String),
    Character(char),

    Percent,
    LowerC,
    PercentLowerC,
    /// `%c` repeated n times.
    ManyPercentLowerC(usize),
    /// `{:c}` repeated n times.
    ManyFormatC(usize),
    Underline,
    DoubleUnderline,

    Sum(Box<Goal>, Box<Goal>),
    Product(Box<Goal>, Box<Goal>),
    Modulo(Box<Goal>, Box<Goal>),
    Concat(Box<Goal>, Box<Goal>),
    ConcatMany(Vec<Goal>),
    FunctionCall(Box<Goal>, Vec<Goal>),

    AttributeOf(Box<Goal>, String),
    ItemOf(Box<Goal>, String),
    ClassAttributeOf(Box<Goal>, String),
    ChainedAccess(Box<Goal>, Vec<Access>),
    /// A one-element list holding the object.
    Listify(Box<Goal>),

    BuiltinsTable,
    ImportPrimitive,
    EvalPrimitive,
    /// Evaluate the code the inner goal produces as a string.
    Eval(Box<Goal>),
    ConfigObject,
    OsModule,
    ProcessSpawn(String),
    ProcessSpawnAndRead(String),
}

/// Fieldless discriminant of [`Goal`], used to key the rule registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GoalKind {
    Literal,
    Unsatisfiable,
    Expression,
    EncloseUnder,
    Enclose,
    Wrap,
    Alternatives,
    WithContextVariable,
    VariableOf,
    TemplateGlobal,
    FrameworkGlobal,
    RequireCapability,
    WhitespaceSlot,
    CachedReference,
    Zero,
    PositiveInteger,
    Integer,
    FormulaSum,
    StringValue,
    Character,
    Percent,
    LowerC,
    PercentLowerC,
    ManyPercentLowerC,
    ManyFormatC,
    Underline,
    DoubleUnderline,
    Sum,
    Product,
    Modulo,
    Concat,
    ConcatMany,
    FunctionCall,
    AttributeOf,
    ItemOf,
    ClassAttributeOf,
    ChainedAccess,
    Listify,
    BuiltinsTable,
    ImportPrimitive,
    EvalPrimitive,
    Eval,
    ConfigObject,
    OsModule,
    ProcessSpawn,
    ProcessSpawnAndRead,
}

impl fmt::Display for GoalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

impl Goal {
    pub fn kind(&self) -> GoalKind {
        match self {
            Goal::Literal(_) => GoalKind::Literal,
            Goal::Unsatisfiable => GoalKind::Unsatisfiable,
            Goal::Expression(..) => GoalKind::Expression,
            Goal::EncloseUnder(..) => GoalKind::EncloseUnder,
            Goal::Enclose(_) => GoalKind::Enclose,
            Goal::Wrap(_) => GoalKind::Wrap,
            Goal::Alternatives(_) => GoalKind::Alternatives,
            Goal::WithContextVariable(_) => GoalKind::WithContextVariable,
            Goal::VariableOf(_) => GoalKind::VariableOf,
            Goal::TemplateGlobal(_) => GoalKind::TemplateGlobal,
            Goal::FrameworkGlobal(_) => GoalKind::FrameworkGlobal,
            Goal::RequireCapability(_) => GoalKind::RequireCapability,
            Goal::WhitespaceSlot => GoalKind::WhitespaceSlot,
            Goal::CachedReference(_) => GoalKind::CachedReference,
            Goal::Zero => GoalKind::Zero,
            Goal::PositiveInteger(_) => GoalKind::PositiveInteger,
            Goal::Integer(_) => GoalKind::Integer,
            Goal::FormulaSum(_) => GoalKind::FormulaSum,
            Goal::StringValue(_) => GoalKind::StringValue,
            Goal::Character(_) => GoalKind::Character,
            Goal::Percent => GoalKind::Percent,
            Goal::LowerC => GoalKind::LowerC,
            Goal::PercentLowerC => GoalKind::PercentLowerC,
            Goal::ManyPercentLowerC(_) => GoalKind::ManyPercentLowerC,
            Goal::ManyFormatC(_) => GoalKind::ManyFormatC,
            Goal::Underline => GoalKind::Underline,
            Goal::DoubleUnderline => GoalKind::DoubleUnderline,
            Goal::Sum(..) => GoalKind::Sum,
            Goal::Product(..) => GoalKind::Product,
            Goal::Modulo(..) => GoalKind::Modulo,
            Goal::Concat(..) => GoalKind::Concat,
            Goal::ConcatMany(_) => GoalKind::ConcatMany,
            Goal::FunctionCall(..) => GoalKind::FunctionCall,
            Goal::AttributeOf(..) => GoalKind::AttributeOf,
            Goal::ItemOf(..) => GoalKind::ItemOf,
            Goal::ClassAttributeOf(..) => GoalKind::ClassAttributeOf,
            Goal::ChainedAccess(..) => GoalKind::ChainedAccess,
            Goal::Listify(_) => GoalKind::Listify,
            Goal::BuiltinsTable => GoalKind::BuiltinsTable,
            Goal::ImportPrimitive => GoalKind::ImportPrimitive,
            Goal::EvalPrimitive => GoalKind::EvalPrimitive,
            Goal::Eval(_) => GoalKind::Eval,
            Goal::ConfigObject => GoalKind::ConfigObject,
            Goal::OsModule => GoalKind::OsModule,
            Goal::ProcessSpawn(_) => GoalKind::ProcessSpawn,
            Goal::ProcessSpawnAndRead(_) => GoalKind::ProcessSpawnAndRead,
        }
    }

    /// Precedence class fixed by the goal kind alone, independent of which
    /// rule realizes it.
    pub fn fixed_precedence(&self) -> Option<Precedence> {
        match self {
            Goal::Expression(precedence, _) => Some(*precedence),
            Goal::Enclose(_) | Goal::Wrap(_) => Some(Precedence::Atom),
            Goal::TemplateGlobal(_) | Goal::FrameworkGlobal(_) => Some(Precedence::Atom),
            _ => None,
        }
    }

    /// Composite goals whose binding strength depends on the realizing rule.
    pub fn has_variable_precedence(&self) -> bool {
        matches!(
            self,
            Goal::Sum(..)
                | Goal::Product(..)
                | Goal::Modulo(..)
                | Goal::AttributeOf(..)
                | Goal::ItemOf(..)
                | Goal::OsModule
                | Goal::FunctionCall(..)
        )
    }

    pub fn string(value: impl Into<String>) -> Goal {
        Goal::StringValue(value.into())
    }

    pub fn attribute(obj: Goal, name: impl Into<String>) -> Goal {
        Goal::AttributeOf(Box::new(obj), name.into())
    }

    pub fn item(obj: Goal, name: impl Into<String>) -> Goal {
        Goal::ItemOf(Box::new(obj), name.into())
    }

    pub fn class_attribute(obj: Goal, name: impl Into<String>) -> Goal {
        Goal::ClassAttributeOf(Box::new(obj), name.into())
    }

    pub fn call(callee: Goal, args: Vec<Goal>) -> Goal {
        Goal::FunctionCall(Box::new(callee), args)
    }

    pub fn sum(a: Goal, b: Goal) -> Goal {
        Goal::Sum(Box::new(a), Box::new(b))
    }

    pub fn product(a: Goal, b: Goal) -> Goal {
        Goal::Product(Box::new(a), Box::new(b))
    }

    pub fn modulo(a: Goal, b: Goal) -> Goal {
        Goal::Modulo(Box::new(a), Box::new(b))
    }

    pub fn concat(a: Goal, b: Goal) -> Goal {
        Goal::Concat(Box::new(a), Box::new(b))
    }

    pub fn chained(obj: Goal, steps: Vec<Access>) -> Goal {
        Goal::ChainedAccess(Box::new(obj), steps)
    }

    pub fn eval(code: Goal) -> Goal {
        Goal::Eval(Box::new(code))
    }

    pub fn cached(goal: Goal) -> Goal {
        Goal::CachedReference(Box::new(goal))
    }
}

pub fn lit(text: impl Into<String>) -> Goal {
    Goal::Literal(text.into())
}

pub fn expr(precedence: Precedence, parts: Vec<Goal>) -> Goal {
    Goal::Expression(precedence, parts)
}

/// A single literal realized at the given precedence class.
pub fn expr_lit(precedence: Precedence, text: impl Into<String>) -> Goal {
    Goal::Expression(precedence, vec![lit(text)])
}

pub fn under(precedence: Precedence, goal: Goal) -> Goal {
    Goal::EncloseUnder(precedence, Box::new(goal))
}

pub fn one_of(plans: Vec<Vec<Goal>>) -> Goal {
    Goal::Alternatives(plans)
}

/// Alternatives between single literals.
pub fn one_of_lits(texts: &[&str]) -> Goal {
    Goal::Alternatives(texts.iter().map(|text| vec![lit(*text)]).collect())
}

/// The plan a rule returns when it does not apply.
pub fn unsat() -> Vec<Goal> {
    vec![Goal::Unsatisfiable]
}

pub fn ws() -> Goal {
    Goal::WhitespaceSlot
}

pub fn int(value: i64) -> Goal {
    Goal::Integer(value)
}

pub fn attr_step(name: &str) -> Access {
    Access::Attribute(name.to_string())
}

pub fn item_step(name: &str) -> Access {
    Access::Item(name.to_string())
}

pub fn class_step(name: &str) -> Access {
    Access::ClassAttribute(name.to_string())
}

/// Interleave `separator` between `items`.
pub fn join_goals(separator: Goal, items: Vec<Goal>) -> Vec<Goal> {
    let mut out = Vec::with_capacity(items.len() * 2);
    for (index, item) in items.into_iter().enumerate() {
        if index > 0 {
            out.push(separator.clone());
        }
        out.push(item);
    }
    out
}

/// Split `template` into literal runs and the goals its placeholders name.
///
/// Placeholders are matched greedily left to right, in mapping order, so a
/// placeholder never matches inside an earlier replacement.
pub fn pattern(template: &str, mapping: &[(&str, Goal)]) -> Vec<Goal> {
    let mut out = Vec::new();
    let mut pending = String::new();
    let mut rest = template;
    'scan: while !rest.is_empty() {
        for (key, goal) in mapping {
            if let Some(after) = rest.strip_prefix(key) {
                if !pending.is_empty() {
                    out.push(lit(std::mem::take(&mut pending)));
                }
                out.push(goal.clone());
                rest = after;
                continue 'scan;
            }
        }
        let mut chars = rest.chars();
        if let Some(c) = chars.next() {
            pending.push(c);
        }
        rest = chars.as_str();
    }
    if !pending.is_empty() {
        out.push(lit(pending));
    }
    out
}

/// Escape text for a single-quoted string literal.
pub fn str_escape(value: &str, quote: char) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            c => out.push(c),
        }
    }
    out
}

/// Quote a string as a template literal with the given quote character.
pub fn quoted(value: &str, quote: char) -> String {
    format!("{quote}{}{quote}", str_escape(value, quote))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pattern_splits_placeholders_and_literals() {
        let parts = pattern(
            "(A,B)|join",
            &[("A", Goal::string("x")), ("B", Goal::string("y"))],
        );
        assert_eq!(
            parts,
            vec![
                lit("("),
                Goal::string("x"),
                lit(","),
                Goal::string("y"),
                lit(")|join"),
            ]
        );
    }

    #[test]
    fn pattern_without_placeholders_is_one_literal() {
        assert_eq!(pattern("abc", &[("Z", Goal::Zero)]), vec![lit("abc")]);
        assert!(pattern("", &[]).is_empty());
    }

    #[test]
    fn pattern_handles_multibyte_text() {
        let parts = pattern("é1é", &[("1", Goal::Zero)]);
        assert_eq!(parts, vec![lit("é"), Goal::Zero, lit("é")]);
    }

    #[test]
    fn join_goals_interleaves_separator() {
        let joined = join_goals(lit(","), vec![int(1), int(2), int(3)]);
        assert_eq!(
            joined,
            vec![int(1), lit(","), int(2), lit(","), int(3)]
        );
        assert!(join_goals(lit(","), Vec::new()).is_empty());
    }

    #[test]
    fn str_escape_escapes_quote_and_controls() {
        assert_eq!(quoted("it's", '\''), "'it\\'s'");
        assert_eq!(quoted("a\nb", '"'), "\"a\\nb\"");
        assert_eq!(quoted("c:\\", '\''), "'c:\\\\'");
    }

    #[test]
    fn equal_goals_hash_equal() {
        use std::collections::HashSet;
        let mut seen = HashSet::new();
        seen.insert(Goal::attribute(Goal::OsModule, "popen"));
        assert!(seen.contains(&Goal::attribute(Goal::OsModule, "popen")));
        assert!(!seen.contains(&Goal::item(Goal::OsModule, "popen")));
    }

    #[test]
    fn kind_matches_variant() {
        assert_eq!(Goal::string("a").kind(), GoalKind::StringValue);
        assert_eq!(
            Goal::ProcessSpawnAndRead("id".into()).kind(),
            GoalKind::ProcessSpawnAndRead
        );
    }
}
