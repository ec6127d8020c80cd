//! Operator binding strength of the template expression grammar.
//!
//! Variants are declared loosest first, so the derived `Ord` matches binding
//! strength: `a < b` means `a` binds more loosely than `b`.

use serde::Serialize;

/// Grammar-level operator class a realized expression resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Precedence {
    /// `a if c else b`
    Conditional,
    /// `a or b`
    Or,
    /// `a and b`
    And,
    /// `not a`
    Not,
    /// `a == b`, `a in b`, ...
    Comparison,
    /// `a ~ b`
    Tilde,
    /// `a + b`
    Plus,
    /// `a - b`
    Subtract,
    /// `a * b`
    Multiply,
    /// `a / b`, `a // b`
    Divide,
    /// `a % b`
    Modulo,
    /// `-a`, `+a`
    Unary,
    /// `a ** b`
    Power,
    /// `a|f`
    PlainFilter,
    /// `f(a)`, `a|f(b)`
    FunctionCall,
    /// `a.b`, `a[b]`
    Access,
    /// literals, names and parenthesized groups
    Atom,
}

impl Precedence {
    /// Rank in the binding table; higher binds tighter.
    pub fn rank(self) -> u8 {
        match self {
            Precedence::Conditional => 0,
            Precedence::Or => 1,
            Precedence::And => 2,
            Precedence::Not => 3,
            Precedence::Comparison => 4,
            Precedence::Tilde => 5,
            Precedence::Plus | Precedence::Subtract => 6,
            Precedence::Multiply | Precedence::Divide | Precedence::Modulo => 7,
            Precedence::Unary => 8,
            Precedence::Power => 9,
            Precedence::PlainFilter => 10,
            Precedence::FunctionCall => 11,
            Precedence::Access => 12,
            Precedence::Atom => 13,
        }
    }

    /// Multiplicative operators are not associative in the grammar.
    pub fn is_multiplicative(self) -> bool {
        self.rank() == Precedence::Multiply.rank()
    }

    /// Whether an operand realized at `self` must be parenthesized before it
    /// is placed under an operator of class `outer`.
    ///
    /// Operands of equal rank pass through, except under a multiplicative
    /// operator: `a%(b*c)` and `a%b*c` evaluate differently.
    pub fn needs_enclosing_under(self, outer: Precedence) -> bool {
        if outer.is_multiplicative() {
            self.rank() <= outer.rank()
        } else {
            self.rank() < outer.rank()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn looser_operand_needs_parentheses() {
        assert!(Precedence::Plus.needs_enclosing_under(Precedence::Multiply));
        assert!(Precedence::PlainFilter.needs_enclosing_under(Precedence::Access));
        assert!(!Precedence::Access.needs_enclosing_under(Precedence::Plus));
        assert!(!Precedence::Atom.needs_enclosing_under(Precedence::Access));
    }

    #[test]
    fn equal_rank_passes_through_except_multiplicative() {
        assert!(!Precedence::Subtract.needs_enclosing_under(Precedence::Plus));
        assert!(!Precedence::Access.needs_enclosing_under(Precedence::Access));
        assert!(Precedence::Multiply.needs_enclosing_under(Precedence::Modulo));
        assert!(Precedence::Modulo.needs_enclosing_under(Precedence::Modulo));
    }

    #[test]
    fn ordering_follows_rank() {
        assert!(Precedence::Or < Precedence::Plus);
        assert!(Precedence::FunctionCall < Precedence::Access);
        assert_eq!(Precedence::Plus.rank(), Precedence::Subtract.rank());
    }
}
