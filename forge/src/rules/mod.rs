//! Rewrite rules, one module per goal family.
//!
//! Every rule is a plain `fn(&Constants, &Goal) -> Vec<Goal>`: it inspects the
//! goal's arguments and the known context constants and describes one way to
//! express the goal. Rules never consult the oracle. A rule that does not
//! apply returns [`unsat`](crate::core::goal::unsat).

use std::sync::LazyLock;

use regex::Regex;

use crate::core::goal::{Goal, one_of_lits, quoted};
use crate::core::registry::RuleRegistry;

mod access;
mod capability;
mod character;
mod integer;
mod list_ops;
mod process;
mod string;
mod string_piece;
mod syntax;

/// Register every rule module, in default priority order per kind.
pub fn register_all(registry: &mut RuleRegistry) {
    syntax::register(registry);
    integer::register(registry);
    string::register(registry);
    string_piece::register(registry);
    character::register(registry);
    access::register(registry);
    list_ops::register(registry);
    capability::register(registry);
    process::register(registry);
}

static IDENTIFIER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("identifier regex")
});

/// Whether `name` lexes as a single template name token.
pub(crate) fn is_identifier(name: &str) -> bool {
    IDENTIFIER.is_match(name)
}

/// The value as a single- or double-quoted literal.
pub(crate) fn quoted_either(value: &str) -> Goal {
    let (single, double) = (quoted(value, '\''), quoted(value, '"'));
    one_of_lits(&[single.as_str(), double.as_str()])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identifiers() {
        assert!(is_identifier("__globals__"));
        assert!(is_identifier("a1"));
        assert!(!is_identifier("1a"));
        assert!(!is_identifier("a-b"));
        assert!(!is_identifier(""));
    }
}
