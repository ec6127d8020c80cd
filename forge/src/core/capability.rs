//! Facts about the target supplied by the caller, and the constants known to
//! be bound in the template context.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A non-oracle precondition a plan may carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    /// The target runtime has exactly this major version.
    RuntimeMajor(u8),
    /// The target runtime is major version 3 with at least this minor version.
    RuntimeMinorAtLeast(u8),
    /// The web framework globals (`g`, `config`, `request`, ...) are present.
    Framework,
}

/// Capability set produced by reconnaissance outside this crate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Capabilities {
    pub runtime_major: Option<u8>,
    pub runtime_minor: Option<u8>,
    pub framework: bool,
}

impl Capabilities {
    pub fn satisfies(&self, capability: Capability) -> bool {
        match capability {
            Capability::RuntimeMajor(major) => self.runtime_major == Some(major),
            Capability::RuntimeMinorAtLeast(minor) => {
                self.runtime_major == Some(3) && self.runtime_minor.is_some_and(|m| m >= minor)
            }
            Capability::Framework => self.framework,
        }
    }
}

/// A value a context variable is bound to.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Constant {
    Int(i64),
    Str(String),
}

impl Constant {
    pub fn str(value: impl Into<String>) -> Self {
        Constant::Str(value.into())
    }
}

impl fmt::Display for Constant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Constant::Int(value) => write!(f, "{value}"),
            Constant::Str(value) => write!(f, "{value:?}"),
        }
    }
}

/// Variable name to value, for every variable the accepted preamble binds.
pub type Constants = BTreeMap<String, Constant>;

/// Names bound to `value`, in name order.
pub fn names_bound_to<'a>(
    constants: &'a Constants,
    value: &'a Constant,
) -> impl Iterator<Item = &'a str> {
    constants
        .iter()
        .filter(move |(_, bound)| *bound == value)
        .map(|(name, _)| name.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_runtime_satisfies_no_version_guard() {
        let caps = Capabilities::default();
        assert!(!caps.satisfies(Capability::RuntimeMajor(3)));
        assert!(!caps.satisfies(Capability::RuntimeMinorAtLeast(6)));
        assert!(!caps.satisfies(Capability::Framework));
    }

    #[test]
    fn minor_version_guard_requires_major_three() {
        let caps = Capabilities {
            runtime_major: Some(3),
            runtime_minor: Some(8),
            framework: true,
        };
        assert!(caps.satisfies(Capability::RuntimeMinorAtLeast(6)));
        assert!(!caps.satisfies(Capability::RuntimeMinorAtLeast(9)));
        assert!(caps.satisfies(Capability::Framework));
    }

    #[test]
    fn names_bound_to_filters_by_value() {
        let mut constants = Constants::new();
        constants.insert("e".into(), Constant::Int(3));
        constants.insert("la".into(), Constant::Int(1));
        constants.insert("un".into(), Constant::str("_"));
        let names: Vec<&str> = names_bound_to(&constants, &Constant::Int(3)).collect();
        assert_eq!(names, vec!["e"]);
    }
}
