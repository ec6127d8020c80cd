//! The acceptance oracle: an opaque predicate over candidate payload text.
//!
//! The synthesizer never asks why text was rejected. Any `Fn(&str) -> bool`
//! is an oracle; [`Blacklist`] covers the common keyword-filter case.

use serde::{Deserialize, Serialize};

pub trait Oracle {
    /// Whether `text` survives the filter.
    fn accepts(&self, text: &str) -> bool;
}

impl<F> Oracle for F
where
    F: Fn(&str) -> bool,
{
    fn accepts(&self, text: &str) -> bool {
        self(text)
    }
}

/// Rejects any text containing one of its keywords.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Blacklist {
    words: Vec<String>,
}

impl Blacklist {
    pub fn new<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            words: words.into_iter().map(Into::into).collect(),
        }
    }

    pub fn words(&self) -> &[String] {
        &self.words
    }

    /// First keyword found in `text`.
    pub fn first_hit(&self, text: &str) -> Option<&str> {
        self.words
            .iter()
            .find(|word| text.contains(word.as_str()))
            .map(String::as_str)
    }
}

impl<S: Into<String>> Extend<S> for Blacklist {
    fn extend<I: IntoIterator<Item = S>>(&mut self, words: I) {
        self.words.extend(words.into_iter().map(Into::into));
    }
}

impl Oracle for Blacklist {
    fn accepts(&self, text: &str) -> bool {
        self.first_hit(text).is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closures_are_oracles() {
        let no_dots = |text: &str| !text.contains('.');
        assert!(no_dots.accepts("a|b"));
        assert!(!no_dots.accepts("a.b"));
    }

    #[test]
    fn blacklist_reports_first_hit() {
        let oracle = Blacklist::new(["__", "'"]);
        assert!(oracle.accepts("lipsum|string"));
        assert!(!oracle.accepts("x.__class__"));
        assert_eq!(oracle.first_hit("'__'"), Some("__"));
    }

    #[test]
    fn extended_blacklist_keeps_order() {
        let mut oracle = Blacklist::new(["__"]);
        oracle.extend(["."]);
        assert_eq!(oracle.words(), ["__".to_string(), ".".to_string()]);
        assert_eq!(oracle.first_hit("a.__b"), Some("__"));
    }

    #[test]
    fn boxed_closure_is_an_oracle() {
        let blacklist = Blacklist::new(["{{"]);
        let oracle: Box<dyn Fn(&str) -> bool> =
            Box::new(move |text: &str| blacklist.accepts(text));
        assert!(!oracle.accepts("{{7}}"));
        assert!(oracle.accepts("{%print(7)%}"));
    }
}
