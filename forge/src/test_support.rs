//! Test-only oracles.

use std::cell::Cell;

use crate::oracle::{Blacklist, Oracle};

/// Accepts everything.
pub fn permissive() -> impl Fn(&str) -> bool {
    |_: &str| true
}

/// Rejects any text containing one of `words`.
pub fn rejecting(words: &[&str]) -> Blacklist {
    Blacklist::new(words.iter().copied())
}

/// Rejects text containing any of `chars`.
pub fn rejecting_chars(chars: &'static str) -> impl Fn(&str) -> bool {
    move |text: &str| !text.chars().any(|c| chars.contains(c))
}

/// Wraps an oracle and counts how often it is asked.
#[derive(Debug, Default)]
pub struct CountingOracle<O> {
    inner: O,
    calls: Cell<u64>,
}

impl<O: Oracle> CountingOracle<O> {
    pub fn new(inner: O) -> Self {
        Self {
            inner,
            calls: Cell::new(0),
        }
    }

    pub fn calls(&self) -> u64 {
        self.calls.get()
    }
}

impl<O: Oracle> Oracle for CountingOracle<O> {
    fn accepts(&self, text: &str) -> bool {
        self.calls.set(self.calls.get() + 1);
        self.inner.accepts(text)
    }
}
