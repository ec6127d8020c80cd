//! Full-payload assembly: wrapper selection, the context preamble and the
//! synthesized inner expression.
//!
//! A [`PayloadForge`] is one session against one oracle. `prepare` probes the
//! wrapper patterns and the context catalogue once; every `generate` call
//! after that resolves a goal and emits
//! `<preamble for the variables it used><wrapper around the expression>`.

use std::collections::BTreeSet;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::core::capability::Constant;
use crate::core::context_vars::{ContextEntry, ContextVarManager, catalogue};
use crate::core::derivation::{Node, Subexpressions};
use crate::core::goal::Goal;
use crate::core::precedence::Precedence;
use crate::core::registry::{RulePriorityTable, RuleRegistry};
use crate::core::synth::{SynthOptions, Synthesizer};
use crate::core::wrapper::{Wrapper, select_wrapper};
use crate::error::{ForgeError, Result};
use crate::oracle::Oracle;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ForgeOptions {
    pub synthesis: SynthOptions,
    /// Learn rule priorities in the process-wide table instead of a
    /// session-private one.
    pub share_priorities: bool,
}

/// A generated payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Generated {
    pub payload: String,
    /// Whether rendering the payload shows the evaluated value.
    pub visible: bool,
}

/// A generated payload with the resolution behind it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DetailedPayload {
    pub payload: String,
    /// The expression inside the wrapper, without preamble.
    pub inner: String,
    pub visible: bool,
    /// Context variables the expression references.
    pub used: BTreeSet<String>,
    pub tree: Node,
}

impl DetailedPayload {
    pub fn subexpressions(&self) -> Subexpressions<'_> {
        Subexpressions::new(std::slice::from_ref(&self.tree))
    }
}

pub struct PayloadForge<O> {
    synth: Synthesizer<O>,
    context: ContextVarManager,
    wrapper: Option<Wrapper>,
}

impl<O: Oracle> PayloadForge<O> {
    pub fn new(oracle: O, options: ForgeOptions) -> Self {
        let priorities = if options.share_priorities {
            RulePriorityTable::global()
        } else {
            Arc::new(RulePriorityTable::new())
        };
        Self::with_parts(oracle, RuleRegistry::shared(), priorities, options.synthesis)
    }

    pub fn with_parts(
        oracle: O,
        registry: Arc<RuleRegistry>,
        priorities: Arc<RulePriorityTable>,
        options: SynthOptions,
    ) -> Self {
        Self {
            synth: Synthesizer::with_parts(oracle, registry, priorities, options),
            context: ContextVarManager::default(),
            wrapper: None,
        }
    }

    /// Select the wrapper and filter the context catalogue.
    ///
    /// Idempotent: later calls return the wrapper chosen by the first.
    pub fn prepare(&mut self) -> Result<Wrapper> {
        if let Some(wrapper) = self.wrapper {
            return Ok(wrapper);
        }
        let synth = &mut self.synth;
        let wrapper =
            select_wrapper(|probe| synth.check(probe)).ok_or(ForgeError::NoViableWrapper)?;
        if !wrapper.visible {
            warn!(pattern = wrapper.pattern, "selected wrapper hides the evaluated value");
        }
        let context = ContextVarManager::filter_accepted(catalogue(), |snippet| synth.check(snippet));
        info!(
            pattern = wrapper.pattern,
            context_entries = context.accepted().len(),
            "session prepared"
        );
        self.synth.set_constants(context.constants());
        self.context = context;
        self.wrapper = Some(wrapper);
        Ok(wrapper)
    }

    pub fn wrapper(&self) -> Option<Wrapper> {
        self.wrapper
    }

    pub fn context(&self) -> &ContextVarManager {
        &self.context
    }

    pub fn synthesizer(&self) -> &Synthesizer<O> {
        &self.synth
    }

    /// Payload for `goal`, preparing the session first if needed.
    ///
    /// `Ok(None)` means the goal cannot be expressed under this oracle.
    pub fn generate(&mut self, goal: &Goal) -> Result<Option<Generated>> {
        Ok(self.generate_detailed(goal)?.map(|detailed| Generated {
            payload: detailed.payload,
            visible: detailed.visible,
        }))
    }

    pub fn generate_detailed(&mut self, goal: &Goal) -> Result<Option<DetailedPayload>> {
        let wrapper = self.prepare()?;
        let Some(resolution) = self.synth.resolve(goal) else {
            warn!(kind = %goal.kind(), "goal could not be resolved");
            return Ok(None);
        };
        let preamble = self.context.preamble_for(&resolution.used);
        let payload = format!("{preamble}{}", wrapper.embed(&resolution.text));
        if !self.synth.check(&payload) {
            warn!(kind = %goal.kind(), "assembled payload rejected");
            return Ok(None);
        }
        info!(
            kind = %goal.kind(),
            length = payload.len(),
            variables = resolution.used.len(),
            "payload generated"
        );
        Ok(Some(DetailedPayload {
            payload,
            inner: resolution.text,
            visible: wrapper.visible,
            used: resolution.used,
            tree: resolution.tree,
        }))
    }

    /// Register a snippet that binds constants, discovered outside the
    /// catalogue. With `verify`, a snippet the oracle rejects is dropped and
    /// `false` is returned.
    pub fn add_context_variable<'a>(
        &mut self,
        snippet: impl Into<String>,
        bindings: impl IntoIterator<Item = (&'a str, Constant)>,
        verify: bool,
    ) -> Result<bool> {
        if self.wrapper.is_none() {
            return Err(ForgeError::NotPrepared);
        }
        let entry = ContextEntry::new(snippet, bindings);
        if verify && !self.synth.check(&entry.snippet) {
            debug!(snippet = %entry.snippet, "context snippet rejected");
            return Ok(false);
        }
        self.context.add(entry);
        self.synth.set_constants(self.context.constants());
        Ok(true)
    }

    /// Known-good text for `goal`, used wherever a rule asks for a cached
    /// reference to it.
    pub fn add_pinned_expression(
        &mut self,
        goal: Goal,
        text: impl Into<String>,
        precedence: Precedence,
    ) {
        self.synth.pin_expression(goal, text, precedence);
        self.synth.clear_cache();
    }

    pub fn clear_cache(&mut self) {
        self.synth.clear_cache();
    }
}
