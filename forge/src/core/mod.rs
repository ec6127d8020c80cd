//! Pure synthesis logic: no I/O, deterministic for a given oracle.

pub mod capability;
pub mod context_vars;
pub mod derivation;
pub mod goal;
pub mod precedence;
pub mod registry;
pub mod synth;
pub mod wrapper;
