//! Template-injection payload synthesis against an opaque input filter.
//!
//! A caller states what a payload must do as a [`Goal`](core::goal::Goal)
//! (a string value, an integer, the `os` module, the output of a shell
//! command) and supplies an [`Oracle`](oracle::Oracle) that says whether a
//! piece of text survives the target's filter. The crate searches the space
//! of equivalent template expressions for one built only from accepted text.
//!
//! - **[`core`]**: Pure, deterministic synthesis: the goal model, operator
//!   precedence, the memoizing synthesizer, the context-variable catalogue
//!   and the wrapper patterns. No I/O.
//! - **[`rules`]**: The rewrite rules, one module per goal family, registered
//!   into a closed kind-keyed registry.
//! - **[`assembler`]**: [`PayloadForge`](assembler::PayloadForge), the session
//!   API that turns a resolved goal into a complete payload.
//! - **[`io`]**: Configuration loading for the binary.

pub mod assembler;
pub mod core;
pub mod error;
pub mod exit_codes;
pub mod io;
pub mod logging;
pub mod oracle;
pub mod rules;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
