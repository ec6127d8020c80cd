//! Session errors surfaced by [`PayloadForge`](crate::assembler::PayloadForge).
//!
//! Goals that cannot be expressed are not errors; they resolve to `None`.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ForgeError {
    /// The oracle rejected every top-level embedding pattern.
    #[error("no wrapper pattern is accepted by the oracle")]
    NoViableWrapper,

    #[error("session is not prepared; call prepare() first")]
    NotPrepared,
}

pub type Result<T> = std::result::Result<T, ForgeError>;
