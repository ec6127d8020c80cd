//! Stable exit codes for the `forge` binary.

/// A payload was generated.
pub const OK: i32 = 0;
/// Invalid arguments or configuration.
pub const INVALID: i32 = 1;
/// No payload for the requested target survives the oracle.
pub const GENERATION_FAILED: i32 = 2;
/// The oracle rejected every wrapper pattern.
pub const NO_WRAPPER: i32 = 3;
