//! I/O helpers for the `forge` binary.

pub mod config;
