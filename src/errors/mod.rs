//! Error types for the front end.
//!
//! Two families live here:
//!
//! - `Error`: user-facing parse errors carrying a source position. They abort
//!   the current file only and are turned into diagnostics by the engine.
//! - `StateError`: invariant violations inside the core (unbalanced token
//!   stack, missing scope, building after freeze). These are raised through
//!   `panic!` and never returned.
//! - `ConfigError`: rejected run configuration, returned before parsing starts.

pub mod errors;
