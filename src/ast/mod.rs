//! Syntax tree and declaration model.
//!
//! - `ast`: the node arena, node kinds and tree search helpers
//! - `declarations`: namespaces, types, callables and their members

pub mod ast;
pub mod declarations;
