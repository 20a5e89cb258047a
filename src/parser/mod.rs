//! Parser module for building the declaration model and callable bodies.
//!
//! This module contains the parser that transforms a stream of tokens into
//! types, callables and body nodes registered in a `BuildContext`. It uses a
//! Pratt parser for expressions with operator precedence and handles:
//!
//! - Declarations (namespaces, use aliases, classes, interfaces, traits, functions)
//! - Statement parsing (control flow, blocks, echo, globals)
//! - Expression parsing (binary ops, calls, allocations, member access)
//! - Name resolution and dependency recording
//!
//! The parser uses NUD (null denotation) and LED (left denotation) functions
//! for expression parsing with binding power for precedence handling.

pub mod decl;
pub mod expr;
pub mod lookups;
pub mod parser;
pub mod stmt;
pub mod symbol_table;
pub mod token_stack;

#[cfg(test)]
mod tests;
