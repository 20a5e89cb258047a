//! Canonical registry of declared entities.
//!
//! - `builder`: the `BuildContext` and its building/frozen state machine
//! - `registry`: name and namespace keyed identity tables
//! - `names`: qualified name splitting and the built-in type table
//! - `cache`: the side table holding token spans of nodes and callables

#![allow(clippy::module_inception)]

pub mod builder;
pub mod cache;
pub mod names;
pub mod registry;

#[cfg(test)]
mod tests;
