//! File-processing boundary: collects source files, parses each into one
//! shared `BuildContext` and reports per-file failures without aborting.

#![allow(clippy::module_inception)]

pub mod engine;

#[cfg(test)]
mod tests;
