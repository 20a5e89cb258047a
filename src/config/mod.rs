#![allow(clippy::module_inception)]

pub mod config;

#[cfg(test)]
mod tests;
