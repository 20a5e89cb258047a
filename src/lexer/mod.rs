//! Lexical analysis for the PHP-family source language.
//!
//! - `lexer`: regex-table tokenizer producing a token vector
//! - `tokens`: token kinds, the keyword table and the `Token` type
//! - `stream`: the `Tokenizer` pull interface the parser consumes

pub mod lexer;
pub mod stream;
pub mod tokens;
