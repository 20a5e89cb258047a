use std::rc::Rc;

use crate::{errors::errors::Error, Position, Span, MK_TOKEN};

use super::{
    lexer::tokenize,
    tokens::{Token, TokenKind},
};

/// Pull-style token source consumed by the parser.
///
/// Tokens come out strictly in source order. Once the stream is exhausted
/// `next()` keeps returning the EOF sentinel.
pub trait Tokenizer {
    /// Consumes and returns the next token.
    fn next(&mut self) -> Token;
    /// Kind of the next token, without consuming it.
    fn peek(&self) -> TokenKind;
    /// Kind of the token `n` positions ahead; `peek_nth(0) == peek()`.
    fn peek_nth(&self, n: usize) -> TokenKind;
    /// Kind of the last consumed token, `None` before the first `next()`.
    fn prev(&self) -> Option<TokenKind>;
    fn source_file(&self) -> Rc<String>;
}

/// A tokenizer over an already lexed token vector.
pub struct TokenStream {
    tokens: Vec<Token>,
    pos: usize,
    file: Rc<String>,
}

impl TokenStream {
    pub fn new(mut tokens: Vec<Token>, file: Rc<String>) -> Self {
        if tokens.last().map(|token| token.kind) != Some(TokenKind::EOF) {
            let position = tokens
                .last()
                .map(|token| token.span.end.clone())
                .unwrap_or_else(|| Position::new(1, 1, Rc::clone(&file)));
            tokens.push(MK_TOKEN!(
                TokenKind::EOF,
                String::from("EOF"),
                Span {
                    start: position.clone(),
                    end: position
                }
            ));
        }

        TokenStream {
            tokens,
            pos: 0,
            file,
        }
    }

    /// Lexes `source` and wraps the result.
    pub fn from_source(source: &str, file: &str) -> Result<Self, Error> {
        let tokens = tokenize(source.to_string(), Some(file.to_string()))?;
        Ok(TokenStream::new(tokens, Rc::new(file.to_string())))
    }

    fn last_index(&self) -> usize {
        self.tokens.len() - 1
    }
}

impl Tokenizer for TokenStream {
    fn next(&mut self) -> Token {
        let token = self.tokens[self.pos.min(self.last_index())].clone();
        if self.pos <= self.last_index() {
            self.pos += 1;
        }
        token
    }

    fn peek(&self) -> TokenKind {
        self.peek_nth(0)
    }

    fn peek_nth(&self, n: usize) -> TokenKind {
        self.tokens[(self.pos + n).min(self.last_index())].kind
    }

    fn prev(&self) -> Option<TokenKind> {
        if self.pos == 0 {
            None
        } else {
            Some(self.tokens[self.pos - 1].kind)
        }
    }

    fn source_file(&self) -> Rc<String> {
        Rc::clone(&self.file)
    }
}
