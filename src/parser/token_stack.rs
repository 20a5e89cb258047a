use crate::{errors::errors::StateError, lexer::tokens::Token};

/// Stack of token collection frames.
///
/// Every node under construction opens a frame with `push()`. Tokens recorded
/// with `add()` land in the innermost frame, and `pop()` hands back exactly the
/// tokens recorded since the matching `push()`. A popped frame is not merged
/// into its parent; callers that need a contiguous span fold it back in with
/// `fold()`.
#[derive(Debug, Default)]
pub struct TokenStack {
    frames: Vec<Vec<Token>>,
}

impl TokenStack {
    pub fn new() -> Self {
        TokenStack { frames: Vec::new() }
    }

    pub fn push(&mut self) {
        self.frames.push(Vec::new());
    }

    /// Records `token` in the innermost frame and returns it unchanged.
    /// Without an open frame the token is not recorded.
    pub fn add(&mut self, token: Token) -> Token {
        if let Some(frame) = self.frames.last_mut() {
            frame.push(token.clone());
        }
        token
    }

    pub fn pop(&mut self) -> Vec<Token> {
        match self.frames.pop() {
            Some(tokens) => tokens,
            None => panic!("{}", StateError::EmptyTokenStack),
        }
    }

    /// Appends already collected tokens to the innermost frame.
    pub fn fold(&mut self, tokens: &[Token]) {
        if let Some(frame) = self.frames.last_mut() {
            frame.extend_from_slice(tokens);
        }
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}
