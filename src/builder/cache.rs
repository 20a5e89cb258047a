use rustc_hash::FxHashMap;

use crate::lexer::tokens::Token;

/// Identity of a cached token span: the owner's kind name plus its arena id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub kind: &'static str,
    pub id: u32,
}

impl CacheKey {
    pub fn new(kind: &'static str, id: u32) -> Self {
        CacheKey { kind, id }
    }
}

/// Storage for token spans kept outside of the AST itself.
///
/// The only contract is that what goes in under a key comes back out.
pub trait CacheDriver {
    fn store(&mut self, key: CacheKey, tokens: Vec<Token>);
    fn restore(&self, key: &CacheKey) -> Option<Vec<Token>>;
    fn remove(&mut self, key: &CacheKey);
}

#[derive(Debug, Default)]
pub struct MemoryCacheDriver {
    entries: FxHashMap<CacheKey, Vec<Token>>,
}

impl MemoryCacheDriver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl CacheDriver for MemoryCacheDriver {
    fn store(&mut self, key: CacheKey, tokens: Vec<Token>) {
        self.entries.insert(key, tokens);
    }

    fn restore(&self, key: &CacheKey) -> Option<Vec<Token>> {
        self.entries.get(key).cloned()
    }

    fn remove(&mut self, key: &CacheKey) {
        self.entries.remove(key);
    }
}
