use rustc_hash::FxHashMap;

use crate::errors::errors::StateError;

/// Case-insensitive alias table with one frame per namespace block.
///
/// Lookups only see the innermost frame; aliases are never inherited from an
/// enclosing block.
#[derive(Debug)]
pub struct SymbolTable<V = String> {
    scopes: Vec<FxHashMap<String, V>>,
}

impl<V> Default for SymbolTable<V> {
    fn default() -> Self {
        SymbolTable { scopes: Vec::new() }
    }
}

impl<V> SymbolTable<V> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create_scope(&mut self) {
        self.scopes.push(FxHashMap::default());
    }

    pub fn destroy_scope(&mut self) {
        if self.scopes.pop().is_none() {
            panic!("{}", StateError::NoActiveScope);
        }
    }

    pub fn reset_scope(&mut self) {
        self.current_mut().clear();
    }

    pub fn add(&mut self, name: &str, value: V) {
        self.current_mut().insert(name.to_lowercase(), value);
    }

    pub fn lookup(&self, name: &str) -> Option<&V> {
        match self.scopes.last() {
            Some(scope) => scope.get(&name.to_lowercase()),
            None => panic!("{}", StateError::NoActiveScope),
        }
    }

    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    fn current_mut(&mut self) -> &mut FxHashMap<String, V> {
        match self.scopes.last_mut() {
            Some(scope) => scope,
            None => panic!("{}", StateError::NoActiveScope),
        }
    }
}
