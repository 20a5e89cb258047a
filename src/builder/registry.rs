use rustc_hash::FxHashMap;

/// Identity registry keyed by lowercase local name, then lowercase namespace.
///
/// Several entities may share a key; they are kept in registration order.
#[derive(Debug, Clone)]
pub struct Registry<Id> {
    entries: FxHashMap<String, Vec<(String, Id)>>,
}

impl<Id> Default for Registry<Id> {
    fn default() -> Self {
        Registry {
            entries: FxHashMap::default(),
        }
    }
}

impl<Id: Copy + PartialEq> Registry<Id> {
    pub fn insert(&mut self, local_name: &str, namespace: &str, id: Id) {
        let entries = self.entries.entry(local_name.to_lowercase()).or_default();
        if !entries.iter().any(|(_, known)| *known == id) {
            entries.push((namespace.to_lowercase(), id));
        }
    }

    /// First entity registered under exactly this name and namespace.
    pub fn find_exact(&self, local_name: &str, namespace: &str) -> Option<Id> {
        let namespace = namespace.to_lowercase();
        self.entries
            .get(&local_name.to_lowercase())?
            .iter()
            .find(|(known, _)| *known == namespace)
            .map(|(_, id)| *id)
    }

    /// The entity registered under `local_name`, when there is exactly one.
    pub fn find_unique(&self, local_name: &str) -> Option<Id> {
        match self.entries.get(&local_name.to_lowercase())?.as_slice() {
            [(_, id)] => Some(*id),
            _ => None,
        }
    }

    /// Removes `id` wherever it is registered.
    pub fn remove(&mut self, id: Id) {
        for entries in self.entries.values_mut() {
            entries.retain(|(_, known)| *known != id);
        }
        self.entries.retain(|_, entries| !entries.is_empty());
    }

    pub fn contains_name(&self, local_name: &str) -> bool {
        self.entries.contains_key(&local_name.to_lowercase())
    }

    /// Copy of the registry holding only the entries `keep` accepts.
    pub fn filtered(&self, mut keep: impl FnMut(Id) -> bool) -> Registry<Id> {
        let mut copy = Registry::default();
        for (name, entries) in &self.entries {
            let kept: Vec<(String, Id)> = entries
                .iter()
                .filter(|(_, id)| keep(*id))
                .cloned()
                .collect();
            if !kept.is_empty() {
                copy.entries.insert(name.clone(), kept);
            }
        }
        copy
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
