// Record store and key index
//
// Records of one category live in an arena; ids are arena positions. The key
// index maps a callsign or prefix to the ids recorded for it, in the order the
// builder saw them. Both halves are private to `Category` so they can only be
// grown together.

use std::collections::HashMap;

/// Arena of records, addressed by insertion position
#[derive(Debug, Clone)]
pub struct RecordStore<T> {
    records: Vec<T>,
}

impl<T> RecordStore<T> {
    pub fn new() -> Self {
        Self { records: Vec::new() }
    }

    fn push(&mut self, record: T) -> usize {
        self.records.push(record);
        self.records.len() - 1
    }

    /// Get a record by id
    ///
    /// # Panics
    /// Ids only come from the key index built alongside this store, so an
    /// unknown id means the pair was corrupted and is treated as a bug.
    pub fn get(&self, id: usize) -> &T {
        &self.records[id]
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl<T> Default for RecordStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Key → ordered record ids. Keys are expected to be normalized by the caller.
#[derive(Debug, Clone, Default)]
pub struct KeyIndex {
    map: HashMap<String, Vec<usize>>,
}

impl KeyIndex {
    pub fn new() -> Self {
        Self { map: HashMap::new() }
    }

    /// Add `id` to the end of `key`'s sequence
    pub fn append(&mut self, key: String, id: usize) {
        self.map.entry(key).or_default().push(id);
    }

    /// Ids recorded for `key`, empty when the key was never seen
    pub fn get(&self, key: &str) -> &[usize] {
        self.map.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn contains(&self, key: &str) -> bool {
        self.map.contains_key(key)
    }

    /// Number of distinct keys
    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

/// One record category: store and index built as a pair
#[derive(Debug, Clone)]
pub struct Category<T> {
    store: RecordStore<T>,
    index: KeyIndex,
}

impl<T> Category<T> {
    pub fn new() -> Self {
        Self {
            store: RecordStore::new(),
            index: KeyIndex::new(),
        }
    }

    /// Append a record under `key` and return its id
    pub fn insert(&mut self, key: String, record: T) -> usize {
        let id = self.store.push(record);
        self.index.append(key, id);
        id
    }

    /// Records filed under `key`, in build order
    pub fn candidates<'a>(&'a self, key: &str) -> impl Iterator<Item = &'a T> + 'a {
        self.index
            .get(key)
            .iter()
            .map(move |&id| self.store.get(id))
    }

    pub fn store(&self) -> &RecordStore<T> {
        &self.store
    }

    pub fn index(&self) -> &KeyIndex {
        &self.index
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }
}

impl<T> Default for Category<T> {
    fn default() -> Self {
        Self::new()
    }
}
