use ruc::*;
use std::collections::BTreeMap;

/// Iteration direction over a key range.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum IterOrder {
    Asc,
    Desc,
}

/// Committed storage backend.
///
/// Implementations must iterate keys in lexicographic byte order,
/// the only order that is stable across replicas.
pub trait MerkleDB {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>>;

    fn exists(&self, key: &[u8]) -> Result<bool> {
        self.get(key).map(|v| v.is_some())
    }

    /// Apply a batch of writes; `None` deletes the key.
    fn commit(&mut self, kvs: Vec<(Vec<u8>, Option<Vec<u8>>)>) -> Result<()>;

    /// Visit every `(key, value)` with `lower <= key < upper`.
    /// The callback returns `true` to stop early.
    fn iterate(
        &self,
        lower: &[u8],
        upper: &[u8],
        order: IterOrder,
        func: &mut dyn FnMut((Vec<u8>, Vec<u8>)) -> bool,
    );
}

/// In-memory ordered-map database.
#[derive(Clone, Debug, Default)]
pub struct MemDB {
    data: BTreeMap<Vec<u8>, Vec<u8>>,
}

impl MemDB {
    pub fn new() -> Self {
        MemDB {
            data: BTreeMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl MerkleDB for MemDB {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        Ok(self.data.get(key).cloned())
    }

    fn commit(&mut self, kvs: Vec<(Vec<u8>, Option<Vec<u8>>)>) -> Result<()> {
        for (k, v) in kvs.into_iter() {
            match v {
                Some(v) => {
                    self.data.insert(k, v);
                }
                None => {
                    self.data.remove(&k);
                }
            }
        }
        Ok(())
    }

    fn iterate(
        &self,
        lower: &[u8],
        upper: &[u8],
        order: IterOrder,
        func: &mut dyn FnMut((Vec<u8>, Vec<u8>)) -> bool,
    ) {
        let range = self
            .data
            .range(lower.to_vec()..upper.to_vec())
            .map(|(k, v)| (k.clone(), v.clone()));
        match order {
            IterOrder::Asc => {
                for kv in range {
                    if func(kv) {
                        break;
                    }
                }
            }
            IterOrder::Desc => {
                for kv in range.rev() {
                    if func(kv) {
                        break;
                    }
                }
            }
        }
    }
}
