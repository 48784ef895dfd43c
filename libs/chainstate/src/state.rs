use crate::db::{IterOrder, MerkleDB};
use ruc::*;
use std::collections::BTreeMap;
use parking_lot::RwLock;
use std::sync::Arc;

/// Ordered merge buffer used when combining committed data with
/// uncommitted cache entries during iteration.
pub type KVecMap = BTreeMap<Vec<u8>, Vec<u8>>;

/// The committed chain state: a database plus the height it was
/// committed at.
pub struct ChainState<T: MerkleDB> {
    name: String,
    db: T,
    height: u64,
}

impl<T: MerkleDB> ChainState<T> {
    pub fn new(db: T, name: String) -> Self {
        ChainState {
            name,
            db,
            height: 0,
        }
    }

    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    pub fn height(&self) -> u64 {
        self.height
    }

    pub fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        self.db.get(key).c(d!())
    }

    pub fn exists(&self, key: &[u8]) -> Result<bool> {
        self.db.exists(key).c(d!())
    }

    pub fn iterate(
        &self,
        lower: &[u8],
        upper: &[u8],
        order: IterOrder,
        func: &mut dyn FnMut((Vec<u8>, Vec<u8>)) -> bool,
    ) {
        self.db.iterate(lower, upper, order, func)
    }

    pub fn commit(
        &mut self,
        kvs: Vec<(Vec<u8>, Option<Vec<u8>>)>,
        height: u64,
    ) -> Result<u64> {
        self.db.commit(kvs).c(d!())?;
        self.height = height;
        Ok(self.height)
    }
}

/// A working overlay over `ChainState`.
///
/// Writes land in an open session buffer first. `commit_session` moves
/// them into the block delta and `discard_session` drops them, which is
/// the transactional rollback the execution layer relies on. `commit`
/// flushes the delta into the underlying database at a new height.
pub struct State<T: MerkleDB> {
    chain: Arc<RwLock<ChainState<T>>>,
    // session-committed writes, pending a block commit
    delta: BTreeMap<Vec<u8>, Option<Vec<u8>>>,
    // open-session writes, pending commit_session/discard_session
    session: BTreeMap<Vec<u8>, Option<Vec<u8>>>,
}

impl<T: MerkleDB> State<T> {
    pub fn new(chain: Arc<RwLock<ChainState<T>>>) -> Self {
        State {
            chain,
            delta: BTreeMap::new(),
            session: BTreeMap::new(),
        }
    }

    pub fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        if let Some(v) = self.session.get(key) {
            return Ok(v.clone());
        }
        if let Some(v) = self.delta.get(key) {
            return Ok(v.clone());
        }
        self.chain.read().get(key).c(d!())
    }

    pub fn exists(&self, key: &[u8]) -> Result<bool> {
        self.get(key).map(|v| v.is_some())
    }

    pub fn set(&mut self, key: &[u8], value: Vec<u8>) {
        self.session.insert(key.to_vec(), Some(value));
    }

    pub fn delete(&mut self, key: &[u8]) -> Result<()> {
        self.session.insert(key.to_vec(), None);
        Ok(())
    }

    /// Visit committed `(key, value)` pairs within `[lower, upper)`.
    /// Uncommitted entries are merged separately via `iterate_cache`.
    pub fn iterate(
        &self,
        lower: &[u8],
        upper: &[u8],
        order: IterOrder,
        func: &mut dyn FnMut((Vec<u8>, Vec<u8>)) -> bool,
    ) {
        self.chain.read().iterate(lower, upper, order, func)
    }

    /// Merge uncommitted entries under `prefix` into `kv_map`,
    /// applying pending deletions.
    pub fn iterate_cache(&self, prefix: &[u8], kv_map: &mut KVecMap) {
        for (k, v) in self.delta.iter().chain(self.session.iter()) {
            if !k.starts_with(prefix) {
                continue;
            }
            match v {
                Some(v) => {
                    kv_map.insert(k.clone(), v.clone());
                }
                None => {
                    kv_map.remove(k);
                }
            }
        }
    }

    /// Make the open session part of the block delta.
    pub fn commit_session(&mut self) {
        let session = std::mem::take(&mut self.session);
        self.delta.extend(session);
    }

    /// Drop the open session without a trace.
    pub fn discard_session(&mut self) {
        self.session.clear();
    }

    /// Flush everything into the database at `height`.
    pub fn commit(&mut self, height: u64) -> Result<u64> {
        self.commit_session();
        let delta = std::mem::take(&mut self.delta);
        self.chain
            .write()
            .commit(delta.into_iter().collect(), height)
            .c(d!())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemDB;

    fn new_state() -> State<MemDB> {
        let cs = Arc::new(RwLock::new(ChainState::new(
            MemDB::new(),
            "test".to_string(),
        )));
        State::new(cs)
    }

    #[test]
    fn session_discard_leaves_no_trace() {
        let mut state = new_state();
        state.set(b"k1", b"v1".to_vec());
        state.commit_session();

        state.set(b"k2", b"v2".to_vec());
        pnk!(state.delete(b"k1"));
        state.discard_session();

        assert_eq!(pnk!(state.get(b"k1")), Some(b"v1".to_vec()));
        assert_eq!(pnk!(state.get(b"k2")), None);
    }

    #[test]
    fn commit_flushes_to_db() {
        let mut state = new_state();
        state.set(b"a", b"1".to_vec());
        state.set(b"b", b"2".to_vec());
        state.commit_session();
        assert_eq!(pnk!(state.commit(7)), 7);

        let mut collected = vec![];
        state.iterate(b"a", b"c", IterOrder::Asc, &mut |(k, v)| {
            collected.push((k, v));
            false
        });
        assert_eq!(
            collected,
            vec![
                (b"a".to_vec(), b"1".to_vec()),
                (b"b".to_vec(), b"2".to_vec())
            ]
        );
    }

    #[test]
    fn cache_iteration_applies_deletes() {
        let mut state = new_state();
        state.set(b"p/a", b"1".to_vec());
        state.set(b"p/b", b"2".to_vec());
        state.commit_session();
        pnk!(state.delete(b"p/a"));

        let mut kv = KVecMap::new();
        state.iterate_cache(b"p/", &mut kv);
        assert_eq!(kv.len(), 1);
        assert_eq!(kv.get(&b"p/b".to_vec()), Some(&b"2".to_vec()));
    }
}
