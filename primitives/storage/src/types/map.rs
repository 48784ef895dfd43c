use crate::*;
use chainstate::db::{IterOrder, MerkleDB};
use chainstate::state::{KVecMap, State};
use std::str::FromStr;

/// A type that allow to store value for given key. Allowing to insert/remove/iterate on values.
///
/// Each value is stored at:
/// ```nocompile
/// Prefix::module_prefix() ++ Prefix::STORAGE_PREFIX
///     ++ DB_SEPARATOR ++ key.to_string()
/// ```
///
pub struct StorageMap<Prefix, Key, Value>(core::marker::PhantomData<(Prefix, Key, Value)>);

impl<Prefix, Key, Value> StorageMap<Prefix, Key, Value>
where
    Prefix: StorageInstance,
    Key: ToString + FromStr,
    Value: Serialize + DeserializeOwned,
{
    pub fn module_prefix() -> &'static [u8] {
        Prefix::module_prefix().as_bytes()
    }

    pub fn storage_prefix() -> &'static [u8] {
        Prefix::STORAGE_PREFIX.as_bytes()
    }

    fn prefix() -> chainstate::store::Prefix {
        chainstate::store::Prefix::new(
            [Self::module_prefix(), Self::storage_prefix()].concat().as_slice(),
        )
    }

    /// Get the storage key used to fetch a value corresponding to a specific key.
    pub fn build_key_for(key: &Key) -> Vec<u8> {
        Self::prefix().push(key.to_string().as_bytes()).as_ref().to_vec()
    }

    pub fn parse_key_for(key_list: Vec<&str>) -> std::result::Result<Key, ()> {
        let last_key = key_list.last().copied().ok_or(())?;
        Key::from_str(last_key).map_err(|_| ())
    }

    /// Does the value (explicitly) exist in storage?
    pub fn contains_key<T: MerkleDB>(store: Arc<RwLock<State<T>>>, key: &Key) -> bool {
        store
            .read()
            .exists(Self::build_key_for(key).as_slice())
            .unwrap_or(false)
    }

    /// Load the value associated with the given key from the map.
    pub fn get<T: MerkleDB>(store: Arc<RwLock<State<T>>>, key: &Key) -> Option<Value> {
        let output = store
            .read()
            .get(Self::build_key_for(key).as_slice())
            .unwrap_or(None);
        if let Some(val) = output {
            serde_json::from_slice::<Value>(val.as_slice()).ok()
        } else {
            None
        }
    }

    /// Store a value to be associated with the given key from the map.
    pub fn insert<T: MerkleDB>(store: Arc<RwLock<State<T>>>, key: &Key, val: &Value) {
        let _ = serde_json::to_vec(val)
            .map(|v| store.write().set(Self::build_key_for(key).as_slice(), v));
    }

    /// Remove the value under a key.
    pub fn remove<T: MerkleDB>(store: Arc<RwLock<State<T>>>, key: &Key) {
        let _ = store.write().delete(Self::build_key_for(key).as_slice());
    }

    /// Iter over all value of the storage, in key order.
    pub fn iterate<T: MerkleDB>(store: Arc<RwLock<State<T>>>) -> Vec<(Key, Value)> {
        let prefix = Self::prefix();

        // Iterate db
        let mut kv_map = KVecMap::new();
        store.read().iterate(
            &prefix.begin(),
            &prefix.end(),
            IterOrder::Asc,
            &mut |(k, v)| -> bool {
                kv_map.insert(k, v);
                false
            },
        );
        // Iterate cache
        store.read().iterate_cache(prefix.begin().as_slice(), &mut kv_map);

        let mut res = Vec::new();
        for (k, v) in kv_map {
            let key_str = String::from_utf8_lossy(k.as_slice()).to_string();
            let key_list: Vec<_> = key_str.split(DB_SEPARATOR as char).collect();

            let key = Self::parse_key_for(key_list);
            let raw_value = serde_json::from_slice::<Value>(v.as_slice()).ok();

            if let (Ok(key), Some(value)) = (key, raw_value) {
                res.push((key, value));
            }
        }
        res
    }
}
