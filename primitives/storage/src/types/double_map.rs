use crate::*;
use chainstate::db::{IterOrder, MerkleDB};
use chainstate::state::{KVecMap, State};
use std::str::FromStr;

/// A type that allow to store values for `(key1, key2)` couple. Similar to `StorageMap` but allow
/// to iterate and remove value associated to first key.
///
/// Each value is stored at:
/// ```nocompile
/// Prefix::module_prefix() ++ Prefix::STORAGE_PREFIX
///     ++ DB_SEPARATOR ++ key1.to_string()
///     ++ DB_SEPARATOR ++ key2.to_string()
/// ```
///
pub struct StorageDoubleMap<Prefix, Key1, Key2, Value>(
    core::marker::PhantomData<(Prefix, Key1, Key2, Value)>,
);

impl<Prefix, Key1, Key2, Value> StorageDoubleMap<Prefix, Key1, Key2, Value>
where
    Prefix: StorageInstance,
    Key1: ToString + FromStr,
    Key2: ToString + FromStr,
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

    /// Get the storage key used to fetch a value corresponding to a specific key pair.
    pub fn build_key_for(k1: &Key1, k2: &Key2) -> Vec<u8> {
        Self::prefix()
            .push(k1.to_string().as_bytes())
            .push(k2.to_string().as_bytes())
            .as_ref()
            .to_vec()
    }

    pub fn parse_key_for(key_list: Vec<&str>) -> std::result::Result<(Key1, Key2), ()> {
        if key_list.len() < 2 {
            return Err(());
        }
        let k1 = Key1::from_str(key_list[key_list.len() - 2]).map_err(|_| ())?;
        let k2 = Key2::from_str(key_list[key_list.len() - 1]).map_err(|_| ())?;
        Ok((k1, k2))
    }

    /// Does the value (explicitly) exist in storage?
    pub fn contains_key<T: MerkleDB>(
        store: Arc<RwLock<State<T>>>,
        k1: &Key1,
        k2: &Key2,
    ) -> bool {
        store
            .read()
            .exists(Self::build_key_for(k1, k2).as_slice())
            .unwrap_or(false)
    }

    /// Load the value associated with the given key pair from the map.
    pub fn get<T: MerkleDB>(
        store: Arc<RwLock<State<T>>>,
        k1: &Key1,
        k2: &Key2,
    ) -> Option<Value> {
        let output = store
            .read()
            .get(Self::build_key_for(k1, k2).as_slice())
            .unwrap_or(None);
        if let Some(val) = output {
            serde_json::from_slice::<Value>(val.as_slice()).ok()
        } else {
            None
        }
    }

    /// Store a value to be associated with the given key pair from the map.
    pub fn insert<T: MerkleDB>(
        store: Arc<RwLock<State<T>>>,
        k1: &Key1,
        k2: &Key2,
        val: &Value,
    ) {
        let _ = serde_json::to_vec(val)
            .map(|v| store.write().set(Self::build_key_for(k1, k2).as_slice(), v));
    }

    /// Remove the value under a key pair.
    pub fn remove<T: MerkleDB>(store: Arc<RwLock<State<T>>>, k1: &Key1, k2: &Key2) {
        let _ = store.write().delete(Self::build_key_for(k1, k2).as_slice());
    }

    /// Iter over all values under the first key, in second-key order.
    pub fn iterate_prefix<T: MerkleDB>(
        store: Arc<RwLock<State<T>>>,
        k1: &Key1,
    ) -> Vec<(Key2, Value)> {
        let prefix = Self::prefix().push(k1.to_string().as_bytes());
        Self::collect(store, &prefix)
            .into_iter()
            .map(|((_, k2), v)| (k2, v))
            .collect()
    }

    /// Iter over every value of the storage, in key order.
    pub fn iterate<T: MerkleDB>(store: Arc<RwLock<State<T>>>) -> Vec<(Key1, Key2, Value)> {
        Self::collect(store, &Self::prefix())
            .into_iter()
            .map(|((k1, k2), v)| (k1, k2, v))
            .collect()
    }

    fn collect<T: MerkleDB>(
        store: Arc<RwLock<State<T>>>,
        prefix: &chainstate::store::Prefix,
    ) -> Vec<((Key1, Key2), Value)> {
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

            let keys = Self::parse_key_for(key_list);
            let raw_value = serde_json::from_slice::<Value>(v.as_slice()).ok();

            if let (Ok(keys), Some(value)) = (keys, raw_value) {
                res.push((keys, value));
            }
        }
        res
    }
}
