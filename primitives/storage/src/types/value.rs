use crate::*;
use chainstate::db::MerkleDB;
use chainstate::state::State;

/// A type that allow to store a value.
///
/// The value is stored at:
/// ```nocompile
/// Prefix::module_prefix() ++ Prefix::STORAGE_PREFIX
/// ```
///
pub struct StorageValue<Prefix, Value>(core::marker::PhantomData<(Prefix, Value)>);

impl<Prefix, Value> StorageValue<Prefix, Value>
where
    Prefix: StorageInstance,
    Value: Serialize + DeserializeOwned,
{
    pub fn module_prefix() -> &'static [u8] {
        Prefix::module_prefix().as_bytes()
    }

    pub fn storage_prefix() -> &'static [u8] {
        Prefix::STORAGE_PREFIX.as_bytes()
    }

    /// Get the storage key.
    pub fn store_key() -> Vec<u8> {
        [Self::module_prefix(), Self::storage_prefix()].concat()
    }

    /// Does the value (explicitly) exist in storage?
    pub fn exists<T: MerkleDB>(store: Arc<RwLock<State<T>>>) -> bool {
        store
            .read()
            .exists(Self::store_key().as_slice())
            .unwrap_or(false)
    }

    /// Load the value from the provided storage instance.
    pub fn get<T: MerkleDB>(store: Arc<RwLock<State<T>>>) -> Option<Value> {
        let output = store
            .read()
            .get(Self::store_key().as_slice())
            .unwrap_or(None);
        if let Some(val) = output {
            serde_json::from_slice::<Value>(val.as_slice()).ok()
        } else {
            None
        }
    }

    /// Store a value under this key into the provided storage instance.
    pub fn put<T: MerkleDB>(store: Arc<RwLock<State<T>>>, val: Value) {
        let _ = serde_json::to_vec(&val)
            .map(|v| store.write().set(Self::store_key().as_slice(), v));
    }

    /// Remove the value.
    pub fn delete<T: MerkleDB>(store: Arc<RwLock<State<T>>>) {
        let _ = store.write().delete(Self::store_key().as_slice());
    }
}
