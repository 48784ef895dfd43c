mod types;

#[cfg(test)]
mod tests;

pub use paste;
pub use serde::{de::DeserializeOwned, Serialize};
pub use types::{StorageDoubleMap, StorageMap, StorageValue};

pub use chainstate::store::{Prefix, DB_SEPARATOR};
pub use parking_lot::RwLock;
pub use std::sync::Arc;

/// An instance of a storage container: the pair of prefixes every key
/// under it starts with.
pub trait StorageInstance {
    fn module_prefix() -> &'static str;

    const STORAGE_PREFIX: &'static str;
}

/// Declares a storage container bound to a module.
///
/// ```ignore
/// generate_storage!(Coin, AccountStore => Map<Address, CoinAccount>);
/// generate_storage!(Dpos, ParamsStore => Value<Params>);
/// generate_storage!(Dpos, DelegationStore => DoubleMap<Address, DelegationKey, Delegation>);
/// ```
#[macro_export]
macro_rules! generate_storage {
    ($module:ident, $name:ident => Value<$v:ty>) => {
        $crate::paste::paste! {
            pub struct [<$name Instance>];

            impl $crate::StorageInstance for [<$name Instance>] {
                fn module_prefix() -> &'static str {
                    stringify!($module)
                }

                const STORAGE_PREFIX: &'static str = stringify!($name);
            }

            pub type $name = $crate::StorageValue<[<$name Instance>], $v>;
        }
    };
    ($module:ident, $name:ident => Map<$k:ty, $v:ty>) => {
        $crate::paste::paste! {
            pub struct [<$name Instance>];

            impl $crate::StorageInstance for [<$name Instance>] {
                fn module_prefix() -> &'static str {
                    stringify!($module)
                }

                const STORAGE_PREFIX: &'static str = stringify!($name);
            }

            pub type $name = $crate::StorageMap<[<$name Instance>], $k, $v>;
        }
    };
    ($module:ident, $name:ident => DoubleMap<$k1:ty, $k2:ty, $v:ty>) => {
        $crate::paste::paste! {
            pub struct [<$name Instance>];

            impl $crate::StorageInstance for [<$name Instance>] {
                fn module_prefix() -> &'static str {
                    stringify!($module)
                }

                const STORAGE_PREFIX: &'static str = stringify!($name);
            }

            pub type $name = $crate::StorageDoubleMap<[<$name Instance>], $k1, $k2, $v>;
        }
    };
}
