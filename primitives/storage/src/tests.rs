use crate::*;
use chainstate::db::MemDB;
use chainstate::state::{ChainState, State};
use mp_core::context::Store;
use ruc::RucResult;

fn create_temp_store() -> Arc<RwLock<Store>> {
    let chain_state = Arc::new(RwLock::new(ChainState::new(
        MemDB::new(),
        "temp_db".to_string(),
    )));
    Arc::new(RwLock::new(State::new(chain_state)))
}

#[test]
fn storage_value_works() {
    generate_storage!(Meridian, Number => Value<u32>);

    assert_eq!(Number::module_prefix(), b"Meridian");
    assert_eq!(Number::storage_prefix(), b"Number");
    assert_eq!(Number::store_key(), b"MeridianNumber".to_vec());

    let store = create_temp_store();
    Number::put(store.clone(), 10);

    assert_eq!(Number::get(store.clone()), Some(10));
    assert!(Number::exists(store.clone()));
    Number::delete(store.clone());
    assert_eq!(Number::get(store.clone()), None);
    assert!(!Number::exists(store));
}

#[test]
fn storage_map_test() {
    generate_storage!(Meridian, Account => Map<String, u32>);

    assert_eq!(Account::module_prefix(), b"Meridian");
    assert_eq!(Account::storage_prefix(), b"Account");

    let store = create_temp_store();
    Account::insert(store.clone(), &"a".to_string(), &10);
    Account::insert(store.clone(), &"b".to_string(), &20);
    Account::insert(store.clone(), &"c".to_string(), &30);

    assert_eq!(Account::get(store.clone(), &"a".to_string()), Some(10));
    assert!(Account::contains_key(store.clone(), &"a".to_string()));
    Account::remove(store.clone(), &"a".to_string());
    assert_eq!(Account::get(store.clone(), &"a".to_string()), None);
    assert!(!Account::contains_key(store.clone(), &"a".to_string()));

    let kvs = Account::iterate(store.clone());
    assert_eq!(kvs, vec![("b".to_string(), 20), ("c".to_string(), 30)]);

    // committed and cached entries merge into one ordered view
    ruc::pnk!(store.write().commit(1));
    Account::insert(store.clone(), &"a".to_string(), &11);
    let kvs = Account::iterate(store);
    assert_eq!(
        kvs,
        vec![
            ("a".to_string(), 11),
            ("b".to_string(), 20),
            ("c".to_string(), 30)
        ]
    );
}

#[test]
fn storage_double_map_test() {
    generate_storage!(Meridian, Data => DoubleMap<u32, u32, u32>);

    assert_eq!(Data::module_prefix(), b"Meridian");
    assert_eq!(Data::storage_prefix(), b"Data");

    let store = create_temp_store();
    Data::insert(store.clone(), &1, &2, &10);
    Data::insert(store.clone(), &1, &3, &20);
    Data::insert(store.clone(), &2, &3, &30);
    Data::insert(store.clone(), &2, &4, &40);

    assert_eq!(Data::get(store.clone(), &1, &2), Some(10));
    assert!(Data::contains_key(store.clone(), &1, &2));
    Data::remove(store.clone(), &1, &2);
    assert_eq!(Data::get(store.clone(), &1, &2), None);
    assert!(!Data::contains_key(store.clone(), &1, &2));

    let kvs = Data::iterate_prefix(store.clone(), &1);
    assert_eq!(kvs, vec![(3, 20)]);

    let kvs = Data::iterate_prefix(store.clone(), &2);
    assert_eq!(kvs, vec![(3, 30), (4, 40)]);

    let all = Data::iterate(store);
    assert_eq!(all, vec![(1, 3, 20), (2, 3, 30), (2, 4, 40)]);
}
