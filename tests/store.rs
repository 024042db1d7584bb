use tempfile::tempdir;

use isamfile::{IsamError, Record, Store, StoreConfig};

fn cfg(records_per_page: usize) -> StoreConfig {
    StoreConfig {
        records_per_page,
        payload_len: 2,
        alpha: 0.5,
        beta: 0.2,
    }
}

fn rec(key: i32) -> Record {
    Record::new(key, vec![(key % 256) as u8, 0])
}

fn new_store(dir: &tempfile::TempDir, cfg: StoreConfig) -> Store {
    Store::init(dir.path().join("data.bin"), dir.path().join("index.bin"), cfg).unwrap()
}

#[test]
fn insert_range_and_get_middle_key() {
    let dir = tempdir().unwrap();
    let mut store = new_store(&dir, cfg(10));
    for k in 2..=15 {
        store.add(rec(k)).unwrap();
    }
    let r = store.get(8).unwrap();
    assert_eq!(r.key, 8);
    assert_eq!(r.numbers, vec![8, 0]);
}

#[test]
fn fills_page_in_key_order_regardless_of_insert_order() {
    let dir = tempdir().unwrap();
    let mut store = new_store(&dir, cfg(4));
    // Page 1 starts with the sentinel (key 1) in slot 0.
    store.add(rec(5)).unwrap();
    store.add(rec(3)).unwrap();
    store.add(rec(9)).unwrap();
    assert_eq!(store.get(3).unwrap().key, 3);
    assert_eq!(store.get(5).unwrap().key, 5);
    assert_eq!(store.get(9).unwrap().key, 9);

    // Page is now full (sentinel, 3, 5, 9); the next insert overflows.
    store.add(rec(4)).unwrap();
    assert_eq!(store.get(4).unwrap().key, 4);
}

#[test]
fn add_delete_get_round_trip() {
    let dir = tempdir().unwrap();
    let mut store = new_store(&dir, cfg(10));
    store.add(rec(10)).unwrap();
    store.delete(10).unwrap();
    let err = store.get(10).unwrap_err();
    assert!(matches!(err, IsamError::NotFound(10)));
}

#[test]
fn overflow_chain_survives_middle_delete() {
    let dir = tempdir().unwrap();
    let mut store = new_store(&dir, cfg(4));
    // Fill page 1 (sentinel + 3 more) so subsequent inserts go to overflow,
    // all anchored at the page's last slot.
    store.add(rec(2)).unwrap();
    store.add(rec(3)).unwrap();
    store.add(rec(4)).unwrap();

    store.add(rec(20)).unwrap();
    store.add(rec(21)).unwrap();
    store.add(rec(22)).unwrap();

    assert_eq!(store.get(21).unwrap().key, 21);
    store.delete(21).unwrap();
    assert_eq!(store.get(20).unwrap().key, 20);
    assert_eq!(store.get(22).unwrap().key, 22);
    assert!(matches!(store.get(21).unwrap_err(), IsamError::NotFound(21)));
}

#[test]
fn reorganization_triggers_and_empties_overflow_area() {
    let dir = tempdir().unwrap();
    let mut store = new_store(&dir, cfg(4));
    for k in 2..40 {
        store.add(rec(k)).unwrap();
    }
    assert_eq!(store.overflow_ratio(), 0.0);
    for k in 2..40 {
        assert_eq!(store.get(k).unwrap().key, k);
    }
}

#[test]
fn update_replaces_payload_and_preserves_key_set() {
    let dir = tempdir().unwrap();
    let mut store = new_store(&dir, cfg(10));
    store.add(rec(5)).unwrap();
    store.add(rec(6)).unwrap();
    store.update(Record::new(5, vec![99, 99])).unwrap();
    assert_eq!(store.get(5).unwrap().numbers, vec![99, 99]);
    assert_eq!(store.get(6).unwrap().key, 6);
}

#[test]
fn reopen_preserves_state() {
    let dir = tempdir().unwrap();
    let data_path = dir.path().join("data.bin");
    let index_path = dir.path().join("index.bin");
    {
        let mut store = Store::init(&data_path, &index_path, cfg(10)).unwrap();
        store.add(rec(2)).unwrap();
        store.add(rec(3)).unwrap();
    }
    let mut reopened = Store::open(&data_path, &index_path, cfg(10)).unwrap();
    assert_eq!(reopened.get(2).unwrap().key, 2);
    assert_eq!(reopened.get(3).unwrap().key, 3);
}

#[test]
fn rejects_key_below_floor_and_wrong_payload_length() {
    let dir = tempdir().unwrap();
    let mut store = new_store(&dir, cfg(10));
    assert!(matches!(
        store.add(Record::new(1, vec![0, 0])).unwrap_err(),
        IsamError::InvalidArgument(_)
    ));
    assert!(matches!(
        store.add(Record::new(5, vec![0])).unwrap_err(),
        IsamError::InvalidArgument(_)
    ));
}
