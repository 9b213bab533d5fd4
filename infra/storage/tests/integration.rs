use packrat_storage::{FileStore, KeyValueStore, MemoryStore};

#[tokio::test]
async fn memory_store_roundtrip() {
    let store = MemoryStore::new();
    assert_eq!(store.get("vault_v1").await.unwrap(), None);

    store.set("vault_v1", br#"{"version":1}"#).await.unwrap();
    assert_eq!(store.get("vault_v1").await.unwrap(), Some(br#"{"version":1}"#.to_vec()));

    store.remove("vault_v1").await.unwrap();
    assert_eq!(store.get("vault_v1").await.unwrap(), None);
}

#[tokio::test]
async fn file_store_roundtrip_and_overwrite() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileStore::open(dir.path()).await.unwrap();

    assert_eq!(store.get("vault_v1").await.unwrap(), None);

    store.set("vault_v1", b"first").await.unwrap();
    store.set("vault_v1", b"second").await.unwrap();
    assert_eq!(store.get("vault_v1").await.unwrap(), Some(b"second".to_vec()));

    store.remove("vault_v1").await.unwrap();
    store.remove("vault_v1").await.unwrap();
    assert_eq!(store.get("vault_v1").await.unwrap(), None);
}

#[tokio::test]
async fn file_store_persists_across_reopen() {
    let dir = tempfile::tempdir().unwrap();
    {
        let store = FileStore::open(dir.path()).await.unwrap();
        store.set("vault_v1", b"durable").await.unwrap();
    }

    let reopened = FileStore::open(dir.path()).await.unwrap();
    assert_eq!(reopened.get("vault_v1").await.unwrap(), Some(b"durable".to_vec()));
}

#[tokio::test]
async fn file_store_leaves_no_temp_files_behind() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileStore::open(dir.path()).await.unwrap();

    for i in 0..10u8 {
        store.set("blob", &[i]).await.unwrap();
    }

    let names: Vec<String> = std::fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["blob".to_owned()]);
}
