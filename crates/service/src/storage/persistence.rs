//! Whole-store snapshot to and from a flat JSON file.
//!
//! The file holds one object whose fields are the store keys and whose
//! values are JSON strings containing the stored text.

use std::collections::{BTreeMap, HashMap};
use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};

use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::errors::StoreError;
use crate::storage::json_store::JsonStore;

/// Serialize every entry and replace the store file.
///
/// Holds the exclusive lock for the whole snapshot and write. Every save
/// goes through the same `<name>.tmp` sibling, so two saves must never
/// overlap; a shared guard would let them clobber each other's temp file. The file is replaced through a rename; a
/// failed save leaves the previous file in place.
pub async fn save(store: &JsonStore) -> Result<(), StoreError> {
    let map = store.map().write().await;
    let sorted: BTreeMap<&str, &str> = map.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();
    let data = serde_json::to_vec_pretty(&sorted).map_err(|e| StoreError::Io(e.to_string()))?;

    let path = store.file_path();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .await
            .map_err(|e| StoreError::Io(format!("failed to create {}: {e}", parent.display())))?;
    }
    write_atomic(path, &data)
        .await
        .map_err(|e| StoreError::Io(format!("failed to write {}: {e}", path.display())))?;
    drop(map);
    Ok(())
}

/// Upsert every entry of the store file into `store`.
///
/// A missing file is not an error and loads nothing. Values are taken as
/// they are on disk, without JSON re-validation. The file is fully parsed
/// before the map is touched, so a corrupt file changes nothing.
pub async fn load(store: &JsonStore) -> Result<usize, StoreError> {
    let mut map = store.map().write().await;
    let path = store.file_path();

    let bytes = match fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(0),
        Err(e) => return Err(StoreError::Io(format!("failed to read {}: {e}", path.display()))),
    };
    let entries: HashMap<String, String> = serde_json::from_slice(&bytes)
        .map_err(|e| StoreError::Parse(format!("failed to parse {}: {e}", path.display())))?;

    let count = entries.len();
    map.extend(entries);
    Ok(count)
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(OsString::from).unwrap_or_else(|| OsString::from("store"));
    name.push(".tmp");
    path.with_file_name(name)
}

async fn write_atomic(path: &Path, data: &[u8]) -> io::Result<()> {
    let tmp = temp_path(path);
    let result = async {
        let mut file = fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&tmp)
            .await?;
        file.write_all(data).await?;
        file.sync_all().await?;
        drop(file);
        fs::rename(&tmp, path).await
    }
    .await;
    if result.is_err() {
        let _ = fs::remove_file(&tmp).await;
    }
    result?;
    sync_parent(path).await
}

/// Flush the directory entry so the rename survives a crash.
#[cfg(unix)]
async fn sync_parent(path: &Path) -> io::Result<()> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    fs::File::open(dir).await?.sync_all().await
}

#[cfg(not(unix))]
async fn sync_parent(_path: &Path) -> io::Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn tmp_file() -> PathBuf {
        std::env::temp_dir().join(format!("kv_persist_{}", Uuid::new_v4())).join("store.json")
    }

    async fn cleanup(path: &Path) {
        if let Some(dir) = path.parent() {
            let _ = fs::remove_dir_all(dir).await;
        }
    }

    #[tokio::test]
    async fn save_then_load_reproduces_mapping() -> Result<(), anyhow::Error> {
        let path = tmp_file();
        let store = JsonStore::new(&path);
        store.create("user1", r#"{"name":"Alice","age":30}"#).await?;
        store.create("user2", r#"{"name":"Bob"}"#).await?;
        store.create("list", "[1, 2,  3]").await?;
        store.update("user2", r#"{"name":"Bob","age":25}"#).await?;
        store.delete("user1").await?;
        store.save().await?;

        let fresh = JsonStore::new(&path);
        assert_eq!(fresh.load().await?, 2);
        assert_eq!(fresh.keys().await, store.keys().await);
        for key in store.keys().await {
            assert_eq!(fresh.read(&key).await?, store.read(&key).await?);
        }
        cleanup(&path).await;
        Ok(())
    }

    #[tokio::test]
    async fn file_is_an_object_of_strings() -> Result<(), anyhow::Error> {
        let path = tmp_file();
        let store = JsonStore::new(&path);
        store.create("doc", r#"{"nested":[1,2]}"#).await?;
        store.save().await?;

        let raw: serde_json::Value = serde_json::from_slice(&fs::read(&path).await?)?;
        assert_eq!(raw, serde_json::json!({"doc": "{\"nested\":[1,2]}"}));
        cleanup(&path).await;
        Ok(())
    }

    #[tokio::test]
    async fn missing_file_loads_nothing() -> Result<(), anyhow::Error> {
        let store = JsonStore::new(tmp_file());
        assert_eq!(store.load().await?, 0);
        assert!(store.is_empty().await);
        Ok(())
    }

    #[tokio::test]
    async fn corrupt_file_is_a_parse_error_and_changes_nothing() -> Result<(), anyhow::Error> {
        let path = tmp_file();
        fs::create_dir_all(path.parent().unwrap()).await?;
        fs::write(&path, b"{\"a\": \"1\", ").await?;

        let store = JsonStore::new(&path);
        store.create("keep", "true").await?;
        assert!(matches!(store.load().await, Err(StoreError::Parse(_))));
        assert_eq!(store.keys().await, vec!["keep".to_string()]);
        cleanup(&path).await;
        Ok(())
    }

    #[tokio::test]
    async fn non_string_values_are_a_parse_error() -> Result<(), anyhow::Error> {
        let path = tmp_file();
        fs::create_dir_all(path.parent().unwrap()).await?;
        fs::write(&path, br#"{"a": {"nested": true}}"#).await?;
        assert!(matches!(JsonStore::new(&path).load().await, Err(StoreError::Parse(_))));

        fs::write(&path, b"[\"a\"]").await?;
        assert!(matches!(JsonStore::new(&path).load().await, Err(StoreError::Parse(_))));
        cleanup(&path).await;
        Ok(())
    }

    #[tokio::test]
    async fn load_upserts_without_revalidating() -> Result<(), anyhow::Error> {
        let path = tmp_file();
        fs::create_dir_all(path.parent().unwrap()).await?;
        fs::write(&path, br#"{"shared": "\"from disk\"", "raw": "not json"}"#).await?;

        let store = JsonStore::new(&path);
        store.create("shared", "\"in memory\"").await?;
        store.create("local", "1").await?;
        assert_eq!(store.load().await?, 2);
        assert_eq!(store.read("shared").await?, "\"from disk\"");
        assert_eq!(store.read("raw").await?, "not json");
        assert_eq!(store.read("local").await?, "1");
        cleanup(&path).await;
        Ok(())
    }

    #[tokio::test]
    async fn save_creates_parent_dirs_and_leaves_no_temp_file() -> Result<(), anyhow::Error> {
        let path = tmp_file().parent().unwrap().join("a").join("b").join("store.json");
        let store = JsonStore::new(&path);
        store.create("k", "null").await?;
        store.save().await?;

        assert!(fs::metadata(&path).await?.is_file());
        assert!(fs::metadata(temp_path(&path)).await.is_err());
        if let Some(root) = path.parent().and_then(Path::parent).and_then(Path::parent) {
            let _ = fs::remove_dir_all(root).await;
        }
        Ok(())
    }

    #[tokio::test]
    async fn failed_save_keeps_previous_state() -> Result<(), anyhow::Error> {
        // target is a directory, so the final rename cannot succeed
        let path = tmp_file();
        fs::create_dir_all(&path).await?;
        let store = JsonStore::new(&path);
        store.create("k", "1").await?;

        assert!(matches!(store.save().await, Err(StoreError::Io(_))));
        assert!(fs::metadata(&path).await?.is_dir());
        assert!(fs::metadata(temp_path(&path)).await.is_err());
        assert_eq!(store.read("k").await?, "1");
        cleanup(&path).await;
        Ok(())
    }

    #[tokio::test]
    async fn empty_store_saves_empty_object() -> Result<(), anyhow::Error> {
        let path = tmp_file();
        JsonStore::new(&path).save().await?;
        let raw: serde_json::Value = serde_json::from_slice(&fs::read(&path).await?)?;
        assert_eq!(raw, serde_json::json!({}));
        cleanup(&path).await;
        Ok(())
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_saves_do_not_collide() -> Result<(), anyhow::Error> {
        let path = tmp_file();
        let store = std::sync::Arc::new(JsonStore::new(&path));
        let mut handles = Vec::new();
        for i in 0..50 {
            let store = std::sync::Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                store.create(&format!("k{i}"), &i.to_string()).await?;
                store.save().await
            }));
        }
        for h in handles {
            h.await??;
        }
        assert!(fs::metadata(temp_path(&path)).await.is_err());

        let fresh = JsonStore::new(&path);
        assert_eq!(fresh.load().await?, 50);
        cleanup(&path).await;
        Ok(())
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn parent_sync_accepts_bare_and_nested_paths() -> Result<(), anyhow::Error> {
        sync_parent(Path::new("store.json")).await?;
        sync_parent(&std::env::temp_dir().join("store.json")).await?;
        Ok(())
    }

    #[test]
    fn temp_file_sits_next_to_target() {
        assert_eq!(temp_path(Path::new("data/store.json")), PathBuf::from("data/store.json.tmp"));
    }
}
