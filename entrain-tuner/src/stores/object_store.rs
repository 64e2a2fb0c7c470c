//! Object-store seam
//!
//! Entity-list snapshots and review outputs live in an external object
//! store addressed by `/`-separated string keys. Put and copy overwrite
//! their destination, so retrying either operation is always safe.

use async_trait::async_trait;
use entrain_common::{Error, Result};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;

/// Blob storage collaborator
///
/// `get` of a missing key returns `Error::NotFound`; every other failure
/// propagates unmodified for the caller's retry policy.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Fetch an object's content
    async fn get(&self, key: &str) -> Result<String>;

    /// Write an object, overwriting any existing content
    async fn put(&self, key: &str, body: &str) -> Result<()>;

    /// Copy an object to another key, overwriting the destination
    async fn copy(&self, src: &str, dst: &str) -> Result<()>;

    /// Delete an object; deleting a missing key is not an error
    async fn delete(&self, key: &str) -> Result<()>;
}

/// Filesystem-backed object store
///
/// Keys map to paths under a root directory. The production default for
/// single-host deployments.
pub struct FsObjectStore {
    root: PathBuf,
}

impl FsObjectStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(key)
    }

    async fn ensure_parent(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl ObjectStore for FsObjectStore {
    async fn get(&self, key: &str) -> Result<String> {
        let path = self.path_for(key);
        match tokio::fs::read_to_string(&path).await {
            Ok(content) => Ok(content),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(Error::NotFound(key.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn put(&self, key: &str, body: &str) -> Result<()> {
        let path = self.path_for(key);
        self.ensure_parent(&path).await?;
        tokio::fs::write(&path, body).await?;
        Ok(())
    }

    async fn copy(&self, src: &str, dst: &str) -> Result<()> {
        let src_path = self.path_for(src);
        let dst_path = self.path_for(dst);
        if !src_path.exists() {
            return Err(Error::NotFound(src.to_string()));
        }
        self.ensure_parent(&dst_path).await?;
        tokio::fs::copy(&src_path, &dst_path).await?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let path = self.path_for(key);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// In-memory object store for tests and local development
#[derive(Default)]
pub struct MemoryObjectStore {
    objects: RwLock<HashMap<String, String>>,
}

impl MemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an object synchronously (test setup convenience)
    pub fn with_object(self, key: &str, body: &str) -> Self {
        self.objects
            .try_write()
            .expect("unshared store")
            .insert(key.to_string(), body.to_string());
        self
    }

    /// Snapshot of current keys, sorted
    pub async fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.objects.read().await.keys().cloned().collect();
        keys.sort();
        keys
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn get(&self, key: &str) -> Result<String> {
        self.objects
            .read()
            .await
            .get(key)
            .cloned()
            .ok_or_else(|| Error::NotFound(key.to_string()))
    }

    async fn put(&self, key: &str, body: &str) -> Result<()> {
        self.objects
            .write()
            .await
            .insert(key.to_string(), body.to_string());
        Ok(())
    }

    async fn copy(&self, src: &str, dst: &str) -> Result<()> {
        let mut objects = self.objects.write().await;
        let body = objects
            .get(src)
            .cloned()
            .ok_or_else(|| Error::NotFound(src.to_string()))?;
        objects.insert(dst.to_string(), body);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.objects.write().await.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn memory_store_get_missing_is_not_found() {
        let store = MemoryObjectStore::new();
        assert!(matches!(
            store.get("absent").await,
            Err(Error::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn memory_store_copy_overwrites_destination() {
        let store = MemoryObjectStore::new()
            .with_object("a", "first")
            .with_object("b", "second");
        store.copy("a", "b").await.unwrap();
        assert_eq!(store.get("b").await.unwrap(), "first");
    }

    #[tokio::test]
    async fn memory_store_delete_missing_is_ok() {
        let store = MemoryObjectStore::new();
        store.delete("absent").await.unwrap();
    }

    #[tokio::test]
    async fn fs_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsObjectStore::new(dir.path());

        store.put("lists/entities.csv", "Text,Type\n").await.unwrap();
        assert_eq!(store.get("lists/entities.csv").await.unwrap(), "Text,Type\n");

        store
            .copy("lists/entities.csv", "lists/updated_entities.csv")
            .await
            .unwrap();
        assert_eq!(
            store.get("lists/updated_entities.csv").await.unwrap(),
            "Text,Type\n"
        );

        store.delete("lists/entities.csv").await.unwrap();
        assert!(matches!(
            store.get("lists/entities.csv").await,
            Err(Error::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn fs_store_copy_missing_source_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsObjectStore::new(dir.path());
        assert!(matches!(
            store.copy("missing", "anywhere").await,
            Err(Error::NotFound(_))
        ));
    }
}
