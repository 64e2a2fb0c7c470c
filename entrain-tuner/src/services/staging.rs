//! Entity-list snapshot staging
//!
//! Three snapshots of the entity list exist at any time, distinguished
//! by object key derived from one configured base key `K`:
//!
//! - baseline: `K` — the list the active recognizer was trained on
//! - working:  `dirname(K)/updated_<basename(K)>` — baseline plus
//!   corrections not yet trained on
//! - quarantine: `dirname(K)/ERRORED_ENTITY_LIST_<5 digits>_<basename(K)>`
//!   — a working list whose training run failed, kept for inspection
//!
//! All mutations are object-store copies or puts, which overwrite their
//! destination, so any step can be retried safely.

use entrain_common::Result;
use rand::Rng;
use std::sync::Arc;

use crate::models::EntityList;
use crate::stores::ObjectStore;

/// Snapshot manager over the object store
#[derive(Clone)]
pub struct EntityListStaging {
    store: Arc<dyn ObjectStore>,
    base_key: String,
}

impl EntityListStaging {
    pub fn new(store: Arc<dyn ObjectStore>, base_key: impl Into<String>) -> Self {
        Self {
            store,
            base_key: base_key.into(),
        }
    }

    /// Key of the baseline snapshot
    pub fn baseline_key(&self) -> &str {
        &self.base_key
    }

    /// Key of the working snapshot
    pub fn working_key(&self) -> String {
        prepend_to_file_name(&self.base_key, "updated")
    }

    /// Fresh quarantine key with a random disambiguating suffix
    ///
    /// Randomized per call so repeated failures never overwrite each
    /// other.
    pub fn quarantine_key(&self) -> String {
        let suffix: u32 = rand::thread_rng().gen_range(10000..=99999);
        prepend_to_file_name(&self.base_key, &format!("ERRORED_ENTITY_LIST_{suffix}"))
    }

    /// Load the baseline entity list
    ///
    /// A missing baseline is fatal: there is nothing to seed the working
    /// list from, so `Error::NotFound` propagates.
    pub async fn load_baseline(&self) -> Result<EntityList> {
        let content = self.store.get(self.baseline_key()).await?;
        Ok(EntityList::parse(&content))
    }

    /// Load the working entity list, creating it from the baseline on
    /// first access
    ///
    /// The copy targets a fixed destination key and overwrites, so a
    /// concurrent or retried first access is safe.
    pub async fn load_working(&self) -> Result<EntityList> {
        let working_key = self.working_key();

        let content = match self.store.get(&working_key).await {
            Ok(content) => content,
            Err(entrain_common::Error::NotFound(_)) => {
                tracing::info!(
                    baseline = self.baseline_key(),
                    working = %working_key,
                    "Working entity list absent; seeding from baseline"
                );
                self.store.copy(self.baseline_key(), &working_key).await?;
                self.store.get(&working_key).await?
            }
            Err(e) => return Err(e),
        };

        Ok(EntityList::parse(&content))
    }

    /// Overwrite the working snapshot with a merged list
    pub async fn write_working(&self, list: &EntityList) -> Result<()> {
        self.store.put(&self.working_key(), &list.to_csv()).await
    }

    /// Promote the working snapshot to baseline (overwrite)
    pub async fn promote(&self) -> Result<()> {
        self.store
            .copy(&self.working_key(), self.baseline_key())
            .await
    }

    /// Quarantine the working snapshot under a unique key
    ///
    /// Returns the quarantine key the list was preserved under.
    pub async fn quarantine(&self) -> Result<String> {
        let quarantine_key = self.quarantine_key();
        self.store.copy(&self.working_key(), &quarantine_key).await?;
        Ok(quarantine_key)
    }

    /// Delete the working snapshot
    ///
    /// The next review completion recreates it by copy-from-baseline.
    pub async fn clear_working(&self) -> Result<()> {
        self.store.delete(&self.working_key()).await
    }
}

/// Prepend a prefix to the file-name component of an object key
fn prepend_to_file_name(key: &str, prefix: &str) -> String {
    match key.rsplit_once('/') {
        Some((dir, name)) => format!("{dir}/{prefix}_{name}"),
        None => format!("{prefix}_{key}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stores::MemoryObjectStore;

    const BASE: &str = "lists/entities.csv";
    const BASELINE_CSV: &str = "Text,Type\nAcme,ORG\n";

    fn staging_with_baseline() -> (Arc<MemoryObjectStore>, EntityListStaging) {
        let store = Arc::new(MemoryObjectStore::new().with_object(BASE, BASELINE_CSV));
        let staging = EntityListStaging::new(store.clone(), BASE);
        (store, staging)
    }

    #[test]
    fn key_derivation() {
        let staging = EntityListStaging::new(Arc::new(MemoryObjectStore::new()), BASE);
        assert_eq!(staging.baseline_key(), "lists/entities.csv");
        assert_eq!(staging.working_key(), "lists/updated_entities.csv");

        let quarantine = staging.quarantine_key();
        assert!(quarantine.starts_with("lists/ERRORED_ENTITY_LIST_"));
        assert!(quarantine.ends_with("_entities.csv"));
    }

    #[test]
    fn key_derivation_without_directory() {
        let staging = EntityListStaging::new(Arc::new(MemoryObjectStore::new()), "entities.csv");
        assert_eq!(staging.working_key(), "updated_entities.csv");
    }

    #[tokio::test]
    async fn load_working_seeds_from_baseline_once() {
        let (store, staging) = staging_with_baseline();

        let working = staging.load_working().await.unwrap();
        assert_eq!(working.len(), 1);
        assert_eq!(
            store.get("lists/updated_entities.csv").await.unwrap(),
            BASELINE_CSV
        );

        // Second access reads the existing working copy, not the baseline
        store
            .put("lists/updated_entities.csv", "Text,Type\nAcme,ORG\nJones,PER\n")
            .await
            .unwrap();
        assert_eq!(staging.load_working().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn load_working_with_missing_baseline_is_fatal() {
        let staging = EntityListStaging::new(Arc::new(MemoryObjectStore::new()), BASE);
        assert!(matches!(
            staging.load_working().await,
            Err(entrain_common::Error::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn promote_overwrites_baseline() {
        let (store, staging) = staging_with_baseline();
        store
            .put("lists/updated_entities.csv", "Text,Type\nAcme,ORG\nJones,PER\n")
            .await
            .unwrap();

        staging.promote().await.unwrap();
        assert_eq!(staging.load_baseline().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn quarantine_keys_never_collide() {
        let (store, staging) = staging_with_baseline();
        staging.load_working().await.unwrap();

        let first = staging.quarantine().await.unwrap();
        let second = staging.quarantine().await.unwrap();
        assert_ne!(first, second);

        // Both quarantine objects exist alongside working and baseline
        assert_eq!(store.keys().await.len(), 4);
    }

    #[tokio::test]
    async fn clear_working_removes_snapshot() {
        let (store, staging) = staging_with_baseline();
        staging.load_working().await.unwrap();

        staging.clear_working().await.unwrap();
        assert!(store
            .get("lists/updated_entities.csv")
            .await
            .is_err());
        // Baseline untouched
        assert_eq!(staging.load_baseline().await.unwrap().len(), 1);
    }
}
