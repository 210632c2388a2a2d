use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use rand::Rng;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::errors::ServiceError;
use crate::items::shuffle::shuffle_tags;
use crate::items::{validate_name, Item, ItemStore};

/// Stored value. The name lives only in the map key, so a key can never
/// disagree with the record it holds.
#[derive(Debug)]
struct Entry {
    description: String,
    // Readers shuffle under the shared map lock; this guard keeps two
    // readers off the same sequence.
    tags: Mutex<Vec<String>>,
}

impl Entry {
    fn new(description: String, tags: Vec<String>) -> Self {
        Self { description, tags: Mutex::new(tags) }
    }

    /// Shuffle the tags and, when `snapshot` is set, return the item as it
    /// looks right after this shuffle.
    fn shuffle<R: Rng + ?Sized>(&self, name: &str, rng: &mut R, snapshot: bool) -> Option<Item> {
        // A panic mid-shuffle still leaves a permutation behind, so a
        // poisoned guard is safe to reuse.
        let mut tags = self.tags.lock().unwrap_or_else(PoisonError::into_inner);
        shuffle_tags(tags.as_mut_slice(), rng);
        snapshot.then(|| Item::new(name, self.description.clone(), tags.clone()))
    }

    fn into_item(self, name: String) -> Item {
        let tags = self.tags.into_inner().unwrap_or_else(PoisonError::into_inner);
        Item::new(name, self.description, tags)
    }
}

/// In-memory item store guarded by a single reader/writer lock.
#[derive(Debug, Default)]
pub struct InMemoryItemStore {
    inner: RwLock<HashMap<String, Entry>>,
}

impl InMemoryItemStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store pre-seeded with `items`, keyed by each item's name.
    /// Fails on whitespace names or duplicates.
    pub fn with_items<I>(items: I) -> Result<Self, ServiceError>
    where
        I: IntoIterator<Item = Item>,
    {
        let mut map = HashMap::new();
        for item in items {
            validate_name(&item.name)?;
            if map.contains_key(&item.name) {
                return Err(ServiceError::AlreadyExists(item.name));
            }
            map.insert(item.name, Entry::new(item.description, item.tags));
        }
        Ok(Self { inner: RwLock::new(map) })
    }
}

#[async_trait]
impl ItemStore for InMemoryItemStore {
    async fn list(&self) -> BTreeMap<String, Item> {
        let map = self.inner.read().await;
        let mut rng = rand::thread_rng();
        map.iter()
            .filter_map(|(name, entry)| {
                entry.shuffle(name, &mut rng, true).map(|item| (name.clone(), item))
            })
            .collect()
    }

    async fn get(&self, name: &str) -> Result<Item, ServiceError> {
        let map = self.inner.read().await;
        let mut rng = rand::thread_rng();
        let mut found = None;
        // Every item is shuffled, not only the requested one.
        for (key, entry) in map.iter() {
            if let Some(item) = entry.shuffle(key, &mut rng, key == name) {
                found = Some(item);
            }
        }
        found.ok_or_else(|| {
            debug!(item = %name, "item not found");
            ServiceError::NotFound(name.to_string())
        })
    }

    async fn create(&self, item: Item) -> Result<Item, ServiceError> {
        validate_name(&item.name)?;

        let mut map = self.inner.write().await;
        if map.contains_key(&item.name) {
            return Err(ServiceError::AlreadyExists(item.name));
        }
        map.insert(item.name.clone(), Entry::new(item.description.clone(), item.tags.clone()));
        info!(item = %item.name, "added item");
        Ok(item)
    }

    async fn update(&self, name: &str, item: Item) -> Result<Item, ServiceError> {
        let mut map = self.inner.write().await;
        let Some(entry) = map.get_mut(name) else {
            debug!(item = %name, "update of missing item");
            return Err(ServiceError::NotFound(name.to_string()));
        };
        let updated = Item::new(name, item.description, item.tags);
        *entry = Entry::new(updated.description.clone(), updated.tags.clone());
        info!(item = %name, "updated item");
        Ok(updated)
    }

    async fn delete(&self, name: &str) -> Result<Item, ServiceError> {
        let mut map = self.inner.write().await;
        match map.remove_entry(name) {
            Some((key, entry)) => {
                info!(item = %name, "deleted item");
                Ok(entry.into_item(key))
            }
            None => Err(ServiceError::NotFound(name.to_string())),
        }
    }

    async fn len(&self) -> usize {
        self.inner.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn tags(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    fn sorted(mut v: Vec<String>) -> Vec<String> {
        v.sort();
        v
    }

    #[tokio::test]
    async fn widget_lifecycle() -> Result<(), anyhow::Error> {
        let store = InMemoryItemStore::new();

        let created = store.create(Item::new("widget", "a widget", tags(&["a", "b", "c"]))).await?;
        assert_eq!(created.name, "widget");

        let got = store.get("widget").await?;
        assert_eq!(got.name, "widget");
        assert_eq!(got.description, "a widget");
        assert_eq!(sorted(got.tags), tags(&["a", "b", "c"]));

        let updated = store.update("widget", Item::new("widget", "new", tags(&["x"]))).await?;
        assert_eq!(updated, Item::new("widget", "new", tags(&["x"])));
        let got = store.get("widget").await?;
        assert_eq!(got.description, "new");
        assert_eq!(got.tags, tags(&["x"]));

        let removed = store.delete("widget").await?;
        assert_eq!(removed.name, "widget");
        assert_eq!(store.get("widget").await, Err(ServiceError::NotFound("widget".into())));
        assert_eq!(store.len().await, 0);
        Ok(())
    }

    #[tokio::test]
    async fn create_rejects_whitespace_names() {
        let store = InMemoryItemStore::new();
        for name in ["two words", "tab\tname", "\n"] {
            let err = store.create(Item::new(name, "d", tags(&["t"]))).await.unwrap_err();
            assert!(matches!(err, ServiceError::InvalidArgument(_)));
        }
        assert_eq!(store.len().await, 0);
    }

    #[tokio::test]
    async fn create_rejects_duplicates_without_overwriting() {
        let store = InMemoryItemStore::new();
        store.create(Item::new("dup", "first", tags(&["a"]))).await.unwrap();
        let err = store.create(Item::new("dup", "second", tags(&["b"]))).await.unwrap_err();
        assert_eq!(err, ServiceError::AlreadyExists("dup".into()));
        assert_eq!(store.get("dup").await.unwrap().description, "first");
    }

    #[tokio::test]
    async fn update_missing_leaves_store_unchanged() {
        let store = InMemoryItemStore::with_items([Item::new("keep", "k", tags(&["a"]))]).unwrap();
        let err = store.update("ghost", Item::new("ghost", "g", vec![])).await.unwrap_err();
        assert_eq!(err, ServiceError::NotFound("ghost".into()));

        let all = store.list().await;
        assert_eq!(all.len(), 1);
        assert_eq!(all["keep"], Item::new("keep", "k", tags(&["a"])));
    }

    #[tokio::test]
    async fn update_keys_by_path_name_not_payload_name() {
        let store = InMemoryItemStore::with_items([Item::new("orig", "o", vec![])]).unwrap();
        let updated = store.update("orig", Item::new("renamed", "r", tags(&["z"]))).await.unwrap();
        assert_eq!(updated.name, "orig");

        let all = store.list().await;
        assert_eq!(all.keys().collect::<Vec<_>>(), vec!["orig"]);
        assert_eq!(all["orig"].description, "r");
        assert!(store.get("renamed").await.is_err());
    }

    #[tokio::test]
    async fn delete_missing_is_not_found() {
        let store = InMemoryItemStore::new();
        assert_eq!(store.delete("nope").await, Err(ServiceError::NotFound("nope".into())));
    }

    #[tokio::test]
    async fn keys_always_match_names() {
        let store = InMemoryItemStore::new();
        store.create(Item::new("a", "", tags(&["1", "2"]))).await.unwrap();
        store.create(Item::new("b", "", vec![])).await.unwrap();
        store.update("a", Item::new("zzz", "changed", vec![])).await.unwrap();
        store.delete("b").await.unwrap();
        store.create(Item::new("c", "", tags(&["3"]))).await.unwrap();

        for (key, item) in store.list().await {
            assert_eq!(key, item.name);
        }
    }

    #[test]
    fn seeding_rejects_bad_input() {
        let err = InMemoryItemStore::with_items([Item::new("bad name", "", vec![])]).unwrap_err();
        assert!(matches!(err, ServiceError::InvalidArgument(_)));

        let err = InMemoryItemStore::with_items([
            Item::new("same", "1", vec![]),
            Item::new("same", "2", vec![]),
        ])
        .unwrap_err();
        assert_eq!(err, ServiceError::AlreadyExists("same".into()));
    }

    #[tokio::test]
    async fn get_shuffles_every_item() {
        let many: Vec<String> = (0..16).map(|i| format!("t{i}")).collect();
        let store = InMemoryItemStore::with_items([
            Item::new("target", "", tags(&["only"])),
            Item::new("other", "", many.clone()),
        ])
        .unwrap();

        // Reading only "target" must still churn the order of "other".
        let mut moved = false;
        for _ in 0..20 {
            store.get("target").await.unwrap();
            let map = store.inner.read().await;
            let current = map["other"].tags.lock().unwrap().clone();
            drop(map);
            if current != many {
                moved = true;
                break;
            }
        }
        assert!(moved, "tags of unrequested item never changed");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_reads_and_writes_keep_tags_intact() {
        let base: Vec<String> = (0..24).map(|i| format!("tag-{i}")).collect();
        let store = Arc::new(
            InMemoryItemStore::with_items(
                (0..8).map(|i| Item::new(format!("item-{i}"), "seed", base.clone())),
            )
            .unwrap(),
        );

        let mut handles = Vec::new();
        for worker in 0..16 {
            let store = Arc::clone(&store);
            let base = base.clone();
            handles.push(tokio::spawn(async move {
                for round in 0..50 {
                    if worker % 4 == 0 {
                        let name = format!("extra-{worker}-{round}");
                        store.create(Item::new(&name, "tmp", base.clone())).await.unwrap();
                        store.update(&name, Item::new(&name, "tmp2", base.clone())).await.unwrap();
                        store.delete(&name).await.unwrap();
                    } else if round % 2 == 0 {
                        for (key, item) in store.list().await {
                            assert_eq!(key, item.name);
                            assert_eq!(sorted(item.tags), sorted(base.clone()));
                        }
                    } else {
                        let item = store.get(&format!("item-{}", round % 8)).await.unwrap();
                        assert_eq!(sorted(item.tags), sorted(base.clone()));
                    }
                }
            }));
        }
        for h in handles {
            h.await.unwrap();
        }
        assert_eq!(store.len().await, 8);
    }
}
