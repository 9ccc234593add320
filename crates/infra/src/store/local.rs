use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_json::Value;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use super::Record;
use crate::error::StoreResult;

type Collection = BTreeMap<String, Value>;
type Collections = HashMap<String, Collection>;

/// Entity-keyed JSON store.
///
/// Without a root directory everything lives in memory. With one, each
/// collection is mirrored to `<root>/<collection>.json` and every committed
/// change rewrites the touched files through a temp file and a rename.
#[derive(Clone)]
pub struct LocalStore {
    collections: Arc<RwLock<Collections>>,
    root: Option<Arc<PathBuf>>,
}

impl LocalStore {
    pub fn in_memory() -> Self {
        Self {
            collections: Arc::new(RwLock::new(HashMap::new())),
            root: None,
        }
    }

    /// Open (or create) a store rooted at `root`, loading every collection
    /// file found there.
    pub async fn open(root: impl Into<PathBuf>) -> StoreResult<Self> {
        let root = root.into();
        tokio::fs::create_dir_all(&root).await?;

        let mut collections = Collections::new();
        let mut entries = tokio::fs::read_dir(&root).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let Some(name) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            let raw = tokio::fs::read(&path).await?;
            let collection: Collection = serde_json::from_slice(&raw)?;
            debug!(collection = name, records = collection.len(), "loaded collection");
            collections.insert(name.to_string(), collection);
        }

        info!(root = %root.display(), collections = collections.len(), "opened local store");
        Ok(Self {
            collections: Arc::new(RwLock::new(collections)),
            root: Some(Arc::new(root)),
        })
    }

    pub fn root(&self) -> Option<&Path> {
        self.root.as_deref().map(PathBuf::as_path)
    }

    pub async fn get<T: Record>(&self, key: &str) -> StoreResult<Option<T>> {
        let collections = self.collections.read().await;
        collections
            .get(T::COLLECTION)
            .and_then(|c| c.get(key))
            .map(|v| serde_json::from_value(v.clone()))
            .transpose()
            .map_err(Into::into)
    }

    pub async fn list<T: Record>(&self) -> StoreResult<Vec<T>> {
        let collections = self.collections.read().await;
        decode_all(collections.get(T::COLLECTION))
    }

    pub async fn put<T: Record>(&self, record: &T) -> StoreResult<()> {
        self.transaction(|tx| tx.put(record)).await
    }

    /// Returns whether a record was removed.
    pub async fn delete<T: Record>(&self, key: &str) -> StoreResult<bool> {
        self.transaction(|tx| Ok(tx.delete::<T>(key))).await
    }

    /// Run `f` against a staged view of the store and commit every change it
    /// made at once. Nothing is applied in memory when `f` or the file write
    /// fails. Collection files already replaced by a failed commit are
    /// restored from memory on a best-effort basis; a crash mid-commit can
    /// still leave some collection files ahead of others.
    pub async fn transaction<R, F>(&self, f: F) -> StoreResult<R>
    where
        F: FnOnce(&mut Tx<'_>) -> StoreResult<R>,
    {
        let mut collections = self.collections.write().await;

        let mut tx = Tx {
            base: &*collections,
            staged: HashMap::new(),
        };
        let out = f(&mut tx)?;
        let staged = tx.staged;

        if let Some(root) = &self.root {
            persist(root, &collections, &staged).await?;
        }
        for (name, collection) in staged {
            collections.insert(name.to_string(), collection);
        }
        Ok(out)
    }

    /// Cheap liveness check used by the health route.
    pub async fn probe(&self) -> StoreResult<()> {
        if let Some(root) = &self.root {
            tokio::fs::metadata(root.as_path()).await?;
        }
        Ok(())
    }
}

/// Staged view handed to [`LocalStore::transaction`].
pub struct Tx<'a> {
    base: &'a Collections,
    staged: HashMap<&'static str, Collection>,
}

impl Tx<'_> {
    fn current(&self, name: &'static str) -> Option<&Collection> {
        self.staged.get(name).or_else(|| self.base.get(name))
    }

    fn staged_mut(&mut self, name: &'static str) -> &mut Collection {
        let base = self.base;
        self.staged
            .entry(name)
            .or_insert_with(|| base.get(name).cloned().unwrap_or_default())
    }

    pub fn get<T: Record>(&self, key: &str) -> StoreResult<Option<T>> {
        self.current(T::COLLECTION)
            .and_then(|c| c.get(key))
            .map(|v| serde_json::from_value(v.clone()))
            .transpose()
            .map_err(Into::into)
    }

    pub fn list<T: Record>(&self) -> StoreResult<Vec<T>> {
        decode_all(self.current(T::COLLECTION))
    }

    pub fn put<T: Record>(&mut self, record: &T) -> StoreResult<()> {
        let value = serde_json::to_value(record)?;
        self.staged_mut(T::COLLECTION).insert(record.key(), value);
        Ok(())
    }

    pub fn delete<T: Record>(&mut self, key: &str) -> bool {
        self.staged_mut(T::COLLECTION).remove(key).is_some()
    }
}

fn decode_all<T: Record>(collection: Option<&Collection>) -> StoreResult<Vec<T>> {
    collection
        .into_iter()
        .flat_map(|c| c.values())
        .map(|v| serde_json::from_value(v.clone()).map_err(Into::into))
        .collect()
}

fn collection_path(root: &Path, name: &str) -> PathBuf {
    root.join(format!("{name}.json"))
}

async fn persist(
    root: &Path,
    committed: &Collections,
    staged: &HashMap<&'static str, Collection>,
) -> StoreResult<()> {
    // Write every temp file first so a serialisation or disk error leaves the
    // committed files untouched.
    let mut pending = Vec::with_capacity(staged.len());
    for (name, collection) in staged {
        let path = collection_path(root, name);
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, serde_json::to_vec_pretty(collection)?).await?;
        pending.push((*name, tmp, path));
    }

    let mut replaced = Vec::with_capacity(pending.len());
    for (index, (name, tmp, path)) in pending.iter().enumerate() {
        if let Err(err) = tokio::fs::rename(tmp, path).await {
            restore(root, committed, &replaced).await;
            for (_, leftover, _) in &pending[index..] {
                if let Err(err) = tokio::fs::remove_file(leftover).await {
                    debug!(path = %leftover.display(), error = %err, "could not remove temp file");
                }
            }
            return Err(err.into());
        }
        replaced.push(*name);
    }
    Ok(())
}

/// Put back the committed contents of collection files a failed commit
/// already replaced.
async fn restore(root: &Path, committed: &Collections, replaced: &[&str]) {
    for name in replaced {
        let path = collection_path(root, name);
        let result = match committed.get(*name) {
            Some(collection) => match serde_json::to_vec_pretty(collection) {
                Ok(bytes) => tokio::fs::write(&path, bytes).await,
                Err(err) => Err(err.into()),
            },
            None => tokio::fs::remove_file(&path).await,
        };
        if let Err(err) = result {
            warn!(collection = *name, error = %err, "could not restore collection file");
        }
    }
}
