use std::{marker::PhantomData, path::PathBuf, sync::Arc};
use tokio::{fs, sync::RwLock};
use tracing::warn;

use crate::errors::ServiceError;

/// What to do when the backing file exists but cannot be read or parsed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RecoveryPolicy {
    /// Treat the collection as empty and rewrite the file to `[]`.
    /// Prior corrupt content is overwritten.
    RecoverToEmpty,
    /// Surface an I/O error and leave the file untouched.
    FailFast,
}

/// Generic JSON file-backed array store.
///
/// Persists a `Vec<T>` to a single JSON file, pretty-printed. The file is
/// the sole source of truth: every operation re-reads it, and mutations
/// run the whole load-modify-save cycle under the write half of the lock
/// so overlapping mutations cannot lose updates.
pub struct JsonArrayStore<T> {
    file_path: PathBuf,
    policy: RecoveryPolicy,
    lock: RwLock<()>,
    _marker: PhantomData<fn() -> T>,
}

impl<T> JsonArrayStore<T>
where
    T: serde::Serialize + serde::de::DeserializeOwned,
{
    /// Initialize the store from a path. Creates the file with an empty
    /// array if missing; a missing file is the normal first-run case
    /// under both policies.
    pub async fn new<P: Into<PathBuf>>(path: P, policy: RecoveryPolicy) -> Result<Arc<Self>, ServiceError> {
        let file_path = path.into();
        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent).await.ok();
        }
        if fs::metadata(&file_path).await.is_err() {
            let empty: Vec<T> = Vec::new();
            fs::write(&file_path, encode(&empty)?)
                .await
                .map_err(|e| ServiceError::Io(e.to_string()))?;
        }

        Ok(Arc::new(Self { file_path, policy, lock: RwLock::new(()), _marker: PhantomData }))
    }

    /// Read and parse the full collection.
    ///
    /// Under `RecoverToEmpty` an unreadable file degrades to an empty
    /// collection and the file is reset to `[]`; under `FailFast` the
    /// error propagates.
    pub async fn load_all(&self) -> Result<Vec<T>, ServiceError> {
        let guard = self.lock.read().await;
        match self.read_file().await {
            Ok(items) => Ok(items),
            Err(err) => {
                drop(guard);
                self.recover(err).await
            }
        }
    }

    /// Overwrite the file with the given collection.
    pub async fn save_all(&self, items: &[T]) -> Result<(), ServiceError> {
        let _guard = self.lock.write().await;
        self.write_file(items).await
    }

    /// Run a full load-modify-save cycle as one critical section.
    ///
    /// If `f` fails the file is left exactly as it was.
    pub async fn update_vec<F, R>(&self, f: F) -> Result<R, ServiceError>
    where
        F: FnOnce(&mut Vec<T>) -> Result<R, ServiceError>,
    {
        let _guard = self.lock.write().await;
        let mut items = match self.read_file().await {
            Ok(items) => items,
            Err(err) => {
                if self.policy == RecoveryPolicy::FailFast {
                    return Err(err);
                }
                warn!(file = %self.file_path.display(), error = %err, "backing file unreadable; treating as empty");
                Vec::new()
            }
        };
        let out = f(&mut items)?;
        self.write_file(&items).await?;
        Ok(out)
    }

    async fn recover(&self, err: ServiceError) -> Result<Vec<T>, ServiceError> {
        if self.policy == RecoveryPolicy::FailFast {
            return Err(err);
        }
        let _guard = self.lock.write().await;
        // Another task may have repaired the file while we waited.
        if let Ok(items) = self.read_file().await {
            return Ok(items);
        }
        warn!(file = %self.file_path.display(), error = %err, "backing file unreadable; resetting to empty collection");
        self.write_file(&[]).await?;
        Ok(Vec::new())
    }

    async fn read_file(&self) -> Result<Vec<T>, ServiceError> {
        let bytes = fs::read(&self.file_path)
            .await
            .map_err(|e| ServiceError::Io(e.to_string()))?;
        serde_json::from_slice(&bytes).map_err(|e| ServiceError::Io(e.to_string()))
    }

    async fn write_file(&self, items: &[T]) -> Result<(), ServiceError> {
        fs::write(&self.file_path, encode(items)?)
            .await
            .map_err(|e| ServiceError::Io(e.to_string()))
    }
}

fn encode<T: serde::Serialize>(items: &[T]) -> Result<Vec<u8>, ServiceError> {
    // Pretty-printed with stable struct field order, so the file both
    // round-trips byte-for-byte and stays readable by hand.
    serde_json::to_vec_pretty(items).map_err(|e| ServiceError::Io(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tmp_path(tag: &str) -> PathBuf {
        std::env::temp_dir().join(format!("json_array_store_{}_{}.json", tag, uuid::Uuid::new_v4()))
    }

    #[tokio::test]
    async fn init_creates_empty_file_and_load_persists() -> Result<(), anyhow::Error> {
        let tmp = tmp_path("init");
        let store = JsonArrayStore::<String>::new(&tmp, RecoveryPolicy::RecoverToEmpty).await?;

        // initially empty, and the file itself holds a valid empty array
        assert_eq!(store.load_all().await?.len(), 0);
        assert_eq!(tokio::fs::read_to_string(&tmp).await?.trim(), "[]");

        store.save_all(&["a".to_string(), "b".to_string()]).await?;
        assert_eq!(store.load_all().await?, vec!["a".to_string(), "b".to_string()]);

        // reload from disk to ensure persistence
        let reloaded = JsonArrayStore::<String>::new(&tmp, RecoveryPolicy::RecoverToEmpty).await?;
        assert_eq!(reloaded.load_all().await?.len(), 2);

        let _ = tokio::fs::remove_file(&tmp).await;
        Ok(())
    }

    #[tokio::test]
    async fn load_all_is_idempotent() -> Result<(), anyhow::Error> {
        let tmp = tmp_path("idem");
        let store = JsonArrayStore::<String>::new(&tmp, RecoveryPolicy::RecoverToEmpty).await?;
        store.save_all(&["x".to_string()]).await?;

        let first = store.load_all().await?;
        let second = store.load_all().await?;
        assert_eq!(first, second);

        let _ = tokio::fs::remove_file(&tmp).await;
        Ok(())
    }

    #[tokio::test]
    async fn corrupt_file_recovers_to_empty_and_repairs() -> Result<(), anyhow::Error> {
        let tmp = tmp_path("recover");
        let store = JsonArrayStore::<String>::new(&tmp, RecoveryPolicy::RecoverToEmpty).await?;
        store.save_all(&["a".to_string()]).await?;

        tokio::fs::write(&tmp, b"{not valid json").await?;
        assert_eq!(store.load_all().await?.len(), 0);
        // repair side effect: file reset to a valid empty collection
        assert_eq!(tokio::fs::read_to_string(&tmp).await?.trim(), "[]");

        let _ = tokio::fs::remove_file(&tmp).await;
        Ok(())
    }

    #[tokio::test]
    async fn corrupt_file_fail_fast_errors_and_leaves_file() -> Result<(), anyhow::Error> {
        let tmp = tmp_path("failfast");
        let store = JsonArrayStore::<String>::new(&tmp, RecoveryPolicy::FailFast).await?;

        tokio::fs::write(&tmp, b"{not valid json").await?;
        assert!(matches!(store.load_all().await, Err(ServiceError::Io(_))));
        assert_eq!(tokio::fs::read_to_string(&tmp).await?, "{not valid json");

        // mutations refuse to run on a corrupt file too
        let res = store.update_vec(|items| { items.push("a".into()); Ok(()) }).await;
        assert!(matches!(res, Err(ServiceError::Io(_))));
        assert_eq!(tokio::fs::read_to_string(&tmp).await?, "{not valid json");

        let _ = tokio::fs::remove_file(&tmp).await;
        Ok(())
    }

    #[tokio::test]
    async fn failed_mutation_leaves_file_unchanged() -> Result<(), anyhow::Error> {
        let tmp = tmp_path("nomut");
        let store = JsonArrayStore::<String>::new(&tmp, RecoveryPolicy::RecoverToEmpty).await?;
        store.save_all(&["a".to_string()]).await?;
        let before = tokio::fs::read(&tmp).await?;

        let res: Result<(), ServiceError> = store
            .update_vec(|_| Err(ServiceError::not_found("thing")))
            .await;
        assert!(matches!(res, Err(ServiceError::NotFound(_))));
        assert_eq!(tokio::fs::read(&tmp).await?, before);

        let _ = tokio::fs::remove_file(&tmp).await;
        Ok(())
    }

    #[tokio::test]
    async fn concurrent_mutations_do_not_lose_updates() -> Result<(), anyhow::Error> {
        let tmp = tmp_path("race");
        let store = JsonArrayStore::<u32>::new(&tmp, RecoveryPolicy::RecoverToEmpty).await?;

        let mut handles = Vec::new();
        for i in 0..16u32 {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                store.update_vec(move |items| { items.push(i); Ok(()) }).await
            }));
        }
        for h in handles {
            h.await.expect("join")?;
        }
        assert_eq!(store.load_all().await?.len(), 16);

        let _ = tokio::fs::remove_file(&tmp).await;
        Ok(())
    }
}
