use anyhow::Context;
use dashmap::DashMap;
use once_cell::sync::Lazy;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

static FILE_LOCKS: Lazy<DashMap<PathBuf, Arc<Mutex<()>>>> = Lazy::new(DashMap::new);

/// Holds exclusive access to one JSON file for a whole read-modify-write.
pub async fn lock_file(path: &Path) -> OwnedMutexGuard<()> {
    let lock = FILE_LOCKS
        .entry(path.to_path_buf())
        .or_default()
        .value()
        .clone();
    lock.lock_owned().await
}

pub async fn load<T>(path: &Path) -> anyhow::Result<T>
where
    T: DeserializeOwned + Default,
{
    match tokio::fs::read(path).await {
        Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => Ok(T::default()),
        Ok(bytes) => serde_json::from_slice::<T>(&bytes)
            .with_context(|| format!("Failed to deserialize {}", path.display())),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(T::default()),
        Err(e) => Err(e).with_context(|| format!("Failed to read {}", path.display())),
    }
}

/// Replaces the whole file with `value`. The document is written next to the
/// target first and renamed over it, so readers never observe a partial file.
pub async fn save<T>(path: &Path, value: &T) -> anyhow::Result<()>
where
    T: Serialize,
{
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }

    let serialized = serde_json::to_vec_pretty(value)?;
    let mut temporary = path.as_os_str().to_owned();
    temporary.push(".tmp");
    let temporary = PathBuf::from(temporary);

    tokio::fs::write(&temporary, serialized)
        .await
        .with_context(|| format!("Failed to write {}", temporary.display()))?;
    tokio::fs::rename(&temporary, path)
        .await
        .with_context(|| format!("Failed to replace {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn temporary_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("pointbot-store-{}", uuid::Uuid::new_v4()))
            .join(name)
    }

    #[tokio::test]
    async fn missing_file_loads_as_empty() {
        let path = temporary_path("users.json");
        let loaded = load::<HashMap<String, i64>>(&path).await.unwrap();
        assert!(loaded.is_empty());
    }

    #[tokio::test]
    async fn save_overwrites_the_whole_document() {
        let path = temporary_path("users.json");
        let mut first = HashMap::new();
        first.insert("1".to_string(), 10i64);
        first.insert("2".to_string(), 20i64);
        save(&path, &first).await.unwrap();

        let mut second = HashMap::new();
        second.insert("3".to_string(), 30i64);
        save(&path, &second).await.unwrap();

        let loaded = load::<HashMap<String, i64>>(&path).await.unwrap();
        assert_eq!(loaded, second);
        assert!(!path.with_file_name("users.json.tmp").exists());
    }

    #[tokio::test]
    async fn corrupt_file_is_an_error() {
        let path = temporary_path("users.json");
        tokio::fs::create_dir_all(path.parent().unwrap()).await.unwrap();
        tokio::fs::write(&path, b"{ not json").await.unwrap();
        assert!(load::<HashMap<String, i64>>(&path).await.is_err());
    }

    #[tokio::test]
    async fn locked_updates_do_not_lose_writes() {
        let path = temporary_path("counter.json");
        let tasks = (0..16)
            .map(|_| {
                let path = path.clone();
                tokio::spawn(async move {
                    let _guard = lock_file(&path).await;
                    let mut counters = load::<HashMap<String, i64>>(&path).await.unwrap();
                    *counters.entry("hits".to_string()).or_default() += 1;
                    tokio::task::yield_now().await;
                    save(&path, &counters).await.unwrap();
                })
            })
            .collect::<Vec<_>>();
        for task in futures::future::join_all(tasks).await {
            task.unwrap();
        }

        let counters = load::<HashMap<String, i64>>(&path).await.unwrap();
        assert_eq!(counters.get("hits"), Some(&16));
    }
}
