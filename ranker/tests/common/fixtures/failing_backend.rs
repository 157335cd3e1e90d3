//! Store backend that refuses writes to selected keys

use anyhow::{bail, Result};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

use ranker::store::{KvBackend, MemoryBackend, SharedStore};

/// Wraps a memory backend and fails any write whose key ends with
/// `failing_suffix`. A failed batch writes nothing, like a rolled back
/// transaction.
pub struct FailingBackend {
    inner: Arc<MemoryBackend>,
    failing_suffix: String,
}

impl FailingBackend {
    pub fn new(inner: Arc<MemoryBackend>, failing_suffix: &str) -> Self {
        Self {
            inner,
            failing_suffix: failing_suffix.to_string(),
        }
    }

    fn check(&self, key: &str) -> Result<()> {
        if key.ends_with(&self.failing_suffix) {
            bail!("write to {} rejected", key);
        }
        Ok(())
    }
}

#[async_trait]
impl KvBackend for FailingBackend {
    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<()> {
        self.check(key)?;
        self.inner.set(key, value, ttl).await
    }

    async fn set_many(&self, entries: &[(String, String)]) -> Result<()> {
        for (key, _) in entries {
            self.check(key)?;
        }
        self.inner.set_many(entries).await
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        self.inner.get(key).await
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.inner.delete(key).await
    }
}

/// Shared store whose writes to keys ending in `failing_suffix` fail, plus
/// the memory backend underneath it for seeding and inspection
pub fn failing_store(failing_suffix: &str) -> (Arc<SharedStore>, Arc<MemoryBackend>) {
    let inner = Arc::new(MemoryBackend::new());
    let backend = Arc::new(FailingBackend::new(inner.clone(), failing_suffix));
    (Arc::new(SharedStore::new(backend, "")), inner)
}
