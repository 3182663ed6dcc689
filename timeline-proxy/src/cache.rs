use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;

use log::debug;
use tokio::sync::RwLock;
use tokio::task;
use tokio::time::{sleep, Duration};

#[derive(Debug, Clone, Copy)]
pub struct Config {
    pub enabled: bool,
    pub ttl: Duration,
}

/// Snapshots keyed by source, each dropped `ttl` after it was stored.
pub struct Cache<K, V> {
    enabled: bool,
    inner: RwLock<HashMap<K, Arc<V>>>,
    ttl: Duration,
}

impl<K, V> Cache<K, V>
where
    K: Clone + Eq + Hash + Send + Sync + 'static,
    V: Send + Sync + 'static,
{
    pub fn new(config: Config) -> Arc<Self> {
        Arc::new(Self {
            enabled: config.enabled,
            ttl: config.ttl,
            inner: Default::default(),
        })
    }

    /// Stores `value` (replacing any previous entry) and hands it back shared.
    pub async fn insert(self: Arc<Self>, key: K, value: V) -> Arc<V> {
        let arcd = Arc::new(value);
        if !self.enabled {
            return arcd;
        }

        self.inner
            .write()
            .await
            .insert(key.clone(), Arc::clone(&arcd));

        let self_clone = Arc::clone(&self);
        let stored = Arc::clone(&arcd);
        task::spawn(async move {
            sleep(self_clone.ttl).await;
            let mut inner = self_clone.inner.write().await;
            // A newer insert for the same key owns the slot now.
            if inner.get(&key).is_some_and(|current| Arc::ptr_eq(current, &stored)) {
                inner.remove(&key);
                debug!("Cache entry expired");
            }
        });

        arcd
    }

    pub async fn get(&self, key: &K) -> Option<Arc<V>> {
        if !self.enabled {
            return None;
        }

        self.inner.read().await.get(key).map(Arc::clone)
    }
}
