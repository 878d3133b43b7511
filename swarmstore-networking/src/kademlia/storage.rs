// Copyright (c) 2026 The Swarmstore Authors.
//
// This software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the software is distributed
// under the GPL Licence on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND,
// either express or implied. Please review the Licence for the specific language governing
// permissions and limitations under the Licence.

//! Key-value storage with a republish/expiry clock per entry. Each of a
//! node's three tiers (origin, replicate, cache) is one of these, ticked by
//! its own maintenance timer with its own republish/expire intervals.

use std::collections::HashMap;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::time::Instant;

struct StoredValue {
    value: String,
    republished_at: Instant,
    expire_after: Duration,
}

#[derive(Default)]
pub struct Storage {
    inner: RwLock<HashMap<String, StoredValue>>,
}

impl Storage {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, key: &str) -> Option<String> {
        self.inner.read().await.get(key).map(|v| v.value.clone())
    }

    pub async fn put(&self, key: String, value: String, expire_after: Duration) {
        self.inner.write().await.insert(
            key,
            StoredValue { value, republished_at: Instant::now(), expire_after },
        );
    }

    pub async fn remove(&self, key: &str) {
        self.inner.write().await.remove(key);
    }

    pub async fn touch(&self, key: &str) {
        if let Some(v) = self.inner.write().await.get_mut(key) {
            v.republished_at = Instant::now();
        }
    }

    pub async fn snapshot(&self) -> Vec<(String, String)> {
        self.inner.read().await.iter().map(|(k, v)| (k.clone(), v.value.clone())).collect()
    }

    /// Entries whose last republish is older than `interval`; touches them
    /// in the same pass so a slow caller doesn't requeue the same entry on
    /// the next tick before the round trip completes.
    pub async fn take_due_for_republish(&self, interval: Duration) -> Vec<(String, String)> {
        let mut guard = self.inner.write().await;
        let mut due = Vec::new();
        for (key, stored) in guard.iter_mut() {
            if stored.republished_at.elapsed() >= interval {
                due.push((key.clone(), stored.value.clone()));
                stored.republished_at = Instant::now();
            }
        }
        due
    }

    pub async fn expire(&self) {
        let mut guard = self.inner.write().await;
        guard.retain(|_, v| v.republished_at.elapsed() < v.expire_after);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn put_then_get_round_trips() {
        let storage = Storage::new();
        storage.put("k".into(), "v".into(), Duration::from_secs(60)).await;
        assert_eq!(storage.get("k").await, Some("v".to_string()));
        assert_eq!(storage.get("missing").await, None);
    }

    #[tokio::test]
    async fn expire_removes_only_elapsed_entries() {
        let storage = Storage::new();
        storage.put("soon".into(), "v".into(), Duration::from_millis(0)).await;
        storage.put("later".into(), "v".into(), Duration::from_secs(60)).await;
        tokio::time::sleep(Duration::from_millis(5)).await;
        storage.expire().await;
        assert_eq!(storage.get("soon").await, None);
        assert_eq!(storage.get("later").await, Some("v".to_string()));
    }
}
