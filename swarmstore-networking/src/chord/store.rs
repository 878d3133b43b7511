// Copyright (c) 2026 The Swarmstore Authors.
//
// This software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the software is distributed
// under the GPL Licence on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND,
// either express or implied. Please review the Licence for the specific language governing
// permissions and limitations under the Licence.

//! Local key-value storage for a Chord node: the `data` map (keys this node
//! owns) and the `backup` map (keys replicated from the predecessor, held
//! in case it disappears). Each map has its own lock so a read of one never
//! blocks a write of the other.

use std::collections::HashMap;

use tokio::sync::RwLock;

#[derive(Default)]
pub struct ChordStore {
    data: RwLock<HashMap<String, String>>,
    backup: RwLock<HashMap<String, String>>,
}

impl ChordStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn reset(&self) {
        *self.data.write().await = HashMap::new();
        *self.backup.write().await = HashMap::new();
    }

    pub async fn put_data(&self, key: String, value: String) {
        self.data.write().await.insert(key, value);
    }

    pub async fn put_backup(&self, key: String, value: String) {
        self.backup.write().await.insert(key, value);
    }

    /// Returns `(found, value)`; `value` is empty when not found, matching
    /// the wire contract's `(bool, string)` shape.
    pub async fn get_data(&self, key: &str) -> (bool, String) {
        match self.data.read().await.get(key) {
            Some(v) => (true, v.clone()),
            None => (false, String::new()),
        }
    }

    pub async fn get_backup(&self, key: &str) -> (bool, String) {
        match self.backup.read().await.get(key) {
            Some(v) => (true, v.clone()),
            None => (false, String::new()),
        }
    }

    pub async fn set_data(&self, map: HashMap<String, String>) {
        *self.data.write().await = map;
    }

    pub async fn set_backup(&self, map: HashMap<String, String>) {
        *self.backup.write().await = map;
    }

    pub async fn delete_data(&self, key: &str) {
        self.data.write().await.remove(key);
    }

    pub async fn delete_backup(&self, key: &str) {
        self.backup.write().await.remove(key);
    }

    pub async fn append_data(&self, entries: HashMap<String, String>) {
        self.data.write().await.extend(entries);
    }

    pub async fn append_backup(&self, entries: HashMap<String, String>) {
        self.backup.write().await.extend(entries);
    }

    /// Removes and returns every entry of `data` for which `keep` is
    /// false, leaving only entries `keep` accepts.
    pub async fn filter_data(&self, keep: impl Fn(&str) -> bool) -> HashMap<String, String> {
        let mut guard = self.data.write().await;
        let mut extracted = HashMap::new();
        guard.retain(|k, v| {
            if keep(k) {
                true
            } else {
                extracted.insert(k.clone(), v.clone());
                false
            }
        });
        extracted
    }

    pub async fn copy_data(&self) -> HashMap<String, String> {
        self.data.read().await.clone()
    }

    pub async fn copy_backup(&self) -> HashMap<String, String> {
        self.backup.read().await.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn put_then_get_round_trips() {
        let store = ChordStore::new();
        store.put_data("k".into(), "v".into()).await;
        assert_eq!(store.get_data("k").await, (true, "v".to_string()));
        assert_eq!(store.get_data("missing").await, (false, String::new()));
    }

    #[tokio::test]
    async fn filter_data_extracts_non_matching_entries() {
        let store = ChordStore::new();
        store.put_data("a".into(), "1".into()).await;
        store.put_data("b".into(), "2".into()).await;
        let extracted = store.filter_data(|k| k == "a").await;
        assert_eq!(extracted.get("b"), Some(&"2".to_string()));
        assert_eq!(store.get_data("a").await, (true, "1".to_string()));
        assert_eq!(store.get_data("b").await, (false, String::new()));
    }
}
