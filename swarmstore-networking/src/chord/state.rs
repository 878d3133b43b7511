// Copyright (c) 2026 The Swarmstore Authors.
//
// This software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the software is distributed
// under the GPL Licence on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND,
// either express or implied. Please review the Licence for the specific language governing
// permissions and limitations under the Licence.

//! Mutable ring state: successor list, predecessor, finger table. Three
//! separate reader-writer locks, one per logical field group, matching the
//! original three-lock layout (`succLock`/`predLock`/`fingerLock`).

use tokio::sync::RwLock;

use super::super::config::ChordConfig;
use swarmstore_protocol::NIL;

pub struct RingState {
    successors: RwLock<[String; ChordConfig::SUCC_LIST_LEN]>,
    predecessor: RwLock<String>,
    finger: RwLock<Vec<String>>,
}

impl RingState {
    pub fn new(self_addr: &str) -> Self {
        RingState {
            successors: RwLock::new(std::array::from_fn(|_| NIL.to_string())),
            predecessor: RwLock::new(NIL.to_string()),
            finger: RwLock::new(vec![self_addr.to_string(); ChordConfig::M as usize]),
        }
    }

    pub async fn reset(&self, self_addr: &str) {
        *self.successors.write().await = std::array::from_fn(|_| NIL.to_string());
        *self.predecessor.write().await = NIL.to_string();
        *self.finger.write().await = vec![self_addr.to_string(); ChordConfig::M as usize];
    }

    pub async fn successor_list(&self) -> [String; ChordConfig::SUCC_LIST_LEN] {
        self.successors.read().await.clone()
    }

    pub async fn set_successor_list(&self, list: [String; ChordConfig::SUCC_LIST_LEN]) {
        *self.successors.write().await = list;
    }

    pub async fn set_successor_head(&self, succ: String) {
        let mut guard = self.successors.write().await;
        guard[0] = succ;
    }

    pub async fn predecessor(&self) -> String {
        self.predecessor.read().await.clone()
    }

    pub async fn set_predecessor(&self, pred: String) {
        *self.predecessor.write().await = pred;
    }

    pub async fn finger(&self, index: usize) -> String {
        self.finger.read().await[index].clone()
    }

    pub async fn set_finger(&self, index: usize, addr: String) {
        self.finger.write().await[index] = addr;
    }

    pub async fn finger_snapshot(&self) -> Vec<String> {
        self.finger.read().await.clone()
    }
}
