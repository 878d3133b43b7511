// Copyright (c) 2026 The Swarmstore Authors.
//
// This software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the software is distributed
// under the GPL Licence on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND,
// either express or implied. Please review the Licence for the specific language governing
// permissions and limitations under the Licence.

//! The Chord engine: ring identity, successor list, finger table,
//! stabilisation, predecessor notification, join/leave data transfer, and
//! the put/get/delete resolver.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use swarmstore_protocol::{contains, Bound, Identifier};
use swarmstore_protocol::{DhtError, NIL};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::config::ChordConfig;
use crate::error::Result as NetResult;
use crate::rpc::{self as substrate, RpcServer};
use swarmstore_logging::Marker;

use super::rpc::{self as chord_rpc, call_remote};
use super::state::RingState;
use super::store::ChordStore;

pub struct ChordEngine {
    pub(super) addr: String,
    pub(super) id: Identifier,
    pub(super) ring: RingState,
    pub(super) store: ChordStore,
    online: AtomicBool,
    quit_tx: broadcast::Sender<()>,
}

impl ChordEngine {
    pub fn new(addr: impl Into<String>) -> Arc<Self> {
        let addr = addr.into();
        let id = Identifier::hash(&addr);
        let (quit_tx, _) = broadcast::channel(ChordConfig::SUCC_LIST_LEN.max(1));
        Arc::new(ChordEngine {
            ring: RingState::new(&addr),
            id,
            addr,
            store: ChordStore::new(),
            online: AtomicBool::new(false),
            quit_tx,
        })
    }

    pub fn addr(&self) -> &str {
        &self.addr
    }

    pub fn id(&self) -> Identifier {
        self.id
    }

    pub fn is_online(&self) -> bool {
        self.online.load(Ordering::SeqCst)
    }

    pub async fn ping(&self, addr: &str) -> bool {
        substrate::ping(addr, ChordConfig::PING_ATTEMPTS, ChordConfig::PING_TIMEOUT).await
    }

    /// Bind the listener and start serving. Idempotent: calling `run` again
    /// while already listening is a no-op at the façade layer (the façade
    /// tracks whether `run` succeeded before); here we simply bind and
    /// spawn the accept loop every time we're asked, which is how
    /// `Initialize`/`Run` are kept separate from `Create`/`Join`.
    pub async fn run(self: &Arc<Self>) -> std::io::Result<std::net::SocketAddr> {
        let server = RpcServer::bind(&self.addr).await?;
        let local_addr = server.local_addr();
        let handler = Arc::new(chord_rpc::ChordRpcHandler { engine: self.clone() });
        let quit_rx = self.quit_tx.subscribe();
        tokio::spawn(server.serve(handler, quit_rx));
        Ok(local_addr)
    }

    // ---------- RPC-addressable methods ----------

    pub async fn get_predecessor(&self) -> String {
        self.ring.predecessor().await
    }

    pub async fn get_succ_list(&self) -> [String; ChordConfig::SUCC_LIST_LEN] {
        self.ring.successor_list().await
    }

    /// Walk the successor list, returning the first entry that answers a
    /// ping. An entirely dead list surfaces `NoAvailableSuccessor`.
    pub async fn get_successor(&self) -> std::result::Result<String, DhtError> {
        let list = self.ring.successor_list().await;
        for succ in list {
            if substrate::ping(&succ, ChordConfig::PING_ATTEMPTS, ChordConfig::PING_TIMEOUT).await {
                return Ok(succ);
            }
        }
        warn!(addr = %self.addr, "no available successor in the list");
        Err(DhtError::NoAvailableSuccessor)
    }

    /// `FindSuccessor(id)`: returns successor if `id` falls in `(self, succ]`,
    /// else forwards to the closest preceding finger.
    pub async fn find_successor(&self, target: Identifier) -> std::result::Result<String, DhtError> {
        let succ = self.get_successor().await?;
        if contains(&target, &self.id, &Identifier::hash(&succ), Bound::LeftOpen) {
            return Ok(succ);
        }
        let next = self.closest_preceding_finger(target).await?;
        if next == self.addr {
            // No peer strictly closer than ourselves answered; the ring is
            // effectively just us.
            return Ok(succ);
        }
        call_remote(&next, chord_rpc::METHOD_FIND_SUCCESSOR, &target)
            .await
            .map_err(DhtError::from)
    }

    /// Scan the finger table from the far end down, returning the first
    /// live entry strictly between self and target; falls back to the
    /// successor list.
    async fn closest_preceding_finger(&self, target: Identifier) -> std::result::Result<String, DhtError> {
        let fingers = self.ring.finger_snapshot().await;
        for candidate in fingers.iter().rev() {
            if candidate == &self.addr {
                continue;
            }
            if substrate::ping(candidate, ChordConfig::PING_ATTEMPTS, ChordConfig::PING_TIMEOUT).await
                && contains(&Identifier::hash(candidate), &self.id, &target, Bound::Open)
            {
                return Ok(candidate.clone());
            }
        }
        self.get_successor().await
    }

    /// Executed by the node whose successor has just called in asking it
    /// to become the newcomer's predecessor's new home: hand over the
    /// subset of data the newcomer now owns.
    pub async fn transfer_join(&self, newcomer: String) -> std::result::Result<(), DhtError> {
        let succ = self.get_successor().await?;

        let backup_snapshot = self.store.copy_backup().await;
        if let Err(err) = remote_unit(&newcomer, chord_rpc::METHOD_SET_BACKUP, &backup_snapshot).await {
            warn!(addr = %self.addr, %err, "transfer data after join warning");
        }

        let newcomer_id = Identifier::hash(&newcomer);
        let self_id = self.id;
        let transferred = self
            .store
            .filter_data(|k| !contains(&Identifier::hash(k), &self_id, &newcomer_id, Bound::LeftOpen))
            .await;

        if let Err(err) = remote_unit(&newcomer, chord_rpc::METHOD_SET_DATA, &transferred).await {
            warn!(addr = %self.addr, %err, "transfer data after join warning");
        }
        self.store.set_backup(transferred).await;

        let data_snapshot = self.store.copy_data().await;
        if let Err(err) = remote_unit(&succ, chord_rpc::METHOD_SET_BACKUP, &data_snapshot).await {
            warn!(addr = %self.addr, %err, "transfer data after join warning");
        }
        Ok(())
    }

    /// Local-only: executed by a node that has just discovered its old
    /// predecessor is dead and is adopting `p` as the new one. Folds its
    /// backup into its data (the data it was backing up for the dead node
    /// is now its own responsibility), pushes the merged data to its
    /// successor's backup, and pulls `p`'s data into its own backup.
    async fn transfer_quit(&self, p: String) {
        let succ = match self.get_successor().await {
            Ok(succ) => succ,
            Err(err) => {
                warn!(addr = %self.addr, %err, "transfer data after quit failed");
                return;
            }
        };

        let backup_snapshot = self.store.copy_backup().await;
        self.store.append_data(backup_snapshot).await;

        let data_snapshot = self.store.copy_data().await;
        if let Err(err) = remote_unit(&succ, chord_rpc::METHOD_SET_BACKUP, &data_snapshot).await {
            warn!(addr = %self.addr, %err, "transfer data after quit warning");
        }

        self.store.set_backup(HashMap::new()).await;
        if !p.is_empty() {
            match call_remote::<_, HashMap<String, String>>(&p, chord_rpc::METHOD_COPY_DATA, &()).await {
                Ok(pred_data) => self.store.set_backup(pred_data).await,
                Err(err) => warn!(addr = %self.addr, %err, "transfer data after quit warning"),
            }
        }
    }

    /// `Notify(p)`: accept `p` as predecessor if our current one is dead, or
    /// if `p` is strictly closer than our current predecessor.
    pub async fn notify(&self, p: String) {
        let pred = self.ring.predecessor().await;
        let pred_alive = substrate::ping(&pred, ChordConfig::PING_ATTEMPTS, ChordConfig::PING_TIMEOUT).await;
        if !pred_alive {
            self.ring.set_predecessor(p.clone()).await;
            Marker::PredecessorChanged { addr: &self.addr, new_predecessor: &p }.log();
            self.transfer_quit(p).await;
        } else if contains(&Identifier::hash(&p), &Identifier::hash(&pred), &self.id, Bound::Open) {
            self.ring.set_predecessor(p.clone()).await;
            Marker::PredecessorChanged { addr: &self.addr, new_predecessor: &p }.log();
        }
    }

    /// Local: `finger[0]`/`succList[0]` <- succ, then pull the rest of
    /// succ's own successor list to refresh `succList[1..]`.
    async fn update_successor(&self, succ: String) {
        self.ring.set_finger(0, succ.clone()).await;
        self.ring.set_successor_head(succ.clone()).await;
        Marker::SuccessorChanged { addr: &self.addr, new_successor: &succ }.log();
        if succ != self.addr {
            if let Ok(list) = call_remote::<_, [String; ChordConfig::SUCC_LIST_LEN]>(
                &succ,
                chord_rpc::METHOD_GET_SUCC_LIST,
                &(),
            )
            .await
            {
                let mut current = self.ring.successor_list().await;
                current[0] = succ;
                for i in 1..ChordConfig::SUCC_LIST_LEN {
                    current[i] = list[i - 1].clone();
                }
                self.ring.set_successor_list(current).await;
            }
        }
    }

    async fn update_predecessor(&self, pred: String) {
        self.ring.set_predecessor(pred).await;
    }

    /// Stabilisation tick: adopt the successor's predecessor if it is a
    /// closer fit, then notify the (possibly new) successor of ourselves.
    async fn stabilise(&self) {
        let succ = match self.get_successor().await {
            Ok(succ) => succ,
            Err(err) => {
                warn!(addr = %self.addr, %err, "stabilise failed");
                return;
            }
        };
        let mut effective_succ = succ.clone();
        if let Ok(candidate) = call_remote::<_, String>(&succ, chord_rpc::METHOD_GET_PREDECESSOR, &()).await {
            if substrate::ping(&candidate, ChordConfig::PING_ATTEMPTS, ChordConfig::PING_TIMEOUT).await
                && contains(&Identifier::hash(&candidate), &self.id, &Identifier::hash(&succ), Bound::Open)
            {
                effective_succ = candidate;
            }
        }
        self.update_successor(effective_succ.clone()).await;
        if let Err(err) = remote_unit(&effective_succ, chord_rpc::METHOD_NOTIFY, &self.addr).await {
            debug!(addr = %self.addr, %err, "notify failed");
        }
    }

    async fn fix_finger(&self, index: usize) {
        let target = self.id.add_pow2(index as u32);
        if let Ok(next) = self.find_successor(target).await {
            self.ring.set_finger(index, next).await;
        }
    }

    fn maintain(self: &Arc<Self>) {
        let stabiliser = self.clone();
        let mut quit_rx = self.quit_tx.subscribe();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(ChordConfig::STABILISE_PERIOD);
            loop {
                tokio::select! {
                    _ = quit_rx.recv() => return,
                    _ = ticker.tick() => stabiliser.stabilise().await,
                }
            }
        });

        let fixer = self.clone();
        let mut quit_rx = self.quit_tx.subscribe();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(ChordConfig::FIX_FINGER_PERIOD);
            let mut index = 0usize;
            loop {
                tokio::select! {
                    _ = quit_rx.recv() => return,
                    _ = ticker.tick() => {
                        fixer.fix_finger(index).await;
                        index = (index + 1) % ChordConfig::M as usize;
                    }
                }
            }
        });
    }

    async fn init_finger_table(&self, succ: String) {
        self.ring.set_finger(0, succ.clone()).await;
        let mut prev = succ;
        for i in 1..ChordConfig::M as usize {
            let start = self.id.add_pow2(i as u32);
            if contains(&start, &self.id, &Identifier::hash(&prev), Bound::RightOpen) {
                self.ring.set_finger(i, prev.clone()).await;
            } else if let Ok(next) = call_remote::<_, String>(&prev, chord_rpc::METHOD_FIND_SUCCESSOR, &start).await
            {
                self.ring.set_finger(i, next.clone()).await;
                prev = next;
            }
        }
    }

    // ---------- lifecycle ----------

    pub async fn create(self: &Arc<Self>) -> bool {
        if self.online.load(Ordering::SeqCst) {
            info!(addr = %self.addr, "create failed, node already in the network");
            return false;
        }
        self.update_successor(self.addr.clone()).await;
        self.update_predecessor(self.addr.clone()).await;
        for i in 0..ChordConfig::M as usize {
            self.ring.set_finger(i, self.addr.clone()).await;
        }
        self.online.store(true, Ordering::SeqCst);
        Marker::NodeOnline(&self.addr).log();
        self.maintain();
        true
    }

    pub async fn join(self: &Arc<Self>, bootstrap: &str) -> bool {
        if self.online.load(Ordering::SeqCst) {
            info!(addr = %self.addr, "join failed, node already in the network");
            return false;
        }
        let succ = match call_remote::<_, String>(bootstrap, chord_rpc::METHOD_FIND_SUCCESSOR, &self.id).await {
            Ok(succ) => succ,
            Err(err) => {
                warn!(addr = %self.addr, %err, "join failed: bootstrap unreachable");
                return false;
            }
        };
        if succ != self.addr {
            if let Err(err) = remote_unit(&succ, chord_rpc::METHOD_TRANSFER_JOIN, &self.addr).await {
                warn!(addr = %self.addr, %err, "transfer join failed");
            }
        }
        self.update_successor(succ.clone()).await;
        self.update_predecessor(NIL.to_string()).await;
        self.init_finger_table(succ).await;
        self.online.store(true, Ordering::SeqCst);
        Marker::NodeOnline(&self.addr).log();
        self.maintain();
        true
    }

    pub async fn quit(&self) {
        if !self.online.load(Ordering::SeqCst) {
            info!(addr = %self.addr, "quit failed, node already left the network");
            return;
        }
        let pred = self.ring.predecessor().await;
        self.shutdown();
        if let Ok(succ) = self.get_successor().await {
            if let Err(err) = remote_unit(&succ, chord_rpc::METHOD_NOTIFY, &pred).await {
                debug!(addr = %self.addr, %err, "quit notify failed");
            }
        }
        self.ring.reset(&self.addr).await;
        self.store.reset().await;
    }

    pub async fn force_quit(&self) {
        if !self.online.load(Ordering::SeqCst) {
            info!(addr = %self.addr, "force quit failed, node already left the network");
            return;
        }
        self.shutdown();
        self.ring.reset(&self.addr).await;
        self.store.reset().await;
    }

    fn shutdown(&self) {
        self.online.store(false, Ordering::SeqCst);
        let _ = self.quit_tx.send(());
        Marker::NodeOffline(&self.addr).log();
    }

    // ---------- data ops ----------

    pub async fn put(&self, key: String, value: String) -> bool {
        let owner = match self.find_successor(Identifier::hash(&key)).await {
            Ok(owner) => owner,
            Err(err) => {
                warn!(addr = %self.addr, %key, %err, "put failed");
                return false;
            }
        };
        let pair = swarmstore_protocol::DataPair::new(key.clone(), value.clone());
        if let Err(err) = remote_unit(&owner, chord_rpc::METHOD_PUT_DATA, &pair).await {
            warn!(addr = %self.addr, %key, %err, "put data failed");
            return false;
        }
        let next = match call_remote::<_, String>(&owner, chord_rpc::METHOD_GET_SUCCESSOR, &()).await {
            Ok(next) => next,
            Err(err) => {
                warn!(addr = %self.addr, %key, %err, "put backup failed: no successor");
                return false;
            }
        };
        if let Err(err) = remote_unit(&next, chord_rpc::METHOD_PUT_BACKUP, &pair).await {
            warn!(addr = %self.addr, %key, %err, "put backup failed");
            return false;
        }
        true
    }

    pub async fn get(&self, key: &str) -> (bool, String) {
        let owner = match self.find_successor(Identifier::hash(key)).await {
            Ok(owner) => owner,
            Err(err) => {
                warn!(addr = %self.addr, %key, %err, "get failed");
                return (false, String::new());
            }
        };
        match call_remote::<_, (bool, String)>(&owner, chord_rpc::METHOD_GET_DATA, &key.to_string()).await {
            Ok(result) => result,
            Err(err) => {
                warn!(addr = %self.addr, %key, %err, "get failed");
                (false, String::new())
            }
        }
    }

    pub async fn delete(&self, key: &str) -> bool {
        let owner = match self.find_successor(Identifier::hash(key)).await {
            Ok(owner) => owner,
            Err(err) => {
                warn!(addr = %self.addr, %key, %err, "delete failed");
                return false;
            }
        };
        if let Err(err) = remote_unit(&owner, chord_rpc::METHOD_DELETE_DATA, &key.to_string()).await {
            warn!(addr = %self.addr, %key, %err, "delete data failed");
            return false;
        }
        let next = match call_remote::<_, String>(&owner, chord_rpc::METHOD_GET_SUCCESSOR, &()).await {
            Ok(next) => next,
            Err(err) => {
                warn!(addr = %self.addr, %key, %err, "delete backup failed: no successor");
                return false;
            }
        };
        if let Err(err) = remote_unit(&next, chord_rpc::METHOD_DELETE_BACKUP, &key.to_string()).await {
            warn!(addr = %self.addr, %key, %err, "delete backup failed");
            return false;
        }
        true
    }
}

async fn remote_unit<Req>(addr: &str, method: &str, req: &Req) -> NetResult<()>
where
    Req: serde::Serialize,
{
    call_remote::<_, ()>(addr, method, req).await
}
