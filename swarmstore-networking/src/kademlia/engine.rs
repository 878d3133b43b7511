// Copyright (c) 2026 The Swarmstore Authors.
//
// This software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the software is distributed
// under the GPL Licence on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND,
// either express or implied. Please review the Licence for the specific language governing
// permissions and limitations under the Licence.

//! The Kademlia engine: routing table maintenance, the iterative lookup
//! driver, three-tier storage (origin/replicate/cache), and the background
//! refresh/republish/expire timers.

use std::collections::BinaryHeap;
use std::cmp::Reverse;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use swarmstore_protocol::Identifier;
use tokio::sync::{broadcast, Semaphore};
use tracing::{info, warn};

use crate::config::KademliaConfig;
use crate::rpc::{self as substrate, RpcServer};
use swarmstore_logging::Marker;

use super::contact::{Contact, ContactWithDistance};
use super::lookup::{LookupOutcome, Probe};
use super::routing_table::{AddOutcome, RoutingTable};
use super::rpc::{self as kad_rpc, KademliaRpcHandler};
use super::storage::Storage;

pub struct KademliaEngine {
    addr: String,
    pub router: RoutingTable,
    origin: Storage,
    replicate: Storage,
    cache: Storage,
    online: AtomicBool,
    quit_tx: broadcast::Sender<()>,
}

impl KademliaEngine {
    pub fn new(addr: impl Into<String>) -> Arc<Self> {
        let addr = addr.into();
        let (quit_tx, _) = broadcast::channel(8);
        Arc::new(KademliaEngine {
            router: RoutingTable::new(&addr),
            addr,
            origin: Storage::new(),
            replicate: Storage::new(),
            cache: Storage::new(),
            online: AtomicBool::new(false),
            quit_tx,
        })
    }

    pub fn addr(&self) -> &str {
        &self.addr
    }

    pub fn is_online(&self) -> bool {
        self.online.load(Ordering::SeqCst)
    }

    pub async fn run(self: &Arc<Self>) -> std::io::Result<std::net::SocketAddr> {
        let server = RpcServer::bind(&self.addr).await?;
        let local_addr = server.local_addr();
        let handler = Arc::new(KademliaRpcHandler { engine: self.clone() });
        let quit_rx = self.quit_tx.subscribe();
        tokio::spawn(server.serve(handler, quit_rx));
        Ok(local_addr)
    }

    // ---------- contact bookkeeping ----------

    async fn add_contact(&self, contact: Contact) {
        match self.router.add_contact(contact).await {
            AddOutcome::Done => {}
            AddOutcome::NeedsEvictionDecision { oldest, candidate } => {
                let alive = kad_rpc::rpc_ping(self.router.host.clone(), &oldest).await.is_ok();
                if !alive {
                    Marker::PeerUnreachable { addr: &oldest.addr }.log();
                }
                self.router.resolve_eviction(alive, oldest, candidate).await;
            }
        }
    }

    /// Forwards any replicate-tier entry this node is the closest known
    /// holder of to a contact the routing table hasn't seen before.
    async fn transfer_data_to_new_nodes(&self, sender: &Contact) {
        if self.router.contains_addr(&sender.addr).await {
            return;
        }
        let entries = self.replicate.snapshot().await;
        for (key, value) in entries {
            let key_id = Identifier::hash(&key);
            let self_dist = key_id.xor(&self.router.host.id);
            let should_push = match self.router.get_closest_distance(&key_id).await {
                Some(min_dist) => self_dist < min_dist,
                None => true,
            };
            if should_push {
                let _ = kad_rpc::rpc_store(
                    self.router.host.clone(),
                    sender,
                    &key,
                    &value,
                    false,
                    Duration::from_secs(0),
                )
                .await;
            }
        }
    }

    /// Pushes `(key, value)` to the contacts closest to `hash(key)`, doing a
    /// fresh lookup first if `enable_lookup` and the owning bucket is stale.
    async fn transfer_data_to_closer_nodes(&self, key: &str, value: &str, enable_lookup: bool) {
        let target = Identifier::hash(key);
        let contacts = if enable_lookup
            && self
                .router
                .find_bucket(&target)
                .await
                .map(|(_, touched_at)| touched_at.elapsed() >= KademliaConfig::REFRESH_INTERVAL)
                .unwrap_or(false)
        {
            self.lookup(target, Probe::FindNode).await.contacts
        } else {
            self.router.get_closest_contacts(&target, KademliaConfig::K).await
        };

        let semaphore = Arc::new(Semaphore::new(KademliaConfig::ALPHA));
        let mut handles = Vec::with_capacity(contacts.len());
        for cwd in contacts {
            let semaphore = semaphore.clone();
            let host = self.router.host.clone();
            let key = key.to_string();
            let value = value.to_string();
            handles.push(tokio::spawn(async move {
                let _permit = semaphore.acquire().await;
                let _ = kad_rpc::rpc_store(host, &cwd.contact, &key, &value, false, Duration::from_secs(0)).await;
            }));
        }
        for handle in handles {
            let _ = handle.await;
        }
    }

    // ---------- primitive (receiver-side) RPC handlers ----------

    pub async fn handle_ping(&self, sender: Contact) {
        self.transfer_data_to_new_nodes(&sender).await;
        self.add_contact(sender).await;
    }

    pub async fn handle_find_node(&self, sender: Contact, id: Identifier) -> Vec<ContactWithDistance> {
        self.transfer_data_to_new_nodes(&sender).await;
        self.add_contact(sender).await;
        self.router.get_closest_contacts(&id, KademliaConfig::K).await
    }

    pub async fn handle_find_value(&self, sender: Contact, key: String) -> LookupOutcome {
        self.transfer_data_to_new_nodes(&sender).await;
        self.add_contact(sender.clone()).await;
        if let Some(value) = self.replicate.get(&key).await {
            return LookupOutcome { found: true, found_by: Some(self.router.host.clone()), contacts: vec![], value: Some(value) };
        }
        if let Some(value) = self.cache.get(&key).await {
            return LookupOutcome { found: true, found_by: Some(self.router.host.clone()), contacts: vec![], value: Some(value) };
        }
        let contacts = self.router.get_closest_contacts(&Identifier::hash(&key), KademliaConfig::K).await;
        LookupOutcome { found: false, found_by: None, contacts, value: None }
    }

    pub async fn handle_store(&self, sender: Contact, key: String, value: String, cached: bool, expire: Duration) {
        if cached {
            self.cache.put(key, value, expire).await;
        } else {
            self.transfer_data_to_new_nodes(&sender).await;
            self.replicate.put(key, value, KademliaConfig::EXPIRE_TIME).await;
        }
        self.add_contact(sender).await;
    }

    // ---------- iterative lookup ----------

    /// Drives an iterative FIND_NODE/FIND_VALUE lookup toward `target`,
    /// seeded from the local routing table, bounded to α outstanding RPCs.
    async fn lookup(self: &Arc<Self>, target: Identifier, probe: Probe) -> LookupOutcome {
        let mut visited: HashSet<String> = HashSet::new();
        visited.insert(self.addr.clone());

        let mut frontier: BinaryHeap<Reverse<ContactWithDistance>> = BinaryHeap::new();
        for cwd in self.router.get_closest_contacts(&target, KademliaConfig::K).await {
            frontier.push(Reverse(cwd));
        }

        let mut shortlist: Vec<ContactWithDistance> = Vec::new();
        let (tx, mut rx) = tokio::sync::mpsc::channel::<LookupOutcome>(KademliaConfig::ALPHA);
        let mut in_flight = 0usize;

        let spawn_upto_alpha = |engine: &Arc<Self>,
                                 frontier: &mut BinaryHeap<Reverse<ContactWithDistance>>,
                                 visited: &mut HashSet<String>,
                                 in_flight: &mut usize,
                                 tx: &tokio::sync::mpsc::Sender<LookupOutcome>| {
            while *in_flight < KademliaConfig::ALPHA {
                let Some(Reverse(cwd)) = frontier.pop() else { break };
                if !visited.insert(cwd.contact.addr.clone()) {
                    continue;
                }
                *in_flight += 1;
                let engine = engine.clone();
                let probe = probe.clone();
                let tx = tx.clone();
                tokio::spawn(async move {
                    let result = match &probe {
                        Probe::FindNode => {
                            kad_rpc::rpc_find_node(engine.router.host.clone(), &cwd.contact, target).await
                        }
                        Probe::FindValue(key) => {
                            kad_rpc::rpc_find_value(engine.router.host.clone(), &cwd.contact, key).await
                        }
                    };
                    if let Ok(outcome) = result {
                        let _ = tx.send(outcome).await;
                    }
                });
            }
        };

        spawn_upto_alpha(self, &mut frontier, &mut visited, &mut in_flight, &tx);
        while in_flight > 0 {
            let received = tokio::time::timeout(KademliaConfig::LOOKUP_TIMEOUT, rx.recv()).await;
            match received {
                Ok(Some(outcome)) => {
                    if outcome.found {
                        let target_id = self.router.host.id;
                        let found_by = pick_closest_excluding(&shortlist, &outcome.found_by, &target_id);
                        return LookupOutcome { found: true, found_by: Some(found_by), contacts: vec![], value: outcome.value };
                    }
                    for cwd in outcome.contacts {
                        if !visited.contains(&cwd.contact.addr) {
                            shortlist.push(cwd.clone());
                            frontier.push(Reverse(cwd));
                        }
                    }
                }
                Ok(None) => {}
                Err(_elapsed) => {
                    Marker::LookupTimedOut { target: &format!("{target}") }.log();
                }
            }
            in_flight -= 1;
            spawn_upto_alpha(self, &mut frontier, &mut visited, &mut in_flight, &tx);
        }

        shortlist.sort_by(|a, b| a.distance.cmp(&b.distance));
        shortlist.truncate(KademliaConfig::K);
        LookupOutcome { found: false, found_by: None, contacts: shortlist, value: None }
    }

    // ---------- lifecycle ----------

    pub async fn join(self: &Arc<Self>, bootstrap: &str) -> bool {
        if self.online.load(Ordering::SeqCst) {
            info!(addr = %self.addr, "join failed, node already in the network");
            return false;
        }
        if !substrate::ping(bootstrap, KademliaConfig::PING_ATTEMPTS, KademliaConfig::PING_TIMEOUT).await {
            warn!(addr = %self.addr, %bootstrap, "join failed: bootstrap unreachable");
            return false;
        }
        self.add_contact(Contact::new(bootstrap)).await;
        self.lookup(self.router.host.id, Probe::FindNode).await;
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
        self.shutdown();
    }

    pub async fn force_quit(&self) {
        if !self.online.load(Ordering::SeqCst) {
            info!(addr = %self.addr, "force quit failed, node already left the network");
            return;
        }
        self.shutdown();
    }

    fn shutdown(&self) {
        self.online.store(false, Ordering::SeqCst);
        let _ = self.quit_tx.send(());
        Marker::NodeOffline(&self.addr).log();
    }

    pub async fn ping(&self, addr: &str) -> bool {
        substrate::ping(addr, KademliaConfig::PING_ATTEMPTS, KademliaConfig::PING_TIMEOUT).await
    }

    // ---------- data ops ----------

    pub async fn put(self: &Arc<Self>, key: String, value: String) -> bool {
        self.router.touch(&Identifier::hash(&key)).await;
        self.origin.put(key.clone(), value.clone(), Duration::MAX).await;
        self.transfer_data_to_closer_nodes(&key, &value, true).await;
        true
    }

    pub async fn get(self: &Arc<Self>, key: &str) -> (bool, String) {
        self.router.touch(&Identifier::hash(key)).await;
        if let Some(v) = self.origin.get(key).await {
            return (true, v);
        }
        if let Some(v) = self.replicate.get(key).await {
            return (true, v);
        }
        if let Some(v) = self.cache.get(key).await {
            return (true, v);
        }

        let outcome = self.lookup(Identifier::hash(key), Probe::FindValue(key.to_string())).await;
        if !outcome.found {
            return (false, String::new());
        }
        if let Some(target) = &outcome.found_by {
            if !target.addr.is_empty() {
                let idx_target = self.router.contact_index(target).await;
                let idx_self = self.router.contact_index(&self.router.host).await;
                let sep_num = idx_target.abs_diff(idx_self).min(KademliaConfig::MAX_SEP_NUM);
                let expire = KademliaConfig::EXPIRE_TIME / 2u32.pow(sep_num);
                let value = outcome.value.clone().unwrap_or_default();
                let _ = kad_rpc::rpc_store(self.router.host.clone(), target, key, &value, true, expire).await;
            }
        }
        (true, outcome.value.unwrap_or_default())
    }

    /// Kademlia has no authoritative DELETE: a key lives wherever it was
    /// replicated until it expires. This drops the local origin copy so
    /// this node stops republishing it, matching the upstream semantics of
    /// leaving deletion unsupported beyond that.
    pub async fn delete(&self, key: &str) -> bool {
        self.origin.remove(key).await;
        true
    }

    // ---------- maintenance ----------

    fn maintain(self: &Arc<Self>) {
        let refresher = self.clone();
        let mut quit_rx = self.quit_tx.subscribe();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(KademliaConfig::REFRESH_INTERVAL);
            loop {
                tokio::select! {
                    _ = quit_rx.recv() => return,
                    _ = ticker.tick() => refresher.refresh_buckets().await,
                }
            }
        });

        let origin_republisher = self.clone();
        let mut quit_rx = self.quit_tx.subscribe();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(KademliaConfig::REPUBLISH_INTERVAL);
            loop {
                tokio::select! {
                    _ = quit_rx.recv() => return,
                    _ = ticker.tick() => {
                        let due = origin_republisher.origin.take_due_for_republish(KademliaConfig::REPUBLISH_INTERVAL).await;
                        for (key, value) in due {
                            origin_republisher.transfer_data_to_closer_nodes(&key, &value, false).await;
                        }
                    }
                }
            }
        });

        let replicate_republisher = self.clone();
        let mut quit_rx = self.quit_tx.subscribe();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(KademliaConfig::REPUBLISH_INTERVAL);
            loop {
                tokio::select! {
                    _ = quit_rx.recv() => return,
                    _ = ticker.tick() => {
                        let due = replicate_republisher.replicate.take_due_for_republish(KademliaConfig::REPUBLISH_INTERVAL).await;
                        for (key, value) in due {
                            replicate_republisher.transfer_data_to_closer_nodes(&key, &value, true).await;
                        }
                    }
                }
            }
        });

        let replicate_expirer = self.clone();
        let mut quit_rx = self.quit_tx.subscribe();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(KademliaConfig::EXPIRE_TIME);
            loop {
                tokio::select! {
                    _ = quit_rx.recv() => return,
                    _ = ticker.tick() => replicate_expirer.replicate.expire().await,
                }
            }
        });

        let cache_expirer = self.clone();
        let mut quit_rx = self.quit_tx.subscribe();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(KademliaConfig::EXPIRE_TIME);
            loop {
                tokio::select! {
                    _ = quit_rx.recv() => return,
                    _ = ticker.tick() => cache_expirer.cache.expire().await,
                }
            }
        });
    }

    async fn refresh_buckets(self: &Arc<Self>) {
        let due = self.router.stale_buckets(KademliaConfig::REFRESH_INTERVAL).await;
        for (target, contacts) in due {
            for contact in contacts {
                let engine = self.clone();
                tokio::spawn(async move {
                    if let Ok(outcome) = kad_rpc::rpc_find_node(engine.router.host.clone(), &contact, target).await {
                        for cwd in outcome.contacts {
                            engine.add_contact(cwd.contact).await;
                        }
                    }
                });
            }
        }
    }
}

/// `res.FoundBy` excluded, whichever remaining shortlisted contact is
/// closest to `target` — falls back to `res.FoundBy` itself if the
/// shortlist is empty, matching the original's "closest other than the
/// responder, or the responder" caching target.
fn pick_closest_excluding(shortlist: &[ContactWithDistance], found_by: &Option<Contact>, target: &Identifier) -> Contact {
    let skip_addr = found_by.as_ref().map(|c| c.addr.as_str()).unwrap_or("");
    shortlist
        .iter()
        .filter(|cwd| cwd.contact.addr != skip_addr)
        .min_by(|a, b| a.distance.cmp(&b.distance))
        .map(|cwd| cwd.contact.clone())
        .or_else(|| found_by.clone())
        .unwrap_or_else(|| Contact { addr: String::new(), id: *target })
}

