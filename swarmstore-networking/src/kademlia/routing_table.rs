// Copyright (c) 2026 The Swarmstore Authors.
//
// This software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the software is distributed
// under the GPL Licence on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND,
// either express or implied. Please review the Licence for the specific language governing
// permissions and limitations under the Licence.

//! The k-bucket routing table. Bucket splitting needs a liveness ping on
//! the occupant about to be evicted; since that's a network round trip, this
//! type exposes a two-step contract (`add_contact` then, if it reports
//! `NeedsEvictionDecision`, the caller pings and reports back via
//! `resolve_eviction`) rather than taking an async ping callback directly.

use tokio::sync::RwLock;
use tokio::time::Instant;

use swarmstore_protocol::Identifier;
use swarmstore_logging::Marker;

use crate::config::KademliaConfig;

use super::contact::{Contact, ContactWithDistance};
use super::id_range::IdRange;
use super::kbucket::KBucket;

pub enum AddOutcome {
    Done,
    NeedsEvictionDecision { oldest: Contact, candidate: Contact },
}

pub struct RoutingTable {
    pub host: Contact,
    buckets: RwLock<Vec<KBucket>>,
}

impl RoutingTable {
    pub fn new(host_addr: &str) -> Self {
        RoutingTable {
            host: Contact::new(host_addr),
            buckets: RwLock::new(vec![KBucket::new(IdRange::root())]),
        }
    }

    pub async fn touch(&self, id: &Identifier) {
        let mut buckets = self.buckets.write().await;
        if let Some(bucket) = buckets.iter_mut().find(|b| b.contains_range(id)) {
            bucket.touch();
        }
    }

    /// Attempts to record `contact`. A full, splittable bucket is split in
    /// place; a full, unsplittable bucket defers to the caller for an
    /// eviction decision.
    pub async fn add_contact(&self, contact: Contact) -> AddOutcome {
        if contact.addr == self.host.addr {
            return AddOutcome::Done;
        }
        let mut buckets = self.buckets.write().await;
        let Some(idx) = buckets.iter().position(|b| b.contains_range(&contact.id)) else {
            return AddOutcome::Done;
        };

        if buckets[idx].find(&contact.addr).is_some() {
            buckets[idx].move_to_back(&contact.addr);
            return AddOutcome::Done;
        }

        if buckets[idx].len() < KademliaConfig::K {
            buckets[idx].push_back(contact);
            return AddOutcome::Done;
        }

        let host_in_bucket = buckets[idx].contains_range(&self.host.id);
        let splittable = host_in_bucket || buckets[idx].depth() % KademliaConfig::B != 0;
        if splittable {
            let (lo, hi) = buckets[idx].split();
            let mut lo = lo;
            let mut hi = hi;
            if lo.contains_range(&contact.id) {
                lo.push_back(contact);
            } else {
                hi.push_back(contact);
            }
            buckets.splice(idx..=idx, [lo, hi]);
            Marker::BucketSplit { depth: buckets[idx].depth() }.log();
            AddOutcome::Done
        } else {
            let oldest = buckets[idx].least_recent().cloned().expect("full bucket has an occupant");
            AddOutcome::NeedsEvictionDecision { oldest, candidate: contact }
        }
    }

    /// Completes a deferred eviction decision: re-locates the bucket by the
    /// candidate's id (the bucket layout may have changed since
    /// `add_contact` returned) and either bumps the survivor or replaces it.
    pub async fn resolve_eviction(&self, oldest_alive: bool, oldest: Contact, candidate: Contact) {
        let mut buckets = self.buckets.write().await;
        if let Some(bucket) = buckets.iter_mut().find(|b| b.contains_range(&candidate.id)) {
            if oldest_alive {
                bucket.move_to_back(&oldest.addr);
            } else if bucket.find(&oldest.addr).is_some() {
                bucket.evict(&oldest.addr);
                bucket.push_back(candidate);
            }
        }
    }

    pub async fn contains_addr(&self, addr: &str) -> bool {
        let buckets = self.buckets.read().await;
        buckets.iter().any(|b| b.find(addr).is_some())
    }

    pub async fn find_bucket(&self, id: &Identifier) -> Option<(usize, Instant)> {
        let buckets = self.buckets.read().await;
        buckets
            .iter()
            .position(|b| b.contains_range(id))
            .map(|idx| (idx, buckets[idx].touched_at()))
    }

    pub async fn get_closest_contacts(&self, id: &Identifier, num: usize) -> Vec<ContactWithDistance> {
        let buckets = self.buckets.read().await;
        let mut all: Vec<ContactWithDistance> = buckets
            .iter()
            .flat_map(|b| b.contacts().iter())
            .map(|c| ContactWithDistance::new(c.clone(), id))
            .collect();
        all.sort_by(|a, b| a.distance.cmp(&b.distance));
        all.truncate(num);
        all
    }

    pub async fn get_closest_distance(&self, id: &Identifier) -> Option<Identifier> {
        self.get_closest_contacts(id, 1).await.into_iter().next().map(|c| c.distance)
    }

    /// Position of `contact` among all contacts ordered by distance to
    /// `contact`'s own id, i.e. "how many peers are closer to this contact
    /// than it is to itself" — the basis for the cache-expiry heuristic.
    pub async fn contact_index(&self, contact: &Contact) -> u32 {
        let buckets = self.buckets.read().await;
        let mut count = 0u32;
        for bucket in buckets.iter() {
            if let Some(high) = bucket.range().high {
                if high <= contact.id {
                    count += bucket.len() as u32;
                    continue;
                }
            }
            if bucket.contains_range(&contact.id) {
                count += bucket.contacts().iter().filter(|c| c.id < contact.id).count() as u32;
            }
        }
        count
    }

    /// Buckets untouched for longer than `stale_after`, paired with a fresh
    /// random lookup target inside each and a snapshot of its contacts.
    pub async fn stale_buckets(&self, stale_after: std::time::Duration) -> Vec<(Identifier, Vec<Contact>)> {
        let mut buckets = self.buckets.write().await;
        let mut due = Vec::new();
        for bucket in buckets.iter_mut() {
            if bucket.touched_at().elapsed() >= stale_after {
                bucket.touch();
                due.push((bucket.range().random_id(), bucket.contacts().to_vec()));
            }
        }
        due
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn inserting_past_k_splits_the_bucket_holding_self() {
        let table = RoutingTable::new("host:9000");

        for i in 0..KademliaConfig::K + 1 {
            let outcome = table.add_contact(Contact::new(format!("peer-{i}:9000"))).await;
            assert!(matches!(outcome, AddOutcome::Done), "unexpected eviction decision at contact {i}");
        }

        let buckets = table.buckets.read().await;
        assert!(buckets.len() > 1, "root bucket never split");
        let total: usize = buckets.iter().map(|b| b.contacts().len()).sum();
        assert_eq!(total, KademliaConfig::K + 1);
    }

    #[tokio::test]
    async fn touching_an_existing_contact_does_not_grow_the_bucket() {
        let table = RoutingTable::new("host:9000");
        table.add_contact(Contact::new("peer:9001")).await;
        table.add_contact(Contact::new("peer:9001")).await;

        let buckets = table.buckets.read().await;
        let total: usize = buckets.iter().map(|b| b.contacts().len()).sum();
        assert_eq!(total, 1);
    }
}
