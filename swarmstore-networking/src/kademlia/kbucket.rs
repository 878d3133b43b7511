// Copyright (c) 2026 The Swarmstore Authors.
//
// This software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the software is distributed
// under the GPL Licence on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND,
// either express or implied. Please review the Licence for the specific language governing
// permissions and limitations under the Licence.

//! A single k-bucket: up to `K` contacts covering one `IdRange`, ordered by
//! recency (least-recently-seen at the front, most-recently-seen at the
//! back), exactly as Kademlia's LRS eviction policy needs.

use tokio::time::Instant;

use swarmstore_protocol::BITS;

use super::contact::Contact;
use super::id_range::IdRange;

pub struct KBucket {
    contacts: Vec<Contact>,
    range: IdRange,
    touched_at: Instant,
}

impl KBucket {
    pub fn new(range: IdRange) -> Self {
        KBucket { contacts: Vec::new(), range, touched_at: Instant::now() }
    }

    pub fn touch(&mut self) {
        self.touched_at = Instant::now();
    }

    pub fn touched_at(&self) -> Instant {
        self.touched_at
    }

    pub fn range(&self) -> &IdRange {
        &self.range
    }

    pub fn contains_range(&self, id: &swarmstore_protocol::Identifier) -> bool {
        self.range.contains(id)
    }

    pub fn len(&self) -> usize {
        self.contacts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contacts.is_empty()
    }

    pub fn least_recent(&self) -> Option<&Contact> {
        self.contacts.first()
    }

    pub fn contacts(&self) -> &[Contact] {
        &self.contacts
    }

    pub fn find(&self, addr: &str) -> Option<usize> {
        self.contacts.iter().position(|c| c.addr == addr)
    }

    pub fn push_back(&mut self, contact: Contact) {
        self.contacts.push(contact);
    }

    pub fn evict(&mut self, addr: &str) {
        if let Some(i) = self.find(addr) {
            self.contacts.remove(i);
        }
    }

    pub fn move_to_back(&mut self, addr: &str) {
        if let Some(i) = self.find(addr) {
            let c = self.contacts.remove(i);
            self.contacts.push(c);
        }
    }

    /// Splits the bucket's range at its midpoint, re-homing contacts into
    /// whichever child's range contains them.
    pub fn split(&self) -> (KBucket, KBucket) {
        let (lo_range, hi_range) = self.range.split();
        let mut lo = KBucket::new(lo_range);
        let mut hi = KBucket::new(hi_range);
        for c in &self.contacts {
            if lo.contains_range(&c.id) {
                lo.push_back(c.clone());
            } else {
                hi.push_back(c.clone());
            }
        }
        (lo, hi)
    }

    /// Shared prefix length of the bucket's contacts, i.e. how deep into the
    /// trie this bucket's actual occupants agree. `BITS` for an empty
    /// bucket, matching the "infinitely deep" convention used to decide
    /// splittability.
    pub fn depth(&self) -> u32 {
        match self.contacts.first() {
            None => BITS,
            Some(first) => self
                .contacts
                .iter()
                .map(|c| first.id.shared_prefix_len(&c.id))
                .min()
                .unwrap_or(BITS),
        }
    }
}
