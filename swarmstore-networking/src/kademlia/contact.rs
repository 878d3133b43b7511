// Copyright (c) 2026 The Swarmstore Authors.
//
// This software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the software is distributed
// under the GPL Licence on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND,
// either express or implied. Please review the Licence for the specific language governing
// permissions and limitations under the Licence.

//! A contact is an (address, id) pair; `id` is always `hash(addr)`, never
//! carried over the wire independently of it being recomputed.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use swarmstore_protocol::Identifier;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    pub addr: String,
    pub id: Identifier,
}

impl Contact {
    pub fn new(addr: impl Into<String>) -> Self {
        let addr = addr.into();
        let id = Identifier::hash(&addr);
        Contact { addr, id }
    }
}

/// A contact paired with its XOR distance to some lookup target. Ordered by
/// distance alone so these can sit directly in a `BinaryHeap`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ContactWithDistance {
    pub contact: Contact,
    pub distance: Identifier,
}

impl ContactWithDistance {
    pub fn new(contact: Contact, target: &Identifier) -> Self {
        let distance = contact.id.xor(target);
        ContactWithDistance { contact, distance }
    }
}

impl PartialEq for ContactWithDistance {
    fn eq(&self, other: &Self) -> bool {
        self.distance == other.distance
    }
}

impl Eq for ContactWithDistance {}

impl PartialOrd for ContactWithDistance {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ContactWithDistance {
    fn cmp(&self, other: &Self) -> Ordering {
        self.distance.cmp(&other.distance)
    }
}
