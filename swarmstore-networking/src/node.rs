// Copyright (c) 2026 The Swarmstore Authors.
//
// This software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the software is distributed
// under the GPL Licence on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND,
// either express or implied. Please review the Licence for the specific language governing
// permissions and limitations under the Licence.

//! The engine-agnostic node façade: the same nine operations front either
//! a [`ChordEngine`] or a [`KademliaEngine`], so callers (the CLI, the
//! file-sharing demo) never branch on which overlay they're talking to.

use std::net::SocketAddr;
use std::sync::Arc;

use crate::chord::ChordEngine;
use crate::kademlia::KademliaEngine;

/// Which overlay a node runs. Chosen at `Initialize` and fixed for the
/// node's lifetime.
pub enum DhtNode {
    Chord(Arc<ChordEngine>),
    Kademlia(Arc<KademliaEngine>),
}

impl DhtNode {
    /// `Initialize(addr)`: builds in-memory state only, no listener yet.
    pub fn chord(addr: impl Into<String>) -> Self {
        DhtNode::Chord(ChordEngine::new(addr))
    }

    /// `Initialize(addr)`: builds in-memory state only, no listener yet.
    pub fn kademlia(addr: impl Into<String>) -> Self {
        DhtNode::Kademlia(KademliaEngine::new(addr))
    }

    pub fn addr(&self) -> &str {
        match self {
            DhtNode::Chord(e) => e.addr(),
            DhtNode::Kademlia(e) => e.addr(),
        }
    }

    pub fn is_online(&self) -> bool {
        match self {
            DhtNode::Chord(e) => e.is_online(),
            DhtNode::Kademlia(e) => e.is_online(),
        }
    }

    /// `Run`: start the listener and accept loop. Idempotent at the caller's
    /// discretion — binding twice will simply fail with an address-in-use
    /// error, which is surfaced rather than swallowed.
    pub async fn run(&self) -> std::io::Result<SocketAddr> {
        match self {
            DhtNode::Chord(e) => e.run().await,
            DhtNode::Kademlia(e) => e.run().await,
        }
    }

    /// `Create`: form a brand-new single-node ring under Chord. Kademlia has
    /// no notion of ring formation — a lone node is simply ready to answer
    /// RPCs and to be joined by others, so this is a no-op that always
    /// succeeds.
    pub async fn create(&self) -> bool {
        match self {
            DhtNode::Chord(e) => e.create().await,
            DhtNode::Kademlia(_) => true,
        }
    }

    /// `Join(addr)`: false if already online or the bootstrap is unreachable.
    pub async fn join(&self, bootstrap: &str) -> bool {
        match self {
            DhtNode::Chord(e) => e.join(bootstrap).await,
            DhtNode::Kademlia(e) => e.join(bootstrap).await,
        }
    }

    /// `Quit`: graceful handoff (Chord notifies its successor with its own
    /// predecessor; Kademlia simply stops its maintenance loops, its stored
    /// data having already been spread by ordinary republish traffic).
    pub async fn quit(&self) {
        match self {
            DhtNode::Chord(e) => e.quit().await,
            DhtNode::Kademlia(e) => e.quit().await,
        }
    }

    /// `ForceQuit`: tear down immediately, skipping notification.
    pub async fn force_quit(&self) {
        match self {
            DhtNode::Chord(e) => e.force_quit().await,
            DhtNode::Kademlia(e) => e.force_quit().await,
        }
    }

    pub async fn ping(&self, addr: &str) -> bool {
        match self {
            DhtNode::Chord(e) => e.ping(addr).await,
            DhtNode::Kademlia(e) => e.ping(addr).await,
        }
    }

    pub async fn put(&self, key: String, value: String) -> bool {
        match self {
            DhtNode::Chord(e) => e.put(key, value).await,
            DhtNode::Kademlia(e) => e.put(key, value).await,
        }
    }

    pub async fn get(&self, key: &str) -> (bool, String) {
        match self {
            DhtNode::Chord(e) => e.get(key).await,
            DhtNode::Kademlia(e) => e.get(key).await,
        }
    }

    /// `Delete(key)`: Kademlia returns `true` unconditionally (it drops its
    /// own origin copy but cannot reach into every replica that exists).
    pub async fn delete(&self, key: &str) -> bool {
        match self {
            DhtNode::Chord(e) => e.delete(key).await,
            DhtNode::Kademlia(e) => e.delete(key).await,
        }
    }
}
