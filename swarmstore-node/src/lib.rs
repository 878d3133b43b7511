// Copyright (c) 2026 The Swarmstore Authors.
//
// This software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the software is distributed
// under the GPL Licence on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND,
// either express or implied. Please review the Licence for the specific language governing
// permissions and limitations under the Licence.

//! A thin wrapper around [`DhtNode`] that adds a broadcast channel of
//! lifecycle events, for callers (the CLI binary, the file-sharing demo)
//! that want to react to connection state rather than poll `is_online`.

use std::net::SocketAddr;

use swarmstore_networking::DhtNode;
use tokio::sync::broadcast;

const NODE_EVENT_CHANNEL_SIZE: usize = 64;

/// Which overlay a [`NodeHandle`] should run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EngineKind {
    Chord,
    Kademlia,
}

/// Events broadcast by a running node to anyone subscribed via
/// [`NodeHandle::subscribe`].
#[derive(Clone, Debug)]
pub enum NodeEvent {
    /// `Create` or `Join` succeeded; the node is part of the overlay.
    ConnectedToNetwork,
    /// `Quit` or `ForceQuit` tore the node down.
    ChannelClosed,
}

#[derive(Clone)]
pub struct NodeEventsChannel(broadcast::Sender<NodeEvent>);

pub type NodeEventsReceiver = broadcast::Receiver<NodeEvent>;

impl Default for NodeEventsChannel {
    fn default() -> Self {
        NodeEventsChannel(broadcast::channel(NODE_EVENT_CHANNEL_SIZE).0)
    }
}

impl NodeEventsChannel {
    pub fn subscribe(&self) -> NodeEventsReceiver {
        self.0.subscribe()
    }

    fn broadcast(&self, event: NodeEvent) {
        let _ = self.0.send(event);
    }
}

/// A DHT node plus its event channel. Owns the `Initialize`d engine for its
/// full lifetime; `Run`/`Create`/`Join`/`Quit`/`ForceQuit` are forwarded to
/// it, with `ConnectedToNetwork`/`ChannelClosed` broadcast around the
/// lifecycle transitions the façade itself doesn't surface as events.
pub struct NodeHandle {
    node: DhtNode,
    events: NodeEventsChannel,
}

impl NodeHandle {
    /// `Initialize(addr)`: builds state only, no listener yet.
    pub fn new(engine: EngineKind, addr: impl Into<String>) -> Self {
        let node = match engine {
            EngineKind::Chord => DhtNode::chord(addr),
            EngineKind::Kademlia => DhtNode::kademlia(addr),
        };
        NodeHandle { node, events: NodeEventsChannel::default() }
    }

    pub fn addr(&self) -> &str {
        self.node.addr()
    }

    pub fn is_online(&self) -> bool {
        self.node.is_online()
    }

    pub fn subscribe(&self) -> NodeEventsReceiver {
        self.events.subscribe()
    }

    pub async fn run(&self) -> std::io::Result<SocketAddr> {
        self.node.run().await
    }

    pub async fn create(&self) -> bool {
        let ok = self.node.create().await;
        if ok {
            self.events.broadcast(NodeEvent::ConnectedToNetwork);
        }
        ok
    }

    /// Tries each bootstrap address in turn, succeeding on the first one
    /// that accepts the join.
    pub async fn join(&self, bootstrap: &[String]) -> bool {
        for addr in bootstrap {
            if self.node.join(addr).await {
                self.events.broadcast(NodeEvent::ConnectedToNetwork);
                return true;
            }
        }
        false
    }

    pub async fn quit(&self) {
        let was_online = self.node.is_online();
        self.node.quit().await;
        if was_online {
            self.events.broadcast(NodeEvent::ChannelClosed);
        }
    }

    pub async fn force_quit(&self) {
        let was_online = self.node.is_online();
        self.node.force_quit().await;
        if was_online {
            self.events.broadcast(NodeEvent::ChannelClosed);
        }
    }

    pub async fn ping(&self, addr: &str) -> bool {
        self.node.ping(addr).await
    }

    pub async fn put(&self, key: String, value: String) -> bool {
        self.node.put(key, value).await
    }

    pub async fn get(&self, key: &str) -> (bool, String) {
        self.node.get(key).await
    }

    pub async fn delete(&self, key: &str) -> bool {
        self.node.delete(key).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn free_addr() -> String {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().to_string()
    }

    #[tokio::test]
    async fn create_broadcasts_connected_event() {
        let handle = NodeHandle::new(EngineKind::Kademlia, free_addr());
        let mut events = handle.subscribe();
        handle.run().await.unwrap();
        assert!(handle.create().await);
        assert!(matches!(events.recv().await.unwrap(), NodeEvent::ConnectedToNetwork));
    }

    #[tokio::test]
    async fn quit_without_ever_joining_emits_no_event() {
        let handle = NodeHandle::new(EngineKind::Chord, free_addr());
        let mut events = handle.subscribe();
        handle.run().await.unwrap();
        handle.quit().await;
        assert!(events.try_recv().is_err());
    }

    #[tokio::test]
    async fn quit_after_create_emits_channel_closed() {
        let handle = NodeHandle::new(EngineKind::Chord, free_addr());
        handle.run().await.unwrap();
        assert!(handle.create().await);
        let mut events = handle.subscribe();
        handle.quit().await;
        assert!(matches!(events.recv().await.unwrap(), NodeEvent::ChannelClosed));
    }

    #[tokio::test]
    async fn join_tries_each_bootstrap_until_one_accepts() {
        let a = NodeHandle::new(EngineKind::Chord, free_addr());
        a.run().await.unwrap();
        assert!(a.create().await);

        let b = NodeHandle::new(EngineKind::Chord, free_addr());
        b.run().await.unwrap();
        let bootstraps = vec!["127.0.0.1:1".to_string(), a.addr().to_string()];
        assert!(b.join(&bootstraps).await);
    }
}
