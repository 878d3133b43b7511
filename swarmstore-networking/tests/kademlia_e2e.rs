// Copyright (c) 2026 The Swarmstore Authors.
//
// This software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the software is distributed
// under the GPL Licence on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND,
// either express or implied. Please review the Licence for the specific language governing
// permissions and limitations under the Licence.

//! End-to-end Kademlia scenarios driven through the node façade, against a
//! real `tokio::net::TcpListener` rather than a mocked transport.

use std::time::Duration;

use swarmstore_networking::DhtNode;

fn free_addr() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap().to_string()
}

async fn settle() {
    tokio::time::sleep(Duration::from_millis(300)).await;
}

#[tokio::test]
async fn grow_to_three_replicates_to_the_bootstrap_node() {
    let a = DhtNode::kademlia(free_addr());
    a.run().await.unwrap();
    assert!(a.create().await);

    let b = DhtNode::kademlia(free_addr());
    b.run().await.unwrap();
    assert!(b.join(a.addr()).await);
    settle().await;

    let c = DhtNode::kademlia(free_addr());
    c.run().await.unwrap();
    assert!(c.join(a.addr()).await);
    settle().await;

    assert!(c.put("k".into(), "v".into()).await);
    settle().await;

    assert_eq!(a.get("k").await, (true, "v".to_string()));
}

/// A scaled-down analogue of a larger lookup-convergence run: fewer nodes
/// and keys than a stress-scale pass, so it stays fast, with a looser
/// success threshold to account for that smaller sample size.
#[tokio::test]
async fn lookup_converges_across_a_small_network() {
    const N: usize = 12;
    const KEYS: usize = 30;

    let addrs: Vec<String> = (0..N).map(|_| free_addr()).collect();
    let nodes: Vec<DhtNode> = addrs.iter().map(|a| DhtNode::kademlia(a.clone())).collect();

    nodes[0].run().await.unwrap();
    assert!(nodes[0].create().await);
    for node in &nodes[1..] {
        node.run().await.unwrap();
        assert!(node.join(nodes[0].addr()).await);
    }
    settle().await;

    let observer = DhtNode::kademlia(free_addr());
    observer.run().await.unwrap();
    assert!(observer.join(nodes[0].addr()).await);
    settle().await;

    let keys: Vec<(String, String)> =
        (0..KEYS).map(|i| (format!("key-{i}"), format!("value-{i}"))).collect();
    for (idx, (k, v)) in keys.iter().enumerate() {
        assert!(nodes[idx % N].put(k.clone(), v.clone()).await);
    }
    settle().await;

    let mut successes = 0;
    for (k, v) in &keys {
        let (found, value) = observer.get(k).await;
        if found && value == *v {
            successes += 1;
        }
    }
    assert!(successes >= (KEYS * 9) / 10, "only {successes}/{KEYS} keys resolved");
}
