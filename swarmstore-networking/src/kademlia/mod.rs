// Copyright (c) 2026 The Swarmstore Authors.
//
// This software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the software is distributed
// under the GPL Licence on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND,
// either express or implied. Please review the Licence for the specific language governing
// permissions and limitations under the Licence.

//! The Kademlia overlay: XOR-metric routing with k-buckets, iterative
//! lookups bounded by α parallel RPCs, and three-tier storage
//! (origin/replicate/cache) with independent republish/expiry timers.

mod contact;
mod engine;
mod id_range;
mod kbucket;
mod lookup;
mod routing_table;
mod rpc;
mod storage;

pub use contact::Contact;
pub use engine::KademliaEngine;
pub use rpc::{KademliaRpcHandler, SERVICE};
