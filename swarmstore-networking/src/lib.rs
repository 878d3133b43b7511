// Copyright (c) 2026 The Swarmstore Authors.
//
// This software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the software is distributed
// under the GPL Licence on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND,
// either express or implied. Please review the Licence for the specific language governing
// permissions and limitations under the Licence.

//! RPC substrate plus the two overlay engines (Chord, Kademlia) and the
//! node façade that fronts either one with a single uniform API.

pub mod chord;
pub mod config;
pub mod error;
pub mod kademlia;
mod node;
pub mod rpc;

pub use config::{ChordConfig, KademliaConfig};
pub use error::{NetworkError, Result};
pub use node::DhtNode;
