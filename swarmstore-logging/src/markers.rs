// Copyright (c) 2026 The Swarmstore Authors.
//
// This software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the software is distributed
// under the GPL Licence on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND,
// either express or implied. Please review the Licence for the specific language governing
// permissions and limitations under the Licence.

//! Structural log events for recurring lifecycle transitions. Emitting
//! these through one call site keeps the message text and level stable as
//! the engines evolve, instead of scattering ad hoc `info!`/`warn!` calls
//! with slightly different wording at every call site that notices the
//! same kind of event.

use tracing::{info, warn};

#[derive(Debug, Clone, Copy)]
pub enum Marker<'a> {
    NodeOnline(&'a str),
    NodeOffline(&'a str),
    SuccessorChanged { addr: &'a str, new_successor: &'a str },
    PredecessorChanged { addr: &'a str, new_predecessor: &'a str },
    BucketSplit { depth: u32 },
    LookupTimedOut { target: &'a str },
    PeerUnreachable { addr: &'a str },
}

impl<'a> Marker<'a> {
    pub fn log(&self) {
        match self {
            Marker::NodeOnline(addr) => info!(marker = "NodeOnline", %addr, "node is online"),
            Marker::NodeOffline(addr) => info!(marker = "NodeOffline", %addr, "node is offline"),
            Marker::SuccessorChanged { addr, new_successor } => info!(
                marker = "SuccessorChanged",
                %addr, %new_successor, "successor changed"
            ),
            Marker::PredecessorChanged { addr, new_predecessor } => info!(
                marker = "PredecessorChanged",
                %addr, %new_predecessor, "predecessor changed"
            ),
            Marker::BucketSplit { depth } => {
                info!(marker = "BucketSplit", %depth, "k-bucket split")
            }
            Marker::LookupTimedOut { target } => {
                warn!(marker = "LookupTimedOut", %target, "lookup timed out")
            }
            Marker::PeerUnreachable { addr } => {
                warn!(marker = "PeerUnreachable", %addr, "peer unreachable after retries")
            }
        }
    }
}
