// Copyright (c) 2026 The Swarmstore Authors.
//
// This software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the software is distributed
// under the GPL Licence on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND,
// either express or implied. Please review the Licence for the specific language governing
// permissions and limitations under the Licence.

//! Protocol constants. Fixed at compile time, not deployment knobs: both
//! overlays treat these as part of the wire contract, not as configuration
//! a deployer can tune without breaking interop with peers that disagree.

use std::time::Duration;

/// Chord protocol parameters.
pub struct ChordConfig;

impl ChordConfig {
    /// Bits in an identifier / size of the finger table.
    pub const M: u32 = swarmstore_protocol::BITS;
    /// Length of the successor redundancy list.
    pub const SUCC_LIST_LEN: usize = 5;
    pub const PING_ATTEMPTS: u32 = 4;
    pub const DIAL_ATTEMPTS: u32 = 3;
    pub const PING_TIMEOUT: Duration = Duration::from_millis(300);
    pub const DIAL_TIMEOUT: Duration = Duration::from_millis(300);
    pub const STABILISE_PERIOD: Duration = Duration::from_millis(100);
    pub const FIX_FINGER_PERIOD: Duration = Duration::from_millis(100);
}

/// Kademlia protocol parameters.
pub struct KademliaConfig;

impl KademliaConfig {
    /// Bits in an identifier.
    pub const M: u32 = swarmstore_protocol::BITS;
    /// Maximum contacts per k-bucket.
    pub const K: usize = 20;
    /// Splittability modulus on bucket depth.
    pub const B: u32 = 5;
    /// Parallelism factor for iterative lookups.
    pub const ALPHA: usize = 3;
    pub const PING_ATTEMPTS: u32 = 4;
    pub const DIAL_ATTEMPTS: u32 = 4;
    pub const DIAL_TIMEOUT: Duration = Duration::from_millis(300);
    pub const PING_TIMEOUT: Duration = Duration::from_millis(500);
    pub const LOOKUP_TIMEOUT: Duration = Duration::from_millis(500);
    pub const EXPIRE_TIME: Duration = Duration::from_secs(40);
    pub const REFRESH_INTERVAL: Duration = Duration::from_secs(30);
    pub const REPUBLISH_INTERVAL: Duration = Duration::from_secs(30);
    /// Cap applied to the sepNum cache-expiry heuristic.
    pub const MAX_SEP_NUM: u32 = 20;
}
