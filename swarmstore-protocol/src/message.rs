// Copyright (c) 2026 The Swarmstore Authors.
//
// This software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the software is distributed
// under the GPL Licence on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND,
// either express or implied. Please review the Licence for the specific language governing
// permissions and limitations under the Licence.

//! Data shapes shared by both overlays, independent of either engine's own
//! RPC argument/reply structs.

use serde::{Deserialize, Serialize};

/// An opaque endpoint string. Equality is plain string comparison; the empty
/// address denotes "no peer". Both overlays key their routing state off
/// this, never off a live connection handle.
pub type Address = String;

/// The empty address, used as the sentinel for "no peer" (e.g. a Chord node
/// with no predecessor yet).
pub const NIL: &str = "";

/// A single key/value pair as it travels over the wire.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct DataPair {
    pub key: String,
    pub value: String,
}

impl DataPair {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        DataPair {
            key: key.into(),
            value: value.into(),
        }
    }
}
