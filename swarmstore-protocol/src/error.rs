// Copyright (c) 2026 The Swarmstore Authors.
//
// This software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the software is distributed
// under the GPL Licence on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND,
// either express or implied. Please review the Licence for the specific language governing
// permissions and limitations under the Licence.

//! Error vocabulary shared by both overlay engines.

use thiserror::Error;

/// The error kinds named in the error-handling design: both engines surface
/// failures through this enum, and reduce it to a boolean or `(bool, value)`
/// at the façade boundary rather than letting it escape to callers.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DhtError {
    /// Dial or ping gave up after exhausting all retries.
    #[error("network unreachable: {0}")]
    NetworkUnreachable(String),

    /// A connection was established but the method invocation itself failed.
    #[error("rpc call failed: {0}")]
    RpcCallFailed(String),

    /// Chord exhausted its successor list; the ring is broken from this
    /// node's point of view.
    #[error("no available successor")]
    NoAvailableSuccessor,

    /// The get-path fell through every lookup step without locating the key.
    #[error("key not found")]
    KeyNotFound,

    /// Create/Join called while already online.
    #[error("node is already online")]
    AlreadyOnline,

    /// Quit/ForceQuit/data-op called while not online.
    #[error("node is not online")]
    NotOnline,
}
