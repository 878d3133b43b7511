// Copyright (c) 2026 The Swarmstore Authors.
//
// This software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the software is distributed
// under the GPL Licence on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND,
// either express or implied. Please review the Licence for the specific language governing
// permissions and limitations under the Licence.

use swarmstore_protocol::DhtError;
use thiserror::Error;

pub type Result<T, E = NetworkError> = std::result::Result<T, E>;

/// Errors local to the networking crate: transport failures that the RPC
/// substrate surfaces before an engine ever gets a chance to interpret them
/// as a `DhtError`.
#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("dial to {addr} timed out after {attempts} attempts")]
    DialTimedOut { addr: String, attempts: u32 },

    #[error("io error talking to {addr}: {source}")]
    Io {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode rpc payload: {0}")]
    Encode(#[from] rmp_serde::encode::Error),

    #[error("failed to decode rpc payload: {0}")]
    Decode(#[from] rmp_serde::decode::Error),

    #[error("peer returned an rpc error: {0}")]
    RemoteError(String),

    #[error(transparent)]
    Dht(#[from] DhtError),
}

impl From<NetworkError> for DhtError {
    fn from(err: NetworkError) -> Self {
        match err {
            NetworkError::Dht(inner) => inner,
            NetworkError::DialTimedOut { addr, .. } => DhtError::NetworkUnreachable(addr),
            other => DhtError::RpcCallFailed(other.to_string()),
        }
    }
}
