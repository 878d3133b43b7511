// Copyright (c) 2026 The Swarmstore Authors.
//
// This software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the software is distributed
// under the GPL Licence on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND,
// either express or implied. Please review the Licence for the specific language governing
// permissions and limitations under the Licence.

//! Length-delimited framing over an async byte stream: a 4-byte big-endian
//! length prefix followed by a MessagePack-encoded envelope. Hand-rolled
//! rather than built on a generic codec crate, since the substrate only
//! ever needs this one shape.

use crate::error::{NetworkError, Result};
use serde::{de::DeserializeOwned, Serialize};
use tokio::io::{AsyncReadExt, AsyncWriteExt};

/// Frames larger than this are rejected outright; guards against a
/// corrupt or malicious length prefix causing an unbounded allocation.
const MAX_FRAME_BYTES: u32 = 64 * 1024 * 1024;

/// A request travelling from client to server.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct RpcRequest {
    pub service: String,
    pub method: String,
    pub payload: Vec<u8>,
}

/// A reply travelling from server to client. `error` is `Some` exactly when
/// the handler returned a failure; the payload is then meaningless.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct RpcReply {
    pub payload: Vec<u8>,
    pub error: Option<String>,
}

pub async fn write_message<S, T>(stream: &mut S, value: &T) -> Result<()>
where
    S: tokio::io::AsyncWrite + Unpin,
    T: Serialize,
{
    let bytes = rmp_serde::to_vec(value)?;
    let len = bytes.len() as u32;
    stream.write_all(&len.to_be_bytes()).await.map_err(|e| NetworkError::Io {
        addr: String::new(),
        source: e,
    })?;
    stream.write_all(&bytes).await.map_err(|e| NetworkError::Io {
        addr: String::new(),
        source: e,
    })?;
    stream.flush().await.map_err(|e| NetworkError::Io {
        addr: String::new(),
        source: e,
    })?;
    Ok(())
}

pub async fn read_message<S, T>(stream: &mut S) -> Result<T>
where
    S: tokio::io::AsyncRead + Unpin,
    T: DeserializeOwned,
{
    let mut len_buf = [0u8; 4];
    stream.read_exact(&mut len_buf).await.map_err(|e| NetworkError::Io {
        addr: String::new(),
        source: e,
    })?;
    let len = u32::from_be_bytes(len_buf);
    if len > MAX_FRAME_BYTES {
        return Err(NetworkError::RemoteError(format!(
            "frame of {len} bytes exceeds maximum of {MAX_FRAME_BYTES}"
        )));
    }
    let mut buf = vec![0u8; len as usize];
    stream.read_exact(&mut buf).await.map_err(|e| NetworkError::Io {
        addr: String::new(),
        source: e,
    })?;
    Ok(rmp_serde::from_slice(&buf)?)
}
