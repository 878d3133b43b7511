// Copyright (c) 2026 The Swarmstore Authors.
//
// This software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the software is distributed
// under the GPL Licence on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND,
// either express or implied. Please review the Licence for the specific language governing
// permissions and limitations under the Licence.

//! Client side of the RPC substrate: dial with bounded retries, call
//! (dial-invoke-close), ping.

use std::time::Duration;

use serde::{de::DeserializeOwned, Serialize};
use tokio::net::TcpStream;
use tracing::{debug, trace};

use super::codec::{read_message, write_message, RpcReply, RpcRequest};
use crate::error::{NetworkError, Result};

/// Open a connection with up to `attempts` tries, each bounded by `timeout`.
/// Empty addresses are rejected immediately without consuming an attempt.
pub async fn dial(addr: &str, attempts: u32, timeout: Duration) -> Result<TcpStream> {
    if addr.is_empty() {
        return Err(NetworkError::DialTimedOut {
            addr: addr.to_string(),
            attempts: 0,
        });
    }

    let mut last_err = None;
    for attempt in 1..=attempts {
        match tokio::time::timeout(timeout, TcpStream::connect(addr)).await {
            Ok(Ok(stream)) => return Ok(stream),
            Ok(Err(io_err)) => {
                trace!(%addr, attempt, %io_err, "dial attempt failed");
                last_err = Some(io_err);
            }
            Err(_elapsed) => {
                trace!(%addr, attempt, "dial attempt timed out");
            }
        }
    }
    debug!(%addr, attempts, "dial exhausted all attempts");
    let _ = last_err;
    Err(NetworkError::DialTimedOut {
        addr: addr.to_string(),
        attempts,
    })
}

/// Dial, invoke `method` on `service` with `req`, close. One connection per
/// call; no long-lived sharing between calls.
pub async fn call<Req, Rep>(
    addr: &str,
    service: &str,
    method: &str,
    req: &Req,
    dial_attempts: u32,
    dial_timeout: Duration,
) -> Result<Rep>
where
    Req: Serialize,
    Rep: DeserializeOwned,
{
    let mut stream = dial(addr, dial_attempts, dial_timeout).await?;

    let payload = rmp_serde::to_vec(req)?;
    let request = RpcRequest {
        service: service.to_string(),
        method: method.to_string(),
        payload,
    };
    write_message(&mut stream, &request).await?;

    let reply: RpcReply = read_message(&mut stream).await?;
    if let Some(err) = reply.error {
        return Err(NetworkError::RemoteError(err));
    }
    Ok(rmp_serde::from_slice(&reply.payload)?)
}

/// Dial-only reachability probe. `attempts`/`timeout` are independent of
/// `call`'s, per the spec's distinct PingAttempt/PingTimeOut constants.
/// Empty address is unreachable by definition, no attempt consumed.
pub async fn ping(addr: &str, attempts: u32, timeout: Duration) -> bool {
    if addr.is_empty() {
        return false;
    }
    dial(addr, attempts, timeout).await.is_ok()
}
