// Copyright (c) 2026 The Swarmstore Authors.
//
// This software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the software is distributed
// under the GPL Licence on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND,
// either express or implied. Please review the Licence for the specific language governing
// permissions and limitations under the Licence.

//! Server side of the RPC substrate: one TCP listener per node, dispatching
//! accepted connections to a handler keyed by (service, method).

use std::sync::Arc;

use async_trait::async_trait;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::broadcast;
use tracing::{debug, trace, warn};

use super::codec::{read_message, write_message, RpcReply, RpcRequest};

/// Implemented by each engine to answer one (service, method, payload)
/// triple. `payload`/the return value are opaque MessagePack bytes; the
/// handler is responsible for decoding/encoding its own argument and reply
/// types.
#[async_trait]
pub trait RpcHandler: Send + Sync + 'static {
    async fn handle(&self, service: &str, method: &str, payload: &[u8]) -> Result<Vec<u8>, String>;
}

/// Binds a listener and serves accepted connections until the quit signal
/// fires. Each connection is served on its own task and may carry multiple
/// sequential requests (the client closes when it is done, matching the
/// substrate's "dial once, call, close" client-side contract without
/// forcing the server to open a fresh task per call).
pub struct RpcServer {
    listener: TcpListener,
    local_addr: std::net::SocketAddr,
}

impl RpcServer {
    pub async fn bind(addr: &str) -> std::io::Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        let local_addr = listener.local_addr()?;
        Ok(RpcServer { listener, local_addr })
    }

    pub fn local_addr(&self) -> std::net::SocketAddr {
        self.local_addr
    }

    /// Accept loop. Returns once `quit_rx` fires; any handler in flight is
    /// allowed to finish (handlers are spawned tasks, not awaited here).
    pub async fn serve(self, handler: Arc<dyn RpcHandler>, mut quit_rx: broadcast::Receiver<()>) {
        loop {
            tokio::select! {
                accepted = self.listener.accept() => {
                    match accepted {
                        Ok((stream, peer)) => {
                            trace!(%peer, "accepted connection");
                            let handler = handler.clone();
                            tokio::spawn(async move {
                                if let Err(err) = serve_connection(stream, handler).await {
                                    trace!(%peer, %err, "connection ended");
                                }
                            });
                        }
                        Err(err) => {
                            warn!(%err, "accept failed");
                        }
                    }
                }
                _ = quit_rx.recv() => {
                    debug!(addr = %self.local_addr, "rpc server shutting down");
                    return;
                }
            }
        }
    }
}

async fn serve_connection(mut stream: TcpStream, handler: Arc<dyn RpcHandler>) -> std::io::Result<()> {
    loop {
        let request: RpcRequest = match read_message(&mut stream).await {
            Ok(req) => req,
            Err(_) => return Ok(()), // EOF or malformed frame: peer is done with us.
        };

        let reply = match handler
            .handle(&request.service, &request.method, &request.payload)
            .await
        {
            Ok(payload) => RpcReply { payload, error: None },
            Err(err) => RpcReply {
                payload: Vec::new(),
                error: Some(err),
            },
        };

        if write_message(&mut stream, &reply).await.is_err() {
            return Ok(());
        }
    }
}
