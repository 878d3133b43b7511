// Copyright (c) 2026 The Swarmstore Authors.
//
// This software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the software is distributed
// under the GPL Licence on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND,
// either express or implied. Please review the Licence for the specific language governing
// permissions and limitations under the Licence.

//! Wire-level dispatch for the Kademlia engine: PING, FIND_NODE, FIND_VALUE
//! and STORE, each carrying the sender's own contact so the handler can
//! record it in its routing table (every incoming call is itself a
//! liveness signal about the caller).

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use swarmstore_protocol::Identifier;

use crate::config::KademliaConfig;
use crate::error::{NetworkError, Result};
use crate::rpc::{call, RpcHandler};

use super::contact::Contact;
use super::engine::KademliaEngine;
use super::lookup::LookupOutcome;

pub const SERVICE: &str = "KademliaService";

pub const METHOD_PING: &str = "Ping";
pub const METHOD_FIND_NODE: &str = "FindNode";
pub const METHOD_FIND_VALUE: &str = "FindValue";
pub const METHOD_STORE: &str = "Store";

#[derive(Serialize, Deserialize)]
struct PingMessage {
    sender: Contact,
}

#[derive(Serialize, Deserialize)]
struct FindNodeRequest {
    sender: Contact,
    id: Identifier,
}

#[derive(Serialize, Deserialize)]
struct FindValueRequest {
    sender: Contact,
    key: String,
}

#[derive(Serialize, Deserialize)]
struct StoreRequest {
    sender: Contact,
    key: String,
    value: String,
    cached: bool,
    expire_millis: u64,
}

pub struct KademliaRpcHandler {
    pub engine: Arc<KademliaEngine>,
}

#[async_trait]
impl RpcHandler for KademliaRpcHandler {
    async fn handle(&self, service: &str, method: &str, payload: &[u8]) -> std::result::Result<Vec<u8>, String> {
        if service != SERVICE {
            return Err(format!("unknown service {service:?}"));
        }
        dispatch(&self.engine, method, payload).await.map_err(|e| e.to_string())
    }
}

async fn dispatch(engine: &KademliaEngine, method: &str, payload: &[u8]) -> Result<Vec<u8>> {
    macro_rules! decode {
        () => {
            rmp_serde::from_slice(payload)?
        };
    }
    macro_rules! encode {
        ($value:expr) => {
            rmp_serde::to_vec(&$value)?
        };
    }

    let bytes = match method {
        METHOD_PING => {
            let req: PingMessage = decode!();
            engine.handle_ping(req.sender).await;
            encode!(PingMessage { sender: engine.router.host.clone() })
        }
        METHOD_FIND_NODE => {
            let req: FindNodeRequest = decode!();
            let contacts = engine.handle_find_node(req.sender, req.id).await;
            encode!(LookupOutcome { found: false, found_by: None, contacts, value: None })
        }
        METHOD_FIND_VALUE => {
            let req: FindValueRequest = decode!();
            encode!(engine.handle_find_value(req.sender, req.key).await)
        }
        METHOD_STORE => {
            let req: StoreRequest = decode!();
            engine
                .handle_store(req.sender, req.key, req.value, req.cached, Duration::from_millis(req.expire_millis))
                .await;
            encode!(())
        }
        other => return Err(NetworkError::RemoteError(format!("unknown method {other:?}")).into()),
    };
    Ok(bytes)
}

pub(super) async fn rpc_ping(host: Contact, target: &Contact) -> Result<Contact> {
    let reply: PingMessage =
        call_remote(&target.addr, METHOD_PING, &PingMessage { sender: host }).await?;
    Ok(reply.sender)
}

pub(super) async fn rpc_find_node(host: Contact, target: &Contact, id: Identifier) -> Result<LookupOutcome> {
    call_remote(&target.addr, METHOD_FIND_NODE, &FindNodeRequest { sender: host, id }).await
}

pub(super) async fn rpc_find_value(host: Contact, target: &Contact, key: &str) -> Result<LookupOutcome> {
    call_remote(&target.addr, METHOD_FIND_VALUE, &FindValueRequest { sender: host, key: key.to_string() }).await
}

pub(super) async fn rpc_store(
    host: Contact,
    target: &Contact,
    key: &str,
    value: &str,
    cached: bool,
    expire: Duration,
) -> Result<()> {
    call_remote(
        &target.addr,
        METHOD_STORE,
        &StoreRequest {
            sender: host,
            key: key.to_string(),
            value: value.to_string(),
            cached,
            expire_millis: expire.as_millis() as u64,
        },
    )
    .await
}

async fn call_remote<Req, Rep>(addr: &str, method: &str, req: &Req) -> Result<Rep>
where
    Req: serde::Serialize,
    Rep: serde::de::DeserializeOwned,
{
    call(addr, SERVICE, method, req, KademliaConfig::DIAL_ATTEMPTS, KademliaConfig::DIAL_TIMEOUT).await
}
