// Copyright (c) 2026 The Swarmstore Authors.
//
// This software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the software is distributed
// under the GPL Licence on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND,
// either express or implied. Please review the Licence for the specific language governing
// permissions and limitations under the Licence.

//! TCP listener, length-delimited request-reply framing, dial-with-retry,
//! ping, and graceful shutdown via a broadcast quit signal. Shared by both
//! overlay engines.

mod client;
mod codec;
mod server;

pub use client::{call, dial, ping};
pub use codec::{RpcReply, RpcRequest};
pub use server::{RpcHandler, RpcServer};
