// Copyright (c) 2026 The Swarmstore Authors.
//
// This software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the software is distributed
// under the GPL Licence on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND,
// either express or implied. Please review the Licence for the specific language governing
// permissions and limitations under the Licence.

//! Identifier arithmetic, wire types and the shared error vocabulary for the
//! swarmstore overlay. Both the Chord and Kademlia engines in
//! `swarmstore-networking` depend on this crate; neither depends on the
//! other.

pub mod error;
pub mod identifier;
pub mod message;

pub use error::DhtError;
pub use identifier::{contains, Bound, Identifier, BITS};
pub use message::{Address, DataPair, NIL};
