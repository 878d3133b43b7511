// Copyright (c) 2026 The Swarmstore Authors.
//
// This software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the software is distributed
// under the GPL Licence on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND,
// either express or implied. Please review the Licence for the specific language governing
// permissions and limitations under the Licence.

//! Shapes shared between a FIND_NODE/FIND_VALUE reply and the overall
//! result of an iterative lookup: both are "did we find the value, who
//! answered, and what's the current closest-contacts frontier".

use serde::{Deserialize, Serialize};

use super::contact::{Contact, ContactWithDistance};

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct LookupOutcome {
    pub found: bool,
    pub found_by: Option<Contact>,
    pub contacts: Vec<ContactWithDistance>,
    pub value: Option<String>,
}

/// Which remote procedure an iterative lookup round should issue.
#[derive(Clone, Debug)]
pub enum Probe {
    FindNode,
    FindValue(String),
}
