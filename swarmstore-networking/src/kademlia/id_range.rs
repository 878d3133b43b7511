// Copyright (c) 2026 The Swarmstore Authors.
//
// This software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the software is distributed
// under the GPL Licence on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND,
// either express or implied. Please review the Licence for the specific language governing
// permissions and limitations under the Licence.

//! The linear (non-wrapping) identifier ranges k-buckets partition the
//! space into. Unlike the Chord ring, Kademlia never wraps: every bucket
//! covers `[low, high)` of the 160-bit space, and every such range that
//! ever exists is produced by repeated bisection starting from the whole
//! space, so `low` is always aligned to a prefix of `prefix_bits` shared
//! bits.

use rand::RngCore;
use swarmstore_protocol::{Identifier, BITS};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct IdRange {
    pub low: Identifier,
    /// `None` stands for the unrepresentable upper sentinel 2^160: every id
    /// is below it. Only the very first, unsplit bucket has this shape.
    pub high: Option<Identifier>,
    /// Depth in the implicit binary trie of successive bisections; also the
    /// number of leading bits `low` shares with every id in the range.
    pub prefix_bits: u32,
}

impl IdRange {
    pub fn root() -> Self {
        IdRange { low: Identifier::ZERO, high: None, prefix_bits: 0 }
    }

    pub fn contains(&self, id: &Identifier) -> bool {
        match &self.high {
            Some(high) => id >= &self.low && id < high,
            None => id >= &self.low,
        }
    }

    /// Bisects this range at its midpoint into two half-sized children.
    pub fn split(&self) -> (IdRange, IdRange) {
        let mid = self.midpoint();
        let depth = self.prefix_bits + 1;
        (
            IdRange { low: self.low, high: Some(mid), prefix_bits: depth },
            IdRange { low: mid, high: self.high, prefix_bits: depth },
        )
    }

    fn midpoint(&self) -> Identifier {
        // Range length is exactly 2^(BITS - prefix_bits); half of that is
        // 2^(BITS - prefix_bits - 1), added to `low`.
        let shift = BITS.saturating_sub(self.prefix_bits + 1);
        self.low.wrapping_add(&Identifier::pow2(shift))
    }

    /// A pseudo-random identifier inside this range: the shared prefix is
    /// copied from `low`, the remaining bits are random. Used to pick a
    /// refresh target for a bucket that hasn't been touched in a while.
    pub fn random_id(&self) -> Identifier {
        let mut bytes = *self.low.as_bytes();
        let mut random_bytes = [0u8; 20];
        rand::thread_rng().fill_bytes(&mut random_bytes);
        for bit in self.prefix_bits..BITS {
            let byte_index = (bit / 8) as usize;
            let mask = 1u8 << (7 - (bit % 8));
            if random_bytes[byte_index] & mask != 0 {
                bytes[byte_index] |= mask;
            } else {
                bytes[byte_index] &= !mask;
            }
        }
        Identifier::from_bytes(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_contains_everything() {
        let root = IdRange::root();
        assert!(root.contains(&Identifier::ZERO));
        assert!(root.contains(&Identifier::hash("anything")));
    }

    #[test]
    fn split_is_disjoint_and_covers_parent() {
        let root = IdRange::root();
        let (lo, hi) = root.split();
        assert!(lo.contains(&Identifier::ZERO));
        assert!(!hi.contains(&Identifier::ZERO));
        let id = Identifier::hash("probe");
        assert!(lo.contains(&id) != hi.contains(&id));
    }

    #[test]
    fn random_id_respects_shared_prefix() {
        let root = IdRange::root();
        let (lo, _) = root.split();
        for _ in 0..20 {
            assert!(lo.contains(&lo.random_id()));
        }
    }
}
