// Copyright (c) 2026 The Swarmstore Authors.
//
// This software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the software is distributed
// under the GPL Licence on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND,
// either express or implied. Please review the Licence for the specific language governing
// permissions and limitations under the Licence.

//! 160-bit identifiers and ring-interval arithmetic shared by both overlays.

use sha1::{Digest, Sha1};
use std::fmt;

/// Number of bits in an identifier. Both overlays are built around SHA-1's
/// 160-bit output.
pub const BITS: u32 = 160;

/// A 160-bit unsigned identifier, stored big-endian.
///
/// Both Chord ring distance and Kademlia XOR distance are defined over this
/// type; which one applies is a property of the call site, not of the type.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
pub struct Identifier([u8; 20]);

impl Identifier {
    pub const ZERO: Identifier = Identifier([0u8; 20]);

    /// `hash(s)`: SHA-1 of the UTF-8 bytes of `s`.
    pub fn hash(s: &str) -> Self {
        let digest = Sha1::digest(s.as_bytes());
        let mut bytes = [0u8; 20];
        bytes.copy_from_slice(&digest);
        Identifier(bytes)
    }

    pub fn from_bytes(bytes: [u8; 20]) -> Self {
        Identifier(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// `2^x mod 2^160`, canonicalised into the ring. For `x >= 160` this is
    /// identically zero, since the modulus is exactly the size of the space.
    pub fn pow2(x: u32) -> Self {
        if x >= BITS {
            return Identifier::ZERO;
        }
        let mut bytes = [0u8; 20];
        let byte_index = 19 - (x / 8) as usize;
        bytes[byte_index] = 1u8 << (x % 8);
        Identifier(bytes)
    }

    /// `(self + 2^x) mod 2^160`, via a big-endian carry chain. Exact,
    /// allocation-free arithmetic over the fixed-width identifier.
    pub fn add_pow2(&self, x: u32) -> Self {
        let addend = Self::pow2(x);
        self.wrapping_add(&addend)
    }

    /// `(self + other) mod 2^160`.
    pub fn wrapping_add(&self, other: &Identifier) -> Self {
        let mut result = [0u8; 20];
        let mut carry: u16 = 0;
        for i in (0..20).rev() {
            let sum = self.0[i] as u16 + other.0[i] as u16 + carry;
            result[i] = (sum & 0xff) as u8;
            carry = sum >> 8;
        }
        Identifier(result)
    }

    /// XOR distance, the Kademlia metric.
    pub fn xor(&self, other: &Identifier) -> Identifier {
        let mut bytes = [0u8; 20];
        for i in 0..20 {
            bytes[i] = self.0[i] ^ other.0[i];
        }
        Identifier(bytes)
    }

    /// Length of the common bit prefix shared between `self` and `other`.
    /// `BITS` when the two identifiers are equal.
    pub fn shared_prefix_len(&self, other: &Identifier) -> u32 {
        let distance = self.xor(other);
        distance.leading_zero_bits()
    }

    /// Number of leading zero bits, i.e. `BITS - floor(log2(self)) - 1` for
    /// nonzero values, and `BITS` for zero. Used both for prefix lengths and
    /// for bucket-depth computation.
    pub fn leading_zero_bits(&self) -> u32 {
        for (byte_index, byte) in self.0.iter().enumerate() {
            if *byte != 0 {
                return (byte_index as u32) * 8 + byte.leading_zeros();
            }
        }
        BITS
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 20]
    }
}

impl fmt::Debug for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Ring-interval bound shape, matching the four combinations of open/closed
/// endpoints used throughout the Chord engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Bound {
    /// `(low, high)`
    Open,
    /// `(low, high]`
    LeftOpen,
    /// `[low, high)`
    RightOpen,
    /// `[low, high]`
    Closed,
}

/// `contains(id, low, high, bound)`: ring-interval membership modulo 2^160,
/// handling wrap-around when `low > high` by splitting into the two
/// sub-intervals `[low, max]` and `[0, high]`.
///
/// Boundary policy where `low == high`: the interval denotes the single
/// point `low` for `Closed`, and is empty for the other three bound shapes.
/// This is the natural reading of "(L,L)", "(L,L]" and "[L,L)" as degenerate
/// empty intervals, and "[L,L]" as the singleton they all orbit.
pub fn contains(id: &Identifier, low: &Identifier, high: &Identifier, bound: Bound) -> bool {
    if low == high {
        return match bound {
            Bound::Closed => id == low,
            _ => false,
        };
    }

    if low < high {
        let above_low = match bound {
            Bound::Open | Bound::RightOpen => id > low,
            Bound::LeftOpen | Bound::Closed => id >= low,
        };
        let below_high = match bound {
            Bound::Open | Bound::LeftOpen => id < high,
            Bound::RightOpen | Bound::Closed => id <= high,
        };
        above_low && below_high
    } else {
        // Wrap-around: the interval is the disjunction of (low, max] and
        // [0, high), with the endpoint openness applied only at the true
        // endpoints of the logical interval (low and high), not at the
        // arbitrary point where the ring wraps.
        let above_low = match bound {
            Bound::Open | Bound::RightOpen => id > low,
            Bound::LeftOpen | Bound::Closed => id >= low,
        };
        let below_high = match bound {
            Bound::Open | Bound::LeftOpen => id < high,
            Bound::RightOpen | Bound::Closed => id <= high,
        };
        above_low || below_high
    }
}

/// `getStart(addr, x) = (hash(addr) + 2^x) mod 2^160`, the start of the
/// interval owned by `finger[x]`.
pub fn finger_start(addr: &str, x: u32) -> Identifier {
    Identifier::hash(addr).add_pow2(x)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_is_deterministic() {
        assert_eq!(Identifier::hash("a:1"), Identifier::hash("a:1"));
        assert_ne!(Identifier::hash("a:1"), Identifier::hash("a:2"));
    }

    #[test]
    fn pow2_sets_single_bit() {
        let one = Identifier::pow2(0);
        assert_eq!(one.as_bytes()[19], 1);
        let two = Identifier::pow2(1);
        assert_eq!(two.as_bytes()[19], 2);
    }

    #[test]
    fn add_pow2_wraps_at_2_pow_160() {
        // max identifier + 1 wraps to zero.
        let max = Identifier([0xff; 20]);
        let wrapped = max.add_pow2(0);
        assert_eq!(wrapped, Identifier::ZERO);
    }

    #[test]
    fn xor_distance_is_symmetric_and_zero_for_self() {
        let a = Identifier::hash("a");
        let b = Identifier::hash("b");
        assert_eq!(a.xor(&b), b.xor(&a));
        assert_eq!(a.xor(&a), Identifier::ZERO);
    }

    #[test]
    fn contains_non_wrapping_interval() {
        let low = Identifier::pow2(4);
        let high = Identifier::pow2(8);
        let mid = low.add_pow2(5);
        assert!(contains(&mid, &low, &high, Bound::Open));
        assert!(!contains(&low, &low, &high, Bound::Open));
        assert!(contains(&low, &low, &high, Bound::LeftOpen) == false);
        assert!(contains(&low, &low, &high, Bound::Closed));
        assert!(contains(&high, &low, &high, Bound::RightOpen) == false);
        assert!(contains(&high, &low, &high, Bound::LeftOpen));
    }

    #[test]
    fn contains_wrapping_interval() {
        let low = Identifier([0xff; 20]);
        let high = Identifier::pow2(2);
        // point near the top of the ring
        let near_top = Identifier([0xff; 20]);
        assert!(contains(&near_top, &low, &high, Bound::Closed));
        // point near zero
        let near_zero = Identifier::ZERO;
        assert!(contains(&near_zero, &low, &high, Bound::Closed));
    }

    #[test]
    fn contains_degenerate_interval() {
        let point = Identifier::hash("x");
        assert!(!contains(&point, &point, &point, Bound::Open));
        assert!(!contains(&point, &point, &point, Bound::LeftOpen));
        assert!(!contains(&point, &point, &point, Bound::RightOpen));
        assert!(contains(&point, &point, &point, Bound::Closed));
    }

    #[test]
    fn shared_prefix_len_of_equal_ids_is_full() {
        let id = Identifier::hash("same");
        assert_eq!(id.shared_prefix_len(&id), BITS);
    }
}
