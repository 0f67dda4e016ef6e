//! Bit-packs a u32 with both the registration-area depth and the node index
//! within that depth's layer. The depth lives in the top 8 bits, so trees up
//! to 256 levels deep are addressable; the layer index lives in the low 24
//! bits, or about 1.6e7 nodes per layer. The reference tree is three levels
//! (1 + 7 + 49 nodes), so both limits are generous.
use serde::{Deserialize, Serialize};
use std::convert::From;
use std::fmt;

const DMASK_U32: u32 = 0b1111_1111_0000_0000_0000_0000_0000_0000;
const IMASK_U32: u32 = 0b0000_0000_1111_1111_1111_1111_1111_1111;

/// The bitpacked type
#[derive(Copy, Clone, Serialize, Deserialize, PartialEq, Eq, std::hash::Hash, PartialOrd, Ord)]
pub struct RaAddress {
    ra: u32,
}

impl From<(u8, usize)> for RaAddress {
    fn from(n: (u8, usize)) -> RaAddress {
        assert!(
            n.1.leading_zeros() as usize >= 8 + (std::mem::size_of::<usize>() * 8 - 32),
            "{:#034b}",
            n.1
        );
        let ra = (n.0 as u32) << 24 | n.1 as u32;
        RaAddress { ra }
    }
}

impl From<&(u8, usize)> for RaAddress {
    fn from(n: &(u8, usize)) -> RaAddress {
        (*n).into()
    }
}

impl From<RaAddress> for (u8, usize) {
    fn from(n: RaAddress) -> (u8, usize) {
        n.to_tuple()
    }
}

impl From<u32> for RaAddress {
    fn from(ra: u32) -> RaAddress {
        RaAddress { ra }
    }
}

impl fmt::Display for RaAddress {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "({}, {})", self.depth(), self.index())
    }
}

impl fmt::Debug for RaAddress {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("RaAddress")
            .field("depth", &self.depth())
            .field("index", &self.index())
            .finish()
    }
}

impl fmt::Binary for RaAddress {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:#034b}", self.ra)
    }
}

impl RaAddress {
    /// The underlying u32
    pub fn raw(&self) -> u32 {
        self.ra
    }
    /// Borrowed to_tuple into the depth and layer index pair
    pub fn to_tuple(&self) -> (u8, usize) {
        (self.depth(), self.index())
    }
    /// The depth of the address, 0 at the root
    #[inline]
    pub fn depth(&self) -> u8 {
        ((self.ra & DMASK_U32) >> 24) as u8
    }
    /// The index of the node within its layer
    #[inline]
    pub fn index(&self) -> usize {
        (self.ra & IMASK_U32) as usize
    }
}
