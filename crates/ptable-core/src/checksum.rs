//! Additive checksum shared by the control and frame codecs.
//!
//! The checksum is the sum of every covered byte taken as an unsigned 8-bit
//! value, reduced modulo 2^32. It is not a CRC. Writers and readers must sum
//! exactly the same range: every byte of the file or record emitted so far,
//! excluding the checksum field itself.

use serde::{Deserialize, Serialize};

/// Width of a stored checksum field in bytes.
pub const CHECKSUM_SIZE: usize = 4;

/// Compute the additive checksum of `bytes`.
///
/// # Examples
/// ```
/// use ptable_core::checksum;
///
/// assert_eq!(checksum(&[]), 0);
/// assert_eq!(checksum(&[0xff, 0x01, 0x02]), 0x102);
/// ```
pub fn checksum(bytes: &[u8]) -> u32 {
    let mut acc = Checksum::new();
    acc.update(bytes);
    acc.value()
}

/// Recompute the checksum of `bytes` and compare it with `stored`.
///
/// # Examples
/// ```
/// use ptable_core::{checksum, verify};
///
/// let bytes = [1u8, 2, 3];
/// assert!(verify(&bytes, checksum(&bytes)));
/// assert!(!verify(&bytes, 7));
/// ```
pub fn verify(bytes: &[u8], stored: u32) -> bool {
    checksum(bytes) == stored
}

/// Running checksum for writers that sum bytes as they are emitted.
#[derive(Debug, Default, Clone, Copy)]
pub struct Checksum {
    sum: u32,
}

impl Checksum {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.sum = self.sum.wrapping_add(u32::from(b));
        }
    }

    pub fn value(&self) -> u32 {
        self.sum
    }
}

/// Result of comparing a stored checksum with the recomputed one.
///
/// A mismatch is reported, not raised: decoders still return the parsed
/// fields so callers can show an `ERROR` status and keep going.
///
/// # Examples
/// ```
/// use ptable_core::ChecksumCheck;
///
/// let check = ChecksumCheck { stored: 6, computed: 6 };
/// assert!(check.is_match());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChecksumCheck {
    /// Checksum read from the input.
    pub stored: u32,
    /// Checksum recomputed over the covered bytes.
    pub computed: u32,
}

impl ChecksumCheck {
    pub fn is_match(&self) -> bool {
        self.stored == self.computed
    }
}
