//! TCP sequence numbers with modulo-2^32 arithmetic.
//! 模 2^32 运算的TCP序列号。
//!
//! Sequence numbers wrap, so comparisons are only meaningful between values
//! less than 2^31 apart. `Ord` is deliberately not implemented; use
//! [`SequenceNumber::is_after`] and [`SequenceNumber::is_before`].

use std::fmt;
use std::ops::{Add, Sub};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct SequenceNumber(u32);

impl SequenceNumber {
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    pub const fn value(self) -> u32 {
        self.0
    }

    /// `true` if `self` comes strictly after `other` in sequence space.
    #[inline]
    pub fn is_after(self, other: Self) -> bool {
        (self.0.wrapping_sub(other.0) as i32) > 0
    }

    /// `true` if `self` comes strictly before `other` in sequence space.
    #[inline]
    pub fn is_before(self, other: Self) -> bool {
        (self.0.wrapping_sub(other.0) as i32) < 0
    }

    /// Number of bytes from `earlier` up to `self`, zero if `earlier` is not behind.
    #[inline]
    pub fn distance_from(self, earlier: Self) -> u32 {
        if self.is_after(earlier) {
            self.0.wrapping_sub(earlier.0)
        } else {
            0
        }
    }
}

impl From<u32> for SequenceNumber {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

impl From<SequenceNumber> for u32 {
    fn from(seq: SequenceNumber) -> Self {
        seq.0
    }
}

impl fmt::Display for SequenceNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl Add<u32> for SequenceNumber {
    type Output = SequenceNumber;

    fn add(self, bytes: u32) -> SequenceNumber {
        Self(self.0.wrapping_add(bytes))
    }
}

impl Sub for SequenceNumber {
    type Output = u32;

    fn sub(self, other: SequenceNumber) -> u32 {
        self.0.wrapping_sub(other.0)
    }
}

#[cfg(test)]
mod tests {
    use super::SequenceNumber;

    #[test]
    fn test_ordering_without_wrap() {
        let a = SequenceNumber::new(100);
        let b = SequenceNumber::new(200);
        assert!(b.is_after(a));
        assert!(a.is_before(b));
        assert!(!a.is_after(a));
        assert!(!a.is_before(a));
    }

    #[test]
    fn test_ordering_across_wrap() {
        let before_wrap = SequenceNumber::new(u32::MAX - 10);
        let after_wrap = before_wrap + 20;
        assert_eq!(after_wrap.value(), 9);
        assert!(after_wrap.is_after(before_wrap));
        assert_eq!(after_wrap - before_wrap, 20);
        assert_eq!(after_wrap.distance_from(before_wrap), 20);
        assert_eq!(before_wrap.distance_from(after_wrap), 0);
    }
}
