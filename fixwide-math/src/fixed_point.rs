use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{FixedError, Result};
use crate::limbs::{Limbs, LIMB_BITS};

/// Signed two's-complement fixed-point number with `INT` integer bits and
/// `FRAC` fractional bits, stored in `LIMBS` 64-bit limbs.
///
/// The value is the stored pattern, read as a signed integer, times
/// `2^-FRAC`. Layouts must satisfy `INT + FRAC == 64 * LIMBS`, `INT >= 8`
/// and `FRAC >= 1`; anything else fails to compile once instantiated.
///
/// Equality is bit-pattern equality. `Ord` is the signed order.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Fixed<const INT: u32, const FRAC: u32, const LIMBS: usize> {
    bits: Limbs<LIMBS>,
}

/// 8 integer bits, 56 fractional bits
pub type Fixed64 = Fixed<8, 56, 1>;
/// 32 integer bits, 96 fractional bits
pub type Fixed128 = Fixed<32, 96, 2>;
/// 64 integer bits, 192 fractional bits
pub type Fixed256 = Fixed<64, 192, 4>;

impl<const INT: u32, const FRAC: u32, const LIMBS: usize> Fixed<INT, FRAC, LIMBS> {
    const LAYOUT: () = assert!(
        INT + FRAC == LIMBS as u32 * LIMB_BITS && INT >= 8 && FRAC >= 1,
        "fixed-point layout needs INT + FRAC == 64 * LIMBS, INT >= 8 and FRAC >= 1"
    );

    pub const BITS: u32 = INT + FRAC;
    pub const INT_BITS: u32 = INT;
    pub const FRAC_BITS: u32 = FRAC;

    pub const ZERO: Self = Self::from_bits(Limbs::ZERO);
    pub const ONE: Self = Self::from_bits(Limbs::power_of_two(FRAC));
    /// `-2^(INT - 1)`
    pub const MIN: Self = Self::from_bits(Limbs::power_of_two(INT + FRAC - 1));
    /// `2^(INT - 1) - 2^-FRAC`
    pub const MAX: Self = Self::from_bits(Limbs::SIGNED_MAX);
    /// Smallest positive value, `2^-FRAC`
    pub const EPSILON: Self = Self::from_bits(Limbs::from_u64(1));

    /// Wrap a raw two's-complement bit pattern.
    pub const fn from_bits(bits: Limbs<LIMBS>) -> Self {
        let () = Self::LAYOUT;
        Self { bits }
    }

    pub const fn to_bits(self) -> Limbs<LIMBS> {
        self.bits
    }

    /// Integer `value` moved into place; bits above the integer field are
    /// dropped (modulo `2^BITS`).
    pub fn from_int(value: i64) -> Self {
        let fill = if value < 0 { u64::MAX } else { 0 };
        let mut limbs = [fill; LIMBS];
        limbs[0] = value as u64;
        Self::from_bits(Limbs::from_array(limbs) << FRAC)
    }

    pub fn is_zero(&self) -> bool {
        self.bits.is_zero()
    }

    pub fn is_negative(&self) -> bool {
        self.bits.bit(Self::BITS - 1)
    }

    /// Absolute value as an unsigned pattern. `MIN` maps to `2^(BITS - 1)`,
    /// which is its exact magnitude.
    pub fn unsigned_abs(&self) -> Limbs<LIMBS> {
        if self.is_negative() {
            self.bits.wrapping_neg()
        } else {
            self.bits
        }
    }

    /// Reapply a sign to an unsigned magnitude, modulo `2^BITS`.
    pub(crate) fn with_sign(magnitude: Limbs<LIMBS>, negative: bool) -> Self {
        if negative {
            Self::from_bits(magnitude.wrapping_neg())
        } else {
            Self::from_bits(magnitude)
        }
    }

    /// Signed value from a magnitude, or `None` if it is outside the range.
    pub(crate) fn from_magnitude(magnitude: Limbs<LIMBS>, negative: bool) -> Option<Self> {
        let limit = if negative {
            Self::MIN.bits
        } else {
            Self::MAX.bits
        };
        (magnitude <= limit).then(|| Self::with_sign(magnitude, negative))
    }

    /// Convert from another layout.
    ///
    /// Bits are re-aligned on the binary point. When the destination has fewer
    /// fractional bits the magnitude is rounded half up on the first dropped
    /// bit. Magnitudes the destination cannot hold are an error.
    pub fn try_from_fixed<const I2: u32, const F2: u32, const N2: usize>(
        other: Fixed<I2, F2, N2>,
    ) -> Result<Self> {
        let out_of_range = || {
            tracing::trace!(
                from_bits = Fixed::<I2, F2, N2>::BITS,
                to_bits = Self::BITS,
                "width conversion out of range"
            );
            FixedError::OutOfRange { bits: Self::BITS }
        };

        let source = other.unsigned_abs();
        let offset = i64::from(FRAC) - i64::from(F2);
        let mut magnitude = Limbs::<LIMBS>::ZERO;
        let mut round = false;
        for i in (0..source.bit_len()).filter(|&i| source.bit(i)) {
            let target = i64::from(i) + offset;
            if target >= i64::from(Self::BITS) {
                return Err(out_of_range());
            }
            if target >= 0 {
                magnitude.set_bit(target as u32);
            } else if target == -1 {
                round = true;
            }
        }

        let (magnitude, carry) = magnitude.overflowing_add(&Limbs::from_u64(u64::from(round)));
        if carry {
            return Err(out_of_range());
        }
        Self::from_magnitude(magnitude, other.is_negative()).ok_or_else(out_of_range)
    }
}

impl<const INT: u32, const FRAC: u32, const LIMBS: usize> fmt::Debug for Fixed<INT, FRAC, LIMBS> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fixed<{INT}, {FRAC}>({self})")
    }
}

impl<const INT: u32, const FRAC: u32, const LIMBS: usize> Serialize for Fixed<INT, FRAC, LIMBS> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de, const INT: u32, const FRAC: u32, const LIMBS: usize> Deserialize<'de>
    for Fixed<INT, FRAC, LIMBS>
{
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}
