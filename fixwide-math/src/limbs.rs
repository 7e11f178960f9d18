//! Fixed-length limb vectors.
//!
//! [`Limbs`] is the storage under every fixed-point width: `N` unsigned 64-bit
//! words, least significant first. Everything here is total and works on the
//! raw bit pattern; sign interpretation lives in [`crate::Fixed`].

use std::cmp::Ordering;
use std::fmt;
use std::ops::{BitAnd, BitOr, BitXor, Not, Shl, Shr};

/// Bits per limb
pub const LIMB_BITS: u32 = 64;

/// Add with carry. Returns `(sum, carry_out)`.
#[inline]
pub const fn adc(a: u64, b: u64, carry: bool) -> (u64, bool) {
    let (sum, c1) = a.overflowing_add(b);
    let (sum, c2) = sum.overflowing_add(carry as u64);
    (sum, c1 | c2)
}

/// Subtract with borrow. Returns `(difference, borrow_out)`.
#[inline]
pub const fn sbb(a: u64, b: u64, borrow: bool) -> (u64, bool) {
    let (diff, b1) = a.overflowing_sub(b);
    let (diff, b2) = diff.overflowing_sub(borrow as u64);
    (diff, b1 | b2)
}

/// Widening limb multiply, `a * b` as `(high, low)`.
#[inline]
pub const fn mul_wide(a: u64, b: u64) -> (u64, u64) {
    let p = (a as u128) * (b as u128);
    ((p >> 64) as u64, p as u64)
}

/// `a * b + acc + carry` as `(high, low)`.
///
/// Never overflows: `(2^64 - 1)^2 + 2 * (2^64 - 1) = 2^128 - 1`.
#[inline]
pub const fn mac(a: u64, b: u64, acc: u64, carry: u64) -> (u64, u64) {
    let p = (a as u128) * (b as u128) + acc as u128 + carry as u128;
    ((p >> 64) as u64, p as u64)
}

pub(crate) fn add_assign_slice(acc: &mut [u64], rhs: &[u64]) -> bool {
    let mut carry = false;
    for (a, &b) in acc.iter_mut().zip(rhs) {
        let (sum, c) = adc(*a, b, carry);
        *a = sum;
        carry = c;
    }
    carry
}

pub(crate) fn sub_assign_slice(acc: &mut [u64], rhs: &[u64]) -> bool {
    let mut borrow = false;
    for (a, &b) in acc.iter_mut().zip(rhs) {
        let (diff, b_out) = sbb(*a, b, borrow);
        *a = diff;
        borrow = b_out;
    }
    borrow
}

/// Unsigned comparison of equal-length limb slices
pub(crate) fn cmp_slice(a: &[u64], b: &[u64]) -> Ordering {
    debug_assert_eq!(a.len(), b.len());
    a.iter().rev().cmp(b.iter().rev())
}

pub(crate) fn bit_len_slice(limbs: &[u64]) -> u32 {
    limbs
        .iter()
        .rposition(|&limb| limb != 0)
        .map_or(0, |top| top as u32 * LIMB_BITS + (LIMB_BITS - limbs[top].leading_zeros()))
}

pub(crate) fn shl_slice(limbs: &mut [u64], bits: u32) {
    let len = limbs.len();
    let limb_shift = (bits / LIMB_BITS) as usize;
    let bit_shift = bits % LIMB_BITS;
    if limb_shift >= len {
        limbs.fill(0);
        return;
    }
    // Walk downwards so every source limb is read before it is overwritten.
    for i in (0..len).rev() {
        let current = if i >= limb_shift { limbs[i - limb_shift] } else { 0 };
        limbs[i] = if bit_shift == 0 {
            current
        } else {
            let below = if i > limb_shift { limbs[i - limb_shift - 1] } else { 0 };
            (current << bit_shift) | (below >> (LIMB_BITS - bit_shift))
        };
    }
}

pub(crate) fn shr_slice(limbs: &mut [u64], bits: u32) {
    let len = limbs.len();
    let limb_shift = (bits / LIMB_BITS) as usize;
    let bit_shift = bits % LIMB_BITS;
    if limb_shift >= len {
        limbs.fill(0);
        return;
    }
    for i in 0..len {
        let current = if i + limb_shift < len { limbs[i + limb_shift] } else { 0 };
        limbs[i] = if bit_shift == 0 {
            current
        } else {
            let above = if i + limb_shift + 1 < len { limbs[i + limb_shift + 1] } else { 0 };
            (current >> bit_shift) | (above << (LIMB_BITS - bit_shift))
        };
    }
}

/// `N` little-endian 64-bit limbs holding a `64 * N`-bit pattern.
///
/// Arithmetic wraps modulo `2^(64 * N)`. [`Ord`] is the unsigned order of the
/// pattern.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Limbs<const N: usize>(pub(crate) [u64; N]);

impl<const N: usize> Limbs<N> {
    /// Width in bits
    pub const BITS: u32 = N as u32 * LIMB_BITS;

    pub const ZERO: Self = Self([0; N]);

    /// All bits set
    pub const MAX: Self = Self([u64::MAX; N]);

    /// All bits set except the top one
    pub const SIGNED_MAX: Self = {
        let mut limbs = [u64::MAX; N];
        limbs[N - 1] = u64::MAX >> 1;
        Self(limbs)
    };

    pub const fn from_array(limbs: [u64; N]) -> Self {
        Self(limbs)
    }

    pub const fn to_array(self) -> [u64; N] {
        self.0
    }

    pub fn as_slice(&self) -> &[u64] {
        &self.0
    }

    pub const fn from_u64(value: u64) -> Self {
        let mut limbs = [0; N];
        limbs[0] = value;
        Self(limbs)
    }

    /// `2^bit`, or zero when `bit` is outside the width.
    pub const fn power_of_two(bit: u32) -> Self {
        let mut limbs = [0; N];
        if bit < Self::BITS {
            limbs[(bit / LIMB_BITS) as usize] = 1 << (bit % LIMB_BITS);
        }
        Self(limbs)
    }

    /// The low `bits` bits set.
    pub fn low_mask(bits: u32) -> Self {
        if bits >= Self::BITS {
            Self::MAX
        } else {
            !(Self::MAX << bits)
        }
    }

    /// 32-bit word `index`, least significant first
    pub fn u32(&self, index: usize) -> u32 {
        (self.0[index / 2] >> (32 * (index % 2))) as u32
    }

    pub fn set_u32(&mut self, index: usize, value: u32) {
        let shift = 32 * (index % 2);
        let limb = &mut self.0[index / 2];
        *limb = (*limb & !(0xffff_ffff_u64 << shift)) | (u64::from(value) << shift);
    }

    /// 64-bit word `index`, least significant first
    pub fn u64(&self, index: usize) -> u64 {
        self.0[index]
    }

    pub fn set_u64(&mut self, index: usize, value: u64) {
        self.0[index] = value;
    }

    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|&limb| limb == 0)
    }

    /// Bit `index`; bits outside the width read as zero.
    pub fn bit(&self, index: u32) -> bool {
        index < Self::BITS && (self.0[(index / LIMB_BITS) as usize] >> (index % LIMB_BITS)) & 1 == 1
    }

    /// Set bit `index`; ignored outside the width.
    pub fn set_bit(&mut self, index: u32) {
        if index < Self::BITS {
            self.0[(index / LIMB_BITS) as usize] |= 1 << (index % LIMB_BITS);
        }
    }

    /// Number of significant bits (zero for zero)
    pub fn bit_len(&self) -> u32 {
        bit_len_slice(&self.0)
    }

    pub fn leading_zeros(&self) -> u32 {
        Self::BITS - self.bit_len()
    }

    /// Ripple add, returning the carry out of the top limb.
    pub fn overflowing_add(&self, rhs: &Self) -> (Self, bool) {
        let mut out = *self;
        let carry = add_assign_slice(&mut out.0, &rhs.0);
        (out, carry)
    }

    /// Ripple subtract, returning the borrow out of the top limb.
    pub fn overflowing_sub(&self, rhs: &Self) -> (Self, bool) {
        let mut out = *self;
        let borrow = sub_assign_slice(&mut out.0, &rhs.0);
        (out, borrow)
    }

    pub fn wrapping_add(&self, rhs: &Self) -> Self {
        self.overflowing_add(rhs).0
    }

    pub fn wrapping_sub(&self, rhs: &Self) -> Self {
        self.overflowing_sub(rhs).0
    }

    /// `(2^BITS - self) mod 2^BITS`: invert, then ripple in a one.
    pub fn wrapping_neg(&self) -> Self {
        (!*self).wrapping_add(&Self::from_u64(1))
    }

    /// Full `2 * BITS`-bit product as `(low, high)`.
    ///
    /// Operand-scanning schoolbook: row `i` accumulates `self[i] * rhs[j]`
    /// into column `i + j` together with the running carry, and the row's
    /// final carry lands in column `i + N`.
    pub fn widening_mul(&self, rhs: &Self) -> (Self, Self) {
        let mut product = [[0u64; N]; 2];
        let columns = product.as_flattened_mut();
        for (i, &a) in self.0.iter().enumerate() {
            let mut carry = 0;
            for (j, &b) in rhs.0.iter().enumerate() {
                let (high, low) = mac(a, b, columns[i + j], carry);
                columns[i + j] = low;
                carry = high;
            }
            columns[i + N] = carry;
        }
        (Self(product[0]), Self(product[1]))
    }

    /// `self * factor`, returning the limb carried out of the top.
    pub fn mul_small(&self, factor: u64) -> (Self, u64) {
        let mut out = [0; N];
        let mut carry = 0;
        for (o, &limb) in out.iter_mut().zip(&self.0) {
            let (high, low) = mac(limb, factor, 0, carry);
            *o = low;
            carry = high;
        }
        (Self(out), carry)
    }

    /// Quotient and remainder of division by a single limb.
    ///
    /// # Panics
    ///
    /// Panics if `divisor` is zero.
    pub fn div_rem_small(&self, divisor: u64) -> (Self, u64) {
        let divisor = u128::from(divisor);
        let mut out = [0; N];
        let mut rem = 0u128;
        for i in (0..N).rev() {
            let acc = (rem << LIMB_BITS) | u128::from(self.0[i]);
            out[i] = (acc / divisor) as u64;
            rem = acc % divisor;
        }
        (Self(out), rem as u64)
    }
}

impl<const N: usize> Default for Limbs<N> {
    fn default() -> Self {
        Self::ZERO
    }
}

impl<const N: usize> Ord for Limbs<N> {
    fn cmp(&self, other: &Self) -> Ordering {
        cmp_slice(&self.0, &other.0)
    }
}

impl<const N: usize> PartialOrd for Limbs<N> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<const N: usize> fmt::LowerHex for Limbs<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if f.alternate() {
            f.write_str("0x")?;
        }
        for limb in self.0.iter().rev() {
            write!(f, "{limb:016x}")?;
        }
        Ok(())
    }
}

impl<const N: usize> fmt::Debug for Limbs<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Limbs({self:#x})")
    }
}

impl<const N: usize> Not for Limbs<N> {
    type Output = Self;

    fn not(self) -> Self {
        Self(self.0.map(|limb| !limb))
    }
}

macro_rules! limbwise_op {
    ($trait:ident, $method:ident, $op:tt) => {
        impl<const N: usize> $trait for Limbs<N> {
            type Output = Self;

            fn $method(mut self, rhs: Self) -> Self {
                for (a, b) in self.0.iter_mut().zip(rhs.0) {
                    *a = *a $op b;
                }
                self
            }
        }
    };
}

limbwise_op!(BitAnd, bitand, &);
limbwise_op!(BitOr, bitor, |);
limbwise_op!(BitXor, bitxor, ^);

impl<const N: usize> Shl<u32> for Limbs<N> {
    type Output = Self;

    /// Logical shift; shifts of `BITS` or more give zero.
    fn shl(mut self, bits: u32) -> Self {
        shl_slice(&mut self.0, bits);
        self
    }
}

impl<const N: usize> Shr<u32> for Limbs<N> {
    type Output = Self;

    /// Logical shift; shifts of `BITS` or more give zero.
    fn shr(mut self, bits: u32) -> Self {
        shr_slice(&mut self.0, bits);
        self
    }
}

/// Double-width scratch value: bits `0..BITS` in the first half, `BITS..2*BITS`
/// in the second. Holds full products, widened dividends and square-root
/// radicands.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub(crate) struct Wide<const N: usize> {
    limbs: [[u64; N]; 2],
}

impl<const N: usize> Wide<N> {
    pub(crate) const ZERO: Self = Self { limbs: [[0; N]; 2] };

    pub(crate) const fn from_limbs(limbs: [[u64; N]; 2]) -> Self {
        Self { limbs }
    }

    pub(crate) fn from_parts(low: Limbs<N>, high: Limbs<N>) -> Self {
        Self { limbs: [low.0, high.0] }
    }

    pub(crate) fn power_of_two(bit: u32) -> Self {
        let mut wide = Self::ZERO;
        wide.set_bit(bit);
        wide
    }

    pub(crate) fn low(&self) -> Limbs<N> {
        Limbs(self.limbs[0])
    }

    fn flat(&self) -> &[u64] {
        self.limbs.as_flattened()
    }

    fn flat_mut(&mut self) -> &mut [u64] {
        self.limbs.as_flattened_mut()
    }

    pub(crate) fn is_zero(&self) -> bool {
        self.flat().iter().all(|&limb| limb == 0)
    }

    pub(crate) fn bit(&self, index: u32) -> bool {
        let flat = self.flat();
        let limb = (index / LIMB_BITS) as usize;
        limb < flat.len() && (flat[limb] >> (index % LIMB_BITS)) & 1 == 1
    }

    pub(crate) fn set_bit(&mut self, index: u32) {
        let flat = self.flat_mut();
        let limb = (index / LIMB_BITS) as usize;
        if limb < flat.len() {
            flat[limb] |= 1 << (index % LIMB_BITS);
        }
    }

    pub(crate) fn bit_len(&self) -> u32 {
        bit_len_slice(self.flat())
    }

    pub(crate) fn shl_assign(&mut self, bits: u32) {
        shl_slice(self.flat_mut(), bits);
    }

    pub(crate) fn shr_assign(&mut self, bits: u32) {
        shr_slice(self.flat_mut(), bits);
    }

    pub(crate) fn add_assign(&mut self, rhs: &Self) -> bool {
        add_assign_slice(self.flat_mut(), rhs.flat())
    }

    pub(crate) fn sub_assign(&mut self, rhs: &Self) -> bool {
        sub_assign_slice(self.flat_mut(), rhs.flat())
    }

    /// `(self >> shift) + bit(shift - 1)`, truncated to the low half.
    ///
    /// Round half up on the first discarded bit.
    pub(crate) fn round_shr(&self, shift: u32) -> Limbs<N> {
        let round = shift > 0 && self.bit(shift - 1);
        let mut shifted = *self;
        shifted.shr_assign(shift);
        shifted.low().wrapping_add(&Limbs::from_u64(u64::from(round)))
    }

    /// Bit-serial restoring division by a single-width divisor.
    ///
    /// The caller guarantees a non-zero divisor.
    pub(crate) fn div_rem(&self, divisor: &Limbs<N>) -> (Self, Limbs<N>) {
        debug_assert!(!divisor.is_zero());
        let top = Limbs::<N>::BITS - 1;
        let mut quotient = Self::ZERO;
        let mut rem = Limbs::<N>::ZERO;
        for i in (0..self.bit_len()).rev() {
            // A set top bit means the shifted remainder is at least 2^BITS,
            // which always exceeds the divisor.
            let spill = rem.bit(top);
            rem = rem << 1;
            if self.bit(i) {
                rem.0[0] |= 1;
            }
            if spill || rem >= *divisor {
                rem = rem.wrapping_sub(divisor);
                quotient.set_bit(i);
            }
        }
        (quotient, rem)
    }
}

impl<const N: usize> Ord for Wide<N> {
    fn cmp(&self, other: &Self) -> Ordering {
        cmp_slice(self.flat(), other.flat())
    }
}

impl<const N: usize> PartialOrd for Wide<N> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limbs2(value: u128) -> Limbs<2> {
        Limbs::from_array([value as u64, (value >> 64) as u64])
    }

    fn to_u128(limbs: Limbs<2>) -> u128 {
        u128::from(limbs.u64(0)) | (u128::from(limbs.u64(1)) << 64)
    }

    #[test]
    fn test_u32_slices() {
        let mut l = Limbs::<2>::from_array([0x1111_2222_3333_4444, 0x5555_6666_7777_8888]);
        assert_eq!(l.u32(0), 0x3333_4444);
        assert_eq!(l.u32(1), 0x1111_2222);
        assert_eq!(l.u32(3), 0x5555_6666);
        l.set_u32(2, 0xdead_beef);
        assert_eq!(l.u64(1), 0x5555_6666_dead_beef);
        l.set_u64(0, 7);
        assert_eq!(l.u32(0), 7);
        assert_eq!(l.u32(1), 0);
    }

    #[test]
    fn test_carry_ripples_across_limbs() {
        let a = Limbs::<4>::from_array([u64::MAX, u64::MAX, u64::MAX, 0]);
        let (sum, carry) = a.overflowing_add(&Limbs::from_u64(1));
        assert_eq!(sum.to_array(), [0, 0, 0, 1]);
        assert!(!carry);

        let (wrapped, carry) = Limbs::<4>::MAX.overflowing_add(&Limbs::from_u64(1));
        assert!(wrapped.is_zero());
        assert!(carry);
    }

    #[test]
    fn test_borrow_ripples_across_limbs() {
        let a = Limbs::<3>::from_array([0, 0, 1]);
        let (diff, borrow) = a.overflowing_sub(&Limbs::from_u64(1));
        assert_eq!(diff.to_array(), [u64::MAX, u64::MAX, 0]);
        assert!(!borrow);

        let (diff, borrow) = Limbs::<3>::ZERO.overflowing_sub(&Limbs::from_u64(1));
        assert_eq!(diff, Limbs::MAX);
        assert!(borrow);
    }

    #[test]
    fn test_neg() {
        assert_eq!(Limbs::<2>::ZERO.wrapping_neg(), Limbs::ZERO);
        assert_eq!(Limbs::<2>::from_u64(1).wrapping_neg(), Limbs::MAX);
        let min = Limbs::<2>::power_of_two(127);
        assert_eq!(min.wrapping_neg(), min);
    }

    #[test]
    fn test_shifts_span_limbs() {
        let x = 0x0123_4567_89ab_cdef_fedc_ba98_7654_3210u128;
        for bits in [0, 1, 4, 63, 64, 65, 100, 127] {
            assert_eq!(to_u128(limbs2(x) << bits), x << bits, "shl {bits}");
            assert_eq!(to_u128(limbs2(x) >> bits), x >> bits, "shr {bits}");
        }
        assert!((limbs2(x) << 128).is_zero());
        assert!((limbs2(x) >> 200).is_zero());
    }

    #[test]
    fn test_widening_mul_matches_u128() {
        let cases = [(0u64, 5u64), (u64::MAX, u64::MAX), (0x8000_0000_0000_0001, 3)];
        for (a, b) in cases {
            let (low, high) = Limbs::<1>::from_u64(a).widening_mul(&Limbs::from_u64(b));
            let expected = u128::from(a) * u128::from(b);
            assert_eq!(low.u64(0), expected as u64);
            assert_eq!(high.u64(0), (expected >> 64) as u64);
        }
    }

    #[test]
    fn test_widening_mul_two_limbs() {
        // (2^128 - 1)^2 = 2^256 - 2^129 + 1
        let (low, high) = Limbs::<2>::MAX.widening_mul(&Limbs::MAX);
        assert_eq!(low.to_array(), [1, 0]);
        assert_eq!(high.to_array(), [u64::MAX - 1, u64::MAX]);
    }

    #[test]
    fn test_small_mul_and_div() {
        let x = limbs2(0xffff_ffff_ffff_ffff_ffff_ffff_ffff_fff0);
        let (q, r) = x.div_rem_small(10);
        assert_eq!(to_u128(q), 0xffff_ffff_ffff_ffff_ffff_ffff_ffff_fff0 / 10);
        assert_eq!(u128::from(r), 0xffff_ffff_ffff_ffff_ffff_ffff_ffff_fff0 % 10);

        let (p, carry) = x.mul_small(16);
        assert_eq!(to_u128(p), 0xffff_ffff_ffff_ffff_ffff_ffff_ffff_ff00);
        assert_eq!(carry, 0xf);
    }

    #[test]
    fn test_bits_and_ordering() {
        let x = Limbs::<2>::power_of_two(70);
        assert!(x.bit(70));
        assert!(!x.bit(69));
        assert!(!x.bit(500));
        assert_eq!(x.bit_len(), 71);
        assert_eq!(x.leading_zeros(), 57);
        assert_eq!(Limbs::<2>::ZERO.bit_len(), 0);
        assert!(Limbs::<2>::from_u64(u64::MAX) < x);
        assert!(Limbs::<2>::MAX > x);
        assert_eq!(to_u128(Limbs::<2>::low_mask(70)), (1u128 << 70) - 1);
        assert_eq!(Limbs::<2>::low_mask(128), Limbs::MAX);
        assert_eq!(!Limbs::<2>::SIGNED_MAX, Limbs::power_of_two(127));
    }

    #[test]
    fn test_hex_formatting() {
        let x = Limbs::<2>::from_array([0xab, 1]);
        assert_eq!(format!("{x:#x}"), "0x000000000000000100000000000000ab");
        assert_eq!(format!("{x:?}"), "Limbs(0x000000000000000100000000000000ab)");
    }

    #[test]
    fn test_wide_division_matches_u128() {
        let cases = [
            (0x0123_4567_89ab_cdefu64, 3u64),
            (u64::MAX, 1),
            (1, u64::MAX),
            (0x8000_0000_0000_0000, 0x8000_0000_0000_0001),
        ];
        for (a, b) in cases {
            let dividend = Wide::from_parts(Limbs::<1>::ZERO, Limbs::from_u64(a));
            let (q, r) = dividend.div_rem(&Limbs::from_u64(b));
            let expected = (u128::from(a) << 64) / u128::from(b);
            assert_eq!(q.low().u64(0), expected as u64, "{a:#x} / {b:#x}");
            assert_eq!(q.flat()[1], (expected >> 64) as u64, "{a:#x} / {b:#x}");
            assert_eq!(u128::from(r.u64(0)), (u128::from(a) << 64) % u128::from(b));
        }
    }

    #[test]
    fn test_wide_round_shr() {
        // 0b1011 >> 2 = 0b10, first discarded bit set -> 0b11
        let w = Wide::from_parts(Limbs::<1>::from_u64(0b1011), Limbs::ZERO);
        assert_eq!(w.round_shr(2).u64(0), 0b11);
        assert_eq!(w.round_shr(3).u64(0), 0b1);
        let w = Wide::from_parts(Limbs::<1>::ZERO, Limbs::from_u64(1));
        assert_eq!(w.round_shr(1).u64(0), 1 << 63);
    }
}
