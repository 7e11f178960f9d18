use std::ops::{Add, AddAssign, Div, DivAssign, Mul, MulAssign, Neg, Sub, SubAssign};

use crate::error::{FixedError, Result};
use crate::fixed_point::Fixed;
use crate::limbs::{Limbs, Wide};

impl<const INT: u32, const FRAC: u32, const LIMBS: usize> Fixed<INT, FRAC, LIMBS> {
    /// Sum modulo `2^BITS`
    pub fn wrapping_add(self, rhs: Self) -> Self {
        Self::from_bits(self.to_bits().wrapping_add(&rhs.to_bits()))
    }

    /// Difference modulo `2^BITS`
    pub fn wrapping_sub(self, rhs: Self) -> Self {
        Self::from_bits(self.to_bits().wrapping_sub(&rhs.to_bits()))
    }

    /// `(2^BITS - self) mod 2^BITS`, so `MIN` negates to itself.
    pub fn wrapping_neg(self) -> Self {
        Self::from_bits(self.to_bits().wrapping_neg())
    }

    /// Rounding multiply.
    ///
    /// The full product of the magnitudes is shifted down by `FRAC`, rounded
    /// half up on the highest dropped bit, then given the sign of the result.
    /// Results outside the range wrap modulo `2^BITS`.
    pub fn wrapping_mul(self, rhs: Self) -> Self {
        let (low, high) = self.unsigned_abs().widening_mul(&rhs.unsigned_abs());
        let magnitude = Wide::from_parts(low, high).round_shr(FRAC);
        Self::with_sign(magnitude, self.is_negative() != rhs.is_negative())
    }

    pub fn square(self) -> Self {
        self.wrapping_mul(self)
    }

    /// Rounding divide.
    ///
    /// `|self| * 2^BITS` is divided by `|rhs|` and the quotient rounded half
    /// up on bit `INT - 1` as it is shifted into place.
    pub fn try_div(self, rhs: Self) -> Result<Self> {
        if rhs.is_zero() {
            tracing::trace!(dividend = %self, "division by zero");
            return Err(FixedError::DivideByZero);
        }
        let dividend = Wide::from_parts(Limbs::ZERO, self.unsigned_abs());
        let (quotient, _) = dividend.div_rem(&rhs.unsigned_abs());
        let magnitude = quotient.round_shr(INT);
        Ok(Self::with_sign(magnitude, self.is_negative() != rhs.is_negative()))
    }
}

impl<const INT: u32, const FRAC: u32, const LIMBS: usize> Neg for Fixed<INT, FRAC, LIMBS> {
    type Output = Self;

    fn neg(self) -> Self {
        self.wrapping_neg()
    }
}

macro_rules! binary_op {
    ($trait:ident, $method:ident, $assign_trait:ident, $assign_method:ident, $inherent:ident) => {
        impl<const INT: u32, const FRAC: u32, const LIMBS: usize> $trait
            for Fixed<INT, FRAC, LIMBS>
        {
            type Output = Self;

            fn $method(self, rhs: Self) -> Self {
                self.$inherent(rhs)
            }
        }

        impl<const INT: u32, const FRAC: u32, const LIMBS: usize> $assign_trait
            for Fixed<INT, FRAC, LIMBS>
        {
            fn $assign_method(&mut self, rhs: Self) {
                *self = self.$inherent(rhs);
            }
        }
    };
}

binary_op!(Add, add, AddAssign, add_assign, wrapping_add);
binary_op!(Sub, sub, SubAssign, sub_assign, wrapping_sub);
binary_op!(Mul, mul, MulAssign, mul_assign, wrapping_mul);

impl<const INT: u32, const FRAC: u32, const LIMBS: usize> Div for Fixed<INT, FRAC, LIMBS> {
    type Output = Self;

    /// # Panics
    ///
    /// Panics if `rhs` is zero. Use [`Fixed::try_div`] to get an error instead.
    fn div(self, rhs: Self) -> Self {
        match self.try_div(rhs) {
            Ok(quotient) => quotient,
            Err(_) => panic!("attempt to divide by zero"),
        }
    }
}

impl<const INT: u32, const FRAC: u32, const LIMBS: usize> DivAssign for Fixed<INT, FRAC, LIMBS> {
    fn div_assign(&mut self, rhs: Self) {
        *self = *self / rhs;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Fixed128, Fixed256, Fixed64};
    use proptest::prelude::*;

    fn f64_bits(raw: u64) -> Fixed64 {
        Fixed64::from_bits(Limbs::from_u64(raw))
    }

    #[test]
    fn test_add_one_and_a_half_plus_two_and_a_half() {
        let a = f64_bits((1 << 56) | (1 << 55));
        let b = f64_bits((2 << 56) | (1 << 55));
        assert_eq!(a + b, f64_bits(4 << 56));
    }

    #[test]
    fn test_add_wraps() {
        assert_eq!(Fixed64::MAX + Fixed64::EPSILON, Fixed64::MIN);
        assert_eq!(Fixed256::MIN - Fixed256::EPSILON, Fixed256::MAX);
    }

    #[test]
    fn test_neg() {
        assert_eq!(-Fixed128::ONE, Fixed128::from_int(-1));
        assert_eq!(-Fixed128::ZERO, Fixed128::ZERO);
        assert_eq!(-Fixed128::MIN, Fixed128::MIN);
    }

    #[test]
    fn test_mul_signs() {
        let three = Fixed256::from_int(3);
        let minus_two = Fixed256::from_int(-2);
        assert_eq!(three * minus_two, Fixed256::from_int(-6));
        assert_eq!(minus_two * minus_two, Fixed256::from_int(4));
        assert_eq!(Fixed256::ZERO * minus_two, Fixed256::ZERO);
        assert_eq!(minus_two.square(), Fixed256::from_int(4));
    }

    #[test]
    fn test_mul_rounds_half_up_on_magnitude() {
        // 2^-29 * 2^-28 = 2^-57: exactly half an ulp, rounds away from zero
        let a = f64_bits(1 << 27);
        let b = f64_bits(1 << 28);
        assert_eq!(a * b, Fixed64::EPSILON);
        assert_eq!((-a) * b, -Fixed64::EPSILON);
        // 2^-29 * 2^-29 = 2^-58: below half, truncates
        assert_eq!(a * a, Fixed64::ZERO);
    }

    #[test]
    fn test_div_one_by_two() {
        let half = Fixed64::ONE / Fixed64::from_int(2);
        assert_eq!(half, f64_bits(1 << 55));
    }

    #[test]
    fn test_div_rounds_at_every_width() {
        // 1/3 = 0.0101..., the first dropped bit is set at any even FRAC
        let third64 = Fixed64::ONE / Fixed64::from_int(3);
        assert_eq!(third64.to_bits().u64(0), 0x0055_5555_5555_5555);
        let third128 = Fixed128::ONE / Fixed128::from_int(3);
        assert_eq!(third128.to_bits().to_array(), [0x5555_5555_5555_5555, 0x5555_5555]);
        // 2/3 = 0.1010..., the first dropped bit is set: rounds up
        let two_thirds = Fixed128::from_int(2) / Fixed128::from_int(3);
        assert_eq!(two_thirds.to_bits().to_array(), [0xaaaa_aaaa_aaaa_aaab, 0xaaaa_aaaa]);
        let negative = Fixed128::from_int(-2) / Fixed128::from_int(3);
        assert_eq!(negative, -two_thirds);
    }

    #[test]
    fn test_div_by_zero() {
        assert_eq!(Fixed256::ONE.try_div(Fixed256::ZERO), Err(FixedError::DivideByZero));
    }

    #[test]
    #[should_panic(expected = "divide by zero")]
    fn test_div_operator_panics_on_zero() {
        let _ = Fixed64::ONE / Fixed64::ZERO;
    }

    #[test]
    fn test_assign_operators() {
        let mut x = Fixed128::from_int(5);
        x += Fixed128::ONE;
        x -= Fixed128::from_int(2);
        x *= Fixed128::from_int(3);
        x /= Fixed128::from_int(4);
        assert_eq!(x, Fixed128::from_int(3));
    }

    /// Dividend and divisor with magnitudes `raw >> shift`. The dividend is
    /// shortened until `|a| * 2^FRAC / |b|` is below `2^(BITS - 2)`, so the
    /// quotient magnitude is unambiguous.
    fn div_operands<const INT: u32, const FRAC: u32, const LIMBS: usize>(
        (a, a_shift, a_negative): ([u64; LIMBS], u32, bool),
        (b, b_shift, b_negative): ([u64; LIMBS], u32, bool),
    ) -> (Fixed<INT, FRAC, LIMBS>, Fixed<INT, FRAC, LIMBS>) {
        let divisor = Limbs::from_array(b) >> b_shift;
        let dividend = Limbs::from_array(a) >> a_shift;
        let excess =
            (dividend.bit_len() + FRAC + 3).saturating_sub(divisor.bit_len() + INT + FRAC);
        let signed = |magnitude: Limbs<LIMBS>, negative: bool| {
            let value = Fixed::<INT, FRAC, LIMBS>::from_bits(magnitude);
            if negative {
                -value
            } else {
                value
            }
        };
        (signed(dividend >> excess, a_negative), signed(divisor, b_negative))
    }

    /// `q = round(|a| * 2^FRAC / |b|)` half up, i.e.
    /// `(2q - 1)|b| <= 2|a| 2^FRAC < (2q + 1)|b|`, with the sign of `a * b`.
    fn assert_div_correctly_rounded<const INT: u32, const FRAC: u32, const LIMBS: usize>(
        a: Fixed<INT, FRAC, LIMBS>,
        b: Fixed<INT, FRAC, LIMBS>,
    ) {
        let q = a.try_div(b).unwrap();
        let magnitude = q.unsigned_abs();
        if !magnitude.is_zero() {
            assert_eq!(q.is_negative(), a.is_negative() != b.is_negative(), "{a:?} / {b:?}");
        }

        let divisor = Wide::from_parts(b.unsigned_abs(), Limbs::ZERO);
        let mut twice_dividend = Wide::from_parts(a.unsigned_abs(), Limbs::ZERO);
        twice_dividend.shl_assign(FRAC + 1);
        let (low, high) = magnitude.widening_mul(&b.unsigned_abs());
        let mut twice_product = Wide::from_parts(low, high);
        twice_product.shl_assign(1);

        let mut upper = twice_dividend;
        upper.add_assign(&divisor);
        assert!(twice_product <= upper, "{a:?} / {b:?} rounded too far up");
        let mut lower = twice_product;
        lower.add_assign(&divisor);
        assert!(twice_dividend < lower, "{a:?} / {b:?} rounded too far down");
    }

    #[test]
    fn test_div_rounding_bracket_on_known_quotients() {
        assert_div_correctly_rounded(Fixed128::from_int(2), Fixed128::from_int(3));
        assert_div_correctly_rounded(Fixed256::from_int(-1), Fixed256::from_int(7));
        let tiny = Fixed256::from_bits(Limbs::from_array([3, 0, 0, 0]));
        let wide = Fixed256::from_bits(Limbs::from_array([0, 0, 1, 0]));
        assert_div_correctly_rounded(tiny, wide);
        // 2^64 / 3 ulps: a quotient spanning every limb
        let middle = Fixed256::from_bits(Limbs::from_array([0, 1, 0, 0]));
        assert_div_correctly_rounded(-middle, tiny);
    }

    proptest! {
        #[test]
        fn prop_div_rounds_correctly_128(
            a in (any::<[u64; 2]>(), 1u32..128, any::<bool>()),
            b in (any::<[u64; 2]>(), 1u32..128, any::<bool>()),
        ) {
            let (a, b) = div_operands::<32, 96, 2>(a, b);
            prop_assume!(!b.is_zero());
            assert_div_correctly_rounded(a, b);
        }

        #[test]
        fn prop_div_rounds_correctly_256(
            a in (any::<[u64; 4]>(), 1u32..256, any::<bool>()),
            b in (any::<[u64; 4]>(), 1u32..256, any::<bool>()),
        ) {
            let (a, b) = div_operands::<64, 192, 4>(a, b);
            prop_assume!(!b.is_zero());
            assert_div_correctly_rounded(a, b);
        }
    }
}
