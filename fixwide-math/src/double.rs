use crate::fixed_point::Fixed;
use crate::limbs::Limbs;

const MANTISSA_BITS: u32 = 52;
const EXPONENT_BIAS: i32 = 1023;

/// `2^exp` for a normal exponent, built from its bit pattern.
fn pow2(exp: i32) -> f64 {
    debug_assert!((1 - EXPONENT_BIAS..=EXPONENT_BIAS).contains(&exp));
    f64::from_bits(((exp + EXPONENT_BIAS) as u64) << MANTISSA_BITS)
}

/// `x * 2^exp` by exact power-of-two factors.
fn scale_pow2(mut x: f64, mut exp: i32) -> f64 {
    const STEP: i32 = 1000;
    while exp > STEP {
        x *= pow2(STEP);
        exp -= STEP;
    }
    while exp < -STEP {
        x *= pow2(-STEP);
        exp += STEP;
    }
    x * pow2(exp)
}

/// A non-negative integral double as limbs, modulo `2^(64 * N)`.
fn integral_to_limbs<const N: usize>(x: f64) -> Limbs<N> {
    if x == 0.0 {
        return Limbs::ZERO;
    }
    let bits = x.to_bits();
    let exp = ((bits >> MANTISSA_BITS) & 0x7ff) as i32 - EXPONENT_BIAS - MANTISSA_BITS as i32;
    let mantissa = (bits & ((1 << MANTISSA_BITS) - 1)) | (1 << MANTISSA_BITS);
    if exp >= 0 {
        Limbs::from_u64(mantissa) << exp as u32
    } else {
        // Integral, so the shifted-out bits are zero.
        Limbs::from_u64(mantissa >> -exp)
    }
}

impl<const INT: u32, const FRAC: u32, const LIMBS: usize> Fixed<INT, FRAC, LIMBS> {
    /// Nearest double.
    ///
    /// The top 54 bits of the magnitude are taken, nudged by their lowest bit
    /// and converted, then scaled back by a power of two.
    pub fn to_f64(self) -> f64 {
        if self.is_zero() {
            return 0.0;
        }
        let magnitude = self.unsigned_abs();
        let len = magnitude.bit_len();
        let top = if len < 54 {
            magnitude << (54 - len)
        } else {
            magnitude >> (len - 54)
        }
        .u64(0);
        let rounded = (top + (top & 1)) as f64;
        let value = scale_pow2(rounded, len as i32 - 54 - FRAC as i32);
        if self.is_negative() {
            -value
        } else {
            value
        }
    }

    /// Convert a double, truncating bits below `2^-FRAC`.
    ///
    /// Integer and fractional parts are split with the double's own
    /// truncation; integer parts beyond the range wrap modulo `2^BITS`.
    /// NaN and infinities give zero.
    pub fn from_f64(x: f64) -> Self {
        if !x.is_finite() {
            tracing::trace!(x, "non-finite double converts to zero");
            return Self::ZERO;
        }
        let magnitude = x.abs();
        let integer = integral_to_limbs::<LIMBS>(magnitude.trunc());
        let fraction =
            integral_to_limbs::<LIMBS>(scale_pow2(magnitude.fract(), FRAC as i32).trunc());
        let bits = (integer << FRAC).wrapping_add(&fraction);
        Self::with_sign(bits, x < 0.0)
    }
}
