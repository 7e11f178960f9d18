use crate::error::{FixedError, Result};
use crate::fixed_point::Fixed;
use crate::limbs::{Limbs, Wide};

impl<const INT: u32, const FRAC: u32, const LIMBS: usize> Fixed<INT, FRAC, LIMBS> {
    /// Correctly rounded square root.
    ///
    /// Bit-by-bit: result bits from `2^(INT/2 - 1)` down to `2^(-FRAC - 1)`
    /// are kept when the squared candidate does not exceed `self`. This runs
    /// as the integer square root of `raw * 2^(FRAC + 2)`, tracking the
    /// remainder instead of squaring candidates, and the extra low bit rounds
    /// the result half up.
    pub fn sqrt(self) -> Result<Self> {
        if self.is_negative() {
            tracing::trace!(operand = %self, "square root of a negative value");
            return Err(FixedError::Domain);
        }

        let mut rem = Wide::from_parts(self.to_bits(), Limbs::ZERO);
        rem.shl_assign(FRAC + 2);

        // The root of a value below 2^(INT + 2*FRAC + 1) has this many bits.
        let root_bits = FRAC + 1 + INT / 2;
        let mut bit = Wide::<LIMBS>::power_of_two(2 * (root_bits - 1));
        let mut root = Wide::<LIMBS>::ZERO;
        while !bit.is_zero() {
            let mut trial = root;
            trial.add_assign(&bit);
            root.shr_assign(1);
            if rem >= trial {
                rem.sub_assign(&trial);
                root.add_assign(&bit);
            }
            bit.shr_assign(2);
        }

        Ok(Self::from_bits(root.round_shr(1)))
    }
}
