//! Pluggable multiply and square.
//!
//! [`Schoolbook`] is the arithmetic core itself. [`ColumnScan`] computes the
//! same products one output column at a time, the shape a hand-tuned routine
//! takes, and has to agree with [`Schoolbook`] bit for bit. Use
//! [`first_mismatch`] to check a backend before trusting it.

use crate::fixed_point::Fixed;
use crate::limbs::{adc, mul_wide, Limbs, Wide};

pub trait MulBackend {
    /// Rounding multiply with the contract of [`Fixed::wrapping_mul`].
    fn mul<const INT: u32, const FRAC: u32, const LIMBS: usize>(
        &self,
        a: Fixed<INT, FRAC, LIMBS>,
        b: Fixed<INT, FRAC, LIMBS>,
    ) -> Fixed<INT, FRAC, LIMBS>;

    fn square<const INT: u32, const FRAC: u32, const LIMBS: usize>(
        &self,
        a: Fixed<INT, FRAC, LIMBS>,
    ) -> Fixed<INT, FRAC, LIMBS> {
        self.mul(a, a)
    }
}

/// Portable operand-scanning multiply
#[derive(Debug, Clone, Copy, Default)]
pub struct Schoolbook;

impl MulBackend for Schoolbook {
    fn mul<const INT: u32, const FRAC: u32, const LIMBS: usize>(
        &self,
        a: Fixed<INT, FRAC, LIMBS>,
        b: Fixed<INT, FRAC, LIMBS>,
    ) -> Fixed<INT, FRAC, LIMBS> {
        a.wrapping_mul(b)
    }

    fn square<const INT: u32, const FRAC: u32, const LIMBS: usize>(
        &self,
        a: Fixed<INT, FRAC, LIMBS>,
    ) -> Fixed<INT, FRAC, LIMBS> {
        a.square()
    }
}

/// Product-scanning multiply with a dedicated squaring path
#[derive(Debug, Clone, Copy, Default)]
pub struct ColumnScan;

/// Three-limb column sum. Holds up to `2^64` double products, far more than
/// any column has.
#[derive(Default)]
struct Accumulator([u64; 3]);

impl Accumulator {
    fn add_wide(&mut self, high: u64, low: u64) {
        let (l0, carry) = adc(self.0[0], low, false);
        let (l1, carry) = adc(self.0[1], high, carry);
        self.0 = [l0, l1, self.0[2].wrapping_add(u64::from(carry))];
    }

    fn add_product(&mut self, a: u64, b: u64) {
        let (high, low) = mul_wide(a, b);
        self.add_wide(high, low);
    }

    fn add_doubled_product(&mut self, a: u64, b: u64) {
        let (high, low) = mul_wide(a, b);
        self.0[2] = self.0[2].wrapping_add(high >> 63);
        self.add_wide((high << 1) | (low >> 63), low << 1);
    }

    /// Emit the finished column and move on to the next.
    fn shift_out(&mut self) -> u64 {
        let [done, l1, l2] = self.0;
        self.0 = [l1, l2, 0];
        done
    }
}

fn column_product<const N: usize>(a: &Limbs<N>, b: &Limbs<N>) -> Wide<N> {
    let (a, b) = (a.as_slice(), b.as_slice());
    let mut product = [[0u64; N]; 2];
    let columns = product.as_flattened_mut();
    let mut acc = Accumulator::default();
    for k in 0..2 * N - 1 {
        for i in k.saturating_sub(N - 1)..=k.min(N - 1) {
            acc.add_product(a[i], b[k - i]);
        }
        columns[k] = acc.shift_out();
    }
    columns[2 * N - 1] = acc.shift_out();
    Wide::from_limbs(product)
}

fn column_square<const N: usize>(a: &Limbs<N>) -> Wide<N> {
    let a = a.as_slice();
    let mut product = [[0u64; N]; 2];
    let columns = product.as_flattened_mut();
    let mut acc = Accumulator::default();
    for k in 0..2 * N - 1 {
        // Each cross product a[i] * a[k - i] with i < k - i appears twice.
        for i in k.saturating_sub(N - 1)..=k.min(N - 1) {
            if 2 * i < k {
                acc.add_doubled_product(a[i], a[k - i]);
            }
        }
        if k % 2 == 0 {
            acc.add_product(a[k / 2], a[k / 2]);
        }
        columns[k] = acc.shift_out();
    }
    columns[2 * N - 1] = acc.shift_out();
    Wide::from_limbs(product)
}

impl MulBackend for ColumnScan {
    fn mul<const INT: u32, const FRAC: u32, const LIMBS: usize>(
        &self,
        a: Fixed<INT, FRAC, LIMBS>,
        b: Fixed<INT, FRAC, LIMBS>,
    ) -> Fixed<INT, FRAC, LIMBS> {
        let product = column_product(&a.unsigned_abs(), &b.unsigned_abs());
        Fixed::with_sign(product.round_shr(FRAC), a.is_negative() != b.is_negative())
    }

    fn square<const INT: u32, const FRAC: u32, const LIMBS: usize>(
        &self,
        a: Fixed<INT, FRAC, LIMBS>,
    ) -> Fixed<INT, FRAC, LIMBS> {
        Fixed::from_bits(column_square(&a.unsigned_abs()).round_shr(FRAC))
    }
}

/// First operand pair on which `backend` disagrees with the arithmetic core,
/// checking both `mul(a, b)` and `square(a)`.
pub fn first_mismatch<B, const INT: u32, const FRAC: u32, const LIMBS: usize>(
    backend: &B,
    pairs: impl IntoIterator<Item = (Fixed<INT, FRAC, LIMBS>, Fixed<INT, FRAC, LIMBS>)>,
) -> Option<(Fixed<INT, FRAC, LIMBS>, Fixed<INT, FRAC, LIMBS>)>
where
    B: MulBackend + ?Sized,
{
    let mismatch = pairs
        .into_iter()
        .find(|&(a, b)| backend.mul(a, b) != a.wrapping_mul(b) || backend.square(a) != a.square());
    if let Some((a, b)) = mismatch {
        tracing::warn!(%a, %b, "multiply backend disagrees with the arithmetic core");
    }
    mismatch
}
