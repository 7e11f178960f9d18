use fixwide_math::{Fixed, Limbs};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use serde::{Deserialize, Serialize};

use crate::vector::{Operand, Operation, Result, TestVector, VectorConfig, Width};
use crate::verify::{check_radix, encode_bits, evaluate, verify};

fn random_bits<const INT: u32, const FRAC: u32, const LIMBS: usize, R: Rng>(
    rng: &mut R,
) -> Fixed<INT, FRAC, LIMBS> {
    let mut limbs = [0u64; LIMBS];
    for limb in &mut limbs {
        *limb = rng.gen();
    }
    Fixed::from_bits(Limbs::from_array(limbs))
}

/// Non-negative operand below `2^(BITS - INT/2)`, so products and squares of
/// two such values stay meaningful.
fn arithmetic_operand<const INT: u32, const FRAC: u32, const LIMBS: usize, R: Rng>(
    rng: &mut R,
) -> Fixed<INT, FRAC, LIMBS> {
    let raw = random_bits::<INT, FRAC, LIMBS, R>(rng).to_bits();
    Fixed::from_bits(raw & Limbs::low_mask(INT + FRAC - INT / 2))
}

fn sample_inputs<const INT: u32, const FRAC: u32, const LIMBS: usize, R: Rng>(
    rng: &mut R,
    operation: Operation,
    index: usize,
) -> Vec<Operand> {
    let arithmetic = |rng: &mut R| arithmetic_operand::<INT, FRAC, LIMBS, R>(rng);
    let full = |rng: &mut R| random_bits::<INT, FRAC, LIMBS, R>(rng);

    match operation {
        Operation::Add | Operation::Sub | Operation::Mul => {
            vec![encode_bits(arithmetic(rng)), encode_bits(arithmetic(rng))]
        }
        Operation::Div => {
            let a = arithmetic(rng);
            let b = loop {
                let b = arithmetic(rng);
                if !b.is_zero() {
                    break b;
                }
            };
            vec![encode_bits(a), encode_bits(b)]
        }
        Operation::Neg | Operation::Square | Operation::Sqrt | Operation::ToDouble => {
            vec![encode_bits(arithmetic(rng))]
        }
        Operation::Compare => {
            let edges: [Fixed<INT, FRAC, LIMBS>; 4] =
                [Fixed::MIN, Fixed::ONE, Fixed::ZERO, Fixed::MAX];
            let (a, b) = match index {
                0..=15 => (edges[index / 4], edges[index % 4]),
                16 | 17 => {
                    let a = full(rng);
                    (a, a)
                }
                _ => (full(rng), full(rng)),
            };
            vec![encode_bits(a), encode_bits(b)]
        }
        Operation::CompareUnsigned => {
            let a = full(rng);
            let b = if index < 2 { a } else { full(rng) };
            vec![encode_bits(a), encode_bits(b)]
        }
        Operation::ToString { .. } => {
            let minus_one = -Fixed::<INT, FRAC, LIMBS>::ONE;
            let special = [Fixed::ZERO, Fixed::ONE, minus_one, Fixed::MAX, Fixed::MIN];
            let value = special.get(index).copied().unwrap_or_else(|| arithmetic(rng));
            vec![encode_bits(value)]
        }
        Operation::FromString { radix } => {
            let special = [Fixed::ZERO, Fixed::ONE, -Fixed::<INT, FRAC, LIMBS>::ONE];
            let value = special.get(index).copied().unwrap_or_else(|| arithmetic(rng));
            vec![Operand::Text(value.to_string_radix(radix))]
        }
        Operation::FromDouble => {
            // One octave every 8 bits, from 2^-FRAC up to the integer range
            let octaves = (INT + FRAC) as usize / 8;
            let exponent = (index % octaves * 8) as i32 - FRAC as i32;
            let scale = 2f64.powi(exponent);
            vec![Operand::Double(rng.gen_range(-scale..scale))]
        }
    }
}

fn generate_for<const INT: u32, const FRAC: u32, const LIMBS: usize, R: Rng>(
    rng: &mut R,
    operation: Operation,
    count: usize,
) -> Result<Vec<TestVector>> {
    (0..count)
        .map(|index| {
            let inputs = sample_inputs::<INT, FRAC, LIMBS, R>(rng, operation, index);
            let expected = evaluate::<INT, FRAC, LIMBS>(operation, &inputs)?;
            Ok(TestVector {
                operation,
                inputs,
                expected,
            })
        })
        .collect()
}

/// Draw `count` vectors for one operation from a caller-owned generator.
///
/// The same generator state always yields the same vectors.
pub fn generate<R: Rng>(
    rng: &mut R,
    width: Width,
    operation: Operation,
    count: usize,
) -> Result<Vec<TestVector>> {
    if let Operation::ToString { radix } | Operation::FromString { radix } = operation {
        check_radix(radix)?;
    }
    let vectors = match width {
        Width::Fixed64 => generate_for::<8, 56, 1, R>(rng, operation, count),
        Width::Fixed128 => generate_for::<32, 96, 2, R>(rng, operation, count),
        Width::Fixed256 => generate_for::<64, 192, 4, R>(rng, operation, count),
    }?;
    tracing::debug!(?width, ?operation, count = vectors.len(), "generated test vectors");
    Ok(vectors)
}

/// Every configured operation for one width.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct VectorSet {
    pub width: Width,
    pub seed: u64,
    pub vectors: Vec<TestVector>,
}

impl VectorSet {
    /// Operation `i` of [`VectorConfig::operations`] draws from its own
    /// ChaCha20 stream seeded with `seed + i`, so changing one operation's
    /// count or the radix list leaves the others untouched.
    pub fn generate(config: &VectorConfig, width: Width) -> Result<Self> {
        let mut vectors = Vec::new();
        for (index, operation) in config.operations().into_iter().enumerate() {
            let mut rng = ChaCha20Rng::seed_from_u64(config.seed.wrapping_add(index as u64));
            vectors.extend(generate(&mut rng, width, operation, config.count)?);
        }
        Ok(Self {
            width,
            seed: config.seed,
            vectors,
        })
    }

    /// Verify every vector, returning how many passed.
    pub fn verify(&self) -> Result<usize> {
        for vector in &self.vectors {
            verify(self.width, vector)?;
        }
        Ok(self.vectors.len())
    }
}
