use fixwide_math::{Fixed, Limbs};

use crate::vector::{Operand, Operation, Result, TestVector, VectorError, Width};

pub(crate) fn check_radix(radix: u32) -> Result<()> {
    if (2..=36).contains(&radix) {
        Ok(())
    } else {
        Err(VectorError::InvalidRadix(radix))
    }
}

pub(crate) fn encode_bits<const INT: u32, const FRAC: u32, const LIMBS: usize>(
    value: Fixed<INT, FRAC, LIMBS>,
) -> Operand {
    Operand::Bits(format!("{:#x}", value.to_bits()))
}

/// Parse `0x` followed by exactly sixteen hex digits per limb, most
/// significant limb first.
pub(crate) fn decode_bits<const INT: u32, const FRAC: u32, const LIMBS: usize>(
    text: &str,
) -> Result<Fixed<INT, FRAC, LIMBS>> {
    let malformed = || {
        VectorError::Decode(format!("bad {}-bit pattern {text:?}", Limbs::<LIMBS>::BITS))
    };
    let hex = text.strip_prefix("0x").ok_or_else(malformed)?;
    if hex.len() != 16 * LIMBS || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(malformed());
    }
    let mut limbs = [0u64; LIMBS];
    for (limb, chunk) in limbs.iter_mut().rev().zip(hex.as_bytes().chunks(16)) {
        let chunk = std::str::from_utf8(chunk).map_err(|_| malformed())?;
        *limb = u64::from_str_radix(chunk, 16).map_err(|_| malformed())?;
    }
    Ok(Fixed::from_bits(Limbs::from_array(limbs)))
}

fn operand(inputs: &[Operand], index: usize) -> Result<&Operand> {
    inputs
        .get(index)
        .ok_or_else(|| VectorError::Decode(format!("missing input {index}")))
}

fn fixed_input<const INT: u32, const FRAC: u32, const LIMBS: usize>(
    inputs: &[Operand],
    index: usize,
) -> Result<Fixed<INT, FRAC, LIMBS>> {
    decode_bits(operand(inputs, index)?.as_bits()?)
}

/// Run `operation` on decoded `inputs` with the reference arithmetic.
pub(crate) fn evaluate<const INT: u32, const FRAC: u32, const LIMBS: usize>(
    operation: Operation,
    inputs: &[Operand],
) -> Result<Vec<Operand>> {
    let a = || fixed_input::<INT, FRAC, LIMBS>(inputs, 0);
    let b = || fixed_input::<INT, FRAC, LIMBS>(inputs, 1);

    let expected = match operation {
        Operation::Add => vec![encode_bits(a()? + b()?)],
        Operation::Sub => vec![encode_bits(a()? - b()?)],
        Operation::Mul => vec![encode_bits(a()? * b()?)],
        Operation::Div => vec![encode_bits(a()?.try_div(b()?)?)],
        Operation::Neg => vec![encode_bits(-a()?)],
        Operation::Square => vec![encode_bits(a()?.square())],
        Operation::Sqrt => vec![encode_bits(a()?.sqrt()?)],
        Operation::Compare => {
            let (a, b) = (a()?, b()?);
            [a < b, a > b, a <= b, a >= b, a == b, a != b]
                .into_iter()
                .map(Operand::Bool)
                .collect()
        }
        Operation::CompareUnsigned => {
            let (a, b) = (a()?, b()?);
            [a.lt_unsigned(&b), a.gt_unsigned(&b), a.le_unsigned(&b), a.ge_unsigned(&b)]
                .into_iter()
                .map(Operand::Bool)
                .collect()
        }
        Operation::ToString { radix } => {
            check_radix(radix)?;
            vec![Operand::Text(a()?.to_string_radix(radix))]
        }
        Operation::FromString { radix } => {
            check_radix(radix)?;
            let text = operand(inputs, 0)?.as_text()?;
            vec![encode_bits(Fixed::<INT, FRAC, LIMBS>::from_str_radix(text, radix)?)]
        }
        Operation::FromDouble => {
            let x = operand(inputs, 0)?.as_double()?;
            vec![encode_bits(Fixed::<INT, FRAC, LIMBS>::from_f64(x))]
        }
        Operation::ToDouble => vec![Operand::Double(a()?.to_f64())],
    };
    Ok(expected)
}

pub(crate) fn evaluate_width(
    width: Width,
    operation: Operation,
    inputs: &[Operand],
) -> Result<Vec<Operand>> {
    match width {
        Width::Fixed64 => evaluate::<8, 56, 1>(operation, inputs),
        Width::Fixed128 => evaluate::<32, 96, 2>(operation, inputs),
        Width::Fixed256 => evaluate::<64, 192, 4>(operation, inputs),
    }
}

/// Recompute a vector's expected outputs and compare.
pub fn verify(width: Width, vector: &TestVector) -> Result<()> {
    let actual = evaluate_width(width, vector.operation, &vector.inputs)?;
    if actual == vector.expected {
        return Ok(());
    }
    tracing::warn!(
        ?width,
        bits = width.bits(),
        operation = ?vector.operation,
        inputs = ?vector.inputs,
        "test vector mismatch"
    );
    Err(VectorError::Mismatch {
        operation: vector.operation,
        expected: format!("{:?}", vector.expected),
        actual: format!("{actual:?}"),
    })
}
