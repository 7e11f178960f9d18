//! Text conversion in any radix from 2 to 36.
//!
//! The format is an optional `-`, one or more integer digits, then optionally
//! a `.` and one or more fractional digits. Digits above 9 are letters:
//! lowercase on output, either case on input. There is no `+`, exponent or
//! digit grouping.

use std::fmt;
use std::str::FromStr;

use crate::error::{FixedError, ParseError, ParseErrorKind, Result};
use crate::fixed_point::Fixed;
use crate::limbs::Limbs;

const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

fn check_radix(radix: u32) {
    assert!(
        (2..=36).contains(&radix),
        "radix must be in the range 2..=36, got {radix}"
    );
}

fn digit_value(byte: u8, radix: u32) -> Option<u32> {
    char::from(byte).to_digit(radix)
}

/// Smallest `k` with `radix^k > 2^(frac + 1)`.
///
/// Truncating an odd-radix expansion after `k` digits leaves an error below
/// half an ulp, so parsing the text back rounds to the original value.
fn odd_radix_digits<const LIMBS: usize>(radix: u32, frac: u32) -> usize {
    let bound = Limbs::<LIMBS>::power_of_two(frac + 1);
    let mut power = Limbs::<LIMBS>::from_u64(1);
    let mut digits = 0;
    while power <= bound {
        power = power.mul_small(u64::from(radix)).0;
        digits += 1;
    }
    digits
}

/// Exact binary value of a fraction given as base-`radix` digits, most
/// significant first.
///
/// Returns the top `frac` bits and the bit just below them. The digit string
/// is doubled repeatedly; every carry out of its leading digit is the next
/// bit.
fn fraction_bits<const LIMBS: usize>(digits: &[u8], radix: u32, frac: u32) -> (Limbs<LIMBS>, bool) {
    let mut digits = digits.to_vec();
    while digits.last() == Some(&0) {
        digits.pop();
    }
    let mut bits = Limbs::ZERO;
    for position in (0..=frac).rev() {
        if digits.is_empty() {
            break;
        }
        let mut carry = 0;
        for digit in digits.iter_mut().rev() {
            let doubled = u32::from(*digit) * 2 + carry;
            *digit = (doubled % radix) as u8;
            carry = doubled / radix;
        }
        if carry == 1 {
            if position == 0 {
                return (bits, true);
            }
            bits.set_bit(position - 1);
        }
        while digits.last() == Some(&0) {
            digits.pop();
        }
    }
    (bits, false)
}

/// A successfully parsed prefix.
struct Prefix<T> {
    value: T,
    consumed: usize,
    has_fraction: bool,
}

impl<const INT: u32, const FRAC: u32, const LIMBS: usize> Fixed<INT, FRAC, LIMBS> {
    /// Render in `radix`.
    ///
    /// Fractional digits stop once the remainder is zero, which always happens
    /// within `FRAC` digits for even radices. Odd radices never terminate on a
    /// binary fraction and stop after just enough digits to parse back to the
    /// same value.
    ///
    /// # Panics
    ///
    /// Panics if `radix` is outside `2..=36`.
    pub fn to_string_radix(&self, radix: u32) -> String {
        check_radix(radix);
        let magnitude = self.unsigned_abs();
        let mut out = String::new();
        if self.is_negative() {
            out.push('-');
        }

        let mut integer = magnitude >> FRAC;
        let mut integer_digits = Vec::new();
        loop {
            let (quotient, digit) = integer.div_rem_small(u64::from(radix));
            integer_digits.push(DIGITS[digit as usize]);
            integer = quotient;
            if integer.is_zero() {
                break;
            }
        }
        out.extend(integer_digits.iter().rev().map(|&digit| char::from(digit)));

        let mask = Limbs::low_mask(FRAC);
        let mut fraction = magnitude & mask;
        if fraction.is_zero() {
            return out;
        }
        out.push('.');
        let limit = (radix % 2 == 1).then(|| odd_radix_digits::<LIMBS>(radix, FRAC));
        let mut emitted = 0;
        while !fraction.is_zero() && limit.map_or(true, |limit| emitted < limit) {
            // fraction < 2^FRAC and radix < 2^6 <= 2^INT, so nothing carries out
            let (scaled, _) = fraction.mul_small(u64::from(radix));
            let digit = (scaled >> FRAC).u64(0);
            out.push(char::from(DIGITS[digit as usize]));
            fraction = scaled & mask;
            emitted += 1;
        }
        out
    }

    /// Parse the whole of `text` in `radix`.
    ///
    /// # Panics
    ///
    /// Panics if `radix` is outside `2..=36`.
    pub fn from_str_radix(text: &str, radix: u32) -> Result<Self> {
        check_radix(radix);
        let bytes = text.as_bytes();
        let result = Self::parse_prefix(bytes, radix).and_then(|prefix| {
            let pos = prefix.consumed;
            match bytes.get(pos) {
                None => Ok(prefix.value),
                Some(b'.') if !prefix.has_fraction => match bytes.get(pos + 1) {
                    Some(next) if next.is_ascii_alphanumeric() => {
                        Err(ParseError::new(ParseErrorKind::InvalidDigit, pos + 1))
                    }
                    _ => Err(ParseError::new(ParseErrorKind::NoDigits, pos + 1)),
                },
                Some(next) if next.is_ascii_alphanumeric() => {
                    Err(ParseError::new(ParseErrorKind::InvalidDigit, pos))
                }
                Some(_) => Err(ParseError::new(ParseErrorKind::TrailingCharacters, pos)),
            }
        });
        result.map_err(|err| {
            let err = match bytes.get(err.position) {
                Some(byte)
                    if err.kind == ParseErrorKind::NoDigits && byte.is_ascii_alphanumeric() =>
                {
                    ParseError::new(ParseErrorKind::InvalidDigit, err.position)
                }
                _ => err,
            };
            tracing::trace!(text, radix, %err, "rejected fixed-point text");
            FixedError::from(err)
        })
    }

    /// Parse the longest valid number at the start of `text`, returning it
    /// with the number of bytes consumed.
    ///
    /// A `.` not followed by a digit is left unconsumed.
    ///
    /// # Panics
    ///
    /// Panics if `radix` is outside `2..=36`.
    pub fn from_str_radix_prefix(text: &str, radix: u32) -> Result<(Self, usize)> {
        check_radix(radix);
        Self::parse_prefix(text.as_bytes(), radix)
            .map(|prefix| (prefix.value, prefix.consumed))
            .map_err(|err| {
                tracing::trace!(text, radix, %err, "rejected fixed-point text");
                FixedError::from(err)
            })
    }

    fn parse_prefix(text: &[u8], radix: u32) -> std::result::Result<Prefix<Self>, ParseError> {
        let negative = text.first() == Some(&b'-');
        let int_start = usize::from(negative);
        let mut pos = int_start;

        let int_limit = Limbs::<LIMBS>::power_of_two(INT);
        let mut integer = Limbs::<LIMBS>::ZERO;
        while let Some(digit) = text.get(pos).and_then(|&b| digit_value(b, radix)) {
            let (scaled, carry) = integer.mul_small(u64::from(radix));
            let (sum, overflow) = scaled.overflowing_add(&Limbs::from_u64(u64::from(digit)));
            if carry != 0 || overflow || sum >= int_limit {
                return Err(ParseError::new(ParseErrorKind::Overflow, pos));
            }
            integer = sum;
            pos += 1;
        }
        if pos == int_start {
            return Err(ParseError::new(ParseErrorKind::NoDigits, pos));
        }

        let mut fraction_digits = Vec::new();
        let fraction_follows = text.get(pos) == Some(&b'.')
            && text.get(pos + 1).and_then(|&b| digit_value(b, radix)).is_some();
        if fraction_follows {
            pos += 1;
            while let Some(digit) = text.get(pos).and_then(|&b| digit_value(b, radix)) {
                fraction_digits.push(digit as u8);
                pos += 1;
            }
        }

        let (fraction, round) = fraction_bits::<LIMBS>(&fraction_digits, radix, FRAC);
        let (magnitude, carry) =
            ((integer << FRAC) | fraction).overflowing_add(&Limbs::from_u64(u64::from(round)));
        let value = (!carry)
            .then(|| Self::from_magnitude(magnitude, negative))
            .flatten()
            .ok_or(ParseError::new(ParseErrorKind::Overflow, int_start))?;

        Ok(Prefix {
            value,
            consumed: pos,
            has_fraction: fraction_follows,
        })
    }
}

impl<const INT: u32, const FRAC: u32, const LIMBS: usize> fmt::Display for Fixed<INT, FRAC, LIMBS> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.to_string_radix(10))
    }
}

impl<const INT: u32, const FRAC: u32, const LIMBS: usize> fmt::LowerHex
    for Fixed<INT, FRAC, LIMBS>
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.to_string_radix(16))
    }
}

impl<const INT: u32, const FRAC: u32, const LIMBS: usize> FromStr for Fixed<INT, FRAC, LIMBS> {
    type Err = FixedError;

    fn from_str(text: &str) -> Result<Self> {
        Self::from_str_radix(text, 10)
    }
}
