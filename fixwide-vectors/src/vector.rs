use fixwide_math::FixedError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One of the three named layouts
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Width {
    Fixed64,
    Fixed128,
    Fixed256,
}

impl Width {
    pub const ALL: [Width; 3] = [Width::Fixed64, Width::Fixed128, Width::Fixed256];

    pub fn bits(self) -> u32 {
        match self {
            Width::Fixed64 => 64,
            Width::Fixed128 => 128,
            Width::Fixed256 => 256,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    Add,
    Sub,
    Mul,
    Div,
    Neg,
    Square,
    Sqrt,
    /// Signed `lt, gt, le, ge, eq, ne`
    Compare,
    /// Raw-pattern `lt, gt, le, ge`
    CompareUnsigned,
    ToString { radix: u32 },
    FromString { radix: u32 },
    FromDouble,
    ToDouble,
}

/// An input or output of a vector. Fixed-point values travel as their raw
/// pattern, `0x` plus sixteen hex digits per limb.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Operand {
    Bits(String),
    Text(String),
    Double(f64),
    Bool(bool),
}

impl Operand {
    pub(crate) fn as_bits(&self) -> Result<&str> {
        match self {
            Operand::Bits(hex) => Ok(hex.as_str()),
            other => Err(VectorError::Decode(format!("expected a bit pattern, got {other:?}"))),
        }
    }

    pub(crate) fn as_text(&self) -> Result<&str> {
        match self {
            Operand::Text(text) => Ok(text.as_str()),
            other => Err(VectorError::Decode(format!("expected text, got {other:?}"))),
        }
    }

    pub(crate) fn as_double(&self) -> Result<f64> {
        match self {
            Operand::Double(x) => Ok(*x),
            other => Err(VectorError::Decode(format!("expected a double, got {other:?}"))),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct TestVector {
    pub operation: Operation,
    pub inputs: Vec<Operand>,
    pub expected: Vec<Operand>,
}

/// Generation settings
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct VectorConfig {
    pub seed: u64,
    /// Vectors per operation
    pub count: usize,
    /// Radices for the text conversions
    pub radices: Vec<u32>,
}

impl Default for VectorConfig {
    fn default() -> Self {
        Self {
            seed: 1,
            count: 16,
            radices: vec![10, 16],
        }
    }
}

impl VectorConfig {
    /// Every operation to generate, in a stable order.
    pub fn operations(&self) -> Vec<Operation> {
        let mut ops = vec![
            Operation::Add,
            Operation::Sub,
            Operation::Mul,
            Operation::Div,
            Operation::Neg,
            Operation::Square,
            Operation::Sqrt,
            Operation::Compare,
            Operation::CompareUnsigned,
        ];
        for &radix in &self.radices {
            ops.push(Operation::ToString { radix });
            ops.push(Operation::FromString { radix });
        }
        ops.push(Operation::FromDouble);
        ops.push(Operation::ToDouble);
        ops
    }
}

#[derive(Error, Debug)]
pub enum VectorError {
    #[error("Malformed vector: {0}")]
    Decode(String),

    #[error("Radix {0} is outside 2..=36")]
    InvalidRadix(u32),

    #[error("{operation:?} mismatch: expected {expected}, got {actual}")]
    Mismatch {
        operation: Operation,
        expected: String,
        actual: String,
    },

    #[error("Math error: {0}")]
    Math(#[from] FixedError),
}

pub type Result<T> = std::result::Result<T, VectorError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operation_json_shape() {
        assert_eq!(
            serde_json::to_string(&Operation::CompareUnsigned).unwrap(),
            "\"compare_unsigned\""
        );
        assert_eq!(
            serde_json::to_string(&Operation::ToString { radix: 16 }).unwrap(),
            r#"{"to_string":{"radix":16}}"#
        );
    }

    #[test]
    fn test_operand_json_shape() {
        let json = serde_json::to_string(&Operand::Bits("0x01".into())).unwrap();
        assert_eq!(json, r#"{"type":"bits","value":"0x01"}"#);
        let back: Operand = serde_json::from_str(r#"{"type":"bool","value":true}"#).unwrap();
        assert_eq!(back, Operand::Bool(true));
    }

    #[test]
    fn test_width_bits_match_layouts() {
        use fixwide_math::{Fixed128, Fixed256, Fixed64};
        assert_eq!(Width::Fixed64.bits(), Fixed64::BITS);
        assert_eq!(Width::Fixed128.bits(), Fixed128::BITS);
        assert_eq!(Width::Fixed256.bits(), Fixed256::BITS);
    }

    #[test]
    fn test_config_defaults() {
        let config: VectorConfig = serde_json::from_str(r#"{"seed": 7}"#).unwrap();
        assert_eq!(config.seed, 7);
        assert_eq!(config.count, 16);
        assert_eq!(config.radices, vec![10, 16]);
        assert_eq!(config.operations().len(), 9 + 4 + 2);
    }
}
