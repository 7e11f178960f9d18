//! # fixwide-math
//!
//! Deterministic wide fixed-point arithmetic.
//!
//! [`Fixed`] is a signed two's-complement number over a fixed number of 64-bit
//! limbs, with the binary point at a compile-time position. Three layouts are
//! named: [`Fixed64`] (8.56), [`Fixed128`] (32.96) and [`Fixed256`] (64.192).
//! Every operation is a pure function of the bit patterns, so results are
//! identical on every platform and thread.
//!
//! - add, sub, neg and mul wrap modulo `2^BITS`; mul, div and sqrt round half
//!   up on the first discarded bit of the magnitude
//! - signed and raw unsigned orders
//! - exact text conversion in radix 2 to 36
//! - conversion to and from `f64`
//! - a [`backend::MulBackend`] seam for alternative multiply routines
//!
//! ```
//! use fixwide_math::Fixed64;
//!
//! let a: Fixed64 = "1.5".parse().unwrap();
//! let b: Fixed64 = "2.5".parse().unwrap();
//! assert_eq!((a + b).to_string(), "4");
//! assert_eq!((a * b).to_string(), "3.75");
//! assert_eq!(b.sqrt().unwrap().to_f64(), 2.5f64.sqrt());
//! ```

pub mod backend;
pub mod cmp;
pub mod double;
pub mod error;
pub mod fixed_point;
pub mod limbs;
pub mod ops;
pub mod radix;
pub mod sqrt;

pub use backend::{first_mismatch, ColumnScan, MulBackend, Schoolbook};
pub use error::{FixedError, ParseError, ParseErrorKind, Result};
pub use fixed_point::{Fixed, Fixed128, Fixed256, Fixed64};
pub use limbs::Limbs;
