use std::cmp::Ordering;

use crate::fixed_point::Fixed;

impl<const INT: u32, const FRAC: u32, const LIMBS: usize> Fixed<INT, FRAC, LIMBS> {
    /// Order of the two's-complement values.
    ///
    /// Operands of the same sign compare like their raw patterns.
    pub fn cmp_signed(&self, other: &Self) -> Ordering {
        match (self.is_negative(), other.is_negative()) {
            (true, false) => Ordering::Less,
            (false, true) => Ordering::Greater,
            _ => self.cmp_unsigned(other),
        }
    }

    /// Order of the raw bit patterns read as unsigned integers.
    pub fn cmp_unsigned(&self, other: &Self) -> Ordering {
        self.to_bits().cmp(&other.to_bits())
    }

    pub fn lt_unsigned(&self, other: &Self) -> bool {
        self.cmp_unsigned(other) == Ordering::Less
    }

    pub fn gt_unsigned(&self, other: &Self) -> bool {
        self.cmp_unsigned(other) == Ordering::Greater
    }

    pub fn le_unsigned(&self, other: &Self) -> bool {
        self.cmp_unsigned(other) != Ordering::Greater
    }

    pub fn ge_unsigned(&self, other: &Self) -> bool {
        self.cmp_unsigned(other) != Ordering::Less
    }
}

impl<const INT: u32, const FRAC: u32, const LIMBS: usize> Ord for Fixed<INT, FRAC, LIMBS> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.cmp_signed(other)
    }
}

impl<const INT: u32, const FRAC: u32, const LIMBS: usize> PartialOrd for Fixed<INT, FRAC, LIMBS> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp_signed(other))
    }
}
