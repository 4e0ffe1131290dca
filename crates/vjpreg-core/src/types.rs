//! Core type definitions for vjpreg operands.
//!
//! - Type aliases for array dimensions ([`Axis`], [`Rank`])
//! - Element types ([`DType`]) and their promotion order
//!
//! # Examples
//!
//! ```
//! use vjpreg_core::{DType, Operand};
//!
//! let x = Operand::from_vec(vec![1.0, 2.0, 3.0], &[3]).unwrap();
//! assert_eq!(x.dtype(), DType::Real);
//! assert_eq!(DType::Real.promote(DType::Complex), DType::Complex);
//! ```

use std::fmt;

// Re-export the operand implementation
pub use crate::dense::Operand;

/// Type alias for an axis index. Zero-indexed.
pub type Axis = usize;

/// Type alias for array rank (number of dimensions).
///
/// ```
/// use vjpreg_core::{Operand, Rank};
///
/// let m = Operand::zeros(&[2, 3], vjpreg_core::DType::Real);
/// let rank: Rank = m.rank();
/// assert_eq!(rank, 2);
/// ```
pub type Rank = usize;

/// Element type of an [`Operand`].
///
/// Variants are declared in promotion order: combining two operands yields
/// the larger of their dtypes (`Bool < Real < Complex`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum DType {
    /// Boolean masks
    Bool,
    /// 64-bit real floating point
    Real,
    /// 64-bit complex floating point (`Complex<f64>`)
    Complex,
}

impl DType {
    /// Result dtype of a binary operation between `self` and `other`.
    pub fn promote(self, other: DType) -> DType {
        self.max(other)
    }

    /// Whether this dtype carries an imaginary component.
    pub fn is_complex(self) -> bool {
        self == DType::Complex
    }

    /// Lowercase name (`"bool"`, `"real"`, `"complex"`).
    pub fn name(self) -> &'static str {
        match self {
            DType::Bool => "bool",
            DType::Real => "real",
            DType::Complex => "complex",
        }
    }
}

impl fmt::Display for DType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
