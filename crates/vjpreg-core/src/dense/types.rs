//! Operand type definition and basic accessors
//!
//! This module defines the core `Operand` type and its construction and
//! introspection methods. Arithmetic, reductions and products live in
//! sibling modules.

use std::borrow::Cow;

use scirs2_core::ndarray_ext::{Array, IxDyn};
use scirs2_core::num_complex::Complex64;

use crate::types::DType;

/// Dynamic-rank array with a runtime dtype, backed by scirs2_core's ndarray
///
/// This is the value type every gradient rule consumes and produces. Each
/// variant wraps a dynamic-dimensionality array of the matching element type.
///
/// # Examples
///
/// ```
/// use vjpreg_core::{DType, Operand};
///
/// let x = Operand::from_vec(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], &[2, 3]).unwrap();
/// assert_eq!(x.shape(), &[2, 3]);
/// assert_eq!(x.rank(), 2);
/// assert_eq!(x.dtype(), DType::Real);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub enum Operand {
    /// Boolean mask
    Bool(Array<bool, IxDyn>),
    /// Real (f64) array
    Real(Array<f64, IxDyn>),
    /// Complex (Complex<f64>) array
    Complex(Array<Complex64, IxDyn>),
}

impl Operand {
    /// Create a real operand from a flat vector in row-major order
    ///
    /// # Examples
    ///
    /// ```
    /// use vjpreg_core::Operand;
    ///
    /// let x = Operand::from_vec(vec![1.0, 2.0, 3.0, 4.0], &[2, 2]).unwrap();
    /// assert_eq!(x.shape(), &[2, 2]);
    /// assert!(Operand::from_vec(vec![1.0, 2.0, 3.0], &[2, 2]).is_err());
    /// ```
    pub fn from_vec(vec: Vec<f64>, shape: &[usize]) -> anyhow::Result<Self> {
        Ok(Operand::Real(shaped(vec, shape)?))
    }

    /// Create a complex operand from a flat vector in row-major order
    pub fn from_complex_vec(vec: Vec<Complex64>, shape: &[usize]) -> anyhow::Result<Self> {
        Ok(Operand::Complex(shaped(vec, shape)?))
    }

    /// Create a boolean mask from a flat vector in row-major order
    pub fn from_mask_vec(vec: Vec<bool>, shape: &[usize]) -> anyhow::Result<Self> {
        Ok(Operand::Bool(shaped(vec, shape)?))
    }

    /// Create a rank-0 real operand
    ///
    /// ```
    /// use vjpreg_core::Operand;
    ///
    /// let s = Operand::scalar(2.5);
    /// assert_eq!(s.rank(), 0);
    /// assert_eq!(s.to_real_vec().unwrap(), vec![2.5]);
    /// ```
    pub fn scalar(value: f64) -> Self {
        Operand::Real(Array::from_elem(IxDyn(&[]), value))
    }

    /// Create a real operand filled with `value`
    pub fn full(shape: &[usize], value: f64) -> Self {
        Operand::Real(Array::from_elem(IxDyn(shape), value))
    }

    /// Create a zero-filled operand of the given shape and dtype
    pub fn zeros(shape: &[usize], dtype: DType) -> Self {
        match dtype {
            DType::Bool => Operand::Bool(Array::from_elem(IxDyn(shape), false)),
            DType::Real => Operand::Real(Array::zeros(IxDyn(shape))),
            DType::Complex => Operand::Complex(Array::zeros(IxDyn(shape))),
        }
    }

    /// Create a zero-filled operand matching this operand's shape and dtype
    pub fn zeros_like(&self) -> Self {
        Self::zeros(self.shape(), self.dtype())
    }

    /// Create a real operand of ones
    pub fn ones(shape: &[usize]) -> Self {
        Self::full(shape, 1.0)
    }

    /// Element type
    pub fn dtype(&self) -> DType {
        match self {
            Operand::Bool(_) => DType::Bool,
            Operand::Real(_) => DType::Real,
            Operand::Complex(_) => DType::Complex,
        }
    }

    /// Shape (per-axis extents)
    pub fn shape(&self) -> &[usize] {
        match self {
            Operand::Bool(a) => a.shape(),
            Operand::Real(a) => a.shape(),
            Operand::Complex(a) => a.shape(),
        }
    }

    /// Rank (number of axes)
    pub fn rank(&self) -> usize {
        self.shape().len()
    }

    /// Total number of elements
    pub fn len(&self) -> usize {
        self.shape().iter().product()
    }

    /// Whether the operand holds no elements
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether the dtype is complex
    pub fn is_complex(&self) -> bool {
        self.dtype().is_complex()
    }

    /// Read a single element as `f64` (booleans read as 0/1)
    ///
    /// Returns `None` for complex operands or out-of-bounds indices.
    pub fn get_real(&self, index: &[usize]) -> Option<f64> {
        match self {
            Operand::Bool(a) => a.get(IxDyn(index)).map(|&b| bool_to_f64(b)),
            Operand::Real(a) => a.get(IxDyn(index)).copied(),
            Operand::Complex(_) => None,
        }
    }

    /// Flatten a non-complex operand into a row-major `Vec<f64>`
    ///
    /// # Errors
    ///
    /// Fails for complex operands, which have no lossless real form.
    pub fn to_real_vec(&self) -> anyhow::Result<Vec<f64>> {
        match self {
            Operand::Complex(_) => {
                anyhow::bail!("Cannot flatten complex operand into real values")
            }
            _ => Ok(self.real_cow().iter().copied().collect()),
        }
    }

    /// Flatten into a row-major `Vec<Complex64>`
    pub fn to_complex_vec(&self) -> Vec<Complex64> {
        self.complex_cow().iter().copied().collect()
    }

    /// Real-valued view, promoting booleans to 0/1.
    ///
    /// Complex operands contribute their real component; callers only reach
    /// that arm after dtype promotion has ruled complex out.
    pub(crate) fn real_cow(&self) -> Cow<'_, Array<f64, IxDyn>> {
        match self {
            Operand::Real(a) => Cow::Borrowed(a),
            Operand::Bool(a) => Cow::Owned(a.mapv(bool_to_f64)),
            Operand::Complex(a) => Cow::Owned(a.mapv(|c| c.re)),
        }
    }

    /// Complex-valued view, promoting booleans and reals
    pub(crate) fn complex_cow(&self) -> Cow<'_, Array<Complex64, IxDyn>> {
        match self {
            Operand::Complex(a) => Cow::Borrowed(a),
            Operand::Real(a) => Cow::Owned(a.mapv(|v| Complex64::new(v, 0.0))),
            Operand::Bool(a) => Cow::Owned(a.mapv(|b| Complex64::new(bool_to_f64(b), 0.0))),
        }
    }

    /// Truthiness of each element: `true` wherever the element is nonzero
    pub fn truth_mask(&self) -> Cow<'_, Array<bool, IxDyn>> {
        match self {
            Operand::Bool(a) => Cow::Borrowed(a),
            Operand::Real(a) => Cow::Owned(a.mapv(|v| v != 0.0)),
            Operand::Complex(a) => Cow::Owned(a.mapv(|c| c.re != 0.0 || c.im != 0.0)),
        }
    }
}

impl From<Array<f64, IxDyn>> for Operand {
    fn from(array: Array<f64, IxDyn>) -> Self {
        Operand::Real(array)
    }
}

impl From<Array<Complex64, IxDyn>> for Operand {
    fn from(array: Array<Complex64, IxDyn>) -> Self {
        Operand::Complex(array)
    }
}

impl From<Array<bool, IxDyn>> for Operand {
    fn from(array: Array<bool, IxDyn>) -> Self {
        Operand::Bool(array)
    }
}

impl From<f64> for Operand {
    fn from(value: f64) -> Self {
        Operand::scalar(value)
    }
}

fn shaped<T>(vec: Vec<T>, shape: &[usize]) -> anyhow::Result<Array<T, IxDyn>> {
    let total: usize = shape.iter().product();
    if vec.len() != total {
        anyhow::bail!(
            "Shape {:?} requires {} elements, but got {}",
            shape,
            total,
            vec.len()
        );
    }
    Ok(Array::from_shape_vec(IxDyn(shape), vec)?)
}

fn bool_to_f64(b: bool) -> f64 {
    if b {
        1.0
    } else {
        0.0
    }
}
