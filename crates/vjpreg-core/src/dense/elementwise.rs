//! Element-wise operations on operands
//!
//! Binary arithmetic broadcasts its inputs (see [`broadcast_shape`]) and
//! promotes dtypes (`Bool < Real < Complex`). Boolean inputs to arithmetic
//! and transcendental kernels are read as 0/1 reals.
//!
//! [`broadcast_shape`]: super::broadcast_shape

use anyhow::Context;
use scirs2_core::num_complex::Complex64;

use super::shape_ops::zip_map;
use super::types::Operand;
use crate::types::DType;

impl Operand {
    fn binary_op<FR, FC>(
        &self,
        other: &Operand,
        name: &str,
        real: FR,
        complex: FC,
    ) -> anyhow::Result<Self>
    where
        FR: Fn(f64, f64) -> f64,
        FC: Fn(Complex64, Complex64) -> Complex64,
    {
        let out = match self.dtype().promote(other.dtype()) {
            DType::Complex => {
                let (a, b) = (self.complex_cow(), other.complex_cow());
                zip_map(&*a, &*b, |x, y| complex(*x, *y)).map(Operand::Complex)
            }
            DType::Real | DType::Bool => {
                let (a, b) = (self.real_cow(), other.real_cow());
                zip_map(&*a, &*b, |x, y| real(*x, *y)).map(Operand::Real)
            }
        };
        out.with_context(|| format!("{} of {:?} and {:?}", name, self.shape(), other.shape()))
    }

    fn unary_op<FR, FC>(&self, real: FR, complex: FC) -> Self
    where
        FR: Fn(f64) -> f64,
        FC: Fn(Complex64) -> Complex64,
    {
        match self {
            Operand::Complex(a) => Operand::Complex(a.mapv(complex)),
            _ => Operand::Real(self.real_cow().mapv(real)),
        }
    }

    /// Element-wise sum with broadcasting.
    ///
    /// # Examples
    ///
    /// ```
    /// use vjpreg_core::Operand;
    ///
    /// let a = Operand::from_vec(vec![1.0, 2.0, 3.0, 4.0], &[2, 2]).unwrap();
    /// let b = Operand::from_vec(vec![10.0, 20.0], &[2]).unwrap();
    /// let c = a.add(&b).unwrap();
    /// assert_eq!(c.to_real_vec().unwrap(), vec![11.0, 22.0, 13.0, 24.0]);
    /// ```
    pub fn add(&self, other: &Operand) -> anyhow::Result<Self> {
        self.binary_op(other, "add", |x, y| x + y, |x, y| x + y)
    }

    /// Element-wise difference with broadcasting.
    pub fn sub(&self, other: &Operand) -> anyhow::Result<Self> {
        self.binary_op(other, "subtract", |x, y| x - y, |x, y| x - y)
    }

    /// Element-wise product with broadcasting.
    pub fn mul(&self, other: &Operand) -> anyhow::Result<Self> {
        self.binary_op(other, "multiply", |x, y| x * y, |x, y| x * y)
    }

    /// Element-wise quotient with broadcasting. Division by zero follows
    /// IEEE-754 (`inf` / `nan`).
    pub fn div(&self, other: &Operand) -> anyhow::Result<Self> {
        self.binary_op(other, "divide", |x, y| x / y, |x, y| x / y)
    }

    /// Element-wise power `self ** exponent` with broadcasting.
    ///
    /// Real inputs use `f64::powf`, so a negative base with a fractional
    /// exponent yields `nan`, and `0 ** negative` yields `inf`.
    ///
    /// ```
    /// use vjpreg_core::Operand;
    ///
    /// let x = Operand::from_vec(vec![2.0, 3.0], &[2]).unwrap();
    /// let y = Operand::scalar(2.0);
    /// assert_eq!(x.pow(&y).unwrap().to_real_vec().unwrap(), vec![4.0, 9.0]);
    /// ```
    pub fn pow(&self, exponent: &Operand) -> anyhow::Result<Self> {
        self.binary_op(exponent, "power", f64::powf, |x, y| x.powc(y))
    }

    /// Element-wise negation.
    pub fn neg(&self) -> Self {
        self.unary_op(|x| -x, |x| -x)
    }

    /// Element-wise exponential.
    pub fn exp(&self) -> Self {
        self.unary_op(f64::exp, |x| x.exp())
    }

    /// Element-wise natural logarithm.
    pub fn ln(&self) -> Self {
        self.unary_op(f64::ln, |x| x.ln())
    }

    /// Element-wise hyperbolic tangent.
    pub fn tanh(&self) -> Self {
        self.unary_op(f64::tanh, |x| x.tanh())
    }

    /// Element-wise hyperbolic sine.
    pub fn sinh(&self) -> Self {
        self.unary_op(f64::sinh, |x| x.sinh())
    }

    /// Element-wise hyperbolic cosine.
    pub fn cosh(&self) -> Self {
        self.unary_op(f64::cosh, |x| x.cosh())
    }

    /// Element-wise square, `self * self`.
    pub fn square(&self) -> Self {
        self.unary_op(|x| x * x, |x| x * x)
    }

    /// Real component of every element.
    ///
    /// Real operands are returned unchanged; masks become 0/1 reals.
    ///
    /// ```
    /// use scirs2_core::num_complex::Complex64;
    /// use vjpreg_core::{DType, Operand};
    ///
    /// let z = Operand::from_complex_vec(
    ///     vec![Complex64::new(1.0, 2.0), Complex64::new(-3.0, 0.5)],
    ///     &[2],
    /// ).unwrap();
    /// let re = z.real_part();
    /// assert_eq!(re.dtype(), DType::Real);
    /// assert_eq!(re.to_real_vec().unwrap(), vec![1.0, -3.0]);
    /// ```
    pub fn real_part(&self) -> Self {
        match self {
            Operand::Complex(a) => Operand::Real(a.mapv(|c| c.re)),
            Operand::Real(a) => Operand::Real(a.clone()),
            Operand::Bool(_) => Operand::Real(self.real_cow().into_owned()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn real(v: Vec<f64>, shape: &[usize]) -> Operand {
        Operand::from_vec(v, shape).unwrap()
    }

    #[test]
    fn test_sub_broadcasts_scalar() {
        let a = real(vec![1.0, 2.0, 3.0], &[3]);
        let out = a.sub(&Operand::scalar(1.0)).unwrap();
        assert_eq!(out.to_real_vec().unwrap(), vec![0.0, 1.0, 2.0]);
    }

    #[test]
    fn test_mismatched_shapes_fail() {
        let a = real(vec![1.0, 2.0, 3.0], &[3]);
        let b = real(vec![1.0, 2.0], &[2]);
        let err = a.mul(&b).unwrap_err();
        assert!(err.to_string().contains("multiply"));
    }

    #[test]
    fn test_real_plus_complex_promotes() {
        let a = real(vec![1.0, 2.0], &[2]);
        let b = Operand::from_complex_vec(
            vec![Complex64::new(0.0, 1.0), Complex64::new(1.0, 1.0)],
            &[2],
        )
        .unwrap();
        let c = a.add(&b).unwrap();
        assert_eq!(c.dtype(), DType::Complex);
        assert_eq!(
            c.to_complex_vec(),
            vec![Complex64::new(1.0, 1.0), Complex64::new(3.0, 1.0)]
        );
    }

    #[test]
    fn test_mask_arithmetic_reads_as_real() {
        let m = Operand::from_mask_vec(vec![true, false], &[2]).unwrap();
        let out = m.mul(&real(vec![5.0, 5.0], &[2])).unwrap();
        assert_eq!(out.dtype(), DType::Real);
        assert_eq!(out.to_real_vec().unwrap(), vec![5.0, 0.0]);
    }

    #[test]
    fn test_hyperbolic_identity() {
        let x = real(vec![-1.5, 0.0, 0.7], &[3]);
        let lhs = x.cosh().square().sub(&x.sinh().square()).unwrap();
        for v in lhs.to_real_vec().unwrap() {
            assert!((v - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_pow_zero_base() {
        let x = real(vec![0.0, 0.0], &[2]);
        let y = real(vec![1.0, -1.0], &[2]);
        let out = x.pow(&y).unwrap().to_real_vec().unwrap();
        assert_eq!(out[0], 0.0);
        assert!(out[1].is_infinite());
    }
}
