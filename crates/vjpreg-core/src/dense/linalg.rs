//! Generalized dot product for operands of rank 0, 1 and 2
//!
//! Semantics follow `numpy.dot` restricted to those ranks:
//!
//! | ranks | result |
//! |---|---|
//! | either is 0 | element-wise product |
//! | 1, 1 | inner product (rank 0) |
//! | 2, 1 | matrix-vector product |
//! | 1, 2 | vector-matrix product |
//! | 2, 2 | matrix product |

use scirs2_core::ndarray::LinalgScalar;
use scirs2_core::ndarray_ext::{Array, Ix1, Ix2, IxDyn};

use super::types::Operand;
use crate::types::DType;

impl Operand {
    /// Generalized dot product.
    ///
    /// # Errors
    ///
    /// Returns an error if either rank exceeds 2 or the contracted extents
    /// differ.
    ///
    /// # Examples
    ///
    /// ```
    /// use vjpreg_core::Operand;
    ///
    /// let m = Operand::from_vec(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], &[2, 3]).unwrap();
    /// let v = Operand::from_vec(vec![1.0, 0.0, -1.0], &[3]).unwrap();
    /// let mv = m.dot(&v).unwrap();
    /// assert_eq!(mv.shape(), &[2]);
    /// assert_eq!(mv.to_real_vec().unwrap(), vec![-2.0, -2.0]);
    ///
    /// assert!(Operand::ones(&[2, 2, 2]).dot(&v).is_err());
    /// ```
    pub fn dot(&self, other: &Operand) -> anyhow::Result<Self> {
        let (lr, rr) = (self.rank(), other.rank());
        if lr > 2 || rr > 2 {
            anyhow::bail!("dot supports ranks 0, 1 and 2, got {} and {}", lr, rr);
        }
        if lr == 0 || rr == 0 {
            return self.mul(other);
        }
        match self.dtype().promote(other.dtype()) {
            DType::Complex => {
                let (a, b) = (self.complex_cow(), other.complex_cow());
                Ok(Operand::Complex(dot_arrays(&*a, &*b)?))
            }
            DType::Real | DType::Bool => {
                let (a, b) = (self.real_cow(), other.real_cow());
                Ok(Operand::Real(dot_arrays(&*a, &*b)?))
            }
        }
    }
}

fn dot_arrays<A: LinalgScalar>(
    a: &Array<A, IxDyn>,
    b: &Array<A, IxDyn>,
) -> anyhow::Result<Array<A, IxDyn>> {
    let check = |k_a: usize, k_b: usize| -> anyhow::Result<()> {
        if k_a != k_b {
            anyhow::bail!(
                "dot contraction mismatch: {:?} and {:?} ({} vs {})",
                a.shape(),
                b.shape(),
                k_a,
                k_b
            );
        }
        Ok(())
    };
    match (a.ndim(), b.ndim()) {
        (1, 1) => {
            let a1 = a.view().into_dimensionality::<Ix1>()?;
            let b1 = b.view().into_dimensionality::<Ix1>()?;
            check(a1.len(), b1.len())?;
            Ok(Array::from_elem(IxDyn(&[]), a1.dot(&b1)))
        }
        (2, 1) => {
            let a2 = a.view().into_dimensionality::<Ix2>()?;
            let b1 = b.view().into_dimensionality::<Ix1>()?;
            check(a2.ncols(), b1.len())?;
            Ok(a2.dot(&b1).into_dyn())
        }
        (1, 2) => {
            let a1 = a.view().into_dimensionality::<Ix1>()?;
            let b2 = b.view().into_dimensionality::<Ix2>()?;
            check(a1.len(), b2.nrows())?;
            Ok(a1.dot(&b2).into_dyn())
        }
        (2, 2) => {
            let a2 = a.view().into_dimensionality::<Ix2>()?;
            let b2 = b.view().into_dimensionality::<Ix2>()?;
            check(a2.ncols(), b2.nrows())?;
            Ok(a2.dot(&b2).into_dyn())
        }
        (lr, rr) => anyhow::bail!("dot_arrays called with ranks {} and {}", lr, rr),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn real(v: Vec<f64>, shape: &[usize]) -> Operand {
        Operand::from_vec(v, shape).unwrap()
    }

    #[test]
    fn test_inner_product_is_rank_zero() {
        let a = real(vec![1.0, 2.0, 3.0], &[3]);
        let b = real(vec![4.0, 5.0, 6.0], &[3]);
        let out = a.dot(&b).unwrap();
        assert_eq!(out.rank(), 0);
        assert_eq!(out.get_real(&[]), Some(32.0));
    }

    #[test]
    fn test_vector_matrix() {
        let v = real(vec![1.0, 1.0], &[2]);
        let m = real(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], &[2, 3]);
        let out = v.dot(&m).unwrap();
        assert_eq!(out.to_real_vec().unwrap(), vec![5.0, 7.0, 9.0]);
    }

    #[test]
    fn test_matrix_matrix_with_transposed_operand() {
        let a = real(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], &[2, 3]);
        let gram = a.dot(&a.transpose()).unwrap();
        assert_eq!(gram.shape(), &[2, 2]);
        assert_eq!(gram.to_real_vec().unwrap(), vec![14.0, 32.0, 32.0, 77.0]);
    }

    #[test]
    fn test_scalar_dot_is_elementwise() {
        let m = real(vec![1.0, 2.0, 3.0, 4.0], &[2, 2]);
        let out = Operand::scalar(2.0).dot(&m).unwrap();
        assert_eq!(out.to_real_vec().unwrap(), vec![2.0, 4.0, 6.0, 8.0]);
    }

    #[test]
    fn test_contraction_mismatch() {
        let a = real(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], &[2, 3]);
        let b = real(vec![1.0, 2.0], &[2]);
        assert!(a.dot(&b).is_err());
    }
}
