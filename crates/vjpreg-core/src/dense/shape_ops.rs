//! Broadcasting and shape manipulation
//!
//! Broadcasting follows NumPy semantics: shapes are aligned from the
//! trailing axis, and each pair of extents must be equal or contain a 1.

use scirs2_core::ndarray_ext::{Array, Axis as NdAxis, IxDyn, Zip};

use super::types::Operand;

/// Compute the broadcast shape of two shapes.
///
/// # Errors
///
/// Returns an error if some aligned pair of extents differs and neither is 1.
///
/// # Examples
///
/// ```
/// use vjpreg_core::dense::broadcast_shape;
///
/// assert_eq!(broadcast_shape(&[3, 1], &[4]).unwrap(), vec![3, 4]);
/// assert_eq!(broadcast_shape(&[], &[2, 2]).unwrap(), vec![2, 2]);
/// assert!(broadcast_shape(&[3], &[4]).is_err());
/// ```
pub fn broadcast_shape(a: &[usize], b: &[usize]) -> anyhow::Result<Vec<usize>> {
    let rank = a.len().max(b.len());
    let mut shape = vec![0; rank];
    for i in 0..rank {
        let da = extent_from_back(a, i);
        let db = extent_from_back(b, i);
        shape[rank - 1 - i] = match (da, db) {
            (x, y) if x == y => x,
            (1, y) => y,
            (x, 1) => x,
            _ => anyhow::bail!("Shapes {:?} and {:?} cannot be broadcast together", a, b),
        };
    }
    Ok(shape)
}

fn extent_from_back(shape: &[usize], i: usize) -> usize {
    if i < shape.len() {
        shape[shape.len() - 1 - i]
    } else {
        1
    }
}

/// Apply `f` to every pair of elements of `a` and `b` after broadcasting.
pub(crate) fn zip_map<A, B, C, F>(
    a: &Array<A, IxDyn>,
    b: &Array<B, IxDyn>,
    f: F,
) -> anyhow::Result<Array<C, IxDyn>>
where
    F: Fn(&A, &B) -> C,
{
    let shape = broadcast_shape(a.shape(), b.shape())?;
    let av = a
        .broadcast(IxDyn(&shape))
        .ok_or_else(|| anyhow::anyhow!("Cannot broadcast {:?} to {:?}", a.shape(), shape))?;
    let bv = b
        .broadcast(IxDyn(&shape))
        .ok_or_else(|| anyhow::anyhow!("Cannot broadcast {:?} to {:?}", b.shape(), shape))?;
    Ok(Zip::from(av).and(bv).map_collect(|x, y| f(x, y)))
}

/// Three-way variant of [`zip_map`], used by selection.
pub(crate) fn zip_map3<A, B, C, R, F>(
    a: &Array<A, IxDyn>,
    b: &Array<B, IxDyn>,
    c: &Array<C, IxDyn>,
    f: F,
) -> anyhow::Result<Array<R, IxDyn>>
where
    F: Fn(&A, &B, &C) -> R,
{
    let shape = broadcast_shape(&broadcast_shape(a.shape(), b.shape())?, c.shape())?;
    let dim = IxDyn(&shape);
    let av = a
        .broadcast(dim.clone())
        .ok_or_else(|| anyhow::anyhow!("Cannot broadcast {:?} to {:?}", a.shape(), shape))?;
    let bv = b
        .broadcast(dim.clone())
        .ok_or_else(|| anyhow::anyhow!("Cannot broadcast {:?} to {:?}", b.shape(), shape))?;
    let cv = c
        .broadcast(dim)
        .ok_or_else(|| anyhow::anyhow!("Cannot broadcast {:?} to {:?}", c.shape(), shape))?;
    Ok(Zip::from(av).and(bv).and(cv).map_collect(|x, y, z| f(x, y, z)))
}

impl Operand {
    /// Reverse the order of all axes (matrix transpose for rank 2, identity
    /// for rank 0 and 1).
    ///
    /// # Examples
    ///
    /// ```
    /// use vjpreg_core::Operand;
    ///
    /// let m = Operand::from_vec(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], &[2, 3]).unwrap();
    /// let t = m.transpose();
    /// assert_eq!(t.shape(), &[3, 2]);
    /// assert_eq!(t.get_real(&[2, 0]), Some(3.0));
    /// ```
    pub fn transpose(&self) -> Self {
        match self {
            Operand::Bool(a) => Operand::Bool(a.clone().reversed_axes()),
            Operand::Real(a) => Operand::Real(a.clone().reversed_axes()),
            Operand::Complex(a) => Operand::Complex(a.clone().reversed_axes()),
        }
    }

    /// Insert a new axis of extent 1 at position `axis`.
    ///
    /// # Errors
    ///
    /// Returns an error if `axis > rank`.
    ///
    /// # Examples
    ///
    /// ```
    /// use vjpreg_core::Operand;
    ///
    /// let v = Operand::from_vec(vec![1.0, 2.0], &[2]).unwrap();
    /// assert_eq!(v.expand_dims(1).unwrap().shape(), &[2, 1]);
    /// assert_eq!(v.expand_dims(0).unwrap().shape(), &[1, 2]);
    /// ```
    pub fn expand_dims(&self, axis: usize) -> anyhow::Result<Self> {
        if axis > self.rank() {
            anyhow::bail!(
                "Axis {} out of bounds for expand_dims on rank {}",
                axis,
                self.rank()
            );
        }
        Ok(match self {
            Operand::Bool(a) => Operand::Bool(a.clone().insert_axis(NdAxis(axis))),
            Operand::Real(a) => Operand::Real(a.clone().insert_axis(NdAxis(axis))),
            Operand::Complex(a) => Operand::Complex(a.clone().insert_axis(NdAxis(axis))),
        })
    }
}
