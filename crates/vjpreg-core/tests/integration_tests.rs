//! Integration tests for vjpreg-core
//!
//! These tests exercise the operations the gradient rules compose.

use vjpreg_core::{broadcast_shape, Complex64, DType, Operand};

#[test]
fn test_broadcast_then_reduce_restores_shape() {
    // (3,1) * (4,) broadcasts to (3,4); summing axis 1 with keepdims restores (3,1)
    let col = Operand::from_vec(vec![1.0, 2.0, 3.0], &[3, 1]).unwrap();
    let row = Operand::from_vec(vec![1.0, 1.0, 1.0, 1.0], &[4]).unwrap();

    let wide = col.mul(&row).unwrap();
    assert_eq!(wide.shape(), &[3, 4]);

    let back = wide.sum_axis(1, true).unwrap();
    assert_eq!(back.shape(), &[3, 1]);
    assert_eq!(back.to_real_vec().unwrap(), vec![4.0, 8.0, 12.0]);
}

#[test]
fn test_outer_product_via_expand_dims() {
    let g = Operand::from_vec(vec![1.0, 2.0], &[2]).unwrap();
    let v = Operand::from_vec(vec![3.0, 4.0, 5.0], &[3]).unwrap();

    let outer = g.expand_dims(1).unwrap().mul(&v).unwrap();
    assert_eq!(outer.shape(), &[2, 3]);
    assert_eq!(
        outer.to_real_vec().unwrap(),
        vec![3.0, 4.0, 5.0, 6.0, 8.0, 10.0]
    );
}

#[test]
fn test_complex_pipeline_and_real_part() {
    let z = Operand::from_complex_vec(
        vec![Complex64::new(1.0, 1.0), Complex64::new(2.0, -1.0)],
        &[2],
    )
    .unwrap();
    let two = Operand::scalar(2.0);

    let scaled = z.mul(&two).unwrap();
    assert_eq!(scaled.dtype(), DType::Complex);

    let re = scaled.real_part();
    assert_eq!(re.dtype(), DType::Real);
    assert_eq!(re.to_real_vec().unwrap(), vec![2.0, 4.0]);
}

#[test]
fn test_select_with_zeros_like() {
    let c = Operand::from_mask_vec(vec![false, true, true, false], &[2, 2]).unwrap();
    let g = Operand::from_vec(vec![1.0, 2.0, 3.0, 4.0], &[2, 2]).unwrap();

    let kept = Operand::select(&c, &g, &g.zeros_like()).unwrap();
    let dropped = Operand::select(&c, &g.zeros_like(), &g).unwrap();

    assert_eq!(kept.to_real_vec().unwrap(), vec![0.0, 2.0, 3.0, 0.0]);
    assert_eq!(dropped.to_real_vec().unwrap(), vec![1.0, 0.0, 0.0, 4.0]);
    assert_eq!(kept.add(&dropped).unwrap(), g);
}

#[test]
fn test_dot_shapes_for_all_supported_ranks() {
    let s = Operand::scalar(2.0);
    let v = Operand::ones(&[3]);
    let m = Operand::ones(&[2, 3]);
    let mt = m.transpose();

    assert_eq!(s.dot(&m).unwrap().shape(), &[2, 3]);
    assert_eq!(v.dot(&v).unwrap().shape(), &[] as &[usize]);
    assert_eq!(m.dot(&v).unwrap().shape(), &[2]);
    assert_eq!(v.dot(&mt).unwrap().shape(), &[2]);
    assert_eq!(m.dot(&mt).unwrap().shape(), &[2, 2]);
}

#[test]
fn test_broadcast_shape_is_symmetric() {
    let cases: [(&[usize], &[usize]); 4] = [
        (&[3, 1], &[3, 4]),
        (&[], &[5]),
        (&[2, 1, 4], &[3, 1]),
        (&[1], &[1, 1, 1]),
    ];
    for (a, b) in cases {
        assert_eq!(
            broadcast_shape(a, b).unwrap(),
            broadcast_shape(b, a).unwrap()
        );
    }
}
