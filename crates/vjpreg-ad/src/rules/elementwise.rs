//! Gradient rules for element-wise primitives
//!
//! Binary rules reconcile their result to the operand's shape with
//! [`unbroadcast`]; unary rules preserve shape already.
//!
//! | op | d/dx | d/dy |
//! |---|---|---|
//! | add | `g` | `g` |
//! | subtract | `g` | `-g` |
//! | multiply | `y * g` | `x * g` |
//! | divide | `g / y` | `-g * x / y^2` |
//! | power | `g * y * x^where(y, y - 1, 1)` | `g * log(replace_zero(x, 1)) * ans` |
//! | negative | `-g` | |
//! | exp | `ans * g` | |
//! | log | `g / x` | |
//! | tanh | `g / cosh(x)^2` | |
//! | sinh | `g * cosh(x)` | |
//! | cosh | `g * sinh(x)` | |
//!
//! The power rule substitutes exponent `1` wherever `y == 0`, so `x = 0`
//! never meets a negative exponent there.

use vjpreg_core::Operand;

use super::args;
use crate::error::GradResult;
use crate::op::OpId;
use crate::registry::Registry;
use crate::slot::GradSlot;
use crate::unbroadcast::{replace_zero, unbroadcast};

pub(crate) fn register(registry: &mut Registry) {
    registry.register(
        OpId::Add,
        vec![
            GradSlot::direct(|g, _, operands| {
                let [x, _] = args::<2>(OpId::Add, operands)?;
                unbroadcast(x, g.clone())
            }),
            GradSlot::direct(|g, _, operands| {
                let [_, y] = args::<2>(OpId::Add, operands)?;
                unbroadcast(y, g.clone())
            }),
        ],
    );

    registry.register(
        OpId::Subtract,
        vec![
            GradSlot::direct(|g, _, operands| {
                let [x, _] = args::<2>(OpId::Subtract, operands)?;
                unbroadcast(x, g.clone())
            }),
            GradSlot::direct(|g, _, operands| {
                let [_, y] = args::<2>(OpId::Subtract, operands)?;
                unbroadcast(y, g.neg())
            }),
        ],
    );

    registry.register(
        OpId::Multiply,
        vec![
            GradSlot::direct(|g, _, operands| {
                let [x, y] = args::<2>(OpId::Multiply, operands)?;
                unbroadcast(x, y.mul(g)?)
            }),
            GradSlot::direct(|g, _, operands| {
                let [x, y] = args::<2>(OpId::Multiply, operands)?;
                unbroadcast(y, x.mul(g)?)
            }),
        ],
    );

    registry.register(
        OpId::Divide,
        vec![
            GradSlot::direct(|g, _, operands| {
                let [x, y] = args::<2>(OpId::Divide, operands)?;
                unbroadcast(x, g.div(y)?)
            }),
            GradSlot::direct(|g, _, operands| {
                let [x, y] = args::<2>(OpId::Divide, operands)?;
                unbroadcast(y, g.neg().mul(x)?.div(&y.square())?)
            }),
        ],
    );

    registry.register(
        OpId::Power,
        vec![
            GradSlot::direct(|g, _, operands| {
                let [x, y] = args::<2>(OpId::Power, operands)?;
                unbroadcast(x, power_base_grad(g, x, y)?)
            }),
            GradSlot::direct(|g, ans, operands| {
                let [x, y] = args::<2>(OpId::Power, operands)?;
                unbroadcast(y, power_exponent_grad(g, ans, x)?)
            }),
        ],
    );

    registry.register(OpId::Negative, vec![GradSlot::direct(|g, _, _| Ok(g.neg()))]);

    registry.register(
        OpId::Exp,
        vec![GradSlot::direct(|g, ans, _| Ok(ans.mul(g)?))],
    );

    registry.register(
        OpId::Log,
        vec![GradSlot::direct(|g, _, operands| {
            let [x] = args::<1>(OpId::Log, operands)?;
            Ok(g.div(x)?)
        })],
    );

    registry.register(
        OpId::Tanh,
        vec![GradSlot::direct(|g, _, operands| {
            let [x] = args::<1>(OpId::Tanh, operands)?;
            Ok(g.div(&x.cosh().square())?)
        })],
    );

    registry.register(
        OpId::Sinh,
        vec![GradSlot::direct(|g, _, operands| {
            let [x] = args::<1>(OpId::Sinh, operands)?;
            Ok(g.mul(&x.cosh())?)
        })],
    );

    registry.register(
        OpId::Cosh,
        vec![GradSlot::direct(|g, _, operands| {
            let [x] = args::<1>(OpId::Cosh, operands)?;
            Ok(g.mul(&x.sinh())?)
        })],
    );
}

/// `g * y * x ** where(y, y - 1, 1)`, before reconciliation
pub fn power_base_grad(g: &Operand, x: &Operand, y: &Operand) -> GradResult<Operand> {
    let exponent = Operand::select(y, &y.sub(&Operand::scalar(1.0))?, &Operand::scalar(1.0))?;
    Ok(g.mul(y)?.mul(&x.pow(&exponent)?)?)
}

/// `g * log(replace_zero(x, 1)) * ans`, before reconciliation
pub fn power_exponent_grad(g: &Operand, ans: &Operand, x: &Operand) -> GradResult<Operand> {
    let log_x = replace_zero(x, 1.0)?.ln();
    Ok(g.mul(&log_x)?.mul(ans)?)
}
