//! Rule registry
//!
//! Maps each [`OpId`] to its ordered list of [`GradSlot`]s, one per operand
//! position. The list is inserted whole, so an entry's length is the
//! operation's arity.
//!
//! A registry is populated once and then read concurrently;
//! [`Registry::global`] hands out a lazily built, shared instance holding
//! every built-in rule.
//!
//! # Examples
//!
//! ```
//! use vjpreg_ad::{OpId, Registry};
//! use vjpreg_core::Operand;
//!
//! let registry = Registry::global();
//! let x = Operand::from_vec(vec![1.0, 2.0], &[2]).unwrap();
//! let y = Operand::scalar(3.0);
//! let ans = x.mul(&y).unwrap();
//! let g = Operand::ones(&[2]);
//!
//! let gy = registry.vjp(OpId::Multiply, 1, &g, &ans, &[x, y]).unwrap();
//! assert_eq!(gy.rank(), 0);
//! assert_eq!(gy.get_real(&[]), Some(3.0));
//! ```

use std::collections::HashMap;
use std::sync::{Arc, LazyLock};

use tracing::{debug, info, instrument, warn};
use vjpreg_core::Operand;

use crate::error::{GradError, GradResult};
use crate::op::OpId;
use crate::rules;
use crate::slot::{bound, BoundVjp, GradSlot};

static GLOBAL: LazyLock<Registry> = LazyLock::new(|| {
    let registry = Registry::with_builtin_rules();
    info!(ops = registry.len(), "built global gradient registry");
    registry
});

/// Table of gradient rules keyed by operation
#[derive(Debug, Default, Clone)]
pub struct Registry {
    entries: HashMap<OpId, Vec<GradSlot>>,
}

impl Registry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry holding every built-in rule
    pub fn with_builtin_rules() -> Self {
        let mut registry = Self::new();
        rules::register_builtin(&mut registry);
        registry
    }

    /// Shared registry of built-in rules, built on first use
    pub fn global() -> &'static Registry {
        &GLOBAL
    }

    /// Associate `slots` with `op`, replacing any previous entry.
    pub fn register(&mut self, op: OpId, slots: Vec<GradSlot>) {
        if let Some(expected) = op.arity() {
            if expected != slots.len() {
                warn!(
                    %op,
                    expected,
                    actual = slots.len(),
                    "slot count differs from builtin arity"
                );
            }
        }
        debug!(%op, arity = slots.len(), "registering gradient rules");
        if let Some(previous) = self.entries.insert(op, slots) {
            warn!(%op, previous_arity = previous.len(), "overwrote existing gradient rules");
        }
    }

    /// Slot at position `argnum` of `op`.
    ///
    /// A [`GradSlot::NonDifferentiable`] slot is returned as-is.
    ///
    /// # Errors
    ///
    /// - [`GradError::UnregisteredOperation`] if `op` has no entry
    /// - [`GradError::IndexOutOfRange`] if `argnum` is not below the arity
    pub fn lookup(&self, op: OpId, argnum: usize) -> GradResult<&GradSlot> {
        let slots = self.slots(op)?;
        slots.get(argnum).ok_or(GradError::IndexOutOfRange {
            op,
            index: argnum,
            arity: slots.len(),
        })
    }

    /// Full slot list of `op`
    pub fn slots(&self, op: OpId) -> GradResult<&[GradSlot]> {
        self.entries
            .get(&op)
            .map(Vec::as_slice)
            .ok_or(GradError::UnregisteredOperation { op })
    }

    /// Registered arity of `op`, if it has an entry
    pub fn arity(&self, op: OpId) -> Option<usize> {
        self.entries.get(&op).map(Vec::len)
    }

    /// Whether `op` has an entry
    pub fn contains(&self, op: OpId) -> bool {
        self.entries.contains_key(&op)
    }

    /// Registered operations, sorted by name
    pub fn ops(&self) -> Vec<OpId> {
        let mut ops: Vec<OpId> = self.entries.keys().copied().collect();
        ops.sort_by_key(|op| op.name());
        ops
    }

    /// Number of registered operations
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no operation is registered
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Gradient of operand `argnum` of `op`, given upstream gradient `g`, the
    /// forward result `ans` and the forward operands.
    ///
    /// The result always has the shape of `operands[argnum]`.
    ///
    /// # Errors
    ///
    /// Lookup errors as in [`Registry::lookup`], plus
    /// [`GradError::ArityMismatch`], [`GradError::NonDifferentiableInput`],
    /// [`GradError::ShapeMismatch`] and any error raised by the rule itself.
    #[instrument(level = "debug", skip_all, fields(%op, argnum))]
    pub fn vjp(
        &self,
        op: OpId,
        argnum: usize,
        g: &Operand,
        ans: &Operand,
        operands: &[Operand],
    ) -> GradResult<Operand> {
        let slot = self.checked_slot(op, argnum, operands)?;
        debug!(
            slot = slot.kind(),
            g_shape = ?g.shape(),
            operand_shape = ?operands[argnum].shape(),
            "dispatching vjp"
        );
        let grad = match slot {
            GradSlot::Direct(f) => f(g, ans, operands)?,
            GradSlot::Deferred(make) => {
                let vjp = make(ans, operands)?;
                vjp(g)?
            }
            GradSlot::NonDifferentiable => {
                return Err(GradError::NonDifferentiableInput { op, index: argnum })
            }
        };
        verify_shape(operands[argnum].shape(), grad)
    }

    /// Two-stage form of [`Registry::vjp`]: bind the forward context now and
    /// apply upstream gradients later.
    ///
    /// ```
    /// use vjpreg_ad::{OpId, Registry};
    /// use vjpreg_core::Operand;
    ///
    /// let x = Operand::from_vec(vec![0.0, 1.0], &[2]).unwrap();
    /// let ans = x.exp();
    /// let vjp = Registry::global().bind(OpId::Exp, 0, &ans, &[x]).unwrap();
    ///
    /// let gx = vjp(&Operand::ones(&[2])).unwrap();
    /// assert_eq!(gx, ans);
    /// ```
    #[instrument(level = "debug", skip_all, fields(%op, argnum))]
    pub fn bind(
        &self,
        op: OpId,
        argnum: usize,
        ans: &Operand,
        operands: &[Operand],
    ) -> GradResult<BoundVjp> {
        let slot = self.checked_slot(op, argnum, operands)?;
        debug!(slot = slot.kind(), "binding vjp");
        let inner: BoundVjp = match slot {
            GradSlot::Direct(f) => {
                let f = Arc::clone(f);
                let ans = ans.clone();
                let operands = operands.to_vec();
                bound(move |g| f(g, &ans, &operands))
            }
            GradSlot::Deferred(make) => make(ans, operands)?,
            GradSlot::NonDifferentiable => {
                return Err(GradError::NonDifferentiableInput { op, index: argnum })
            }
        };
        let expected = operands[argnum].shape().to_vec();
        Ok(bound(move |g| verify_shape(&expected, inner(g)?)))
    }

    fn checked_slot(
        &self,
        op: OpId,
        argnum: usize,
        operands: &[Operand],
    ) -> GradResult<&GradSlot> {
        let slots = self.slots(op)?;
        if operands.len() != slots.len() {
            return Err(GradError::ArityMismatch {
                op,
                expected: slots.len(),
                actual: operands.len(),
            });
        }
        self.lookup(op, argnum)
    }
}

fn verify_shape(expected: &[usize], grad: Operand) -> GradResult<Operand> {
    if grad.shape() != expected {
        return Err(GradError::shape_mismatch(expected, grad.shape()));
    }
    Ok(grad)
}
