//! Operation identifiers
//!
//! Rules are keyed by [`OpId`], a small `Copy` enum, rather than by function
//! identity. Built-in primitives have a stable lowercase name and a fixed
//! arity; [`OpId::Custom`] lets callers register rules for their own
//! primitives under a static name.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Identifier of a differentiable primitive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum OpId {
    /// `x + y`
    Add,
    /// `x - y`
    Subtract,
    /// `x * y`
    Multiply,
    /// `x / y`
    Divide,
    /// `x ** y`
    Power,
    /// `-x`
    Negative,
    /// `exp(x)`
    Exp,
    /// `log(x)`
    Log,
    /// `tanh(x)`
    Tanh,
    /// `sinh(x)`
    Sinh,
    /// `cosh(x)`
    Cosh,
    /// `where(condition, x, y)`
    Where,
    /// `dot(lhs, rhs)`
    Dot,
    /// Caller-defined primitive
    Custom(&'static str),
}

impl OpId {
    /// Every built-in operation, in declaration order
    pub const BUILTIN: [OpId; 13] = [
        OpId::Add,
        OpId::Subtract,
        OpId::Multiply,
        OpId::Divide,
        OpId::Power,
        OpId::Negative,
        OpId::Exp,
        OpId::Log,
        OpId::Tanh,
        OpId::Sinh,
        OpId::Cosh,
        OpId::Where,
        OpId::Dot,
    ];

    /// Stable lowercase name
    pub fn name(&self) -> &'static str {
        match self {
            OpId::Add => "add",
            OpId::Subtract => "subtract",
            OpId::Multiply => "multiply",
            OpId::Divide => "divide",
            OpId::Power => "power",
            OpId::Negative => "negative",
            OpId::Exp => "exp",
            OpId::Log => "log",
            OpId::Tanh => "tanh",
            OpId::Sinh => "sinh",
            OpId::Cosh => "cosh",
            OpId::Where => "where",
            OpId::Dot => "dot",
            OpId::Custom(name) => name,
        }
    }

    /// Number of operands a built-in primitive takes.
    ///
    /// Custom operations return `None`; their arity is whatever slot list
    /// they were registered with.
    ///
    /// ```
    /// use vjpreg_ad::OpId;
    ///
    /// assert_eq!(OpId::Where.arity(), Some(3));
    /// assert_eq!(OpId::Exp.arity(), Some(1));
    /// assert_eq!(OpId::Custom("softplus").arity(), None);
    /// ```
    pub fn arity(&self) -> Option<usize> {
        match self {
            OpId::Negative | OpId::Exp | OpId::Log | OpId::Tanh | OpId::Sinh | OpId::Cosh => {
                Some(1)
            }
            OpId::Add
            | OpId::Subtract
            | OpId::Multiply
            | OpId::Divide
            | OpId::Power
            | OpId::Dot => Some(2),
            OpId::Where => Some(3),
            OpId::Custom(_) => None,
        }
    }

    /// Whether this is one of the built-in primitives
    pub fn is_builtin(&self) -> bool {
        !matches!(self, OpId::Custom(_))
    }
}

impl fmt::Display for OpId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Returned when a name matches no built-in operation
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown operation name '{0}'")]
pub struct ParseOpIdError(pub String);

impl FromStr for OpId {
    type Err = ParseOpIdError;

    /// Parse a built-in operation name. Custom names cannot be parsed since
    /// they must be `'static`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OpId::BUILTIN
            .iter()
            .copied()
            .find(|op| op.name() == s)
            .ok_or_else(|| ParseOpIdError(s.to_string()))
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for OpId {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for OpId {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = <String as serde::Deserialize>::deserialize(deserializer)?;
        name.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_round_trip() {
        for op in OpId::BUILTIN {
            assert_eq!(op.to_string().parse::<OpId>().unwrap(), op);
        }
    }

    #[test]
    fn test_unknown_name() {
        let err = "matmul".parse::<OpId>().unwrap_err();
        assert_eq!(err, ParseOpIdError("matmul".to_string()));
    }

    #[test]
    fn test_custom_is_not_builtin() {
        let op = OpId::Custom("softplus");
        assert!(!op.is_builtin());
        assert_eq!(op.to_string(), "softplus");
        assert!(OpId::BUILTIN.iter().all(|b| b.is_builtin()));
    }

    #[test]
    fn test_every_builtin_has_arity() {
        for op in OpId::BUILTIN {
            assert!(matches!(op.arity(), Some(1..=3)), "{op} has no arity");
        }
    }
}
