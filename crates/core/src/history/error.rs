use core::fmt::{Debug, Display, Formatter, Result};

use super::types::{CasOperation, OperationId};

/// A history that violates the structural preconditions of the chain checker.
///
/// This is not a verdict: the history cannot be interpreted as a chain of
/// register states at all.
#[cfg_attr(feature = "serde", derive(::serde::Serialize, ::serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MalformedHistory<Value> {
    /// An operation swaps a value for itself.
    SelfLoop {
        operation: CasOperation<Value>,
        id: OperationId,
    },
    /// An operation writes the initial value back.
    InitialValueTarget {
        operation: CasOperation<Value>,
        id: OperationId,
    },
    /// Two operations write the same value.
    DuplicateTarget {
        operation: CasOperation<Value>,
        ids: [OperationId; 2],
    },
}

impl<Value> MalformedHistory<Value> {
    /// The operation that triggered the error.
    #[must_use]
    pub const fn operation(&self) -> &CasOperation<Value> {
        match self {
            Self::SelfLoop { operation, .. }
            | Self::InitialValueTarget { operation, .. }
            | Self::DuplicateTarget { operation, .. } => operation,
        }
    }
}

impl<Value> Display for MalformedHistory<Value>
where
    Value: Debug,
{
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        match self {
            Self::SelfLoop { operation, id } => {
                write!(f, "operation {operation:?} at {id} swaps a value for itself")
            }
            Self::InitialValueTarget { operation, id } => {
                write!(f, "operation {operation:?} at {id} writes the initial value")
            }
            Self::DuplicateTarget {
                operation,
                ids: [first, second],
            } => write!(
                f,
                "operation {operation:?} at {second} writes {:?}, already written at {first}",
                operation.new_value
            ),
        }
    }
}

impl<Value> core::error::Error for MalformedHistory<Value> where Value: Debug {}
