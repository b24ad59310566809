use alloc::vec::Vec;

use derive_more::From;

use crate::history::error::MalformedHistory;
use crate::history::types::{CasOperation, OperationId};

/// Reason a well-formed history is rejected.
#[cfg_attr(feature = "serde", derive(::serde::Serialize, ::serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Violation<Value> {
    /// Two values have one more outgoing than incoming transition.
    SecondSource { first: Value, second: Value },
    /// Two values have one more incoming than outgoing transition.
    SecondSink { first: Value, second: Value },
    /// The transitions are unbalanced but do not form a path that starts at
    /// the initial value and ends elsewhere.
    UnanchoredPath {
        source: Option<Value>,
        sink: Option<Value>,
    },
    /// No transition succeeded, yet an operation was attempted from the
    /// initial value.
    UnresolvedInitialAttempt {
        operation: CasOperation<Value>,
        id: OperationId,
    },
    /// Transitions succeeded but none of them leaves the initial value.
    DetachedTransitions { edges: usize },
    /// A value on the chain was swapped out more than once.
    Branch { value: Value, targets: Vec<Value> },
    /// Some successful transitions are not reachable from the initial value.
    Unreachable { traversed: usize, total: usize },
    /// A thread observed two transitions in the opposite order of the chain.
    ProgramOrder {
        earlier: OperationId,
        later: OperationId,
    },
}

/// Error returned when a history fails a check.
#[cfg_attr(feature = "serde", derive(::serde::Serialize, ::serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq, From)]
pub enum Error<Value> {
    /// The history violates structural preconditions.
    Malformed(MalformedHistory<Value>),
    /// The history is well-formed but cannot be linearized.
    Violation(Violation<Value>),
}
