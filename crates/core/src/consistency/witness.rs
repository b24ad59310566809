use alloc::vec::Vec;

use crate::history::types::OperationId;

/// Evidence that a history passed a check.
#[cfg_attr(feature = "serde", derive(::serde::Serialize, ::serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Witness<Value> {
    /// Every value has as many incoming as outgoing successful transitions.
    /// Returned by the degree-balance checker.
    Balanced,
    /// The successful transitions may form a path from `source` (the initial
    /// value) to `sink`. Returned by the degree-balance checker.
    EulerianPath { source: Value, sink: Value },
    /// Successful operations in the order they occur along the chain from the
    /// initial value. Returned by the chain checker; empty if no operation
    /// succeeded.
    Chain(Vec<OperationId>),
}
