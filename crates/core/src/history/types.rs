use alloc::vec::Vec;
use core::fmt::{Debug, Display, Formatter, Result};

/// A single compare-and-swap attempt against the shared register.
///
/// The attempt replaces `expected_value` with `new_value` if the register held
/// `expected_value` at that moment; `succeeded` records the observed outcome.
#[cfg_attr(feature = "serde", derive(::serde::Serialize, ::serde::Deserialize))]
#[cfg_attr(feature = "schemars", derive(::schemars::JsonSchema))]
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CasOperation<Value> {
    pub expected_value: Value,
    pub new_value: Value,
    pub succeeded: bool,
}

impl<Value> CasOperation<Value> {
    #[must_use]
    pub const fn succeeded(expected_value: Value, new_value: Value) -> Self {
        Self {
            expected_value,
            new_value,
            succeeded: true,
        }
    }

    #[must_use]
    pub const fn failed(expected_value: Value, new_value: Value) -> Self {
        Self {
            expected_value,
            new_value,
            succeeded: false,
        }
    }

    /// Returns `true` if the operation swaps a value for itself.
    pub fn is_self_loop(&self) -> bool
    where
        Value: PartialEq,
    {
        self.expected_value == self.new_value
    }
}

impl<Value> Debug for CasOperation<Value>
where
    Value: Debug,
{
    fn fmt(&self, f: &mut Formatter) -> Result {
        write!(f, "{:?}->{:?}", self.expected_value, self.new_value)?;
        if !self.succeeded {
            write!(f, "!")?;
        }
        Ok(())
    }
}

impl<Value> Display for CasOperation<Value>
where
    Value: Display,
{
    fn fmt(&self, f: &mut Formatter) -> Result {
        write!(f, "{}->{}", self.expected_value, self.new_value)?;
        if !self.succeeded {
            write!(f, "!")?;
        }
        Ok(())
    }
}

/// The operations a single thread issued, in program order.
pub type OperationHistory<Value> = Vec<CasOperation<Value>>;

/// Position of an operation within a history.
///
/// `thread_id` indexes the thread (starting at 0) and `thread_height` the
/// operation within that thread's program order. Ordering is lexicographic.
#[cfg_attr(feature = "serde", derive(::serde::Serialize, ::serde::Deserialize))]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct OperationId {
    pub thread_id: u64,
    pub thread_height: u64,
}

impl Display for OperationId {
    fn fmt(&self, f: &mut Formatter) -> Result {
        write!(f, "t{}#{}", self.thread_id, self.thread_height)
    }
}

/// A recorded history: the register's initial value and every thread's
/// operations.
#[cfg_attr(feature = "serde", derive(::serde::Serialize, ::serde::Deserialize))]
#[cfg_attr(feature = "schemars", derive(::schemars::JsonSchema))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CasHistory<Value> {
    pub initial_value: Value,
    pub threads: Vec<OperationHistory<Value>>,
}

impl<Value> CasHistory<Value> {
    #[must_use]
    pub const fn new(initial_value: Value, threads: Vec<OperationHistory<Value>>) -> Self {
        Self {
            initial_value,
            threads,
        }
    }

    /// Iterates over every operation together with its [`OperationId`],
    /// thread by thread, in program order.
    pub fn operations(&self) -> impl Iterator<Item = (OperationId, &CasOperation<Value>)> {
        operations(&self.threads)
    }

    /// Like [`operations`](Self::operations), restricted to successful attempts.
    pub fn successful_operations(
        &self,
    ) -> impl Iterator<Item = (OperationId, &CasOperation<Value>)> {
        self.operations().filter(|(_, operation)| operation.succeeded)
    }

    /// Total number of recorded operations across all threads.
    #[must_use]
    pub fn len(&self) -> usize {
        self.threads.iter().map(Vec::len).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.threads.iter().all(Vec::is_empty)
    }
}

/// Iterates over every operation of `threads` with its [`OperationId`].
pub fn operations<Value>(
    threads: &[OperationHistory<Value>],
) -> impl Iterator<Item = (OperationId, &CasOperation<Value>)> {
    (0..).zip(threads.iter()).flat_map(|(thread_id, thread)| {
        (0..).zip(thread.iter()).map(move |(thread_height, operation)| {
            (
                OperationId {
                    thread_id,
                    thread_height,
                },
                operation,
            )
        })
    })
}

#[cfg(test)]
mod tests {
    use alloc::format;
    use alloc::vec;

    use super::*;

    #[test]
    fn test_operation_rendering() {
        assert_eq!(format!("{}", CasOperation::succeeded(1, 2)), "1->2");
        assert_eq!(format!("{}", CasOperation::failed(3, 5)), "3->5!");
        assert_eq!(format!("{:?}", CasOperation::failed("a", "b")), "\"a\"->\"b\"!");
    }

    #[test]
    fn test_operation_ids_follow_program_order() {
        let history = CasHistory::new(
            1,
            vec![
                vec![CasOperation::failed(3, 5), CasOperation::succeeded(1, 2)],
                vec![CasOperation::succeeded(2, 7)],
            ],
        );
        let ids: Vec<_> = history.operations().map(|(id, _)| id).collect();
        assert_eq!(
            ids,
            vec![
                OperationId {
                    thread_id: 0,
                    thread_height: 0
                },
                OperationId {
                    thread_id: 0,
                    thread_height: 1
                },
                OperationId {
                    thread_id: 1,
                    thread_height: 0
                },
            ]
        );
        assert_eq!(history.successful_operations().count(), 2);
        assert_eq!(history.len(), 3);
        assert!(!history.is_empty());
    }

    #[test]
    fn test_self_loop() {
        assert!(CasOperation::failed(4, 4).is_self_loop());
        assert!(!CasOperation::succeeded(4, 5).is_self_loop());
    }
}
