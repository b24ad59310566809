use core::fmt::Debug;
use core::hash::Hash;

use self::chain::check_chain;
use self::degree_balance::check_degree_balance;
use self::error::Error;
use crate::history::error::MalformedHistory;
use crate::history::types::{CasOperation, OperationHistory};

pub mod chain;
pub mod degree_balance;
pub mod error;
pub mod witness;

pub use witness::Witness;

/// Checking algorithms supported by cascheck.
///
/// [`DegreeBalance`](Self::DegreeBalance) is a cheap necessary condition that
/// ignores threads. [`Chain`](Self::Chain) is the authoritative check: it
/// additionally requires every value to be written at most once and verifies
/// each thread's program order against the reconstructed chain.
#[cfg_attr(feature = "serde", derive(::serde::Serialize, ::serde::Deserialize))]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Algorithm {
    /// Eulerian-path degree condition over all successful transitions.
    DegreeBalance,
    /// Unique chain from the initial value, respected by every thread.
    Chain,
}

/// Check `threads` against `initial_value` with the selected [`Algorithm`].
///
/// On success, returns a [`Witness`]:
///
/// - [`Witness::Balanced`] or [`Witness::EulerianPath`] for
///   [`Algorithm::DegreeBalance`].
/// - [`Witness::Chain`] for [`Algorithm::Chain`], listing the successful
///   operations in chain order.
///
/// # Errors
///
/// Returns [`Error::Violation`] if the history cannot be linearized, and
/// [`Error::Malformed`] if [`Algorithm::Chain`] finds the history violates its
/// structural preconditions.
pub fn check<Value>(
    threads: &[OperationHistory<Value>],
    initial_value: &Value,
    algorithm: Algorithm,
) -> Result<Witness<Value>, Error<Value>>
where
    Value: Eq + Hash + Clone + Debug,
{
    tracing::debug!(threads = threads.len(), ?algorithm, "checking history");

    let result = match algorithm {
        Algorithm::DegreeBalance => {
            check_degree_balance(threads.iter().flatten(), initial_value).map_err(Error::from)
        }
        Algorithm::Chain => check_chain(threads, initial_value),
    };

    if let Err(err) = &result {
        tracing::debug!(?err, "history rejected");
    }
    result
}

/// Degree-balance verdict for a flat sequence of operations.
///
/// `true` means the successful transitions could compose into a single chain
/// of states starting at `initial_value`; it does not prove they do.
pub fn check_unrestricted<Value>(operations: &[CasOperation<Value>], initial_value: &Value) -> bool
where
    Value: Eq + Hash + Clone + Debug,
{
    check_degree_balance(operations, initial_value).is_ok()
}

/// Chain verdict for per-thread operation histories.
///
/// # Errors
///
/// Returns the [`MalformedHistory`] if the history violates the structural
/// preconditions; a well-formed history that cannot be linearized yields
/// `Ok(false)`.
pub fn check_restricted<Value>(
    threads: &[OperationHistory<Value>],
    initial_value: &Value,
) -> Result<bool, MalformedHistory<Value>>
where
    Value: Eq + Hash + Clone + Debug,
{
    match check_chain(threads, initial_value) {
        Ok(_) => Ok(true),
        Err(Error::Violation(_)) => Ok(false),
        Err(Error::Malformed(err)) => Err(err),
    }
}
