//! Chain check: the authoritative linearizability check for CAS histories.
//!
//! Every value may be written at most once and the initial value never, so
//! the successful transitions must form one unbranching chain of register
//! states out of the initial value. A history is linearizable iff all
//! successful transitions lie on that chain and every thread performed its
//! own successful transitions in chain order.

use alloc::vec::Vec;
use core::fmt::Debug;
use core::hash::Hash;

use hashbrown::hash_map::Entry;
use hashbrown::HashMap;

use crate::consistency::error::{Error, Violation};
use crate::consistency::witness::Witness;
use crate::graph::transition::TransitionGraph;
use crate::history::error::MalformedHistory;
use crate::history::types::{operations, OperationHistory, OperationId};

/// Transition graph of a validated history.
#[derive(Debug)]
pub struct ChainGraph<Value>
where
    Value: Eq + Hash + Clone + Debug,
{
    pub graph: TransitionGraph<Value>,
    /// The successful operation that wrote each value.
    pub writers: HashMap<Value, OperationId>,
}

impl<Value> ChainGraph<Value>
where
    Value: Eq + Hash + Clone + Debug,
{
    /// Validates every operation of every thread, successful or not, and
    /// builds the graph of successful transitions.
    ///
    /// # Errors
    ///
    /// Returns a [`MalformedHistory`] on the first operation that swaps a
    /// value for itself, writes `initial_value`, or writes a value some
    /// earlier operation already wrote.
    pub fn build(
        threads: &[OperationHistory<Value>],
        initial_value: &Value,
    ) -> Result<Self, MalformedHistory<Value>> {
        let mut graph = TransitionGraph::default();
        let mut writers = HashMap::new();
        let mut targets: HashMap<&Value, OperationId> = HashMap::new();

        for (id, operation) in operations(threads) {
            if operation.is_self_loop() {
                return Err(MalformedHistory::SelfLoop {
                    operation: operation.clone(),
                    id,
                });
            }
            if operation.new_value == *initial_value {
                return Err(MalformedHistory::InitialValueTarget {
                    operation: operation.clone(),
                    id,
                });
            }
            match targets.entry(&operation.new_value) {
                Entry::Occupied(entry) => {
                    return Err(MalformedHistory::DuplicateTarget {
                        operation: operation.clone(),
                        ids: [*entry.get(), id],
                    });
                }
                Entry::Vacant(entry) => {
                    entry.insert(id);
                }
            }

            if operation.succeeded {
                graph.add_edge(
                    operation.expected_value.clone(),
                    operation.new_value.clone(),
                );
                writers.insert(operation.new_value.clone(), id);
            }
        }

        Ok(Self { graph, writers })
    }

    /// Follows the unique outgoing transition from `initial_value` until a
    /// value with none, returning the values written along the way.
    ///
    /// Position `i` of the result is the chain index of the transition that
    /// wrote it. The walk terminates because no value is written twice and
    /// the initial value is never written.
    ///
    /// # Errors
    ///
    /// Returns [`Violation::Branch`] if a value on the chain has more than
    /// one outgoing transition.
    pub fn traverse(&self, initial_value: &Value) -> Result<Vec<Value>, Violation<Value>> {
        let mut chain = Vec::new();
        let mut current = initial_value;
        loop {
            match self.graph.successors(current) {
                [] => break,
                [next] => {
                    tracing::trace!(
                        index = chain.len(),
                        from = ?current,
                        to = ?next,
                        "chain step"
                    );
                    chain.push(next.clone());
                    current = next;
                }
                targets => {
                    return Err(Violation::Branch {
                        value: current.clone(),
                        targets: targets.to_vec(),
                    });
                }
            }
        }
        Ok(chain)
    }
}

/// Checks that `threads` is consistent with a single chain of transitions out
/// of `initial_value`, observed by every thread in program order.
///
/// On success returns [`Witness::Chain`] with the successful operations in
/// chain order.
///
/// # Errors
///
/// Returns [`Error::Malformed`] if the history violates the structural
/// preconditions (see [`ChainGraph::build`]), and [`Error::Violation`] if it
/// is well-formed but cannot be linearized.
pub fn check_chain<Value>(
    threads: &[OperationHistory<Value>],
    initial_value: &Value,
) -> Result<Witness<Value>, Error<Value>>
where
    Value: Eq + Hash + Clone + Debug,
{
    tracing::debug!(threads = threads.len(), ?initial_value, "checking chain");

    let chain_graph = ChainGraph::build(threads, initial_value)?;
    let total_edges = chain_graph.graph.edge_count();

    if !chain_graph.graph.has_outgoing(initial_value) {
        if total_edges > 0 {
            return Err(Violation::DetachedTransitions { edges: total_edges }.into());
        }
        // No transition succeeded, so no operation may start from the initial value.
        if let Some((id, operation)) =
            operations(threads).find(|(_, operation)| operation.expected_value == *initial_value)
        {
            return Err(Violation::UnresolvedInitialAttempt {
                operation: operation.clone(),
                id,
            }
            .into());
        }
        tracing::debug!("no successful transitions");
        return Ok(Witness::Chain(Vec::new()));
    }

    let chain = chain_graph.traverse(initial_value)?;
    if chain.len() != total_edges {
        return Err(Violation::Unreachable {
            traversed: chain.len(),
            total: total_edges,
        }
        .into());
    }

    let chain_index: HashMap<&Value, usize> =
        chain.iter().enumerate().map(|(i, value)| (value, i)).collect();

    for (thread_id, thread) in (0..).zip(threads.iter()) {
        let mut previous: Option<(OperationId, usize)> = None;
        for (thread_height, operation) in (0..).zip(thread.iter()) {
            if !operation.succeeded {
                continue;
            }
            let id = OperationId {
                thread_id,
                thread_height,
            };
            let Some(&index) = chain_index.get(&operation.new_value) else {
                return Err(Violation::Unreachable {
                    traversed: chain.len(),
                    total: total_edges,
                }
                .into());
            };
            if let Some((earlier, earlier_index)) = previous {
                if index <= earlier_index {
                    tracing::debug!(
                        %earlier,
                        later = %id,
                        "thread observed the chain out of order"
                    );
                    return Err(Violation::ProgramOrder { earlier, later: id }.into());
                }
            }
            previous = Some((id, index));
        }
    }

    Ok(Witness::Chain(
        chain
            .iter()
            .filter_map(|value| chain_graph.writers.get(value).copied())
            .collect(),
    ))
}
