//! Degree-balance check over the multigraph of successful transitions.
//!
//! Thread boundaries are ignored. If the successful operations can be
//! replayed as one sequence of register states starting at the initial value,
//! their transitions form an Eulerian path (or circuit) in the multigraph, so
//! at most one value may have a surplus of outgoing transitions, and it must
//! be the initial value. The converse does not hold: connectivity is never
//! checked, so this is a necessary condition only.

use core::fmt::Debug;
use core::hash::Hash;

use crate::consistency::error::Violation;
use crate::consistency::witness::Witness;
use crate::graph::transition::TransitionGraph;
use crate::history::types::CasOperation;

/// How a value's incoming and outgoing transition counts relate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Imbalance {
    /// As many incoming as outgoing transitions.
    Balanced,
    /// One more outgoing than incoming transition: a path may start here.
    Source,
    /// One more incoming than outgoing transition: a path may end here.
    Sink,
    /// Off by two or more. Neither a source nor a sink; ignored.
    Skewed,
}

impl Imbalance {
    #[must_use]
    pub const fn classify(in_degree: usize, out_degree: usize) -> Self {
        if in_degree == out_degree {
            Self::Balanced
        } else if in_degree == out_degree + 1 {
            Self::Sink
        } else if in_degree + 1 == out_degree {
            Self::Source
        } else {
            Self::Skewed
        }
    }
}

/// Checks the degree-balance condition over `operations`.
///
/// Passes with [`Witness::Balanced`] if no value is a source or a sink, and
/// with [`Witness::EulerianPath`] if the only source is `initial_value` and
/// the only sink is some other value.
///
/// # Errors
///
/// Returns [`Violation::SecondSource`] or [`Violation::SecondSink`] as soon as
/// a second candidate is found, and [`Violation::UnanchoredPath`] if the
/// source and sink found do not form a path out of `initial_value`.
pub fn check_degree_balance<'a, Value, I>(
    operations: I,
    initial_value: &Value,
) -> Result<Witness<Value>, Violation<Value>>
where
    Value: Eq + Hash + Clone + Debug + 'a,
    I: IntoIterator<Item = &'a CasOperation<Value>>,
{
    let graph = TransitionGraph::from_successful(operations);
    let in_degrees = graph.in_degrees();
    let out_degrees = graph.out_degrees();

    tracing::debug!(
        edges = graph.edge_count(),
        ?initial_value,
        "checking degree balance"
    );

    let mut source: Option<Value> = None;
    let mut sink: Option<Value> = None;

    for value in graph.vertices() {
        let in_degree = in_degrees.get(&value).copied().unwrap_or(0);
        let out_degree = out_degrees.get(&value).copied().unwrap_or(0);

        match Imbalance::classify(in_degree, out_degree) {
            Imbalance::Balanced | Imbalance::Skewed => {}
            Imbalance::Source => {
                if let Some(first) = source {
                    return Err(Violation::SecondSource {
                        first,
                        second: value,
                    });
                }
                source = Some(value);
            }
            Imbalance::Sink => {
                if let Some(first) = sink {
                    return Err(Violation::SecondSink {
                        first,
                        second: value,
                    });
                }
                sink = Some(value);
            }
        }
    }

    match (source, sink) {
        (None, None) => Ok(Witness::Balanced),
        (Some(source), Some(sink)) if source == *initial_value && sink != *initial_value => {
            Ok(Witness::EulerianPath { source, sink })
        }
        (source, sink) => {
            tracing::debug!(?source, ?sink, "path is not anchored at the initial value");
            Err(Violation::UnanchoredPath { source, sink })
        }
    }
}
