//! Linearizability checking for compare-and-swap histories.
//!
//! `cascheck_core` decides whether a recorded history of compare-and-swap
//! (CAS) attempts, issued by one or more threads against a single shared
//! register, is consistent with some sequential execution starting from a
//! known initial value. It offers two algorithms:
//!
//! 1. **Degree balance** -- ignores threads and checks that the successful
//!    transitions satisfy the degree condition for an Eulerian path starting
//!    at the initial value. Cheap, necessary but not sufficient.
//! 2. **Chain** -- requires every value to be written at most once, walks the
//!    unique chain of transitions out of the initial value, and checks that
//!    every thread performed its successful transitions in chain order.
//!
//! # Entry points
//!
//! [`check_unrestricted`] and [`check_restricted`] return plain verdicts.
//! [`check()`] takes an [`Algorithm`] and returns either a [`Witness`] or an
//! [`Error`](consistency::error::Error) explaining the rejection.
//!
//! ```rust,ignore
//! use cascheck_core::history::CasOperation;
//! use cascheck_core::{check, Algorithm};
//!
//! let threads = vec![
//!     vec![CasOperation::succeeded(1, 2), CasOperation::succeeded(7, 9)],
//!     vec![CasOperation::succeeded(2, 7)],
//! ];
//! match check(&threads, &1, Algorithm::Chain) {
//!     Ok(witness) => println!("linearizable: {witness:?}"),
//!     Err(err) => println!("rejected: {err:?}"),
//! }
//! ```
//!
//! # Crate features
//!
//! - **`serde`** -- enables `Serialize`/`Deserialize` derives on core types.
//! - **`schemars`** -- derives `JsonSchema` for the history types.
//!
//! This crate is `no_std` compatible (requires `alloc`). The parser for the
//! compact `.cas` format lives in the separate `cascheck_parser` crate.

#![cfg_attr(not(any(test, feature = "schemars")), no_std)]
extern crate alloc;

pub mod consistency;
pub mod graph;
pub mod history;

pub use consistency::{check, check_restricted, check_unrestricted, Algorithm, Witness};
