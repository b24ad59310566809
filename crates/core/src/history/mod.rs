//! Recorded compare-and-swap histories.
//!
//! A history is a list of threads, each an ordered list of [`CasOperation`]s
//! in the order that thread issued them, together with the value the register
//! held before any of them ran.

pub mod display;
pub mod error;
pub mod types;

pub use display::format_history;
pub use error::MalformedHistory;
pub use types::{operations, CasHistory, CasOperation, OperationHistory, OperationId};
