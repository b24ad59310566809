use alloc::string::String;
use core::fmt::{Display, Write};

use crate::history::types::CasHistory;

/// Format a complete history as the compact `.cas` text format.
///
/// The first line names the initial value, threads are separated by `---`
/// and each thread's operations share one line. The output always ends with
/// a trailing newline so that it round-trips through `parse_history`.
#[must_use]
pub fn format_history<Value>(history: &CasHistory<Value>) -> String
where
    Value: Display,
{
    let mut output = String::new();
    let _ = writeln!(output, "init {}", history.initial_value);
    for (i, thread) in history.threads.iter().enumerate() {
        if i > 0 {
            output.push_str("---\n");
        }
        if thread.is_empty() {
            continue;
        }
        for (j, operation) in thread.iter().enumerate() {
            if j > 0 {
                output.push(' ');
            }
            let _ = write!(output, "{operation}");
        }
        output.push('\n');
    }
    output
}
