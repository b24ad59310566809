//! Winnow-based parser for the compact `.cas` history format.
//!
//! Grammar:
//! ```text
//! history     = (comment | blank)* header? thread (separator thread)* blank* EOF
//! header      = "init" WHITESPACE value LINE_END  -- initial value, default 0
//! separator   = DASH+ LINE_END
//! thread      = (comment | blank | thread_line)*
//! comment     = "//" REST_OF_LINE LINE_END
//! thread_line = operation (WHITESPACE operation)* LINE_END
//! operation   = value "->" value "!"?             -- "!" marks a failed CAS
//! value       = INTEGER
//! LINE_END    = "\n" | "\r\n" | EOF
//! ```

use cascheck_core::history::{CasHistory, CasOperation, OperationHistory};
use winnow::ascii::{dec_uint, line_ending, till_line_ending};
use winnow::combinator::{alt, cut_err, eof, opt, repeat, separated};
use winnow::error::{ErrMode, StrContext, StrContextValue};
use winnow::prelude::*;
use winnow::token::{literal, take_while};
use winnow::ModalResult;

// ---------------------------------------------------------------------------
// Public error type
// ---------------------------------------------------------------------------

/// A parse error with human-readable location information.
#[derive(Debug, Clone)]
pub struct ParseError {
    pub message: String,
    pub line: usize,
    pub column: usize,
}

impl core::fmt::Display for ParseError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "parse error at line {}, column {}: {}",
            self.line, self.column, self.message
        )
    }
}

impl std::error::Error for ParseError {}

// ---------------------------------------------------------------------------
// Public entry point
// ---------------------------------------------------------------------------

/// Parse a compact `.cas` string into a history.
///
/// # Errors
///
/// Returns a [`ParseError`] with line/column information when the input does
/// not conform to the grammar.
pub fn parse_history(input: &str) -> Result<CasHistory<u64>, ParseError> {
    let original = input;
    let mut stream: &str = input;
    history_parser.parse_next(&mut stream).map_err(|e| {
        let consumed = original.len().saturating_sub(stream.len());
        let (line, column) = offset_to_line_col(original, consumed);
        ParseError {
            message: error_message(e),
            line,
            column,
        }
    })
}

/// Renders the labels and expectations collected by the failing parser on a
/// single line.
fn error_message(error: ErrMode<winnow::error::ContextError>) -> String {
    let message = match error {
        ErrMode::Backtrack(e) | ErrMode::Cut(e) => e.to_string().replace('\n', ": "),
        ErrMode::Incomplete(_) => String::from("incomplete input"),
    };
    if message.is_empty() {
        String::from("unexpected input")
    } else {
        message
    }
}

/// Convert a byte offset into the original input to 1-based (line, column).
fn offset_to_line_col(input: &str, offset: usize) -> (usize, usize) {
    let safe_offset = offset.min(input.len());
    let prefix = &input[..safe_offset];
    let line = prefix.bytes().filter(|&b| b == b'\n').count() + 1;
    let column = prefix
        .rfind('\n')
        .map_or_else(|| prefix.len() + 1, |pos| prefix.len() - pos);
    (line, column)
}

// ---------------------------------------------------------------------------
// Leaf parsers
// ---------------------------------------------------------------------------

/// Inline whitespace: spaces and tabs only (no newlines).
fn inline_ws(input: &mut &str) -> ModalResult<()> {
    take_while(1.., |c: char| c == ' ' || c == '\t')
        .void()
        .parse_next(input)
}

fn opt_inline_ws(input: &mut &str) -> ModalResult<()> {
    take_while(0.., |c: char| c == ' ' || c == '\t')
        .void()
        .parse_next(input)
}

/// `\n`, `\r\n`, or the end of input.
fn line_end(input: &mut &str) -> ModalResult<()> {
    alt((line_ending.void(), eof.void()))
        .context(StrContext::Expected(StrContextValue::Description(
            "end of line",
        )))
        .parse_next(input)
}

fn value(input: &mut &str) -> ModalResult<u64> {
    dec_uint
        .context(StrContext::Expected(StrContextValue::Description(
            "unsigned integer",
        )))
        .parse_next(input)
}

/// `value "->" value "!"?`
///
/// Once the first value is read the rest of the operation is mandatory.
fn operation(input: &mut &str) -> ModalResult<CasOperation<u64>> {
    let expected_value = value.parse_next(input)?;
    cut_err(literal("->").context(StrContext::Expected(StrContextValue::StringLiteral("->"))))
        .parse_next(input)?;
    let new_value = cut_err(value).parse_next(input)?;
    let bang = opt(literal("!")).parse_next(input)?;
    if bang.is_none() {
        Ok(CasOperation::succeeded(expected_value, new_value))
    } else {
        Ok(CasOperation::failed(expected_value, new_value))
    }
}

// ---------------------------------------------------------------------------
// Line parsers
// ---------------------------------------------------------------------------

/// `"init" WS value LINE_END`
fn header(input: &mut &str) -> ModalResult<u64> {
    opt_inline_ws.parse_next(input)?;
    literal("init").parse_next(input)?;
    cut_err((
        inline_ws.context(StrContext::Expected(StrContextValue::Description(
            "whitespace",
        ))),
        value,
        opt_inline_ws,
        line_end,
    ))
    .map(|(_, initial_value, _, _)| initial_value)
    .context(StrContext::Label("header"))
    .parse_next(input)
}

/// A comment line: `"//" <rest-of-line> LINE_END`. Produces no operations.
fn comment_line(input: &mut &str) -> ModalResult<Option<Vec<CasOperation<u64>>>> {
    opt_inline_ws.parse_next(input)?;
    literal("//").parse_next(input)?;
    till_line_ending.parse_next(input)?;
    line_end.parse_next(input)?;
    Ok(None)
}

/// A blank line (only whitespace + line ending). Produces nothing.
///
/// Unlike the other lines it never matches at end of input, so `repeat` over
/// it always makes progress.
fn blank_line(input: &mut &str) -> ModalResult<Option<Vec<CasOperation<u64>>>> {
    opt_inline_ws.parse_next(input)?;
    line_ending.parse_next(input)?;
    Ok(None)
}

/// One or more operations separated by inline whitespace, terminated by a
/// line ending.
fn thread_line(input: &mut &str) -> ModalResult<Option<Vec<CasOperation<u64>>>> {
    opt_inline_ws.parse_next(input)?;
    let operations: Vec<CasOperation<u64>> = separated(1.., operation, inline_ws)
        .context(StrContext::Label("operation"))
        .parse_next(input)?;
    opt_inline_ws.parse_next(input)?;
    cut_err(line_end)
        .context(StrContext::Label("thread line"))
        .parse_next(input)?;
    Ok(Some(operations))
}

fn thread_item(input: &mut &str) -> ModalResult<Option<Vec<CasOperation<u64>>>> {
    alt((comment_line, blank_line, thread_line)).parse_next(input)
}

/// A line of one or more `-`, possibly surrounded by inline whitespace.
fn separator(input: &mut &str) -> ModalResult<()> {
    opt_inline_ws.parse_next(input)?;
    take_while(1.., '-').parse_next(input)?;
    cut_err((opt_inline_ws, line_end))
        .void()
        .context(StrContext::Label("separator"))
        .parse_next(input)
}

// ---------------------------------------------------------------------------
// Thread and history parsers
// ---------------------------------------------------------------------------

/// Items up to the next separator or end-of-input.
fn thread(input: &mut &str) -> ModalResult<OperationHistory<u64>> {
    let mut operations: OperationHistory<u64> = Vec::new();

    loop {
        let trimmed = input.trim_start_matches([' ', '\t']);
        if trimmed.starts_with('-') || trimmed.is_empty() {
            break;
        }
        if let Some(mut line) = thread_item.parse_next(input)? {
            operations.append(&mut line);
        }
    }

    Ok(operations)
}

fn history_parser(input: &mut &str) -> ModalResult<CasHistory<u64>> {
    repeat::<_, _, (), _, _>(0.., alt((comment_line, blank_line)).void()).parse_next(input)?;
    let initial_value = opt(header).parse_next(input)?.unwrap_or_default();

    let mut threads = vec![thread.parse_next(input)?];
    while opt(separator).parse_next(input)?.is_some() {
        threads.push(thread.parse_next(input)?);
    }

    repeat::<_, _, (), _, _>(0.., blank_line.void()).parse_next(input)?;
    opt_inline_ws.parse_next(input)?;
    eof.context(StrContext::Expected(StrContextValue::Description(
        "end of input",
    )))
    .parse_next(input)?;

    Ok(CasHistory::new(initial_value, threads))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use cascheck_core::history::format_history;

    use super::*;

    fn ok(from: u64, to: u64) -> CasOperation<u64> {
        CasOperation::succeeded(from, to)
    }
    fn fail(from: u64, to: u64) -> CasOperation<u64> {
        CasOperation::failed(from, to)
    }

    #[test]
    fn test_single_thread() {
        let input = "init 1\n3->5! 1->2 2->7\n";
        let result = parse_history(input).expect("should parse");
        assert_eq!(result.initial_value, 1);
        assert_eq!(result.threads, vec![vec![fail(3, 5), ok(1, 2), ok(2, 7)]]);
    }

    #[test]
    fn test_multi_thread_with_separator() {
        let input = "init 1\n1->2 7->9\n---\n2->7\n";
        let result = parse_history(input).expect("should parse");
        assert_eq!(result.threads.len(), 2);
        assert_eq!(result.threads[0], vec![ok(1, 2), ok(7, 9)]);
        assert_eq!(result.threads[1], vec![ok(2, 7)]);
    }

    #[test]
    fn test_operations_across_lines_join_thread() {
        let input = "init 1\n1->2\n2->3 3->4!\n";
        let result = parse_history(input).expect("should parse");
        assert_eq!(result.threads, vec![vec![ok(1, 2), ok(2, 3), fail(3, 4)]]);
    }

    #[test]
    fn test_missing_header_defaults_to_zero() {
        let input = "0->1\n";
        let result = parse_history(input).expect("should parse");
        assert_eq!(result.initial_value, 0);
        assert_eq!(result.threads, vec![vec![ok(0, 1)]]);
    }

    #[test]
    fn test_comments_are_skipped() {
        let input = "// history\ninit 1\n// thread 1\n1->2\n---\n// thread 2\n2->3\n";
        let result = parse_history(input).expect("should parse");
        assert_eq!(result.initial_value, 1);
        assert_eq!(result.threads, vec![vec![ok(1, 2)], vec![ok(2, 3)]]);
    }

    #[test]
    fn test_empty_thread_between_separators() {
        let input = "init 0\n0->1\n---\n---\n1->2!\n";
        let result = parse_history(input).expect("should parse");
        assert_eq!(result.threads.len(), 3);
        assert!(result.threads[1].is_empty());
    }

    #[test]
    fn test_header_only() {
        let input = "init 4\n";
        let result = parse_history(input).expect("should parse");
        assert_eq!(result.initial_value, 4);
        assert_eq!(result.threads.len(), 1);
        assert!(result.threads[0].is_empty());
    }

    #[test]
    fn test_round_trip_through_formatter() {
        let history = CasHistory::new(
            1,
            vec![
                vec![fail(3, 5), ok(1, 2), ok(7, 9)],
                vec![ok(2, 7), fail(7, 8), ok(9, 10)],
            ],
        );
        let text = format_history(&history);
        assert_eq!(parse_history(&text).expect("should parse"), history);
    }

    #[test]
    fn test_matches_json_encoding() {
        let json = r#"{"initial_value":1,"threads":[[{"expected_value":1,"new_value":2,"succeeded":true}]]}"#;
        let from_json: CasHistory<u64> = serde_json::from_str(json).expect("valid JSON");
        assert_eq!(parse_history("init 1\n1->2\n").expect("should parse"), from_json);
    }

    #[test]
    fn test_last_line_without_newline() {
        let result = parse_history("init 1\n1->2").expect("should parse");
        assert_eq!(result.initial_value, 1);
        assert_eq!(result.threads, vec![vec![ok(1, 2)]]);

        assert_eq!(parse_history("init 4").expect("should parse").initial_value, 4);

        let result = parse_history("init 0\n0->1\n---\n// thread 2").expect("should parse");
        assert_eq!(result.threads, vec![vec![ok(0, 1)], vec![]]);

        let result = parse_history("init 0\n0->1\n---").expect("should parse");
        assert_eq!(result.threads, vec![vec![ok(0, 1)], vec![]]);
    }

    #[test]
    fn test_crlf_line_endings() {
        let result = parse_history("init 1\r\n1->2\r\n---\r\n// t1\r\n2->3!\r\n")
            .expect("should parse");
        assert_eq!(result.initial_value, 1);
        assert_eq!(result.threads, vec![vec![ok(1, 2)], vec![fail(2, 3)]]);
    }

    #[test]
    fn test_trailing_blank_lines_and_whitespace() {
        let result = parse_history("init 1\n1->2\n\n  \n  ").expect("should parse");
        assert_eq!(result.threads, vec![vec![ok(1, 2)]]);
    }

    #[test]
    fn test_parse_error_has_line_column() {
        let input = "init 1\n1->2\n1=>3\n";
        let err = parse_history(input).expect_err("should fail");
        assert_eq!(err.line, 3, "expected error on line 3, got: {err}");
        assert_eq!(err.column, 2, "expected error at the `=`, got: {err}");
        assert!(err.message.contains("`->`"), "message: {}", err.message);
    }

    #[test]
    fn test_parse_error_after_crlf_line() {
        let err = parse_history("init 1\r\n1->x\r\n").expect_err("should fail");
        assert_eq!((err.line, err.column), (2, 4), "got: {err}");
        assert!(err.message.contains("unsigned integer"), "message: {}", err.message);
    }

    #[test]
    fn test_parse_error_names_expected_token() {
        let err = parse_history("init 1\n1->2 x\n").expect_err("should fail");
        assert_eq!((err.line, err.column), (2, 6), "got: {err}");
        assert!(err.message.contains("end of line"), "message: {}", err.message);
        assert!(!err.message.contains("ContextError"), "message: {}", err.message);

        let err = parse_history("init x\n").expect_err("should fail");
        assert_eq!((err.line, err.column), (1, 6), "got: {err}");
        assert!(err.message.contains("header"), "message: {}", err.message);

        let err = parse_history("1->2\n--- 3\n").expect_err("should fail");
        assert_eq!(err.line, 2, "got: {err}");
        assert!(err.message.contains("separator"), "message: {}", err.message);
    }

    #[test]
    fn test_parse_error_display() {
        let input = "init 1\nx->y\n";
        let err = parse_history(input).expect_err("should fail");
        let msg = err.to_string();
        assert!(
            msg.contains("parse error"),
            "display should contain 'parse error': {msg}"
        );
        assert!(msg.contains("line"), "display should contain 'line': {msg}");
    }

    #[test]
    fn test_offset_to_line_col_second_line() {
        let (line, col) = offset_to_line_col("hello\nworld\n", 6);
        assert_eq!(line, 2);
        assert_eq!(col, 1);
    }
}
