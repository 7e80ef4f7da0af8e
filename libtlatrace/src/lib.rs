//! Parser for line-oriented TLA+ value traces.
//!
//! A model-checking harness records the behaviour of a running system as a
//! text trace: one TLA+ tuple per line, always in the same six-field shape.
//! This crate turns such a trace into a [`Value`] tree that can be handed to a
//! serializer (see the `trace-to-tla` tool for the TLC value stream).
//!
//! # Parsing Pipeline
//!
//! 1. **Lines**: the input is split into lines; line `i` of the input becomes
//!    element `i` of the output tuple.
//!
//! 2. **Line Parser**: each line is walked by a cursor, one named step per
//!    field, producing a typed [`TraceLine`].
//!
//! 3. **Assembly**: every [`TraceLine`] is converted to its six-element tuple
//!    and the tuples are collected into one aggregate tuple.
//!
//! Lines share no state; the first malformed line aborts the whole parse.

mod cursor;
mod encode;
mod error;
mod line;
mod parser;
mod value;

pub use encode::{encode, format_trace, Format};
pub use error::{ParseError, Result};
pub use line::{IntRecord, TraceLine};
pub use value::Value;

use error::ParseContext;

/// Parse a single trace line into its six-element tuple.
///
/// # Example
///
/// ```
/// use libtlatrace::parse_line;
///
/// let line = r#"<<1,"Leader",<<<<[a |-> 1]>>,<<>>,<<>>>>,<<"Leader","Follower","Follower">>,<<>>,"done">>"#;
/// let value = parse_line(line).unwrap();
/// assert_eq!(value.as_tuple().unwrap().len(), 6);
/// ```
pub fn parse_line(line: &str) -> Result<Value> {
    parse_trace_line(line).map(Value::from)
}

/// Parse a single trace line into a [`TraceLine`].
pub fn parse_trace_line(line: &str) -> Result<TraceLine> {
    let ctx = ParseContext::new(None);
    parser::parse_line(line, &ctx, 0)
}

/// Parse a whole trace into one tuple with an element per line.
pub fn parse_trace(input: &str) -> Result<Value> {
    parse_trace_with_filename(input, None)
}

/// Parse a whole trace with a filename for error messages.
pub fn parse_trace_with_filename(input: &str, filename: Option<&str>) -> Result<Value> {
    let lines = parse_trace_lines(input, filename)?;
    Ok(Value::Tuple(lines.into_iter().map(Value::from).collect()))
}

/// Parse a whole trace into typed lines, in input order.
pub fn parse_trace_lines(input: &str, filename: Option<&str>) -> Result<Vec<TraceLine>> {
    let ctx = ParseContext::new(filename);
    input
        .lines()
        .enumerate()
        .map(|(line_num, line)| parser::parse_line(line, &ctx, line_num))
        .collect()
}

/// Number of lines [`parse_trace`] will parse.
pub fn count_lines(input: &str) -> usize {
    input.lines().count()
}
