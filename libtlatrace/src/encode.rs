//! Encode values as text.
//!
//! Binary sinks (the TLC value stream, CBOR, YAML) live in the command-line
//! tool; this module covers the text forms a library user needs.

use crate::Value;

/// Text output format for encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// TLA+ value syntax in the shape the tracing harness prints it:
    /// no spaces inside tuples, `", "` between record fields.
    Tla,
    /// JSON: tuples become arrays, records become objects.
    Json,
}

/// Encode a value to a string in the specified format.
pub fn encode(value: &Value, format: Format) -> String {
    match format {
        Format::Tla => encode_tla(value),
        Format::Json => encode_json(value, 0),
    }
}

/// Render an aggregate trace value back to trace text, one line per element
/// of the top-level tuple. Any other value is rendered as a single line.
pub fn format_trace(value: &Value) -> String {
    let mut out = String::new();
    match value {
        Value::Tuple(lines) => {
            for line in lines {
                out.push_str(&encode_tla(line));
                out.push('\n');
            }
        }
        other => {
            out.push_str(&encode_tla(other));
            out.push('\n');
        }
    }
    out
}

// =============================================================================
// TLA+ Encoder
// =============================================================================

fn encode_tla(value: &Value) -> String {
    match value {
        Value::Integer(n) => n.to_string(),
        // Trace strings are never escaped.
        Value::String(s) => format!("\"{}\"", s),
        Value::Tuple(items) => {
            let items: Vec<String> = items.iter().map(encode_tla).collect();
            format!("<<{}>>", items.join(","))
        }
        Value::Record(fields) => {
            let fields: Vec<String> = fields
                .iter()
                .map(|(k, v)| format!("{} |-> {}", k, encode_tla(v)))
                .collect();
            format!("[{}]", fields.join(", "))
        }
    }
}

// =============================================================================
// JSON Encoder
// =============================================================================

fn encode_json(value: &Value, indent: usize) -> String {
    let pad = "  ".repeat(indent);
    let pad1 = "  ".repeat(indent + 1);

    match value {
        Value::Integer(n) => n.to_string(),
        Value::String(s) => encode_json_string(s),
        Value::Tuple(items) => {
            if items.is_empty() {
                "[]".to_string()
            } else {
                let items: Vec<String> = items
                    .iter()
                    .map(|v| format!("{}{}", pad1, encode_json(v, indent + 1)))
                    .collect();
                format!("[\n{}\n{}]", items.join(",\n"), pad)
            }
        }
        Value::Record(fields) => {
            if fields.is_empty() {
                "{}".to_string()
            } else {
                let items: Vec<String> = fields
                    .iter()
                    .map(|(k, v)| {
                        format!(
                            "{}{}: {}",
                            pad1,
                            encode_json_string(k),
                            encode_json(v, indent + 1)
                        )
                    })
                    .collect();
                format!("{{\n{}\n{}}}", items.join(",\n"), pad)
            }
        }
    }
}

fn encode_json_string(s: &str) -> String {
    let mut result = String::from("\"");
    for c in s.chars() {
        match c {
            '"' => result.push_str("\\\""),
            '\\' => result.push_str("\\\\"),
            '\n' => result.push_str("\\n"),
            '\r' => result.push_str("\\r"),
            '\t' => result.push_str("\\t"),
            '\x08' => result.push_str("\\b"),
            '\x0c' => result.push_str("\\f"),
            c if c.is_control() => {
                result.push_str(&format!("\\u{:04x}", c as u32));
            }
            c => result.push(c),
        }
    }
    result.push('"');
    result
}
