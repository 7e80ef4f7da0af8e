//! Line parser
//!
//! Each trace line is a six-field TLA+ tuple in the exact shape the tracing
//! harness prints it:
//!
//! ```text
//! <<1,"Leader",<<<<[a |-> 1]>>,<<[b |-> 2]>>,<<>>>>,<<"Leader","Follower","Follower">>,<<[c |-> 3]>>,"done">>
//! ```
//!
//! The grammar is positional and not recursive: the parser walks the line
//! with a [`Cursor`], one step per field, matching the fixed delimiters
//! between them. Nothing is escaped, so strings end at the next quote (or,
//! for the trailing message, the last quote on the line).

use crate::cursor::Cursor;
use crate::error::{ParseContext, ParseError, Result};
use crate::line::{IntRecord, TraceLine};
use num_bigint::BigInt;

/// Separator between a record key and its value.
const MAPS_TO: &str = " |-> ";

/// Parse one line (without its newline) into a [`TraceLine`].
///
/// `line_num` is zero-based and only used for error locations.
pub fn parse_line(line: &str, ctx: &ParseContext, line_num: usize) -> Result<TraceLine> {
    let mut cur = Cursor::new(line, line_num, ctx);

    cur.expect("<<")?;
    let tag = parse_tag(&mut cur)?;
    cur.expect(",\"")?;
    let label = parse_label(&mut cur)?;
    cur.expect("\",")?;
    let groups = parse_groups(&mut cur)?;
    cur.expect(",")?;
    let roles = parse_roles(&mut cur)?;
    cur.expect(",")?;
    let records = parse_record_tuple(&mut cur)?;
    cur.expect(",")?;
    let message = parse_message(&mut cur)?;
    cur.expect(">>")?;
    cur.finish()?;

    Ok(TraceLine {
        tag,
        label,
        groups,
        roles,
        records,
        message,
    })
}

// ============================================================================
// Fields
// ============================================================================

/// Field 0: unsigned decimal tag.
fn parse_tag(cur: &mut Cursor<'_>) -> Result<BigInt> {
    let digits = cur.take_digits()?;
    BigInt::parse_bytes(digits.as_bytes(), 10)
        .ok_or_else(|| cur.error(ParseError::InvalidInteger(digits.to_string(), String::new())))
}

/// Field 1: label up to the closing quote. The opening quote is part of the
/// preceding separator.
fn parse_label(cur: &mut Cursor<'_>) -> Result<String> {
    match cur.take_until("\"") {
        Some(label) => Ok(label.rest().to_string()),
        None => Err(cur.error(ParseError::UnterminatedString(String::new()))),
    }
}

/// Field 2: `<<<<...>>,<<...>>,<<...>>>>`, three tuples of records.
fn parse_groups(cur: &mut Cursor<'_>) -> Result<[Vec<IntRecord>; 3]> {
    cur.expect("<<")?;
    let first = parse_record_tuple(cur)?;
    cur.expect(",")?;
    let second = parse_record_tuple(cur)?;
    cur.expect(",")?;
    let third = parse_record_tuple(cur)?;
    cur.expect(">>")?;
    Ok([first, second, third])
}

/// Field 3: `<<"a","b","c">>`, exactly three strings.
fn parse_roles(cur: &mut Cursor<'_>) -> Result<[String; 3]> {
    let content = parse_angle_content(cur)?;
    let mut roles = Vec::with_capacity(3);
    if !content.is_at_end() {
        for token in content.split(',') {
            roles.push(parse_quoted(token)?);
        }
    }
    let found = roles.len();
    <[String; 3]>::try_from(roles)
        .map_err(|_| content.error(ParseError::Arity(3, found, String::new())))
}

/// Field 5: everything between the opening quote and the last quote on the
/// line. The message may itself contain quotes.
fn parse_message(cur: &mut Cursor<'_>) -> Result<String> {
    cur.expect("\"")?;
    let message = match cur.take_until_last("\"") {
        Some(message) => message.rest().to_string(),
        None => return Err(cur.error(ParseError::UnterminatedString(String::new()))),
    };
    cur.expect("\"")?;
    Ok(message)
}

// ============================================================================
// Shared sub-parsers
// ============================================================================

/// Consume `<<...>>` and return a cursor over the content. The content ends
/// at the first `>>`.
fn parse_angle_content<'a>(cur: &mut Cursor<'a>) -> Result<Cursor<'a>> {
    cur.expect("<<")?;
    let content = cur
        .take_until(">>")
        .ok_or_else(|| cur.error(ParseError::Unmatched("<<", String::new())))?;
    cur.expect(">>")?;
    Ok(content)
}

/// A tuple of records: `<<>>` or `<<[...],[...]>>`.
fn parse_record_tuple(cur: &mut Cursor<'_>) -> Result<Vec<IntRecord>> {
    let mut content = parse_angle_content(cur)?;
    let mut records = Vec::new();
    if content.is_at_end() {
        return Ok(records);
    }
    loop {
        content.expect("[")?;
        let body = content
            .take_until("]")
            .ok_or_else(|| content.error(ParseError::Unmatched("[", String::new())))?;
        content.expect("]")?;
        records.push(parse_record(body)?);
        if content.is_at_end() {
            break;
        }
        content.expect(",")?;
    }
    Ok(records)
}

/// Record body (without brackets): `key |-> int, key |-> int`.
fn parse_record(body: Cursor<'_>) -> Result<IntRecord> {
    let mut record = IntRecord::new();
    if body.trim().is_at_end() {
        return Ok(record);
    }
    for entry in body.split(',') {
        let mut entry = entry.trim();
        let key = entry
            .take_until(MAPS_TO)
            .ok_or_else(|| {
                entry.error(ParseError::InvalidField(
                    entry.rest().to_string(),
                    String::new(),
                ))
            })?
            .trim();
        entry.expect(MAPS_TO)?;
        let value = parse_int(entry.trim())?;
        if record.insert(key.rest().to_string(), value).is_some() {
            return Err(key.error(ParseError::DuplicateKey(
                key.rest().to_string(),
                String::new(),
            )));
        }
    }
    Ok(record)
}

/// Signed decimal integer: optional `+`/`-` followed by digits.
fn parse_int(text: Cursor<'_>) -> Result<BigInt> {
    let s = text.rest();
    let digits = s.strip_prefix(|c: char| c == '+' || c == '-').unwrap_or(s);
    let parsed = if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) {
        BigInt::parse_bytes(s.as_bytes(), 10)
    } else {
        None
    };
    parsed.ok_or_else(|| text.error(ParseError::InvalidInteger(s.to_string(), String::new())))
}

/// `"text"` with no embedded quotes.
fn parse_quoted(token: Cursor<'_>) -> Result<String> {
    let s = token.rest();
    match s.strip_prefix('"').and_then(|s| s.strip_suffix('"')) {
        Some(inner) if !inner.contains('"') => Ok(inner.to_string()),
        _ => Err(token.error(ParseError::UnterminatedString(String::new()))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"<<1,"Leader",<<<<[a |-> 1]>>,<<[b |-> 2]>>,<<>>>>,<<"Leader","Follower","Follower">>,<<[c |-> 3]>>,"done">>"#;

    fn rec(pairs: &[(&str, i64)]) -> IntRecord {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), BigInt::from(*v)))
            .collect()
    }

    fn parse(line: &str) -> Result<TraceLine> {
        let ctx = ParseContext::new(None);
        parse_line(line, &ctx, 0)
    }

    fn parse_err(line: &str) -> String {
        parse(line).unwrap_err().to_string()
    }

    #[test]
    fn test_sample_line() {
        let line = parse(SAMPLE).unwrap();
        assert_eq!(line.tag, BigInt::from(1));
        assert_eq!(line.label, "Leader");
        assert_eq!(line.groups[0], vec![rec(&[("a", 1)])]);
        assert_eq!(line.groups[1], vec![rec(&[("b", 2)])]);
        assert!(line.groups[2].is_empty());
        assert_eq!(line.roles, ["Leader", "Follower", "Follower"]);
        assert_eq!(line.records, vec![rec(&[("c", 3)])]);
        assert_eq!(line.message, "done");
    }

    #[test]
    fn test_multi_field_records() {
        let line = parse(
            r#"<<0,"Append",<<<<[term |-> 1, index |-> 2],[term |-> 1, index |-> 3]>>,<<>>,<<>>>>,<<"Leader","Candidate","Follower">>,<<[from |-> 0, to |-> -1]>>,"ok">>"#,
        )
        .unwrap();
        assert_eq!(
            line.groups[0],
            vec![
                rec(&[("term", 1), ("index", 2)]),
                rec(&[("term", 1), ("index", 3)])
            ]
        );
        assert!(line.groups[1].is_empty());
        assert_eq!(line.records, vec![rec(&[("from", 0), ("to", -1)])]);
    }

    #[test]
    fn test_empty_record() {
        let line = parse(
            r#"<<2,"x",<<<<[]>>,<<>>,<<>>>>,<<"a","b","c">>,<<>>,"">>"#,
        )
        .unwrap();
        assert_eq!(line.groups[0], vec![IntRecord::new()]);
        assert!(line.records.is_empty());
        assert_eq!(line.message, "");
    }

    #[test]
    fn test_message_with_quotes() {
        let line = parse(
            r#"<<1,"L",<<<<>>,<<>>,<<>>>>,<<"a","b","c">>,<<>>,"said "hi" twice">>"#,
        )
        .unwrap();
        assert_eq!(line.message, r#"said "hi" twice"#);
    }

    #[test]
    fn test_multi_digit_tag() {
        let line =
            parse(r#"<<12,"L",<<<<>>,<<>>,<<>>>>,<<"a","b","c">>,<<>>,"m">>"#).unwrap();
        assert_eq!(line.tag, BigInt::from(12));
    }

    #[test]
    fn test_flat_group_triple_rejected() {
        assert_eq!(
            parse_err(
                r#"<<1,"Leader",<<[a |-> 1],[b |-> 2],[]>>,<<"Leader","Follower","Follower">>,<<[c |-> 3]>>,"done">>"#
            ),
            "Expected \"<<\" at 1:16"
        );
    }

    #[test]
    fn test_deterministic() {
        assert_eq!(parse(SAMPLE).unwrap(), parse(SAMPLE).unwrap());
    }

    #[test]
    fn test_non_numeric_tag() {
        assert_eq!(
            parse_err(r#"<<x,"L",<<<<>>,<<>>,<<>>>>,<<"a","b","c">>,<<>>,"m">>"#),
            "Expected decimal digit at 1:3"
        );
    }

    #[test]
    fn test_missing_open_marker() {
        assert_eq!(parse_err("1,\"L\""), "Expected \"<<\" at 1:1");
    }

    #[test]
    fn test_unterminated_label() {
        assert_eq!(parse_err("<<1,\"Leader"), "Unterminated string at 1:6");
    }

    #[test]
    fn test_missing_closing_quote() {
        assert_eq!(
            parse_err(r#"<<1,"L",<<<<>>,<<>>,<<>>>>,<<"a","b","c">>,<<>>,"done>>"#),
            "Unterminated string at 1:50"
        );
    }

    #[test]
    fn test_two_groups() {
        assert_eq!(
            parse_err(r#"<<1,"L",<<<<>>,<<>>>>,<<"a","b","c">>,<<>>,"m">>"#),
            "Expected \",\" at 1:20"
        );
    }

    #[test]
    fn test_role_arity() {
        assert_eq!(
            parse_err(r#"<<1,"L",<<<<>>,<<>>,<<>>>>,<<"a","b">>,<<>>,"m">>"#),
            "Expected 3 elements, found 2 at 1:30"
        );
        assert_eq!(
            parse_err(r#"<<1,"L",<<<<>>,<<>>,<<>>>>,<<>>,<<>>,"m">>"#),
            "Expected 3 elements, found 0 at 1:30"
        );
    }

    #[test]
    fn test_unquoted_role() {
        assert_eq!(
            parse_err(r#"<<1,"L",<<<<>>,<<>>,<<>>>>,<<"a",b,"c">>,<<>>,"m">>"#),
            "Unterminated string at 1:34"
        );
    }

    #[test]
    fn test_error_column_after_non_ascii_label() {
        assert_eq!(
            parse_err(r#"<<1,"é",<<<<>>,<<>>,<<>>>>,<<a,"b","c">>,<<>>,"m">>"#),
            "Unterminated string at 1:30"
        );
    }

    #[test]
    fn test_bad_integer() {
        assert_eq!(
            parse_err(r#"<<1,"L",<<<<[a |-> one]>>,<<>>,<<>>>>,<<"a","b","c">>,<<>>,"m">>"#),
            "Invalid integer \"one\" at 1:20"
        );
    }

    #[test]
    fn test_missing_maps_to() {
        assert_eq!(
            parse_err(r#"<<1,"L",<<<<[a = 1]>>,<<>>,<<>>>>,<<"a","b","c">>,<<>>,"m">>"#),
            "Invalid record field \"a = 1\" at 1:14"
        );
    }

    #[test]
    fn test_duplicate_key() {
        assert_eq!(
            parse_err(
                r#"<<1,"L",<<<<[a |-> 1, a |-> 2]>>,<<>>,<<>>>>,<<"a","b","c">>,<<>>,"m">>"#
            ),
            "Duplicate record key \"a\" at 1:23"
        );
    }

    #[test]
    fn test_unbalanced_bracket() {
        assert_eq!(
            parse_err(r#"<<1,"L",<<<<[a |-> 1>>,<<>>,<<>>>>,<<"a","b","c">>,<<>>,"m">>"#),
            "Unmatched \"[\" at 1:14"
        );
    }

    #[test]
    fn test_trailing_content() {
        assert_eq!(
            parse_err(r#"<<1,"L",<<<<>>,<<>>,<<>>>>,<<"a","b","c">>,<<>>,"m">>x"#),
            "Unexpected extra content at 1:54"
        );
    }
}
