//! TLC-style value stream, modelled on the tags of TLC's value output
//! stream. It carries no compression, no string table and no
//! back-references, so TLC itself cannot load it directly.
//!
//! Every value starts with a one-byte tag; all multi-byte numbers are
//! big-endian.
//!
//!   - Value::Integer -> tag 1, 4-byte signed integer
//!   - Value::String  -> tag 3, nat byte length, UTF-8 bytes
//!   - Value::Record  -> tag 4, normalized flag (always 0), nat field count,
//!                       then per field: nat key length, key bytes, value
//!   - Value::Tuple   -> tag 7, nat element count, elements
//!
//! A nat is two bytes when it is at most 0x7fff, otherwise the 4-byte
//! encoding of `-n - 1`. The sign bit of the first byte tells them apart.
//!
//! Records are written with the normalized flag cleared: field order is the
//! writer's (sorted by key), not an order derived from the model checker's
//! string table.

use libtlatrace::Value;
use num_bigint::BigInt;
use num_traits::ToPrimitive;
use std::collections::BTreeMap;

const INT_VALUE: u8 = 1;
const STRING_VALUE: u8 = 3;
const RECORD_VALUE: u8 = 4;
const TUPLE_VALUE: u8 = 7;

/// Largest nat that fits the short form.
const SHORT_NAT_MAX: usize = 0x7fff;

/// Deepest tuple/record nesting `decode` accepts.
const MAX_DEPTH: usize = 256;

// ---------------------------------------------------------------------------
// Encode (value -> TLC)
// ---------------------------------------------------------------------------

/// Encode a value as a TLC value stream.
pub fn encode(value: &Value) -> Result<Vec<u8>, String> {
    let mut buf = Vec::new();
    write_value(&mut buf, value)?;
    Ok(buf)
}

fn write_value(buf: &mut Vec<u8>, value: &Value) -> Result<(), String> {
    match value {
        Value::Integer(n) => {
            let n = n.to_i32().ok_or_else(|| {
                format!(
                    "integer {} exceeds the TLC integer range (-2^31 to 2^31-1)",
                    n
                )
            })?;
            buf.push(INT_VALUE);
            buf.extend_from_slice(&n.to_be_bytes());
            Ok(())
        }
        Value::String(s) => {
            buf.push(STRING_VALUE);
            write_str(buf, s)
        }
        Value::Record(fields) => {
            buf.push(RECORD_VALUE);
            buf.push(0);
            write_nat(buf, fields.len())?;
            for (k, v) in fields {
                write_str(buf, k)?;
                write_value(buf, v)?;
            }
            Ok(())
        }
        Value::Tuple(items) => {
            buf.push(TUPLE_VALUE);
            write_nat(buf, items.len())?;
            for item in items {
                write_value(buf, item)?;
            }
            Ok(())
        }
    }
}

fn write_str(buf: &mut Vec<u8>, s: &str) -> Result<(), String> {
    write_nat(buf, s.len())?;
    buf.extend_from_slice(s.as_bytes());
    Ok(())
}

fn write_nat(buf: &mut Vec<u8>, n: usize) -> Result<(), String> {
    if n <= SHORT_NAT_MAX {
        buf.extend_from_slice(&(n as u16).to_be_bytes());
    } else {
        let n = i32::try_from(n).map_err(|_| format!("length {} is too large for TLC", n))?;
        buf.extend_from_slice(&(-n - 1).to_be_bytes());
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Decode (TLC -> value)
// ---------------------------------------------------------------------------

/// Decode a TLC value stream holding exactly one value.
pub fn decode(input: &[u8]) -> Result<Value, String> {
    let mut reader = Reader {
        input,
        pos: 0,
        depth: 0,
    };
    let value = reader.read_value()?;
    if reader.pos != input.len() {
        return Err(format!(
            "{} trailing bytes after TLC value",
            input.len() - reader.pos
        ));
    }
    Ok(value)
}

struct Reader<'a> {
    input: &'a [u8],
    pos: usize,
    /// Open tuples and records around the current position.
    depth: usize,
}

impl<'a> Reader<'a> {
    fn read_bytes(&mut self, len: usize) -> Result<&'a [u8], String> {
        let end = self.pos.checked_add(len).filter(|end| *end <= self.input.len());
        match end {
            Some(end) => {
                let bytes = &self.input[self.pos..end];
                self.pos = end;
                Ok(bytes)
            }
            None => Err(format!("unexpected end of TLC stream at byte {}", self.pos)),
        }
    }

    fn read_array<const N: usize>(&mut self) -> Result<[u8; N], String> {
        let bytes = self.read_bytes(N)?;
        let mut out = [0u8; N];
        out.copy_from_slice(bytes);
        Ok(out)
    }

    fn read_nat(&mut self) -> Result<usize, String> {
        let first = *self
            .input
            .get(self.pos)
            .ok_or_else(|| format!("unexpected end of TLC stream at byte {}", self.pos))?;
        if first & 0x80 == 0 {
            Ok(u16::from_be_bytes(self.read_array()?) as usize)
        } else {
            let n = i32::from_be_bytes(self.read_array()?);
            Ok((-(n as i64) - 1) as usize)
        }
    }

    fn read_str(&mut self) -> Result<String, String> {
        let at = self.pos;
        let len = self.read_nat()?;
        let bytes = self.read_bytes(len)?;
        String::from_utf8(bytes.to_vec())
            .map_err(|e| format!("invalid UTF-8 in TLC string at byte {}: {}", at, e))
    }

    fn read_value(&mut self) -> Result<Value, String> {
        let at = self.pos;
        let [tag] = self.read_array()?;
        match tag {
            RECORD_VALUE | TUPLE_VALUE => {
                if self.depth == MAX_DEPTH {
                    return Err(format!("nesting deeper than {} at byte {}", MAX_DEPTH, at));
                }
                self.depth += 1;
                let value = if tag == RECORD_VALUE {
                    self.read_record(at)
                } else {
                    self.read_tuple()
                };
                self.depth -= 1;
                value
            }
            INT_VALUE => Ok(Value::Integer(BigInt::from(i32::from_be_bytes(
                self.read_array()?,
            )))),
            STRING_VALUE => Ok(Value::String(self.read_str()?)),
            other => Err(format!("unknown TLC value tag {} at byte {}", other, at)),
        }
    }

    /// Record body after its tag; `at` is the tag's offset.
    fn read_record(&mut self, at: usize) -> Result<Value, String> {
        let [_normalized] = self.read_array()?;
        let len = self.read_nat()?;
        let mut fields = BTreeMap::new();
        for _ in 0..len {
            let key = self.read_str()?;
            let value = self.read_value()?;
            if fields.insert(key.clone(), value).is_some() {
                return Err(format!("duplicate record field {:?} at byte {}", key, at));
            }
        }
        Ok(Value::Record(fields))
    }

    fn read_tuple(&mut self) -> Result<Value, String> {
        let len = self.read_nat()?;
        let mut items = Vec::new();
        for _ in 0..len {
            items.push(self.read_value()?);
        }
        Ok(Value::Tuple(items))
    }
}
