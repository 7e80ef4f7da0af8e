//! CBOR transcoding: convert between trace values and CBOR binary data.
//!
//! Mapping from trace values to CBOR:
//!   - Value::Integer -> CBOR integer (smallest encoding that fits)
//!   - Value::String  -> CBOR text string
//!   - Value::Tuple   -> CBOR array (determinate length)
//!   - Value::Record  -> CBOR map (text string keys, sorted)
//!
//! Decoding accepts exactly that subset back. Integers outside CBOR's native
//! range (-2^64 to 2^64-1) are an error rather than a bignum tag.

use ciborium::value::{Integer, Value as CborValue};
use libtlatrace::Value;
use num_bigint::BigInt;
use num_traits::ToPrimitive;
use std::collections::BTreeMap;

// ---------------------------------------------------------------------------
// Decode (CBOR -> value)
// ---------------------------------------------------------------------------

/// Decode CBOR bytes into a trace value.
pub fn decode(input: &[u8]) -> Result<Value, String> {
    let cbor_value: CborValue =
        ciborium::de::from_reader(input).map_err(|e| format!("CBOR decode error: {}", e))?;
    cbor_to_value(&cbor_value)
}

fn cbor_to_value(cbor: &CborValue) -> Result<Value, String> {
    match cbor {
        CborValue::Integer(i) => {
            let n: i128 = (*i).into();
            Ok(Value::Integer(BigInt::from(n)))
        }
        CborValue::Text(s) => Ok(Value::String(s.clone())),
        CborValue::Array(arr) => {
            let items: Result<Vec<Value>, String> = arr.iter().map(cbor_to_value).collect();
            Ok(Value::Tuple(items?))
        }
        CborValue::Map(pairs) => {
            let mut fields = BTreeMap::new();
            for (k, v) in pairs {
                let key = match k {
                    CborValue::Text(s) => s.clone(),
                    _ => return Err(format!("CBOR map key must be a text string, got: {:?}", k)),
                };
                if fields.insert(key.clone(), cbor_to_value(v)?).is_some() {
                    return Err(format!("CBOR map repeats key {:?}", key));
                }
            }
            Ok(Value::Record(fields))
        }
        _ => Err(format!("CBOR value {:?} has no trace equivalent", cbor)),
    }
}

// ---------------------------------------------------------------------------
// Encode (value -> CBOR)
// ---------------------------------------------------------------------------

/// Encode a trace value as CBOR bytes.
pub fn encode(value: &Value) -> Result<Vec<u8>, String> {
    let cbor_value = value_to_cbor(value)?;
    let mut buf = Vec::new();
    ciborium::ser::into_writer(&cbor_value, &mut buf)
        .map_err(|e| format!("CBOR encode error: {}", e))?;
    Ok(buf)
}

fn value_to_cbor(value: &Value) -> Result<CborValue, String> {
    match value {
        Value::Integer(n) => n
            .to_i128()
            .and_then(|n| Integer::try_from(n).ok())
            .map(CborValue::Integer)
            .ok_or_else(|| {
                format!(
                    "integer {} exceeds CBOR's native integer range (-2^64 to 2^64-1)",
                    n
                )
            }),
        Value::String(s) => Ok(CborValue::Text(s.clone())),
        Value::Tuple(items) => {
            let items: Result<Vec<CborValue>, String> = items.iter().map(value_to_cbor).collect();
            Ok(CborValue::Array(items?))
        }
        Value::Record(fields) => {
            let mut pairs = Vec::with_capacity(fields.len());
            for (k, v) in fields {
                pairs.push((CborValue::Text(k.clone()), value_to_cbor(v)?));
            }
            Ok(CborValue::Map(pairs))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use libtlatrace::parse_line;

    const LINE: &str = r#"<<1,"Leader",<<<<[a |-> 1]>>,<<>>,<<>>>>,<<"Leader","Follower","Follower">>,<<[c |-> -3]>>,"done">>"#;

    #[test]
    fn test_small_values() {
        assert_eq!(encode(&Value::from(1i64)).unwrap(), vec![0x01]);
        assert_eq!(encode(&Value::from(-3i64)).unwrap(), vec![0x22]);
        assert_eq!(encode(&Value::from("a")).unwrap(), vec![0x61, b'a']);
        assert_eq!(encode(&Value::empty_tuple()).unwrap(), vec![0x80]);
        assert_eq!(encode(&Value::Record(BTreeMap::new())).unwrap(), vec![0xa0]);
    }

    #[test]
    fn test_line_as_cbor() {
        let value = parse_line(LINE).unwrap();
        let bytes = encode(&value).unwrap();

        let cbor: CborValue = ciborium::de::from_reader(bytes.as_slice()).unwrap();
        let fields = cbor.as_array().unwrap();
        assert_eq!(fields.len(), 6);
        assert_eq!(fields[1].as_text(), Some("Leader"));
        assert_eq!(fields[5].as_text(), Some("done"));

        assert_eq!(decode(&bytes).unwrap(), value);
    }

    #[test]
    fn test_integer_out_of_range() {
        let huge = Value::Integer(BigInt::from(u64::MAX) * 4);
        assert!(encode(&huge).unwrap_err().contains("native integer range"));
    }

    #[test]
    fn test_decode_rejects_other_types() {
        // CBOR `true`
        assert!(decode(&[0xf5]).unwrap_err().contains("no trace equivalent"));
        // {1: 2}
        assert!(decode(&[0xa1, 0x01, 0x02])
            .unwrap_err()
            .contains("must be a text string"));
    }
}
