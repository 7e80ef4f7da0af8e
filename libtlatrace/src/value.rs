//! TLA+ value representation.

use num_bigint::BigInt;
use std::collections::BTreeMap;
use std::fmt;

/// A TLA+ value as it appears in a trace.
///
/// Records keep their fields in key order, so two records with the same
/// fields always encode to the same bytes regardless of input order.
#[derive(Clone, PartialEq, Eq)]
pub enum Value {
    /// Arbitrary-precision integer.
    Integer(BigInt),
    /// String literal, stored without its quotes.
    String(String),
    /// Tuple (sequence) of values. `<<>>` is the empty tuple.
    Tuple(Vec<Value>),
    /// Record mapping field names to values.
    Record(BTreeMap<String, Value>),
}

impl Value {
    /// The empty tuple `<<>>`.
    pub fn empty_tuple() -> Self {
        Value::Tuple(Vec::new())
    }

    /// Returns `true` if this value is the empty tuple `<<>>`.
    pub fn is_empty_tuple(&self) -> bool {
        matches!(self, Value::Tuple(items) if items.is_empty())
    }

    /// Returns a reference to the integer if this is an `Integer`.
    pub fn as_integer(&self) -> Option<&BigInt> {
        match self {
            Value::Integer(n) => Some(n),
            _ => None,
        }
    }

    /// Returns a reference to the string if this is a `String`.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the elements if this is a `Tuple`.
    pub fn as_tuple(&self) -> Option<&[Value]> {
        match self {
            Value::Tuple(items) => Some(items),
            _ => None,
        }
    }

    /// Returns the fields if this is a `Record`.
    pub fn as_record(&self) -> Option<&BTreeMap<String, Value>> {
        match self {
            Value::Record(fields) => Some(fields),
            _ => None,
        }
    }

    /// Short name of the variant, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Integer(_) => "integer",
            Value::String(_) => "string",
            Value::Tuple(_) => "tuple",
            Value::Record(_) => "record",
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Integer(n) => write!(f, "{}", n),
            Value::String(s) => write!(f, "{:?}", s),
            Value::Tuple(items) => {
                write!(f, "<<")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{:?}", item)?;
                }
                write!(f, ">>")
            }
            Value::Record(fields) => {
                write!(f, "[")?;
                for (i, (k, v)) in fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{} |-> {:?}", k, v)?;
                }
                write!(f, "]")
            }
        }
    }
}

impl From<BigInt> for Value {
    fn from(n: BigInt) -> Self {
        Value::Integer(n)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Integer(BigInt::from(n))
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Tuple(items)
    }
}

impl From<BTreeMap<String, Value>> for Value {
    fn from(fields: BTreeMap<String, Value>) -> Self {
        Value::Record(fields)
    }
}
