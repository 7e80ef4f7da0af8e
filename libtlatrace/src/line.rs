//! Typed view of one parsed trace line.

use crate::value::Value;
use num_bigint::BigInt;
use std::collections::BTreeMap;

/// A record whose fields are all integers, e.g. `[term |-> 2, index |-> 5]`.
pub type IntRecord = BTreeMap<String, BigInt>;

/// One trace line: a fixed six-field tuple.
///
/// The textual form is
///
/// ```text
/// <<TAG,"LABEL",<<<<REC,...>>,<<REC,...>>,<<REC,...>>>>,<<"R1","R2","R3">>,<<REC,...>>,"MESSAGE">>
/// ```
///
/// where each `REC` is a record `[key |-> int, ...]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceLine {
    /// Field 0.
    pub tag: BigInt,
    /// Field 1.
    pub label: String,
    /// Field 2: three tuples of records.
    pub groups: [Vec<IntRecord>; 3],
    /// Field 3: three strings.
    pub roles: [String; 3],
    /// Field 4: a tuple of records.
    pub records: Vec<IntRecord>,
    /// Field 5.
    pub message: String,
}

impl TraceLine {
    /// Number of fields in the tuple form.
    pub const ARITY: usize = 6;
}

fn record_value(record: IntRecord) -> Value {
    Value::Record(
        record
            .into_iter()
            .map(|(k, v)| (k, Value::Integer(v)))
            .collect(),
    )
}

fn records_value(records: Vec<IntRecord>) -> Value {
    Value::Tuple(records.into_iter().map(record_value).collect())
}

impl From<TraceLine> for Value {
    fn from(line: TraceLine) -> Self {
        let [g0, g1, g2] = line.groups;
        let [r0, r1, r2] = line.roles;
        Value::Tuple(vec![
            Value::Integer(line.tag),
            Value::String(line.label),
            Value::Tuple(vec![
                records_value(g0),
                records_value(g1),
                records_value(g2),
            ]),
            Value::Tuple(vec![
                Value::String(r0),
                Value::String(r1),
                Value::String(r2),
            ]),
            records_value(line.records),
            Value::String(line.message),
        ])
    }
}
