//! YAML output for reviewing a parsed trace by eye.
//!
//! Mapping from trace values to YAML:
//!   - Value::Integer -> YAML integer (as a string if beyond i64/u64)
//!   - Value::String  -> YAML string
//!   - Value::Tuple   -> YAML sequence
//!   - Value::Record  -> YAML mapping (keys sorted)

use libtlatrace::Value;
use num_traits::ToPrimitive;

/// Encode a trace value as a YAML string.
pub fn encode(value: &Value) -> Result<String, String> {
    let yaml_value = value_to_yaml(value);
    serde_yaml::to_string(&yaml_value).map_err(|e| format!("YAML encode error: {}", e))
}

fn value_to_yaml(value: &Value) -> serde_yaml::Value {
    match value {
        Value::Integer(n) => {
            if let Some(i) = n.to_i64() {
                serde_yaml::Value::Number(serde_yaml::Number::from(i))
            } else if let Some(u) = n.to_u64() {
                serde_yaml::Value::Number(serde_yaml::Number::from(u))
            } else {
                serde_yaml::Value::String(n.to_string())
            }
        }
        Value::String(s) => serde_yaml::Value::String(s.clone()),
        Value::Tuple(items) => {
            let items: Vec<serde_yaml::Value> = items.iter().map(value_to_yaml).collect();
            serde_yaml::Value::Sequence(items)
        }
        Value::Record(fields) => {
            let mut map = serde_yaml::Mapping::new();
            for (k, v) in fields {
                map.insert(serde_yaml::Value::String(k.clone()), value_to_yaml(v));
            }
            serde_yaml::Value::Mapping(map)
        }
    }
}
