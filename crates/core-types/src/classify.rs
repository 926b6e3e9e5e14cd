use std::fmt;

use serde::{Deserialize, Serialize};

use crate::value::Value;

/// Coarse kind used to pick an excavation branch.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ValueKind {
    Null,
    Undefined,
    Primitive,
    Array,
    Function,
    Object,
    Unknown,
}

impl ValueKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValueKind::Null => "null",
            ValueKind::Undefined => "undefined",
            ValueKind::Primitive => "primitive",
            ValueKind::Array => "array",
            ValueKind::Function => "function",
            ValueKind::Object => "object",
            ValueKind::Unknown => "unknown",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub fn classify(value: &Value) -> ValueKind {
    match value {
        Value::Null => ValueKind::Null,
        Value::Undefined => ValueKind::Undefined,
        Value::Bool(_)
        | Value::Number(_)
        | Value::BigInt(_)
        | Value::String(_)
        | Value::Symbol(_) => ValueKind::Primitive,
        Value::Array(_) => ValueKind::Array,
        Value::Function(_) => ValueKind::Function,
        Value::Object(_) => ValueKind::Object,
        Value::Opaque(_) => ValueKind::Unknown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_and_undefined_are_not_primitives() {
        assert_eq!(classify(&Value::Null), ValueKind::Null);
        assert_eq!(classify(&Value::Undefined), ValueKind::Undefined);
        assert_eq!(classify(&Value::BigInt(7)), ValueKind::Primitive);
        assert_eq!(classify(&Value::Symbol("tag".into())), ValueKind::Primitive);
    }

    #[test]
    fn exotic_host_values_are_unknown() {
        assert_eq!(classify(&Value::opaque("Proxy")), ValueKind::Unknown);
        assert_eq!(classify(&Value::function("f", 2)), ValueKind::Function);
        assert_eq!(classify(&Value::array([])), ValueKind::Array);
    }

    #[test]
    fn kinds_serialize_kebab_case() {
        let encoded = serde_json::to_string(&[ValueKind::Primitive, ValueKind::Unknown]).unwrap();
        assert_eq!(encoded, r#"["primitive","unknown"]"#);
    }
}
