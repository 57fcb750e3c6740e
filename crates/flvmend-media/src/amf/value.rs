//! AMF0 value model.

/// One AMF0 value.
///
/// `Object` and `EcmaArray` are interchangeable wire representations of
/// the same logical ordered mapping; [`Value::as_mapping`] accepts either.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// IEEE-754 double. AMF0 has no integer kind; counts and byte offsets
    /// travel as doubles.
    Number(f64),
    Boolean(bool),
    /// UTF-8 string (short or long wire form, chosen by length).
    String(String),
    /// Strict object: pairs terminated by an end marker.
    Object(Vec<(String, Value)>),
    /// ECMA ("associative") array: counted pairs with the same terminator.
    EcmaArray(Vec<(String, Value)>),
    /// Ordered array of values.
    StrictArray(Vec<Value>),
    /// Millisecond-epoch timestamp with a timezone offset in minutes.
    Date { unix_ms: f64, timezone: i16 },
    Null,
    Undefined,
}

impl Value {
    /// The pairs of either mapping representation.
    pub fn as_mapping(&self) -> Option<&[(String, Value)]> {
        match self {
            Value::Object(pairs) | Value::EcmaArray(pairs) => Some(pairs),
            _ => None,
        }
    }

    /// Look up a key in either mapping representation.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_mapping()?
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    /// Numeric value, if this is a number.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// String slice, if this is a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mapping_lookup_over_both_wire_forms() {
        let pairs = vec![
            ("width".to_string(), Value::Number(640.0)),
            ("height".to_string(), Value::Number(480.0)),
        ];
        let object = Value::Object(pairs.clone());
        let array = Value::EcmaArray(pairs);

        assert_eq!(object.get("height").and_then(Value::as_number), Some(480.0));
        assert_eq!(array.get("height").and_then(Value::as_number), Some(480.0));
        assert!(object.get("missing").is_none());
        assert!(Value::Null.get("width").is_none());
    }
}
