//! Michelson expressions as found in transaction parameters, scripts and
//! global constants.

use crate::decode::DecodeError;
use serde::{
    ser::{SerializeMap, SerializeSeq},
    Deserialize, Deserializer, Serialize, Serializer,
};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Micheline {
    /// Arbitrary precision integer, kept as decimal text.
    Int(String),
    String(String),
    Bytes(Vec<u8>),
    Prim(Prim),
    Sequence(Vec<Micheline>),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Prim {
    pub prim: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<Micheline>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub annots: Vec<String>,
}

impl Micheline {
    pub fn kind(&self) -> &'static str {
        match self {
            Micheline::Int(_) => "int",
            Micheline::String(_) => "string",
            Micheline::Bytes(_) => "bytes",
            Micheline::Prim(_) => "prim",
            Micheline::Sequence(_) => "sequence",
        }
    }

    /// Selects the node shape by which key is present.
    pub fn from_value(value: Value) -> Result<Self, DecodeError> {
        match value {
            Value::Array(items) => Ok(Micheline::Sequence(
                items.into_iter().map(Micheline::from_value).collect::<Result<_, _>>()?,
            )),
            Value::Object(map) => {
                if map.contains_key("prim") {
                    return serde_json::from_value(Value::Object(map))
                        .map(Micheline::Prim)
                        .map_err(|e| DecodeError::Expression(e.to_string()));
                }
                if map.len() != 1 {
                    return Err(DecodeError::Expression(format!(
                        "unexpected fields {:?}",
                        map.keys().collect::<Vec<_>>()
                    )));
                }
                match map.into_iter().next() {
                    Some((key, Value::String(s))) if key == "int" => {
                        let digits = s.strip_prefix('-').unwrap_or(&s);
                        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
                            return Err(DecodeError::Expression(format!("bad integer `{s}`")));
                        }
                        Ok(Micheline::Int(s))
                    }
                    Some((key, Value::String(s))) if key == "string" => Ok(Micheline::String(s)),
                    Some((key, Value::String(s))) if key == "bytes" => hex::decode(&s)
                        .map(Micheline::Bytes)
                        .map_err(|e| DecodeError::Expression(format!("bad bytes: {e}"))),
                    Some((key, _)) => Err(DecodeError::Expression(format!("unexpected `{key}`"))),
                    None => Err(DecodeError::Expression("empty node".to_string())),
                }
            }
            other => Err(DecodeError::Expression(format!("unexpected node {other}"))),
        }
    }
}

impl Serialize for Micheline {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Micheline::Int(v) => single_entry(serializer, "int", v),
            Micheline::String(v) => single_entry(serializer, "string", v),
            Micheline::Bytes(v) => single_entry(serializer, "bytes", &hex::encode(v)),
            Micheline::Prim(prim) => prim.serialize(serializer),
            Micheline::Sequence(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
        }
    }
}

fn single_entry<S: Serializer>(serializer: S, key: &str, value: &str) -> Result<S::Ok, S::Error> {
    let mut map = serializer.serialize_map(Some(1))?;
    map.serialize_entry(key, value)?;
    map.end()
}

impl<'de> Deserialize<'de> for Micheline {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Value::deserialize(deserializer)?;
        Micheline::from_value(raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_nested_script() {
        let raw = json!([
            {"prim": "parameter", "args": [{"prim": "unit"}]},
            {"prim": "storage", "args": [{"prim": "int"}], "annots": ["%counter"]},
            {"int": "-42"},
            {"string": "hello"},
            {"bytes": "cafe"}
        ]);
        let expr: Micheline = serde_json::from_value(raw.clone()).unwrap();
        let Micheline::Sequence(items) = &expr else {
            panic!("expected sequence");
        };
        assert_eq!(items.len(), 5);
        assert_eq!(items[2], Micheline::Int("-42".to_string()));
        assert_eq!(items[4], Micheline::Bytes(vec![0xca, 0xfe]));
        assert_eq!(serde_json::to_value(&expr).unwrap(), raw);
    }

    #[test]
    fn rejects_unknown_node() {
        assert!(serde_json::from_value::<Micheline>(json!({"float": "1.5"})).is_err());
        assert!(serde_json::from_value::<Micheline>(json!({"int": "12a"})).is_err());
        assert!(serde_json::from_value::<Micheline>(json!(7)).is_err());
    }

    #[test]
    fn prim_rejects_extra_fields() {
        let raw = json!({"prim": "Pair", "args": [], "extra": true});
        assert!(serde_json::from_value::<Micheline>(raw).is_err());
    }
}
