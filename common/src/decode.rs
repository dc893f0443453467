//! Discriminator-driven decoding for closed variant sets.
//!
//! Wire objects carry a tag field ("kind" or "status") that selects the
//! concrete shape. Decoding is two-phase: the object is read into a raw
//! map, the tag is removed and looked up in the type's dispatch table, and
//! the remaining fields are decoded strictly into the chosen shape.
//! Encoding is the inverse: the payload is serialised and the tag re-inserted.

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("{what}: object expected")]
    NotAnObject { what: &'static str },

    #[error("{what}: {field} field is missing")]
    MissingDiscriminator {
        what: &'static str,
        field: &'static str,
    },

    #[error("{what}: unknown {field} `{tag}`")]
    UnknownDiscriminator {
        what: &'static str,
        field: &'static str,
        tag: String,
    },

    #[error("{what} `{tag}`: {source}")]
    Malformed {
        what: &'static str,
        tag: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("malformed expression: {0}")]
    Expression(String),
}

/// A closed set of shapes selected by a string tag.
pub trait Discriminated: Sized {
    /// Name of the tag field on the wire.
    const FIELD: &'static str;
    /// Human readable name used in errors.
    const WHAT: &'static str;

    fn tag(&self) -> &str;

    /// Builds the variant for `tag` from the remaining fields.
    fn from_tagged(tag: &str, body: Map<String, Value>) -> Result<Self, DecodeError>;

    /// Serialises the payload without the tag.
    fn body(&self) -> Result<Value, serde_json::Error>;
}

/// Splits the tag out of a raw object.
pub fn split_tag(
    value: Value,
    field: &'static str,
    what: &'static str,
) -> Result<(String, Map<String, Value>), DecodeError> {
    let Value::Object(mut map) = value else {
        return Err(DecodeError::NotAnObject { what });
    };
    match map.remove(field) {
        Some(Value::String(tag)) => Ok((tag, map)),
        _ => Err(DecodeError::MissingDiscriminator { what, field }),
    }
}

/// Strictly decodes the payload of a tagged object.
pub fn decode_body<T: DeserializeOwned>(
    what: &'static str,
    tag: &str,
    body: Map<String, Value>,
) -> Result<T, DecodeError> {
    serde_json::from_value(Value::Object(body)).map_err(|source| DecodeError::Malformed {
        what,
        tag: tag.to_string(),
        source,
    })
}

/// Re-inserts the tag into a serialised payload.
pub fn attach_tag(
    mut body: Value,
    field: &'static str,
    tag: &str,
) -> Result<Value, serde_json::Error> {
    match &mut body {
        Value::Object(map) => {
            map.insert(field.to_string(), Value::String(tag.to_string()));
            Ok(body)
        }
        Value::Null => {
            let mut map = Map::new();
            map.insert(field.to_string(), Value::String(tag.to_string()));
            Ok(Value::Object(map))
        }
        _ => Err(serde::ser::Error::custom(format!(
            "{tag}: payload must serialise to an object"
        ))),
    }
}

pub fn unknown(what: &'static str, field: &'static str, tag: &str) -> DecodeError {
    DecodeError::UnknownDiscriminator {
        what,
        field,
        tag: tag.to_string(),
    }
}

/// Implements `Serialize`/`Deserialize` for a [`Discriminated`] type.
macro_rules! discriminated_serde {
    ($ty:ident $(<$gen:ident>)?) => {
        impl$(<$gen: serde::Serialize + serde::de::DeserializeOwned>)? serde::Serialize
            for $ty$(<$gen>)?
        {
            fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: serde::Serializer,
            {
                use $crate::decode::Discriminated;
                let body = self
                    .body()
                    .and_then(|body| $crate::decode::attach_tag(body, Self::FIELD, self.tag()))
                    .map_err(serde::ser::Error::custom)?;
                serde::Serialize::serialize(&body, serializer)
            }
        }

        impl<'de $(, $gen: serde::Serialize + serde::de::DeserializeOwned)?> serde::Deserialize<'de>
            for $ty$(<$gen>)?
        {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                use $crate::decode::Discriminated;
                let raw = <serde_json::Value as serde::Deserialize>::deserialize(deserializer)?;
                let (tag, body) = $crate::decode::split_tag(raw, Self::FIELD, Self::WHAT)
                    .map_err(serde::de::Error::custom)?;
                Self::from_tagged(&tag, body).map_err(serde::de::Error::custom)
            }
        }
    };
}
pub(crate) use discriminated_serde;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn split_tag_removes_field() {
        let (tag, body) = split_tag(json!({"kind": "reveal", "a": 1}), "kind", "test").unwrap();
        assert_eq!(tag, "reveal");
        assert!(!body.contains_key("kind"));
        assert_eq!(body["a"], 1);
    }

    #[test]
    fn split_tag_missing_field() {
        let err = split_tag(json!({"a": 1}), "status", "result").unwrap_err();
        assert!(matches!(
            err,
            DecodeError::MissingDiscriminator {
                field: "status",
                ..
            }
        ));
    }

    #[test]
    fn split_tag_not_object() {
        let err = split_tag(json!([1, 2]), "kind", "content").unwrap_err();
        assert!(matches!(err, DecodeError::NotAnObject { .. }));
    }

    #[test]
    fn attach_tag_to_unit_payload() {
        let value = attach_tag(Value::Null, "status", "skipped").unwrap();
        assert_eq!(value, json!({"status": "skipped"}));
    }
}
