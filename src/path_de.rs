//! Path-aware JSON text parsing.
//!
//! `serde_json::Value` silently keeps the last of a duplicated key; schemas
//! must not, so raw text goes through a strict visitor and any failure is
//! reported with the JSON pointer `serde_path_to_error` tracked for it.
use std::fmt;

use serde::de::{self, DeserializeSeed, Deserializer, MapAccess, SeqAccess, Visitor};
use serde::Deserialize;
use serde_json::{Map, Number, Value};
use serde_path_to_error::{Path, Segment};

use crate::error::SchemaLoadError;
use crate::pointer::Pointer;

const DUPLICATE_KEY: &str = "duplicate key";

/// Parse JSON text, rejecting duplicate object keys anywhere in it.
pub fn from_str_strict(src: &str) -> Result<Value, SchemaLoadError> {
    let mut de = serde_json::Deserializer::from_str(src);
    let value = match serde_path_to_error::deserialize::<_, Strict>(&mut de) {
        Ok(Strict(value)) => value,
        Err(err) => {
            let pointer = pointer_of(err.path());
            let message = err.into_inner().to_string();
            if message.starts_with(DUPLICATE_KEY) {
                return Err(SchemaLoadError::DuplicateKey { pointer });
            }
            return Err(SchemaLoadError::Json { pointer, message });
        }
    };
    de.end().map_err(|error| SchemaLoadError::Json {
        pointer: Pointer::root(),
        message: error.to_string(),
    })?;
    Ok(value)
}

fn pointer_of(path: &Path) -> Pointer {
    let mut pointer = Pointer::root();
    for segment in path.iter() {
        match segment {
            Segment::Seq { index } => pointer.push(index.to_string()),
            Segment::Map { key } => pointer.push(key.clone()),
            _ => {}
        }
    }
    pointer
}

struct Strict(Value);

impl<'de> Deserialize<'de> for Strict {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(StrictVisitor).map(Strict)
    }
}

struct StrictVisitor;

impl<'de> Visitor<'de> for StrictVisitor {
    type Value = Value;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("any JSON value")
    }

    fn visit_bool<E>(self, v: bool) -> Result<Value, E> {
        Ok(Value::Bool(v))
    }

    fn visit_i64<E>(self, v: i64) -> Result<Value, E> {
        Ok(Value::from(v))
    }

    fn visit_u64<E>(self, v: u64) -> Result<Value, E> {
        Ok(Value::from(v))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Value, E> {
        Number::from_f64(v)
            .map(Value::Number)
            .ok_or_else(|| E::custom("non-finite number"))
    }

    fn visit_str<E>(self, v: &str) -> Result<Value, E> {
        Ok(Value::String(v.to_string()))
    }

    fn visit_string<E>(self, v: String) -> Result<Value, E> {
        Ok(Value::String(v))
    }

    fn visit_unit<E>(self) -> Result<Value, E> {
        Ok(Value::Null)
    }

    fn visit_none<E>(self) -> Result<Value, E> {
        Ok(Value::Null)
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Value, D::Error> {
        Strict::deserialize(deserializer).map(|s| s.0)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Value, A::Error> {
        let mut out = Vec::new();
        while let Some(Strict(value)) = seq.next_element()? {
            out.push(value);
        }
        Ok(Value::Array(out))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Value, A::Error> {
        let mut out = Map::new();
        while let Some(key) = map.next_key::<String>()? {
            if out.contains_key(&key) {
                // fails inside the value position so the tracked path ends at `key`
                map.next_value_seed(RejectDuplicate)?;
                continue;
            }
            let Strict(value) = map.next_value()?;
            out.insert(key, value);
        }
        Ok(Value::Object(out))
    }
}

struct RejectDuplicate;

impl<'de> DeserializeSeed<'de> for RejectDuplicate {
    type Value = ();

    fn deserialize<D: Deserializer<'de>>(self, _deserializer: D) -> Result<(), D::Error> {
        Err(de::Error::custom(DUPLICATE_KEY))
    }
}
