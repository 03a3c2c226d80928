//! YAML documents in the JSON value model.
//!
//! Conversion goes through `serde_yaml::Value` explicitly: numbers keep their
//! integer/float kind, mapping order is kept, and keys must be strings.

use jsonpatch::value::{Map, Number, Value};
use serde_yaml::Value as Yaml;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum YamlError {
    #[error(transparent)]
    Syntax(#[from] serde_yaml::Error),
    #[error("non-string key {key} in mapping")]
    NonStringKey { key: String },
    #[error("number {0} has no JSON representation")]
    Number(String),
}

/// Parse YAML text into a JSON value.
pub fn from_slice(bytes: &[u8]) -> Result<Value, YamlError> {
    let doc: Yaml = serde_yaml::from_slice(bytes)?;
    to_json(doc)
}

/// Render a JSON value as YAML text.
pub fn to_string(value: &Value) -> Result<String, YamlError> {
    Ok(serde_yaml::to_string(&from_json(value)?)?)
}

fn to_json(doc: Yaml) -> Result<Value, YamlError> {
    Ok(match doc {
        Yaml::Null => Value::Null,
        Yaml::Bool(b) => Value::Bool(b),
        Yaml::Number(n) => Value::Number(json_number(&n)?),
        Yaml::String(s) => Value::String(s),
        Yaml::Sequence(items) => {
            Value::Array(items.into_iter().map(to_json).collect::<Result<_, _>>()?)
        }
        Yaml::Mapping(mapping) => {
            let mut map = Map::with_capacity(mapping.len());
            for (key, value) in mapping {
                let key = match key {
                    Yaml::String(key) => key,
                    other => {
                        return Err(YamlError::NonStringKey {
                            key: serde_yaml::to_string(&other)?.trim_end().to_string(),
                        })
                    }
                };
                map.insert(key, to_json(value)?);
            }
            Value::Object(map)
        }
        // Tags carry no meaning in the value model.
        Yaml::Tagged(tagged) => to_json(tagged.value)?,
    })
}

fn json_number(n: &serde_yaml::Number) -> Result<Number, YamlError> {
    if let Some(i) = n.as_i64() {
        return Ok(i.into());
    }
    if let Some(u) = n.as_u64() {
        return Ok(u.into());
    }
    n.as_f64()
        .and_then(Number::from_f64)
        .ok_or_else(|| YamlError::Number(n.to_string()))
}

fn from_json(value: &Value) -> Result<Yaml, YamlError> {
    Ok(match value {
        Value::Null => Yaml::Null,
        Value::Bool(b) => Yaml::Bool(*b),
        Value::Number(n) => Yaml::Number(yaml_number(n)?),
        Value::String(s) => Yaml::String(s.clone()),
        Value::Array(items) => {
            Yaml::Sequence(items.iter().map(from_json).collect::<Result<_, _>>()?)
        }
        Value::Object(map) => {
            let mut mapping = serde_yaml::Mapping::with_capacity(map.len());
            for (key, value) in map {
                mapping.insert(Yaml::String(key.clone()), from_json(value)?);
            }
            Yaml::Mapping(mapping)
        }
    })
}

fn yaml_number(n: &Number) -> Result<serde_yaml::Number, YamlError> {
    if let Some(i) = n.as_i64() {
        return Ok(i.into());
    }
    if let Some(u) = n.as_u64() {
        return Ok(u.into());
    }
    match n.as_f64() {
        Some(f) if f.is_finite() => Ok(f.into()),
        _ => Err(YamlError::Number(n.to_string())),
    }
}
