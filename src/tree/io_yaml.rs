//! YAML reading and writing for the canonical tree.
//!
//! Input goes through `serde_yaml::Value` first so that non-string mapping
//! keys can be coerced (or rejected) explicitly instead of surfacing as
//! opaque deserializer errors.

use serde_yaml::Value;

use super::model::{Mapping, Number, Tree};
use crate::conversion::DataType;
use crate::error::DataConverterError;

/// Parses a single YAML document into a tree.
///
/// Scalar keys (numbers, booleans, null) are coerced to strings. Tags are
/// dropped and their inner value kept. An empty document is `Null`.
pub fn from_yaml_str(yaml: &str) -> Result<Tree, DataConverterError> {
    let value: Value =
        serde_yaml::from_str(yaml).map_err(|source| DataConverterError::YamlParse { source })?;
    value_to_tree(value)
}

/// Parses YAML bytes into a tree. Useful for fuzzing.
pub fn from_yaml_slice(bytes: &[u8]) -> Result<Tree, DataConverterError> {
    let value: Value =
        serde_yaml::from_slice(bytes).map_err(|source| DataConverterError::YamlParse { source })?;
    value_to_tree(value)
}

/// Writes a tree as block-style YAML.
pub fn to_yaml_string(tree: &Tree) -> Result<String, DataConverterError> {
    serde_yaml::to_string(tree).map_err(|source| DataConverterError::YamlWrite { source })
}

fn value_to_tree(value: Value) -> Result<Tree, DataConverterError> {
    Ok(match value {
        Value::Null => Tree::Null,
        Value::Bool(b) => Tree::Bool(b),
        Value::Number(n) => Tree::Number(yaml_number(&n)),
        Value::String(s) => Tree::String(s),
        Value::Sequence(items) => Tree::Sequence(
            items
                .into_iter()
                .map(value_to_tree)
                .collect::<Result<_, _>>()?,
        ),
        Value::Mapping(map) => {
            let mut mapping = Mapping::with_capacity(map.len());
            for (key, value) in map {
                mapping.insert(yaml_key(key)?, value_to_tree(value)?);
            }
            Tree::Mapping(mapping)
        }
        Value::Tagged(tagged) => value_to_tree(tagged.value)?,
    })
}

fn yaml_number(n: &serde_yaml::Number) -> Number {
    if let Some(v) = n.as_u64() {
        Number::PosInt(v)
    } else if let Some(v) = n.as_i64() {
        Number::from(v)
    } else {
        Number::Float(n.as_f64().unwrap_or(f64::NAN))
    }
}

fn yaml_key(key: Value) -> Result<String, DataConverterError> {
    match key {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(yaml_number(&n).to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        Value::Null => Ok("null".to_string()),
        Value::Tagged(tagged) => yaml_key(tagged.value),
        Value::Sequence(_) => Err(DataConverterError::shape(
            DataType::Yaml,
            "mapping key must be a scalar, found a sequence",
        )),
        Value::Mapping(_) => Err(DataConverterError::shape(
            DataType::Yaml,
            "mapping key must be a scalar, found a mapping",
        )),
    }
}
