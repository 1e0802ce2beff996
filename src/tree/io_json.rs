//! JSON reading and writing for the canonical tree.
//!
//! Output is deterministic: keys are written in tree order, and the compact
//! form separates items with `", "` and keys from values with `": "`, e.g.
//! `{"name": "John", "age": 30}`.

use std::io;

use serde::Serialize;
use serde_json::ser::{Formatter, PrettyFormatter};

use super::model::Tree;
use crate::error::DataConverterError;

/// Parses JSON text into a tree.
///
/// Duplicate keys keep the position of their first occurrence and the value
/// of their last.
pub fn from_json_str(json: &str) -> Result<Tree, DataConverterError> {
    serde_json::from_str(json).map_err(|source| DataConverterError::JsonParse { source })
}

/// Parses JSON bytes into a tree. Useful for fuzzing.
pub fn from_json_slice(bytes: &[u8]) -> Result<Tree, DataConverterError> {
    serde_json::from_slice(bytes).map_err(|source| DataConverterError::JsonParse { source })
}

/// Writes a tree as single-line JSON.
pub fn to_json_string(tree: &Tree) -> Result<String, DataConverterError> {
    write_with(tree, SpacedFormatter)
}

/// Writes a tree as indented JSON (two spaces).
pub fn to_json_string_pretty(tree: &Tree) -> Result<String, DataConverterError> {
    write_with(tree, PrettyFormatter::with_indent(b"  "))
}

fn write_with<F: Formatter>(tree: &Tree, formatter: F) -> Result<String, DataConverterError> {
    let mut buf = Vec::with_capacity(128);
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    tree.serialize(&mut serializer)
        .map_err(|source| DataConverterError::JsonWrite { source })?;

    String::from_utf8(buf).map_err(|err| DataConverterError::JsonWrite {
        source: serde::ser::Error::custom(err),
    })
}

/// Compact formatter with a space after each separator.
struct SpacedFormatter;

impl Formatter for SpacedFormatter {
    fn begin_array_value<W: ?Sized + io::Write>(
        &mut self,
        writer: &mut W,
        first: bool,
    ) -> io::Result<()> {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_key<W: ?Sized + io::Write>(
        &mut self,
        writer: &mut W,
        first: bool,
    ) -> io::Result<()> {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_value<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        writer.write_all(b": ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::{Mapping, Tree};

    fn sample_tree() -> Tree {
        let person: Mapping = [
            ("name", Tree::from("John")),
            ("age", Tree::from(30i64)),
            (
                "tags",
                Tree::Sequence(vec![Tree::from("a"), Tree::Null, Tree::Bool(false)]),
            ),
        ]
        .into_iter()
        .collect();
        Tree::Mapping(person)
    }

    #[test]
    fn compact_output_uses_spaced_separators() {
        let json = to_json_string(&sample_tree()).expect("serialize");
        assert_eq!(
            json,
            r#"{"name": "John", "age": 30, "tags": ["a", null, false]}"#
        );
    }

    #[test]
    fn pretty_output_indents_two_spaces() {
        let json = to_json_string_pretty(&sample_tree()).expect("serialize");
        assert!(json.starts_with("{\n  \"name\": \"John\",\n  \"age\": 30,"));
    }

    #[test]
    fn json_roundtrip() {
        let original = sample_tree();
        let json = to_json_string(&original).expect("serialize");
        let restored = from_json_str(&json).expect("parse");
        assert_eq!(original, restored);
    }

    #[test]
    fn non_finite_float_is_written_as_null() {
        let json = to_json_string(&Tree::from(f64::NAN)).expect("serialize");
        assert_eq!(json, "null");
    }

    #[test]
    fn truncated_json_fails() {
        let err = from_json_str(r#"{"name": "John""#).unwrap_err();
        assert!(matches!(err, DataConverterError::JsonParse { .. }));
    }
}
