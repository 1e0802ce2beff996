//! Core value model for the dataconv canonical tree.
//!
//! Every input format is folded into a [`Tree`] and every output format is
//! rendered from one. The model is small: scalars, ordered
//! sequences and insertion-ordered mappings with string keys.

use std::fmt;

use serde::de::{self, Deserialize, Deserializer, MapAccess, SeqAccess, Visitor};
use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};

/// A canonical, format-agnostic value.
///
/// Think of it as the "AST" all conversions go through: parsers produce it,
/// serializers read it, nothing mutates it in between.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Tree {
    /// Absent value (`null` in JSON, `~` in YAML).
    #[default]
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    /// Ordered list of values.
    Sequence(Vec<Tree>),
    /// Insertion-ordered mapping with unique string keys.
    Mapping(Mapping),
}

impl Tree {
    /// Returns true for `Null`, `Bool`, `Number` and `String`.
    pub fn is_scalar(&self) -> bool {
        !matches!(self, Tree::Sequence(_) | Tree::Mapping(_))
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Tree::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_mapping(&self) -> Option<&Mapping> {
        match self {
            Tree::Mapping(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&[Tree]> {
        match self {
            Tree::Sequence(items) => Some(items),
            _ => None,
        }
    }

    /// Short name of the variant, used in error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Tree::Null => "null",
            Tree::Bool(_) => "boolean",
            Tree::Number(_) => "number",
            Tree::String(_) => "string",
            Tree::Sequence(_) => "sequence",
            Tree::Mapping(_) => "mapping",
        }
    }

    /// Textual form of a scalar, as written into XML text or used as a
    /// coerced mapping key. Returns `None` for sequences and mappings.
    pub fn scalar_text(&self) -> Option<String> {
        match self {
            Tree::Null => Some(String::new()),
            Tree::Bool(b) => Some(b.to_string()),
            Tree::Number(n) => Some(n.to_string()),
            Tree::String(s) => Some(s.clone()),
            Tree::Sequence(_) | Tree::Mapping(_) => None,
        }
    }
}

impl From<&str> for Tree {
    fn from(value: &str) -> Self {
        Tree::String(value.to_string())
    }
}

impl From<String> for Tree {
    fn from(value: String) -> Self {
        Tree::String(value)
    }
}

impl From<bool> for Tree {
    fn from(value: bool) -> Self {
        Tree::Bool(value)
    }
}

impl From<i64> for Tree {
    fn from(value: i64) -> Self {
        Tree::Number(Number::from(value))
    }
}

impl From<u64> for Tree {
    fn from(value: u64) -> Self {
        Tree::Number(Number::PosInt(value))
    }
}

impl From<f64> for Tree {
    fn from(value: f64) -> Self {
        Tree::Number(Number::Float(value))
    }
}

impl From<Vec<Tree>> for Tree {
    fn from(items: Vec<Tree>) -> Self {
        Tree::Sequence(items)
    }
}

impl From<Mapping> for Tree {
    fn from(mapping: Mapping) -> Self {
        Tree::Mapping(mapping)
    }
}

/// A numeric scalar.
///
/// Integers keep their sign class so that large unsigned values survive a
/// round-trip; everything else is an `f64`.
#[derive(Clone, Copy, Debug)]
pub enum Number {
    PosInt(u64),
    NegInt(i64),
    Float(f64),
}

impl Number {
    pub fn as_f64(&self) -> f64 {
        match *self {
            Number::PosInt(n) => n as f64,
            Number::NegInt(n) => n as f64,
            Number::Float(n) => n,
        }
    }

    pub fn is_integer(&self) -> bool {
        !matches!(self, Number::Float(_))
    }
}

impl From<i64> for Number {
    fn from(value: i64) -> Self {
        if value < 0 {
            Number::NegInt(value)
        } else {
            Number::PosInt(value as u64)
        }
    }
}

impl PartialEq for Number {
    fn eq(&self, other: &Self) -> bool {
        match (*self, *other) {
            (Number::PosInt(a), Number::PosInt(b)) => a == b,
            (Number::NegInt(a), Number::NegInt(b)) => a == b,
            // NaN equals NaN here so that trees compare structurally.
            (Number::Float(a), Number::Float(b)) => a == b || (a.is_nan() && b.is_nan()),
            _ => false,
        }
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Number::PosInt(n) => write!(f, "{n}"),
            Number::NegInt(n) => write!(f, "{n}"),
            Number::Float(n) if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e16 => {
                write!(f, "{n:.1}")
            }
            Number::Float(n) => write!(f, "{n}"),
        }
    }
}

/// An insertion-ordered mapping from string keys to [`Tree`] values.
///
/// Keys are unique: inserting an existing key replaces its value in place,
/// so the key keeps its original position. Equality ignores order.
#[derive(Clone, Debug, Default)]
pub struct Mapping {
    entries: Vec<(String, Tree)>,
}

impl Mapping {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
        }
    }

    /// Inserts `value` under `key`, returning the previous value if any.
    pub fn insert(&mut self, key: impl Into<String>, value: Tree) -> Option<Tree> {
        let key = key.into();
        match self.get_mut(&key) {
            Some(slot) => Some(std::mem::replace(slot, value)),
            None => {
                self.entries.push((key, value));
                None
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&Tree> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Tree> {
        self.entries
            .iter_mut()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = &Tree> {
        self.entries.iter().map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Tree)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl PartialEq for Mapping {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .iter()
                .all(|(key, value)| other.get(key) == Some(value))
    }
}

impl<K: Into<String>> FromIterator<(K, Tree)> for Mapping {
    fn from_iter<I: IntoIterator<Item = (K, Tree)>>(iter: I) -> Self {
        let mut mapping = Mapping::new();
        for (key, value) in iter {
            mapping.insert(key, value);
        }
        mapping
    }
}

impl IntoIterator for Mapping {
    type Item = (String, Tree);
    type IntoIter = std::vec::IntoIter<(String, Tree)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl Serialize for Tree {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Tree::Null => serializer.serialize_unit(),
            Tree::Bool(b) => serializer.serialize_bool(*b),
            Tree::Number(n) => n.serialize(serializer),
            Tree::String(s) => serializer.serialize_str(s),
            Tree::Sequence(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Tree::Mapping(mapping) => mapping.serialize(serializer),
        }
    }
}

impl Serialize for Mapping {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (key, value) in self.iter() {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl Serialize for Number {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match *self {
            Number::PosInt(n) => serializer.serialize_u64(n),
            Number::NegInt(n) => serializer.serialize_i64(n),
            Number::Float(n) => serializer.serialize_f64(n),
        }
    }
}

impl<'de> Deserialize<'de> for Tree {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Tree, D::Error> {
        deserializer.deserialize_any(TreeVisitor)
    }
}

struct TreeVisitor;

impl<'de> Visitor<'de> for TreeVisitor {
    type Value = Tree;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("any scalar, sequence or mapping")
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<Tree, E> {
        Ok(Tree::Bool(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Tree, E> {
        Ok(Tree::Number(Number::from(v)))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Tree, E> {
        Ok(Tree::Number(Number::PosInt(v)))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Tree, E> {
        Ok(Tree::Number(Number::Float(v)))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Tree, E> {
        Ok(Tree::String(v.to_string()))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<Tree, E> {
        Ok(Tree::String(v))
    }

    fn visit_unit<E: de::Error>(self) -> Result<Tree, E> {
        Ok(Tree::Null)
    }

    fn visit_none<E: de::Error>(self) -> Result<Tree, E> {
        Ok(Tree::Null)
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Tree, D::Error> {
        Deserialize::deserialize(deserializer)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut access: A) -> Result<Tree, A::Error> {
        let mut items = Vec::with_capacity(access.size_hint().unwrap_or(0));
        while let Some(item) = access.next_element()? {
            items.push(item);
        }
        Ok(Tree::Sequence(items))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Tree, A::Error> {
        let mut mapping = Mapping::with_capacity(access.size_hint().unwrap_or(0));
        while let Some((key, value)) = access.next_entry::<String, Tree>()? {
            mapping.insert(key, value);
        }
        Ok(Tree::Mapping(mapping))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn person() -> Mapping {
        [
            ("name", Tree::from("John")),
            ("age", Tree::from(30i64)),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn insert_existing_key_keeps_position() {
        let mut mapping = person();
        let previous = mapping.insert("name", Tree::from("Jane"));

        assert_eq!(previous, Some(Tree::from("John")));
        assert_eq!(mapping.keys().collect::<Vec<_>>(), vec!["name", "age"]);
        assert_eq!(mapping.get("name"), Some(&Tree::from("Jane")));
    }

    #[test]
    fn equality_ignores_key_order() {
        let reversed: Mapping = [
            ("age", Tree::from(30i64)),
            ("name", Tree::from("John")),
        ]
        .into_iter()
        .collect();

        assert_eq!(person(), reversed);
        assert_ne!(person(), Mapping::new());
    }

    #[test]
    fn number_display_keeps_float_marker() {
        assert_eq!(Number::PosInt(30).to_string(), "30");
        assert_eq!(Number::NegInt(-4).to_string(), "-4");
        assert_eq!(Number::Float(30.0).to_string(), "30.0");
        assert_eq!(Number::Float(2.5).to_string(), "2.5");
        assert_eq!(Number::Float(f64::INFINITY).to_string(), "inf");
    }

    #[test]
    fn integer_classes_do_not_compare_equal_to_floats() {
        assert_eq!(Number::from(3), Number::PosInt(3));
        assert_ne!(Number::PosInt(3), Number::Float(3.0));
        assert_eq!(Number::Float(f64::NAN), Number::Float(f64::NAN));
    }

    #[test]
    fn scalar_text_for_each_scalar() {
        assert_eq!(Tree::Null.scalar_text(), Some(String::new()));
        assert_eq!(Tree::Bool(true).scalar_text(), Some("true".to_string()));
        assert_eq!(Tree::from(30i64).scalar_text(), Some("30".to_string()));
        assert_eq!(Tree::Sequence(vec![]).scalar_text(), None);
    }

    #[test]
    fn deserialize_preserves_key_order() {
        let tree: Tree = serde_json::from_str(r#"{"b": 1, "a": [true, null], "c": -2.5}"#)
            .expect("parse json");
        let mapping = tree.as_mapping().expect("mapping");

        assert_eq!(mapping.keys().collect::<Vec<_>>(), vec!["b", "a", "c"]);
        assert_eq!(
            mapping.get("a"),
            Some(&Tree::Sequence(vec![Tree::Bool(true), Tree::Null]))
        );
        assert_eq!(mapping.get("c"), Some(&Tree::from(-2.5)));
    }

    #[test]
    fn serialize_writes_entries_in_order() {
        let json = serde_json::to_string(&Tree::Mapping(person())).expect("serialize");
        assert_eq!(json, r#"{"name":"John","age":30}"#);
    }
}
