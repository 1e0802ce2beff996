//! Building a [`Tree`] from any `Serialize` value.
//!
//! This is how native Rust mappings (`BTreeMap`, `HashMap`, derived structs,
//! `serde_json::Value`, ...) enter the converter as "dict" input. Map keys
//! that are scalars are coerced to strings; composite keys are rejected.
//! Enums follow serde's externally tagged convention.

use std::fmt;

use serde::ser::{self, Impossible, Serialize};

use super::model::{Mapping, Number, Tree};

/// Serialize `value` into a [`Tree`].
pub fn to_tree<T: Serialize + ?Sized>(value: &T) -> Result<Tree, TreeError> {
    value.serialize(TreeSerializer)
}

/// A value could not be represented as a [`Tree`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeError {
    message: String,
}

impl fmt::Display for TreeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for TreeError {}

impl ser::Error for TreeError {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        TreeError {
            message: msg.to_string(),
        }
    }
}

fn key_error(found: &str) -> TreeError {
    TreeError {
        message: format!("mapping key must be a string or scalar, found {found}"),
    }
}

struct TreeSerializer;

impl ser::Serializer for TreeSerializer {
    type Ok = Tree;
    type Error = TreeError;

    type SerializeSeq = SeqBuilder;
    type SerializeTuple = SeqBuilder;
    type SerializeTupleStruct = SeqBuilder;
    type SerializeTupleVariant = VariantSeqBuilder;
    type SerializeMap = MapBuilder;
    type SerializeStruct = MapBuilder;
    type SerializeStructVariant = VariantMapBuilder;

    fn serialize_bool(self, v: bool) -> Result<Tree, TreeError> {
        Ok(Tree::Bool(v))
    }

    fn serialize_i8(self, v: i8) -> Result<Tree, TreeError> {
        self.serialize_i64(i64::from(v))
    }

    fn serialize_i16(self, v: i16) -> Result<Tree, TreeError> {
        self.serialize_i64(i64::from(v))
    }

    fn serialize_i32(self, v: i32) -> Result<Tree, TreeError> {
        self.serialize_i64(i64::from(v))
    }

    fn serialize_i64(self, v: i64) -> Result<Tree, TreeError> {
        Ok(Tree::Number(Number::from(v)))
    }

    fn serialize_i128(self, v: i128) -> Result<Tree, TreeError> {
        if let Ok(v) = i64::try_from(v) {
            self.serialize_i64(v)
        } else if let Ok(v) = u64::try_from(v) {
            self.serialize_u64(v)
        } else {
            Err(ser::Error::custom(format!("integer {v} is out of range")))
        }
    }

    fn serialize_u8(self, v: u8) -> Result<Tree, TreeError> {
        self.serialize_u64(u64::from(v))
    }

    fn serialize_u16(self, v: u16) -> Result<Tree, TreeError> {
        self.serialize_u64(u64::from(v))
    }

    fn serialize_u32(self, v: u32) -> Result<Tree, TreeError> {
        self.serialize_u64(u64::from(v))
    }

    fn serialize_u64(self, v: u64) -> Result<Tree, TreeError> {
        Ok(Tree::Number(Number::PosInt(v)))
    }

    fn serialize_u128(self, v: u128) -> Result<Tree, TreeError> {
        u64::try_from(v)
            .map(|v| Tree::Number(Number::PosInt(v)))
            .map_err(|_| ser::Error::custom(format!("integer {v} is out of range")))
    }

    fn serialize_f32(self, v: f32) -> Result<Tree, TreeError> {
        self.serialize_f64(f64::from(v))
    }

    fn serialize_f64(self, v: f64) -> Result<Tree, TreeError> {
        Ok(Tree::Number(Number::Float(v)))
    }

    fn serialize_char(self, v: char) -> Result<Tree, TreeError> {
        Ok(Tree::String(v.to_string()))
    }

    fn serialize_str(self, v: &str) -> Result<Tree, TreeError> {
        Ok(Tree::String(v.to_string()))
    }

    fn serialize_bytes(self, v: &[u8]) -> Result<Tree, TreeError> {
        Ok(Tree::Sequence(
            v.iter()
                .map(|b| Tree::Number(Number::PosInt(u64::from(*b))))
                .collect(),
        ))
    }

    fn serialize_none(self) -> Result<Tree, TreeError> {
        Ok(Tree::Null)
    }

    fn serialize_some<T: Serialize + ?Sized>(self, value: &T) -> Result<Tree, TreeError> {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<Tree, TreeError> {
        Ok(Tree::Null)
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<Tree, TreeError> {
        Ok(Tree::Null)
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _index: u32,
        variant: &'static str,
    ) -> Result<Tree, TreeError> {
        Ok(Tree::String(variant.to_string()))
    }

    fn serialize_newtype_struct<T: Serialize + ?Sized>(
        self,
        _name: &'static str,
        value: &T,
    ) -> Result<Tree, TreeError> {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T: Serialize + ?Sized>(
        self,
        _name: &'static str,
        _index: u32,
        variant: &'static str,
        value: &T,
    ) -> Result<Tree, TreeError> {
        let mut mapping = Mapping::with_capacity(1);
        mapping.insert(variant, value.serialize(TreeSerializer)?);
        Ok(Tree::Mapping(mapping))
    }

    fn serialize_seq(self, len: Option<usize>) -> Result<SeqBuilder, TreeError> {
        Ok(SeqBuilder {
            items: Vec::with_capacity(len.unwrap_or(0)),
        })
    }

    fn serialize_tuple(self, len: usize) -> Result<SeqBuilder, TreeError> {
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        len: usize,
    ) -> Result<SeqBuilder, TreeError> {
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<VariantSeqBuilder, TreeError> {
        Ok(VariantSeqBuilder {
            variant,
            items: Vec::with_capacity(len),
        })
    }

    fn serialize_map(self, len: Option<usize>) -> Result<MapBuilder, TreeError> {
        Ok(MapBuilder {
            mapping: Mapping::with_capacity(len.unwrap_or(0)),
            pending_key: None,
        })
    }

    fn serialize_struct(self, _name: &'static str, len: usize) -> Result<MapBuilder, TreeError> {
        self.serialize_map(Some(len))
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<VariantMapBuilder, TreeError> {
        Ok(VariantMapBuilder {
            variant,
            mapping: Mapping::with_capacity(len),
        })
    }
}

struct SeqBuilder {
    items: Vec<Tree>,
}

impl ser::SerializeSeq for SeqBuilder {
    type Ok = Tree;
    type Error = TreeError;

    fn serialize_element<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), TreeError> {
        self.items.push(value.serialize(TreeSerializer)?);
        Ok(())
    }

    fn end(self) -> Result<Tree, TreeError> {
        Ok(Tree::Sequence(self.items))
    }
}

impl ser::SerializeTuple for SeqBuilder {
    type Ok = Tree;
    type Error = TreeError;

    fn serialize_element<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), TreeError> {
        ser::SerializeSeq::serialize_element(self, value)
    }

    fn end(self) -> Result<Tree, TreeError> {
        ser::SerializeSeq::end(self)
    }
}

impl ser::SerializeTupleStruct for SeqBuilder {
    type Ok = Tree;
    type Error = TreeError;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), TreeError> {
        ser::SerializeSeq::serialize_element(self, value)
    }

    fn end(self) -> Result<Tree, TreeError> {
        ser::SerializeSeq::end(self)
    }
}

struct VariantSeqBuilder {
    variant: &'static str,
    items: Vec<Tree>,
}

impl ser::SerializeTupleVariant for VariantSeqBuilder {
    type Ok = Tree;
    type Error = TreeError;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), TreeError> {
        self.items.push(value.serialize(TreeSerializer)?);
        Ok(())
    }

    fn end(self) -> Result<Tree, TreeError> {
        let mut mapping = Mapping::with_capacity(1);
        mapping.insert(self.variant, Tree::Sequence(self.items));
        Ok(Tree::Mapping(mapping))
    }
}

struct MapBuilder {
    mapping: Mapping,
    pending_key: Option<String>,
}

impl ser::SerializeMap for MapBuilder {
    type Ok = Tree;
    type Error = TreeError;

    fn serialize_key<T: Serialize + ?Sized>(&mut self, key: &T) -> Result<(), TreeError> {
        self.pending_key = Some(key.serialize(KeySerializer)?);
        Ok(())
    }

    fn serialize_value<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), TreeError> {
        let key = self
            .pending_key
            .take()
            .ok_or_else(|| ser::Error::custom("serialize_value called before serialize_key"))?;
        self.mapping.insert(key, value.serialize(TreeSerializer)?);
        Ok(())
    }

    fn end(self) -> Result<Tree, TreeError> {
        Ok(Tree::Mapping(self.mapping))
    }
}

impl ser::SerializeStruct for MapBuilder {
    type Ok = Tree;
    type Error = TreeError;

    fn serialize_field<T: Serialize + ?Sized>(
        &mut self,
        key: &'static str,
        value: &T,
    ) -> Result<(), TreeError> {
        self.mapping.insert(key, value.serialize(TreeSerializer)?);
        Ok(())
    }

    fn end(self) -> Result<Tree, TreeError> {
        Ok(Tree::Mapping(self.mapping))
    }
}

struct VariantMapBuilder {
    variant: &'static str,
    mapping: Mapping,
}

impl ser::SerializeStructVariant for VariantMapBuilder {
    type Ok = Tree;
    type Error = TreeError;

    fn serialize_field<T: Serialize + ?Sized>(
        &mut self,
        key: &'static str,
        value: &T,
    ) -> Result<(), TreeError> {
        self.mapping.insert(key, value.serialize(TreeSerializer)?);
        Ok(())
    }

    fn end(self) -> Result<Tree, TreeError> {
        let mut outer = Mapping::with_capacity(1);
        outer.insert(self.variant, Tree::Mapping(self.mapping));
        Ok(Tree::Mapping(outer))
    }
}

/// Coerces scalar map keys to strings.
struct KeySerializer;

impl ser::Serializer for KeySerializer {
    type Ok = String;
    type Error = TreeError;

    type SerializeSeq = Impossible<String, TreeError>;
    type SerializeTuple = Impossible<String, TreeError>;
    type SerializeTupleStruct = Impossible<String, TreeError>;
    type SerializeTupleVariant = Impossible<String, TreeError>;
    type SerializeMap = Impossible<String, TreeError>;
    type SerializeStruct = Impossible<String, TreeError>;
    type SerializeStructVariant = Impossible<String, TreeError>;

    fn serialize_bool(self, v: bool) -> Result<String, TreeError> {
        Ok(v.to_string())
    }

    fn serialize_i8(self, v: i8) -> Result<String, TreeError> {
        Ok(v.to_string())
    }

    fn serialize_i16(self, v: i16) -> Result<String, TreeError> {
        Ok(v.to_string())
    }

    fn serialize_i32(self, v: i32) -> Result<String, TreeError> {
        Ok(v.to_string())
    }

    fn serialize_i64(self, v: i64) -> Result<String, TreeError> {
        Ok(v.to_string())
    }

    fn serialize_i128(self, v: i128) -> Result<String, TreeError> {
        Ok(v.to_string())
    }

    fn serialize_u8(self, v: u8) -> Result<String, TreeError> {
        Ok(v.to_string())
    }

    fn serialize_u16(self, v: u16) -> Result<String, TreeError> {
        Ok(v.to_string())
    }

    fn serialize_u32(self, v: u32) -> Result<String, TreeError> {
        Ok(v.to_string())
    }

    fn serialize_u64(self, v: u64) -> Result<String, TreeError> {
        Ok(v.to_string())
    }

    fn serialize_u128(self, v: u128) -> Result<String, TreeError> {
        Ok(v.to_string())
    }

    fn serialize_f32(self, v: f32) -> Result<String, TreeError> {
        self.serialize_f64(f64::from(v))
    }

    fn serialize_f64(self, v: f64) -> Result<String, TreeError> {
        Ok(Number::Float(v).to_string())
    }

    fn serialize_char(self, v: char) -> Result<String, TreeError> {
        Ok(v.to_string())
    }

    fn serialize_str(self, v: &str) -> Result<String, TreeError> {
        Ok(v.to_string())
    }

    fn serialize_bytes(self, _v: &[u8]) -> Result<String, TreeError> {
        Err(key_error("bytes"))
    }

    fn serialize_none(self) -> Result<String, TreeError> {
        Ok("null".to_string())
    }

    fn serialize_some<T: Serialize + ?Sized>(self, value: &T) -> Result<String, TreeError> {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<String, TreeError> {
        Ok("null".to_string())
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<String, TreeError> {
        Ok("null".to_string())
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _index: u32,
        variant: &'static str,
    ) -> Result<String, TreeError> {
        Ok(variant.to_string())
    }

    fn serialize_newtype_struct<T: Serialize + ?Sized>(
        self,
        _name: &'static str,
        value: &T,
    ) -> Result<String, TreeError> {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T: Serialize + ?Sized>(
        self,
        _name: &'static str,
        _index: u32,
        _variant: &'static str,
        _value: &T,
    ) -> Result<String, TreeError> {
        Err(key_error("enum variant with data"))
    }

    fn serialize_seq(self, _len: Option<usize>) -> Result<Self::SerializeSeq, TreeError> {
        Err(key_error("sequence"))
    }

    fn serialize_tuple(self, _len: usize) -> Result<Self::SerializeTuple, TreeError> {
        Err(key_error("tuple"))
    }

    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleStruct, TreeError> {
        Err(key_error("tuple struct"))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleVariant, TreeError> {
        Err(key_error("enum variant with data"))
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<Self::SerializeMap, TreeError> {
        Err(key_error("mapping"))
    }

    fn serialize_struct(
        self,
        _name: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStruct, TreeError> {
        Err(key_error("struct"))
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStructVariant, TreeError> {
        Err(key_error("enum variant with data"))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use serde::Serialize;

    use super::*;

    #[derive(Serialize)]
    struct Person {
        name: String,
        age: u32,
        nickname: Option<String>,
        role: Role,
    }

    #[derive(Serialize)]
    enum Role {
        Admin,
        Guest { until: String },
    }

    #[test]
    fn struct_fields_keep_declaration_order() {
        let person = Person {
            name: "John".into(),
            age: 30,
            nickname: None,
            role: Role::Admin,
        };

        let tree = to_tree(&person).expect("serialize person");
        let mapping = tree.as_mapping().expect("mapping");

        assert_eq!(
            mapping.keys().collect::<Vec<_>>(),
            vec!["name", "age", "nickname", "role"]
        );
        assert_eq!(mapping.get("age"), Some(&Tree::from(30u64)));
        assert_eq!(mapping.get("nickname"), Some(&Tree::Null));
        assert_eq!(mapping.get("role"), Some(&Tree::from("Admin")));
    }

    #[test]
    fn struct_variant_is_externally_tagged() {
        let tree = to_tree(&Role::Guest {
            until: "friday".into(),
        })
        .expect("serialize role");

        let outer = tree.as_mapping().expect("mapping");
        let inner = outer.get("Guest").and_then(Tree::as_mapping).expect("inner");
        assert_eq!(inner.get("until"), Some(&Tree::from("friday")));
    }

    #[test]
    fn integer_keys_are_coerced_to_strings() {
        let mut data = BTreeMap::new();
        data.insert(2u32, "two");
        data.insert(10u32, "ten");

        let tree = to_tree(&data).expect("serialize map");
        let mapping = tree.as_mapping().expect("mapping");
        assert_eq!(mapping.get("2"), Some(&Tree::from("two")));
        assert_eq!(mapping.get("10"), Some(&Tree::from("ten")));
    }

    #[test]
    fn composite_keys_are_rejected() {
        let mut data = BTreeMap::new();
        data.insert((1, 2), "pair");

        let err = to_tree(&data).unwrap_err();
        assert!(err.to_string().contains("mapping key must be a string or scalar"));
    }
}
