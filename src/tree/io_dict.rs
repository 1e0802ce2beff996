//! Native mapping ("dict") input.
//!
//! A dict is already a tree; the only check is that its root is a mapping.
//! Any `Serialize` value can be turned into one with [`dict_from_serialize`].

use serde::Serialize;

use super::model::Tree;
use super::ser::to_tree;
use crate::conversion::DataType;
use crate::error::DataConverterError;

/// Accepts `tree` as dict input if its root is a mapping.
pub fn from_dict(tree: Tree) -> Result<Tree, DataConverterError> {
    match tree {
        Tree::Mapping(_) => Ok(tree),
        other => Err(DataConverterError::shape(
            DataType::Dict,
            format!("expected a mapping, found a {}", other.kind_name()),
        )),
    }
}

/// Builds dict input from any serializable value.
///
/// Fails if a map key cannot be coerced to a string, or if the value does
/// not serialize to a mapping.
pub fn dict_from_serialize<T: Serialize + ?Sized>(value: &T) -> Result<Tree, DataConverterError> {
    let tree =
        to_tree(value).map_err(|err| DataConverterError::shape(DataType::Dict, err.to_string()))?;
    from_dict(tree)
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn mapping_passes_through_unchanged() {
        let tree = Tree::Mapping([("name", Tree::from("John"))].into_iter().collect());
        assert_eq!(from_dict(tree.clone()).expect("accept mapping"), tree);
    }

    #[test]
    fn sequence_root_is_rejected() {
        let err = from_dict(Tree::Sequence(vec![Tree::from(1i64)])).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Shape);
        assert!(err.to_string().contains("found a sequence"));
    }

    #[test]
    fn json_value_is_accepted_as_dict() {
        let value = serde_json::json!({"name": "John", "age": 30});
        let tree = dict_from_serialize(&value).expect("accept json object");
        let mapping = tree.as_mapping().expect("mapping");
        assert_eq!(mapping.get("age"), Some(&Tree::from(30u64)));
    }

    #[test]
    fn vec_is_rejected() {
        let err = dict_from_serialize(&vec![1, 2, 3]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Shape);
    }

    #[test]
    fn bool_keys_are_coerced() {
        let mut data: BTreeMap<String, BTreeMap<bool, f64>> = BTreeMap::new();
        data.insert("flags".into(), [(true, 1.5)].into_iter().collect());

        let tree = dict_from_serialize(&data).expect("accept nested map");
        let flags = tree
            .as_mapping()
            .and_then(|m| m.get("flags"))
            .and_then(Tree::as_mapping)
            .expect("nested mapping");
        assert_eq!(flags.get("true"), Some(&Tree::from(1.5)));
    }
}
