//! Canonical tree for dataconv.
//!
//! This module defines the single in-memory representation that every
//! supported format converts through, plus one reader/writer module per
//! format. Adding a format means adding one `io_*` module here and one arm
//! to each dispatch in [`crate::conversion`].
//!
//! # Example
//!
//! ```
//! use dataconv::tree::{io_json, io_xml, Tree};
//!
//! let tree = io_xml::from_xml_str("<person><name>John</name></person>").unwrap();
//! assert_eq!(io_json::to_json_string(&tree).unwrap(), r#"{"name": "John"}"#);
//! assert_eq!(tree.as_mapping().and_then(|m| m.get("name")), Some(&Tree::from("John")));
//! ```

pub mod io_dict;
pub mod io_json;
pub mod io_xml;
pub mod io_yaml;
mod model;
mod ser;

// Re-export core types for convenient access
pub use model::{Mapping, Number, Tree};
pub use ser::{to_tree, TreeError};
