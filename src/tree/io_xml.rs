//! XML reader and writer for the canonical tree.
//!
//! XML has no native mapping or sequence, so values are folded:
//!
//! - a leaf element becomes its trimmed text, always as a string;
//! - an element with child elements becomes a mapping keyed by child tag;
//! - repeated sibling tags become a sequence in document order;
//! - attributes become `@name` keys and text next to children or attributes
//!   is kept under `#text`;
//! - the document root is unwrapped, so its tag name is not kept.
//!
//! Writing is the inverse, under a fixed `<root>` element. A sequence stored
//! under key `k` becomes repeated `<k>` siblings; a sequence with no key of
//! its own (the root, or an item of another sequence) uses `<item>` elements.

use std::fmt::Write as _;

use roxmltree::Node;

use super::model::{Mapping, Tree};
use crate::error::DataConverterError;

/// Root tag used when writing XML.
pub const DEFAULT_ROOT_TAG: &str = "root";

/// Tag for sequence items that have no key of their own.
pub const ITEM_TAG: &str = "item";

/// Prefix marking mapping keys that hold attributes.
pub const ATTRIBUTE_PREFIX: &str = "@";

/// Mapping key for element text that sits next to attributes or children.
pub const TEXT_KEY: &str = "#text";

/// Deepest element nesting the reader accepts.
pub const MAX_DEPTH: usize = 100;

/// Parses an XML document into a tree.
///
/// DTDs are rejected, and so are documents nested deeper than
/// [`MAX_DEPTH`] elements.
pub fn from_xml_str(xml: &str) -> Result<Tree, DataConverterError> {
    check_depth(xml)?;
    let document = roxmltree::Document::parse(xml).map_err(|source| {
        DataConverterError::XmlParse {
            message: source.to_string(),
        }
    })?;

    Ok(fold_element(document.root_element()))
}

/// Parses XML from bytes.
///
/// The input must be valid UTF-8.
pub fn from_xml_slice(bytes: &[u8]) -> Result<Tree, DataConverterError> {
    let xml = std::str::from_utf8(bytes).map_err(|source| DataConverterError::XmlParse {
        message: format!("input is not valid UTF-8: {source}"),
    })?;
    from_xml_str(xml)
}

/// Writes a tree as an XML document under `<root>`.
pub fn to_xml_string(tree: &Tree) -> Result<String, DataConverterError> {
    to_xml_string_with_root(tree, DEFAULT_ROOT_TAG)
}

/// Writes a tree as an XML document under a caller-chosen root tag.
pub fn to_xml_string_with_root(tree: &Tree, root_tag: &str) -> Result<String, DataConverterError> {
    check_name(root_tag)?;

    let mut writer = XmlWriter::default();
    writeln!(writer.xml, "<?xml version=\"1.0\" encoding=\"utf-8\"?>").expect("write to string");
    writer.element(root_tag, tree, 0)?;
    Ok(writer.xml)
}

/// Fuzz-only entrypoint for the nesting-depth scan.
#[cfg(feature = "fuzzing")]
pub fn fuzz_check_depth(input: &str) -> Result<(), DataConverterError> {
    check_depth(input)
}

/// Rejects documents nested deeper than [`MAX_DEPTH`] before a DOM is built,
/// since both roxmltree and [`fold_element`] recurse per level.
///
/// Exact for well-formed XML; anything malformed is left to the parser.
fn check_depth(xml: &str) -> Result<(), DataConverterError> {
    let bytes = xml.as_bytes();
    let mut depth = 0usize;
    let mut pos = 0;

    while let Some(offset) = bytes[pos..].iter().position(|&b| b == b'<') {
        let start = pos + offset;
        let rest = &bytes[start..];

        pos = if rest.starts_with(b"<!--") {
            skip_past(bytes, start + 4, b"-->")
        } else if rest.starts_with(b"<![CDATA[") {
            skip_past(bytes, start + 9, b"]]>")
        } else if rest.starts_with(b"<?") {
            skip_past(bytes, start + 2, b"?>")
        } else if rest.starts_with(b"</") {
            depth = depth.saturating_sub(1);
            skip_past(bytes, start + 2, b">")
        } else if rest.starts_with(b"<!") {
            skip_past(bytes, start + 2, b">")
        } else {
            let end = tag_end(bytes, start + 1);
            let self_closing = end < bytes.len() && bytes[end - 1] == b'/';
            if !self_closing {
                depth += 1;
                if depth > MAX_DEPTH {
                    return Err(DataConverterError::XmlParse {
                        message: format!("elements are nested deeper than {MAX_DEPTH} levels"),
                    });
                }
            }
            (end + 1).min(bytes.len())
        };
    }

    Ok(())
}

/// Index just past the next `pattern` at or after `from`, or the end of input.
fn skip_past(bytes: &[u8], from: usize, pattern: &[u8]) -> usize {
    bytes[from..]
        .windows(pattern.len())
        .position(|window| window == pattern)
        .map_or(bytes.len(), |offset| from + offset + pattern.len())
}

/// Index of the `>` closing a start tag, skipping quoted attribute values.
fn tag_end(bytes: &[u8], from: usize) -> usize {
    let mut quote = None;
    for (index, &byte) in bytes.iter().enumerate().skip(from) {
        match (quote, byte) {
            (Some(open), b) if b == open => quote = None,
            (Some(_), _) => {}
            (None, b'"' | b'\'') => quote = Some(byte),
            (None, b'>') => return index,
            (None, _) => {}
        }
    }
    bytes.len()
}

fn fold_element(node: Node<'_, '_>) -> Tree {
    let mut mapping = Mapping::new();

    for attribute in node.attributes() {
        mapping.insert(
            format!("{ATTRIBUTE_PREFIX}{}", attribute.name()),
            Tree::String(attribute.value().to_string()),
        );
    }

    for child in node.children().filter(Node::is_element) {
        let key = child.tag_name().name();
        let value = fold_element(child);

        // Folded elements are never sequences, so a sequence here can only
        // come from an earlier promotion.
        match mapping.get_mut(key) {
            Some(Tree::Sequence(items)) => items.push(value),
            Some(existing) => {
                let first = std::mem::take(existing);
                *existing = Tree::Sequence(vec![first, value]);
            }
            None => {
                mapping.insert(key, value);
            }
        }
    }

    let text: String = node
        .children()
        .filter(Node::is_text)
        .filter_map(|child| child.text())
        .collect();
    let text = text.trim();

    if mapping.is_empty() {
        return Tree::String(text.to_string());
    }

    if !text.is_empty() {
        mapping.insert(TEXT_KEY, Tree::String(text.to_string()));
    }

    Tree::Mapping(mapping)
}

#[derive(Default)]
struct XmlWriter {
    xml: String,
}

impl XmlWriter {
    fn element(&mut self, tag: &str, value: &Tree, depth: usize) -> Result<(), DataConverterError> {
        match value {
            Tree::Mapping(mapping) => self.mapping_element(tag, mapping, depth),
            Tree::Sequence(items) if items.is_empty() => {
                self.leaf(tag, "", "", depth);
                Ok(())
            }
            Tree::Sequence(items) => {
                self.open(tag, "", "", depth);
                for item in items {
                    self.element(ITEM_TAG, item, depth + 1)?;
                }
                self.close(tag, depth);
                Ok(())
            }
            scalar => {
                let text = escape_text(scalar)?;
                self.leaf(tag, "", &text, depth);
                Ok(())
            }
        }
    }

    fn mapping_element(
        &mut self,
        tag: &str,
        mapping: &Mapping,
        depth: usize,
    ) -> Result<(), DataConverterError> {
        let mut attributes = String::new();
        let mut text = String::new();
        let mut children = Vec::with_capacity(mapping.len());

        for (key, value) in mapping.iter() {
            if key == TEXT_KEY {
                text = escape_text(value)?;
            } else if let Some(name) = key.strip_prefix(ATTRIBUTE_PREFIX) {
                check_name(name)?;
                write!(attributes, " {}=\"{}\"", name, escape_text(value)?)
                    .expect("write to string");
            } else {
                check_name(key)?;
                children.push((key, value));
            }
        }

        if children.is_empty() {
            self.leaf(tag, &attributes, &text, depth);
            return Ok(());
        }

        self.open(tag, &attributes, &text, depth);
        for (key, value) in children {
            match value {
                Tree::Sequence(items) => {
                    for item in items {
                        self.element(key, item, depth + 1)?;
                    }
                }
                other => self.element(key, other, depth + 1)?,
            }
        }
        self.close(tag, depth);
        Ok(())
    }

    fn leaf(&mut self, tag: &str, attributes: &str, text: &str, depth: usize) {
        self.indent(depth);
        if text.is_empty() {
            writeln!(self.xml, "<{tag}{attributes}/>").expect("write to string");
        } else {
            writeln!(self.xml, "<{tag}{attributes}>{text}</{tag}>").expect("write to string");
        }
    }

    fn open(&mut self, tag: &str, attributes: &str, text: &str, depth: usize) {
        self.indent(depth);
        writeln!(self.xml, "<{tag}{attributes}>{text}").expect("write to string");
    }

    fn close(&mut self, tag: &str, depth: usize) {
        self.indent(depth);
        writeln!(self.xml, "</{tag}>").expect("write to string");
    }

    fn indent(&mut self, depth: usize) {
        for _ in 0..depth {
            self.xml.push_str("  ");
        }
    }
}

/// Checks that `name` can be used as an element or attribute name.
///
/// Uses the XML 1.0 (fifth edition) `NameStartChar` and `NameChar`
/// productions. Colons are refused since namespaces are not modelled.
fn check_name(name: &str) -> Result<(), DataConverterError> {
    let mut chars = name.chars();
    let valid_start = chars.next().is_some_and(is_name_start_char);
    let valid_rest = chars.all(is_name_char);

    if valid_start && valid_rest {
        Ok(())
    } else {
        Err(DataConverterError::XmlWrite {
            message: format!("'{name}' is not a valid XML element or attribute name"),
        })
    }
}

fn is_name_start_char(c: char) -> bool {
    matches!(c,
        'A'..='Z'
        | '_'
        | 'a'..='z'
        | '\u{C0}'..='\u{D6}'
        | '\u{D8}'..='\u{F6}'
        | '\u{F8}'..='\u{2FF}'
        | '\u{370}'..='\u{37D}'
        | '\u{37F}'..='\u{1FFF}'
        | '\u{200C}'..='\u{200D}'
        | '\u{2070}'..='\u{218F}'
        | '\u{2C00}'..='\u{2FEF}'
        | '\u{3001}'..='\u{D7FF}'
        | '\u{F900}'..='\u{FDCF}'
        | '\u{FDF0}'..='\u{FFFD}'
        | '\u{10000}'..='\u{EFFFF}')
}

fn is_name_char(c: char) -> bool {
    is_name_start_char(c)
        || matches!(c,
            '-' | '.' | '0'..='9' | '\u{B7}' | '\u{300}'..='\u{36F}' | '\u{203F}'..='\u{2040}')
}

fn escape_text(value: &Tree) -> Result<String, DataConverterError> {
    let raw = value
        .scalar_text()
        .ok_or_else(|| DataConverterError::XmlWrite {
            message: format!(
                "a {} cannot be written as XML text or attribute value",
                value.kind_name()
            ),
        })?;

    if let Some(bad) = raw.chars().find(|c| !is_xml_char(*c)) {
        return Err(DataConverterError::XmlWrite {
            message: format!("character U+{:04X} is not allowed in XML", u32::from(bad)),
        });
    }

    Ok(xml_escape(&raw))
}

fn is_xml_char(c: char) -> bool {
    matches!(c, '\t' | '\n' | '\r' | '\u{20}'..='\u{D7FF}' | '\u{E000}'..='\u{FFFD}' | '\u{10000}'..='\u{10FFFF}')
}

fn xml_escape(raw: &str) -> String {
    raw.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
