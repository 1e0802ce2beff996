//! The conversion facade.
//!
//! A [`Converter`] validates the declared source type, parses the input once
//! into a [`Tree`], and renders that tree as JSON, XML or YAML on demand.
//! Both the source type and the output format are closed enums dispatched by
//! exhaustive `match`, so adding a format is a compile error at every site
//! that needs to handle it.

pub mod report;

pub use report::{
    ConversionIssue, ConversionIssueCode, ConversionReport, ConversionSeverity, TreeCounts,
};

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::DataConverterError;
use crate::tree::{io_dict, io_json, io_xml, io_yaml, to_tree, Mapping, Number, Tree};

/// Declared type of the raw input.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DataType {
    Json,
    Xml,
    Dict,
    Yaml,
}

impl DataType {
    /// All supported input types.
    pub const ALL: [DataType; 4] = [DataType::Json, DataType::Xml, DataType::Dict, DataType::Yaml];

    /// Name used on the command line and in messages.
    pub fn name(&self) -> &'static str {
        match self {
            DataType::Json => "json",
            DataType::Xml => "xml",
            DataType::Dict => "dict",
            DataType::Yaml => "yaml",
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DataType {
    type Err = DataConverterError;

    /// Case-sensitive: `"JSON"` is not a supported type.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "json" => Ok(DataType::Json),
            "xml" => Ok(DataType::Xml),
            "dict" => Ok(DataType::Dict),
            "yaml" => Ok(DataType::Yaml),
            other => Err(DataConverterError::UnsupportedType(other.to_string())),
        }
    }
}

/// Format a tree can be rendered in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OutputFormat {
    Json,
    Xml,
    Yaml,
}

impl OutputFormat {
    pub const ALL: [OutputFormat; 3] = [OutputFormat::Json, OutputFormat::Xml, OutputFormat::Yaml];

    pub fn name(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Xml => "xml",
            OutputFormat::Yaml => "yaml",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for OutputFormat {
    type Err = DataConverterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "json" => Ok(OutputFormat::Json),
            "xml" => Ok(OutputFormat::Xml),
            "yaml" => Ok(OutputFormat::Yaml),
            other => Err(DataConverterError::UnsupportedOutput(other.to_string())),
        }
    }
}

/// Raw converter input: text for json/xml/yaml, a native mapping for dict.
#[derive(Clone, Debug, PartialEq)]
pub enum Data {
    Text(String),
    Dict(Tree),
}

impl Data {
    /// Builds dict input from any serializable value.
    ///
    /// Scalar map keys are coerced to strings; composite keys fail with a
    /// shape error. Whether the root is a mapping is checked when the
    /// converter is constructed.
    pub fn from_serialize<T: Serialize + ?Sized>(value: &T) -> Result<Data, DataConverterError> {
        to_tree(value)
            .map(Data::Dict)
            .map_err(|err| DataConverterError::shape(DataType::Dict, err.to_string()))
    }
}

impl From<&str> for Data {
    fn from(text: &str) -> Self {
        Data::Text(text.to_string())
    }
}

impl From<String> for Data {
    fn from(text: String) -> Self {
        Data::Text(text)
    }
}

impl From<Tree> for Data {
    fn from(tree: Tree) -> Self {
        Data::Dict(tree)
    }
}

impl From<Mapping> for Data {
    fn from(mapping: Mapping) -> Self {
        Data::Dict(Tree::Mapping(mapping))
    }
}

/// Converts one input between JSON, XML and YAML.
///
/// The input is parsed eagerly, so a constructed converter always holds a
/// complete tree and every `to_*` call reads the same immutable value.
///
/// # Example
///
/// ```
/// use dataconv::Converter;
///
/// let converter = Converter::new("name: John\nage: 30\n", "yaml").unwrap();
/// assert_eq!(converter.to_json().unwrap(), r#"{"name": "John", "age": 30}"#);
/// ```
#[derive(Clone, Debug)]
pub struct Converter {
    data_type: DataType,
    tree: Tree,
}

impl Converter {
    /// Validates `data_type` and parses `data` into a tree.
    ///
    /// # Errors
    /// Fails with an unsupported-type error before looking at `data` when
    /// `data_type` is not one of `json`, `xml`, `dict`, `yaml`; otherwise
    /// with a parse or shape error if `data` does not match its type.
    pub fn new(data: impl Into<Data>, data_type: &str) -> Result<Self, DataConverterError> {
        let data_type = data_type.parse::<DataType>()?;
        Self::with_type(data, data_type)
    }

    /// Like [`Converter::new`] with an already validated type.
    pub fn with_type(data: impl Into<Data>, data_type: DataType) -> Result<Self, DataConverterError> {
        let tree = parse(data.into(), data_type)?;
        Ok(Self { data_type, tree })
    }

    /// Builds a dict converter from any serializable value.
    pub fn from_serialize<T: Serialize + ?Sized>(value: &T) -> Result<Self, DataConverterError> {
        Self::with_type(Data::from_serialize(value)?, DataType::Dict)
    }

    pub fn data_type(&self) -> DataType {
        self.data_type
    }

    /// The parsed canonical tree.
    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    pub fn into_tree(self) -> Tree {
        self.tree
    }

    /// Single-line JSON, e.g. `{"name": "John", "age": 30}`.
    pub fn to_json(&self) -> Result<String, DataConverterError> {
        io_json::to_json_string(&self.tree)
    }

    /// Indented JSON.
    pub fn to_json_pretty(&self) -> Result<String, DataConverterError> {
        io_json::to_json_string_pretty(&self.tree)
    }

    /// XML document wrapped in `<root>`.
    pub fn to_xml(&self) -> Result<String, DataConverterError> {
        io_xml::to_xml_string(&self.tree)
    }

    /// XML document wrapped in `<root_tag>`.
    pub fn to_xml_with_root(&self, root_tag: &str) -> Result<String, DataConverterError> {
        io_xml::to_xml_string_with_root(&self.tree, root_tag)
    }

    /// Block-style YAML.
    pub fn to_yaml(&self) -> Result<String, DataConverterError> {
        io_yaml::to_yaml_string(&self.tree)
    }

    /// Renders the tree in `format`.
    pub fn convert(&self, format: OutputFormat) -> Result<String, DataConverterError> {
        match format {
            OutputFormat::Json => self.to_json(),
            OutputFormat::Xml => self.to_xml(),
            OutputFormat::Yaml => self.to_yaml(),
        }
    }

    /// Describes what rendering in `format` would not preserve.
    pub fn report(&self, format: OutputFormat) -> ConversionReport {
        build_conversion_report(&self.tree, self.data_type, format)
    }
}

fn parse(data: Data, data_type: DataType) -> Result<Tree, DataConverterError> {
    match (data_type, data) {
        (DataType::Json, Data::Text(text)) => io_json::from_json_str(&text),
        (DataType::Xml, Data::Text(text)) => io_xml::from_xml_str(&text),
        (DataType::Yaml, Data::Text(text)) => io_yaml::from_yaml_str(&text),
        (DataType::Dict, Data::Dict(tree)) => io_dict::from_dict(tree),
        (DataType::Dict, Data::Text(_)) => Err(DataConverterError::shape(
            DataType::Dict,
            "expected a native mapping, found text",
        )),
        (data_type @ (DataType::Json | DataType::Xml | DataType::Yaml), Data::Dict(_)) => {
            Err(DataConverterError::shape(
                data_type,
                "expected text, found a native mapping",
            ))
        }
    }
}

/// Converts XML text straight to single-line JSON.
pub fn xml_to_json(xml: &str) -> Result<String, DataConverterError> {
    io_json::to_json_string(&io_xml::from_xml_str(xml)?)
}

/// Converts JSON text straight to an XML document under `root_tag`.
pub fn json_to_xml(json: &str, root_tag: &str) -> Result<String, DataConverterError> {
    io_xml::to_xml_string_with_root(&io_json::from_json_str(json)?, root_tag)
}

/// Writes a dict as an XML document under `root_tag`.
pub fn dict_to_xml(dict: &Tree, root_tag: &str) -> Result<String, DataConverterError> {
    let dict = io_dict::from_dict(dict.clone())?;
    io_xml::to_xml_string_with_root(&dict, root_tag)
}

/// Parses YAML text into a tree.
pub fn yaml_to_tree(yaml: &str) -> Result<Tree, DataConverterError> {
    io_yaml::from_yaml_str(yaml)
}

/// Build a conversion report for rendering `tree`, read as `from`, in `to`.
///
/// This examines the tree to determine:
/// - node counts
/// - what will not survive the target format (warnings)
/// - which reader/writer policies apply (info notes)
pub fn build_conversion_report(tree: &Tree, from: DataType, to: OutputFormat) -> ConversionReport {
    let mut report = ConversionReport::new(from.name(), to.name());

    let mut stats = TreeStats::default();
    stats.visit(tree, Position::Root);
    report.input = TreeCounts {
        mappings: stats.mappings,
        sequences: stats.sequences,
        scalars: stats.scalars,
    };

    // Lossiness of the target format
    match to {
        OutputFormat::Xml => analyze_to_xml(tree, &stats, &mut report),
        OutputFormat::Json => analyze_to_json(&stats, &mut report),
        OutputFormat::Yaml => {}
    }

    // Policy notes for the source reader
    match from {
        DataType::Xml => add_xml_reader_policy(&mut report),
        DataType::Yaml => add_yaml_reader_policy(&mut report),
        DataType::Json | DataType::Dict => {}
    }

    if to == OutputFormat::Xml {
        add_xml_writer_policy(&mut report);
    }

    report
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Position {
    Root,
    Keyed,
    Item,
}

#[derive(Default)]
struct TreeStats {
    mappings: usize,
    sequences: usize,
    scalars: usize,
    typed_scalars: usize,
    nulls: usize,
    empty_mappings: usize,
    empty_keyed_sequences: usize,
    single_item_sequences: usize,
    nested_sequences: usize,
    untrimmed_strings: usize,
    lost_text_keys: usize,
    non_finite_numbers: usize,
}

impl TreeStats {
    fn visit(&mut self, tree: &Tree, position: Position) {
        match tree {
            Tree::Null => {
                self.scalars += 1;
                self.nulls += 1;
            }
            Tree::Bool(_) => {
                self.scalars += 1;
                self.typed_scalars += 1;
            }
            Tree::Number(number) => {
                self.scalars += 1;
                self.typed_scalars += 1;
                if let Number::Float(value) = number {
                    if !value.is_finite() {
                        self.non_finite_numbers += 1;
                    }
                }
            }
            Tree::String(s) => {
                self.scalars += 1;
                if s.trim() != s {
                    self.untrimmed_strings += 1;
                }
            }
            Tree::Sequence(items) => {
                self.sequences += 1;
                match position {
                    Position::Keyed if items.is_empty() => self.empty_keyed_sequences += 1,
                    Position::Keyed if items.len() == 1 => self.single_item_sequences += 1,
                    Position::Item => self.nested_sequences += 1,
                    _ => {}
                }
                for item in items {
                    self.visit(item, Position::Item);
                }
            }
            Tree::Mapping(mapping) => {
                self.mappings += 1;
                if mapping.is_empty() {
                    self.empty_mappings += 1;
                }
                if text_key_is_lost(mapping) {
                    self.lost_text_keys += 1;
                }
                for value in mapping.values() {
                    self.visit(value, Position::Keyed);
                }
            }
        }
    }
}

/// A `#text` entry reads back under its own key only next to attributes or
/// children, and only when it is not blank.
fn text_key_is_lost(mapping: &Mapping) -> bool {
    match mapping.get(io_xml::TEXT_KEY) {
        Some(text) => {
            mapping.len() == 1
                || text
                    .scalar_text()
                    .is_some_and(|text| text.trim().is_empty())
        }
        None => false,
    }
}

/// Analyze conversion to XML.
fn analyze_to_xml(tree: &Tree, stats: &TreeStats, report: &mut ConversionReport) {
    if !matches!(tree, Tree::Mapping(_)) {
        report.add(ConversionIssue::warning(
            ConversionIssueCode::XmlRootNotMapping,
            format!(
                "root is a {}, not a mapping; it will not read back with the same shape",
                tree.kind_name()
            ),
        ));
    }

    if stats.typed_scalars > 0 {
        report.add(ConversionIssue::warning(
            ConversionIssueCode::XmlScalarsBecomeText,
            format!(
                "{} number/boolean value(s) will be read back from XML as strings",
                stats.typed_scalars
            ),
        ));
    }

    if stats.nulls > 0 {
        report.add(ConversionIssue::warning(
            ConversionIssueCode::XmlNullBecomesEmpty,
            format!(
                "{} null value(s) will be written as empty elements",
                stats.nulls
            ),
        ));
    }

    if stats.empty_mappings > 0 {
        report.add(ConversionIssue::warning(
            ConversionIssueCode::XmlEmptyMappingBecomesEmpty,
            format!(
                "{} empty mapping(s) will be written as empty elements",
                stats.empty_mappings
            ),
        ));
    }

    if stats.empty_keyed_sequences > 0 {
        report.add(ConversionIssue::warning(
            ConversionIssueCode::XmlDropEmptySequences,
            format!(
                "{} empty sequence(s) will produce no elements and be dropped",
                stats.empty_keyed_sequences
            ),
        ));
    }

    if stats.single_item_sequences > 0 {
        report.add(ConversionIssue::warning(
            ConversionIssueCode::XmlSingleItemSequence,
            format!(
                "{} one-item sequence(s) will be read back as a single value",
                stats.single_item_sequences
            ),
        ));
    }

    if stats.nested_sequences > 0 {
        report.add(ConversionIssue::warning(
            ConversionIssueCode::XmlNestedSequenceItems,
            format!(
                "{} nested sequence(s) will be written as <{}> elements",
                stats.nested_sequences,
                io_xml::ITEM_TAG
            ),
        ));
    }

    if stats.lost_text_keys > 0 {
        report.add(ConversionIssue::warning(
            ConversionIssueCode::XmlTextKeyNotPreserved,
            format!(
                "{} '{}' entr(y/ies) will not read back under that key; a mapping holding \
                 only '{}' becomes plain text",
                stats.lost_text_keys,
                io_xml::TEXT_KEY,
                io_xml::TEXT_KEY
            ),
        ));
    }

    if stats.untrimmed_strings > 0 {
        report.add(ConversionIssue::warning(
            ConversionIssueCode::XmlWhitespaceTrimmed,
            format!(
                "{} string(s) with leading/trailing whitespace will be trimmed when read back",
                stats.untrimmed_strings
            ),
        ));
    }
}

/// Analyze conversion to JSON.
fn analyze_to_json(stats: &TreeStats, report: &mut ConversionReport) {
    if stats.non_finite_numbers > 0 {
        report.add(ConversionIssue::warning(
            ConversionIssueCode::JsonNonFiniteNumbers,
            format!(
                "{} NaN/infinite number(s) will be written as null",
                stats.non_finite_numbers
            ),
        ));
    }
}

/// Add policy notes for XML reader behavior.
fn add_xml_reader_policy(report: &mut ConversionReport) {
    report.add(ConversionIssue::info(
        ConversionIssueCode::XmlReaderFolding,
        format!(
            "XML reader unwraps the root element, keeps all text as strings, and folds \
             attributes into '{}name' keys",
            io_xml::ATTRIBUTE_PREFIX
        ),
    ));
}

/// Add policy notes for YAML reader behavior.
fn add_yaml_reader_policy(report: &mut ConversionReport) {
    report.add(ConversionIssue::info(
        ConversionIssueCode::YamlReaderKeyCoercion,
        "YAML reader coerces scalar mapping keys to strings and drops tags".to_string(),
    ));
}

/// Add policy notes for XML writer behavior.
fn add_xml_writer_policy(report: &mut ConversionReport) {
    report.add(ConversionIssue::info(
        ConversionIssueCode::XmlWriterRootTag,
        format!(
            "XML writer wraps output in <{}> unless another root tag is given",
            io_xml::DEFAULT_ROOT_TAG
        ),
    ));
}
