use thiserror::Error;

use crate::conversion::DataType;

/// The main error type for dataconv operations.
///
/// Every failure surfaces as this one type; use [`DataConverterError::kind`]
/// to tell an unsupported type apart from malformed input or a shape
/// mismatch.
#[derive(Debug, Error)]
pub enum DataConverterError {
    #[error("Unsupported data type: '{0}' (supported: json, xml, dict, yaml)")]
    UnsupportedType(String),

    #[error("Unsupported output format: '{0}' (supported: json, xml, yaml)")]
    UnsupportedOutput(String),

    #[error("Failed to parse JSON input: {source}")]
    JsonParse {
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to parse YAML input: {source}")]
    YamlParse {
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Failed to parse XML input: {message}")]
    XmlParse { message: String },

    #[error("Invalid {data_type} input: {message}")]
    Shape { data_type: DataType, message: String },

    #[error("Failed to write JSON output: {source}")]
    JsonWrite {
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to write YAML output: {source}")]
    YamlWrite {
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Failed to write XML output: {message}")]
    XmlWrite { message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Conversion from {from} to {to} is lossy ({warning_count} warning(s)); rerun without --strict to accept")]
    LossyConversion {
        from: String,
        to: String,
        warning_count: usize,
    },
}

/// Broad classification of a [`DataConverterError`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// The declared data type is not one of json, xml, dict, yaml.
    UnsupportedType,
    /// The input text does not follow the grammar of its declared type.
    Parse,
    /// The input parsed, but its structure cannot be used as declared.
    Shape,
    /// The canonical tree could not be rendered in the requested format.
    Serialize,
    /// Reading or writing a file or stream failed (CLI only).
    Io,
    /// A strict conversion refused to lose information (CLI `--strict`).
    Lossy,
}

impl DataConverterError {
    /// Which part of the taxonomy this error belongs to.
    pub fn kind(&self) -> ErrorKind {
        match self {
            DataConverterError::UnsupportedType(_) | DataConverterError::UnsupportedOutput(_) => {
                ErrorKind::UnsupportedType
            }
            DataConverterError::JsonParse { .. }
            | DataConverterError::YamlParse { .. }
            | DataConverterError::XmlParse { .. } => ErrorKind::Parse,
            DataConverterError::Shape { .. } => ErrorKind::Shape,
            DataConverterError::LossyConversion { .. } => ErrorKind::Lossy,
            DataConverterError::JsonWrite { .. }
            | DataConverterError::YamlWrite { .. }
            | DataConverterError::XmlWrite { .. } => ErrorKind::Serialize,
            DataConverterError::Io(_) => ErrorKind::Io,
        }
    }

    pub(crate) fn shape(data_type: DataType, message: impl Into<String>) -> Self {
        DataConverterError::Shape {
            data_type,
            message: message.into(),
        }
    }
}
