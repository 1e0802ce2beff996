//! Conversion report types for tracking lossiness and policy decisions.
//!
//! A report lists what a conversion will not carry over faithfully (warnings)
//! and which fixed policies apply (notes), so callers can decide whether a
//! lossy conversion is acceptable.

use serde::Serialize;
use std::fmt;

/// A report generated for a conversion.
#[derive(Clone, Debug, Default, Serialize)]
pub struct ConversionReport {
    /// Source data type name.
    pub from: String,
    /// Target format name.
    pub to: String,
    /// Shape of the canonical tree being converted.
    pub input: TreeCounts,
    /// Issues discovered during conversion analysis.
    pub issues: Vec<ConversionIssue>,
}

impl ConversionReport {
    /// Create a new empty report for a conversion between formats.
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            ..Default::default()
        }
    }

    /// Add an issue to the report.
    pub fn add(&mut self, issue: ConversionIssue) {
        self.issues.push(issue);
    }

    /// Count of warning-level issues (true lossiness).
    pub fn warning_count(&self) -> usize {
        self.issues
            .iter()
            .filter(|i| i.severity == ConversionSeverity::Warning)
            .count()
    }

    /// Count of info-level issues (policy decisions, notes).
    pub fn info_count(&self) -> usize {
        self.issues
            .iter()
            .filter(|i| i.severity == ConversionSeverity::Info)
            .count()
    }

    /// Returns true if this conversion would lose information.
    pub fn is_lossy(&self) -> bool {
        self.warning_count() > 0
    }

    /// Iterate over warning messages.
    pub fn lossy_messages(&self) -> impl Iterator<Item = &str> {
        self.issues
            .iter()
            .filter(|i| i.severity == ConversionSeverity::Warning)
            .map(|i| i.message.as_str())
    }

    pub fn has_code(&self, code: ConversionIssueCode) -> bool {
        self.issues.iter().any(|i| i.code == code)
    }
}

impl fmt::Display for ConversionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Conversion: {} -> {}", self.from, self.to)?;
        writeln!(
            f,
            "  {} mappings, {} sequences, {} scalars",
            self.input.mappings, self.input.sequences, self.input.scalars
        )?;

        let warnings = self.warning_count();
        if warnings > 0 {
            writeln!(f)?;
            writeln!(f, "Warnings ({}):", warnings)?;
            for message in self.lossy_messages() {
                writeln!(f, "  - {}", message)?;
            }
        }

        let infos = self.info_count();
        if infos > 0 {
            writeln!(f)?;
            writeln!(f, "Notes ({}):", infos)?;
            for issue in self
                .issues
                .iter()
                .filter(|i| i.severity == ConversionSeverity::Info)
            {
                writeln!(f, "  - {}", issue.message)?;
            }
        }

        Ok(())
    }
}

/// Counts of tree nodes by kind.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct TreeCounts {
    pub mappings: usize,
    pub sequences: usize,
    pub scalars: usize,
}

/// A single issue discovered during conversion analysis.
#[derive(Clone, Debug, Serialize)]
pub struct ConversionIssue {
    pub severity: ConversionSeverity,
    pub code: ConversionIssueCode,
    pub message: String,
}

impl ConversionIssue {
    /// Create a warning-level issue (indicates lossiness).
    pub fn warning(code: ConversionIssueCode, message: impl Into<String>) -> Self {
        Self {
            severity: ConversionSeverity::Warning,
            code,
            message: message.into(),
        }
    }

    /// Create an info-level issue (policy note, does not block).
    pub fn info(code: ConversionIssueCode, message: impl Into<String>) -> Self {
        Self {
            severity: ConversionSeverity::Info,
            code,
            message: message.into(),
        }
    }
}

/// Severity level for conversion issues.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversionSeverity {
    /// A warning indicates information loss; fails the CLI under `--strict`.
    Warning,
    /// An info note describes policy decisions; does not block conversion.
    Info,
}

/// Stable issue codes for programmatic consumption.
///
/// These codes are part of the JSON report and should remain stable.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversionIssueCode {
    // Tree -> XML lossiness
    /// Numbers and booleans are written as text and read back as strings.
    XmlScalarsBecomeText,
    /// Nulls are written as empty elements and read back as empty strings.
    XmlNullBecomesEmpty,
    /// Empty mappings are written as empty elements.
    XmlEmptyMappingBecomesEmpty,
    /// Empty sequences under a key produce no elements at all.
    XmlDropEmptySequences,
    /// One-item sequences are read back as a single value.
    XmlSingleItemSequence,
    /// Sequences nested in sequences are written as `<item>` children.
    XmlNestedSequenceItems,
    /// The root is not a mapping and is wrapped as-is.
    XmlRootNotMapping,
    /// Leading/trailing whitespace in text is trimmed on read.
    XmlWhitespaceTrimmed,
    /// A `#text` entry with no siblings, or with blank text, is not read
    /// back under `#text`.
    XmlTextKeyNotPreserved,

    // Tree -> JSON lossiness
    /// NaN and infinite numbers are written as `null`.
    JsonNonFiniteNumbers,

    // Policy decisions (Info level)
    /// XML writer wraps output in a fixed root tag.
    XmlWriterRootTag,
    /// XML reader unwraps the root element and keeps text as strings.
    XmlReaderFolding,
    /// YAML reader coerces scalar keys to strings and drops tags.
    YamlReaderKeyCoercion,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_report_is_not_lossy() {
        let report = ConversionReport::new("json", "yaml");
        assert!(!report.is_lossy());
        assert_eq!(report.warning_count(), 0);
        assert_eq!(report.info_count(), 0);
    }

    #[test]
    fn warning_makes_report_lossy() {
        let mut report = ConversionReport::new("json", "xml");
        report.add(ConversionIssue::warning(
            ConversionIssueCode::XmlScalarsBecomeText,
            "1 number/boolean value(s) will be read back from XML as strings",
        ));
        assert!(report.is_lossy());
        assert_eq!(report.warning_count(), 1);
        assert!(report.has_code(ConversionIssueCode::XmlScalarsBecomeText));
    }

    #[test]
    fn info_does_not_make_report_lossy() {
        let mut report = ConversionReport::new("xml", "json");
        report.add(ConversionIssue::info(
            ConversionIssueCode::XmlReaderFolding,
            "XML text is kept as strings",
        ));
        assert!(!report.is_lossy());
        assert_eq!(report.info_count(), 1);
    }

    #[test]
    fn display_lists_warnings_and_notes() {
        let mut report = ConversionReport::new("json", "xml");
        report.add(ConversionIssue::warning(
            ConversionIssueCode::XmlNullBecomesEmpty,
            "2 null value(s) will be read back from XML as empty strings",
        ));
        report.add(ConversionIssue::info(
            ConversionIssueCode::XmlWriterRootTag,
            "XML output is wrapped in <root>",
        ));

        let text = report.to_string();
        assert!(text.starts_with("Conversion: json -> xml\n"));
        assert!(text.contains("Warnings (1):\n  - 2 null value(s)"));
        assert!(text.contains("Notes (1):\n  - XML output is wrapped in <root>"));
    }

    #[test]
    fn report_serializes_to_json() {
        let mut report = ConversionReport::new("yaml", "xml");
        report.input = TreeCounts {
            mappings: 2,
            sequences: 1,
            scalars: 5,
        };
        report.add(ConversionIssue::warning(
            ConversionIssueCode::XmlDropEmptySequences,
            "1 empty sequence(s) will be dropped",
        ));

        let json = serde_json::to_string(&report).unwrap();
        assert!(json.contains("\"from\":\"yaml\""));
        assert!(json.contains("\"severity\":\"warning\""));
        assert!(json.contains("\"code\":\"xml_drop_empty_sequences\""));
    }
}
