//! Dataconv: convert data between JSON, XML, YAML and native mappings.
//!
//! Every input is parsed once into a canonical [`Tree`] (scalars, ordered
//! sequences and ordered mappings), and every output is rendered from that
//! tree. Four readers and three writers give all twelve conversions.
//!
//! # Modules
//!
//! - [`tree`]: The canonical tree and the per-format readers/writers
//! - [`conversion`]: The [`Converter`] facade and lossiness reports
//! - [`error`]: Error types for dataconv operations
//!
//! # Example
//!
//! ```
//! use dataconv::Converter;
//!
//! let converter = Converter::new("<person><name>John</name><age>30</age></person>", "xml").unwrap();
//! assert_eq!(converter.to_json().unwrap(), r#"{"name": "John", "age": "30"}"#);
//! ```

pub mod conversion;
pub mod error;
pub mod tree;

use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

pub use conversion::{Converter, Data, DataType, OutputFormat};
pub use error::{DataConverterError, ErrorKind};
pub use tree::{Mapping, Number, Tree};

/// The dataconv CLI application.
#[derive(Parser)]
#[command(name = "dataconv")]
#[command(version, author, about)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Convert a document from one format to another.
    Convert(ConvertArgs),
}

/// Source formats accepted on the command line.
///
/// `dict` has no textual form, so it is library-only.
#[derive(Clone, Copy, Debug, ValueEnum)]
enum SourceFormat {
    Json,
    Xml,
    Yaml,
}

impl From<SourceFormat> for DataType {
    fn from(format: SourceFormat) -> Self {
        match format {
            SourceFormat::Json => DataType::Json,
            SourceFormat::Xml => DataType::Xml,
            SourceFormat::Yaml => DataType::Yaml,
        }
    }
}

/// Target formats accepted on the command line.
#[derive(Clone, Copy, Debug, ValueEnum)]
enum TargetFormat {
    Json,
    Xml,
    Yaml,
}

impl From<TargetFormat> for OutputFormat {
    fn from(format: TargetFormat) -> Self {
        match format {
            TargetFormat::Json => OutputFormat::Json,
            TargetFormat::Xml => OutputFormat::Xml,
            TargetFormat::Yaml => OutputFormat::Yaml,
        }
    }
}

/// How to print the conversion report.
#[derive(Clone, Copy, Debug, ValueEnum)]
enum ReportFormat {
    Text,
    Json,
}

/// Arguments for the convert subcommand.
#[derive(clap::Args)]
struct ConvertArgs {
    /// Input file (reads stdin when omitted or '-').
    input: Option<PathBuf>,

    /// Input format.
    #[arg(long, short = 'f', value_enum)]
    from: SourceFormat,

    /// Output format.
    #[arg(long, short = 't', value_enum)]
    to: TargetFormat,

    /// Output file (writes stdout when omitted).
    #[arg(long, short = 'o')]
    output: Option<PathBuf>,

    /// Indent JSON output.
    #[arg(long)]
    pretty: bool,

    /// Root element name for XML output.
    #[arg(long, default_value = tree::io_xml::DEFAULT_ROOT_TAG)]
    root_tag: String,

    /// Print the full conversion report to stderr.
    #[arg(long, value_enum)]
    report: Option<ReportFormat>,

    /// Fail instead of warning when the conversion is lossy.
    #[arg(long)]
    strict: bool,
}

/// Run the dataconv CLI.
///
/// This is the main entry point for the CLI, called from `main.rs`.
pub fn run() -> Result<(), DataConverterError> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Convert(args)) => run_convert(args),
        None => {
            // No subcommand: print a short banner and exit successfully
            println!("dataconv {}", env!("CARGO_PKG_VERSION"));
            println!();
            println!("Convert data between JSON, XML and YAML.");
            println!();
            println!("Run 'dataconv --help' for usage information.");
            Ok(())
        }
    }
}

/// Execute the convert subcommand.
fn run_convert(args: ConvertArgs) -> Result<(), DataConverterError> {
    let input = read_input(args.input.as_ref())?;
    let converter = Converter::with_type(input, args.from.into())?;
    let target = OutputFormat::from(args.to);

    let report = converter.report(target);
    match args.report {
        Some(ReportFormat::Json) => {
            let json = serde_json::to_string_pretty(&report)
                .map_err(|source| DataConverterError::JsonWrite { source })?;
            eprintln!("{json}");
        }
        Some(ReportFormat::Text) => eprint!("{report}"),
        None => {
            for message in report.lossy_messages() {
                eprintln!("Warning: {message}");
            }
        }
    }

    if args.strict && report.is_lossy() {
        return Err(DataConverterError::LossyConversion {
            from: report.from.clone(),
            to: report.to.clone(),
            warning_count: report.warning_count(),
        });
    }

    let mut rendered = match target {
        OutputFormat::Json if args.pretty => converter.to_json_pretty()?,
        OutputFormat::Json => converter.to_json()?,
        OutputFormat::Xml => converter.to_xml_with_root(&args.root_tag)?,
        OutputFormat::Yaml => converter.to_yaml()?,
    };
    if !rendered.ends_with('\n') {
        rendered.push('\n');
    }

    match args.output {
        Some(path) => fs::write(path, rendered)?,
        None => io::stdout().write_all(rendered.as_bytes())?,
    }

    Ok(())
}

fn read_input(path: Option<&PathBuf>) -> Result<String, DataConverterError> {
    match path {
        Some(path) if path.as_os_str() != "-" => Ok(fs::read_to_string(path)?),
        _ => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
    }
}
