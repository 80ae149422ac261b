//! Configuration for the MELT exporter.

use std::{fmt, str::FromStr, time::Duration};

/// Diagnostic rendering used when dumping payloads.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum DumpFormat {
    /// Pretty, multi-line rendering of the protobuf message.
    #[default]
    Human,
    /// Compact single-line rendering of the protobuf message.
    Text,
    /// Indented OTLP JSON.
    Json,
    Yaml,
    /// Hex dump of the protobuf wire bytes.
    Hex,
}

impl fmt::Display for DumpFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DumpFormat::Human => "human",
            DumpFormat::Text => "text",
            DumpFormat::Json => "json",
            DumpFormat::Yaml => "yaml",
            DumpFormat::Hex => "hex",
        })
    }
}

impl FromStr for DumpFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "human" => Ok(DumpFormat::Human),
            "text" => Ok(DumpFormat::Text),
            "json" => Ok(DumpFormat::Json),
            "yaml" => Ok(DumpFormat::Yaml),
            "hex" => Ok(DumpFormat::Hex),
            other => Err(format!("unknown dump format: {other}")),
        }
    }
}

/// Exporter behaviour.
#[derive(Debug, Clone)]
pub struct ExporterConfig {
    /// Only consulted when a dump function is installed.
    pub dump_format: DumpFormat,
    /// When set, payloads are built (and dumped) but never posted.
    pub dry_run: bool,
    /// Indent used by the JSON dump format.
    pub json_indent: String,
}

impl Default for ExporterConfig {
    fn default() -> Self {
        Self {
            dump_format: DumpFormat::default(),
            dry_run: false,
            json_indent: DEFAULT_JSON_INDENT.to_owned(),
        }
    }
}

const DEFAULT_JSON_INDENT: &str = "  ";
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Configuration of the reqwest-backed ingestion client.
#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// Tenant-scoped base URL; ingestion paths are appended to it.
    pub base_url: String,
    /// Bearer token sent with every request.
    pub token: Option<String>,
    pub timeout: Duration,
}

impl HttpConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            token: None,
            timeout: DEFAULT_HTTP_TIMEOUT,
        }
    }
}
