//! In-memory model of the telemetry a caller wants to ingest.
//!
//! An [`Entity`] is the unit of attribution: the resource every metric, log and
//! span it carries is reported against. Records keep the order in which they
//! were added.

use serde::{Deserialize, Deserializer};

use crate::value::{AttributeValue, Attributes};

/// A telemetry-producing entity and everything it reports.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Entity {
    pub attributes: Attributes,
    pub relationships: Vec<Relationship>,
    pub metrics: Vec<Metric>,
    pub logs: Vec<Log>,
    pub spans: Vec<Span>,
}

impl Entity {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<AttributeValue>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    pub fn with_relationship(mut self, relationship: Relationship) -> Self {
        self.relationships.push(relationship);
        self
    }

    pub fn add_metric(&mut self, metric: Metric) -> &mut Self {
        self.metrics.push(metric);
        self
    }

    pub fn add_log(&mut self, log: Log) -> &mut Self {
        self.logs.push(log);
        self
    }

    pub fn add_span(&mut self, span: Span) -> &mut Self {
        self.spans.push(span);
        self
    }
}

/// An edge between this entity and another one, described by attributes.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Relationship {
    pub attributes: Attributes,
}

impl Relationship {
    pub fn new(attributes: Attributes) -> Self {
        Self { attributes }
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<AttributeValue>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }
}

/// How a metric's data points are reported.
///
/// Unknown content types are kept so the exporter can report and drop them.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum ContentType {
    Sum,
    Gauge,
    Unsupported(String),
}

impl Default for ContentType {
    fn default() -> Self {
        ContentType::Unsupported(String::new())
    }
}

impl From<String> for ContentType {
    fn from(s: String) -> Self {
        match s.as_str() {
            "sum" => ContentType::Sum,
            "gauge" => ContentType::Gauge,
            _ => ContentType::Unsupported(s),
        }
    }
}

impl std::fmt::Display for ContentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ContentType::Sum => f.write_str("sum"),
            ContentType::Gauge => f.write_str("gauge"),
            ContentType::Unsupported(s) => f.write_str(s),
        }
    }
}

/// Numeric representation of a metric's data points on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum ValueType {
    Long,
    Double,
    /// Data points of an unknown type are emitted without a value.
    Unsupported(String),
}

impl Default for ValueType {
    fn default() -> Self {
        ValueType::Unsupported(String::new())
    }
}

impl From<String> for ValueType {
    fn from(s: String) -> Self {
        match s.as_str() {
            "long" => ValueType::Long,
            "double" => ValueType::Double,
            _ => ValueType::Unsupported(s),
        }
    }
}

/// Aggregation temporality of a sum. Anything unrecognised is unspecified.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum AggregationTemporality {
    #[default]
    Unspecified,
    Delta,
    Cumulative,
}

impl From<String> for AggregationTemporality {
    fn from(s: String) -> Self {
        match s.as_str() {
            "delta" => AggregationTemporality::Delta,
            "cumulative" => AggregationTemporality::Cumulative,
            _ => AggregationTemporality::Unspecified,
        }
    }
}

/// A metric and its ordered data points.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Metric {
    pub type_name: String,
    pub content_type: ContentType,
    #[serde(rename = "type")]
    pub value_type: ValueType,
    /// Only meaningful for sums.
    pub is_monotonic: bool,
    /// Only meaningful for sums.
    pub aggregation_temporality: AggregationTemporality,
    /// Applied to every data point.
    pub attributes: Attributes,
    pub data_points: Vec<DataPoint>,
}

impl Metric {
    pub fn sum(
        type_name: impl Into<String>,
        value_type: ValueType,
        is_monotonic: bool,
        aggregation_temporality: AggregationTemporality,
    ) -> Self {
        Self {
            type_name: type_name.into(),
            content_type: ContentType::Sum,
            value_type,
            is_monotonic,
            aggregation_temporality,
            ..Default::default()
        }
    }

    pub fn gauge(type_name: impl Into<String>, value_type: ValueType) -> Self {
        Self {
            type_name: type_name.into(),
            content_type: ContentType::Gauge,
            value_type,
            ..Default::default()
        }
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<AttributeValue>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    pub fn add_data_point(&mut self, start_time: u64, end_time: u64, value: f64) -> &mut Self {
        self.data_points.push(DataPoint {
            start_time,
            end_time,
            value,
        });
        self
    }
}

/// A single measurement. Times are nanoseconds since the unix epoch.
///
/// The value is always carried as a double; long metrics truncate it toward
/// zero when encoded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct DataPoint {
    pub start_time: u64,
    pub end_time: u64,
    pub value: f64,
}

/// A log record, or an event when `is_event` is set.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Log {
    pub type_name: String,
    pub body: String,
    /// Nanoseconds since the unix epoch.
    pub timestamp: u64,
    /// Empty means no severity.
    pub severity: String,
    pub attributes: Attributes,
    pub is_event: bool,
}

impl Log {
    pub fn new(body: impl Into<String>, timestamp: u64) -> Self {
        Self {
            body: body.into(),
            timestamp,
            ..Default::default()
        }
    }

    /// An event of the given type. Events travel as logs tagged with reserved attributes.
    pub fn event(type_name: impl Into<String>, body: impl Into<String>, timestamp: u64) -> Self {
        Self {
            type_name: type_name.into(),
            body: body.into(),
            timestamp,
            is_event: true,
            ..Default::default()
        }
    }

    pub fn with_severity(mut self, severity: impl Into<String>) -> Self {
        self.severity = severity.into();
        self
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<AttributeValue>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }
}

/// A span. Identifiers are opaque byte strings passed through unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Span {
    pub name: String,
    #[serde(deserialize_with = "bytes_from_str")]
    pub trace_id: Vec<u8>,
    #[serde(deserialize_with = "bytes_from_str")]
    pub span_id: Vec<u8>,
    #[serde(deserialize_with = "bytes_from_str")]
    pub parent_span_id: Vec<u8>,
    pub trace_state: String,
    /// Matches the OTLP `SpanKind` enum.
    pub kind: i32,
    pub start_time: u64,
    pub end_time: u64,
    pub attributes: Attributes,
    pub events: Vec<SpanEvent>,
    pub links: Vec<SpanLink>,
    pub status: Option<SpanStatus>,
}

impl Span {
    pub fn new(
        name: impl Into<String>,
        trace_id: impl Into<Vec<u8>>,
        span_id: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            name: name.into(),
            trace_id: trace_id.into(),
            span_id: span_id.into(),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct SpanEvent {
    pub timestamp: u64,
    pub name: String,
    pub attributes: Attributes,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct SpanLink {
    #[serde(deserialize_with = "bytes_from_str")]
    pub trace_id: Vec<u8>,
    #[serde(deserialize_with = "bytes_from_str")]
    pub span_id: Vec<u8>,
    pub trace_state: String,
    pub attributes: Attributes,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SpanStatus {
    /// Matches the OTLP `Status.StatusCode` enum.
    pub code: i32,
    pub message: String,
}

fn bytes_from_str<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
    Ok(String::deserialize(deserializer)?.into_bytes())
}
