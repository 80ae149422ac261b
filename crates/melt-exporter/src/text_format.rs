//! Protobuf text format for the OTLP messages the exporter builds.
//!
//! Fields are written in field-number order. Proto3 scalars holding their
//! default value are omitted, oneof members and `optional` scalars are written
//! whenever set, and enums are written by name.

use std::fmt::{Display, Write};

use opentelemetry_proto::tonic::{
    collector::{
        logs::v1::ExportLogsServiceRequest, metrics::v1::ExportMetricsServiceRequest,
        trace::v1::ExportTraceServiceRequest,
    },
    common::v1::{
        any_value, AnyValue, ArrayValue, EntityRef, InstrumentationScope, KeyValue, KeyValueList,
    },
    logs::v1::{LogRecord, ResourceLogs, ScopeLogs, SeverityNumber},
    metrics::v1::{
        exemplar, exponential_histogram_data_point::Buckets, metric::Data, number_data_point,
        summary_data_point::ValueAtQuantile, AggregationTemporality, Exemplar,
        ExponentialHistogram, ExponentialHistogramDataPoint, Gauge, Histogram,
        HistogramDataPoint, Metric, NumberDataPoint, ResourceMetrics, ScopeMetrics, Sum, Summary,
        SummaryDataPoint,
    },
    resource::v1::Resource,
    trace::v1::{span, status::StatusCode, ResourceSpans, ScopeSpans, Span, Status},
};

const INDENT: &str = "  ";

/// A message that can be written as protobuf text.
pub trait TextFormat {
    fn write_fields(&self, w: &mut TextWriter);
}

/// Renders `message` as protobuf text, one field per line when `multiline`,
/// otherwise on a single line.
pub fn to_text<M: TextFormat + ?Sized>(message: &M, multiline: bool) -> String {
    let mut w = TextWriter {
        out: String::new(),
        depth: 0,
        multiline,
    };
    message.write_fields(&mut w);
    if !multiline && w.out.ends_with(' ') {
        w.out.pop();
    }
    w.out
}

/// Accumulates text format output.
pub struct TextWriter {
    out: String,
    depth: usize,
    multiline: bool,
}

impl TextWriter {
    fn start(&mut self, name: &str) {
        if self.multiline {
            for _ in 0..self.depth {
                self.out.push_str(INDENT);
            }
        }
        self.out.push_str(name);
    }

    fn finish(&mut self) {
        self.out.push(if self.multiline { '\n' } else { ' ' });
    }

    fn raw(&mut self, name: &str, value: impl Display) {
        self.start(name);
        let _ = write!(self.out, ": {value}");
        self.finish();
    }

    /// Integer field, omitted when zero.
    pub fn number<T: Display + Default + PartialEq>(&mut self, name: &str, value: T) {
        if value != T::default() {
            self.raw(name, value);
        }
    }

    /// Integer oneof member or `optional` field, always written.
    pub fn number_value(&mut self, name: &str, value: impl Display) {
        self.raw(name, value);
    }

    pub fn double(&mut self, name: &str, value: f64) {
        if value != 0.0 {
            self.double_value(name, value);
        }
    }

    pub fn double_value(&mut self, name: &str, value: f64) {
        if value.is_nan() {
            self.raw(name, "nan");
        } else {
            self.raw(name, value);
        }
    }

    pub fn boolean(&mut self, name: &str, value: bool) {
        if value {
            self.raw(name, true);
        }
    }

    pub fn string(&mut self, name: &str, value: &str) {
        if !value.is_empty() {
            self.string_value(name, value);
        }
    }

    pub fn string_value(&mut self, name: &str, value: &str) {
        self.start(name);
        self.out.push_str(": \"");
        for c in value.chars() {
            match c {
                '"' => self.out.push_str("\\\""),
                '\\' => self.out.push_str("\\\\"),
                '\n' => self.out.push_str("\\n"),
                '\r' => self.out.push_str("\\r"),
                '\t' => self.out.push_str("\\t"),
                c if c.is_ascii_control() => {
                    let _ = write!(self.out, "\\{:03o}", c as u32);
                }
                c => self.out.push(c),
            }
        }
        self.out.push('"');
        self.finish();
    }

    pub fn bytes(&mut self, name: &str, value: &[u8]) {
        if !value.is_empty() {
            self.bytes_value(name, value);
        }
    }

    pub fn bytes_value(&mut self, name: &str, value: &[u8]) {
        self.start(name);
        self.out.push_str(": \"");
        for &b in value {
            match b {
                b'"' => self.out.push_str("\\\""),
                b'\\' => self.out.push_str("\\\\"),
                b'\n' => self.out.push_str("\\n"),
                b'\r' => self.out.push_str("\\r"),
                b'\t' => self.out.push_str("\\t"),
                0x20..=0x7e => self.out.push(b as char),
                _ => {
                    let _ = write!(self.out, "\\{b:03o}");
                }
            }
        }
        self.out.push('"');
        self.finish();
    }

    /// Enum field by name; values without a known name are written as numbers.
    pub fn enumeration(&mut self, name: &str, value: i32, label: Option<&str>) {
        match (value, label) {
            (0, _) => {}
            (_, Some(label)) => self.raw(name, label),
            (value, None) => self.raw(name, value),
        }
    }

    pub fn message<M: TextFormat + ?Sized>(&mut self, name: &str, message: &M) {
        self.start(name);
        self.out.push_str(" {");
        self.finish();
        self.depth += 1;
        message.write_fields(self);
        self.depth -= 1;
        self.start("}");
        self.finish();
    }

    pub fn optional<M: TextFormat>(&mut self, name: &str, message: &Option<M>) {
        if let Some(message) = message {
            self.message(name, message);
        }
    }

    pub fn repeated<M: TextFormat>(&mut self, name: &str, messages: &[M]) {
        for message in messages {
            self.message(name, message);
        }
    }
}

impl TextFormat for ExportMetricsServiceRequest {
    fn write_fields(&self, w: &mut TextWriter) {
        w.repeated("resource_metrics", &self.resource_metrics);
    }
}

impl TextFormat for ExportLogsServiceRequest {
    fn write_fields(&self, w: &mut TextWriter) {
        w.repeated("resource_logs", &self.resource_logs);
    }
}

impl TextFormat for ExportTraceServiceRequest {
    fn write_fields(&self, w: &mut TextWriter) {
        w.repeated("resource_spans", &self.resource_spans);
    }
}

impl TextFormat for Resource {
    fn write_fields(&self, w: &mut TextWriter) {
        w.repeated("attributes", &self.attributes);
        w.number("dropped_attributes_count", self.dropped_attributes_count);
        w.repeated("entity_refs", &self.entity_refs);
    }
}

impl TextFormat for EntityRef {
    fn write_fields(&self, w: &mut TextWriter) {
        w.string("schema_url", &self.schema_url);
        w.string("type", &self.r#type);
        for key in &self.id_keys {
            w.string_value("id_keys", key);
        }
        for key in &self.description_keys {
            w.string_value("description_keys", key);
        }
    }
}

impl TextFormat for InstrumentationScope {
    fn write_fields(&self, w: &mut TextWriter) {
        w.string("name", &self.name);
        w.string("version", &self.version);
        w.repeated("attributes", &self.attributes);
        w.number("dropped_attributes_count", self.dropped_attributes_count);
    }
}

impl TextFormat for KeyValue {
    fn write_fields(&self, w: &mut TextWriter) {
        w.string("key", &self.key);
        w.optional("value", &self.value);
    }
}

impl TextFormat for AnyValue {
    fn write_fields(&self, w: &mut TextWriter) {
        match &self.value {
            Some(any_value::Value::StringValue(v)) => w.string_value("string_value", v),
            Some(any_value::Value::BoolValue(v)) => w.number_value("bool_value", v),
            Some(any_value::Value::IntValue(v)) => w.number_value("int_value", v),
            Some(any_value::Value::DoubleValue(v)) => w.double_value("double_value", *v),
            Some(any_value::Value::ArrayValue(v)) => w.message("array_value", v),
            Some(any_value::Value::KvlistValue(v)) => w.message("kvlist_value", v),
            Some(any_value::Value::BytesValue(v)) => w.bytes_value("bytes_value", v),
            None => {}
        }
    }
}

impl TextFormat for ArrayValue {
    fn write_fields(&self, w: &mut TextWriter) {
        w.repeated("values", &self.values);
    }
}

impl TextFormat for KeyValueList {
    fn write_fields(&self, w: &mut TextWriter) {
        w.repeated("values", &self.values);
    }
}

impl TextFormat for ResourceMetrics {
    fn write_fields(&self, w: &mut TextWriter) {
        w.optional("resource", &self.resource);
        w.repeated("scope_metrics", &self.scope_metrics);
        w.string("schema_url", &self.schema_url);
    }
}

impl TextFormat for ScopeMetrics {
    fn write_fields(&self, w: &mut TextWriter) {
        w.optional("scope", &self.scope);
        w.repeated("metrics", &self.metrics);
        w.string("schema_url", &self.schema_url);
    }
}

impl TextFormat for Metric {
    fn write_fields(&self, w: &mut TextWriter) {
        w.string("name", &self.name);
        w.string("description", &self.description);
        w.string("unit", &self.unit);
        match &self.data {
            Some(Data::Gauge(gauge)) => w.message("gauge", gauge),
            Some(Data::Sum(sum)) => w.message("sum", sum),
            Some(Data::Histogram(histogram)) => w.message("histogram", histogram),
            Some(Data::ExponentialHistogram(histogram)) => {
                w.message("exponential_histogram", histogram)
            }
            Some(Data::Summary(summary)) => w.message("summary", summary),
            None => {}
        }
        w.repeated("metadata", &self.metadata);
    }
}

fn temporality(w: &mut TextWriter, value: i32) {
    let label = AggregationTemporality::try_from(value)
        .ok()
        .map(|t| t.as_str_name());
    w.enumeration("aggregation_temporality", value, label);
}

impl TextFormat for Gauge {
    fn write_fields(&self, w: &mut TextWriter) {
        w.repeated("data_points", &self.data_points);
    }
}

impl TextFormat for Sum {
    fn write_fields(&self, w: &mut TextWriter) {
        w.repeated("data_points", &self.data_points);
        temporality(w, self.aggregation_temporality);
        w.boolean("is_monotonic", self.is_monotonic);
    }
}

impl TextFormat for Histogram {
    fn write_fields(&self, w: &mut TextWriter) {
        w.repeated("data_points", &self.data_points);
        temporality(w, self.aggregation_temporality);
    }
}

impl TextFormat for ExponentialHistogram {
    fn write_fields(&self, w: &mut TextWriter) {
        w.repeated("data_points", &self.data_points);
        temporality(w, self.aggregation_temporality);
    }
}

impl TextFormat for Summary {
    fn write_fields(&self, w: &mut TextWriter) {
        w.repeated("data_points", &self.data_points);
    }
}

impl TextFormat for NumberDataPoint {
    fn write_fields(&self, w: &mut TextWriter) {
        w.number("start_time_unix_nano", self.start_time_unix_nano);
        w.number("time_unix_nano", self.time_unix_nano);
        if let Some(number_data_point::Value::AsDouble(v)) = &self.value {
            w.double_value("as_double", *v);
        }
        w.repeated("exemplars", &self.exemplars);
        if let Some(number_data_point::Value::AsInt(v)) = &self.value {
            w.number_value("as_int", v);
        }
        w.repeated("attributes", &self.attributes);
        w.number("flags", self.flags);
    }
}

impl TextFormat for Exemplar {
    fn write_fields(&self, w: &mut TextWriter) {
        w.number("time_unix_nano", self.time_unix_nano);
        if let Some(exemplar::Value::AsDouble(v)) = &self.value {
            w.double_value("as_double", *v);
        }
        w.bytes("span_id", &self.span_id);
        w.bytes("trace_id", &self.trace_id);
        if let Some(exemplar::Value::AsInt(v)) = &self.value {
            w.number_value("as_int", v);
        }
        w.repeated("filtered_attributes", &self.filtered_attributes);
    }
}

impl TextFormat for HistogramDataPoint {
    fn write_fields(&self, w: &mut TextWriter) {
        w.number("start_time_unix_nano", self.start_time_unix_nano);
        w.number("time_unix_nano", self.time_unix_nano);
        w.number("count", self.count);
        if let Some(sum) = self.sum {
            w.double_value("sum", sum);
        }
        for count in &self.bucket_counts {
            w.number_value("bucket_counts", count);
        }
        for bound in &self.explicit_bounds {
            w.double_value("explicit_bounds", *bound);
        }
        w.repeated("exemplars", &self.exemplars);
        w.repeated("attributes", &self.attributes);
        w.number("flags", self.flags);
        if let Some(min) = self.min {
            w.double_value("min", min);
        }
        if let Some(max) = self.max {
            w.double_value("max", max);
        }
    }
}

impl TextFormat for ExponentialHistogramDataPoint {
    fn write_fields(&self, w: &mut TextWriter) {
        w.repeated("attributes", &self.attributes);
        w.number("start_time_unix_nano", self.start_time_unix_nano);
        w.number("time_unix_nano", self.time_unix_nano);
        w.number("count", self.count);
        if let Some(sum) = self.sum {
            w.double_value("sum", sum);
        }
        w.number("scale", self.scale);
        w.number("zero_count", self.zero_count);
        w.optional("positive", &self.positive);
        w.optional("negative", &self.negative);
        w.number("flags", self.flags);
        w.repeated("exemplars", &self.exemplars);
        if let Some(min) = self.min {
            w.double_value("min", min);
        }
        if let Some(max) = self.max {
            w.double_value("max", max);
        }
        w.double("zero_threshold", self.zero_threshold);
    }
}

impl TextFormat for Buckets {
    fn write_fields(&self, w: &mut TextWriter) {
        w.number("offset", self.offset);
        for count in &self.bucket_counts {
            w.number_value("bucket_counts", count);
        }
    }
}

impl TextFormat for SummaryDataPoint {
    fn write_fields(&self, w: &mut TextWriter) {
        w.number("start_time_unix_nano", self.start_time_unix_nano);
        w.number("time_unix_nano", self.time_unix_nano);
        w.number("count", self.count);
        w.double("sum", self.sum);
        w.repeated("quantile_values", &self.quantile_values);
        w.repeated("attributes", &self.attributes);
        w.number("flags", self.flags);
    }
}

impl TextFormat for ValueAtQuantile {
    fn write_fields(&self, w: &mut TextWriter) {
        w.double("quantile", self.quantile);
        w.double("value", self.value);
    }
}

impl TextFormat for ResourceLogs {
    fn write_fields(&self, w: &mut TextWriter) {
        w.optional("resource", &self.resource);
        w.repeated("scope_logs", &self.scope_logs);
        w.string("schema_url", &self.schema_url);
    }
}

impl TextFormat for ScopeLogs {
    fn write_fields(&self, w: &mut TextWriter) {
        w.optional("scope", &self.scope);
        w.repeated("log_records", &self.log_records);
        w.string("schema_url", &self.schema_url);
    }
}

impl TextFormat for LogRecord {
    fn write_fields(&self, w: &mut TextWriter) {
        w.number("time_unix_nano", self.time_unix_nano);
        let severity = SeverityNumber::try_from(self.severity_number)
            .ok()
            .map(|s| s.as_str_name());
        w.enumeration("severity_number", self.severity_number, severity);
        w.string("severity_text", &self.severity_text);
        w.optional("body", &self.body);
        w.repeated("attributes", &self.attributes);
        w.number("dropped_attributes_count", self.dropped_attributes_count);
        w.number("flags", self.flags);
        w.bytes("trace_id", &self.trace_id);
        w.bytes("span_id", &self.span_id);
        w.number("observed_time_unix_nano", self.observed_time_unix_nano);
        w.string("event_name", &self.event_name);
    }
}

impl TextFormat for ResourceSpans {
    fn write_fields(&self, w: &mut TextWriter) {
        w.optional("resource", &self.resource);
        w.repeated("scope_spans", &self.scope_spans);
        w.string("schema_url", &self.schema_url);
    }
}

impl TextFormat for ScopeSpans {
    fn write_fields(&self, w: &mut TextWriter) {
        w.optional("scope", &self.scope);
        w.repeated("spans", &self.spans);
        w.string("schema_url", &self.schema_url);
    }
}

impl TextFormat for Span {
    fn write_fields(&self, w: &mut TextWriter) {
        w.bytes("trace_id", &self.trace_id);
        w.bytes("span_id", &self.span_id);
        w.string("trace_state", &self.trace_state);
        w.bytes("parent_span_id", &self.parent_span_id);
        w.string("name", &self.name);
        let kind = span::SpanKind::try_from(self.kind)
            .ok()
            .map(|k| k.as_str_name());
        w.enumeration("kind", self.kind, kind);
        w.number("start_time_unix_nano", self.start_time_unix_nano);
        w.number("end_time_unix_nano", self.end_time_unix_nano);
        w.repeated("attributes", &self.attributes);
        w.number("dropped_attributes_count", self.dropped_attributes_count);
        w.repeated("events", &self.events);
        w.number("dropped_events_count", self.dropped_events_count);
        w.repeated("links", &self.links);
        w.number("dropped_links_count", self.dropped_links_count);
        w.optional("status", &self.status);
        w.number("flags", self.flags);
    }
}

impl TextFormat for span::Event {
    fn write_fields(&self, w: &mut TextWriter) {
        w.number("time_unix_nano", self.time_unix_nano);
        w.string("name", &self.name);
        w.repeated("attributes", &self.attributes);
        w.number("dropped_attributes_count", self.dropped_attributes_count);
    }
}

impl TextFormat for span::Link {
    fn write_fields(&self, w: &mut TextWriter) {
        w.bytes("trace_id", &self.trace_id);
        w.bytes("span_id", &self.span_id);
        w.string("trace_state", &self.trace_state);
        w.repeated("attributes", &self.attributes);
        w.number("dropped_attributes_count", self.dropped_attributes_count);
        w.number("flags", self.flags);
    }
}

impl TextFormat for Status {
    fn write_fields(&self, w: &mut TextWriter) {
        w.string("message", &self.message);
        let code = StatusCode::try_from(self.code).ok().map(|c| c.as_str_name());
        w.enumeration("code", self.code, code);
    }
}
