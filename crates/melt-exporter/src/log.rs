//! Conversion of entity logs and events into OTLP log batches.
//!
//! OTLP does not distinguish events from logs. Events are log records tagged
//! with two reserved attributes.

use std::borrow::Cow;

use melt_core::{add_relationships, instrumentation_scope, to_key_values, to_resource, Entity, Log};
use opentelemetry_proto::tonic::{
    collector::logs::v1::ExportLogsServiceRequest,
    common::v1::{any_value::Value, AnyValue},
    logs::v1::{LogRecord, ResourceLogs, ScopeLogs},
};

/// Attribute marking a log record as an event.
pub const KEY_IS_EVENT: &str = "appd.isevent";
/// Attribute carrying the type of an event.
pub const KEY_EVENT_TYPE: &str = "appd.event.type";

/// Builds one `ResourceLogs` per entity that has logs.
pub fn build_logs_payload(entities: &[Entity]) -> ExportLogsServiceRequest {
    let resource_logs = entities
        .iter()
        .filter(|entity| !entity.logs.is_empty())
        .map(|entity| {
            let mut resource = to_resource(&entity.attributes);
            add_relationships(&entity.relationships, &mut resource);
            ResourceLogs {
                resource: Some(resource),
                scope_logs: vec![ScopeLogs {
                    scope: Some(instrumentation_scope()),
                    log_records: entity.logs.iter().map(create_otel_log).collect(),
                    ..Default::default()
                }],
                ..Default::default()
            }
        })
        .collect();
    ExportLogsServiceRequest { resource_logs }
}

/// Converts one log. Event tags are added to a copy of the attributes; the
/// caller's record is left untouched.
pub fn create_otel_log(l: &Log) -> LogRecord {
    let attributes = if l.is_event {
        let mut tagged = l.attributes.clone();
        tagged.insert(KEY_IS_EVENT.to_owned(), "true".into());
        tagged.insert(KEY_EVENT_TYPE.to_owned(), l.type_name.as_str().into());
        Cow::Owned(tagged)
    } else {
        Cow::Borrowed(&l.attributes)
    };
    LogRecord {
        time_unix_nano: l.timestamp,
        severity_text: l.severity.clone(),
        body: Some(AnyValue {
            value: Some(Value::StringValue(l.body.clone())),
        }),
        attributes: to_key_values(&attributes),
        ..Default::default()
    }
}
