//! Conversion of entity spans into OTLP trace batches.

use melt_core::{instrumentation_scope, to_key_values, to_resource, Entity, Span};
use opentelemetry_proto::tonic::{
    collector::trace::v1::ExportTraceServiceRequest,
    trace::v1::{span, ResourceSpans, ScopeSpans, Status},
};

/// Builds one `ResourceSpans` per entity that has spans.
///
/// Unlike metrics and logs, span resources do not carry the entity
/// relationships attribute.
pub fn build_spans_payload(entities: &[Entity]) -> ExportTraceServiceRequest {
    let resource_spans = entities
        .iter()
        .filter(|entity| !entity.spans.is_empty())
        .map(|entity| ResourceSpans {
            resource: Some(to_resource(&entity.attributes)),
            scope_spans: vec![ScopeSpans {
                scope: Some(instrumentation_scope()),
                spans: entity.spans.iter().map(create_otel_span).collect(),
                ..Default::default()
            }],
            ..Default::default()
        })
        .collect();
    ExportTraceServiceRequest { resource_spans }
}

/// Converts one span, keeping event and link order.
pub fn create_otel_span(s: &Span) -> opentelemetry_proto::tonic::trace::v1::Span {
    opentelemetry_proto::tonic::trace::v1::Span {
        name: s.name.clone(),
        trace_id: s.trace_id.clone(),
        span_id: s.span_id.clone(),
        parent_span_id: s.parent_span_id.clone(),
        trace_state: s.trace_state.clone(),
        kind: s.kind,
        start_time_unix_nano: s.start_time,
        end_time_unix_nano: s.end_time,
        attributes: to_key_values(&s.attributes),
        events: s
            .events
            .iter()
            .map(|e| span::Event {
                time_unix_nano: e.timestamp,
                name: e.name.clone(),
                attributes: to_key_values(&e.attributes),
                ..Default::default()
            })
            .collect(),
        links: s
            .links
            .iter()
            .map(|l| span::Link {
                trace_id: l.trace_id.clone(),
                span_id: l.span_id.clone(),
                trace_state: l.trace_state.clone(),
                attributes: to_key_values(&l.attributes),
                ..Default::default()
            })
            .collect(),
        status: s.status.as_ref().map(|status| Status {
            message: status.message.clone(),
            code: status.code,
        }),
        ..Default::default()
    }
}
