//! Conversion of entity metrics into OTLP metric batches.

use melt_core::{
    add_relationships_to_metrics, instrumentation_scope, to_key_values, to_resource,
    AggregationTemporality, ContentType, Entity, ValueType,
};
use opentelemetry_proto::tonic::{
    collector::metrics::v1::ExportMetricsServiceRequest,
    metrics::v1::{
        metric::Data, number_data_point, Gauge, Metric, NumberDataPoint, ResourceMetrics,
        ScopeMetrics, Sum,
    },
};
use tracing::error;

/// Builds one `ResourceMetrics` per entity that has metrics.
///
/// Entities without metrics are skipped, so the request may be empty.
pub fn build_metrics_payload(entities: &[Entity]) -> ExportMetricsServiceRequest {
    let resource_metrics = entities
        .iter()
        .filter(|entity| !entity.metrics.is_empty())
        .map(|entity| {
            let mut rm = ResourceMetrics {
                resource: Some(to_resource(&entity.attributes)),
                ..Default::default()
            };
            add_relationships_to_metrics(&entity.relationships, &mut rm);
            rm.scope_metrics.push(ScopeMetrics {
                scope: Some(instrumentation_scope()),
                metrics: entity.metrics.iter().filter_map(create_otel_metric).collect(),
                ..Default::default()
            });
            rm
        })
        .collect();
    ExportMetricsServiceRequest { resource_metrics }
}

/// Converts one metric. Unsupported content types are logged and yield `None`.
pub fn create_otel_metric(m: &melt_core::Metric) -> Option<Metric> {
    let data = match &m.content_type {
        ContentType::Sum => Data::Sum(Sum {
            data_points: number_data_points(m),
            aggregation_temporality: otlp_temporality(m.aggregation_temporality),
            is_monotonic: m.is_monotonic,
        }),
        ContentType::Gauge => Data::Gauge(Gauge {
            data_points: number_data_points(m),
        }),
        ContentType::Unsupported(content_type) => {
            error!(content_type = %content_type, metric = %m.type_name, "unsupported metrics type");
            return None;
        }
    };
    Some(Metric {
        name: m.type_name.clone(),
        data: Some(data),
        ..Default::default()
    })
}

fn otlp_temporality(temporality: AggregationTemporality) -> i32 {
    use opentelemetry_proto::tonic::metrics::v1::AggregationTemporality as Otlp;
    match temporality {
        AggregationTemporality::Delta => Otlp::Delta as i32,
        AggregationTemporality::Cumulative => Otlp::Cumulative as i32,
        AggregationTemporality::Unspecified => Otlp::Unspecified as i32,
    }
}

fn number_data_points(m: &melt_core::Metric) -> Vec<NumberDataPoint> {
    let attributes = to_key_values(&m.attributes);
    m.data_points
        .iter()
        .map(|dp| NumberDataPoint {
            attributes: attributes.clone(),
            start_time_unix_nano: dp.start_time,
            time_unix_nano: dp.end_time,
            value: match m.value_type {
                // Truncates toward zero (saturating, NaN becomes 0).
                ValueType::Long => Some(number_data_point::Value::AsInt(dp.value as i64)),
                ValueType::Double => Some(number_data_point::Value::AsDouble(dp.value)),
                ValueType::Unsupported(_) => None,
            },
            ..Default::default()
        })
        .collect()
}
