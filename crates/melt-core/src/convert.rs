//! Helpers that convert the loosely typed model into OTLP protocol types.

use opentelemetry_proto::tonic::{
    common::v1::{any_value::Value, AnyValue, ArrayValue, InstrumentationScope, KeyValue, KeyValueList},
    metrics::v1::ResourceMetrics,
    resource::v1::Resource,
};
use tracing::warn;

use crate::{
    model::Relationship,
    value::{AttributeValue, Attributes},
};

/// Resource attribute carrying an entity's relationships.
pub const KEY_ENTITY_RELATIONSHIPS: &str = "appd.fmm.entity.relations";
/// Name of the instrumentation scope attached to every exported block.
pub const SCOPE_NAME: &str = "sample-datagen";
/// Version of the instrumentation scope attached to every exported block.
pub const SCOPE_VERSION: &str = "0.0.1";

/// The instrumentation scope every scope block is reported under.
pub fn instrumentation_scope() -> InstrumentationScope {
    InstrumentationScope {
        name: SCOPE_NAME.to_owned(),
        version: SCOPE_VERSION.to_owned(),
        ..Default::default()
    }
}

/// Coerces an attribute bundle into OTLP key-values.
///
/// Unset values are dropped with a warning. This never fails.
pub fn to_key_values(attributes: &Attributes) -> Vec<KeyValue> {
    attributes
        .iter()
        .filter_map(|(key, value)| match to_any_value(value) {
            Some(value) => Some(KeyValue {
                key: key.clone(),
                value: Some(value),
            }),
            None => {
                warn!(key = %key, "Value not set for attribute");
                None
            }
        })
        .collect()
}

/// Converts a single attribute value. Returns `None` for unset values.
pub fn to_any_value(value: &AttributeValue) -> Option<AnyValue> {
    let value = match value {
        AttributeValue::Bool(v) => Value::BoolValue(*v),
        AttributeValue::Int(v) => Value::IntValue(*v),
        // Wraps for values >= 2^63.
        AttributeValue::Unsigned(v) => Value::IntValue(*v as i64),
        AttributeValue::Double(v) => Value::DoubleValue(*v),
        AttributeValue::String(v) | AttributeValue::Other(v) => Value::StringValue(v.clone()),
        AttributeValue::Null => return None,
    };
    Some(AnyValue { value: Some(value) })
}

/// Builds the reserved relationships attribute, or `None` without relationships.
pub fn relationships_attribute(relationships: &[Relationship]) -> Option<KeyValue> {
    if relationships.is_empty() {
        return None;
    }
    let values = relationships
        .iter()
        .map(|r| AnyValue {
            value: Some(Value::KvlistValue(KeyValueList {
                values: to_key_values(&r.attributes),
            })),
        })
        .collect();
    Some(KeyValue {
        key: KEY_ENTITY_RELATIONSHIPS.to_owned(),
        value: Some(AnyValue {
            value: Some(Value::ArrayValue(ArrayValue { values })),
        }),
    })
}

/// Appends the relationships attribute to a resource.
pub fn add_relationships(relationships: &[Relationship], resource: &mut Resource) {
    if let Some(kv) = relationships_attribute(relationships) {
        resource.attributes.push(kv);
    }
}

/// Appends the relationships attribute to the resource of a metrics block,
/// creating the resource if the block has none yet.
pub fn add_relationships_to_metrics(relationships: &[Relationship], rm: &mut ResourceMetrics) {
    if relationships.is_empty() {
        return;
    }
    add_relationships(relationships, rm.resource.get_or_insert_with(Resource::default));
}

/// Builds a resource from entity attributes, without relationships.
pub fn to_resource(attributes: &Attributes) -> Resource {
    Resource {
        attributes: to_key_values(attributes),
        ..Default::default()
    }
}
