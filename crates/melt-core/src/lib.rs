//! MELT entity model and its conversion into OTLP protocol types.
//!
//! Callers describe telemetry as [`Entity`] values: attributes, relationships and any
//! number of metrics, logs and spans. The helpers in this crate turn the loosely typed
//! attribute bundles into OTLP key-values and attach relationships as a reserved
//! resource attribute.

mod convert;
mod error;
mod model;
mod value;

#[cfg(test)]
mod test_utils;

use std::path::Path;

use serde::Deserialize;

// Exposes the OTLP conversion helpers used by the exporter.
pub use convert::{
    add_relationships, add_relationships_to_metrics, instrumentation_scope,
    relationships_attribute, to_any_value, to_key_values, to_resource,
    KEY_ENTITY_RELATIONSHIPS, SCOPE_NAME, SCOPE_VERSION,
};
pub use error::Error;
pub use model::{
    AggregationTemporality, ContentType, DataPoint, Entity, Log, Metric, Relationship, Span,
    SpanEvent, SpanLink, SpanStatus, ValueType,
};
pub use value::{AttributeValue, Attributes};

/// Top level layout of a model file.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ModelFile {
    pub entities: Vec<Entity>,
}

/// Parses entities from a YAML (or JSON) document.
pub fn parse_entities(text: &str) -> Result<Vec<Entity>, Error> {
    let model: ModelFile = serde_yaml::from_str(text)?;
    Ok(model.entities)
}

/// Loads entities from a YAML (or JSON) model file.
pub fn load_entities(path: &Path) -> Result<Vec<Entity>, Error> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| Error::ModelFileError(path.display().to_string(), e))?;
    parse_entities(&text)
}
