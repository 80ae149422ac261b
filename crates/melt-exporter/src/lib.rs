//! Exporter turning MELT entities into OTLP payloads for a tenant ingestion endpoint.
//!
//! Each export call builds an OTLP request from the caller's entities, encodes it
//! as protobuf, optionally dumps it in a diagnostic format and, unless running
//! dry, posts it once to `data/v1/<kind>`. There is no batching or retrying;
//! the exporter only holds its configuration between calls.

mod config;
mod dump;
mod error;
pub mod log;
pub mod metric;
mod text_format;
/// Span conversion.
pub mod trace;
pub mod transport;

#[cfg(test)]
mod test_utils;

pub use config::{DumpFormat, ExporterConfig, HttpConfig};
pub use dump::{hex_dump, render_payload};
pub use error::Error;
use melt_core::Entity;
use prost::Message;
use serde::Serialize;
use tracing::{debug, info};
pub use text_format::{to_text, TextFormat, TextWriter};
pub use transport::{
    hint_about_permissions, AuthContext, HttpPost, HttpStatusError, PostOptions, ReqwestPost,
    AUTH_METHOD_AGENT_PRINCIPAL,
};

use crate::{log::build_logs_payload, metric::build_metrics_payload, trace::build_spans_payload};

const PATH_METRICS: &str = "metrics";
const PATH_LOGS: &str = "logs";
const PATH_SPANS: &str = "trace";
const API_PATH_PREFIX: &str = "data/v1/";

/// Receives rendered dumps.
pub type DumpFn = Box<dyn Fn(&str) + Send + Sync>;

/// Outcome of an export call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportStatus {
    /// No entity carried telemetry of the exported kind; nothing was posted.
    NothingToSend,
    /// The payload was built (and dumped, if configured) but not posted.
    DryRun,
    /// The payload was accepted by the endpoint.
    Sent { trace_response: Option<String> },
}

/// Exporter for entity metrics, logs, events and spans.
pub struct Exporter<P, A> {
    config: ExporterConfig,
    dump_fn: Option<DumpFn>,
    poster: P,
    auth: A,
}

impl<P: HttpPost, A: AuthContext> Exporter<P, A> {
    /// Creates an exporter posting through `poster`. `auth` is only consulted
    /// to explain permission failures.
    pub fn new(config: ExporterConfig, poster: P, auth: A) -> Self {
        Self {
            config,
            dump_fn: None,
            poster,
            auth,
        }
    }

    /// Installs a callback receiving every payload rendered in the configured
    /// dump format.
    pub fn with_dump_fn(mut self, dump_fn: impl Fn(&str) + Send + Sync + 'static) -> Self {
        self.dump_fn = Some(Box::new(dump_fn));
        self
    }

    pub fn config(&self) -> &ExporterConfig {
        &self.config
    }

    /// Exports the metrics of all entities.
    pub async fn export_metrics(&self, entities: &[Entity]) -> Result<ExportStatus, Error> {
        let request = build_metrics_payload(entities);
        if request.resource_metrics.is_empty() {
            info!("No metrics to send");
            return Ok(ExportStatus::NothingToSend);
        }
        self.export_http(PATH_METRICS, &request).await
    }

    /// Exports the logs of all entities, events included.
    pub async fn export_logs(&self, entities: &[Entity]) -> Result<ExportStatus, Error> {
        let request = build_logs_payload(entities);
        if request.resource_logs.is_empty() {
            info!("No logs to send");
            return Ok(ExportStatus::NothingToSend);
        }
        self.export_http(PATH_LOGS, &request).await
    }

    /// Events travel on the logs wire; this is the same as [`Self::export_logs`].
    pub async fn export_events(&self, entities: &[Entity]) -> Result<ExportStatus, Error> {
        self.export_logs(entities).await
    }

    /// Exports the spans of all entities.
    pub async fn export_spans(&self, entities: &[Entity]) -> Result<ExportStatus, Error> {
        let request = build_spans_payload(entities);
        if request.resource_spans.is_empty() {
            info!("No spans to send");
            return Ok(ExportStatus::NothingToSend);
        }
        self.export_http(PATH_SPANS, &request).await
    }

    async fn export_http<M>(&self, path: &str, message: &M) -> Result<ExportStatus, Error>
    where
        M: Message + Serialize + TextFormat,
    {
        if tracing::enabled!(tracing::Level::DEBUG) {
            if let Ok(json) = serde_json::to_string(message) {
                debug!(kind = path, payload = %json, "Built MELT payload");
            }
        }

        let mut options = PostOptions::protobuf();
        let mut data = Vec::with_capacity(message.encoded_len());
        message.encode(&mut data)?;

        // Dump only what would actually be sent.
        if let Some(dump_fn) = &self.dump_fn {
            let rendered = render_payload(
                message,
                &data,
                self.config.dump_format,
                &self.config.json_indent,
            )?;
            dump_fn(&rendered);
        }

        if self.config.dry_run {
            return Ok(ExportStatus::DryRun);
        }

        let api_path = format!("{API_PATH_PREFIX}{path}");
        if let Err(e) = self.poster.post(&api_path, data, &mut options).await {
            hint_about_permissions(&e, &self.auth);
            return Err(e);
        }

        let trace_response = options.trace_response();
        info!(
            kind = path,
            path = %api_path,
            trace_response = trace_response.as_deref().unwrap_or_default(),
            "Sent MELT data"
        );
        Ok(ExportStatus::Sent { trace_response })
    }
}
