//! Errors for this crate.

use thiserror::Error;

use crate::{config::DumpFormat, transport::HttpStatusError};

/// An error exporting MELT data.
#[derive(Error, Debug)]
pub enum Error {
    #[error("failed to marshal MELT data: {0}")]
    MarshalError(#[from] prost::EncodeError),
    #[error("unable to marshal MELT data to {0} format: {1}")]
    DumpError(DumpFormat, String),
    /// The ingestion endpoint answered with a non-success status.
    #[error(transparent)]
    HttpStatusError(#[from] HttpStatusError),
    /// Network, TLS or DNS failure talking to the ingestion endpoint.
    #[error(transparent)]
    TransportError(#[from] reqwest::Error),
    #[error(transparent)]
    ModelError(#[from] melt_core::Error),
    #[error(transparent)]
    ArgumentError(#[from] clap::Error),
}
