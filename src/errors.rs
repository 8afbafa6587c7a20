use std::io;

use thiserror::Error;

use crate::types::ItemId;

/// Error type for ingestion, splitting, remapping, and codec failures.
///
/// Every variant carries the offending raw value so bad upstream data can be
/// located without re-running the pipeline.
#[derive(Debug, Error)]
pub enum PrepError {
    #[error("cannot parse timestamp '{value}': {reason}")]
    Parse { value: String, reason: String },
    #[error("malformed list cell '{value}': {reason}")]
    Format { value: String, reason: String },
    #[error("identifier '{identifier}' is missing from the identifier index")]
    Lookup { identifier: ItemId },
    #[error("schema error: {0}")]
    Schema(String),
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
