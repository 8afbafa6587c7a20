#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

/// Derived per-user and per-basket count columns.
pub mod aggregates;
/// Command-line runners shared by the crate's binaries.
pub mod apps;
/// List-valued column codec for persisted evaluation scenarios.
pub mod codec;
/// Pipeline configuration types.
pub mod config;
/// Centralized constants: column names, raw field names, formats.
pub mod constants;
/// Columnar interaction and holdout tables.
pub mod data;
/// Raw log normalization into the canonical interaction stream.
pub mod ingestion;
/// Diagnostic column statistics.
pub mod metrics;
/// Identifier index and remapping.
pub mod remap;
/// Leave-last-k-out evaluation split.
pub mod splits;
/// Input/output transports (CSV on the filesystem).
pub mod transport;
/// Shared type aliases.
pub mod types;
/// Timestamp parsing and ordering helpers.
pub mod utils;

mod errors;

pub use codec::{EvaluationTable, ListCell, decode_list, encode_list};
pub use config::{InventorySchema, PrepConfig, PurchasesSchema};
pub use data::{
    HoldoutScenario, HoldoutTable, InteractionRecord, InteractionTable, ItemColumn,
};
pub use errors::PrepError;
pub use ingestion::{InventoryRow, PurchaseRow, get_transactions};
pub use remap::{IdentifierIndex, IdentifierRemapper};
pub use splits::EvaluationSplitter;
pub use transport::fs::get_evaluation_table;
pub use types::{ColumnName, ItemId, ItemIndex, Timestamp, UserId};
