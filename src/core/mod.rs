//! Output layer for parsed chats.
//!
//! - [`models`] - [`OutputConfig`], which messages and fields to write
//! - [`output`] - Format writers (CSV, JSON, JSONL)

pub mod models;
pub mod output;

pub use models::OutputConfig;

// Conditionally re-export output writers
#[cfg(feature = "csv-output")]
pub use output::{to_csv, write_csv};
#[cfg(feature = "json-output")]
pub use output::{to_json, to_jsonl, write_json, write_jsonl};
