#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Spot data source definitions and record validation.
//!
//! Each data provider is described by a [`source_def::SourceDefinition`]
//! loaded from embedded TOML. The Overpass (OpenStreetMap) source fetches
//! live; conversational sources (Reddit, Instagram, tourism sites, forums)
//! ingest previously captured JSON batches — driving those websites is out
//! of scope here.

pub mod overpass;
pub mod progress;
pub mod registry;
pub mod source_def;
pub mod validate;

use std::path::PathBuf;

/// Errors that can occur during data source operations.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error (capture file read).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML config parsing failed.
    #[error("Config parse error: {0}")]
    Config(#[from] toml::de::Error),

    /// The provider returned an unusable payload.
    #[error("Malformed payload from {source_id}: {message}")]
    MalformedPayload {
        /// Which source produced the payload.
        source_id: String,
        /// Description of what went wrong.
        message: String,
    },
}

/// Configuration for fetching records from a source.
#[derive(Debug, Clone)]
pub struct FetchOptions {
    /// Maximum number of records to fetch (useful for testing).
    pub limit: Option<u64>,
    /// Directory where captured JSON batches live, one `{source_id}.json`
    /// file per conversational source.
    pub capture_dir: PathBuf,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            limit: None,
            capture_dir: PathBuf::from("captures"),
        }
    }
}
