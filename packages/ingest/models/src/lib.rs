#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Result and report types for the pipeline passes.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Result of syncing one source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncSummary {
    /// Source identifier.
    pub source_id: String,
    /// Records fetched from the provider.
    pub fetched: u64,
    /// Newly inserted rows.
    pub inserted: u64,
    /// Existing rows whose mention count was bumped.
    pub duplicates: u64,
    /// Records rejected by validation.
    pub rejected: u64,
    /// How long the sync took.
    pub duration: Duration,
}

/// Result of the relevance scoring pass.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScoreSummary {
    /// Spots scored.
    pub scored: u64,
    /// Spots in the high tier (score >= 5).
    pub high: u64,
    /// Spots in the medium tier (score 3-4).
    pub medium: u64,
    /// Spots in the low tier (score < 3).
    pub low: u64,
    /// Low-tier spots deleted by the prune step, when enabled.
    pub pruned: u64,
}

/// Result of the standardization / deduplication pass.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StandardizeSummary {
    /// Spots whose name/confidence were standardized.
    pub standardized: u64,
    /// Candidate duplicate pairs found.
    pub duplicate_pairs: u64,
    /// Pairs successfully merged.
    pub merged: u64,
    /// Pairs skipped because a member disappeared or a statement failed.
    pub merge_errors: u64,
}

/// Result of the geocoding pass.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeocodeSummary {
    /// Spots that were missing coordinates.
    pub candidates: u64,
    /// Spots for which a lookup was attempted.
    pub attempted: u64,
    /// Spots that received coordinates.
    pub geocoded: u64,
}

/// Catalog statistics for the report command.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogReport {
    /// Total spots in the store.
    pub total: u64,
    /// Spots with both coordinates.
    pub with_coordinates: u64,
    /// Spots flagged as hidden.
    pub hidden: u64,
    /// Counts per location type, descending.
    pub by_location_type: Vec<(String, u64)>,
    /// Counts per source tag, descending.
    pub by_source: Vec<(String, u64)>,
    /// Scored-spot tier counts: high, medium, low.
    pub tiers: TierCounts,
}

/// Relevance tier distribution among scored spots.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct TierCounts {
    /// Score >= 5.
    pub high: u64,
    /// Score 3-4.
    pub medium: u64,
    /// Score < 3.
    pub low: u64,
    /// Spots with no relevance score.
    pub unscored: u64,
}
