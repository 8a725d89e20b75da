//! Config-driven spot data source definition.
//!
//! [`SourceDefinition`] captures everything unique about a data source in a
//! serializable config struct: the Overpass categories for the OSM bulk
//! import, or the subreddits/hashtags/seed URLs a conversational capture
//! was built from. A single generic implementation handles all sources.

use std::path::Path;

use serde::Deserialize;
use spot_map_source_models::{RawSpot, SourceKind};
use spot_map_spot_models::{Activity, LocationType};

use crate::{FetchOptions, SourceError, overpass};

/// A complete, config-driven spot data source definition.
///
/// Loaded from TOML files embedded at compile time.
#[derive(Debug, Deserialize)]
pub struct SourceDefinition {
    /// Unique identifier (e.g. `"osm"`, `"reddit"`).
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Which family this source belongs to.
    pub kind: SourceKind,
    /// How to obtain raw records.
    pub fetcher: FetcherConfig,
}

/// How raw records are obtained for a source.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FetcherConfig {
    /// Live Overpass API queries, one per feature category.
    Overpass {
        /// Overpass interpreter endpoint.
        api_url: String,
        /// Bounding box as `south,west,north,east`.
        bbox: String,
        /// Feature categories to query.
        categories: Vec<OverpassCategory>,
    },
    /// Reddit subreddit/search-term capture, ingested from a JSON batch.
    RedditSearch {
        /// Subreddits the capture was built from.
        subreddits: Vec<String>,
        /// Search terms the capture was built from.
        search_terms: Vec<String>,
    },
    /// Instagram hashtag capture, ingested from a JSON batch.
    InstagramHashtags {
        /// Hashtags the capture was built from.
        hashtags: Vec<String>,
    },
    /// Tourism/forum sites, ingested from a JSON batch.
    WebSeeds {
        /// Seed URLs the capture was built from.
        seed_urls: Vec<String>,
    },
}

/// One Overpass feature category (waterfalls, caves, ...).
#[derive(Debug, Clone, Deserialize)]
pub struct OverpassCategory {
    /// Category identifier; the source tag becomes `osm_{id}`.
    pub id: String,
    /// Location type assigned to records from this category.
    pub location_type: LocationType,
    /// Base activities for this category.
    pub activities: Vec<Activity>,
    /// Name prefix for unnamed features. When absent, unnamed features
    /// are skipped.
    pub auto_name_prefix: Option<String>,
    /// Overpass QL query with a `{bbox}` placeholder.
    pub query: String,
}

/// Parses a TOML source definition.
///
/// # Errors
///
/// Returns [`SourceError::Config`] if the TOML is malformed.
pub fn parse_source_toml(raw: &str) -> Result<SourceDefinition, SourceError> {
    Ok(toml::from_str(raw)?)
}

impl SourceDefinition {
    /// Fetches raw records for this source.
    ///
    /// Overpass sources query the live API; all other kinds read a
    /// previously captured JSON batch from
    /// `{capture_dir}/{id}.json`. A missing capture file is not an error —
    /// the source simply yields nothing.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] if the fetch or parse fails.
    pub async fn fetch(&self, options: &FetchOptions) -> Result<Vec<RawSpot>, SourceError> {
        match &self.fetcher {
            FetcherConfig::Overpass {
                api_url,
                bbox,
                categories,
            } => overpass::fetch_overpass(api_url, bbox, categories, options.limit).await,
            FetcherConfig::RedditSearch { .. }
            | FetcherConfig::InstagramHashtags { .. }
            | FetcherConfig::WebSeeds { .. } => {
                self.fetch_captured(&options.capture_dir, options.limit)
            }
        }
    }

    fn fetch_captured(
        &self,
        capture_dir: &Path,
        limit: Option<u64>,
    ) -> Result<Vec<RawSpot>, SourceError> {
        let path = capture_dir.join(format!("{}.json", self.id));
        if !path.exists() {
            log::info!("No capture file for source '{}' at {path:?}", self.id);
            return Ok(Vec::new());
        }

        let raw = std::fs::read_to_string(&path)?;
        let mut records: Vec<RawSpot> = serde_json::from_str(&raw)?;

        for record in &mut records {
            if record.source.is_empty() {
                record.source.clone_from(&self.id);
            }
        }

        if let Some(limit) = limit {
            records.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
        }

        log::info!(
            "Loaded {} captured record(s) for source '{}'",
            records.len(),
            self.id
        );
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_overpass_definition() {
        let def = parse_source_toml(
            r#"
            id = "osm"
            name = "OpenStreetMap"
            kind = "osm"

            [fetcher]
            type = "overpass"
            api_url = "https://overpass-api.de/api/interpreter"
            bbox = "42.5,0.5,44.5,2.5"

            [[fetcher.categories]]
            id = "waterfalls"
            location_type = "water"
            activities = ["swimming", "hiking"]
            auto_name_prefix = "Cascade non nommée"
            query = "node[waterway=waterfall]({bbox});"
            "#,
        )
        .unwrap();

        assert_eq!(def.id, "osm");
        assert_eq!(def.kind, SourceKind::Osm);
        let FetcherConfig::Overpass { categories, .. } = &def.fetcher else {
            panic!("expected overpass fetcher");
        };
        assert_eq!(categories.len(), 1);
        assert_eq!(categories[0].location_type, LocationType::Water);
        assert_eq!(
            categories[0].activities,
            vec![Activity::Swimming, Activity::Hiking]
        );
    }

    #[test]
    fn parses_reddit_definition() {
        let def = parse_source_toml(
            r#"
            id = "reddit"
            name = "Reddit"
            kind = "reddit"

            [fetcher]
            type = "reddit_search"
            subreddits = ["toulouse", "Occitanie"]
            search_terms = ["spot secret", "baignade sauvage"]
            "#,
        )
        .unwrap();

        assert_eq!(def.kind, SourceKind::Reddit);
        let FetcherConfig::RedditSearch { subreddits, .. } = &def.fetcher else {
            panic!("expected reddit fetcher");
        };
        assert_eq!(subreddits.len(), 2);
    }

    #[tokio::test]
    async fn missing_capture_yields_empty() {
        let def = parse_source_toml(
            r#"
            id = "forum"
            name = "Forums"
            kind = "forum"

            [fetcher]
            type = "web_seeds"
            seed_urls = ["https://example.org"]
            "#,
        )
        .unwrap();

        let options = FetchOptions {
            limit: None,
            capture_dir: std::path::PathBuf::from("/nonexistent"),
        };
        let records = def.fetch(&options).await.unwrap();
        assert!(records.is_empty());
    }
}
