#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Pipeline pass orchestration.
//!
//! Each pass opens no connections of its own — the caller provides one —
//! and commits implicitly per statement. Passes are synchronous
//! transformations over the store; only source fetching and geocoding talk
//! to the network.
//!
//! Error discipline: one bad record never aborts a batch. Validation
//! failures, per-pair merge failures, and geocoding misses are logged and
//! skipped; only infrastructure failures (the store itself) propagate.

use std::time::{Duration, Instant};

use chrono::Utc;
use rusqlite::Connection;
use spot_map_database::{DbError, queries};
use spot_map_geo::{Region, distance_from_toulouse_km};
use spot_map_geocoder::{GeocodeError, NOMINATIM_URL, place_candidates, regional_query};
use spot_map_ingest_models::{
    CatalogReport, GeocodeSummary, ScoreSummary, StandardizeSummary, SyncSummary, TierCounts,
};
use spot_map_source::progress::ProgressCallback;
use spot_map_source::source_def::SourceDefinition;
use spot_map_source::validate::validate;
use spot_map_source::{FetchOptions, SourceError};
use spot_map_spot_models::{LocationType, RelevanceTier};
use spot_map_standardize::{
    UNKNOWN_NAME, backfill, confidence, find_duplicate_pairs, normalize_name, pick_winner,
};

/// Relevance score below which bulk-source spots are pruned.
pub const PRUNE_THRESHOLD: i32 = 3;

/// Source prefix of the bulk family that gets scored and pruned.
pub const BULK_SOURCE_PREFIX: &str = "osm_";

/// Display names that signal a broken extraction worth repairing.
const JUNK_NAMES: &[&str] = &["Affichage", "Endroit", "Grotte", "Unknown"];

/// Errors from pipeline orchestration.
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    /// Database failure.
    #[error("Database error: {0}")]
    Db(#[from] DbError),

    /// Source fetch failure.
    #[error("Source error: {0}")]
    Source(#[from] SourceError),

    /// Geocoder client construction failure.
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Fetches one source and saves its records through validation.
///
/// Invalid records are logged and skipped; the batch continues.
///
/// # Errors
///
/// Returns [`IngestError`] if the fetch itself or a store operation fails.
pub async fn sync_source(
    conn: &Connection,
    source: &SourceDefinition,
    options: &FetchOptions,
    region: Region,
    progress: Option<&dyn ProgressCallback>,
) -> Result<SyncSummary, IngestError> {
    let start = Instant::now();
    log::info!("Syncing source '{}'", source.id);

    let records = source.fetch(options).await?;
    let fetched = records.len() as u64;
    if let Some(progress) = progress {
        progress.set_total(fetched);
    }

    let mut inserted = 0u64;
    let mut duplicates = 0u64;
    let mut rejected = 0u64;

    for record in records {
        match validate(record, region) {
            Ok(spot) => match queries::save_spot(conn, &spot) {
                Ok(true) => inserted += 1,
                Ok(false) => duplicates += 1,
                Err(e) => {
                    log::error!("Failed to save spot from '{}': {e}", source.id);
                    rejected += 1;
                }
            },
            Err(e) => {
                log::warn!("Rejected record from '{}': {e}", source.id);
                rejected += 1;
            }
        }
        if let Some(progress) = progress {
            progress.inc(1);
        }
    }

    let summary = SyncSummary {
        source_id: source.id.clone(),
        fetched,
        inserted,
        duplicates,
        rejected,
        duration: start.elapsed(),
    };
    log::info!(
        "Sync '{}' complete: {fetched} fetched, {inserted} inserted, {duplicates} duplicate(s), {rejected} rejected in {:.1}s",
        source.id,
        summary.duration.as_secs_f64()
    );
    Ok(summary)
}

/// Writes the distance-from-Toulouse enrichment for spots that have
/// coordinates but no stored distance yet.
///
/// Returns the number of updated spots.
///
/// # Errors
///
/// Returns [`IngestError`] if a store operation fails.
pub fn enrich_distances(conn: &Connection) -> Result<u64, IngestError> {
    let mut updated = 0u64;

    for spot in queries::all_spots(conn)? {
        let Some((lat, lon)) = spot.coordinates() else {
            continue;
        };
        if spot.metadata.distance_from_toulouse_km().is_some() {
            continue;
        }
        let mut metadata = spot.metadata;
        metadata.set_distance_from_toulouse_km(distance_from_toulouse_km(lat, lon));
        queries::update_metadata(conn, spot.id, &metadata)?;
        updated += 1;
    }

    log::info!("Added distances for {updated} spot(s)");
    Ok(updated)
}

/// Repairs broken display names from the raw text.
///
/// Targets names that are missing, suspiciously short, or known junk
/// values from earlier extraction bugs.
///
/// Returns the number of repaired names.
///
/// # Errors
///
/// Returns [`IngestError`] if a store operation fails.
pub fn repair_names(conn: &Connection) -> Result<u64, IngestError> {
    let mut repaired = 0u64;

    for spot in queries::all_spots(conn)? {
        let needs_repair = spot.extracted_name.as_deref().is_none_or(|name| {
            name.chars().count() < 10 || JUNK_NAMES.contains(&name)
        });
        if !needs_repair {
            continue;
        }
        let Some(raw_text) = spot.raw_text.as_deref() else {
            continue;
        };
        if let Some(better) = spot_map_extract::extract_name(raw_text)
            && Some(better.as_str()) != spot.extracted_name.as_deref()
        {
            queries::update_name(conn, spot.id, &better)?;
            repaired += 1;
        }
    }

    log::info!("Repaired {repaired} name(s)");
    Ok(repaired)
}

/// Re-runs keyword classification over stored raw text, filling in
/// missing location types, activities, and hidden flags.
///
/// Existing non-default values are kept; re-running the pass is idempotent.
///
/// Returns the number of updated spots.
///
/// # Errors
///
/// Returns [`IngestError`] if a store operation fails.
pub fn classify_spots(conn: &Connection) -> Result<u64, IngestError> {
    let mut updated = 0u64;

    for spot in queries::all_spots(conn)? {
        let Some(raw_text) = spot.raw_text.as_deref() else {
            continue;
        };

        let location_type = if spot.location_type == LocationType::Unknown {
            spot_map_classify::infer_location_type(raw_text)
        } else {
            spot.location_type
        };
        let activities = if spot.activities.is_empty() {
            spot_map_classify::infer_activities(raw_text)
        } else {
            spot.activities.clone()
        };
        let is_hidden = spot.is_hidden || spot_map_classify::is_hidden_spot(raw_text);

        let changed = location_type != spot.location_type
            || activities != spot.activities
            || is_hidden != spot.is_hidden;
        if changed {
            queries::update_classification(conn, spot.id, location_type, &activities, is_hidden)?;
            updated += 1;
        }
    }

    log::info!("Re-classified {updated} spot(s)");
    Ok(updated)
}

/// Scores every bulk-source spot and writes the result into its metadata.
///
/// When `prune` is set, low-tier spots of the bulk family are deleted
/// afterwards; all other source families are never touched.
///
/// # Errors
///
/// Returns [`IngestError`] if a store operation fails.
pub fn score_relevance(
    conn: &Connection,
    prune: bool,
    progress: Option<&dyn ProgressCallback>,
) -> Result<ScoreSummary, IngestError> {
    let spots = queries::spots_with_source_prefix(conn, BULK_SOURCE_PREFIX)?;
    if let Some(progress) = progress {
        progress.set_total(spots.len() as u64);
    }

    let mut summary = ScoreSummary::default();
    let evaluated_at = Utc::now();

    for spot in spots {
        let score = spot_map_relevance::score(&spot);
        match RelevanceTier::from_score(score) {
            RelevanceTier::High => summary.high += 1,
            RelevanceTier::Medium => summary.medium += 1,
            RelevanceTier::Low => summary.low += 1,
        }

        let mut metadata = spot.metadata;
        metadata.set_relevance_score(score, evaluated_at);
        queries::update_metadata(conn, spot.id, &metadata)?;
        summary.scored += 1;

        if let Some(progress) = progress {
            progress.inc(1);
        }
    }

    if prune {
        summary.pruned = queries::prune_low_relevance(conn, BULK_SOURCE_PREFIX, PRUNE_THRESHOLD)?;
    }

    log::info!(
        "Relevance pass: {} scored ({} high, {} medium, {} low), {} pruned",
        summary.scored,
        summary.high,
        summary.medium,
        summary.low,
        summary.pruned
    );
    Ok(summary)
}

/// Standardizes names, stores confidence scores, then finds and merges
/// duplicates.
///
/// Merges are applied pairwise in discovery order. When three or more rows
/// mutually duplicate, later pairs may reference an already-merged row;
/// those pairs are logged and skipped rather than resolved transitively.
///
/// # Errors
///
/// Returns [`IngestError`] if a store operation fails outside the per-pair
/// merge loop.
pub fn standardize_spots(
    conn: &Connection,
    progress: Option<&dyn ProgressCallback>,
) -> Result<StandardizeSummary, IngestError> {
    let mut summary = StandardizeSummary::default();

    // Phase 1: normalize names and store confidence.
    for spot in queries::all_spots(conn)? {
        let normalized = normalize_name(spot.extracted_name.as_deref());
        if normalized != UNKNOWN_NAME && Some(normalized.as_str()) != spot.extracted_name.as_deref()
        {
            queries::update_name(conn, spot.id, &normalized)?;
        }

        let mut refreshed = queries::get_spot(conn, spot.id)?.unwrap_or(spot);
        refreshed
            .metadata
            .set_confidence_score(confidence(&refreshed));
        queries::update_metadata(conn, refreshed.id, &refreshed.metadata)?;
        summary.standardized += 1;
    }

    // Phase 2: pairwise duplicate detection and merge.
    let spots = queries::all_spots(conn)?;
    let pairs = find_duplicate_pairs(&spots);
    summary.duplicate_pairs = pairs.len() as u64;
    if let Some(progress) = progress {
        progress.set_total(pairs.len() as u64);
    }

    for pair in pairs {
        match merge_pair(conn, pair.first_id, pair.second_id) {
            Ok(()) => summary.merged += 1,
            Err(e) => {
                log::error!(
                    "Skipping merge of ({}, {}) [{}]: {e}",
                    pair.first_id,
                    pair.second_id,
                    pair.reason.as_ref()
                );
                summary.merge_errors += 1;
            }
        }
        if let Some(progress) = progress {
            progress.inc(1);
        }
    }

    log::info!(
        "Standardize pass: {} standardized, {} duplicate pair(s), {} merged, {} skipped",
        summary.standardized,
        summary.duplicate_pairs,
        summary.merged,
        summary.merge_errors
    );
    Ok(summary)
}

/// Merges one duplicate pair, re-reading both rows so earlier merges in
/// the same pass are respected.
fn merge_pair(conn: &Connection, first_id: i64, second_id: i64) -> Result<(), DbError> {
    let first = queries::get_spot(conn, first_id)?.ok_or_else(|| DbError::Conversion {
        message: format!("spot {first_id} no longer exists"),
    })?;
    let second = queries::get_spot(conn, second_id)?.ok_or_else(|| DbError::Conversion {
        message: format!("spot {second_id} no longer exists"),
    })?;

    let (winner, loser) = pick_winner(&first, &second);
    let mut merged = winner.clone();
    backfill(&mut merged, loser);
    merged.metadata.set_confidence_score(confidence(&merged));

    queries::apply_merge(conn, &merged, loser.id)
}

/// Geocodes spots that have no coordinates via place-name lookup.
///
/// Paces requests at ~1/s for the public Nominatim instance. Lookup misses
/// and per-record errors are logged; the pass continues.
///
/// # Errors
///
/// Returns [`IngestError`] if the HTTP client cannot be built or a store
/// operation fails.
pub async fn geocode_missing(
    conn: &Connection,
    region: Region,
    limit: Option<u64>,
    progress: Option<&dyn ProgressCallback>,
) -> Result<GeocodeSummary, IngestError> {
    let mut spots = queries::spots_missing_coordinates(conn)?;
    if let Some(limit) = limit {
        spots.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
    }

    let mut summary = GeocodeSummary {
        candidates: spots.len() as u64,
        ..GeocodeSummary::default()
    };
    if let Some(progress) = progress {
        progress.set_total(spots.len() as u64);
    }

    let client = reqwest::Client::builder()
        .user_agent("spot-map/1.0")
        .build()?;

    for spot in spots {
        let text = format!(
            "{} {}",
            spot.extracted_name.as_deref().unwrap_or(""),
            spot.raw_text.as_deref().unwrap_or("")
        );
        let places = place_candidates(&text);
        if places.is_empty() {
            if let Some(progress) = progress {
                progress.inc(1);
            }
            continue;
        }

        summary.attempted += 1;
        for place in places {
            match spot_map_geocoder::nominatim::geocode_freeform(
                &client,
                NOMINATIM_URL,
                &regional_query(&place),
            )
            .await
            {
                Ok(Some(found)) if region.contains(found.latitude, found.longitude) => {
                    let mut metadata = spot.metadata.clone();
                    metadata.set_geocoded_by(found.provider.tag());
                    queries::set_coordinates(
                        conn,
                        spot.id,
                        found.latitude,
                        found.longitude,
                        &metadata,
                    )?;
                    summary.geocoded += 1;
                    log::info!("Geocoded spot {} via '{place}'", spot.id);
                    break;
                }
                Ok(_) => {}
                Err(GeocodeError::RateLimited) => {
                    log::warn!("Nominatim rate limit hit; backing off");
                    tokio::time::sleep(Duration::from_secs(5)).await;
                }
                Err(e) => {
                    log::warn!("Geocoding '{place}' for spot {} failed: {e}", spot.id);
                }
            }
            // Public Nominatim allows 1 request per second.
            tokio::time::sleep(Duration::from_secs(1)).await;
        }

        if let Some(progress) = progress {
            progress.inc(1);
        }
    }

    log::info!(
        "Geocode pass: {}/{} spot(s) geocoded ({} candidates)",
        summary.geocoded,
        summary.attempted,
        summary.candidates
    );
    Ok(summary)
}

/// Builds the catalog statistics report.
///
/// # Errors
///
/// Returns [`IngestError`] if a store query fails.
pub fn report(conn: &Connection) -> Result<CatalogReport, IngestError> {
    let mut tiers = TierCounts::default();
    for spot in queries::all_spots(conn)? {
        match spot.metadata.relevance_score() {
            Some(score) => {
                let score = i32::try_from(score).unwrap_or(i32::MIN);
                match RelevanceTier::from_score(score) {
                    RelevanceTier::High => tiers.high += 1,
                    RelevanceTier::Medium => tiers.medium += 1,
                    RelevanceTier::Low => tiers.low += 1,
                }
            }
            None => tiers.unscored += 1,
        }
    }

    Ok(CatalogReport {
        total: queries::count_spots(conn)?,
        with_coordinates: queries::count_with_coordinates(conn)?,
        hidden: queries::count_hidden(conn)?,
        by_location_type: queries::counts_by_location_type(conn)?,
        by_source: queries::counts_by_source(conn)?,
        tiers,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use spot_map_database::db::open_in_memory;
    use spot_map_spot_models::{Activity, Spot, SpotMetadata};

    fn seed_spot(conn: &Connection, id_hint: &str, name: Option<&str>, coords: Option<(f64, f64)>) {
        let spot = Spot {
            id: 0,
            source: "osm_waterfalls".to_string(),
            source_url: Some(format!("https://osm.org/node/{id_hint}")),
            raw_text: Some("Cascade secrète pour la baignade".to_string()),
            extracted_name: name.map(String::from),
            latitude: coords.map(|(lat, _)| lat),
            longitude: coords.map(|(_, lon)| lon),
            location_type: LocationType::Water,
            activities: vec![Activity::Swimming],
            is_hidden: true,
            mentions_count: 1,
            scraped_at: Utc::now(),
            metadata: SpotMetadata::default(),
        };
        queries::save_spot(conn, &spot).unwrap();
    }

    #[tokio::test]
    async fn sync_skips_invalid_records_and_continues() {
        let conn = open_in_memory().unwrap();

        let dir = std::env::temp_dir().join(format!("spot_map_sync_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(
            dir.join("forum.json"),
            r#"[
                {"source": "forum_c2c", "source_url": "https://example.org/1",
                 "raw_text": "Superbe cascade pour la baignade", "latitude": 43.6, "longitude": 1.4},
                {"source": "forum_c2c", "source_url": "https://example.org/2",
                 "raw_text": "Spot avec une seule coordonnée", "latitude": 43.6},
                {"source": "forum_c2c", "source_url": "https://example.org/3",
                 "raw_text": "Un endroit caché près de Muret"}
            ]"#,
        )
        .unwrap();

        let source = spot_map_source::source_def::parse_source_toml(
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
            capture_dir: dir.clone(),
        };
        let summary = sync_source(&conn, &source, &options, Region::TOULOUSE, None)
            .await
            .unwrap();

        assert_eq!(summary.fetched, 3);
        assert_eq!(summary.inserted, 2);
        assert_eq!(summary.rejected, 1); // the unpaired-latitude record

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn enrich_adds_distance_once() {
        let conn = open_in_memory().unwrap();
        seed_spot(&conn, "1", Some("Cascade de Salles"), Some((43.7, 1.5)));

        assert_eq!(enrich_distances(&conn).unwrap(), 1);
        assert_eq!(enrich_distances(&conn).unwrap(), 0);

        let spot = &queries::all_spots(&conn).unwrap()[0];
        assert!(spot.metadata.distance_from_toulouse_km().is_some());
    }

    #[test]
    fn score_pass_writes_scores_and_prunes() {
        let conn = open_in_memory().unwrap();
        seed_spot(&conn, "1", Some("Cascade de Salles"), Some((43.7, 1.5)));
        seed_spot(&conn, "2", None, Some((43.8, 1.6)));

        let summary = score_relevance(&conn, true, None).unwrap();
        assert_eq!(summary.scored, 2);
        // Named waterfall: +3 name +2 waterfall = 5 (high).
        // Unnamed waterfall: +2 waterfall = 2 (low) -> pruned.
        assert_eq!(summary.high, 1);
        assert_eq!(summary.low, 1);
        assert_eq!(summary.pruned, 1);
        assert_eq!(queries::count_spots(&conn).unwrap(), 1);
    }

    #[test]
    fn standardize_merges_duplicates_pairwise() {
        let conn = open_in_memory().unwrap();
        // Three mutual duplicates by location (~10 m apart).
        seed_spot(&conn, "1", Some("Cascade de Salles"), Some((43.604_70, 1.444_20)));
        seed_spot(&conn, "2", Some("Autre Nom"), Some((43.604_72, 1.444_22)));
        seed_spot(&conn, "3", Some("Troisième"), Some((43.604_74, 1.444_24)));

        let summary = standardize_spots(&conn, None).unwrap();
        assert_eq!(summary.duplicate_pairs, 3);
        // Pair (1,2) merges; pair (1,3) merges into the survivor; pair
        // (2,3) references deleted rows and is skipped. Discovery-order
        // merging, no transitive resolution.
        assert_eq!(summary.merged + summary.merge_errors, 3);
        assert_eq!(queries::count_spots(&conn).unwrap(), 1);
    }

    #[test]
    fn standardize_writes_confidence() {
        let conn = open_in_memory().unwrap();
        seed_spot(&conn, "1", Some("Cascade de Salles"), Some((43.7, 1.5)));
        standardize_spots(&conn, None).unwrap();

        let spot = &queries::all_spots(&conn).unwrap()[0];
        let confidence_score = spot.metadata.confidence_score().unwrap();
        assert!((0.0..=1.0).contains(&confidence_score));
    }

    #[test]
    fn classify_fills_missing_fields_idempotently() {
        let conn = open_in_memory().unwrap();
        let spot = Spot {
            id: 0,
            source: "reddit_toulouse".to_string(),
            source_url: Some("https://reddit.com/1".to_string()),
            raw_text: Some("Superbe cascade pour la baignade et la randonnée".to_string()),
            extracted_name: None,
            latitude: None,
            longitude: None,
            location_type: LocationType::Unknown,
            activities: Vec::new(),
            is_hidden: false,
            mentions_count: 1,
            scraped_at: Utc::now(),
            metadata: SpotMetadata::default(),
        };
        queries::save_spot(&conn, &spot).unwrap();

        assert_eq!(classify_spots(&conn).unwrap(), 1);
        assert_eq!(classify_spots(&conn).unwrap(), 0);

        let stored = &queries::all_spots(&conn).unwrap()[0];
        assert_eq!(stored.location_type, LocationType::Water);
        assert_eq!(stored.activities, vec![Activity::Swimming, Activity::Hiking]);
    }

    #[test]
    fn report_counts_tiers() {
        let conn = open_in_memory().unwrap();
        seed_spot(&conn, "1", Some("Cascade de Salles"), Some((43.7, 1.5)));
        seed_spot(&conn, "2", Some("Lac de Montbel"), None);
        score_relevance(&conn, false, None).unwrap();

        let report = report(&conn).unwrap();
        assert_eq!(report.total, 2);
        assert_eq!(report.with_coordinates, 1);
        assert_eq!(
            report.tiers.high + report.tiers.medium + report.tiers.low + report.tiers.unscored,
            2
        );
    }
}
