//! Query functions for the `spots` table.
//!
//! Derived-score filters use `json_extract` on the metadata column; all
//! other access goes through positional parameters.

use chrono::{DateTime, NaiveDateTime, Utc};
use rusqlite::{Connection, OptionalExtension as _, params};
use spot_map_spot_models::{Activity, LocationType, Spot, SpotMetadata};

use crate::DbError;

/// Columns selected for full spot rows, in [`row_to_spot`] order.
const SPOT_COLUMNS: &str = "id, source, source_url, raw_text, extracted_name,
    latitude, longitude, location_type, activities, is_hidden,
    mentions_count, scraped_at, metadata";

/// Saves a spot using insert-if-not-exists semantics.
///
/// The identity key is `source_url` when present, otherwise the
/// `(extracted_name, rounded coordinates)` tuple. An existing record gets
/// its `mentions_count` incremented instead of a second row.
///
/// Returns `true` when a new row was inserted.
///
/// # Errors
///
/// Returns [`DbError`] if any database operation fails.
pub fn save_spot(conn: &Connection, spot: &Spot) -> Result<bool, DbError> {
    let existing_id: Option<i64> = if let Some(url) = &spot.source_url {
        conn.query_row(
            "SELECT id FROM spots WHERE source_url = ?1",
            params![url],
            |row| row.get(0),
        )
        .optional()?
    } else if let (Some(name), Some((lat, lon))) = (&spot.extracted_name, spot.coordinates()) {
        conn.query_row(
            "SELECT id FROM spots
             WHERE extracted_name = ?1
               AND ROUND(latitude, 4) = ROUND(?2, 4)
               AND ROUND(longitude, 4) = ROUND(?3, 4)",
            params![name, lat, lon],
            |row| row.get(0),
        )
        .optional()?
    } else {
        None
    };

    if let Some(id) = existing_id {
        conn.execute(
            "UPDATE spots SET mentions_count = mentions_count + 1 WHERE id = ?1",
            params![id],
        )?;
        return Ok(false);
    }

    conn.execute(
        "INSERT INTO spots (
            source, source_url, raw_text, extracted_name,
            latitude, longitude, location_type, activities,
            is_hidden, mentions_count, scraped_at, metadata
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
        params![
            spot.source,
            spot.source_url,
            spot.raw_text,
            spot.extracted_name,
            spot.latitude,
            spot.longitude,
            spot.location_type.as_ref(),
            Activity::join(&spot.activities),
            spot.is_hidden,
            spot.mentions_count,
            spot.scraped_at.to_rfc3339(),
            spot.metadata.to_db(),
        ],
    )?;

    Ok(true)
}

/// Fetches a single spot by ID.
///
/// # Errors
///
/// Returns [`DbError`] if the query fails.
pub fn get_spot(conn: &Connection, id: i64) -> Result<Option<Spot>, DbError> {
    let sql = format!("SELECT {SPOT_COLUMNS} FROM spots WHERE id = ?1");
    let spot = conn
        .query_row(&sql, params![id], row_to_spot)
        .optional()?;
    Ok(spot)
}

/// Returns all spots, ordered by ID.
///
/// # Errors
///
/// Returns [`DbError`] if the query fails.
pub fn all_spots(conn: &Connection) -> Result<Vec<Spot>, DbError> {
    let sql = format!("SELECT {SPOT_COLUMNS} FROM spots ORDER BY id");
    let mut stmt = conn.prepare(&sql)?;
    let spots = stmt
        .query_map([], row_to_spot)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(spots)
}

/// Returns all spots whose source starts with the given prefix.
///
/// # Errors
///
/// Returns [`DbError`] if the query fails.
pub fn spots_with_source_prefix(conn: &Connection, prefix: &str) -> Result<Vec<Spot>, DbError> {
    let sql = format!("SELECT {SPOT_COLUMNS} FROM spots WHERE source LIKE ?1 || '%' ORDER BY id");
    let mut stmt = conn.prepare(&sql)?;
    let spots = stmt
        .query_map(params![prefix], row_to_spot)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(spots)
}

/// Returns spots that have no coordinates yet.
///
/// # Errors
///
/// Returns [`DbError`] if the query fails.
pub fn spots_missing_coordinates(conn: &Connection) -> Result<Vec<Spot>, DbError> {
    let sql = format!(
        "SELECT {SPOT_COLUMNS} FROM spots
         WHERE latitude IS NULL OR longitude IS NULL
         ORDER BY id"
    );
    let mut stmt = conn.prepare(&sql)?;
    let spots = stmt
        .query_map([], row_to_spot)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(spots)
}

/// Writes an updated metadata bag for a spot.
///
/// # Errors
///
/// Returns [`DbError`] if the update fails.
pub fn update_metadata(
    conn: &Connection,
    id: i64,
    metadata: &SpotMetadata,
) -> Result<(), DbError> {
    conn.execute(
        "UPDATE spots SET metadata = ?1 WHERE id = ?2",
        params![metadata.to_db(), id],
    )?;
    Ok(())
}

/// Writes re-derived classification fields for a spot.
///
/// # Errors
///
/// Returns [`DbError`] if the update fails.
pub fn update_classification(
    conn: &Connection,
    id: i64,
    location_type: LocationType,
    activities: &[Activity],
    is_hidden: bool,
) -> Result<(), DbError> {
    conn.execute(
        "UPDATE spots SET location_type = ?1, activities = ?2, is_hidden = ?3 WHERE id = ?4",
        params![
            location_type.as_ref(),
            Activity::join(activities),
            is_hidden,
            id
        ],
    )?;
    Ok(())
}

/// Writes a repaired display name for a spot.
///
/// # Errors
///
/// Returns [`DbError`] if the update fails.
pub fn update_name(conn: &Connection, id: i64, name: &str) -> Result<(), DbError> {
    conn.execute(
        "UPDATE spots SET extracted_name = ?1 WHERE id = ?2",
        params![name, id],
    )?;
    Ok(())
}

/// Fills in coordinates (from geocoding) along with updated metadata
/// recording the provenance.
///
/// # Errors
///
/// Returns [`DbError`] if the update fails.
pub fn set_coordinates(
    conn: &Connection,
    id: i64,
    latitude: f64,
    longitude: f64,
    metadata: &SpotMetadata,
) -> Result<(), DbError> {
    conn.execute(
        "UPDATE spots SET latitude = ?1, longitude = ?2, metadata = ?3 WHERE id = ?4",
        params![latitude, longitude, metadata.to_db(), id],
    )?;
    Ok(())
}

/// Applies a duplicate merge: rewrites the winner row with its back-filled
/// fields and deletes the loser row.
///
/// # Errors
///
/// Returns [`DbError`] if either row has disappeared (e.g. consumed by a
/// prior merge in the same pass) or a statement fails.
pub fn apply_merge(conn: &Connection, winner: &Spot, loser_id: i64) -> Result<(), DbError> {
    let updated = conn.execute(
        "UPDATE spots SET
            source_url = ?1, raw_text = ?2, extracted_name = ?3,
            latitude = ?4, longitude = ?5, activities = ?6,
            mentions_count = ?7, metadata = ?8
         WHERE id = ?9",
        params![
            winner.source_url,
            winner.raw_text,
            winner.extracted_name,
            winner.latitude,
            winner.longitude,
            Activity::join(&winner.activities),
            winner.mentions_count,
            winner.metadata.to_db(),
            winner.id,
        ],
    )?;
    if updated == 0 {
        return Err(DbError::Conversion {
            message: format!("merge winner {} no longer exists", winner.id),
        });
    }

    let deleted = conn.execute("DELETE FROM spots WHERE id = ?1", params![loser_id])?;
    if deleted == 0 {
        return Err(DbError::Conversion {
            message: format!("merge loser {loser_id} no longer exists"),
        });
    }

    Ok(())
}

/// Deletes scored spots below the relevance threshold for one source
/// family. Unscored spots are left alone.
///
/// Returns the number of deleted rows.
///
/// # Errors
///
/// Returns [`DbError`] if the delete fails.
pub fn prune_low_relevance(
    conn: &Connection,
    source_prefix: &str,
    min_score: i32,
) -> Result<u64, DbError> {
    let deleted = conn.execute(
        "DELETE FROM spots
         WHERE source LIKE ?1 || '%'
           AND json_extract(metadata, '$.relevance_score') IS NOT NULL
           AND CAST(json_extract(metadata, '$.relevance_score') AS INTEGER) < ?2",
        params![source_prefix, min_score],
    )?;
    Ok(u64::try_from(deleted).unwrap_or(0))
}

/// Total number of spots.
///
/// # Errors
///
/// Returns [`DbError`] if the query fails.
pub fn count_spots(conn: &Connection) -> Result<u64, DbError> {
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM spots", [], |row| row.get(0))?;
    Ok(u64::try_from(count).unwrap_or(0))
}

/// Number of spots with both coordinates present.
///
/// # Errors
///
/// Returns [`DbError`] if the query fails.
pub fn count_with_coordinates(conn: &Connection) -> Result<u64, DbError> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM spots
         WHERE latitude IS NOT NULL AND longitude IS NOT NULL",
        [],
        |row| row.get(0),
    )?;
    Ok(u64::try_from(count).unwrap_or(0))
}

/// Number of spots flagged as hidden.
///
/// # Errors
///
/// Returns [`DbError`] if the query fails.
pub fn count_hidden(conn: &Connection) -> Result<u64, DbError> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM spots WHERE is_hidden = 1",
        [],
        |row| row.get(0),
    )?;
    Ok(u64::try_from(count).unwrap_or(0))
}

/// Per-value counts over a grouping column (`location_type` or `source`).
///
/// # Errors
///
/// Returns [`DbError`] if the query fails.
fn counts_grouped_by(conn: &Connection, column: &str) -> Result<Vec<(String, u64)>, DbError> {
    let sql = format!(
        "SELECT COALESCE({column}, 'unknown'), COUNT(*)
         FROM spots GROUP BY {column} ORDER BY COUNT(*) DESC"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map([], |row| {
            let value: String = row.get(0)?;
            let count: i64 = row.get(1)?;
            Ok((value, u64::try_from(count).unwrap_or(0)))
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// Spot counts per location type.
///
/// # Errors
///
/// Returns [`DbError`] if the query fails.
pub fn counts_by_location_type(conn: &Connection) -> Result<Vec<(String, u64)>, DbError> {
    counts_grouped_by(conn, "location_type")
}

/// Spot counts per source tag.
///
/// # Errors
///
/// Returns [`DbError`] if the query fails.
pub fn counts_by_source(conn: &Connection) -> Result<Vec<(String, u64)>, DbError> {
    counts_grouped_by(conn, "source")
}

/// Maps a full spot row to a [`Spot`].
fn row_to_spot(row: &rusqlite::Row<'_>) -> Result<Spot, rusqlite::Error> {
    let location_type: Option<String> = row.get(7)?;
    let activities: Option<String> = row.get(8)?;
    let scraped_at: Option<String> = row.get(11)?;
    let metadata: Option<String> = row.get(12)?;

    Ok(Spot {
        id: row.get(0)?,
        source: row.get(1)?,
        source_url: row.get(2)?,
        raw_text: row.get(3)?,
        extracted_name: row.get(4)?,
        latitude: row.get(5)?,
        longitude: row.get(6)?,
        location_type: location_type
            .as_deref()
            .map_or(LocationType::Unknown, LocationType::parse_lossy),
        activities: activities
            .as_deref()
            .map_or_else(Vec::new, Activity::parse_list),
        is_hidden: row.get::<_, Option<bool>>(9)?.unwrap_or(false),
        mentions_count: row.get::<_, Option<i64>>(10)?.unwrap_or(1),
        scraped_at: scraped_at
            .as_deref()
            .and_then(parse_timestamp)
            .unwrap_or_else(Utc::now),
        metadata: SpotMetadata::from_db(metadata.as_deref()),
    })
}

/// Parses a stored timestamp.
///
/// Rows written by this crate carry RFC 3339; rows created by SQLite's
/// `CURRENT_TIMESTAMP` default use `%Y-%m-%d %H:%M:%S`. Both are accepted.
fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return Some(naive.and_utc());
    }
    log::warn!("Failed to parse timestamp: {raw:?}");
    None
}
