#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! CLI entry point for the spot-map aggregation pipeline.

use std::path::PathBuf;
use std::time::Instant;

use clap::{Parser, Subcommand, ValueEnum};
use spot_map_cli_utils::IndicatifProgress;
use spot_map_database::{db, queries};
use spot_map_geo::Region;
use spot_map_source::FetchOptions;
use spot_map_source::registry::{all_sources, enabled_sources};

#[derive(Parser)]
#[command(name = "spot_map", about = "Hidden outdoor spot aggregation pipeline")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the database and schema
    Init,
    /// List all configured data sources
    Sources,
    /// Fetch records from sources and save them through validation
    Sync {
        /// Comma-separated list of source IDs to sync (default: all)
        #[arg(long)]
        sources: Option<String>,
        /// Maximum number of records per source (for testing)
        #[arg(long)]
        limit: Option<u64>,
        /// Directory holding captured JSON batches for conversational sources
        #[arg(long, default_value = "captures")]
        captures: PathBuf,
    },
    /// Add distance-from-Toulouse metadata and repair broken names
    Enrich,
    /// Re-run keyword classification over stored raw text
    Classify,
    /// Score bulk-source spots for relevance
    Score {
        /// Delete low-relevance bulk-source spots after scoring
        #[arg(long)]
        prune: bool,
    },
    /// Normalize names, store confidence scores, and merge duplicates
    Standardize,
    /// Geocode spots without coordinates via Nominatim place lookup
    Geocode {
        /// Maximum number of spots to geocode
        #[arg(long)]
        limit: Option<u64>,
    },
    /// Export the catalog
    Export {
        /// Output format
        #[arg(long, value_enum)]
        format: ExportFormat,
        /// Output file path
        #[arg(long)]
        output: PathBuf,
    },
    /// Print catalog statistics
    Report,
}

/// Supported export formats.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum ExportFormat {
    /// Full JSON dump of every spot
    Json,
    /// Flat JSON array for the map front end (spots with coordinates)
    Map,
    /// CSV for spreadsheets
    Csv,
    /// GPX waypoints for hiking apps
    Gpx,
}

#[allow(clippy::too_many_lines)]
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let multi = spot_map_cli_utils::init_logger();
    let cli = Cli::parse();
    let region = Region::default();

    match cli.command {
        Commands::Init => {
            let conn = db::connect_from_env()?;
            log::info!("Database ready with {} spot(s)", queries::count_spots(&conn)?);
        }
        Commands::Sources => {
            println!("{:<12} KIND        NAME", "ID");
            println!("{}", "-".repeat(50));
            for source in all_sources() {
                println!(
                    "{:<12} {:<11} {}",
                    source.id,
                    source.kind.as_ref(),
                    source.name
                );
            }
        }
        Commands::Sync {
            sources,
            limit,
            captures,
        } => {
            let conn = db::connect_from_env()?;
            let options = FetchOptions {
                limit,
                capture_dir: captures,
            };
            let selected = enabled_sources(sources.as_deref());
            if selected.is_empty() {
                return Err("No matching sources".into());
            }

            let start = Instant::now();
            for source in &selected {
                let bar = IndicatifProgress::records_bar(&multi, &format!("Sync {}", source.id));
                match spot_map_ingest::sync_source(&conn, source, &options, region, Some(&*bar))
                    .await
                {
                    Ok(summary) => bar.finish(format!(
                        "{}: {} inserted, {} duplicate(s), {} rejected",
                        source.id, summary.inserted, summary.duplicates, summary.rejected
                    )),
                    Err(e) => {
                        bar.finish_and_clear();
                        log::error!("Failed to sync {}: {e}", source.id);
                    }
                }
            }
            log::info!(
                "Synced {} source(s) in {:.1}s",
                selected.len(),
                start.elapsed().as_secs_f64()
            );
        }
        Commands::Enrich => {
            let conn = db::connect_from_env()?;
            let distances = spot_map_ingest::enrich_distances(&conn)?;
            let names = spot_map_ingest::repair_names(&conn)?;
            log::info!("Enrichment complete: {distances} distance(s), {names} name(s)");
        }
        Commands::Classify => {
            let conn = db::connect_from_env()?;
            let updated = spot_map_ingest::classify_spots(&conn)?;
            log::info!("Classification complete: {updated} spot(s) updated");
        }
        Commands::Score { prune } => {
            let conn = db::connect_from_env()?;
            let bar = IndicatifProgress::batch_bar(&multi, "Scoring relevance");
            let summary = spot_map_ingest::score_relevance(&conn, prune, Some(&*bar))?;
            bar.finish(format!(
                "{} scored: {} high, {} medium, {} low, {} pruned",
                summary.scored, summary.high, summary.medium, summary.low, summary.pruned
            ));
        }
        Commands::Standardize => {
            let conn = db::connect_from_env()?;
            let bar = IndicatifProgress::batch_bar(&multi, "Merging duplicates");
            let summary = spot_map_ingest::standardize_spots(&conn, Some(&*bar))?;
            bar.finish(format!(
                "{} standardized, {} pair(s), {} merged, {} skipped",
                summary.standardized, summary.duplicate_pairs, summary.merged, summary.merge_errors
            ));
        }
        Commands::Geocode { limit } => {
            let conn = db::connect_from_env()?;
            let bar = IndicatifProgress::batch_bar(&multi, "Geocoding");
            let summary =
                spot_map_ingest::geocode_missing(&conn, region, limit, Some(&*bar)).await?;
            bar.finish(format!(
                "{} of {} candidate(s) geocoded",
                summary.geocoded, summary.candidates
            ));
        }
        Commands::Export { format, output } => {
            let conn = db::connect_from_env()?;
            let spots = queries::all_spots(&conn)?;
            match format {
                ExportFormat::Json => spot_map_export::write_full_json(&output, &spots)?,
                ExportFormat::Map => spot_map_export::write_map_json(&output, &spots)?,
                ExportFormat::Csv => spot_map_export::write_csv(&output, &spots)?,
                ExportFormat::Gpx => spot_map_export::write_gpx(&output, &spots)?,
            }
        }
        Commands::Report => {
            let conn = db::connect_from_env()?;
            let report = spot_map_ingest::report(&conn)?;

            println!("Spot catalog report");
            println!("  Total spots:        {}", report.total);
            println!("  With coordinates:   {}", report.with_coordinates);
            println!(
                "  Without coordinates: {}",
                report.total - report.with_coordinates
            );
            println!("  Hidden/secret:      {}", report.hidden);
            println!();
            println!("  By type:");
            for (location_type, count) in &report.by_location_type {
                println!("    {location_type:<12} {count}");
            }
            println!();
            println!("  By source:");
            for (source, count) in &report.by_source {
                println!("    {source:<20} {count}");
            }
            println!();
            println!(
                "  Relevance tiers: {} high, {} medium, {} low, {} unscored",
                report.tiers.high, report.tiers.medium, report.tiers.low, report.tiers.unscored
            );
        }
    }

    Ok(())
}
