//! Source registry — loads all source definitions from embedded TOML
//! configs.
//!
//! Each `.toml` file in `packages/source/sources/` is baked into the binary
//! at compile time via [`include_str!`]. Adding a new source is as simple
//! as creating a new TOML file and adding it to the list below.

use crate::source_def::{SourceDefinition, parse_source_toml};

/// TOML configs embedded at compile time.
const SOURCE_TOMLS: &[(&str, &str)] = &[
    ("osm", include_str!("../sources/osm.toml")),
    ("reddit", include_str!("../sources/reddit.toml")),
    ("instagram", include_str!("../sources/instagram.toml")),
    ("tourism", include_str!("../sources/tourism.toml")),
    ("forum", include_str!("../sources/forum.toml")),
];

/// Total number of configured sources (used in tests).
#[cfg(test)]
const EXPECTED_SOURCE_COUNT: usize = 5;

/// Returns all configured source definitions, parsed from embedded TOML.
///
/// # Panics
///
/// Panics if any TOML config is malformed (this is a compile-time guarantee
/// since the configs are embedded).
#[must_use]
pub fn all_sources() -> Vec<SourceDefinition> {
    SOURCE_TOMLS
        .iter()
        .map(|(name, toml)| {
            parse_source_toml(toml).unwrap_or_else(|e| panic!("Failed to parse {name}.toml: {e}"))
        })
        .collect()
}

/// Returns the sources whose IDs appear in the comma-separated filter, or
/// all sources when no filter is given.
#[must_use]
pub fn enabled_sources(filter: Option<&str>) -> Vec<SourceDefinition> {
    let all = all_sources();
    let Some(filter) = filter else {
        return all;
    };
    let ids: Vec<&str> = filter.split(',').map(str::trim).collect();
    all.into_iter()
        .filter(|source| ids.contains(&source.id.as_str()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source_def::FetcherConfig;

    #[test]
    fn loads_all_sources() {
        let sources = all_sources();
        assert_eq!(sources.len(), EXPECTED_SOURCE_COUNT);
    }

    #[test]
    fn source_ids_are_unique() {
        let sources = all_sources();
        let mut ids: Vec<&str> = sources.iter().map(|s| s.id.as_str()).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), EXPECTED_SOURCE_COUNT);
    }

    #[test]
    fn osm_source_has_all_categories() {
        let sources = all_sources();
        let osm = sources.iter().find(|s| s.id == "osm").unwrap();
        let FetcherConfig::Overpass { categories, .. } = &osm.fetcher else {
            panic!("osm source must use the overpass fetcher");
        };
        let ids: Vec<&str> = categories.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(
            ids,
            vec![
                "waterfalls",
                "swimming_spots",
                "viewpoints",
                "caves",
                "ruins",
                "springs"
            ]
        );
        for category in categories {
            assert!(
                category.query.contains("{bbox}"),
                "{}: query missing bbox placeholder",
                category.id
            );
        }
    }

    #[test]
    fn filter_selects_by_id() {
        let filtered = enabled_sources(Some("osm, reddit"));
        assert_eq!(filtered.len(), 2);
        assert!(enabled_sources(None).len() > filtered.len());
    }
}
