//! Title matching between catalog records and AniLibria releases.
//!
//! Catalog titles and release names rarely agree byte for byte, so both
//! sides are folded through [`normalize_title`] before comparison. Match
//! precedence: exact normalized equality, then containment in either
//! direction, then the first search result.

use crate::api::{LibriaClient, TitleRecord};
use shared::error::ApiError;
use shared::models::{Episode, QualityMap};
use std::collections::HashSet;
use tracing::{debug, info};
use unicode_normalization::UnicodeNormalization;

/// A matched AniLibria release with its playable episodes
#[derive(Debug, Clone)]
pub struct SourceMatch {
    pub source_id: i64,
    /// The catalog title variant the search succeeded with
    pub matched_title_variant: String,
    /// Episodes in ascending number order, URLs already absolute
    pub episodes: Vec<Episode>,
}

/// Fold a title for comparison: lowercase, strip diacritics, keep only
/// Latin and Cyrillic alphanumerics plus spaces, collapse whitespace.
pub fn normalize_title(title: &str) -> String {
    let stripped: String = title
        .to_lowercase()
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .filter(|c| c.is_alphanumeric() || c.is_whitespace())
        .collect();

    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn is_combining_mark(c: char) -> bool {
    // Covers the combining marks NFD produces for Latin and Cyrillic text
    matches!(c, '\u{0300}'..='\u{036F}' | '\u{0483}'..='\u{0489}' | '\u{1AB0}'..='\u{1AFF}' | '\u{20D0}'..='\u{20FF}')
}

/// Looks up a streaming release for a catalog title
pub struct SourceMatcher {
    client: LibriaClient,
    cdn_host: String,
}

impl SourceMatcher {
    pub fn new(client: LibriaClient, cdn_host: impl Into<String>) -> Self {
        Self {
            client,
            cdn_host: cdn_host.into(),
        }
    }

    /// Try each title variant in order until a search returns results.
    ///
    /// Variants that normalize to the same string as an earlier one are
    /// skipped. A source that simply does not exist is `Ok(None)`.
    pub async fn find_source(&self, variants: &[String]) -> Result<Option<SourceMatch>, ApiError> {
        let mut seen = HashSet::new();

        for variant in variants {
            let normalized = normalize_title(variant);
            if normalized.is_empty() || !seen.insert(normalized.clone()) {
                continue;
            }

            // Search with the raw variant; normalization is for comparison only
            let results = self.client.search_titles(variant).await?;
            if results.is_empty() {
                debug!(variant = %variant, "No releases for variant");
                continue;
            }

            let record = select_match(&normalized, &results);
            let episodes = build_episodes(record, &self.cdn_host);
            info!(
                source_id = record.id,
                variant = %variant,
                episodes = episodes.len(),
                "Matched streaming release"
            );
            return Ok(Some(SourceMatch {
                source_id: record.id,
                matched_title_variant: variant.clone(),
                episodes,
            }));
        }

        Ok(None)
    }
}

/// Pick the best record for a normalized query: exact name equality wins,
/// then containment in either direction, then the first result.
fn select_match<'a>(normalized_query: &str, results: &'a [TitleRecord]) -> &'a TitleRecord {
    for record in results {
        if record
            .names
            .all()
            .iter()
            .any(|name| normalize_title(name) == normalized_query)
        {
            return record;
        }
    }

    for record in results {
        let contained = record.names.all().iter().any(|name| {
            let normalized = normalize_title(name);
            !normalized.is_empty()
                && (normalized.contains(normalized_query) || normalized_query.contains(&normalized))
        });
        if contained {
            return record;
        }
    }

    &results[0]
}

/// Flatten the player block into episodes with absolute URLs, ascending
/// by number. Keys that are not episode numbers are dropped.
fn build_episodes(record: &TitleRecord, cdn_host: &str) -> Vec<Episode> {
    let Some(player) = &record.player else {
        return Vec::new();
    };

    let mut episodes: Vec<Episode> = player
        .list
        .iter()
        .filter_map(|(key, entry)| {
            let number: u32 = key.parse().ok()?;
            let hls = entry.hls.as_ref()?;
            Some(Episode {
                number,
                qualities: QualityMap {
                    sd: hls.sd.as_deref().map(|p| absolute_url(cdn_host, p)),
                    hd: hls.hd.as_deref().map(|p| absolute_url(cdn_host, p)),
                    fhd: hls.fhd.as_deref().map(|p| absolute_url(cdn_host, p)),
                },
            })
        })
        .collect();

    episodes.sort_by_key(|e| e.number);
    episodes
}

fn absolute_url(cdn_host: &str, path: &str) -> String {
    format!("{}{}", cdn_host.trim_end_matches('/'), path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(id: i64, names: serde_json::Value, player: serde_json::Value) -> TitleRecord {
        serde_json::from_value(json!({
            "id": id,
            "names": names,
            "player": player,
        }))
        .unwrap()
    }

    #[test]
    fn test_normalize_strips_punctuation_and_case() {
        assert_eq!(normalize_title("Re:Zero — Starting Life!"), "rezero starting life");
        assert_eq!(normalize_title("  Steins;Gate  0  "), "steinsgate 0");
    }

    #[test]
    fn test_normalize_strips_diacritics() {
        assert_eq!(normalize_title("Pokémon"), "pokemon");
        assert_eq!(normalize_title("Fate/Académie"), "fateacademie");
    }

    #[test]
    fn test_normalize_keeps_cyrillic() {
        assert_eq!(normalize_title("Атака Титанов: Финал"), "атака титанов финал");
    }

    #[test]
    fn test_exact_match_beats_containment() {
        let results = vec![
            record(
                1,
                json!({"en": "Exact Name Extended"}),
                json!({"list": {}}),
            ),
            record(2, json!({"en": "Exact Name"}), json!({"list": {}})),
        ];

        let chosen = select_match("exact name", &results);
        assert_eq!(chosen.id, 2);
    }

    #[test]
    fn test_containment_beats_first_result() {
        let results = vec![
            record(1, json!({"en": "Unrelated Show"}), json!({"list": {}})),
            record(2, json!({"en": "My Title Season 2"}), json!({"list": {}})),
        ];

        let chosen = select_match("my title", &results);
        assert_eq!(chosen.id, 2);
    }

    #[test]
    fn test_first_result_fallback() {
        let results = vec![
            record(7, json!({"en": "Alpha"}), json!({"list": {}})),
            record(8, json!({"en": "Beta"}), json!({"list": {}})),
        ];

        let chosen = select_match("gamma delta", &results);
        assert_eq!(chosen.id, 7);
    }

    #[test]
    fn test_episodes_sorted_and_prefixed() {
        let rec = record(
            1,
            json!({"en": "Show"}),
            json!({"list": {
                "10": {"hls": {"sd": "/videos/10/sd.m3u8"}},
                "2": {"hls": {"sd": "/videos/2/sd.m3u8", "fhd": "/videos/2/fhd.m3u8"}},
                "1": {"hls": {"hd": "/videos/1/hd.m3u8"}},
                "extra": {"hls": {"sd": "/videos/x/sd.m3u8"}}
            }}),
        );

        let episodes = build_episodes(&rec, "https://cache.libria.fun");
        let numbers: Vec<u32> = episodes.iter().map(|e| e.number).collect();
        assert_eq!(numbers, vec![1, 2, 10]);
        assert_eq!(
            episodes[1].qualities.fhd.as_deref(),
            Some("https://cache.libria.fun/videos/2/fhd.m3u8")
        );
        assert_eq!(
            episodes[0].qualities.hd.as_deref(),
            Some("https://cache.libria.fun/videos/1/hd.m3u8")
        );
    }

    #[test]
    fn test_missing_player_yields_no_episodes() {
        let rec: TitleRecord =
            serde_json::from_value(json!({"id": 3, "names": {"en": "Show"}})).unwrap();
        assert!(build_episodes(&rec, "https://cache.libria.fun").is_empty());
    }
}
