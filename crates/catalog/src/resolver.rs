//! Domain operations over the scheduled, cached Jikan access layer.
//!
//! Every method builds an upstream resource path, runs it through the
//! request scheduler, and maps the raw JSON into normalized records.
//! Failures from the scheduler propagate unchanged; callers decide any
//! fallback rendering.

use crate::api::types::{AnimeRecord, DataEnvelope, ListEnvelope, RecommendationRecord};
use crate::api::CatalogClient;
use crate::scheduler::{FetchFn, RequestScheduler};
use chrono::{Datelike, NaiveDate, Utc};
use serde::de::DeserializeOwned;
use shared::error::ApiError;
use shared::models::{NormalizedTitle, Season};
use std::sync::Arc;
use tracing::info;

/// Current and previous season with their years
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeasonWindow {
    pub current: (Season, i32),
    pub previous: (Season, i32),
}

/// Season window for an arbitrary date.
///
/// Quarters map to seasons (Jan-Mar winter, Apr-Jun spring, Jul-Sep summer,
/// Oct-Dec fall); "previous" crosses the year boundary only from winter.
pub fn seasons_at(date: NaiveDate) -> SeasonWindow {
    let year = date.year();
    let season = match date.month() {
        1..=3 => Season::Winter,
        4..=6 => Season::Spring,
        7..=9 => Season::Summer,
        _ => Season::Fall,
    };

    let previous = match season {
        Season::Winter => (Season::Fall, year - 1),
        Season::Spring => (Season::Winter, year),
        Season::Summer => (Season::Spring, year),
        Season::Fall => (Season::Summer, year),
    };

    SeasonWindow {
        current: (season, year),
        previous,
    }
}

/// Season window for today
pub fn current_seasons() -> SeasonWindow {
    seasons_at(Utc::now().date_naive())
}

/// Metadata resolver over the scheduler and the Jikan client
pub struct MetadataResolver {
    scheduler: Arc<RequestScheduler>,
    client: CatalogClient,
}

impl MetadataResolver {
    pub fn new(scheduler: Arc<RequestScheduler>, client: CatalogClient) -> Self {
        Self { scheduler, client }
    }

    /// Schedule a GET for the given resource path
    async fn fetch<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let client = self.client.clone();
        let fetch_path = path.to_string();
        let fetch: FetchFn = Box::new(move || {
            let client = client.clone();
            let path = fetch_path.clone();
            Box::pin(async move { client.get_json(&path).await })
        });

        let value = self.scheduler.schedule(path, fetch).await?;
        serde_json::from_value(value).map_err(|e| ApiError::Validation(e.to_string()))
    }

    /// Top-rated titles
    pub async fn top_titles(&self, limit: u32) -> Result<Vec<NormalizedTitle>, ApiError> {
        info!(limit = limit, "Fetching top titles");
        let response: ListEnvelope<AnimeRecord> =
            self.fetch(&format!("/top/anime?limit={}", limit)).await?;
        Ok(response
            .data
            .into_iter()
            .map(AnimeRecord::into_normalized)
            .collect())
    }

    /// Best-rated titles of a season, descending by score.
    ///
    /// Records without a numeric score are dropped before ranking; the
    /// best-rated-first order is this resolver's policy, not an upstream
    /// guarantee.
    pub async fn seasonal_titles(
        &self,
        season: Season,
        year: i32,
        limit: usize,
    ) -> Result<Vec<NormalizedTitle>, ApiError> {
        info!(season = %season, year = year, limit = limit, "Fetching seasonal titles");
        let response: ListEnvelope<AnimeRecord> = self
            .fetch(&format!("/seasons/{}/{}?sfw=true&limit={}", year, season, limit))
            .await?;
        Ok(rank_seasonal(response.data, limit))
    }

    /// Free-text search
    pub async fn search(&self, query: &str, page: u32) -> Result<Vec<NormalizedTitle>, ApiError> {
        info!(query = query, page = page, "Searching titles");
        let response: ListEnvelope<AnimeRecord> = self
            .fetch(&format!(
                "/anime?q={}&page={}&limit=15&sfw=true",
                urlencoding::encode(query),
                page
            ))
            .await?;
        Ok(response
            .data
            .into_iter()
            .map(AnimeRecord::into_normalized)
            .collect())
    }

    /// Full detail record for one title
    pub async fn title_by_id(&self, id: u32) -> Result<NormalizedTitle, ApiError> {
        info!(mal_id = id, "Fetching title details");
        let response: DataEnvelope<AnimeRecord> =
            self.fetch(&format!("/anime/{}/full", id)).await?;
        Ok(response.data.into_normalized())
    }

    /// Recommendations related to one title
    pub async fn recommendations(&self, id: u32) -> Result<Vec<NormalizedTitle>, ApiError> {
        info!(mal_id = id, "Fetching recommendations");
        let response: ListEnvelope<RecommendationRecord> = self
            .fetch(&format!("/anime/{}/recommendations", id))
            .await?;
        Ok(response
            .data
            .into_iter()
            .map(|rec| rec.entry.into_normalized())
            .collect())
    }
}

/// Seasonal ranking policy: drop unscored records, sort descending by
/// score, truncate to the limit.
fn rank_seasonal(records: Vec<AnimeRecord>, limit: usize) -> Vec<NormalizedTitle> {
    let mut titles: Vec<NormalizedTitle> = records
        .into_iter()
        .map(AnimeRecord::into_normalized)
        .filter(|t| t.score.is_some())
        .collect();

    titles.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    titles.truncate(limit);
    titles
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(id: u32, title: &str, score: Option<f64>) -> AnimeRecord {
        serde_json::from_value(json!({
            "mal_id": id,
            "title": title,
            "score": score,
        }))
        .unwrap()
    }

    #[test]
    fn test_seasonal_ranking_sorts_descending() {
        let records = vec![
            record(1, "Mid", Some(7.2)),
            record(2, "Best", Some(9.0)),
            record(3, "Unscored", None),
            record(4, "Low", Some(5.5)),
        ];

        let ranked = rank_seasonal(records, 10);
        let scores: Vec<f64> = ranked.iter().map(|t| t.score.unwrap()).collect();
        assert_eq!(scores, vec![9.0, 7.2, 5.5]);
        // Score-less records never appear in the output
        assert!(ranked.iter().all(|t| t.title != "Unscored"));
    }

    #[test]
    fn test_seasonal_ranking_truncates_to_limit() {
        let records = vec![
            record(1, "A", Some(8.0)),
            record(2, "B", Some(9.0)),
            record(3, "C", Some(7.0)),
        ];

        let ranked = rank_seasonal(records, 2);
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].title, "B");
        assert_eq!(ranked[1].title, "A");
    }

    #[test]
    fn test_season_window_mid_year() {
        let window = seasons_at(NaiveDate::from_ymd_opt(2024, 7, 15).unwrap());
        assert_eq!(window.current, (Season::Summer, 2024));
        assert_eq!(window.previous, (Season::Spring, 2024));
    }

    #[test]
    fn test_season_window_wraps_in_january() {
        let window = seasons_at(NaiveDate::from_ymd_opt(2024, 1, 10).unwrap());
        assert_eq!(window.current, (Season::Winter, 2024));
        assert_eq!(window.previous, (Season::Fall, 2023));
    }

    #[test]
    fn test_season_window_quarter_edges() {
        let march = seasons_at(NaiveDate::from_ymd_opt(2024, 3, 31).unwrap());
        assert_eq!(march.current.0, Season::Winter);

        let april = seasons_at(NaiveDate::from_ymd_opt(2024, 4, 1).unwrap());
        assert_eq!(april.current.0, Season::Spring);

        let december = seasons_at(NaiveDate::from_ymd_opt(2024, 12, 1).unwrap());
        assert_eq!(december.current, (Season::Fall, 2024));
    }
}
