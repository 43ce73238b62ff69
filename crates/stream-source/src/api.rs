//! AniLibria API v3 client and response schemas.
//!
//! Search results are never cached: stream paths on the CDN can be
//! session-scoped, so every lookup goes straight to the API.

use reqwest::StatusCode;
use serde::Deserialize;
use shared::error::ApiError;
use std::collections::HashMap;
use std::time::Duration;
use tracing::debug;

const USER_AGENT: &str = concat!("anime-universe/", env!("CARGO_PKG_VERSION"));

/// Fields requested from the search endpoint; everything else is dead
/// weight on the wire.
const SEARCH_FILTER: &str = "id,names,player";

/// Search response wrapper
#[derive(Debug, Clone, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub list: Vec<TitleRecord>,
}

/// One release record from the catalog
#[derive(Debug, Clone, Deserialize)]
pub struct TitleRecord {
    pub id: i64,
    #[serde(default)]
    pub names: TitleNames,
    #[serde(default)]
    pub player: Option<Player>,
}

/// Name variants of a release
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TitleNames {
    #[serde(default)]
    pub ru: Option<String>,
    #[serde(default)]
    pub en: Option<String>,
    // The API emits explicit nulls inside this list
    #[serde(default)]
    pub alternative: Vec<Option<String>>,
}

impl TitleNames {
    /// All present name variants
    pub fn all(&self) -> Vec<&str> {
        self.ru
            .iter()
            .chain(self.en.iter())
            .chain(self.alternative.iter().flatten())
            .map(String::as_str)
            .collect()
    }
}

/// Player block: the episode list keyed by episode number
#[derive(Debug, Clone, Deserialize)]
pub struct Player {
    #[serde(default)]
    pub list: HashMap<String, PlayerEpisode>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlayerEpisode {
    #[serde(default)]
    pub hls: Option<HlsPaths>,
}

/// Relative HLS paths per quality tier.
///
/// The API has shipped both `fhd` and `fullhd` for the top tier.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HlsPaths {
    #[serde(default)]
    pub sd: Option<String>,
    #[serde(default)]
    pub hd: Option<String>,
    #[serde(default, alias = "fullhd")]
    pub fhd: Option<String>,
}

/// AniLibria API v3 client
#[derive(Clone)]
pub struct LibriaClient {
    http: reqwest::Client,
    base_url: String,
    search_limit: u32,
}

impl LibriaClient {
    pub fn new(
        base_url: impl Into<String>,
        search_limit: u32,
        timeout: Duration,
    ) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.into(),
            search_limit,
        })
    }

    /// Search releases by name
    pub async fn search_titles(&self, query: &str) -> Result<Vec<TitleRecord>, ApiError> {
        let url = format!("{}/title/search", self.base_url);
        debug!(url = %url, query = query, "Searching streaming catalog");

        let response = self
            .http
            .get(&url)
            .query(&[
                ("search", query),
                ("filter", SEARCH_FILTER),
                ("limit", &self.search_limit.to_string()),
            ])
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        let status = response.status();

        // The API answers 404 for "nothing found"; that is an empty result
        if status == StatusCode::NOT_FOUND {
            return Ok(Vec::new());
        }

        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            return Err(ApiError::Upstream {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: SearchResponse = response
            .json()
            .await
            .map_err(|e| ApiError::Validation(e.to_string()))?;

        Ok(parsed.list)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_fullhd_alias_accepted() {
        let paths: HlsPaths = serde_json::from_value(json!({
            "sd": "/videos/1/sd.m3u8",
            "fullhd": "/videos/1/fhd.m3u8"
        }))
        .unwrap();

        assert_eq!(paths.fhd.as_deref(), Some("/videos/1/fhd.m3u8"));
        assert_eq!(paths.hd, None);
    }

    #[test]
    fn test_record_with_missing_player_parses() {
        let record: TitleRecord = serde_json::from_value(json!({
            "id": 9000,
            "names": {"ru": "Атака титанов", "en": "Attack on Titan"}
        }))
        .unwrap();

        assert!(record.player.is_none());
        assert_eq!(record.names.all(), vec!["Атака титанов", "Attack on Titan"]);
    }
}
