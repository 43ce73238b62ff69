//! Canonical data models used throughout the core.
//!
//! This module defines the normalized anime record produced by the metadata
//! resolver, the calendar season type, and the quality-tier types shared by
//! the source matcher and the playback session.

use serde::{Deserialize, Serialize};

/// The canonical anime record used throughout the UI.
///
/// Produced only by the metadata resolver's normalization step; fields
/// absent upstream stay `None`, never coerced to misleading defaults.
/// Genres and studios are always at least empty vectors.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NormalizedTitle {
    pub id: u32, // MyAnimeList ID

    // Titles
    pub title: String,
    pub title_english: Option<String>,
    pub title_japanese: Option<String>,
    pub title_russian: Option<String>,

    // Presentation
    pub image_url: Option<String>,
    pub synopsis: Option<String>,

    // Scores and airing info
    pub score: Option<f64>,
    pub episode_count: Option<u32>,
    pub status: Option<String>,
    pub season: Option<Season>,
    pub year: Option<i32>,

    // Classifications
    pub genres: Vec<String>,
    pub studios: Vec<String>,

    pub rating: Option<String>,
    pub anime_type: Option<String>,
}

impl NormalizedTitle {
    /// Title variants in matching priority order: localized first, then
    /// the romaji default, then English and Japanese. Callers feed this
    /// directly into the source matcher.
    pub fn title_variants(&self) -> Vec<String> {
        let mut variants = Vec::new();
        if let Some(ref ru) = self.title_russian {
            variants.push(ru.clone());
        }
        variants.push(self.title.clone());
        if let Some(ref en) = self.title_english {
            variants.push(en.clone());
        }
        if let Some(ref ja) = self.title_japanese {
            variants.push(ja.clone());
        }
        variants
    }
}

/// Calendar season, mapped from quarters (Jan-Mar = winter, ... Oct-Dec = fall)
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Season {
    Winter,
    Spring,
    Summer,
    Fall,
}

impl Season {
    pub fn as_str(&self) -> &'static str {
        match self {
            Season::Winter => "winter",
            Season::Spring => "spring",
            Season::Summer => "summer",
            Season::Fall => "fall",
        }
    }
}

impl std::fmt::Display for Season {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Season {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "winter" => Ok(Season::Winter),
            "spring" => Ok(Season::Spring),
            "summer" => Ok(Season::Summer),
            "fall" | "autumn" => Ok(Season::Fall),
            _ => Err(anyhow::anyhow!("Invalid season: {}", s)),
        }
    }
}

/// Discrete playback quality tier
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum QualityTier {
    Sd,
    Hd,
    Fhd,
}

impl QualityTier {
    /// Tiers in selection preference order (best first)
    pub const PREFERRED: [QualityTier; 3] = [QualityTier::Fhd, QualityTier::Hd, QualityTier::Sd];

    pub fn as_str(&self) -> &'static str {
        match self {
            QualityTier::Sd => "sd",
            QualityTier::Hd => "hd",
            QualityTier::Fhd => "fhd",
        }
    }

    /// Human-readable resolution label
    pub fn label(&self) -> &'static str {
        match self {
            QualityTier::Sd => "480p",
            QualityTier::Hd => "720p",
            QualityTier::Fhd => "1080p",
        }
    }
}

impl std::fmt::Display for QualityTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Stream URLs per quality tier for a single episode
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct QualityMap {
    pub sd: Option<String>,
    pub hd: Option<String>,
    pub fhd: Option<String>,
}

impl QualityMap {
    pub fn get(&self, tier: QualityTier) -> Option<&str> {
        match tier {
            QualityTier::Sd => self.sd.as_deref(),
            QualityTier::Hd => self.hd.as_deref(),
            QualityTier::Fhd => self.fhd.as_deref(),
        }
    }

    pub fn has(&self, tier: QualityTier) -> bool {
        self.get(tier).is_some()
    }

    /// Best available tier in preference order (fhd > hd > sd)
    pub fn best_tier(&self) -> Option<QualityTier> {
        QualityTier::PREFERRED.into_iter().find(|t| self.has(*t))
    }

    /// All available tiers, best first
    pub fn available_tiers(&self) -> Vec<QualityTier> {
        QualityTier::PREFERRED
            .into_iter()
            .filter(|t| self.has(*t))
            .collect()
    }
}

/// One playable episode with its quality map
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Episode {
    pub number: u32,
    pub qualities: QualityMap,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quality_map(sd: bool, hd: bool, fhd: bool) -> QualityMap {
        QualityMap {
            sd: sd.then(|| "https://cdn.example/sd.m3u8".to_string()),
            hd: hd.then(|| "https://cdn.example/hd.m3u8".to_string()),
            fhd: fhd.then(|| "https://cdn.example/fhd.m3u8".to_string()),
        }
    }

    #[test]
    fn test_best_tier_preference_order() {
        assert_eq!(quality_map(true, true, true).best_tier(), Some(QualityTier::Fhd));
        assert_eq!(quality_map(true, true, false).best_tier(), Some(QualityTier::Hd));
        assert_eq!(quality_map(true, false, false).best_tier(), Some(QualityTier::Sd));
        assert_eq!(quality_map(false, false, false).best_tier(), None);
    }

    #[test]
    fn test_available_tiers_best_first() {
        let tiers = quality_map(true, false, true).available_tiers();
        assert_eq!(tiers, vec![QualityTier::Fhd, QualityTier::Sd]);
    }

    #[test]
    fn test_season_from_str() {
        assert_eq!("winter".parse::<Season>().unwrap(), Season::Winter);
        assert_eq!("Fall".parse::<Season>().unwrap(), Season::Fall);
        assert_eq!("autumn".parse::<Season>().unwrap(), Season::Fall);
        assert!("monsoon".parse::<Season>().is_err());
    }

    #[test]
    fn test_title_variants_order() {
        let title = NormalizedTitle {
            id: 1,
            title: "Shingeki no Kyojin".to_string(),
            title_english: Some("Attack on Titan".to_string()),
            title_japanese: Some("進撃の巨人".to_string()),
            title_russian: Some("Атака титанов".to_string()),
            image_url: None,
            synopsis: None,
            score: None,
            episode_count: None,
            status: None,
            season: None,
            year: None,
            genres: vec![],
            studios: vec![],
            rating: None,
            anime_type: None,
        };

        let variants = title.title_variants();
        assert_eq!(variants[0], "Атака титанов");
        assert_eq!(variants[1], "Shingeki no Kyojin");
        assert_eq!(variants[2], "Attack on Titan");
    }
}
