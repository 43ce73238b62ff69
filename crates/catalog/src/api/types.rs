//! Jikan API v4 response schemas and their normalization.
//!
//! Only the fields the resolver consumes are modeled; everything else in
//! the upstream payload is ignored. Defaults are deliberately permissive
//! because recommendation entries carry a reduced record shape.

use serde::{Deserialize, Serialize};
use shared::models::{NormalizedTitle, Season};

/// List wrapper (`{"data": [...]}`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListEnvelope<T> {
    pub data: Vec<T>,
}

/// Single-object wrapper (`{"data": {...}}`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataEnvelope<T> {
    pub data: T,
}

/// One anime record as returned by list, detail and search endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnimeRecord {
    pub mal_id: u32,
    pub title: String,
    #[serde(default)]
    pub title_english: Option<String>,
    #[serde(default)]
    pub title_japanese: Option<String>,
    #[serde(default)]
    pub images: Option<AnimeImages>,
    #[serde(default)]
    pub synopsis: Option<String>,
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default)]
    pub episodes: Option<u32>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub season: Option<String>,
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub genres: Vec<NamedEntity>,
    #[serde(default)]
    pub studios: Vec<NamedEntity>,
    #[serde(default)]
    pub rating: Option<String>,
    #[serde(default, rename = "type")]
    pub anime_type: Option<String>,
}

/// Image set per format
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnimeImages {
    pub jpg: ImageSet,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageSet {
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub large_image_url: Option<String>,
}

/// Genre/studio entity; only the name is consumed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NamedEntity {
    pub name: String,
}

/// One recommendation row wrapping a reduced anime record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationRecord {
    pub entry: AnimeRecord,
}

impl AnimeRecord {
    /// Normalize into the canonical internal shape.
    ///
    /// Prefers the large image; an unrecognized season string becomes
    /// `None` rather than leaking upstream vocabulary into the model.
    pub fn into_normalized(self) -> NormalizedTitle {
        let image_url = self
            .images
            .map(|images| images.jpg)
            .and_then(|jpg| jpg.large_image_url.or(jpg.image_url));

        let season = self.season.as_deref().and_then(|s| s.parse::<Season>().ok());

        NormalizedTitle {
            id: self.mal_id,
            title: self.title,
            title_english: self.title_english,
            title_japanese: self.title_japanese,
            title_russian: None,
            image_url,
            synopsis: self.synopsis,
            score: self.score,
            episode_count: self.episodes,
            status: self.status,
            season,
            year: self.year,
            genres: self.genres.into_iter().map(|g| g.name).collect(),
            studios: self.studios.into_iter().map(|s| s.name).collect(),
            rating: self.rating,
            anime_type: self.anime_type,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_full_record_normalizes() {
        let record: AnimeRecord = serde_json::from_value(json!({
            "mal_id": 5114,
            "title": "Fullmetal Alchemist: Brotherhood",
            "title_english": "Fullmetal Alchemist: Brotherhood",
            "title_japanese": "鋼の錬金術師",
            "images": {"jpg": {
                "image_url": "https://cdn.myanimelist.net/images/anime/1208/94745.jpg",
                "large_image_url": "https://cdn.myanimelist.net/images/anime/1208/94745l.jpg"
            }},
            "synopsis": "After a horrific alchemy experiment...",
            "score": 9.1,
            "episodes": 64,
            "status": "Finished Airing",
            "season": "spring",
            "year": 2009,
            "genres": [{"name": "Action"}, {"name": "Adventure"}],
            "studios": [{"name": "Bones"}],
            "rating": "R - 17+ (violence & profanity)",
            "type": "TV"
        }))
        .unwrap();

        let title = record.into_normalized();
        assert_eq!(title.id, 5114);
        assert_eq!(
            title.image_url.as_deref(),
            Some("https://cdn.myanimelist.net/images/anime/1208/94745l.jpg")
        );
        assert_eq!(title.season, Some(Season::Spring));
        assert_eq!(title.genres, vec!["Action", "Adventure"]);
        assert_eq!(title.studios, vec!["Bones"]);
        assert_eq!(title.episode_count, Some(64));
    }

    #[test]
    fn test_reduced_record_parses_with_defaults() {
        // Recommendation entries only carry id, title and images
        let record: AnimeRecord = serde_json::from_value(json!({
            "mal_id": 1,
            "title": "Cowboy Bebop",
            "images": {"jpg": {"image_url": "https://cdn.example/1.jpg"}}
        }))
        .unwrap();

        let title = record.into_normalized();
        assert_eq!(title.image_url.as_deref(), Some("https://cdn.example/1.jpg"));
        assert_eq!(title.score, None);
        assert!(title.genres.is_empty());
        assert!(title.studios.is_empty());
    }

    #[test]
    fn test_unknown_season_becomes_none() {
        let record: AnimeRecord = serde_json::from_value(json!({
            "mal_id": 2,
            "title": "Test",
            "season": "monsoon"
        }))
        .unwrap();

        assert_eq!(record.into_normalized().season, None);
    }

    #[test]
    fn test_missing_mal_id_is_rejected() {
        let result = serde_json::from_value::<AnimeRecord>(json!({"title": "No id"}));
        assert!(result.is_err());
    }
}
