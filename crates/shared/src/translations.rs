//! Localized display dictionaries for genres, seasons, statuses and ratings.
//!
//! Pure lookup tables; unknown keys pass through untranslated so new
//! upstream values degrade gracefully.

use crate::models::Season;
use once_cell::sync::Lazy;
use std::collections::HashMap;

static GENRES: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("Action", "Экшен"),
        ("Adventure", "Приключения"),
        ("Comedy", "Комедия"),
        ("Drama", "Драма"),
        ("Fantasy", "Фэнтези"),
        ("Horror", "Ужасы"),
        ("Mystery", "Детектив"),
        ("Romance", "Романтика"),
        ("Sci-Fi", "Научная фантастика"),
        ("Slice of Life", "Повседневность"),
        ("Sports", "Спорт"),
        ("Supernatural", "Сверхъестественное"),
        ("Thriller", "Триллер"),
        ("Seinen", "Сейнен"),
        ("Shounen", "Сёнен"),
        ("Shoujo", "Сёдзё"),
        ("Mecha", "Меха"),
        ("Music", "Музыка"),
        ("Psychological", "Психологическое"),
        ("School", "Школа"),
    ])
});

static STATUSES: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("Currently Airing", "Онгоинг"),
        ("Finished Airing", "Завершён"),
        ("Not yet aired", "Анонс"),
    ])
});

static RATINGS: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("G - All Ages", "Для всех возрастов"),
        ("PG - Children", "Детское"),
        ("PG-13 - Teens 13 or older", "13+"),
        ("R - 17+ (violence & profanity)", "17+"),
        ("R+ - Mild Nudity", "17+ (лёгкая обнажёнка)"),
        ("Rx - Hentai", "Хентай"),
    ])
});

static TYPES: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("TV", "ТВ Сериал"),
        ("Movie", "Фильм"),
        ("OVA", "OVA"),
        ("ONA", "ONA"),
        ("Special", "Спешл"),
        ("Music", "Клип"),
    ])
});

/// Translate a single genre name, passing unknown genres through
pub fn translate_genre(genre: &str) -> &str {
    GENRES.get(genre).copied().unwrap_or(genre)
}

/// Translate a list of genre names
pub fn translate_genres<'a>(genres: &'a [String]) -> Vec<&'a str> {
    genres.iter().map(|g| translate_genre(g)).collect()
}

/// Translate an airing status
pub fn translate_status(status: &str) -> &str {
    STATUSES.get(status).copied().unwrap_or(status)
}

/// Translate an age rating
pub fn translate_rating(rating: &str) -> &str {
    RATINGS.get(rating).copied().unwrap_or(rating)
}

/// Translate a media type
pub fn translate_type(anime_type: &str) -> &str {
    TYPES.get(anime_type).copied().unwrap_or(anime_type)
}

/// Localized season name
pub fn translate_season(season: Season) -> &'static str {
    match season {
        Season::Winter => "Зима",
        Season::Spring => "Весна",
        Season::Summer => "Лето",
        Season::Fall => "Осень",
    }
}

/// Format a season/year pair for display; "TBA" when the year is unknown
pub fn format_season_year(season: Option<Season>, year: Option<i32>) -> String {
    match (season, year) {
        (Some(season), Some(year)) => format!("{} {}", translate_season(season), year),
        (None, Some(year)) => year.to_string(),
        _ => "TBA".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_season_year() {
        assert_eq!(
            format_season_year(Some(Season::Winter), Some(2024)),
            "Зима 2024"
        );
        assert_eq!(format_season_year(None, None), "TBA");
        assert_eq!(format_season_year(Some(Season::Fall), None), "TBA");
        assert_eq!(format_season_year(None, Some(2023)), "2023");
    }

    #[test]
    fn test_unknown_values_pass_through() {
        assert_eq!(translate_genre("Isekai"), "Isekai");
        assert_eq!(translate_status("Rumored"), "Rumored");
    }

    #[test]
    fn test_known_translations() {
        assert_eq!(translate_genre("Action"), "Экшен");
        assert_eq!(translate_status("Currently Airing"), "Онгоинг");
        assert_eq!(translate_rating("PG-13 - Teens 13 or older"), "13+");
        assert_eq!(translate_type("Movie"), "Фильм");
    }

    #[test]
    fn test_translate_genre_list() {
        let genres = vec!["Action".to_string(), "Isekai".to_string()];
        assert_eq!(translate_genres(&genres), vec!["Экшен", "Isekai"]);
    }
}
