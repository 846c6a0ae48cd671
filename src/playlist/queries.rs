use super::config::QueryLimits;
use super::preferences::PreferenceRecord;
use std::collections::HashSet;

/// Turns a preference record into prioritised catalog search strings
pub struct QueryBuilder;

impl QueryBuilder {
    /// Artist names first (highest precision), then English keywords,
    /// then native-language keywords, then genre filters.
    pub fn build(preferences: &PreferenceRecord, limits: &QueryLimits) -> Vec<String> {
        let artists = take_non_empty(&preferences.artist_names, limits.artists)
            .map(str::to_string);
        let primary = take_non_empty(&preferences.keywords_primary, limits.keywords_primary)
            .map(str::to_string);
        let native = take_non_empty(&preferences.keywords_native, limits.keywords_native)
            .map(str::to_string);
        let genres = take_non_empty(&preferences.genres, limits.genres).map(Self::genre_query);

        let mut seen = HashSet::new();
        let mut queries: Vec<String> = artists
            .chain(primary)
            .chain(native)
            .chain(genres)
            .filter(|query| seen.insert(query.to_lowercase()))
            .collect();

        // A reply with no usable search terms still has a mood
        if queries.is_empty() && limits.total() > 0 {
            let mood = preferences.mood.trim();
            if !mood.is_empty() {
                queries.push(mood.to_string());
            }
        }
        queries
    }

    /// Genre-scoped search token, quoted when the genre has several words
    pub fn genre_query(genre: &str) -> String {
        let genre = genre.to_lowercase();
        if genre.contains(char::is_whitespace) {
            format!("genre:\"{genre}\"")
        } else {
            format!("genre:{genre}")
        }
    }
}

fn take_non_empty(values: &[String], cap: usize) -> impl Iterator<Item = &str> {
    values
        .iter()
        .map(|value| value.trim())
        .filter(|value| !value.is_empty())
        .take(cap)
}
