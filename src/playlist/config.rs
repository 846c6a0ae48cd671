use crate::client::MAX_FEATURE_IDS;
use serde::{Deserialize, Serialize};

/// Limits and tolerances for one generation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationSettings {
    pub query_limits: QueryLimits,
    pub results_per_query: u32, // Tracks requested from each search call
    pub candidate_limit: usize, // Pool prefix handed to the scorer
    pub feature_batch_size: usize,
    pub tolerances: MatchTolerances,
    pub max_tracks: usize,   // Final playlist size cap
    pub preview_size: usize, // Tracks echoed back in the result
    pub public_playlist: bool,
}

/// Per-category caps for search queries, applied in priority order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryLimits {
    pub artists: usize,
    pub keywords_primary: usize,
    pub keywords_native: usize,
    pub genres: usize,
}

/// How far a track's features may sit from the target and still count as a match
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchTolerances {
    pub energy: f64,
    pub valence: f64,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            query_limits: QueryLimits::default(),
            results_per_query: 20,
            candidate_limit: 100,
            feature_batch_size: MAX_FEATURE_IDS,
            tolerances: MatchTolerances::default(),
            max_tracks: 30,
            preview_size: 10,
            public_playlist: false,
        }
    }
}

impl Default for QueryLimits {
    fn default() -> Self {
        Self {
            artists: 3,
            keywords_primary: 5,
            keywords_native: 3,
            genres: 3,
        }
    }
}

impl QueryLimits {
    /// Upper bound on the number of queries these caps can produce
    pub fn total(&self) -> usize {
        self.artists + self.keywords_primary + self.keywords_native + self.genres
    }
}

impl Default for MatchTolerances {
    fn default() -> Self {
        Self {
            energy: 0.25,
            valence: 0.25,
        }
    }
}

impl GenerationSettings {
    /// Load settings from a JSON file; missing keys keep their defaults
    pub fn load_from_file(path: &str) -> anyhow::Result<GenerationSettings> {
        let content = std::fs::read_to_string(path)?;
        let settings: GenerationSettings = serde_json::from_str(&content)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Reject settings the pipeline or the catalog API cannot honour
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.query_limits.total() == 0 {
            anyhow::bail!("query_limits must allow at least one search query");
        }
        if self.results_per_query == 0 || self.results_per_query > 50 {
            anyhow::bail!(
                "results_per_query must be between 1 and 50, got {}",
                self.results_per_query
            );
        }
        if self.candidate_limit == 0 {
            anyhow::bail!("candidate_limit must be greater than zero");
        }
        if self.feature_batch_size == 0 || self.feature_batch_size > MAX_FEATURE_IDS {
            anyhow::bail!(
                "feature_batch_size must be between 1 and {MAX_FEATURE_IDS}, got {}",
                self.feature_batch_size
            );
        }
        for (name, value) in [
            ("energy", self.tolerances.energy),
            ("valence", self.tolerances.valence),
        ] {
            if !(0.0..=1.0).contains(&value) {
                anyhow::bail!("{name} tolerance must be within [0, 1], got {value}");
            }
        }
        // Tracks are added in a single call, which the platform caps at 100 uris
        if self.max_tracks == 0 || self.max_tracks > 100 {
            anyhow::bail!("max_tracks must be between 1 and 100, got {}", self.max_tracks);
        }
        Ok(())
    }
}
