use crate::client::CatalogApi;
use crate::error::ApiError;
use crate::models::{Session, TrackCandidate};
use std::collections::HashSet;
use tracing::{debug, info, warn};

/// A per-query or per-batch failure that the pipeline absorbs
#[derive(Debug)]
pub struct Skip {
    pub reason: ApiError,
}

impl From<ApiError> for Skip {
    fn from(reason: ApiError) -> Self {
        Skip { reason }
    }
}

/// Deduplicated tracks discovered across all search queries, in discovery order
#[derive(Debug, Default)]
pub struct CandidatePool {
    tracks: Vec<TrackCandidate>,
    seen: HashSet<String>,
}

impl CandidatePool {
    /// Insert a track unless its id is empty or already present
    pub fn insert(&mut self, track: TrackCandidate) -> bool {
        if track.id.is_empty() || !self.seen.insert(track.id.clone()) {
            return false;
        }
        self.tracks.push(track);
        true
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn tracks(&self) -> &[TrackCandidate] {
        &self.tracks
    }

    /// Order-preserving prefix used to bound downstream feature lookups
    pub fn bounded(&self, limit: usize) -> &[TrackCandidate] {
        &self.tracks[..limit.min(self.tracks.len())]
    }
}

/// Result of running every search query
#[derive(Debug)]
pub struct SearchOutcome {
    pub pool: CandidatePool,
    pub queries_run: usize,
    pub queries_skipped: usize,
}

/// Runs search queries in priority order and merges their results
pub struct CatalogSearch<'a, C: CatalogApi> {
    catalog: &'a C,
    results_per_query: u32,
}

impl<'a, C: CatalogApi> CatalogSearch<'a, C> {
    pub fn new(catalog: &'a C, results_per_query: u32) -> Self {
        Self {
            catalog,
            results_per_query,
        }
    }

    /// Run each query once; failed queries are logged and skipped
    pub fn run(&self, session: &Session, queries: &[String]) -> SearchOutcome {
        let initial = SearchOutcome {
            pool: CandidatePool::default(),
            queries_run: 0,
            queries_skipped: 0,
        };

        let outcome = queries
            .iter()
            .map(|query| (query, self.search_one(session, query)))
            .fold(initial, |mut outcome, (query, result)| {
                outcome.queries_run += 1;
                match result {
                    Ok(tracks) => {
                        let found = tracks.len();
                        let added = tracks
                            .into_iter()
                            .map(|track| outcome.pool.insert(track))
                            .filter(|inserted| *inserted)
                            .count();
                        debug!("Query {query:?}: {found} results, {added} new");
                    }
                    Err(skip) => {
                        warn!("Skipping search query {query:?}: {}", skip.reason);
                        outcome.queries_skipped += 1;
                    }
                }
                outcome
            });

        info!(
            "Search finished: {} unique tracks from {} queries ({} skipped)",
            outcome.pool.len(),
            outcome.queries_run,
            outcome.queries_skipped
        );
        outcome
    }

    fn search_one(&self, session: &Session, query: &str) -> Result<Vec<TrackCandidate>, Skip> {
        Ok(self
            .catalog
            .search_tracks(session, query, self.results_per_query)?)
    }
}
