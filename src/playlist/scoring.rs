use super::config::{GenerationSettings, MatchTolerances};
use super::preferences::PreferenceRecord;
use super::search::{CandidatePool, Skip};
use crate::client::CatalogApi;
use crate::models::{AudioFeatures, Session, TrackCandidate};
use std::collections::HashMap;
use tracing::{debug, info, warn};

/// Score given to every track of the fallback list
const FALLBACK_SCORE: u8 = 1;

/// A candidate together with how well it fits the requested mood
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredTrack {
    pub track: TrackCandidate,
    pub features: Option<AudioFeatures>, // None only for fallback entries
    pub score: u8,
}

/// Feature lookup and additive scoring
pub struct FeatureScoring;

impl FeatureScoring {
    /// Fetch features in batches; a failed batch is logged and contributes nothing
    pub fn fetch_features<C: CatalogApi>(
        catalog: &C,
        session: &Session,
        candidates: &[TrackCandidate],
        batch_size: usize,
    ) -> HashMap<String, AudioFeatures> {
        let ids: Vec<String> = candidates.iter().map(|c| c.id.clone()).collect();

        ids.chunks(batch_size.max(1))
            .enumerate()
            .map(|(index, batch)| {
                let result: Result<Vec<AudioFeatures>, Skip> =
                    catalog.audio_features(session, batch).map_err(Skip::from);
                (index, batch.len(), result)
            })
            .fold(HashMap::new(), |mut features, (index, requested, result)| {
                match result {
                    Ok(batch) => {
                        debug!(
                            "Feature batch {}: {} of {} tracks have features",
                            index + 1,
                            batch.len(),
                            requested
                        );
                        for entry in batch {
                            features.entry(entry.id.clone()).or_insert(entry);
                        }
                    }
                    Err(skip) => {
                        warn!("Skipping feature batch {}: {}", index + 1, skip.reason);
                    }
                }
                features
            })
    }

    /// 2 points for energy, 2 for valence, 1 for tempo
    pub fn score(
        features: &AudioFeatures,
        target: &PreferenceRecord,
        tolerances: &MatchTolerances,
    ) -> u8 {
        let energy_match = (features.energy - target.energy).abs() <= tolerances.energy;
        let valence_match = (features.valence - target.valence).abs() <= tolerances.valence;
        let tempo_match = target.tempo_class.matches(features.tempo);

        2 * energy_match as u8 + 2 * valence_match as u8 + tempo_match as u8
    }

    /// Score the candidates that have features, drop zero scores and order by
    /// descending score. Ties keep their discovery order.
    pub fn rank(
        candidates: &[TrackCandidate],
        features: &HashMap<String, AudioFeatures>,
        target: &PreferenceRecord,
        tolerances: &MatchTolerances,
    ) -> Vec<ScoredTrack> {
        let mut scored: Vec<ScoredTrack> = candidates
            .iter()
            .filter_map(|track| {
                let features = features.get(&track.id)?;
                let score = Self::score(features, target, tolerances);
                (score > 0).then(|| ScoredTrack {
                    track: track.clone(),
                    features: Some(features.clone()),
                    score,
                })
            })
            .collect();

        // `sort_by` is stable, which keeps equal scores in pool order
        scored.sort_by(|a, b| b.score.cmp(&a.score));
        scored
    }

    /// The first tracks of the pool, unscored, for when nothing matched
    pub fn fallback(pool: &[TrackCandidate], max_tracks: usize) -> Vec<ScoredTrack> {
        pool.iter()
            .take(max_tracks)
            .map(|track| ScoredTrack {
                track: track.clone(),
                features: None,
                score: FALLBACK_SCORE,
            })
            .collect()
    }

    /// Full scoring stage: fetch, rank, fall back if needed, truncate
    pub fn select<C: CatalogApi>(
        catalog: &C,
        session: &Session,
        pool: &CandidatePool,
        target: &PreferenceRecord,
        settings: &GenerationSettings,
    ) -> Vec<ScoredTrack> {
        let max_tracks = settings.max_tracks;
        let bounded = pool.bounded(settings.candidate_limit);
        let features = Self::fetch_features(catalog, session, bounded, settings.feature_batch_size);
        info!(
            "Fetched audio features for {}/{} candidates",
            features.len(),
            bounded.len()
        );

        let mut ranked = Self::rank(bounded, &features, target, &settings.tolerances);
        if ranked.is_empty() {
            warn!("No candidate matched the requested mood, using the first {max_tracks} search results");
            ranked = Self::fallback(pool.tracks(), max_tracks);
        }

        ranked.truncate(max_tracks);
        ranked
    }
}
