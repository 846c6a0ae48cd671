use super::config::GenerationSettings;
use super::metadata::{DraftPlaylist, GenerationResult};
use super::preferences::{PreferenceParser, PreferenceRecord};
use super::prompt::build_instruction;
use super::queries::QueryBuilder;
use super::scoring::{FeatureScoring, ScoredTrack};
use super::search::{CandidatePool, CatalogSearch};
use super::utils::PlaylistNaming;
use crate::client::CatalogApi;
use crate::error::{GenerationError, PublishStep, Stage};
use crate::llm::LanguageModel;
use crate::models::Session;
use chrono::Local;
use tracing::{debug, info, warn};

/// Everything a caller supplies for one generation
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub description: String,
    pub user_id: String,
    pub access_token: String,
}

/// Pipeline progress; each variant owns exactly what the next stage needs
enum PipelineState {
    Authorizing(GenerationRequest),
    Interpreting {
        session: Session,
        description: String,
    },
    Searching {
        session: Session,
        description: String,
        preferences: PreferenceRecord,
    },
    Scoring {
        session: Session,
        description: String,
        preferences: PreferenceRecord,
        pool: CandidatePool,
    },
    Publishing {
        session: Session,
        draft: DraftPlaylist,
    },
    Done(GenerationResult),
}

impl PipelineState {
    fn stage(&self) -> Stage {
        match self {
            PipelineState::Authorizing(_) => Stage::Authorizing,
            PipelineState::Interpreting { .. } => Stage::Interpreting,
            PipelineState::Searching { .. } => Stage::Searching,
            PipelineState::Scoring { .. } => Stage::Scoring,
            PipelineState::Publishing { .. } => Stage::Publishing,
            PipelineState::Done(_) => Stage::Done,
        }
    }
}

/// Main playlist generator
pub struct PlaylistGenerator<'a, C: CatalogApi, L: LanguageModel> {
    catalog: &'a C,
    model: &'a L,
    settings: GenerationSettings,
}

impl<'a, C: CatalogApi, L: LanguageModel> PlaylistGenerator<'a, C, L> {
    pub fn new(catalog: &'a C, model: &'a L, settings: GenerationSettings) -> Self {
        Self {
            catalog,
            model,
            settings,
        }
    }

    /// Turn a description into a published playlist
    pub fn generate(&self, request: GenerationRequest) -> Result<GenerationResult, GenerationError> {
        let mut state = PipelineState::Authorizing(request);

        loop {
            let stage = state.stage();
            debug!("Entering stage: {stage}");

            state = match self.advance(state) {
                Ok(PipelineState::Done(result)) => {
                    info!(
                        "Playlist '{}' published with {} tracks",
                        result.name, result.track_count
                    );
                    return Ok(result);
                }
                Ok(next) => next,
                Err(err) => {
                    warn!("Generation failed while {}: {err}", err.stage());
                    return Err(err);
                }
            };
        }
    }

    /// Run every stage up to publishing and return what would be published
    pub fn preview(&self, request: GenerationRequest) -> Result<DraftPlaylist, GenerationError> {
        let mut state = PipelineState::Authorizing(request);

        loop {
            state = match self.advance(state)? {
                PipelineState::Publishing { draft, .. } => return Ok(draft),
                next => next,
            };
        }
    }

    fn advance(&self, state: PipelineState) -> Result<PipelineState, GenerationError> {
        match state {
            PipelineState::Authorizing(request) => {
                let (session, description) = Self::authorize(request)?;
                Ok(PipelineState::Interpreting {
                    session,
                    description,
                })
            }
            PipelineState::Interpreting {
                session,
                description,
            } => {
                let preferences = self.interpret(&description)?;
                Ok(PipelineState::Searching {
                    session,
                    description,
                    preferences,
                })
            }
            PipelineState::Searching {
                session,
                description,
                preferences,
            } => {
                let pool = self.search(&session, &preferences)?;
                Ok(PipelineState::Scoring {
                    session,
                    description,
                    preferences,
                    pool,
                })
            }
            PipelineState::Scoring {
                session,
                description,
                preferences,
                pool,
            } => {
                let tracks = FeatureScoring::select(
                    self.catalog,
                    &session,
                    &pool,
                    &preferences,
                    &self.settings,
                );
                let draft = DraftPlaylist {
                    name: PlaylistNaming::generate_playlist_name(&preferences.mood),
                    description: PlaylistNaming::generate_description(&description, Local::now()),
                    tracks,
                };
                Ok(PipelineState::Publishing { session, draft })
            }
            PipelineState::Publishing { session, draft } => {
                let result = self.publish(&session, draft)?;
                Ok(PipelineState::Done(result))
            }
            PipelineState::Done(result) => Ok(PipelineState::Done(result)),
        }
    }

    /// Reject incomplete requests before any external call
    fn authorize(request: GenerationRequest) -> Result<(Session, String), GenerationError> {
        let description = request.description.trim();
        if description.is_empty() {
            return Err(GenerationError::InputInvalid(
                "playlist description is empty".to_string(),
            ));
        }
        if request.access_token.trim().is_empty() {
            return Err(GenerationError::InputInvalid(
                "catalog access token is missing".to_string(),
            ));
        }
        if request.user_id.trim().is_empty() {
            return Err(GenerationError::InputInvalid(
                "catalog user id is missing".to_string(),
            ));
        }

        let session = Session {
            user_id: request.user_id.trim().to_string(),
            access_token: request.access_token.trim().to_string(),
        };
        Ok((session, description.to_string()))
    }

    fn interpret(&self, description: &str) -> Result<PreferenceRecord, GenerationError> {
        info!("Interpreting request: {description:?}");

        let reply = self
            .model
            .complete(&build_instruction(description))
            .map_err(GenerationError::UpstreamUnavailable)?;
        debug!("Model reply:\n{reply}");

        let preferences = PreferenceParser::parse(&reply);
        info!(
            "Mood '{}' | energy {:.2} | valence {:.2} | tempo {} | {} artists, {} genres",
            preferences.mood,
            preferences.energy,
            preferences.valence,
            preferences.tempo_class,
            preferences.artist_names.len(),
            preferences.genres.len()
        );
        Ok(preferences)
    }

    fn search(
        &self,
        session: &Session,
        preferences: &PreferenceRecord,
    ) -> Result<CandidatePool, GenerationError> {
        let queries = QueryBuilder::build(preferences, &self.settings.query_limits);
        info!("Searching catalog with {} queries", queries.len());

        let outcome = CatalogSearch::new(self.catalog, self.settings.results_per_query)
            .run(session, &queries);

        if outcome.pool.is_empty() {
            return Err(GenerationError::NoCandidatesFound {
                queries: queries.len(),
            });
        }
        Ok(outcome.pool)
    }

    /// Create the playlist, then fill it. A failed fill leaves the empty playlist behind.
    fn publish(
        &self,
        session: &Session,
        draft: DraftPlaylist,
    ) -> Result<GenerationResult, GenerationError> {
        let playlist = self
            .catalog
            .create_playlist(
                session,
                &draft.name,
                &draft.description,
                self.settings.public_playlist,
            )
            .map_err(|source| GenerationError::PublishFailed {
                step: PublishStep::Create,
                playlist_id: None,
                source,
            })?;
        info!("Created playlist '{}' ({})", playlist.name, playlist.id);

        let uris: Vec<String> = draft.tracks.iter().map(track_uri).collect();
        self.catalog
            .add_tracks(session, &playlist.id, &uris)
            .map_err(|source| GenerationError::PublishFailed {
                step: PublishStep::AddTracks,
                playlist_id: Some(playlist.id.clone()),
                source,
            })?;

        Ok(GenerationResult::new(
            playlist,
            &draft.tracks,
            self.settings.preview_size,
        ))
    }
}

fn track_uri(scored: &ScoredTrack) -> String {
    scored.track.uri.clone()
}
