use crate::error::ApiError;
use crate::models::{
    AddTracksRequest, ApiTrack, AudioFeatures, AudioFeaturesResponse, CreatePlaylistRequest,
    CreatePlaylistResponse, CreatedPlaylist, CurrentUserResponse, SearchResponse, Session,
    TrackCandidate,
};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;
use ureq::{Agent, AgentBuilder, Request};
use urlencoding::encode;

/// The audio-features endpoint accepts at most this many ids per call
pub const MAX_FEATURE_IDS: usize = 50;

/// Operations the generation pipeline needs from the music catalog
#[cfg_attr(test, mockall::automock)]
pub trait CatalogApi {
    /// Keyword search for tracks, best match first
    fn search_tracks(
        &self,
        session: &Session,
        query: &str,
        limit: u32,
    ) -> Result<Vec<TrackCandidate>, ApiError>;

    /// Audio features for up to `MAX_FEATURE_IDS` tracks; unknown ids are omitted
    fn audio_features(
        &self,
        session: &Session,
        ids: &[String],
    ) -> Result<Vec<AudioFeatures>, ApiError>;

    /// Create an empty playlist owned by the session's user
    fn create_playlist(
        &self,
        session: &Session,
        name: &str,
        description: &str,
        public: bool,
    ) -> Result<CreatedPlaylist, ApiError>;

    /// Append tracks to a playlist in a single call
    fn add_tracks(
        &self,
        session: &Session,
        playlist_id: &str,
        uris: &[String],
    ) -> Result<(), ApiError>;
}

/// A simple Spotify Web API client using bearer-token authentication
pub struct SpotifyClient {
    agent: Agent,
    base_url: String,
}

impl SpotifyClient {
    pub fn new(base_url: &str, timeout: Duration) -> Self {
        let agent = AgentBuilder::new().timeout(timeout).build();

        SpotifyClient {
            agent,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn authorized(&self, request: Request, access_token: &str) -> Request {
        request.set("Authorization", &format!("Bearer {access_token}"))
    }

    fn get_json<T: DeserializeOwned>(&self, url: &str, access_token: &str) -> Result<T, ApiError> {
        debug!("GET {url}");
        let response = self.authorized(self.agent.get(url), access_token).call()?;
        response.into_json::<T>().map_err(ApiError::from)
    }

    /// Look up the id of the account the token belongs to
    pub fn current_user_id(&self, access_token: &str) -> Result<String, ApiError> {
        let url = format!("{}/me", self.base_url);
        let user: CurrentUserResponse = self.get_json(&url, access_token)?;

        if let Some(name) = &user.display_name {
            debug!("Authenticated as {name} ({})", user.id);
        }
        Ok(user.id)
    }
}

impl CatalogApi for SpotifyClient {
    fn search_tracks(
        &self,
        session: &Session,
        query: &str,
        limit: u32,
    ) -> Result<Vec<TrackCandidate>, ApiError> {
        let url = format!(
            "{}/search?q={}&type=track&limit={}",
            self.base_url,
            encode(query),
            limit
        );

        let parsed: SearchResponse = self.get_json(&url, &session.access_token)?;

        Ok(parsed
            .tracks
            .map(|page| page.items)
            .unwrap_or_default()
            .into_iter()
            .flatten()
            .filter_map(ApiTrack::into_candidate)
            .collect())
    }

    fn audio_features(
        &self,
        session: &Session,
        ids: &[String],
    ) -> Result<Vec<AudioFeatures>, ApiError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        if ids.len() > MAX_FEATURE_IDS {
            return Err(ApiError::Status {
                status: 400,
                message: format!(
                    "requested {} ids, the limit is {MAX_FEATURE_IDS}",
                    ids.len()
                ),
            });
        }

        let joined = ids.iter().map(|id| encode(id).into_owned()).collect::<Vec<_>>().join(",");
        let url = format!("{}/audio-features?ids={}", self.base_url, joined);

        let parsed: AudioFeaturesResponse = self.get_json(&url, &session.access_token)?;
        Ok(parsed.audio_features.into_iter().flatten().collect())
    }

    fn create_playlist(
        &self,
        session: &Session,
        name: &str,
        description: &str,
        public: bool,
    ) -> Result<CreatedPlaylist, ApiError> {
        let url = format!(
            "{}/users/{}/playlists",
            self.base_url,
            encode(&session.user_id)
        );
        debug!("POST {url}");

        let body = CreatePlaylistRequest {
            name,
            description,
            public,
        };
        let response = self
            .authorized(self.agent.post(&url), &session.access_token)
            .send_json(&body)?;
        let created: CreatePlaylistResponse = response.into_json()?;

        let url = created
            .external_urls
            .spotify
            .unwrap_or_else(|| format!("https://open.spotify.com/playlist/{}", created.id));

        Ok(CreatedPlaylist {
            id: created.id,
            name: created.name,
            url,
        })
    }

    fn add_tracks(
        &self,
        session: &Session,
        playlist_id: &str,
        uris: &[String],
    ) -> Result<(), ApiError> {
        let url = format!(
            "{}/playlists/{}/tracks",
            self.base_url,
            encode(playlist_id)
        );
        debug!("POST {url} ({} uris)", uris.len());

        self.authorized(self.agent.post(&url), &session.access_token)
            .send_json(&AddTracksRequest { uris })?;
        Ok(())
    }
}
