use serde::{Deserialize, Serialize};
use std::fmt;

/// Authenticated catalog-platform session supplied by the caller
#[derive(Clone, PartialEq, Eq)]
pub struct Session {
    pub user_id: String,
    pub access_token: String,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("user_id", &self.user_id)
            .field("access_token", &"<redacted>")
            .finish()
    }
}

/// A track discovered by catalog search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackCandidate {
    pub id: String,
    pub uri: String,
    pub title: String,
    pub primary_artist: String,
}

/// Audio attributes of a single track
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioFeatures {
    pub id: String,
    pub energy: f64,
    pub valence: f64,
    pub tempo: f64,
}

/// Playlist identity returned by the platform after creation
#[derive(Debug, Clone, PartialEq)]
pub struct CreatedPlaylist {
    pub id: String,
    pub name: String,
    pub url: String,
}

// Spotify Web API wire types

/// Response structure for `GET /search?type=track`
#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    pub tracks: Option<TrackPage>,
}

#[derive(Debug, Deserialize)]
pub struct TrackPage {
    #[serde(default)]
    pub items: Vec<Option<ApiTrack>>,
}

#[derive(Debug, Deserialize)]
pub struct ApiTrack {
    pub id: Option<String>,
    pub uri: Option<String>,
    pub name: String,
    #[serde(default)]
    pub artists: Vec<ApiArtist>,
}

#[derive(Debug, Deserialize)]
pub struct ApiArtist {
    pub name: String,
}

impl ApiTrack {
    /// Convert to a candidate, rejecting tracks without an identity (local files, podcasts)
    pub fn into_candidate(self) -> Option<TrackCandidate> {
        let id = self.id.filter(|id| !id.is_empty())?;
        let uri = self
            .uri
            .filter(|uri| !uri.is_empty())
            .unwrap_or_else(|| format!("spotify:track:{id}"));
        let primary_artist = self
            .artists
            .into_iter()
            .next()
            .map(|a| a.name)
            .unwrap_or_else(|| "Unknown".to_string());

        Some(TrackCandidate {
            id,
            uri,
            title: self.name,
            primary_artist,
        })
    }
}

/// Response structure for `GET /audio-features?ids=...`
///
/// Unknown ids come back as `null` entries.
#[derive(Debug, Deserialize)]
pub struct AudioFeaturesResponse {
    #[serde(default)]
    pub audio_features: Vec<Option<AudioFeatures>>,
}

/// Body for `POST /users/{user_id}/playlists`
#[derive(Debug, Serialize)]
pub struct CreatePlaylistRequest<'a> {
    pub name: &'a str,
    pub description: &'a str,
    pub public: bool,
}

#[derive(Debug, Deserialize)]
pub struct CreatePlaylistResponse {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub external_urls: ExternalUrls,
}

#[derive(Debug, Default, Deserialize)]
pub struct ExternalUrls {
    pub spotify: Option<String>,
}

/// Body for `POST /playlists/{playlist_id}/tracks`
#[derive(Debug, Serialize)]
pub struct AddTracksRequest<'a> {
    pub uris: &'a [String],
}

#[derive(Debug, Deserialize)]
pub struct CurrentUserResponse {
    pub id: String,
    pub display_name: Option<String>,
}

// Anthropic Messages API wire types

#[derive(Debug, Serialize)]
pub struct MessagesRequest<'a> {
    pub model: &'a str,
    pub max_tokens: u32,
    pub messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Serialize)]
pub struct ChatMessage<'a> {
    pub role: &'a str,
    pub content: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct MessagesResponse {
    #[serde(default)]
    pub content: Vec<ContentBlock>,
    pub stop_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ContentBlock {
    #[serde(rename = "type")]
    pub block_type: String,
    #[serde(default)]
    pub text: Option<String>,
}

impl MessagesResponse {
    /// Concatenate all text blocks of the reply
    pub fn text(&self) -> String {
        self.content
            .iter()
            .filter(|block| block.block_type == "text")
            .filter_map(|block| block.text.as_deref())
            .collect::<Vec<_>>()
            .join("\n")
    }
}
