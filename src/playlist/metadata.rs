use super::scoring::ScoredTrack;
use crate::models::CreatedPlaylist;
use serde::Serialize;

/// A track name/artist pair echoed back to the caller
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrackPreview {
    pub name: String,
    pub artist: String,
}

/// Final report of a successful generation
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationResult {
    pub playlist_id: String,
    pub name: String,
    pub url: String,
    pub track_count: usize,
    pub preview: Vec<TrackPreview>,
}

impl GenerationResult {
    pub fn new(playlist: CreatedPlaylist, tracks: &[ScoredTrack], preview_size: usize) -> Self {
        Self {
            playlist_id: playlist.id,
            name: playlist.name,
            url: playlist.url,
            track_count: tracks.len(),
            preview: preview_of(tracks, preview_size),
        }
    }
}

/// The first `size` tracks as name/artist pairs
pub fn preview_of(tracks: &[ScoredTrack], size: usize) -> Vec<TrackPreview> {
    tracks
        .iter()
        .take(size)
        .map(|scored| TrackPreview {
            name: scored.track.title.clone(),
            artist: scored.track.primary_artist.clone(),
        })
        .collect()
}

/// What a dry run would have published
#[derive(Debug, Clone)]
pub struct DraftPlaylist {
    pub name: String,
    pub description: String,
    pub tracks: Vec<ScoredTrack>,
}
