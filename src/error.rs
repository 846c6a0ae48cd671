use std::fmt;
use thiserror::Error;

/// Failure of a single call to an upstream HTTP API
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("invalid response: {0}")]
    Decode(String),
}

impl ApiError {
    /// Upstream HTTP status, when the call got that far
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Build a status error from a response body, preferring the
    /// `{"error": {"message": ...}}` envelope used by both Spotify and Anthropic.
    pub fn from_body(status: u16, body: &str) -> Self {
        let message = serde_json::from_str::<serde_json::Value>(body)
            .ok()
            .and_then(|json| {
                let error = json.get("error")?;
                error
                    .get("message")
                    .and_then(|m| m.as_str())
                    .or_else(|| error.as_str())
                    .map(str::to_string)
            })
            .unwrap_or_else(|| {
                let trimmed = body.trim();
                if trimmed.is_empty() {
                    "no response body".to_string()
                } else {
                    trimmed.chars().take(200).collect()
                }
            });

        ApiError::Status { status, message }
    }
}

impl From<ureq::Error> for ApiError {
    fn from(err: ureq::Error) -> Self {
        match err {
            ureq::Error::Status(status, response) => {
                let body = response.into_string().unwrap_or_default();
                ApiError::from_body(status, &body)
            }
            ureq::Error::Transport(transport) => ApiError::Transport(transport.to_string()),
        }
    }
}

impl From<std::io::Error> for ApiError {
    fn from(err: std::io::Error) -> Self {
        ApiError::Decode(err.to_string())
    }
}

/// Pipeline stages, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Authorizing,
    Interpreting,
    Searching,
    Scoring,
    Publishing,
    Done,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Authorizing => "authorizing",
            Stage::Interpreting => "interpreting",
            Stage::Searching => "searching",
            Stage::Scoring => "scoring",
            Stage::Publishing => "publishing",
            Stage::Done => "done",
        };
        f.write_str(name)
    }
}

/// Which half of publishing failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishStep {
    Create,
    AddTracks,
}

impl fmt::Display for PublishStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PublishStep::Create => f.write_str("create playlist"),
            PublishStep::AddTracks => f.write_str("add tracks"),
        }
    }
}

/// The single failure a generation request can end with
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("invalid input: {0}")]
    InputInvalid(String),

    #[error("language model unavailable: {0}")]
    UpstreamUnavailable(#[source] ApiError),

    #[error("no tracks found for any of {queries} search queries")]
    NoCandidatesFound { queries: usize },

    #[error("failed to {step}: {source}")]
    PublishFailed {
        step: PublishStep,
        /// Set when the playlist was created but populating it failed
        playlist_id: Option<String>,
        #[source]
        source: ApiError,
    },
}

impl GenerationError {
    /// The stage the pipeline was in when it failed
    pub fn stage(&self) -> Stage {
        match self {
            GenerationError::InputInvalid(_) => Stage::Authorizing,
            GenerationError::UpstreamUnavailable(_) => Stage::Interpreting,
            GenerationError::NoCandidatesFound { .. } => Stage::Searching,
            GenerationError::PublishFailed { .. } => Stage::Publishing,
        }
    }
}
