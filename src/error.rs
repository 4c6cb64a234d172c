use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("YouTube API key not found. Please set the YOUTUBE_API_KEY environment variable.")]
    MissingApiKey,

    #[error("invalid value for {name}: {value:?}")]
    Invalid { name: &'static str, value: String },
}

/// Failures talking to the YouTube Data API.
#[derive(Debug, Error)]
pub enum YouTubeError {
    #[error("network error: {0}")]
    Transport(String),

    #[error("request failed: {0}")]
    Request(String),

    #[error("YouTube API error {status}: {body}")]
    Status { status: u16, body: String },

    #[error("failed to decode response: {0}")]
    Decode(String),

    #[error("unexpected response: missing {0}")]
    MissingField(&'static str),
}

impl YouTubeError {
    pub fn is_retryable(&self) -> bool {
        match self {
            YouTubeError::Transport(_) => true,
            YouTubeError::Status { status, .. } => *status >= 500,
            _ => false,
        }
    }

    pub(crate) fn from_reqwest(e: reqwest::Error) -> Self {
        if e.is_timeout() || e.is_connect() {
            YouTubeError::Transport(e.to_string())
        } else {
            YouTubeError::Request(e.to_string())
        }
    }
}

#[derive(Debug, Error)]
pub enum CrawlError {
    #[error(transparent)]
    YouTube(#[from] YouTubeError),

    #[error("comment fetch task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}
