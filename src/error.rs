use thiserror::Error;

/// Failure of a single provider call. Only `Timeout` is worth retrying.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("provider request timed out: {0}")]
    Timeout(String),

    #[error("provider request failed: {0}")]
    Provider(String),

    #[error("no provider record for {0}")]
    NotFound(String),
}

impl FetchError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, FetchError::Timeout(_))
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FetchError::Timeout(err.to_string())
        } else {
            FetchError::Provider(err.to_string())
        }
    }
}

/// Coarse grouping the inbound caller uses to pick user-facing wording.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Unavailable,
    Unexpected,
}

/// Terminal failure of a card request.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CardError {
    #[error("Player {name} not found")]
    PlayerNotFound { name: String },

    #[error("Could not find stats for player ID {player_id}")]
    StatsNotFound { player_id: u64 },

    #[error("stats provider timed out after {attempts} attempts, please try again later")]
    ProviderUnavailable { attempts: u32 },

    #[error("error fetching player stats: {0}")]
    ProviderError(String),
}

impl CardError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CardError::PlayerNotFound { .. } => ErrorKind::NotFound,
            CardError::ProviderUnavailable { .. } => ErrorKind::Unavailable,
            CardError::StatsNotFound { .. } | CardError::ProviderError(_) => ErrorKind::Unexpected,
        }
    }
}
