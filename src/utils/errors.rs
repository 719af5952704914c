use thiserror::Error;

/// Terminal error taxonomy for the playback core. Every asynchronous failure
/// path ends up as one of these; the coordinator logs them and nothing
/// propagates past its boundary.
#[derive(Error, Debug)]
pub enum PlaybackError {
    #[error("invalid or missing attribute: {0}")]
    MissingAttribute(String),

    #[error("stream resolution failed: {0}")]
    StreamResolution(String),

    #[error("playlist repository error: {0}")]
    Repository(String),

    #[error("simultaneous streams not allowed")]
    SimultaneousStreams,

    #[error("progress update failed: {0}")]
    Progress(String),

    #[error("player error: {0}")]
    Player(String),
}

#[derive(Error, Debug)]
pub enum RepositoryError {
    #[error("no playlist for content: {0}")]
    NotFound(String),

    #[error("repository failure: {0}")]
    Storage(String),
}

#[derive(Error, Debug)]
pub enum StreamServiceError {
    #[error("video not found: {0}")]
    NotFound(String),

    #[error("network error: {0}")]
    Network(String),

    #[error("stream service failure: {0}")]
    Service(String),
}

#[derive(Error, Debug)]
pub enum ProgressServiceError {
    #[error("simultaneous streams not allowed")]
    SimultaneousStreamsNotAllowed,

    #[error("progress service failure: {0}")]
    Other(String),
}

#[derive(Error, Debug)]
pub enum PlayerError {
    #[error("player failure: {0}")]
    Failed(String),
}

impl From<RepositoryError> for PlaybackError {
    fn from(err: RepositoryError) -> Self {
        PlaybackError::Repository(err.to_string())
    }
}

impl From<StreamServiceError> for PlaybackError {
    fn from(err: StreamServiceError) -> Self {
        PlaybackError::StreamResolution(err.to_string())
    }
}

impl From<ProgressServiceError> for PlaybackError {
    fn from(err: ProgressServiceError) -> Self {
        match err {
            ProgressServiceError::SimultaneousStreamsNotAllowed => {
                PlaybackError::SimultaneousStreams
            }
            ProgressServiceError::Other(reason) => PlaybackError::Progress(reason),
        }
    }
}

impl From<PlayerError> for PlaybackError {
    fn from(err: PlayerError) -> Self {
        PlaybackError::Player(err.to_string())
    }
}
