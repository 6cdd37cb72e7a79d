#[derive(Debug, thiserror::Error)]
pub enum EmbedError {
    #[error("Could not find embedded image data")]
    NotFound,

    #[error("Invalid resource request: {0}")]
    InvalidRequest(String),
}
