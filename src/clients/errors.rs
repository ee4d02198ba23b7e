use rspotify::ClientError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Spotify error: {0}")]
    SpotifyError(#[from] ClientError),

    #[error("Invalid playlist reference: {0}")]
    InvalidPlaylist(String),

    #[error("Fixture error: {0}")]
    FixtureError(#[from] serde_json::Error),

    #[error("Track is missing required field `{0}`")]
    MissingField(&'static str),

    #[error("Failed to generate QR code: {0}")]
    QrError(#[from] qrcode::types::QrError),

    #[error("Image error: {0}")]
    ImageError(#[from] image::ImageError),

    #[error("Failed to create PDF: {0}")]
    PdfError(String),

    #[error("Render task failed: {0}")]
    TaskError(String),

    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl From<std::env::VarError> for Error {
    fn from(err: std::env::VarError) -> Self {
        Error::ConfigurationError(err.to_string())
    }
}
