//! Error types for forecasting operations

use thiserror::Error;

/// Errors surfaced by the forecasting engine.
///
/// Data-insufficiency and model-fit problems never appear here; those
/// degrade to defined fallbacks inside the engine. Only contract
/// violations and artifact I/O reach the caller.
#[derive(Error, Debug)]
pub enum ForecastError {
    #[error("Invalid forecast horizon: {hours} (must be at least 1)")]
    InvalidHorizon { hours: usize },

    #[error("Model artifact error: {message}")]
    Artifact { message: String },

    #[error("Model artifact I/O error: {source}")]
    ArtifactIo {
        #[from]
        source: std::io::Error,
    },

    #[error("Model artifact serialization error: {source}")]
    ArtifactFormat {
        #[from]
        source: serde_json::Error,
    },
}

impl ForecastError {
    pub fn artifact(message: impl Into<String>) -> Self {
        Self::Artifact {
            message: message.into(),
        }
    }
}
