use thiserror::Error;

/// Central error type for the stem-chunker crate.
#[derive(Debug, Error)]
pub enum SplitError {
    // Generic fallback (wraps anyhow)
    #[error("{0}")]
    Anyhow(#[from] anyhow::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Model adapter failed on window {window}: {source}")]
    Adapter {
        window: usize,
        #[source]
        source: anyhow::Error,
    },

    #[error("Model adapter returned shape {actual:?} for window {window}, expected {expected:?}")]
    AdapterShape {
        window: usize,
        expected: [usize; 3],
        actual: Vec<usize>,
    },

    #[error("Geometry error: {0}")]
    Geometry(String),

    #[error("Stream aborted after window {window} failed")]
    StreamAborted { window: usize },
}

impl SplitError {
    pub(crate) fn config(msg: impl Into<String>) -> Self {
        SplitError::InvalidConfiguration(msg.into())
    }

    pub(crate) fn geometry(msg: impl Into<String>) -> Self {
        SplitError::Geometry(msg.into())
    }
}

impl From<std::io::Error> for SplitError {
    fn from(e: std::io::Error) -> Self {
        SplitError::Anyhow(e.into())
    }
}

impl From<serde_json::Error> for SplitError {
    fn from(e: serde_json::Error) -> Self {
        SplitError::Anyhow(e.into())
    }
}

pub type Result<T> = std::result::Result<T, SplitError>;
