/// Convenience result type used across framemark.
pub type FramemarkResult<T> = Result<T, FramemarkError>;

/// Top-level error taxonomy used by job, crop and handshake APIs.
#[derive(thiserror::Error, Debug)]
pub enum FramemarkError {
    /// Invalid caller-provided parameters, missing fields or missing files.
    #[error("validation error: {0}")]
    Validation(String),

    /// An external renderer did not answer within the configured wait.
    #[error("timeout error: {0}")]
    Timeout(String),

    /// A job stage was invoked before the job was initialized.
    #[error("job not initialized: {0}")]
    NotInitialized(String),

    /// Image data could not be decoded or encoded.
    #[error("codec error: {context}")]
    Codec {
        /// What was being decoded or encoded.
        context: String,
        /// Underlying codec failure.
        #[source]
        source: image::ImageError,
    },

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl FramemarkError {
    /// Build a [`FramemarkError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`FramemarkError::Timeout`] value.
    pub fn timeout(msg: impl Into<String>) -> Self {
        Self::Timeout(msg.into())
    }

    /// Build a [`FramemarkError::NotInitialized`] value.
    pub fn not_initialized(msg: impl Into<String>) -> Self {
        Self::NotInitialized(msg.into())
    }

    /// Build a [`FramemarkError::Codec`] value.
    pub fn codec(context: impl Into<String>, source: image::ImageError) -> Self {
        Self::Codec {
            context: context.into(),
            source,
        }
    }

    /// Return `true` for errors that the caller should treat as a timed-out handshake.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout(_))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
