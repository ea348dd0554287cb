//! Error taxonomy for the conversion pipeline.

/// Top-level error type for a conversion run.
#[derive(Debug, thiserror::Error)]
pub enum ConvertError {
    /// A subtitle block could not be parsed. Fatal before any synthesis starts.
    #[error("malformed cue block {index}: {reason}")]
    MalformedCue { index: usize, reason: String },

    /// A speech synthesis call failed after exhausting retries.
    #[error("speech synthesis failed for {text:?}: {message}")]
    Synthesis { text: String, message: String },

    /// The output container/codec cannot represent the assembled track.
    #[error("encoding error: {message}")]
    Encoding { message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Result type alias using ConvertError.
pub type ConvertResult<T> = Result<T, ConvertError>;

impl ConvertError {
    pub fn malformed_cue(index: usize, reason: impl Into<String>) -> Self {
        Self::MalformedCue {
            index,
            reason: reason.into(),
        }
    }

    pub fn synthesis(text: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Synthesis {
            text: text.into(),
            message: message.into(),
        }
    }

    pub fn encoding(message: impl Into<String>) -> Self {
        Self::Encoding {
            message: message.into(),
        }
    }
}
