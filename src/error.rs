use anyhow::Error as AnyhowError;
use thiserror::Error;

/// Result alias for errors emitted by semfix internals.
pub type SemfixResult<T> = Result<T, SemfixError>;

/// Structured error type for semfix subsystems.
///
/// Only genuinely exceptional conditions end up here. A rule that cannot
/// resolve a symbol or re-locate a node returns an empty result instead.
#[derive(Debug, Error)]
pub enum SemfixError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{document}: parse error at byte {offset}: {message}")]
    Parse {
        document: String,
        offset: usize,
        message: String,
    },

    #[error("invalid compilation snapshot: {0}")]
    Snapshot(String),

    #[error("invalid edit: {0}")]
    Edit(String),

    #[error("{0}")]
    Other(String),
}

impl SemfixError {
    pub fn parse(document: impl Into<String>, offset: usize, message: impl Into<String>) -> Self {
        Self::Parse {
            document: document.into(),
            offset,
            message: message.into(),
        }
    }

    pub fn snapshot(msg: impl Into<String>) -> Self {
        Self::Snapshot(msg.into())
    }

    pub fn edit(msg: impl Into<String>) -> Self {
        Self::Edit(msg.into())
    }

    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }

    /// Convert to anyhow::Error for interop with anyhow-based code.
    pub fn into_anyhow(self) -> AnyhowError {
        AnyhowError::new(self)
    }
}

impl From<AnyhowError> for SemfixError {
    fn from(err: AnyhowError) -> Self {
        SemfixError::other(format!("{err:#}"))
    }
}

impl From<serde_json::Error> for SemfixError {
    fn from(err: serde_json::Error) -> Self {
        SemfixError::snapshot(err.to_string())
    }
}

/// Convenience macro mirroring `anyhow::bail!` but returning SemfixError.
#[macro_export]
macro_rules! semfix_bail {
    ($($arg:tt)*) => {
        return Err($crate::error::SemfixError::other(format!($($arg)*)));
    };
}

/// Convenience macro mirroring `anyhow::ensure!`.
#[macro_export]
macro_rules! semfix_ensure {
    ($cond:expr, $($arg:tt)*) => {
        if !($cond) {
            $crate::semfix_bail!($($arg)*);
        }
    };
}
