//! Error taxonomy for the scan → classify → pack pipeline.
//!
//! Every variant here is recoverable at the item level: the walker skips,
//! the batch writer inlines a marker, the runner reports and moves on.

use std::path::PathBuf;

use camino::Utf8PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum PackError
{
    /// Filesystem operation failed for a specific path
    #[error("{path}: {source}")]
    Io
    {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// File bytes are not valid UTF-8
    #[error("{path} is not valid UTF-8: {source}")]
    Decode
    {
        path: Utf8PathBuf,
        #[source]
        source: std::str::Utf8Error,
    },

    /// Walked path cannot be represented as UTF-8, so no rule can match it
    #[error("path is not valid UTF-8: {}", .0.display())]
    NonUtf8Path(PathBuf),

    /// Directory entry could not be read during traversal
    #[error("walk error: {0}")]
    Walk(#[from] ignore::Error),

    /// Rule table is malformed
    #[error("invalid rule for category {category}: {reason}")]
    InvalidRule
    {
        category: String,
        reason: String,
    },
}

impl PackError
{
    pub fn io(
        path: impl Into<Utf8PathBuf>,
        source: std::io::Error,
    ) -> Self
    {
        Self::Io { path: path.into(), source }
    }

    /// Message without the path prefix, for places that already print the path
    pub fn reason(&self) -> String
    {
        match self
        {
            Self::Io { source, .. } => source.to_string(),
            Self::Decode { source, .. } => format!("invalid UTF-8: {source}"),
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn reason_drops_path_prefix()
    {
        let err = PackError::io(
            "src/app/page.tsx",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert_eq!(err.reason(), "denied");
        assert_eq!(err.to_string(), "src/app/page.tsx: denied");
    }
}
