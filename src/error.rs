//! Error types shared by the transport layer and the entities built on top of it.

use std::backtrace::{Backtrace, BacktraceStatus};
use std::fmt::{Display, Formatter};

use crate::config::ConfigError;

/// Crate wide result alias.
pub type Result<T, E = DataverseError> = std::result::Result<T, E>;

/// Everything that can go wrong while talking to a Dataverse instance.
#[derive(Debug, thiserror::Error)]
pub enum DataverseError {
    /// Endpoint or token missing/invalid. Raised before any request.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The server answered with its `{"status": "ERROR", "message": ...}` envelope.
    #[error("{message}")]
    Api {
        status: u16,
        message: String,
        endpoint: String,
        trace: TrimmedBacktrace,
    },

    /// A version selector that does not resolve on this dataset.
    #[error("Version {0} does not exist")]
    VersionNotFound(String),

    /// The caller asked for a metadata export kind we do not know.
    #[error("Unknown metadata format: '{0}'")]
    UnsupportedFormat(String),

    /// The server returned a discriminator (`type`, `typeClass`, `versionState`) we cannot handle.
    #[error("Unsupported type: {0}")]
    UnsupportedType(String),

    /// Input for create/import could not be turned into a request body.
    #[error("Data could not be parsed: {0}")]
    MalformedInput(String),

    /// Non-success HTTP status without the API error envelope.
    #[error("HTTP {status} calling {endpoint}: {body}")]
    Http {
        status: u16,
        endpoint: String,
        body: String,
    },

    #[error(transparent)]
    Transport(#[from] reqwest::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error("invalid XML: {0}")]
    Xml(String),

    #[error("Can only delete draft version")]
    DraftOnly,

    #[error("unexpected HTTP status {0}")]
    UnexpectedStatus(u16),
}

impl DataverseError {
    /// True if the server reported that the addressed resource does not exist.
    pub fn is_not_found(&self) -> bool {
        match self {
            DataverseError::Api { status, .. } | DataverseError::Http { status, .. } => {
                *status == 404
            }
            DataverseError::Transport(err) => {
                err.status() == Some(reqwest::StatusCode::NOT_FOUND)
            }
            _ => false,
        }
    }

    /// Message carried by an API error, if this is one.
    pub fn api_message(&self) -> Option<&str> {
        match self {
            DataverseError::Api { message, .. } => Some(message),
            _ => None,
        }
    }
}

/// A rendered backtrace with the transport layer's own frames cut off.
///
/// Capturing follows `RUST_BACKTRACE`; when backtraces are disabled the trace is empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrimmedBacktrace {
    frames: Vec<String>,
}

impl TrimmedBacktrace {
    /// Captures the current stack and trims it down to the caller's frames.
    pub(crate) fn capture() -> Self {
        let backtrace = Backtrace::capture();
        match backtrace.status() {
            BacktraceStatus::Captured => Self::from_rendered(
                &backtrace.to_string(),
                env!("CARGO_CRATE_NAME"),
                concat!(env!("CARGO_CRATE_NAME"), "::client"),
            ),
            _ => Self::default(),
        }
    }

    /// Drops every frame up to and including the last one in `transport_prefix`.
    /// Without transport frames, drops everything before the first `crate_prefix` frame.
    ///
    /// `rendered` is the `Display` output of a `std::backtrace::Backtrace`:
    /// numbered symbol lines, each optionally followed by an indented `at` line.
    pub(crate) fn from_rendered(rendered: &str, crate_prefix: &str, transport_prefix: &str) -> Self {
        let mut frames: Vec<String> = Vec::new();
        for line in rendered.lines() {
            let trimmed = line.trim_start();
            let is_symbol = trimmed
                .split_once(':')
                .map(|(n, _)| !n.is_empty() && n.chars().all(|c| c.is_ascii_digit()))
                .unwrap_or(false);

            if is_symbol {
                let symbol = trimmed
                    .split_once(':')
                    .map(|(_, s)| s.trim())
                    .unwrap_or_default();
                frames.push(symbol.to_string());
            } else if let Some(last) = frames.last_mut() {
                last.push('\n');
                last.push_str(trimmed);
            }
        }

        // Everything up to the last transport frame is capture and client plumbing.
        let start = match frames.iter().rposition(|f| f.starts_with(transport_prefix)) {
            Some(last) => last + 1,
            None => frames
                .iter()
                .position(|f| f.starts_with(crate_prefix))
                .unwrap_or(frames.len()),
        };

        Self {
            frames: frames.split_off(start),
        }
    }

    pub fn frames(&self) -> &[String] {
        &self.frames
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

impl Display for TrimmedBacktrace {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for (i, frame) in self.frames.iter().enumerate() {
            writeln!(f, "{i:>4}: {frame}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RENDERED: &str = "   0: std::backtrace::Backtrace::capture
             at /rustc/library/std/src/backtrace.rs:296:9
   1: dataverse_rdm::error::TrimmedBacktrace::capture
   2: dataverse_rdm::client::BaseClient::translate_failure
             at ./src/client.rs:210:5
   3: dataverse_rdm::client::BaseClient::call
   4: dataverse_rdm::native_api::dataset::entity::Dataset::fetch
             at ./src/native_api/dataset/entity.rs:80:9
   5: my_app::main
";

    #[test]
    fn test_trim_drops_transport_frames() {
        let trace =
            TrimmedBacktrace::from_rendered(RENDERED, "dataverse_rdm", "dataverse_rdm::client");

        assert_eq!(trace.frames().len(), 2);
        assert!(trace.frames()[0].starts_with("dataverse_rdm::native_api::dataset"));
    }

    #[test]
    fn test_trim_keeps_location_lines() {
        let trace = TrimmedBacktrace::from_rendered(
            RENDERED,
            "dataverse_rdm::native_api",
            "dataverse_rdm::client",
        );

        assert_eq!(trace.frames().len(), 2);
        assert!(trace.frames()[0].contains("at ./src/native_api/dataset/entity.rs:80:9"));
        assert_eq!(trace.frames()[1], "my_app::main");
    }

    #[test]
    fn test_trim_without_crate_frames_is_empty() {
        let trace = TrimmedBacktrace::from_rendered(RENDERED, "other_crate", "other_crate::client");
        assert!(trace.is_empty());
    }

    #[test]
    fn test_is_not_found() {
        let err = DataverseError::Api {
            status: 404,
            message: "Can't find dataverse with identifier='nope'".to_string(),
            endpoint: "dataverses/nope".to_string(),
            trace: TrimmedBacktrace::default(),
        };
        assert!(err.is_not_found());
        assert_eq!(err.api_message(), Some("Can't find dataverse with identifier='nope'"));

        let err = DataverseError::Http {
            status: 500,
            endpoint: "dataverses/1".to_string(),
            body: "oops".to_string(),
        };
        assert!(!err.is_not_found());
        assert!(!DataverseError::DraftOnly.is_not_found());
    }
}
