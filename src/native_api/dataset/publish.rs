use std::fmt::Display;

use reqwest::Method;

use crate::client::params;
use crate::datasetversion::VersionKey;
use crate::error::{DataverseError, Result};
use crate::request::RequestType;

use super::entity::Dataset;

/// What happened to a publish request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublishOutcome {
    /// Released right away, carries the persistent identifier.
    Published(String),
    /// A workflow holds the release back.
    WaitingForReview(String),
}

impl Display for PublishOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PublishOutcome::Published(pid) => write!(f, "Dataset {pid} published"),
            PublishOutcome::WaitingForReview(pid) => write!(f, "Dataset {pid} waiting for review"),
        }
    }
}

impl Dataset {
    /// Publishes the draft as a new major or minor version.
    ///
    /// A release turns the draft into a numbered version, so the draft record
    /// and the version lists are dropped and fetched again when needed.
    pub fn publish(&mut self, major: bool) -> Result<PublishOutcome> {
        let pid = self.persistent_id()?;
        let kind = if major { "major" } else { "minor" };

        let status = self.client.status(
            Method::POST,
            &self.path("actions/:publish"),
            params([("type", kind)]),
            RequestType::Plain,
        )?;

        match status {
            200 => {
                self.records.remove(&VersionKey::Draft);
                self.published_versions = None;
                self.versions = None;
                Ok(PublishOutcome::Published(pid))
            }
            202 => Ok(PublishOutcome::WaitingForReview(pid)),
            other => Err(DataverseError::UnexpectedStatus(other)),
        }
    }
}
