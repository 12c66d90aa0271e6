use std::fmt::Display;
use std::str::FromStr;

use serde::Deserialize;

use crate::error::{DataverseError, Result};

/// A released version number, ordered numerically (`1.10` sorts after `1.9`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VersionNumber {
    pub major: u32,
    pub minor: u32,
}

impl VersionNumber {
    pub fn new(major: u32, minor: u32) -> Self {
        Self { major, minor }
    }
}

impl FromStr for VersionNumber {
    type Err = String;

    /// Parses `M` or `M.m`. A bare major number means minor `0`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || format!("Invalid version number: '{s}'");
        let (major, minor) = match s.trim().split_once('.') {
            Some((major, minor)) => (major, minor),
            None => (s.trim(), "0"),
        };

        Ok(Self {
            major: major.parse().map_err(|_| invalid())?,
            minor: minor.parse().map_err(|_| invalid())?,
        })
    }
}

impl Display for VersionNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// Represents the ways a caller can address a version of a dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DatasetVersion {
    /// The draft if there is one, otherwise the latest published version.
    Latest,
    /// The latest published version of the dataset.
    LatestPublished,
    /// The draft version of the dataset.
    Draft,
    /// A specific published version of the dataset.
    Number(VersionNumber),
}

impl Default for DatasetVersion {
    fn default() -> Self {
        DatasetVersion::Latest
    }
}

impl FromStr for DatasetVersion {
    type Err = DataverseError;

    /// Converts a string slice to a `DatasetVersion`.
    ///
    /// Symbolic names may carry the `:` prefix used in API paths.
    /// Anything else has to be a version number.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "latest" | ":latest" => Ok(DatasetVersion::Latest),
            "draft" | ":draft" => Ok(DatasetVersion::Draft),
            "published" | ":published" | "latest-published" | ":latest-published" => {
                Ok(DatasetVersion::LatestPublished)
            }
            other => other
                .parse::<VersionNumber>()
                .map(DatasetVersion::Number)
                .map_err(|_| DataverseError::VersionNotFound(s.to_string())),
        }
    }
}

impl Display for DatasetVersion {
    /// Formats the `DatasetVersion` the way the API expects it in paths.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DatasetVersion::Latest => write!(f, ":latest"),
            DatasetVersion::Draft => write!(f, ":draft"),
            DatasetVersion::LatestPublished => write!(f, ":latest-published"),
            DatasetVersion::Number(v) => write!(f, "{v}"),
        }
    }
}

impl From<VersionNumber> for DatasetVersion {
    fn from(value: VersionNumber) -> Self {
        DatasetVersion::Number(value)
    }
}

impl From<VersionKey> for DatasetVersion {
    fn from(value: VersionKey) -> Self {
        match value {
            VersionKey::Draft => DatasetVersion::Draft,
            VersionKey::Released(number) => DatasetVersion::Number(number),
        }
    }
}

/// Canonical key of a concrete version: the single draft or a released number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum VersionKey {
    Draft,
    Released(VersionNumber),
}

impl Display for VersionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VersionKey::Draft => write!(f, ":draft"),
            VersionKey::Released(v) => write!(f, "{v}"),
        }
    }
}

/// `versionState` as reported by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VersionState {
    Draft,
    Released,
    Archived,
    Deaccessioned,
}

/// The identifying part of a version record.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionSummary {
    pub version_state: VersionState,
    #[serde(default)]
    pub version_number: Option<u32>,
    #[serde(default)]
    pub version_minor_number: Option<u32>,
}

impl VersionSummary {
    /// Derives the cache key of this version.
    ///
    /// Only drafts and released versions can be addressed.
    pub fn key(&self) -> Result<VersionKey> {
        match self.version_state {
            VersionState::Draft => Ok(VersionKey::Draft),
            VersionState::Released => Ok(VersionKey::Released(VersionNumber::new(
                self.version_number.unwrap_or(0),
                self.version_minor_number.unwrap_or(0),
            ))),
            other => Err(DataverseError::UnsupportedType(format!(
                "version state {other:?}"
            ))),
        }
    }
}
