use serde_json::Value;

use crate::datasetversion::{DatasetVersion, VersionKey, VersionNumber, VersionState, VersionSummary};
use crate::error::{DataverseError, Result};

use super::entity::{Dataset, VersionRecord};

impl Dataset {
    /// The draft key if this dataset has a draft.
    pub fn draft_version(&self) -> Option<VersionKey> {
        self.records
            .contains_key(&VersionKey::Draft)
            .then_some(VersionKey::Draft)
    }

    /// Released version numbers in ascending order, fetched once.
    pub fn published_versions(&mut self) -> Result<&[VersionNumber]> {
        if self.published_versions.is_none() {
            let listing = self.client.get(&self.path("versions"), None)?;
            let summaries: Vec<VersionSummary> = serde_json::from_value(listing)
                .map_err(|e| DataverseError::UnsupportedType(format!("version listing: {e}")))?;

            let mut numbers = Vec::new();
            for summary in summaries {
                if summary.version_state != VersionState::Released {
                    continue;
                }
                if let VersionKey::Released(number) = summary.key()? {
                    numbers.push(number);
                }
            }
            numbers.sort();
            numbers.dedup();

            self.published_versions = Some(numbers);
        }

        Ok(self.published_versions.as_deref().unwrap_or_default())
    }

    /// Every selector that resolves on this dataset.
    ///
    /// The order is `latest`, `latest-published` (if anything is released),
    /// `draft` (if there is one) and then the released numbers ascending.
    pub fn versions(&mut self) -> Result<Vec<DatasetVersion>> {
        if let Some(versions) = &self.versions {
            return Ok(versions.clone());
        }

        let published = self.published_versions()?.to_vec();
        let mut versions = vec![DatasetVersion::Latest];
        if !published.is_empty() {
            versions.push(DatasetVersion::LatestPublished);
        }
        if self.draft_version().is_some() {
            versions.push(DatasetVersion::Draft);
        }
        versions.extend(published.into_iter().map(DatasetVersion::Number));

        self.versions = Some(versions.clone());
        Ok(versions)
    }

    /// Resolves a selector to its canonical key, fetching the version on first use.
    ///
    /// # Errors
    ///
    /// [`DataverseError::VersionNotFound`] if nothing on this dataset matches.
    pub fn resolve_version(&mut self, version: DatasetVersion) -> Result<VersionKey> {
        self.version(version)?
            .ok_or_else(|| DataverseError::VersionNotFound(version.to_string()))
    }

    /// Like [`Dataset::resolve_version`], but a missing version is `Ok(None)`.
    pub fn version(&mut self, version: DatasetVersion) -> Result<Option<VersionKey>> {
        let candidate = match version {
            DatasetVersion::Draft => Some(VersionKey::Draft),
            DatasetVersion::Latest => match self.draft_version() {
                Some(draft) => Some(draft),
                None => self.latest_published()?,
            },
            DatasetVersion::LatestPublished => self.latest_published()?,
            DatasetVersion::Number(number) => Some(VersionKey::Released(number)),
        };

        let Some(key) = candidate else {
            return Ok(None);
        };

        if self.records.contains_key(&key) {
            return Ok(Some(key));
        }

        // The draft is only known through a cached record
        let exists = match key {
            VersionKey::Draft => false,
            VersionKey::Released(number) => self.published_versions()?.contains(&number),
        };
        if !exists {
            return Ok(None);
        }

        let data: Value = self.client.get(&self.path(&format!("versions/{key}")), None)?;
        let stored = self.store_version(data)?;
        tracing::debug!(dataset = self.id, version = %stored, "cached dataset version");

        Ok(Some(stored))
    }

    /// The cached record of a version, fetched if needed.
    pub fn version_record(&mut self, version: DatasetVersion) -> Result<&VersionRecord> {
        let key = self.resolve_version(version)?;
        self.records
            .get(&key)
            .ok_or_else(|| DataverseError::VersionNotFound(version.to_string()))
    }

    fn latest_published(&mut self) -> Result<Option<VersionKey>> {
        Ok(self
            .published_versions()?
            .last()
            .copied()
            .map(VersionKey::Released))
    }
}
