use serde_json::Value;

use crate::datasetversion::{DatasetVersion, VersionKey};
use crate::error::{DataverseError, Result};

use super::entity::Dataset;

impl Dataset {
    /// Deletes the draft version.
    ///
    /// Only the draft's cache entries are dropped. When no released version
    /// remains the dataset itself is gone and the entity is reset to an
    /// empty snapshot.
    ///
    /// # Errors
    ///
    /// [`DataverseError::DraftOnly`] without sending a request if there is no draft.
    pub fn delete(&mut self) -> Result<String> {
        if self.draft_version().is_none() {
            return Err(DataverseError::DraftOnly);
        }

        self.versions()?;
        let result = self.client.delete(&self.path("versions/:draft"), None)?;

        self.records.remove(&VersionKey::Draft);
        if let Some(versions) = self.versions.as_mut() {
            versions.retain(|v| *v != DatasetVersion::Draft);
        }
        if self.published_versions()?.is_empty() {
            self.reset();
        }

        Ok(result
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string())
    }
}
