use crate::client::params;
use crate::datasetversion::DatasetVersion;
use crate::error::Result;
use crate::utils::size_from_response;

use super::entity::Dataset;

impl Dataset {
    /// Retrieves the storage size of the dataset in bytes, over all versions.
    pub fn size(&self) -> Result<u64> {
        let data = self.client.get(
            &self.path("storagesize"),
            params([("includeCached", "true")]),
        )?;

        size_from_response(&data)
    }

    /// Retrieves the size of the files available for download in a version.
    ///
    /// # Arguments
    ///
    /// * `version` - The version to measure. Unknown versions are an error.
    ///
    /// # Returns
    ///
    /// The size in bytes.
    pub fn download_size(&mut self, version: DatasetVersion) -> Result<u64> {
        let key = self.resolve_version(version)?;
        let data = self
            .client
            .get(&self.path(&format!("versions/{key}/downloadsize")), None)?;

        size_from_response(&data)
    }
}
