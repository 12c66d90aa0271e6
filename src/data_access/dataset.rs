//! Dataset bundle downloads
//!
//! This module provides functionality for:
//! - Streaming the zipped file bundle of a dataset version to local storage
//! - Generating bundle names from the dataset and version

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use crate::client::params;
use crate::datasetversion::DatasetVersion;
use crate::error::Result;
use crate::native_api::dataset::Dataset;
use crate::progress::{setup_progress_log, ProgressWriter};

/// Name the server gives a dataset bundle.
pub const DEFAULT_BUNDLE_NAME: &str = "dataverse_files.zip";

impl Dataset {
    /// Downloads the file bundle of a dataset to `target`.
    ///
    /// This function performs the following steps:
    /// 1. Resolves the requested version, if any.
    /// 2. Requests the bundle by persistent identifier.
    /// 3. Creates the target file once the server accepted the request.
    /// 4. Streams the body to the file in fixed-size chunks.
    ///
    /// # Arguments
    ///
    /// * `target` - Path of the file to write. Missing parent directories are created.
    /// * `version` - The version to download. Without one, the server picks the latest
    ///               version the caller may see.
    ///
    /// # Returns
    ///
    /// `Some(bytes)` on success, `None` if the server refused the download.
    /// In the latter case no file is created.
    ///
    /// # Errors
    ///
    /// This function will return an error if:
    /// - The version does not exist. No download request is made then.
    /// - The target cannot be created or written.
    /// - The transport fails mid-stream.
    pub fn download<P: AsRef<Path>>(
        &mut self,
        target: P,
        version: Option<DatasetVersion>,
    ) -> Result<Option<u64>> {
        let version = match version {
            Some(version) => Some(self.resolve_version(version)?),
            None => None,
        };
        let pid = self.persistent_id()?;

        let mut path = "access/dataset/:persistentId".to_string();
        if let Some(version) = version {
            path.push_str(&format!("/versions/{version}"));
        }

        let target = target.as_ref();
        let name = target
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_else(|| DEFAULT_BUNDLE_NAME.to_string());

        let written = self
            .client
            .stream(&path, params([("persistentId", pid.as_str())]), |size| {
                if let Some(parent) = target.parent().filter(|p| !p.as_os_str().is_empty()) {
                    std::fs::create_dir_all(parent)?;
                }
                let file = File::create(target)?;
                Ok(ProgressWriter::new(
                    BufWriter::new(file),
                    setup_progress_log(size, &name),
                ))
            })?;

        if let Some(bytes) = written {
            tracing::debug!(dataset = self.id, bytes, target = %target.display(), "dataset downloaded");
        }

        Ok(written)
    }

    /// Generates a standardized name for the dataset bundle file.
    ///
    /// # Returns
    ///
    /// A name in the format `dataset-{version}-{id}.zip`.
    pub fn bundle_name(&self, version: DatasetVersion) -> String {
        format!(
            "dataset-{}-{}.zip",
            remove_special_chars(&version.to_string()),
            self.id
        )
    }
}

/// Removes everything but alphanumeric characters and hyphens.
fn remove_special_chars(id: &str) -> String {
    id.chars()
        .filter(|c| c.is_alphanumeric() || *c == '-')
        .collect()
}
