use std::fmt::Display;
use std::str::FromStr;

use serde_json::{Map, Value};

use crate::client::params;
use crate::datasetversion::DatasetVersion;
use crate::error::{DataverseError, Result};
use crate::response::XmlDocument;
use crate::utils::License;

use super::entity::Dataset;

/// The metadata formats a dataset can be exported in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExportFormat {
    Ddi,
    OaiDdi,
    Dcterms,
    OaiDc,
    Datacite,
    OaiDatacite,
    SchemaOrg,
    OaiOre,
    DataverseJson,
    /// Snapshot merged with a version, its metadata, files and license.
    Rdm,
    /// Snapshot merged with a version and its live metadata blocks.
    Raw,
}

/// How an export is produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFamily {
    /// Proxied to the server's exporter, answered as XML.
    Xml,
    /// Proxied to the server's exporter, answered as JSON.
    Json,
    /// Built from the cached entity data.
    Local,
}

impl ExportFormat {
    pub const ALL: [ExportFormat; 11] = [
        ExportFormat::Rdm,
        ExportFormat::Raw,
        ExportFormat::SchemaOrg,
        ExportFormat::OaiOre,
        ExportFormat::DataverseJson,
        ExportFormat::Ddi,
        ExportFormat::OaiDdi,
        ExportFormat::Dcterms,
        ExportFormat::OaiDc,
        ExportFormat::Datacite,
        ExportFormat::OaiDatacite,
    ];

    /// The exporter name used by the server.
    pub fn name(&self) -> &'static str {
        match self {
            ExportFormat::Ddi => "ddi",
            ExportFormat::OaiDdi => "oai_ddi",
            ExportFormat::Dcterms => "dcterms",
            ExportFormat::OaiDc => "oai_dc",
            ExportFormat::Datacite => "Datacite",
            ExportFormat::OaiDatacite => "oai_datacite",
            ExportFormat::SchemaOrg => "schema.org",
            ExportFormat::OaiOre => "OAI_ORE",
            ExportFormat::DataverseJson => "dataverse_json",
            ExportFormat::Rdm => "rdm",
            ExportFormat::Raw => "raw",
        }
    }

    pub fn family(&self) -> ExportFamily {
        match self {
            ExportFormat::Ddi
            | ExportFormat::OaiDdi
            | ExportFormat::Dcterms
            | ExportFormat::OaiDc
            | ExportFormat::Datacite
            | ExportFormat::OaiDatacite => ExportFamily::Xml,
            ExportFormat::SchemaOrg | ExportFormat::OaiOre | ExportFormat::DataverseJson => {
                ExportFamily::Json
            }
            ExportFormat::Rdm | ExportFormat::Raw => ExportFamily::Local,
        }
    }
}

impl FromStr for ExportFormat {
    type Err = DataverseError;

    /// Exporter names are matched exactly, as the server spells them.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ExportFormat::ALL
            .into_iter()
            .find(|format| format.name() == s)
            .ok_or_else(|| DataverseError::UnsupportedFormat(s.to_string()))
    }
}

impl Display for ExportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// An exported metadata document.
#[derive(Debug, Clone, PartialEq)]
pub enum Export {
    Xml(XmlDocument),
    Json(Value),
}

impl Dataset {
    /// Exports the metadata of the latest published version.
    ///
    /// # Arguments
    ///
    /// * `kind` - An exporter name such as `ddi`, `schema.org` or `rdm`.
    ///
    /// # Returns
    ///
    /// `None` if the dataset has never been published.
    ///
    /// # Errors
    ///
    /// [`DataverseError::UnsupportedFormat`] for an unknown kind, before any request.
    pub fn export_metadata(&mut self, kind: &str) -> Result<Option<Export>> {
        let format: ExportFormat = kind.parse()?;

        if self.version(DatasetVersion::LatestPublished)?.is_none() {
            return Ok(None);
        }

        match (format.family(), format) {
            (ExportFamily::Local, ExportFormat::Rdm) => {
                Ok(self.rdm_data(DatasetVersion::LatestPublished)?.map(Export::Json))
            }
            (ExportFamily::Local, _) => Ok(Some(Export::Json(
                self.raw_data(DatasetVersion::Latest, false)?,
            ))),
            (ExportFamily::Xml, _) => {
                let pid = self.persistent_id()?;
                let doc = self.client.xml("datasets/export", exporter_params(format, &pid))?;
                Ok(Some(Export::Xml(doc)))
            }
            (ExportFamily::Json, _) => {
                let pid = self.persistent_id()?;
                let doc = self.client.json("datasets/export", exporter_params(format, &pid))?;
                Ok(Some(Export::Json(doc)))
            }
        }
    }

    /// The snapshot merged with a version, its metadata, files and license.
    ///
    /// Returns `None` if the version does not exist.
    pub fn rdm_data(&mut self, version: DatasetVersion) -> Result<Option<Value>> {
        if self.version(version)?.is_none() {
            return Ok(None);
        }

        let record = self.version_record(version)?.clone();
        let mut merged = self.snapshot.as_map().clone();
        merged.extend(record.envelope);
        merged.insert("metadata".to_string(), Value::Object(record.metadata));
        merged.insert("files".to_string(), Value::Array(record.files));

        let license = license_of(&merged);
        merged.insert("license".to_string(), license.to_value());

        Ok(Some(Value::Object(merged)))
    }

    /// The snapshot merged with a version plus its metadata blocks as stored
    /// on the server, wrapped in `datasetVersion`.
    ///
    /// Metadata blocks, and files if `with_files` is set, are fetched live.
    pub fn raw_data(&mut self, version: DatasetVersion, with_files: bool) -> Result<Value> {
        let key = self.resolve_version(version)?;
        let envelope = self.version_record(version)?.envelope.clone();

        let mut result: Map<String, Value> = self.snapshot.as_map().clone();
        result.extend(envelope);

        let blocks = self
            .client
            .get(&self.path(&format!("versions/{key}/metadata")), None)?;
        result.insert("metadataBlocks".to_string(), blocks);

        if with_files {
            let files = self
                .client
                .get(&self.path(&format!("versions/{key}/files")), None)?;
            result.insert("files".to_string(), files);
        }

        let mut wrapped = Map::new();
        wrapped.insert("datasetVersion".to_string(), Value::Object(result));
        Ok(Value::Object(wrapped))
    }
}

fn exporter_params(format: ExportFormat, pid: &str) -> crate::client::Parameters {
    params([("exporter", format.name()), ("persistentId", pid)])
}

/// Scrapes the license from `termsOfUse`, falling back to a structured
/// `license` object as sent by newer servers.
fn license_of(data: &Map<String, Value>) -> License {
    let scraped = data
        .get("termsOfUse")
        .and_then(Value::as_str)
        .map(License::from_terms_of_use)
        .unwrap_or_default();

    if !scraped.is_empty() {
        return scraped;
    }

    data.get("license")
        .map(License::from_structured)
        .unwrap_or_default()
}
