use std::collections::BTreeMap;
use std::hash::{Hash, Hasher};

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::client::{params, BaseClient};
use crate::datasetversion::{DatasetVersion, VersionKey, VersionNumber, VersionSummary};
use crate::entity::{Entity, Snapshot};
use crate::error::{DataverseError, Result};
use crate::identifier::Identifier;

use super::metadata::{normalize_metadata, pack_files};

/// Everything cached for one concrete version of a dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct VersionRecord {
    /// State, timestamps and citation info. The version's own `id` is stored as `versionId`.
    pub envelope: Map<String, Value>,
    /// Flattened metadata, see [`normalize_metadata`].
    pub metadata: Map<String, Value>,
    /// File entries with their `dataFile` details merged in.
    pub files: Vec<Value>,
}

impl VersionRecord {
    /// Normalizes a version as returned by the server and derives its key.
    pub fn from_value(data: Value) -> Result<(VersionKey, Self)> {
        let key = VersionSummary::deserialize(&data)
            .map_err(|e| DataverseError::UnsupportedType(format!("version state: {e}")))?
            .key()?;

        let Value::Object(mut envelope) = data else {
            return Err(DataverseError::UnsupportedType(
                "version data is not an object".to_string(),
            ));
        };

        let metadata = normalize_metadata(envelope.remove("metadataBlocks"))?;
        let files = pack_files(envelope.remove("files"));

        if let Some(id) = envelope.remove("id") {
            envelope.insert("versionId".to_string(), id);
        }

        Ok((
            key,
            Self {
                envelope,
                metadata,
                files,
            },
        ))
    }
}

/// A versioned dataset.
///
/// The snapshot holds the dataset level fields. Everything that belongs to a
/// version lives in a [`VersionRecord`], fetched on first access.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub(crate) client: BaseClient,
    pub(crate) id: i64,
    pub(crate) snapshot: Snapshot,
    pub(crate) records: BTreeMap<VersionKey, VersionRecord>,
    pub(crate) published_versions: Option<Vec<VersionNumber>>,
    pub(crate) versions: Option<Vec<DatasetVersion>>,
}

impl Dataset {
    /// Fetches a dataset by its numeric id.
    ///
    /// # Arguments
    ///
    /// * `client` - The client used for this and every later request of the entity.
    /// * `id` - The database id of the dataset.
    ///
    /// # Returns
    ///
    /// The dataset with its latest version already cached.
    pub fn fetch(client: &BaseClient, id: i64) -> Result<Self> {
        let data = client.get(&format!("datasets/{id}"), None)?;
        Self::from_data(client.clone(), id, data)
    }

    /// Resolves a persistent identifier to a numeric id and fetches the dataset.
    pub fn fetch_by_pid(client: &BaseClient, pid: &str) -> Result<Self> {
        let data = client.get("datasets/:persistentId", params([("persistentId", pid)]))?;
        let id = data.get("id").and_then(Value::as_i64).ok_or_else(|| {
            DataverseError::UnsupportedType(format!("no dataset id returned for '{pid}'"))
        })?;

        Self::fetch(client, id)
    }

    /// Fetches a dataset by either kind of identifier.
    pub fn lookup(client: &BaseClient, id: &Identifier) -> Result<Self> {
        match id {
            Identifier::Id(id) => Self::fetch(client, *id),
            Identifier::PersistentId(pid) => Self::fetch_by_pid(client, pid),
        }
    }

    pub(crate) fn from_data(client: BaseClient, id: i64, data: Value) -> Result<Self> {
        let mut dataset = Self {
            client,
            id,
            snapshot: Snapshot::default(),
            records: BTreeMap::new(),
            published_versions: None,
            versions: None,
        };

        let mut data = match data {
            Value::Object(map) => map,
            _ => Map::new(),
        };

        if let Some(latest) = data.remove("latestVersion") {
            dataset.store_version(latest)?;
        }
        dataset.snapshot = Snapshot::new(data);

        Ok(dataset)
    }

    /// Drops every cache and leaves an empty entity without versions.
    pub(crate) fn reset(&mut self) {
        self.snapshot = Snapshot::default();
        self.records.clear();
        self.published_versions = Some(Vec::new());
        self.versions = None;
    }

    pub(crate) fn store_version(&mut self, data: Value) -> Result<VersionKey> {
        let (key, record) = VersionRecord::from_value(data)?;
        self.records.insert(key, record);
        Ok(key)
    }

    /// Resource path below `datasets/{id}/`.
    pub(crate) fn path(&self, suffix: &str) -> String {
        format!("datasets/{}/{}", self.id, suffix)
    }

    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn client(&self) -> &BaseClient {
        &self.client
    }

    /// The version envelope: state, timestamps and citation info.
    pub fn version_data(&mut self, version: DatasetVersion) -> Result<&Map<String, Value>> {
        Ok(&self.version_record(version)?.envelope)
    }

    pub fn metadata(&mut self, version: DatasetVersion) -> Result<&Map<String, Value>> {
        Ok(&self.version_record(version)?.metadata)
    }

    pub fn files(&mut self, version: DatasetVersion) -> Result<&[Value]> {
        Ok(&self.version_record(version)?.files)
    }

    /// The persistent identifier as reported by the version envelope.
    pub fn pid(&mut self, version: DatasetVersion) -> Result<String> {
        self.version_data(version)?
            .get("datasetPersistentId")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| {
                DataverseError::UnsupportedType("version has no datasetPersistentId".to_string())
            })
    }

    /// The persistent identifier of the dataset itself, without touching the network.
    ///
    /// Built as `protocol:authority/identifier` from the snapshot, or taken
    /// from any version that is already cached.
    pub fn persistent_id(&self) -> Result<String> {
        let text = |key: &str| self.snapshot.get(key).and_then(Value::as_str);
        if let (Some(protocol), Some(authority), Some(identifier)) =
            (text("protocol"), text("authority"), text("identifier"))
        {
            return Ok(format!("{protocol}:{authority}/{identifier}"));
        }

        self.records
            .values()
            .find_map(|record| record.envelope.get("datasetPersistentId"))
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| {
                DataverseError::UnsupportedType(format!("dataset {} has no persistent id", self.id))
            })
    }

    pub fn title(&mut self, version: DatasetVersion) -> Result<Option<String>> {
        Ok(self
            .metadata(version)?
            .get("title")
            .and_then(Value::as_str)
            .map(str::to_string))
    }

    /// Name of the first author.
    pub fn author(&mut self, version: DatasetVersion) -> Result<Option<String>> {
        Ok(self
            .metadata(version)?
            .get("author")
            .and_then(|authors| authors.get(0))
            .and_then(|author| author.get("authorName"))
            .and_then(Value::as_str)
            .map(str::to_string))
    }

    pub fn updated(&mut self, version: DatasetVersion) -> Result<Option<DateTime<Utc>>> {
        self.timestamp(version, "lastUpdateTime")
    }

    pub fn created(&mut self, version: DatasetVersion) -> Result<Option<DateTime<Utc>>> {
        self.timestamp(version, "createTime")
    }

    /// Release time of a version, `None` if it has not been released.
    ///
    /// Callers usually pass [`DatasetVersion::LatestPublished`].
    pub fn published(&mut self, version: DatasetVersion) -> Result<Option<DateTime<Utc>>> {
        self.timestamp(version, "releaseTime")
    }

    /// A single normalized metadata field.
    pub fn field(&mut self, name: &str, version: DatasetVersion) -> Result<Option<Value>> {
        Ok(self.metadata(version)?.get(name).cloned())
    }

    pub fn metadata_fields(&mut self, version: DatasetVersion) -> Result<Vec<String>> {
        Ok(self.metadata(version)?.keys().cloned().collect())
    }

    fn timestamp(&mut self, version: DatasetVersion, key: &str) -> Result<Option<DateTime<Utc>>> {
        let Some(text) = self.version_data(version)?.get(key).and_then(Value::as_str) else {
            return Ok(None);
        };

        DateTime::parse_from_rfc3339(text)
            .map(|time| Some(time.with_timezone(&Utc)))
            .map_err(|e| DataverseError::UnsupportedType(format!("{key} '{text}': {e}")))
    }
}

impl Entity for Dataset {
    fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    fn refresh(&mut self) -> Result<()> {
        let data = self.client.get(&format!("datasets/{}", self.id), None)?;
        *self = Self::from_data(self.client.clone(), self.id, data)?;
        Ok(())
    }
}

impl PartialEq for Dataset {
    fn eq(&self, other: &Self) -> bool {
        self.snapshot == other.snapshot
    }
}

impl Eq for Dataset {}

impl Hash for Dataset {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.snapshot.hash(state);
    }
}
