use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::client::BaseClient;
use crate::entity::{Entity, Snapshot};
use crate::error::{DataverseError, Result};
use crate::identifier::DataverseId;
use crate::input::{InputKind, MetadataInput};
use crate::native_api::dataset::ExportFormat;
use crate::request::RequestType;
use crate::utils::size_from_response;

use super::content::Listed;

/// The collection categories a Dataverse installation knows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DataverseType {
    Department,
    Journals,
    Laboratory,
    OrganizationsInstitutions,
    Researchers,
    ResearchGroup,
    ResearchProjects,
    TeachingCourses,
    Uncategorized,
}

impl DataverseType {
    pub const ALL: [DataverseType; 9] = [
        DataverseType::Department,
        DataverseType::Journals,
        DataverseType::Laboratory,
        DataverseType::OrganizationsInstitutions,
        DataverseType::Researchers,
        DataverseType::ResearchGroup,
        DataverseType::ResearchProjects,
        DataverseType::TeachingCourses,
        DataverseType::Uncategorized,
    ];
}

/// A ready-made body for [`Dataverse::create`].
pub fn sample_data() -> Value {
    json!({
        "name": "new dataverse",
        "alias": "new_dv",
        "dataverseContacts": [
            { "contactEmail": "abc@def.org" }
        ],
        "affiliation": "My organization",
        "description": "My new dataverse",
        "dataverseType": DataverseType::OrganizationsInstitutions
    })
}

/// A collection node holding dataverses and datasets.
#[derive(Debug, Clone)]
pub struct Dataverse {
    pub(crate) client: BaseClient,
    pub(crate) id: DataverseId,
    pub(crate) snapshot: Snapshot,
    pub(crate) children: Option<Vec<Listed>>,
    pub(crate) size: Option<u64>,
}

impl Dataverse {
    /// Fetches a dataverse by id or alias.
    pub fn fetch(client: &BaseClient, id: DataverseId) -> Result<Self> {
        let data = client.get(&format!("dataverses/{id}"), None)?;
        Ok(Self::from_data(client.clone(), id, data))
    }

    /// Fetches a dataverse, giving `None` if the server does not know it.
    ///
    /// # Arguments
    ///
    /// * `client` - The client used for this and every later request of the entity.
    /// * `id` - Anything convertible into a [`DataverseId`], e.g. `42` or `"my_lab"`.
    pub fn find<I: Into<DataverseId>>(client: &BaseClient, id: I) -> Result<Option<Self>> {
        match Self::fetch(client, id.into()) {
            Ok(dataverse) => Ok(Some(dataverse)),
            Err(err) if err.is_not_found() => Ok(None),
            Err(err) => Err(err),
        }
    }

    /// The root dataverse of the installation.
    pub fn root(client: &BaseClient) -> Result<Option<Self>> {
        Self::find(client, DataverseId::Root)
    }

    fn from_data(client: BaseClient, id: DataverseId, data: Value) -> Self {
        Self {
            client,
            id,
            snapshot: Snapshot::from_value(data),
            children: None,
            size: None,
        }
    }

    /// Resource path below `dataverses/{id}`.
    pub(crate) fn path(&self, suffix: &str) -> String {
        if suffix.is_empty() {
            format!("dataverses/{}", self.id)
        } else {
            format!("dataverses/{}/{}", self.id, suffix)
        }
    }

    pub fn id(&self) -> &DataverseId {
        &self.id
    }

    pub fn client(&self) -> &BaseClient {
        &self.client
    }

    /// Creates a child dataverse.
    ///
    /// # Arguments
    ///
    /// * `input` - The body of the new dataverse, see [`sample_data`].
    ///
    /// # Returns
    ///
    /// The new dataverse, built from the creation response. Its id is the
    /// numeric id the server assigned.
    pub fn create(&self, input: MetadataInput) -> Result<Dataverse> {
        let body = input.resolve(InputKind::Json)?;
        let result = self.client.post(&self.path(""), None, body)?;

        let id = result.get("id").and_then(Value::as_i64).ok_or_else(|| {
            DataverseError::UnsupportedType("no dataverse id in creation response".to_string())
        })?;
        tracing::debug!(id, parent = %self.id, "dataverse created");

        Ok(Self::from_data(self.client.clone(), DataverseId::Id(id), result))
    }

    /// Publishes the dataverse.
    ///
    /// Fails with an API error if a parent is unpublished.
    pub fn publish(&self) -> Result<String> {
        self.client
            .post(&self.path("actions/:publish"), None, RequestType::Plain)?;
        Ok(format!("Dataverse {} published", self.id))
    }

    /// Deletes the dataverse and returns the server's message.
    pub fn delete(&self) -> Result<String> {
        let result = self.client.delete(&self.path(""), None)?;
        Ok(result
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string())
    }

    /// Storage size in bytes, fetched once.
    pub fn size(&mut self) -> Result<u64> {
        if let Some(size) = self.size {
            return Ok(size);
        }

        let data = self.client.get(&self.path("storagesize"), None)?;
        let size = size_from_response(&data)?;
        self.size = Some(size);

        Ok(size)
    }

    /// The snapshot, the only export a dataverse has.
    pub fn rdm_data(&self) -> Value {
        self.snapshot.to_value()
    }

    /// Exports the dataverse's metadata. Only `rdm` is supported.
    pub fn export_metadata(&self, kind: &str) -> Result<Value> {
        match kind.parse::<ExportFormat>() {
            Ok(ExportFormat::Rdm) => Ok(self.rdm_data()),
            _ => Err(DataverseError::UnsupportedFormat(kind.to_string())),
        }
    }
}

impl Entity for Dataverse {
    fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    fn refresh(&mut self) -> Result<()> {
        let data = self.client.get(&self.path(""), None)?;
        *self = Self::from_data(self.client.clone(), self.id.clone(), data);
        Ok(())
    }
}

impl PartialEq for Dataverse {
    fn eq(&self, other: &Self) -> bool {
        self.snapshot == other.snapshot
    }
}

impl Eq for Dataverse {}

impl Hash for Dataverse {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.snapshot.hash(state);
    }
}
