use std::collections::HashMap;

use serde_json::Value;

use crate::client::BaseClient;
use crate::error::{DataverseError, Result};
use crate::identifier::DataverseId;
use crate::input::{InputKind, MetadataInput};

use super::entity::Dataset;

impl Dataset {
    /// Creates a new dataset in a dataverse.
    ///
    /// # Arguments
    ///
    /// * `client` - A reference to the `BaseClient` instance used to send the request.
    /// * `input` - The dataset body in the native JSON format.
    /// * `dataverse` - The parent dataverse.
    ///
    /// # Returns
    ///
    /// The freshly fetched dataset.
    pub fn create(client: &BaseClient, input: MetadataInput, dataverse: &DataverseId) -> Result<Self> {
        new_dataset(client, input, dataverse, None, false, false)
    }

    /// Imports a dataset that already has a persistent identifier.
    ///
    /// With `ddi` set the input has to be a DDI XML document.
    /// With `publish` set the dataset is released right away.
    pub fn import(
        client: &BaseClient,
        input: MetadataInput,
        dataverse: &DataverseId,
        pid: &str,
        publish: bool,
        ddi: bool,
    ) -> Result<Self> {
        new_dataset(client, input, dataverse, Some(pid), publish, ddi)
    }
}

fn new_dataset(
    client: &BaseClient,
    input: MetadataInput,
    dataverse: &DataverseId,
    import: Option<&str>,
    publish: bool,
    ddi: bool,
) -> Result<Dataset> {
    let kind = if ddi { InputKind::DdiXml } else { InputKind::Json };
    let body = input.resolve(kind)?;

    let mut url = format!("dataverses/{dataverse}/datasets");
    if import.is_some() {
        url.push_str("/:import");
    }

    let mut parameters = HashMap::from([(
        "release".to_string(),
        if publish { "yes" } else { "no" }.to_string(),
    )]);
    if let Some(pid) = import {
        parameters.insert("pid".to_string(), pid.to_string());
    }

    let result = client.post(&url, Some(parameters), body)?;
    let id = result.get("id").and_then(Value::as_i64).ok_or_else(|| {
        DataverseError::UnsupportedType("no dataset id in creation response".to_string())
    })?;
    tracing::debug!(id, dataverse = %dataverse, "dataset created");

    Dataset::fetch(client, id)
}
