use serde::Deserialize;
use serde_json::Value;

use crate::error::{DataverseError, Result};
use crate::identifier::DataverseId;
use crate::native_api::dataset::Dataset;

use super::entity::Dataverse;

/// An entry of `dataverses/{id}/contents`, discriminated by `type`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ContentEntry {
    Dataverse {
        id: i64,
        #[serde(default)]
        title: Option<String>,
    },
    Dataset {
        id: i64,
        #[serde(default)]
        identifier: Option<String>,
        #[serde(default, rename = "persistentUrl")]
        persistent_url: Option<String>,
    },
}

impl ContentEntry {
    const TYPES: [&'static str; 2] = ["dataverse", "dataset"];

    /// Decodes one listing entry.
    ///
    /// An unknown `type` is [`DataverseError::UnsupportedType`]; a known type
    /// with missing or mistyped fields is a decode error.
    pub fn from_value(entry: &Value) -> Result<Self> {
        let text = |key: &str| entry.get(key).and_then(Value::as_str);
        let kind = text("type").unwrap_or_default();

        if !Self::TYPES.contains(&kind) {
            return Err(DataverseError::UnsupportedType(format!(
                "{} ({})",
                kind,
                text("name").or_else(|| text("title")).unwrap_or_default()
            )));
        }

        Ok(Self::deserialize(entry)?)
    }
}

/// A realized child of a dataverse.
#[derive(Debug, Clone, PartialEq)]
pub enum Child {
    Dataverse(Dataverse),
    Dataset(Dataset),
}

/// The outcome of realizing one listing entry.
#[derive(Debug, Clone, PartialEq)]
pub enum Listed {
    Realized(Child),
    /// The entry could not be fetched, `reason` says why.
    Skipped { entry: ContentEntry, reason: String },
}

impl Listed {
    pub fn child(&self) -> Option<&Child> {
        match self {
            Listed::Realized(child) => Some(child),
            Listed::Skipped { .. } => None,
        }
    }
}

impl Dataverse {
    /// The direct children, fetched once, including the ones that were skipped.
    pub fn listing(&mut self) -> Result<&[Listed]> {
        Ok(self.load_children()?.as_slice())
    }

    /// The direct children that could be fetched, in listing order.
    pub fn children(&mut self) -> Result<Vec<&Child>> {
        Ok(self.load_children()?.iter().filter_map(Listed::child).collect())
    }

    /// Calls `visitor` once per realized child, in listing order.
    pub fn visit_children<F: FnMut(&Child)>(&mut self, mut visitor: F) -> Result<()> {
        self.load_children()?
            .iter()
            .filter_map(Listed::child)
            .for_each(|child| visitor(child));
        Ok(())
    }

    /// Walks all dataverses below this one, depth first in listing order, and
    /// collects what `visitor` returns for each.
    pub fn each_dataverse<T, F: FnMut(&Dataverse) -> T>(&mut self, mut visitor: F) -> Result<Vec<T>> {
        let mut collected = Vec::new();
        self.walk(&mut |child: &Child| {
            if let Child::Dataverse(dataverse) = child {
                collected.push(visitor(dataverse));
            }
        })?;
        Ok(collected)
    }

    /// Walks all datasets below this one, depth first in listing order, and
    /// collects what `visitor` returns for each.
    pub fn each_dataset<T, F: FnMut(&Dataset) -> T>(&mut self, mut visitor: F) -> Result<Vec<T>> {
        let mut collected = Vec::new();
        self.walk(&mut |child: &Child| {
            if let Child::Dataset(dataset) = child {
                collected.push(visitor(dataset));
            }
        })?;
        Ok(collected)
    }

    /// All dataverses below this one.
    pub fn dataverses(&mut self) -> Result<Vec<Dataverse>> {
        self.each_dataverse(Dataverse::clone)
    }

    /// All datasets below this one.
    pub fn datasets(&mut self) -> Result<Vec<Dataset>> {
        self.each_dataset(Dataset::clone)
    }

    fn walk<F: FnMut(&Child)>(&mut self, visitor: &mut F) -> Result<()> {
        for listed in self.load_children()?.iter_mut() {
            let Listed::Realized(child) = listed else {
                continue;
            };

            visitor(&*child);
            if let Child::Dataverse(dataverse) = child {
                dataverse.walk(visitor)?;
            }
        }
        Ok(())
    }

    fn load_children(&mut self) -> Result<&mut Vec<Listed>> {
        if self.children.is_none() {
            let data = self.client.get(&self.path("contents"), None)?;
            let items = match data {
                Value::Array(items) => items,
                Value::Null => Vec::new(),
                other => {
                    return Err(DataverseError::UnsupportedType(format!(
                        "dataverse contents: {other}"
                    )))
                }
            };

            let entries = items
                .iter()
                .map(ContentEntry::from_value)
                .collect::<Result<Vec<_>>>()?;

            let listed = entries
                .into_iter()
                .map(|entry| match self.realize(&entry) {
                    Ok(child) => Listed::Realized(child),
                    Err(err) => {
                        tracing::warn!(dataverse = %self.id, entry = ?entry, error = %err, "skipping child");
                        Listed::Skipped {
                            entry,
                            reason: err.to_string(),
                        }
                    }
                })
                .collect();

            self.children = Some(listed);
        }

        Ok(self.children.get_or_insert_with(Vec::new))
    }

    fn realize(&self, entry: &ContentEntry) -> Result<Child> {
        match entry {
            ContentEntry::Dataverse { id, .. } => {
                Dataverse::fetch(&self.client, DataverseId::Id(*id)).map(Child::Dataverse)
            }
            ContentEntry::Dataset { id, .. } => {
                Dataset::fetch(&self.client, *id).map(Child::Dataset)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use httpmock::prelude::*;
    use serde_json::json;

    use super::*;
    use crate::entity::Entity;
    use crate::test_utils::{client_for, dataset_json, dataverse_json, ok, version_json};

    fn dv_entry(id: i64) -> Value {
        json!({"type": "dataverse", "id": id, "title": format!("dv {id}")})
    }

    fn ds_entry(id: i64) -> Value {
        json!({
            "type": "dataset",
            "id": id,
            "identifier": format!("FK2/{id}"),
            "persistentUrl": format!("https://doi.org/10.5072/FK2/{id}"),
            "protocol": "doi",
            "authority": "10.5072"
        })
    }

    fn mock_dataverse(server: &MockServer, id: i64, contents: Vec<Value>) {
        let path = if id == 1 {
            "/api/dataverses/:root".to_string()
        } else {
            format!("/api/dataverses/{id}")
        };
        server.mock(|when, then| {
            when.method(GET).path(path);
            then.status(200)
                .json_body(ok(dataverse_json(id, &format!("dv{id}"))));
        });

        let contents_path = if id == 1 {
            "/api/dataverses/:root/contents".to_string()
        } else {
            format!("/api/dataverses/{id}/contents")
        };
        server.mock(|when, then| {
            when.method(GET).path(contents_path);
            then.status(200).json_body(ok(Value::Array(contents)));
        });
    }

    fn mock_dataset(server: &MockServer, id: i64) {
        server.mock(|when, then| {
            when.method(GET).path(format!("/api/datasets/{id}"));
            then.status(200)
                .json_body(ok(dataset_json(id, version_json(id * 10, Some((1, 0)), "T"))));
        });
    }

    /// root -> [dv 2, ds 11, dv 3]; dv 2 -> [ds 12, dv 4]; dv 4 -> [ds 13]; dv 3 -> []
    fn mock_tree(server: &MockServer) {
        mock_dataverse(server, 1, vec![dv_entry(2), ds_entry(11), dv_entry(3)]);
        mock_dataverse(server, 2, vec![ds_entry(12), dv_entry(4)]);
        mock_dataverse(server, 3, vec![]);
        mock_dataverse(server, 4, vec![ds_entry(13)]);
        for id in [11, 12, 13] {
            mock_dataset(server, id);
        }
    }

    #[test]
    fn test_decode_entries() {
        assert!(matches!(
            ContentEntry::from_value(&dv_entry(2)).unwrap(),
            ContentEntry::Dataverse { id: 2, .. }
        ));
        assert!(matches!(
            ContentEntry::from_value(&ds_entry(11)).unwrap(),
            ContentEntry::Dataset { id: 11, .. }
        ));

        let err = ContentEntry::from_value(&json!({"type": "file", "id": 5, "name": "x.csv"}))
            .unwrap_err();
        assert_eq!(err.to_string(), "Unsupported type: file (x.csv)");
    }

    #[test]
    fn test_malformed_entry_is_a_decode_error() {
        let err = ContentEntry::from_value(&json!({"type": "dataset"})).unwrap_err();
        assert!(matches!(err, DataverseError::Json(_)));

        let err = ContentEntry::from_value(&json!({"type": "dataverse", "id": "seven"}))
            .unwrap_err();
        assert!(matches!(err, DataverseError::Json(_)));

        let err = ContentEntry::from_value(&json!({"id": 5})).unwrap_err();
        assert!(matches!(err, DataverseError::UnsupportedType(_)));
    }

    #[test]
    fn test_children_in_listing_order() {
        // Arrange
        let server = MockServer::start();
        mock_tree(&server);

        // Act
        let client = client_for(&server);
        let mut root = Dataverse::root(&client).unwrap().unwrap();
        let mut visited = Vec::new();
        root.visit_children(|child| match child {
            Child::Dataverse(dv) => visited.push(format!("dv:{}", dv.get("id").unwrap())),
            Child::Dataset(ds) => visited.push(format!("ds:{}", ds.id())),
        })
        .unwrap();

        // Assert
        assert_eq!(visited, vec!["dv:2", "ds:11", "dv:3"]);
        assert_eq!(root.children().unwrap().len(), 3);
    }

    #[test]
    fn test_listing_is_fetched_once() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/api/dataverses/3");
            then.status(200).json_body(ok(dataverse_json(3, "dv3")));
        });
        let contents = server.mock(|when, then| {
            when.method(GET).path("/api/dataverses/3/contents");
            then.status(200).json_body(ok(json!([])));
        });

        let client = client_for(&server);
        let mut dv = Dataverse::find(&client, 3i64).unwrap().unwrap();
        dv.children().unwrap();
        dv.listing().unwrap();
        dv.each_dataset(|ds| ds.id()).unwrap();

        assert_eq!(contents.hits(), 1);
    }

    #[test]
    fn test_traversal_is_pre_order() {
        // Arrange
        let server = MockServer::start();
        mock_tree(&server);

        // Act
        let client = client_for(&server);
        let mut root = Dataverse::root(&client).unwrap().unwrap();
        let dataverses = root
            .each_dataverse(|dv| dv.get("id").and_then(Value::as_i64).unwrap())
            .unwrap();
        let datasets = root.each_dataset(|ds| ds.id()).unwrap();

        // Assert
        assert_eq!(dataverses, vec![2, 4, 3]);
        assert_eq!(datasets, vec![12, 13, 11]);
        assert_eq!(root.datasets().unwrap().len(), 3);
        assert_eq!(root.dataverses().unwrap().len(), 3);
    }

    #[test]
    fn test_failed_child_is_skipped() {
        // Arrange
        let server = MockServer::start();
        mock_dataverse(&server, 1, vec![ds_entry(11), ds_entry(99), dv_entry(3)]);
        mock_dataverse(&server, 3, vec![]);
        mock_dataset(&server, 11);
        server.mock(|when, then| {
            when.method(GET).path("/api/datasets/99");
            then.status(500).body("Internal Server Error");
        });

        // Act
        let client = client_for(&server);
        let mut root = Dataverse::root(&client).unwrap().unwrap();
        let listing = root.listing().unwrap().to_vec();

        // Assert
        assert_eq!(listing.len(), 3);
        match &listing[1] {
            Listed::Skipped { entry, reason } => {
                assert!(matches!(entry, ContentEntry::Dataset { id: 99, .. }));
                assert!(reason.contains("500"));
            }
            other => panic!("Expected a skipped entry, got {other:?}"),
        }
        assert_eq!(root.children().unwrap().len(), 2);
        assert_eq!(root.each_dataset(|ds| ds.id()).unwrap(), vec![11]);
    }

    #[test]
    fn test_unknown_type_fails_listing() {
        let server = MockServer::start();
        mock_dataverse(
            &server,
            1,
            vec![dv_entry(2), json!({"type": "file", "id": 5, "name": "x.csv"})],
        );

        let client = client_for(&server);
        let mut root = Dataverse::root(&client).unwrap().unwrap();

        assert!(matches!(
            root.children(),
            Err(DataverseError::UnsupportedType(_))
        ));
    }
}
