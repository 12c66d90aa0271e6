//! Fixtures shared by the unit tests: a client pointed at a mock server and
//! builders for the JSON shapes the native API returns.

use httpmock::MockServer;
use serde_json::{json, Value};

use crate::client::BaseClient;
use crate::config::Config;

pub(crate) const TEST_TOKEN: &str = "00000000-0000-0000-0000-000000000000";
pub(crate) const TEST_PID: &str = "doi:10.5072/FK2/ABC123";

/// Creates a client whose base URL is `<mock server>/api`.
pub(crate) fn client_for(server: &MockServer) -> BaseClient {
    let config = Config::new(&server.url("/api"), TEST_TOKEN).expect("Invalid test config");
    BaseClient::new(&config).expect("Could not create client")
}

/// Wraps data into the `{status: OK, data}` envelope.
pub(crate) fn ok(data: Value) -> Value {
    json!({"status": "OK", "data": data})
}

pub(crate) fn citation_block(title: &str) -> Value {
    json!({
        "citation": {
            "displayName": "Citation Metadata",
            "name": "citation",
            "fields": [
                {
                    "typeName": "title",
                    "multiple": false,
                    "typeClass": "primitive",
                    "value": title
                },
                {
                    "typeName": "author",
                    "multiple": true,
                    "typeClass": "compound",
                    "value": [
                        {
                            "authorName": {
                                "typeName": "authorName",
                                "multiple": false,
                                "typeClass": "primitive",
                                "value": "Doe, Jane"
                            },
                            "authorAffiliation": {
                                "typeName": "authorAffiliation",
                                "multiple": false,
                                "typeClass": "primitive",
                                "value": "Example University"
                            }
                        }
                    ]
                },
                {
                    "typeName": "subject",
                    "multiple": true,
                    "typeClass": "controlledVocabulary",
                    "value": ["Medicine, Health and Life Sciences"]
                }
            ]
        }
    })
}

pub(crate) fn file_entry(id: i64, name: &str) -> Value {
    json!({
        "label": name,
        "restricted": false,
        "version": 1,
        "dataFile": {
            "id": id,
            "filename": name,
            "contentType": "text/plain",
            "filesize": 12
        }
    })
}

/// A version record as returned by `datasets/{id}/versions/{version}`.
///
/// `number` is `None` for the draft.
pub(crate) fn version_json(version_id: i64, number: Option<(u32, u32)>, title: &str) -> Value {
    let mut version = json!({
        "id": version_id,
        "datasetId": 42,
        "datasetPersistentId": TEST_PID,
        "storageIdentifier": "file://10.5072/FK2/ABC123",
        "lastUpdateTime": "2024-03-01T10:00:00Z",
        "createTime": "2024-02-01T09:30:00Z",
        "termsOfUse": "<a href=\"http://creativecommons.org/publicdomain/zero/1.0\"><img src=\"https://licensebuttons.net/p/zero/1.0/88x31.png\"/>CC0 1.0</a>.",
        "metadataBlocks": citation_block(title),
        "files": [file_entry(100 + version_id, "data.csv")]
    });

    match number {
        Some((major, minor)) => {
            version["versionState"] = json!("RELEASED");
            version["versionNumber"] = json!(major);
            version["versionMinorNumber"] = json!(minor);
            version["releaseTime"] = json!("2024-02-15T12:00:00Z");
        }
        None => {
            version["versionState"] = json!("DRAFT");
        }
    }

    version
}

/// A dataset as returned by `datasets/{id}`, with `latest` as its latest version.
pub(crate) fn dataset_json(id: i64, latest: Value) -> Value {
    json!({
        "id": id,
        "identifier": "FK2/ABC123",
        "persistentUrl": "https://doi.org/10.5072/FK2/ABC123",
        "protocol": "doi",
        "authority": "10.5072",
        "publisher": "Root",
        "storageIdentifier": "file://10.5072/FK2/ABC123",
        "latestVersion": latest
    })
}

/// Summary entries as returned by `datasets/{id}/versions`.
pub(crate) fn version_listing(released: &[(u32, u32)], draft: bool) -> Value {
    let mut entries: Vec<Value> = Vec::new();
    if draft {
        entries.push(json!({"id": 9, "versionState": "DRAFT"}));
    }
    for (i, (major, minor)) in released.iter().rev().enumerate() {
        entries.push(json!({
            "id": i,
            "versionState": "RELEASED",
            "versionNumber": major,
            "versionMinorNumber": minor
        }));
    }
    Value::Array(entries)
}

pub(crate) fn dataverse_json(id: i64, alias: &str) -> Value {
    json!({
        "id": id,
        "alias": alias,
        "name": format!("{alias} dataverse"),
        "dataverseContacts": [{"displayOrder": 0, "contactEmail": "abc@def.org"}],
        "permissionRoot": true,
        "dataverseType": "LABORATORY",
        "creationDate": "2024-01-01T00:00:00Z"
    })
}
