//! Bodies for creating dataverses and datasets.
//!
//! Callers hand over a [`MetadataInput`]; it is turned into a request body in
//! one step so that malformed input fails before any request is sent.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::error::{DataverseError, Result};
use crate::request::{RequestType, JSON_CONTENT, XML_CONTENT};
use crate::response::XmlDocument;

/// Where the body of a create or import call comes from.
#[derive(Debug, Clone, PartialEq)]
pub enum MetadataInput {
    /// An in-memory JSON object.
    Inline(Value),
    /// A JSON or YAML file, or an XML file for DDI imports.
    FilePath(PathBuf),
    /// JSON text, or XML text for DDI imports.
    Text(String),
}

/// Expected format of the body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    Json,
    DdiXml,
}

impl MetadataInput {
    /// Validates the input and converts it into a request body.
    pub fn resolve(self, kind: InputKind) -> Result<RequestType> {
        match (self, kind) {
            (MetadataInput::Inline(value), InputKind::Json) => {
                if !value.is_object() {
                    return Err(malformed("inline data must be a JSON object"));
                }
                RequestType::json(&value)
            }
            (MetadataInput::Inline(_), InputKind::DdiXml) => {
                Err(malformed("DDI imports take XML text or an XML file"))
            }
            (MetadataInput::Text(text), InputKind::Json) => {
                serde_json::from_str::<Value>(&text)
                    .map_err(|e| malformed(&format!("not a JSON string: {e}")))?;
                Ok(RequestType::JSON { body: text })
            }
            (MetadataInput::Text(text), InputKind::DdiXml) => {
                XmlDocument::parse(&text).map_err(|e| malformed(&e.to_string()))?;
                Ok(RequestType::XML { body: text })
            }
            (MetadataInput::FilePath(path), InputKind::Json) => {
                let value = parse_file(&path)?;
                if !value.is_object() {
                    return Err(malformed("file content must be a JSON object"));
                }
                // YAML is converted, JSON files are streamed as they are
                if serde_json::from_str::<Value>(&read(&path)?).is_ok() {
                    Ok(RequestType::File {
                        path,
                        content_type: JSON_CONTENT,
                    })
                } else {
                    RequestType::json(&value)
                }
            }
            (MetadataInput::FilePath(path), InputKind::DdiXml) => {
                XmlDocument::parse(&read(&path)?).map_err(|e| malformed(&e.to_string()))?;
                Ok(RequestType::File {
                    path,
                    content_type: XML_CONTENT,
                })
            }
        }
    }
}

impl From<Value> for MetadataInput {
    fn from(value: Value) -> Self {
        MetadataInput::Inline(value)
    }
}

impl From<PathBuf> for MetadataInput {
    fn from(path: PathBuf) -> Self {
        MetadataInput::FilePath(path)
    }
}

impl From<&Path> for MetadataInput {
    fn from(path: &Path) -> Self {
        MetadataInput::FilePath(path.to_path_buf())
    }
}

/// Text is taken as a file path if such a file exists, otherwise as content.
impl From<&str> for MetadataInput {
    fn from(text: &str) -> Self {
        let path = Path::new(text);
        if path.is_file() {
            MetadataInput::FilePath(path.to_path_buf())
        } else {
            MetadataInput::Text(text.to_string())
        }
    }
}

/// Parses a JSON or YAML file into a JSON value
///
/// # Arguments
/// * `path` - Path to the file to parse
///
/// # Returns
/// * `Ok(Value)` - Successfully parsed file contents
/// * `Err` - File reading or parsing error
pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<Value> {
    let content = read(path.as_ref())?;

    if let Ok(content) = serde_json::from_str(&content) {
        Ok(content)
    } else if let Ok(content) = serde_yaml::from_str(&content) {
        Ok(content)
    } else {
        Err(malformed("Failed to parse the file as either JSON or YAML"))
    }
}

fn read(path: &Path) -> Result<String> {
    fs::read_to_string(path)
        .map_err(|e| malformed(&format!("cannot read '{}': {e}", path.display())))
}

fn malformed(reason: &str) -> DataverseError {
    DataverseError::MalformedInput(format!(
        "{reason}. Should be a JSON object, filename or JSON string."
    ))
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use serde_json::json;

    use super::*;

    #[test]
    fn test_inline_object() {
        let body = MetadataInput::from(json!({"name": "lab"}))
            .resolve(InputKind::Json)
            .unwrap();
        assert_eq!(
            body,
            RequestType::JSON {
                body: r#"{"name":"lab"}"#.to_string()
            }
        );
    }

    #[test]
    fn test_inline_non_object_is_malformed() {
        let result = MetadataInput::Inline(json!([1, 2])).resolve(InputKind::Json);
        assert!(matches!(result, Err(DataverseError::MalformedInput(_))));
    }

    #[test]
    fn test_json_text() {
        let body = MetadataInput::from(r#"{"alias": "lab"}"#)
            .resolve(InputKind::Json)
            .unwrap();
        assert!(matches!(body, RequestType::JSON { .. }));

        let result = MetadataInput::from("{not json").resolve(InputKind::Json);
        assert!(matches!(result, Err(DataverseError::MalformedInput(_))));
    }

    #[test]
    fn test_json_file_is_streamed() {
        let mut file = tempfile::NamedTempFile::new().expect("Could not create temp file");
        write!(file, r#"{{"alias": "lab"}}"#).unwrap();

        let input = MetadataInput::from(file.path().to_str().unwrap());
        assert!(matches!(input, MetadataInput::FilePath(_)));

        let body = input.resolve(InputKind::Json).unwrap();
        assert_eq!(
            body,
            RequestType::File {
                path: file.path().to_path_buf(),
                content_type: JSON_CONTENT
            }
        );
    }

    #[test]
    fn test_yaml_file_is_converted() {
        let mut file = tempfile::NamedTempFile::new().expect("Could not create temp file");
        writeln!(file, "alias: lab").unwrap();
        writeln!(file, "name: My Lab").unwrap();

        let body = MetadataInput::from(file.path())
            .resolve(InputKind::Json)
            .unwrap();

        match body {
            RequestType::JSON { body } => {
                let value: Value = serde_json::from_str(&body).unwrap();
                assert_eq!(value, json!({"alias": "lab", "name": "My Lab"}));
            }
            other => panic!("Expected JSON body, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_file_is_malformed() {
        let result =
            MetadataInput::FilePath(PathBuf::from("does/not/exist.json")).resolve(InputKind::Json);
        assert!(matches!(result, Err(DataverseError::MalformedInput(_))));
    }

    #[test]
    fn test_ddi_text() {
        let body = MetadataInput::Text("<codeBook><stdyDscr/></codeBook>".to_string())
            .resolve(InputKind::DdiXml)
            .unwrap();
        assert!(matches!(body, RequestType::XML { .. }));

        let result = MetadataInput::Text("<codeBook>".to_string()).resolve(InputKind::DdiXml);
        assert!(matches!(result, Err(DataverseError::MalformedInput(_))));

        let result = MetadataInput::Inline(json!({})).resolve(InputKind::DdiXml);
        assert!(matches!(result, Err(DataverseError::MalformedInput(_))));
    }
}
