use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::{DataverseError, Result};

/// A metadata block as returned in `metadataBlocks`.
#[derive(Debug, Clone, Deserialize)]
pub struct MetadataBlock {
    #[serde(default)]
    pub fields: Vec<MetadataField>,
}

/// A typed metadata field, discriminated by `typeClass`.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "typeClass", rename_all = "camelCase")]
pub enum MetadataField {
    Primitive {
        #[serde(rename = "typeName")]
        type_name: String,
        value: Value,
    },
    ControlledVocabulary {
        #[serde(rename = "typeName")]
        type_name: String,
        value: Value,
    },
    Compound {
        #[serde(rename = "typeName")]
        type_name: String,
        value: CompoundValue,
    },
}

/// The value of a compound field: one group of sub-fields or a list of groups.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum CompoundValue {
    Single(BTreeMap<String, MetadataField>),
    Multiple(Vec<BTreeMap<String, MetadataField>>),
}

impl MetadataField {
    pub fn type_name(&self) -> &str {
        match self {
            MetadataField::Primitive { type_name, .. }
            | MetadataField::ControlledVocabulary { type_name, .. }
            | MetadataField::Compound { type_name, .. } => type_name,
        }
    }

    /// Flattens the field into its plain value.
    ///
    /// Primitive and controlled vocabulary fields give their value as is.
    /// Compound groups become objects keyed by the sub-field type names.
    pub fn into_value(self) -> Value {
        match self {
            MetadataField::Primitive { value, .. }
            | MetadataField::ControlledVocabulary { value, .. } => value,
            MetadataField::Compound { value, .. } => match value {
                CompoundValue::Single(group) => group_to_value(group),
                CompoundValue::Multiple(groups) => {
                    Value::Array(groups.into_iter().map(group_to_value).collect())
                }
            },
        }
    }
}

fn group_to_value(group: BTreeMap<String, MetadataField>) -> Value {
    let map = group
        .into_values()
        .map(|field| (field.type_name().to_string(), field.into_value()))
        .collect::<Map<String, Value>>();

    Value::Object(map)
}

/// Flattens `metadataBlocks` into a single map from field type name to value.
///
/// Block grouping is discarded. A missing or null value gives an empty map,
/// an unknown `typeClass` anywhere in the tree is an error.
///
/// Parsed JSON objects do not keep the server's key order, so blocks are
/// applied by block name. If two blocks carry a field with the same type
/// name, the block whose name sorts last wins.
pub fn normalize_metadata(blocks: Option<Value>) -> Result<Map<String, Value>> {
    let blocks = match blocks {
        None | Some(Value::Null) => return Ok(Map::new()),
        Some(blocks) => blocks,
    };

    let blocks: BTreeMap<String, MetadataBlock> = serde_json::from_value(blocks)
        .map_err(|e| DataverseError::UnsupportedType(format!("metadata block: {e}")))?;

    let mut metadata = Map::new();
    for field in blocks.into_values().flat_map(|block| block.fields) {
        let name = field.type_name().to_string();
        metadata.insert(name, field.into_value());
    }

    Ok(metadata)
}

/// Merges the `dataFile` details of every file entry into the entry itself.
pub fn pack_files(files: Option<Value>) -> Vec<Value> {
    let Some(Value::Array(files)) = files else {
        return Vec::new();
    };

    files
        .into_iter()
        .map(|file| match file {
            Value::Object(mut entry) => {
                if let Some(Value::Object(detail)) = entry.remove("dataFile") {
                    entry.extend(detail);
                }
                Value::Object(entry)
            }
            other => other,
        })
        .collect()
}
