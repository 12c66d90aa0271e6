use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

// We differentiate between persistent identifiers and
// regular identifiers here. This makes it easier to
// handle the two types of identifiers in the codebase
// without having to check for the presence of a persistent
// identifier every time we need to use an identifier.
//
// This way users can supply a general identifier without specifying
// whether it is a persistent identifier or not. The code will
// automatically determine the type of identifier and use it.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
#[serde(untagged)]
pub enum Identifier {
    PersistentId(String),
    Id(i64),
}

impl FromStr for Identifier {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // If it can be parsed as an integer, it is an id
        // Otherwise, it is a persistent id
        match s.parse::<i64>() {
            Ok(id) => Ok(Identifier::Id(id)),
            Err(_) if s.trim().is_empty() => Err("Identifier must not be empty".to_string()),
            Err(_) => Ok(Identifier::PersistentId(s.to_owned())),
        }
    }
}

impl Display for Identifier {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Id(id) => write!(f, "{}", id),
            Self::PersistentId(pid) => write!(f, "{}", pid),
        }
    }
}

impl From<i64> for Identifier {
    fn from(value: i64) -> Self {
        Self::Id(value)
    }
}

/// Address of a dataverse (collection): the root, a database id or an alias.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
#[serde(untagged)]
pub enum DataverseId {
    Root,
    Id(i64),
    Alias(String),
}

impl FromStr for DataverseId {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "" => Err("Dataverse identifier must not be empty".to_string()),
            ":root" | "root" => Ok(DataverseId::Root),
            other => match other.parse::<i64>() {
                Ok(id) => Ok(DataverseId::Id(id)),
                Err(_) => Ok(DataverseId::Alias(other.to_owned())),
            },
        }
    }
}

impl Display for DataverseId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Root => write!(f, ":root"),
            Self::Id(id) => write!(f, "{}", id),
            Self::Alias(alias) => write!(f, "{}", alias),
        }
    }
}

impl From<i64> for DataverseId {
    fn from(value: i64) -> Self {
        Self::Id(value)
    }
}

impl From<&str> for DataverseId {
    fn from(value: &str) -> Self {
        value
            .parse()
            .unwrap_or_else(|_| DataverseId::Alias(value.to_owned()))
    }
}
