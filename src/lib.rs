//! A Rust library for working with the Dataverse research data repository API.
//!
//! Dataverses (collections) and datasets are fetched as entities that keep a
//! snapshot of the server's JSON. Datasets additionally cache each version
//! they touch, with the nested metadata blocks flattened into plain
//! field-name/value maps.

#![warn(unused_crate_dependencies)]

/// Client functionality for interacting with Dataverse APIs
pub mod client;

/// Endpoint and token configuration
pub mod config;

/// Types and utilities for working with dataset versions
pub mod datasetversion;

/// Snapshot semantics shared by all entities
pub mod entity;

/// The crate's error type
pub mod error;

/// Types for handling Dataverse identifiers
pub mod identifier;

/// Bodies for create and import calls
pub mod input;

/// Progress tracking utilities
pub(crate) mod progress;

/// Types for making requests to Dataverse APIs
pub mod request;

/// Types for handling responses from Dataverse APIs
pub mod response;

/// General utility functions
pub mod utils;

/// Data access functionality
pub mod data_access {
    pub use dataset::DEFAULT_BUNDLE_NAME;

    /// Dataset bundle downloads
    pub mod dataset;
}

/// Native API functionality
pub mod native_api {
    /// Collection operations
    pub mod collection {
        pub use content::{Child, ContentEntry, Listed};
        pub use entity::{sample_data, Dataverse, DataverseType};

        /// Child listing and tree traversal
        pub mod content;
        /// The dataverse entity
        pub mod entity;
    }

    /// Dataset operations
    pub mod dataset {
        pub use entity::{Dataset, VersionRecord};
        pub use export::{Export, ExportFamily, ExportFormat};
        pub use publish::PublishOutcome;

        /// Dataset creation and import
        pub mod create;
        /// Draft deletion
        pub mod delete;
        /// The dataset entity
        pub mod entity;
        /// Metadata export
        pub mod export;
        /// Metadata block normalization
        pub mod metadata;
        /// Publishing operations
        pub mod publish;
        /// Dataset review operations
        pub mod review;
        /// Size calculations
        pub mod size;
        /// Version resolution
        pub mod versions;
    }
}

/// Commonly used types and functions
pub mod prelude {
    pub use super::client::BaseClient;
    pub use super::config::Config;
    pub use super::datasetversion::{DatasetVersion, VersionKey, VersionNumber};
    pub use super::entity::Entity;
    pub use super::error::{DataverseError, Result};
    pub use super::identifier::{DataverseId, Identifier};
    pub use super::input::MetadataInput;
    pub use super::native_api::collection::{Child, Dataverse, Listed};
    pub use super::native_api::dataset::{Dataset, Export, PublishOutcome};
}

/// Test utilities
#[cfg(test)]
mod test_utils;
