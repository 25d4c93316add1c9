//! CRM source API
//!
//! # Overview
//!
//! - [`PropertyCatalog`] lists property definitions per object type
//! - [`ChunkedFetcher`] reads all records of an object type, splitting the
//!   property set into chunks and merging the partial records by id
//! - [`list_schemas`] lists custom object schemas

mod fetcher;
mod merge;
mod properties;
mod schemas;
mod types;

pub use fetcher::{partition_properties, ChunkedFetcher, FetchReport};
pub use merge::{MergeOutcome, RecordMerger};
pub use properties::PropertyCatalog;
pub use schemas::{list_schemas, SCHEMAS_ENDPOINT};
pub use types::{
    record_id, MergedRecord, ObjectSchema, PropertiesResponse, PropertyDefinition,
    SchemasResponse, ID_KEYS,
};
