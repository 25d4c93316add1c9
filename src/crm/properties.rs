//! Property catalog: which fields exist for an object type

use super::types::{PropertiesResponse, PropertyDefinition};
use crate::error::Result;
use crate::http::HttpClient;
use crate::types::ObjectType;
use tracing::{info, warn};

/// Reads property metadata for object types
#[derive(Debug)]
pub struct PropertyCatalog<'a> {
    client: &'a HttpClient,
}

impl<'a> PropertyCatalog<'a> {
    /// Create a catalog reader over a transport
    pub fn new(client: &'a HttpClient) -> Self {
        Self { client }
    }

    /// All non-archived property definitions for an object type
    ///
    /// Every failure propagates; see [`fetch_names`](Self::fetch_names) for
    /// the tolerant variant used by the sync pipeline.
    pub async fn list(&self, object: &ObjectType) -> Result<Vec<PropertyDefinition>> {
        let response: PropertiesResponse = self
            .client
            .get_json_as(
                &object.properties_endpoint(),
                &[("archived", "false".to_string())],
            )
            .await?;

        Ok(response
            .results
            .into_iter()
            .filter(|property| !property.archived)
            .collect())
    }

    /// Names of all non-archived properties for an object type
    ///
    /// Authorization (401/403) and bad-request (400) failures yield an empty
    /// list with a warning, since grants differ between accounts. Any other
    /// failure propagates to the caller.
    pub async fn fetch_names(&self, object: &ObjectType) -> Result<Vec<String>> {
        match self.list(object).await {
            Ok(properties) => {
                let names: Vec<String> = properties.into_iter().map(|p| p.name).collect();
                info!(object = %object, count = names.len(), "Properties fetched");
                Ok(names)
            }
            Err(e) if e.is_permission_denied() => {
                warn!(
                    object = %object,
                    status = e.status(),
                    "Permission denied fetching properties, skipping"
                );
                Ok(Vec::new())
            }
            Err(e) if e.is_bad_request() => {
                warn!(object = %object, "Bad request fetching properties (400), skipping");
                Ok(Vec::new())
            }
            Err(e) => Err(e),
        }
    }
}
