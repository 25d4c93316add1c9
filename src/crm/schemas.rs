//! Custom object schema listing

use super::types::{ObjectSchema, SchemasResponse};
use crate::error::Result;
use crate::http::HttpClient;

/// Endpoint listing custom object schemas
pub const SCHEMAS_ENDPOINT: &str = "crm-object-schemas/v3/schemas";

/// Fetch every custom object schema visible to the token
pub async fn list_schemas(client: &HttpClient) -> Result<Vec<ObjectSchema>> {
    let response: SchemasResponse = client.get_json_as(SCHEMAS_ENDPOINT, &[]).await?;
    Ok(response.results)
}
