use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

use sqlboard_core::api::{ColumnDescriptor, PanelApi, PanelApiError, QueryResponse, RowColumn};
use sqlboard_core::profiles::Role;

/// HTTP client for the panel backend. Listing endpoints are plain GETs with
/// query parameters; statement execution is a form-encoded POST to `/query`.
/// The backend reports failures as a JSON `{error}` body with a non-2xx
/// status, so responses are decoded regardless of status and the error field
/// flows through to the caller verbatim.
#[derive(Debug, Clone)]
pub struct RestPanelApi {
    client: reqwest::Client,
    base_url: String,
}

/// Listing envelopes. The backend marshals an empty listing as JSON `null`,
/// and error bodies omit the field entirely.
#[derive(Debug, Deserialize)]
struct DatabasesBody {
    #[serde(default)]
    databases: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct TablesBody {
    #[serde(default)]
    tables: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct SchemaBody {
    #[serde(default)]
    columns: Option<Vec<ColumnDescriptor>>,
}

#[derive(Debug, Deserialize)]
struct RowIdsBody {
    #[serde(default)]
    ids: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct RowBody {
    #[serde(default)]
    columns: Option<Vec<RowColumn>>,
}

impl RestPanelApi {
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, &str)],
    ) -> Result<T, PanelApiError> {
        let url = format!("{}{path}", self.base_url);
        debug!(url, "requesting listing");
        self.client
            .get(&url)
            .query(params)
            .send()
            .await
            .map_err(|source| PanelApiError::new(source.to_string()))?
            .json()
            .await
            .map_err(|source| PanelApiError::new(source.to_string()))
    }
}

#[async_trait]
impl PanelApi for RestPanelApi {
    async fn list_databases(&self) -> Result<Vec<String>, PanelApiError> {
        let body: DatabasesBody = self.get_json("/databases", &[]).await?;
        Ok(body.databases.unwrap_or_default())
    }

    async fn list_tables(&self, database: &str) -> Result<Vec<String>, PanelApiError> {
        let body: TablesBody = self.get_json("/tables", &[("db", database)]).await?;
        Ok(body.tables.unwrap_or_default())
    }

    async fn table_schema(
        &self,
        database: &str,
        table: &str,
    ) -> Result<Vec<ColumnDescriptor>, PanelApiError> {
        let body: SchemaBody = self
            .get_json("/schema", &[("db", database), ("table", table)])
            .await?;
        Ok(body.columns.unwrap_or_default())
    }

    async fn list_row_ids(
        &self,
        database: &str,
        table: &str,
    ) -> Result<Vec<String>, PanelApiError> {
        let body: RowIdsBody = self
            .get_json("/rows", &[("db", database), ("table", table)])
            .await?;
        Ok(body.ids.unwrap_or_default())
    }

    async fn fetch_row(
        &self,
        database: &str,
        table: &str,
        id: &str,
    ) -> Result<Vec<RowColumn>, PanelApiError> {
        let body: RowBody = self
            .get_json("/row", &[("db", database), ("table", table), ("id", id)])
            .await?;
        Ok(body.columns.unwrap_or_default())
    }

    async fn execute_query(
        &self,
        role: Role,
        database: &str,
        sql: &str,
    ) -> Result<QueryResponse, PanelApiError> {
        let url = format!("{}/query", self.base_url);
        debug!(url, database, "posting statement");
        self.client
            .post(&url)
            .form(&[
                ("userType", role.wire_value()),
                ("dbName", database),
                ("query", sql),
            ])
            .send()
            .await
            .map_err(|source| PanelApiError::new(source.to_string()))?
            .json()
            .await
            .map_err(|source| PanelApiError::new(source.to_string()))
    }
}
