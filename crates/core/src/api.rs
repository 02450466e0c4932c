use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::profiles::Role;

/// One column of a table's schema, as reported by the schema endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ColumnDescriptor {
    pub name: String,
    #[serde(rename = "type")]
    pub column_type: String,
}

/// One column of a fetched row: schema metadata plus the current value.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RowColumn {
    pub name: String,
    #[serde(rename = "type")]
    pub column_type: String,
    pub value: String,
}

/// The `/query` response. The backend sends exactly one of `error`, `rows`
/// (affected-row count) or `data` (result set); absent fields are omitted.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct QueryResponse {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub rows: Option<u64>,
    #[serde(default)]
    pub data: Option<Vec<Map<String, Value>>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct PanelApiError {
    message: String,
}

impl PanelApiError {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// The REST backend the panel talks to. The controller only sees this seam;
/// the reqwest implementation lives in the client crate, fakes in tests.
#[async_trait]
pub trait PanelApi {
    async fn list_databases(&self) -> Result<Vec<String>, PanelApiError>;

    async fn list_tables(&self, database: &str) -> Result<Vec<String>, PanelApiError>;

    async fn table_schema(
        &self,
        database: &str,
        table: &str,
    ) -> Result<Vec<ColumnDescriptor>, PanelApiError>;

    async fn list_row_ids(&self, database: &str, table: &str)
        -> Result<Vec<String>, PanelApiError>;

    async fn fetch_row(
        &self,
        database: &str,
        table: &str,
        id: &str,
    ) -> Result<Vec<RowColumn>, PanelApiError>;

    async fn execute_query(
        &self,
        role: Role,
        database: &str,
        sql: &str,
    ) -> Result<QueryResponse, PanelApiError>;
}
