use std::collections::HashMap;

use tracing::{error, warn};

use crate::api::{PanelApi, QueryResponse};
use crate::blob::display_value;
use crate::cascade::CascadeSelection;
use crate::history::{unix_timestamp_millis, HistoryOutcome, HistoryRecord, QueryHistory};
use crate::operation::{Operation, TableChangeLoad};
use crate::profiles::Role;
use crate::query_spec::{detect_select_star_table, AttributeRow, QuerySpec};
use crate::result_view::{table_from_records, ResultView};

const MSG_DB_AND_TABLE_REQUIRED: &str = "Database and table selection are required";
const MSG_DB_TABLE_ID_REQUIRED: &str = "Database, table, and ID selection are required";
const MSG_DB_TABLE_ROW_REQUIRED: &str = "Database, table, and row ID selection are required";
const MSG_DB_NAME_REQUIRED: &str = "Database name is required";
const MSG_DB_SELECTION_REQUIRED: &str = "Database selection is required";
const MSG_DB_AND_TABLE_NAME_REQUIRED: &str = "Database and table name are required";
const MSG_DB_AND_QUERY_REQUIRED: &str = "Database and query are required";

/// One text input rendered for a schema column (insert and update forms).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnInput {
    pub name: String,
    pub column_type: String,
    pub value: String,
}

/// The form controller: the single owner of operation, cascade, field and
/// result state. Every mutation runs to completion before the next event is
/// accepted, so there is exactly one logical writer. Loads and submits render
/// failures into the result panel rather than propagating them; the panel is
/// the user-facing error channel, tracing the diagnostic one.
#[derive(Debug)]
pub struct FormController<A: PanelApi> {
    api: A,
    role: Role,
    history: Option<QueryHistory>,
    operation: Option<Operation>,
    cascade: CascadeSelection,
    database_options: Vec<String>,
    table_options: Vec<String>,
    row_options: Vec<String>,
    inputs: Vec<ColumnInput>,
    hidden_row_id: Option<String>,
    database_name_input: String,
    table_name_input: String,
    raw_query_input: String,
    attributes: Vec<AttributeRow>,
    result: Option<ResultView>,
}

impl<A: PanelApi> FormController<A> {
    #[must_use]
    pub fn new(api: A, role: Role) -> Self {
        Self {
            api,
            role,
            history: None,
            operation: None,
            cascade: CascadeSelection::new(),
            database_options: Vec::new(),
            table_options: Vec::new(),
            row_options: Vec::new(),
            inputs: Vec::new(),
            hidden_row_id: None,
            database_name_input: String::new(),
            table_name_input: String::new(),
            raw_query_input: String::new(),
            attributes: Vec::new(),
            result: None,
        }
    }

    #[must_use]
    pub fn with_history(mut self, history: QueryHistory) -> Self {
        self.history = Some(history);
        self
    }

    #[must_use]
    pub fn operation(&self) -> Option<Operation> {
        self.operation
    }

    #[must_use]
    pub fn role(&self) -> Role {
        self.role
    }

    #[must_use]
    pub fn cascade(&self) -> &CascadeSelection {
        &self.cascade
    }

    #[must_use]
    pub fn database_options(&self) -> &[String] {
        &self.database_options
    }

    #[must_use]
    pub fn table_options(&self) -> &[String] {
        &self.table_options
    }

    #[must_use]
    pub fn row_options(&self) -> &[String] {
        &self.row_options
    }

    #[must_use]
    pub fn inputs(&self) -> &[ColumnInput] {
        &self.inputs
    }

    #[must_use]
    pub fn attributes(&self) -> &[AttributeRow] {
        &self.attributes
    }

    #[must_use]
    pub fn database_name(&self) -> &str {
        &self.database_name_input
    }

    #[must_use]
    pub fn table_name(&self) -> &str {
        &self.table_name_input
    }

    #[must_use]
    pub fn raw_query(&self) -> &str {
        &self.raw_query_input
    }

    #[must_use]
    pub fn result(&self) -> Option<&ResultView> {
        self.result.as_ref()
    }

    pub fn set_database_name(&mut self, value: impl Into<String>) {
        self.database_name_input = value.into();
    }

    pub fn set_table_name(&mut self, value: impl Into<String>) {
        self.table_name_input = value.into();
    }

    pub fn set_raw_query(&mut self, value: impl Into<String>) {
        self.raw_query_input = value.into();
    }

    pub fn set_input_value(&mut self, index: usize, value: impl Into<String>) {
        if let Some(input) = self.inputs.get_mut(index) {
            input.value = value.into();
        }
    }

    pub fn add_attribute(&mut self) {
        self.attributes.push(AttributeRow::default());
    }

    pub fn set_attribute_name(&mut self, index: usize, name: impl Into<String>) {
        if let Some(attribute) = self.attributes.get_mut(index) {
            attribute.name = name.into();
        }
    }

    pub fn cycle_attribute_type(&mut self, index: usize) {
        if let Some(attribute) = self.attributes.get_mut(index) {
            attribute.attribute_type = attribute.attribute_type.next();
        }
    }

    /// Selects an operation: the previous form is torn down wholesale and
    /// the operation-specific skeleton takes its place, with the database
    /// dropdown pre-loaded for every form that shows one.
    pub async fn select_operation(&mut self, operation: Operation) {
        self.operation = Some(operation);
        self.cascade.clear();
        self.database_options.clear();
        self.table_options.clear();
        self.row_options.clear();
        self.inputs.clear();
        self.hidden_row_id = None;
        self.database_name_input.clear();
        self.table_name_input.clear();
        self.raw_query_input.clear();
        self.attributes.clear();

        if operation.loads_databases_on_select() {
            self.load_databases().await;
        }
    }

    /// Database selection change: clears all downstream state, then
    /// re-populates the table dropdown where the form wires one.
    pub async fn set_database(&mut self, database: Option<String>) {
        let Some(operation) = self.operation else {
            return;
        };

        self.cascade.set_database(database);
        self.table_options.clear();
        self.row_options.clear();
        self.inputs.clear();
        self.hidden_row_id = None;

        if operation.loads_tables_on_database_change() {
            if let Some(database) = self.cascade.database().map(str::to_string) {
                self.load_tables(&database).await;
            }
        }
    }

    /// Table selection change: clears row state, then loads the schema
    /// (insert) or the row-id list (update/delete).
    pub async fn set_table(&mut self, table: Option<String>) {
        let Some(operation) = self.operation else {
            return;
        };

        self.cascade.set_table(table);
        self.row_options.clear();
        self.inputs.clear();
        self.hidden_row_id = None;

        let (Some(database), Some(table)) = (
            self.cascade.database().map(str::to_string),
            self.cascade.table().map(str::to_string),
        ) else {
            return;
        };

        match operation.table_change_load() {
            Some(TableChangeLoad::Schema) => self.load_schema(&database, &table).await,
            Some(TableChangeLoad::Rows) => self.load_rows(&database, &table).await,
            None => {}
        }
    }

    /// Row selection change: for update, fetches the row and pre-fills one
    /// input per column, blob values decoded for display.
    pub async fn set_row(&mut self, row_id: Option<String>) {
        let Some(operation) = self.operation else {
            return;
        };

        self.cascade.set_row(row_id);

        if !operation.fetches_row_on_row_change() {
            return;
        }
        let (Some(database), Some(table), Some(row_id)) = (
            self.cascade.database().map(str::to_string),
            self.cascade.table().map(str::to_string),
            self.cascade.row_id().map(str::to_string),
        ) else {
            return;
        };
        self.fetch_row_data(&database, &table, &row_id).await;
    }

    pub async fn load_databases(&mut self) {
        match self.api.list_databases().await {
            Ok(databases) => self.database_options = databases,
            Err(source) => {
                error!(error = %source, "failed to fetch databases");
                self.database_options.clear();
                self.result = Some(ResultView::message(format!(
                    "Error fetching databases: {source}"
                )));
            }
        }
    }

    async fn load_tables(&mut self, database: &str) {
        match self.api.list_tables(database).await {
            Ok(tables) => self.table_options = tables,
            Err(source) => {
                error!(error = %source, database, "failed to fetch tables");
                self.result = Some(ResultView::message(format!(
                    "Error fetching tables: {source}"
                )));
            }
        }
    }

    async fn load_schema(&mut self, database: &str, table: &str) {
        match self.api.table_schema(database, table).await {
            Ok(columns) => {
                self.inputs = columns
                    .into_iter()
                    .map(|column| ColumnInput {
                        name: column.name,
                        column_type: column.column_type,
                        value: String::new(),
                    })
                    .collect();
            }
            Err(source) => {
                error!(error = %source, database, table, "failed to fetch schema");
                self.result = Some(ResultView::message(format!(
                    "Error fetching schema: {source}"
                )));
            }
        }
    }

    async fn load_rows(&mut self, database: &str, table: &str) {
        match self.api.list_row_ids(database, table).await {
            Ok(ids) => self.row_options = ids,
            Err(source) => {
                error!(error = %source, database, table, "failed to fetch rows");
                self.result = Some(ResultView::message(format!("Error fetching rows: {source}")));
            }
        }
    }

    async fn fetch_row_data(&mut self, database: &str, table: &str, row_id: &str) {
        match self.api.fetch_row(database, table, row_id).await {
            Ok(columns) => {
                self.hidden_row_id = Some(row_id.to_string());
                self.inputs = columns
                    .into_iter()
                    .map(|column| {
                        let value = display_value(&column.column_type, &column.value);
                        ColumnInput {
                            name: column.name,
                            column_type: column.column_type,
                            value,
                        }
                    })
                    .collect();
            }
            Err(source) => {
                error!(error = %source, database, table, row_id, "failed to fetch row data");
                self.result = Some(ResultView::message(format!(
                    "Error fetching row data: {source}"
                )));
            }
        }
    }

    /// Builds the statement for the selected operation and posts it. Local
    /// validation failures render their fixed message without touching the
    /// network.
    pub async fn submit(&mut self) {
        let Some(operation) = self.operation else {
            return;
        };

        match operation {
            Operation::SelectTable => self.submit_select_table().await,
            Operation::Insert => self.submit_insert().await,
            Operation::Update => self.submit_update().await,
            Operation::Delete => self.submit_delete().await,
            Operation::CreateDb => self.submit_create_db().await,
            Operation::DropDb => self.submit_drop_db().await,
            Operation::CreateTable => self.submit_create_table().await,
            Operation::DropTable => self.submit_drop_table().await,
            Operation::MysqlQuery => self.submit_mysql_query().await,
        }
    }

    async fn submit_select_table(&mut self) {
        let (Some(database), Some(table)) = (
            self.cascade.database().map(str::to_string),
            self.cascade.table().map(str::to_string),
        ) else {
            self.result = Some(ResultView::message(MSG_DB_AND_TABLE_REQUIRED));
            return;
        };

        // Schema first, so blob-typed result columns can be decoded.
        let Some(column_types) = self.fetch_column_types(&database, &table).await else {
            return;
        };

        let spec = QuerySpec::SelectAll { table };
        let Some(response) = self.run_statement(&database, &spec).await else {
            return;
        };
        if let Some(message) = response.error {
            self.result = Some(ResultView::Message(message));
            return;
        }
        let records = response.data.unwrap_or_default();
        self.result = Some(table_from_records(&records, Some(&column_types)));
    }

    async fn submit_insert(&mut self) {
        let (Some(database), Some(table)) = (
            self.cascade.database().map(str::to_string),
            self.cascade.table().map(str::to_string),
        ) else {
            self.result = Some(ResultView::message(MSG_DB_AND_TABLE_REQUIRED));
            return;
        };

        let fields: Vec<(String, String)> = self
            .inputs
            .iter()
            .map(|input| (input.name.clone(), input.value.clone()))
            .collect();
        let spec = match QuerySpec::insert(table, &fields) {
            Ok(spec) => spec,
            Err(validation) => {
                self.result = Some(ResultView::message(validation.to_string()));
                return;
            }
        };

        self.run_mutation(&database, &spec, Operation::Insert).await;
    }

    async fn submit_update(&mut self) {
        let (Some(database), Some(table), Some(row_id)) = (
            self.cascade.database().map(str::to_string),
            self.cascade.table().map(str::to_string),
            self.hidden_row_id.clone(),
        ) else {
            self.result = Some(ResultView::message(MSG_DB_TABLE_ID_REQUIRED));
            return;
        };

        let assignments: Vec<(String, String)> = self
            .inputs
            .iter()
            .map(|input| (input.name.clone(), input.value.clone()))
            .collect();
        let spec = match QuerySpec::update(table, assignments, row_id) {
            Ok(spec) => spec,
            Err(validation) => {
                self.result = Some(ResultView::message(validation.to_string()));
                return;
            }
        };

        self.run_mutation(&database, &spec, Operation::Update).await;
    }

    async fn submit_delete(&mut self) {
        let (Some(database), Some(table), Some(row_id)) = (
            self.cascade.database().map(str::to_string),
            self.cascade.table().map(str::to_string),
            self.cascade.row_id().map(str::to_string),
        ) else {
            self.result = Some(ResultView::message(MSG_DB_TABLE_ROW_REQUIRED));
            return;
        };

        let spec = QuerySpec::Delete { table, row_id };
        self.run_mutation(&database, &spec, Operation::Delete).await;
    }

    async fn submit_create_db(&mut self) {
        if self.database_name_input.is_empty() {
            self.result = Some(ResultView::message(MSG_DB_NAME_REQUIRED));
            return;
        }
        let name = self.database_name_input.clone();
        let spec = QuerySpec::CreateDatabase { name: name.clone() };

        // The new name doubles as the posted dbName.
        let Some(response) = self.run_statement(&name, &spec).await else {
            return;
        };
        if let Some(message) = response.error {
            self.result = Some(ResultView::Message(message));
            return;
        }
        self.result = Some(ResultView::message("Database created successfully"));
        self.load_databases().await;
    }

    async fn submit_drop_db(&mut self) {
        let Some(database) = self.cascade.database().map(str::to_string) else {
            self.result = Some(ResultView::message(MSG_DB_SELECTION_REQUIRED));
            return;
        };
        let spec = QuerySpec::DropDatabase {
            name: database.clone(),
        };

        let Some(response) = self.run_statement(&database, &spec).await else {
            return;
        };
        if let Some(message) = response.error {
            self.result = Some(ResultView::Message(message));
            return;
        }
        self.result = Some(ResultView::message("Database dropped successfully"));
        self.load_databases().await;
    }

    async fn submit_create_table(&mut self) {
        let (Some(database), table_name) = (
            self.cascade.database().map(str::to_string),
            self.table_name_input.clone(),
        ) else {
            self.result = Some(ResultView::message(MSG_DB_AND_TABLE_NAME_REQUIRED));
            return;
        };
        if table_name.is_empty() {
            self.result = Some(ResultView::message(MSG_DB_AND_TABLE_NAME_REQUIRED));
            return;
        }

        let spec = match QuerySpec::create_table(table_name, self.attributes.clone()) {
            Ok(spec) => spec,
            Err(validation) => {
                self.result = Some(ResultView::message(validation.to_string()));
                return;
            }
        };

        let Some(response) = self.run_statement(&database, &spec).await else {
            return;
        };
        if let Some(message) = response.error {
            self.result = Some(ResultView::Message(message));
            return;
        }
        self.result = Some(ResultView::message("Table created successfully"));
        self.load_tables(&database).await;
    }

    async fn submit_drop_table(&mut self) {
        let (Some(database), Some(table)) = (
            self.cascade.database().map(str::to_string),
            self.cascade.table().map(str::to_string),
        ) else {
            self.result = Some(ResultView::message(MSG_DB_AND_TABLE_REQUIRED));
            return;
        };

        let spec = QuerySpec::DropTable { table };
        let Some(response) = self.run_statement(&database, &spec).await else {
            return;
        };
        if let Some(message) = response.error {
            self.result = Some(ResultView::Message(message));
            return;
        }
        self.result = Some(ResultView::message("Table dropped successfully"));
        self.load_tables(&database).await;
    }

    async fn submit_mysql_query(&mut self) {
        let Some(database) = self.cascade.database().map(str::to_string) else {
            self.result = Some(ResultView::message(MSG_DB_AND_QUERY_REQUIRED));
            return;
        };
        if self.raw_query_input.is_empty() {
            self.result = Some(ResultView::message(MSG_DB_AND_QUERY_REQUIRED));
            return;
        }
        let sql = self.raw_query_input.clone();

        // `SELECT * FROM <table>` gets a schema prefetch so blob columns in
        // the result can be decoded; anything else renders raw values.
        let column_types = match detect_select_star_table(&sql).map(str::to_string) {
            Some(table) => match self.fetch_column_types(&database, &table).await {
                Some(types) => Some(types),
                None => return,
            },
            None => None,
        };

        let spec = QuerySpec::Raw { sql };
        let Some(response) = self.run_statement(&database, &spec).await else {
            return;
        };
        if let Some(message) = response.error {
            self.result = Some(ResultView::Message(message));
            return;
        }
        if let Some(records) = response.data {
            self.result = Some(table_from_records(&records, column_types.as_ref()));
            return;
        }
        self.result = Some(ResultView::message(format!(
            "Query executed successfully, affected {} row(s)",
            response.rows.unwrap_or(0)
        )));
    }

    async fn run_mutation(&mut self, database: &str, spec: &QuerySpec, operation: Operation) {
        let Some(response) = self.run_statement(database, spec).await else {
            return;
        };
        if let Some(message) = response.error {
            self.result = Some(ResultView::Message(message));
            return;
        }
        let verb = operation.mutation_verb().unwrap_or("Affected");
        self.result = Some(ResultView::message(format!(
            "{verb} {} row(s)",
            response.rows.unwrap_or(0)
        )));
    }

    async fn fetch_column_types(
        &mut self,
        database: &str,
        table: &str,
    ) -> Option<HashMap<String, String>> {
        match self.api.table_schema(database, table).await {
            Ok(columns) => Some(
                columns
                    .into_iter()
                    .map(|column| (column.name, column.column_type))
                    .collect(),
            ),
            Err(source) => {
                error!(error = %source, database, table, "failed to fetch schema");
                self.result = Some(ResultView::message(format!(
                    "Error fetching schema: {source}"
                )));
                None
            }
        }
    }

    /// Posts one statement to the query endpoint and records it in the
    /// history log. Transport failures render into the result panel and
    /// yield `None`.
    async fn run_statement(&mut self, database: &str, spec: &QuerySpec) -> Option<QueryResponse> {
        let sql = spec.to_sql();
        match self.api.execute_query(self.role, database, &sql).await {
            Ok(response) => {
                self.record_history(database, &sql, &response);
                Some(response)
            }
            Err(source) => {
                error!(error = %source, database, sql, "failed to execute query");
                self.record_failure(database, &sql, &source.to_string());
                self.result = Some(ResultView::message(format!(
                    "Error executing query: {source}"
                )));
                None
            }
        }
    }

    fn record_history(&self, database: &str, sql: &str, response: &QueryResponse) {
        let record = HistoryRecord {
            timestamp_unix_ms: unix_timestamp_millis(),
            database: database.to_string(),
            role: self.role,
            sql: sql.to_string(),
            outcome: if response.error.is_some() {
                HistoryOutcome::Failed
            } else {
                HistoryOutcome::Succeeded
            },
            rows_affected: response.rows,
            error: response.error.clone(),
        };
        self.append_history(&record);
    }

    fn record_failure(&self, database: &str, sql: &str, message: &str) {
        let record = HistoryRecord {
            timestamp_unix_ms: unix_timestamp_millis(),
            database: database.to_string(),
            role: self.role,
            sql: sql.to_string(),
            outcome: HistoryOutcome::Failed,
            rows_affected: None,
            error: Some(message.to_string()),
        };
        self.append_history(&record);
    }

    fn append_history(&self, record: &HistoryRecord) {
        let Some(history) = &self.history else {
            return;
        };
        if let Err(source) = history.append(record) {
            warn!(error = %source, "failed to append history record");
        }
    }
}
