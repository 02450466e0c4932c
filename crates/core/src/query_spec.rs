use std::sync::OnceLock;

use regex::Regex;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum QuerySpecError {
    #[error("At least one column value is required")]
    NoColumnValues,
    #[error("At least one attribute is required")]
    NoAttributes,
}

/// Column types offered by the create-table form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeType {
    Int,
    Varchar255,
    Text,
    Date,
}

pub const ATTRIBUTE_TYPES: [AttributeType; 4] = [
    AttributeType::Int,
    AttributeType::Varchar255,
    AttributeType::Text,
    AttributeType::Date,
];

impl AttributeType {
    #[must_use]
    pub fn as_sql(self) -> &'static str {
        match self {
            Self::Int => "INT",
            Self::Varchar255 => "VARCHAR(255)",
            Self::Text => "TEXT",
            Self::Date => "DATE",
        }
    }

    #[must_use]
    pub fn next(self) -> Self {
        match self {
            Self::Int => Self::Varchar255,
            Self::Varchar255 => Self::Text,
            Self::Text => Self::Date,
            Self::Date => Self::Int,
        }
    }
}

impl Default for AttributeType {
    fn default() -> Self {
        Self::Int
    }
}

/// One (name, type) row of the create-table form. Rows are append-only.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AttributeRow {
    pub name: String,
    pub attribute_type: AttributeType,
}

/// A submitted statement as a tagged variant rather than an ad-hoc string.
/// Rendering still interpolates values with naive single quotes and no
/// escaping; the backend contract expects these exact shapes, so malformed
/// input corrupts the statement (known limitation, kept for parity).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuerySpec {
    SelectAll {
        table: String,
    },
    Insert {
        table: String,
        columns: Vec<String>,
        values: Vec<String>,
    },
    Update {
        table: String,
        assignments: Vec<(String, String)>,
        row_id: String,
    },
    Delete {
        table: String,
        row_id: String,
    },
    CreateDatabase {
        name: String,
    },
    DropDatabase {
        name: String,
    },
    CreateTable {
        table: String,
        attributes: Vec<AttributeRow>,
    },
    DropTable {
        table: String,
    },
    Raw {
        sql: String,
    },
}

impl QuerySpec {
    /// Builds an insert from column/value pairs, dropping empty values the
    /// way the form does before submitting.
    pub fn insert(
        table: impl Into<String>,
        fields: &[(String, String)],
    ) -> Result<Self, QuerySpecError> {
        let mut columns = Vec::new();
        let mut values = Vec::new();
        for (column, value) in fields {
            if !value.is_empty() {
                columns.push(column.clone());
                values.push(value.clone());
            }
        }
        if columns.is_empty() {
            return Err(QuerySpecError::NoColumnValues);
        }
        Ok(Self::Insert {
            table: table.into(),
            columns,
            values,
        })
    }

    /// Builds an update from every visible input, blank values included: an
    /// untouched field writes an empty string, matching the observed form.
    pub fn update(
        table: impl Into<String>,
        assignments: Vec<(String, String)>,
        row_id: impl Into<String>,
    ) -> Result<Self, QuerySpecError> {
        if assignments.is_empty() {
            return Err(QuerySpecError::NoColumnValues);
        }
        Ok(Self::Update {
            table: table.into(),
            assignments,
            row_id: row_id.into(),
        })
    }

    /// Builds a create-table from the attribute rows. Rows with blank names
    /// are skipped at render time; zero rows is a validation failure.
    pub fn create_table(
        table: impl Into<String>,
        attributes: Vec<AttributeRow>,
    ) -> Result<Self, QuerySpecError> {
        if attributes.is_empty() {
            return Err(QuerySpecError::NoAttributes);
        }
        Ok(Self::CreateTable {
            table: table.into(),
            attributes,
        })
    }

    #[must_use]
    pub fn to_sql(&self) -> String {
        match self {
            Self::SelectAll { table } => format!("SELECT * FROM {table}"),
            Self::Insert {
                table,
                columns,
                values,
            } => {
                let quoted = values
                    .iter()
                    .map(|value| quote_value(value))
                    .collect::<Vec<_>>();
                format!(
                    "INSERT INTO {table} ({}) VALUES ({})",
                    columns.join(", "),
                    quoted.join(", ")
                )
            }
            Self::Update {
                table,
                assignments,
                row_id,
            } => {
                let set_clause = assignments
                    .iter()
                    .map(|(column, value)| format!("{column} = {}", quote_value(value)))
                    .collect::<Vec<_>>();
                format!(
                    "UPDATE {table} SET {} WHERE id = {}",
                    set_clause.join(", "),
                    quote_value(row_id)
                )
            }
            Self::Delete { table, row_id } => {
                format!("DELETE FROM {table} WHERE id = {}", quote_value(row_id))
            }
            Self::CreateDatabase { name } => format!("CREATE DATABASE {name}"),
            Self::DropDatabase { name } => format!("DROP DATABASE {name}"),
            Self::CreateTable { table, attributes } => {
                let columns = attributes
                    .iter()
                    .filter(|attribute| !attribute.name.is_empty())
                    .map(|attribute| {
                        format!("{} {}", attribute.name, attribute.attribute_type.as_sql())
                    })
                    .collect::<Vec<_>>();
                format!("CREATE TABLE {table} ({})", columns.join(", "))
            }
            Self::DropTable { table } => format!("DROP TABLE {table}"),
            Self::Raw { sql } => sql.clone(),
        }
    }
}

fn quote_value(value: &str) -> String {
    format!("'{value}'")
}

/// Detects `SELECT * FROM <identifier>` (case-insensitive) in a raw query so
/// the submit path can prefetch that table's schema for blob decoding.
#[must_use]
pub fn detect_select_star_table(query: &str) -> Option<&str> {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    let pattern = PATTERN.get_or_init(|| {
        Regex::new(r"(?i)select\s+\*\s+from\s+([a-zA-Z0-9_]+)").expect("valid select pattern")
    });
    pattern
        .captures(query)
        .and_then(|captures| captures.get(1))
        .map(|table| table.as_str())
}

#[cfg(test)]
mod tests {
    use super::{
        detect_select_star_table, AttributeRow, AttributeType, QuerySpec, QuerySpecError,
    };

    #[test]
    fn renders_select_and_drop_statements() {
        let select = QuerySpec::SelectAll {
            table: "users".to_string(),
        };
        assert_eq!(select.to_sql(), "SELECT * FROM users");

        let drop_table = QuerySpec::DropTable {
            table: "users".to_string(),
        };
        assert_eq!(drop_table.to_sql(), "DROP TABLE users");

        let drop_db = QuerySpec::DropDatabase {
            name: "testdb".to_string(),
        };
        assert_eq!(drop_db.to_sql(), "DROP DATABASE testdb");
    }

    #[test]
    fn insert_skips_empty_values_and_quotes_the_rest() {
        let fields = vec![
            ("name".to_string(), "ada".to_string()),
            ("age".to_string(), String::new()),
            ("email".to_string(), "ada@example.com".to_string()),
        ];
        let spec = QuerySpec::insert("users", &fields).expect("insert spec");
        assert_eq!(
            spec.to_sql(),
            "INSERT INTO users (name, email) VALUES ('ada', 'ada@example.com')"
        );
    }

    #[test]
    fn insert_with_no_populated_fields_is_a_validation_error() {
        let fields = vec![("name".to_string(), String::new())];
        let err = QuerySpec::insert("users", &fields).expect_err("should fail");
        assert_eq!(err, QuerySpecError::NoColumnValues);
        assert_eq!(err.to_string(), "At least one column value is required");
    }

    #[test]
    fn update_keeps_blank_assignments_and_binds_the_row_id() {
        let spec = QuerySpec::update(
            "users",
            vec![
                ("name".to_string(), "ada".to_string()),
                ("note".to_string(), String::new()),
            ],
            "5",
        )
        .expect("update spec");
        assert_eq!(
            spec.to_sql(),
            "UPDATE users SET name = 'ada', note = '' WHERE id = '5'"
        );
    }

    #[test]
    fn delete_targets_the_selected_row() {
        let spec = QuerySpec::Delete {
            table: "t1".to_string(),
            row_id: "5".to_string(),
        };
        assert_eq!(spec.to_sql(), "DELETE FROM t1 WHERE id = '5'");
    }

    #[test]
    fn create_table_renders_typed_columns_and_skips_blank_names() {
        let attributes = vec![
            AttributeRow {
                name: "age".to_string(),
                attribute_type: AttributeType::Int,
            },
            AttributeRow {
                name: String::new(),
                attribute_type: AttributeType::Text,
            },
            AttributeRow {
                name: "email".to_string(),
                attribute_type: AttributeType::Varchar255,
            },
        ];
        let spec = QuerySpec::create_table("users", attributes).expect("create table spec");
        assert_eq!(
            spec.to_sql(),
            "CREATE TABLE users (age INT, email VARCHAR(255))"
        );
    }

    #[test]
    fn create_table_requires_at_least_one_attribute_row() {
        let err = QuerySpec::create_table("users", Vec::new()).expect_err("should fail");
        assert_eq!(err, QuerySpecError::NoAttributes);
        assert_eq!(err.to_string(), "At least one attribute is required");
    }

    #[test]
    fn naive_quoting_is_preserved_verbatim() {
        let fields = vec![("name".to_string(), "a'b".to_string())];
        let spec = QuerySpec::insert("users", &fields).expect("insert spec");
        assert_eq!(spec.to_sql(), "INSERT INTO users (name) VALUES ('a'b')");
    }

    #[test]
    fn detects_select_star_queries_case_insensitively() {
        assert_eq!(
            detect_select_star_table("SELECT * FROM users"),
            Some("users")
        );
        assert_eq!(
            detect_select_star_table("select  *   from Orders_2024 where id = 1"),
            Some("Orders_2024")
        );
        assert_eq!(detect_select_star_table("SELECT id FROM users"), None);
        assert_eq!(detect_select_star_table("DELETE FROM users"), None);
    }

    #[test]
    fn attribute_types_cycle_through_the_offered_set() {
        assert_eq!(AttributeType::Int.as_sql(), "INT");
        assert_eq!(AttributeType::Int.next(), AttributeType::Varchar255);
        assert_eq!(AttributeType::Date.next(), AttributeType::Int);
    }
}
