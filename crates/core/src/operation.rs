/// The nine admin operations the panel can be configured for. Each operation
/// determines the rendered field set and the SQL shape produced on submit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    SelectTable,
    Insert,
    Update,
    Delete,
    CreateDb,
    DropDb,
    CreateTable,
    DropTable,
    MysqlQuery,
}

/// A field slot in an operation's form skeleton. `ColumnInputs` and
/// `AttributeRows` expand dynamically (one input per schema column, one row
/// per added attribute); the rest are single controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    DatabaseSelect,
    TableSelect,
    RowSelect,
    ColumnInputs,
    DatabaseName,
    TableName,
    AttributeRows,
    RawQuery,
}

/// What a table-selection change triggers downstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableChangeLoad {
    Schema,
    Rows,
}

pub const ALL_OPERATIONS: [Operation; 9] = [
    Operation::SelectTable,
    Operation::Insert,
    Operation::Update,
    Operation::Delete,
    Operation::CreateDb,
    Operation::DropDb,
    Operation::CreateTable,
    Operation::DropTable,
    Operation::MysqlQuery,
];

impl Operation {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::SelectTable => "Select Table",
            Self::Insert => "Insert",
            Self::Update => "Update",
            Self::Delete => "Delete",
            Self::CreateDb => "Create Database",
            Self::DropDb => "Drop Database",
            Self::CreateTable => "Create Table",
            Self::DropTable => "Drop Table",
            Self::MysqlQuery => "MySQL Query",
        }
    }

    /// The form skeleton rendered when this operation is selected.
    #[must_use]
    pub fn form_fields(self) -> &'static [FieldKind] {
        match self {
            Self::SelectTable | Self::DropTable => {
                &[FieldKind::DatabaseSelect, FieldKind::TableSelect]
            }
            Self::Insert => &[
                FieldKind::DatabaseSelect,
                FieldKind::TableSelect,
                FieldKind::ColumnInputs,
            ],
            Self::Update => &[
                FieldKind::DatabaseSelect,
                FieldKind::TableSelect,
                FieldKind::RowSelect,
                FieldKind::ColumnInputs,
            ],
            Self::Delete => &[
                FieldKind::DatabaseSelect,
                FieldKind::TableSelect,
                FieldKind::RowSelect,
            ],
            Self::CreateDb => &[FieldKind::DatabaseName],
            Self::DropDb => &[FieldKind::DatabaseSelect],
            Self::CreateTable => &[
                FieldKind::DatabaseSelect,
                FieldKind::TableName,
                FieldKind::AttributeRows,
            ],
            Self::MysqlQuery => &[FieldKind::DatabaseSelect, FieldKind::RawQuery],
        }
    }

    #[must_use]
    pub fn has_field(self, kind: FieldKind) -> bool {
        self.form_fields().contains(&kind)
    }

    /// Whether selecting this operation pre-loads the database dropdown.
    #[must_use]
    pub fn loads_databases_on_select(self) -> bool {
        self.has_field(FieldKind::DatabaseSelect)
    }

    /// Whether a database change re-populates the table dropdown. The create
    /// table form shows a database select but types its table name freely.
    #[must_use]
    pub fn loads_tables_on_database_change(self) -> bool {
        self.has_field(FieldKind::TableSelect)
    }

    #[must_use]
    pub fn table_change_load(self) -> Option<TableChangeLoad> {
        match self {
            Self::Insert => Some(TableChangeLoad::Schema),
            Self::Update | Self::Delete => Some(TableChangeLoad::Rows),
            _ => None,
        }
    }

    /// Whether a row-id change pre-fills the column inputs from the backend.
    #[must_use]
    pub fn fetches_row_on_row_change(self) -> bool {
        self == Self::Update
    }

    /// The verb used when reporting an affected-row count for this operation.
    #[must_use]
    pub fn mutation_verb(self) -> Option<&'static str> {
        match self {
            Self::Insert => Some("Inserted"),
            Self::Update => Some("Updated"),
            Self::Delete => Some("Deleted"),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{FieldKind, Operation, TableChangeLoad, ALL_OPERATIONS};

    #[test]
    fn form_shapes_match_the_operation_table() {
        assert_eq!(
            Operation::SelectTable.form_fields(),
            [FieldKind::DatabaseSelect, FieldKind::TableSelect]
        );
        assert_eq!(
            Operation::Insert.form_fields(),
            [
                FieldKind::DatabaseSelect,
                FieldKind::TableSelect,
                FieldKind::ColumnInputs
            ]
        );
        assert_eq!(
            Operation::Update.form_fields(),
            [
                FieldKind::DatabaseSelect,
                FieldKind::TableSelect,
                FieldKind::RowSelect,
                FieldKind::ColumnInputs
            ]
        );
        assert_eq!(
            Operation::Delete.form_fields(),
            [
                FieldKind::DatabaseSelect,
                FieldKind::TableSelect,
                FieldKind::RowSelect
            ]
        );
        assert_eq!(
            Operation::CreateDb.form_fields(),
            [FieldKind::DatabaseName]
        );
        assert_eq!(Operation::DropDb.form_fields(), [FieldKind::DatabaseSelect]);
        assert_eq!(
            Operation::CreateTable.form_fields(),
            [
                FieldKind::DatabaseSelect,
                FieldKind::TableName,
                FieldKind::AttributeRows
            ]
        );
        assert_eq!(
            Operation::DropTable.form_fields(),
            [FieldKind::DatabaseSelect, FieldKind::TableSelect]
        );
        assert_eq!(
            Operation::MysqlQuery.form_fields(),
            [FieldKind::DatabaseSelect, FieldKind::RawQuery]
        );
    }

    #[test]
    fn every_operation_but_create_db_preloads_databases() {
        for operation in ALL_OPERATIONS {
            assert_eq!(
                operation.loads_databases_on_select(),
                operation != Operation::CreateDb,
                "unexpected database preload for {operation:?}"
            );
        }
    }

    #[test]
    fn cascade_wiring_follows_the_form_shape() {
        assert!(Operation::SelectTable.loads_tables_on_database_change());
        assert!(Operation::DropTable.loads_tables_on_database_change());
        assert!(!Operation::CreateTable.loads_tables_on_database_change());
        assert!(!Operation::MysqlQuery.loads_tables_on_database_change());

        assert_eq!(
            Operation::Insert.table_change_load(),
            Some(TableChangeLoad::Schema)
        );
        assert_eq!(
            Operation::Update.table_change_load(),
            Some(TableChangeLoad::Rows)
        );
        assert_eq!(
            Operation::Delete.table_change_load(),
            Some(TableChangeLoad::Rows)
        );
        assert_eq!(Operation::SelectTable.table_change_load(), None);

        assert!(Operation::Update.fetches_row_on_row_change());
        assert!(!Operation::Delete.fetches_row_on_row_change());
    }

    #[test]
    fn mutation_verbs_cover_row_level_writes_only() {
        assert_eq!(Operation::Insert.mutation_verb(), Some("Inserted"));
        assert_eq!(Operation::Update.mutation_verb(), Some("Updated"));
        assert_eq!(Operation::Delete.mutation_verb(), Some("Deleted"));
        assert_eq!(Operation::CreateDb.mutation_verb(), None);
        assert_eq!(Operation::MysqlQuery.mutation_verb(), None);
    }
}
