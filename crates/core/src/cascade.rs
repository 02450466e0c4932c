/// The database → table → row dependency chain. A downstream selection is
/// only meaningful once its upstream has a value, and changing an upstream
/// selection clears everything below it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CascadeSelection {
    database: Option<String>,
    table: Option<String>,
    row_id: Option<String>,
}

impl CascadeSelection {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn database(&self) -> Option<&str> {
        self.database.as_deref()
    }

    #[must_use]
    pub fn table(&self) -> Option<&str> {
        self.table.as_deref()
    }

    #[must_use]
    pub fn row_id(&self) -> Option<&str> {
        self.row_id.as_deref()
    }

    pub fn set_database(&mut self, database: Option<String>) {
        self.database = normalize(database);
        self.table = None;
        self.row_id = None;
    }

    /// Sets the table selection; ignored (left cleared) without a database.
    pub fn set_table(&mut self, table: Option<String>) {
        self.table = if self.database.is_some() {
            normalize(table)
        } else {
            None
        };
        self.row_id = None;
    }

    /// Sets the row selection; ignored without an upstream table.
    pub fn set_row(&mut self, row_id: Option<String>) {
        self.row_id = if self.table.is_some() {
            normalize(row_id)
        } else {
            None
        };
    }

    pub fn clear(&mut self) {
        self.database = None;
        self.table = None;
        self.row_id = None;
    }
}

/// Placeholder selections arrive as empty strings from select controls.
fn normalize(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::CascadeSelection;

    fn full_selection() -> CascadeSelection {
        let mut cascade = CascadeSelection::new();
        cascade.set_database(Some("d1".to_string()));
        cascade.set_table(Some("t1".to_string()));
        cascade.set_row(Some("5".to_string()));
        cascade
    }

    #[test]
    fn database_change_clears_table_and_row() {
        let mut cascade = full_selection();
        cascade.set_database(Some("d2".to_string()));

        assert_eq!(cascade.database(), Some("d2"));
        assert_eq!(cascade.table(), None);
        assert_eq!(cascade.row_id(), None);
    }

    #[test]
    fn resetting_database_to_placeholder_clears_everything_downstream() {
        let mut cascade = full_selection();
        cascade.set_database(Some(String::new()));

        assert_eq!(cascade.database(), None);
        assert_eq!(cascade.table(), None);
        assert_eq!(cascade.row_id(), None);
    }

    #[test]
    fn table_change_clears_row_only() {
        let mut cascade = full_selection();
        cascade.set_table(Some("t2".to_string()));

        assert_eq!(cascade.database(), Some("d1"));
        assert_eq!(cascade.table(), Some("t2"));
        assert_eq!(cascade.row_id(), None);
    }

    #[test]
    fn downstream_selection_requires_upstream_value() {
        let mut cascade = CascadeSelection::new();
        cascade.set_table(Some("t1".to_string()));
        assert_eq!(cascade.table(), None);

        cascade.set_database(Some("d1".to_string()));
        cascade.set_row(Some("5".to_string()));
        assert_eq!(cascade.row_id(), None);
    }
}
