pub const DEFAULT_HISTORY_TABLE: &str = "__EFMigrationsHistory";

/// Settings shared by the [`Migrator`](crate::migrator::Migrator) and the
/// [`HistoryRepository`](crate::history::HistoryRepository).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigratorConfig {
    /// Name of the history table.
    pub history_table: String,
    /// Schema of the history table. `None` uses the connection's default.
    pub history_schema: Option<String>,
    /// Version recorded next to every applied migration.
    pub product_version: String,
    /// Appended to every generated statement.
    pub statement_separator: String,
}

impl Default for MigratorConfig {
    fn default() -> Self {
        Self {
            history_table: DEFAULT_HISTORY_TABLE.to_string(),
            history_schema: None,
            product_version: env!("CARGO_PKG_VERSION").to_string(),
            statement_separator: ";".to_string(),
        }
    }
}

impl MigratorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn history_table(mut self, name: impl Into<String>) -> Self {
        self.history_table = name.into();
        self
    }

    pub fn history_schema(mut self, schema: impl Into<String>) -> Self {
        self.history_schema = Some(schema.into());
        self
    }

    /// Overrides the version written to the history table.
    pub fn product_version(mut self, version: impl Into<String>) -> Self {
        self.product_version = version.into();
        self
    }

    pub fn statement_separator(mut self, separator: impl Into<String>) -> Self {
        self.statement_separator = separator.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = MigratorConfig::new();
        assert_eq!(config.history_table, "__EFMigrationsHistory");
        assert_eq!(config.history_schema, None);
        assert_eq!(config.product_version, env!("CARGO_PKG_VERSION"));
        assert_eq!(config.statement_separator, ";");
    }

    #[test]
    fn builder_overrides() {
        let config = MigratorConfig::new()
            .history_table("migrations")
            .history_schema("ops")
            .product_version("9.9.9")
            .statement_separator("\nGO");

        assert_eq!(config.history_table, "migrations");
        assert_eq!(config.history_schema.as_deref(), Some("ops"));
        assert_eq!(config.product_version, "9.9.9");
        assert_eq!(config.statement_separator, "\nGO");
    }
}
