/// Raw SQL escape hatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqlOperation {
    pub sql: String,
    pub reverse_sql: Option<String>,
    /// Run outside of the migration transaction, in a batch of its own.
    pub suppress_transaction: bool,
    /// Dialect names this statement is limited to. `None` runs everywhere.
    pub only_dialects: Option<Vec<String>>,
    pub description: Option<String>,
}

impl SqlOperation {
    pub fn new(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            reverse_sql: None,
            suppress_transaction: false,
            only_dialects: None,
            description: None,
        }
    }

    pub fn reversible(sql: impl Into<String>, reverse_sql: impl Into<String>) -> Self {
        Self::new(sql).with_reverse(reverse_sql)
    }

    pub fn with_reverse(mut self, sql: impl Into<String>) -> Self {
        self.reverse_sql = Some(sql.into());
        self
    }

    pub fn suppress_transaction(mut self) -> Self {
        self.suppress_transaction = true;
        self
    }

    /// Skip this statement on dialects other than the ones named.
    pub fn only_for(mut self, dialects: &[&str]) -> Self {
        self.only_dialects = Some(dialects.iter().map(|s| s.to_string()).collect());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn runs_on(&self, dialect: &str) -> bool {
        self.only_dialects
            .as_ref()
            .map_or(true, |only| only.iter().any(|d| d == dialect))
    }
}
