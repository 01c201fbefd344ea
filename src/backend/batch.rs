/// One unit of SQL text executed as a whole.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqlBatch {
    pub sql: String,
    /// Must run outside of any transaction.
    pub suppress_transaction: bool,
}

impl SqlBatch {
    pub fn new(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            suppress_transaction: false,
        }
    }
}

/// Accumulates statements and cuts them into batches.
#[derive(Debug, Clone)]
pub struct SqlBatchBuilder {
    separator: String,
    statements: Vec<String>,
    batches: Vec<SqlBatch>,
}

impl Default for SqlBatchBuilder {
    fn default() -> Self {
        Self::new(";")
    }
}

impl SqlBatchBuilder {
    pub fn new(separator: impl Into<String>) -> Self {
        Self {
            separator: separator.into(),
            statements: Vec::new(),
            batches: Vec::new(),
        }
    }

    /// Adds a statement to the current batch.
    pub fn append(&mut self, statement: impl Into<String>) -> &mut Self {
        self.statements.push(statement.into());
        self
    }

    /// Closes the current batch. Does nothing when it is empty.
    pub fn end_batch(&mut self) -> &mut Self {
        if let Some(batch) = self.take_current(false) {
            self.batches.push(batch);
        }
        self
    }

    /// Adds a statement as a batch of its own, to be run without a transaction.
    pub fn append_suppressed(&mut self, statement: impl Into<String>) -> &mut Self {
        self.end_batch();
        self.statements.push(statement.into());
        if let Some(batch) = self.take_current(true) {
            self.batches.push(batch);
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty() && self.batches.is_empty()
    }

    pub fn finish(mut self) -> Vec<SqlBatch> {
        self.end_batch();
        self.batches
    }

    fn take_current(&mut self, suppress_transaction: bool) -> Option<SqlBatch> {
        if self.statements.is_empty() {
            return None;
        }
        let sql = self
            .statements
            .drain(..)
            .map(|statement| format!("{}{}", statement, self.separator))
            .collect::<Vec<_>>()
            .join("\n");
        Some(SqlBatch {
            sql,
            suppress_transaction,
        })
    }
}
