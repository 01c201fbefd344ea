use thiserror::Error;

/// Boxed driver error, passed through without modification.
pub type StoreError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result type alias for migration operations.
pub type MigrateResult<T> = Result<T, MigrationError>;

/// Result type alias for SQL generation.
pub type GenerateResult<T> = Result<T, GenerateError>;

/// Violations of the schema model invariants.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    #[error("entity '{0}' is defined more than once")]
    DuplicateEntity(String),

    #[error("sequence '{0}' is defined more than once")]
    DuplicateSequence(String),

    #[error("property '{property}' is defined more than once on '{entity}'")]
    DuplicateProperty { entity: String, property: String },

    #[error("'{entity}' references unknown property '{property}'")]
    UnknownProperty { entity: String, property: String },

    #[error("'{entity}' references unknown principal entity '{principal}'")]
    UnknownPrincipal { entity: String, principal: String },

    #[error("foreign key on '{entity}' has {dependent} dependent and {principal} principal properties")]
    ForeignKeyArity {
        entity: String,
        dependent: usize,
        principal: usize,
    },

    #[error("key or index on '{0}' has no properties")]
    EmptyKey(String),

    #[error("property '{property}' on '{entity}' has both a default value and a default SQL expression")]
    ConflictingDefaults { entity: String, property: String },

    #[error("property '{property}' on '{entity}' references unknown sequence '{sequence}'")]
    UnknownSequence {
        entity: String,
        property: String,
        sequence: String,
    },
}

/// SQL generation failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerateError {
    #[error("{dialect} does not support {operation}")]
    Unsupported {
        dialect: &'static str,
        operation: String,
    },
}

impl GenerateError {
    pub fn unsupported(dialect: &'static str, operation: impl Into<String>) -> Self {
        Self::Unsupported {
            dialect,
            operation: operation.into(),
        }
    }
}

/// Errors raised while planning, scripting or applying migrations.
#[derive(Debug, Error)]
pub enum MigrationError {
    #[error("target migration '{0}' was not found")]
    TargetMigrationNotFound(String),

    #[error("migration '{0}' is recorded in the database but was not found locally")]
    LocalMigrationNotFound(String),

    #[error("migration '{0}' cannot be reverted")]
    NotReversible(String),

    #[error("history table creation produced {0} batches, expected exactly one")]
    InvalidHistoryScript(usize),

    #[error("history row {index} has {columns} columns, expected 2")]
    MalformedHistoryRow { index: usize, columns: usize },

    #[error(transparent)]
    Generate(#[from] GenerateError),

    #[error(transparent)]
    Store(StoreError),

    #[error("migration '{migration}' failed after {} completed", .completed.len())]
    ExecutionFailed {
        migration: String,
        completed: Vec<String>,
        #[source]
        source: StoreError,
    },
}

impl MigrationError {
    pub fn store(error: impl Into<StoreError>) -> Self {
        Self::Store(error.into())
    }

    pub fn execution_failed(
        migration: impl Into<String>,
        completed: Vec<String>,
        error: impl Into<StoreError>,
    ) -> Self {
        Self::ExecutionFailed {
            migration: migration.into(),
            completed,
            source: error.into(),
        }
    }
}
