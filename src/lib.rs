pub mod backend;
pub mod config;
pub mod connection;
pub mod differ;
pub mod error;
pub mod factory;
pub mod history;
pub mod migration;
pub mod migrator;
pub mod model;
pub mod naming;
pub mod operation;
pub mod types;

pub mod prelude {
    pub use crate::backend::{MySql, Postgres, SqlBatch, SqlBatchBuilder, SqlGenerator, Sqlite};
    pub use crate::config::MigratorConfig;
    pub use crate::connection::{AsyncConnection, Connection};
    pub use crate::differ::ModelDiffer;
    pub use crate::error::{GenerateError, MigrateResult, MigrationError, ModelError};
    pub use crate::factory::MigrationOperationFactory;
    pub use crate::history::{HistoryRepository, HistoryRow};
    pub use crate::migration::{Migration, MigrationsAssembly};
    pub use crate::migrator::{MigrationPlan, Migrator, INITIAL_DATABASE};
    pub use crate::model::{
        EntityType, ForeignKey, Index, Key, Model, Property, Sequence, Value, ValueType,
    };
    pub use crate::naming::{ConventionNames, NameResolver, QualifiedName};
    pub use crate::operation::*;
    pub use crate::types::{AnsiTypeMapper, TypeMapper};

    #[cfg(feature = "sqlite")]
    pub use crate::connection::SqliteConnection;

    #[cfg(feature = "postgres")]
    pub use crate::connection::PostgresConnection;

    #[cfg(feature = "mysql")]
    pub use crate::connection::MySqlConnection;
}
