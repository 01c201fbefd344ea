use async_trait::async_trait;

#[cfg(feature = "sqlite")]
mod sqlite;

#[cfg(feature = "postgres")]
mod postgres;

#[cfg(feature = "mysql")]
mod mysql;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteConnection;

#[cfg(feature = "postgres")]
pub use self::postgres::PostgresConnection;

#[cfg(feature = "mysql")]
pub use self::mysql::MySqlConnection;

/// A synchronous connection to the target database.
///
/// Errors are handed to the caller unmodified, wrapped only in
/// [`MigrationError`](crate::error::MigrationError).
pub trait Connection {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Whether the database the connection points at exists.
    fn database_exists(&mut self) -> Result<bool, Self::Error> {
        Ok(true)
    }

    fn create_database(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    fn begin_transaction(&mut self) -> Result<(), Self::Error> {
        self.execute_batch("BEGIN")
    }

    fn commit(&mut self) -> Result<(), Self::Error> {
        self.execute_batch("COMMIT")
    }

    fn rollback(&mut self) -> Result<(), Self::Error> {
        self.execute_batch("ROLLBACK")
    }

    /// Runs one batch, possibly holding several statements.
    fn execute_batch(&mut self, sql: &str) -> Result<(), Self::Error>;

    /// Whether the query returns at least one row.
    fn query_exists(&mut self, sql: &str) -> Result<bool, Self::Error>;

    /// Every row of the query, each column read as text.
    fn query_rows(&mut self, sql: &str) -> Result<Vec<Vec<String>>, Self::Error>;
}

/// The read side of [`Connection`] for callers on an async runtime.
///
/// The bundled drivers are blocking, so there is no adapter for this trait;
/// implement it over the async client in use. Backs the `*_async` reads on
/// [`HistoryRepository`](crate::history::HistoryRepository) and
/// [`Migrator`](crate::migrator::Migrator).
#[async_trait]
pub trait AsyncConnection: Send {
    type Error: std::error::Error + Send + Sync + 'static;

    async fn query_exists(&mut self, sql: &str) -> Result<bool, Self::Error>;

    async fn query_rows(&mut self, sql: &str) -> Result<Vec<Vec<String>>, Self::Error>;
}
