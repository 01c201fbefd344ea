use crate::backend::{literal, SqlBatchBuilder, SqlGenerator};
use crate::config::MigratorConfig;
use crate::connection::{AsyncConnection, Connection};
use crate::differ::ModelDiffer;
use crate::error::{MigrateResult, MigrationError};
use crate::model::{EntityType, Model, Property, ValueType};
use crate::naming::{ConventionNames, QualifiedName};
use crate::operation::{DropTable, EnsureSchema, MigrationOperation, SqlOperation};
use crate::types::AnsiTypeMapper;

const MIGRATION_ID_COLUMN: &str = "MigrationId";
const PRODUCT_VERSION_COLUMN: &str = "ProductVersion";

/// One applied migration as recorded in the history table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryRow {
    pub migration_id: String,
    pub product_version: String,
}

pub struct HistoryRepository<'a> {
    generator: &'a dyn SqlGenerator,
    table: QualifiedName,
    product_version: String,
    separator: String,
}

impl<'a> HistoryRepository<'a> {
    pub fn new(generator: &'a dyn SqlGenerator, config: &MigratorConfig) -> Self {
        Self {
            generator,
            table: QualifiedName::from_parts(
                config.history_schema.as_deref(),
                config.history_table.clone(),
            ),
            product_version: config.product_version.clone(),
            separator: config.statement_separator.clone(),
        }
    }

    pub fn table(&self) -> &QualifiedName {
        &self.table
    }

    /// The history table as a model, so its DDL comes from the differ like
    /// any other table.
    pub fn model(&self) -> Model {
        let mut row = EntityType::new("HistoryRow")
            .table(self.table.name.clone())
            .property(
                Property::new(MIGRATION_ID_COLUMN, ValueType::String)
                    .max_length(150)
                    .not_null(),
            )
            .property(
                Property::new(PRODUCT_VERSION_COLUMN, ValueType::String)
                    .max_length(32)
                    .not_null(),
            )
            .primary_key([MIGRATION_ID_COLUMN]);
        if let Some(schema) = &self.table.schema {
            row = row.schema(schema.clone());
        }
        Model::new().entity(row)
    }

    pub fn exists_sql(&self) -> String {
        self.generator.table_exists_sql(&self.table)
    }

    pub fn applied_migrations_sql(&self) -> String {
        format!(
            "SELECT {}, {} FROM {} ORDER BY {}",
            self.generator.delimit_identifier(MIGRATION_ID_COLUMN),
            self.generator.delimit_identifier(PRODUCT_VERSION_COLUMN),
            self.generator.delimit_name(&self.table),
            self.generator.delimit_identifier(MIGRATION_ID_COLUMN),
        )
    }

    pub fn exists<C: Connection>(&self, conn: &mut C) -> MigrateResult<bool> {
        conn.query_exists(&self.exists_sql())
            .map_err(MigrationError::store)
    }

    /// Applied migrations ordered by ID. Empty when the table has never been created.
    pub fn get_applied_migrations<C: Connection>(
        &self,
        conn: &mut C,
    ) -> MigrateResult<Vec<HistoryRow>> {
        if !self.exists(conn)? {
            return Ok(Vec::new());
        }
        let rows = conn
            .query_rows(&self.applied_migrations_sql())
            .map_err(MigrationError::store)?;
        history_rows(rows)
    }

    pub async fn exists_async<C: AsyncConnection>(&self, conn: &mut C) -> MigrateResult<bool> {
        conn.query_exists(&self.exists_sql())
            .await
            .map_err(MigrationError::store)
    }

    pub async fn get_applied_migrations_async<C: AsyncConnection>(
        &self,
        conn: &mut C,
    ) -> MigrateResult<Vec<HistoryRow>> {
        if !self.exists_async(conn).await? {
            return Ok(Vec::new());
        }
        let rows = conn
            .query_rows(&self.applied_migrations_sql())
            .await
            .map_err(MigrationError::store)?;
        history_rows(rows)
    }

    /// The CREATE TABLE script. It must come out as exactly one batch.
    pub fn create_script(&self) -> MigrateResult<String> {
        let differ = ModelDiffer::new(&ConventionNames, &AnsiTypeMapper);
        let mut operations = Vec::new();
        if let Some(schema) = &self.table.schema {
            operations.push(EnsureSchema::new(schema.clone()).into());
        }
        operations.extend(differ.create_schema(&self.model()));

        let mut builder = SqlBatchBuilder::new(self.separator.clone());
        self.generator.generate_into(&operations, &mut builder)?;
        let mut batches = builder.finish();
        if batches.len() != 1 {
            return Err(MigrationError::InvalidHistoryScript(batches.len()));
        }
        Ok(batches.remove(0).sql)
    }

    pub fn insert_operation(&self, migration_id: &str) -> SqlOperation {
        let sql = format!(
            "INSERT INTO {} ({}, {}) VALUES ({}, {})",
            self.generator.delimit_name(&self.table),
            self.generator.delimit_identifier(MIGRATION_ID_COLUMN),
            self.generator.delimit_identifier(PRODUCT_VERSION_COLUMN),
            literal::string(migration_id),
            literal::string(&self.product_version),
        );
        SqlOperation::new(sql).with_description(format!("Record migration {}", migration_id))
    }

    pub fn delete_operation(&self, migration_id: &str) -> SqlOperation {
        let sql = format!(
            "DELETE FROM {} WHERE {} = {}",
            self.generator.delimit_name(&self.table),
            self.generator.delimit_identifier(MIGRATION_ID_COLUMN),
            literal::string(migration_id),
        );
        SqlOperation::new(sql).with_description(format!("Forget migration {}", migration_id))
    }

    pub fn drop_operation(&self) -> MigrationOperation {
        DropTable::new(self.table.clone()).into()
    }
}

fn history_rows(rows: Vec<Vec<String>>) -> MigrateResult<Vec<HistoryRow>> {
    rows.into_iter()
        .enumerate()
        .map(|(index, row)| {
            let columns = row.len();
            match <[String; 2]>::try_from(row) {
                Ok([migration_id, product_version]) => Ok(HistoryRow {
                    migration_id,
                    product_version,
                }),
                Err(_) => Err(MigrationError::MalformedHistoryRow { index, columns }),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{MySql, Postgres, Sqlite};
    use crate::connection::testing::ScriptedConnection;

    fn config() -> MigratorConfig {
        MigratorConfig::new().product_version("1.2.3")
    }

    #[test]
    fn create_script_is_one_statement() {
        let config = config();
        let history = HistoryRepository::new(&Sqlite, &config);
        let script = history.create_script().unwrap();

        assert!(script.contains("CREATE TABLE \"__EFMigrationsHistory\""));
        assert!(script.contains("\"MigrationId\" varchar(150) NOT NULL"));
        assert!(script.contains("\"ProductVersion\" varchar(32) NOT NULL"));
        assert!(script.contains("PRIMARY KEY"));
        assert!(script.ends_with(';'));
    }

    #[test]
    fn create_script_in_custom_schema() {
        let config = config().history_table("migrations").history_schema("ops");
        let history = HistoryRepository::new(&Postgres, &config);
        let script = history.create_script().unwrap();

        assert!(script.starts_with("CREATE SCHEMA IF NOT EXISTS \"ops\";"));
        assert!(script.contains("CREATE TABLE \"ops\".\"migrations\""));
    }

    #[test]
    fn create_script_uses_configured_separator() {
        let config = config().statement_separator("\nGO");
        let history = HistoryRepository::new(&Sqlite, &config);
        assert!(history.create_script().unwrap().ends_with("\nGO"));
    }

    #[test]
    fn row_statements() {
        let config = config();
        let history = HistoryRepository::new(&Sqlite, &config);

        assert_eq!(
            history.insert_operation("20240101_Initial").sql,
            "INSERT INTO \"__EFMigrationsHistory\" (\"MigrationId\", \"ProductVersion\") \
             VALUES ('20240101_Initial', '1.2.3')"
        );
        assert_eq!(
            history.delete_operation("it's").sql,
            "DELETE FROM \"__EFMigrationsHistory\" WHERE \"MigrationId\" = 'it''s'"
        );
        assert_eq!(
            history.drop_operation(),
            MigrationOperation::from(DropTable::new("__EFMigrationsHistory"))
        );
    }

    #[test]
    fn select_is_ordered_by_id() {
        let config = config();
        let history = HistoryRepository::new(&MySql, &config);
        assert_eq!(
            history.applied_migrations_sql(),
            "SELECT `MigrationId`, `ProductVersion` FROM `__EFMigrationsHistory` \
             ORDER BY `MigrationId`"
        );
    }

    #[test]
    fn missing_table_means_nothing_applied() {
        let config = config();
        let history = HistoryRepository::new(&Sqlite, &config);
        let mut conn = ScriptedConnection::new();

        assert!(!history.exists(&mut conn).unwrap());
        assert!(history.get_applied_migrations(&mut conn).unwrap().is_empty());
        // Only the existence probe ran.
        assert_eq!(conn.queries.len(), 2);
        assert!(conn.queries.iter().all(|q| q.contains("sqlite_master")));
    }

    #[test]
    fn reads_applied_rows() {
        let config = config();
        let history = HistoryRepository::new(&Sqlite, &config);
        let mut conn = ScriptedConnection::new().with_history(["001_Initial", "002_Posts"]);

        let rows = history.get_applied_migrations(&mut conn).unwrap();
        assert_eq!(
            rows,
            vec![
                HistoryRow {
                    migration_id: "001_Initial".to_string(),
                    product_version: "0.1.0".to_string(),
                },
                HistoryRow {
                    migration_id: "002_Posts".to_string(),
                    product_version: "0.1.0".to_string(),
                },
            ]
        );
    }

    #[test]
    fn malformed_rows_are_reported() {
        let config = config();
        let history = HistoryRepository::new(&Sqlite, &config);
        let mut conn = ScriptedConnection::new().with_history(["001_Initial"]);
        conn.rows.push(vec!["002_Posts".to_string()]);

        let err = history.get_applied_migrations(&mut conn).unwrap_err();
        assert!(matches!(
            err,
            MigrationError::MalformedHistoryRow {
                index: 1,
                columns: 1
            }
        ));
    }

    #[tokio::test]
    async fn async_reads_match_sync() {
        let config = config();
        let history = HistoryRepository::new(&Sqlite, &config);

        let mut empty = ScriptedConnection::new();
        assert!(!history.exists_async(&mut empty).await.unwrap());
        assert!(history
            .get_applied_migrations_async(&mut empty)
            .await
            .unwrap()
            .is_empty());

        let mut conn = ScriptedConnection::new().with_history(["001_Initial"]);
        let rows = history.get_applied_migrations_async(&mut conn).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].migration_id, "001_Initial");
    }
}
