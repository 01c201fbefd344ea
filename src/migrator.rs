use tracing::{debug, info, warn};

use crate::backend::{SqlBatch, SqlBatchBuilder, SqlGenerator};
use crate::config::MigratorConfig;
use crate::connection::{AsyncConnection, Connection};
use crate::differ::ModelDiffer;
use crate::error::{MigrateResult, MigrationError};
use crate::history::HistoryRepository;
use crate::migration::{Migration, MigrationsAssembly};
use crate::model::Model;
use crate::operation::MigrationOperation;

/// Target that reverts every migration and drops the history table.
pub const INITIAL_DATABASE: &str = "0";

/// What reaching a target takes: migrations to apply in ascending ID order
/// and migrations to revert in descending ID order.
#[derive(Debug)]
pub struct MigrationPlan<'a> {
    pub to_apply: Vec<&'a Migration>,
    pub to_revert: Vec<&'a Migration>,
}

impl MigrationPlan<'_> {
    pub fn is_empty(&self) -> bool {
        self.to_apply.is_empty() && self.to_revert.is_empty()
    }
}

pub struct Migrator<'a> {
    assembly: &'a MigrationsAssembly,
    generator: &'a dyn SqlGenerator,
    config: MigratorConfig,
}

impl<'a> Migrator<'a> {
    pub fn new(assembly: &'a MigrationsAssembly, generator: &'a dyn SqlGenerator) -> Self {
        Self::with_config(assembly, generator, MigratorConfig::default())
    }

    pub fn with_config(
        assembly: &'a MigrationsAssembly,
        generator: &'a dyn SqlGenerator,
        config: MigratorConfig,
    ) -> Self {
        Self {
            assembly,
            generator,
            config,
        }
    }

    pub fn config(&self) -> &MigratorConfig {
        &self.config
    }

    pub fn history(&self) -> HistoryRepository<'a> {
        HistoryRepository::new(self.generator, &self.config)
    }

    pub fn get_local_migrations(&self) -> Vec<&'a str> {
        self.assembly.all().map(Migration::id).collect()
    }

    pub fn get_database_migrations<C: Connection>(&self, conn: &mut C) -> MigrateResult<Vec<String>> {
        Ok(self
            .history()
            .get_applied_migrations(conn)?
            .into_iter()
            .map(|row| row.migration_id)
            .collect())
    }

    /// Local migrations missing from the history table. IDs compare case-insensitively.
    pub fn get_unapplied_migrations<C: Connection>(&self, conn: &mut C) -> MigrateResult<Vec<&'a str>> {
        let applied = self.get_database_migrations(conn)?;
        Ok(self.unapplied(&applied))
    }

    pub async fn get_database_migrations_async<C: AsyncConnection>(
        &self,
        conn: &mut C,
    ) -> MigrateResult<Vec<String>> {
        Ok(self
            .history()
            .get_applied_migrations_async(conn)
            .await?
            .into_iter()
            .map(|row| row.migration_id)
            .collect())
    }

    pub async fn get_unapplied_migrations_async<C: AsyncConnection>(
        &self,
        conn: &mut C,
    ) -> MigrateResult<Vec<&'a str>> {
        let applied = self.get_database_migrations_async(conn).await?;
        Ok(self.unapplied(&applied))
    }

    fn unapplied(&self, applied: &[String]) -> Vec<&'a str> {
        self.assembly
            .all()
            .map(Migration::id)
            .filter(|id| !contains_id(applied, id))
            .collect()
    }

    /// Partitions the local migrations relative to `target`. `None` targets
    /// the newest migration; [`INITIAL_DATABASE`] reverts everything.
    pub fn plan(&self, applied: &[String], target: Option<&str>) -> MigrateResult<MigrationPlan<'a>> {
        for id in applied {
            if self.assembly.find_migration_id(id).is_none() {
                return Err(MigrationError::LocalMigrationNotFound(id.clone()));
            }
        }

        let target_id = match target {
            None => None,
            Some(INITIAL_DATABASE) => Some(""),
            Some(name) => Some(
                self.assembly
                    .find_migration_id(name)
                    .ok_or_else(|| MigrationError::TargetMigrationNotFound(name.to_string()))?,
            ),
        };
        let within = |id: &str| target_id.map_or(true, |target| id <= target);

        let to_apply = self
            .assembly
            .all()
            .filter(|m| !contains_id(applied, m.id()) && within(m.id()))
            .collect();
        let to_revert = self
            .assembly
            .all()
            .rev()
            .filter(|m| contains_id(applied, m.id()) && !within(m.id()))
            .collect();

        Ok(MigrationPlan {
            to_apply,
            to_revert,
        })
    }

    /// Brings the database to `target`. Returns the IDs applied or reverted,
    /// in execution order.
    ///
    /// Every migration commits on its own, so a failure leaves the earlier
    /// ones applied and recorded.
    pub fn apply_migrations<C: Connection>(
        &self,
        conn: &mut C,
        target: Option<&str>,
    ) -> MigrateResult<Vec<String>> {
        if !conn.database_exists().map_err(MigrationError::store)? {
            // A new database has no history; the target must resolve before anything runs.
            self.plan(&[], target)?;
            info!("Creating database");
            conn.create_database().map_err(MigrationError::store)?;
        }

        let history = self.history();
        let history_exists = history.exists(conn)?;
        let applied = self.get_database_migrations(conn)?;
        let plan = self.plan(&applied, target)?;
        let mut completed = Vec::new();

        if !history_exists && !plan.to_apply.is_empty() {
            info!("Creating history table {}", history.table());
            let script = SqlBatch::new(history.create_script()?);
            self.run_batches(conn, &history.table().to_string(), &[script], &completed)?;
        }

        for migration in &plan.to_revert {
            info!("Reverting migration {}", migration.id());
            let batches = self.revert_batches(migration, &history)?;
            self.run_batches(conn, migration.id(), &batches, &completed)?;
            completed.push(migration.id().to_string());
        }

        for migration in &plan.to_apply {
            info!("Applying migration {}", migration.id());
            let batches = self.apply_batches(migration, &history)?;
            self.run_batches(conn, migration.id(), &batches, &completed)?;
            completed.push(migration.id().to_string());
        }

        if target == Some(INITIAL_DATABASE) && history.exists(conn)? {
            info!("Dropping history table {}", history.table());
            let batches = self.generate(&[history.drop_operation()])?;
            self.run_batches(conn, &history.table().to_string(), &batches, &completed)?;
        }

        if completed.is_empty() {
            info!("No migrations were applied. The database is already up to date");
        }
        Ok(completed)
    }

    /// The batches that would bring an empty database to `target`, history
    /// table creation included. Nothing is executed.
    pub fn script_migrations(&self, target: Option<&str>) -> MigrateResult<Vec<SqlBatch>> {
        let plan = self.plan(&[], target)?;
        self.script(&plan, false)
    }

    /// The batches that would bring the connected database from its recorded
    /// history to `target`: reverts newest first, then missing migrations.
    /// Only the history table is read.
    pub fn script_pending_migrations<C: Connection>(
        &self,
        conn: &mut C,
        target: Option<&str>,
    ) -> MigrateResult<Vec<SqlBatch>> {
        let history_exists = self.history().exists(conn)?;
        let applied = self.get_database_migrations(conn)?;
        let plan = self.plan(&applied, target)?;
        self.script(&plan, history_exists)
    }

    fn script(
        &self,
        plan: &MigrationPlan<'_>,
        history_exists: bool,
    ) -> MigrateResult<Vec<SqlBatch>> {
        let history = self.history();
        let mut batches = Vec::new();
        if !history_exists && !plan.to_apply.is_empty() {
            batches.push(SqlBatch::new(history.create_script()?));
        }
        for migration in &plan.to_revert {
            batches.extend(self.revert_batches(migration, &history)?);
        }
        for migration in &plan.to_apply {
            batches.extend(self.apply_batches(migration, &history)?);
        }
        Ok(batches)
    }

    /// Whether `model` differs from the last recorded model snapshot.
    pub fn has_pending_model_changes(&self, differ: &ModelDiffer<'_>, model: &Model) -> bool {
        let empty = Model::new();
        let snapshot = self.assembly.snapshot().unwrap_or(&empty);
        differ.has_differences(snapshot, model)
    }

    fn apply_batches(
        &self,
        migration: &Migration,
        history: &HistoryRepository<'_>,
    ) -> MigrateResult<Vec<SqlBatch>> {
        let mut operations = migration.up_operations().to_vec();
        operations.push(history.insert_operation(migration.id()).into());
        self.generate(&operations)
    }

    fn revert_batches(
        &self,
        migration: &Migration,
        history: &HistoryRepository<'_>,
    ) -> MigrateResult<Vec<SqlBatch>> {
        let mut operations = migration
            .down_operations()
            .ok_or_else(|| MigrationError::NotReversible(migration.id().to_string()))?;
        operations.push(history.delete_operation(migration.id()).into());
        self.generate(&operations)
    }

    fn generate(&self, operations: &[MigrationOperation]) -> MigrateResult<Vec<SqlBatch>> {
        let mut builder = SqlBatchBuilder::new(self.config.statement_separator.clone());
        self.generator.generate_into(operations, &mut builder)?;
        Ok(builder.finish())
    }

    /// Runs one migration's batches inside a transaction when the dialect
    /// supports transactional DDL. Suppressed batches run outside of it.
    fn run_batches<C: Connection>(
        &self,
        conn: &mut C,
        migration: &str,
        batches: &[SqlBatch],
        completed: &[String],
    ) -> MigrateResult<()> {
        let transactional = self.generator.supports_transactional_ddl();
        let fail = |error: C::Error| {
            MigrationError::execution_failed(migration, completed.to_vec(), error)
        };
        let mut in_transaction = false;

        for batch in batches {
            if batch.suppress_transaction {
                if in_transaction {
                    in_transaction = false;
                    if let Err(error) = conn.commit() {
                        rollback(conn, migration);
                        return Err(fail(error));
                    }
                }
            } else if transactional && !in_transaction {
                conn.begin_transaction().map_err(fail)?;
                in_transaction = true;
            }

            debug!("Executing batch for {}:\n{}", migration, batch.sql);
            if let Err(error) = conn.execute_batch(&batch.sql) {
                if in_transaction {
                    rollback(conn, migration);
                }
                return Err(fail(error));
            }
        }

        if in_transaction {
            if let Err(error) = conn.commit() {
                rollback(conn, migration);
                return Err(fail(error));
            }
        }
        Ok(())
    }
}

/// Best effort; the original error is the one reported.
fn rollback<C: Connection>(conn: &mut C, migration: &str) {
    if let Err(error) = conn.rollback() {
        warn!("Rollback of {} failed: {}", migration, error);
    }
}

fn contains_id(ids: &[String], id: &str) -> bool {
    ids.iter().any(|applied| applied.eq_ignore_ascii_case(id))
}
