use std::borrow::Cow;

use sea_query::{
    Alias, Index as SeaIndex, IndexCreateStatement, IndexDropStatement, SqliteQueryBuilder,
    TableAlterStatement, TableCreateStatement, TableDropStatement, TableRenameStatement,
};

use crate::backend::{literal, SqlBatchBuilder, SqlGenerator};
use crate::error::{GenerateError, GenerateResult};
use crate::naming::QualifiedName;
use crate::operation::{
    AddForeignKey, AddPrimaryKey, AddUniqueConstraint, AlterColumn, DropForeignKey,
    DropPrimaryKey, DropUniqueConstraint, MigrationOperation,
};

/// SQLite has no schemas or sequences and cannot alter columns or add
/// constraints to existing tables.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sqlite;

impl SqlGenerator for Sqlite {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    fn supports_transactional_ddl(&self) -> bool {
        true
    }

    fn supports_schemas(&self) -> bool {
        false
    }

    fn supports_sequences(&self) -> bool {
        false
    }

    fn build_table_create(&self, stmt: TableCreateStatement) -> String {
        stmt.to_string(SqliteQueryBuilder)
    }

    fn build_table_drop(&self, stmt: TableDropStatement) -> String {
        stmt.to_string(SqliteQueryBuilder)
    }

    fn build_table_rename(&self, stmt: TableRenameStatement) -> String {
        stmt.to_string(SqliteQueryBuilder)
    }

    fn build_table_alter(&self, stmt: TableAlterStatement) -> String {
        stmt.to_string(SqliteQueryBuilder)
    }

    fn build_index_create(&self, stmt: IndexCreateStatement) -> String {
        stmt.to_string(SqliteQueryBuilder)
    }

    fn build_index_drop(&self, stmt: IndexDropStatement) -> String {
        stmt.to_string(SqliteQueryBuilder)
    }

    fn table_exists_sql(&self, table: &QualifiedName) -> String {
        format!(
            "SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = {}",
            literal::string(&table.name)
        )
    }

    fn bool_literal(&self, value: bool) -> String {
        let digit = if value { "1" } else { "0" };
        digit.to_owned()
    }

    fn bytes_literal(&self, value: &[u8]) -> String {
        format!("X'{}'", literal::hex(value))
    }

    /// Foreign keys added to a table created in the same list move into its
    /// CREATE TABLE, the only place SQLite accepts them.
    fn prepare<'o>(&self, operations: &'o [MigrationOperation]) -> Cow<'o, [MigrationOperation]> {
        let created = |table: &QualifiedName| {
            operations.iter().any(|op| match op {
                MigrationOperation::CreateTable(create) => &create.name == table,
                _ => false,
            })
        };
        let folds = operations.iter().any(|op| match op {
            MigrationOperation::AddForeignKey(fk) => created(&fk.table),
            _ => false,
        });
        if !folds {
            return Cow::Borrowed(operations);
        }

        let mut prepared: Vec<MigrationOperation> = Vec::with_capacity(operations.len());
        for op in operations {
            match op {
                MigrationOperation::AddForeignKey(fk) if created(&fk.table) => {
                    let target = prepared.iter_mut().find_map(|prior| match prior {
                        MigrationOperation::CreateTable(create) if create.name == fk.table => {
                            Some(create)
                        }
                        _ => None,
                    });
                    match target {
                        Some(create) => create.foreign_keys.push(fk.clone()),
                        // The table is created later in the list; leave it for generation to reject.
                        None => prepared.push(op.clone()),
                    }
                }
                _ => prepared.push(op.clone()),
            }
        }
        Cow::Owned(prepared)
    }

    fn alter_column(&self, _op: &AlterColumn, _b: &mut SqlBatchBuilder) -> GenerateResult<()> {
        Err(GenerateError::unsupported(self.name(), "altering columns"))
    }

    fn add_primary_key(&self, _op: &AddPrimaryKey, _b: &mut SqlBatchBuilder) -> GenerateResult<()> {
        Err(GenerateError::unsupported(
            self.name(),
            "adding primary keys to existing tables",
        ))
    }

    fn drop_primary_key(
        &self,
        _op: &DropPrimaryKey,
        _b: &mut SqlBatchBuilder,
    ) -> GenerateResult<()> {
        Err(GenerateError::unsupported(self.name(), "dropping primary keys"))
    }

    /// Emulated with a unique index of the same name.
    fn add_unique_constraint(
        &self,
        op: &AddUniqueConstraint,
        b: &mut SqlBatchBuilder,
    ) -> GenerateResult<()> {
        let mut stmt = SeaIndex::create();
        stmt.name(&op.name).table(self.table_ref(&op.table)).unique();
        for column in &op.columns {
            stmt.col(Alias::new(column));
        }
        b.append(self.build_index_create(stmt));
        Ok(())
    }

    fn drop_unique_constraint(
        &self,
        op: &DropUniqueConstraint,
        b: &mut SqlBatchBuilder,
    ) -> GenerateResult<()> {
        let stmt = SeaIndex::drop()
            .name(op.name.as_str())
            .table(self.table_ref(&op.table))
            .to_owned();
        b.append(self.build_index_drop(stmt));
        Ok(())
    }

    fn add_foreign_key(&self, _op: &AddForeignKey, _b: &mut SqlBatchBuilder) -> GenerateResult<()> {
        Err(GenerateError::unsupported(
            self.name(),
            "adding foreign keys to existing tables",
        ))
    }

    fn drop_foreign_key(
        &self,
        _op: &DropForeignKey,
        _b: &mut SqlBatchBuilder,
    ) -> GenerateResult<()> {
        Err(GenerateError::unsupported(self.name(), "dropping foreign keys"))
    }
}
