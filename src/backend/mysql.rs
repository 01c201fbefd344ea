use sea_query::{
    Alias, ColumnDef, IndexCreateStatement, IndexDropStatement, MysqlQueryBuilder, Table,
    TableAlterStatement, TableCreateStatement, TableDropStatement, TableRenameStatement,
};

use crate::backend::{literal, SqlBatchBuilder, SqlGenerator};
use crate::error::GenerateResult;
use crate::naming::QualifiedName;
use crate::operation::{
    AlterColumn, Column, DropForeignKey, DropPrimaryKey, DropUniqueConstraint, EnsureSchema,
    MoveTable, RenameIndex, RenameTable,
};

/// MySQL schemas are databases. DDL commits implicitly, so migrations run
/// without transactions.
#[derive(Debug, Clone, Copy, Default)]
pub struct MySql;

impl SqlGenerator for MySql {
    fn name(&self) -> &'static str {
        "mysql"
    }

    fn supports_transactional_ddl(&self) -> bool {
        false
    }

    fn supports_schemas(&self) -> bool {
        true
    }

    fn supports_sequences(&self) -> bool {
        false
    }

    fn build_table_create(&self, stmt: TableCreateStatement) -> String {
        stmt.to_string(MysqlQueryBuilder)
    }

    fn build_table_drop(&self, stmt: TableDropStatement) -> String {
        stmt.to_string(MysqlQueryBuilder)
    }

    fn build_table_rename(&self, stmt: TableRenameStatement) -> String {
        stmt.to_string(MysqlQueryBuilder)
    }

    fn build_table_alter(&self, stmt: TableAlterStatement) -> String {
        stmt.to_string(MysqlQueryBuilder)
    }

    fn build_index_create(&self, stmt: IndexCreateStatement) -> String {
        stmt.to_string(MysqlQueryBuilder)
    }

    fn build_index_drop(&self, stmt: IndexDropStatement) -> String {
        stmt.to_string(MysqlQueryBuilder)
    }

    fn table_exists_sql(&self, table: &QualifiedName) -> String {
        let schema = match &table.schema {
            Some(schema) => literal::string(schema),
            None => "DATABASE()".to_string(),
        };
        format!(
            "SELECT 1 FROM information_schema.tables WHERE table_schema = {} AND table_name = {}",
            schema,
            literal::string(&table.name)
        )
    }

    fn escape_identifier(&self, name: &str) -> String {
        name.replace('`', "``")
    }

    fn delimit_identifier(&self, name: &str) -> String {
        format!("`{}`", self.escape_identifier(name))
    }

    fn bool_literal(&self, value: bool) -> String {
        let digit = if value { "1" } else { "0" };
        digit.to_owned()
    }

    fn column_traits(&self, column: &Column, def: &mut ColumnDef) {
        let integer = matches!(column.data_type.as_str(), "smallint" | "integer" | "bigint");
        if column.generate_value_on_add && integer {
            def.auto_increment();
        }
    }

    /// RENAME TABLE takes a qualified target, or the table lands in the current database.
    fn rename_table(&self, op: &RenameTable, b: &mut SqlBatchBuilder) -> GenerateResult<()> {
        let stmt = Table::rename()
            .table(
                self.table_ref(&op.name),
                self.table_ref(&op.name.renamed(op.new_name.clone())),
            )
            .to_owned();
        b.append(self.build_table_rename(stmt));
        Ok(())
    }

    fn move_table(&self, op: &MoveTable, b: &mut SqlBatchBuilder) -> GenerateResult<()> {
        let target = QualifiedName::from_parts(op.new_schema.as_deref(), op.name.name.clone());
        let stmt = Table::rename()
            .table(self.table_ref(&op.name), self.table_ref(&target))
            .to_owned();
        b.append(self.build_table_rename(stmt));
        Ok(())
    }

    /// The whole column definition is restated.
    fn alter_column(&self, op: &AlterColumn, b: &mut SqlBatchBuilder) -> GenerateResult<()> {
        let stmt = Table::alter()
            .table(self.table_ref(&op.table))
            .modify_column(self.column_def(&op.new_column))
            .to_owned();
        b.append(self.build_table_alter(stmt));
        Ok(())
    }

    fn drop_primary_key(&self, op: &DropPrimaryKey, b: &mut SqlBatchBuilder) -> GenerateResult<()> {
        b.append(format!(
            "ALTER TABLE {} DROP PRIMARY KEY",
            self.delimit_name(&op.table)
        ));
        Ok(())
    }

    fn drop_unique_constraint(
        &self,
        op: &DropUniqueConstraint,
        b: &mut SqlBatchBuilder,
    ) -> GenerateResult<()> {
        b.append(format!(
            "ALTER TABLE {} DROP INDEX {}",
            self.delimit_name(&op.table),
            self.delimit_identifier(&op.name)
        ));
        Ok(())
    }

    fn drop_foreign_key(&self, op: &DropForeignKey, b: &mut SqlBatchBuilder) -> GenerateResult<()> {
        b.append(format!(
            "ALTER TABLE {} DROP FOREIGN KEY {}",
            self.delimit_name(&op.table),
            self.delimit_identifier(&op.name)
        ));
        Ok(())
    }

    fn rename_index(&self, op: &RenameIndex, b: &mut SqlBatchBuilder) -> GenerateResult<()> {
        b.append(format!(
            "ALTER TABLE {} RENAME INDEX {} TO {}",
            self.delimit_name(&op.table),
            self.delimit_identifier(&op.name),
            self.delimit_identifier(&op.new_name)
        ));
        Ok(())
    }

    fn ensure_schema(&self, op: &EnsureSchema, b: &mut SqlBatchBuilder) -> GenerateResult<()> {
        b.append(format!(
            "CREATE SCHEMA IF NOT EXISTS {}",
            self.delimit_identifier(&op.name)
        ));
        Ok(())
    }
}
