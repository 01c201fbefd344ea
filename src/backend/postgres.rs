use sea_query::{
    ColumnDef, IndexCreateStatement, IndexDropStatement, PostgresQueryBuilder,
    TableAlterStatement, TableCreateStatement, TableDropStatement, TableRenameStatement,
};

use crate::backend::{literal, SqlBatchBuilder, SqlGenerator};
use crate::error::GenerateResult;
use crate::naming::QualifiedName;
use crate::operation::{
    Column, EnsureSchema, MoveSequence, MoveTable, RenameIndex, RenameSequence,
};

const DEFAULT_SCHEMA: &str = "public";

#[derive(Debug, Clone, Copy, Default)]
pub struct Postgres;

impl Postgres {
    fn schema_or_default<'a>(&self, schema: &'a Option<String>) -> &'a str {
        schema.as_deref().unwrap_or(DEFAULT_SCHEMA)
    }
}

impl SqlGenerator for Postgres {
    fn name(&self) -> &'static str {
        "postgres"
    }

    fn supports_transactional_ddl(&self) -> bool {
        true
    }

    fn supports_schemas(&self) -> bool {
        true
    }

    fn supports_sequences(&self) -> bool {
        true
    }

    fn build_table_create(&self, stmt: TableCreateStatement) -> String {
        stmt.to_string(PostgresQueryBuilder)
    }

    fn build_table_drop(&self, stmt: TableDropStatement) -> String {
        stmt.to_string(PostgresQueryBuilder)
    }

    fn build_table_rename(&self, stmt: TableRenameStatement) -> String {
        stmt.to_string(PostgresQueryBuilder)
    }

    fn build_table_alter(&self, stmt: TableAlterStatement) -> String {
        stmt.to_string(PostgresQueryBuilder)
    }

    fn build_index_create(&self, stmt: IndexCreateStatement) -> String {
        stmt.to_string(PostgresQueryBuilder)
    }

    fn build_index_drop(&self, stmt: IndexDropStatement) -> String {
        stmt.to_string(PostgresQueryBuilder)
    }

    fn table_exists_sql(&self, table: &QualifiedName) -> String {
        let schema = match &table.schema {
            Some(schema) => literal::string(schema),
            None => "current_schema()".to_string(),
        };
        format!(
            "SELECT 1 FROM information_schema.tables WHERE table_schema = {} AND table_name = {}",
            schema,
            literal::string(&table.name)
        )
    }

    fn bytes_literal(&self, value: &[u8]) -> String {
        format!("'\\x{}'::bytea", literal::hex(value))
    }

    /// Integer columns generated on add become identity columns.
    fn column_traits(&self, column: &Column, def: &mut ColumnDef) {
        let integer = matches!(column.data_type.as_str(), "smallint" | "integer" | "bigint");
        if column.generate_value_on_add
            && integer
            && column.default_sql.is_none()
            && column.default_value.is_none()
        {
            def.extra("GENERATED BY DEFAULT AS IDENTITY");
        }
    }

    fn move_table(&self, op: &MoveTable, b: &mut SqlBatchBuilder) -> GenerateResult<()> {
        b.append(format!(
            "ALTER TABLE {} SET SCHEMA {}",
            self.delimit_name(&op.name),
            self.delimit_identifier(self.schema_or_default(&op.new_schema))
        ));
        Ok(())
    }

    /// Indexes live in their table's schema.
    fn rename_index(&self, op: &RenameIndex, b: &mut SqlBatchBuilder) -> GenerateResult<()> {
        let index = QualifiedName::from_parts(op.table.schema.as_deref(), op.name.clone());
        b.append(format!(
            "ALTER INDEX {} RENAME TO {}",
            self.delimit_name(&index),
            self.delimit_identifier(&op.new_name)
        ));
        Ok(())
    }

    fn rename_sequence(&self, op: &RenameSequence, b: &mut SqlBatchBuilder) -> GenerateResult<()> {
        b.append(format!(
            "ALTER SEQUENCE {} RENAME TO {}",
            self.delimit_name(&op.name),
            self.delimit_identifier(&op.new_name)
        ));
        Ok(())
    }

    fn move_sequence(&self, op: &MoveSequence, b: &mut SqlBatchBuilder) -> GenerateResult<()> {
        b.append(format!(
            "ALTER SEQUENCE {} SET SCHEMA {}",
            self.delimit_name(&op.name),
            self.delimit_identifier(self.schema_or_default(&op.new_schema))
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
