mod batch;
pub mod literal;
mod mysql;
mod postgres;
mod sqlite;

pub use batch::{SqlBatch, SqlBatchBuilder};
pub use mysql::MySql;
pub use postgres::Postgres;
pub use sqlite::Sqlite;

use std::borrow::Cow;

use sea_query::{
    Alias, ColumnDef, Expr, ForeignKey as SeaForeignKey, ForeignKeyAction, Index as SeaIndex,
    IndexCreateStatement, IndexDropStatement, IntoTableRef, Table, TableAlterStatement,
    TableCreateStatement, TableDropStatement, TableRef, TableRenameStatement,
};

use crate::error::{GenerateError, GenerateResult};
use crate::model::Value;
use crate::naming::QualifiedName;
use crate::operation::{
    AddColumn, AddForeignKey, AddPrimaryKey, AddUniqueConstraint, AlterColumn, AlterSequence,
    Column, CopyData, CreateIndex, CreateSequence, CreateTable, DropColumn, DropForeignKey,
    DropIndex, DropPrimaryKey, DropSchema, DropSequence, DropTable, DropUniqueConstraint,
    EnsureSchema, MigrationOperation, MoveSequence, MoveTable, RenameColumn, RenameIndex,
    RenameSequence, RenameTable, RestartSequence, SqlOperation,
};

/// Renders migration operations as SQL for one database dialect.
///
/// Every operation has an ANSI default. Table and index DDL goes through
/// sea-query statements rendered by the dialect's query builder; constraint,
/// sequence and schema statements are written by hand. Dialects override the
/// operations they express differently and return [`GenerateError::Unsupported`]
/// for the ones they cannot express at all.
pub trait SqlGenerator: Send + Sync {
    fn name(&self) -> &'static str;
    fn supports_transactional_ddl(&self) -> bool;
    fn supports_schemas(&self) -> bool;
    fn supports_sequences(&self) -> bool;

    fn build_table_create(&self, stmt: TableCreateStatement) -> String;
    fn build_table_drop(&self, stmt: TableDropStatement) -> String;
    fn build_table_rename(&self, stmt: TableRenameStatement) -> String;
    fn build_table_alter(&self, stmt: TableAlterStatement) -> String;
    fn build_index_create(&self, stmt: IndexCreateStatement) -> String;
    fn build_index_drop(&self, stmt: IndexDropStatement) -> String;

    /// Query returning a row when the table exists and none otherwise.
    fn table_exists_sql(&self, table: &QualifiedName) -> String;

    fn escape_identifier(&self, name: &str) -> String {
        name.replace('"', "\"\"")
    }

    fn delimit_identifier(&self, name: &str) -> String {
        format!("\"{}\"", self.escape_identifier(name))
    }

    /// Schema-qualified when the dialect has schemas.
    fn delimit_name(&self, name: &QualifiedName) -> String {
        match (&name.schema, self.supports_schemas()) {
            (Some(schema), true) => format!(
                "{}.{}",
                self.delimit_identifier(schema),
                self.delimit_identifier(&name.name)
            ),
            _ => self.delimit_identifier(&name.name),
        }
    }

    fn delimit_columns(&self, columns: &[String]) -> String {
        columns
            .iter()
            .map(|c| self.delimit_identifier(c))
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn table_ref(&self, name: &QualifiedName) -> TableRef {
        match (&name.schema, self.supports_schemas()) {
            (Some(schema), true) => {
                (Alias::new(schema), Alias::new(&name.name)).into_table_ref()
            }
            _ => Alias::new(&name.name).into_table_ref(),
        }
    }

    fn bool_literal(&self, value: bool) -> String {
        let keyword = if value { "TRUE" } else { "FALSE" };
        keyword.to_string()
    }

    fn bytes_literal(&self, value: &[u8]) -> String {
        format!("0x{}", literal::hex(value))
    }

    fn literal(&self, value: &Value) -> String {
        match value {
            Value::Null => "NULL".to_string(),
            Value::Bool(b) => self.bool_literal(*b),
            Value::Int(i) => i.to_string(),
            Value::Float(f) => literal::float(*f),
            Value::Decimal(d) => d.clone(),
            Value::String(s) => literal::string(s),
            Value::Bytes(b) => self.bytes_literal(b),
            Value::Date(d) => literal::string(&d.format(literal::DATE_FORMAT).to_string()),
            Value::Time(t) => literal::string(&t.format(literal::TIME_FORMAT).to_string()),
            Value::DateTime(dt) => {
                literal::string(&dt.format(literal::DATE_TIME_FORMAT).to_string())
            }
            Value::DateTimeOffset(dt) => {
                literal::string(&dt.format(literal::DATE_TIME_OFFSET_FORMAT).to_string())
            }
            Value::Uuid(u) => literal::string(&u.hyphenated().to_string()),
        }
    }

    /// Raw default SQL wins over a default value.
    fn column_default(&self, column: &Column) -> Option<String> {
        column
            .default_sql
            .clone()
            .or_else(|| column.default_value.as_ref().map(|v| self.literal(v)))
    }

    fn column_def(&self, column: &Column) -> ColumnDef {
        let mut def = ColumnDef::new(Alias::new(&column.name));
        def.custom(Alias::new(&column.data_type));
        if !column.nullable {
            def.not_null();
        }
        if let Some(default) = self.column_default(column) {
            def.default(Expr::cust(default));
        }
        self.computed_column(column, &mut def);
        self.column_traits(column, &mut def);
        def
    }

    /// Hook for identity and other per-column clauses.
    fn column_traits(&self, _column: &Column, _def: &mut ColumnDef) {}

    fn computed_column(&self, _column: &Column, _def: &mut ColumnDef) {}

    fn primary_key_traits(&self, _key: &AddPrimaryKey, _index: &mut IndexCreateStatement) {}

    fn table_traits(&self, _op: &CreateTable, _stmt: &mut TableCreateStatement) {}

    /// Rewrites the operation list before rendering.
    fn prepare<'o>(&self, operations: &'o [MigrationOperation]) -> Cow<'o, [MigrationOperation]> {
        Cow::Borrowed(operations)
    }

    fn generate(&self, operations: &[MigrationOperation]) -> GenerateResult<Vec<SqlBatch>> {
        let mut builder = SqlBatchBuilder::default();
        self.generate_into(operations, &mut builder)?;
        Ok(builder.finish())
    }

    /// Appends every operation in order, then closes the current batch.
    fn generate_into(
        &self,
        operations: &[MigrationOperation],
        builder: &mut SqlBatchBuilder,
    ) -> GenerateResult<()> {
        let operations = self.prepare(operations);
        for operation in operations.iter() {
            self.operation(operation, builder)?;
        }
        builder.end_batch();
        Ok(())
    }

    fn operation(
        &self,
        operation: &MigrationOperation,
        b: &mut SqlBatchBuilder,
    ) -> GenerateResult<()> {
        use MigrationOperation as Op;

        match operation {
            Op::CreateTable(op) => self.create_table(op, b),
            Op::DropTable(op) => self.drop_table(op, b),
            Op::RenameTable(op) => self.rename_table(op, b),
            Op::MoveTable(op) => self.move_table(op, b),
            Op::AddColumn(op) => self.add_column(op, b),
            Op::DropColumn(op) => self.drop_column(op, b),
            Op::AlterColumn(op) => self.alter_column(op, b),
            Op::RenameColumn(op) => self.rename_column(op, b),
            Op::AddPrimaryKey(op) => self.add_primary_key(op, b),
            Op::DropPrimaryKey(op) => self.drop_primary_key(op, b),
            Op::AddUniqueConstraint(op) => self.add_unique_constraint(op, b),
            Op::DropUniqueConstraint(op) => self.drop_unique_constraint(op, b),
            Op::AddForeignKey(op) => self.add_foreign_key(op, b),
            Op::DropForeignKey(op) => self.drop_foreign_key(op, b),
            Op::CreateIndex(op) => self.create_index(op, b),
            Op::DropIndex(op) => self.drop_index(op, b),
            Op::RenameIndex(op) => self.rename_index(op, b),
            Op::CreateSequence(op) => self.create_sequence(op, b),
            Op::DropSequence(op) => self.drop_sequence(op, b),
            Op::RenameSequence(op) => self.rename_sequence(op, b),
            Op::MoveSequence(op) => self.move_sequence(op, b),
            Op::AlterSequence(op) => self.alter_sequence(op, b),
            Op::RestartSequence(op) => self.restart_sequence(op, b),
            Op::EnsureSchema(op) => self.ensure_schema(op, b),
            Op::DropSchema(op) => self.drop_schema(op, b),
            Op::CopyData(op) => self.copy_data(op, b),
            Op::Sql(op) => self.sql(op, b),
        }
    }

    fn create_table(&self, op: &CreateTable, b: &mut SqlBatchBuilder) -> GenerateResult<()> {
        let mut stmt = Table::create();
        stmt.table(self.table_ref(&op.name));

        for column in &op.columns {
            stmt.col(self.column_def(column));
        }

        if let Some(key) = &op.primary_key {
            let mut index = SeaIndex::create();
            index.name(&key.name);
            for column in &key.columns {
                index.col(Alias::new(column));
            }
            self.primary_key_traits(key, &mut index);
            stmt.primary_key(&mut index);
        }

        for unique in &op.unique_constraints {
            let mut index = SeaIndex::create();
            index.name(&unique.name).unique();
            for column in &unique.columns {
                index.col(Alias::new(column));
            }
            stmt.index(&mut index);
        }

        for fk in &op.foreign_keys {
            stmt.foreign_key(&mut self.foreign_key_def(fk));
        }

        self.table_traits(op, &mut stmt);
        b.append(self.build_table_create(stmt));

        for index in &op.indexes {
            self.create_index(index, b)?;
        }
        Ok(())
    }

    fn foreign_key_def(&self, fk: &AddForeignKey) -> sea_query::ForeignKeyCreateStatement {
        let mut def = SeaForeignKey::create();
        def.name(&fk.name).to_tbl(self.table_ref(&fk.principal_table));
        for column in &fk.columns {
            def.from_col(Alias::new(column));
        }
        for column in &fk.principal_columns {
            def.to_col(Alias::new(column));
        }
        if fk.cascade_delete {
            def.on_delete(ForeignKeyAction::Cascade);
        }
        def
    }

    fn drop_table(&self, op: &DropTable, b: &mut SqlBatchBuilder) -> GenerateResult<()> {
        let stmt = Table::drop().table(self.table_ref(&op.name)).to_owned();
        b.append(self.build_table_drop(stmt));
        Ok(())
    }

    fn rename_table(&self, op: &RenameTable, b: &mut SqlBatchBuilder) -> GenerateResult<()> {
        let stmt = Table::rename()
            .table(self.table_ref(&op.name), Alias::new(&op.new_name))
            .to_owned();
        b.append(self.build_table_rename(stmt));
        Ok(())
    }

    fn move_table(&self, _op: &MoveTable, _b: &mut SqlBatchBuilder) -> GenerateResult<()> {
        Err(GenerateError::unsupported(self.name(), "moving tables between schemas"))
    }

    fn add_column(&self, op: &AddColumn, b: &mut SqlBatchBuilder) -> GenerateResult<()> {
        let stmt = Table::alter()
            .table(self.table_ref(&op.table))
            .add_column(self.column_def(&op.column))
            .to_owned();
        b.append(self.build_table_alter(stmt));
        Ok(())
    }

    fn drop_column(&self, op: &DropColumn, b: &mut SqlBatchBuilder) -> GenerateResult<()> {
        let stmt = Table::alter()
            .table(self.table_ref(&op.table))
            .drop_column(Alias::new(&op.name))
            .to_owned();
        b.append(self.build_table_alter(stmt));
        Ok(())
    }

    /// Type, nullability and default as separate ANSI statements.
    fn alter_column(&self, op: &AlterColumn, b: &mut SqlBatchBuilder) -> GenerateResult<()> {
        let prefix = format!(
            "ALTER TABLE {} ALTER COLUMN {}",
            self.delimit_name(&op.table),
            self.delimit_identifier(&op.new_column.name)
        );

        b.append(format!("{} SET DATA TYPE {}", prefix, op.new_column.data_type));
        if op.new_column.nullable {
            b.append(format!("{} DROP NOT NULL", prefix));
        } else {
            b.append(format!("{} SET NOT NULL", prefix));
        }
        match self.column_default(&op.new_column) {
            Some(default) => b.append(format!("{} SET DEFAULT {}", prefix, default)),
            None => b.append(format!("{} DROP DEFAULT", prefix)),
        };
        Ok(())
    }

    fn rename_column(&self, op: &RenameColumn, b: &mut SqlBatchBuilder) -> GenerateResult<()> {
        let stmt = Table::alter()
            .table(self.table_ref(&op.table))
            .rename_column(Alias::new(&op.name), Alias::new(&op.new_name))
            .to_owned();
        b.append(self.build_table_alter(stmt));
        Ok(())
    }

    fn add_primary_key(&self, op: &AddPrimaryKey, b: &mut SqlBatchBuilder) -> GenerateResult<()> {
        b.append(format!(
            "ALTER TABLE {} ADD CONSTRAINT {} PRIMARY KEY ({})",
            self.delimit_name(&op.table),
            self.delimit_identifier(&op.name),
            self.delimit_columns(&op.columns)
        ));
        Ok(())
    }

    fn drop_primary_key(&self, op: &DropPrimaryKey, b: &mut SqlBatchBuilder) -> GenerateResult<()> {
        self.drop_constraint(&op.table, &op.name, b)
    }

    fn add_unique_constraint(
        &self,
        op: &AddUniqueConstraint,
        b: &mut SqlBatchBuilder,
    ) -> GenerateResult<()> {
        b.append(format!(
            "ALTER TABLE {} ADD CONSTRAINT {} UNIQUE ({})",
            self.delimit_name(&op.table),
            self.delimit_identifier(&op.name),
            self.delimit_columns(&op.columns)
        ));
        Ok(())
    }

    fn drop_unique_constraint(
        &self,
        op: &DropUniqueConstraint,
        b: &mut SqlBatchBuilder,
    ) -> GenerateResult<()> {
        self.drop_constraint(&op.table, &op.name, b)
    }

    fn add_foreign_key(&self, op: &AddForeignKey, b: &mut SqlBatchBuilder) -> GenerateResult<()> {
        let mut sql = format!(
            "ALTER TABLE {} ADD CONSTRAINT {} FOREIGN KEY ({}) REFERENCES {} ({})",
            self.delimit_name(&op.table),
            self.delimit_identifier(&op.name),
            self.delimit_columns(&op.columns),
            self.delimit_name(&op.principal_table),
            self.delimit_columns(&op.principal_columns)
        );
        if op.cascade_delete {
            sql.push_str(" ON DELETE CASCADE");
        }
        b.append(sql);
        Ok(())
    }

    fn drop_foreign_key(&self, op: &DropForeignKey, b: &mut SqlBatchBuilder) -> GenerateResult<()> {
        self.drop_constraint(&op.table, &op.name, b)
    }

    fn drop_constraint(
        &self,
        table: &QualifiedName,
        name: &str,
        b: &mut SqlBatchBuilder,
    ) -> GenerateResult<()> {
        b.append(format!(
            "ALTER TABLE {} DROP CONSTRAINT {}",
            self.delimit_name(table),
            self.delimit_identifier(name)
        ));
        Ok(())
    }

    fn create_index(&self, op: &CreateIndex, b: &mut SqlBatchBuilder) -> GenerateResult<()> {
        let mut stmt = SeaIndex::create();
        stmt.name(&op.name).table(self.table_ref(&op.table));
        for column in &op.columns {
            stmt.col(Alias::new(column));
        }
        if op.unique {
            stmt.unique();
        }
        b.append(self.build_index_create(stmt));
        Ok(())
    }

    fn drop_index(&self, op: &DropIndex, b: &mut SqlBatchBuilder) -> GenerateResult<()> {
        let stmt = SeaIndex::drop()
            .name(op.name.as_str())
            .table(self.table_ref(&op.table))
            .to_owned();
        b.append(self.build_index_drop(stmt));
        Ok(())
    }

    fn rename_index(&self, _op: &RenameIndex, _b: &mut SqlBatchBuilder) -> GenerateResult<()> {
        Err(GenerateError::unsupported(self.name(), "renaming indexes"))
    }

    fn sequence_options(&self, min: Option<i64>, max: Option<i64>, cyclic: bool) -> String {
        let min = min.map_or_else(|| " NO MINVALUE".to_string(), |v| format!(" MINVALUE {}", v));
        let max = max.map_or_else(|| " NO MAXVALUE".to_string(), |v| format!(" MAXVALUE {}", v));
        let cycle = if cyclic { " CYCLE" } else { " NO CYCLE" };
        format!("{}{}{}", min, max, cycle)
    }

    fn require_sequences(&self) -> GenerateResult<()> {
        if self.supports_sequences() {
            Ok(())
        } else {
            Err(GenerateError::unsupported(self.name(), "sequences"))
        }
    }

    fn create_sequence(&self, op: &CreateSequence, b: &mut SqlBatchBuilder) -> GenerateResult<()> {
        self.require_sequences()?;
        b.append(format!(
            "CREATE SEQUENCE {} AS {} START WITH {} INCREMENT BY {}{}",
            self.delimit_name(&op.name),
            op.data_type,
            op.start,
            op.increment,
            self.sequence_options(op.min, op.max, op.cyclic)
        ));
        Ok(())
    }

    fn drop_sequence(&self, op: &DropSequence, b: &mut SqlBatchBuilder) -> GenerateResult<()> {
        self.require_sequences()?;
        b.append(format!("DROP SEQUENCE {}", self.delimit_name(&op.name)));
        Ok(())
    }

    fn rename_sequence(&self, _op: &RenameSequence, _b: &mut SqlBatchBuilder) -> GenerateResult<()> {
        Err(GenerateError::unsupported(self.name(), "renaming sequences"))
    }

    fn move_sequence(&self, _op: &MoveSequence, _b: &mut SqlBatchBuilder) -> GenerateResult<()> {
        Err(GenerateError::unsupported(self.name(), "moving sequences between schemas"))
    }

    fn alter_sequence(&self, op: &AlterSequence, b: &mut SqlBatchBuilder) -> GenerateResult<()> {
        self.require_sequences()?;
        b.append(format!(
            "ALTER SEQUENCE {} INCREMENT BY {}{}",
            self.delimit_name(&op.name),
            op.increment,
            self.sequence_options(op.min, op.max, op.cyclic)
        ));
        Ok(())
    }

    fn restart_sequence(&self, op: &RestartSequence, b: &mut SqlBatchBuilder) -> GenerateResult<()> {
        self.require_sequences()?;
        b.append(format!(
            "ALTER SEQUENCE {} RESTART WITH {}",
            self.delimit_name(&op.name),
            op.start
        ));
        Ok(())
    }

    /// Nothing to do on dialects without schemas.
    fn ensure_schema(&self, op: &EnsureSchema, b: &mut SqlBatchBuilder) -> GenerateResult<()> {
        if self.supports_schemas() {
            b.append(format!("CREATE SCHEMA {}", self.delimit_identifier(&op.name)));
        }
        Ok(())
    }

    fn drop_schema(&self, op: &DropSchema, b: &mut SqlBatchBuilder) -> GenerateResult<()> {
        if !self.supports_schemas() {
            return Err(GenerateError::unsupported(self.name(), "dropping schemas"));
        }
        b.append(format!("DROP SCHEMA {}", self.delimit_identifier(&op.name)));
        Ok(())
    }

    fn copy_data(&self, op: &CopyData, b: &mut SqlBatchBuilder) -> GenerateResult<()> {
        b.append(format!(
            "INSERT INTO {} ({}) SELECT {} FROM {}",
            self.delimit_name(&op.target),
            self.delimit_columns(&op.target_columns),
            self.delimit_columns(&op.source_columns),
            self.delimit_name(&op.source)
        ));
        Ok(())
    }

    /// Skipped on other dialects when limited; suppressed statements get a batch of their own.
    fn sql(&self, op: &SqlOperation, b: &mut SqlBatchBuilder) -> GenerateResult<()> {
        if !op.runs_on(self.name()) {
            return Ok(());
        }
        if op.suppress_transaction {
            b.append_suppressed(op.sql.clone());
        } else {
            b.append(op.sql.clone());
        }
        Ok(())
    }
}
