mod column;
mod constraint;
mod data;
mod index;
mod sequence;
mod sql;
mod table;

pub use column::{AddColumn, AlterColumn, DropColumn, RenameColumn};
pub use constraint::{
    AddForeignKey, AddPrimaryKey, AddUniqueConstraint, DropForeignKey, DropPrimaryKey,
    DropUniqueConstraint,
};
pub use data::{CopyData, DropSchema, EnsureSchema};
pub use index::{CreateIndex, DropIndex, RenameIndex};
pub use sequence::{
    AlterSequence, CreateSequence, DropSequence, MoveSequence, RenameSequence, RestartSequence,
};
pub use sql::SqlOperation;
pub use table::{Column, CreateTable, DropTable, MoveTable, RenameTable};

use crate::naming::QualifiedName;

/// Every schema edit the differ can emit and the generator can render.
#[derive(Debug, Clone, PartialEq)]
pub enum MigrationOperation {
    CreateTable(CreateTable),
    DropTable(DropTable),
    RenameTable(RenameTable),
    MoveTable(MoveTable),
    AddColumn(AddColumn),
    DropColumn(DropColumn),
    AlterColumn(AlterColumn),
    RenameColumn(RenameColumn),
    AddPrimaryKey(AddPrimaryKey),
    DropPrimaryKey(DropPrimaryKey),
    AddUniqueConstraint(AddUniqueConstraint),
    DropUniqueConstraint(DropUniqueConstraint),
    AddForeignKey(AddForeignKey),
    DropForeignKey(DropForeignKey),
    CreateIndex(CreateIndex),
    DropIndex(DropIndex),
    RenameIndex(RenameIndex),
    CreateSequence(CreateSequence),
    DropSequence(DropSequence),
    RenameSequence(RenameSequence),
    MoveSequence(MoveSequence),
    AlterSequence(AlterSequence),
    RestartSequence(RestartSequence),
    EnsureSchema(EnsureSchema),
    DropSchema(DropSchema),
    CopyData(CopyData),
    Sql(SqlOperation),
}

macro_rules! impl_from_operation {
    ($($variant:ident),* $(,)?) => {
        $(
            impl From<$variant> for MigrationOperation {
                fn from(op: $variant) -> Self {
                    MigrationOperation::$variant(op)
                }
            }
        )*
    };
}

impl_from_operation!(
    CreateTable,
    DropTable,
    RenameTable,
    MoveTable,
    AddColumn,
    DropColumn,
    AlterColumn,
    RenameColumn,
    AddPrimaryKey,
    DropPrimaryKey,
    AddUniqueConstraint,
    DropUniqueConstraint,
    AddForeignKey,
    DropForeignKey,
    CreateIndex,
    DropIndex,
    RenameIndex,
    CreateSequence,
    DropSequence,
    RenameSequence,
    MoveSequence,
    AlterSequence,
    RestartSequence,
    EnsureSchema,
    DropSchema,
    CopyData,
);

impl From<SqlOperation> for MigrationOperation {
    fn from(op: SqlOperation) -> Self {
        MigrationOperation::Sql(op)
    }
}

fn schema_name(schema: &Option<String>) -> &str {
    schema.as_deref().unwrap_or("default schema")
}

impl MigrationOperation {
    pub fn describe(&self) -> String {
        use MigrationOperation::*;

        match self {
            CreateTable(op) => format!("Create table {}", op.name),
            DropTable(op) => format!("Drop table {}", op.name),
            RenameTable(op) => format!("Rename table {} to {}", op.name, op.new_name),
            MoveTable(op) => format!("Move table {} to {}", op.name, schema_name(&op.new_schema)),
            AddColumn(op) => format!("Add column {} to {}", op.column.name, op.table),
            DropColumn(op) => format!("Drop column {} from {}", op.name, op.table),
            AlterColumn(op) => format!("Alter column {} on {}", op.new_column.name, op.table),
            RenameColumn(op) => format!(
                "Rename column {} to {} on {}",
                op.name, op.new_name, op.table
            ),
            AddPrimaryKey(op) => format!("Add primary key {} to {}", op.name, op.table),
            DropPrimaryKey(op) => format!("Drop primary key {} from {}", op.name, op.table),
            AddUniqueConstraint(op) => {
                format!("Add unique constraint {} to {}", op.name, op.table)
            }
            DropUniqueConstraint(op) => {
                format!("Drop unique constraint {} from {}", op.name, op.table)
            }
            AddForeignKey(op) => format!(
                "Add foreign key {} from {} to {}",
                op.name, op.table, op.principal_table
            ),
            DropForeignKey(op) => format!("Drop foreign key {} from {}", op.name, op.table),
            CreateIndex(op) => format!("Create index {} on {}", op.name, op.table),
            DropIndex(op) => format!("Drop index {} on {}", op.name, op.table),
            RenameIndex(op) => format!(
                "Rename index {} to {} on {}",
                op.name, op.new_name, op.table
            ),
            CreateSequence(op) => format!("Create sequence {}", op.name),
            DropSequence(op) => format!("Drop sequence {}", op.name),
            RenameSequence(op) => format!("Rename sequence {} to {}", op.name, op.new_name),
            MoveSequence(op) => format!(
                "Move sequence {} to {}",
                op.name,
                schema_name(&op.new_schema)
            ),
            AlterSequence(op) => format!("Alter sequence {}", op.name),
            RestartSequence(op) => format!("Restart sequence {} at {}", op.name, op.start),
            EnsureSchema(op) => format!("Ensure schema {}", op.name),
            DropSchema(op) => format!("Drop schema {}", op.name),
            CopyData(op) => format!("Copy data from {} to {}", op.source, op.target),
            Sql(op) => op
                .description
                .clone()
                .unwrap_or_else(|| "Run custom SQL".to_string()),
        }
    }

    /// The operation that undoes this one, when it carries enough information.
    pub fn inverse(&self) -> Option<MigrationOperation> {
        use MigrationOperation as Op;

        let inverse: MigrationOperation = match self {
            Op::CreateTable(op) => DropTable::new(op.name.clone()).into(),
            Op::RenameTable(op) => {
                RenameTable::new(op.name.renamed(op.new_name.clone()), op.name.name.clone()).into()
            }
            Op::MoveTable(op) => MoveTable::new(
                QualifiedName::from_parts(op.new_schema.as_deref(), op.name.name.clone()),
                op.name.schema.clone(),
            )
            .into(),
            Op::AddColumn(op) => DropColumn::new(op.table.clone(), op.column.name.clone()).into(),
            Op::RenameColumn(op) => {
                RenameColumn::new(op.table.clone(), op.new_name.clone(), op.name.clone()).into()
            }
            Op::AddPrimaryKey(op) => DropPrimaryKey::new(op.table.clone(), op.name.clone()).into(),
            Op::AddUniqueConstraint(op) => {
                DropUniqueConstraint::new(op.table.clone(), op.name.clone()).into()
            }
            Op::AddForeignKey(op) => DropForeignKey::new(op.table.clone(), op.name.clone()).into(),
            Op::CreateIndex(op) => DropIndex::new(op.table.clone(), op.name.clone()).into(),
            Op::RenameIndex(op) => {
                RenameIndex::new(op.table.clone(), op.new_name.clone(), op.name.clone()).into()
            }
            Op::CreateSequence(op) => DropSequence::new(op.name.clone()).into(),
            Op::RenameSequence(op) => RenameSequence::new(
                op.name.renamed(op.new_name.clone()),
                op.name.name.clone(),
            )
            .into(),
            Op::MoveSequence(op) => MoveSequence::new(
                QualifiedName::from_parts(op.new_schema.as_deref(), op.name.name.clone()),
                op.name.schema.clone(),
            )
            .into(),
            Op::EnsureSchema(op) => DropSchema::new(op.name.clone()).into(),
            Op::Sql(op) => {
                let reverse = op.reverse_sql.as_ref()?;
                SqlOperation {
                    sql: reverse.clone(),
                    reverse_sql: Some(op.sql.clone()),
                    suppress_transaction: op.suppress_transaction,
                    only_dialects: op.only_dialects.clone(),
                    description: op.description.clone(),
                }
                .into()
            }
            Op::DropTable(_)
            | Op::DropColumn(_)
            | Op::AlterColumn(_)
            | Op::DropPrimaryKey(_)
            | Op::DropUniqueConstraint(_)
            | Op::DropForeignKey(_)
            | Op::DropIndex(_)
            | Op::DropSequence(_)
            | Op::AlterSequence(_)
            | Op::RestartSequence(_)
            | Op::DropSchema(_)
            | Op::CopyData(_) => return None,
        };

        Some(inverse)
    }

    pub fn is_reversible(&self) -> bool {
        self.inverse().is_some()
    }

    pub fn is_destructive(&self) -> bool {
        match self {
            MigrationOperation::DropTable(_)
            | MigrationOperation::DropColumn(_)
            | MigrationOperation::DropSchema(_)
            | MigrationOperation::DropSequence(_) => true,
            MigrationOperation::AlterColumn(op) => op.is_destructive,
            _ => false,
        }
    }
}
