use crate::naming::QualifiedName;
use crate::operation::Column;

#[derive(Debug, Clone, PartialEq)]
pub struct AddColumn {
    pub table: QualifiedName,
    pub column: Column,
}

impl AddColumn {
    pub fn new(table: impl Into<QualifiedName>, column: Column) -> Self {
        Self {
            table: table.into(),
            column,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DropColumn {
    pub table: QualifiedName,
    pub name: String,
}

impl DropColumn {
    pub fn new(table: impl Into<QualifiedName>, name: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            name: name.into(),
        }
    }
}

/// Replaces a column definition in place.
#[derive(Debug, Clone, PartialEq)]
pub struct AlterColumn {
    pub table: QualifiedName,
    pub new_column: Column,
    /// True when existing data may be lost or rejected by the change.
    pub is_destructive: bool,
}

impl AlterColumn {
    pub fn new(table: impl Into<QualifiedName>, new_column: Column, is_destructive: bool) -> Self {
        Self {
            table: table.into(),
            new_column,
            is_destructive,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenameColumn {
    pub table: QualifiedName,
    pub name: String,
    pub new_name: String,
}

impl RenameColumn {
    pub fn new(
        table: impl Into<QualifiedName>,
        name: impl Into<String>,
        new_name: impl Into<String>,
    ) -> Self {
        Self {
            table: table.into(),
            name: name.into(),
            new_name: new_name.into(),
        }
    }
}
