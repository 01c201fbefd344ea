use crate::naming::QualifiedName;

fn strings<I, S>(items: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    items.into_iter().map(Into::into).collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddPrimaryKey {
    pub table: QualifiedName,
    pub name: String,
    pub columns: Vec<String>,
}

impl AddPrimaryKey {
    pub fn new<I, S>(table: impl Into<QualifiedName>, name: impl Into<String>, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            table: table.into(),
            name: name.into(),
            columns: strings(columns),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DropPrimaryKey {
    pub table: QualifiedName,
    pub name: String,
}

impl DropPrimaryKey {
    pub fn new(table: impl Into<QualifiedName>, name: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            name: name.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddUniqueConstraint {
    pub table: QualifiedName,
    pub name: String,
    pub columns: Vec<String>,
}

impl AddUniqueConstraint {
    pub fn new<I, S>(table: impl Into<QualifiedName>, name: impl Into<String>, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            table: table.into(),
            name: name.into(),
            columns: strings(columns),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DropUniqueConstraint {
    pub table: QualifiedName,
    pub name: String,
}

impl DropUniqueConstraint {
    pub fn new(table: impl Into<QualifiedName>, name: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            name: name.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddForeignKey {
    pub table: QualifiedName,
    pub name: String,
    pub columns: Vec<String>,
    pub principal_table: QualifiedName,
    pub principal_columns: Vec<String>,
    pub cascade_delete: bool,
}

impl AddForeignKey {
    pub fn new<I, S, P, T>(
        table: impl Into<QualifiedName>,
        name: impl Into<String>,
        columns: I,
        principal_table: impl Into<QualifiedName>,
        principal_columns: P,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
        P: IntoIterator<Item = T>,
        T: Into<String>,
    {
        Self {
            table: table.into(),
            name: name.into(),
            columns: strings(columns),
            principal_table: principal_table.into(),
            principal_columns: strings(principal_columns),
            cascade_delete: false,
        }
    }

    pub fn cascade_delete(mut self) -> Self {
        self.cascade_delete = true;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DropForeignKey {
    pub table: QualifiedName,
    pub name: String,
}

impl DropForeignKey {
    pub fn new(table: impl Into<QualifiedName>, name: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            name: name.into(),
        }
    }
}
