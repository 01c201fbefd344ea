use crate::naming::QualifiedName;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateIndex {
    pub table: QualifiedName,
    pub name: String,
    pub columns: Vec<String>,
    pub unique: bool,
}

impl CreateIndex {
    pub fn new<I, S>(table: impl Into<QualifiedName>, name: impl Into<String>, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            table: table.into(),
            name: name.into(),
            columns: columns.into_iter().map(Into::into).collect(),
            unique: false,
        }
    }

    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DropIndex {
    pub table: QualifiedName,
    pub name: String,
}

impl DropIndex {
    pub fn new(table: impl Into<QualifiedName>, name: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            name: name.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenameIndex {
    pub table: QualifiedName,
    pub name: String,
    pub new_name: String,
}

impl RenameIndex {
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
