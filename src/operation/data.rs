use crate::naming::QualifiedName;

/// Creates a schema if it does not already exist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnsureSchema {
    pub name: String,
}

impl EnsureSchema {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DropSchema {
    pub name: String,
}

impl DropSchema {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Copies rows between tables, column lists matched by position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopyData {
    pub source: QualifiedName,
    pub source_columns: Vec<String>,
    pub target: QualifiedName,
    pub target_columns: Vec<String>,
}

impl CopyData {
    pub fn new<I, S, J, T>(
        source: impl Into<QualifiedName>,
        source_columns: I,
        target: impl Into<QualifiedName>,
        target_columns: J,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
        J: IntoIterator<Item = T>,
        T: Into<String>,
    {
        Self {
            source: source.into(),
            source_columns: source_columns.into_iter().map(Into::into).collect(),
            target: target.into(),
            target_columns: target_columns.into_iter().map(Into::into).collect(),
        }
    }
}
