use std::fmt;

use crate::model::{EntityType, ForeignKey, Index, Key, Property, Sequence};

/// A possibly schema-qualified object name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QualifiedName {
    pub schema: Option<String>,
    pub name: String,
}

impl QualifiedName {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            schema: None,
            name: name.into(),
        }
    }

    pub fn with_schema(schema: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            schema: Some(schema.into()),
            name: name.into(),
        }
    }

    pub fn from_parts(schema: Option<&str>, name: impl Into<String>) -> Self {
        Self {
            schema: schema.map(str::to_string),
            name: name.into(),
        }
    }

    /// Same schema, different name.
    pub fn renamed(&self, name: impl Into<String>) -> Self {
        Self {
            schema: self.schema.clone(),
            name: name.into(),
        }
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.schema {
            Some(schema) => write!(f, "{}.{}", schema, self.name),
            None => f.write_str(&self.name),
        }
    }
}

impl From<&str> for QualifiedName {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for QualifiedName {
    fn from(name: String) -> Self {
        Self::new(name)
    }
}

/// Resolves logical model elements to physical names.
///
/// Implementations must be pure: the differ compares resolved names across
/// two snapshots and relies on identical inputs giving identical output.
pub trait NameResolver: Send + Sync {
    fn table(&self, entity: &EntityType) -> QualifiedName;

    fn column(&self, property: &Property) -> String;

    fn primary_key(&self, entity: &EntityType, key: &Key) -> String;

    fn unique_constraint(&self, entity: &EntityType, key: &Key) -> String;

    fn foreign_key(&self, entity: &EntityType, foreign_key: &ForeignKey, principal_table: &str)
        -> String;

    fn index(&self, entity: &EntityType, index: &Index) -> String;

    fn sequence(&self, sequence: &Sequence) -> QualifiedName {
        QualifiedName::from_parts(sequence.schema.as_deref(), sequence.name.clone())
    }

    fn columns(&self, entity: &EntityType, properties: &[String]) -> Vec<String> {
        properties
            .iter()
            .map(|name| match entity.find_property(name) {
                Some(property) => self.column(property),
                None => name.clone(),
            })
            .collect()
    }
}

/// Explicit names win; otherwise `PK_`, `UC_`, `FK_` and `IX_` prefixes over
/// the table and column names.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConventionNames;

impl NameResolver for ConventionNames {
    fn table(&self, entity: &EntityType) -> QualifiedName {
        let name = entity.table_name.as_deref().unwrap_or(&entity.name);
        QualifiedName::from_parts(entity.schema.as_deref(), name)
    }

    fn column(&self, property: &Property) -> String {
        property
            .column_name
            .clone()
            .unwrap_or_else(|| property.name.clone())
    }

    fn primary_key(&self, entity: &EntityType, key: &Key) -> String {
        key.name
            .clone()
            .unwrap_or_else(|| format!("PK_{}", self.table(entity).name))
    }

    fn unique_constraint(&self, entity: &EntityType, key: &Key) -> String {
        key.name.clone().unwrap_or_else(|| {
            format!(
                "UC_{}_{}",
                self.table(entity).name,
                self.columns(entity, &key.properties).join("_")
            )
        })
    }

    fn foreign_key(
        &self,
        entity: &EntityType,
        foreign_key: &ForeignKey,
        principal_table: &str,
    ) -> String {
        foreign_key.name.clone().unwrap_or_else(|| {
            format!(
                "FK_{}_{}_{}",
                self.table(entity).name,
                principal_table,
                self.columns(entity, &foreign_key.properties).join("_")
            )
        })
    }

    fn index(&self, entity: &EntityType, index: &Index) -> String {
        index.name.clone().unwrap_or_else(|| {
            format!(
                "IX_{}_{}",
                self.table(entity).name,
                self.columns(entity, &index.properties).join("_")
            )
        })
    }
}
