use crate::model::Value;
use crate::naming::QualifiedName;
use crate::operation::{AddForeignKey, AddPrimaryKey, AddUniqueConstraint, CreateIndex};

/// A fully resolved column definition.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub data_type: String,
    pub nullable: bool,
    pub default_value: Option<Value>,
    pub default_sql: Option<String>,
    pub max_length: Option<u32>,
    pub store_computed: bool,
    pub concurrency_token: bool,
    pub generate_value_on_add: bool,
}

impl Column {
    pub fn new(name: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
            nullable: true,
            default_value: None,
            default_sql: None,
            max_length: None,
            store_computed: false,
            concurrency_token: false,
            generate_value_on_add: false,
        }
    }

    pub fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    pub fn default_sql(mut self, sql: impl Into<String>) -> Self {
        self.default_sql = Some(sql.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreateTable {
    pub name: QualifiedName,
    pub columns: Vec<Column>,
    pub primary_key: Option<AddPrimaryKey>,
    pub unique_constraints: Vec<AddUniqueConstraint>,
    /// Rendered inline when present. The differ emits foreign keys separately.
    pub foreign_keys: Vec<AddForeignKey>,
    /// Rendered after the table when present. The differ emits indexes separately.
    pub indexes: Vec<CreateIndex>,
}

impl CreateTable {
    pub fn new(name: impl Into<QualifiedName>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
            primary_key: None,
            unique_constraints: Vec::new(),
            foreign_keys: Vec::new(),
            indexes: Vec::new(),
        }
    }

    pub fn column(mut self, column: Column) -> Self {
        self.columns.push(column);
        self
    }

    pub fn primary_key<I, S>(mut self, name: impl Into<String>, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.primary_key = Some(AddPrimaryKey::new(self.name.clone(), name, columns));
        self
    }

    pub fn unique<I, S>(mut self, name: impl Into<String>, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.unique_constraints
            .push(AddUniqueConstraint::new(self.name.clone(), name, columns));
        self
    }

    pub fn foreign_key(mut self, foreign_key: AddForeignKey) -> Self {
        self.foreign_keys.push(foreign_key);
        self
    }

    pub fn index(mut self, index: CreateIndex) -> Self {
        self.indexes.push(index);
        self
    }

    pub fn find_column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DropTable {
    pub name: QualifiedName,
}

impl DropTable {
    pub fn new(name: impl Into<QualifiedName>) -> Self {
        Self { name: name.into() }
    }
}

/// Renames a table within its schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenameTable {
    pub name: QualifiedName,
    pub new_name: String,
}

impl RenameTable {
    pub fn new(name: impl Into<QualifiedName>, new_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            new_name: new_name.into(),
        }
    }
}

/// Moves a table to another schema. `None` is the store's default schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveTable {
    pub name: QualifiedName,
    pub new_schema: Option<String>,
}

impl MoveTable {
    pub fn new(name: impl Into<QualifiedName>, new_schema: Option<String>) -> Self {
        Self {
            name: name.into(),
            new_schema,
        }
    }
}
