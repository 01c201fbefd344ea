use crate::model::{Value, ValueType};

#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    pub name: String,
    pub value_type: ValueType,
    pub nullable: bool,
    pub column_name: Option<String>,
    pub column_type: Option<String>,
    pub default_value: Option<Value>,
    pub default_sql: Option<String>,
    pub max_length: Option<u32>,
    pub store_computed: bool,
    pub concurrency_token: bool,
    pub generate_value_on_add: bool,
    /// Name of the sequence that feeds this column, if any.
    pub sequence: Option<String>,
}

impl Property {
    pub fn new(name: impl Into<String>, value_type: ValueType) -> Self {
        Self {
            name: name.into(),
            value_type,
            nullable: true,
            column_name: None,
            column_type: None,
            default_value: None,
            default_sql: None,
            max_length: None,
            store_computed: false,
            concurrency_token: false,
            generate_value_on_add: false,
            sequence: None,
        }
    }

    pub fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    pub fn column(mut self, name: impl Into<String>) -> Self {
        self.column_name = Some(name.into());
        self
    }

    pub fn column_type(mut self, store_type: impl Into<String>) -> Self {
        self.column_type = Some(store_type.into());
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

    pub fn max_length(mut self, length: u32) -> Self {
        self.max_length = Some(length);
        self
    }

    pub fn store_computed(mut self) -> Self {
        self.store_computed = true;
        self
    }

    pub fn concurrency_token(mut self) -> Self {
        self.concurrency_token = true;
        self
    }

    pub fn generate_value_on_add(mut self) -> Self {
        self.generate_value_on_add = true;
        self
    }

    pub fn sequence(mut self, name: impl Into<String>) -> Self {
        self.sequence = Some(name.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Key {
    pub name: Option<String>,
    pub properties: Vec<String>,
}

impl Key {
    pub fn new<I, S>(properties: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: None,
            properties: properties.into_iter().map(Into::into).collect(),
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignKey {
    pub name: Option<String>,
    pub properties: Vec<String>,
    pub principal_entity: String,
    pub principal_properties: Vec<String>,
    pub cascade_delete: bool,
}

impl ForeignKey {
    pub fn new<I, S, P, T>(properties: I, principal_entity: impl Into<String>, principal: P) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
        P: IntoIterator<Item = T>,
        T: Into<String>,
    {
        Self {
            name: None,
            properties: properties.into_iter().map(Into::into).collect(),
            principal_entity: principal_entity.into(),
            principal_properties: principal.into_iter().map(Into::into).collect(),
            cascade_delete: false,
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn cascade_delete(mut self) -> Self {
        self.cascade_delete = true;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Index {
    pub name: Option<String>,
    pub properties: Vec<String>,
    pub unique: bool,
}

impl Index {
    pub fn new<I, S>(properties: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: None,
            properties: properties.into_iter().map(Into::into).collect(),
            unique: false,
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EntityType {
    pub name: String,
    pub schema: Option<String>,
    pub table_name: Option<String>,
    pub properties: Vec<Property>,
    pub primary_key: Option<Key>,
    pub unique_keys: Vec<Key>,
    pub foreign_keys: Vec<ForeignKey>,
    pub indexes: Vec<Index>,
}

impl EntityType {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            schema: None,
            table_name: None,
            properties: Vec::new(),
            primary_key: None,
            unique_keys: Vec::new(),
            foreign_keys: Vec::new(),
            indexes: Vec::new(),
        }
    }

    pub fn schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = Some(schema.into());
        self
    }

    pub fn table(mut self, name: impl Into<String>) -> Self {
        self.table_name = Some(name.into());
        self
    }

    pub fn property(mut self, property: Property) -> Self {
        self.properties.push(property);
        self
    }

    /// Sets the primary key. Key properties become non-nullable.
    pub fn primary_key<I, S>(self, properties: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.primary_key_with(Key::new(properties))
    }

    pub fn primary_key_with(mut self, key: Key) -> Self {
        for property in &mut self.properties {
            if key.properties.contains(&property.name) {
                property.nullable = false;
            }
        }
        self.primary_key = Some(key);
        self
    }

    pub fn unique_key<I, S>(self, properties: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.unique_key_with(Key::new(properties))
    }

    pub fn unique_key_with(mut self, key: Key) -> Self {
        self.unique_keys.push(key);
        self
    }

    pub fn foreign_key(mut self, foreign_key: ForeignKey) -> Self {
        self.foreign_keys.push(foreign_key);
        self
    }

    pub fn index(mut self, index: Index) -> Self {
        self.indexes.push(index);
        self
    }

    pub fn find_property(&self, name: &str) -> Option<&Property> {
        self.properties.iter().find(|p| p.name == name)
    }

    /// Resolves a list of property names, skipping names that do not exist.
    pub fn properties_named<'a>(&'a self, names: &'a [String]) -> impl Iterator<Item = &'a Property> {
        names.iter().filter_map(move |name| self.find_property(name))
    }

    /// True when the property takes part in the primary key, a unique key or a foreign key.
    pub fn is_key_property(&self, name: &str) -> bool {
        let in_key = |key: &Key| key.properties.iter().any(|p| p == name);
        self.primary_key.as_ref().is_some_and(in_key)
            || self.unique_keys.iter().any(in_key)
            || self
                .foreign_keys
                .iter()
                .any(|fk| fk.properties.iter().any(|p| p == name))
    }

    pub fn is_foreign_key_property(&self, name: &str) -> bool {
        self.foreign_keys
            .iter()
            .any(|fk| fk.properties.iter().any(|p| p == name))
    }
}
