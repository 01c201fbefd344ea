use std::collections::HashSet;

use crate::model::{EntityType, ForeignKey, Index, Key, Model, Property, Sequence};
use crate::naming::{NameResolver, QualifiedName};
use crate::operation::{
    AddColumn, AddForeignKey, AddPrimaryKey, AddUniqueConstraint, AlterColumn, Column,
    CreateIndex, CreateSequence, CreateTable, DropColumn, DropForeignKey, DropIndex,
    DropPrimaryKey, DropSequence, DropTable, DropUniqueConstraint,
};
use crate::types::TypeMapper;

/// Builds operations with every name and type already resolved.
#[derive(Clone, Copy)]
pub struct MigrationOperationFactory<'a> {
    names: &'a dyn NameResolver,
    types: &'a dyn TypeMapper,
}

impl<'a> MigrationOperationFactory<'a> {
    pub fn new(names: &'a dyn NameResolver, types: &'a dyn TypeMapper) -> Self {
        Self { names, types }
    }

    pub fn names(&self) -> &'a dyn NameResolver {
        self.names
    }

    pub fn types(&self) -> &'a dyn TypeMapper {
        self.types
    }

    pub fn table_name(&self, entity: &EntityType) -> QualifiedName {
        self.names.table(entity)
    }

    pub fn column(&self, entity: &EntityType, property: &Property) -> Column {
        Column {
            name: self.names.column(property),
            data_type: self.data_type(entity, property),
            nullable: property.nullable,
            default_value: property.default_value.clone(),
            default_sql: property.default_sql.clone(),
            max_length: property.max_length,
            store_computed: property.store_computed,
            concurrency_token: property.concurrency_token,
            generate_value_on_add: property.generate_value_on_add,
        }
    }

    pub fn data_type(&self, entity: &EntityType, property: &Property) -> String {
        self.types
            .column_type(property, entity.is_key_property(&property.name))
    }

    /// Primary key columns in key order, then the remaining non-foreign-key
    /// columns by resolved name, then foreign key columns in foreign key order.
    pub fn ordered_properties<'e>(&self, entity: &'e EntityType) -> Vec<&'e Property> {
        let mut seen = HashSet::new();
        let mut ordered = Vec::with_capacity(entity.properties.len());

        if let Some(key) = &entity.primary_key {
            for property in entity.properties_named(&key.properties) {
                if seen.insert(property.name.as_str()) {
                    ordered.push(property);
                }
            }
        }

        let mut others: Vec<&Property> = entity
            .properties
            .iter()
            .filter(|p| !seen.contains(p.name.as_str()))
            .filter(|p| !entity.is_foreign_key_property(&p.name))
            .collect();
        others.sort_by_cached_key(|p| self.names.column(p));
        for property in others {
            seen.insert(property.name.as_str());
            ordered.push(property);
        }

        for fk in &entity.foreign_keys {
            for property in entity.properties_named(&fk.properties) {
                if seen.insert(property.name.as_str()) {
                    ordered.push(property);
                }
            }
        }

        ordered
    }

    /// The full table, foreign keys and indexes included.
    pub fn create_table(&self, entity: &EntityType, model: &Model) -> CreateTable {
        let mut op = CreateTable::new(self.table_name(entity));

        op.columns = self
            .ordered_properties(entity)
            .into_iter()
            .map(|p| self.column(entity, p))
            .collect();
        op.primary_key = entity
            .primary_key
            .as_ref()
            .map(|key| self.add_primary_key(entity, key));
        op.unique_constraints = entity
            .unique_keys
            .iter()
            .map(|key| self.add_unique_constraint(entity, key))
            .collect();
        op.foreign_keys = entity
            .foreign_keys
            .iter()
            .map(|fk| self.add_foreign_key(entity, fk, model))
            .collect();
        op.indexes = entity
            .indexes
            .iter()
            .map(|index| self.create_index(entity, index))
            .collect();

        op
    }

    pub fn drop_table(&self, entity: &EntityType) -> DropTable {
        DropTable::new(self.table_name(entity))
    }

    pub fn add_column(&self, entity: &EntityType, property: &Property) -> AddColumn {
        AddColumn::new(self.table_name(entity), self.column(entity, property))
    }

    pub fn drop_column(&self, entity: &EntityType, property: &Property) -> DropColumn {
        DropColumn::new(self.table_name(entity), self.names.column(property))
    }

    pub fn alter_column(
        &self,
        entity: &EntityType,
        property: &Property,
        is_destructive: bool,
    ) -> AlterColumn {
        AlterColumn::new(
            self.table_name(entity),
            self.column(entity, property),
            is_destructive,
        )
    }

    pub fn add_primary_key(&self, entity: &EntityType, key: &Key) -> AddPrimaryKey {
        AddPrimaryKey::new(
            self.table_name(entity),
            self.names.primary_key(entity, key),
            self.names.columns(entity, &key.properties),
        )
    }

    pub fn drop_primary_key(&self, entity: &EntityType, key: &Key) -> DropPrimaryKey {
        DropPrimaryKey::new(self.table_name(entity), self.names.primary_key(entity, key))
    }

    pub fn add_unique_constraint(&self, entity: &EntityType, key: &Key) -> AddUniqueConstraint {
        AddUniqueConstraint::new(
            self.table_name(entity),
            self.names.unique_constraint(entity, key),
            self.names.columns(entity, &key.properties),
        )
    }

    pub fn drop_unique_constraint(&self, entity: &EntityType, key: &Key) -> DropUniqueConstraint {
        DropUniqueConstraint::new(
            self.table_name(entity),
            self.names.unique_constraint(entity, key),
        )
    }

    /// Principal names come from `model`; an unknown principal resolves to its logical name.
    pub fn add_foreign_key(
        &self,
        entity: &EntityType,
        foreign_key: &ForeignKey,
        model: &Model,
    ) -> AddForeignKey {
        let (principal_table, principal_columns) =
            match model.find_entity(&foreign_key.principal_entity) {
                Some(principal) => (
                    self.table_name(principal),
                    self.names
                        .columns(principal, &foreign_key.principal_properties),
                ),
                None => (
                    QualifiedName::new(foreign_key.principal_entity.clone()),
                    foreign_key.principal_properties.clone(),
                ),
            };

        let mut op = AddForeignKey::new(
            self.table_name(entity),
            self.names
                .foreign_key(entity, foreign_key, &principal_table.name),
            self.names.columns(entity, &foreign_key.properties),
            principal_table,
            principal_columns,
        );
        op.cascade_delete = foreign_key.cascade_delete;
        op
    }

    pub fn drop_foreign_key(
        &self,
        entity: &EntityType,
        foreign_key: &ForeignKey,
        model: &Model,
    ) -> DropForeignKey {
        DropForeignKey::new(
            self.table_name(entity),
            self.foreign_key_name(entity, foreign_key, model),
        )
    }

    pub fn foreign_key_name(
        &self,
        entity: &EntityType,
        foreign_key: &ForeignKey,
        model: &Model,
    ) -> String {
        let principal_table = model
            .find_entity(&foreign_key.principal_entity)
            .map(|principal| self.table_name(principal).name)
            .unwrap_or_else(|| foreign_key.principal_entity.clone());
        self.names.foreign_key(entity, foreign_key, &principal_table)
    }

    pub fn create_index(&self, entity: &EntityType, index: &Index) -> CreateIndex {
        let mut op = CreateIndex::new(
            self.table_name(entity),
            self.names.index(entity, index),
            self.names.columns(entity, &index.properties),
        );
        op.unique = index.unique;
        op
    }

    pub fn drop_index(&self, entity: &EntityType, index: &Index) -> DropIndex {
        DropIndex::new(self.table_name(entity), self.names.index(entity, index))
    }

    pub fn create_sequence(&self, sequence: &Sequence) -> CreateSequence {
        CreateSequence::new(
            self.names.sequence(sequence),
            self.types.store_type(sequence.value_type, None, false),
        )
        .start(sequence.start)
        .increment(sequence.increment)
        .bounds(sequence.min, sequence.max)
        .cyclic_if(sequence.cyclic)
    }

    pub fn drop_sequence(&self, sequence: &Sequence) -> DropSequence {
        DropSequence::new(self.names.sequence(sequence))
    }
}
