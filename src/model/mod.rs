mod entity;
mod sequence;
mod value;

pub use entity::{EntityType, ForeignKey, Index, Key, Property};
pub use sequence::Sequence;
pub use value::{Value, ValueType};

use std::collections::HashSet;

use crate::error::ModelError;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Model {
    pub entity_types: Vec<EntityType>,
    pub sequences: Vec<Sequence>,
}

impl Model {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entity(mut self, entity: EntityType) -> Self {
        self.entity_types.push(entity);
        self
    }

    pub fn sequence(mut self, sequence: Sequence) -> Self {
        self.sequences.push(sequence);
        self
    }

    pub fn find_entity(&self, name: &str) -> Option<&EntityType> {
        self.entity_types.iter().find(|e| e.name == name)
    }

    pub fn find_sequence(&self, name: &str) -> Option<&Sequence> {
        self.sequences.iter().find(|s| s.name == name)
    }

    pub fn is_empty(&self) -> bool {
        self.entity_types.is_empty() && self.sequences.is_empty()
    }

    /// Checks the structural invariants the differ relies on.
    pub fn validate(&self) -> Result<(), ModelError> {
        let mut entities = HashSet::new();
        for entity in &self.entity_types {
            if !entities.insert(entity.name.as_str()) {
                return Err(ModelError::DuplicateEntity(entity.name.clone()));
            }
        }

        let mut sequences = HashSet::new();
        for sequence in &self.sequences {
            if !sequences.insert((sequence.schema.as_deref(), sequence.name.as_str())) {
                return Err(ModelError::DuplicateSequence(sequence.name.clone()));
            }
        }

        for entity in &self.entity_types {
            self.validate_entity(entity)?;
        }

        Ok(())
    }

    fn validate_entity(&self, entity: &EntityType) -> Result<(), ModelError> {
        let mut names = HashSet::new();
        for property in &entity.properties {
            if !names.insert(property.name.as_str()) {
                return Err(ModelError::DuplicateProperty {
                    entity: entity.name.clone(),
                    property: property.name.clone(),
                });
            }
            if property.default_value.is_some() && property.default_sql.is_some() {
                return Err(ModelError::ConflictingDefaults {
                    entity: entity.name.clone(),
                    property: property.name.clone(),
                });
            }
            if let Some(sequence) = &property.sequence {
                if self.find_sequence(sequence).is_none() {
                    return Err(ModelError::UnknownSequence {
                        entity: entity.name.clone(),
                        property: property.name.clone(),
                        sequence: sequence.clone(),
                    });
                }
            }
        }

        let keys = entity
            .primary_key
            .iter()
            .chain(&entity.unique_keys)
            .map(|k| &k.properties)
            .chain(entity.indexes.iter().map(|i| &i.properties))
            .chain(entity.foreign_keys.iter().map(|fk| &fk.properties));
        for properties in keys {
            check_properties(entity, properties)?;
        }

        for fk in &entity.foreign_keys {
            if fk.properties.len() != fk.principal_properties.len() {
                return Err(ModelError::ForeignKeyArity {
                    entity: entity.name.clone(),
                    dependent: fk.properties.len(),
                    principal: fk.principal_properties.len(),
                });
            }
            let principal =
                self.find_entity(&fk.principal_entity)
                    .ok_or_else(|| ModelError::UnknownPrincipal {
                        entity: entity.name.clone(),
                        principal: fk.principal_entity.clone(),
                    })?;
            check_properties(principal, &fk.principal_properties)?;
        }

        Ok(())
    }
}

fn check_properties(entity: &EntityType, properties: &[String]) -> Result<(), ModelError> {
    if properties.is_empty() {
        return Err(ModelError::EmptyKey(entity.name.clone()));
    }
    match properties.iter().find(|p| entity.find_property(p).is_none()) {
        Some(missing) => Err(ModelError::UnknownProperty {
            entity: entity.name.clone(),
            property: missing.clone(),
        }),
        None => Ok(()),
    }
}
