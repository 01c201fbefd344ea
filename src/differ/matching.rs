use std::collections::{HashMap, HashSet};

use crate::model::{EntityType, Model, Property};
use crate::naming::NameResolver;

/// A source entity matched with its counterpart in the target model.
#[derive(Debug)]
pub(crate) struct EntityPair<'m> {
    pub source: &'m EntityType,
    pub target: &'m EntityType,
    /// Matched properties, in target property order.
    pub properties: Vec<(&'m Property, &'m Property)>,
}

impl<'m> EntityPair<'m> {
    pub fn has_source_property(&self, name: &str) -> bool {
        self.properties.iter().any(|(s, _)| s.name == name)
    }

    pub fn has_target_property(&self, name: &str) -> bool {
        self.properties.iter().any(|(_, t)| t.name == name)
    }
}

/// Maps `(source entity, source property)` to `(target entity, target property)`.
#[derive(Debug, Default)]
pub(crate) struct ColumnMap {
    entities: HashMap<String, String>,
    properties: HashMap<(String, String), (String, String)>,
}

impl ColumnMap {
    pub fn build(pairs: &[EntityPair<'_>]) -> Self {
        let mut map = ColumnMap::default();
        for pair in pairs {
            map.entities
                .insert(pair.source.name.clone(), pair.target.name.clone());
            for (source, target) in &pair.properties {
                map.properties.insert(
                    (pair.source.name.clone(), source.name.clone()),
                    (pair.target.name.clone(), target.name.clone()),
                );
            }
        }
        map
    }

    pub fn target_entity(&self, source_entity: &str) -> Option<&str> {
        self.entities.get(source_entity).map(String::as_str)
    }

    pub fn target_property(&self, source_entity: &str, property: &str) -> Option<(&str, &str)> {
        self.properties
            .get(&(source_entity.to_string(), property.to_string()))
            .map(|(e, p)| (e.as_str(), p.as_str()))
    }

    /// Position by position, every source property maps to the target property.
    pub fn maps_all(
        &self,
        source_entity: &str,
        source: &[String],
        target_entity: &str,
        target: &[String],
    ) -> bool {
        source.len() == target.len()
            && source.iter().zip(target).all(|(s, t)| {
                self.target_property(source_entity, s) == Some((target_entity, t.as_str()))
            })
    }
}

/// Share of properties matching by name and type, across both entities.
pub(crate) fn fuzzy_match(source: &EntityType, target: &EntityType) -> bool {
    let total = source.properties.len() + target.properties.len();
    if total == 0 {
        return false;
    }

    let matches = source
        .properties
        .iter()
        .filter(|s| {
            target
                .properties
                .iter()
                .any(|t| t.name == s.name && t.value_type == s.value_type)
        })
        .count();

    // 2 * matches / total >= 0.8
    5 * matches >= 2 * total
}

/// Name equality first, then fuzzy matching among what is left.
pub(crate) fn pair_entities<'m>(
    source: &'m Model,
    target: &'m Model,
    names: &dyn NameResolver,
) -> Vec<EntityPair<'m>> {
    let mut matched: Vec<(usize, &'m EntityType, &'m EntityType)> = Vec::new();
    let mut used_sources = HashSet::new();
    let mut unmatched_targets = Vec::new();

    for (index, target_entity) in target.entity_types.iter().enumerate() {
        match source
            .entity_types
            .iter()
            .position(|s| s.name == target_entity.name)
        {
            Some(position) if used_sources.insert(position) => {
                matched.push((index, &source.entity_types[position], target_entity));
            }
            _ => unmatched_targets.push(index),
        }
    }

    for index in unmatched_targets {
        let target_entity = &target.entity_types[index];
        let candidate = source
            .entity_types
            .iter()
            .enumerate()
            .find(|(position, s)| {
                !used_sources.contains(position) && fuzzy_match(s, target_entity)
            })
            .map(|(position, _)| position);

        if let Some(position) = candidate {
            used_sources.insert(position);
            matched.push((index, &source.entity_types[position], target_entity));
        }
    }

    matched.sort_by_key(|(index, _, _)| *index);
    matched
        .into_iter()
        .map(|(_, source, target)| EntityPair {
            source,
            target,
            properties: pair_properties(source, target, names),
        })
        .collect()
}

/// Property name equality first, then resolved column name equality.
pub(crate) fn pair_properties<'m>(
    source: &'m EntityType,
    target: &'m EntityType,
    names: &dyn NameResolver,
) -> Vec<(&'m Property, &'m Property)> {
    let mut pairs: Vec<Option<&'m Property>> = vec![None; target.properties.len()];
    let mut used = HashSet::new();

    for (index, t) in target.properties.iter().enumerate() {
        if let Some(position) = source.properties.iter().position(|s| s.name == t.name) {
            used.insert(position);
            pairs[index] = Some(&source.properties[position]);
        }
    }

    for (index, t) in target.properties.iter().enumerate() {
        if pairs[index].is_some() {
            continue;
        }
        let column = names.column(t);
        let candidate = source
            .properties
            .iter()
            .enumerate()
            .find(|(position, s)| !used.contains(position) && names.column(s) == column)
            .map(|(position, _)| position);

        if let Some(position) = candidate {
            used.insert(position);
            pairs[index] = Some(&source.properties[position]);
        }
    }

    target
        .properties
        .iter()
        .zip(pairs)
        .filter_map(|(t, s)| s.map(|s| (s, t)))
        .collect()
}
