use std::collections::BTreeMap;

use crate::model::Model;
use crate::operation::MigrationOperation;

/// One change set. IDs sort chronologically, conventionally
/// `<timestamp>_<Name>`.
#[derive(Debug, Clone, PartialEq)]
pub struct Migration {
    id: String,
    up: Vec<MigrationOperation>,
    down: Option<Vec<MigrationOperation>>,
    target_model: Option<Model>,
}

impl Migration {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            up: Vec::new(),
            down: None,
            target_model: None,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// The part of the ID after the first `_`, or the whole ID.
    pub fn name(&self) -> &str {
        migration_name(&self.id)
    }

    /// Add an operation with automatic reverse derivation.
    pub fn operation(mut self, op: impl Into<MigrationOperation>) -> Self {
        self.up.push(op.into());
        self
    }

    /// Set up operations (replaces any existing).
    pub fn up_ops(mut self, ops: Vec<MigrationOperation>) -> Self {
        self.up = ops;
        self
    }

    /// Set explicit down operations (replaces automatic derivation).
    /// They run in the order given.
    pub fn down_ops(mut self, ops: Vec<MigrationOperation>) -> Self {
        self.down = Some(ops);
        self
    }

    /// The model as it stands once this migration is applied.
    pub fn target_model(mut self, model: Model) -> Self {
        self.target_model = Some(model);
        self
    }

    pub fn up_operations(&self) -> &[MigrationOperation] {
        &self.up
    }

    /// Explicit down operations, else the inverse of each up operation in
    /// reverse order. `None` when some up operation has no inverse.
    pub fn down_operations(&self) -> Option<Vec<MigrationOperation>> {
        if let Some(down) = &self.down {
            return Some(down.clone());
        }
        self.up.iter().rev().map(MigrationOperation::inverse).collect()
    }

    pub fn is_reversible(&self) -> bool {
        self.down.is_some() || self.up.iter().all(MigrationOperation::is_reversible)
    }

    pub fn model(&self) -> Option<&Model> {
        self.target_model.as_ref()
    }
}

pub(crate) fn migration_name(id: &str) -> &str {
    id.split_once('_').map_or(id, |(_, name)| name)
}

/// Every local migration ordered by ID, plus the last model snapshot.
#[derive(Debug, Default)]
pub struct MigrationsAssembly {
    migrations: BTreeMap<String, Migration>,
    model_snapshot: Option<Model>,
}

impl MigrationsAssembly {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a migration, replacing one with the same ID.
    pub fn register(&mut self, migration: Migration) {
        self.migrations.insert(migration.id.clone(), migration);
    }

    pub fn with_migration(mut self, migration: Migration) -> Self {
        self.register(migration);
        self
    }

    pub fn model_snapshot(mut self, model: Model) -> Self {
        self.model_snapshot = Some(model);
        self
    }

    /// The snapshot, or else the target model of the newest migration carrying one.
    pub fn snapshot(&self) -> Option<&Model> {
        self.model_snapshot
            .as_ref()
            .or_else(|| self.migrations.values().rev().find_map(Migration::model))
    }

    pub fn get(&self, id: &str) -> Option<&Migration> {
        self.migrations.get(id)
    }

    /// Migrations in ascending ID order.
    pub fn all(&self) -> impl DoubleEndedIterator<Item = &Migration> {
        self.migrations.values()
    }

    /// Resolves a migration name or full ID, ignoring case.
    pub fn find_migration_id(&self, name_or_id: &str) -> Option<&str> {
        self.migrations
            .keys()
            .find(|id| {
                id.eq_ignore_ascii_case(name_or_id)
                    || migration_name(id).eq_ignore_ascii_case(name_or_id)
            })
            .map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.migrations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.migrations.is_empty()
    }
}
