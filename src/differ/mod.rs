mod matching;
mod renames;

use std::collections::HashSet;

use tracing::debug;

use crate::factory::MigrationOperationFactory;
use crate::model::{EntityType, ForeignKey, Key, Model, Property, Sequence};
use crate::naming::{NameResolver, QualifiedName};
use crate::operation::{
    AddColumn, AddForeignKey, AddPrimaryKey, AddUniqueConstraint, AlterColumn, AlterSequence,
    CreateIndex, CreateSequence, CreateTable, DropColumn, DropForeignKey, DropIndex,
    DropPrimaryKey, DropSequence, DropTable, DropUniqueConstraint, MigrationOperation,
    MoveSequence, MoveTable, RenameColumn, RenameIndex, RenameSequence, RenameTable,
};
use crate::types::TypeMapper;

use matching::{ColumnMap, EntityPair};
use renames::{handle_transitive_renames, TempNames};

pub use renames::TEMP_NAME_PREFIX;

/// Computes the operations that turn a database matching one model into one
/// matching another.
#[derive(Clone, Copy)]
pub struct ModelDiffer<'a> {
    factory: MigrationOperationFactory<'a>,
}

/// Both snapshots plus the pairing computed between them.
struct DiffContext<'m> {
    source: &'m Model,
    target: &'m Model,
    pairs: Vec<EntityPair<'m>>,
    column_map: ColumnMap,
}

impl<'m> DiffContext<'m> {
    fn is_source_paired(&self, entity: &EntityType) -> bool {
        self.pairs.iter().any(|p| p.source.name == entity.name)
    }

    fn is_target_paired(&self, entity: &EntityType) -> bool {
        self.pairs.iter().any(|p| p.target.name == entity.name)
    }
}

/// Operations grouped by kind; flattened in DDL-safe order at the end.
#[derive(Debug, Default)]
struct OperationBuckets {
    drop_indexes: Vec<DropIndex>,
    drop_foreign_keys: Vec<DropForeignKey>,
    drop_unique_constraints: Vec<DropUniqueConstraint>,
    drop_primary_keys: Vec<DropPrimaryKey>,
    drop_columns: Vec<DropColumn>,
    drop_tables: Vec<DropTable>,
    drop_sequences: Vec<DropSequence>,
    move_sequences: Vec<MoveSequence>,
    rename_sequences: Vec<RenameSequence>,
    move_tables: Vec<MoveTable>,
    rename_tables: Vec<RenameTable>,
    rename_columns: Vec<RenameColumn>,
    rename_indexes: Vec<RenameIndex>,
    create_sequences: Vec<CreateSequence>,
    alter_sequences: Vec<AlterSequence>,
    create_tables: Vec<CreateTable>,
    add_columns: Vec<AddColumn>,
    alter_columns: Vec<AlterColumn>,
    add_primary_keys: Vec<AddPrimaryKey>,
    add_unique_constraints: Vec<AddUniqueConstraint>,
    add_foreign_keys: Vec<AddForeignKey>,
    create_indexes: Vec<CreateIndex>,
}

fn push_all<T: Into<MigrationOperation>>(operations: &mut Vec<MigrationOperation>, items: Vec<T>) {
    operations.extend(items.into_iter().map(Into::into));
}

impl OperationBuckets {
    /// Drops first (against source names), then moves and renames, then creates
    /// and additions (against target names).
    fn into_operations(self) -> Vec<MigrationOperation> {
        let mut temps = TempNames::default();
        let mut operations = Vec::new();

        push_all(&mut operations, self.drop_indexes);
        push_all(&mut operations, self.drop_foreign_keys);
        push_all(&mut operations, self.drop_unique_constraints);
        push_all(&mut operations, self.drop_primary_keys);
        push_all(&mut operations, self.drop_columns);
        push_all(&mut operations, self.drop_tables);
        push_all(&mut operations, self.drop_sequences);
        push_all(&mut operations, self.move_sequences);
        push_all(
            &mut operations,
            handle_transitive_renames(self.rename_sequences, &mut temps),
        );
        push_all(&mut operations, self.move_tables);
        push_all(
            &mut operations,
            handle_transitive_renames(self.rename_tables, &mut temps),
        );
        push_all(
            &mut operations,
            handle_transitive_renames(self.rename_columns, &mut temps),
        );
        push_all(
            &mut operations,
            handle_transitive_renames(self.rename_indexes, &mut temps),
        );
        push_all(&mut operations, self.create_sequences);
        push_all(&mut operations, self.alter_sequences);
        push_all(&mut operations, self.create_tables);
        push_all(&mut operations, self.add_columns);
        push_all(&mut operations, self.alter_columns);
        push_all(&mut operations, self.add_primary_keys);
        push_all(&mut operations, self.add_unique_constraints);
        push_all(&mut operations, self.add_foreign_keys);
        push_all(&mut operations, self.create_indexes);

        operations
    }
}

impl<'a> ModelDiffer<'a> {
    pub fn new(names: &'a dyn NameResolver, types: &'a dyn TypeMapper) -> Self {
        Self {
            factory: MigrationOperationFactory::new(names, types),
        }
    }

    pub fn factory(&self) -> &MigrationOperationFactory<'a> {
        &self.factory
    }

    /// Everything in `model` is created.
    pub fn create_schema(&self, model: &Model) -> Vec<MigrationOperation> {
        self.diff(&Model::default(), model)
    }

    /// Everything in `model` is dropped.
    pub fn drop_schema(&self, model: &Model) -> Vec<MigrationOperation> {
        self.diff(model, &Model::default())
    }

    pub fn has_differences(&self, source: &Model, target: &Model) -> bool {
        !self.diff(source, target).is_empty()
    }

    pub fn diff(&self, source: &Model, target: &Model) -> Vec<MigrationOperation> {
        let pairs = matching::pair_entities(source, target, self.factory.names());
        let column_map = ColumnMap::build(&pairs);
        let ctx = DiffContext {
            source,
            target,
            pairs,
            column_map,
        };

        let mut buckets = OperationBuckets::default();
        for pair in &ctx.pairs {
            self.diff_entity_pair(&ctx, pair, &mut buckets);
        }
        self.created_tables(&ctx, &mut buckets);
        self.dropped_tables(&ctx, &mut buckets);
        self.diff_sequences(&ctx, &mut buckets);

        let operations = buckets.into_operations();
        debug!(
            paired = ctx.pairs.len(),
            operations = operations.len(),
            "model diff computed"
        );
        operations
    }

    fn diff_entity_pair(
        &self,
        ctx: &DiffContext<'_>,
        pair: &EntityPair<'_>,
        ops: &mut OperationBuckets,
    ) {
        let source_table = self.factory.table_name(pair.source);
        let target_table = self.factory.table_name(pair.target);

        if source_table.schema != target_table.schema {
            ops.move_tables.push(MoveTable::new(
                source_table.clone(),
                target_table.schema.clone(),
            ));
        }
        if source_table.name != target_table.name {
            ops.rename_tables.push(RenameTable::new(
                QualifiedName::from_parts(
                    target_table.schema.as_deref(),
                    source_table.name.clone(),
                ),
                target_table.name.clone(),
            ));
        }

        self.diff_columns(pair, &target_table, ops);
        self.diff_primary_keys(ctx, pair, ops);
        self.diff_unique_constraints(ctx, pair, ops);
        self.diff_foreign_keys(ctx, pair, ops);
        self.diff_indexes(ctx, pair, &target_table, ops);
    }

    fn diff_columns(
        &self,
        pair: &EntityPair<'_>,
        target_table: &QualifiedName,
        ops: &mut OperationBuckets,
    ) {
        let names = self.factory.names();

        for (source, target) in &pair.properties {
            let source_column = names.column(source);
            let target_column = names.column(target);
            if source_column != target_column {
                ops.rename_columns.push(RenameColumn::new(
                    target_table.clone(),
                    source_column,
                    target_column,
                ));
            }

            if !self.columns_equivalent(pair.source, source, pair.target, target) {
                let destructive =
                    self.is_destructive_change(pair.source, source, pair.target, target);
                ops.alter_columns
                    .push(self.factory.alter_column(pair.target, target, destructive));
            }
        }

        for property in &pair.target.properties {
            if !pair.has_target_property(&property.name) {
                ops.add_columns.push(self.factory.add_column(pair.target, property));
            }
        }

        for property in &pair.source.properties {
            if !pair.has_source_property(&property.name) {
                ops.drop_columns.push(self.factory.drop_column(pair.source, property));
            }
        }
    }

    fn columns_equivalent(
        &self,
        source_entity: &EntityType,
        source: &Property,
        target_entity: &EntityType,
        target: &Property,
    ) -> bool {
        source.value_type == target.value_type
            && self.factory.data_type(source_entity, source)
                == self.factory.data_type(target_entity, target)
            && source.default_value == target.default_value
            && source.default_sql == target.default_sql
            && source.nullable == target.nullable
            && source.generate_value_on_add == target.generate_value_on_add
            && source.store_computed == target.store_computed
            && source.concurrency_token == target.concurrency_token
            && source.max_length == target.max_length
    }

    /// Type changes, new NOT NULL constraints and shorter lengths can reject or lose data.
    /// A length change alone is judged by direction only.
    fn is_destructive_change(
        &self,
        source_entity: &EntityType,
        source: &Property,
        target_entity: &EntityType,
        target: &Property,
    ) -> bool {
        let length_changed = source.max_length != target.max_length;
        let type_changed = source.value_type != target.value_type
            || (!length_changed
                && self.factory.data_type(source_entity, source)
                    != self.factory.data_type(target_entity, target));
        let now_required = source.nullable && !target.nullable;
        let narrowed = match (source.max_length, target.max_length) {
            (Some(old), Some(new)) => new < old,
            (None, Some(_)) => true,
            _ => false,
        };

        type_changed || now_required || narrowed
    }

    #[allow(clippy::too_many_arguments)]
    fn keys_equivalent(
        &self,
        ctx: &DiffContext<'_>,
        source_entity: &EntityType,
        source_name: &str,
        source_properties: &[String],
        target_entity: &EntityType,
        target_name: &str,
        target_properties: &[String],
    ) -> bool {
        source_name == target_name
            && ctx.column_map.maps_all(
                &source_entity.name,
                source_properties,
                &target_entity.name,
                target_properties,
            )
    }

    fn primary_key_equivalent(
        &self,
        ctx: &DiffContext<'_>,
        pair: &EntityPair<'_>,
        source: &Key,
        target: &Key,
    ) -> bool {
        let names = self.factory.names();
        self.keys_equivalent(
            ctx,
            pair.source,
            &names.primary_key(pair.source, source),
            &source.properties,
            pair.target,
            &names.primary_key(pair.target, target),
            &target.properties,
        )
    }

    fn diff_primary_keys(
        &self,
        ctx: &DiffContext<'_>,
        pair: &EntityPair<'_>,
        ops: &mut OperationBuckets,
    ) {
        match (&pair.source.primary_key, &pair.target.primary_key) {
            (Some(source), Some(target))
                if self.primary_key_equivalent(ctx, pair, source, target) => {}
            (source, target) => {
                if let Some(key) = source {
                    ops.drop_primary_keys
                        .push(self.factory.drop_primary_key(pair.source, key));
                }
                if let Some(key) = target {
                    ops.add_primary_keys
                        .push(self.factory.add_primary_key(pair.target, key));
                }
            }
        }
    }

    fn unique_constraint_equivalent(
        &self,
        ctx: &DiffContext<'_>,
        pair: &EntityPair<'_>,
        source: &Key,
        target: &Key,
    ) -> bool {
        let names = self.factory.names();
        self.keys_equivalent(
            ctx,
            pair.source,
            &names.unique_constraint(pair.source, source),
            &source.properties,
            pair.target,
            &names.unique_constraint(pair.target, target),
            &target.properties,
        )
    }

    fn diff_unique_constraints(
        &self,
        ctx: &DiffContext<'_>,
        pair: &EntityPair<'_>,
        ops: &mut OperationBuckets,
    ) {
        for source in &pair.source.unique_keys {
            let kept = pair
                .target
                .unique_keys
                .iter()
                .any(|target| self.unique_constraint_equivalent(ctx, pair, source, target));
            if !kept {
                ops.drop_unique_constraints
                    .push(self.factory.drop_unique_constraint(pair.source, source));
            }
        }

        for target in &pair.target.unique_keys {
            let existed = pair
                .source
                .unique_keys
                .iter()
                .any(|source| self.unique_constraint_equivalent(ctx, pair, source, target));
            if !existed {
                ops.add_unique_constraints
                    .push(self.factory.add_unique_constraint(pair.target, target));
            }
        }
    }

    fn diff_foreign_keys(
        &self,
        ctx: &DiffContext<'_>,
        pair: &EntityPair<'_>,
        ops: &mut OperationBuckets,
    ) {
        let equivalent = |source: &ForeignKey, target: &ForeignKey| {
            let principal_paired = ctx.column_map.target_entity(&source.principal_entity)
                == Some(target.principal_entity.as_str());

            principal_paired
                && source.cascade_delete == target.cascade_delete
                && self.keys_equivalent(
                    ctx,
                    pair.source,
                    &self.factory.foreign_key_name(pair.source, source, ctx.source),
                    &source.properties,
                    pair.target,
                    &self.factory.foreign_key_name(pair.target, target, ctx.target),
                    &target.properties,
                )
                && ctx.column_map.maps_all(
                    &source.principal_entity,
                    &source.principal_properties,
                    &target.principal_entity,
                    &target.principal_properties,
                )
        };

        for source in &pair.source.foreign_keys {
            if !pair.target.foreign_keys.iter().any(|target| equivalent(source, target)) {
                ops.drop_foreign_keys
                    .push(self.factory.drop_foreign_key(pair.source, source, ctx.source));
            }
        }

        for target in &pair.target.foreign_keys {
            if !pair.source.foreign_keys.iter().any(|source| equivalent(source, target)) {
                ops.add_foreign_keys
                    .push(self.factory.add_foreign_key(pair.target, target, ctx.target));
            }
        }
    }

    /// Indexes pair by mapped columns and uniqueness; a name change is a rename.
    fn diff_indexes(
        &self,
        ctx: &DiffContext<'_>,
        pair: &EntityPair<'_>,
        target_table: &QualifiedName,
        ops: &mut OperationBuckets,
    ) {
        let names = self.factory.names();
        let mut matched = HashSet::new();

        for target in &pair.target.indexes {
            let candidate = pair.source.indexes.iter().enumerate().find(|(position, source)| {
                !matched.contains(position)
                    && source.unique == target.unique
                    && ctx.column_map.maps_all(
                        &pair.source.name,
                        &source.properties,
                        &pair.target.name,
                        &target.properties,
                    )
            });

            match candidate {
                Some((position, source)) => {
                    matched.insert(position);
                    let source_name = names.index(pair.source, source);
                    let target_name = names.index(pair.target, target);
                    if source_name != target_name {
                        ops.rename_indexes.push(RenameIndex::new(
                            target_table.clone(),
                            source_name,
                            target_name,
                        ));
                    }
                }
                None => ops
                    .create_indexes
                    .push(self.factory.create_index(pair.target, target)),
            }
        }

        for (position, source) in pair.source.indexes.iter().enumerate() {
            if !matched.contains(&position) {
                ops.drop_indexes.push(self.factory.drop_index(pair.source, source));
            }
        }
    }

    /// New tables; their foreign keys and indexes become top-level operations.
    fn created_tables(&self, ctx: &DiffContext<'_>, ops: &mut OperationBuckets) {
        for entity in &ctx.target.entity_types {
            if ctx.is_target_paired(entity) {
                continue;
            }
            let mut create = self.factory.create_table(entity, ctx.target);
            ops.add_foreign_keys.append(&mut create.foreign_keys);
            ops.create_indexes.append(&mut create.indexes);
            ops.create_tables.push(create);
        }
    }

    /// Removed tables, dependents before the tables they reference.
    fn dropped_tables(&self, ctx: &DiffContext<'_>, ops: &mut OperationBuckets) {
        let mut remaining: Vec<&EntityType> = ctx
            .source
            .entity_types
            .iter()
            .filter(|e| !ctx.is_source_paired(e))
            .collect();

        while !remaining.is_empty() {
            let referenced = |entity: &EntityType, others: &[&EntityType]| {
                others.iter().any(|other| {
                    other.name != entity.name
                        && other
                            .foreign_keys
                            .iter()
                            .any(|fk| fk.principal_entity == entity.name)
                })
            };

            let ready = remaining
                .iter()
                .position(|entity| !referenced(entity, &remaining));

            match ready {
                Some(position) => {
                    let entity = remaining.remove(position);
                    ops.drop_tables.push(self.factory.drop_table(entity));
                }
                None => {
                    // Reference cycle: drop the foreign keys between the remaining tables first.
                    let names: HashSet<&str> = remaining.iter().map(|e| e.name.as_str()).collect();
                    for entity in &remaining {
                        for fk in &entity.foreign_keys {
                            if fk.principal_entity != entity.name
                                && names.contains(fk.principal_entity.as_str())
                            {
                                ops.drop_foreign_keys.push(
                                    self.factory.drop_foreign_key(entity, fk, ctx.source),
                                );
                            }
                        }
                    }
                    for entity in remaining.drain(..) {
                        ops.drop_tables.push(self.factory.drop_table(entity));
                    }
                }
            }
        }
    }

    /// Sequences pair through the columns that use them, then by name.
    fn diff_sequences(&self, ctx: &DiffContext<'_>, ops: &mut OperationBuckets) {
        let mut pairs: Vec<(&Sequence, &Sequence)> = Vec::new();
        let is_source_paired = |pairs: &[(&Sequence, &Sequence)], s: &Sequence| {
            pairs.iter().any(|(p, _)| p.name == s.name && p.schema == s.schema)
        };
        let is_target_paired = |pairs: &[(&Sequence, &Sequence)], t: &Sequence| {
            pairs.iter().any(|(_, p)| p.name == t.name && p.schema == t.schema)
        };

        for pair in &ctx.pairs {
            for (source, target) in &pair.properties {
                let (Some(source_name), Some(target_name)) = (&source.sequence, &target.sequence)
                else {
                    continue;
                };
                let (Some(s), Some(t)) = (
                    ctx.source.find_sequence(source_name),
                    ctx.target.find_sequence(target_name),
                ) else {
                    continue;
                };
                if !is_source_paired(&pairs, s) && !is_target_paired(&pairs, t) {
                    pairs.push((s, t));
                }
            }
        }

        for target in &ctx.target.sequences {
            if is_target_paired(&pairs, target) {
                continue;
            }
            let candidates = || {
                ctx.source
                    .sequences
                    .iter()
                    .filter(|s| s.name == target.name && !is_source_paired(&pairs, s))
            };
            let found = candidates()
                .find(|s| s.schema == target.schema)
                .or_else(|| candidates().next());
            if let Some(source) = found {
                pairs.push((source, target));
            }
        }

        let names = self.factory.names();
        for (source, target) in &pairs {
            let source_name = names.sequence(source);
            let target_name = names.sequence(target);

            if source_name.schema != target_name.schema {
                ops.move_sequences.push(MoveSequence::new(
                    source_name.clone(),
                    target_name.schema.clone(),
                ));
            }
            if source_name.name != target_name.name {
                ops.rename_sequences.push(RenameSequence::new(
                    QualifiedName::from_parts(
                        target_name.schema.as_deref(),
                        source_name.name.clone(),
                    ),
                    target_name.name.clone(),
                ));
            }
            if source.increment != target.increment {
                let mut alter = AlterSequence::new(target_name, target.increment);
                alter.min = target.min;
                alter.max = target.max;
                alter.cyclic = target.cyclic;
                ops.alter_sequences.push(alter);
            }
        }

        for target in &ctx.target.sequences {
            if !is_target_paired(&pairs, target) {
                ops.create_sequences.push(self.factory.create_sequence(target));
            }
        }
        for source in &ctx.source.sequences {
            if !is_source_paired(&pairs, source) {
                ops.drop_sequences.push(self.factory.drop_sequence(source));
            }
        }
    }
}

#[cfg(test)]
mod tests;
