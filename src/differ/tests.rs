use pretty_assertions::assert_eq;

use super::*;
use crate::model::{ForeignKey, Index, Property, ValueType};
use crate::naming::ConventionNames;
use crate::types::AnsiTypeMapper;

fn differ() -> ModelDiffer<'static> {
    ModelDiffer::new(&ConventionNames, &AnsiTypeMapper)
}

fn int(name: &str) -> Property {
    Property::new(name, ValueType::I32)
}

fn string(name: &str) -> Property {
    Property::new(name, ValueType::String)
}

fn blog() -> EntityType {
    EntityType::new("Blog")
        .property(int("Id"))
        .property(string("Url"))
        .primary_key(["Id"])
}

fn post() -> EntityType {
    EntityType::new("Post")
        .property(int("Id"))
        .property(int("BlogId"))
        .property(string("Title"))
        .primary_key(["Id"])
        .foreign_key(ForeignKey::new(["BlogId"], "Blog", ["Id"]))
}

fn two_tables() -> Model {
    Model::new()
        .entity(
            EntityType::new("A")
                .table("T0")
                .schema("dbo")
                .property(int("Id"))
                .property(string("P0").column("C0"))
                .primary_key_with(Key::new(["Id"]).named("PK0")),
        )
        .entity(
            EntityType::new("B")
                .table("T1")
                .schema("dbo")
                .property(int("Id"))
                .property(string("P1").column("C1"))
                .primary_key_with(Key::new(["Id"]).named("PK1"))
                .foreign_key(ForeignKey::new(["Id"], "A", ["Id"]).named("FK"))
                .index(Index::new(["Id"]).unique().named("IX")),
        )
}

fn describe(operations: &[MigrationOperation]) -> Vec<String> {
    operations.iter().map(MigrationOperation::describe).collect()
}

#[test]
fn create_schema_creates_operations() {
    let operations = differ().create_schema(&two_tables());

    assert_eq!(operations.len(), 4);

    let MigrationOperation::CreateTable(t0) = &operations[0] else {
        panic!("expected CreateTable, got {:?}", operations[0]);
    };
    let MigrationOperation::CreateTable(t1) = &operations[1] else {
        panic!("expected CreateTable, got {:?}", operations[1]);
    };
    assert_eq!(t0.name.to_string(), "dbo.T0");
    assert_eq!(t1.name.to_string(), "dbo.T1");
    let columns = |t: &CreateTable| t.columns.iter().map(|c| c.name.clone()).collect::<Vec<_>>();
    assert_eq!(columns(t0), vec!["Id", "C0"]);
    assert_eq!(columns(t1), vec!["Id", "C1"]);
    assert!(t1.foreign_keys.is_empty());
    assert!(t1.indexes.is_empty());

    let MigrationOperation::AddForeignKey(fk) = &operations[2] else {
        panic!("expected AddForeignKey, got {:?}", operations[2]);
    };
    assert_eq!(fk.name, "FK");
    assert_eq!(fk.table.to_string(), "dbo.T1");
    assert_eq!(fk.principal_table.to_string(), "dbo.T0");
    assert_eq!(fk.columns, vec!["Id"]);
    assert_eq!(fk.principal_columns, vec!["Id"]);

    let MigrationOperation::CreateIndex(index) = &operations[3] else {
        panic!("expected CreateIndex, got {:?}", operations[3]);
    };
    assert_eq!(index.name, "IX");
    assert_eq!(index.table.to_string(), "dbo.T1");
    assert_eq!(index.columns, vec!["Id"]);
    assert!(index.unique);
}

#[test]
fn drop_schema_drops_dependents_first() {
    let operations = differ().drop_schema(&two_tables());

    assert_eq!(
        operations,
        vec![
            DropTable::new(QualifiedName::with_schema("dbo", "T1")).into(),
            DropTable::new(QualifiedName::with_schema("dbo", "T0")).into(),
        ]
    );
}

#[test]
fn diff_of_identical_models_is_empty() {
    let model = two_tables()
        .entity(blog().index(Index::new(["Url"])).unique_key(["Url"]))
        .entity(post())
        .sequence(Sequence::new("Numbers").increment(10));

    assert!(differ().diff(&model, &model.clone()).is_empty());
    assert!(!differ().has_differences(&model, &model));
}

#[test]
fn diff_finds_created_table_with_foreign_key() {
    let source = Model::new().entity(blog());
    let target = Model::new().entity(blog()).entity(post());

    let operations = differ().diff(&source, &target);

    assert_eq!(operations.len(), 2);
    let MigrationOperation::CreateTable(create) = &operations[0] else {
        panic!("expected CreateTable, got {:?}", operations[0]);
    };
    assert_eq!(create.name, QualifiedName::new("Post"));
    let columns: Vec<&str> = create.columns.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(columns, vec!["Id", "Title", "BlogId"]);

    assert_eq!(
        operations[1],
        AddForeignKey::new("Post", "FK_Post_Blog_BlogId", ["BlogId"], "Blog", ["Id"]).into()
    );
}

#[test]
fn diff_finds_renamed_column() {
    let source = Model::new().entity(blog());
    let target = Model::new().entity(
        EntityType::new("Blog")
            .property(int("Id"))
            .property(string("Url").column("Site"))
            .primary_key(["Id"]),
    );

    let operations = differ().diff(&source, &target);

    assert_eq!(operations, vec![RenameColumn::new("Blog", "Url", "Site").into()]);
}

#[test]
fn diff_finds_moved_table() {
    let source = Model::new().entity(blog().schema("dbo").table("T"));
    let target = Model::new().entity(blog().schema("OtherSchema").table("T"));

    let operations = differ().diff(&source, &target);

    assert_eq!(
        operations,
        vec![MoveTable::new(
            QualifiedName::with_schema("dbo", "T"),
            Some("OtherSchema".to_string())
        )
        .into()]
    );
}

#[test]
fn diff_finds_renamed_table() {
    let entity = |table: &str| {
        EntityType::new("A")
            .schema("dbo")
            .table(table)
            .property(int("Id"))
            .primary_key_with(Key::new(["Id"]).named("PK"))
    };
    let source = Model::new().entity(entity("T"));
    let target = Model::new().entity(entity("RenamedTable"));

    let operations = differ().diff(&source, &target);

    assert_eq!(
        operations,
        vec![RenameTable::new(QualifiedName::with_schema("dbo", "T"), "RenamedTable").into()]
    );
}

#[test]
fn moved_and_renamed_table_renames_in_new_schema() {
    let entity = |schema: &str, table: &str| {
        EntityType::new("A")
            .schema(schema)
            .table(table)
            .property(int("Id"))
            .primary_key_with(Key::new(["Id"]).named("PK"))
    };
    let source = Model::new().entity(entity("dbo", "T"));
    let target = Model::new().entity(entity("archive", "Old"));

    let operations = differ().diff(&source, &target);

    assert_eq!(
        operations,
        vec![
            MoveTable::new(
                QualifiedName::with_schema("dbo", "T"),
                Some("archive".to_string())
            )
            .into(),
            RenameTable::new(QualifiedName::with_schema("archive", "T"), "Old").into(),
        ]
    );
}

#[test]
fn diff_finds_dropped_table() {
    let source = Model::new().entity(blog()).entity(post());
    let target = Model::new().entity(blog());

    let operations = differ().diff(&source, &target);

    assert_eq!(operations, vec![DropTable::new("Post").into()]);
}

#[test]
fn diff_finds_added_and_dropped_columns() {
    let source = Model::new().entity(blog().property(string("Name")));
    let target = Model::new().entity(blog().property(int("Rating")));

    let operations = differ().diff(&source, &target);

    assert_eq!(
        describe(&operations),
        vec!["Drop column Name from Blog", "Add column Rating to Blog"]
    );
}

#[test]
fn diff_finds_altered_column() {
    let source = Model::new().entity(blog().property(int("Rating")));
    let target = Model::new().entity(blog().property(Property::new("Rating", ValueType::I64)));

    let operations = differ().diff(&source, &target);

    assert_eq!(operations.len(), 1);
    let MigrationOperation::AlterColumn(alter) = &operations[0] else {
        panic!("expected AlterColumn, got {:?}", operations[0]);
    };
    assert_eq!(alter.table, QualifiedName::new("Blog"));
    assert_eq!(alter.new_column.name, "Rating");
    assert_eq!(alter.new_column.data_type, "bigint");
    assert!(alter.is_destructive);
}

#[test]
fn widening_a_column_is_not_destructive() {
    let source = Model::new().entity(blog().property(string("Name").max_length(50)));
    let target = Model::new().entity(blog().property(string("Name").max_length(100)));

    let operations = differ().diff(&source, &target);

    let MigrationOperation::AlterColumn(alter) = &operations[0] else {
        panic!("expected AlterColumn, got {:?}", operations[0]);
    };
    assert_eq!(alter.new_column.data_type, "varchar(100)");
    assert!(!alter.is_destructive);
}

#[test]
fn requiring_a_column_is_destructive() {
    let source = Model::new().entity(blog().property(int("Rating")));
    let target = Model::new().entity(blog().property(int("Rating").not_null()));

    let operations = differ().diff(&source, &target);

    assert_eq!(operations.len(), 1);
    assert!(operations[0].is_destructive());
}

#[test]
fn columns_not_matched_on_different_default() {
    let source = Model::new().entity(blog().property(int("Rating").default_value(1)));
    let target = Model::new().entity(blog().property(int("Rating").default_value(2)));
    assert_eq!(describe(&differ().diff(&source, &target)), vec!["Alter column Rating on Blog"]);

    let source = Model::new().entity(blog().property(int("Rating").default_sql("1")));
    let target = Model::new().entity(blog().property(int("Rating").default_sql("2")));
    assert_eq!(describe(&differ().diff(&source, &target)), vec!["Alter column Rating on Blog"]);
}

#[test]
fn diff_finds_updated_primary_key() {
    let entity = |key: &[&str]| {
        EntityType::new("A")
            .property(int("Id"))
            .property(int("P1"))
            .primary_key_with(Key::new(key.iter().copied()).named("PK"))
    };
    let source = Model::new().entity(entity(&["Id"]));
    let target = Model::new().entity(entity(&["Id", "P1"]));

    let operations = differ().diff(&source, &target);

    assert_eq!(
        describe(&operations),
        vec![
            "Drop primary key PK from A",
            "Alter column P1 on A",
            "Add primary key PK to A",
        ]
    );
}

#[test]
fn primary_keys_matched_through_column_names() {
    let source = Model::new().entity(
        EntityType::new("A")
            .property(int("Id").column("Key"))
            .primary_key_with(Key::new(["Id"]).named("PK")),
    );
    let target = Model::new().entity(
        EntityType::new("A")
            .property(int("Identity").column("Key"))
            .primary_key_with(Key::new(["Identity"]).named("PK")),
    );

    assert!(differ().diff(&source, &target).is_empty());
}

#[test]
fn primary_keys_not_matched_on_different_names() {
    let entity = |name: &str| {
        EntityType::new("A")
            .property(int("Id"))
            .primary_key_with(Key::new(["Id"]).named(name))
    };
    let source = Model::new().entity(entity("PK0"));
    let target = Model::new().entity(entity("PK1"));

    assert_eq!(
        describe(&differ().diff(&source, &target)),
        vec!["Drop primary key PK0 from A", "Add primary key PK1 to A"]
    );
}

#[test]
fn diff_finds_added_and_removed_unique_constraints() {
    let source = Model::new().entity(blog().property(string("Name")).unique_key(["Url"]));
    let target = Model::new().entity(blog().property(string("Name")).unique_key(["Name"]));

    let operations = differ().diff(&source, &target);

    assert_eq!(
        describe(&operations),
        vec![
            "Drop unique constraint UC_Blog_Url from Blog",
            "Alter column Url on Blog",
            "Alter column Name on Blog",
            "Add unique constraint UC_Blog_Name to Blog",
        ]
    );
}

#[test]
fn diff_finds_added_and_dropped_foreign_keys() {
    let unlinked = EntityType::new("Post")
        .property(int("Id"))
        .property(int("BlogId"))
        .property(string("Title"))
        .primary_key(["Id"]);

    let source = Model::new().entity(blog()).entity(unlinked.clone());
    let target = Model::new().entity(blog()).entity(post());

    assert_eq!(
        differ().diff(&source, &target),
        vec![AddForeignKey::new("Post", "FK_Post_Blog_BlogId", ["BlogId"], "Blog", ["Id"]).into()]
    );
    assert_eq!(
        differ().diff(&target, &source),
        vec![DropForeignKey::new("Post", "FK_Post_Blog_BlogId").into()]
    );
}

#[test]
fn foreign_keys_not_matched_on_different_cascade() {
    let cascading = EntityType::new("Post")
        .property(int("Id"))
        .property(int("BlogId"))
        .property(string("Title"))
        .primary_key(["Id"])
        .foreign_key(ForeignKey::new(["BlogId"], "Blog", ["Id"]).cascade_delete());

    let source = Model::new().entity(blog()).entity(post());
    let target = Model::new().entity(blog()).entity(cascading);

    let operations = differ().diff(&source, &target);

    assert_eq!(operations.len(), 2);
    assert_eq!(operations[0], DropForeignKey::new("Post", "FK_Post_Blog_BlogId").into());
    let MigrationOperation::AddForeignKey(add) = &operations[1] else {
        panic!("expected AddForeignKey, got {:?}", operations[1]);
    };
    assert!(add.cascade_delete);
}

#[test]
fn foreign_keys_follow_renamed_principal_columns() {
    let source = Model::new().entity(blog()).entity(post());
    let target = Model::new()
        .entity(
            EntityType::new("Blog")
                .property(int("Id").column("BlogKey"))
                .property(string("Url"))
                .primary_key(["Id"]),
        )
        .entity(post());

    // The principal column is renamed; the foreign key still pairs.
    assert_eq!(
        differ().diff(&source, &target),
        vec![RenameColumn::new("Blog", "Id", "BlogKey").into()]
    );
}

#[test]
fn diff_finds_added_removed_and_renamed_indexes() {
    let source = Model::new().entity(blog().index(Index::new(["Url"]).named("IX")));
    let target = Model::new().entity(blog().index(Index::new(["Url"]).named("RenamedIndex")));
    assert_eq!(
        differ().diff(&source, &target),
        vec![RenameIndex::new("Blog", "IX", "RenamedIndex").into()]
    );

    let source = Model::new().entity(blog());
    let target = Model::new().entity(blog().index(Index::new(["Url"])));
    assert_eq!(
        differ().diff(&source, &target),
        vec![CreateIndex::new("Blog", "IX_Blog_Url", ["Url"]).into()]
    );
    assert_eq!(
        differ().diff(&target, &source),
        vec![DropIndex::new("Blog", "IX_Blog_Url").into()]
    );
}

#[test]
fn indexes_not_matched_on_different_uniqueness() {
    let source = Model::new().entity(blog().index(Index::new(["Url"]).named("IX")));
    let target = Model::new().entity(blog().index(Index::new(["Url"]).named("IX").unique()));

    assert_eq!(
        differ().diff(&source, &target),
        vec![
            DropIndex::new("Blog", "IX").into(),
            CreateIndex::new("Blog", "IX", ["Url"]).unique().into(),
        ]
    );
}

#[test]
fn diff_handles_transitive_table_renames() {
    let entity = |name: &str, table: &str, pk: &str| {
        EntityType::new(name)
            .schema("dbo")
            .table(table)
            .property(int("Id"))
            .primary_key_with(Key::new(["Id"]).named(pk))
    };
    let source = Model::new()
        .entity(entity("A", "T0", "PK0"))
        .entity(entity("B", "T1", "PK1"));
    let target = Model::new()
        .entity(entity("A", "T1", "PK0"))
        .entity(entity("B", "T0", "PK1"));

    let operations = differ().diff(&source, &target);

    assert_eq!(
        operations,
        vec![
            RenameTable::new(QualifiedName::with_schema("dbo", "T0"), "__mig_tmp__0").into(),
            RenameTable::new(QualifiedName::with_schema("dbo", "T1"), "T0").into(),
            RenameTable::new(QualifiedName::with_schema("dbo", "__mig_tmp__0"), "T1").into(),
        ]
    );
}

#[test]
fn diff_handles_transitive_column_renames() {
    let entity = |c0: &str, c1: &str| {
        EntityType::new("A")
            .property(int("Id"))
            .property(string("P0").column(c0))
            .property(string("P1").column(c1))
            .primary_key(["Id"])
    };
    let source = Model::new().entity(entity("C0", "C1"));
    let target = Model::new().entity(entity("C1", "C0"));

    assert_eq!(
        differ().diff(&source, &target),
        vec![
            RenameColumn::new("A", "C0", "__mig_tmp__0").into(),
            RenameColumn::new("A", "C1", "C0").into(),
            RenameColumn::new("A", "__mig_tmp__0", "C1").into(),
        ]
    );
}

#[test]
fn diff_handles_transitive_index_renames() {
    let entity = |first: &str, second: &str| {
        EntityType::new("A")
            .property(int("Id"))
            .property(string("P"))
            .primary_key(["Id"])
            .index(Index::new(["Id"]).named(first))
            .index(Index::new(["P"]).named(second))
    };
    let source = Model::new().entity(entity("IX0", "IX1"));
    let target = Model::new().entity(entity("IX1", "IX0"));

    assert_eq!(
        differ().diff(&source, &target),
        vec![
            RenameIndex::new("A", "IX0", "__mig_tmp__0").into(),
            RenameIndex::new("A", "IX1", "IX0").into(),
            RenameIndex::new("A", "__mig_tmp__0", "IX1").into(),
        ]
    );
}

#[test]
fn entity_types_fuzzy_matched_at_eighty_percent() {
    let source = Model::new().entity(
        EntityType::new("A")
            .property(int("Id"))
            .property(string("P1"))
            .primary_key_with(Key::new(["Id"]).named("PK")),
    );
    let target = Model::new().entity(
        EntityType::new("B")
            .property(int("Id"))
            .property(string("P1"))
            .property(string("P2"))
            .primary_key_with(Key::new(["Id"]).named("PK")),
    );

    assert_eq!(
        describe(&differ().diff(&source, &target)),
        vec!["Rename table A to B", "Add column P2 to B"]
    );
}

#[test]
fn entity_types_not_fuzzy_matched_below_eighty_percent() {
    let source = Model::new().entity(
        EntityType::new("A")
            .property(int("Id"))
            .property(string("P1"))
            .property(string("P2"))
            .primary_key_with(Key::new(["Id"]).named("PK")),
    );
    let target = Model::new().entity(
        EntityType::new("B")
            .property(int("Id"))
            .property(string("P1"))
            .property(string("P3"))
            .primary_key_with(Key::new(["Id"]).named("PK")),
    );

    let operations = differ().diff(&source, &target);

    assert_eq!(operations.len(), 2);
    assert_eq!(operations[0], DropTable::new("A").into());
    let MigrationOperation::CreateTable(create) = &operations[1] else {
        panic!("expected CreateTable, got {:?}", operations[1]);
    };
    let columns: Vec<&str> = create.columns.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(columns, vec!["Id", "P1", "P3"]);
}

#[test]
fn properties_matched_before_columns() {
    let source = Model::new().entity(
        EntityType::new("A")
            .property(int("Id"))
            .property(string("P1").column("C2"))
            .property(int("P2").column("C1"))
            .primary_key(["Id"]),
    );
    let target = Model::new().entity(
        EntityType::new("A")
            .property(int("Id"))
            .property(string("P1").column("C1"))
            .property(string("P4").column("C2"))
            .primary_key(["Id"]),
    );

    let operations = differ().diff(&source, &target);

    assert_eq!(operations.len(), 3);
    assert_eq!(operations[0], DropColumn::new("A", "C1").into());
    assert_eq!(operations[1], RenameColumn::new("A", "C2", "C1").into());
    let MigrationOperation::AddColumn(add) = &operations[2] else {
        panic!("expected AddColumn, got {:?}", operations[2]);
    };
    assert_eq!(add.column.name, "C2");
    assert_eq!(add.column.data_type, "text");
}

#[test]
fn properties_matched_by_column_name_alter_in_place() {
    let source = Model::new().entity(
        EntityType::new("A")
            .property(int("Id"))
            .property(string("P1").column("C"))
            .primary_key(["Id"]),
    );
    let target = Model::new().entity(
        EntityType::new("A")
            .property(int("Id"))
            .property(int("P2").column("C"))
            .primary_key(["Id"]),
    );

    let operations = differ().diff(&source, &target);

    assert_eq!(operations.len(), 1);
    let MigrationOperation::AlterColumn(alter) = &operations[0] else {
        panic!("expected AlterColumn, got {:?}", operations[0]);
    };
    assert_eq!(alter.new_column.name, "C");
    assert_eq!(alter.new_column.data_type, "integer");
}

#[test]
fn dropped_reference_cycle_drops_foreign_keys_first() {
    let a = EntityType::new("A")
        .property(int("Id"))
        .property(int("BId"))
        .primary_key(["Id"])
        .foreign_key(ForeignKey::new(["BId"], "B", ["Id"]));
    let b = EntityType::new("B")
        .property(int("Id"))
        .property(int("AId"))
        .primary_key(["Id"])
        .foreign_key(ForeignKey::new(["AId"], "A", ["Id"]));
    let source = Model::new().entity(a).entity(b);

    assert_eq!(
        describe(&differ().drop_schema(&source)),
        vec![
            "Drop foreign key FK_A_B_BId from A",
            "Drop foreign key FK_B_A_AId from B",
            "Drop table A",
            "Drop table B",
        ]
    );
}

#[test]
fn diff_finds_created_and_dropped_sequences() {
    let source = Model::new().sequence(Sequence::new("Old"));
    let target = Model::new().sequence(Sequence::new("New").start(10));

    let operations = differ().diff(&source, &target);

    assert_eq!(operations.len(), 2);
    assert_eq!(operations[0], DropSequence::new("Old").into());
    assert_eq!(
        operations[1],
        CreateSequence::new("New", "bigint").start(10).into()
    );
}

#[test]
fn sequences_pair_through_columns() {
    let entity = |sequence: &str| {
        EntityType::new("Order")
            .property(Property::new("Number", ValueType::I64).sequence(sequence))
            .primary_key(["Number"])
    };
    let source = Model::new()
        .entity(entity("OrderNumbers"))
        .sequence(Sequence::new("OrderNumbers").schema("sales"));
    let target = Model::new()
        .entity(entity("OrderIds"))
        .sequence(Sequence::new("OrderIds").schema("billing").increment(5));

    let operations = differ().diff(&source, &target);

    assert_eq!(
        operations,
        vec![
            MoveSequence::new(
                QualifiedName::with_schema("sales", "OrderNumbers"),
                Some("billing".to_string())
            )
            .into(),
            RenameSequence::new(QualifiedName::with_schema("billing", "OrderNumbers"), "OrderIds")
                .into(),
            AlterSequence::new(QualifiedName::with_schema("billing", "OrderIds"), 5).into(),
        ]
    );
}

#[test]
fn sequences_with_same_increment_are_equivalent() {
    let source = Model::new().sequence(Sequence::new("S").increment(2).max(100));
    let target = Model::new().sequence(Sequence::new("S").increment(2).max(500));

    assert!(differ().diff(&source, &target).is_empty());
}
