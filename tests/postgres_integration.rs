//! PostgreSQL integration tests
//!
//! These tests require a running PostgreSQL instance. They are ignored by default.
//! To run them:
//!
//! ```sh
//! # Set environment variables (optional, defaults shown)
//! export POSTGRES_HOST=localhost
//! export POSTGRES_USER=postgres
//! export POSTGRES_PASSWORD=postgres
//! export POSTGRES_DB=keel_test
//!
//! # Run the ignored tests
//! cargo test --features postgres --test postgres_integration -- --ignored
//! ```

use keel::prelude::*;
use postgres::{Client, NoTls};
use std::env;

fn get_test_client() -> Option<Client> {
    let host = env::var("POSTGRES_HOST").unwrap_or_else(|_| "localhost".to_string());
    let user = env::var("POSTGRES_USER").unwrap_or_else(|_| "postgres".to_string());
    let password = env::var("POSTGRES_PASSWORD").unwrap_or_else(|_| "postgres".to_string());
    let dbname = env::var("POSTGRES_DB").unwrap_or_else(|_| "keel_test".to_string());

    let config = format!(
        "host={} user={} password={} dbname={}",
        host, user, password, dbname
    );

    Client::connect(&config, NoTls).ok()
}

/// Each test works on its own tables so they can run in parallel.
fn cleanup_tables(client: &mut Client, prefix: &str) {
    for table in ["post", "blog", "history"] {
        let _ = client.batch_execute(&format!(
            "DROP TABLE IF EXISTS \"{}_{}\" CASCADE",
            prefix, table
        ));
    }
}

fn table_exists(client: &mut Client, name: &str) -> bool {
    client
        .query(
            "SELECT 1 FROM information_schema.tables \
             WHERE table_schema = current_schema() AND table_name = $1",
            &[&name],
        )
        .map(|rows| !rows.is_empty())
        .unwrap_or(false)
}

fn config(prefix: &str) -> MigratorConfig {
    MigratorConfig::new().history_table(format!("{}_history", prefix))
}

fn assembly(prefix: &str) -> MigrationsAssembly {
    let differ = ModelDiffer::new(&ConventionNames, &AnsiTypeMapper);
    let blog = EntityType::new("Blog")
        .table(format!("{}_blog", prefix))
        .property(
            Property::new("Id", ValueType::I32)
                .not_null()
                .generate_value_on_add(),
        )
        .property(Property::new("Url", ValueType::String).max_length(200))
        .primary_key(["Id"]);
    let post = EntityType::new("Post")
        .table(format!("{}_post", prefix))
        .property(Property::new("Id", ValueType::I32).not_null())
        .property(Property::new("Title", ValueType::String))
        .property(Property::new("BlogId", ValueType::I32).not_null())
        .primary_key(["Id"])
        .foreign_key(ForeignKey::new(["BlogId"], "Blog", ["Id"]).cascade_delete())
        .index(Index::new(["Title"]));

    let v1 = Model::new().entity(blog.clone());
    let v2 = Model::new()
        .entity(blog.property(Property::new("Rating", ValueType::I32)))
        .entity(post);

    MigrationsAssembly::new()
        .with_migration(
            Migration::new("20240101000000_Initial")
                .up_ops(differ.create_schema(&v1))
                .target_model(v1.clone()),
        )
        .with_migration(
            Migration::new("20240201000000_AddPosts")
                .up_ops(differ.diff(&v1, &v2))
                .down_ops(differ.diff(&v2, &v1))
                .target_model(v2),
        )
}

#[test]
#[ignore = "requires postgres connection"]
fn applies_and_records_history() {
    let Some(mut client) = get_test_client() else {
        return;
    };
    let prefix = "keel_apply";
    cleanup_tables(&mut client, prefix);

    let assembly = assembly(prefix);
    let migrator = Migrator::with_config(&assembly, &Postgres, config(prefix));
    {
        let mut conn = PostgresConnection::new(&mut client);
        assert!(migrator.get_database_migrations(&mut conn).unwrap().is_empty());

        let applied = migrator.apply_migrations(&mut conn, None).unwrap();
        assert_eq!(
            applied,
            vec!["20240101000000_Initial", "20240201000000_AddPosts"]
        );

        let rows = migrator.history().get_applied_migrations(&mut conn).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].migration_id, "20240101000000_Initial");
        assert_eq!(rows[0].product_version, env!("CARGO_PKG_VERSION"));
        assert!(migrator.get_unapplied_migrations(&mut conn).unwrap().is_empty());
    }

    assert!(table_exists(&mut client, "keel_apply_blog"));
    assert!(table_exists(&mut client, "keel_apply_post"));

    // Identity column fills the key.
    client
        .batch_execute("INSERT INTO keel_apply_blog (\"Url\") VALUES ('https://example.com')")
        .unwrap();

    cleanup_tables(&mut client, prefix);
}

#[test]
#[ignore = "requires postgres connection"]
fn reverts_to_target_and_to_initial_database() {
    let Some(mut client) = get_test_client() else {
        return;
    };
    let prefix = "keel_revert";
    cleanup_tables(&mut client, prefix);

    let assembly = assembly(prefix);
    let migrator = Migrator::with_config(&assembly, &Postgres, config(prefix));
    {
        let mut conn = PostgresConnection::new(&mut client);
        migrator.apply_migrations(&mut conn, None).unwrap();

        let reverted = migrator.apply_migrations(&mut conn, Some("Initial")).unwrap();
        assert_eq!(reverted, vec!["20240201000000_AddPosts"]);
        assert_eq!(
            migrator.get_database_migrations(&mut conn).unwrap(),
            vec!["20240101000000_Initial"]
        );
    }
    assert!(!table_exists(&mut client, "keel_revert_post"));
    assert!(table_exists(&mut client, "keel_revert_blog"));

    {
        let mut conn = PostgresConnection::new(&mut client);
        let reverted = migrator
            .apply_migrations(&mut conn, Some(INITIAL_DATABASE))
            .unwrap();
        assert_eq!(reverted, vec!["20240101000000_Initial"]);
    }
    assert!(!table_exists(&mut client, "keel_revert_blog"));
    assert!(!table_exists(&mut client, "keel_revert_history"));
}

#[test]
#[ignore = "requires postgres connection"]
fn failed_migration_is_rolled_back() {
    let Some(mut client) = get_test_client() else {
        return;
    };
    let prefix = "keel_fail";
    cleanup_tables(&mut client, prefix);

    let assembly = assembly(prefix).with_migration(
        Migration::new("20240301000000_Broken")
            .operation(AddColumn::new(
                "keel_fail_blog",
                Column::new("Score", "integer"),
            ))
            .operation(SqlOperation::new("SELECT * FROM keel_fail_missing")),
    );
    let migrator = Migrator::with_config(&assembly, &Postgres, config(prefix));
    {
        let mut conn = PostgresConnection::new(&mut client);
        let err = migrator.apply_migrations(&mut conn, None).unwrap_err();
        assert!(matches!(
            err,
            MigrationError::ExecutionFailed { ref completed, .. } if completed.len() == 2
        ));
        assert_eq!(migrator.get_database_migrations(&mut conn).unwrap().len(), 2);
    }

    let score = client
        .query(
            "SELECT 1 FROM information_schema.columns \
             WHERE table_name = 'keel_fail_blog' AND column_name = 'Score'",
            &[],
        )
        .unwrap();
    assert!(score.is_empty());

    cleanup_tables(&mut client, prefix);
}
