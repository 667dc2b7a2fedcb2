//! Integration tests for the schema manager against a scripted connection.

mod common;

use common::{MockConnection, manager};
use oxide_dbal_core::prelude::*;
use oxide_dbal_core::{DriverError, ErrorKind};

fn full_change_set() -> ChangeSet {
    ChangeSet::new()
        .rename_table("newertable")
        .add_field(integer("quota").unsigned())
        .remove_field("file_limit")
        .remove_field("time_limit")
        .change_field(
            "name",
            [FieldAttribute::Length, FieldAttribute::Default],
            text("name").length(20).default_value("gummy"),
        )
        .rename_field("sex", text("gender").length(1).default_value("M"))
}

fn users_table() -> TableDefinition {
    TableDefinition::new("users")
        .field(integer("user_id").unsigned().not_null().default_value(0))
        .field(text("user_name").length(12))
        .field(text("user_password").length(8))
        .field(boolean("subscribed"))
        .field(decimal("quota"))
        .field(float("weight"))
        .field(date("access_date"))
        .field(time("access_time"))
        .field(timestamp("approved"))
        .constraint(ConstraintDefinition::primary(["user_id"]))
        .index(IndexDefinition::new("users_name").field("user_name"))
}

// =============================================================================
// Autoincrement emulation
// =============================================================================

#[tokio::test]
async fn test_autoincrement_seeded_after_existing_max() {
    let conn = MockConnection::new(Backend::Ibase).answer("SELECT MAX(", vec![Value::Integer(7)]);
    let mut m = manager(conn, Backend::Ibase);

    m.make_autoincrement("users", "id", None).await.unwrap();

    let conn = m.connection();
    assert_eq!(conn.queries, ["SELECT MAX(id) FROM users"]);
    assert_eq!(conn.executed[0], "CREATE GENERATOR users_seq");
    // GEN_ID(users_seq, 1) yields 8 on the next insert.
    assert_eq!(conn.executed[1], "SET GENERATOR users_seq TO 7");
    assert!(conn.executed[2].starts_with("CREATE TRIGGER users_AUTOINCREMENT_PK FOR users"));
    assert_eq!(conn.executed[3], "COMMIT");
    assert_eq!(conn.transactions, ["BEGIN", "COMMIT"]);
}

#[tokio::test]
async fn test_autoincrement_seed_reads_text_max() {
    let conn = MockConnection::new(Backend::Oci8).answer("SELECT MAX(", vec![Value::Text("41".into())]);
    let mut m = manager(conn, Backend::Oci8);

    m.make_autoincrement("orders", "id", None).await.unwrap();

    assert_eq!(
        m.connection().executed[0],
        "CREATE SEQUENCE orders_seq START WITH 42 INCREMENT BY 1"
    );
}

#[tokio::test]
async fn test_autoincrement_on_empty_table_starts_at_one() {
    let conn = MockConnection::new(Backend::Oci8).answer("SELECT MAX(", vec![Value::Null]);
    let mut m = manager(conn, Backend::Oci8);

    m.make_autoincrement("orders", "id", None).await.unwrap();

    assert_eq!(
        m.connection().executed[0],
        "CREATE SEQUENCE orders_seq START WITH 1 INCREMENT BY 1"
    );
}

#[tokio::test]
async fn test_autoincrement_respects_caller_transaction() {
    let conn = MockConnection::new(Backend::Ibase).answer("SELECT MAX(", vec![Value::Integer(2)]);
    let mut m = manager(conn, Backend::Ibase);
    m.connection_mut().begin_transaction().await.unwrap();

    m.make_autoincrement("users", "id", None).await.unwrap();

    let conn = m.connection();
    assert_eq!(conn.transactions, ["BEGIN"]);
    assert!(conn.in_transaction());
    assert!(!conn.executed.iter().any(|s| s == "COMMIT"));
}

#[tokio::test]
async fn test_failed_seed_rolls_back_and_skips_trigger() {
    let conn = MockConnection::new(Backend::Ibase)
        .answer("SELECT MAX(", vec![Value::Integer(7)])
        .fail_on("SET GENERATOR", DriverError::message("lock conflict on no wait transaction"));
    let mut m = manager(conn, Backend::Ibase);

    let err = m.make_autoincrement("users", "id", None).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Backend);
    let conn = m.connection();
    assert_eq!(conn.transactions, ["BEGIN", "ROLLBACK"]);
    assert!(conn.executed.iter().any(|s| s == "DROP GENERATOR users_seq"));
    assert!(!conn.executed.iter().any(|s| s.starts_with("CREATE TRIGGER")));
}

#[tokio::test]
async fn test_autoincrement_at_integer_ceiling_issues_no_ddl() {
    let conn = MockConnection::new(Backend::Oci8).answer("SELECT MAX(", vec![Value::Integer(i64::MAX)]);
    let mut m = manager(conn, Backend::Oci8);

    let err = m.make_autoincrement("orders", "id", None).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::InvalidDefinition);
    let conn = m.connection();
    assert!(conn.executed.is_empty());
    assert_eq!(conn.transactions, ["BEGIN", "ROLLBACK"]);
}

#[tokio::test]
async fn test_sequence_start_at_integer_floor_issues_no_ddl() {
    let mut m = manager(MockConnection::new(Backend::Ibase), Backend::Ibase);

    let err = m.create_sequence("orders", i64::MIN).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::InvalidDefinition);
    assert!(m.connection().executed.is_empty());

    m.create_sequence("orders", i64::MIN + 1).await.unwrap();
    assert_eq!(m.connection().executed[0], "CREATE GENERATOR orders_seq");
}

// =============================================================================
// Sequences
// =============================================================================

#[tokio::test]
async fn test_failed_seed_and_failed_cleanup_report_both() {
    let conn = MockConnection::new(Backend::Ibase)
        .fail_on("SET GENERATOR", DriverError::message("lock conflict on no wait transaction"))
        .fail_on("DROP GENERATOR", DriverError::message("object USERS_SEQ is in use"));
    let mut m = manager(conn, Backend::Ibase);

    let err = m.create_sequence("users", 1).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Compound);
    let SchemaError::Compound { original, cleanup } = &err else {
        panic!("expected a compound error, got {err:?}");
    };
    assert_eq!(original.sql(), Some("SET GENERATOR users_seq TO 0"));
    assert_eq!(cleanup.sql(), Some("DROP GENERATOR users_seq"));
    let message = err.to_string();
    assert!(message.contains("lock conflict"));
    assert!(message.contains("is in use"));
    assert_eq!(
        m.connection().executed,
        [
            "CREATE GENERATOR users_seq",
            "COMMIT",
            "SET GENERATOR users_seq TO 0",
            "DROP GENERATOR users_seq",
        ]
    );
}

#[tokio::test]
async fn test_failed_seed_with_clean_drop_returns_original() {
    let conn = MockConnection::new(Backend::Ibase)
        .fail_on("SET GENERATOR", DriverError::message("lock conflict on no wait transaction"));
    let mut m = manager(conn, Backend::Ibase);

    let err = m.create_sequence("users", 5).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Backend);
    assert_eq!(err.sql(), Some("SET GENERATOR users_seq TO 4"));
    assert_eq!(m.connection().executed.last().map(String::as_str), Some("COMMIT"));
}

#[tokio::test]
async fn test_sequence_on_table_emulating_backend() {
    let mut m = manager(MockConnection::new(Backend::Mysql), Backend::Mysql);
    m.create_sequence("orders", 10).await.unwrap();
    m.drop_sequence("orders").await.unwrap();
    assert_eq!(
        m.connection().executed,
        [
            "CREATE TABLE orders_seq (sequence INT NOT NULL AUTO_INCREMENT, PRIMARY KEY (sequence))",
            "INSERT INTO orders_seq (sequence) VALUES (9)",
            "DROP TABLE orders_seq",
        ]
    );
}

// =============================================================================
// Tables
// =============================================================================

#[tokio::test]
async fn test_create_table_every_backend() {
    for backend in Backend::ALL {
        let mut m = manager(MockConnection::new(backend), backend);
        m.create_table(&users_table()).await.unwrap();
        let executed = &m.connection().executed;
        assert!(executed[0].starts_with("CREATE TABLE users (user_id "), "{backend}");
        assert!(executed.iter().any(|s| s.contains("users_name_idx")), "{backend}");
    }
}

#[tokio::test]
async fn test_create_table_postgres_text() {
    let mut m = manager(MockConnection::new(Backend::Pgsql), Backend::Pgsql);
    m.create_table(&users_table()).await.unwrap();
    assert_eq!(
        m.connection().executed,
        [
            "CREATE TABLE users (user_id INT DEFAULT 0 NOT NULL, user_name VARCHAR(12), \
             user_password VARCHAR(8), subscribed BOOLEAN, quota NUMERIC(18,2), \
             weight DOUBLE PRECISION, access_date DATE, access_time TIME, \
             approved TIMESTAMP, PRIMARY KEY (user_id))",
            "CREATE INDEX users_name_idx ON users (user_name)",
        ]
    );
}

#[tokio::test]
async fn test_unsupported_foreign_key_issues_nothing() {
    let table = TableDefinition::new("orders")
        .field(integer("id"))
        .field(integer("user_id"))
        .constraint(ConstraintDefinition::foreign(
            "orders_user",
            ["user_id"],
            ForeignKey::references("users", ["user_id"]).on_update(ForeignKeyAction::Cascade),
        ));
    let mut m = manager(MockConnection::new(Backend::Oci8), Backend::Oci8);

    let err = m.create_table(&table).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::CannotAlter);
    assert!(m.connection().executed.is_empty());
}

#[tokio::test]
async fn test_drop_table_tolerates_missing_trigger() {
    let conn = MockConnection::new(Backend::Ibase).fail_on(
        "DROP TRIGGER",
        DriverError::message("Trigger USERS_AUTOINCREMENT_PK not found"),
    );
    let mut m = manager(conn, Backend::Ibase);

    m.drop_table("users").await.unwrap();

    assert_eq!(
        m.connection().executed,
        [
            "DROP TRIGGER users_AUTOINCREMENT_PK",
            "DROP GENERATOR users_seq",
            "COMMIT",
            "DROP TABLE users",
            "COMMIT",
        ]
    );
}

#[tokio::test]
async fn test_drop_table_aborts_on_other_failures() {
    let conn = MockConnection::new(Backend::Ibase).fail_on(
        "DROP GENERATOR",
        DriverError::message("lock conflict on no wait transaction"),
    );
    let mut m = manager(conn, Backend::Ibase);

    let err = m.drop_table("users").await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Backend);
    assert!(!m.connection().executed.iter().any(|s| s == "DROP TABLE users"));
}

#[tokio::test]
async fn test_explicit_drop_autoincrement_reports_missing_trigger() {
    let conn = MockConnection::new(Backend::Ibase).fail_on(
        "DROP TRIGGER",
        DriverError::message("Trigger USERS_AUTOINCREMENT_PK not found"),
    );
    let mut m = manager(conn, Backend::Ibase);

    let err = m.drop_autoincrement("users").await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn test_driver_errors_are_classified() {
    let conn = MockConnection::new(Backend::Pgsql).fail_on(
        "CREATE TABLE",
        DriverError::new("42P07", "relation \"users\" already exists"),
    );
    let mut m = manager(conn, Backend::Pgsql);

    let err = m.create_table(&users_table()).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::AlreadyExists);
    assert_eq!(err.driver_error().and_then(|e| e.code.as_deref()), Some("42P07"));
    assert_eq!(m.connection().executed.len(), 1);
}

// =============================================================================
// Alter table
// =============================================================================

#[tokio::test]
async fn test_full_alter_table_postgres() {
    let conn = MockConnection::new(Backend::Pgsql).with_table(
        "newtable",
        &["id", "name", "sex", "file_limit", "time_limit"],
    );
    let mut m = manager(conn, Backend::Pgsql);

    let statements = m.alter_table("newtable", &full_change_set(), false).await.unwrap();

    assert_eq!(
        statements,
        [
            "ALTER TABLE newtable ADD quota INT, DROP file_limit, DROP time_limit, \
             ALTER name TYPE VARCHAR(20), ALTER name SET DEFAULT 'gummy'",
            "ALTER TABLE newtable RENAME COLUMN sex TO gender",
            "ALTER TABLE newtable RENAME TO newertable",
        ]
    );
    assert_eq!(
        m.list_table_fields("newertable").await.unwrap(),
        ["id", "name", "gender", "quota"]
    );
}

#[tokio::test]
async fn test_dry_run_leaves_fields_unchanged() {
    let conn = MockConnection::new(Backend::Pgsql).with_table(
        "newtable",
        &["id", "name", "sex", "file_limit", "time_limit"],
    );
    let mut m = manager(conn, Backend::Pgsql);
    let before = m.list_table_fields("newtable").await.unwrap();

    let planned = m.alter_table("newtable", &full_change_set(), true).await.unwrap();

    assert_eq!(planned.len(), 3);
    assert!(m.connection().executed.is_empty());
    assert_eq!(m.list_table_fields("newtable").await.unwrap(), before);
}

#[tokio::test]
async fn test_change_set_order_independence() {
    let table = &["id", "name", "sex", "description"];
    let combined = ChangeSet::new()
        .add_field(integer("quota"))
        .remove_field("description")
        .rename_field("sex", text("gender").length(1));
    let separate = [
        ChangeSet::new().rename_field("sex", text("gender").length(1)),
        ChangeSet::new().remove_field("description"),
        ChangeSet::new().add_field(integer("quota")),
    ];

    let mut one = manager(MockConnection::new(Backend::Pgsql).with_table("t", table), Backend::Pgsql);
    one.alter_table("t", &combined, false).await.unwrap();

    let mut many = manager(MockConnection::new(Backend::Pgsql).with_table("t", table), Backend::Pgsql);
    for changes in &separate {
        many.alter_table("t", changes, false).await.unwrap();
    }

    let mut left = one.list_table_fields("t").await.unwrap();
    let mut right = many.list_table_fields("t").await.unwrap();
    left.sort();
    right.sort();
    assert_eq!(left, right);
    assert_eq!(left, ["gender", "id", "name", "quota"]);
}

#[tokio::test]
async fn test_firebird_rejects_before_issuing_ddl() {
    let mut m = manager(MockConnection::new(Backend::Ibase), Backend::Ibase);

    let err = m.alter_table("newtable", &full_change_set(), false).await.unwrap_err();

    assert!(matches!(err, SchemaError::CannotAlter { ref change, .. } if change == "name"));
    assert!(m.connection().executed.is_empty());
}

#[test]
fn test_firebird_validator_is_deterministic() {
    let m = manager(MockConnection::new(Backend::Ibase), Backend::Ibase);
    let notnull = ChangeSet::new().change_field(
        "name",
        [FieldAttribute::NotNull],
        text("name").length(20).not_null(),
    );
    let length = ChangeSet::new().change_field(
        "name",
        [FieldAttribute::Length],
        text("name").length(20),
    );

    for _ in 0..3 {
        let err = m.check_alter_table("users", &notnull).unwrap_err();
        assert!(matches!(
            err,
            SchemaError::CannotAlter { ref change, .. } if change == "change.name.notnull"
        ));
        assert_eq!(
            m.check_alter_table("users", &length).unwrap(),
            ["ALTER TABLE users ALTER name TYPE VARCHAR(20)"]
        );
    }
    assert!(m.check_alter_table("users", &length).is_ok());
    assert!(m.check_alter_table("users", &notnull).is_err());
}

// =============================================================================
// Listing
// =============================================================================

#[tokio::test]
async fn test_listing_is_idempotent_and_folded() {
    let conn = MockConnection::new(Backend::Pgsql).answer(
        "relkind = 'S'",
        vec![Value::Text("USERS_SEQ".into()), Value::Text(" orders_seq ".into()), Value::Null],
    );
    let mut m = manager(conn, Backend::Pgsql);

    let first = m.list_sequences().await.unwrap();
    let second = m.list_sequences().await.unwrap();

    assert_eq!(first, ["users", "orders"]);
    assert_eq!(first, second);
    assert_eq!(m.connection().queries.len(), 2);
}

#[tokio::test]
async fn test_listing_uppercase_folding() {
    let conn = MockConnection::new(Backend::Oci8).answer(
        "user_indexes",
        vec![Value::Text("users_name_idx".into()), Value::Text("USERS_NAME_IDX".into())],
    );
    let options = ManagerOptions::new(Backend::Oci8).fix_case(CaseFolding::Upper);
    let mut m = SchemaManager::new(conn, options).unwrap();

    assert_eq!(m.list_table_indexes("users").await.unwrap(), ["USERS_NAME"]);
}

#[tokio::test]
async fn test_listing_keeps_case_variants_without_folding() {
    let names = || {
        vec![
            Value::Text("Users".into()),
            Value::Text("users".into()),
            Value::Text("users".into()),
        ]
    };

    let conn = MockConnection::new(Backend::Pgsql).answer("relkind = 'r'", names());
    let options = ManagerOptions::new(Backend::Pgsql).fix_case(CaseFolding::None);
    let mut m = SchemaManager::new(conn, options).unwrap();
    assert_eq!(m.list_tables().await.unwrap(), ["Users", "users"]);

    let conn = MockConnection::new(Backend::Pgsql).answer("relkind = 'r'", names());
    let mut m = manager(conn, Backend::Pgsql);
    assert_eq!(m.list_tables().await.unwrap(), ["users"]);
}

#[tokio::test]
async fn test_sequence_tables_hidden_from_table_listing() {
    let conn = MockConnection::new(Backend::Mysql).answer(
        "information_schema.tables",
        vec![
            Value::Text("users".into()),
            Value::Text("users_seq".into()),
            Value::Text("Orders".into()),
        ],
    );
    let mut m = manager(conn, Backend::Mysql);

    assert_eq!(m.list_tables().await.unwrap(), ["users", "orders"]);
    assert_eq!(m.list_sequences().await.unwrap(), ["users"]);
}

#[tokio::test]
async fn test_unlistable_catalog_is_unsupported() {
    let mut m = manager(MockConnection::new(Backend::Ibase), Backend::Ibase);
    let err = m.list_databases().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnsupportedOperation);
    assert!(m.connection().queries.is_empty());
}
