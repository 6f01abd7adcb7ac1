mod helpers;

use unimem::db;
use unimem::db::migrations::{
    get_embedding_model, get_schema_version, run_migrations, set_embedding_model,
    CURRENT_SCHEMA_VERSION,
};

#[test]
fn fresh_db_migrates_to_current_version() {
    let conn = helpers::test_db();
    assert_eq!(get_schema_version(&conn).unwrap(), CURRENT_SCHEMA_VERSION);
}

#[test]
fn migration_records_embedding_model() {
    let conn = helpers::test_db();
    let model = get_embedding_model(&conn).unwrap();
    assert_eq!(model, Some("text-embedding-3-small".to_string()));
}

#[test]
fn manual_v1_db_upgrades_without_losing_rows() {
    // A v1 database with diary rows that has never been migrated
    db::load_sqlite_vec();
    let conn = rusqlite::Connection::open_in_memory().unwrap();
    db::schema::init_schema(&conn).unwrap();
    conn.execute(
        "INSERT INTO decisions (id, decision_text, created_at) VALUES ('d1', 'Ship on Monday', '2024-01-01T00:00:00Z')",
        [],
    )
    .unwrap();

    assert_eq!(get_schema_version(&conn).unwrap(), 1);
    assert!(get_embedding_model(&conn).unwrap().is_none());

    run_migrations(&conn).unwrap();

    assert_eq!(get_schema_version(&conn).unwrap(), CURRENT_SCHEMA_VERSION);
    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM decisions", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 1);

    let indexes: Vec<String> = conn
        .prepare("SELECT name FROM sqlite_master WHERE type='index' AND name LIKE 'idx_%' ORDER BY name")
        .unwrap()
        .query_map([], |row| row.get(0))
        .unwrap()
        .collect::<Result<Vec<_>, _>>()
        .unwrap();
    assert!(indexes.contains(&"idx_summaries_created".to_string()));
    assert!(indexes.contains(&"idx_decisions_created".to_string()));
}

#[test]
fn reopening_on_disk_db_keeps_version() {
    let tmp = tempfile::TempDir::new().unwrap();
    let db_path = tmp.path().join("memory.db");

    drop(db::open_database(&db_path).unwrap());
    let conn = db::open_database(&db_path).unwrap();

    assert_eq!(get_schema_version(&conn).unwrap(), CURRENT_SCHEMA_VERSION);
}

#[test]
fn running_migrations_twice_is_a_no_op() {
    let conn = helpers::test_db();
    run_migrations(&conn).unwrap();
    assert_eq!(get_schema_version(&conn).unwrap(), CURRENT_SCHEMA_VERSION);
}

#[test]
fn recorded_model_can_be_replaced() {
    let conn = helpers::test_db();
    set_embedding_model(&conn, "text-embedding-3-large").unwrap();
    assert_eq!(
        get_embedding_model(&conn).unwrap(),
        Some("text-embedding-3-large".to_string())
    );

    // a later migration run must not reset it
    run_migrations(&conn).unwrap();
    assert_eq!(
        get_embedding_model(&conn).unwrap().as_deref(),
        Some("text-embedding-3-large")
    );
}
