//! Destination tests: DDL rendering, embedded DuckDB, mocked ClickHouse

use super::*;
use crate::config::AppConfig;
use crate::flatten::{Cell, FlatRow};
use crate::output::rows_to_batch;
use crate::schema::{infer_schema, Column, ColumnType, TableSchema};
use pretty_assertions::assert_eq;
use wiremock::matchers::{body_string, header, method, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn schema() -> TableSchema {
    let mut schema = TableSchema::new();
    schema.push(Column::new("id", ColumnType::String));
    schema.push(Column::new("amount", ColumnType::Float64));
    schema.push(Column::new("count", ColumnType::Int64));
    schema
}

fn rows() -> Vec<FlatRow> {
    let mut a = FlatRow::new("a1");
    a.insert("amount", Cell::Text("1.5".into()));
    a.insert("count", Cell::Text("3".into()));
    a.insert("name", Cell::Text("Alpha".into()));

    let mut b = FlatRow::new("b2");
    b.insert("amount", Cell::Null);
    b.insert("name", Cell::Null);

    vec![a, b]
}

// ============================================================================
// DDL
// ============================================================================

#[test]
fn test_clickhouse_ddl() {
    let dialect = Dialect::ClickHouse;
    assert_eq!(dialect.drop_table("deals"), "DROP TABLE IF EXISTS `deals`");
    assert_eq!(
        dialect.create_table("deals", &schema()),
        "CREATE TABLE `deals` (`id` String, `amount` Nullable(Float64), `count` Nullable(Int64)) \
         ENGINE = MergeTree() ORDER BY tuple()"
    );
}

#[test]
fn test_duckdb_ddl() {
    let dialect = Dialect::DuckDb;
    assert_eq!(dialect.drop_table("deals"), "DROP TABLE IF EXISTS \"deals\"");
    assert_eq!(
        dialect.create_table("deals", &schema()),
        "CREATE TABLE \"deals\" (\"id\" VARCHAR, \"amount\" DOUBLE, \"count\" BIGINT)"
    );
}

#[test]
fn test_empty_schema_uses_placeholder() {
    assert_eq!(
        Dialect::ClickHouse.create_table("t", &TableSchema::new()),
        "CREATE TABLE `t` (`_dummy` String) ENGINE = MergeTree() ORDER BY tuple()"
    );
    assert_eq!(
        Dialect::DuckDb.create_table("t", &TableSchema::new()),
        "CREATE TABLE \"t\" (\"_dummy\" VARCHAR)"
    );
}

#[test]
fn test_identifier_quoting() {
    assert_eq!(Dialect::ClickHouse.quote("we`ird"), "`weird`");
    assert_eq!(Dialect::DuckDb.quote("we\"ird"), "\"we\"\"ird\"");
}

#[test]
fn test_backtick_column_matches_arrow_field() {
    let mut schema = TableSchema::new();
    schema.push(Column::new("id", ColumnType::String));
    schema.push(Column::new("deal`stage", ColumnType::String));

    let ddl = Dialect::ClickHouse.create_table("deals", &schema);
    assert!(ddl.contains("`dealstage` String"));

    // ArrowStream inserts match columns by name
    let batch = rows_to_batch(&[FlatRow::new("d1")], &schema).unwrap();
    let names: Vec<String> = batch
        .schema()
        .fields()
        .iter()
        .map(|f| Dialect::ClickHouse.quote(f.name()))
        .collect();
    for name in &names {
        assert!(ddl.contains(name.as_str()), "{name} missing from {ddl}");
    }
    assert_eq!(names, vec!["`id`", "`dealstage`"]);
}

// ============================================================================
// DuckDB
// ============================================================================

#[tokio::test]
async fn test_duckdb_recreate_and_insert() {
    let factory = DuckDbFactory::open(None).unwrap();
    let rows = rows();
    let schema = infer_schema(&rows);
    let batch = rows_to_batch(&rows, &schema).unwrap();

    let mut dest = factory.connect().await.unwrap();
    assert_eq!(dest.kind(), "duckdb");
    dest.ping().await.unwrap();
    dest.recreate_table("companies", &schema).await.unwrap();
    assert_eq!(dest.insert_batch("companies", &batch).await.unwrap(), 2);
    dest.close().await.unwrap();

    // A second connection sees the same database
    let conn = factory.clone_connection().unwrap();
    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM companies", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 2);

    let name: String = conn
        .query_row("SELECT name FROM companies WHERE id = 'b2'", [], |row| row.get(0))
        .unwrap();
    assert_eq!(name, "");

    let amount: Option<f64> = conn
        .query_row("SELECT amount FROM companies WHERE id = 'b2'", [], |row| row.get(0))
        .unwrap();
    assert_eq!(amount, None);
}

#[tokio::test]
async fn test_duckdb_backtick_column_loads() {
    let factory = DuckDbFactory::open(None).unwrap();
    let mut row = FlatRow::new("d1");
    row.insert("deal`stage", Cell::Text("won".into()));
    let rows = vec![row];
    let schema = infer_schema(&rows);
    let batch = rows_to_batch(&rows, &schema).unwrap();

    let mut dest = factory.connect().await.unwrap();
    dest.recreate_table("deals", &schema).await.unwrap();
    assert_eq!(dest.insert_batch("deals", &batch).await.unwrap(), 1);
    dest.close().await.unwrap();

    let conn = factory.clone_connection().unwrap();
    let stage: String = conn
        .query_row("SELECT \"deal`stage\" FROM deals", [], |row| row.get(0))
        .unwrap();
    assert_eq!(stage, "won");
}

#[tokio::test]
async fn test_duckdb_recreate_replaces_table() {
    let factory = DuckDbFactory::open(None).unwrap();
    let rows = rows();
    let schema = infer_schema(&rows);
    let batch = rows_to_batch(&rows, &schema).unwrap();

    let mut dest = factory.connect().await.unwrap();
    dest.recreate_table("deals", &schema).await.unwrap();
    dest.insert_batch("deals", &batch).await.unwrap();
    dest.recreate_table("deals", &schema).await.unwrap();
    dest.insert_batch("deals", &batch).await.unwrap();
    dest.close().await.unwrap();

    let conn = factory.clone_connection().unwrap();
    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM deals", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 2);
}

#[tokio::test]
async fn test_duckdb_closed_handle_fails() {
    let factory = DuckDbFactory::open(None).unwrap();
    let mut dest = factory.connect().await.unwrap();
    dest.close().await.unwrap();
    assert!(dest.ping().await.is_err());
    // Closing twice is harmless
    dest.close().await.unwrap();
}

#[test]
fn test_batch_rows_values() {
    let rows = rows();
    let batch = rows_to_batch(&rows, &infer_schema(&rows)).unwrap();
    let values = batch_rows(&batch).unwrap();

    assert_eq!(values.len(), 2);
    assert_eq!(values[0][0], duckdb::types::Value::Text("a1".into()));
    assert_eq!(values[0][1], duckdb::types::Value::Double(1.5));
    assert_eq!(values[0][2], duckdb::types::Value::BigInt(3));
    assert_eq!(values[1][2], duckdb::types::Value::Null);
    assert_eq!(values[1][3], duckdb::types::Value::Text(String::new()));
}

// ============================================================================
// ClickHouse
// ============================================================================

fn clickhouse_config(server: &MockServer) -> crate::config::DestinationConfig {
    let mut config = AppConfig::default().destination;
    config.host = server.uri();
    config.user = "loader".to_string();
    config.password = "secret".to_string();
    config.database = "crm".to_string();
    config
}

#[tokio::test]
async fn test_clickhouse_ping() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(query_param("database", "crm"))
        .and(header("X-ClickHouse-User", "loader"))
        .and(header("X-ClickHouse-Key", "secret"))
        .and(body_string("SELECT 1"))
        .respond_with(ResponseTemplate::new(200).set_body_string("1\n"))
        .expect(1)
        .mount(&server)
        .await;

    let factory = ClickHouseFactory::new(clickhouse_config(&server));
    let mut dest = factory.connect().await.unwrap();
    assert_eq!(dest.kind(), "clickhouse");
    dest.ping().await.unwrap();
}

#[tokio::test]
async fn test_clickhouse_recreate_and_insert() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_string("DROP TABLE IF EXISTS `contacts`"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(body_string(
            "CREATE TABLE `contacts` (`id` String, `amount` Nullable(Float64), \
             `count` Nullable(Int64)) ENGINE = MergeTree() ORDER BY tuple()",
        ))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let batch = rows_to_batch(&rows(), &schema()).unwrap();
    let encoded = encode_arrow_stream(&batch).unwrap();
    Mock::given(method("POST"))
        .and(query_param("query", "INSERT INTO `contacts` FORMAT ArrowStream"))
        .and(wiremock::matchers::body_bytes(encoded))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let mut dest = ClickHouseDestination::connect(&clickhouse_config(&server)).unwrap();
    dest.recreate_table("contacts", &schema()).await.unwrap();
    assert_eq!(dest.insert_batch("contacts", &batch).await.unwrap(), 2);
    dest.close().await.unwrap();
    assert!(dest.ping().await.is_err());
}

#[tokio::test]
async fn test_clickhouse_error_surfaces() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("Code: 60. Table missing"))
        .expect(1)
        .mount(&server)
        .await;

    let mut dest = ClickHouseDestination::connect(&clickhouse_config(&server)).unwrap();
    let err = dest
        .recreate_table("contacts", &schema())
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(500));
}

#[test]
fn test_factory_for_kind() {
    let mut config = AppConfig::default().destination;
    config.kind = crate::types::DestinationKind::Duckdb;
    assert!(factory_for(&config).is_ok());
}
