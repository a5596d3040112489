mod common;

use std::path::PathBuf;

use common::{create_db, FILE_DATA, FILE_SCHEMA, SERVER_DATA, SERVER_SCHEMA};
use ordermart_config::{FileTarget, ServerTarget};
use ordermart_io::file_source::FILE_TAG;
use ordermart_io::server_source::SERVER_TAG;
use ordermart_io::{extract, FileSource, OrderSource, ServerSource, SourceError};

fn server(dir: &std::path::Path) -> ServerSource {
    ServerSource::new(ServerTarget {
        instance: dir.to_path_buf(),
        database: "Northwind".into(),
    })
}

// -------------------------------------------------------------------------
// Source A
// -------------------------------------------------------------------------

#[test]
fn server_source_reads_joined_orders() {
    let dir = tempfile::tempdir().unwrap();
    create_db(&dir.path().join("Northwind.db"), SERVER_SCHEMA, SERVER_DATA);

    let rows = server(dir.path()).fetch().unwrap();
    assert_eq!(rows.source, SERVER_TAG);
    assert_eq!(rows.len(), 4);
    assert!(rows.rows.iter().all(|r| r.source == SERVER_TAG));

    let first = &rows.rows[0];
    assert_eq!(first.order_id, 10248);
    assert_eq!(first.order_date.as_deref(), Some("1996-07-04 00:00:00"));
    assert_eq!(first.customer_id.as_deref(), Some("VINET"));
    assert_eq!(first.company_name.as_deref(), Some("Vins et alcools Chevalier"));
    assert_eq!(first.employee_id, Some(5));
    assert_eq!(first.employee_name.as_deref(), Some("Steven Buchanan"));
    assert_eq!(first.ship_city.as_deref(), Some("Reims"));

    // Unmatched employee join yields a null name, not a failure.
    let orphan = rows.rows.iter().find(|r| r.order_id == 10251).unwrap();
    assert_eq!(orphan.employee_id, Some(99));
    assert_eq!(orphan.employee_name, None);
    assert_eq!(orphan.ship_country, None);
}

#[test]
fn server_source_carries_extra_columns() {
    let dir = tempfile::tempdir().unwrap();
    create_db(&dir.path().join("Northwind.db"), SERVER_SCHEMA, SERVER_DATA);

    let rows = server(dir.path()).fetch().unwrap();
    assert_eq!(rows.columns.last().map(String::as_str), Some("Freight"));
    assert_eq!(rows.rows[0].extra_value("Freight"), Some("32.38"));
}

#[test]
fn missing_database_is_unavailable() {
    let dir = tempfile::tempdir().unwrap();
    let err = server(dir.path()).fetch().unwrap_err();
    assert!(matches!(err, SourceError::Unavailable { .. }), "got {err}");
    assert!(!dir.path().join("Northwind.db").exists(), "reader must not create the database");
}

#[test]
fn missing_table_is_unavailable() {
    let dir = tempfile::tempdir().unwrap();
    create_db(
        &dir.path().join("Northwind.db"),
        "CREATE TABLE Orders (OrderID INTEGER PRIMARY KEY);",
        "",
    );
    let err = server(dir.path()).fetch().unwrap_err();
    match err {
        SourceError::Unavailable { reason, .. } => assert!(reason.contains("Customers")),
        other => panic!("expected Unavailable, got {other}"),
    }
}

#[test]
fn missing_column_is_query_failure() {
    let dir = tempfile::tempdir().unwrap();
    let schema = SERVER_SCHEMA.replace("    ShipCity TEXT,\n", "");
    create_db(&dir.path().join("Northwind.db"), &schema, "");
    let err = server(dir.path()).fetch().unwrap_err();
    assert!(matches!(err, SourceError::QueryFailed { .. }), "got {err}");
}

#[test]
fn rows_without_order_id_are_skipped_not_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let schema = SERVER_SCHEMA.replace("OrderID INTEGER PRIMARY KEY", "OrderID INTEGER");
    let data = format!(
        "{SERVER_DATA}
INSERT INTO Orders VALUES (NULL, 'VINET', 5, '1996-07-09 00:00:00', NULL, 1.0, 'Reims', 'France');
INSERT INTO Orders VALUES ('n/a', 'VINET', 5, '1996-07-10 00:00:00', NULL, 2.0, 'Reims', 'France');"
    );
    create_db(&dir.path().join("Northwind.db"), &schema, &data);

    let extraction = extract(&server(dir.path()));
    assert!(extraction.error.is_none(), "{:?}", extraction.error);
    assert_eq!(extraction.rows.len(), 4);
    assert_eq!(extraction.rows.skipped, 2);
    let mut ids: Vec<i64> = extraction.rows.rows.iter().map(|r| r.order_id).collect();
    ids.sort_unstable();
    assert_eq!(ids, vec![10248, 10249, 10250, 10251]);
}

#[test]
fn extract_turns_failure_into_empty_rows() {
    let dir = tempfile::tempdir().unwrap();
    let extraction = extract(&server(dir.path()));
    assert!(extraction.rows.is_empty());
    assert_eq!(extraction.rows.source, SERVER_TAG);
    assert!(extraction.error.is_some());
}

// -------------------------------------------------------------------------
// Source B
// -------------------------------------------------------------------------

#[test]
fn file_source_maps_bracketed_columns() {
    let dir = tempfile::tempdir().unwrap();
    let path: PathBuf = dir.path().join("Northwind 2012.db");
    create_db(&path, FILE_SCHEMA, FILE_DATA);

    let rows = FileSource::new(FileTarget { path }).fetch().unwrap();
    assert_eq!(rows.source, FILE_TAG);
    assert_eq!(rows.len(), 3);

    let first = &rows.rows[0];
    assert_eq!(first.order_id, 30);
    assert_eq!(first.customer_id.as_deref(), Some("1"));
    assert_eq!(first.company_name.as_deref(), Some("Company A"));
    assert_eq!(first.employee_name.as_deref(), Some("Anne Hellung-Larsen"));
    assert_eq!(first.ship_country.as_deref(), Some("USA"));
    assert_eq!(first.extra_value("Payment Type"), Some("Check"));

    assert_eq!(rows.rows[1].shipped_date, None);
    assert_eq!(rows.rows[1].extra_value("Payment Type"), None);
}

#[test]
fn file_source_missing_file_is_unavailable() {
    let dir = tempfile::tempdir().unwrap();
    let source = FileSource::new(FileTarget { path: dir.path().join("absent.db") });
    let err = source.fetch().unwrap_err();
    assert!(matches!(err, SourceError::Unavailable { .. }));
}

#[test]
fn file_that_is_not_a_database_is_unavailable() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("orders.db");
    std::fs::write(&path, "this is not sqlite").unwrap();
    let err = FileSource::new(FileTarget { path }).fetch().unwrap_err();
    assert!(matches!(err, SourceError::Unavailable { .. }), "got {err}");
}
