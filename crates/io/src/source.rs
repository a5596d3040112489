// Shared plumbing for order source readers

use std::collections::BTreeMap;
use std::path::Path;

use rusqlite::types::ValueRef;
use rusqlite::{Connection, OpenFlags};

use ordermart_engine::model::{RawOrder, RowSet, UNIFIED_COLUMNS};

/// Number of unified columns a source query selects before its extras
/// (every unified column except the provenance tag).
const SELECTED_UNIFIED: usize = UNIFIED_COLUMNS.len() - 1;

#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// The store cannot be reached or lacks the expected tables.
    #[error("{tag}: source unavailable: {reason}")]
    Unavailable { tag: String, reason: String },
    /// The store was reached but the extraction query failed.
    #[error("{tag}: query failed: {reason}")]
    QueryFailed { tag: String, reason: String },
}

impl SourceError {
    pub fn unavailable(tag: &str, reason: impl Into<String>) -> Self {
        Self::Unavailable { tag: tag.into(), reason: reason.into() }
    }

    pub fn query_failed(tag: &str, reason: impl Into<String>) -> Self {
        Self::QueryFailed { tag: tag.into(), reason: reason.into() }
    }
}

/// An operational store that yields order rows in the unified raw schema.
///
/// Implementations open one connection per `fetch` and release it before
/// returning, on success and failure alike.
pub trait OrderSource {
    /// Provenance label stamped on every row.
    fn tag(&self) -> &str;

    fn fetch(&self) -> Result<RowSet, SourceError>;
}

/// Rows from one source, plus the reason they are empty when extraction failed.
#[derive(Debug)]
pub struct Extraction {
    pub rows: RowSet,
    pub error: Option<SourceError>,
}

/// Run a source and never fail: errors become an empty row set.
pub fn extract(source: &dyn OrderSource) -> Extraction {
    match source.fetch() {
        Ok(rows) => {
            tracing::info!(source = source.tag(), rows = rows.len(), skipped = rows.skipped, "extracted");
            Extraction { rows, error: None }
        }
        Err(e) => {
            tracing::warn!(source = source.tag(), error = %e, "extraction failed, continuing with no rows");
            Extraction {
                rows: RowSet::empty(source.tag()),
                error: Some(e),
            }
        }
    }
}

// ---------------------------------------------------------------------------
// SQLite helpers
// ---------------------------------------------------------------------------

/// Open an existing database read-only. A missing file is unavailability,
/// never an empty database created on the fly.
pub(crate) fn open_read_only(tag: &str, path: &Path) -> Result<Connection, SourceError> {
    if !path.exists() {
        return Err(SourceError::unavailable(tag, format!("file not found: {}", path.display())));
    }
    Connection::open_with_flags(path, OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX)
        .map_err(|e| SourceError::unavailable(tag, format!("cannot open {}: {e}", path.display())))
}

/// Fail with `Unavailable` unless every table exists.
pub(crate) fn require_tables(tag: &str, conn: &Connection, tables: &[&str]) -> Result<(), SourceError> {
    for table in tables {
        let found: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type IN ('table', 'view') AND name = ?1",
                [*table],
                |row| row.get(0),
            )
            .map_err(|e| SourceError::unavailable(tag, e.to_string()))?;
        if found == 0 {
            return Err(SourceError::unavailable(tag, format!("missing table {table}")));
        }
    }
    Ok(())
}

/// Columns of `table` not covered by `mapped`, in declaration order.
pub(crate) fn extra_columns(
    tag: &str,
    conn: &Connection,
    table: &str,
    mapped: &[&str],
) -> Result<Vec<String>, SourceError> {
    let mut stmt = conn
        .prepare(&format!("PRAGMA table_info({})", quote_ident(table)))
        .map_err(|e| SourceError::query_failed(tag, e.to_string()))?;
    let names = stmt
        .query_map([], |row| row.get::<_, String>(1))
        .map_err(|e| SourceError::query_failed(tag, e.to_string()))?;

    let mut extras = Vec::new();
    for name in names {
        let name = name.map_err(|e| SourceError::query_failed(tag, e.to_string()))?;
        if !mapped.iter().any(|m| m.eq_ignore_ascii_case(&name)) {
            extras.push(name);
        }
    }
    Ok(extras)
}

pub(crate) fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Append `, o."<col>"` for each extra column to a base select list.
pub(crate) fn with_extras(base_select: &str, from_clause: &str, extras: &[String]) -> String {
    let mut sql = String::from(base_select.trim_end());
    for col in extras {
        sql.push_str(",\n    o.");
        sql.push_str(&quote_ident(col));
    }
    sql.push('\n');
    sql.push_str(from_clause.trim());
    sql
}

/// Run a query whose first columns are, in order: order id, order date,
/// shipped date, customer id, company name, employee id, employee name,
/// ship city, ship country; followed by `extras`.
///
/// Rows without an integer order id are dropped and counted in `skipped`.
pub(crate) fn read_orders(
    tag: &str,
    conn: &Connection,
    sql: &str,
    extras: Vec<String>,
) -> Result<RowSet, SourceError> {
    let failed = |e: rusqlite::Error| SourceError::query_failed(tag, e.to_string());

    let mut stmt = conn.prepare(sql).map_err(failed)?;
    let mut rows = stmt.query([]).map_err(failed)?;

    let mut out = Vec::new();
    let mut skipped = 0;
    let mut row_number = 0;
    while let Some(row) = rows.next().map_err(failed)? {
        row_number += 1;
        let value = move |i: usize| row.get_ref(i).map_err(failed);

        let Some(order_id) = integer(value(0)?) else {
            tracing::warn!(source = tag, row = row_number, "order id missing or not an integer, row skipped");
            skipped += 1;
            continue;
        };

        let mut extra = BTreeMap::new();
        for (offset, col) in extras.iter().enumerate() {
            extra.insert(col.clone(), text(value(SELECTED_UNIFIED + offset)?));
        }

        out.push(RawOrder {
            source: tag.to_string(),
            order_id,
            order_date: text(value(1)?),
            shipped_date: text(value(2)?),
            customer_id: text(value(3)?),
            company_name: text(value(4)?),
            employee_id: integer(value(5)?),
            employee_name: text(value(6)?),
            ship_city: text(value(7)?),
            ship_country: text(value(8)?),
            extra,
        });
    }

    let mut columns: Vec<String> = UNIFIED_COLUMNS.iter().map(|c| c.to_string()).collect();
    columns.extend(extras);

    Ok(RowSet {
        source: tag.to_string(),
        columns,
        rows: out,
        skipped,
    })
}

/// Any storage class rendered as text. NULL stays `None`.
fn text(value: ValueRef<'_>) -> Option<String> {
    match value {
        ValueRef::Null => None,
        ValueRef::Integer(i) => Some(i.to_string()),
        ValueRef::Real(f) => Some(f.to_string()),
        ValueRef::Text(b) | ValueRef::Blob(b) => Some(String::from_utf8_lossy(b).into_owned()),
    }
}

/// Integer ids may arrive as integers, whole reals, or numeric text.
fn integer(value: ValueRef<'_>) -> Option<i64> {
    match value {
        ValueRef::Integer(i) => Some(i),
        ValueRef::Real(f) if f.fract() == 0.0 => Some(f as i64),
        ValueRef::Text(b) => std::str::from_utf8(b).ok()?.trim().parse().ok(),
        _ => None,
    }
}
