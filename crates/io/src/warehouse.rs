// Warehouse loader: full-refresh persistence of the star schema

use chrono::NaiveDateTime;
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection};
use serde::Serialize;

use ordermart_config::ServerTarget;
use ordermart_engine::model::{CustomerRow, DateRow, EmployeeRow, FactOrder, StarSchema};

pub const FACT_TABLE: &str = "DWH_Global_Analysis";
pub const DATE_TABLE: &str = "DWH_Dim_Date";
pub const EMPLOYEE_TABLE: &str = "DWH_Dim_Employee";
pub const CUSTOMER_TABLE: &str = "DWH_Dim_Customer";

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("cannot connect to warehouse {target}: {source}")]
    Connect {
        target: String,
        #[source]
        source: rusqlite::Error,
    },
    #[error("write to {table} failed: {source}")]
    Write {
        table: &'static str,
        #[source]
        source: rusqlite::Error,
    },
    #[error("verification of {table} failed: {source}")]
    Verify {
        table: &'static str,
        #[source]
        source: rusqlite::Error,
    },
}

// ---------------------------------------------------------------------------
// Load state + report
// ---------------------------------------------------------------------------

/// Progress of one load. `Failed` is terminal and only reached from
/// `Connecting` or `WritingFact`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadStage {
    Idle,
    Connecting,
    WritingFact,
    WritingDate,
    WritingEmployee,
    WritingCustomer,
    Verifying,
    Done,
    Failed,
}

#[derive(Debug, Clone, Serialize)]
pub struct TableLoad {
    pub table: &'static str,
    /// Rows inserted, `None` when the write failed.
    pub rows_written: Option<usize>,
    /// Row count read back after the writes, `None` when not verified.
    pub rows_verified: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TableLoad {
    /// Written and read back with the same count.
    pub fn is_verified(&self) -> bool {
        matches!((self.rows_written, self.rows_verified), (Some(w), Some(v)) if w as i64 == v)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LoadReport {
    /// True iff the fact table was written. Dimension and verification
    /// problems never flip this.
    pub success: bool,
    pub stage: LoadStage,
    pub tables: Vec<TableLoad>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl LoadReport {
    fn new() -> Self {
        Self {
            success: false,
            stage: LoadStage::Idle,
            tables: Vec::new(),
            error: None,
        }
    }

    fn advance(&mut self, stage: LoadStage) {
        tracing::debug!(from = ?self.stage, to = ?stage, "load stage");
        self.stage = stage;
    }

    fn fail(mut self, err: LoadError) -> Self {
        tracing::error!(error = %err, "warehouse load failed");
        self.error = Some(err.to_string());
        self.advance(LoadStage::Failed);
        self
    }

    pub fn table(&self, name: &str) -> Option<&TableLoad> {
        self.tables.iter().find(|t| t.table == name)
    }
}

/// Persists a star schema. Every table present in the bundle replaces any
/// previous table of the same name; a dimension absent from the bundle has
/// its previous table dropped so no stale dimension outlives the fact table.
pub trait Warehouse {
    fn load(&mut self, star: &StarSchema) -> LoadReport;
}

// ---------------------------------------------------------------------------
// Row mapping
// ---------------------------------------------------------------------------

/// A row type with a fixed warehouse table.
trait TableRow {
    const TABLE: &'static str;
    /// (column name, SQLite type)
    const COLUMNS: &'static [(&'static str, &'static str)];

    fn values(&self) -> Vec<Value>;
}

fn int<T: Into<i64>>(v: T) -> Value {
    Value::Integer(v.into())
}

fn opt_int<T: Into<i64>>(v: Option<T>) -> Value {
    v.map_or(Value::Null, int)
}

fn txt(v: &str) -> Value {
    Value::Text(v.to_string())
}

fn opt_txt(v: Option<&str>) -> Value {
    v.map_or(Value::Null, txt)
}

fn timestamp(v: Option<NaiveDateTime>) -> Value {
    v.map_or(Value::Null, |dt| Value::Text(dt.format(TIMESTAMP_FORMAT).to_string()))
}

impl TableRow for FactOrder {
    const TABLE: &'static str = FACT_TABLE;
    const COLUMNS: &'static [(&'static str, &'static str)] = &[
        ("OrderID", "INTEGER NOT NULL"),
        ("OrderDate", "TEXT"),
        ("ShippedDate", "TEXT"),
        ("CustomerID", "TEXT"),
        ("CompanyName", "TEXT NOT NULL"),
        ("EmployeeID", "INTEGER"),
        ("EmployeeName", "TEXT NOT NULL"),
        ("ShipCity", "TEXT NOT NULL"),
        ("ShipCountry", "TEXT NOT NULL"),
        ("Source", "TEXT NOT NULL"),
        ("Status_Livraison", "TEXT NOT NULL"),
        ("Year", "INTEGER"),
        ("Month", "INTEGER"),
        ("YearMonth", "TEXT"),
        ("Quarter", "INTEGER"),
    ];

    fn values(&self) -> Vec<Value> {
        vec![
            int(self.order_id),
            timestamp(self.order_date),
            timestamp(self.shipped_date),
            opt_txt(self.customer_id.as_deref()),
            txt(&self.company_name),
            opt_int(self.employee_id),
            txt(&self.employee_name),
            txt(&self.ship_city),
            txt(&self.ship_country),
            txt(&self.source),
            txt(self.status.as_str()),
            opt_int(self.year),
            opt_int(self.month),
            opt_txt(self.year_month.as_deref()),
            opt_int(self.quarter),
        ]
    }
}

impl TableRow for DateRow {
    const TABLE: &'static str = DATE_TABLE;
    const COLUMNS: &'static [(&'static str, &'static str)] = &[
        ("DateKey", "INTEGER PRIMARY KEY"),
        ("Date", "TEXT NOT NULL"),
        ("Year", "INTEGER NOT NULL"),
        ("Month", "INTEGER NOT NULL"),
        ("Day", "INTEGER NOT NULL"),
        ("Quarter", "INTEGER NOT NULL"),
        ("YearMonth", "TEXT NOT NULL"),
        ("MonthName", "TEXT NOT NULL"),
        ("WeekdayName", "TEXT NOT NULL"),
        ("IsoWeek", "INTEGER NOT NULL"),
        ("DayOfYear", "INTEGER NOT NULL"),
    ];

    fn values(&self) -> Vec<Value> {
        vec![
            int(self.date_key),
            Value::Text(self.date.format("%Y-%m-%d").to_string()),
            int(self.year),
            int(self.month),
            int(self.day),
            int(self.quarter),
            txt(&self.year_month),
            txt(&self.month_name),
            txt(&self.weekday_name),
            int(self.iso_week),
            int(self.day_of_year),
        ]
    }
}

impl TableRow for EmployeeRow {
    const TABLE: &'static str = EMPLOYEE_TABLE;
    const COLUMNS: &'static [(&'static str, &'static str)] =
        &[("EmployeeID", "INTEGER UNIQUE"), ("EmployeeName", "TEXT NOT NULL")];

    fn values(&self) -> Vec<Value> {
        vec![opt_int(self.employee_id), txt(&self.employee_name)]
    }
}

impl TableRow for CustomerRow {
    const TABLE: &'static str = CUSTOMER_TABLE;
    const COLUMNS: &'static [(&'static str, &'static str)] = &[
        ("CustomerID", "TEXT UNIQUE"),
        ("CompanyName", "TEXT NOT NULL"),
        ("ShipCity", "TEXT NOT NULL"),
        ("ShipCountry", "TEXT NOT NULL"),
    ];

    fn values(&self) -> Vec<Value> {
        vec![
            opt_txt(self.customer_id.as_deref()),
            txt(&self.company_name),
            txt(&self.ship_city),
            txt(&self.ship_country),
        ]
    }
}

// ---------------------------------------------------------------------------
// SQLite warehouse
// ---------------------------------------------------------------------------

pub struct SqliteWarehouse {
    target: ServerTarget,
}

impl SqliteWarehouse {
    pub fn new(target: ServerTarget) -> Self {
        Self { target }
    }

    fn connect(&self) -> Result<Connection, LoadError> {
        let path = self.target.db_path();
        tracing::info!(warehouse = %self.target.label(), "connecting to warehouse");
        Connection::open(&path).map_err(|source| LoadError::Connect {
            target: path.display().to_string(),
            source,
        })
    }
}

impl Warehouse for SqliteWarehouse {
    fn load(&mut self, star: &StarSchema) -> LoadReport {
        let mut report = LoadReport::new();

        report.advance(LoadStage::Connecting);
        let mut conn = match self.connect() {
            Ok(conn) => conn,
            Err(e) => return report.fail(e),
        };

        report.advance(LoadStage::WritingFact);
        match write_table(&mut conn, &star.fact) {
            Ok(n) => report.tables.push(written(FACT_TABLE, n)),
            Err(e) => return report.fail(e),
        }

        match &star.dim_date {
            Some(rows) => {
                report.advance(LoadStage::WritingDate);
                report.tables.push(write_dimension(&mut conn, rows));
            }
            None => drop_absent(&conn, DATE_TABLE),
        }
        match &star.dim_employee {
            Some(rows) => {
                report.advance(LoadStage::WritingEmployee);
                report.tables.push(write_dimension(&mut conn, rows));
            }
            None => drop_absent(&conn, EMPLOYEE_TABLE),
        }
        match &star.dim_customer {
            Some(rows) => {
                report.advance(LoadStage::WritingCustomer);
                report.tables.push(write_dimension(&mut conn, rows));
            }
            None => drop_absent(&conn, CUSTOMER_TABLE),
        }

        report.advance(LoadStage::Verifying);
        for table in report.tables.iter_mut().filter(|t| t.rows_written.is_some()) {
            verify(&conn, table);
        }

        report.success = true;
        report.advance(LoadStage::Done);
        report
    }
}

fn written(table: &'static str, rows: usize) -> TableLoad {
    tracing::info!(table, rows, "table replaced");
    TableLoad {
        table,
        rows_written: Some(rows),
        rows_verified: None,
        error: None,
    }
}

/// Remove a previous run's table for a dimension not built this run.
/// Failures are logged only.
fn drop_absent(conn: &Connection, table: &'static str) {
    match conn.execute_batch(&format!("DROP TABLE IF EXISTS {};", quote(table))) {
        Ok(()) => tracing::info!(table, "dimension absent, previous table dropped"),
        Err(e) => tracing::warn!(table, error = %e, "could not drop absent dimension table"),
    }
}

/// Dimension writes log and continue on failure.
fn write_dimension<R: TableRow>(conn: &mut Connection, rows: &[R]) -> TableLoad {
    match write_table(conn, rows) {
        Ok(n) => written(R::TABLE, n),
        Err(e) => {
            tracing::error!(table = R::TABLE, error = %e, "dimension write failed, continuing");
            TableLoad {
                table: R::TABLE,
                rows_written: None,
                rows_verified: None,
                error: Some(e.to_string()),
            }
        }
    }
}

/// Drop, recreate and fill one table inside a single transaction. On error
/// the transaction rolls back and the previous table survives.
fn write_table<R: TableRow>(conn: &mut Connection, rows: &[R]) -> Result<usize, LoadError> {
    let fail = |source| LoadError::Write { table: R::TABLE, source };

    let table = quote(R::TABLE);
    let columns: Vec<String> = R::COLUMNS
        .iter()
        .map(|(name, ty)| format!("{} {ty}", quote(name)))
        .collect();
    let names: Vec<String> = R::COLUMNS.iter().map(|(name, _)| quote(name)).collect();
    let placeholders: Vec<String> = (1..=R::COLUMNS.len()).map(|i| format!("?{i}")).collect();

    let tx = conn.transaction().map_err(fail)?;
    tx.execute_batch(&format!(
        "DROP TABLE IF EXISTS {table};\nCREATE TABLE {table} ({});",
        columns.join(", ")
    ))
    .map_err(fail)?;
    {
        let mut stmt = tx
            .prepare(&format!(
                "INSERT INTO {table} ({}) VALUES ({})",
                names.join(", "),
                placeholders.join(", ")
            ))
            .map_err(fail)?;
        for row in rows {
            stmt.execute(params_from_iter(row.values())).map_err(fail)?;
        }
    }
    tx.commit().map_err(fail)?;
    Ok(rows.len())
}

/// Count rows back. Mismatches and read errors are logged only.
fn verify(conn: &Connection, table: &mut TableLoad) {
    let counted = conn
        .query_row(&format!("SELECT COUNT(*) FROM {}", quote(table.table)), [], |row| {
            row.get::<_, i64>(0)
        })
        .map_err(|source| LoadError::Verify { table: table.table, source });

    match counted {
        Ok(count) => {
            table.rows_verified = Some(count);
            if table.is_verified() {
                tracing::info!(table = table.table, rows = count, "verified");
            } else {
                tracing::warn!(
                    table = table.table,
                    written = ?table.rows_written,
                    counted = count,
                    "row count mismatch after write"
                );
            }
        }
        Err(e) => {
            tracing::warn!(table = table.table, error = %e, "verification read failed");
            table.error = Some(e.to_string());
        }
    }
}

fn quote(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}
