// Source A: relational order store reached through an instance + database

use ordermart_config::ServerTarget;
use ordermart_engine::model::RowSet;

use crate::source::{extra_columns, open_read_only, read_orders, require_tables, with_extras, OrderSource, SourceError};

pub const SERVER_TAG: &str = "SQL_Server";

const SELECT: &str = r#"
SELECT
    o.OrderID,
    o.OrderDate,
    o.ShippedDate,
    o.CustomerID,
    c.CompanyName,
    o.EmployeeID,
    e.FirstName || ' ' || e.LastName AS EmployeeName,
    o.ShipCity,
    o.ShipCountry"#;

const FROM: &str = r#"
FROM Orders o
LEFT JOIN Customers c ON o.CustomerID = c.CustomerID
LEFT JOIN Employees e ON o.EmployeeID = e.EmployeeID
"#;

/// Orders columns already mapped onto the unified schema.
const MAPPED: &[&str] = &["OrderID", "OrderDate", "ShippedDate", "CustomerID", "EmployeeID", "ShipCity", "ShipCountry"];

pub struct ServerSource {
    target: ServerTarget,
}

impl ServerSource {
    pub fn new(target: ServerTarget) -> Self {
        Self { target }
    }
}

impl OrderSource for ServerSource {
    fn tag(&self) -> &str {
        SERVER_TAG
    }

    fn fetch(&self) -> Result<RowSet, SourceError> {
        tracing::info!(instance = %self.target.label(), "connecting to source A");
        let conn = open_read_only(SERVER_TAG, &self.target.db_path())?;
        require_tables(SERVER_TAG, &conn, &["Orders", "Customers", "Employees"])?;

        let extras = extra_columns(SERVER_TAG, &conn, "Orders", MAPPED)?;
        let sql = with_extras(SELECT, FROM, &extras);
        read_orders(SERVER_TAG, &conn, &sql, extras)
    }
}
