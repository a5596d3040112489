// Source B: file-backed order database with space-containing column names

use ordermart_config::FileTarget;
use ordermart_engine::model::RowSet;

use crate::source::{extra_columns, open_read_only, read_orders, require_tables, with_extras, OrderSource, SourceError};

pub const FILE_TAG: &str = "Access";

// Bracketed names map the file's own schema onto the unified one.
const SELECT: &str = r#"
SELECT
    o.[Order ID] AS OrderID,
    o.[Order Date] AS OrderDate,
    o.[Shipped Date] AS ShippedDate,
    o.[Customer ID] AS CustomerID,
    c.Company AS CompanyName,
    o.[Employee ID] AS EmployeeID,
    e.[First Name] || ' ' || e.[Last Name] AS EmployeeName,
    o.[Ship City] AS ShipCity,
    o.[Ship Country/Region] AS ShipCountry"#;

const FROM: &str = r#"
FROM Orders o
LEFT JOIN Customers c ON o.[Customer ID] = c.ID
LEFT JOIN Employees e ON o.[Employee ID] = e.ID
"#;

const MAPPED: &[&str] = &[
    "Order ID",
    "Order Date",
    "Shipped Date",
    "Customer ID",
    "Employee ID",
    "Ship City",
    "Ship Country/Region",
];

pub struct FileSource {
    target: FileTarget,
}

impl FileSource {
    pub fn new(target: FileTarget) -> Self {
        Self { target }
    }
}

impl OrderSource for FileSource {
    fn tag(&self) -> &str {
        FILE_TAG
    }

    fn fetch(&self) -> Result<RowSet, SourceError> {
        tracing::info!(path = %self.target.path.display(), "connecting to source B");
        let conn = open_read_only(FILE_TAG, &self.target.path)?;
        require_tables(FILE_TAG, &conn, &["Orders", "Customers", "Employees"])?;

        let extras = extra_columns(FILE_TAG, &conn, "Orders", MAPPED)?;
        let sql = with_extras(SELECT, FROM, &extras);
        read_orders(FILE_TAG, &conn, &sql, extras)
    }
}
