use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;

/// Unified raw column names, in output order. Every source maps onto these.
pub const UNIFIED_COLUMNS: [&str; 10] = [
    "OrderID",
    "OrderDate",
    "ShippedDate",
    "CustomerID",
    "CompanyName",
    "EmployeeID",
    "EmployeeName",
    "ShipCity",
    "ShipCountry",
    "Source",
];

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// One order as extracted from a source, before any cleansing.
///
/// Dates and names are kept as the source delivered them. `extra` holds
/// source-specific columns outside the unified schema; a column missing from
/// a row's source reads as `None`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawOrder {
    pub source: String,
    pub order_id: i64,
    pub order_date: Option<String>,
    pub shipped_date: Option<String>,
    pub customer_id: Option<String>,
    pub company_name: Option<String>,
    pub employee_id: Option<i64>,
    pub employee_name: Option<String>,
    pub ship_city: Option<String>,
    pub ship_country: Option<String>,
    pub extra: BTreeMap<String, Option<String>>,
}

impl RawOrder {
    /// Value of a non-unified column. Absent columns read as null.
    pub fn extra_value(&self, column: &str) -> Option<&str> {
        self.extra.get(column).and_then(|v| v.as_deref())
    }
}

/// Rows returned by one source reader, tagged with the source's provenance.
#[derive(Debug, Clone, Default)]
pub struct RowSet {
    pub source: String,
    /// Unified columns followed by the source's extra columns.
    pub columns: Vec<String>,
    pub rows: Vec<RawOrder>,
    /// Rows the reader dropped because they had no usable order id.
    pub skipped: usize,
}

impl RowSet {
    pub fn empty(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            columns: Vec::new(),
            rows: Vec::new(),
            skipped: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Row-wise union of several row sets.
#[derive(Debug, Clone, Default)]
pub struct MergedRows {
    /// Union of all columns seen in any input, first-seen order.
    pub columns: Vec<String>,
    pub rows: Vec<RawOrder>,
    /// Row count contributed by each source, in input order.
    pub per_source: Vec<(String, usize)>,
}

impl MergedRows {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Order ids seen more than once, ascending. Reported, never removed.
    pub fn duplicate_order_ids(&self) -> Vec<i64> {
        let mut seen = BTreeMap::<i64, usize>::new();
        for row in &self.rows {
            *seen.entry(row.order_id).or_default() += 1;
        }
        seen.into_iter().filter(|&(_, n)| n > 1).map(|(id, _)| id).collect()
    }
}

// ---------------------------------------------------------------------------
// Fact
// ---------------------------------------------------------------------------

/// Delivery KPI. A pure function of shipped-date presence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum DeliveryStatus {
    Delivered,
    NotDelivered,
}

impl DeliveryStatus {
    pub fn from_shipped(shipped: Option<NaiveDateTime>) -> Self {
        match shipped {
            Some(_) => Self::Delivered,
            None => Self::NotDelivered,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Delivered => "Delivered",
            Self::NotDelivered => "NotDelivered",
        }
    }
}

impl std::fmt::Display for DeliveryStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One cleansed order. Denormalized so reporting can aggregate by customer,
/// employee, month and year without joining the dimensions.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FactOrder {
    #[serde(rename = "OrderID")]
    pub order_id: i64,
    #[serde(rename = "OrderDate")]
    pub order_date: Option<NaiveDateTime>,
    #[serde(rename = "ShippedDate")]
    pub shipped_date: Option<NaiveDateTime>,
    #[serde(rename = "CustomerID")]
    pub customer_id: Option<String>,
    #[serde(rename = "CompanyName")]
    pub company_name: String,
    #[serde(rename = "EmployeeID")]
    pub employee_id: Option<i64>,
    #[serde(rename = "EmployeeName")]
    pub employee_name: String,
    #[serde(rename = "ShipCity")]
    pub ship_city: String,
    #[serde(rename = "ShipCountry")]
    pub ship_country: String,
    #[serde(rename = "Source")]
    pub source: String,
    #[serde(rename = "Status_Livraison")]
    pub status: DeliveryStatus,
    #[serde(rename = "Year")]
    pub year: Option<i32>,
    #[serde(rename = "Month")]
    pub month: Option<u32>,
    #[serde(rename = "YearMonth")]
    pub year_month: Option<String>,
    #[serde(rename = "Quarter")]
    pub quarter: Option<u32>,
}

// ---------------------------------------------------------------------------
// Dimensions
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DateRow {
    /// Surrogate key, `YYYYMMDD`.
    pub date_key: i32,
    pub date: NaiveDate,
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub quarter: u32,
    pub year_month: String,
    pub month_name: String,
    pub weekday_name: String,
    pub iso_week: u32,
    pub day_of_year: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmployeeRow {
    pub employee_id: Option<i64>,
    pub employee_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CustomerRow {
    pub customer_id: Option<String>,
    pub company_name: String,
    pub ship_city: String,
    pub ship_country: String,
}

// ---------------------------------------------------------------------------
// Output bundle
// ---------------------------------------------------------------------------

/// Fact table plus its conformed dimensions, handed as one unit to the loader.
///
/// A dimension is `None` when it could not be built for this run (e.g. no
/// parseable date anywhere means no date dimension).
#[derive(Debug, Clone, Default)]
pub struct StarSchema {
    pub fact: Vec<FactOrder>,
    pub dim_date: Option<Vec<DateRow>>,
    pub dim_employee: Option<Vec<EmployeeRow>>,
    pub dim_customer: Option<Vec<CustomerRow>>,
}

impl StarSchema {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.fact.is_empty()
    }
}
