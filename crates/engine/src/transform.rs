use chrono::Datelike;

use crate::dates::{date_dimension, parse_datetime, quarter, year_month};
use crate::dimensions::{customer_dimension, employee_dimension};
use crate::model::{DeliveryStatus, FactOrder, MergedRows, RawOrder, StarSchema};
use crate::normalize::normalize_text;

/// Turn merged raw rows into the fact table and its dimensions.
///
/// Steps run in a fixed order: dates are parsed first, the date dimension is
/// built from the parsed dates, then the KPI, text cleansing, and finally the
/// employee/customer dimensions over the cleansed text. Empty input yields an
/// empty schema with no dimensions.
pub fn transform(merged: &MergedRows) -> StarSchema {
    if merged.is_empty() {
        tracing::warn!("empty row set, nothing to transform");
        return StarSchema::empty();
    }

    // 1. Dates
    let parsed: Vec<_> = merged
        .rows
        .iter()
        .map(|r| {
            (
                parse_datetime(r.order_date.as_deref()),
                parse_datetime(r.shipped_date.as_deref()),
            )
        })
        .collect();

    // 2. Calendar over every valid order and shipped date
    let dim_date = date_dimension(
        parsed
            .iter()
            .flat_map(|(ordered, shipped)| [*ordered, *shipped])
            .flatten(),
    );
    if dim_date.is_none() {
        tracing::warn!("no valid order or shipped date, date dimension skipped");
    }

    // 3 + 4. KPI and text cleansing
    let fact: Vec<FactOrder> = merged
        .rows
        .iter()
        .zip(parsed)
        .map(|(raw, (order_date, shipped_date))| fact_row(raw, order_date, shipped_date))
        .collect();

    // 5. Natural-key dimensions
    let dim_employee = employee_dimension(&fact);
    let dim_customer = customer_dimension(&fact);

    let unparsed_orders = fact.iter().filter(|f| f.order_date.is_none()).count();
    if unparsed_orders > 0 {
        tracing::warn!(rows = unparsed_orders, "order dates missing or unparseable");
    }
    tracing::info!(
        fact = fact.len(),
        dates = dim_date.as_ref().map_or(0, Vec::len),
        employees = dim_employee.len(),
        customers = dim_customer.len(),
        "transform complete"
    );

    StarSchema {
        fact,
        dim_date,
        dim_employee: Some(dim_employee),
        dim_customer: Some(dim_customer),
    }
}

fn fact_row(
    raw: &RawOrder,
    order_date: Option<chrono::NaiveDateTime>,
    shipped_date: Option<chrono::NaiveDateTime>,
) -> FactOrder {
    let day = order_date.map(|dt| dt.date());
    FactOrder {
        order_id: raw.order_id,
        order_date,
        shipped_date,
        customer_id: raw.customer_id.as_ref().map(|id| id.trim().to_string()),
        company_name: normalize_text(raw.company_name.as_deref()),
        employee_id: raw.employee_id,
        employee_name: normalize_text(raw.employee_name.as_deref()),
        ship_city: normalize_text(raw.ship_city.as_deref()),
        ship_country: normalize_text(raw.ship_country.as_deref()),
        source: raw.source.clone(),
        status: DeliveryStatus::from_shipped(shipped_date),
        year: day.map(|d| d.year()),
        month: day.map(|d| d.month()),
        year_month: day.map(year_month),
        quarter: day.map(|d| quarter(d.month())),
    }
}
