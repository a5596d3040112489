// Denormalized fact export for reporting consumers

use std::io::Write;

use ordermart_engine::model::FactOrder;

pub const FACT_HEADER: &[&str] = &[
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
    "Status_Livraison",
    "Year",
    "Month",
    "YearMonth",
    "Quarter",
];

/// Write the fact table as CSV, in fact order. Missing values are empty cells.
/// Returns the number of data rows written.
pub fn write_fact_csv(fact: &[FactOrder], writer: impl Write) -> Result<usize, csv::Error> {
    let mut csv = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(writer);

    csv.write_record(FACT_HEADER)?;

    let ts = |dt: Option<chrono::NaiveDateTime>| {
        dt.map(|d| d.format("%Y-%m-%d %H:%M:%S").to_string()).unwrap_or_default()
    };
    let num = |n: Option<i64>| n.map(|n| n.to_string()).unwrap_or_default();

    for f in fact {
        let record: [String; 15] = [
            f.order_id.to_string(),
            ts(f.order_date),
            ts(f.shipped_date),
            f.customer_id.clone().unwrap_or_default(),
            f.company_name.clone(),
            num(f.employee_id),
            f.employee_name.clone(),
            f.ship_city.clone(),
            f.ship_country.clone(),
            f.source.clone(),
            f.status.as_str().to_string(),
            num(f.year.map(i64::from)),
            num(f.month.map(i64::from)),
            f.year_month.clone().unwrap_or_default(),
            num(f.quarter.map(i64::from)),
        ];
        csv.write_record(&record)?;
    }

    csv.flush()?;
    Ok(fact.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use ordermart_engine::model::DeliveryStatus;

    #[test]
    fn writes_header_and_rows() {
        let fact = vec![FactOrder {
            order_id: 10248,
            order_date: NaiveDate::from_ymd_opt(1996, 7, 4).and_then(|d| d.and_hms_opt(0, 0, 0)),
            shipped_date: None,
            customer_id: Some("VINET".into()),
            company_name: "VINS ET ALCOOLS CHEVALIER".into(),
            employee_id: Some(5),
            employee_name: "STEVEN BUCHANAN".into(),
            ship_city: "REIMS".into(),
            ship_country: "FRANCE".into(),
            source: "SQL_Server".into(),
            status: DeliveryStatus::NotDelivered,
            year: Some(1996),
            month: Some(7),
            year_month: Some("1996-07".into()),
            quarter: Some(3),
        }];

        let mut out = Vec::new();
        let n = write_fact_csv(&fact, &mut out).unwrap();
        assert_eq!(n, 1);

        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("OrderID,OrderDate,ShippedDate"));
        assert_eq!(
            lines[1],
            "10248,1996-07-04 00:00:00,,VINET,VINS ET ALCOOLS CHEVALIER,5,STEVEN BUCHANAN,REIMS,FRANCE,SQL_Server,NotDelivered,1996,7,1996-07,3"
        );
    }

    #[test]
    fn empty_fact_writes_header_only() {
        let mut out = Vec::new();
        assert_eq!(write_fact_csv(&[], &mut out).unwrap(), 0);
        assert_eq!(String::from_utf8(out).unwrap().lines().count(), 1);
    }
}
