use std::collections::HashSet;

use crate::model::{CustomerRow, EmployeeRow, FactOrder};

/// One row per employee id, first occurrence wins. Expects normalized facts.
///
/// A missing id is treated as a key of its own, so at most one such row exists.
pub fn employee_dimension(fact: &[FactOrder]) -> Vec<EmployeeRow> {
    let mut seen: HashSet<Option<i64>> = HashSet::new();
    fact.iter()
        .filter(|f| seen.insert(f.employee_id))
        .map(|f| EmployeeRow {
            employee_id: f.employee_id,
            employee_name: f.employee_name.clone(),
        })
        .collect()
}

/// One row per customer id, first occurrence wins. Expects normalized facts.
pub fn customer_dimension(fact: &[FactOrder]) -> Vec<CustomerRow> {
    let mut seen: HashSet<Option<&str>> = HashSet::new();
    fact.iter()
        .filter(|f| seen.insert(f.customer_id.as_deref()))
        .map(|f| CustomerRow {
            customer_id: f.customer_id.clone(),
            company_name: f.company_name.clone(),
            ship_city: f.ship_city.clone(),
            ship_country: f.ship_country.clone(),
        })
        .collect()
}
