use std::collections::BTreeMap;

use serde::Serialize;

use crate::model::{DeliveryStatus, FactOrder};

/// Headline delivery KPI over a fact table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeliverySummary {
    pub total: usize,
    pub delivered: usize,
    pub not_delivered: usize,
    /// Percentage of delivered orders, 0 when there are no orders.
    pub delivery_rate: f64,
    pub by_source: BTreeMap<String, usize>,
}

pub fn summarize(fact: &[FactOrder]) -> DeliverySummary {
    let mut delivered = 0;
    let mut by_source: BTreeMap<String, usize> = BTreeMap::new();

    for f in fact {
        if f.status == DeliveryStatus::Delivered {
            delivered += 1;
        }
        *by_source.entry(f.source.clone()).or_insert(0) += 1;
    }

    let total = fact.len();
    let delivery_rate = if total > 0 {
        delivered as f64 / total as f64 * 100.0
    } else {
        0.0
    };

    DeliverySummary {
        total,
        delivered,
        not_delivered: total - delivered,
        delivery_rate,
        by_source,
    }
}
