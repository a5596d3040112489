use crate::model::{MergedRows, RowSet};

/// Concatenate row sets into one, keeping every column seen in any input.
///
/// Rows are never deduplicated: the same order id arriving from two sources
/// stays as two rows. Empty inputs contribute no rows and no columns.
pub fn merge(sets: Vec<RowSet>) -> MergedRows {
    let mut merged = MergedRows::default();

    for set in sets {
        for column in &set.columns {
            if !merged.columns.iter().any(|c| c == column) {
                merged.columns.push(column.clone());
            }
        }
        tracing::info!(source = %set.source, rows = set.len(), "merging row set");
        merged.per_source.push((set.source, set.rows.len()));
        merged.rows.extend(set.rows);
    }

    if merged.is_empty() {
        tracing::warn!("no rows extracted from any source");
    } else {
        tracing::info!(rows = merged.len(), columns = merged.columns.len(), "merge complete");
    }

    merged
}
