//! `ordermart-engine`: merge, cleanse and model order records as a star schema.
//!
//! Pure engine crate: receives pre-extracted row sets, returns the fact table
//! and its dimensions. No database or file IO.

pub mod dates;
pub mod dimensions;
pub mod merge;
pub mod model;
pub mod normalize;
pub mod summary;
pub mod transform;

pub use merge::merge;
pub use model::{
    CustomerRow, DateRow, DeliveryStatus, EmployeeRow, FactOrder, MergedRows, RawOrder, RowSet,
    StarSchema,
};
pub use summary::{summarize, DeliverySummary};
pub use transform::transform;
