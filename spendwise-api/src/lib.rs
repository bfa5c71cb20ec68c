//! spendwise-api: HTTP client for the SpendWise backend services.

pub mod client;
pub mod encode;

pub use client::{GroupTotals, MonthlySummary, SpendwiseClient, TransactionRecord};
pub use encode::{import_query, side_channel_fields};
