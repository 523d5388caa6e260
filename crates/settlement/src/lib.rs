//! Settlement domain module.
//!
//! This crate contains the financial core of the marketplace: commission
//! deduction, per-order settlement with loyalty cost sharing, and
//! settlement-run validation and aggregation. Everything here is pure,
//! deterministic domain logic (no IO, no HTTP, no storage) — identical input
//! always yields identical output, which the audit trail depends on.

pub mod commission;
pub mod run;
pub mod settlement;

pub use commission::{CommissionBreakdown, SellerType, calculate_commission, DEFAULT_TAX_RATE};
pub use run::{
    SellerSettlementSummary, SettlementRunInput, SettlementRunSummary, run_summary,
    seller_summary, validate_settlement_run_input, validate_settlement_run_input_at,
};
pub use settlement::{
    CostSharing, LoyaltyCostBreakdown, SettlementInput, SettlementResult, calculate_settlement,
    calculate_settlement_for_orders,
};
