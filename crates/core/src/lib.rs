//! `sellerpay-core` — domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns):
//! typed identifiers, fixed-point money, errors, and validation reporting.

pub mod error;
pub mod id;
pub mod money;
pub mod validation;
pub mod value_object;

pub use error::{DomainError, DomainResult};
pub use id::{OrderId, SellerId, SettlementRunId, TenantId};
pub use money::{Money, Rate};
pub use validation::ValidationReport;
pub use value_object::ValueObject;
