//! Settlement runs: input validation and pure summary reductions.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use sellerpay_core::{Money, SellerId, TenantId, ValidationReport};

use crate::settlement::SettlementResult;

/// Longest period one run may cover.
const MAX_PERIOD_DAYS: i64 = 90;
/// How far into the future a run may start.
const MAX_FUTURE_START_DAYS: i64 = 30;

/// Configuration for one settlement run over a tenant's orders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementRunInput {
    pub tenant_id: Option<TenantId>,
    pub period_start: DateTime<Utc>,
    pub period_end: DateTime<Utc>,
}

/// Validate run configuration against the current time.
pub fn validate_settlement_run_input(input: &SettlementRunInput) -> ValidationReport {
    validate_settlement_run_input_at(input, Utc::now())
}

/// Validate run configuration against an explicit `now` (deterministic in
/// tests). Collects every violation; never short-circuits or panics — this
/// feeds a configuration form that shows all problems at once.
pub fn validate_settlement_run_input_at(
    input: &SettlementRunInput,
    now: DateTime<Utc>,
) -> ValidationReport {
    let mut report = ValidationReport::new();

    if input.tenant_id.is_none() {
        report.push("Tenant id is required");
    }

    if input.period_start >= input.period_end {
        report.push("Period start must be before period end");
    } else if input.period_end - input.period_start > Duration::days(MAX_PERIOD_DAYS) {
        report.push(format!("Settlement period cannot exceed {MAX_PERIOD_DAYS} days"));
    }

    if input.period_start > now + Duration::days(MAX_FUTURE_START_DAYS) {
        report.push(format!(
            "Period cannot start more than {MAX_FUTURE_START_DAYS} days in the future"
        ));
    }

    report
}

/// Aggregated settlement totals for one seller within a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SellerSettlementSummary {
    pub seller_id: SellerId,
    pub order_count: u64,
    pub gross_total: Money,
    pub commission_total: Money,
    pub tax_total: Money,
    pub net_total: Money,
    pub average_order_amount: Money,
}

/// Reduce per-order results into a seller summary. Empty input yields an
/// all-zero summary.
pub fn seller_summary(seller_id: SellerId, results: &[SettlementResult]) -> SellerSettlementSummary {
    let mut gross_total = Money::ZERO;
    let mut commission_total = Money::ZERO;
    let mut tax_total = Money::ZERO;
    let mut net_total = Money::ZERO;

    for result in results {
        gross_total = gross_total.saturating_add(result.gross_amount);
        commission_total = commission_total.saturating_add(result.commission_amount);
        tax_total = tax_total.saturating_add(result.tax_amount);
        net_total = net_total.saturating_add(result.net_amount);
    }

    let order_count = results.len() as u64;
    SellerSettlementSummary {
        seller_id,
        order_count,
        gross_total,
        commission_total,
        tax_total,
        net_total,
        average_order_amount: gross_total.div_round(order_count),
    }
}

/// Aggregated totals for one settlement run across all sellers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementRunSummary {
    pub seller_count: u64,
    pub order_count: u64,
    pub gross_total: Money,
    pub commission_total: Money,
    pub tax_total: Money,
    pub net_total: Money,
    pub average_net_per_seller: Money,
}

impl SettlementRunSummary {
    pub fn zero() -> Self {
        Self {
            seller_count: 0,
            order_count: 0,
            gross_total: Money::ZERO,
            commission_total: Money::ZERO,
            tax_total: Money::ZERO,
            net_total: Money::ZERO,
            average_net_per_seller: Money::ZERO,
        }
    }
}

/// Reduce seller summaries into a run summary. Empty input yields the zero
/// summary, not an error.
pub fn run_summary(sellers: &[SellerSettlementSummary]) -> SettlementRunSummary {
    let mut summary = SettlementRunSummary::zero();

    for seller in sellers {
        summary.seller_count += 1;
        summary.order_count += seller.order_count;
        summary.gross_total = summary.gross_total.saturating_add(seller.gross_total);
        summary.commission_total = summary.commission_total.saturating_add(seller.commission_total);
        summary.tax_total = summary.tax_total.saturating_add(seller.tax_total);
        summary.net_total = summary.net_total.saturating_add(seller.net_total);
    }

    summary.average_net_per_seller = summary.net_total.div_round(summary.seller_count);
    summary
}
