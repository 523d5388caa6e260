use serde::{Deserialize, Serialize};

use sellerpay_core::{DomainError, DomainResult, Money, Rate, ValueObject};

use crate::commission::{CommissionBreakdown, SellerType, calculate_commission};

/// Apportionment of a promotional discount's cost among the three parties.
/// Percentages are whole percent and must sum to 100.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostSharing {
    pub platform_pct: u8,
    pub seller_pct: u8,
    pub customer_pct: u8,
}

impl CostSharing {
    pub fn validate(&self) -> DomainResult<()> {
        let sum = self.platform_pct as u16 + self.seller_pct as u16 + self.customer_pct as u16;
        if sum != 100 {
            return Err(DomainError::invariant(format!(
                "cost sharing percentages must sum to 100, got {sum}"
            )));
        }
        Ok(())
    }
}

impl ValueObject for CostSharing {}

/// The discount split into per-party cost buckets.
///
/// Buckets always sum exactly to the discount and are never negative: seller
/// and customer shares are rounded half up, the platform absorbs the rounding
/// remainder, and any overshoot is pulled back from the larger rounded bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoyaltyCostBreakdown {
    pub platform_cost: Money,
    pub seller_cost: Money,
    pub customer_cost: Money,
}

impl LoyaltyCostBreakdown {
    fn split(discount: Money, sharing: &CostSharing) -> DomainResult<Self> {
        let mut seller_cost = discount.percent_share(sharing.seller_pct);
        let mut customer_cost = discount.percent_share(sharing.customer_pct);
        let mut platform_cost = discount
            .checked_sub(seller_cost)
            .and_then(|rest| rest.checked_sub(customer_cost))
            .ok_or_else(|| DomainError::invariant("loyalty cost split overflow"))?;

        // Half-up rounding of the two shares can overshoot the discount by one
        // minor unit, which would leave the platform with a negative cost.
        // Pull the overshoot back from the larger rounded bucket; that bucket
        // is at least one minor unit whenever an overshoot occurred.
        if platform_cost.minor() < 0 {
            let deficit = Money::from_minor(-platform_cost.minor());
            let target = if seller_cost >= customer_cost {
                &mut seller_cost
            } else {
                &mut customer_cost
            };
            *target = target
                .checked_sub(deficit)
                .ok_or_else(|| DomainError::invariant("loyalty cost split overflow"))?;
            platform_cost = Money::ZERO;
        }

        Ok(Self {
            platform_cost,
            seller_cost,
            customer_cost,
        })
    }

    pub fn total(&self) -> Money {
        self.platform_cost
            .saturating_add(self.seller_cost)
            .saturating_add(self.customer_cost)
    }
}

impl ValueObject for LoyaltyCostBreakdown {}

/// Everything needed to settle one order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementInput {
    pub order_amount: Money,
    pub seller_type: SellerType,
    pub custom_commission_rate: Option<Rate>,
    pub tax_rate: Option<Rate>,
    /// Promotional discount applied to the order, if any.
    pub loyalty_discount: Option<Money>,
    /// How the discount's cost is shared. Ignored unless a positive
    /// `loyalty_discount` is present.
    pub loyalty_cost_sharing: Option<CostSharing>,
}

impl SettlementInput {
    /// Plain settlement with default rates and no loyalty adjustment.
    pub fn new(order_amount: Money, seller_type: SellerType) -> Self {
        Self {
            order_amount,
            seller_type,
            custom_commission_rate: None,
            tax_rate: None,
            loyalty_discount: None,
            loyalty_cost_sharing: None,
        }
    }
}

/// Immutable settlement outcome for one order, derived entirely from input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementResult {
    pub gross_amount: Money,
    pub commission_amount: Money,
    pub tax_amount: Money,
    /// Seller payout after commission, tax, and the seller's loyalty share.
    pub net_amount: Money,
    pub commission_rate: Rate,
    pub tax_rate: Rate,
    pub loyalty_cost: Option<LoyaltyCostBreakdown>,
    pub breakdown: CommissionBreakdown,
}

impl ValueObject for SettlementResult {}

/// Settle a single order: commission math plus the loyalty cost-sharing
/// adjustment.
pub fn calculate_settlement(input: &SettlementInput) -> DomainResult<SettlementResult> {
    let breakdown = calculate_commission(
        input.order_amount,
        input.seller_type,
        input.custom_commission_rate,
        input.tax_rate,
    )?;

    let mut net_amount = breakdown.seller_amount;
    let mut loyalty_cost = None;

    if let Some(discount) = input.loyalty_discount {
        if discount.minor() < 0 {
            return Err(DomainError::invariant("loyalty discount must not be negative"));
        }
        if discount.is_positive() {
            if let Some(sharing) = &input.loyalty_cost_sharing {
                sharing.validate()?;
                let split = LoyaltyCostBreakdown::split(discount, sharing)?;
                net_amount = net_amount
                    .checked_sub(split.seller_cost)
                    .ok_or_else(|| DomainError::invariant("net amount overflow"))?;
                loyalty_cost = Some(split);
            }
        }
    }

    Ok(SettlementResult {
        gross_amount: input.order_amount,
        commission_amount: breakdown.commission_amount,
        tax_amount: breakdown.tax_amount,
        net_amount,
        commission_rate: breakdown.commission_rate,
        tax_rate: breakdown.tax_rate,
        loyalty_cost,
        breakdown,
    })
}

/// Settle a batch of orders. Orders are independent; the first failing order
/// aborts the batch (a bad order amount is an integration bug upstream).
pub fn calculate_settlement_for_orders(
    inputs: &[SettlementInput],
) -> DomainResult<Vec<SettlementResult>> {
    inputs.iter().map(calculate_settlement).collect()
}
