use serde::{Deserialize, Serialize};

use sellerpay_core::{DomainError, DomainResult, Money, Rate, ValueObject};

/// Default tax rate applied to the platform commission (not the gross).
pub const DEFAULT_TAX_RATE: Rate = Rate::from_percent(18);

/// Seller classification. Drives the default commission rate and the
/// direction of invoicing (see the invoicing crate).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SellerType {
    /// Company-registered seller (tax-registered).
    Company,
    /// Individual seller without tax registration.
    Individual,
}

impl SellerType {
    /// Default commission rate when no custom rate is negotiated.
    pub const fn default_commission_rate(self) -> Rate {
        match self {
            SellerType::Company => Rate::from_percent(10),
            SellerType::Individual => Rate::from_percent(15),
        }
    }
}

/// Division of one order's gross amount between platform and seller.
///
/// Invariant: `commission_amount + tax_amount + seller_amount` equals the
/// gross amount exactly — the seller amount is computed by subtraction, so
/// rounding can never create or destroy a minor unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommissionBreakdown {
    pub commission_amount: Money,
    pub tax_amount: Money,
    pub seller_amount: Money,
    pub commission_rate: Rate,
    pub tax_rate: Rate,
}

impl ValueObject for CommissionBreakdown {}

/// Compute the platform commission, tax on that commission, and the seller
/// payout for one order.
///
/// Commission and tax are platform-side deductions: the seller receives
/// `gross − commission − tax`. A non-positive order amount is a caller bug,
/// not recoverable user input, and fails immediately.
pub fn calculate_commission(
    order_amount: Money,
    seller_type: SellerType,
    custom_commission_rate: Option<Rate>,
    tax_rate: Option<Rate>,
) -> DomainResult<CommissionBreakdown> {
    if !order_amount.is_positive() {
        return Err(DomainError::invariant("order amount must be positive"));
    }

    let commission_rate = custom_commission_rate.unwrap_or(seller_type.default_commission_rate());
    let tax_rate = tax_rate.unwrap_or(DEFAULT_TAX_RATE);

    let commission_amount = order_amount.apply_rate(commission_rate);
    let tax_amount = commission_amount.apply_rate(tax_rate);

    let deductions = commission_amount
        .checked_add(tax_amount)
        .ok_or_else(|| DomainError::invariant("commission deductions overflow"))?;
    let seller_amount = order_amount
        .checked_sub(deductions)
        .ok_or_else(|| DomainError::invariant("seller amount overflow"))?;

    Ok(CommissionBreakdown {
        commission_amount,
        tax_amount,
        seller_amount,
        commission_rate,
        tax_rate,
    })
}
