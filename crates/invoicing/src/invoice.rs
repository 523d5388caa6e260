use serde::{Deserialize, Serialize};

use sellerpay_core::{DomainError, DomainResult, Money, Rate, ValidationReport, ValueObject};
use sellerpay_settlement::SellerType;

use crate::number::generate_invoice_number;

/// Which document is produced for a settled order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvoiceType {
    /// Platform invoices the customer on the seller's behalf.
    Sales,
    /// Seller invoices the platform for the commission service.
    Commission,
}

/// Business policy: company sellers are tax-registered and bill the platform
/// for its commission; the platform issues sales invoices only on behalf of
/// individual sellers without tax registration.
pub fn determine_invoice_type(seller_type: SellerType) -> InvoiceType {
    match seller_type {
        SellerType::Company => InvoiceType::Commission,
        SellerType::Individual => InvoiceType::Sales,
    }
}

/// A legal party on an invoice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceParty {
    pub name: String,
    pub tax_number: Option<String>,
    pub address: String,
}

impl ValueObject for InvoiceParty {}

/// Platform legal/tax identity, sourced from tenant configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyInfo {
    pub name: String,
    pub tax_number: String,
    pub address: String,
}

impl CompanyInfo {
    fn as_party(&self) -> InvoiceParty {
        InvoiceParty {
            name: self.name.clone(),
            tax_number: Some(self.tax_number.clone()),
            address: self.address.clone(),
        }
    }
}

/// Issuer/buyer pair for one invoice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceParties {
    pub issuer: InvoiceParty,
    pub buyer: InvoiceParty,
}

/// Issuer and buyer roles swap with the invoice direction: commission
/// invoices run seller → platform, sales invoices run platform → customer.
/// The customer party is only needed (and required) for sales invoices.
pub fn determine_invoice_parties(
    invoice_type: InvoiceType,
    seller: &InvoiceParty,
    platform: &CompanyInfo,
    customer: Option<&InvoiceParty>,
) -> DomainResult<InvoiceParties> {
    match invoice_type {
        InvoiceType::Commission => Ok(InvoiceParties {
            issuer: seller.clone(),
            buyer: platform.as_party(),
        }),
        InvoiceType::Sales => {
            let customer = customer
                .ok_or_else(|| DomainError::invariant("sales invoice requires a customer party"))?;
            Ok(InvoiceParties {
                issuer: platform.as_party(),
                buyer: customer.clone(),
            })
        }
    }
}

/// An order line as provided by the order pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub description: String,
    pub quantity: i64,
    /// Price per unit in minor units.
    pub unit_price: Money,
}

impl LineItem {
    pub fn total(&self) -> DomainResult<Money> {
        let total = (self.quantity as i128)
            .checked_mul(self.unit_price.minor() as i128)
            .filter(|t| i64::try_from(*t).is_ok())
            .ok_or_else(|| DomainError::invariant("line item total overflow"))?;
        Ok(Money::from_minor(total as i64))
    }
}

/// A transformed invoice line with its computed amounts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceLine {
    pub description: String,
    pub quantity: i64,
    pub unit_price: Money,
    pub net_amount: Money,
    pub tax_amount: Money,
}

/// Everything needed to compose one invoice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceCreationInput {
    pub seller_type: SellerType,
    pub seller: InvoiceParty,
    /// Required for sales invoices (the platform bills the customer).
    pub customer: Option<InvoiceParty>,
    pub items: Vec<LineItem>,
    /// Required for commission invoices; comes from the settlement result.
    pub commission_rate: Option<Rate>,
    pub tax_rate: Rate,
    pub notes: Option<String>,
}

/// The composed invoice, ready for persistence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceCreationResult {
    pub invoice_number: String,
    pub invoice_type: InvoiceType,
    pub issuer: InvoiceParty,
    pub buyer: InvoiceParty,
    pub items: Vec<InvoiceLine>,
    pub subtotal: Money,
    pub tax_amount: Money,
    pub total_amount: Money,
    pub notes: Option<String>,
}

impl ValueObject for InvoiceCreationResult {}

/// Validate invoice creation input, collecting every problem at once.
pub fn validate_invoice_creation_input(input: &InvoiceCreationInput) -> ValidationReport {
    let mut report = ValidationReport::new();

    if input.seller.name.trim().is_empty() {
        report.push("Seller name is required");
    }

    if input.items.is_empty() {
        report.push("Invoice must contain at least one line item");
    }
    for (index, item) in input.items.iter().enumerate() {
        if item.quantity <= 0 {
            report.push(format!("Line {}: quantity must be positive", index + 1));
        }
        if item.unit_price.minor() <= 0 {
            report.push(format!("Line {}: unit price must be positive", index + 1));
        }
    }

    match determine_invoice_type(input.seller_type) {
        InvoiceType::Commission => {
            if input.commission_rate.is_none() {
                report.push("Commission rate is required for commission invoices");
            }
        }
        InvoiceType::Sales => {
            if input.customer.is_none() {
                report.push("Customer is required for sales invoices");
            }
        }
    }

    report
}

/// Transform order lines into invoice lines.
///
/// Sales invoices carry the order lines verbatim with per-line tax.
/// Commission invoices synthesize one commission-service line per order line:
/// the line amount is the order line total at the commission rate, with its
/// own tax on top.
pub fn transform_items_for_invoice(
    invoice_type: InvoiceType,
    items: &[LineItem],
    commission_rate: Option<Rate>,
    tax_rate: Rate,
) -> DomainResult<Vec<InvoiceLine>> {
    let mut lines = Vec::with_capacity(items.len());

    for item in items {
        let item_total = item.total()?;
        let line = match invoice_type {
            InvoiceType::Sales => {
                let tax_amount = item_total.apply_rate(tax_rate);
                InvoiceLine {
                    description: item.description.clone(),
                    quantity: item.quantity,
                    unit_price: item.unit_price,
                    net_amount: item_total,
                    tax_amount,
                }
            }
            InvoiceType::Commission => {
                let rate = commission_rate.ok_or_else(|| {
                    DomainError::invariant("commission invoice requires a commission rate")
                })?;
                let net_amount = item_total.apply_rate(rate);
                InvoiceLine {
                    description: format!("Commission service: {}", item.description),
                    quantity: 1,
                    unit_price: net_amount,
                    net_amount,
                    tax_amount: net_amount.apply_rate(tax_rate),
                }
            }
        };
        lines.push(line);
    }

    Ok(lines)
}

/// Compose invoice data for a settled order.
///
/// Fails with a single `DomainError::Validation` joining every validation
/// problem when the input is incomplete. Totals are recomputed by summing the
/// transformed lines, so `total == subtotal + tax` holds exactly in minor
/// units.
pub fn create_invoice_data(
    input: &InvoiceCreationInput,
    company_info: &CompanyInfo,
) -> DomainResult<InvoiceCreationResult> {
    validate_invoice_creation_input(input).into_result()?;

    let invoice_type = determine_invoice_type(input.seller_type);
    let parties = determine_invoice_parties(
        invoice_type,
        &input.seller,
        company_info,
        input.customer.as_ref(),
    )?;

    let items = transform_items_for_invoice(
        invoice_type,
        &input.items,
        input.commission_rate,
        input.tax_rate,
    )?;

    let mut subtotal = Money::ZERO;
    let mut tax_amount = Money::ZERO;
    for line in &items {
        subtotal = subtotal
            .checked_add(line.net_amount)
            .ok_or_else(|| DomainError::invariant("invoice subtotal overflow"))?;
        tax_amount = tax_amount
            .checked_add(line.tax_amount)
            .ok_or_else(|| DomainError::invariant("invoice tax overflow"))?;
    }
    let total_amount = subtotal
        .checked_add(tax_amount)
        .ok_or_else(|| DomainError::invariant("invoice total overflow"))?;

    Ok(InvoiceCreationResult {
        invoice_number: generate_invoice_number(invoice_type),
        invoice_type,
        issuer: parties.issuer,
        buyer: parties.buyer,
        items,
        subtotal,
        tax_amount,
        total_amount,
        notes: input.notes.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn platform() -> CompanyInfo {
        CompanyInfo {
            name: "Marketplace Platform Oy".to_string(),
            tax_number: "FI12345678".to_string(),
            address: "Platform Street 1".to_string(),
        }
    }

    fn seller() -> InvoiceParty {
        InvoiceParty {
            name: "Acme Seller".to_string(),
            tax_number: Some("FI87654321".to_string()),
            address: "Seller Road 2".to_string(),
        }
    }

    fn customer() -> InvoiceParty {
        InvoiceParty {
            name: "Jane Buyer".to_string(),
            tax_number: None,
            address: "Buyer Lane 3".to_string(),
        }
    }

    fn item(desc: &str, qty: i64, unit_minor: i64) -> LineItem {
        LineItem {
            description: desc.to_string(),
            quantity: qty,
            unit_price: Money::from_minor(unit_minor),
        }
    }

    fn base_input(seller_type: SellerType) -> InvoiceCreationInput {
        InvoiceCreationInput {
            seller_type,
            seller: seller(),
            customer: Some(customer()),
            items: vec![item("Widget", 2, 50_00)],
            commission_rate: Some(Rate::from_percent(10)),
            tax_rate: Rate::from_percent(18),
            notes: None,
        }
    }

    #[test]
    fn company_seller_gets_commission_invoice_to_platform() {
        let result = create_invoice_data(&base_input(SellerType::Company), &platform()).unwrap();
        assert_eq!(result.invoice_type, InvoiceType::Commission);
        assert_eq!(result.issuer.name, "Acme Seller");
        assert_eq!(result.buyer.name, "Marketplace Platform Oy");
        assert!(result.invoice_number.starts_with("KF"));
    }

    #[test]
    fn individual_seller_gets_sales_invoice_to_customer() {
        let result = create_invoice_data(&base_input(SellerType::Individual), &platform()).unwrap();
        assert_eq!(result.invoice_type, InvoiceType::Sales);
        assert_eq!(result.issuer.name, "Marketplace Platform Oy");
        assert_eq!(result.buyer.name, "Jane Buyer");
        assert!(result.invoice_number.starts_with("SF"));
    }

    #[test]
    fn sales_lines_pass_through_verbatim() {
        let result = create_invoice_data(&base_input(SellerType::Individual), &platform()).unwrap();
        assert_eq!(result.items.len(), 1);
        assert_eq!(result.items[0].description, "Widget");
        assert_eq!(result.items[0].quantity, 2);
        assert_eq!(result.items[0].net_amount, Money::from_minor(100_00));
        assert_eq!(result.subtotal, Money::from_minor(100_00));
        assert_eq!(result.tax_amount, Money::from_minor(18_00));
        assert_eq!(result.total_amount, Money::from_minor(118_00));
    }

    #[test]
    fn commission_lines_are_synthesized_per_item() {
        let result = create_invoice_data(&base_input(SellerType::Company), &platform()).unwrap();
        assert_eq!(result.items.len(), 1);
        assert!(result.items[0].description.starts_with("Commission service:"));
        assert_eq!(result.items[0].quantity, 1);
        // 100.00 * 10% = 10.00, tax 18% of that = 1.80
        assert_eq!(result.items[0].net_amount, Money::from_minor(10_00));
        assert_eq!(result.items[0].tax_amount, Money::from_minor(1_80));
        assert_eq!(result.total_amount, Money::from_minor(11_80));
    }

    #[test]
    fn invalid_input_collects_all_errors_then_fails() {
        let input = InvoiceCreationInput {
            seller: InvoiceParty {
                name: "  ".to_string(),
                tax_number: None,
                address: String::new(),
            },
            customer: None,
            items: Vec::new(),
            commission_rate: None,
            ..base_input(SellerType::Individual)
        };

        let report = validate_invoice_creation_input(&input);
        assert_eq!(report.errors().len(), 3);

        let err = create_invoice_data(&input, &platform()).unwrap_err();
        match err {
            DomainError::Validation(msg) => {
                assert!(msg.contains("Seller name is required"));
                assert!(msg.contains("at least one line item"));
                assert!(msg.contains("Customer is required"));
            }
            _ => panic!("expected Validation error"),
        }
    }

    #[test]
    fn commission_invoice_without_rate_is_invalid() {
        let input = InvoiceCreationInput {
            commission_rate: None,
            ..base_input(SellerType::Company)
        };
        let report = validate_invoice_creation_input(&input);
        assert!(
            report
                .errors()
                .iter()
                .any(|e| e.contains("Commission rate is required"))
        );
    }

    #[test]
    fn non_positive_line_values_are_invalid() {
        let input = InvoiceCreationInput {
            items: vec![
                item("Free sample", 1, 0),
                item("Refund line", 1, -5_00),
                item("Nothing", 0, 10_00),
            ],
            ..base_input(SellerType::Individual)
        };
        let report = validate_invoice_creation_input(&input);
        let errors = report.errors();
        assert!(errors.iter().any(|e| e == "Line 1: unit price must be positive"));
        assert!(errors.iter().any(|e| e == "Line 2: unit price must be positive"));
        assert!(errors.iter().any(|e| e == "Line 3: quantity must be positive"));
        assert!(create_invoice_data(&input, &platform()).is_err());
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            ..ProptestConfig::default()
        })]

        /// Property: for any generated invoice, total == subtotal + tax
        /// exactly, whatever the items and rates.
        #[test]
        fn totals_invariant_holds(
            quantities in prop::collection::vec(1i64..1_000i64, 1..8),
            unit_minor in 1i64..1_000_000i64,
            tax_bp in 0u32..=10_000u32,
            commission_bp in 1u32..=5_000u32,
            company in proptest::bool::ANY,
        ) {
            let seller_type = if company { SellerType::Company } else { SellerType::Individual };
            let items: Vec<LineItem> = quantities
                .iter()
                .enumerate()
                .map(|(i, q)| item(&format!("Item {i}"), *q, unit_minor))
                .collect();

            let input = InvoiceCreationInput {
                items,
                commission_rate: Some(Rate::from_basis_points(commission_bp)),
                tax_rate: Rate::from_basis_points(tax_bp),
                ..base_input(seller_type)
            };

            let result = create_invoice_data(&input, &platform()).unwrap();
            prop_assert_eq!(
                result.total_amount,
                result.subtotal.checked_add(result.tax_amount).unwrap()
            );

            // Totals equal the sum over lines.
            let line_net: i64 = result.items.iter().map(|l| l.net_amount.minor()).sum();
            let line_tax: i64 = result.items.iter().map(|l| l.tax_amount.minor()).sum();
            prop_assert_eq!(result.subtotal.minor(), line_net);
            prop_assert_eq!(result.tax_amount.minor(), line_tax);
        }
    }
}
