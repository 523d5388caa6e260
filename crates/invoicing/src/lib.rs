//! Invoicing domain module.
//!
//! Composes invoice data from settlement outcomes: which party invoices whom,
//! how line items are transformed, and what the totals are. Totals are always
//! recomputed here — caller-supplied totals are never trusted.

pub mod invoice;
pub mod number;

pub use invoice::{
    CompanyInfo, InvoiceCreationInput, InvoiceCreationResult, InvoiceLine, InvoiceParties,
    InvoiceParty, InvoiceType, LineItem, create_invoice_data, determine_invoice_parties,
    determine_invoice_type, transform_items_for_invoice, validate_invoice_creation_input,
};
pub use number::{generate_invoice_number, generate_invoice_number_at};
