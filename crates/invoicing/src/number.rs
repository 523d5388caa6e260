//! Invoice number generation.
//!
//! Numbers are prefix + year + a time-derived suffix + a short random
//! component. Collisions are possible and accepted: the persistence layer's
//! uniqueness constraint is the backstop, and callers must handle a
//! constraint violation by regenerating.

use chrono::{DateTime, Datelike, Utc};
use uuid::Uuid;

use crate::invoice::InvoiceType;

/// Generate an invoice number for the current instant.
pub fn generate_invoice_number(invoice_type: InvoiceType) -> String {
    generate_invoice_number_at(invoice_type, Utc::now())
}

/// Generate an invoice number at an explicit instant (deterministic prefix
/// and timestamp in tests; the random tail still varies).
pub fn generate_invoice_number_at(invoice_type: InvoiceType, now: DateTime<Utc>) -> String {
    let prefix = match invoice_type {
        InvoiceType::Sales => "SF",
        InvoiceType::Commission => "KF",
    };

    // Seconds since the start of the year: at most 8 digits.
    let year_start = now
        .date_naive()
        .with_ordinal(1)
        .unwrap_or(now.date_naive())
        .and_hms_opt(0, 0, 0)
        .unwrap_or_default()
        .and_utc();
    let seconds_into_year = (now - year_start).num_seconds().max(0);

    let random_tail = &Uuid::new_v4().simple().to_string()[..4];

    format!("{prefix}{}{seconds_into_year:08}{random_tail}", now.year())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn prefixes_follow_invoice_type() {
        let now = Utc.with_ymd_and_hms(2026, 3, 15, 10, 30, 0).unwrap();
        assert!(generate_invoice_number_at(InvoiceType::Sales, now).starts_with("SF2026"));
        assert!(generate_invoice_number_at(InvoiceType::Commission, now).starts_with("KF2026"));
    }

    #[test]
    fn number_has_fixed_shape() {
        let now = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 42).unwrap();
        let number = generate_invoice_number_at(InvoiceType::Sales, now);
        // SF + 4-digit year + 8-digit seconds + 4 random chars
        assert_eq!(number.len(), 2 + 4 + 8 + 4);
        assert_eq!(&number[6..14], "00000042");
    }

    #[test]
    fn random_tail_varies_between_calls() {
        let now = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let numbers: std::collections::HashSet<String> = (0..16)
            .map(|_| generate_invoice_number_at(InvoiceType::Sales, now))
            .collect();
        // Same timestamp, so any variation comes from the random tail.
        assert!(numbers.len() > 1);
    }
}
