//! Collect-all-errors validation reporting.
//!
//! Form-style inputs (settlement-run configuration, invoice creation input)
//! are validated into a report listing every problem at once, so a caller can
//! surface the full list instead of fixing one error per round trip.

use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};

/// Accumulated validation outcome.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    errors: Vec<String>,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a violation. Does not short-circuit.
    pub fn push(&mut self, msg: impl Into<String>) {
        self.errors.push(msg.into());
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    /// Convert into a `DomainResult`, joining all messages into one
    /// `DomainError::Validation`.
    pub fn into_result(self) -> DomainResult<()> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(DomainError::validation(self.errors.join("; ")))
        }
    }
}
