//! Record-level data quality checks for the preprocessing stage.
//!
//! This module provides tools for handling bad records gracefully with
//! configurable error handling modes (skip/log/fail), a handful of numeric
//! validators, and error collection utilities.
//!
//! # Example
//!
//! ```
//! use offer_merge::schema::Transaction;
//! use offer_merge::validation::*;
//!
//! let rows = vec![
//!     Transaction::new("c1", 1.0, 12.5),
//!     Transaction::new("c1", 2.0, -3.0),
//! ];
//!
//! let mut collector = ErrorCollector::new();
//! let kept = validate_records(rows, ValidationMode::LogAndContinue, &mut collector).unwrap();
//! assert_eq!(kept.len(), 1);
//! assert_eq!(collector.error_count(), 1);
//! ```

use crate::error::{MergeError, MergeResult};
use crate::schema::{Offer, OfferEvent, Profile, Transaction};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::{self, Error};
use std::path::Path;

/// Result type for validation operations.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// Trait for records that can be validated.
pub trait Validate {
    /// Table the record belongs to, for error messages.
    const TABLE: &'static str;

    /// Validate this instance and return a list of errors if invalid.
    fn validate(&self) -> ValidationResult;

    /// Identifier used when reporting this record.
    fn record_id(&self) -> Option<String> {
        None
    }
}

/// A single validation error with context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationError {
    /// The field that failed validation (optional)
    pub field: Option<String>,
    /// Human-readable error message
    pub message: String,
}

impl ValidationError {
    /// Create a new validation error with just a message.
    pub fn new<S: Into<String>>(message: S) -> Self {
        Self {
            field: None,
            message: message.into(),
        }
    }

    /// Create a validation error for a specific field.
    pub fn field<S: Into<String>, M: Into<String>>(field: S, message: M) -> Self {
        Self {
            field: Some(field.into()),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(ref field) = self.field {
            write!(f, "[{}] {}", field, self.message)
        } else {
            write!(f, "{}", self.message)
        }
    }
}

impl std::error::Error for ValidationError {}

/// Defines how to handle validation failures.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationMode {
    /// Skip invalid records silently and continue processing
    SkipInvalid,
    /// Log invalid records to the error collector and continue processing
    #[default]
    LogAndContinue,
    /// Fail immediately on the first validation error
    FailFast,
}

/// Collects validation errors for batch reporting.
#[derive(Debug, Clone, Default)]
pub struct ErrorCollector {
    errors: Vec<RecordError>,
}

/// A validation error with record context.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordError {
    pub table: String,
    /// Identifier of the record that failed
    pub record_id: Option<String>,
    /// The validation errors for this record
    pub errors: Vec<ValidationError>,
}

impl ErrorCollector {
    /// Create a new empty error collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a validation error for a record.
    pub fn add_error(
        &mut self,
        table: &str,
        record_id: Option<String>,
        errors: Vec<ValidationError>,
    ) {
        self.errors.push(RecordError {
            table: table.to_string(),
            record_id,
            errors,
        });
    }

    /// Get the total number of failed records.
    pub fn error_count(&self) -> usize {
        self.errors.len()
    }

    /// Get all collected errors.
    pub fn errors(&self) -> &[RecordError] {
        &self.errors
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Clear all collected errors.
    pub fn clear(&mut self) {
        self.errors.clear();
    }

    /// Export errors to JSON format.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.errors)
    }

    /// Write errors to a file in JSON format.
    pub fn write_to_file<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        let json = self.to_json().map_err(Error::other)?;
        std::fs::write(path, json)
    }
}

impl fmt::Display for ErrorCollector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ErrorCollector({} errors)", self.error_count())
    }
}

fn format_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Keep the records that pass validation.
///
/// * [`ValidationMode::SkipInvalid`] drops failures without recording them.
/// * [`ValidationMode::LogAndContinue`] drops failures, records them in
///   `collector` and emits a `tracing` warning for each.
/// * [`ValidationMode::FailFast`] returns [`MergeError::Invalid`] on the first failure.
///
/// # Errors
/// Only in `FailFast` mode.
pub fn validate_records<T: Validate>(
    records: Vec<T>,
    mode: ValidationMode,
    collector: &mut ErrorCollector,
) -> MergeResult<Vec<T>> {
    let mut kept = Vec::with_capacity(records.len());
    for record in records {
        match record.validate() {
            Ok(()) => kept.push(record),
            Err(errors) => match mode {
                ValidationMode::SkipInvalid => {}
                ValidationMode::LogAndContinue => {
                    let id = record.record_id();
                    tracing::warn!(
                        table = T::TABLE,
                        record = id.as_deref().unwrap_or("?"),
                        errors = %format_errors(&errors),
                        "dropping invalid record"
                    );
                    collector.add_error(T::TABLE, id, errors);
                }
                ValidationMode::FailFast => {
                    return Err(MergeError::Invalid {
                        table: T::TABLE,
                        message: format!(
                            "{}: {}",
                            record.record_id().unwrap_or_default(),
                            format_errors(&errors)
                        ),
                    });
                }
            },
        }
    }
    Ok(kept)
}

/// Validation helpers for common patterns.
pub mod validators {
    use super::{ValidationError, ValidationResult};

    /// Validate that a string is not empty.
    pub fn not_empty(field: &str, value: &str) -> ValidationResult {
        if value.is_empty() {
            Err(vec![ValidationError::field(field, "must not be empty")])
        } else {
            Ok(())
        }
    }

    /// Validate that a float is neither NaN nor infinite.
    pub fn finite(field: &str, value: f64) -> ValidationResult {
        if value.is_finite() {
            Ok(())
        } else {
            Err(vec![ValidationError::field(field, "must be a finite number")])
        }
    }

    /// Validate that a float is finite and `>= 0`.
    pub fn non_negative(field: &str, value: f64) -> ValidationResult {
        finite(field, value)?;
        if value >= 0.0 {
            Ok(())
        } else {
            Err(vec![ValidationError::field(
                field,
                format!("must be non-negative, got {value}"),
            )])
        }
    }
}

/// Combine multiple validation results.
pub fn combine_validations(results: Vec<ValidationResult>) -> ValidationResult {
    let mut all_errors = Vec::new();
    for result in results {
        if let Err(mut errors) = result {
            all_errors.append(&mut errors);
        }
    }
    if all_errors.is_empty() {
        Ok(())
    } else {
        Err(all_errors)
    }
}

impl Validate for Offer {
    const TABLE: &'static str = "offers";

    fn validate(&self) -> ValidationResult {
        combine_validations(vec![
            validators::not_empty("offerid", &self.offerid),
            validators::non_negative("duration", self.duration),
            validators::non_negative("difficulty", self.difficulty),
            validators::non_negative("reward", self.reward),
        ])
    }

    fn record_id(&self) -> Option<String> {
        Some(self.offerid.clone())
    }
}

impl Validate for Profile {
    const TABLE: &'static str = "profiles";

    fn validate(&self) -> ValidationResult {
        combine_validations(vec![
            validators::not_empty("customerid", &self.customerid),
            validators::non_negative("income", self.income),
        ])
    }

    fn record_id(&self) -> Option<String> {
        Some(self.customerid.clone())
    }
}

impl Validate for OfferEvent {
    const TABLE: &'static str = "offer_events";

    fn validate(&self) -> ValidationResult {
        combine_validations(vec![
            validators::not_empty("offerid", &self.offerid),
            validators::finite("time", self.time),
        ])
    }

    fn record_id(&self) -> Option<String> {
        Some(format!("{}@{}", self.customerid, self.time))
    }
}

impl Validate for Transaction {
    const TABLE: &'static str = "transactions";

    fn validate(&self) -> ValidationResult {
        combine_validations(vec![
            validators::finite("time", self.time),
            validators::non_negative("amount", self.amount),
        ])
    }

    fn record_id(&self) -> Option<String> {
        Some(format!("{}@{}", self.customerid, self.time))
    }
}
