//! Unified error type for the invoicing core.
//!
//! Lifecycle operations either apply completely or roll back, and report the
//! failure through one of these variants.

use crate::entities::invoice::InvoiceStatus;
use thiserror::Error;

/// All failures surfaced by the crate.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration could not be read or parsed
    #[error("Configuration error: {message}")]
    Config {
        /// Human-readable description
        message: String,
    },

    /// The record store rejected a read or write; the enclosing transaction was rolled back
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// Input rejected before any storage write was attempted
    #[error("Validation failed: {message}")]
    Validation {
        /// What was wrong with the input
        message: String,
    },

    /// A quantity, price or payment amount was negative or not finite
    #[error("Invalid amount: {amount}")]
    InvalidAmount {
        /// The offending value
        amount: f64,
    },

    /// A client id that does not exist
    #[error("Client not found: {id}")]
    ClientNotFound {
        /// Requested client id
        id: i64,
    },

    /// An invoice id that does not exist
    #[error("Invoice not found: {id}")]
    InvoiceNotFound {
        /// Requested invoice id
        id: i64,
    },

    /// A receipt id that does not exist
    #[error("Receipt not found: {id}")]
    ReceiptNotFound {
        /// Requested receipt id
        id: i64,
    },

    /// The requested lifecycle transition is not permitted from the current status
    #[error("Cannot {action} an invoice with status '{status}'")]
    InvalidTransition {
        /// Name of the attempted transition
        action: &'static str,
        /// Status the invoice was in
        status: InvoiceStatus,
    },

    /// The invoice already has a receipt; a second payment is refused
    #[error("Invoice {invoice_id} already has receipt {receipt_no}")]
    ReceiptExists {
        /// Invoice that was already paid
        invoice_id: i64,
        /// Number of the existing receipt
        receipt_no: String,
    },

    /// No business profile has been saved yet
    #[error("Business settings have not been configured")]
    SettingsMissing,

    /// The background auto-save task could not be reached or panicked
    #[error("Auto-save error: {message}")]
    AutoSave {
        /// Description of the failure
        message: String,
    },

    /// Reading a file failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// An environment variable held invalid data
    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),
}

impl Error {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
