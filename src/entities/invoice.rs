//! Invoice entity - the header row of an invoice.
//!
//! Line items live in `invoice_items` and are correlated by `invoice_id`.
//! `status` is only ever changed by the lifecycle operations in
//! `core::invoice`.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Stored invoice status.
///
/// `Overdue` exists for compatibility with stored data; the lifecycle never
/// writes it. Overdue-ness is computed at read time by
/// `core::invoice::display_status`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
pub enum InvoiceStatus {
    /// Editable, provisional number
    #[sea_orm(string_value = "draft")]
    Draft,
    /// Finalized with a permanent number
    #[sea_orm(string_value = "sent")]
    Sent,
    /// Has a receipt; frozen
    #[sea_orm(string_value = "paid")]
    Paid,
    /// Legacy stored value, treated as sent
    #[sea_orm(string_value = "overdue")]
    Overdue,
}

impl InvoiceStatus {
    /// Lowercase label as stored in the database
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Sent => "sent",
            Self::Paid => "paid",
            Self::Overdue => "overdue",
        }
    }

    /// Whether the invoice has been given its permanent number
    #[must_use]
    pub const fn is_finalized(self) -> bool {
        !matches!(self, Self::Draft)
    }
}

impl fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Invoice database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "invoices")]
pub struct Model {
    /// Unique identifier for the invoice
    #[sea_orm(primary_key)]
    pub id: i64,
    /// `INV-YYYY-NNN`; provisional while the invoice is a draft
    #[sea_orm(indexed)]
    pub invoice_no: String,
    /// Client the invoice is addressed to (may dangle after client deletion)
    #[sea_orm(indexed)]
    pub client_id: i64,
    /// Date the invoice was issued
    pub issue_date: Date,
    /// Payment is due by this date
    pub due_date: Date,
    /// Lifecycle status
    pub status: InvoiceStatus,
    /// Free-text notes
    #[sea_orm(column_type = "Text", nullable)]
    pub notes: Option<String>,
    /// Sum of item totals
    pub subtotal: f64,
    /// Equal to `subtotal`; there is no tax or discount model
    pub total: f64,
    /// When the backing row was first written
    pub created_at: DateTimeUtc,
}

/// Invoices reference clients by plain id, without a relation
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
