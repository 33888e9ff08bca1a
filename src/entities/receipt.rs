//! Receipt entity - proof of payment, created when an invoice is marked paid.
//!
//! `invoice_id` is unique: the store itself refuses a second receipt for the
//! same invoice.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Receipt database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "receipts")]
pub struct Model {
    /// Unique identifier for the receipt
    #[sea_orm(primary_key)]
    pub id: i64,
    /// `RCT-YYYY-NNN`
    #[sea_orm(indexed)]
    pub receipt_no: String,
    /// The paid invoice
    #[sea_orm(unique)]
    pub invoice_id: i64,
    /// Date the payment was received
    pub paid_date: Date,
    /// Free-form method label such as "Cash" or "Bank Transfer"
    pub payment_method: String,
    /// Always the invoice total at the moment of payment
    pub amount_paid: f64,
    /// Free-text notes
    #[sea_orm(column_type = "Text", nullable)]
    pub notes: Option<String>,
}

/// Receipts reference invoices by plain id
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
