//! Invoice item entity - one billable line on an invoice.
//!
//! Items are replaced wholesale on every save of their invoice.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Invoice item database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "invoice_items")]
pub struct Model {
    /// Unique identifier for the line
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Owning invoice
    #[sea_orm(indexed)]
    pub invoice_id: i64,
    /// What was delivered
    pub description: String,
    /// Number of units
    pub quantity: f64,
    /// Price per unit
    pub unit_price: f64,
    /// `quantity * unit_price`
    pub total: f64,
}

/// Items are correlated by `invoice_id` only
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
