//! Business settings entity - the freelancer's own identity and bank details.
//!
//! There is exactly one row, always stored under [`SETTINGS_ID`]. It is created
//! on first save, updated in place afterwards, and only removed by wiping the
//! database file.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Fixed primary key of the singleton settings row
pub const SETTINGS_ID: i32 = 1;

/// Business settings database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "business_settings")]
pub struct Model {
    /// Always [`SETTINGS_ID`]
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: i32,
    /// Trading name printed on every document
    pub business_name: String,
    /// Company registration number, if any
    pub registration_no: Option<String>,
    /// Postal address
    pub address: String,
    /// Business email
    pub email: String,
    /// Business phone
    pub phone: String,
    /// Bank receiving payments
    pub bank_name: String,
    /// Name on the bank account
    pub bank_account_name: String,
    /// Account number
    pub bank_account_no: String,
    /// ISO 4217 currency code used for all amounts (e.g. `"MYR"`)
    pub currency: String,
    /// Logo as a base64 data URL
    #[sea_orm(column_type = "Text", nullable)]
    pub logo: Option<String>,
}

/// Settings have no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
