//! Counter entity - named monotonic sequences used for document numbering.
//!
//! Two rows exist, `invoice` and `receipt`. `value` holds the last number
//! handed out, so the next document gets `value + 1`.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Counter database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "counters")]
pub struct Model {
    /// Sequence name (`"invoice"` or `"receipt"`)
    #[sea_orm(primary_key, auto_increment = false)]
    pub name: String,
    /// Last value allocated; 0 means nothing allocated yet
    pub value: i64,
}

/// Counters have no relations
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
