//! Receipt lookups. Receipts are only ever created by
//! `core::invoice::mark_invoice_paid`.

use crate::{
    entities::{Receipt, receipt},
    errors::Result,
};
use sea_orm::{QueryOrder, prelude::*};

/// Looks up one receipt.
pub async fn get_receipt<C>(db: &C, receipt_id: i64) -> Result<Option<receipt::Model>>
where
    C: ConnectionTrait,
{
    Receipt::find_by_id(receipt_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// The receipt of a paid invoice, if there is one.
pub async fn get_receipt_for_invoice<C>(db: &C, invoice_id: i64) -> Result<Option<receipt::Model>>
where
    C: ConnectionTrait,
{
    Receipt::find()
        .filter(receipt::Column::InvoiceId.eq(invoice_id))
        .one(db)
        .await
        .map_err(Into::into)
}

/// All receipts, most recent payment first.
pub async fn list_receipts<C>(db: &C) -> Result<Vec<receipt::Model>>
where
    C: ConnectionTrait,
{
    Receipt::find()
        .order_by_desc(receipt::Column::PaidDate)
        .order_by_desc(receipt::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}
