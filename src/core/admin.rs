//! Administrative operations: counter reset and full data wipe.
//!
//! Both are irreversible. Asking the user twice is the caller's job.

use crate::{
    core::counter::{self, Sequence},
    entities::{Client, Invoice, InvoiceItem, Receipt},
    errors::Result,
};
use sea_orm::{TransactionTrait, prelude::*};
use tracing::{info, instrument, warn};

/// Rows removed by [`delete_all_data`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WipeReport {
    /// Clients removed
    pub clients: u64,
    /// Invoices removed
    pub invoices: u64,
    /// Line items removed
    pub invoice_items: u64,
    /// Receipts removed
    pub receipts: u64,
}

async fn reset_all_counters<C>(db: &C) -> Result<()>
where
    C: ConnectionTrait,
{
    for sequence in Sequence::ALL {
        counter::reset(db, sequence).await?;
    }
    Ok(())
}

/// Zeros both counters; the next invoice and receipt are number 001 again.
#[instrument(skip(db))]
pub async fn reset_counters(db: &DatabaseConnection) -> Result<()> {
    let txn = db.begin().await?;
    reset_all_counters(&txn).await?;
    txn.commit().await?;
    info!("Document numbering reset");
    Ok(())
}

/// Deletes all clients, invoices, items and receipts and zeros both counters,
/// in one transaction. Business settings are kept.
#[instrument(skip(db))]
pub async fn delete_all_data(db: &DatabaseConnection) -> Result<WipeReport> {
    let txn = db.begin().await?;

    let invoice_items = InvoiceItem::delete_many().exec(&txn).await?.rows_affected;
    let receipts = Receipt::delete_many().exec(&txn).await?.rows_affected;
    let invoices = Invoice::delete_many().exec(&txn).await?.rows_affected;
    let clients = Client::delete_many().exec(&txn).await?.rows_affected;
    reset_all_counters(&txn).await?;

    txn.commit().await?;

    let report = WipeReport {
        clients,
        invoices,
        invoice_items,
        receipts,
    };
    warn!("All business data deleted: {:?}", report);
    Ok(report)
}
