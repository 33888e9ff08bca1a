//! Export snapshot - a read-only copy of the business data for the
//! spreadsheet writer. Building it never writes to the store.

use crate::{
    core::{client, receipt, report},
    entities::{Invoice, InvoiceStatus, client as client_entity, invoice, receipt as receipt_entity},
    errors::Result,
};
use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::{QueryOrder, prelude::*};
use serde::Serialize;

/// Invoice row as it appears in the export, with the client name resolved.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InvoiceExportRow {
    /// Invoice id
    pub id: i64,
    /// Permanent `INV-YYYY-NNN` number
    pub invoice_no: String,
    /// Resolved client name or "Unknown Client"
    pub client_name: String,
    /// Date the invoice was issued
    pub issue_date: NaiveDate,
    /// Payment due date
    pub due_date: NaiveDate,
    /// Stored status
    pub status: InvoiceStatus,
    /// Invoice total
    pub total: f64,
    /// When the invoice row was first written
    pub created_at: DateTime<Utc>,
}

impl InvoiceExportRow {
    fn new(inv: invoice::Model, client_name: String) -> Self {
        Self {
            id: inv.id,
            invoice_no: inv.invoice_no,
            client_name,
            issue_date: inv.issue_date,
            due_date: inv.due_date,
            status: inv.status,
            total: inv.total,
            created_at: inv.created_at,
        }
    }
}

/// One sheet per table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportSnapshot {
    /// Clients sheet
    pub clients: Vec<client_entity::Model>,
    /// Invoices sheet
    pub invoices: Vec<InvoiceExportRow>,
    /// Receipts sheet
    pub receipts: Vec<receipt_entity::Model>,
}

/// Reads clients, invoices and receipts.
pub async fn export_snapshot<C>(db: &C) -> Result<ExportSnapshot>
where
    C: ConnectionTrait,
{
    let names = report::client_names(db).await?;
    let invoices = Invoice::find()
        .order_by_asc(invoice::Column::Id)
        .all(db)
        .await?
        .into_iter()
        .map(|inv| {
            let name = report::resolve_client_name(&names, inv.client_id);
            InvoiceExportRow::new(inv, name)
        })
        .collect();

    Ok(ExportSnapshot {
        clients: client::list_clients(db).await?,
        invoices,
        receipts: receipt::list_receipts(db).await?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::invoice::{finalize_invoice, mark_invoice_paid};
    use crate::test_utils::*;

    #[tokio::test]
    async fn test_snapshot_contains_every_table() -> Result<()> {
        let (db, bob) = setup_with_profile().await?;
        create_test_client(&db, "Alice").await?;
        let first = finalize_invoice(&db, None, &sample_draft(bob.id)).await?;
        finalize_invoice(&db, None, &sample_draft(bob.id)).await?;
        mark_invoice_paid(&db, first.id, cash_payment()).await?;

        let snapshot = export_snapshot(&db).await?;

        assert_eq!(snapshot.clients.len(), 2);
        assert_eq!(snapshot.invoices.len(), 2);
        assert_eq!(snapshot.invoices[0].invoice_no, first.invoice_no);
        assert_eq!(snapshot.invoices[0].client_name, "Bob");
        assert_eq!(snapshot.invoices[0].status, InvoiceStatus::Paid);
        assert_eq!(snapshot.receipts.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_snapshot_serializes() -> Result<()> {
        let (db, bob) = setup_with_profile().await?;
        finalize_invoice(&db, None, &sample_draft(bob.id)).await?;

        let snapshot = export_snapshot(&db).await?;
        let rendered = toml::to_string(&snapshot).map_err(|e| crate::errors::Error::Config {
            message: e.to_string(),
        })?;
        assert!(rendered.contains("status = \"sent\""));
        Ok(())
    }
}
