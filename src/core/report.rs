//! Read-side views: dashboard figures, invoice listings, and the fully
//! resolved bundles handed to the PDF renderer.
//!
//! A `client_id` whose client has been deleted resolves to
//! [`UNKNOWN_CLIENT`] instead of failing.

use crate::{
    core::{client, invoice::display_status, receipt, settings},
    entities::{Invoice, InvoiceStatus, business_settings, client as client_entity, invoice, invoice_item, receipt as receipt_entity},
    errors::{Error, Result},
};
use chrono::NaiveDate;
use sea_orm::{QueryOrder, prelude::*};
use std::collections::HashMap;

/// Display name for invoices whose client no longer exists.
pub const UNKNOWN_CLIENT: &str = "Unknown Client";

/// Headline figures for the dashboard.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardSummary {
    /// Sum of totals of paid invoices
    pub total_received: f64,
    /// Sum of totals of sent (unpaid) invoices
    pub pending_amount: f64,
    /// Invoices still in draft
    pub draft_count: usize,
    /// Invoices already paid
    pub paid_count: usize,
    /// Currency from business settings, or the configured fallback
    pub currency: String,
}

/// Computes the dashboard from every stored invoice.
pub async fn dashboard_summary<C>(db: &C, fallback_currency: &str) -> Result<DashboardSummary>
where
    C: ConnectionTrait,
{
    let invoices = Invoice::find().all(db).await?;
    let currency = settings::get_settings(db)
        .await?
        .map_or_else(|| fallback_currency.to_string(), |s| s.currency);

    let mut summary = DashboardSummary {
        total_received: 0.0,
        pending_amount: 0.0,
        draft_count: 0,
        paid_count: 0,
        currency,
    };
    for inv in &invoices {
        match inv.status {
            InvoiceStatus::Paid => {
                summary.total_received += inv.total;
                summary.paid_count += 1;
            }
            InvoiceStatus::Sent => summary.pending_amount += inv.total,
            InvoiceStatus::Draft => summary.draft_count += 1,
            InvoiceStatus::Overdue => {}
        }
    }
    Ok(summary)
}

/// Narrows [`list_invoices`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InvoiceFilter {
    /// Case-insensitive match on invoice number or client name
    pub search: Option<String>,
    /// Exact stored status; `None` means all
    pub status: Option<InvoiceStatus>,
}

/// One row of the invoice list.
#[derive(Debug, Clone, PartialEq)]
pub struct InvoiceListing {
    /// The invoice header
    pub invoice: invoice::Model,
    /// Resolved client name or [`UNKNOWN_CLIENT`]
    pub client_name: String,
    /// Status as it should be shown today
    pub display_status: InvoiceStatus,
}

pub(crate) async fn client_names<C>(db: &C) -> Result<HashMap<i64, String>>
where
    C: ConnectionTrait,
{
    Ok(client::list_clients(db)
        .await?
        .into_iter()
        .map(|c| (c.id, c.name))
        .collect())
}

pub(crate) fn resolve_client_name(names: &HashMap<i64, String>, client_id: i64) -> String {
    names
        .get(&client_id)
        .cloned()
        .unwrap_or_else(|| UNKNOWN_CLIENT.to_string())
}

/// Invoices newest first, with client names resolved.
pub async fn list_invoices<C>(
    db: &C,
    filter: &InvoiceFilter,
    today: NaiveDate,
) -> Result<Vec<InvoiceListing>>
where
    C: ConnectionTrait,
{
    let names = client_names(db).await?;
    let mut query = Invoice::find();
    if let Some(status) = filter.status {
        query = query.filter(invoice::Column::Status.eq(status));
    }
    let invoices = query
        .order_by_desc(invoice::Column::CreatedAt)
        .order_by_desc(invoice::Column::Id)
        .all(db)
        .await?;

    let needle = filter
        .search
        .as_deref()
        .map(|s| s.trim().to_lowercase())
        .unwrap_or_default();

    Ok(invoices
        .into_iter()
        .map(|inv| InvoiceListing {
            client_name: resolve_client_name(&names, inv.client_id),
            display_status: display_status(&inv, today),
            invoice: inv,
        })
        .filter(|row| {
            needle.is_empty()
                || row.invoice.invoice_no.to_lowercase().contains(&needle)
                || row.client_name.to_lowercase().contains(&needle)
        })
        .collect())
}

/// Everything the renderer needs to draw an invoice.
#[derive(Debug, Clone, PartialEq)]
pub struct InvoiceDocument {
    /// The invoice header
    pub invoice: invoice::Model,
    /// `None` if the client was deleted
    pub client: Option<client_entity::Model>,
    /// Line items in insertion order
    pub items: Vec<invoice_item::Model>,
    /// Business profile for the letterhead
    pub settings: business_settings::Model,
    /// Present once the invoice is paid
    pub receipt: Option<receipt_entity::Model>,
}

impl InvoiceDocument {
    /// Paid watermark and "received on" line appear only for a paid invoice
    /// with its receipt at hand.
    #[must_use]
    pub fn shows_paid_watermark(&self) -> bool {
        self.invoice.status == InvoiceStatus::Paid && self.receipt.is_some()
    }

    /// Client name, or "Unknown Client" after deletion.
    #[must_use]
    pub fn client_name(&self) -> &str {
        self.client.as_ref().map_or(UNKNOWN_CLIENT, |c| c.name.as_str())
    }
}

/// Everything the renderer needs to draw a receipt.
#[derive(Debug, Clone, PartialEq)]
pub struct ReceiptDocument {
    /// The receipt being rendered
    pub receipt: receipt_entity::Model,
    /// The invoice the receipt settles
    pub invoice: invoice::Model,
    /// `None` if the client was deleted
    pub client: Option<client_entity::Model>,
    /// Business profile for the letterhead
    pub settings: business_settings::Model,
}

/// Resolves an invoice and all its related rows.
///
/// # Errors
/// `InvoiceNotFound`, or `SettingsMissing` if no business profile exists.
pub async fn load_invoice_document<C>(db: &C, invoice_id: i64) -> Result<InvoiceDocument>
where
    C: ConnectionTrait,
{
    let invoice = crate::core::invoice::get_invoice(db, invoice_id)
        .await?
        .ok_or(Error::InvoiceNotFound { id: invoice_id })?;
    let settings = settings::get_settings(db).await?.ok_or(Error::SettingsMissing)?;
    let client = client::get_client(db, invoice.client_id).await?;
    let items = crate::core::invoice::get_invoice_items(db, invoice_id).await?;
    let receipt = receipt::get_receipt_for_invoice(db, invoice_id).await?;

    Ok(InvoiceDocument {
        invoice,
        client,
        items,
        settings,
        receipt,
    })
}

/// Resolves a receipt with its invoice, client and settings.
pub async fn load_receipt_document<C>(db: &C, receipt_id: i64) -> Result<ReceiptDocument>
where
    C: ConnectionTrait,
{
    let receipt = receipt::get_receipt(db, receipt_id)
        .await?
        .ok_or(Error::ReceiptNotFound { id: receipt_id })?;
    let invoice = crate::core::invoice::get_invoice(db, receipt.invoice_id)
        .await?
        .ok_or(Error::InvoiceNotFound {
            id: receipt.invoice_id,
        })?;
    let settings = settings::get_settings(db).await?.ok_or(Error::SettingsMissing)?;
    let client = client::get_client(db, invoice.client_id).await?;

    Ok(ReceiptDocument {
        receipt,
        invoice,
        client,
        settings,
    })
}
