//! Invoice lifecycle - the only code that writes `invoices.status`.
//!
//! ```text
//!   (none) --autosave--> draft --finalize--> sent --mark paid--> paid
//!   (none) --------------finalize----------> sent
//! ```
//!
//! Drafts carry a provisional number from `peek_next`. Finalizing a draft
//! consumes the invoice counter and stamps the permanent number; finalizing an
//! invoice that is already sent is an edit and keeps its number. Marking paid
//! consumes the receipt counter and creates the receipt. Each transition runs
//! in one transaction: on any error the transaction is dropped and `SQLite`
//! rolls back the counter bump together with the rows.

use crate::{
    core::{
        client,
        counter::Sequence,
        numbering::{allocate_number, preview_number},
        settings,
    },
    entities::{Invoice, InvoiceItem, InvoiceStatus, Receipt, invoice, invoice_item, receipt},
    errors::{Error, Result},
};
use chrono::{Days, NaiveDate, Utc};
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use tracing::{debug, info, instrument};

/// One line of an invoice being edited. `total` always equals
/// `quantity * unit_price`.
#[derive(Debug, Clone, PartialEq)]
pub struct DraftItem {
    /// Free text shown on the invoice
    pub description: String,
    quantity: f64,
    unit_price: f64,
    total: f64,
}

impl DraftItem {
    /// A line with its total computed.
    #[must_use]
    pub fn new(description: &str, quantity: f64, unit_price: f64) -> Self {
        Self {
            description: description.to_string(),
            quantity,
            unit_price,
            total: quantity * unit_price,
        }
    }

    /// Empty line as shown when a row is added: quantity 1, price 0.
    #[must_use]
    pub fn blank() -> Self {
        Self::new("", 1.0, 0.0)
    }

    /// Number of units
    #[must_use]
    pub const fn quantity(&self) -> f64 {
        self.quantity
    }

    /// Price per unit
    #[must_use]
    pub const fn unit_price(&self) -> f64 {
        self.unit_price
    }

    /// `quantity * unit_price`
    #[must_use]
    pub const fn total(&self) -> f64 {
        self.total
    }

    /// Changes the quantity and recomputes the total.
    pub fn set_quantity(&mut self, quantity: f64) {
        self.quantity = quantity;
        self.total = self.quantity * self.unit_price;
    }

    /// Changes the price and recomputes the total.
    pub fn set_unit_price(&mut self, unit_price: f64) {
        self.unit_price = unit_price;
        self.total = self.quantity * self.unit_price;
    }

    fn validate(&self) -> Result<()> {
        for amount in [self.quantity, self.unit_price] {
            if !amount.is_finite() || amount < 0.0 {
                return Err(Error::InvalidAmount { amount });
            }
        }
        Ok(())
    }
}

impl From<&invoice_item::Model> for DraftItem {
    fn from(item: &invoice_item::Model) -> Self {
        Self::new(&item.description, item.quantity, item.unit_price)
    }
}

/// In-memory state of the invoice form.
#[derive(Debug, Clone, PartialEq)]
pub struct InvoiceDraft {
    /// Selected client; `None` until the user picks one
    pub client_id: Option<i64>,
    /// Date the invoice was issued
    pub issue_date: NaiveDate,
    /// Payment due date
    pub due_date: NaiveDate,
    /// Free text; blank notes are stored as none
    pub notes: Option<String>,
    /// Line items in display order
    pub items: Vec<DraftItem>,
}

impl InvoiceDraft {
    /// A fresh form: issued `today`, due `due_days` later, one blank line.
    #[must_use]
    pub fn new(today: NaiveDate, due_days: u64) -> Self {
        Self {
            client_id: None,
            issue_date: today,
            due_date: today.checked_add_days(Days::new(due_days)).unwrap_or(today),
            notes: None,
            items: vec![DraftItem::blank()],
        }
    }

    /// Rebuilds the form from stored rows, for editing an existing invoice.
    #[must_use]
    pub fn from_stored(invoice: &invoice::Model, items: &[invoice_item::Model]) -> Self {
        Self {
            client_id: Some(invoice.client_id),
            issue_date: invoice.issue_date,
            due_date: invoice.due_date,
            notes: invoice.notes.clone(),
            items: items.iter().map(DraftItem::from).collect(),
        }
    }

    /// Sum of line totals. Also the invoice total.
    #[must_use]
    pub fn subtotal(&self) -> f64 {
        self.items.iter().map(DraftItem::total).sum()
    }

    /// Appends a line.
    pub fn add_item(&mut self, item: DraftItem) {
        self.items.push(item);
    }

    /// Removes the line at `index`; out-of-range indexes are ignored.
    pub fn remove_item(&mut self, index: usize) {
        if index < self.items.len() {
            self.items.remove(index);
        }
    }

    fn selected_client(&self) -> Option<i64> {
        self.client_id.filter(|id| *id != 0)
    }

    /// Whether a real client is picked. Id 0 counts as "none".
    #[must_use]
    pub fn has_client_selected(&self) -> bool {
        self.selected_client().is_some()
    }

    fn notes(&self) -> Option<String> {
        self.notes
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(str::to_string)
    }

    fn validate_amounts(&self) -> Result<()> {
        self.items.iter().try_for_each(DraftItem::validate)
    }
}

/// Payment details entered when marking an invoice paid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentDetails {
    /// Date the money arrived
    pub paid_date: NaiveDate,
    /// e.g. "Cash", "Bank Transfer"
    pub payment_method: String,
    /// Printed on the receipt
    pub notes: Option<String>,
}

/// Result of a successful payment.
#[derive(Debug, Clone, PartialEq)]
pub struct PaidInvoice {
    /// Invoice, now `paid`
    pub invoice: invoice::Model,
    /// The receipt just created
    pub receipt: receipt::Model,
}

/// Whether the invoice may still be edited. Paid invoices are frozen.
#[must_use]
pub fn can_edit(invoice: &invoice::Model) -> bool {
    invoice.status != InvoiceStatus::Paid
}

/// Status to show to the user on `today`.
///
/// A sent invoice past its due date reads as overdue. This is computed on
/// every read and never written back.
#[must_use]
pub fn display_status(invoice: &invoice::Model, today: NaiveDate) -> InvoiceStatus {
    match invoice.status {
        InvoiceStatus::Sent if invoice.due_date < today => InvoiceStatus::Overdue,
        status => status,
    }
}

/// Provisional number for a new invoice. Does not consume the counter.
pub async fn preview_invoice_number<C>(db: &C) -> Result<String>
where
    C: ConnectionTrait,
{
    preview_number(db, Sequence::Invoice).await
}

/// Looks up one invoice header.
pub async fn get_invoice<C>(db: &C, invoice_id: i64) -> Result<Option<invoice::Model>>
where
    C: ConnectionTrait,
{
    Invoice::find_by_id(invoice_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Items of an invoice in insertion order.
pub async fn get_invoice_items<C>(db: &C, invoice_id: i64) -> Result<Vec<invoice_item::Model>>
where
    C: ConnectionTrait,
{
    InvoiceItem::find()
        .filter(invoice_item::Column::InvoiceId.eq(invoice_id))
        .order_by_asc(invoice_item::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Loads an existing invoice into an editable draft.
pub async fn open_invoice_draft<C>(db: &C, invoice_id: i64) -> Result<(invoice::Model, InvoiceDraft)>
where
    C: ConnectionTrait,
{
    let invoice = get_invoice(db, invoice_id)
        .await?
        .ok_or(Error::InvoiceNotFound { id: invoice_id })?;
    let items = get_invoice_items(db, invoice_id).await?;
    let draft = InvoiceDraft::from_stored(&invoice, &items);
    Ok((invoice, draft))
}

/// Deletes every item of the invoice and inserts `items` in their place.
///
/// Only call this with a transaction, so that no reader sees the empty
/// intermediate state.
async fn replace_items<C>(db: &C, invoice_id: i64, items: &[DraftItem]) -> Result<()>
where
    C: ConnectionTrait,
{
    let removed = InvoiceItem::delete_many()
        .filter(invoice_item::Column::InvoiceId.eq(invoice_id))
        .exec(db)
        .await?;

    if !items.is_empty() {
        let rows = items.iter().map(|item| invoice_item::ActiveModel {
            invoice_id: Set(invoice_id),
            description: Set(item.description.clone()),
            quantity: Set(item.quantity),
            unit_price: Set(item.unit_price),
            total: Set(item.quantity * item.unit_price),
            ..Default::default()
        });
        InvoiceItem::insert_many(rows).exec(db).await?;
    }

    debug!(
        "Replaced items of invoice {}: {} removed, {} inserted",
        invoice_id,
        removed.rows_affected,
        items.len()
    );
    Ok(())
}

fn apply_draft(model: &mut invoice::ActiveModel, client_id: i64, draft: &InvoiceDraft) {
    let subtotal = draft.subtotal();
    model.client_id = Set(client_id);
    model.issue_date = Set(draft.issue_date);
    model.due_date = Set(draft.due_date);
    model.notes = Set(draft.notes());
    model.subtotal = Set(subtotal);
    model.total = Set(subtotal);
}

async fn load_for_update<C>(db: &C, invoice_id: i64) -> Result<invoice::Model>
where
    C: ConnectionTrait,
{
    get_invoice(db, invoice_id)
        .await?
        .ok_or(Error::InvoiceNotFound { id: invoice_id })
}

/// Persists the draft without user action.
///
/// Returns `Ok(None)` without writing anything unless a business profile
/// exists, at least one client exists, and the draft has a client selected.
/// Otherwise upserts the invoice and replaces its items in one transaction
/// and returns the backing id, which the caller passes back on the next
/// attempt. New rows are created as `draft`; an existing row keeps its status.
/// Draft rows get a refreshed provisional number; counters are never touched.
/// A sent invoice is never emptied: an item-less draft for it is skipped.
///
/// # Errors
/// `InvalidTransition` if the backing invoice has been paid, `InvoiceNotFound`
/// if it was deleted, `InvalidAmount` for non-finite or negative lines, or a
/// storage error (in which case nothing was written).
#[instrument(skip(db, draft))]
pub async fn autosave_draft(
    db: &DatabaseConnection,
    invoice_id: Option<i64>,
    draft: &InvoiceDraft,
) -> Result<Option<i64>> {
    let Some(client_id) = draft.selected_client() else {
        debug!("Auto-save skipped: no client selected");
        return Ok(None);
    };
    if !settings::has_business_profile(db).await? || client::count_clients(db).await? == 0 {
        debug!("Auto-save skipped: business profile or clients missing");
        return Ok(None);
    }
    draft.validate_amounts()?;

    let txn = db.begin().await?;

    let saved_id = match invoice_id {
        Some(id) => {
            let existing = load_for_update(&txn, id).await?;
            if !can_edit(&existing) {
                return Err(Error::InvalidTransition {
                    action: "edit",
                    status: existing.status,
                });
            }
            let status = existing.status;
            if status.is_finalized() && draft.items.is_empty() {
                debug!("Auto-save skipped: invoice {} would be left without items", id);
                return Ok(None);
            }
            let mut model: invoice::ActiveModel = existing.into();
            apply_draft(&mut model, client_id, draft);
            if status == InvoiceStatus::Draft {
                model.invoice_no = Set(preview_number(&txn, Sequence::Invoice).await?);
            }
            model.update(&txn).await?;
            id
        }
        None => {
            let mut model = invoice::ActiveModel {
                invoice_no: Set(preview_number(&txn, Sequence::Invoice).await?),
                status: Set(InvoiceStatus::Draft),
                created_at: Set(Utc::now()),
                ..Default::default()
            };
            apply_draft(&mut model, client_id, draft);
            let created = model.insert(&txn).await?;
            info!("Created draft invoice {} ({})", created.id, created.invoice_no);
            created.id
        }
    };

    replace_items(&txn, saved_id, &draft.items).await?;
    txn.commit().await?;

    debug!("Auto-saved invoice {}", saved_id);
    Ok(Some(saved_id))
}

/// Explicit save: moves a new or draft invoice to `sent`, or saves edits to
/// an invoice that is already sent.
///
/// A never-finalized invoice consumes the invoice counter and receives its
/// permanent number here, in the same transaction as the row and its items.
/// An already sent invoice keeps its number and status and the counter is
/// left alone.
///
/// # Errors
/// Validation errors (`SettingsMissing`, `Validation`, `ClientNotFound`,
/// `InvalidAmount`) are raised before anything is written. `InvalidTransition`
/// for a paid invoice. On a storage error the transaction is rolled back,
/// counter included.
#[instrument(skip(db, draft))]
pub async fn finalize_invoice(
    db: &DatabaseConnection,
    invoice_id: Option<i64>,
    draft: &InvoiceDraft,
) -> Result<invoice::Model> {
    if !settings::has_business_profile(db).await? {
        return Err(Error::SettingsMissing);
    }
    let client_id = draft
        .selected_client()
        .ok_or_else(|| Error::validation("Please select a client"))?;
    if draft.items.is_empty() {
        return Err(Error::validation("An invoice needs at least one item"));
    }
    draft.validate_amounts()?;
    if client::get_client(db, client_id).await?.is_none() {
        return Err(Error::ClientNotFound { id: client_id });
    }

    let txn = db.begin().await?;

    let existing = match invoice_id {
        Some(id) => Some(load_for_update(&txn, id).await?),
        None => None,
    };
    if let Some(current) = &existing {
        if !can_edit(current) {
            return Err(Error::InvalidTransition {
                action: "finalize",
                status: current.status,
            });
        }
    }

    let needs_number = existing
        .as_ref()
        .is_none_or(|current| !current.status.is_finalized());

    let permanent_no = if needs_number {
        Some(allocate_number(&txn, Sequence::Invoice).await?)
    } else {
        None
    };

    let mut model = match existing {
        Some(current) => current.into(),
        None => invoice::ActiveModel {
            created_at: Set(Utc::now()),
            ..Default::default()
        },
    };
    apply_draft(&mut model, client_id, draft);
    if let Some(number) = permanent_no {
        model.invoice_no = Set(number);
        model.status = Set(InvoiceStatus::Sent);
    }

    let saved = if invoice_id.is_some() {
        model.update(&txn).await?
    } else {
        model.insert(&txn).await?
    };
    replace_items(&txn, saved.id, &draft.items).await?;
    txn.commit().await?;

    if needs_number {
        info!("Invoice {} finalized as {}", saved.id, saved.invoice_no);
    } else {
        info!("Invoice {} ({}) updated", saved.id, saved.invoice_no);
    }
    Ok(saved)
}

/// Records full payment of a sent invoice.
///
/// In one transaction: consumes the receipt counter, inserts the receipt with
/// `amount_paid` equal to the invoice total, and sets the invoice to `paid`.
///
/// # Errors
/// `InvoiceNotFound`, `Validation` for a blank payment method,
/// `InvalidTransition` for drafts and already paid invoices, `ReceiptExists`
/// if a receipt is somehow already attached. Storage errors roll back the
/// counter, the receipt and the status change together.
#[instrument(skip(db, payment))]
pub async fn mark_invoice_paid(
    db: &DatabaseConnection,
    invoice_id: i64,
    payment: PaymentDetails,
) -> Result<PaidInvoice> {
    let method = payment.payment_method.trim();
    if method.is_empty() {
        return Err(Error::validation("Payment method cannot be empty"));
    }

    let txn = db.begin().await?;

    let current = load_for_update(&txn, invoice_id).await?;
    match current.status {
        InvoiceStatus::Sent | InvoiceStatus::Overdue => {}
        status @ (InvoiceStatus::Draft | InvoiceStatus::Paid) => {
            return Err(Error::InvalidTransition {
                action: "mark paid",
                status,
            });
        }
    }

    let prior = Receipt::find()
        .filter(receipt::Column::InvoiceId.eq(invoice_id))
        .one(&txn)
        .await?;
    if let Some(prior) = prior {
        return Err(Error::ReceiptExists {
            invoice_id,
            receipt_no: prior.receipt_no,
        });
    }

    let receipt_no = allocate_number(&txn, Sequence::Receipt).await?;
    let receipt = receipt::ActiveModel {
        receipt_no: Set(receipt_no),
        invoice_id: Set(invoice_id),
        paid_date: Set(payment.paid_date),
        payment_method: Set(method.to_string()),
        amount_paid: Set(current.total),
        notes: Set(payment
            .notes
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    let mut model: invoice::ActiveModel = current.into();
    model.status = Set(InvoiceStatus::Paid);
    let invoice = model.update(&txn).await?;

    txn.commit().await?;

    info!(
        "Invoice {} ({}) paid, receipt {}",
        invoice.id, invoice.invoice_no, receipt.receipt_no
    );
    Ok(PaidInvoice { invoice, receipt })
}

/// Deletes an invoice together with its items and receipt.
///
/// Its number is not reclaimed: counters only move forward.
#[instrument(skip(db))]
pub async fn delete_invoice(db: &DatabaseConnection, invoice_id: i64) -> Result<()> {
    let txn = db.begin().await?;

    load_for_update(&txn, invoice_id).await?;

    InvoiceItem::delete_many()
        .filter(invoice_item::Column::InvoiceId.eq(invoice_id))
        .exec(&txn)
        .await?;
    Receipt::delete_many()
        .filter(receipt::Column::InvoiceId.eq(invoice_id))
        .exec(&txn)
        .await?;
    Invoice::delete_by_id(invoice_id).exec(&txn).await?;

    txn.commit().await?;
    info!("Deleted invoice {}", invoice_id);
    Ok(())
}
