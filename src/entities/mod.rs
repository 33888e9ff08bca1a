//! Entity module - SeaORM definitions for every table in the invoicing store.
//! Each entity has a Model struct for data and an Entity struct for operations.
//!
//! No entity declares a `belongs_to` relation: invoices keep a plain
//! `client_id`, so deleting a client leaves a dangling reference that readers
//! resolve to "Unknown Client".

/// Singleton business profile
pub mod business_settings;
/// Clients invoices are addressed to
pub mod client;
/// Sequence counters behind document numbers
pub mod counter;
/// Invoice headers and [`InvoiceStatus`]
pub mod invoice;
/// Invoice line items
pub mod invoice_item;
/// Payment receipts
pub mod receipt;

pub use business_settings::{
    Column as BusinessSettingsColumn, Entity as BusinessSettings, Model as BusinessSettingsModel,
};
pub use client::{Column as ClientColumn, Entity as Client, Model as ClientModel};
pub use counter::{Column as CounterColumn, Entity as Counter, Model as CounterModel};
pub use invoice::{Column as InvoiceColumn, Entity as Invoice, InvoiceStatus, Model as InvoiceModel};
pub use invoice_item::{
    Column as InvoiceItemColumn, Entity as InvoiceItem, Model as InvoiceItemModel,
};
pub use receipt::{Column as ReceiptColumn, Entity as Receipt, Model as ReceiptModel};
