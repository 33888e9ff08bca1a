//! Core business logic - framework-agnostic operations over the invoicing store.
//!
//! Everything here takes a SeaORM connection (or transaction) and returns
//! [`crate::errors::Result`]. Status changes happen only in [`invoice`].

/// Counter reset and full data wipe
pub mod admin;
/// Debounced draft persistence
pub mod autosave;
/// Client CRUD and search
pub mod client;
/// Named monotonic counters backing document numbers
pub mod counter;
/// Read-only snapshot for spreadsheet export
pub mod export;
/// Invoice drafting model and lifecycle transitions
pub mod invoice;
/// `INV-YYYY-NNN` / `RCT-YYYY-NNN` formatting and allocation
pub mod numbering;
/// Receipt lookups
pub mod receipt;
/// Dashboard, invoice listing and renderer bundles
pub mod report;
/// Singleton business profile
pub mod settings;
