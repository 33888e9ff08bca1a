//! `freelance-invoicer` - local-first invoicing for a single freelancer
//!
//! Business settings, clients, invoices with line items, and receipts, kept in
//! a local SQLite store. Invoice and receipt numbers come from persisted
//! counters that are bumped in the same transaction as the row they number.

// Deny lints that point at real bugs
#![deny(
    unsafe_code,
    unsafe_op_in_unsafe_fn,
    unreachable_code,
    unreachable_patterns,
    unused_must_use,
    rustdoc::broken_intra_doc_links,
    rustdoc::private_intra_doc_links,
)]
// Warn on things that should be fixed but aren't necessarily bugs
#![warn(
    missing_docs,

    clippy::all,
    clippy::pedantic,
    clippy::nursery,

    clippy::clone_on_ref_ptr,
    clippy::dbg_macro,
    clippy::expect_used,
    clippy::float_cmp,
    clippy::panic,
    clippy::todo,
    clippy::unimplemented,
    clippy::unwrap_used,

    clippy::cognitive_complexity,
    clippy::large_enum_variant,
    clippy::too_many_lines,

    clippy::enum_glob_use,
    clippy::semicolon_if_nothing_returned,
    clippy::wildcard_imports,

    future_incompatible,
    rust_2018_idioms,
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::cast_precision_loss,
)]

// `missing_docs` stays a warning: SeaORM derives generate undocumented items
// (`Column`, `ActiveModel`, `PrimaryKey`).

/// Configuration: database connection and `config.toml`
pub mod config;
/// Core business logic - lifecycle, numbering, auto-save, reporting
pub mod core;
/// SeaORM entity definitions for database tables
pub mod entities;
/// Unified error types and result handling
pub mod errors;

/// Fixtures and helpers for unit tests
#[cfg(test)]
pub mod test_utils;
