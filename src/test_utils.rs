//! Shared test utilities for the invoicing core.
//!
//! Helpers for building an in-memory store, seeding a business profile and
//! clients, and simulating write failures inside a transaction.

#![allow(clippy::unwrap_used)]

use crate::{
    config::database::create_connection,
    core::{
        client::{self, ClientInput},
        invoice::{DraftItem, InvoiceDraft, PaymentDetails},
        settings::{self, SettingsInput},
    },
    entities::{InvoiceStatus, business_settings, client as client_entity, invoice},
    errors::Result,
};
use chrono::{NaiveDate, TimeZone, Utc};
use sea_orm::{ConnectionTrait, DatabaseConnection};

/// Creates an in-memory `SQLite` store with all tables and counters initialized.
/// This is the standard setup for all database tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    create_connection("sqlite::memory:").await
}

/// Store with business settings "Acme" and one client "Bob".
pub async fn setup_with_profile() -> Result<(DatabaseConnection, client_entity::Model)> {
    let db = setup_test_db().await?;
    create_test_settings(&db, "Acme").await?;
    let bob = create_test_client(&db, "Bob").await?;
    Ok((db, bob))
}

/// Settings form input with sensible defaults.
///
/// # Defaults
/// * `currency`: "MYR"
/// * `logo`: None
pub fn test_settings_input(business_name: &str) -> SettingsInput {
    SettingsInput {
        business_name: business_name.to_string(),
        registration_no: Some("202501000001".to_string()),
        address: "1 Jalan Test, Kuala Lumpur".to_string(),
        email: "billing@example.com".to_string(),
        phone: "+60 3-1234 5678".to_string(),
        bank_name: "Test Bank".to_string(),
        bank_account_name: business_name.to_string(),
        bank_account_no: "1234567890".to_string(),
        currency: "MYR".to_string(),
        logo: None,
    }
}

/// The row `save_settings` would store for [`test_settings_input`].
/// Used to feed `MockDatabase` query results.
pub fn test_settings_model(business_name: &str) -> business_settings::Model {
    let input = test_settings_input(business_name);
    business_settings::Model {
        id: business_settings::SETTINGS_ID,
        business_name: input.business_name,
        registration_no: input.registration_no,
        address: input.address,
        email: input.email,
        phone: input.phone,
        bank_name: input.bank_name,
        bank_account_name: input.bank_account_name,
        bank_account_no: input.bank_account_no,
        currency: input.currency,
        logo: input.logo,
    }
}

/// Saves [`test_settings_input`] as the business profile.
pub async fn create_test_settings(
    db: &DatabaseConnection,
    business_name: &str,
) -> Result<business_settings::Model> {
    settings::save_settings(db, test_settings_input(business_name)).await
}

/// Creates a client with only a name.
pub async fn create_test_client(db: &DatabaseConnection, name: &str) -> Result<client_entity::Model> {
    client::create_client(db, ClientInput::named(name)).await
}

/// Shorthand for a valid calendar date.
pub fn test_date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

/// Draft for `client_id` with one item "Design", 2 x 50.00, issued
/// 2025-01-01 and due 2025-01-15.
pub fn sample_draft(client_id: i64) -> InvoiceDraft {
    let mut draft = InvoiceDraft::new(test_date(2025, 1, 1), 14);
    draft.client_id = Some(client_id);
    draft.items = vec![DraftItem::new("Design", 2.0, 50.0)];
    draft
}

/// Cash payment received on 2025-01-10.
pub fn cash_payment() -> PaymentDetails {
    PaymentDetails {
        paid_date: test_date(2025, 1, 10),
        payment_method: "Cash".to_string(),
        notes: None,
    }
}

/// Unsaved invoice header for pure status checks.
pub fn test_invoice_model(status: InvoiceStatus) -> invoice::Model {
    invoice::Model {
        id: 1,
        invoice_no: "INV-2025-001".to_string(),
        client_id: 1,
        issue_date: test_date(2025, 1, 1),
        due_date: test_date(2025, 1, 15),
        status,
        notes: None,
        subtotal: 100.0,
        total: 100.0,
        created_at: Utc.with_ymd_and_hms(2025, 1, 1, 9, 0, 0).unwrap(),
    }
}

/// Makes every insert into `table` abort, so a transaction fails midway.
pub async fn fail_inserts_into<C>(db: &C, table: &str) -> Result<()>
where
    C: ConnectionTrait,
{
    db.execute_unprepared(&format!(
        "CREATE TRIGGER fail_{table}_insert BEFORE INSERT ON {table} \
         BEGIN SELECT RAISE(ABORT, 'simulated write failure'); END;"
    ))
    .await?;
    Ok(())
}

/// Removes the trigger installed by [`fail_inserts_into`].
pub async fn clear_insert_failure<C>(db: &C, table: &str) -> Result<()>
where
    C: ConnectionTrait,
{
    db.execute_unprepared(&format!("DROP TRIGGER IF EXISTS fail_{table}_insert;"))
        .await?;
    Ok(())
}

/// Makes every delete from `table` abort.
pub async fn fail_deletes_from<C>(db: &C, table: &str) -> Result<()>
where
    C: ConnectionTrait,
{
    db.execute_unprepared(&format!(
        "CREATE TRIGGER fail_{table}_delete BEFORE DELETE ON {table} \
         BEGIN SELECT RAISE(ABORT, 'simulated write failure'); END;"
    ))
    .await?;
    Ok(())
}
