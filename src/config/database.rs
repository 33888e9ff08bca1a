//! Database configuration module.
//!
//! Handles the `SQLite` connection and table creation using `SeaORM`. Tables are
//! generated from the entity definitions with `Schema::create_table_from_entity`,
//! so the schema always matches the Rust structs. After the tables exist the
//! two document counters are seeded to 0 if missing.

use crate::core::counter::{self, Sequence};
use crate::entities::{BusinessSettings, Client, Counter, Invoice, InvoiceItem, Receipt};
use crate::errors::Result;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, EntityTrait, Schema};
use std::env::{self, VarError};
use tracing::{debug, info, instrument};

/// Fallback when neither `DATABASE_URL` nor `config.toml` names a database.
pub const DEFAULT_DATABASE_URL: &str = "sqlite://invoices.sqlite?mode=rwc";

/// Gets the database URL from `DATABASE_URL`, falling back to `configured`.
///
/// # Errors
/// `EnvVar` if `DATABASE_URL` is set but not valid unicode.
pub fn get_database_url(configured: &str) -> Result<String> {
    resolve_database_url(env::var("DATABASE_URL"), configured)
}

fn resolve_database_url(
    from_env: std::result::Result<String, VarError>,
    configured: &str,
) -> Result<String> {
    match from_env {
        Ok(url) => Ok(url),
        Err(VarError::NotPresent) => Ok(configured.to_string()),
        Err(e) => Err(e.into()),
    }
}

/// Opens the database, creates missing tables and seeds the counters.
#[instrument]
pub async fn create_connection(database_url: &str) -> Result<DatabaseConnection> {
    debug!("Connecting to {}", database_url);
    let db = Database::connect(database_url).await?;
    create_tables(&db).await?;
    seed_counters(&db).await?;
    info!("Database ready");
    Ok(db)
}

async fn create_table_for<E>(db: &DatabaseConnection, schema: &Schema, entity: E) -> Result<()>
where
    E: EntityTrait + Copy,
{
    let builder = db.get_database_backend();

    let mut table = schema.create_table_from_entity(entity);
    table.if_not_exists();
    db.execute(builder.build(&table)).await?;

    for mut index in schema.create_index_from_entity(entity) {
        index.if_not_exists();
        db.execute(builder.build(&index)).await?;
    }
    Ok(())
}

/// Creates every table (and its declared indexes) if it does not already exist.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let schema = Schema::new(db.get_database_backend());

    create_table_for(db, &schema, BusinessSettings).await?;
    create_table_for(db, &schema, Client).await?;
    create_table_for(db, &schema, Invoice).await?;
    create_table_for(db, &schema, InvoiceItem).await?;
    create_table_for(db, &schema, Receipt).await?;
    create_table_for(db, &schema, Counter).await?;

    Ok(())
}

/// Inserts the `invoice` and `receipt` counters at 0 unless they already exist.
pub async fn seed_counters(db: &DatabaseConnection) -> Result<()> {
    for sequence in Sequence::ALL {
        if counter::ensure_counter(db, sequence).await? {
            info!("Seeded {} counter", sequence.name());
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::entities::{
        ClientModel, CounterModel, InvoiceItemModel, InvoiceModel, ReceiptModel,
    };
    use sea_orm::QuerySelect;

    #[tokio::test]
    async fn test_create_connection_seeds_counters() -> Result<()> {
        let db = create_connection("sqlite::memory:").await?;

        let counters: Vec<CounterModel> = Counter::find().all(&db).await?;
        assert_eq!(counters.len(), 2);
        assert!(counters.iter().all(|c| c.value == 0));
        Ok(())
    }

    #[tokio::test]
    async fn test_create_tables_is_idempotent() -> Result<()> {
        let db = Database::connect("sqlite::memory:").await?;
        create_tables(&db).await?;
        create_tables(&db).await?;

        let _: Vec<ClientModel> = Client::find().limit(1).all(&db).await?;
        let _: Vec<InvoiceModel> = Invoice::find().limit(1).all(&db).await?;
        let _: Vec<InvoiceItemModel> = InvoiceItem::find().limit(1).all(&db).await?;
        let _: Vec<ReceiptModel> = Receipt::find().limit(1).all(&db).await?;
        Ok(())
    }

    #[test]
    fn test_database_url_prefers_environment() {
        let url = resolve_database_url(Ok("sqlite::memory:".to_string()), DEFAULT_DATABASE_URL);
        assert_eq!(url.unwrap(), "sqlite::memory:");

        let url = resolve_database_url(Err(VarError::NotPresent), DEFAULT_DATABASE_URL);
        assert_eq!(url.unwrap(), DEFAULT_DATABASE_URL);
    }

    #[test]
    fn test_non_unicode_database_url_is_env_error() {
        let garbled = VarError::NotUnicode(std::ffi::OsString::from("bad"));
        let result = resolve_database_url(Err(garbled), DEFAULT_DATABASE_URL);
        assert!(matches!(result, Err(crate::errors::Error::EnvVar(_))));
    }

    #[tokio::test]
    async fn test_seed_counters_keeps_existing_values() -> Result<()> {
        let db = create_connection("sqlite::memory:").await?;
        counter::increment_and_get(&db, Sequence::Invoice).await?;

        seed_counters(&db).await?;

        assert_eq!(counter::current_value(&db, Sequence::Invoice).await?, 1);
        Ok(())
    }
}
