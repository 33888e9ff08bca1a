//! Business settings - the singleton profile printed on every document.

use crate::{
    entities::{
        BusinessSettings,
        business_settings::{self, SETTINGS_ID},
    },
    errors::{Error, Result},
};
use sea_orm::{Set, prelude::*, sea_query::OnConflict};
use tracing::{info, instrument};

/// Largest accepted logo, measured on the stored data URL.
pub const MAX_LOGO_BYTES: usize = 2 * 1024 * 1024;

/// Everything the settings form submits.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SettingsInput {
    /// Must not be blank
    pub business_name: String,
    /// Company registration number
    pub registration_no: Option<String>,
    /// Business address
    pub address: String,
    /// Business email
    pub email: String,
    /// Business phone
    pub phone: String,
    /// Bank details printed under payment instructions
    pub bank_name: String,
    /// Account holder name
    pub bank_account_name: String,
    /// Account number
    pub bank_account_no: String,
    /// ISO code; upper-cased on save
    pub currency: String,
    /// Base64 data URL, at most [`MAX_LOGO_BYTES`]
    pub logo: Option<String>,
}

/// Returns the settings row, if it has ever been saved.
pub async fn get_settings<C>(db: &C) -> Result<Option<business_settings::Model>>
where
    C: ConnectionTrait,
{
    BusinessSettings::find_by_id(SETTINGS_ID)
        .one(db)
        .await
        .map_err(Into::into)
}

/// True when a settings row exists with a non-blank business name.
pub async fn has_business_profile<C>(db: &C) -> Result<bool>
where
    C: ConnectionTrait,
{
    Ok(get_settings(db)
        .await?
        .is_some_and(|s| !s.business_name.trim().is_empty()))
}

/// Creates the settings row on first call and overwrites it afterwards.
#[instrument(skip(db, input), fields(business_name = %input.business_name))]
pub async fn save_settings(
    db: &DatabaseConnection,
    input: SettingsInput,
) -> Result<business_settings::Model> {
    if input.business_name.trim().is_empty() {
        return Err(Error::validation("Business name cannot be empty"));
    }
    if input.currency.trim().is_empty() {
        return Err(Error::validation("Currency cannot be empty"));
    }
    if let Some(logo) = &input.logo {
        if logo.len() > MAX_LOGO_BYTES {
            return Err(Error::validation(format!(
                "Logo is too large ({} bytes, limit {MAX_LOGO_BYTES})",
                logo.len()
            )));
        }
    }

    let row = business_settings::ActiveModel {
        id: Set(SETTINGS_ID),
        business_name: Set(input.business_name.trim().to_string()),
        registration_no: Set(input.registration_no),
        address: Set(input.address),
        email: Set(input.email),
        phone: Set(input.phone),
        bank_name: Set(input.bank_name),
        bank_account_name: Set(input.bank_account_name),
        bank_account_no: Set(input.bank_account_no),
        currency: Set(input.currency.trim().to_uppercase()),
        logo: Set(input.logo),
    };

    BusinessSettings::insert(row)
        .on_conflict(
            OnConflict::column(business_settings::Column::Id)
                .update_columns([
                    business_settings::Column::BusinessName,
                    business_settings::Column::RegistrationNo,
                    business_settings::Column::Address,
                    business_settings::Column::Email,
                    business_settings::Column::Phone,
                    business_settings::Column::BankName,
                    business_settings::Column::BankAccountName,
                    business_settings::Column::BankAccountNo,
                    business_settings::Column::Currency,
                    business_settings::Column::Logo,
                ])
                .to_owned(),
        )
        .exec_without_returning(db)
        .await?;

    info!("Business settings saved");
    get_settings(db).await?.ok_or(Error::SettingsMissing)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;

    #[tokio::test]
    async fn test_settings_absent_on_fresh_store() -> Result<()> {
        let db = setup_test_db().await?;
        assert!(get_settings(&db).await?.is_none());
        assert!(!has_business_profile(&db).await?);
        Ok(())
    }

    #[tokio::test]
    async fn test_save_creates_then_updates_in_place() -> Result<()> {
        let db = setup_test_db().await?;

        let first = save_settings(&db, test_settings_input("Acme")).await?;
        assert_eq!(first.id, SETTINGS_ID);
        assert_eq!(first.business_name, "Acme");

        let mut changed = test_settings_input("Acme Studio");
        changed.currency = "usd".to_string();
        let second = save_settings(&db, changed).await?;
        assert_eq!(second.id, SETTINGS_ID);
        assert_eq!(second.business_name, "Acme Studio");
        assert_eq!(second.currency, "USD");

        assert_eq!(BusinessSettings::find().all(&db).await?.len(), 1);
        assert!(has_business_profile(&db).await?);
        Ok(())
    }

    #[tokio::test]
    async fn test_save_rejects_blank_name_and_huge_logo() -> Result<()> {
        let db = setup_test_db().await?;

        let result = save_settings(&db, test_settings_input("   ")).await;
        assert!(matches!(result, Err(Error::Validation { .. })));

        let mut with_logo = test_settings_input("Acme");
        with_logo.logo = Some("x".repeat(MAX_LOGO_BYTES + 1));
        let result = save_settings(&db, with_logo).await;
        assert!(matches!(result, Err(Error::Validation { .. })));

        assert!(get_settings(&db).await?.is_none());
        Ok(())
    }
}
