//! Client management - create, edit, delete and search clients.
//!
//! Deleting a client never touches invoices; see `core::report` for how a
//! dangling `client_id` is displayed.

use crate::{
    entities::{Client, client},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, prelude::*};
use tracing::{info, instrument, warn};

/// Fields of the client form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientInput {
    /// Contact name; must not be blank
    pub name: String,
    /// Company name
    pub company: Option<String>,
    /// Contact email
    pub email: Option<String>,
    /// Contact phone
    pub phone: Option<String>,
    /// Postal address, printed on invoices
    pub address: Option<String>,
}

impl ClientInput {
    /// A client with only a name.
    #[must_use]
    pub fn named(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Self::default()
        }
    }
}

fn blank_to_none(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn validated_name(input: &ClientInput) -> Result<String> {
    let name = input.name.trim();
    if name.is_empty() {
        return Err(Error::validation("Client name cannot be empty"));
    }
    Ok(name.to_string())
}

/// Adds a new client.
#[instrument(skip(db, input), fields(name = %input.name))]
pub async fn create_client(db: &DatabaseConnection, input: ClientInput) -> Result<client::Model> {
    let name = validated_name(&input)?;

    let model = client::ActiveModel {
        name: Set(name),
        company: Set(blank_to_none(input.company)),
        email: Set(blank_to_none(input.email)),
        phone: Set(blank_to_none(input.phone)),
        address: Set(blank_to_none(input.address)),
        ..Default::default()
    };

    let created = model.insert(db).await?;
    info!("Created client {}", created.id);
    Ok(created)
}

/// Replaces every field of an existing client.
#[instrument(skip(db, input))]
pub async fn update_client(
    db: &DatabaseConnection,
    client_id: i64,
    input: ClientInput,
) -> Result<client::Model> {
    let name = validated_name(&input)?;
    let existing = get_client(db, client_id)
        .await?
        .ok_or(Error::ClientNotFound { id: client_id })?;

    let mut model: client::ActiveModel = existing.into();
    model.name = Set(name);
    model.company = Set(blank_to_none(input.company));
    model.email = Set(blank_to_none(input.email));
    model.phone = Set(blank_to_none(input.phone));
    model.address = Set(blank_to_none(input.address));

    model.update(db).await.map_err(Into::into)
}

/// Removes a client. Invoices addressed to it are left untouched.
#[instrument(skip(db))]
pub async fn delete_client(db: &DatabaseConnection, client_id: i64) -> Result<()> {
    let result = Client::delete_by_id(client_id).exec(db).await?;
    if result.rows_affected == 0 {
        return Err(Error::ClientNotFound { id: client_id });
    }
    warn!("Deleted client {}; existing invoices keep their client_id", client_id);
    Ok(())
}

/// Looks up one client.
pub async fn get_client<C>(db: &C, client_id: i64) -> Result<Option<client::Model>>
where
    C: ConnectionTrait,
{
    Client::find_by_id(client_id).one(db).await.map_err(Into::into)
}

/// All clients ordered by name.
pub async fn list_clients<C>(db: &C) -> Result<Vec<client::Model>>
where
    C: ConnectionTrait,
{
    Client::find()
        .order_by_asc(client::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Number of stored clients.
pub async fn count_clients<C>(db: &C) -> Result<u64>
where
    C: ConnectionTrait,
{
    Client::find().count(db).await.map_err(Into::into)
}

/// Clients whose name or company contains `term`, ignoring case.
pub async fn search_clients<C>(db: &C, term: &str) -> Result<Vec<client::Model>>
where
    C: ConnectionTrait,
{
    let needle = term.trim().to_lowercase();
    let clients = list_clients(db).await?;
    if needle.is_empty() {
        return Ok(clients);
    }
    Ok(clients
        .into_iter()
        .filter(|c| {
            c.name.to_lowercase().contains(&needle)
                || c
                    .company
                    .as_deref()
                    .is_some_and(|company| company.to_lowercase().contains(&needle))
        })
        .collect())
}
