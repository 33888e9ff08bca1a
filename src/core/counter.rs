//! Sequence counters - named, persisted, monotonic integers.
//!
//! Each counter stores the last value handed out. `peek_next` is read-only and
//! feeds draft previews; `increment_and_get` is the only way a value is
//! consumed, and callers pass the open transaction so the bump commits or rolls
//! back together with the row it numbers.

use crate::{
    entities::{Counter, counter},
    errors::Result,
};
use sea_orm::{Set, prelude::*, sea_query::Expr};
use tracing::{debug, info};

/// The two independent document sequences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sequence {
    /// Numbers invoices (`INV`)
    Invoice,
    /// Numbers receipts (`RCT`)
    Receipt,
}

impl Sequence {
    /// Every sequence, in seeding order
    pub const ALL: [Self; 2] = [Self::Invoice, Self::Receipt];

    /// Row key in the `counters` table
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Invoice => "invoice",
            Self::Receipt => "receipt",
        }
    }

    /// Prefix of the document numbers derived from this sequence
    #[must_use]
    pub const fn prefix(self) -> &'static str {
        match self {
            Self::Invoice => "INV",
            Self::Receipt => "RCT",
        }
    }
}

async fn insert_counter<C>(db: &C, sequence: Sequence, value: i64) -> Result<()>
where
    C: ConnectionTrait,
{
    let row = counter::ActiveModel {
        name: Set(sequence.name().to_string()),
        value: Set(value),
    };
    Counter::insert(row).exec_without_returning(db).await?;
    Ok(())
}

/// Creates the counter row at 0 if it is missing. Returns whether a row was inserted.
pub async fn ensure_counter<C>(db: &C, sequence: Sequence) -> Result<bool>
where
    C: ConnectionTrait,
{
    if Counter::find_by_id(sequence.name()).one(db).await?.is_some() {
        return Ok(false);
    }
    insert_counter(db, sequence, 0).await?;
    Ok(true)
}

/// Last value handed out, or 0 when the counter row does not exist yet.
pub async fn current_value<C>(db: &C, sequence: Sequence) -> Result<i64>
where
    C: ConnectionTrait,
{
    Ok(Counter::find_by_id(sequence.name())
        .one(db)
        .await?
        .map_or(0, |row| row.value))
}

/// The value the next `increment_and_get` would return. Does not write.
pub async fn peek_next<C>(db: &C, sequence: Sequence) -> Result<i64>
where
    C: ConnectionTrait,
{
    Ok(current_value(db, sequence).await? + 1)
}

/// Consumes the next value of the sequence and returns it.
///
/// The bump is a single `UPDATE counters SET value = value + 1` so two
/// allocations can never observe the same value. Pass the transaction that
/// writes the numbered row.
pub async fn increment_and_get<C>(db: &C, sequence: Sequence) -> Result<i64>
where
    C: ConnectionTrait,
{
    let updated = Counter::update_many()
        .col_expr(
            counter::Column::Value,
            Expr::col(counter::Column::Value).add(1),
        )
        .filter(counter::Column::Name.eq(sequence.name()))
        .exec(db)
        .await?;

    if updated.rows_affected == 0 {
        // Fresh store that was never seeded: the first allocation is 1.
        insert_counter(db, sequence, 1).await?;
        debug!("Counter {} created at 1", sequence.name());
        return Ok(1);
    }

    let value = current_value(db, sequence).await?;
    debug!("Counter {} advanced to {}", sequence.name(), value);
    Ok(value)
}

/// Sets the counter back to 0 so the next document is number 1 again.
pub async fn reset<C>(db: &C, sequence: Sequence) -> Result<()>
where
    C: ConnectionTrait,
{
    let updated = Counter::update_many()
        .col_expr(counter::Column::Value, Expr::value(0_i64))
        .filter(counter::Column::Name.eq(sequence.name()))
        .exec(db)
        .await?;

    if updated.rows_affected == 0 {
        insert_counter(db, sequence, 0).await?;
    }
    info!("Counter {} reset to 0", sequence.name());
    Ok(())
}
