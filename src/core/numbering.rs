//! Document numbering - turns a counter value and calendar year into
//! `INV-2025-001` / `RCT-2025-014` style identifiers.
//!
//! The year is the calendar year when the number is assigned, not the
//! invoice's issue date. Values are zero-padded to three digits and grow past
//! 999 without truncation. Nothing here resets on year rollover; that is the
//! job of the administrative counter reset.

use crate::core::counter::{self, Sequence};
use crate::errors::Result;
use chrono::{Datelike, Local};
use sea_orm::ConnectionTrait;

/// Formats `<PREFIX>-<year>-<value padded to 3>`.
#[must_use]
pub fn format_document_number(sequence: Sequence, year: i32, value: i64) -> String {
    format!("{}-{year}-{value:03}", sequence.prefix())
}

/// Calendar year on the local clock.
#[must_use]
pub fn current_year() -> i32 {
    Local::now().year()
}

/// Non-binding number the next document of `sequence` would receive.
pub async fn preview_number<C>(db: &C, sequence: Sequence) -> Result<String>
where
    C: ConnectionTrait,
{
    let value = counter::peek_next(db, sequence).await?;
    Ok(format_document_number(sequence, current_year(), value))
}

/// Consumes the next counter value and returns its permanent number.
///
/// Must run inside the transaction that stores the numbered document.
pub async fn allocate_number<C>(db: &C, sequence: Sequence) -> Result<String>
where
    C: ConnectionTrait,
{
    let value = counter::increment_and_get(db, sequence).await?;
    Ok(format_document_number(sequence, current_year(), value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::setup_test_db;

    #[test]
    fn test_format_pads_to_three_digits() {
        assert_eq!(format_document_number(Sequence::Invoice, 2025, 1), "INV-2025-001");
        assert_eq!(format_document_number(Sequence::Receipt, 2025, 14), "RCT-2025-014");
        assert_eq!(format_document_number(Sequence::Invoice, 2026, 999), "INV-2026-999");
    }

    #[test]
    fn test_format_extends_past_three_digits() {
        assert_eq!(format_document_number(Sequence::Invoice, 2025, 1000), "INV-2025-1000");
        assert_eq!(format_document_number(Sequence::Receipt, 2025, 12345), "RCT-2025-12345");
    }

    #[tokio::test]
    async fn test_preview_then_allocate() -> Result<()> {
        let db = setup_test_db().await?;
        let year = current_year();

        let preview = preview_number(&db, Sequence::Invoice).await?;
        assert_eq!(preview, format!("INV-{year}-001"));

        let allocated = allocate_number(&db, Sequence::Invoice).await?;
        assert_eq!(allocated, preview);

        let next_preview = preview_number(&db, Sequence::Invoice).await?;
        assert_eq!(next_preview, format!("INV-{year}-002"));
        Ok(())
    }
}
