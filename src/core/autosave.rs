//! Debounced auto-save of the open invoice draft.
//!
//! Every [`AutoSaver::edit`] replaces the pending draft and restarts the quiet
//! window. A save fires only once no edit has arrived for the whole window.
//! An edit without a selected client cancels the pending save and arms nothing.
//! A save that has started always runs to completion; [`AutoSaver::close`]
//! waits for it and discards any edit still waiting for its window.

use crate::{
    core::invoice::{InvoiceDraft, autosave_draft},
    errors::{Error, Result},
};
use chrono::{DateTime, Utc};
use sea_orm::DatabaseConnection;
use std::{future::Future, time::Duration};
use tokio::{
    sync::{mpsc, watch},
    task::JoinHandle,
    time::sleep,
};
use tracing::{debug, info, warn};

/// Where a debounced draft ends up.
pub trait DraftStore: Send + 'static {
    /// Writes `draft`, returning the backing invoice id, or `None` when the
    /// draft was not eligible for saving.
    fn persist(&mut self, draft: &InvoiceDraft) -> impl Future<Output = Result<Option<i64>>> + Send;
}

/// Persists drafts through [`autosave_draft`], remembering the backing id
/// once the first save has created the row.
#[derive(Debug)]
pub struct DatabaseDraftStore {
    db: DatabaseConnection,
    invoice_id: Option<i64>,
}

impl DatabaseDraftStore {
    /// `invoice_id` is `Some` when editing an invoice that already exists.
    #[must_use]
    pub fn new(db: DatabaseConnection, invoice_id: Option<i64>) -> Self {
        Self { db, invoice_id }
    }

    /// Connection the drafts are written to.
    #[must_use]
    pub const fn connection(&self) -> &DatabaseConnection {
        &self.db
    }

    /// Backing invoice, once the first save has created it.
    #[must_use]
    pub const fn invoice_id(&self) -> Option<i64> {
        self.invoice_id
    }
}

impl DraftStore for DatabaseDraftStore {
    async fn persist(&mut self, draft: &InvoiceDraft) -> Result<Option<i64>> {
        let saved = autosave_draft(&self.db, self.invoice_id, draft).await?;
        if saved.is_some() {
            self.invoice_id = saved;
        }
        Ok(saved)
    }
}

/// Observable state of an editing session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AutoSaveStatus {
    /// Backing invoice, once one exists
    pub invoice_id: Option<i64>,
    /// Number of save attempts that reached the store, failed ones included
    pub attempts: u64,
    /// Number of attempts that wrote the draft
    pub saves: u64,
    /// Time of the last successful save
    pub last_saved: Option<DateTime<Utc>>,
    /// Message of the most recent failed attempt; cleared by the next success
    pub last_error: Option<String>,
}

/// Handle to a running auto-save task for one editing session.
#[derive(Debug)]
pub struct AutoSaver {
    edits: mpsc::UnboundedSender<InvoiceDraft>,
    status: watch::Receiver<AutoSaveStatus>,
    task: JoinHandle<()>,
}

impl AutoSaver {
    /// Spawns the debounce task on the current tokio runtime.
    pub fn spawn<S>(store: S, window: Duration, invoice_id: Option<i64>) -> Self
    where
        S: DraftStore,
    {
        let (edits, rx) = mpsc::unbounded_channel();
        let (status_tx, status) = watch::channel(AutoSaveStatus {
            invoice_id,
            ..AutoSaveStatus::default()
        });
        let task = tokio::spawn(run_debounce(store, window, rx, status_tx));
        info!("Auto-save started with a {:?} window", window);
        Self {
            edits,
            status,
            task,
        }
    }

    /// Records the latest form state, cancelling any save not yet fired.
    ///
    /// # Errors
    /// `AutoSave` if the background task is gone.
    pub fn edit(&self, draft: InvoiceDraft) -> Result<()> {
        self.edits.send(draft).map_err(|_| Error::AutoSave {
            message: "auto-save task has stopped".to_string(),
        })
    }

    /// Snapshot of the session state.
    #[must_use]
    pub fn status(&self) -> AutoSaveStatus {
        self.status.borrow().clone()
    }

    /// A receiver that is notified after every fired attempt.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<AutoSaveStatus> {
        self.status.clone()
    }

    /// Ends the session. An attempt already running finishes; an edit still
    /// inside its quiet window is dropped.
    ///
    /// # Errors
    /// `AutoSave` if the background task panicked.
    pub async fn close(self) -> Result<AutoSaveStatus> {
        let Self {
            edits,
            status,
            task,
        } = self;
        drop(edits);
        task.await.map_err(|e| Error::AutoSave {
            message: e.to_string(),
        })?;
        let last = status.borrow().clone();
        Ok(last)
    }
}

fn schedulable(draft: InvoiceDraft) -> Option<InvoiceDraft> {
    if draft.has_client_selected() {
        Some(draft)
    } else {
        debug!("Auto-save not scheduled: no client selected");
        None
    }
}

async fn run_debounce<S>(
    mut store: S,
    window: Duration,
    mut edits: mpsc::UnboundedReceiver<InvoiceDraft>,
    status: watch::Sender<AutoSaveStatus>,
) where
    S: DraftStore,
{
    let mut pending: Option<InvoiceDraft> = None;

    loop {
        let Some(draft) = pending.take() else {
            match edits.recv().await {
                Some(draft) => pending = schedulable(draft),
                None => break,
            }
            continue;
        };

        tokio::select! {
            next = edits.recv() => match next {
                Some(newer) => pending = schedulable(newer),
                None => {
                    debug!("Auto-save closed with an unsaved edit pending");
                    break;
                }
            },
            () = sleep(window) => {
                match store.persist(&draft).await {
                    Ok(Some(id)) => status.send_modify(|s| {
                        s.attempts += 1;
                        s.invoice_id = Some(id);
                        s.saves += 1;
                        s.last_saved = Some(Utc::now());
                        s.last_error = None;
                    }),
                    Ok(None) => debug!("Auto-save skipped: preconditions not met"),
                    Err(e) => {
                        warn!("Auto-save failed: {}", e);
                        status.send_modify(|s| {
                            s.attempts += 1;
                            s.last_error = Some(e.to_string());
                        });
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::core::invoice::{DraftItem, get_invoice, get_invoice_items};
    use crate::entities::InvoiceStatus;
    use crate::test_utils::*;
    use std::sync::{Arc, Mutex};
    use tokio::time::Instant;

    /// Records when each attempt fired and what it saw.
    #[derive(Clone, Default)]
    struct RecordingStore {
        calls: Arc<Mutex<Vec<(Instant, InvoiceDraft)>>>,
    }

    impl DraftStore for RecordingStore {
        async fn persist(&mut self, draft: &InvoiceDraft) -> Result<Option<i64>> {
            self.calls
                .lock()
                .unwrap()
                .push((Instant::now(), draft.clone()));
            Ok(Some(7))
        }
    }

    fn draft_with_notes(notes: &str) -> InvoiceDraft {
        let mut draft = sample_draft(1);
        draft.notes = Some(notes.to_string());
        draft
    }

    const WINDOW: Duration = Duration::from_millis(1500);

    #[tokio::test(start_paused = true)]
    async fn test_burst_of_edits_saves_once_after_quiet_window() -> Result<()> {
        let store = RecordingStore::default();
        let calls = Arc::clone(&store.calls);
        let saver = AutoSaver::spawn(store, WINDOW, None);
        let start = Instant::now();

        saver.edit(draft_with_notes("a"))?;
        sleep(Duration::from_millis(500)).await;
        saver.edit(draft_with_notes("b"))?;
        sleep(Duration::from_millis(500)).await;
        saver.edit(draft_with_notes("c"))?;

        sleep(Duration::from_millis(1499)).await;
        assert!(calls.lock().unwrap().is_empty());

        sleep(Duration::from_millis(10)).await;

        {
            let calls = calls.lock().unwrap();
            assert_eq!(calls.len(), 1);
            assert!(calls[0].0 - start >= Duration::from_millis(2500));
            assert_eq!(calls[0].1.notes.as_deref(), Some("c"));
        }

        let status = saver.close().await?;
        assert_eq!(status.attempts, 1);
        assert_eq!(status.saves, 1);
        assert_eq!(status.invoice_id, Some(7));
        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn test_separated_edits_save_separately() -> Result<()> {
        let store = RecordingStore::default();
        let calls = Arc::clone(&store.calls);
        let saver = AutoSaver::spawn(store, WINDOW, None);

        saver.edit(draft_with_notes("first"))?;
        sleep(Duration::from_millis(2000)).await;
        saver.edit(draft_with_notes("second"))?;
        sleep(Duration::from_millis(2000)).await;

        let status = saver.close().await?;
        assert_eq!(calls.lock().unwrap().len(), 2);
        assert_eq!(status.saves, 2);
        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn test_close_drops_edit_inside_window() -> Result<()> {
        let store = RecordingStore::default();
        let calls = Arc::clone(&store.calls);
        let saver = AutoSaver::spawn(store, WINDOW, None);

        saver.edit(draft_with_notes("unsaved"))?;
        sleep(Duration::from_millis(1000)).await;

        let status = saver.close().await?;
        assert!(calls.lock().unwrap().is_empty());
        assert_eq!(status.attempts, 0);
        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn test_edit_without_client_schedules_nothing() -> Result<()> {
        let store = RecordingStore::default();
        let calls = Arc::clone(&store.calls);
        let saver = AutoSaver::spawn(store, WINDOW, None);

        let mut unselected = draft_with_notes("no client");
        unselected.client_id = None;
        saver.edit(unselected)?;
        sleep(Duration::from_millis(2000)).await;
        assert!(calls.lock().unwrap().is_empty());

        // Deselecting the client also cancels a save that was already armed.
        saver.edit(draft_with_notes("armed"))?;
        sleep(Duration::from_millis(500)).await;
        let mut zero = draft_with_notes("client 0");
        zero.client_id = Some(0);
        saver.edit(zero)?;
        sleep(Duration::from_millis(3000)).await;

        let status = saver.close().await?;
        assert!(calls.lock().unwrap().is_empty());
        assert_eq!(status.attempts, 0);
        Ok(())
    }

    /// Answers every save with "not eligible".
    #[derive(Clone, Default)]
    struct IneligibleStore {
        calls: Arc<Mutex<u32>>,
    }

    impl DraftStore for IneligibleStore {
        async fn persist(&mut self, _draft: &InvoiceDraft) -> Result<Option<i64>> {
            *self.calls.lock().unwrap() += 1;
            Ok(None)
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_ineligible_draft_is_not_counted_as_attempt() -> Result<()> {
        let store = IneligibleStore::default();
        let calls = Arc::clone(&store.calls);
        let saver = AutoSaver::spawn(store, WINDOW, None);

        saver.edit(draft_with_notes("no profile yet"))?;
        sleep(Duration::from_millis(2000)).await;

        let status = saver.close().await?;
        assert_eq!(*calls.lock().unwrap(), 1);
        assert_eq!(status.attempts, 0);
        assert_eq!(status.saves, 0);
        assert_eq!(status.invoice_id, None);
        Ok(())
    }

    #[tokio::test]
    async fn test_database_store_creates_then_updates_one_draft() -> Result<()> {
        let (db, bob) = setup_with_profile().await?;
        let mut store = DatabaseDraftStore::new(db, None);

        let first = store.persist(&sample_draft(bob.id)).await?.unwrap();
        assert_eq!(store.invoice_id(), Some(first));

        let mut edited = sample_draft(bob.id);
        edited.add_item(DraftItem::new("Hosting", 1.0, 20.0));
        let second = store.persist(&edited).await?.unwrap();
        assert_eq!(first, second);

        let db = store.connection();
        let stored = get_invoice(db, first).await?.unwrap();
        assert_eq!(stored.status, InvoiceStatus::Draft);
        assert_eq!(stored.total, 120.0);
        assert_eq!(get_invoice_items(db, first).await?.len(), 2);
        Ok(())
    }

    #[tokio::test]
    async fn test_database_store_skips_without_client() -> Result<()> {
        let (db, _bob) = setup_with_profile().await?;
        let mut store = DatabaseDraftStore::new(db, None);

        let mut draft = sample_draft(1);
        draft.client_id = None;
        assert_eq!(store.persist(&draft).await?, None);
        Ok(())
    }

    #[tokio::test]
    async fn test_failed_attempt_is_reported_in_status() -> Result<()> {
        let (db, bob) = setup_with_profile().await?;
        fail_inserts_into(&db, "invoices").await?;
        let saver = AutoSaver::spawn(DatabaseDraftStore::new(db, None), Duration::from_millis(10), None);
        let mut status = saver.subscribe();

        saver.edit(sample_draft(bob.id))?;
        status.changed().await.unwrap();

        let seen = status.borrow().clone();
        assert_eq!(seen.attempts, 1);
        assert_eq!(seen.saves, 0);
        assert!(seen.last_error.is_some());
        saver.close().await?;
        Ok(())
    }
}
