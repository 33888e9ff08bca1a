use chrono::Local;
use dotenvy::dotenv;
use freelance_invoicer::{
    config::{self, app::InvoicingConfig, database},
    core::autosave::{AutoSaver, DatabaseDraftStore},
    core::counter::Sequence,
    core::invoice::InvoiceDraft,
    core::{admin, client, numbering, report},
    errors::{Error, Result},
};
use sea_orm::DatabaseConnection;
use std::env;
use tokio::time::timeout;
use tracing::{error, info, warn};

/// Opens a new draft for `client_id` and lets auto-save store it.
async fn start_draft(
    db: DatabaseConnection,
    client_id: i64,
    invoicing: &InvoicingConfig,
) -> Result<()> {
    let mut draft = InvoiceDraft::new(Local::now().date_naive(), invoicing.default_due_days);
    draft.client_id = Some(client_id);

    let window = invoicing.autosave_debounce();
    let saver = AutoSaver::spawn(DatabaseDraftStore::new(db, None), window, None);
    let mut updates = saver.subscribe();
    saver.edit(draft)?;

    if timeout(window * 2, updates.changed()).await.is_err() {
        warn!(
            "Draft not saved; business settings and client {} must exist",
            client_id
        );
    }
    let status = saver.close().await?;
    match (status.invoice_id, status.last_error) {
        (_, Some(e)) => error!("Auto-save failed: {}", e),
        (Some(id), None) => info!("Draft invoice {} saved, due in {} days", id, invoicing.default_due_days),
        (None, None) => {}
    }
    Ok(())
}
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Tracing first so config problems are visible
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. .env is optional; DATABASE_URL may come from the real environment
    dotenv().ok();

    // 3. config.toml, falling back to defaults when absent
    let app_config = config::load_default_config()
        .inspect_err(|e| error!("Failed to load configuration: {}", e))?;

    // 4. Connect; schema and counters are ensured on every start
    let database_url = database::get_database_url(&app_config.database.url)
        .inspect_err(|e| error!("Invalid DATABASE_URL: {}", e))?;
    let db = database::create_connection(&database_url)
        .await
        .inspect(|_| info!("Database ready at {}", database_url))
        .inspect_err(|e| error!("Failed to open database: {}", e))?;

    let command = env::args().nth(1).unwrap_or_else(|| "summary".to_string());
    match command.as_str() {
        "summary" => {
            let summary =
                report::dashboard_summary(&db, &app_config.invoicing.default_currency).await?;
            let clients = client::count_clients(&db).await?;
            let listed = report::list_invoices(
                &db,
                &report::InvoiceFilter::default(),
                Local::now().date_naive(),
            )
            .await?;
            info!(
                "{} clients, {} invoices ({} draft, {} paid)",
                clients,
                listed.len(),
                summary.draft_count,
                summary.paid_count
            );
            info!(
                "Received {:.2} {}, pending {:.2} {}",
                summary.total_received, summary.currency, summary.pending_amount, summary.currency
            );
            info!(
                "Next numbers: {} / {}",
                numbering::preview_number(&db, Sequence::Invoice).await?,
                numbering::preview_number(&db, Sequence::Receipt).await?
            );
        }
        "reset-counters" => admin::reset_counters(&db).await?,
        "draft" => {
            let client_id = env::args()
                .nth(2)
                .and_then(|arg| arg.parse::<i64>().ok())
                .ok_or_else(|| Error::Validation {
                    message: "usage: draft <client_id>".to_string(),
                })?;
            start_draft(db, client_id, &app_config.invoicing).await?;
        }
        other => {
            error!(
                "Unknown command '{}'; expected 'summary', 'reset-counters' or 'draft'",
                other
            );
            return Err(Error::Config {
                message: format!("unknown command: {other}"),
            });
        }
    }

    Ok(())
}
