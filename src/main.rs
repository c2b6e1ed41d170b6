use chrono::Local;
use clap::{Parser, Subcommand};
use miette::{IntoDiagnostic, Result};
use secrecy::SecretString;
use std::fs::File;
use std::io::{self, Write};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use workerdesk::application::dashboard::Dashboard;
use workerdesk::application::reconciliation::{aggregate_by_currency, format_for_export};
use workerdesk::config::{BackendSettings, DEFAULT_API_BASE_URL, DEFAULT_TIMEOUT_SECS, Settings};
use workerdesk::domain::account::{DEFAULT_DAILY_LIMIT, NewWorker};
use workerdesk::domain::money::MinorUnits;
use workerdesk::domain::ports::WorkerBackendBox;
use workerdesk::domain::timestamp::TimestampStyle;
use workerdesk::infrastructure::http::HttpBackend;
use workerdesk::interfaces::csv::account_writer::AccountWriter;
use workerdesk::interfaces::csv::export_writer::{ExportWriter, export_file_name};
use workerdesk::interfaces::snapshot::Snapshot;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Base URL of the admin backend
    #[arg(long, env = "WORKERDESK_API_BASE_URL", default_value = DEFAULT_API_BASE_URL, global = true)]
    api_base_url: String,

    /// Offline JSON snapshot to read instead of the backend. Changes are not saved.
    #[arg(long, global = true)]
    snapshot: Option<PathBuf>,

    /// Per-request timeout in seconds
    #[arg(long, env = "WORKERDESK_TIMEOUT_SECS", default_value_t = DEFAULT_TIMEOUT_SECS, global = true)]
    timeout_secs: u64,

    /// UTC offset used when rendering timestamps, e.g. +03:00
    #[arg(long, env = "WORKERDESK_UTC_OFFSET", default_value = "+00:00", global = true)]
    utc_offset: TimestampStyle,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Manage worker accounts
    #[command(subcommand)]
    Workers(WorkersCommand),
    /// Show headline figures across all workers
    Summary,
    /// Inspect and export the transfer ledger
    #[command(subcommand)]
    Invoices(InvoicesCommand),
}

#[derive(Subcommand)]
enum WorkersCommand {
    /// Print every worker with its transfer statistics as CSV
    List,
    /// Register a new worker
    Add {
        #[arg(long)]
        account_id: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        worker_url: String,
        /// Daily limit in minor currency units
        #[arg(long, default_value_t = DEFAULT_DAILY_LIMIT.value())]
        daily_limit: u64,
        #[arg(long, env = "WORKERDESK_STRIPE_API_KEY", hide_env_values = true)]
        stripe_api_key: String,
    },
    /// Change a worker's daily limit (minor currency units)
    SetLimit { account_id: String, daily_limit: u64 },
    /// Remove a worker
    Delete { account_id: String },
}

#[derive(Subcommand)]
enum InvoicesCommand {
    /// Count and total of transferred invoices
    Stats {
        /// Restrict to one worker account
        #[arg(long)]
        account: Option<String>,
    },
    /// Export transferred invoices as CSV
    Export {
        /// Restrict to one worker account
        #[arg(long)]
        account: Option<String>,
        /// Output file, `-` for stdout. Defaults to a dated file name.
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

impl Cli {
    fn settings(&self) -> Result<Settings> {
        let backend = BackendSettings::new(
            &self.api_base_url,
            Duration::from_secs(self.timeout_secs),
        )
        .into_diagnostic()?;
        Ok(Settings {
            backend,
            timestamps: self.utc_offset,
        })
    }
}

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn,workerdesk=info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();
    let cli = Cli::parse();
    let settings = cli.settings()?;

    let backend: WorkerBackendBox = if let Some(path) = &cli.snapshot {
        info!(path = %path.display(), "Using offline snapshot");
        Box::new(Snapshot::from_path(path).into_diagnostic()?.into_backend())
    } else {
        Box::new(HttpBackend::new(&settings.backend).into_diagnostic()?)
    };
    let mut dashboard = Dashboard::new(backend);

    let mutating = matches!(
        cli.command,
        Command::Workers(
            WorkersCommand::Add { .. } | WorkersCommand::SetLimit { .. } | WorkersCommand::Delete { .. }
        )
    );
    if cli.snapshot.is_some() && mutating {
        warn!("Snapshot mode: changes are kept in memory only");
    }

    let stdout = io::stdout();
    match cli.command {
        Command::Workers(WorkersCommand::List) => {
            dashboard.refresh().await.into_diagnostic()?;
            AccountWriter::new(stdout.lock(), settings.timestamps)
                .write_accounts(dashboard.accounts())
                .into_diagnostic()?;
        }
        Command::Workers(WorkersCommand::Add {
            account_id,
            name,
            worker_url,
            daily_limit,
            stripe_api_key,
        }) => {
            let created = dashboard
                .add_worker(NewWorker {
                    account_id,
                    friendly_name: name,
                    worker_url,
                    daily_limit: MinorUnits(daily_limit),
                    stripe_api_key: SecretString::new(stripe_api_key),
                })
                .await
                .into_diagnostic()?;
            writeln!(
                stdout.lock(),
                "Worker \"{}\" created ({})",
                created.friendly_name, created.account_id
            )
            .into_diagnostic()?;
        }
        Command::Workers(WorkersCommand::SetLimit {
            account_id,
            daily_limit,
        }) => {
            let updated = dashboard
                .update_limit(&account_id, MinorUnits(daily_limit))
                .await
                .into_diagnostic()?;
            writeln!(
                stdout.lock(),
                "Daily limit for {} set to {}",
                updated.account_id, updated.daily_limit
            )
            .into_diagnostic()?;
        }
        Command::Workers(WorkersCommand::Delete { account_id }) => {
            dashboard.delete_worker(&account_id).await.into_diagnostic()?;
            writeln!(stdout.lock(), "Worker {account_id} deleted").into_diagnostic()?;
        }
        Command::Summary => {
            dashboard.refresh().await.into_diagnostic()?;
            let summary = dashboard.summary();
            let mut out = stdout.lock();
            writeln!(
                out,
                "Accounts: {} ({} active)",
                summary.total_accounts, summary.active_accounts
            )
            .into_diagnostic()?;
            writeln!(out, "Total volume: {}", summary.formatted_volume()).into_diagnostic()?;
            writeln!(out, "Total transfers: {}", summary.total_transfers).into_diagnostic()?;
            let active = summary
                .active_account
                .as_ref()
                .map(|a| format!("{} ({})", a.friendly_name, a.account_id))
                .unwrap_or_else(|| "none".to_string());
            writeln!(out, "Active account: {active}").into_diagnostic()?;
        }
        Command::Invoices(InvoicesCommand::Stats { account }) => {
            dashboard.refresh().await.into_diagnostic()?;
            let view = dashboard.invoice_view(account.as_deref());
            let mut out = stdout.lock();
            let scope = view
                .account_filter
                .map(|id| format!("Transfers for account: {id}"))
                .unwrap_or_else(|| "All transfers".to_string());
            writeln!(out, "{scope}").into_diagnostic()?;
            writeln!(out, "Count: {}", view.totals.count).into_diagnostic()?;
            writeln!(out, "Total: {}", view.totals.formatted_total()).into_diagnostic()?;

            let by_currency = aggregate_by_currency(view.invoices.iter().copied());
            if by_currency.len() > 1 {
                for totals in &by_currency {
                    writeln!(
                        out,
                        "  {}: {} ({} invoices)",
                        totals.currency.display_code(),
                        totals.formatted_total(),
                        totals.count
                    )
                    .into_diagnostic()?;
                }
            }
        }
        Command::Invoices(InvoicesCommand::Export { account, output }) => {
            dashboard.refresh().await.into_diagnostic()?;
            let view = dashboard.invoice_view(account.as_deref());
            let records = format_for_export(
                view.invoices.iter().copied(),
                dashboard.accounts(),
                &settings.timestamps,
            );
            let count = records.len();

            let output = output
                .unwrap_or_else(|| PathBuf::from(export_file_name(Local::now().date_naive())));
            if output.as_os_str() == "-" {
                ExportWriter::new(stdout.lock())
                    .write_records(records)
                    .into_diagnostic()?;
            } else {
                let file = File::create(&output).into_diagnostic()?;
                ExportWriter::new(file)
                    .write_records(records)
                    .into_diagnostic()?;
                info!(path = %output.display(), rows = count, "Export written");
            }
        }
    }

    Ok(())
}
