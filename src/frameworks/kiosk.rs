// Framework bootstrap and command execution for the attendance kiosk.

use std::future::Future;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, anyhow};
use clap::Parser;
use tracing::{info, warn};

use crate::domain::{AttendanceApi, SessionStore, TokenIssuer};
use crate::frameworks::cli::{Cli, Command};
use crate::frameworks::config;
use crate::interface_adapters::clients::AttendanceClient;
use crate::interface_adapters::display::{countdown_label, render_frame};
use crate::interface_adapters::export::export_records;
use crate::interface_adapters::store::FileSessionStore;
use crate::use_cases::{
    AttendanceBoard, DashboardUseCase, LoginUseCase, LogoutUseCase, RecordFilter,
    RotationSettings, TokenRotationController, resolve_batch, stored_batches,
};

// ANSI: clear screen and home the cursor.
const CLEAR_SCREEN: &str = "\x1b[2J\x1b[H";

fn init_runtime() {
    let _ = dotenvy::dotenv();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    // stdout belongs to the QR display.
    let json = matches!(std::env::var("LOG_FORMAT").as_deref(), Ok("json"));
    if json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .json()
            .with_current_span(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .compact()
            .init();
    }

    std::panic::set_hook(Box::new(|info| {
        let backtrace = std::backtrace::Backtrace::capture();
        tracing::error!(%info, ?backtrace, "panic");
    }));
}

pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_runtime();

    let store_path = config::session_store_path();
    let shown_path = store_path.display();
    let store = FileSessionStore::open(&store_path)
        .with_context(|| format!("failed to open session store {shown_path}"))?;
    let store = Arc::new(store);

    let base_url = config::api_base_url().context("invalid API base URL")?;
    let timeout = config::api_timeout();
    let client = Arc::new(
        AttendanceClient::new(base_url.as_str(), timeout)
            .context("failed to initialize attendance api client")?,
    );
    tracing::debug!(
        api_base_url = %client.base_url(),
        api_timeout = ?timeout,
        "attendance client configured"
    );

    let mut stdout = std::io::stdout();
    execute(cli.command, client, store, &mut stdout).await
}

/// Runs one command against the given API and session store, writing results to `out`.
pub async fn execute<C, S, W>(
    command: Command,
    client: Arc<C>,
    store: Arc<S>,
    out: &mut W,
) -> anyhow::Result<()>
where
    C: AttendanceApi + TokenIssuer + 'static,
    S: SessionStore + 'static,
    W: Write,
{
    match command {
        Command::Login { user_id, password } => {
            let user = LoginUseCase {
                api: client,
                store,
            }
            .execute(&user_id, &password)
            .await?;
            let batches = user.batch_names.join(", ");
            writeln!(out, "Login successful! Batches: {batches}")?;
        }
        Command::Logout => {
            LogoutUseCase { store }.execute()?;
            writeln!(out, "Logged out")?;
        }
        Command::Batches => {
            for batch in stored_batches(store.as_ref()) {
                writeln!(out, "{batch}")?;
            }
        }
        Command::Attend { batch } => {
            let batch = require_batch(store.as_ref(), batch)?;
            let controller = TokenRotationController::new(
                batch,
                RotationSettings::default(),
                client as Arc<dyn TokenIssuer>,
                store as Arc<dyn SessionStore>,
            );
            run_attendance(&controller, out, shutdown_signal()).await?;
        }
        Command::Records {
            batch,
            search,
            department,
            status,
            page,
        } => {
            let batch = require_batch(store.as_ref(), batch)?;
            let board = DashboardUseCase { api: client }.load(&batch).await?;
            let filter = RecordFilter {
                search,
                department,
                status,
            };
            print_page(out, &board, &filter, page)?;
        }
        Command::Toggle { batch, user_ids } => {
            let batch = require_batch(store.as_ref(), batch)?;
            let dashboard = DashboardUseCase { api: client };
            let mut board = dashboard.load(&batch).await?;
            for user_id in &user_ids {
                match board.toggle_user(user_id) {
                    Some(status) => writeln!(out, "{user_id}: {status}")?,
                    None => warn!(batch = %batch, user_id = %user_id, "unknown user id"),
                }
            }
            let sent = dashboard.submit(&mut board).await?;
            writeln!(out, "Attendance updated for {sent} students")?;
        }
        Command::Purge { batch } => {
            let batch = require_batch(store.as_ref(), batch)?;
            let message = DashboardUseCase { api: client }.purge(&batch).await?;
            writeln!(out, "{message}")?;
        }
        Command::Export { batch, dir } => {
            let batch = require_batch(store.as_ref(), batch)?;
            let board = DashboardUseCase { api: client }.load(&batch).await?;
            let path = export_to(&dir, &board)?;
            let rows = board.records().len();
            writeln!(out, "Exported {rows} rows to {}", path.display())?;
        }
    }
    Ok(())
}

fn require_batch<S: SessionStore + ?Sized>(
    store: &S,
    explicit: Option<String>,
) -> anyhow::Result<String> {
    resolve_batch(store, explicit)
        .ok_or_else(|| anyhow!("no batch selected; pass --batch or log in first"))
}

fn export_to(dir: &Path, board: &AttendanceBoard) -> anyhow::Result<std::path::PathBuf> {
    export_records(dir, board.batch_name(), board.records(), chrono::Utc::now())
        .with_context(|| format!("failed to export attendance to {}", dir.display()))
}

fn print_page<W: Write>(
    out: &mut W,
    board: &AttendanceBoard,
    filter: &RecordFilter,
    page: usize,
) -> std::io::Result<()> {
    writeln!(
        out,
        "{} Attendance Dashboard (page {page}/{})",
        board.batch_name().to_uppercase(),
        board.page_count(filter).max(1)
    )?;
    writeln!(
        out,
        "{:<4} {:<12} {:<24} {:<12} {}",
        "ID", "USER ID", "NAME", "DEPARTMENT", "STATUS"
    )?;
    for record in board.page(filter, page) {
        writeln!(
            out,
            "{:<4} {:<12} {:<24} {:<12} {}",
            record.id, record.user_id, record.name, record.department, record.status
        )?;
    }
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
}

/// Activates the controller and redraws the display on every state change until `shutdown`.
pub async fn run_attendance<W, F>(
    controller: &TokenRotationController,
    out: &mut W,
    shutdown: F,
) -> anyhow::Result<()>
where
    W: Write,
    F: Future<Output = ()>,
{
    let mut state_rx = controller.subscribe();
    controller.activate();
    tokio::pin!(shutdown);

    loop {
        let state = state_rx.borrow_and_update().clone();
        let frame = render_frame(controller.batch_name(), &state).unwrap_or_else(|e| {
            warn!(error = %e, "failed to render token");
            countdown_label(&state)
        });
        write!(out, "{CLEAR_SCREEN}{frame}")?;
        out.flush()?;

        tokio::select! {
            _ = &mut shutdown => break,
            changed = state_rx.changed() => {
                if changed.is_err() {
                    break;
                }
            }
        }
    }

    controller.deactivate();
    let frame = render_frame(controller.batch_name(), &controller.snapshot())?;
    write!(out, "{CLEAR_SCREEN}{frame}")?;
    out.flush()?;
    info!(batch = %controller.batch_name(), "attendance display stopped");
    Ok(())
}
