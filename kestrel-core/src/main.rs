//! src/main.rs
//! ============================================================================
//! # kestrel: Terminal Entry Point
//!
//! Wires the decoder and engine to a raw-mode terminal. Presentation is a
//! single status line on stderr; stdout is reserved for the picked path in
//! picker mode, so the binary composes with shell scripts
//! (`vim "$(kestrel --pick-file)"`).

use std::env;
use std::io::{self, Write};
use std::sync::Arc;
use std::time::Instant;

use anyhow::Context;
use crossterm::event::{Event as TermEvent, EventStream};
use crossterm::terminal;
use futures::StreamExt;
use tokio::sync::mpsc::{self, UnboundedReceiver};
use tracing::info;

use kestrel_core::config::Config;
use kestrel_core::controller::engine::{Engine, TaskResult};
use kestrel_core::fs::service::{FileSystemService, LocalFileSystem};
use kestrel_core::model::session::{PickerMode, Session};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let picker = picker_mode_from_args(&env::args().collect::<Vec<String>>());

    let _log_guard = logging_guard();

    let config = Config::load().await.unwrap_or_default();

    let service: Arc<dyn FileSystemService> =
        Arc::new(LocalFileSystem::new(config.behavior.sort_directories_first));
    let start_dir = config.resolve_start_dir(&service.home());

    info!(start = %start_dir.display(), ?picker, "Session starting");

    let session = Session::new(start_dir.clone(), config.behavior.show_hidden, picker);
    let (task_tx, mut task_rx) = mpsc::unbounded_channel();
    let mut engine = Engine::new(session, service, task_tx);

    engine.navigate(start_dir);

    terminal::enable_raw_mode().context("failed to enter raw mode")?;
    let outcome = run(&mut engine, &mut task_rx).await;
    terminal::disable_raw_mode().context("failed to leave raw mode")?;
    eprintln!();

    outcome
}

fn picker_mode_from_args(args: &[String]) -> PickerMode {
    if args.iter().any(|a| a == "--pick-file") {
        PickerMode::File
    } else if args.iter().any(|a| a == "--pick-dir") {
        PickerMode::Dir
    } else {
        PickerMode::None
    }
}

/// Logging failures must not keep the browser from starting; diagnostics are
/// best-effort.
fn logging_guard() -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let log_dir = Config::log_dir().ok()?;
    kestrel_core::logging::init(&log_dir).ok()
}

async fn run(
    engine: &mut Engine,
    task_rx: &mut UnboundedReceiver<TaskResult>,
) -> anyhow::Result<()> {
    let mut events = EventStream::new();

    loop {
        if engine.session().is_finished() {
            info!("Session finished");
            return Ok(());
        }

        print_status(engine.session());

        tokio::select! {
            maybe_event = events.next() => {
                match maybe_event {
                    Some(Ok(TermEvent::Key(key))) => {
                        // Any key dismisses a lingering error before it acts.
                        if engine.session().error.is_some() {
                            engine.dismiss_error();
                        }

                        engine.handle_key(&key, Instant::now());
                    }
                    // Resize and mouse events carry nothing for the core.
                    Some(Ok(_)) => {}
                    Some(Err(e)) => return Err(e.into()),
                    None => return Ok(()),
                }
            }

            Some(result) = task_rx.recv() => {
                engine.absorb(result);
            }

            () = chord_expiry(engine.chord_deadline()) => {
                engine.expire_chord(Instant::now());
            }
        }
    }
}

/// Resolves when the pending chord prefix times out; never, when no prefix is
/// buffered.
async fn chord_expiry(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => {
            tokio::time::sleep_until(tokio::time::Instant::from_std(deadline)).await;
        }
        None => std::future::pending().await,
    }
}

/// One-line status on stderr; enough to drive the picker without a real view
/// layer on top.
fn print_status(session: &Session) {
    let tab = session.active_tab();

    let state = if session.loading {
        "loading".to_string()
    } else if let Some(error) = &session.error {
        error.clone()
    } else {
        tab.current_entry().map_or_else(
            || "(empty)".to_string(),
            |entry| format!("{} {} {}", entry.kind(), entry.name, entry.modified_label()),
        )
    };

    let mut stderr = io::stderr().lock();
    let _ = write!(
        stderr,
        "\r\x1b[2K[{}/{}] {} ({}/{}) {}",
        session.active + 1,
        session.tabs.len(),
        tab.cwd.display(),
        tab.cursor + usize::from(!tab.entries.is_empty()),
        tab.entries.len(),
        state,
    );
    let _ = stderr.flush();
}
