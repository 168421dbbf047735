//! Demo front end for the recognizer engine (SPEC_FULL.md §10.4).
//!
//! Reads lines from stdin, treating each one as the buffer's entire new
//! text (cursor pinned at end-of-line), and prints `entity`/`remove`/
//! `diagnostic` events as they arrive. A deliberately simple stand-in for a
//! real editor integration, wired up with the five built-in matchers.

use anyhow::Result;
use clap::Parser;
use reco_core::{CommitReason, FeedInput, Recognizer, RecognizerOptions};
use std::path::{Path, PathBuf};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;

/// CLI arguments.
#[derive(Parser, Debug)]
#[command(name = "reco", version, about = "Recognizer engine demo")]
struct Args {
    /// Optional path to a config file (overrides discovery of `recognizer.toml`).
    #[arg(long = "config")]
    config: Option<PathBuf>,
}

struct AppStartup {
    log_guard: Option<WorkerGuard>,
}

impl AppStartup {
    fn new() -> Self {
        Self { log_guard: None }
    }

    fn configure_logging(&mut self) -> Result<()> {
        let log_dir = Path::new(".");
        let log_path = log_dir.join("reco.log");
        if log_path.exists() {
            let _ = std::fs::remove_file(&log_path);
        }

        let file_appender = tracing_appender::rolling::never(log_dir, "reco.log");
        let (nb_writer, guard) = tracing_appender::non_blocking(file_appender);
        match tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_writer(nb_writer)
            .try_init()
        {
            Ok(_) => self.log_guard = Some(guard),
            Err(_err) => {
                // Global subscriber already installed (e.g. under a test harness); no guard to hold.
            }
        }
        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let mut startup = AppStartup::new();
    startup.configure_logging()?;

    let args = Args::parse();
    info!(target: "runtime", "startup");

    let config = reco_config::load_from(args.config.clone())?;
    info!(
        target: "runtime.startup",
        config_override = args.config.is_some(),
        window_size = config.window_size(),
        "bootstrap_complete"
    );

    let recognizer = Recognizer::new(RecognizerOptions {
        plugins: reco_plugins::built_in_plugins(),
        schedule: config.schedule(),
        thresholds: config.thresholds(),
        window_size: config.window_size(),
    });

    recognizer.on_entity(|event| {
        println!(
            "entity {:?} kind={:?} text={:?} status={:?} is_update={}",
            event.entity.id, event.entity.kind, event.entity.text, event.entity.status, event.is_update
        );
    });
    recognizer.on_remove(|event| {
        println!("remove {:?} key={:?}", event.id, event.key);
    });
    recognizer.on_diagnostic(|event| {
        println!("diagnostic {:?} {}", event.severity, event.message);
    });

    let stdin = tokio::io::stdin();
    let mut lines = BufReader::new(stdin).lines();
    while let Some(line) = lines.next_line().await? {
        let cursor = line.chars().count();
        recognizer.feed(FeedInput { text: line, cursor: Some(cursor), composing: None });
    }

    recognizer.commit(CommitReason::Blur);
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    recognizer.destroy();

    Ok(())
}
