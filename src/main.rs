use clap::Parser;
use exn::ResultExt;
use shelf_config::Config;
use shelf_index::{SnapshotHandle, rebuild};
use shelf_remote::HttpTransport;
use shelf_remote::uri::starred_endpoint;
use shelf_storage::backend::{LocalBackend, ReadOnlyBackend};
use shelf_storage::{BackendHandle, EntryStore};
use shelf_sync::{CycleOutcome, Pipeline, Remote};
use std::io::Write;
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

mod cli;
mod error;

use crate::cli::{Cli, Command};
use crate::error::{ErrorKind, Result};

fn init_tracing(verbose: u8, quiet: bool) {
    let filter = if let Ok(env) = std::env::var("SHELF_LOG") {
        EnvFilter::new(env)
    } else if quiet {
        EnvFilter::new("warn")
    } else {
        match verbose {
            0 => EnvFilter::new("info"),
            1 => EnvFilter::new("debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err:?}");
            ExitCode::FAILURE
        },
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = Config::load(cli.config.as_deref()).or_raise(|| ErrorKind::Config)?;
    tracing::debug!(?config, "Loaded configuration");
    let store = open_store(&config)?;

    match cli.command {
        Command::Run => {
            let pipeline = pipeline(&config, store)?;
            pipeline.run(config.sync_interval(), shutdown_signal()).await;
        },
        Command::Sync => {
            let pipeline = pipeline(&config, store)?;
            let CycleOutcome::Completed(report) = pipeline.run_cycle().await.or_raise(|| ErrorKind::Sync)? else {
                // Nothing else shares this pipeline.
                return Ok(());
            };
            let mut out = std::io::stdout().lock();
            writeln!(
                out,
                "listed {}, up to date {}, fetched {}, indexed {}, skipped {}",
                report.listed,
                report.reconcile.up_to_date,
                report.reconcile.fetched,
                report.index.indexed,
                report.index.skipped,
            )
            .or_raise(|| ErrorKind::Output)?;
            if let Some(err) = report.reconcile.aborted {
                return Err(err.raise(ErrorKind::Sync));
            }
        },
        Command::Index { json } => {
            let (snapshot, report) = rebuild(&store).await.or_raise(|| ErrorKind::Index)?;
            let mut out = std::io::stdout().lock();
            if json {
                serde_json::to_writer_pretty(&mut out, &snapshot).or_raise(|| ErrorKind::Output)?;
                writeln!(out).or_raise(|| ErrorKind::Output)?;
            } else {
                writeln!(
                    out,
                    "indexed {}, skipped {}, {} keywords, {} users",
                    report.indexed,
                    report.skipped,
                    snapshot.keywords.by_word.len(),
                    snapshot.users.by_id.len(),
                )
                .or_raise(|| ErrorKind::Output)?;
            }
        },
    }
    Ok(())
}

fn open_store(config: &Config) -> Result<EntryStore> {
    let root = config.cache_dir().or_raise(|| ErrorKind::Config)?;
    let local: BackendHandle = Arc::new(LocalBackend::new("entries", &root).or_raise(|| ErrorKind::Storage)?);
    let backend: BackendHandle = match config.read_only {
        true => Arc::new(ReadOnlyBackend::new(local)),
        false => local,
    };
    tracing::info!(root = %root.display(), read_only = config.read_only, "Opened entry cache");
    Ok(EntryStore::new(backend))
}

fn pipeline(config: &Config, store: EntryStore) -> Result<Pipeline> {
    if config.access_token.is_none() {
        tracing::warn!("No access token configured; remote requests are unauthenticated");
    }
    let transport = HttpTransport::new(&config.user_agent).or_raise(|| ErrorKind::Remote)?;
    let first_page = starred_endpoint(&config.api_base, config.page_size, config.access_token.as_deref())
        .or_raise(|| ErrorKind::Remote)?;
    let remote = Remote { first_page, credential: config.access_token.clone(), max_pages: config.max_pages };
    Ok(Pipeline::new(store, Arc::new(transport), remote, Arc::new(SnapshotHandle::default())))
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "Cannot listen for Ctrl-C; running until killed");
        std::future::pending::<()>().await;
    }
}
