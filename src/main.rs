use std::path::Path;
use std::sync::Arc;

use clap::Parser;
use log::{error, info, warn};

use vigie::backends::cache_backend::MemoryCache;
use vigie::backends::db_backend::SqliteStore;
use vigie::backends::types::SessionTable;
use vigie::configuration::config::Config;
use vigie::diagnostics::debug_log::DebugSink;
use vigie::records::normalizer::{NullUserDirectory, UserDirectory};
use vigie::render::html::render_report;
use vigie::report::facade::Aggregator;
use vigie::report::visibility::Viewer;

#[derive(Parser)]
#[command(name = "vigie")]
#[command(version = "0.1.0")]
#[command(about = "Point-in-time report of webmail sessions and login activity")]
struct Args {
    /// TOML configuration file
    config_file: String,

    /// Override the configured session backend (db, redis, cache, auto)
    #[arg(long)]
    backend: Option<String>,

    /// Override the login log file path
    #[arg(long)]
    logins_file: Option<String>,

    /// Enable gated diagnostic lines
    #[arg(long, action = clap::ArgAction::SetTrue)]
    debug: bool,

    /// Restrict the report to this login name (self-view)
    #[arg(long)]
    self_view: Option<String>,

    /// Write the HTML report here instead of stdout
    #[arg(long)]
    output: Option<String>,
}

fn main() {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .format_target(false)
        .init();

    let args = Args::parse();

    let mut config = match Config::from_file(Path::new(args.config_file.as_str())) {
        Ok(c) => c,
        Err(e) => {
            error!("Unable to import configuration from file: {}", e);
            std::process::exit(1);
        }
    };

    if let Some(backend) = args.backend {
        config.session_backend = backend;
    }
    if let Some(logins_file) = args.logins_file {
        config.logins_file = logins_file;
    }
    if args.debug {
        config.debug = true;
    }

    info!("Configuration imported successfully");

    let diag = DebugSink::new(config.debug_log_dir(), config.debug);

    // The session table doubles as the user directory; when it cannot be
    // opened the report still runs, minus the DB backend and name lookups.
    let store = match SqliteStore::open(
        &config.db_path,
        &config.db_table_session,
        &config.db_table_users,
    ) {
        Ok(store) => Some(Arc::new(store)),
        Err(e) => {
            warn!("Session database unavailable: {}", e);
            None
        }
    };

    let table: Option<Arc<dyn SessionTable>> =
        store.clone().map(|s| s as Arc<dyn SessionTable>);
    let users: Arc<dyn UserDirectory> = match store {
        Some(s) => s,
        None => Arc::new(NullUserDirectory),
    };

    let viewer = match &args.self_view {
        Some(login) => Viewer::self_view(login),
        None => Viewer::admin(),
    };

    let aggregator = Aggregator::new(config, table, users, Arc::new(MemoryCache::new()), diag);
    let report = aggregator.build_report(&viewer);

    info!(
        "Report built: backend={} sessions={} logins={}",
        report.backend.as_str(),
        report.sessions.len(),
        report.logins.len()
    );

    let html = render_report(&report);

    match args.output {
        Some(path) => {
            if let Err(e) = std::fs::write(&path, html) {
                error!("Unable to write report to {}: {}", path, e);
                std::process::exit(1);
            }
            info!("Report written to {}", path);
        }
        None => print!("{}", html),
    }
}
