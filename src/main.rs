//! # News Search
//!
//! A terminal client for the NewsAPI.org `/v2/everything` search endpoint.
//! Results are cached in memory, narrowed with client-side source and date
//! filters, and paged with "load more". The last query and the dark-mode
//! flag survive between sessions.
//!
//! ## Usage
//!
//! ```sh
//! NEWSAPI_KEY=... news_search                 # interactive session
//! NEWSAPI_KEY=... news_search -q "world cup"  # one search, then exit
//! ```
//!
//! ## Architecture
//!
//! Every user action flows the same way:
//! 1. **Action**: an input line is parsed into an [`app::Action`]
//! 2. **Fetch**: the [`controller`] asks the [`api`] client for a page
//! 3. **Merge**: the page replaces or extends the [`cache`]
//! 4. **Render**: the filtered cache is drawn as text cards ([`outputs`])

use clap::Parser;
use std::error::Error;
use std::io::{IsTerminal, Write};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod api;
mod app;
mod cache;
mod cli;
mod config;
mod controller;
mod error;
mod models;
mod outputs;
mod prefs;
mod utils;

use api::NewsApiClient;
use app::{Action, App, Response};
use cli::Cli;
use config::{FileConfig, Settings, load_config};
use prefs::{FileStore, PreferenceStore};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    // Logs go to stderr so they never interleave with the cards on stdout.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tfmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("news_search starting up");

    // Parse CLI
    let args = Cli::parse();
    debug!(?args.config, %args.prefs_file, query = ?args.query, "Parsed CLI arguments");

    // ---- Load settings ----
    let file_config = match &args.config {
        Some(path) => load_config(path).await?,
        None => FileConfig::default(),
    };
    let settings = Settings::resolve(&args, file_config)?;
    info!(
        base_url = %settings.base_url,
        page_size = settings.page_size,
        categories = ?settings.categories,
        "Resolved settings"
    );

    let store = FileStore::open(&settings.prefs_file);
    info!(path = %store.path().display(), "Using preferences file");

    let client = NewsApiClient::new(&settings.base_url, &settings.api_key, settings.page_size);
    let ansi = std::io::stdout().is_terminal();
    let mut app = App::new(
        client,
        PreferenceStore::new(store),
        settings.page_size,
        settings.categories.clone(),
        ansi,
    );

    // ---- One-shot mode ----
    if let Some(query) = args.query.as_deref() {
        let response = app.handle(Action::Search(query.to_string())).await;
        let failed = response.notice.is_some();
        present(&response);
        info!(elapsed_ms = start_time.elapsed().as_millis(), "Execution complete");
        if failed {
            std::process::exit(1);
        }
        return Ok(());
    }

    // ---- Interactive session ----
    loading();
    let response = app.start(&settings.default_query).await;
    present(&response);
    println!("Type `help` for commands.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        prompt()?;
        let Some(line) = lines.next_line().await? else {
            break;
        };

        let action = match Action::parse(&line) {
            Ok(Some(action)) => action,
            Ok(None) => continue,
            Err(e) => {
                notify(&e.to_string());
                continue;
            }
        };

        if action.fetches() {
            loading();
        }
        let response = app.handle(action).await;
        present(&response);
        if response.quit {
            break;
        }
    }

    let elapsed = start_time.elapsed();
    info!(?elapsed, secs = elapsed.as_secs(), "Session ended");
    Ok(())
}

fn present(response: &Response) {
    if let Some(screen) = &response.screen {
        println!("{screen}");
    }
    if let Some(notice) = &response.notice {
        notify(notice);
    }
}

fn notify(message: &str) {
    eprintln!("! {message}");
}

fn loading() {
    eprintln!("Loading…");
}

fn prompt() -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    write!(stdout, "> ")?;
    stdout.flush()
}
