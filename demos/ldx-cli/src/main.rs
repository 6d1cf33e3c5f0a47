//! LDX Insight CLI
//!
//! A command-line demo for the LDX Insight client.
//!
//! Features:
//! - Login and registration with the session persisted to a cookie file
//! - Dataset search, detail, categories and CSV export
//! - Platform statistics
//! - Silent token refresh, with refetch signals logged
//!
//! Run with: cargo run -p ldx-cli -- --help

mod config;
mod output;

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use ldx_insight_client::api::{DatasetQuery, LdxApi, LoginRequest};
use ldx_insight_client::session::{CookieSessionStore, FileCookieJar, MemoryNavigator};
use ldx_insight_client::{ClientConfig, ClientError, SessionStore};

use config::{Args, Command, DatasetsCommand, StatsCommand};

fn client_config(args: &Args) -> ClientConfig {
    let mut config = ClientConfig::from_env();
    if let Some(base_url) = &args.base_url {
        config.base_url = base_url.clone();
    }
    config.timeout = Duration::from_secs(args.timeout);
    config
}

async fn run(args: Args, api: &LdxApi) -> anyhow::Result<()> {
    match args.command {
        Command::Login(credentials) => {
            api.auth()
                .sign_in(&LoginRequest::new(credentials.username.clone(), credentials.password))
                .await?;
            output::display_success(&format!("logged in as {}", credentials.username));
        }
        Command::Register(credentials) => {
            api.auth()
                .sign_up(&LoginRequest::new(credentials.username.clone(), credentials.password))
                .await?;
            output::display_success(&format!("registered {}", credentials.username));
        }
        Command::Logout => {
            api.auth().logout().await;
            output::display_success("logged out");
        }
        Command::Status => {
            let session = api.client().session().snapshot();
            if args.json {
                output::print_json(&serde_json::json!({
                    "loggedIn": session.is_logged_in(),
                    "hasRefreshToken": session.refresh_token.is_some(),
                }))?;
            } else if session.is_logged_in() {
                output::display_success("session stored");
            } else {
                output::display_warning("not logged in");
            }
        }
        Command::Datasets(command) => datasets(command, api, args.json).await?,
        Command::Stats(command) => stats(command, api, args.json).await?,
    }
    Ok(())
}

async fn datasets(command: DatasetsCommand, api: &LdxApi, json: bool) -> anyhow::Result<()> {
    match command {
        DatasetsCommand::List {
            keyword,
            category,
            page,
            size,
            sort,
        } => {
            let query = DatasetQuery {
                keyword,
                category,
                page: Some(page),
                size: Some(size),
                sort,
            };
            let page = api.datasets().list(&query).await?;
            if json {
                output::print_json(&page)?;
            } else {
                output::display_page(&page);
            }
        }
        DatasetsCommand::Show { id } => {
            let dataset = api.datasets().detail(&id).await?;
            if let Err(e) = api.datasets().record_view(&id).await {
                tracing::debug!(error = %e, "Failed to record view");
            }
            if json {
                output::print_json(&dataset)?;
            } else {
                output::display_dataset(&dataset);
            }
        }
        DatasetsCommand::Categories => {
            let categories = api.datasets().categories().await?;
            if json {
                output::print_json(&categories)?;
            } else {
                for category in categories {
                    println!("  {category}");
                }
            }
        }
        DatasetsCommand::Download { id, output: dir } => {
            let file = api.datasets().download_csv(&id).await?;
            let path = file.save_to(&dir).await?;
            output::display_success(&format!(
                "saved {} bytes to {}",
                file.bytes.len(),
                path.display()
            ));
        }
    }
    Ok(())
}

async fn stats(command: StatsCommand, api: &LdxApi, json: bool) -> anyhow::Result<()> {
    match command {
        StatsCommand::Summary => {
            let summary = api.stats().summary().await?;
            if json {
                output::print_json(&summary)?;
            } else {
                output::display_summary(&summary);
            }
        }
        StatsCommand::TopViewed { limit } => {
            let datasets = api.stats().top_viewed(limit).await?;
            if json {
                output::print_json(&datasets)?;
            } else {
                output::display_datasets(&datasets);
            }
        }
        StatsCommand::TopDownloaded { limit } => {
            let datasets = api.stats().top_downloaded(limit).await?;
            if json {
                output::print_json(&datasets)?;
            } else {
                output::display_datasets(&datasets);
            }
        }
        StatsCommand::ByCategory => {
            let categories = api.stats().by_category().await?;
            if json {
                output::print_json(&categories)?;
            } else {
                output::display_categories(&categories);
            }
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Default: info for the CLI and client, warn for deps
    // Override with RUST_LOG env var for more detail
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new("ldx_cli=info,ldx_insight_client=info,warn")
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    output::init();

    let jar = match &args.session_file {
        Some(path) => FileCookieJar::with_path(path.clone()),
        None => FileCookieJar::new(),
    };
    tracing::debug!(path = %jar.path().display(), "Using session cookie");

    let navigator = Arc::new(MemoryNavigator::new("/"));
    let session = Arc::new(CookieSessionStore::hydrate(jar, navigator.clone()));
    let api = LdxApi::new(client_config(&args), session)?;

    let mut refetch = api.client().subscribe_refetch();
    tokio::spawn(async move {
        while let Ok(signal) = refetch.recv().await {
            tracing::info!(trigger = %signal.trigger, "Session refreshed; views would reload");
        }
    });

    let result = run(args, &api).await;

    for navigation in navigator.history() {
        output::display_navigation(&navigation);
    }

    if let Err(e) = result {
        match e.downcast_ref::<ClientError>() {
            Some(client_error) if client_error.requires_login() => {
                output::display_error(&format!("{client_error}"));
                output::display_warning("session ended; run `ldx-cli login <username>`");
            }
            _ => output::display_error(&format!("{e:#}")),
        }
        std::process::exit(1);
    }
    Ok(())
}
