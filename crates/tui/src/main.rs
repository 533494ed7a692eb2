use anyhow::Context;
use clap::Parser;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use stocksense_core::dispatch::demo::DemoClient;
use stocksense_core::dispatch::webhook::WebhookClient;
use stocksense_core::dispatch::{AnalysisClient, Dispatcher};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod app;
mod clipboard;
mod input;
mod terminal;
mod ui;

#[derive(Debug, Parser)]
#[command(name = "stocksense", about = "Chat with a stock analysis webhook from the terminal")]
struct Args {
    /// Analysis webhook URL. Overrides STOCKSENSE_WEBHOOK_URL.
    #[arg(long)]
    endpoint: Option<String>,

    /// Answer with randomly generated placeholder analyses instead of calling the webhook.
    #[arg(long)]
    demo: bool,

    /// Where to write logs; the terminal itself is taken by the UI.
    #[arg(long, default_value = "stocksense.log")]
    log_file: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let args = Args::parse();
    let mut settings = stocksense_core::config::Settings::from_env()?;
    if let Some(endpoint) = args.endpoint {
        settings.webhook_url = endpoint;
    }

    let _sentry_guard = init_sentry(&settings);
    let _log_guard = init_tracing(&args.log_file)?;

    let client: Arc<dyn AnalysisClient> = if args.demo {
        Arc::new(DemoClient::new())
    } else {
        let webhook = WebhookClient::from_settings(&settings)?;
        tracing::info!(endpoint = webhook.endpoint(), "using analysis webhook");
        Arc::new(webhook)
    };
    tracing::info!(source = client.source_name(), "stocksense starting");

    let mut app = app::App::new(
        Dispatcher::new(client),
        settings.share_url.clone(),
        Box::new(clipboard::SystemClipboard::new()),
    );

    let mut guard = terminal::TerminalGuard::enter()?;
    let result = app::run(&mut guard.terminal, &mut app);
    drop(guard);

    if let Err(err) = &result {
        sentry_anyhow::capture_anyhow(err);
        tracing::error!(error = %err, "terminal session failed");
    }
    result
}

fn init_tracing(log_file: &Path) -> anyhow::Result<tracing_appender::non_blocking::WorkerGuard> {
    let dir = log_file
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let file_name = log_file
        .file_name()
        .with_context(|| format!("invalid log file path: {}", log_file.display()))?;

    let appender = tracing_appender::rolling::never(dir, file_name);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false),
        )
        .with(sentry_tracing::layer())
        .init();

    Ok(guard)
}

fn init_sentry(settings: &stocksense_core::config::Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}
