use anyhow::Context;
use clap::Parser;

use medusa_proto::config::Config;
use medusa_proto::platform;
use medusa_proto::route::{Route, UiMode};
use medusa_remote::app::App;
use medusa_remote::transport::MedusaClient;

/// Remote control for a Medusa head, in the terminal.
#[derive(Parser, Debug)]
#[command(name = "medusa-remote")]
#[command(version)]
struct Args {
    /// Page to open: `/medusa`, `/medusa/browse`, `/medusa/playing/{session}[/{mode}]`
    /// or a bare session name.
    route: Option<Route>,

    /// Head base URL, e.g. http://192.168.1.20:5000
    #[arg(short, long)]
    server: Option<String>,

    /// Options shown on the playing page: basic, advanced or navigation.
    #[arg(short, long)]
    mode: Option<UiMode>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let data_dir = platform::data_dir();
    std::fs::create_dir_all(&data_dir)?;
    let log_path = platform::log_path();

    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("cannot open log file {}", log_path.display()))?;

    // Allow RUST_LOG override; default to debug for app code but suppress noisy
    // connection-level DEBUG from HTTP client internals (hyper_util, reqwest).
    let log_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "debug,hyper_util=warn,reqwest=warn,hyper=warn".to_string());
    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_env_filter(log_filter.as_str())
        .with_ansi(false)
        .init();

    // Print log path to stderr so the operator can tail it immediately.
    eprintln!("medusa-remote log: {}", log_path.display());

    tracing::info!("medusa-remote starting…");

    // ── Load config ──────────────────────────────────────────────────────────
    let mut config = Config::load()?;
    if let Some(server) = args.server {
        config.server.base_url = server;
    }
    if let Some(mode) = args.mode {
        config.ui.default_mode = mode;
    }

    let route = match (args.route.unwrap_or(Route::Landing), args.mode) {
        (Route::Playing { session, .. }, Some(mode)) => Route::playing(session, mode),
        (route, _) => route,
    };

    let client = MedusaClient::from_config(&config)
        .with_context(|| format!("cannot talk to {}", config.server.base_url))?;
    tracing::info!("head {} ({}), opening {}", config.server.base_url, config.server.api_base, route);

    App::new(config, client, route).run().await
}
