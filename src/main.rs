use anyhow::{Context, Result};
use std::net::SocketAddr;
use tracing_subscriber::EnvFilter;

use map_distance::MapDistance;
use map_distance::config::Config;
use map_distance::http::{AppState, router};
use map_distance::{locator, terminal};

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr; stdout belongs to the terminal surface
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = Config::load();
    let app = MapDistance::new(&config).context("Failed to build Gemini transport")?;

    // One-time device lookup before the first submission
    let locator = locator::from_config(&config);
    app.shell.start(locator.as_ref()).await;

    match config.server.surface.as_str() {
        "terminal" => {
            tracing::info!("main: starting terminal surface");
            let stdin = tokio::io::BufReader::new(tokio::io::stdin());
            terminal::run(&app.shell, stdin, tokio::io::stdout()).await?;
            Ok(())
        }
        _ => {
            let bind: SocketAddr = config
                .server
                .http_bind
                .parse()
                .with_context(|| format!("Invalid MD_HTTP_BIND '{}' (expected host:port)", config.server.http_bind))?;

            let router = router(AppState {
                shell: app.shell.clone(),
                estimator: app.estimator.clone(),
            });

            let listener = tokio::net::TcpListener::bind(bind).await?;
            tracing::info!(
                %bind,
                name = %config.server.name,
                model = %config.gemini.model,
                format = ?config.adapter.format,
                "Starting MapDistance HTTP server"
            );

            axum::serve(listener, router).await?;
            Ok(())
        }
    }
}
