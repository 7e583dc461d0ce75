use std::net::SocketAddr;
use std::sync::Arc;

use clap::Parser;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use quotegate_core::{HttpClient, ReqwestHttpClient, YahooProvider};
use quotegate_web::{router, AppState};

#[derive(Debug, Parser)]
#[command(name = "quotegate", about = "HTTP gateway over Yahoo Finance market data", version)]
struct Cli {
    /// Socket address for the HTTP listener.
    #[arg(long, default_value = "0.0.0.0:8000")]
    bind: SocketAddr,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    if let Err(error) = run(cli).await {
        tracing::error!(%error, "server exited");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> std::io::Result<()> {
    let http: Arc<dyn HttpClient> = Arc::new(ReqwestHttpClient::new());
    let state = AppState::new(Arc::new(YahooProvider::new(http)));

    let app = router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let listener = tokio::net::TcpListener::bind(cli.bind).await?;
    tracing::info!(addr = %cli.bind, "quote gateway listening");
    axum::serve(listener, app).await
}
