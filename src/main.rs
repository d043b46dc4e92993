use anyhow::Context;
use clap::Parser;
use std::sync::Arc;

use completion_gateway::client::OpenAiClient;
use completion_gateway::config::Args;
use completion_gateway::rate_limit::RateLimiter;
use completion_gateway::routes::create_router;
use completion_gateway::service::CompletionService;
use completion_gateway::state::AppState;
use completion_gateway::telemetry;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env first so clap sees those values
    dotenvy::dotenv().ok();

    let args = Args::parse();
    let _log_guard = telemetry::init(args.debug, &args.log_file);

    if let Err(e) = args.validate() {
        tracing::error!(error = %e, "invalid configuration");
        return Err(e.into());
    }

    tracing::info!("Starting the AI Interface for OpenAI Responses service.");

    let client = OpenAiClient::new(&args.base_url, &args.api_key, args.request_timeout())?;
    let service = CompletionService::new(
        Arc::new(client),
        RateLimiter::from_secs(args.rate_limit_seconds),
    );
    let state = Arc::new(AppState::new(
        service,
        args.default_model().map(str::to_string),
    ));

    let app = create_router(state);

    let addr = format!("0.0.0.0:{}", args.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    tracing::info!(port = args.port, upstream = %args.base_url, "gateway listening");
    tracing::info!(
        rate_limit_seconds = args.rate_limit_seconds,
        default_model = args.default_model().unwrap_or("<none>"),
        "upstream calls limited to one per interval"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("Shutting down the AI Interface for OpenAI Responses service.");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
