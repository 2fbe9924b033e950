mod server;

use clap::Parser;
use server::config::{CliArgs, ServerConfig};
use server::routes::{AppState, app};
use server::telemetry::init_telemetry;
use tokio::net::TcpListener;
use tokio::signal;

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load from .env
    let _ = dotenvy::dotenv();
    let args = CliArgs::parse();
    let config = ServerConfig::try_from(args)?;

    init_telemetry()?;

    let provider = server::worker_id_provider(&config);
    let generator = server::build_generator(&config, provider.as_ref())?;
    log_startup_info(&config, generator.worker_id());

    let listener = TcpListener::bind(&config.server_addr).await?;
    tracing::info!("Server is listening on http://{}", listener.local_addr()?);

    let router = app(AppState::new(generator), config.request_timeout);
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Service shut down successfully");
    Ok(())
}

fn log_startup_info(config: &ServerConfig, worker_id: u16) {
    if cfg!(debug_assertions) {
        tracing::info!(
            "Starting ID service with worker id {} and full config: {:#?}",
            worker_id,
            config
        );
    } else {
        tracing::info!(
            worker_id,
            hardened = config.max_spin.is_some(),
            "Starting ID service on {}",
            config.server_addr
        );
    }
}

async fn shutdown_signal() {
    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {e}");
            std::future::pending::<()>().await;
        }
    };

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received Ctrl+C signal");
        },
        () = terminate => {
            tracing::info!("Received SIGTERM signal");
        },
    }

    tracing::info!("Shutdown signal received, terminating gracefully...");
}
