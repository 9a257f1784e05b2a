//! Drive Gallery - serves level-partitioned image galleries from Google Drive.
//!
//! This binary starts the HTTP server and configures all components.

use clap::Parser;
use std::net::SocketAddr;
use std::process::ExitCode;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use drive_gallery::{
    config::Config,
    error::GalleryError,
    gallery::{GalleryService, ROOT_FOLDER_NAME},
    server::{create_router, RouterConfig},
    storage::{DriveClient, TokenProvider},
};

#[tokio::main]
async fn main() -> ExitCode {
    // A missing .env file is fine; real deployments set the environment directly
    dotenvy::dotenv().ok();

    let config = Config::parse();

    init_logging(config.verbose);

    if let Err(e) = config.validate() {
        error!("Configuration error: {}", e);
        return ExitCode::FAILURE;
    }

    info!("Drive Gallery v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration:");
    info!("  Drive API: {}", config.drive_api_base);
    match config.cors_origins() {
        Some(ref origins) => info!("  CORS origins: {}", origins.join(", ")),
        None => warn!("  CORS: any origin allowed (set GALLERY_FRONTEND_URL to restrict)"),
    }
    info!(
        "  Roll number: {}",
        if config.require_roll_number {
            "required"
        } else {
            "optional"
        }
    );
    info!(
        "  Rate limit: {} requests / {}s per IP",
        config.rate_limit_requests, config.rate_limit_window_secs
    );
    info!("  Request timeout: {}s", config.request_timeout_secs);

    let http = match reqwest::Client::builder()
        .user_agent(concat!("drive-gallery/", env!("CARGO_PKG_VERSION")))
        .build()
    {
        Ok(client) => client,
        Err(e) => {
            error!("Failed to build HTTP client: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let Some(source) = config.credential_source() else {
        error!("No storage credentials configured");
        return ExitCode::FAILURE;
    };

    let tokens = match TokenProvider::from_source(source, http.clone()) {
        Ok(tokens) => tokens,
        Err(e) => {
            error!("Failed to load credentials: {}", e);
            return ExitCode::FAILURE;
        }
    };
    info!("  Credentials: {}", tokens.describe());

    let drive = DriveClient::new(http, tokens).with_base_url(config.drive_api_base.clone());

    let mut gallery = GalleryService::new(drive).with_timeout(config.request_timeout());
    if let Some(ref public_url) = config.public_url {
        gallery = gallery.with_public_url(public_url.clone());
    }

    // Resolving the root doubles as a connectivity and credential check
    info!("Connecting to Google Drive...");
    match gallery.resolver().resolve_root().await {
        Ok(folder_id) => {
            info!(folder_id = %folder_id, "  Found '{}' folder", ROOT_FOLDER_NAME);
        }
        Err(GalleryError::FolderNotFound { .. }) => {
            warn!(
                "  No '{}' folder is visible to these credentials; all listings will be empty",
                ROOT_FOLDER_NAME
            );
        }
        Err(e) => {
            error!("  Failed to reach Google Drive: {}", e);
            error!("  Please check:");
            error!("    - The service account key is valid");
            error!("    - The '{}' folder is shared with the service account", ROOT_FOLDER_NAME);
            return ExitCode::FAILURE;
        }
    }

    let router = create_router(gallery, build_router_config(&config));

    let addr = config.bind_address();
    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Failed to bind to {}: {}", addr, e);
            return ExitCode::FAILURE;
        }
    };

    info!("Server listening on: http://{}", addr);
    info!("  Gallery page: http://{}/gallery", addr);

    if let Err(e) = axum::serve(
        listener,
        router.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    {
        error!("Server error: {}", e);
        return ExitCode::FAILURE;
    }

    info!("Server shutdown complete");
    ExitCode::SUCCESS
}

/// Initialize the tracing/logging subsystem.
fn init_logging(verbose: bool) {
    let env_filter = if verbose {
        "drive_gallery=debug,tower_http=debug"
    } else {
        "drive_gallery=info,tower_http=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| env_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Build RouterConfig from the application Config.
fn build_router_config(config: &Config) -> RouterConfig {
    let mut router_config = RouterConfig::new()
        .with_rate_limit(config.rate_limit_requests, config.rate_limit_window())
        .with_require_roll_number(config.require_roll_number)
        .with_tracing(!config.no_tracing);

    if let Some(origins) = config.cors_origins() {
        router_config = router_config.with_cors_origins(origins);
    }

    router_config
}

/// Resolve when Ctrl+C (or SIGTERM on Unix) is received.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    info!("Shutdown signal received");
}
