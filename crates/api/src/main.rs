use api::{build_app, init_services, init_user_repository};
use config::{ApiConfig, LoggingConfig};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    // Local .env is optional
    let _ = dotenvy::dotenv();

    // Load configuration first to get logging settings
    let config = ApiConfig::load_or_env().unwrap_or_else(|e| {
        eprintln!("Failed to load configuration: {e}");
        eprintln!("Application cannot start without a valid configuration.");
        std::process::exit(1);
    });

    init_tracing(&config.logging);

    let user_repository = init_user_repository(&config).await.unwrap_or_else(|e| {
        tracing::error!(error = ?e, "Failed to initialize user storage");
        std::process::exit(1);
    });

    let app_state = init_services(&config, user_repository).unwrap_or_else(|e| {
        tracing::error!(error = ?e, "Failed to initialize services");
        std::process::exit(1);
    });

    let app = build_app(app_state, &config.auth.cors_allowed_origins);

    let bind_address = config.server.bind_address();
    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .unwrap_or_else(|e| {
            tracing::error!(address = %bind_address, error = %e, "Failed to bind");
            std::process::exit(1);
        });

    tracing::info!(address = %bind_address, "Server started successfully");
    tracing::info!("Endpoints:");
    tracing::info!("  - GET /api/auth/{{provider_id}}?redirect_uri=... (Start sign-in)");
    tracing::info!("  - GET /api/auth/{{provider_id}}/callback (Provider callback)");
    tracing::info!("  - GET /api/user/{{user_id}} (User lookup)");
    tracing::info!("  - GET /api/health (Health check)");
    tracing::info!("  - GET /api/docs/openapi.json (OpenAPI document)");

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        tracing::error!(error = %e, "Server error");
        std::process::exit(1);
    }
    tracing::info!("Server stopped");
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
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
    tracing::info!("Shutdown signal received");
}

fn init_tracing(logging_config: &LoggingConfig) {
    // RUST_LOG wins over the configured directives
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(logging_config.filter_directive()));

    match logging_config.format.as_str() {
        "json" => {
            tracing_subscriber::fmt()
                .json()
                .with_env_filter(filter)
                .init();
        }
        "compact" => {
            tracing_subscriber::fmt()
                .compact()
                .with_env_filter(filter)
                .init();
        }
        _ => {
            tracing_subscriber::fmt()
                .pretty()
                .with_env_filter(filter)
                .init();
        }
    }
}
