/*
 * Responsibility
 * - Config 読み込み → 依存生成 (Authorizer / Passthrough / ModelDirectory) → Router 組み立て
 * - Middleware の適用 (Authorizer / CORS / security headers / trace など)
 * - axum::serve() で起動
 */
use std::time::Duration;
use std::{panic, process, sync::Arc};

use axum::Router;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::api;
use crate::config::Config;
use crate::error::AppError;
use crate::middleware;
use crate::services::auth::build_authorizer;
use crate::services::models::InMemoryModelDirectory;
use crate::services::passthrough::PassthroughClient;
use crate::state::AppState;

const BACKEND_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

fn init_tracing() {
    // Prefer RUST_LOG if set; otherwise use a sensible default.
    // Ex:
    // RUST_LOG=info,model_gateway=debug,tower_http=debug cargo run
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,tower_http=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn init_panic_hook(abort_on_panic: bool) {
    let default_hook = panic::take_hook();

    panic::set_hook(Box::new(move |info| {
        // stderr can be hidden depending on how the process is launched
        tracing::error!(?info, "panic");

        if abort_on_panic {
            process::abort();
        } else {
            default_hook(info);
        }
    }))
}

pub async fn run() -> Result<(), AppError> {
    init_tracing();
    let config = Config::from_env()?;

    init_panic_hook(!config.app_env.is_production());

    tracing::info!(
        "starting gateway in {:?} mode on {} (backend {})",
        config.app_env,
        config.addr,
        config.passthrough.base_url
    );

    let state = build_state(&config)?;
    let app = build_router(state, &config);
    let listener = tokio::net::TcpListener::bind(config.addr)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, addr = %config.addr, "failed to bind");
            AppError::Internal
        })?;
    axum::serve(listener, app).await.map_err(|e| {
        tracing::error!(error = %e, "server error");
        AppError::Internal
    })?;

    Ok(())
}

pub fn build_state(config: &Config) -> Result<AppState, AppError> {
    let authorizer = build_authorizer(config)?;

    // No overall timeout: streamed completions may run for minutes.
    let backend = reqwest::Client::builder()
        .connect_timeout(BACKEND_CONNECT_TIMEOUT)
        .build()
        .map_err(|e| {
            tracing::error!(error = %e, "failed to build backend client");
            AppError::Internal
        })?;
    let passthrough = PassthroughClient::new(backend, &config.passthrough).map_err(|e| {
        tracing::error!(error = %e, "invalid passthrough configuration");
        AppError::Internal
    })?;

    Ok(AppState::new(
        authorizer,
        passthrough,
        Arc::new(InMemoryModelDirectory::new()),
    ))
}

pub fn build_router(state: AppState, config: &Config) -> Router {
    let router = Router::new()
        .nest("/api/v1", api::v1::routes(state.clone()))
        .with_state(state);

    let router = middleware::security_headers::apply(router, config);
    let router = middleware::cors::apply(router, config);
    middleware::http::apply(router, config)
}
