/*
 * Responsibility
 * - tracing 初期化 → Config 読み込み → 依存生成 (DB / cache / token service) → Router 組み立て
 * - Middleware の適用 (security headers / CORS / HTTP)
 * - axum::serve() で起動、SIGINT/SIGTERM で graceful shutdown
 */
use std::{panic, process, sync::Arc};

use anyhow::Result;
use axum::{
    Router,
    http::{Method, Uri},
    routing::get,
};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::api;
use crate::api::v1::handlers::health::health;
use crate::config::{AppEnv, Config};
use crate::error::AppError;
use crate::middleware;
use crate::repos::{PgUserStore, UserStore};
use crate::services::auth::{SystemClock, build_token_service};
use crate::services::cache::{JsonCache, ValkeyClient};
use crate::state::AppState;

fn init_tracing(app_env: AppEnv) {
    // Prefer RUST_LOG if set; otherwise LOG_LEVEL, otherwise a sensible default.
    // Ex:
    // RUST_LOG=info,alumni_api=debug,tower_http=debug cargo run
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| {
            std::env::var("LOG_LEVEL").map(|level| {
                tracing_subscriber::EnvFilter::new(format!("{level},tower_http={level}"))
            })
        })
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,tower_http=info"));

    // JSON lines in production, human-readable otherwise.
    let (json, pretty) = if app_env.is_production() {
        (Some(tracing_subscriber::fmt::layer().json()), None)
    } else {
        (None, Some(tracing_subscriber::fmt::layer()))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(json)
        .with(pretty)
        .init();
}

fn init_panic_hook(abort_on_panic: bool) {
    // Keep the default hook as a fallback (prints to stderr with location/payload).
    let default_hook = panic::take_hook();

    panic::set_hook(Box::new(move |info| {
        // Always surface panics via tracing so they don't get "lost"
        tracing::error!(?info, "panic");

        // In development, fail fast. In production, let the server keep running.
        if abort_on_panic {
            process::abort();
        } else {
            default_hook(info);
        }
    }))
}

pub async fn run() -> Result<()> {
    dotenvy::dotenv().ok();
    init_tracing(AppEnv::from_env());

    let config = Config::from_env()?;
    init_panic_hook(!config.app_env.is_production());

    tracing::info!(
        "starting API in {:?} mode on {}",
        config.app_env,
        config.addr
    );

    let state = build_state(&config).await?;
    let app = build_router(state, &config);

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    tracing::info!("Health check available at http://{}/health", config.addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("HTTP server closed");
    Ok(())
}

async fn build_state(config: &Config) -> Result<AppState> {
    // Build process-level services here and inject them into the shared application state.
    let db = build_pool(config)
        .inspect_err(|e| tracing::error!(error = %e, "Invalid database configuration"))?;
    tracing::info!("Database pool configured");

    let cache = ValkeyClient::new(&config.redis_url)
        .await
        .inspect_err(|e| tracing::error!(error = %e, "Redis connection failed"))?;

    let tokens = build_token_service(config, Arc::new(SystemClock));
    let users: Arc<dyn UserStore> = Arc::new(PgUserStore::new(db));

    Ok(AppState::new(
        config.app_env,
        tokens,
        users,
        JsonCache::new(Arc::new(cache)),
    ))
}

/// Lazy pool: nothing is dialed until the first query, so startup survives a down database.
fn build_pool(config: &Config) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        // Bounds the per-request liveness lookup as well.
        .acquire_timeout(config.database_acquire_timeout)
        .connect_lazy(&config.database_url)
}

/// Assemble the full HTTP surface (routes + cross-cutting middleware).
pub fn build_router(state: AppState, config: &Config) -> Router {
    let router = Router::new()
        .route("/health", get(health))
        .nest("/api/v1", api::v1::routes(state.clone()))
        .fallback(not_found)
        .with_state(state);

    let router = middleware::security_headers::apply(router, config);
    let router = middleware::cors::apply(router, config);
    middleware::http::apply(router)
}

async fn not_found(method: Method, uri: Uri) -> AppError {
    AppError::not_found(format!("Route {method} {}", uri.path()))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install Ctrl+C handler");
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
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("SIGINT received, starting graceful shutdown"),
        _ = terminate => tracing::info!("SIGTERM received, starting graceful shutdown"),
    }
}
