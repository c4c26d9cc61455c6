//! Bookmarks API Server
//!
//! A social image-bookmarking service: users follow each other and see what
//! the people they follow are doing on their dashboard.
//! Uses hexagonal (ports & adapters) architecture for clean separation of concerns.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use axum::{
    middleware,
    routing::{any, get, patch, post},
    Json, Router,
};
use sea_orm::Database;
use serde::Serialize;
use tower_governor::governor::GovernorConfigBuilder;
use tower_governor::key_extractor::PeerIpKeyExtractor;
use tower_governor::GovernorLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod adapters;
mod app;
mod auth;
mod config;
mod domain;
mod entity;
mod error;
mod feed;
mod handlers;

#[cfg(test)]
mod test_utils;


use adapters::{
    PostgresActionRepository, PostgresFollowRepository, PostgresImageRepository,
    PostgresUserRepository,
};
use app::{ActionLogService, FeedService, ImageService, RelationService, UserService};
use config::Config;
use domain::ports::{ActionRepository, FollowRepository, ImageRepository, UserRepository};

pub type DynUserService = UserService<dyn UserRepository, dyn FollowRepository, dyn ActionRepository>;
pub type DynRelationService =
    RelationService<dyn UserRepository, dyn FollowRepository, dyn ActionRepository>;
pub type DynFeedService = FeedService<
    dyn UserRepository,
    dyn FollowRepository,
    dyn ActionRepository,
    dyn ImageRepository,
>;
pub type DynImageService = ImageService<dyn ImageRepository, dyn ActionRepository>;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub user_service: Arc<DynUserService>,
    pub relation_service: Arc<DynRelationService>,
    pub feed_service: Arc<DynFeedService>,
    pub image_service: Arc<DynImageService>,
    pub config: Config,
}

impl AppState {
    /// Wire the services over a set of repositories
    pub fn new(
        users: Arc<dyn UserRepository>,
        follows: Arc<dyn FollowRepository>,
        actions: Arc<dyn ActionRepository>,
        images: Arc<dyn ImageRepository>,
        config: Config,
    ) -> Self {
        let action_log = Arc::new(ActionLogService::new(
            actions,
            config.action_dedup_window_secs,
        ));

        let user_service = Arc::new(UserService::new(
            users.clone(),
            follows.clone(),
            action_log.clone(),
        ));

        let relation_service = Arc::new(RelationService::new(
            users.clone(),
            follows.clone(),
            action_log.clone(),
        ));

        let feed_service = Arc::new(
            FeedService::new(users, follows, action_log.clone(), images.clone())
                .with_limits(config.feed_default_limit, config.feed_max_limit),
        );

        let image_service = Arc::new(ImageService::new(images, action_log));

        Self {
            user_service,
            relation_service,
            feed_service,
            image_service,
            config,
        }
    }
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Build the application router
pub fn build_router(state: AppState) -> anyhow::Result<Router> {
    let mut registration = Router::new().route("/account/register", post(handlers::register));

    if state.config.register_rate_limit {
        // 2 req/sec sustained, burst of 5, keyed on the socket peer address
        let governor_config = Arc::new(
            GovernorConfigBuilder::default()
                .key_extractor(PeerIpKeyExtractor)
                .per_second(2)
                .burst_size(5)
                .finish()
                .context("invalid rate limit configuration")?,
        );
        registration = registration.layer(GovernorLayer {
            config: governor_config,
        });
    }

    // The follow toggle has its own guard chain instead of the auth middleware
    let follow_toggle = Router::new()
        .route("/account/users/follow", any(handlers::user_follow))
        .route_layer(middleware::from_fn_with_state(
            auth::follow_toggle_chain(state.user_service.clone()),
            auth::enforce,
        ));

    let protected = Router::new()
        .route("/account", get(handlers::dashboard))
        .route("/account/", get(handlers::dashboard))
        .route("/account/me", get(handlers::me))
        .route("/account/edit", patch(handlers::edit))
        .route("/account/users", get(handlers::user_list))
        .route("/account/users/:username", get(handlers::user_detail))
        .route(
            "/images",
            get(handlers::list_images).post(handlers::create_image),
        )
        .route("/images/:id", get(handlers::get_image))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::auth_middleware,
        ));

    let cors = if state.config.cors_allow_any {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        CorsLayer::new()
    };

    Ok(Router::new()
        // Health check (no auth)
        .route("/health", get(health))
        .merge(registration)
        .merge(follow_toggle)
        .merge(protected)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,bookmarks_api=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Bookmarks API...");

    let config = Config::from_env()?;

    // Connect to PostgreSQL
    tracing::info!("Connecting to database...");
    let db = Database::connect(&config.database_url)
        .await
        .context("Failed to connect to database")?;
    tracing::info!("Database connected");

    let users: Arc<dyn UserRepository> = Arc::new(PostgresUserRepository::new(db.clone()));
    let follows: Arc<dyn FollowRepository> = Arc::new(PostgresFollowRepository::new(db.clone()));
    let actions: Arc<dyn ActionRepository> = Arc::new(PostgresActionRepository::new(db.clone()));
    let images: Arc<dyn ImageRepository> = Arc::new(PostgresImageRepository::new(db));

    let port = config.port;
    let state = AppState::new(users, follows, actions, images, config);
    let app = build_router(state)?;

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .context("Server error")?;

    Ok(())
}
