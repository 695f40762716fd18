use axum::{
    middleware as axum_middleware,
    routing::{delete, get, post},
    Router,
};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use trackdesk_api::middleware::jwt_auth_middleware;

#[tokio::main]
async fn main() {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt::init();

    // Initialize configuration (this loads the config singleton)
    let config = trackdesk_api::config::config();
    tracing::info!("Starting TrackDesk API in {:?} mode", config.environment);

    // Apply migrations when the store is reachable; the server still comes up
    // without it and /health reports the degraded state
    if let Err(e) = trackdesk_api::database::migrate().await {
        tracing::warn!("Database not ready at startup: {}", e);
    }

    let app = app();

    let bind_addr = format!("0.0.0.0:{}", config.server.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind {}: {}", bind_addr, e));

    println!("🚀 TrackDesk API server listening on http://{}", bind_addr);

    axum::serve(listener, app).await.expect("server");
}

fn app() -> Router {
    Router::new()
        // Public
        .route("/", get(root))
        .route("/health", get(health))
        // Public auth routes (registration + token issuance)
        .merge(public_routes())
        // Protected API behind bearer-token auth
        .merge(protected_routes())
        // Global middleware
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

fn public_routes() -> Router {
    use trackdesk_api::handlers::public::auth;

    Router::new()
        .route("/users/register", post(auth::register))
        .route("/users/login", post(auth::login))
}

fn protected_routes() -> Router {
    use trackdesk_api::handlers::protected::{comments, contributors, issues, projects, users};

    Router::new()
        // Projects
        .route("/projects", get(projects::list).post(projects::create))
        .route(
            "/projects/:project",
            get(projects::retrieve)
                .put(projects::update)
                .patch(projects::update)
                .delete(projects::destroy),
        )
        // Contributors
        .route(
            "/projects/:project/contributors",
            get(contributors::list).post(contributors::create),
        )
        .route(
            "/projects/:project/contributors/:contributor",
            delete(contributors::destroy),
        )
        // Issues
        .route("/projects/:project/issues", get(issues::list).post(issues::create))
        .route(
            "/projects/:project/issues/:issue",
            get(issues::retrieve)
                .put(issues::update)
                .patch(issues::update)
                .delete(issues::destroy),
        )
        // Comments
        .route(
            "/projects/:project/issues/:issue/comments",
            get(comments::list).post(comments::create),
        )
        .route(
            "/projects/:project/issues/:issue/comments/:comment",
            get(comments::retrieve)
                .put(comments::update)
                .patch(comments::update)
                .delete(comments::destroy),
        )
        // Users
        .route("/users", get(users::list))
        .route(
            "/users/:user",
            get(users::retrieve)
                .put(users::update)
                .patch(users::update)
                .delete(users::destroy_rejected),
        )
        .route("/users/:user/contact_info", get(users::contact_info))
        .route("/users/:user/delete_account", delete(users::delete_account))
        .route("/users/:user/confirm_delete_account", post(users::confirm_delete_account))
        .layer(axum_middleware::from_fn(jwt_auth_middleware))
}

async fn root() -> axum::response::Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    axum::response::Json(json!({
        "success": true,
        "data": {
            "name": "TrackDesk API",
            "version": version,
            "description": "Project and issue tracking API built with Rust (Axum)",
            "endpoints": {
                "home": "/ (public)",
                "register": "POST /users/register (public)",
                "login": "POST /users/login (public - token acquisition)",
                "projects": "/projects[/:project] (protected)",
                "contributors": "/projects/:project/contributors[/:contributor] (protected)",
                "issues": "/projects/:project/issues[/:issue] (protected)",
                "comments": "/projects/:project/issues/:issue/comments[/:comment] (protected)",
                "users": "/users[/:user] (protected)",
                "contact_info": "GET /users/:user/contact_info (protected)",
                "delete_account": "DELETE /users/:user/delete_account (protected)",
                "confirm_delete_account": "POST /users/:user/confirm_delete_account (protected)",
            }
        }
    }))
}

async fn health() -> impl axum::response::IntoResponse {
    let now = chrono::Utc::now();

    match trackdesk_api::database::health_check().await {
        Ok(_) => (
            axum::http::StatusCode::OK,
            axum::response::Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": "ok"
                }
            })),
        ),
        Err(e) => (
            axum::http::StatusCode::SERVICE_UNAVAILABLE,
            axum::response::Json(json!({
                "success": false,
                "error": "database unavailable",
                "data": {
                    "status": "degraded",
                    "timestamp": now,
                    "database_error": e.to_string()
                }
            })),
        ),
    }
}
