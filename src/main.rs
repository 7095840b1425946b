use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use dotenvy::dotenv;
use sqlx::sqlite::SqlitePoolOptions;
use std::env;
use std::net::SocketAddr;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;

use teamup::database::schema;
use teamup::web::middleware::auth as auth_middleware;
use teamup::web::routes::{activities, participation, recommendations};

#[tokio::main]
async fn main() {
    dotenv().ok();

    tracing_subscriber::fmt::init();

    let db_url =
        env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite:teamup.db?mode=rwc".to_string());
    tracing::info!("connecting to database: {}", db_url);

    let pool = SqlitePoolOptions::new()
        .connect(&db_url)
        .await
        .expect("cannot connect to database");

    schema::ensure_schema(&pool)
        .await
        .expect("cannot apply database schema");

    // Every route requires a resolved user; identity comes from the auth
    // middleware, authorization from the services.
    let api_routes = Router::new()
        .route(
            "/api/activities",
            post(activities::create_activity_handler).get(activities::list_activities_handler),
        )
        .route("/api/activities/categories", get(activities::categories_handler))
        .route("/api/activities/created", get(activities::my_created_handler))
        .route("/api/activities/joined", get(activities::my_joined_handler))
        .route(
            "/api/activities/:activity_id",
            get(activities::get_activity_handler)
                .put(activities::update_activity_handler)
                .delete(activities::delete_activity_handler),
        )
        .route(
            "/api/activities/:activity_id/complete",
            post(activities::complete_activity_handler),
        )
        .route(
            "/api/activities/:activity_id/participants/join",
            post(participation::join_handler),
        )
        .route(
            "/api/activities/:activity_id/participants",
            get(participation::approved_handler),
        )
        .route(
            "/api/activities/:activity_id/participants/pending",
            get(participation::pending_handler),
        )
        .route(
            "/api/activities/:activity_id/participants/my-status",
            get(participation::my_status_handler),
        )
        .route(
            "/api/activities/:activity_id/participants/:participant_id/approve",
            post(participation::approve_handler),
        )
        .route(
            "/api/activities/:activity_id/participants/:participant_id/reject",
            post(participation::reject_handler),
        )
        .route(
            "/api/recommendations",
            get(recommendations::recommendations_handler),
        )
        .layer(middleware::from_fn(auth_middleware::require_auth));

    let app = Router::new()
        .merge(api_routes)
        .layer(CatchPanicLayer::new())
        .layer(CorsLayer::permissive())
        .with_state(pool);

    let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port: u16 = env::var("PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(3000);
    let addr: SocketAddr = format!("{}:{}", host, port)
        .parse()
        .expect("cannot parse host/port");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("cannot bind listener");

    tracing::info!("listening on http://{}", addr);

    axum::serve(listener, app).await.expect("server error");
}
