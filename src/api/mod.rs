pub mod activities;
pub mod health;
pub mod members;
pub mod packages;
pub mod rates;
pub mod transactions;
pub mod wallets;

use crate::config::Config;
use crate::db::Repository;
use crate::engine::Enrollment;
use axum::{
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<Repository>,
    pub config: Config,
    pub enrollment: Arc<Enrollment>,
}

impl AppState {
    pub fn new(repo: Arc<Repository>, config: Config) -> Self {
        let enrollment = Arc::new(Enrollment::new(repo.clone(), config.clone()));
        Self {
            repo,
            config,
            enrollment,
        }
    }
}

pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health::health))
        .route("/ready", get(health::ready))
        .route("/v1/members/register", post(members::register))
        .route("/v1/members/:id/upgrade", post(members::upgrade))
        .route("/v1/members/:id", get(members::get_member))
        .route("/v1/members/:id/wallet", get(wallets::get_wallet))
        .route(
            "/v1/members/:id/transactions",
            get(transactions::get_transactions),
        )
        .route(
            "/v1/members/:id/activities",
            get(activities::get_activities),
        )
        .route("/v1/activities/:id/seen", post(activities::mark_seen))
        .route(
            "/v1/packages",
            get(packages::list_packages).post(packages::create_package),
        )
        .route("/v1/rates", get(rates::list_rates))
        .route("/v1/rates/:level", put(rates::put_rate))
        .layer(cors)
        .with_state(state)
}
