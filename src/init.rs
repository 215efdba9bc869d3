use std::sync::Arc;

use axum::http::StatusCode;
use axum::middleware;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use tower_cookies::CookieManagerLayer;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::database::client::Database;
use crate::entities::billing::organization_entity::OrganizationDbService;
use crate::entities::billing::plan_entity::PlanDbService;
use crate::entities::billing::subscription_entity::SubscriptionDbService;
use crate::entities::billing::transaction_entity::TransactionDbService;
use crate::entities::user_auth::local_user_entity::LocalUserDbService;
use crate::middleware::ctx::Ctx;
use crate::middleware::error::AppResult;
use crate::middleware::mw_ctx::{mw_ctx_constructor, CtxState};
use crate::routes::billing::billing_routes;

pub async fn run_migrations(database: &Database) -> AppResult<()> {
    let db = database.client.clone();
    let c = Ctx::new(Ok("migrations".to_string()), Uuid::new_v4(), false);

    LocalUserDbService { db: &db, ctx: &c }.mutate_db().await?;
    OrganizationDbService { db: &db, ctx: &c }.mutate_db().await?;
    PlanDbService { db: &db, ctx: &c }.mutate_db().await?;
    SubscriptionDbService { db: &db, ctx: &c }
        .mutate_db()
        .await?;
    TransactionDbService { db: &db, ctx: &c }.mutate_db().await?;
    Ok(())
}

pub fn main_router(ctx_state: &Arc<CtxState>) -> Router {
    Router::new()
        .route("/hc", get(get_hc))
        .merge(billing_routes::routes())
        .with_state(ctx_state.clone())
        .layer(middleware::from_fn_with_state(
            ctx_state.clone(),
            mw_ctx_constructor,
        ))
        .layer(CookieManagerLayer::new())
        .layer(TraceLayer::new_for_http())
}

async fn get_hc() -> Response {
    const VERSION: &str = env!("CARGO_PKG_VERSION");
    (StatusCode::OK, format!("v{}", VERSION)).into_response()
}
