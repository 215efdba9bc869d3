use std::sync::Arc;

use axum::body::Body;
use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;
use tower_cookies::Cookies;
use uuid::Uuid;

use crate::config::AppConfig;
use crate::database::client::Database;
use crate::middleware::ctx::Ctx;
use crate::middleware::error::{AppError, AppResult};
use crate::utils::jwt::{TokenType, JWT};

pub const JWT_KEY: &str = "jwt";

pub struct CtxState {
    pub db: Database,
    pub jwt: JWT,
    pub is_development: bool,
}

impl std::fmt::Debug for CtxState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("CtxState")
    }
}

pub fn create_ctx_state(db: Database, config: &AppConfig) -> Arc<CtxState> {
    Arc::new(CtxState {
        db,
        jwt: JWT::new(config.jwt_secret.clone(), chrono::Duration::days(7)),
        is_development: config.is_development,
    })
}

/// Decodes the login cookie (when present) and stores a request [Ctx]
/// into the request extensions. Runs for every request, auth failures
/// surface only when a handler asks for the user id.
pub async fn mw_ctx_constructor(
    State(ctx_state): State<Arc<CtxState>>,
    cookies: Cookies,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let req_id = Uuid::new_v4();
    let is_htmx = req.headers().contains_key("hx-request");
    let result_user_id = extract_user_id(&ctx_state.jwt, &cookies);
    req.extensions_mut()
        .insert(Ctx::new(result_user_id, req_id, is_htmx));
    next.run(req).await
}

fn extract_user_id(jwt: &JWT, cookies: &Cookies) -> AppResult<String> {
    let cookie = cookies.get(JWT_KEY).ok_or(AppError::AuthFailNoJwtCookie)?;
    let claims = jwt
        .decode_by_type(cookie.value(), TokenType::Login)
        .map_err(|source| AppError::AuthFailJwtInvalid { source })?;
    Ok(claims.auth)
}
