// src/web/handlers/system_handlers.rs
use crate::auth::{AuthenticatedUser, OptionalAuth};
use crate::core::Database;
use crate::error::Result;
use crate::web::types::{AccountResponse, TextResponse};

use rocket::serde::json::Json;
use rocket::State;
use tracing::{debug, error};

pub async fn get_account_handler(auth: AuthenticatedUser) -> Json<AccountResponse> {
    Json(AccountResponse::from(auth.user()))
}

pub async fn health_handler(auth: OptionalAuth, db: &State<Database>) -> Result<Json<TextResponse>> {
    match auth.user() {
        Some(user) => debug!("Health check by authenticated user: {}", user.login),
        None => debug!("Health check by anonymous user"),
    }

    if let Err(e) = db.health_check().await {
        error!("Database health check failed: {}", e);
        return Err(e.into());
    }
    Ok(Json(TextResponse::success("OK")))
}
