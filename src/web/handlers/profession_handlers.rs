// src/web/handlers/profession_handlers.rs
use rocket::http::Status;
use rocket::response::status::Created;
use rocket::serde::json::Json;
use rocket::State;

use crate::auth::AuthenticatedUser;
use crate::core::Database;
use crate::error::Result;
use crate::models::{Profession, ProfessionPayload};
use crate::repository::profession::SORTABLE_FIELDS;
use crate::service::ProfessionService;
use crate::web::types::{PageParams, PagedResponse, ServerConfig};

pub async fn create_profession_handler(
    payload: Json<ProfessionPayload>,
    auth: AuthenticatedUser,
    db: &State<Database>,
) -> Result<Created<Json<Profession>>> {
    auth.require_admin()?;
    let profession = ProfessionService::new(db).create(&payload).await?;
    let location = format!("/api/professions/{}", profession.id);
    Ok(Created::new(location).body(Json(profession)))
}

pub async fn update_profession_handler(
    payload: Json<ProfessionPayload>,
    auth: AuthenticatedUser,
    db: &State<Database>,
) -> Result<Json<Profession>> {
    auth.require_admin()?;
    Ok(Json(ProfessionService::new(db).update(&payload).await?))
}

pub async fn list_professions_handler(
    params: PageParams,
    config: &State<ServerConfig>,
    db: &State<Database>,
) -> Result<PagedResponse<Profession>> {
    let request = params.resolve(config, SORTABLE_FIELDS);
    let paged = ProfessionService::new(db).find_page(&request.query).await?;
    Ok(PagedResponse::new(paged, &request))
}

pub async fn get_profession_handler(id: i64, db: &State<Database>) -> Result<Json<Profession>> {
    Ok(Json(ProfessionService::new(db).find_one(id).await?))
}

pub async fn delete_profession_handler(
    id: i64,
    auth: AuthenticatedUser,
    db: &State<Database>,
) -> Result<Status> {
    auth.require_admin()?;
    ProfessionService::new(db).delete(id).await?;
    Ok(Status::NoContent)
}
