// src/web/handlers/candidate_handlers.rs
use rocket::http::Status;
use rocket::response::status::Created;
use rocket::serde::json::Json;
use rocket::State;

use crate::auth::AuthenticatedUser;
use crate::core::{Database, WriteLocks};
use crate::error::Result;
use crate::models::{Candidate, CandidatePayload, CandidatesByProfession};
use crate::repository::candidate::SORTABLE_FIELDS;
use crate::service::CandidateService;
use crate::web::types::{PageParams, PagedResponse, ServerConfig};

/// Public application endpoint
pub async fn apply_handler(
    payload: Json<CandidatePayload>,
    db: &State<Database>,
    locks: &State<WriteLocks>,
) -> Result<Created<Json<Candidate>>> {
    let candidate = CandidateService::new(db, locks).apply(&payload).await?;
    let location = format!("/api/candidates/{}", candidate.id);
    Ok(Created::new(location).body(Json(candidate)))
}

pub async fn update_candidate_handler(
    payload: Json<CandidatePayload>,
    auth: AuthenticatedUser,
    db: &State<Database>,
    locks: &State<WriteLocks>,
) -> Result<Json<Candidate>> {
    auth.require_admin()?;
    let candidate = CandidateService::new(db, locks).update(&payload).await?;
    Ok(Json(candidate))
}

pub async fn list_candidates_handler(
    params: PageParams,
    eager: bool,
    auth: AuthenticatedUser,
    config: &State<ServerConfig>,
    db: &State<Database>,
    locks: &State<WriteLocks>,
) -> Result<PagedResponse<Candidate>> {
    auth.require_admin()?;
    let request = params.resolve(config, SORTABLE_FIELDS);
    let paged = CandidateService::new(db, locks)
        .find_page(&request.query, eager)
        .await?;
    Ok(PagedResponse::new(paged, &request))
}

pub async fn candidates_by_profession_handler(
    db: &State<Database>,
    locks: &State<WriteLocks>,
) -> Result<Json<Vec<CandidatesByProfession>>> {
    let report = CandidateService::new(db, locks).count_by_profession().await?;
    Ok(Json(report))
}

pub async fn get_candidate_handler(
    id: i64,
    auth: AuthenticatedUser,
    db: &State<Database>,
    locks: &State<WriteLocks>,
) -> Result<Json<Candidate>> {
    auth.require_admin()?;
    let candidate = CandidateService::new(db, locks).find_one(id).await?;
    Ok(Json(candidate))
}

pub async fn delete_candidate_handler(
    id: i64,
    auth: AuthenticatedUser,
    db: &State<Database>,
    locks: &State<WriteLocks>,
) -> Result<Status> {
    auth.require_admin()?;
    CandidateService::new(db, locks).delete(id).await?;
    Ok(Status::NoContent)
}
