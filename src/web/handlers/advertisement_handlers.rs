// src/web/handlers/advertisement_handlers.rs
use rocket::http::Status;
use rocket::response::status::Created;
use rocket::serde::json::Json;
use rocket::State;

use crate::auth::{AuthenticatedUser, OptionalAuth};
use crate::core::{Database, WriteLocks};
use crate::error::Result;
use crate::models::{Advertisement, AdvertisementPayload, AdvertisementsByProfession};
use crate::repository::advertisement::SORTABLE_FIELDS;
use crate::service::AdvertisementService;
use crate::web::types::{PageParams, PagedResponse, ServerConfig};

pub async fn create_advertisement_handler(
    payload: Json<AdvertisementPayload>,
    auth: AuthenticatedUser,
    db: &State<Database>,
    locks: &State<WriteLocks>,
) -> Result<Created<Json<Advertisement>>> {
    let actor = auth.require_employer()?;
    let created = AdvertisementService::new(db, locks)
        .create(actor, &payload)
        .await?;
    let location = format!("/api/advertisements/{}", created.id);
    Ok(Created::new(location).body(Json(created)))
}

pub async fn update_advertisement_handler(
    payload: Json<AdvertisementPayload>,
    auth: AuthenticatedUser,
    db: &State<Database>,
    locks: &State<WriteLocks>,
) -> Result<Json<Advertisement>> {
    let actor = auth.require_employer()?;
    let updated = AdvertisementService::new(db, locks)
        .update(actor, &payload)
        .await?;
    Ok(Json(updated))
}

pub async fn list_advertisements_handler(
    params: PageParams,
    mine: bool,
    auth: AuthenticatedUser,
    config: &State<ServerConfig>,
    db: &State<Database>,
    locks: &State<WriteLocks>,
) -> Result<PagedResponse<Advertisement>> {
    let actor = auth.require_employer()?;
    let request = params.resolve(config, SORTABLE_FIELDS);
    let service = AdvertisementService::new(db, locks);

    let paged = service.find_page(actor, mine, &request.query).await?;
    let active = service.count_active_for(actor).await?;
    Ok(PagedResponse::new(paged, &request).with_active_count(active))
}

pub async fn active_advertisements_handler(
    db: &State<Database>,
    locks: &State<WriteLocks>,
) -> Result<Json<Vec<Advertisement>>> {
    let ads = AdvertisementService::new(db, locks).find_active().await?;
    Ok(Json(ads))
}

pub async fn advertisements_by_profession_handler(
    active_only: bool,
    mine: bool,
    auth: OptionalAuth,
    db: &State<Database>,
    locks: &State<WriteLocks>,
) -> Result<Json<Vec<AdvertisementsByProfession>>> {
    let report = AdvertisementService::new(db, locks)
        .count_by_profession(auth.user(), active_only, mine)
        .await?;
    Ok(Json(report))
}

pub async fn get_advertisement_handler(
    id: i64,
    db: &State<Database>,
    locks: &State<WriteLocks>,
) -> Result<Json<Advertisement>> {
    let ad = AdvertisementService::new(db, locks).find_one(id).await?;
    Ok(Json(ad))
}

pub async fn delete_advertisement_handler(
    id: i64,
    auth: AuthenticatedUser,
    db: &State<Database>,
    locks: &State<WriteLocks>,
) -> Result<Status> {
    let actor = auth.require_employer()?;
    AdvertisementService::new(db, locks).delete(actor, id).await?;
    Ok(Status::NoContent)
}
