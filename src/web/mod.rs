// src/web/mod.rs

pub mod handlers;
pub mod types;


pub use types::*;

use crate::auth::{AuthConfig, AuthFailure, AuthenticatedUser, OptionalAuth};
use crate::core::{ConfigManager, Database, WriteLocks};
use crate::error::Result;
use crate::models::{
    Advertisement, AdvertisementPayload, AdvertisementsByProfession, Candidate, CandidatePayload,
    CandidatesByProfession, Profession, ProfessionPayload,
};
use rocket::fairing::{Fairing, Info, Kind};
use rocket::form::FromForm;
use rocket::http::{Header, Status};
use rocket::response::status::Created;
use rocket::serde::json::Json;
use rocket::{catchers, delete, get, options, post, put, routes, Build, Request, Response, Rocket, State};
use tracing::{error, info};

// CORS Fairing
pub struct Cors;

#[rocket::async_trait]
impl Fairing for Cors {
    fn info(&self) -> Info {
        Info {
            name: "Add CORS headers to responses",
            kind: Kind::Response,
        }
    }

    async fn on_response<'r>(&self, _request: &'r Request<'_>, response: &mut Response<'r>) {
        response.set_header(Header::new("Access-Control-Allow-Origin", "*"));
        response.set_header(Header::new(
            "Access-Control-Allow-Methods",
            "POST, GET, PUT, DELETE, OPTIONS",
        ));
        response.set_header(Header::new("Access-Control-Allow-Headers", "*"));
        response.set_header(Header::new(
            "Access-Control-Expose-Headers",
            "Location, Link, X-Total-Count, X-Active-Count",
        ));
    }
}

/// Query of the advertisement report
#[derive(Debug, Default, FromForm)]
pub struct ReportParams {
    #[field(name = "activeOnly")]
    pub active_only: Option<bool>,
    pub mine: Option<bool>,
}

// Advertisements

#[post("/advertisements", data = "<payload>")]
pub async fn create_advertisement(
    payload: Json<AdvertisementPayload>,
    auth: AuthenticatedUser,
    db: &State<Database>,
    locks: &State<WriteLocks>,
) -> Result<Created<Json<Advertisement>>> {
    handlers::create_advertisement_handler(payload, auth, db, locks).await
}

#[put("/advertisements", data = "<payload>")]
pub async fn update_advertisement(
    payload: Json<AdvertisementPayload>,
    auth: AuthenticatedUser,
    db: &State<Database>,
    locks: &State<WriteLocks>,
) -> Result<Json<Advertisement>> {
    handlers::update_advertisement_handler(payload, auth, db, locks).await
}

#[get("/advertisements?<mine>&<params..>")]
pub async fn list_advertisements(
    mine: Option<bool>,
    params: PageParams,
    auth: AuthenticatedUser,
    config: &State<ServerConfig>,
    db: &State<Database>,
    locks: &State<WriteLocks>,
) -> Result<PagedResponse<Advertisement>> {
    handlers::list_advertisements_handler(params, mine.unwrap_or(false), auth, config, db, locks)
        .await
}

#[get("/advertisements/active")]
pub async fn active_advertisements(
    db: &State<Database>,
    locks: &State<WriteLocks>,
) -> Result<Json<Vec<Advertisement>>> {
    handlers::active_advertisements_handler(db, locks).await
}

#[get("/advertisements/by-profession?<report..>")]
pub async fn advertisements_by_profession(
    report: ReportParams,
    auth: OptionalAuth,
    db: &State<Database>,
    locks: &State<WriteLocks>,
) -> Result<Json<Vec<AdvertisementsByProfession>>> {
    handlers::advertisements_by_profession_handler(
        report.active_only.unwrap_or(true),
        report.mine.unwrap_or(false),
        auth,
        db,
        locks,
    )
    .await
}

#[get("/advertisements/<id>")]
pub async fn get_advertisement(
    id: i64,
    db: &State<Database>,
    locks: &State<WriteLocks>,
) -> Result<Json<Advertisement>> {
    handlers::get_advertisement_handler(id, db, locks).await
}

#[delete("/advertisements/<id>")]
pub async fn delete_advertisement(
    id: i64,
    auth: AuthenticatedUser,
    db: &State<Database>,
    locks: &State<WriteLocks>,
) -> Result<Status> {
    handlers::delete_advertisement_handler(id, auth, db, locks).await
}

// Candidates

#[post("/candidates", data = "<payload>")]
pub async fn apply(
    payload: Json<CandidatePayload>,
    db: &State<Database>,
    locks: &State<WriteLocks>,
) -> Result<Created<Json<Candidate>>> {
    handlers::apply_handler(payload, db, locks).await
}

#[put("/candidates", data = "<payload>")]
pub async fn update_candidate(
    payload: Json<CandidatePayload>,
    auth: AuthenticatedUser,
    db: &State<Database>,
    locks: &State<WriteLocks>,
) -> Result<Json<Candidate>> {
    handlers::update_candidate_handler(payload, auth, db, locks).await
}

#[get("/candidates?<eagerload>&<params..>")]
pub async fn list_candidates(
    eagerload: Option<bool>,
    params: PageParams,
    auth: AuthenticatedUser,
    config: &State<ServerConfig>,
    db: &State<Database>,
    locks: &State<WriteLocks>,
) -> Result<PagedResponse<Candidate>> {
    handlers::list_candidates_handler(params, eagerload.unwrap_or(false), auth, config, db, locks)
        .await
}

#[get("/candidates/by-profession")]
pub async fn candidates_by_profession(
    db: &State<Database>,
    locks: &State<WriteLocks>,
) -> Result<Json<Vec<CandidatesByProfession>>> {
    handlers::candidates_by_profession_handler(db, locks).await
}

#[get("/candidates/<id>")]
pub async fn get_candidate(
    id: i64,
    auth: AuthenticatedUser,
    db: &State<Database>,
    locks: &State<WriteLocks>,
) -> Result<Json<Candidate>> {
    handlers::get_candidate_handler(id, auth, db, locks).await
}

#[delete("/candidates/<id>")]
pub async fn delete_candidate(
    id: i64,
    auth: AuthenticatedUser,
    db: &State<Database>,
    locks: &State<WriteLocks>,
) -> Result<Status> {
    handlers::delete_candidate_handler(id, auth, db, locks).await
}

// Professions

#[post("/professions", data = "<payload>")]
pub async fn create_profession(
    payload: Json<ProfessionPayload>,
    auth: AuthenticatedUser,
    db: &State<Database>,
) -> Result<Created<Json<Profession>>> {
    handlers::create_profession_handler(payload, auth, db).await
}

#[put("/professions", data = "<payload>")]
pub async fn update_profession(
    payload: Json<ProfessionPayload>,
    auth: AuthenticatedUser,
    db: &State<Database>,
) -> Result<Json<Profession>> {
    handlers::update_profession_handler(payload, auth, db).await
}

#[get("/professions?<params..>")]
pub async fn list_professions(
    params: PageParams,
    config: &State<ServerConfig>,
    db: &State<Database>,
) -> Result<PagedResponse<Profession>> {
    handlers::list_professions_handler(params, config, db).await
}

#[get("/professions/<id>")]
pub async fn get_profession(id: i64, db: &State<Database>) -> Result<Json<Profession>> {
    handlers::get_profession_handler(id, db).await
}

#[delete("/professions/<id>")]
pub async fn delete_profession(
    id: i64,
    auth: AuthenticatedUser,
    db: &State<Database>,
) -> Result<Status> {
    handlers::delete_profession_handler(id, auth, db).await
}

// System

#[get("/account")]
pub async fn get_account(auth: AuthenticatedUser) -> Json<AccountResponse> {
    handlers::get_account_handler(auth).await
}

#[get("/health")]
pub async fn health(auth: OptionalAuth, db: &State<Database>) -> Result<Json<TextResponse>> {
    handlers::health_handler(auth, db).await
}

#[options("/<_..>")]
pub async fn options() -> Status {
    Status::Ok
}

// Error catchers

fn error_body(error: &str, code: &str, suggestions: &[&str]) -> Json<StandardErrorResponse> {
    Json(StandardErrorResponse::new(
        error.to_string(),
        code.to_string(),
        suggestions.iter().map(|s| s.to_string()).collect(),
    ))
}

#[rocket::catch(400)]
pub fn bad_request() -> Json<StandardErrorResponse> {
    error_body(
        "Invalid request format",
        "BAD_REQUEST",
        &["Check your request JSON format", "Verify all required fields are present"],
    )
}

#[rocket::catch(401)]
pub fn unauthorized(req: &Request) -> Json<StandardErrorResponse> {
    let reason = req
        .local_cache(|| AuthFailure(None))
        .0
        .unwrap_or("Authentication required");
    error_body(
        reason,
        "UNAUTHORIZED",
        &["Send a valid bearer token in the Authorization header"],
    )
}

#[rocket::catch(403)]
pub fn forbidden() -> Json<StandardErrorResponse> {
    error_body("Access denied", "FORBIDDEN", &["Sign in with an account allowed to do this"])
}

#[rocket::catch(404)]
pub fn not_found() -> Json<StandardErrorResponse> {
    error_body("Resource not found", "NOT_FOUND", &["Check the URL and identifier"])
}

#[rocket::catch(422)]
pub fn unprocessable() -> Json<StandardErrorResponse> {
    error_body(
        "Request body does not match the expected shape",
        "UNPROCESSABLE_ENTITY",
        &["Check field names and value types"],
    )
}

#[rocket::catch(500)]
pub fn internal_error() -> Json<StandardErrorResponse> {
    error_body(
        "Internal server error",
        "INTERNAL_ERROR",
        &["Try again in a few moments", "Contact support if the problem persists"],
    )
}

/// Assemble the API without launching it
pub fn build_rocket(db: Database, auth_config: AuthConfig, server_config: ServerConfig) -> Rocket<Build> {
    rocket::build()
        .attach(Cors)
        .manage(server_config)
        .manage(auth_config)
        .manage(db)
        .manage(WriteLocks::new())
        .register(
            "/api",
            catchers![bad_request, unauthorized, forbidden, not_found, unprocessable, internal_error],
        )
        .mount(
            "/api",
            routes![
                create_advertisement,
                update_advertisement,
                list_advertisements,
                active_advertisements,
                advertisements_by_profession,
                get_advertisement,
                delete_advertisement,
                apply,
                update_candidate,
                list_candidates,
                candidates_by_profession,
                get_candidate,
                delete_candidate,
                create_profession,
                update_profession,
                list_professions,
                get_profession,
                delete_profession,
                get_account,
                health,
                options,
            ],
        )
}

// Main server start function
pub async fn start_web_server(config: &ConfigManager, db: Database) -> anyhow::Result<()> {
    let env = &config.environment;

    let auth_config = AuthConfig::new(env.jwt_secret.clone(), env.token_validity_hours);
    let server_config = ServerConfig {
        default_page_size: env.default_page_size,
        max_page_size: env.max_page_size,
    };

    info!("Starting job posting API server ({})", config.environment_name);
    info!("Database: {}", env.database_path.display());
    info!("Listening on port {}", env.port);

    let figment = rocket::Config::figment().merge(("port", env.port));
    if let Err(e) = build_rocket(db, auth_config, server_config)
        .configure(figment)
        .launch()
        .await
    {
        error!("Rocket stopped with an error: {}", e);
        return Err(anyhow::anyhow!("server error: {}", e));
    }

    Ok(())
}
