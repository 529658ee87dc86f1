// src/web/types.rs
use rocket::form::FromForm;
use rocket::http::Status;
use rocket::response::{self, Responder};
use rocket::serde::json::Json;
use rocket::serde::Serialize;
use rocket::{Request, Response};
use tracing::{error, warn};

use crate::error::AppError;
use crate::models::{Authority, User};
use crate::repository::PageQuery;
use crate::service::Paged;

/// Settings the routes need at request time
pub struct ServerConfig {
    pub default_page_size: u32,
    pub max_page_size: u32,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            default_page_size: 20,
            max_page_size: 100,
        }
    }
}

#[derive(Serialize)]
#[serde(crate = "rocket::serde", rename_all = "lowercase")]
pub enum ResponseType {
    Text,
    Error,
}

#[derive(Serialize)]
#[serde(crate = "rocket::serde")]
pub struct TextResponse {
    #[serde(rename = "type")]
    pub response_type: ResponseType,
    pub success: bool,
    pub message: String,
}

impl TextResponse {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            response_type: ResponseType::Text,
            success: true,
            message: message.into(),
        }
    }
}

#[derive(Serialize)]
#[serde(crate = "rocket::serde", rename_all = "camelCase")]
pub struct StandardErrorResponse {
    #[serde(rename = "type")]
    pub response_type: ResponseType,
    pub success: bool,
    pub error: String,
    pub error_code: String,
    pub suggestions: Vec<String>,
}

impl StandardErrorResponse {
    pub fn new(error: String, error_code: String, suggestions: Vec<String>) -> Self {
        Self {
            response_type: ResponseType::Error,
            success: false,
            error,
            error_code,
            suggestions,
        }
    }
}

impl From<&AppError> for StandardErrorResponse {
    fn from(err: &AppError) -> Self {
        Self::new(err.public_message(), err.code().to_string(), err.suggestions())
    }
}

impl<'r> Responder<'r, 'static> for AppError {
    fn respond_to(self, req: &'r Request<'_>) -> response::Result<'static> {
        let status = self.status();
        if status == Status::InternalServerError {
            error!("{} {} failed: {}", req.method(), req.uri(), self);
        } else {
            warn!("{} {} rejected: {}", req.method(), req.uri(), self);
        }
        (status, Json(StandardErrorResponse::from(&self))).respond_to(req)
    }
}

/// The authenticated account as returned by `/api/account`
#[derive(Serialize)]
#[serde(crate = "rocket::serde")]
pub struct AccountResponse {
    pub id: i64,
    pub login: String,
    pub email: Option<String>,
    pub authorities: Vec<Authority>,
    pub activated: bool,
}

impl From<&User> for AccountResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            login: user.login.clone(),
            email: user.email.clone(),
            authorities: user.authority_list(),
            activated: user.activated,
        }
    }
}

/// `page`, `size` and `sort` query parameters
#[derive(Debug, Default, FromForm)]
pub struct PageParams {
    pub page: Option<u32>,
    pub size: Option<u32>,
    pub sort: Option<String>,
}

impl PageParams {
    /// Clamp against the server limits and resolve the sort field
    pub fn resolve(&self, config: &ServerConfig, allowed: &[(&str, &'static str)]) -> PageRequest {
        let page = self.page.unwrap_or(0);
        let size = self
            .size
            .unwrap_or(config.default_page_size)
            .clamp(1, config.max_page_size.max(1));
        PageRequest {
            page,
            size,
            query: PageQuery::new(page, size, self.sort.as_deref(), allowed),
        }
    }
}

pub struct PageRequest {
    pub page: u32,
    pub size: u32,
    pub query: PageQuery,
}

/// A JSON array plus the pagination headers
pub struct PagedResponse<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub page: u32,
    pub size: u32,
    pub active_count: Option<i64>,
}

impl<T> PagedResponse<T> {
    pub fn new(paged: Paged<T>, request: &PageRequest) -> Self {
        Self {
            items: paged.items,
            total: paged.total,
            page: request.page,
            size: request.size,
            active_count: None,
        }
    }

    pub fn with_active_count(mut self, active_count: i64) -> Self {
        self.active_count = Some(active_count);
        self
    }
}

impl<'r, T: Serialize> Responder<'r, 'static> for PagedResponse<T> {
    fn respond_to(self, req: &'r Request<'_>) -> response::Result<'static> {
        let link = link_header(req.uri().path().as_str(), self.page, self.size, self.total);
        let body = Json(self.items).respond_to(req)?;

        let mut builder = Response::build_from(body);
        builder
            .raw_header("X-Total-Count", self.total.to_string())
            .raw_header("Link", link);
        if let Some(active) = self.active_count {
            builder.raw_header("X-Active-Count", active.to_string());
        }
        builder.ok()
    }
}

/// RFC 5988 `Link` header with next/prev/last/first relations
pub fn link_header(path: &str, page: u32, size: u32, total: i64) -> String {
    let size = size.max(1);
    let pages = (total.max(0) as u64).div_ceil(u64::from(size));
    let last = pages.saturating_sub(1);
    let page = u64::from(page);

    let link = |target: u64, rel: &str| format!("<{}?page={}&size={}>; rel=\"{}\"", path, target, size, rel);

    let mut links = Vec::new();
    if page + 1 < pages {
        links.push(link(page + 1, "next"));
    }
    if page > 0 {
        links.push(link(page - 1, "prev"));
    }
    links.push(link(last, "last"));
    links.push(link(0, "first"));
    links.join(",")
}
