// src/models/advertisement.rs
use serde::{Deserialize, Serialize};

use super::{EntityRef, Profession, UserSummary};
use crate::error::{AppError, Result};
use crate::utils::clean_text;

/// A job posting as returned by the API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Advertisement {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub active: bool,
    pub profession: Profession,
    pub user: UserSummary,
}

/// Flat row produced by the advertisement/profession/user join
#[derive(Debug, sqlx::FromRow)]
pub struct AdvertisementRow {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub active: bool,
    pub profession_id: i64,
    pub profession_name: String,
    pub user_id: i64,
    pub user_login: String,
}

impl From<AdvertisementRow> for Advertisement {
    fn from(row: AdvertisementRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            description: row.description,
            active: row.active,
            profession: Profession {
                id: row.profession_id,
                name: row.profession_name,
            },
            user: UserSummary {
                id: row.user_id,
                login: row.user_login,
            },
        }
    }
}

/// Create/update request body. Nested profession and user only need an `id`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AdvertisementPayload {
    pub id: Option<i64>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub active: Option<bool>,
    pub profession: Option<EntityRef>,
    pub user: Option<EntityRef>,
}

/// Validated advertisement fields, ready to persist
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdvertisementDraft {
    pub title: String,
    pub description: String,
    pub active: bool,
    pub profession_id: i64,
    pub requested_owner: Option<i64>,
}

impl AdvertisementPayload {
    pub fn validate(&self) -> Result<AdvertisementDraft> {
        let title = clean_text(self.title.as_deref())
            .ok_or_else(|| AppError::invalid("title is required"))?;
        let description = clean_text(self.description.as_deref())
            .ok_or_else(|| AppError::invalid("description is required"))?;
        let profession_id = self
            .profession
            .as_ref()
            .map(|p| p.id)
            .ok_or_else(|| AppError::invalid("profession is required"))?;

        Ok(AdvertisementDraft {
            title,
            description,
            active: self.active.unwrap_or(false),
            profession_id,
            requested_owner: self.user.as_ref().map(|u| u.id),
        })
    }
}
