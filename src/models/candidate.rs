// src/models/candidate.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Advertisement, EntityRef};
use crate::error::{AppError, Result};
use crate::utils::{clean_text, is_plausible_email, normalize_email};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    /// Present when associations were loaded
    #[serde(skip_serializing_if = "Option::is_none")]
    pub advertisements: Option<Vec<Advertisement>>,
}

impl Candidate {
    pub fn advertisement_ids(&self) -> Vec<i64> {
        self.advertisements
            .as_deref()
            .unwrap_or_default()
            .iter()
            .map(|a| a.id)
            .collect()
    }

    pub fn has_applied_to(&self, advertisement_id: i64) -> bool {
        self.advertisement_ids().contains(&advertisement_id)
    }

    pub fn same_name_as(&self, first_name: &str, last_name: &str) -> bool {
        self.first_name == first_name && self.last_name == last_name
    }
}

#[derive(Debug, sqlx::FromRow)]
pub struct CandidateRow {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

impl CandidateRow {
    pub fn into_candidate(self, advertisements: Option<Vec<Advertisement>>) -> Candidate {
        Candidate {
            id: self.id,
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            advertisements,
        }
    }
}

/// One candidate/advertisement association
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct JobApplication {
    pub advertisement_id: i64,
    pub candidate_id: i64,
    pub applied_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidatePayload {
    pub id: Option<i64>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    #[serde(default)]
    pub advertisements: Vec<EntityRef>,
}

/// Validated candidate fields
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateDraft {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub email_key: String,
    pub advertisement_ids: Vec<i64>,
}

impl CandidatePayload {
    /// Validate identity fields and the advertisement set
    pub fn validate(&self) -> Result<CandidateDraft> {
        let first_name = clean_text(self.first_name.as_deref())
            .ok_or_else(|| AppError::invalid("first name is required"))?;
        let last_name = clean_text(self.last_name.as_deref())
            .ok_or_else(|| AppError::invalid("last name is required"))?;
        let email = clean_text(self.email.as_deref())
            .ok_or_else(|| AppError::invalid("email is required"))?;
        if !is_plausible_email(&email) {
            return Err(AppError::invalid(format!("'{}' is not a valid email", email)));
        }

        let mut advertisement_ids: Vec<i64> = self.advertisements.iter().map(|a| a.id).collect();
        advertisement_ids.sort_unstable();
        advertisement_ids.dedup();

        Ok(CandidateDraft {
            email_key: normalize_email(&email),
            first_name,
            last_name,
            email,
            advertisement_ids,
        })
    }

    /// Validate an application: identity fields plus exactly one advertisement
    pub fn validate_application(&self) -> Result<(CandidateDraft, i64)> {
        let draft = self.validate()?;
        match draft.advertisement_ids.len() {
            1 => {
                let advertisement_id = draft.advertisement_ids[0];
                Ok((draft, advertisement_id))
            }
            0 => Err(AppError::invalid("an application must reference an advertisement")),
            _ => Err(AppError::invalid(
                "an application must reference exactly one advertisement",
            )),
        }
    }
}
