// src/models/user.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::utils::split_list;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Authority {
    #[serde(rename = "ROLE_ADMIN")]
    Admin,
    #[serde(rename = "ROLE_EMPLOYER")]
    Employer,
}

impl Authority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Authority::Admin => "ROLE_ADMIN",
            Authority::Employer => "ROLE_EMPLOYER",
        }
    }
}

impl fmt::Display for Authority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Authority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "ROLE_ADMIN" => Ok(Authority::Admin),
            "ROLE_EMPLOYER" => Ok(Authority::Employer),
            other => Err(format!("Unknown authority: {}", other)),
        }
    }
}

/// Account owning advertisements
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub login: String,
    pub email: Option<String>,
    pub authorities: String,
    pub activated: bool,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Parsed authorities; unknown entries are ignored
    pub fn authority_list(&self) -> Vec<Authority> {
        split_list(&self.authorities)
            .iter()
            .filter_map(|a| a.parse().ok())
            .collect()
    }

    pub fn has_authority(&self, authority: Authority) -> bool {
        self.authority_list().contains(&authority)
    }

    pub fn is_admin(&self) -> bool {
        self.has_authority(Authority::Admin)
    }
}

/// The part of a user embedded in advertisement responses
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: i64,
    pub login: String,
}

pub fn join_authorities(authorities: &[Authority]) -> String {
    authorities
        .iter()
        .map(Authority::as_str)
        .collect::<Vec<_>>()
        .join(",")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user_with(authorities: &str) -> User {
        User {
            id: 1,
            login: "acme".to_string(),
            email: None,
            authorities: authorities.to_string(),
            activated: true,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_authority_parsing() {
        let user = user_with("ROLE_ADMIN, ROLE_EMPLOYER, ROLE_UNKNOWN");
        assert_eq!(
            user.authority_list(),
            vec![Authority::Admin, Authority::Employer]
        );
        assert!(user.is_admin());
        assert!(!user_with("ROLE_EMPLOYER").is_admin());
    }

    #[test]
    fn test_join_authorities() {
        assert_eq!(
            join_authorities(&[Authority::Admin, Authority::Employer]),
            "ROLE_ADMIN,ROLE_EMPLOYER"
        );
    }
}
