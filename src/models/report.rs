// src/models/report.rs
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct AdvertisementsByProfession {
    pub profession_name: String,
    pub ads_count: i64,
}

/// Counts application rows, so one candidate applying twice within a
/// profession is counted twice
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct CandidatesByProfession {
    pub profession_name: String,
    pub candidates_count: i64,
}
