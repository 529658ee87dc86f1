// src/models/profession.rs
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::utils::clean_text;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Profession {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfessionPayload {
    pub id: Option<i64>,
    pub name: Option<String>,
}

impl ProfessionPayload {
    /// Required, trimmed profession name
    pub fn validated_name(&self) -> Result<String> {
        clean_text(self.name.as_deref())
            .ok_or_else(|| AppError::invalid("profession name is required"))
    }
}
