// src/service/profession.rs
use std::path::Path;
use tracing::{info, warn};

use super::Paged;
use crate::core::Database;
use crate::error::{AppError, Result};
use crate::models::{Profession, ProfessionPayload};
use crate::repository::{PageQuery, ProfessionRepository};
use crate::utils::clean_text;

/// Outcome of a bulk import
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ImportSummary {
    pub added: usize,
    pub skipped: usize,
    pub errors: usize,
}

pub struct ProfessionService<'a> {
    db: &'a Database,
}

impl<'a> ProfessionService<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    pub async fn create(&self, payload: &ProfessionPayload) -> Result<Profession> {
        if payload.id.is_some() {
            return Err(AppError::AlreadyExists(
                "A new profession cannot already have an ID".to_string(),
            ));
        }
        let name = payload.validated_name()?;
        self.ensure_name_free(&name, None).await?;

        let profession = ProfessionRepository::create(self.db.pool(), &name)
            .await
            .map_err(|e| name_clash(e, &name))?;
        info!("Profession {} created: {}", profession.id, profession.name);
        Ok(profession)
    }

    pub async fn update(&self, payload: &ProfessionPayload) -> Result<Profession> {
        let id = payload
            .id
            .ok_or_else(|| AppError::invalid("missing id"))?;
        let name = payload.validated_name()?;
        self.ensure_name_free(&name, Some(id)).await?;

        let updated = ProfessionRepository::update(self.db.pool(), id, &name)
            .await
            .map_err(|e| name_clash(e, &name))?;
        if !updated {
            return Err(AppError::not_found(format!("Profession {}", id)));
        }
        Ok(Profession { id, name })
    }

    pub async fn find_one(&self, id: i64) -> Result<Profession> {
        ProfessionRepository::find_by_id(self.db.pool(), id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Profession {}", id)))
    }

    pub async fn find_all(&self) -> Result<Vec<Profession>> {
        Ok(ProfessionRepository::find_all(self.db.pool()).await?)
    }

    pub async fn find_page(&self, page: &PageQuery) -> Result<Paged<Profession>> {
        let items = ProfessionRepository::find_page(self.db.pool(), page).await?;
        let total = ProfessionRepository::count(self.db.pool()).await?;
        Ok(Paged { items, total })
    }

    /// Professions referenced by an advertisement cannot be deleted
    pub async fn delete(&self, id: i64) -> Result<()> {
        let references = ProfessionRepository::count_references(self.db.pool(), id).await?;
        if references > 0 {
            return Err(AppError::invalid(format!(
                "profession {} is used by {} advertisement(s)",
                id, references
            )));
        }
        if !ProfessionRepository::delete(self.db.pool(), id).await? {
            return Err(AppError::not_found(format!("Profession {}", id)));
        }
        info!("Profession {} deleted", id);
        Ok(())
    }

    /// Import professions from a CSV file with a `name` column. Existing
    /// names are skipped.
    pub async fn import_csv(&self, path: &Path) -> anyhow::Result<ImportSummary> {
        let content = tokio::fs::read_to_string(path).await?;
        let mut reader = csv::Reader::from_reader(content.as_bytes());
        let mut summary = ImportSummary::default();

        for record in reader.records() {
            let record = match record {
                Ok(record) => record,
                Err(e) => {
                    summary.errors += 1;
                    warn!("CSV parsing error: {}", e);
                    continue;
                }
            };
            let Some(name) = clean_text(record.get(0)) else {
                summary.errors += 1;
                warn!("Skipping record without a profession name");
                continue;
            };

            if ProfessionRepository::find_by_name(self.db.pool(), &name)
                .await?
                .is_some()
            {
                summary.skipped += 1;
                info!("Skipped (already exists): {}", name);
                continue;
            }
            ProfessionRepository::create(self.db.pool(), &name).await?;
            summary.added += 1;
            info!("Added profession: {}", name);
        }

        Ok(summary)
    }

    async fn ensure_name_free(&self, name: &str, own_id: Option<i64>) -> Result<()> {
        match ProfessionRepository::find_by_name(self.db.pool(), name).await? {
            Some(existing) if Some(existing.id) != own_id => Err(AppError::AlreadyExists(
                format!("Profession '{}' already exists", name),
            )),
            _ => Ok(()),
        }
    }
}

fn name_clash(err: sqlx::Error, name: &str) -> AppError {
    let unique = err
        .as_database_error()
        .is_some_and(|db_err| db_err.is_unique_violation());
    if unique {
        AppError::AlreadyExists(format!("Profession '{}' already exists", name))
    } else {
        AppError::Database(err)
    }
}
