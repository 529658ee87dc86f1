// src/repository/profession.rs
use sqlx::SqliteExecutor;

use super::PageQuery;
use crate::models::Profession;

pub const SORTABLE_FIELDS: &[(&str, &str)] = &[("id", "id"), ("name", "name")];

pub struct ProfessionRepository;

impl ProfessionRepository {
    pub async fn create<'e>(
        db: impl SqliteExecutor<'e>,
        name: &str,
    ) -> Result<Profession, sqlx::Error> {
        let result = sqlx::query("INSERT INTO professions (name) VALUES (?)")
            .bind(name)
            .execute(db)
            .await?;

        Ok(Profession {
            id: result.last_insert_rowid(),
            name: name.to_string(),
        })
    }

    /// Returns false when no row has this id
    pub async fn update<'e>(
        db: impl SqliteExecutor<'e>,
        id: i64,
        name: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE professions SET name = ? WHERE id = ?")
            .bind(name)
            .bind(id)
            .execute(db)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn find_by_id<'e>(
        db: impl SqliteExecutor<'e>,
        id: i64,
    ) -> Result<Option<Profession>, sqlx::Error> {
        sqlx::query_as::<_, Profession>("SELECT id, name FROM professions WHERE id = ?")
            .bind(id)
            .fetch_optional(db)
            .await
    }

    pub async fn find_by_name<'e>(
        db: impl SqliteExecutor<'e>,
        name: &str,
    ) -> Result<Option<Profession>, sqlx::Error> {
        sqlx::query_as::<_, Profession>("SELECT id, name FROM professions WHERE name = ?")
            .bind(name)
            .fetch_optional(db)
            .await
    }

    pub async fn find_all<'e>(db: impl SqliteExecutor<'e>) -> Result<Vec<Profession>, sqlx::Error> {
        sqlx::query_as::<_, Profession>("SELECT id, name FROM professions ORDER BY name ASC")
            .fetch_all(db)
            .await
    }

    pub async fn find_page<'e>(
        db: impl SqliteExecutor<'e>,
        page: &PageQuery,
    ) -> Result<Vec<Profession>, sqlx::Error> {
        let sql = format!(
            "SELECT id, name FROM professions {} LIMIT ? OFFSET ?",
            page.order_by()
        );
        sqlx::query_as::<_, Profession>(&sql)
            .bind(page.limit)
            .bind(page.offset)
            .fetch_all(db)
            .await
    }

    pub async fn count<'e>(db: impl SqliteExecutor<'e>) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM professions")
            .fetch_one(db)
            .await
    }

    /// Advertisements still pointing at this profession
    pub async fn count_references<'e>(
        db: impl SqliteExecutor<'e>,
        id: i64,
    ) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM advertisements WHERE profession_id = ?")
            .bind(id)
            .fetch_one(db)
            .await
    }

    pub async fn delete<'e>(db: impl SqliteExecutor<'e>, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM professions WHERE id = ?")
            .bind(id)
            .execute(db)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
