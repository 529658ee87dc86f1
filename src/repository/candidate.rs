// src/repository/candidate.rs
use chrono::Utc;
use sqlx::{SqliteConnection, SqliteExecutor};

use super::{AdvertisementRepository, PageQuery};
use crate::models::{Candidate, CandidateRow, CandidatesByProfession, JobApplication};

pub const SORTABLE_FIELDS: &[(&str, &str)] = &[
    ("id", "id"),
    ("firstName", "first_name"),
    ("lastName", "last_name"),
    ("email", "email_key"),
];

pub struct CandidateRepository;

impl CandidateRepository {
    pub async fn insert<'e>(
        db: impl SqliteExecutor<'e>,
        first_name: &str,
        last_name: &str,
        email: &str,
        email_key: &str,
    ) -> Result<i64, sqlx::Error> {
        let result = sqlx::query(
            r#"
            INSERT INTO candidates (first_name, last_name, email, email_key)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(first_name)
        .bind(last_name)
        .bind(email)
        .bind(email_key)
        .execute(db)
        .await?;

        Ok(result.last_insert_rowid())
    }

    pub async fn update<'e>(
        db: impl SqliteExecutor<'e>,
        id: i64,
        first_name: &str,
        last_name: &str,
        email: &str,
        email_key: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE candidates
            SET first_name = ?, last_name = ?, email = ?, email_key = ?
            WHERE id = ?
            "#,
        )
        .bind(first_name)
        .bind(last_name)
        .bind(email)
        .bind(email_key)
        .bind(id)
        .execute(db)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn find_row<'e>(
        db: impl SqliteExecutor<'e>,
        id: i64,
    ) -> Result<Option<CandidateRow>, sqlx::Error> {
        sqlx::query_as::<_, CandidateRow>(
            "SELECT id, first_name, last_name, email FROM candidates WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(db)
        .await
    }

    /// Candidate with its advertisements loaded
    pub async fn find_one_with_advertisements(
        conn: &mut SqliteConnection,
        id: i64,
    ) -> Result<Option<Candidate>, sqlx::Error> {
        match Self::find_row(&mut *conn, id).await? {
            Some(row) => {
                let advertisements = AdvertisementRepository::find_by_candidate(&mut *conn, row.id).await?;
                Ok(Some(row.into_candidate(Some(advertisements))))
            }
            None => Ok(None),
        }
    }

    /// Lookup by normalized email, with advertisements loaded
    pub async fn find_by_email_key_with_advertisements(
        conn: &mut SqliteConnection,
        email_key: &str,
    ) -> Result<Option<Candidate>, sqlx::Error> {
        let row = sqlx::query_as::<_, CandidateRow>(
            "SELECT id, first_name, last_name, email FROM candidates WHERE email_key = ?",
        )
        .bind(email_key)
        .fetch_optional(&mut *conn)
        .await?;

        match row {
            Some(row) => {
                let advertisements = AdvertisementRepository::find_by_candidate(&mut *conn, row.id).await?;
                Ok(Some(row.into_candidate(Some(advertisements))))
            }
            None => Ok(None),
        }
    }

    pub async fn find_id_by_email_key<'e>(
        db: impl SqliteExecutor<'e>,
        email_key: &str,
    ) -> Result<Option<i64>, sqlx::Error> {
        sqlx::query_scalar("SELECT id FROM candidates WHERE email_key = ?")
            .bind(email_key)
            .fetch_optional(db)
            .await
    }

    /// One page of candidates; advertisements are loaded when `eager` is set
    pub async fn find_page(
        conn: &mut SqliteConnection,
        page: &PageQuery,
        eager: bool,
    ) -> Result<Vec<Candidate>, sqlx::Error> {
        let sql = format!(
            "SELECT id, first_name, last_name, email FROM candidates {} LIMIT ? OFFSET ?",
            page.order_by()
        );
        let rows = sqlx::query_as::<_, CandidateRow>(&sql)
            .bind(page.limit)
            .bind(page.offset)
            .fetch_all(&mut *conn)
            .await?;

        let mut candidates = Vec::with_capacity(rows.len());
        for row in rows {
            let advertisements = if eager {
                Some(AdvertisementRepository::find_by_candidate(&mut *conn, row.id).await?)
            } else {
                None
            };
            candidates.push(row.into_candidate(advertisements));
        }
        Ok(candidates)
    }

    pub async fn count<'e>(db: impl SqliteExecutor<'e>) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM candidates")
            .fetch_one(db)
            .await
    }

    pub async fn delete<'e>(db: impl SqliteExecutor<'e>, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM candidates WHERE id = ?")
            .bind(id)
            .execute(db)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Application rows grouped by the profession of the advertisement
    pub async fn count_by_profession<'e>(
        db: impl SqliteExecutor<'e>,
    ) -> Result<Vec<CandidatesByProfession>, sqlx::Error> {
        sqlx::query_as::<_, CandidatesByProfession>(
            r#"
            SELECT p.name AS profession_name, COUNT(ja.candidate_id) AS candidates_count
            FROM job_applications ja
            JOIN advertisements a ON a.id = ja.advertisement_id
            JOIN professions p ON p.id = a.profession_id
            GROUP BY a.profession_id, p.name
            ORDER BY p.name ASC
            "#,
        )
        .fetch_all(db)
        .await
    }
}

pub struct JobApplicationRepository;

impl JobApplicationRepository {
    pub async fn insert<'e>(
        db: impl SqliteExecutor<'e>,
        advertisement_id: i64,
        candidate_id: i64,
    ) -> Result<JobApplication, sqlx::Error> {
        let applied_at = Utc::now();
        sqlx::query(
            r#"
            INSERT INTO job_applications (advertisement_id, candidate_id, applied_at)
            VALUES (?, ?, ?)
            "#,
        )
        .bind(advertisement_id)
        .bind(candidate_id)
        .bind(applied_at)
        .execute(db)
        .await?;

        Ok(JobApplication {
            advertisement_id,
            candidate_id,
            applied_at,
        })
    }

    pub async fn find_by_candidate<'e>(
        db: impl SqliteExecutor<'e>,
        candidate_id: i64,
    ) -> Result<Vec<JobApplication>, sqlx::Error> {
        sqlx::query_as::<_, JobApplication>(
            r#"
            SELECT advertisement_id, candidate_id, applied_at
            FROM job_applications
            WHERE candidate_id = ?
            ORDER BY advertisement_id ASC
            "#,
        )
        .bind(candidate_id)
        .fetch_all(db)
        .await
    }

    pub async fn delete<'e>(
        db: impl SqliteExecutor<'e>,
        advertisement_id: i64,
        candidate_id: i64,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "DELETE FROM job_applications WHERE advertisement_id = ? AND candidate_id = ?",
        )
        .bind(advertisement_id)
        .bind(candidate_id)
        .execute(db)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
