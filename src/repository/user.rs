// src/repository/user.rs
use chrono::Utc;
use sqlx::SqliteExecutor;

use crate::models::user::join_authorities;
use crate::models::{Authority, User};

pub struct UserRepository;

impl UserRepository {
    pub async fn create<'e>(
        db: impl SqliteExecutor<'e>,
        login: &str,
        email: Option<&str>,
        authorities: &[Authority],
    ) -> Result<User, sqlx::Error> {
        let now = Utc::now();
        let authorities = join_authorities(authorities);

        let result = sqlx::query(
            r#"
            INSERT INTO users (login, email, authorities, activated, created_at)
            VALUES (?, ?, ?, TRUE, ?)
            "#,
        )
        .bind(login)
        .bind(email)
        .bind(&authorities)
        .bind(now)
        .execute(db)
        .await?;

        Ok(User {
            id: result.last_insert_rowid(),
            login: login.to_string(),
            email: email.map(str::to_string),
            authorities,
            activated: true,
            created_at: now,
        })
    }

    pub async fn find_by_id<'e>(
        db: impl SqliteExecutor<'e>,
        id: i64,
    ) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            "SELECT id, login, email, authorities, activated, created_at FROM users WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(db)
        .await
    }

    pub async fn find_by_login<'e>(
        db: impl SqliteExecutor<'e>,
        login: &str,
    ) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            "SELECT id, login, email, authorities, activated, created_at FROM users WHERE login = ?",
        )
        .bind(login)
        .fetch_optional(db)
        .await
    }

    pub async fn list<'e>(db: impl SqliteExecutor<'e>) -> Result<Vec<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            "SELECT id, login, email, authorities, activated, created_at FROM users ORDER BY login ASC",
        )
        .fetch_all(db)
        .await
    }

    pub async fn set_activated<'e>(
        db: impl SqliteExecutor<'e>,
        login: &str,
        activated: bool,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE users SET activated = ? WHERE login = ?")
            .bind(activated)
            .bind(login)
            .execute(db)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Database;

    #[tokio::test]
    async fn test_create_and_find() {
        let db = Database::in_memory().await.unwrap();
        let created = UserRepository::create(
            db.pool(),
            "acme",
            Some("hr@acme.test"),
            &[Authority::Employer],
        )
        .await
        .unwrap();

        let found = UserRepository::find_by_login(db.pool(), "acme")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.id, created.id);
        assert_eq!(found.authorities, "ROLE_EMPLOYER");
        assert!(found.activated);

        assert!(UserRepository::find_by_id(db.pool(), created.id + 1)
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_login_is_unique() {
        let db = Database::in_memory().await.unwrap();
        UserRepository::create(db.pool(), "acme", None, &[Authority::Employer])
            .await
            .unwrap();
        let duplicate =
            UserRepository::create(db.pool(), "acme", None, &[Authority::Admin]).await;
        assert!(duplicate.is_err());
    }

    #[tokio::test]
    async fn test_deactivate() {
        let db = Database::in_memory().await.unwrap();
        UserRepository::create(db.pool(), "acme", None, &[Authority::Employer])
            .await
            .unwrap();
        assert!(UserRepository::set_activated(db.pool(), "acme", false)
            .await
            .unwrap());
        assert!(!UserRepository::set_activated(db.pool(), "nobody", false)
            .await
            .unwrap());
        let user = UserRepository::find_by_login(db.pool(), "acme")
            .await
            .unwrap()
            .unwrap();
        assert!(!user.activated);
    }
}
