// src/repository/advertisement.rs
use sqlx::SqliteExecutor;

use super::PageQuery;
use crate::models::{Advertisement, AdvertisementRow, AdvertisementsByProfession};

const SELECT_ADVERTISEMENT: &str = r#"
    SELECT a.id, a.title, a.description, a.active,
           p.id AS profession_id, p.name AS profession_name,
           u.id AS user_id, u.login AS user_login
    FROM advertisements a
    JOIN professions p ON p.id = a.profession_id
    JOIN users u ON u.id = a.user_id
"#;

pub const SORTABLE_FIELDS: &[(&str, &str)] = &[
    ("id", "a.id"),
    ("title", "a.title"),
    ("active", "a.active"),
    ("profession", "p.name"),
];

/// Optional restrictions shared by listings and reports
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AdvertisementFilter {
    pub owner_id: Option<i64>,
    pub active_only: bool,
}

pub struct AdvertisementRepository;

impl AdvertisementRepository {
    pub async fn insert<'e>(
        db: impl SqliteExecutor<'e>,
        title: &str,
        description: &str,
        active: bool,
        profession_id: i64,
        owner_id: i64,
    ) -> Result<i64, sqlx::Error> {
        let result = sqlx::query(
            r#"
            INSERT INTO advertisements (title, description, active, profession_id, user_id)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(title)
        .bind(description)
        .bind(active)
        .bind(profession_id)
        .bind(owner_id)
        .execute(db)
        .await?;

        Ok(result.last_insert_rowid())
    }

    /// Full replace of every mutable column
    pub async fn update<'e>(
        db: impl SqliteExecutor<'e>,
        id: i64,
        title: &str,
        description: &str,
        active: bool,
        profession_id: i64,
        owner_id: i64,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE advertisements
            SET title = ?, description = ?, active = ?, profession_id = ?, user_id = ?
            WHERE id = ?
            "#,
        )
        .bind(title)
        .bind(description)
        .bind(active)
        .bind(profession_id)
        .bind(owner_id)
        .bind(id)
        .execute(db)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn find_by_id<'e>(
        db: impl SqliteExecutor<'e>,
        id: i64,
    ) -> Result<Option<Advertisement>, sqlx::Error> {
        let sql = format!("{} WHERE a.id = ?", SELECT_ADVERTISEMENT);
        let row = sqlx::query_as::<_, AdvertisementRow>(&sql)
            .bind(id)
            .fetch_optional(db)
            .await?;
        Ok(row.map(Advertisement::from))
    }

    pub async fn find_active<'e>(
        db: impl SqliteExecutor<'e>,
    ) -> Result<Vec<Advertisement>, sqlx::Error> {
        let sql = format!("{} WHERE a.active = TRUE ORDER BY a.id DESC", SELECT_ADVERTISEMENT);
        let rows = sqlx::query_as::<_, AdvertisementRow>(&sql)
            .fetch_all(db)
            .await?;
        Ok(rows.into_iter().map(Advertisement::from).collect())
    }

    pub async fn find_page<'e>(
        db: impl SqliteExecutor<'e>,
        filter: AdvertisementFilter,
        page: &PageQuery,
    ) -> Result<Vec<Advertisement>, sqlx::Error> {
        let sql = format!(
            "{} WHERE (?1 IS NULL OR a.user_id = ?1) AND (?2 = FALSE OR a.active = TRUE) {} LIMIT ?3 OFFSET ?4",
            SELECT_ADVERTISEMENT,
            page.order_by()
        );
        let rows = sqlx::query_as::<_, AdvertisementRow>(&sql)
            .bind(filter.owner_id)
            .bind(filter.active_only)
            .bind(page.limit)
            .bind(page.offset)
            .fetch_all(db)
            .await?;
        Ok(rows.into_iter().map(Advertisement::from).collect())
    }

    pub async fn count<'e>(
        db: impl SqliteExecutor<'e>,
        filter: AdvertisementFilter,
    ) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM advertisements a
            WHERE (?1 IS NULL OR a.user_id = ?1) AND (?2 = FALSE OR a.active = TRUE)
            "#,
        )
        .bind(filter.owner_id)
        .bind(filter.active_only)
        .fetch_one(db)
        .await
    }

    /// Active advertisements owned by `owner_id`
    pub async fn count_active_by_owner<'e>(
        db: impl SqliteExecutor<'e>,
        owner_id: i64,
    ) -> Result<i64, sqlx::Error> {
        Self::count(
            db,
            AdvertisementFilter {
                owner_id: Some(owner_id),
                active_only: true,
            },
        )
        .await
    }

    /// Advertisements among `ids`, in id order; unknown ids are skipped
    pub async fn find_by_ids<'e>(
        db: impl SqliteExecutor<'e>,
        ids: &[i64],
    ) -> Result<Vec<Advertisement>, sqlx::Error> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let placeholders = vec!["?"; ids.len()].join(", ");
        let sql = format!(
            "{} WHERE a.id IN ({}) ORDER BY a.id ASC",
            SELECT_ADVERTISEMENT, placeholders
        );
        let mut query = sqlx::query_as::<_, AdvertisementRow>(&sql);
        for id in ids {
            query = query.bind(*id);
        }
        let rows = query.fetch_all(db).await?;
        Ok(rows.into_iter().map(Advertisement::from).collect())
    }

    /// Advertisements a candidate applied to
    pub async fn find_by_candidate<'e>(
        db: impl SqliteExecutor<'e>,
        candidate_id: i64,
    ) -> Result<Vec<Advertisement>, sqlx::Error> {
        let sql = format!(
            "{} JOIN job_applications ja ON ja.advertisement_id = a.id WHERE ja.candidate_id = ? ORDER BY a.id ASC",
            SELECT_ADVERTISEMENT
        );
        let rows = sqlx::query_as::<_, AdvertisementRow>(&sql)
            .bind(candidate_id)
            .fetch_all(db)
            .await?;
        Ok(rows.into_iter().map(Advertisement::from).collect())
    }

    pub async fn delete<'e>(db: impl SqliteExecutor<'e>, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM advertisements WHERE id = ?")
            .bind(id)
            .execute(db)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Advertisement counts grouped by profession; professions without a
    /// matching advertisement are absent
    pub async fn count_by_profession<'e>(
        db: impl SqliteExecutor<'e>,
        filter: AdvertisementFilter,
    ) -> Result<Vec<AdvertisementsByProfession>, sqlx::Error> {
        sqlx::query_as::<_, AdvertisementsByProfession>(
            r#"
            SELECT p.name AS profession_name, COUNT(a.id) AS ads_count
            FROM advertisements a
            JOIN professions p ON p.id = a.profession_id
            WHERE (?1 IS NULL OR a.user_id = ?1) AND (?2 = FALSE OR a.active = TRUE)
            GROUP BY a.profession_id, p.name
            ORDER BY p.name ASC
            "#,
        )
        .bind(filter.owner_id)
        .bind(filter.active_only)
        .fetch_all(db)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Database;
    use crate::models::Authority;
    use crate::repository::{ProfessionRepository, UserRepository};

    struct Fixture {
        db: Database,
        owner: i64,
        other: i64,
        welder: i64,
        baker: i64,
    }

    async fn fixture() -> Fixture {
        let db = Database::in_memory().await.unwrap();
        let owner = UserRepository::create(db.pool(), "acme", None, &[Authority::Employer])
            .await
            .unwrap()
            .id;
        let other = UserRepository::create(db.pool(), "globex", None, &[Authority::Employer])
            .await
            .unwrap()
            .id;
        let welder = ProfessionRepository::create(db.pool(), "Welder").await.unwrap().id;
        let baker = ProfessionRepository::create(db.pool(), "Baker").await.unwrap().id;
        Fixture {
            db,
            owner,
            other,
            welder,
            baker,
        }
    }

    #[tokio::test]
    async fn test_insert_update_and_find() {
        let f = fixture().await;
        let pool = f.db.pool();
        let id = AdvertisementRepository::insert(pool, "Welder", "Days", false, f.welder, f.owner)
            .await
            .unwrap();

        assert!(AdvertisementRepository::update(pool, id, "Baker", "Nights", true, f.baker, f.other)
            .await
            .unwrap());

        let ad = AdvertisementRepository::find_by_id(pool, id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(ad.title, "Baker");
        assert_eq!(ad.description, "Nights");
        assert!(ad.active);
        assert_eq!(ad.profession.name, "Baker");
        assert_eq!(ad.user.login, "globex");

        assert!(!AdvertisementRepository::update(pool, id + 100, "x", "y", false, f.baker, f.other)
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_filters_and_counts() {
        let f = fixture().await;
        let pool = f.db.pool();
        for (active, owner, profession) in [
            (true, f.owner, f.welder),
            (true, f.owner, f.welder),
            (false, f.owner, f.baker),
            (true, f.other, f.baker),
        ] {
            AdvertisementRepository::insert(pool, "t", "d", active, profession, owner)
                .await
                .unwrap();
        }

        assert_eq!(
            AdvertisementRepository::count_active_by_owner(pool, f.owner)
                .await
                .unwrap(),
            2
        );
        assert_eq!(
            AdvertisementRepository::count(pool, AdvertisementFilter::default())
                .await
                .unwrap(),
            4
        );
        assert_eq!(AdvertisementRepository::find_active(pool).await.unwrap().len(), 3);

        let page = PageQuery::new(0, 10, None, SORTABLE_FIELDS);
        let mine = AdvertisementRepository::find_page(
            pool,
            AdvertisementFilter {
                owner_id: Some(f.owner),
                active_only: false,
            },
            &page,
        )
        .await
        .unwrap();
        assert_eq!(mine.len(), 3);
        assert!(mine.iter().all(|a| a.user.id == f.owner));

        let active_report =
            AdvertisementRepository::count_by_profession(pool, AdvertisementFilter {
                owner_id: None,
                active_only: true,
            })
            .await
            .unwrap();
        assert_eq!(
            active_report,
            vec![
                AdvertisementsByProfession {
                    profession_name: "Baker".to_string(),
                    ads_count: 1
                },
                AdvertisementsByProfession {
                    profession_name: "Welder".to_string(),
                    ads_count: 2
                },
            ]
        );

        let other_report =
            AdvertisementRepository::count_by_profession(pool, AdvertisementFilter {
                owner_id: Some(f.other),
                active_only: true,
            })
            .await
            .unwrap();
        assert_eq!(other_report.len(), 1);
        assert_eq!(other_report[0].profession_name, "Baker");
    }

    #[tokio::test]
    async fn test_find_by_ids_skips_unknown() {
        let f = fixture().await;
        let pool = f.db.pool();
        let a = AdvertisementRepository::insert(pool, "a", "d", false, f.welder, f.owner)
            .await
            .unwrap();
        let b = AdvertisementRepository::insert(pool, "b", "d", false, f.welder, f.owner)
            .await
            .unwrap();

        let found = AdvertisementRepository::find_by_ids(pool, &[b, a, 999])
            .await
            .unwrap();
        assert_eq!(found.iter().map(|ad| ad.id).collect::<Vec<_>>(), vec![a, b]);
        assert!(AdvertisementRepository::find_by_ids(pool, &[])
            .await
            .unwrap()
            .is_empty());
    }
}
