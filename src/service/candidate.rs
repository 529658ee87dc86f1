// src/service/candidate.rs
//! Candidate applications keyed by normalized email

use std::collections::BTreeSet;
use tracing::{info, warn};

use super::Paged;
use crate::core::{Database, WriteLocks};
use crate::error::{AppError, Result};
use crate::models::{Candidate, CandidatePayload, CandidatesByProfession};
use crate::repository::{
    AdvertisementRepository, CandidateRepository, JobApplicationRepository, PageQuery,
};
use crate::utils::normalize_email;

pub struct CandidateService<'a> {
    db: &'a Database,
    locks: &'a WriteLocks,
}

impl<'a> CandidateService<'a> {
    pub fn new(db: &'a Database, locks: &'a WriteLocks) -> Self {
        Self { db, locks }
    }

    /// Apply to one advertisement. A known email merges into the existing
    /// candidate, provided the name matches and the advertisement is new to
    /// them.
    pub async fn apply(&self, payload: &CandidatePayload) -> Result<Candidate> {
        if payload.id.is_some() {
            return Err(AppError::AlreadyExists(
                "A new candidate cannot already have an ID".to_string(),
            ));
        }
        let (draft, advertisement_id) = payload.validate_application()?;

        let _email_guard = self.locks.emails.lock(draft.email_key.clone()).await;
        let mut tx = self.db.begin_write().await?;

        if AdvertisementRepository::find_by_id(&mut *tx, advertisement_id)
            .await?
            .is_none()
        {
            return Err(AppError::invalid(format!(
                "unknown advertisement {}",
                advertisement_id
            )));
        }

        let existing =
            CandidateRepository::find_by_email_key_with_advertisements(&mut tx, &draft.email_key)
                .await?;

        let candidate_id = match existing {
            None => {
                let id = CandidateRepository::insert(
                    &mut *tx,
                    &draft.first_name,
                    &draft.last_name,
                    &draft.email,
                    &draft.email_key,
                )
                .await?;
                info!("New candidate {} for {}", id, draft.email_key);
                id
            }
            Some(existing) => {
                if !existing.same_name_as(&draft.first_name, &draft.last_name) {
                    warn!(
                        "Email {} is registered to candidate {} under another name",
                        draft.email_key, existing.id
                    );
                    return Err(AppError::IdentityConflict);
                }
                if existing.has_applied_to(advertisement_id) {
                    return Err(AppError::DuplicateApplication);
                }
                existing.id
            }
        };

        let application =
            JobApplicationRepository::insert(&mut *tx, advertisement_id, candidate_id).await?;
        let candidate = CandidateRepository::find_one_with_advertisements(&mut tx, candidate_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Candidate {}", candidate_id)))?;
        tx.commit().await?;

        info!(
            "Candidate {} applied to advertisement {} at {}",
            application.candidate_id, application.advertisement_id, application.applied_at
        );
        Ok(candidate)
    }

    /// Full replace of a candidate, including its advertisement set
    pub async fn update(&self, payload: &CandidatePayload) -> Result<Candidate> {
        let id = payload
            .id
            .ok_or_else(|| AppError::invalid("missing id"))?;
        let draft = payload.validate()?;

        let current = CandidateRepository::find_row(self.db.pool(), id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Candidate {}", id)))?;
        let current_key = normalize_email(&current.email);

        // Both the outgoing and the incoming email, in a fixed order
        let mut keys = vec![current_key.clone(), draft.email_key.clone()];
        keys.sort();
        keys.dedup();
        let mut email_guards = Vec::with_capacity(keys.len());
        for key in keys {
            email_guards.push(self.locks.emails.lock(key).await);
        }
        let mut tx = self.db.begin_write().await?;

        let current = CandidateRepository::find_row(&mut *tx, id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Candidate {}", id)))?;
        if normalize_email(&current.email) != current_key {
            return Err(AppError::invalid(format!(
                "Candidate {} changed email, reload it and retry",
                id
            )));
        }
        if let Some(owner) = CandidateRepository::find_id_by_email_key(&mut *tx, &draft.email_key).await? {
            if owner != id {
                return Err(AppError::IdentityConflict);
            }
        }

        let known = AdvertisementRepository::find_by_ids(&mut *tx, &draft.advertisement_ids).await?;
        if known.len() != draft.advertisement_ids.len() {
            return Err(AppError::invalid("unknown advertisement in set"));
        }

        CandidateRepository::update(
            &mut *tx,
            id,
            &draft.first_name,
            &draft.last_name,
            &draft.email,
            &draft.email_key,
        )
        .await?;

        let current: BTreeSet<i64> = JobApplicationRepository::find_by_candidate(&mut *tx, id)
            .await?
            .into_iter()
            .map(|a| a.advertisement_id)
            .collect();
        let wanted: BTreeSet<i64> = draft.advertisement_ids.iter().copied().collect();

        for removed in current.difference(&wanted) {
            JobApplicationRepository::delete(&mut *tx, *removed, id).await?;
        }
        for added in wanted.difference(&current) {
            JobApplicationRepository::insert(&mut *tx, *added, id).await?;
        }

        let candidate = CandidateRepository::find_one_with_advertisements(&mut tx, id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Candidate {}", id)))?;
        tx.commit().await?;

        info!("Candidate {} updated", id);
        Ok(candidate)
    }

    pub async fn find_one(&self, id: i64) -> Result<Candidate> {
        let mut conn = self.db.pool().acquire().await?;
        CandidateRepository::find_one_with_advertisements(&mut conn, id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Candidate {}", id)))
    }

    pub async fn find_page(&self, page: &PageQuery, eager: bool) -> Result<Paged<Candidate>> {
        let mut conn = self.db.pool().acquire().await?;
        let items = CandidateRepository::find_page(&mut conn, page, eager).await?;
        let total = CandidateRepository::count(&mut *conn).await?;
        Ok(Paged { items, total })
    }

    pub async fn count_by_profession(&self) -> Result<Vec<CandidatesByProfession>> {
        Ok(CandidateRepository::count_by_profession(self.db.pool()).await?)
    }

    pub async fn delete(&self, id: i64) -> Result<()> {
        if !CandidateRepository::delete(self.db.pool(), id).await? {
            return Err(AppError::not_found(format!("Candidate {}", id)));
        }
        info!("Candidate {} deleted", id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Authority, EntityRef};
    use crate::repository::candidate::SORTABLE_FIELDS;
    use crate::repository::{ProfessionRepository, UserRepository};
    use futures::future::join_all;
    use std::time::Duration;

    struct Board {
        db: Database,
        locks: WriteLocks,
        first: i64,
        second: i64,
    }

    impl Board {
        fn service(&self) -> CandidateService<'_> {
            CandidateService::new(&self.db, &self.locks)
        }
    }

    async fn board() -> Board {
        board_on(Database::in_memory().await.unwrap()).await
    }

    async fn board_on(db: Database) -> Board {
        let owner = UserRepository::create(db.pool(), "acme", None, &[Authority::Employer])
            .await
            .unwrap()
            .id;
        let welder = ProfessionRepository::create(db.pool(), "Welder").await.unwrap().id;
        let first = AdvertisementRepository::insert(db.pool(), "A", "d", true, welder, owner)
            .await
            .unwrap();
        let second = AdvertisementRepository::insert(db.pool(), "B", "d", true, welder, owner)
            .await
            .unwrap();
        Board {
            db,
            locks: WriteLocks::new(),
            first,
            second,
        }
    }

    fn application(first: &str, last: &str, email: &str, advertisement: i64) -> CandidatePayload {
        CandidatePayload {
            id: None,
            first_name: Some(first.to_string()),
            last_name: Some(last.to_string()),
            email: Some(email.to_string()),
            advertisements: vec![EntityRef { id: advertisement }],
        }
    }

    async fn candidate_count(db: &Database) -> i64 {
        CandidateRepository::count(db.pool()).await.unwrap()
    }

    #[tokio::test]
    async fn test_second_application_merges_into_existing_candidate() {
        let b = board().await;
        let jane = b
            .service()
            .apply(&application("Jane", "Doe", "jane@doe.io", b.first))
            .await
            .unwrap();
        assert_eq!(jane.advertisement_ids(), vec![b.first]);

        let merged = b
            .service()
            .apply(&application("Jane", "Doe", "JANE@doe.io ", b.second))
            .await
            .unwrap();

        assert_eq!(merged.id, jane.id);
        assert_eq!(merged.email, "jane@doe.io");
        assert_eq!(merged.advertisement_ids(), vec![b.first, b.second]);
        assert_eq!(candidate_count(&b.db).await, 1);
    }

    #[tokio::test]
    async fn test_duplicate_application_is_rejected() {
        let b = board().await;
        let jane = b
            .service()
            .apply(&application("Jane", "Doe", "jane@doe.io", b.first))
            .await
            .unwrap();

        let err = b
            .service()
            .apply(&application("Jane", "Doe", "jane@doe.io", b.first))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::DuplicateApplication));

        let reloaded = b.service().find_one(jane.id).await.unwrap();
        assert_eq!(reloaded.advertisement_ids(), vec![b.first]);
    }

    #[tokio::test]
    async fn test_name_mismatch_is_an_identity_conflict() {
        let b = board().await;
        let jane = b
            .service()
            .apply(&application("Jane", "Doe", "jane@doe.io", b.first))
            .await
            .unwrap();

        let err = b
            .service()
            .apply(&application("John", "Doe", "jane@doe.io", b.second))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::IdentityConflict));

        assert_eq!(candidate_count(&b.db).await, 1);
        let applications = JobApplicationRepository::find_by_candidate(b.db.pool(), jane.id)
            .await
            .unwrap();
        assert_eq!(applications.len(), 1);
    }

    #[tokio::test]
    async fn test_application_preconditions() {
        let b = board().await;

        let mut with_id = application("Jane", "Doe", "jane@doe.io", b.first);
        with_id.id = Some(5);
        assert!(matches!(
            b.service().apply(&with_id).await,
            Err(AppError::AlreadyExists(_))
        ));

        let mut two_ads = application("Jane", "Doe", "jane@doe.io", b.first);
        two_ads.advertisements.push(EntityRef { id: b.second });
        assert!(matches!(
            b.service().apply(&two_ads).await,
            Err(AppError::InvalidRequest(_))
        ));

        assert!(matches!(
            b.service()
                .apply(&application("Jane", "Doe", "jane@doe.io", 999))
                .await,
            Err(AppError::InvalidRequest(_))
        ));
        assert_eq!(candidate_count(&b.db).await, 0);
    }

    #[tokio::test]
    async fn test_concurrent_first_applications_share_one_record() {
        let b = board().await;
        let service = b.service();
        let to_first = application("Jane", "Doe", "jane@doe.io", b.first);
        let to_second = application("Jane", "Doe", "jane@doe.io", b.second);

        let (left, right) = tokio::join!(service.apply(&to_first), service.apply(&to_second));
        let (left, right) = (left.unwrap(), right.unwrap());

        assert_eq!(left.id, right.id);
        assert_eq!(candidate_count(&b.db).await, 1);
        let reloaded = service.find_one(left.id).await.unwrap();
        assert_eq!(reloaded.advertisement_ids(), vec![b.first, b.second]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_distinct_applicants_on_a_file_database() {
        let dir = tempfile::tempdir().unwrap();
        let b = board_on(Database::new(&dir.path().join("board.db")).await.unwrap()).await;
        let service = b.service();

        let applications: Vec<_> = (0..40)
            .map(|i| application("Jane", "Doe", &format!("jane{}@doe.io", i), b.first))
            .collect();
        let results = join_all(applications.iter().map(|a| service.apply(a))).await;

        for result in results {
            result.unwrap();
        }
        assert_eq!(candidate_count(&b.db).await, 40);
    }

    #[tokio::test]
    async fn test_update_waits_for_the_outgoing_email() {
        let b = board().await;
        let service = b.service();
        let jane = service
            .apply(&application("Jane", "Doe", "jane@doe.io", b.first))
            .await
            .unwrap();
        let mut rekey = application("Jane", "Doe", "janet@doe.io", b.first);
        rekey.id = Some(jane.id);

        let guard = b.locks.emails.lock("jane@doe.io".to_string()).await;
        let blocked = tokio::time::timeout(Duration::from_millis(100), service.update(&rekey)).await;
        assert!(blocked.is_err());
        drop(guard);

        let updated = service.update(&rekey).await.unwrap();
        assert_eq!(updated.email, "janet@doe.io");

        // the old address is free again and starts a new record
        let newcomer = service
            .apply(&application("Jane", "Doe", "jane@doe.io", b.second))
            .await
            .unwrap();
        assert_ne!(newcomer.id, jane.id);
        assert_eq!(candidate_count(&b.db).await, 2);
    }

    #[tokio::test]
    async fn test_update_replaces_fields_and_associations() {
        let b = board().await;
        let jane = b
            .service()
            .apply(&application("Jane", "Doe", "jane@doe.io", b.first))
            .await
            .unwrap();
        let john = b
            .service()
            .apply(&application("John", "Roe", "john@roe.io", b.first))
            .await
            .unwrap();

        let mut replace = application("Janet", "Doe", "janet@doe.io", b.second);
        replace.id = Some(jane.id);
        let updated = b.service().update(&replace).await.unwrap();
        assert_eq!(updated.first_name, "Janet");
        assert_eq!(updated.email, "janet@doe.io");
        assert_eq!(updated.advertisement_ids(), vec![b.second]);

        let mut steal = application("Janet", "Doe", "JOHN@roe.io", b.second);
        steal.id = Some(jane.id);
        assert!(matches!(
            b.service().update(&steal).await,
            Err(AppError::IdentityConflict)
        ));

        let mut missing = application("X", "Y", "x@y.io", b.first);
        missing.id = Some(john.id + 100);
        assert!(matches!(
            b.service().update(&missing).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_listing_and_report() {
        let b = board().await;
        b.service()
            .apply(&application("Jane", "Doe", "jane@doe.io", b.first))
            .await
            .unwrap();
        b.service()
            .apply(&application("Jane", "Doe", "jane@doe.io", b.second))
            .await
            .unwrap();
        b.service()
            .apply(&application("John", "Roe", "john@roe.io", b.second))
            .await
            .unwrap();

        let page = PageQuery::new(0, 10, Some("firstName,desc"), SORTABLE_FIELDS);
        let lazy = b.service().find_page(&page, false).await.unwrap();
        assert_eq!(lazy.total, 2);
        assert_eq!(lazy.items[0].first_name, "John");
        assert!(lazy.items[0].advertisements.is_none());

        let eager = b.service().find_page(&page, true).await.unwrap();
        assert_eq!(eager.items[1].advertisement_ids(), vec![b.first, b.second]);

        // three application rows under one profession
        let report = b.service().count_by_profession().await.unwrap();
        assert_eq!(report.len(), 1);
        assert_eq!(report[0].candidates_count, 3);

        b.service().delete(eager.items[0].id).await.unwrap();
        assert!(matches!(
            b.service().delete(eager.items[0].id).await,
            Err(AppError::NotFound(_))
        ));
    }
}
