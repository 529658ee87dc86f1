// src/service/advertisement.rs
//! Advertisement writes, including the activation cap

use tracing::{info, warn};

use super::{Paged, MAX_ACTIVE_ADVERTISEMENTS};
use crate::core::{Database, WriteLocks};
use crate::error::{AppError, Result};
use crate::models::{
    Advertisement, AdvertisementDraft, AdvertisementPayload, AdvertisementsByProfession, User,
};
use crate::repository::{
    AdvertisementFilter, AdvertisementRepository, PageQuery, ProfessionRepository, UserRepository,
};

pub struct AdvertisementService<'a> {
    db: &'a Database,
    locks: &'a WriteLocks,
}

impl<'a> AdvertisementService<'a> {
    pub fn new(db: &'a Database, locks: &'a WriteLocks) -> Self {
        Self { db, locks }
    }

    /// Create an advertisement. Creating it active counts against the
    /// owner's cap like any other activation.
    pub async fn create(&self, actor: &User, payload: &AdvertisementPayload) -> Result<Advertisement> {
        if payload.id.is_some() {
            return Err(AppError::AlreadyExists(
                "A new advertisement cannot already have an ID".to_string(),
            ));
        }
        let draft = payload.validate()?;
        let owner_id = self.resolve_owner(actor, &draft, actor.id).await?;
        self.ensure_profession_exists(draft.profession_id).await?;

        let _owner_guard = self.locks.owners.lock(owner_id).await;
        let mut tx = self.db.begin_write().await?;

        if draft.active {
            check_quota(&mut tx, owner_id).await?;
        }

        let id = AdvertisementRepository::insert(
            &mut *tx,
            &draft.title,
            &draft.description,
            draft.active,
            draft.profession_id,
            owner_id,
        )
        .await?;
        let created = AdvertisementRepository::find_by_id(&mut *tx, id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Advertisement {}", id)))?;
        tx.commit().await?;

        info!(
            "User {} created advertisement {} (owner: {}, active: {})",
            actor.login, created.id, created.user.login, created.active
        );
        Ok(created)
    }

    /// Full-replace update guarded by the activation cap: only a transition
    /// into active for the resulting owner triggers the count.
    pub async fn update(&self, actor: &User, payload: &AdvertisementPayload) -> Result<Advertisement> {
        let id = payload
            .id
            .ok_or_else(|| AppError::invalid("missing id"))?;
        let draft = payload.validate()?;

        let stored = AdvertisementRepository::find_by_id(self.db.pool(), id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Advertisement {}", id)))?;
        ensure_can_manage(actor, &stored)?;
        let owner_id = self.resolve_owner(actor, &draft, stored.user.id).await?;
        self.ensure_profession_exists(draft.profession_id).await?;

        let _owner_guard = self.locks.owners.lock(owner_id).await;
        let mut tx = self.db.begin_write().await?;

        // The owner may have changed while we waited for the lock.
        let stored = AdvertisementRepository::find_by_id(&mut *tx, id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Advertisement {}", id)))?;
        ensure_can_manage(actor, &stored)?;
        if draft.requested_owner.is_none() && stored.user.id != owner_id {
            return Err(AppError::invalid(format!(
                "Advertisement {} changed owner, reload it and retry",
                id
            )));
        }

        let already_active_for_owner = stored.active && stored.user.id == owner_id;
        if draft.active && !already_active_for_owner {
            check_quota(&mut tx, owner_id).await?;
        }

        AdvertisementRepository::update(
            &mut *tx,
            id,
            &draft.title,
            &draft.description,
            draft.active,
            draft.profession_id,
            owner_id,
        )
        .await?;
        let updated = AdvertisementRepository::find_by_id(&mut *tx, id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Advertisement {}", id)))?;
        tx.commit().await?;

        info!(
            "User {} updated advertisement {} (active: {} -> {})",
            actor.login, id, stored.active, updated.active
        );
        Ok(updated)
    }

    pub async fn find_one(&self, id: i64) -> Result<Advertisement> {
        AdvertisementRepository::find_by_id(self.db.pool(), id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Advertisement {}", id)))
    }

    /// Page of advertisements. Employers only ever see their own; admins see
    /// everything unless `mine` is set.
    pub async fn find_page(&self, actor: &User, mine: bool, page: &PageQuery) -> Result<Paged<Advertisement>> {
        let filter = AdvertisementFilter {
            owner_id: (mine || !actor.is_admin()).then_some(actor.id),
            active_only: false,
        };
        let items = AdvertisementRepository::find_page(self.db.pool(), filter, page).await?;
        let total = AdvertisementRepository::count(self.db.pool(), filter).await?;
        Ok(Paged { items, total })
    }

    pub async fn find_active(&self) -> Result<Vec<Advertisement>> {
        Ok(AdvertisementRepository::find_active(self.db.pool()).await?)
    }

    pub async fn count_active_for(&self, user: &User) -> Result<i64> {
        Ok(AdvertisementRepository::count_active_by_owner(self.db.pool(), user.id).await?)
    }

    /// Counts per profession. `mine` restricts to the actor's advertisements
    /// and needs an actor.
    pub async fn count_by_profession(
        &self,
        actor: Option<&User>,
        active_only: bool,
        mine: bool,
    ) -> Result<Vec<AdvertisementsByProfession>> {
        let owner_id = match (mine, actor) {
            (false, _) => None,
            (true, Some(user)) => Some(user.id),
            (true, None) => {
                return Err(AppError::Forbidden(
                    "Authentication is required to filter by the current user".to_string(),
                ))
            }
        };
        Ok(AdvertisementRepository::count_by_profession(
            self.db.pool(),
            AdvertisementFilter {
                owner_id,
                active_only,
            },
        )
        .await?)
    }

    pub async fn delete(&self, actor: &User, id: i64) -> Result<()> {
        let stored = self.find_one(id).await?;
        ensure_can_manage(actor, &stored)?;
        AdvertisementRepository::delete(self.db.pool(), id).await?;
        info!("User {} deleted advertisement {}", actor.login, id);
        Ok(())
    }

    /// Employers always own what they write; admins may name another owner
    async fn resolve_owner(&self, actor: &User, draft: &AdvertisementDraft, fallback: i64) -> Result<i64> {
        if !actor.is_admin() {
            if let Some(requested) = draft.requested_owner {
                if requested != actor.id {
                    return Err(AppError::Forbidden(
                        "Advertisements can only be assigned to yourself".to_string(),
                    ));
                }
            }
            return Ok(actor.id);
        }

        let owner_id = draft.requested_owner.unwrap_or(fallback);
        match UserRepository::find_by_id(self.db.pool(), owner_id).await? {
            Some(_) => Ok(owner_id),
            None => Err(AppError::invalid(format!("unknown user {}", owner_id))),
        }
    }

    async fn ensure_profession_exists(&self, profession_id: i64) -> Result<()> {
        match ProfessionRepository::find_by_id(self.db.pool(), profession_id).await? {
            Some(_) => Ok(()),
            None => Err(AppError::invalid(format!(
                "unknown profession {}",
                profession_id
            ))),
        }
    }
}

async fn check_quota(tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>, owner_id: i64) -> Result<()> {
    let active = AdvertisementRepository::count_active_by_owner(&mut **tx, owner_id).await?;
    if active >= MAX_ACTIVE_ADVERTISEMENTS {
        warn!(
            "User {} already has {} active advertisements, activation rejected",
            owner_id, active
        );
        return Err(AppError::QuotaExceeded);
    }
    Ok(())
}

fn ensure_can_manage(actor: &User, advertisement: &Advertisement) -> Result<()> {
    if actor.is_admin() || advertisement.user.id == actor.id {
        Ok(())
    } else {
        Err(AppError::Forbidden(format!(
            "Advertisement {} belongs to another user",
            advertisement.id
        )))
    }
}
