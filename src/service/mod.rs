// src/service/mod.rs
//! Business rules on top of the repositories. Services borrow the shared
//! database and write locks for the duration of one request.

pub mod advertisement;
pub mod candidate;
pub mod profession;

pub use advertisement::AdvertisementService;
pub use candidate::CandidateService;
pub use profession::{ImportSummary, ProfessionService};

/// Most advertisements a single user may have active at once
pub const MAX_ACTIVE_ADVERTISEMENTS: i64 = 10;

/// A page of results plus the unpaged total
#[derive(Debug, Clone)]
pub struct Paged<T> {
    pub items: Vec<T>,
    pub total: i64,
}
