// src/models/mod.rs
pub mod advertisement;
pub mod candidate;
pub mod profession;
pub mod report;
pub mod user;

pub use advertisement::{Advertisement, AdvertisementDraft, AdvertisementPayload, AdvertisementRow};
pub use candidate::{Candidate, CandidateDraft, CandidatePayload, CandidateRow, JobApplication};
pub use profession::{Profession, ProfessionPayload};
pub use report::{AdvertisementsByProfession, CandidatesByProfession};
pub use user::{Authority, User, UserSummary};

use serde::{Deserialize, Serialize};

/// Reference to another entity by id; extra fields are ignored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityRef {
    pub id: i64,
}
