pub mod advertisement_handlers;
pub mod candidate_handlers;
pub mod profession_handlers;
pub mod system_handlers;

pub use advertisement_handlers::*;
pub use candidate_handlers::*;
pub use profession_handlers::*;
pub use system_handlers::*;
