// ── Domain model ──
//
// Transient records derived from the filesystem on every read. Nothing here
// is cached; status in particular is a pure function of the filename.

pub mod common;
pub mod site;

pub use common::Protocol;
pub use site::{SiteRecord, SiteStatus, SiteType, TargetType};
