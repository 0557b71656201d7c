//! Engine for managing SWAG reverse-proxy nginx configuration.
//!
//! - **[`SiteRegistry`]** lists, toggles and deletes `*.subdomain.conf` /
//!   `*.subfolder.conf` files in a proxy-confs directory, classifying each by
//!   its upstream target.
//! - **[`ConfigGenerator`]** writes new subdomain confs from the standard
//!   proxy template and never overwrites an existing file.
//! - **[`DefaultSiteEditor`]** rewrites the root `location /` of
//!   `site-confs/default` to proxy the bare domain to a container, or back to
//!   static serving. Edits are backed up and replaced atomically.
//!
//! The editor works on lines and brace depth, not a full nginx grammar:
//! only the located blocks are interpreted and every other byte round-trips.

pub mod atomic;
pub mod error;
pub mod model;
pub mod nginx;

// ── Primary re-exports ──────────────────────────────────────────────
pub use error::{CoreError, Result};
pub use model::{Protocol, SiteRecord, SiteStatus, SiteType, TargetType};
pub use nginx::{
    Block, ConfigGenerator, DefaultSiteEditor, EditResult, HomepageConfig, LocationShape,
    ProxySite, SiteRegistry, Upstream, find_blocks, find_blocks_in_range,
};
