//! Line-oriented nginx config handling: block location, the default-site
//! editor, the proxy-conf generator, and the site registry.

pub mod block;
pub mod default_site;
pub mod directive;
pub mod document;
pub mod generator;
pub mod registry;

pub use block::{Block, brace_delta, find_blocks, find_blocks_in_range};
pub use default_site::{
    DefaultSiteEditor, EditResult, HomepageConfig, SERVER_NAME_PLACEHOLDER, rewrite,
};
pub use directive::{LocationShape, Upstream};
pub use document::Document;
pub use generator::{ConfigGenerator, ProxySite};
pub use registry::{SiteRegistry, classify_upstream};
