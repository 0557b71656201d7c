// ── Fixed directive sets ──
//
// The proxied and static shapes of a `location /` body. The generator's
// template and the default-site editor both render from here so the two stay
// textually identical.

use crate::model::Protocol;

pub const PROXY_INCLUDE: &str = "include /config/nginx/proxy.conf;";
pub const RESOLVER_INCLUDE: &str = "include /config/nginx/resolver.conf;";
pub const PROXY_PASS: &str = "proxy_pass $upstream_proto://$upstream_app:$upstream_port;";
pub const STATIC_TRY_FILES: &str = "try_files $uri $uri/ /index.html /index.php?$args =404;";

/// Prefixes of every directive belonging to either shape. Matched against
/// the trimmed line, so both shapes are stripped regardless of which one the
/// caller is about to insert.
const SHAPE_PREFIXES: [&str; 7] = [
    "try_files ",
    PROXY_INCLUDE,
    RESOLVER_INCLUDE,
    "set $upstream_app ",
    "set $upstream_port ",
    "set $upstream_proto ",
    "proxy_pass ",
];

/// Backend a location proxies to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upstream {
    pub app: String,
    pub port: u16,
    pub proto: Protocol,
}

impl Upstream {
    /// The six proxied-shape directives, unindented.
    pub fn directives(&self) -> [String; 6] {
        [
            PROXY_INCLUDE.to_owned(),
            RESOLVER_INCLUDE.to_owned(),
            format!("set $upstream_app {};", self.app),
            format!("set $upstream_port {};", self.port),
            format!("set $upstream_proto {};", self.proto),
            PROXY_PASS.to_owned(),
        ]
    }
}

/// Body shape of the root location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocationShape {
    /// Serve files from the document root.
    Static,
    /// Forward everything to an upstream.
    Proxied(Upstream),
}

impl LocationShape {
    pub fn directives(&self) -> Vec<String> {
        match self {
            Self::Static => vec![STATIC_TRY_FILES.to_owned()],
            Self::Proxied(upstream) => upstream.directives().into(),
        }
    }
}

/// Whether `line` is a live directive of either location shape.
pub fn is_shape_directive(line: &str) -> bool {
    let s = line.trim();
    if s.is_empty() || s.starts_with('#') {
        return false;
    }
    SHAPE_PREFIXES.iter().any(|prefix| s.starts_with(prefix))
}
