// ── Site domain type ──

use serde::ser::{Serialize, SerializeStruct, Serializer};

/// How a proxy conf is mounted by SWAG.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, strum::Display)]
pub enum SiteType {
    Subdomain,
    Subfolder,
}

impl SiteType {
    /// Suffix of an active conf of this type.
    pub fn enabled_suffix(self) -> &'static str {
        match self {
            Self::Subdomain => ".subdomain.conf",
            Self::Subfolder => ".subfolder.conf",
        }
    }

    /// Suffix of a parked conf of this type.
    pub fn disabled_suffix(self) -> &'static str {
        match self {
            Self::Subdomain => ".subdomain.conf.disabled",
            Self::Subfolder => ".subfolder.conf.disabled",
        }
    }

    pub fn suffix(self, status: SiteStatus) -> &'static str {
        match status {
            SiteStatus::Enabled => self.enabled_suffix(),
            SiteStatus::Disabled => self.disabled_suffix(),
        }
    }
}

/// Whether nginx picks the conf up. Encoded only by the filename suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, strum::Display)]
pub enum SiteStatus {
    Enabled,
    Disabled,
}

impl SiteStatus {
    pub fn from_filename(filename: &str) -> Self {
        if filename.ends_with(".disabled") {
            Self::Disabled
        } else {
            Self::Enabled
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Self::Enabled => Self::Disabled,
            Self::Disabled => Self::Enabled,
        }
    }
}

/// What a site forwards to, inferred from its directives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, strum::Display)]
pub enum TargetType {
    Container,
    #[serde(rename = "IP")]
    #[strum(serialize = "IP")]
    Ip,
    Static,
    Other,
}

/// Destination reported for sites with neither an upstream nor a root.
pub const UNKNOWN_DESTINATION: &str = "Unknown";

const RECOGNIZED: [(SiteType, SiteStatus); 4] = [
    (SiteType::Subdomain, SiteStatus::Disabled),
    (SiteType::Subdomain, SiteStatus::Enabled),
    (SiteType::Subfolder, SiteStatus::Disabled),
    (SiteType::Subfolder, SiteStatus::Enabled),
];

/// One reverse-proxy definition backed by a single file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteRecord {
    /// Logical subdomain / subfolder name (filename minus suffix).
    pub name: String,
    pub site_type: SiteType,
    /// On-disk filename; the single source of the site's status.
    pub filename: String,
    pub target_type: TargetType,
    /// Container name, IP, static root, or [`UNKNOWN_DESTINATION`].
    pub target_dest: String,
    pub port: Option<String>,
}

impl SiteRecord {
    /// Classify a filename by exact suffix. Returns `None` for anything that
    /// is not a recognized proxy conf, including a bare suffix with no name.
    pub fn from_filename(filename: &str) -> Option<Self> {
        RECOGNIZED.iter().find_map(|&(site_type, status)| {
            let name = filename.strip_suffix(site_type.suffix(status))?;
            if name.is_empty() {
                return None;
            }
            Some(Self {
                name: name.to_owned(),
                site_type,
                filename: filename.to_owned(),
                target_type: TargetType::Other,
                target_dest: UNKNOWN_DESTINATION.to_owned(),
                port: None,
            })
        })
    }

    pub fn status(&self) -> SiteStatus {
        SiteStatus::from_filename(&self.filename)
    }

    /// Filename this site would have after flipping its status.
    pub fn toggled_filename(&self) -> String {
        format!(
            "{}{}",
            self.name,
            self.site_type.suffix(self.status().toggled())
        )
    }
}

impl Serialize for SiteRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("SiteRecord", 7)?;
        s.serialize_field("name", &self.name)?;
        s.serialize_field("type", &self.site_type)?;
        s.serialize_field("filename", &self.filename)?;
        s.serialize_field("status", &self.status())?;
        s.serialize_field("target_type", &self.target_type)?;
        s.serialize_field("target_dest", &self.target_dest)?;
        s.serialize_field("port", &self.port)?;
        s.end()
    }
}
