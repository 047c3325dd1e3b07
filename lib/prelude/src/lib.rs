use std::fmt;
use std::str::FromStr;

mod lenient;

/// The file a template was extracted from, kept so it can be downloaded again.
#[derive(Clone, Debug, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OriginalFile {
    pub name: String,
    /// Binary content, base64 encoded.
    pub data: String,
    pub mime_type: String,
}

#[derive(Clone, Debug, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    /// Empty when the entry was written without one.
    #[serde(default, deserialize_with = "lenient::text")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub category: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub description: String,
    /// Text with `{{NAME}}` markers.
    #[serde(default, deserialize_with = "lenient::text")]
    pub structure: String,
    /// Informational, not required to match the markers found in `structure`.
    #[serde(default, deserialize_with = "lenient::text_list")]
    pub placeholders: Vec<String>,
    /// Milliseconds since the unix epoch.
    #[serde(default, deserialize_with = "lenient::timestamp")]
    pub created_at: i64,
    #[serde(
        default,
        deserialize_with = "lenient::or_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub original_file: Option<OriginalFile>,
}

/// Structure extracted from a sample document, before it becomes a template.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
pub struct Analysis {
    pub name: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub description: String,
    pub structure: String,
    #[serde(default)]
    pub placeholders: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InvalidRevision(pub String);

impl fmt::Display for InvalidRevision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid revision {:?}, expected major.minor.patch", self.0)
    }
}

impl std::error::Error for InvalidRevision {}

/// Edit generation of the template library, formatted as `major.minor.patch`.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Deserialize, serde::Serialize,
)]
#[serde(try_from = "String", into = "String")]
pub struct Revision {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
}

impl Revision {
    pub const INITIAL: Revision = Revision::new(1, 0, 0);
    pub const RECOVERY: Revision = Revision::new(1, 0, 1);

    pub const fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Digit rollover: patch and minor carry over past 9, major is unbounded.
    /// The largest representable revision is its own successor.
    pub fn next(&self) -> Self {
        if self.patch < 9 {
            Self::new(self.major, self.minor, self.patch + 1)
        } else if self.minor < 9 {
            Self::new(self.major, self.minor + 1, 0)
        } else {
            match self.major.checked_add(1) {
                Some(major) => Self::new(major, 0, 0),
                None => *self,
            }
        }
    }
}

impl Default for Revision {
    fn default() -> Self {
        Self::INITIAL
    }
}

impl fmt::Display for Revision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

impl FromStr for Revision {
    type Err = InvalidRevision;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let invalid = || InvalidRevision(value.to_string());
        let mut parts = value.trim().split('.').map(|part| part.parse::<u64>());
        match (parts.next(), parts.next(), parts.next(), parts.next()) {
            (Some(Ok(major)), Some(Ok(minor)), Some(Ok(patch)), None) => {
                Ok(Self::new(major, minor, patch))
            }
            _ => Err(invalid()),
        }
    }
}

impl TryFrom<String> for Revision {
    type Error = InvalidRevision;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Revision> for String {
    fn from(value: Revision) -> Self {
        value.to_string()
    }
}

/// Where the library is mirrored remotely. An empty endpoint disables the sync.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CloudConfig {
    #[serde(default)]
    pub endpoint: String,
    #[serde(default)]
    pub api_key: String,
}

impl CloudConfig {
    pub fn is_enabled(&self) -> bool {
        !self.endpoint.trim().is_empty()
    }

    pub fn api_key(&self) -> Option<&str> {
        let key = self.api_key.trim();
        (!key.is_empty()).then_some(key)
    }
}

/// What is pushed to the remote store, before compression.
#[derive(Clone, Debug, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CloudData {
    pub version: Revision,
    pub templates: Vec<Template>,
    pub last_updated: i64,
}

/// What a fetch returns once the response is normalized. Every field is
/// optional because legacy payloads are accepted as they are.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteSnapshot {
    #[serde(default, deserialize_with = "lenient::optional_text")]
    pub version: Option<String>,
    /// Entries that are not objects are dropped.
    #[serde(default, deserialize_with = "lenient::optional_list")]
    pub templates: Option<Vec<Template>>,
    #[serde(default, deserialize_with = "lenient::optional_timestamp")]
    pub last_updated: Option<i64>,
}

impl From<CloudData> for RemoteSnapshot {
    fn from(value: CloudData) -> Self {
        Self {
            version: Some(value.version.to_string()),
            templates: Some(value.templates),
            last_updated: Some(value.last_updated),
        }
    }
}

/// Body of every write to the remote store.
#[derive(Clone, Debug, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompressedPayload {
    pub compressed: bool,
    pub data: String,
    /// ISO-8601
    pub updated_at: String,
}

/// Portable backup file.
#[derive(Clone, Debug, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Backup {
    pub version: Revision,
    pub templates: Vec<Template>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exported_at: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub imported_at: Option<i64>,
}
