use crate::schema::Enumerated;
use crate::{ConfigDocument, ConfigError};
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

pub const MIN_SECRET_LENGTH: usize = 8;
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_STATS_INTERVAL: u64 = 1800;
pub const DEFAULT_INVITES_INTERVAL: u64 = 1800;
pub const DEFAULT_DISCORD_USERNAME: &str = "Zipline";
pub const DEFAULT_DISCORD_AVATAR_URL: &str = "https://raw.githubusercontent.com/diced/zipline/9b60147e112ec5b70170500b85c75ea621f41d03/public/zipline.png";

const REDACTED: &str = "********";

/// The fully-typed, fully-defaulted configuration.
///
/// Only [`crate::validate`] constructs one; once built it is read-only and
/// can be shared freely between the subsystems that consume it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidatedConfig {
    pub core: CoreConfig,
    pub datasource: Datasource,
    pub uploader: UploaderConfig,
    pub urls: UrlsConfig,
    pub ratelimit: RatelimitConfig,
    pub website: WebsiteConfig,
    pub discord: Option<DiscordConfig>,
    pub oauth: Option<OauthConfig>,
    pub features: FeaturesConfig,
}

impl ValidatedConfig {
    /// Converts back into the document shape accepted by [`crate::validate`].
    pub fn to_document(&self) -> Result<ConfigDocument, ConfigError> {
        serde_yaml::to_value(self)
            .map(ConfigDocument::from)
            .map_err(|e| ConfigError::Serialize(e.to_string()))
    }

    /// A copy with every credential replaced, for display.
    #[must_use]
    pub fn redacted(&self) -> Self {
        let mut config = self.clone();
        config.core.secret = REDACTED.to_string();
        match &mut config.datasource {
            Datasource::Local(_) => {}
            Datasource::S3(s3) => s3.secret_access_key = REDACTED.to_string(),
            Datasource::Swift(swift) => swift.password = REDACTED.to_string(),
        }
        if let Some(oauth) = &mut config.oauth {
            for secret in [&mut oauth.github_client_secret, &mut oauth.discord_client_secret]
                .into_iter()
                .flatten()
            {
                *secret = REDACTED.to_string();
            }
        }
        config
    }
}

/// Output of the normalizer, before backend requirements are checked.
#[derive(Debug, Clone, PartialEq)]
pub struct DraftConfig {
    pub core: CoreConfig,
    pub datasource: DatasourceDraft,
    pub uploader: UploaderConfig,
    pub urls: UrlsConfig,
    pub ratelimit: RatelimitConfig,
    pub website: WebsiteConfig,
    pub discord: Option<DiscordConfig>,
    pub oauth: Option<OauthConfig>,
    pub features: FeaturesConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CoreConfig {
    pub https: bool,
    pub secret: String,
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub logger: bool,
    pub stats_interval: u64,
    pub invites_interval: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DatasourceKind {
    #[default]
    Local,
    S3,
    Swift,
}

impl DatasourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::S3 => "s3",
            Self::Swift => "swift",
        }
    }
}

impl Enumerated for DatasourceKind {
    const NAMES: &'static [&'static str] = &["local", "s3", "swift"];

    fn from_name(name: &str) -> Option<Self> {
        match name {
            "local" => Some(Self::Local),
            "s3" => Some(Self::S3),
            "swift" => Some(Self::Swift),
            _ => None,
        }
    }
}

/// All three backend sub-objects, only one of which is selected by `kind`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DatasourceDraft {
    pub kind: DatasourceKind,
    pub local: LocalDatasource,
    pub s3: S3Draft,
    pub swift: SwiftDraft,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct S3Draft {
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,
    pub endpoint: Option<String>,
    pub port: Option<u16>,
    pub bucket: Option<String>,
    pub force_s3_path: bool,
    pub region: String,
    pub use_ssl: bool,
}

impl Default for S3Draft {
    fn default() -> Self {
        Self {
            access_key_id: None,
            secret_access_key: None,
            endpoint: None,
            port: None,
            bucket: None,
            force_s3_path: false,
            region: "us-east-1".to_string(),
            use_ssl: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwiftDraft {
    pub username: Option<String>,
    pub password: Option<String>,
    pub auth_endpoint: Option<String>,
    pub container: Option<String>,
    pub project_id: Option<String>,
    pub domain_id: String,
    pub region_id: Option<String>,
}

impl Default for SwiftDraft {
    fn default() -> Self {
        Self {
            username: None,
            password: None,
            auth_endpoint: None,
            container: None,
            project_id: None,
            domain_id: "default".to_string(),
            region_id: None,
        }
    }
}

/// The storage backend selected by `datasource.type`.
///
/// Serializes as `{type: <kind>, <kind>: {..}}`, the shape the normalizer reads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Datasource {
    Local(LocalDatasource),
    S3(S3Datasource),
    Swift(SwiftDatasource),
}

impl Datasource {
    pub fn kind(&self) -> DatasourceKind {
        match self {
            Self::Local(_) => DatasourceKind::Local,
            Self::S3(_) => DatasourceKind::S3,
            Self::Swift(_) => DatasourceKind::Swift,
        }
    }
}

impl Serialize for Datasource {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(2))?;
        map.serialize_entry("type", &self.kind())?;
        match self {
            Self::Local(local) => map.serialize_entry("local", local)?,
            Self::S3(s3) => map.serialize_entry("s3", s3)?,
            Self::Swift(swift) => map.serialize_entry("swift", swift)?,
        }
        map.end()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LocalDatasource {
    pub directory: String,
}

impl Default for LocalDatasource {
    fn default() -> Self {
        Self {
            directory: "./uploads".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct S3Datasource {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub endpoint: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    pub bucket: String,
    pub force_s3_path: bool,
    pub region: String,
    pub use_ssl: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SwiftDatasource {
    pub username: String,
    pub password: String,
    pub auth_endpoint: String,
    pub container: String,
    pub project_id: String,
    pub domain_id: String,
    pub region_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploaderConfig {
    pub route: String,
    pub embed_route: String,
    pub length: usize,
    pub admin_limit: u64,
    pub user_limit: u64,
    pub disabled_extensions: Vec<String>,
    pub format_date: String,
}

impl Default for UploaderConfig {
    fn default() -> Self {
        Self {
            route: "/u".to_string(),
            embed_route: "/a".to_string(),
            length: 6,
            admin_limit: 104_900_000,
            user_limit: 104_900_000,
            disabled_extensions: Vec::new(),
            format_date: "YYYY-MM-DD_HH:mm:ss".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UrlsConfig {
    pub route: String,
    pub length: usize,
}

impl Default for UrlsConfig {
    fn default() -> Self {
        Self {
            route: "/go".to_string(),
            length: 6,
        }
    }
}

/// Requests per window; `0` disables the limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct RatelimitConfig {
    pub user: u32,
    pub admin: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WebsiteConfig {
    pub title: String,
    pub show_files_per_user: bool,
    pub show_version: bool,
    pub disable_media_preview: bool,
    pub external_links: Vec<ExternalLink>,
}

impl Default for WebsiteConfig {
    fn default() -> Self {
        Self {
            title: "Zipline".to_string(),
            show_files_per_user: true,
            show_version: true,
            disable_media_preview: false,
            external_links: vec![
                ExternalLink {
                    label: "Zipline".to_string(),
                    link: "https://github.com/diced/zipline".to_string(),
                },
                ExternalLink {
                    label: "Documentation".to_string(),
                    link: "https://zipline.diced.tech/".to_string(),
                },
            ],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExternalLink {
    pub label: String,
    pub link: String,
}

/// Webhook notifications. Present only when the operator configures it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiscordConfig {
    pub url: String,
    pub username: String,
    pub avatar_url: String,
    pub upload: Option<DiscordContent>,
    pub shorten: Option<DiscordContent>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct DiscordContent {
    pub content: Option<String>,
    pub embed: Option<DiscordEmbed>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiscordEmbed {
    pub title: Option<String>,
    pub description: Option<String>,
    pub footer: Option<String>,
    /// Always finite.
    pub color: Option<f64>,
    pub thumbnail: bool,
    pub image: bool,
    pub timestamp: bool,
}

impl Default for DiscordEmbed {
    fn default() -> Self {
        Self {
            title: None,
            description: None,
            footer: None,
            color: None,
            thumbnail: false,
            image: true,
            timestamp: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct OauthConfig {
    pub github_client_id: Option<String>,
    pub github_client_secret: Option<String>,
    pub discord_client_id: Option<String>,
    pub discord_client_secret: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FeaturesConfig {
    pub invites: bool,
    pub oauth_registration: bool,
}

impl Default for FeaturesConfig {
    fn default() -> Self {
        Self {
            invites: true,
            oauth_registration: false,
        }
    }
}
