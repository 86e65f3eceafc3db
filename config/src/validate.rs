//! Cross-Field Validator and the validation entry points.

use crate::error::{RequiredFieldErrors, ValidationError};
use crate::normalize::normalize;
use crate::types::{
    Datasource, DatasourceDraft, DatasourceKind, DraftConfig, S3Datasource, SwiftDatasource,
    ValidatedConfig,
};
use crate::ConfigDocument;

/// Environment flag that turns every validation failure into `Ok(None)`.
pub const DOCKER_BUILD_ENV: &str = "ZIPLINE_DOCKER_BUILD";

/// Whether validation failures are reported or suppressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BuildMode {
    #[default]
    Runtime,
    /// Image build without real secrets. Never use for a running service.
    DockerBuild,
}

impl BuildMode {
    /// Reads [`DOCKER_BUILD_ENV`].
    pub fn from_env() -> Self {
        Self::from_flag(std::env::var(DOCKER_BUILD_ENV).ok().as_deref())
    }

    /// Any non-empty value except `0` and `false` enables build mode.
    pub fn from_flag(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some(v) if !v.is_empty() && v != "0" && !v.eq_ignore_ascii_case("false") => {
                Self::DockerBuild
            }
            _ => Self::Runtime,
        }
    }
}

/// Normalizes `document`, then checks the fields the selected backend needs.
pub fn validate(document: &ConfigDocument) -> Result<ValidatedConfig, ValidationError> {
    let draft = normalize(document)?;
    Ok(check_required(draft)?)
}

/// Like [`validate`], but in [`BuildMode::DockerBuild`] any failure yields
/// `Ok(None)` instead of an error.
pub fn validate_with_mode(
    document: &ConfigDocument,
    mode: BuildMode,
) -> Result<Option<ValidatedConfig>, ValidationError> {
    match validate(document) {
        Ok(config) => Ok(Some(config)),
        Err(_) if mode == BuildMode::DockerBuild => Ok(None),
        Err(e) => Err(e),
    }
}

/// Collects every missing backend field before failing.
pub fn check_required(draft: DraftConfig) -> Result<ValidatedConfig, RequiredFieldErrors> {
    Ok(ValidatedConfig {
        datasource: resolve_datasource(draft.datasource)?,
        core: draft.core,
        uploader: draft.uploader,
        urls: draft.urls,
        ratelimit: draft.ratelimit,
        website: draft.website,
        discord: draft.discord,
        oauth: draft.oauth,
        features: draft.features,
    })
}

fn resolve_datasource(draft: DatasourceDraft) -> Result<Datasource, RequiredFieldErrors> {
    match draft.kind {
        DatasourceKind::Local => Ok(Datasource::Local(draft.local)),
        DatasourceKind::S3 => {
            let s3 = draft.s3;
            let mut required = Required::new("datasource.s3");
            let access_key_id = required.take("access_key_id", s3.access_key_id);
            let secret_access_key = required.take("secret_access_key", s3.secret_access_key);
            let bucket = required.take("bucket", s3.bucket);
            let endpoint = required.take("endpoint", s3.endpoint);
            required.finish()?;

            Ok(Datasource::S3(S3Datasource {
                access_key_id,
                secret_access_key,
                endpoint,
                port: s3.port,
                bucket,
                force_s3_path: s3.force_s3_path,
                region: s3.region,
                use_ssl: s3.use_ssl,
            }))
        }
        DatasourceKind::Swift => {
            let swift = draft.swift;
            let mut required = Required::new("datasource.swift");
            let container = required.take("container", swift.container);
            let project_id = required.take("project_id", swift.project_id);
            let auth_endpoint = required.take("auth_endpoint", swift.auth_endpoint);
            let password = required.take("password", swift.password);
            let username = required.take("username", swift.username);
            required.finish()?;

            Ok(Datasource::Swift(SwiftDatasource {
                username,
                password,
                auth_endpoint,
                container,
                project_id,
                domain_id: swift.domain_id,
                region_id: swift.region_id,
            }))
        }
    }
}

struct Required {
    prefix: &'static str,
    missing: Vec<String>,
}

impl Required {
    const fn new(prefix: &'static str) -> Self {
        Self {
            prefix,
            missing: Vec::new(),
        }
    }

    /// Records `field` as missing when absent or empty.
    fn take(&mut self, field: &str, value: Option<String>) -> String {
        match value {
            Some(v) if !v.is_empty() => v,
            _ => {
                self.missing
                    .push(format!("{}.{field} is a required field", self.prefix));
                String::new()
            }
        }
    }

    fn finish(self) -> Result<(), RequiredFieldErrors> {
        if self.missing.is_empty() {
            Ok(())
        } else {
            Err(RequiredFieldErrors(self.missing))
        }
    }
}
