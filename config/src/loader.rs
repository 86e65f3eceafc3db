use crate::{validate_with_mode, BuildMode, ConfigDocument, ConfigError, ValidatedConfig};
use regex::Regex;
use serde_yaml::Value;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// Variable naming an explicit config file.
pub const CONFIG_PATH_ENV: &str = "ZIPLINE_CONFIG";

/// Environment variables copied into the document after files are read.
const ENV_OVERRIDES: &[(&str, &str)] = &[
    ("ZIPLINE_CORE_SECRET", "core.secret"),
    ("ZIPLINE_DATABASE_URL", "core.database_url"),
    ("ZIPLINE_HOST", "core.host"),
    ("ZIPLINE_PORT", "core.port"),
    ("ZIPLINE_DATASOURCE_TYPE", "datasource.type"),
];

pub struct ConfigLoader {
    explicit_file: Option<PathBuf>,
    search_paths: Vec<PathBuf>,
    build_mode: Option<BuildMode>,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    pub fn new() -> Self {
        let mut search_paths = Vec::new();

        if let Some(home) = dirs::home_dir() {
            search_paths.push(home.join(".config/zipline/config.yaml"));
        }
        search_paths.push(PathBuf::from("./config.yaml"));

        #[cfg(unix)]
        search_paths.insert(0, PathBuf::from("/etc/zipline/config.yaml"));

        Self {
            explicit_file: None,
            search_paths,
            build_mode: None,
        }
    }

    pub fn with_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.explicit_file = Some(path.into());
        self
    }

    pub fn with_search_paths(mut self, paths: Vec<PathBuf>) -> Self {
        self.search_paths = paths;
        self
    }

    /// Overrides the mode otherwise read from the environment at load time.
    pub fn with_build_mode(mut self, mode: BuildMode) -> Self {
        self.build_mode = Some(mode);
        self
    }

    /// Reads, expands and layers the raw document without validating it.
    pub fn load_document(&self) -> Result<ConfigDocument, ConfigError> {
        let explicit = self
            .explicit_file
            .clone()
            .or_else(|| std::env::var_os(CONFIG_PATH_ENV).map(PathBuf::from));

        let mut document = if let Some(path) = explicit {
            self.parse_file(&path)?
        } else {
            let mut document = ConfigDocument::empty();
            for path in &self.search_paths {
                if path.exists() {
                    document.merge(self.parse_file(path)?);
                }
            }
            document
        };

        apply_env_overrides(&mut document, |name| std::env::var(name).ok());
        Ok(document)
    }

    /// Loads and validates. `Ok(None)` only in Docker build mode.
    pub fn load(&self) -> Result<Option<ValidatedConfig>, ConfigError> {
        let document = self.load_document()?;
        let mode = self.build_mode.unwrap_or_else(BuildMode::from_env);
        Ok(validate_with_mode(&document, mode)?)
    }

    fn parse_file(&self, path: &Path) -> Result<ConfigDocument, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
            path: path.to_path_buf(),
            source: e,
        })?;
        tracing::debug!(path = %path.display(), "Read config file");

        let expanded = expand_env_vars(&content, |name| std::env::var(name).ok());
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => ConfigDocument::from_json_str(&expanded),
            Some("toml") => ConfigDocument::from_toml_str(&expanded),
            _ => ConfigDocument::from_yaml_str(&expanded),
        }
    }
}

fn env_var_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\$\{([^}]+)\}").expect("env var pattern is valid"))
}

/// Replaces `${NAME}` with the variable's value, or nothing when unset.
fn expand_env_vars(content: &str, lookup: impl Fn(&str) -> Option<String>) -> String {
    env_var_pattern()
        .replace_all(content, |caps: &regex::Captures| {
            lookup(&caps[1]).unwrap_or_default()
        })
        .to_string()
}

fn apply_env_overrides(document: &mut ConfigDocument, lookup: impl Fn(&str) -> Option<String>) {
    for &(name, path) in ENV_OVERRIDES {
        let Some(raw) = lookup(name) else {
            continue;
        };
        // Unparseable numbers pass through as strings for the normalizer to reject.
        let value = match raw.parse::<u64>() {
            Ok(n) if path == "core.port" => Value::Number(n.into()),
            _ => Value::String(raw),
        };
        if document.set_path(path, value) {
            tracing::debug!(env = %name, field = %path, "Applied environment override");
        } else {
            tracing::warn!(env = %name, field = %path, "Skipped environment override: parent is not a mapping");
        }
    }
}
