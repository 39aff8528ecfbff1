//! Configuration management for md2conf.
//!
//! Parses `md2conf.toml` with serde and provides auto-discovery of the config
//! file in the current directory and its parents. Every Confluence setting can
//! also come from the environment, which is how most CI jobs configure the
//! tool:
//!
//! | Field                       | Environment variable     |
//! |-----------------------------|--------------------------|
//! | `confluence.base_url`       | `CONFLUENCE_URL`         |
//! | `confluence.username`       | `CONFLUENCE_USER`        |
//! | `confluence.api_token`      | `CONFLUENCE_API_TOKEN`   |
//! | `confluence.space`          | `CONFLUENCE_SPACE`       |
//! | `confluence.parent_page_id` | `CONFLUENCE_PARENT_PAGE` |
//!
//! A value present in the file wins over the environment variable.
//!
//! ## Environment Variable Expansion
//!
//! String values in the file support `${VAR}` and `${VAR:-default}`.
//! Expanded fields: all `confluence.*` values and `publish.root`.

mod expand;

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "md2conf.toml";

/// Directory names skipped during discovery unless overridden.
pub const DEFAULT_EXCLUDE_DIRS: &[&str] = &[".git", ".github", "venv", ".venv", "__pycache__"];

/// Filename suffix marking example documents that are never published.
pub const DEFAULT_EXAMPLE_SUFFIX: &str = ".example.md";

/// CLI settings that override configuration file values.
///
/// Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override the directory scanned for documents.
    pub root: Option<PathBuf>,
    /// Override the target space key.
    pub space: Option<String>,
    /// Override the parent page for newly created pages.
    pub parent_page_id: Option<String>,
}

/// Application configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Confluence connection settings as written in the file.
    confluence: ConfluenceConfigRaw,
    /// Publishing settings as written in the file.
    publish: PublishConfigRaw,

    /// Resolved publish configuration (set after loading).
    #[serde(skip)]
    pub publish_resolved: PublishConfig,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_with_base(Path::new("."))
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ConfluenceConfigRaw {
    base_url: Option<String>,
    username: Option<String>,
    api_token: Option<String>,
    space: Option<String>,
    parent_page_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct PublishConfigRaw {
    root: Option<String>,
    exclude_dirs: Option<Vec<String>>,
    example_suffix: Option<String>,
}

/// Resolved publishing configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishConfig {
    /// Directory scanned recursively for Markdown documents.
    pub root: PathBuf,
    /// Path segments that exclude a document when any component matches.
    pub exclude_dirs: Vec<String>,
    /// Case-insensitive filename suffix of example documents.
    pub example_suffix: String,
}

impl Default for PublishConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            exclude_dirs: DEFAULT_EXCLUDE_DIRS.iter().map(|&d| d.to_owned()).collect(),
            example_suffix: DEFAULT_EXAMPLE_SUFFIX.to_owned(),
        }
    }
}

/// Validated Confluence connection and target settings.
#[derive(Clone, PartialEq, Eq)]
pub struct ConfluenceConfig {
    /// Confluence base URL, without trailing slash.
    pub base_url: String,
    /// Authenticating user (usually an e-mail address on Cloud).
    pub username: String,
    /// API token or password for `username`.
    pub api_token: String,
    /// Key of the space pages are published into.
    pub space: String,
    /// Page under which newly created pages are nested.
    pub parent_page_id: String,
}

impl fmt::Debug for ConfluenceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfluenceConfig")
            .field("base_url", &self.base_url)
            .field("username", &self.username)
            .field("api_token", &"<redacted>")
            .field("space", &self.space)
            .field("parent_page_id", &self.parent_page_id)
            .finish()
    }
}

impl ConfluenceConfig {
    /// Validate that all fields are properly set.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any field is empty or has invalid format.
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.base_url, "confluence.base_url")?;
        require_http_url(&self.base_url, "confluence.base_url")?;
        require_non_empty(&self.username, "confluence.username")?;
        require_non_empty(&self.api_token, "confluence.api_token")?;
        require_non_empty(&self.space, "confluence.space")?;
        require_non_empty(&self.parent_page_id, "confluence.parent_page_id")?;
        Ok(())
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Required value absent from both the file and the environment.
    #[error("Missing required setting {field} (set it in md2conf.toml or export {env})")]
    Missing {
        /// Config field path (e.g., "`confluence.space`").
        field: &'static str,
        /// Environment variable consulted as fallback.
        env: &'static str,
    },
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`confluence.api_token`").
        field: String,
        /// Error message (e.g., "${`CONFLUENCE_API_TOKEN`} not set").
        message: String,
    },
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

/// Require a URL field to use http:// or https:// scheme.
fn require_http_url(url: &str, field: &str) -> Result<(), ConfigError> {
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(ConfigError::Validation(format!(
            "{field} must start with http:// or https://"
        )));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `md2conf.toml` in current directory and parents.
    /// Without any file the defaults apply, rooted at the current directory.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist or parsing fails.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default_with_cwd()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
        }

        Ok(config)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(root) = &settings.root {
            self.publish_resolved.root.clone_from(root);
        }
        if let Some(space) = &settings.space {
            self.confluence.space = Some(space.clone());
        }
        if let Some(parent) = &settings.parent_page_id {
            self.confluence.parent_page_id = Some(parent.clone());
        }
    }

    /// Get validated Confluence configuration.
    ///
    /// Each field comes from the config file when present there, otherwise
    /// from its environment variable. Call this before doing any other work
    /// so that a misconfigured run fails immediately.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Missing` if a value is absent from both sources
    /// and `ConfigError::Validation` if a value is malformed.
    pub fn require_confluence(&self) -> Result<ConfluenceConfig, ConfigError> {
        self.resolve_confluence(|name| std::env::var(name).ok())
    }

    fn resolve_confluence<F>(&self, env: F) -> Result<ConfluenceConfig, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let pick = |value: &Option<String>, field: &'static str, var: &'static str| {
            value
                .clone()
                .or_else(|| env(var))
                .ok_or(ConfigError::Missing { field, env: var })
        };

        let raw = &self.confluence;
        let conf = ConfluenceConfig {
            base_url: pick(&raw.base_url, "confluence.base_url", "CONFLUENCE_URL")?
                .trim_end_matches('/')
                .to_owned(),
            username: pick(&raw.username, "confluence.username", "CONFLUENCE_USER")?,
            api_token: pick(&raw.api_token, "confluence.api_token", "CONFLUENCE_API_TOKEN")?,
            space: pick(&raw.space, "confluence.space", "CONFLUENCE_SPACE")?,
            parent_page_id: pick(
                &raw.parent_page_id,
                "confluence.parent_page_id",
                "CONFLUENCE_PARENT_PAGE",
            )?,
        };
        conf.validate()?;
        Ok(conf)
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Create default config rooted at the current working directory.
    fn default_with_cwd() -> Self {
        let cwd = std::env::current_dir().unwrap_or_default();
        Self::default_with_base(&cwd)
    }

    /// Create default config rooted at the given base directory.
    fn default_with_base(base: &Path) -> Self {
        Self {
            confluence: ConfluenceConfigRaw::default(),
            publish: PublishConfigRaw::default(),
            publish_resolved: PublishConfig {
                root: base.to_path_buf(),
                ..PublishConfig::default()
            },
            config_path: None,
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        config.expand_env_vars()?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.resolve_paths(config_dir);
        config.config_path = Some(path.to_path_buf());

        config.validate()?;

        Ok(config)
    }

    /// Validate publish configuration.
    ///
    /// Confluence settings are validated lazily by [`Config::require_confluence`]
    /// because commands such as `list` never talk to the server.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let publish = &self.publish_resolved;
        require_non_empty(&publish.example_suffix, "publish.example_suffix")?;

        for dir in &publish.exclude_dirs {
            require_non_empty(dir, "publish.exclude_dirs entry")?;
            if dir.contains('/') || dir.contains('\\') {
                return Err(ConfigError::Validation(format!(
                    "publish.exclude_dirs entry '{dir}' must be a single path segment"
                )));
            }
        }

        Ok(())
    }

    /// Expand environment variable references in configuration strings.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        let raw = &mut self.confluence;
        for (value, field) in [
            (&mut raw.base_url, "confluence.base_url"),
            (&mut raw.username, "confluence.username"),
            (&mut raw.api_token, "confluence.api_token"),
            (&mut raw.space, "confluence.space"),
            (&mut raw.parent_page_id, "confluence.parent_page_id"),
            (&mut self.publish.root, "publish.root"),
        ] {
            if let Some(v) = value {
                *v = expand::expand_env(v, field)?;
            }
        }
        Ok(())
    }

    /// Resolve relative paths against the config file directory.
    fn resolve_paths(&mut self, config_dir: &Path) {
        let defaults = PublishConfig::default();
        self.publish_resolved = PublishConfig {
            root: self
                .publish
                .root
                .as_deref()
                .map_or_else(|| config_dir.to_path_buf(), |r| config_dir.join(r)),
            exclude_dirs: self
                .publish
                .exclude_dirs
                .clone()
                .unwrap_or(defaults.exclude_dirs),
            example_suffix: self
                .publish
                .example_suffix
                .as_deref()
                .map_or(defaults.example_suffix, str::to_lowercase),
        };
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    fn full_env(name: &str) -> Option<String> {
        let value = match name {
            "CONFLUENCE_URL" => "https://env.example.com/",
            "CONFLUENCE_USER" => "bot@example.com",
            "CONFLUENCE_API_TOKEN" => "env-token",
            "CONFLUENCE_SPACE" => "ENV",
            "CONFLUENCE_PARENT_PAGE" => "100",
            _ => return None,
        };
        Some(value.to_owned())
    }

    fn valid_confluence_config() -> ConfluenceConfig {
        ConfluenceConfig {
            base_url: "https://wiki.example.com".to_owned(),
            username: "bot".to_owned(),
            api_token: "token".to_owned(),
            space: "DOCS".to_owned(),
            parent_page_id: "123".to_owned(),
        }
    }

    #[test]
    fn test_default_config() {
        let config = Config::default_with_base(Path::new("/repo"));
        assert_eq!(config.publish_resolved.root, PathBuf::from("/repo"));
        assert_eq!(
            config.publish_resolved.exclude_dirs,
            vec![".git", ".github", "venv", ".venv", "__pycache__"]
        );
        assert_eq!(config.publish_resolved.example_suffix, ".example.md");
        assert!(config.config_path.is_none());
    }

    #[test]
    fn test_parse_empty_config() {
        let config: Config = toml::from_str("").unwrap();
        assert!(config.confluence.base_url.is_none());
        assert!(config.publish.exclude_dirs.is_none());
    }

    #[test]
    fn test_resolve_paths_from_file_values() {
        let toml = r#"
[publish]
root = "docs"
exclude_dirs = ["node_modules", "target"]
example_suffix = ".Sample.md"
"#;
        let mut config: Config = toml::from_str(toml).unwrap();
        config.resolve_paths(Path::new("/project"));

        assert_eq!(
            config.publish_resolved,
            PublishConfig {
                root: PathBuf::from("/project/docs"),
                exclude_dirs: vec!["node_modules".to_owned(), "target".to_owned()],
                example_suffix: ".sample.md".to_owned(),
            }
        );
    }

    #[test]
    fn test_resolve_paths_defaults_to_config_dir() {
        let mut config: Config = toml::from_str("").unwrap();
        config.resolve_paths(Path::new("/project"));
        assert_eq!(config.publish_resolved.root, PathBuf::from("/project"));
        assert_eq!(config.publish_resolved.exclude_dirs.len(), 5);
    }

    #[test]
    fn test_confluence_from_environment_only() {
        let config = Config::default_with_base(Path::new("/repo"));
        let conf = config.resolve_confluence(full_env).unwrap();
        assert_eq!(conf.base_url, "https://env.example.com");
        assert_eq!(conf.username, "bot@example.com");
        assert_eq!(conf.api_token, "env-token");
        assert_eq!(conf.space, "ENV");
        assert_eq!(conf.parent_page_id, "100");
    }

    #[test]
    fn test_file_values_win_over_environment() {
        let toml = r#"
[confluence]
base_url = "https://file.example.com"
space = "FILE"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        let conf = config.resolve_confluence(full_env).unwrap();
        assert_eq!(conf.base_url, "https://file.example.com");
        assert_eq!(conf.space, "FILE");
        assert_eq!(conf.username, "bot@example.com");
    }

    #[test]
    fn test_missing_value_names_field_and_variable() {
        let toml = r#"
[confluence]
base_url = "https://wiki.example.com"
username = "bot"
api_token = "token"
space = "DOCS"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        let err = config.resolve_confluence(no_env).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Missing {
                field: "confluence.parent_page_id",
                env: "CONFLUENCE_PARENT_PAGE"
            }
        ));
        assert!(err.to_string().contains("CONFLUENCE_PARENT_PAGE"));
    }

    #[test]
    fn test_nothing_configured_is_missing() {
        let config = Config::default_with_base(Path::new("/repo"));
        let err = config.resolve_confluence(no_env).unwrap_err();
        assert!(matches!(err, ConfigError::Missing { .. }));
    }

    #[test]
    fn test_apply_cli_settings() {
        let mut config = Config::default_with_base(Path::new("/repo"));
        config.apply_cli_settings(&CliSettings {
            root: Some(PathBuf::from("/elsewhere")),
            space: Some("CLI".to_owned()),
            parent_page_id: None,
        });

        assert_eq!(config.publish_resolved.root, PathBuf::from("/elsewhere"));
        let conf = config.resolve_confluence(full_env).unwrap();
        assert_eq!(conf.space, "CLI");
        assert_eq!(conf.parent_page_id, "100");
    }

    #[test]
    fn test_apply_cli_settings_empty() {
        let mut config = Config::default_with_base(Path::new("/repo"));
        config.apply_cli_settings(&CliSettings::default());
        assert_eq!(config.publish_resolved.root, PathBuf::from("/repo"));
    }

    #[test]
    fn test_confluence_config_validate_valid() {
        assert!(valid_confluence_config().validate().is_ok());
    }

    #[test]
    fn test_confluence_config_validate_empty_token() {
        let config = ConfluenceConfig {
            api_token: "  ".to_owned(),
            ..valid_confluence_config()
        };
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
        assert!(err.to_string().contains("api_token"));
    }

    #[test]
    fn test_confluence_config_validate_invalid_url() {
        let config = ConfluenceConfig {
            base_url: "wiki.example.com".to_owned(),
            ..valid_confluence_config()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("http"));
    }

    #[test]
    fn test_debug_redacts_token() {
        let rendered = format!("{:?}", valid_confluence_config());
        assert!(!rendered.contains("token\""), "{rendered}");
        assert!(rendered.contains("<redacted>"));
    }

    #[test]
    fn test_validate_rejects_nested_exclude_entry() {
        let mut config = Config::default_with_base(Path::new("/repo"));
        config.publish_resolved.exclude_dirs = vec!["docs/drafts".to_owned()];
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("single path segment"));
    }

    #[test]
    fn test_validate_rejects_empty_suffix() {
        let mut config = Config::default_with_base(Path::new("/repo"));
        config.publish_resolved.example_suffix = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_from_file_expands_and_resolves() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILENAME);
        std::fs::write(
            &path,
            r#"
[confluence]
base_url = "https://wiki.example.com"
space = "${MD2CONF_TEST_SPACE:-TEAM}"

[publish]
root = "handbook"
"#,
        )
        .unwrap();

        let config = Config::load(Some(&path), None).unwrap();
        assert_eq!(config.config_path.as_deref(), Some(path.as_path()));
        assert_eq!(config.publish_resolved.root, dir.path().join("handbook"));
        assert_eq!(config.confluence.space.as_deref(), Some("TEAM"));
    }

    #[test]
    fn test_load_missing_explicit_file() {
        let err = Config::load(Some(Path::new("/nonexistent/md2conf.toml")), None).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
    }
}
