//! Application configuration for ironbar-docs.
//!
//! The config lives next to the site at `./ironbar-docs.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{DocsError, Result};

/// Default configuration file name.
pub const CONFIG_FILE_NAME: &str = "ironbar-docs.toml";

const DEFAULT_ENDPOINT: &str = "https://api.github.com/graphql";
const DEFAULT_SCHEMA_BASE: &str = "https://raw.githubusercontent.com/JakeStanger/ironbar/master/docs";
const DEFAULT_EDIT_BASE: &str = "https://github.com/jakestanger/ironbar/edit/master";

// ---------------------------------------------------------------------------
// Config structs (matching ironbar-docs.toml)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Upstream repository settings.
    #[serde(default)]
    pub source: SourceConfig,

    /// Where the configuration schema comes from.
    #[serde(default)]
    pub schema: SchemaConfig,

    /// Documentation versioning.
    #[serde(default)]
    pub versions: VersionsConfig,

    /// Generated output locations.
    #[serde(default)]
    pub output: OutputConfig,

    /// Site-level settings consumed by navigation.
    #[serde(default)]
    pub site: SiteConfig,
}

/// `[source]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// GitHub GraphQL endpoint.
    #[serde(default = "default_endpoint")]
    pub endpoint: Url,

    /// Repository owner.
    #[serde(default = "default_owner")]
    pub owner: String,

    /// Repository name.
    #[serde(default = "default_repo")]
    pub name: String,

    /// Branch holding the current documentation.
    #[serde(default = "default_branch")]
    pub branch: String,

    /// Directory inside the repository containing the markdown docs.
    #[serde(default = "default_docs_dir")]
    pub docs_dir: String,

    /// Name of the env var holding the GitHub token (never store the token itself).
    #[serde(default = "default_token_env")]
    pub token_env: String,

    /// Upstream paths that are never turned into pages.
    #[serde(default = "default_ignored_files")]
    pub ignored_files: Vec<String>,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            owner: default_owner(),
            name: default_repo(),
            branch: default_branch(),
            docs_dir: default_docs_dir(),
            token_env: default_token_env(),
            ignored_files: default_ignored_files(),
            timeout_secs: default_timeout(),
        }
    }
}

impl SourceConfig {
    /// Git object expression for the docs tree at a given ref, e.g. `master:docs`.
    pub fn object_expression(&self, git_ref: &str) -> String {
        format!("{git_ref}:{}", self.docs_dir)
    }
}

fn default_endpoint() -> Url {
    Url::parse(DEFAULT_ENDPOINT).expect("valid default endpoint")
}
fn default_owner() -> String {
    "JakeStanger".into()
}
fn default_repo() -> String {
    "ironbar".into()
}
fn default_branch() -> String {
    "master".into()
}
fn default_docs_dir() -> String {
    "docs".into()
}
fn default_token_env() -> String {
    "GITHUB_TOKEN".into()
}
fn default_ignored_files() -> Vec<String> {
    vec!["docs/_Sidebar.md".into()]
}
fn default_timeout() -> u64 {
    30
}

/// `[schema]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaConfig {
    /// Base URL serving `schema.json` and `schema-<tag>.json`.
    #[serde(default = "default_schema_base")]
    pub base_url: Url,

    /// Bundled schema for the current version. When set, it is used instead
    /// of fetching `schema.json`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

impl Default for SchemaConfig {
    fn default() -> Self {
        Self {
            base_url: default_schema_base(),
            path: None,
        }
    }
}

fn default_schema_base() -> Url {
    Url::parse(DEFAULT_SCHEMA_BASE).expect("valid default schema base")
}

/// `[versions]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VersionsConfig {
    /// Whether tagged releases are ingested alongside the current docs.
    #[serde(default)]
    pub enabled: bool,

    /// How many of the most recent tags to ingest.
    #[serde(default = "default_version_count")]
    pub count: u32,

    /// Label of the current version (never prefixed in page ids).
    #[serde(default = "default_version")]
    pub default: String,
}

impl Default for VersionsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            count: default_version_count(),
            default: default_version(),
        }
    }
}

fn default_version_count() -> u32 {
    5
}
fn default_version() -> String {
    "master".into()
}

/// `[output]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Directory receiving generated pages, schemas and the catalog.
    #[serde(default = "default_cache_dir")]
    pub cache_dir: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            cache_dir: default_cache_dir(),
        }
    }
}

fn default_cache_dir() -> PathBuf {
    PathBuf::from("cache")
}

/// `[site]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Base URL for "edit this page" links.
    #[serde(default = "default_edit_base")]
    pub edit_base_url: String,

    /// Title of the page excluded from the generated sidebar.
    #[serde(default = "default_home_title")]
    pub home_title: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            edit_base_url: default_edit_base(),
            home_title: default_home_title(),
        }
    }
}

fn default_edit_base() -> String {
    DEFAULT_EDIT_BASE.into()
}
fn default_home_title() -> String {
    "Home".into()
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the project config file (`./ironbar-docs.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    let cwd = std::env::current_dir().map_err(|e| DocsError::io(".", e))?;
    Ok(cwd.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| DocsError::io(path, e))?;

    toml::from_str(&content)
        .map_err(|e| DocsError::config(format!("failed to parse {}: {e}", path.display())))
}

/// Write a default config file at `path`, refusing to overwrite an existing one.
pub fn init_config(path: &Path) -> Result<PathBuf> {
    if path.exists() {
        return Err(DocsError::config(format!(
            "{} already exists",
            path.display()
        )));
    }

    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| DocsError::config(e.to_string()))?;

    std::fs::write(path, content).map_err(|e| DocsError::io(path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path.to_path_buf())
}

/// Read the GitHub token from the configured env var.
pub fn github_token(config: &AppConfig) -> Result<String> {
    let var_name = &config.source.token_env;
    match std::env::var(var_name) {
        Ok(val) if !val.is_empty() => Ok(val),
        _ => Err(DocsError::config(format!(
            "GitHub token not found. Set the {var_name} environment variable."
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize default config");
        assert!(toml_str.contains("cache_dir"));
        assert!(toml_str.contains("GITHUB_TOKEN"));
    }

    #[test]
    fn config_roundtrip() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize");
        let parsed: AppConfig = toml::from_str(&toml_str).expect("deserialize");
        assert_eq!(parsed.source.owner, "JakeStanger");
        assert_eq!(parsed.versions.default, "master");
        assert_eq!(parsed.source.ignored_files, vec!["docs/_Sidebar.md".to_string()]);
    }

    #[test]
    fn partial_config_keeps_defaults() {
        let toml_str = r#"
[source]
branch = "docs/starlight"

[versions]
enabled = true
count = 2
"#;
        let config: AppConfig = toml::from_str(toml_str).expect("parse");
        assert_eq!(config.source.branch, "docs/starlight");
        assert_eq!(config.source.name, "ironbar");
        assert!(config.versions.enabled);
        assert_eq!(config.versions.count, 2);
        assert_eq!(config.output.cache_dir, PathBuf::from("cache"));
    }

    #[test]
    fn object_expression_joins_ref_and_dir() {
        let source = SourceConfig::default();
        assert_eq!(source.object_expression("v0.16.0"), "v0.16.0:docs");
    }

    #[test]
    fn init_refuses_to_overwrite() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join(CONFIG_FILE_NAME);
        init_config(&path).expect("first init");
        let loaded = load_config_from(&path).expect("load");
        assert_eq!(loaded.site.home_title, "Home");
        assert!(init_config(&path).is_err());
    }

    #[test]
    fn missing_token_is_config_error() {
        let mut config = AppConfig::default();
        // Use a unique env var name to avoid interfering with other tests
        config.source.token_env = "IRONBAR_DOCS_TEST_NONEXISTENT_TOKEN".into();
        let result = github_token(&config);
        assert!(matches!(result, Err(DocsError::Config { .. })));
    }
}
