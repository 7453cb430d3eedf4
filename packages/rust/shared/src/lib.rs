//! Shared types, error model, and configuration for ironbar-docs.
//!
//! This crate is the foundation depended on by all other ironbar-docs crates.
//! It provides:
//! - [`DocsError`], the unified error type
//! - Domain types ([`Page`], [`Catalog`], [`TocItem`], [`SidebarEntry`])
//! - Configuration ([`AppConfig`] and its sections, config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, CONFIG_FILE_NAME, OutputConfig, SchemaConfig, SiteConfig, SourceConfig,
    VersionsConfig, config_file_path, github_token, init_config, load_config, load_config_from,
};
pub use error::{DocsError, Result};
pub use types::{
    CURRENT_CATALOG_VERSION, Catalog, Page, SidebarEntry, SidebarGroup, SidebarLink, TocItem,
};
