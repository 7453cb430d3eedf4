//! Core domain types for generated documentation.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Current format version of `catalog.json`.
pub const CURRENT_CATALOG_VERSION: u32 = 1;

// ---------------------------------------------------------------------------
// Page
// ---------------------------------------------------------------------------

/// A single documentation page produced by one ingestion run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    /// Slug, e.g. `modules/clock` or `v0.15.0/modules/clock`.
    pub id: String,
    /// Display title (upstream file name without extension).
    pub title: String,
    /// Version label the page belongs to.
    pub version: String,
    /// Path of the markdown file in the upstream repository.
    pub source_path: String,
    /// Path of the generated page file.
    pub file_path: PathBuf,
    /// SHA-256 digest over id, file path and body.
    pub digest: String,
    /// Whether the page takes part in full-text search.
    pub search: bool,
    /// Whether an "edit this page" link is generated.
    pub edit_link: bool,
    /// Generated document (front matter, imports and transformed body).
    pub body: String,
}

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

/// The `catalog.json` written at the end of an ingestion run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Catalog {
    /// Format version for forward compatibility.
    pub schema_version: u32,
    /// When the catalog was generated.
    pub generated_at: DateTime<Utc>,
    /// Label of the current version.
    pub default_version: String,
    /// Every ingested version, current first.
    pub versions: Vec<String>,
    /// All pages across versions, in ingestion order.
    pub pages: Vec<Page>,
}

impl Catalog {
    /// Pages belonging to `version`, in ingestion order.
    pub fn pages_for_version<'a>(&'a self, version: &'a str) -> impl Iterator<Item = &'a Page> {
        self.pages.iter().filter(move |p| p.version == version)
    }

    /// Look up a page by id.
    pub fn page(&self, id: &str) -> Option<&Page> {
        self.pages.iter().find(|p| p.id == id)
    }

    /// Whether `version` was ingested.
    pub fn has_version(&self, version: &str) -> bool {
        self.versions.iter().any(|v| v == version)
    }
}

// ---------------------------------------------------------------------------
// Table of contents
// ---------------------------------------------------------------------------

/// A single table-of-contents heading entry for a rendered page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TocItem {
    /// Heading depth.
    pub depth: u8,
    /// Anchor slug.
    pub slug: String,
    /// Display text.
    pub text: String,
    /// Nested headings.
    #[serde(default)]
    pub children: Vec<TocItem>,
}

// ---------------------------------------------------------------------------
// Sidebar
// ---------------------------------------------------------------------------

/// One entry of the site sidebar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SidebarEntry {
    Link(SidebarLink),
    Group(SidebarGroup),
}

impl SidebarEntry {
    /// Label shown for the entry.
    pub fn label(&self) -> &str {
        match self {
            Self::Link(link) => &link.label,
            Self::Group(group) => &group.label,
        }
    }
}

/// A sidebar link to a single page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SidebarLink {
    pub label: String,
    pub href: String,
    pub is_current: bool,
    #[serde(default)]
    pub attrs: serde_json::Map<String, serde_json::Value>,
}

/// A collapsible sidebar group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SidebarGroup {
    pub label: String,
    #[serde(default)]
    pub entries: Vec<SidebarEntry>,
    #[serde(default)]
    pub collapsed: bool,
}
