//! On-disk layout of the cache directory: `catalog.json` and the
//! per-version schema files written next to the generated pages.

use std::path::{Path, PathBuf};

use tracing::{debug, info, instrument};

use ironbar_docs_schema::Schema;
use ironbar_docs_shared::{CURRENT_CATALOG_VERSION, Catalog, DocsError, Result};

/// File name of the page catalog inside the cache directory.
pub const CATALOG_FILE: &str = "catalog.json";

/// Path of the catalog inside `cache_dir`.
pub fn catalog_path(cache_dir: &Path) -> PathBuf {
    cache_dir.join(CATALOG_FILE)
}

/// Write `catalog` as pretty JSON, returning the file path.
#[instrument(skip(catalog), fields(pages = catalog.pages.len()))]
pub fn save_catalog(cache_dir: &Path, catalog: &Catalog) -> Result<PathBuf> {
    let path = catalog_path(cache_dir);
    let json = serde_json::to_string_pretty(catalog)
        .map_err(|e| DocsError::parse(format!("failed to serialize catalog: {e}")))?;

    std::fs::write(&path, json).map_err(|e| DocsError::io(&path, e))?;
    info!(?path, "catalog written");

    Ok(path)
}

/// Read the catalog. `None` means no ingestion has run yet.
pub fn load_catalog(cache_dir: &Path) -> Result<Option<Catalog>> {
    let path = catalog_path(cache_dir);
    if !path.exists() {
        debug!(?path, "catalog not found");
        return Ok(None);
    }

    let content = std::fs::read_to_string(&path).map_err(|e| DocsError::io(&path, e))?;
    let catalog: Catalog = serde_json::from_str(&content)
        .map_err(|e| DocsError::parse(format!("invalid catalog {}: {e}", path.display())))?;

    if catalog.schema_version != CURRENT_CATALOG_VERSION {
        return Err(DocsError::validation(format!(
            "catalog format {} is not supported (expected {CURRENT_CATALOG_VERSION}); re-run ingest",
            catalog.schema_version
        )));
    }

    Ok(Some(catalog))
}

/// `schema.json` for the default version, `schema-<version>.json` otherwise.
pub fn schema_file_name(version: &str, default_version: &str) -> String {
    if version == default_version {
        "schema.json".to_string()
    } else {
        format!("schema-{version}.json")
    }
}

/// Write the raw schema document for `version` into the cache directory.
pub fn save_schema(
    cache_dir: &Path,
    version: &str,
    default_version: &str,
    schema: &serde_json::Value,
) -> Result<PathBuf> {
    let path = cache_dir.join(schema_file_name(version, default_version));
    let json = serde_json::to_string_pretty(schema)
        .map_err(|e| DocsError::parse(format!("failed to serialize schema: {e}")))?;

    std::fs::write(&path, json).map_err(|e| DocsError::io(&path, e))?;
    debug!(?path, version, "schema written");

    Ok(path)
}

/// Load the cached schema for `version`.
pub fn load_schema(cache_dir: &Path, version: &str, default_version: &str) -> Result<Schema> {
    Schema::from_path(&cache_dir.join(schema_file_name(version, default_version)))
}
