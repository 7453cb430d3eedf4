//! Per-request route data: version, sidebar, table of contents and edit URL.
//!
//! Everything here is best effort. A missing catalog or schema is logged
//! and the affected navigation is left as the caller passed it in.

use serde::Serialize;
use tracing::{error, instrument, warn};

use ironbar_docs_schema::Schema;
use ironbar_docs_shared::{Catalog, Result, SidebarEntry, SiteConfig, TocItem};

use crate::sidebar::build_sidebar;
use crate::toc::{augment_toc, is_module_page};

/// Navigation state for one request, as produced by the site router.
#[derive(Debug, Clone, Default)]
pub struct RouteRequest {
    /// Request path, e.g. `/v0.15.0/modules/clock/`.
    pub path: String,
    /// Id of the page being rendered.
    pub page_id: String,
    pub sidebar: Vec<SidebarEntry>,
    pub toc: Vec<TocItem>,
}

/// Augmented navigation for one request.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteData {
    pub version: String,
    pub sidebar: Vec<SidebarEntry>,
    pub toc: Vec<TocItem>,
    pub edit_url: Option<String>,
}

/// Whether a path segment names a historical version, e.g. `v0.15.0`.
pub fn is_version_segment(segment: &str) -> bool {
    let mut chars = segment.chars();
    chars.next() == Some('v') && chars.next().is_some_and(|c| c.is_ascii_digit())
}

/// Version a request path belongs to.
pub fn version_from_path(path: &str, default_version: &str) -> String {
    path.split('/')
        .find(|segment| !segment.is_empty())
        .filter(|segment| is_version_segment(segment))
        .unwrap_or(default_version)
        .to_string()
}

/// Build route data for `request`.
///
/// `catalog` is `None` when no ingestion has run. `load_schema` is only
/// called for module pages.
#[instrument(skip_all, fields(path = %request.path, page_id = %request.page_id))]
pub fn build_route<F>(
    request: RouteRequest,
    catalog: Option<&Catalog>,
    site: &SiteConfig,
    default_version: &str,
    load_schema: F,
) -> RouteData
where
    F: FnOnce(&str) -> Result<Schema>,
{
    let RouteRequest {
        path,
        page_id,
        mut sidebar,
        mut toc,
    } = request;

    let version = version_from_path(&path, default_version);

    if is_module_page(&page_id) {
        match load_schema(&version).and_then(|schema| augment_toc(&mut toc, &page_id, &schema)) {
            Ok(_) => {}
            Err(e) => warn!(%version, error = %e, "toc augmentation skipped"),
        }
    }

    let edit_url = match catalog {
        Some(catalog) => {
            if catalog.has_version(&version) {
                build_sidebar(catalog, &version, &path, &site.home_title, &mut sidebar);
            } else {
                warn!(%version, "version not ingested, sidebar left unchanged");
            }
            catalog
                .page(&page_id)
                .filter(|page| page.edit_link)
                .map(|page| {
                    format!(
                        "{}/{}",
                        site.edit_base_url.trim_end_matches('/'),
                        page.source_path
                    )
                })
        }
        None => {
            error!("docs catalog not initialized");
            None
        }
    };

    RouteData {
        version,
        sidebar,
        toc,
        edit_url,
    }
}
