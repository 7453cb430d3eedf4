//! End-to-end ingestion: upstream tree + schema → cached pages → catalog.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use futures::future::{join_all, try_join_all};
use serde_json::Value;
use sha2::{Digest, Sha256};
use tracing::{debug, info, instrument, warn};

use ironbar_docs_markdown::{TransformOptions, transform};
use ironbar_docs_schema::{Schema, module_type_name};
use ironbar_docs_shared::{
    AppConfig, CURRENT_CATALOG_VERSION, Catalog, DocsError, Page, Result, SchemaConfig,
    SourceConfig, VersionsConfig,
};
use ironbar_docs_source::{GitDirectory, SourceClient, SourceFile};

use crate::catalog;

/// Slug segment a `Home` page is renamed to.
pub const INDEX_SLUG: &str = "index";

/// Configuration for an ingestion run.
#[derive(Debug, Clone)]
pub struct IngestConfig {
    pub source: SourceConfig,
    pub schema: SchemaConfig,
    pub versions: VersionsConfig,
    /// Directory receiving pages, schemas and the catalog.
    pub cache_dir: PathBuf,
    /// GitHub API token.
    pub token: String,
}

impl IngestConfig {
    pub fn from_app(config: &AppConfig, token: String) -> Self {
        Self {
            source: config.source.clone(),
            schema: config.schema.clone(),
            versions: config.versions.clone(),
            cache_dir: config.output.cache_dir.clone(),
            token,
        }
    }
}

/// Result of an ingestion run.
#[derive(Debug)]
pub struct IngestResult {
    /// Path of the written `catalog.json`.
    pub catalog_path: PathBuf,
    /// Ingested versions, default first.
    pub versions: Vec<String>,
    /// Number of pages written.
    pub page_count: usize,
    /// Markdown files skipped (ignored or not markdown).
    pub skipped: usize,
    /// Total elapsed time.
    pub elapsed: Duration,
}

/// Progress callback for reporting ingestion status.
pub trait ProgressReporter: Send + Sync {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
    /// Called after a page file is written.
    fn page_written(&self, id: &str, current: usize, total: usize);
    /// Called when the run completes.
    fn done(&self, result: &IngestResult);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn page_written(&self, _id: &str, _current: usize, _total: usize) {}
    fn done(&self, _result: &IngestResult) {}
}

/// A version's tree together with the label pages are filed under.
struct VersionTree {
    version: String,
    current: bool,
    tree: GitDirectory,
}

/// Run a full ingestion.
///
/// 1. Fetch the default tree, tag list and current schema concurrently
/// 2. Fetch trees and schemas for historical tags concurrently
/// 3. Transform every markdown file and write it to the cache
/// 4. Write schema files and the catalog
#[instrument(skip_all, fields(cache_dir = %config.cache_dir.display()))]
pub async fn ingest(config: &IngestConfig, progress: &dyn ProgressReporter) -> Result<IngestResult> {
    let start = Instant::now();

    if config.token.trim().is_empty() {
        return Err(DocsError::config(format!(
            "GitHub token is empty. Set the {} environment variable.",
            config.source.token_env
        )));
    }

    progress.phase("Preparing cache directory");
    std::fs::create_dir_all(&config.cache_dir).map_err(|e| DocsError::io(&config.cache_dir, e))?;

    let client = SourceClient::new(&config.source, &config.schema, &config.token)?;
    let default_version = config.versions.default.as_str();

    // --- Phase 1: current tree, tags and schema ---
    progress.phase("Fetching documentation tree");
    let default_object = config.source.object_expression(&config.source.branch);

    let tags = async {
        if config.versions.enabled {
            client.fetch_tags(config.versions.count).await
        } else {
            Ok(Vec::new())
        }
    };

    let (tree, tags, default_schema) = tokio::join!(
        client.fetch_tree(&default_object),
        tags,
        current_schema(&client, &config.schema),
    );

    let tree = tree?.ok_or_else(|| {
        DocsError::validation(format!("no documentation found at {default_object}"))
    })?;
    let tags = tags?;
    let default_schema = default_schema?;

    // --- Phase 2: historical versions ---
    let mut trees = vec![VersionTree {
        version: default_version.to_string(),
        current: true,
        tree,
    }];

    let mut schemas = vec![(default_version.to_string(), default_schema)];

    if !tags.is_empty() {
        progress.phase("Fetching previous versions");

        let tag_trees = try_join_all(tags.iter().map(|tag| {
            let object = config.source.object_expression(tag);
            let client = &client;
            async move { client.fetch_tree(&object).await.map(|tree| (tag, tree)) }
        }));
        let tag_schemas = join_all(tags.iter().map(|tag| client.fetch_schema(Some(tag.as_str()))));

        let (tag_trees, tag_schemas) = tokio::join!(tag_trees, tag_schemas);

        for (tag, tree) in tag_trees? {
            match tree {
                Some(tree) => trees.push(VersionTree {
                    version: tag.clone(),
                    current: false,
                    tree,
                }),
                None => warn!(%tag, "no documentation for tag, skipping version"),
            }
        }

        for (tag, schema) in tags.iter().zip(tag_schemas) {
            match schema.and_then(|raw| Schema::from_value(raw.clone()).map(|_| raw)) {
                Ok(raw) => schemas.push((tag.clone(), raw)),
                Err(e) => warn!(%tag, error = %e, "schema unavailable for tag, skipping"),
            }
        }
    }

    // --- Phase 3: transform and write pages ---
    progress.phase("Transforming pages");
    let mut pages = Vec::new();
    let mut skipped = 0;

    for version_tree in &trees {
        let files = version_tree.tree.files();
        let total = files.len();

        for (i, file) in files.iter().enumerate() {
            if !should_ingest(file, &config.source.ignored_files) {
                debug!(path = file.path, "skipping file");
                skipped += 1;
                continue;
            }

            let page = write_page(file, version_tree, config)?;
            progress.page_written(&page.id, i + 1, total);
            pages.push(page);
        }
    }

    // --- Phase 4: schemas and catalog ---
    progress.phase("Writing catalog");
    for (version, raw) in &schemas {
        catalog::save_schema(&config.cache_dir, version, default_version, raw)?;
    }

    let versions: Vec<String> = trees.iter().map(|t| t.version.clone()).collect();
    let catalog = Catalog {
        schema_version: CURRENT_CATALOG_VERSION,
        generated_at: chrono::Utc::now(),
        default_version: default_version.to_string(),
        versions: versions.clone(),
        pages,
    };
    let catalog_path = catalog::save_catalog(&config.cache_dir, &catalog)?;

    let result = IngestResult {
        catalog_path,
        versions,
        page_count: catalog.pages.len(),
        skipped,
        elapsed: start.elapsed(),
    };

    progress.done(&result);

    info!(
        page_count = result.page_count,
        versions = result.versions.len(),
        skipped = result.skipped,
        elapsed_ms = result.elapsed.as_millis(),
        "ingest complete"
    );

    Ok(result)
}

/// The current schema, from the bundled file when configured.
async fn current_schema(client: &SourceClient, config: &SchemaConfig) -> Result<Value> {
    let raw = match &config.path {
        Some(path) => {
            debug!(?path, "using bundled schema");
            let content = std::fs::read_to_string(path).map_err(|e| DocsError::io(path, e))?;
            serde_json::from_str(&content)
                .map_err(|e| DocsError::parse(format!("invalid schema {}: {e}", path.display())))?
        }
        None => client.fetch_schema(None).await?,
    };

    // Reject an unusable shape before any page is written.
    Schema::from_value(raw.clone())?;
    Ok(raw)
}

fn should_ingest(file: &SourceFile<'_>, ignored: &[String]) -> bool {
    file.name.ends_with(".md") && !ignored.iter().any(|path| path == file.path)
}

/// Transform one file, write it to the cache and describe it as a [`Page`].
fn write_page(file: &SourceFile<'_>, version_tree: &VersionTree, config: &IngestConfig) -> Result<Page> {
    if file.truncated {
        warn!(path = file.path, "upstream content is truncated");
    }

    let prefix = (!version_tree.current).then_some(version_tree.version.as_str());
    let id = page_slug(file.path, &config.source.docs_dir, prefix);
    let title = file.name.strip_suffix(".md").unwrap_or(file.name).to_string();

    let opts = TransformOptions {
        type_name: module_type_name(&title),
        title: title.clone(),
        version: version_tree.version.clone(),
        current: version_tree.current,
    };
    let result = transform(file.text, &opts);

    let file_path = config.cache_dir.join(cache_file_name(file.path, prefix));
    std::fs::write(&file_path, &result.document).map_err(|e| DocsError::io(&file_path, e))?;

    info!(%id, examples = result.example_count, "page written");

    Ok(Page {
        digest: page_digest(&id, &file_path, &result.document),
        id,
        title,
        version: version_tree.version.clone(),
        source_path: file.path.to_string(),
        file_path,
        search: version_tree.current,
        edit_link: version_tree.current,
        body: result.document,
    })
}

// ---------------------------------------------------------------------------
// Naming helpers
// ---------------------------------------------------------------------------

/// Page id for an upstream path, e.g. `docs/modules/Sys Info.md` → `modules/sys-info`.
///
/// A trailing `home` segment becomes [`INDEX_SLUG`]. Pages of historical
/// versions get the version as first segment.
pub fn page_slug(source_path: &str, docs_dir: &str, version: Option<&str>) -> String {
    let prefix = format!("{}/", docs_dir.trim_end_matches('/'));
    let relative = source_path.strip_prefix(&prefix).unwrap_or(source_path);
    let relative = relative.strip_suffix(".md").unwrap_or(relative);

    let mut segments: Vec<String> = relative
        .replace(' ', "-")
        .to_lowercase()
        .split('/')
        .map(String::from)
        .collect();

    if let Some(last) = segments.last_mut().filter(|last| last.as_str() == "home") {
        *last = INDEX_SLUG.to_string();
    }

    if let Some(version) = version {
        segments.insert(0, version.to_string());
    }

    segments.join("/")
}

/// Cache file name for an upstream path, e.g. `docs/modules/Clock.md` → `docs_modules_Clock.mdx`.
pub fn cache_file_name(source_path: &str, version: Option<&str>) -> String {
    let flat = format!("{}x", source_path.replace('/', "_"));
    match version {
        Some(version) => format!("{version}_{flat}"),
        None => flat,
    }
}

/// SHA-256 hex digest over a page's id, file path and body.
pub fn page_digest(id: &str, file_path: &Path, body: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(id.as_bytes());
    hasher.update([0]);
    hasher.update(file_path.to_string_lossy().as_bytes());
    hasher.update([0]);
    hasher.update(body.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use url::Url;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn fixture(name: &str) -> String {
        let path = Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("../../../fixtures")
            .join(name);
        std::fs::read_to_string(&path).unwrap_or_else(|e| panic!("failed to read fixture {name}: {e}"))
    }

    fn config_for(server: &MockServer, cache_dir: &Path, versions_enabled: bool) -> IngestConfig {
        let mut app = AppConfig::default();
        app.source.endpoint = Url::parse(&format!("{}/graphql", server.uri())).unwrap();
        app.schema.base_url = Url::parse(&format!("{}/docs", server.uri())).unwrap();
        app.versions.enabled = versions_enabled;
        app.versions.count = 1;
        app.output.cache_dir = cache_dir.to_path_buf();
        IngestConfig::from_app(&app, "test-token".into())
    }

    async fn mount_current(server: &MockServer) {
        Mock::given(method("POST"))
            .and(path("/graphql"))
            .and(body_string_contains("master:docs"))
            .respond_with(ResponseTemplate::new(200).set_body_string(fixture("graphql/tree.json")))
            .mount(server)
            .await;

        Mock::given(method("GET"))
            .and(path("/docs/schema.json"))
            .respond_with(ResponseTemplate::new(200).set_body_string(fixture("schema/schema.json")))
            .mount(server)
            .await;
    }

    #[test]
    fn slug_rules() {
        assert_eq!(page_slug("docs/modules/Clock.md", "docs", None), "modules/clock");
        assert_eq!(page_slug("docs/Configuration guide.md", "docs", None), "configuration-guide");
        assert_eq!(page_slug("docs/Home.md", "docs", None), "index");
        assert_eq!(
            page_slug("docs/modules/Sys-Info.md", "docs", Some("v0.15.0")),
            "v0.15.0/modules/sys-info"
        );
    }

    #[test]
    fn cache_file_names_flatten_paths() {
        assert_eq!(cache_file_name("docs/modules/Clock.md", None), "docs_modules_Clock.mdx");
        assert_eq!(cache_file_name("docs/Home.md", Some("v0.15.0")), "v0.15.0_docs_Home.mdx");
    }

    #[test]
    fn digest_depends_on_every_input() {
        let base = page_digest("a", Path::new("cache/a.mdx"), "body");
        assert_eq!(base.len(), 64);
        assert_eq!(base, page_digest("a", Path::new("cache/a.mdx"), "body"));
        assert_ne!(base, page_digest("b", Path::new("cache/a.mdx"), "body"));
        assert_ne!(base, page_digest("a", Path::new("cache/b.mdx"), "body"));
        assert_ne!(base, page_digest("a", Path::new("cache/a.mdx"), "other"));
    }

    #[tokio::test]
    async fn empty_token_is_a_config_error() {
        let server = MockServer::start().await;
        let tmp = tempfile::tempdir().unwrap();
        let mut config = config_for(&server, tmp.path(), false);
        config.token = " ".into();

        let err = ingest(&config, &SilentProgress).await.unwrap_err();
        assert!(matches!(err, DocsError::Config { .. }));
    }

    #[tokio::test]
    async fn ingests_current_version() {
        let server = MockServer::start().await;
        mount_current(&server).await;
        let tmp = tempfile::tempdir().unwrap();
        let config = config_for(&server, tmp.path(), false);

        let result = ingest(&config, &SilentProgress).await.unwrap();
        assert_eq!(result.versions, ["master"]);
        // Home, Configuration guide, Clock, Sys-Info; _Sidebar.md is ignored.
        assert_eq!(result.page_count, 4);
        assert_eq!(result.skipped, 1);

        let catalog = catalog::load_catalog(tmp.path()).unwrap().unwrap();
        let ids: Vec<&str> = catalog.pages.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, ["index", "configuration-guide", "modules/clock", "modules/sys-info"]);

        let clock = catalog.page("modules/clock").unwrap();
        assert!(clock.search && clock.edit_link);
        assert_eq!(clock.file_path, tmp.path().join("docs_modules_Clock.mdx"));
        let written = std::fs::read_to_string(&clock.file_path).unwrap();
        assert_eq!(written, clock.body);
        assert!(written.contains(r#"<PropertiesDisplay depth={2} typeName="ClockModule" />"#));
        assert!(written.contains("<ConfigBlock corn="));

        let sys_info = std::fs::read_to_string(tmp.path().join("docs_modules_Sys-Info.mdx")).unwrap();
        assert!(sys_info.contains(r#"typeName="SysInfoModule""#));

        assert!(catalog::load_schema(tmp.path(), "master", "master").is_ok());
    }

    #[tokio::test]
    async fn historical_version_without_schema_is_still_ingested() {
        let server = MockServer::start().await;
        mount_current(&server).await;

        Mock::given(method("POST"))
            .and(path("/graphql"))
            .and(body_string_contains("refs/tags/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": { "repository": { "refs": { "nodes": [{ "name": "v0.15.0" }] } } }
            })))
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path("/graphql"))
            .and(body_string_contains("v0.15.0:docs"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": { "repository": { "object": { "entries": [
                    { "name": "Home.md", "path": "docs/Home.md",
                      "object": { "id": "h", "isTruncated": false, "text": "Old home." } }
                ] } } }
            })))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/docs/schema-v0.15.0.json"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let tmp = tempfile::tempdir().unwrap();
        let config = config_for(&server, tmp.path(), true);
        let result = ingest(&config, &SilentProgress).await.unwrap();

        assert_eq!(result.versions, ["master", "v0.15.0"]);
        assert_eq!(result.page_count, 5);

        let catalog = catalog::load_catalog(tmp.path()).unwrap().unwrap();
        let old_home = catalog.page("v0.15.0/index").unwrap();
        assert!(!old_home.search && !old_home.edit_link);
        assert!(old_home.body.contains("pagefind: false"));
        assert!(tmp.path().join("v0.15.0_docs_Home.mdx").exists());

        assert!(!tmp.path().join("schema-v0.15.0.json").exists());
    }

    #[tokio::test]
    async fn bundled_schema_with_bad_shape_aborts() {
        let server = MockServer::start().await;
        mount_current(&server).await;

        let tmp = tempfile::tempdir().unwrap();
        let bundled = tmp.path().join("bundled.json");
        std::fs::write(&bundled, r#"{ "properties": {} }"#).unwrap();

        let mut config = config_for(&server, &tmp.path().join("cache"), false);
        config.schema.path = Some(bundled);

        let err = ingest(&config, &SilentProgress).await.unwrap_err();
        assert!(matches!(err, DocsError::Config { .. }));
        assert!(catalog::load_catalog(&config.cache_dir).unwrap().is_none());
    }
}
