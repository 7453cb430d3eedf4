//! Upstream content source: the GitHub GraphQL API and the schema host.
//!
//! The docs tree and the recent tag list come from two static GraphQL
//! documents shipped with this crate. GraphQL `errors` entries are logged
//! and processing continues with whatever `data` came back.

mod tree;

use std::time::Duration;

use reqwest::Client;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tracing::{debug, info, instrument, warn};
use url::Url;

use ironbar_docs_shared::{DocsError, Result, SchemaConfig, SourceConfig};

pub use tree::{GitDirectory, GitEntry, GitFile, GitObject, SourceFile};

/// User-Agent string for upstream requests.
const USER_AGENT: &str = concat!("ironbar-docs/", env!("CARGO_PKG_VERSION"));

const TREE_QUERY: &str = include_str!("../queries/tree.graphql");
const TAGS_QUERY: &str = include_str!("../queries/tags.graphql");

// ---------------------------------------------------------------------------
// GraphQL envelopes
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct GraphQlResponse<T> {
    #[serde(default)]
    errors: Vec<GraphQlError>,
    data: Option<T>,
}

/// One entry of a GraphQL `errors` array.
#[derive(Debug, Clone, Deserialize)]
pub struct GraphQlError {
    pub message: String,
    #[serde(default)]
    pub path: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct TreeData {
    repository: Option<TreeRepository>,
}

#[derive(Debug, Deserialize)]
struct TreeRepository {
    object: Option<GitDirectory>,
}

#[derive(Debug, Deserialize)]
struct TagsData {
    repository: Option<TagsRepository>,
}

#[derive(Debug, Deserialize)]
struct TagsRepository {
    refs: Option<TagRefs>,
}

#[derive(Debug, Deserialize)]
struct TagRefs {
    #[serde(default)]
    nodes: Vec<TagNode>,
}

#[derive(Debug, Deserialize)]
struct TagNode {
    name: String,
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Client for the upstream repository and its published schemas.
#[derive(Debug, Clone)]
pub struct SourceClient {
    client: Client,
    endpoint: Url,
    owner: String,
    name: String,
    schema_base: Url,
}

impl SourceClient {
    /// Build a client authenticating with `token`.
    pub fn new(source: &SourceConfig, schema: &SchemaConfig, token: &str) -> Result<Self> {
        let mut auth = HeaderValue::from_str(&format!("Bearer {token}"))
            .map_err(|e| DocsError::config(format!("invalid GitHub token: {e}")))?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .timeout(Duration::from_secs(source.timeout_secs))
            .build()
            .map_err(|e| DocsError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoint: source.endpoint.clone(),
            owner: source.owner.clone(),
            name: source.name.clone(),
            schema_base: schema.base_url.clone(),
        })
    }

    /// Fetch the file tree at a git object expression such as `master:docs`.
    ///
    /// Returns `None` when the repository or object does not exist.
    #[instrument(skip(self))]
    pub async fn fetch_tree(&self, object: &str) -> Result<Option<GitDirectory>> {
        let variables = json!({ "owner": self.owner, "name": self.name, "object": object });
        let data: TreeData = self.query(TREE_QUERY, variables).await?;

        let tree = data.repository.and_then(|repo| repo.object);
        match &tree {
            Some(dir) => debug!(entries = dir.entries.len(), "tree fetched"),
            None => warn!("object not found upstream"),
        }

        Ok(tree)
    }

    /// Names of the `top` most recent tags, newest first.
    #[instrument(skip(self))]
    pub async fn fetch_tags(&self, top: u32) -> Result<Vec<String>> {
        let variables = json!({ "owner": self.owner, "name": self.name, "top": top });
        let data: TagsData = self.query(TAGS_QUERY, variables).await?;

        let mut tags: Vec<String> = data
            .repository
            .and_then(|repo| repo.refs)
            .map(|refs| refs.nodes.into_iter().map(|node| node.name).collect())
            .unwrap_or_default();
        tags.reverse();

        info!(count = tags.len(), "tags fetched");
        Ok(tags)
    }

    /// Fetch the published schema for a tag, or the current one for `None`.
    #[instrument(skip(self))]
    pub async fn fetch_schema(&self, tag: Option<&str>) -> Result<Value> {
        let url = schema_url(&self.schema_base, tag)?;
        debug!(%url, "fetching schema");

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| DocsError::Network(format!("{url}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DocsError::Network(format!("{url}: HTTP {status}")));
        }

        response
            .json()
            .await
            .map_err(|e| DocsError::parse(format!("{url}: invalid schema JSON: {e}")))
    }

    async fn query<T: DeserializeOwned>(&self, query: &str, variables: Value) -> Result<T> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .json(&json!({ "query": query, "variables": variables }))
            .send()
            .await
            .map_err(|e| DocsError::Network(format!("{}: {e}", self.endpoint)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DocsError::Network(format!(
                "{}: HTTP {status}",
                self.endpoint
            )));
        }

        let body: GraphQlResponse<T> = response
            .json()
            .await
            .map_err(|e| DocsError::parse(format!("invalid GraphQL response: {e}")))?;

        for error in &body.errors {
            warn!(message = %error.message, path = ?error.path, "GraphQL error");
        }

        body.data
            .ok_or_else(|| DocsError::Network("GraphQL response contained no data".into()))
    }
}

/// `<base>/schema.json` for the current version, `<base>/schema-<tag>.json` otherwise.
pub fn schema_url(base: &Url, tag: Option<&str>) -> Result<Url> {
    let file = match tag {
        Some(tag) => format!("schema-{tag}.json"),
        None => "schema.json".to_string(),
    };
    let raw = format!("{}/{file}", base.as_str().trim_end_matches('/'));

    Url::parse(&raw).map_err(|e| DocsError::config(format!("invalid schema URL {raw}: {e}")))
}
