//! CLI command definitions, routing, and tracing setup.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, WrapErr, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use ironbar_docs_core::catalog::{load_catalog, load_schema};
use ironbar_docs_core::ingest::{IngestConfig, IngestResult, ProgressReporter, ingest};
use ironbar_docs_core::properties::property_table;
use ironbar_docs_core::ingest::INDEX_SLUG;
use ironbar_docs_core::route::{RouteRequest, build_route, is_version_segment};
use ironbar_docs_markdown::{PROPERTIES_DEPTH, TransformOptions, transform};
use ironbar_docs_schema::module_type_name;
use ironbar_docs_shared::{
    AppConfig, SidebarEntry, TocItem, config_file_path, github_token, init_config, load_config,
    load_config_from,
};

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// ironbar-docs: build documentation pages for Ironbar.
#[derive(Parser)]
#[command(
    name = "ironbar-docs",
    version,
    about = "Generate Ironbar documentation pages from upstream markdown and the config schema.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Config file (defaults to ./ironbar-docs.toml).
    #[arg(long, env = "IRONBAR_DOCS_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Fetch upstream docs and schemas, write pages and the catalog.
    Ingest {
        /// Cache directory (overrides `output.cache_dir`).
        #[arg(long)]
        cache_dir: Option<PathBuf>,
    },

    /// Print navigation data for a request path as JSON.
    Route {
        /// Request path, e.g. `/modules/clock/`.
        #[arg(long)]
        path: String,

        /// Page id (derived from the path when omitted).
        #[arg(long)]
        page: Option<String>,

        /// JSON file with the page's table of contents.
        #[arg(long)]
        toc: Option<PathBuf>,

        /// JSON file with the existing sidebar entries.
        #[arg(long)]
        sidebar: Option<PathBuf>,
    },

    /// Print the property table of a schema type as JSON.
    Properties {
        /// Schema type name, e.g. `ClockModule`.
        type_name: String,

        /// Version whose schema to use (defaults to the current one).
        #[arg(long)]
        version: Option<String>,

        /// Heading depth of the top-level rows.
        #[arg(long, default_value_t = PROPERTIES_DEPTH)]
        depth: u8,
    },

    /// Transform a local markdown file and print the page source.
    Transform {
        /// Markdown file to transform.
        file: PathBuf,

        /// Page title (defaults to the file stem).
        #[arg(long)]
        title: Option<String>,

        /// Version label (defaults to the current version).
        #[arg(long)]
        version: Option<String>,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "ironbar_docs=info",
        1 => "ironbar_docs=debug",
        _ => "ironbar_docs=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    let config_path = cli.config.as_deref();

    match cli.command {
        Command::Ingest { cache_dir } => cmd_ingest(config_path, cache_dir).await,
        Command::Route {
            path,
            page,
            toc,
            sidebar,
        } => cmd_route(config_path, &path, page, toc.as_deref(), sidebar.as_deref()),
        Command::Properties {
            type_name,
            version,
            depth,
        } => cmd_properties(config_path, &type_name, version.as_deref(), depth),
        Command::Transform {
            file,
            title,
            version,
        } => cmd_transform(config_path, &file, title, version),
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init(config_path),
            ConfigAction::Show => cmd_config_show(config_path),
        },
    }
}

fn resolve_config(path: Option<&Path>) -> Result<AppConfig> {
    let config = match path {
        Some(path) => load_config_from(path)?,
        None => load_config()?,
    };
    Ok(config)
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

async fn cmd_ingest(config_path: Option<&Path>, cache_dir: Option<PathBuf>) -> Result<()> {
    let config = resolve_config(config_path)?;
    let token = github_token(&config)?;

    let mut ingest_config = IngestConfig::from_app(&config, token);
    if let Some(cache_dir) = cache_dir {
        ingest_config.cache_dir = cache_dir;
    }

    info!(
        repository = %format!("{}/{}", config.source.owner, config.source.name),
        versions = config.versions.enabled,
        "ingesting documentation"
    );

    let reporter = CliProgress::new();
    let result = ingest(&ingest_config, &reporter).await?;

    println!();
    println!("  Documentation ingested successfully!");
    println!("  Versions: {}", result.versions.join(", "));
    println!("  Pages:    {}", result.page_count);
    println!("  Skipped:  {}", result.skipped);
    println!("  Catalog:  {}", result.catalog_path.display());
    println!("  Time:     {:.1}s", result.elapsed.as_secs_f64());
    println!();

    Ok(())
}

fn cmd_route(
    config_path: Option<&Path>,
    path: &str,
    page: Option<String>,
    toc: Option<&Path>,
    sidebar: Option<&Path>,
) -> Result<()> {
    let config = resolve_config(config_path)?;
    let cache_dir = &config.output.cache_dir;
    let default_version = config.versions.default.as_str();

    let request = RouteRequest {
        path: path.to_string(),
        page_id: page.unwrap_or_else(|| page_id_from_path(path)),
        toc: read_json::<Vec<TocItem>>(toc)?,
        sidebar: read_json::<Vec<SidebarEntry>>(sidebar)?,
    };

    let catalog = load_catalog(cache_dir)?;
    let data = build_route(
        request,
        catalog.as_ref(),
        &config.site,
        default_version,
        |version| load_schema(cache_dir, version, default_version),
    );

    println!("{}", serde_json::to_string_pretty(&data)?);
    Ok(())
}

fn cmd_properties(
    config_path: Option<&Path>,
    type_name: &str,
    version: Option<&str>,
    depth: u8,
) -> Result<()> {
    let config = resolve_config(config_path)?;
    let default_version = config.versions.default.as_str();
    let version = version.unwrap_or(default_version);

    let schema = load_schema(&config.output.cache_dir, version, default_version)
        .wrap_err_with(|| format!("no schema cached for {version}; run `ironbar-docs ingest`"))?;
    let rows = property_table(&schema, type_name, depth)?;

    println!("{}", serde_json::to_string_pretty(&rows)?);
    Ok(())
}

fn cmd_transform(
    config_path: Option<&Path>,
    file: &Path,
    title: Option<String>,
    version: Option<String>,
) -> Result<()> {
    let config = resolve_config(config_path)?;
    let body = std::fs::read_to_string(file)
        .wrap_err_with(|| format!("failed to read {}", file.display()))?;

    let title = match title {
        Some(title) => title,
        None => file
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .ok_or_else(|| eyre!("cannot derive a title from {}", file.display()))?,
    };
    let version = version.unwrap_or_else(|| config.versions.default.clone());

    let opts = TransformOptions {
        type_name: module_type_name(&title),
        current: version == config.versions.default,
        title,
        version,
    };
    let result = transform(&body, &opts);

    info!(examples = result.example_count, "transformed {}", file.display());
    println!("{}", result.document);
    Ok(())
}

fn cmd_config_init(config_path: Option<&Path>) -> Result<()> {
    let path = match config_path {
        Some(path) => path.to_path_buf(),
        None => config_file_path()?,
    };
    let path = init_config(&path)?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

fn cmd_config_show(config_path: Option<&Path>) -> Result<()> {
    let config = resolve_config(config_path)?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Page id for a request path: `/modules/clock/` → `modules/clock`,
/// `/` → `index`, `/v0.15.0/` → `v0.15.0/index`.
fn page_id_from_path(path: &str) -> String {
    let trimmed = path.trim_matches('/');
    if trimmed.is_empty() {
        INDEX_SLUG.to_string()
    } else if is_version_segment(trimmed) && !trimmed.contains('/') {
        format!("{trimmed}/{INDEX_SLUG}")
    } else {
        trimmed.to_string()
    }
}

/// Parse a JSON file, or return the default when no file is given.
fn read_json<T>(path: Option<&Path>) -> Result<T>
where
    T: serde::de::DeserializeOwned + Default,
{
    let Some(path) = path else {
        return Ok(T::default());
    };

    let content =
        std::fs::read_to_string(path).wrap_err_with(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&content).wrap_err_with(|| format!("invalid JSON in {}", path.display()))
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .expect("valid spinner template")
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
        );
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }
}

impl ProgressReporter for CliProgress {
    fn phase(&self, name: &str) {
        self.spinner.set_message(name.to_string());
    }

    fn page_written(&self, id: &str, current: usize, total: usize) {
        self.spinner.set_message(format!("Writing [{current}/{total}] {id}"));
    }

    fn done(&self, _result: &IngestResult) {
        self.spinner.finish_and_clear();
    }
}
