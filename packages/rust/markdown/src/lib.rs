//! Markdown-to-documentation-page transformation.
//!
//! Turns an upstream markdown page into MDX page source: a generated front
//! matter and import preamble followed by the body after a series of rewrite
//! passes (links, alerts, headings, properties placeholder, config examples).
//! [`split_sections`] separately breaks schema descriptions into prose,
//! example and styling sections.

mod passes;
mod sections;

use tracing::{debug, instrument};

pub use passes::{PROPERTIES_DEPTH, PROPERTIES_PLACEHOLDER};
pub use sections::{MAX_HEADER_DEPTH, Sections, split_sections};

/// Fence opening a code block in the bar's config language.
pub const CONFIG_FENCE: &str = "```corn";

/// Component imports every generated page carries.
const IMPORTS: &[&str] = &[
    "import AnchorHeading from '@astrojs/starlight/components/AnchorHeading.astro';",
    "import PropertiesDisplay from \"@components/PropertiesDisplay.astro\";",
    "import ConfigBlock from \"@components/ConfigBlock.astro\";",
    "import \"astro-starlight-remark-asides/styles.css\";",
];

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// Options for transforming one page.
#[derive(Debug, Clone)]
pub struct TransformOptions {
    /// Page title written to front matter.
    pub title: String,
    /// Schema type name the properties placeholder expands to.
    pub type_name: String,
    /// Version label written to front matter.
    pub version: String,
    /// Whether this is the current version. Older versions are kept out of
    /// search and get no edit link.
    pub current: bool,
}

/// Result of transforming a page.
#[derive(Debug, Clone)]
pub struct TransformResult {
    /// Complete page source: preamble plus transformed body.
    pub document: String,
    /// Page title.
    pub title: String,
    /// Number of config examples turned into preview components.
    pub example_count: usize,
}

// ---------------------------------------------------------------------------
// Transform
// ---------------------------------------------------------------------------

/// Transform a raw upstream page body into page source.
#[instrument(skip(body), fields(title = %opts.title, type_name = %opts.type_name))]
pub fn transform(body: &str, opts: &TransformOptions) -> TransformResult {
    let transformed = passes::run_pipeline(body, &opts.type_name);
    let example_count = transformed.matches("<ConfigBlock ").count();

    let preamble = build_preamble(opts);
    let document = format!("{preamble}\n{transformed}");

    debug!(example_count, final_len = document.len(), "transform complete");

    TransformResult {
        document,
        title: opts.title.clone(),
        example_count,
    }
}

/// Build the front matter and import block.
fn build_preamble(opts: &TransformOptions) -> String {
    let mut fm = String::from("---\n");
    fm.push_str(&format!("title: \"{}\"\n", escape_yaml_string(&opts.title)));
    fm.push_str(&format!("version: \"{}\"\n", escape_yaml_string(&opts.version)));
    if !opts.current {
        fm.push_str("pagefind: false\n");
        fm.push_str("editUrl: false\n");
    }
    fm.push_str("---\n\n");

    for import in IMPORTS {
        fm.push_str(import);
        fm.push('\n');
    }

    fm
}

/// Escape special characters in a YAML string value.
fn escape_yaml_string(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
