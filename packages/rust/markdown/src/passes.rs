//! Rewrite passes applied to an upstream page body.
//!
//! Each pass is a function `&str -> String` applied in sequence, each one
//! consuming the full output of the previous pass.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;
use tracing::warn;

use crate::CONFIG_FENCE;

/// Token in upstream docs replaced by the module's properties table.
pub const PROPERTIES_PLACEHOLDER: &str = "%{properties}%";

/// Heading depth the properties table renders its entries at.
pub const PROPERTIES_DEPTH: u8 = 2;

/// Run the full pass pipeline on a page body.
pub(crate) fn run_pipeline(md: &str, type_name: &str) -> String {
    let mut result = md.to_string();

    result = fixup_links(&result);
    result = fixup_alerts(&result);
    result = hydrate_headers(&result);
    result = hydrate_properties(&result, type_name, PROPERTIES_DEPTH);
    result = hydrate_examples(&result);

    result
}

// ---------------------------------------------------------------------------
// Pass 1: Autolinks
// ---------------------------------------------------------------------------

/// Unwrap `<https://...>` autolinks, which MDX would parse as JSX.
fn fixup_links(md: &str) -> String {
    static AUTOLINK_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"<(http[^>]+)>").expect("valid regex"));

    AUTOLINK_RE.replace_all(md, "$1").to_string()
}

// ---------------------------------------------------------------------------
// Pass 2: GitHub alerts
// ---------------------------------------------------------------------------

/// Translate GitHub alert block quotes into `:::` aside directives.
fn fixup_alerts(md: &str) -> String {
    let mut result: Vec<String> = Vec::new();
    let mut in_alert = false;

    for line in md.split('\n') {
        if let Some(marker) = alert_marker(line) {
            match alert_directive(marker) {
                Some(directive) => {
                    if in_alert {
                        close_alert(&mut result);
                    }
                    result.push(format!(":::{directive}"));
                    in_alert = true;
                    continue;
                }
                None => warn!(marker, "unknown alert marker, leaving block quote as-is"),
            }
        }

        if in_alert {
            if let Some(content) = line.strip_prefix("> ") {
                result.push(content.to_string());
                continue;
            }
            if line == ">" {
                result.push(String::new());
                continue;
            }
            close_alert(&mut result);
            in_alert = false;
        }

        result.push(line.to_string());
    }

    if in_alert {
        close_alert(&mut result);
    }

    result.join("\n")
}

/// `> [!WARNING]` → `WARNING`.
fn alert_marker(line: &str) -> Option<&str> {
    let rest = line.strip_prefix("> [!")?;
    let end = rest.find(']')?;
    Some(&rest[..end])
}

fn alert_directive(marker: &str) -> Option<&'static str> {
    match marker {
        "NOTE" => Some("note"),
        "TIP" => Some("tip"),
        "IMPORTANT" => Some("note[Important]"),
        "WARNING" => Some("caution"),
        "CAUTION" => Some("danger"),
        _ => None,
    }
}

fn close_alert(result: &mut Vec<String>) {
    result.push(":::".to_string());
    result.push(String::new());
}

// ---------------------------------------------------------------------------
// Pass 3: Headings
// ---------------------------------------------------------------------------

/// Reserved for turning headings into anchor components. Identity for now:
/// a heading rewrite has to skip fenced code blocks first.
fn hydrate_headers(md: &str) -> String {
    md.to_string()
}

// ---------------------------------------------------------------------------
// Pass 4: Properties placeholder
// ---------------------------------------------------------------------------

fn hydrate_properties(md: &str, type_name: &str, depth: u8) -> String {
    md.replacen(
        PROPERTIES_PLACEHOLDER,
        &properties_display(type_name, depth),
        1,
    )
}

fn properties_display(type_name: &str, depth: u8) -> String {
    format!(r#"<PropertiesDisplay depth={{{depth}}} typeName="{type_name}" />"#)
}

// ---------------------------------------------------------------------------
// Pass 5: Config examples
// ---------------------------------------------------------------------------

/// Replace each config-language code block with a preview component.
///
/// An unterminated block is put back untouched.
fn hydrate_examples(md: &str) -> String {
    let mut result: Vec<String> = Vec::new();
    let mut fence: Option<&str> = None;
    let mut config_lines: Vec<&str> = Vec::new();

    for line in md.split('\n') {
        if fence.is_none() {
            if line.contains(CONFIG_FENCE) {
                fence = Some(line);
            } else {
                result.push(line.to_string());
            }
            continue;
        }

        if line.trim_start() == "```" {
            result.push(config_block(&config_lines.join("\n")));
            config_lines.clear();
            fence = None;
        } else {
            config_lines.push(line);
        }
    }

    if let Some(fence) = fence {
        result.push(fence.to_string());
        result.extend(config_lines.into_iter().map(str::to_string));
    }

    result.join("\n")
}

fn config_block(config: &str) -> String {
    let payload = Value::String(config.to_string());
    format!("<ConfigBlock corn={{{payload}}} />")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
