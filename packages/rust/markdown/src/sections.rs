//! Split a schema description into prose, example and styling sections.
//!
//! Property descriptions upstream are doc comments that mix prose, a
//! `# Example` config snippet and a trailing `# Styling` section. The
//! splitter is a three-state machine driven line by line.

use crate::CONFIG_FENCE;

/// Deepest heading level markdown supports.
pub const MAX_HEADER_DEPTH: u8 = 6;

/// Lines dropped from prose because the same data is rendered elsewhere.
const DROPPED_PREFIXES: &[&str] = &["**Default**", "**Valid options**"];

/// The three sections of a description, each trimmed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Sections {
    pub markdown: String,
    pub example: String,
    pub styling: String,
}

/// Which section the splitter is currently filling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Markdown,
    Example,
    Styling,
}

/// What to do with one input line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    /// Append the line to the current section.
    Keep,
    /// Drop the line.
    Skip,
    /// Drop the line and move to another section.
    Switch(Mode),
}

/// Transition table.
fn step(mode: Mode, line: &str) -> Step {
    match mode {
        _ if line == "<br>" => Step::Skip,
        Mode::Markdown if line.starts_with("# Example") || line.starts_with(CONFIG_FENCE) => {
            Step::Switch(Mode::Example)
        }
        Mode::Markdown if line.starts_with("# Styling") => Step::Switch(Mode::Styling),
        Mode::Markdown if DROPPED_PREFIXES.iter().any(|p| line.starts_with(p)) => Step::Skip,
        Mode::Example if line == CONFIG_FENCE => Step::Skip,
        Mode::Example if line == "```" => Step::Switch(Mode::Markdown),
        // styling is assumed to be the last section
        Mode::Markdown | Mode::Example | Mode::Styling => Step::Keep,
    }
}

/// Split `markdown` into sections, nesting prose headings `depth` levels deeper.
pub fn split_sections(markdown: &str, depth: u8) -> Sections {
    let mut sections = Sections::default();
    let mut mode = Mode::Markdown;

    for line in markdown.split('\n') {
        match step(mode, line) {
            Step::Skip => {}
            Step::Switch(next) => mode = next,
            Step::Keep => {
                let buffer = match mode {
                    Mode::Markdown => &mut sections.markdown,
                    Mode::Example => &mut sections.example,
                    Mode::Styling => &mut sections.styling,
                };

                if mode == Mode::Markdown {
                    buffer.push_str(&relevel_heading(line, depth));
                } else {
                    buffer.push_str(line);
                }
                buffer.push('\n');
            }
        }
    }

    Sections {
        markdown: sections.markdown.trim().to_string(),
        example: sections.example.trim().to_string(),
        styling: sections.styling.trim().to_string(),
    }
}

/// Push a heading `depth` levels down, or render it bold when that would
/// go past [`MAX_HEADER_DEPTH`].
fn relevel_heading(line: &str, depth: u8) -> String {
    if !line.starts_with('#') {
        return line.to_string();
    }

    let mut parts = line.split(' ');
    let marker = parts.next().unwrap_or_default();
    let current = marker.chars().count();

    if current + usize::from(depth) > usize::from(MAX_HEADER_DEPTH) {
        let text = parts.collect::<Vec<_>>().join(" ");
        format!("**{text}**")
    } else {
        format!("{}{line}", "#".repeat(usize::from(depth)))
    }
}
