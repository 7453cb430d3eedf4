//! Repository file tree as returned by the tree query.

use serde::Deserialize;

/// A named entry inside a directory.
#[derive(Debug, Clone, Deserialize)]
pub struct GitEntry {
    pub name: String,
    pub path: String,
    #[serde(default)]
    pub object: Option<GitObject>,
}

/// Either a file (blob) or a directory (tree).
///
/// Blobs are recognised by their `id`; anything else is read as a tree.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum GitObject {
    File(GitFile),
    Directory(GitDirectory),
}

/// A blob with its text content. Binary blobs have no text.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GitFile {
    pub id: String,
    #[serde(default)]
    pub is_truncated: bool,
    #[serde(default)]
    pub text: Option<String>,
}

/// A tree with its entries.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GitDirectory {
    #[serde(default)]
    pub entries: Vec<GitEntry>,
}

/// A text file found while flattening a tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceFile<'a> {
    /// File name, e.g. `Clock.md`.
    pub name: &'a str,
    /// Repository path, e.g. `docs/modules/Clock.md`.
    pub path: &'a str,
    /// File content.
    pub text: &'a str,
    /// Whether the API cut the content short.
    pub truncated: bool,
}

impl GitDirectory {
    /// Every text file in the tree, depth-first in entry order.
    pub fn files(&self) -> Vec<SourceFile<'_>> {
        let mut files = Vec::new();
        self.collect_files(&mut files);
        files
    }

    fn collect_files<'a>(&'a self, files: &mut Vec<SourceFile<'a>>) {
        for entry in &self.entries {
            match &entry.object {
                Some(GitObject::File(file)) => {
                    if let Some(text) = &file.text {
                        files.push(SourceFile {
                            name: &entry.name,
                            path: &entry.path,
                            text,
                            truncated: file.is_truncated,
                        });
                    }
                }
                Some(GitObject::Directory(dir)) => dir.collect_files(files),
                None => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn flattens_nested_tree_depth_first() {
        let dir: GitDirectory = serde_json::from_value(json!({
            "entries": [
                { "name": "Home.md", "path": "docs/Home.md",
                  "object": { "id": "1", "isTruncated": false, "text": "home" } },
                { "name": "modules", "path": "docs/modules",
                  "object": { "entries": [
                      { "name": "Clock.md", "path": "docs/modules/Clock.md",
                        "object": { "id": "2", "isTruncated": false, "text": "clock" } }
                  ] } },
                { "name": "Usage.md", "path": "docs/Usage.md",
                  "object": { "id": "3", "isTruncated": true, "text": "usage" } }
            ]
        }))
        .expect("deserialize tree");

        let files = dir.files();
        let paths: Vec<&str> = files.iter().map(|f| f.path).collect();
        assert_eq!(paths, ["docs/Home.md", "docs/modules/Clock.md", "docs/Usage.md"]);
        assert!(files[2].truncated);
    }

    #[test]
    fn skips_binary_blobs_and_empty_objects() {
        let dir: GitDirectory = serde_json::from_value(json!({
            "entries": [
                { "name": "logo.png", "path": "docs/logo.png",
                  "object": { "id": "1", "isTruncated": false, "text": null } },
                { "name": "deep", "path": "docs/deep", "object": {} },
                { "name": "gone", "path": "docs/gone", "object": null }
            ]
        }))
        .expect("deserialize tree");

        assert!(dir.files().is_empty());
    }
}
