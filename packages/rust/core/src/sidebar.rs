//! Sidebar builder.
//!
//! Folds page slugs into an ordered tree and walks it into link and group
//! entries. Entries keep the order pages were folded in.

use tracing::{debug, instrument};

use ironbar_docs_schema::capitalise;
use ironbar_docs_shared::{Catalog, SidebarEntry, SidebarGroup, SidebarLink};

use crate::ingest::INDEX_SLUG;

/// One node of the folded slug tree.
#[derive(Debug, Default)]
struct Node {
    title: Option<String>,
    children: Vec<(String, Node)>,
}

impl Node {
    fn child_mut(&mut self, key: &str) -> &mut Node {
        let index = match self.children.iter().position(|(name, _)| name == key) {
            Some(index) => index,
            None => {
                self.children.push((key.to_string(), Node::default()));
                self.children.len() - 1
            }
        };
        &mut self.children[index].1
    }

    fn insert(&mut self, segments: &[&str], title: &str) {
        let Some((first, rest)) = segments.split_first() else {
            return;
        };

        let child = self.child_mut(first);
        if rest.is_empty() {
            // First page to claim a path keeps its title.
            if child.title.is_none() && child.children.is_empty() {
                child.title = Some(title.to_string());
            }
        } else {
            child.insert(rest, title);
        }
    }
}

/// Insert generated entries for `version` into `sidebar`.
///
/// The page titled `home_title` is left out. The last existing entry of
/// `sidebar` (the version history link) stays last.
#[instrument(skip_all, fields(%version, %current_path))]
pub fn build_sidebar(
    catalog: &Catalog,
    version: &str,
    current_path: &str,
    home_title: &str,
    sidebar: &mut Vec<SidebarEntry>,
) {
    let mut tree = Node::default();
    for page in catalog
        .pages_for_version(version)
        .filter(|p| p.title != home_title)
    {
        let segments: Vec<&str> = page.id.split('/').filter(|s| *s != version).collect();
        tree.insert(&segments, &page.title);
    }

    let current_path = current_path.trim_end_matches('/');
    let version_history = sidebar.pop();

    let before = sidebar.len();
    for (name, node) in &tree.children {
        sidebar.push(sidebar_entry(name, node, &[], current_path));
    }
    debug!(entries = sidebar.len() - before, "sidebar entries generated");

    if let Some(entry) = version_history {
        sidebar.push(entry);
    }
}

fn sidebar_entry(name: &str, node: &Node, parents: &[&str], current_path: &str) -> SidebarEntry {
    if node.children.is_empty() {
        let path = parents
            .iter()
            .copied()
            .chain(std::iter::once(name))
            .collect::<Vec<_>>()
            .join("/")
            .to_lowercase();
        let path = path.strip_suffix(INDEX_SLUG).unwrap_or(&path);
        let href = format!("/{path}");

        return SidebarEntry::Link(SidebarLink {
            label: node.title.clone().unwrap_or_else(|| name.to_string()),
            is_current: href.trim_end_matches('/') == current_path,
            href,
            attrs: serde_json::Map::new(),
        });
    }

    let mut path = parents.to_vec();
    path.push(name);

    SidebarEntry::Group(SidebarGroup {
        label: capitalise(&name.replace('-', " ")),
        entries: node
            .children
            .iter()
            .map(|(child, node)| sidebar_entry(child, node, &path, current_path))
            .collect(),
        collapsed: false,
    })
}
