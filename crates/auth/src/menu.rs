//! Menu taxonomy: the static catalog of permission keys.
//!
//! The taxonomy mirrors the application's navigation tree. Every node below
//! the synthetic root is a capability with a restricted set of actions. Keys
//! are unique across the whole tree, so lookups never need a path.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{Action, ActionSet};

/// One node of the navigation tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuNode {
    /// Stable identifier (never a display label).
    pub key: String,
    pub name: String,
    #[serde(default)]
    pub allowed_actions: ActionSet,
    #[serde(default)]
    pub children: Vec<MenuNode>,
}

impl MenuNode {
    pub fn new(
        key: impl Into<String>,
        name: impl Into<String>,
        allowed_actions: impl IntoIterator<Item = Action>,
    ) -> Self {
        Self {
            key: key.into(),
            name: name.into(),
            allowed_actions: allowed_actions.into_iter().collect(),
            children: Vec::new(),
        }
    }

    pub fn with_children(mut self, children: Vec<MenuNode>) -> Self {
        self.children = children;
        self
    }
}

/// A taxonomy node as produced by [`MenuTaxonomy::flatten`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlatEntry {
    pub key: String,
    pub name: String,
    pub allowed_actions: ActionSet,
    /// 0 for top-level sections.
    pub depth: usize,
    /// `None` for top-level sections.
    pub parent: Option<String>,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TaxonomyError {
    #[error("duplicate menu key '{0}'")]
    DuplicateKey(String),

    #[error("empty menu key below '{parent}'")]
    EmptyKey { parent: String },

    #[error("malformed taxonomy document: {0}")]
    Parse(String),
}

/// Serialized form accepted by [`MenuTaxonomy::from_json`].
#[derive(Debug, Deserialize)]
struct TaxonomyDocument {
    version: u32,
    root: MenuNode,
}

/// Immutable, indexed menu taxonomy.
///
/// Built once at startup; lookups are O(1) and [`flatten`](Self::flatten) is a
/// precomputed depth-first (pre-order) walk in insertion order.
#[derive(Debug, Clone)]
pub struct MenuTaxonomy {
    version: u32,
    root: MenuNode,
    entries: Vec<FlatEntry>,
    // Child-index path from the root to each entry, aligned with `entries`.
    paths: Vec<Vec<usize>>,
    index: HashMap<String, usize>,
}

impl MenuTaxonomy {
    /// Index a tree, rejecting duplicate or empty keys.
    ///
    /// The root itself is not a capability: it is excluded from lookups and
    /// from [`flatten`](Self::flatten), but its key still participates in the
    /// uniqueness check.
    pub fn new(version: u32, root: MenuNode) -> Result<Self, TaxonomyError> {
        let mut seen: HashSet<String> = HashSet::new();
        seen.insert(root.key.clone());

        let mut entries = Vec::new();
        let mut paths = Vec::new();
        let mut path = Vec::new();
        for (i, child) in root.children.iter().enumerate() {
            path.push(i);
            collect(child, 0, None, &mut path, &mut seen, &mut entries, &mut paths)?;
            path.pop();
        }

        let index = entries
            .iter()
            .enumerate()
            .map(|(i, e)| (e.key.clone(), i))
            .collect();

        Ok(Self {
            version,
            root,
            entries,
            paths,
            index,
        })
    }

    /// Parse a `{ "version": .., "root": { .. } }` document.
    pub fn from_json(document: &str) -> Result<Self, TaxonomyError> {
        let doc: TaxonomyDocument =
            serde_json::from_str(document).map_err(|e| TaxonomyError::Parse(e.to_string()))?;
        Self::new(doc.version, doc.root)
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    /// The root of the tree (`Load()`).
    pub fn root(&self) -> &MenuNode {
        &self.root
    }

    /// Look up a capability by key.
    ///
    /// `None` means "no such capability"; callers must treat it as denying
    /// every action.
    pub fn find_node(&self, key: &str) -> Option<&MenuNode> {
        let path = &self.paths[*self.index.get(key)?];
        let mut node = &self.root;
        for &i in path {
            node = &node.children[i];
        }
        Some(node)
    }

    /// Actions supported by `key`, or `None` when the key is unknown.
    pub fn allowed_actions(&self, key: &str) -> Option<ActionSet> {
        self.index.get(key).map(|&i| self.entries[i].allowed_actions)
    }

    /// Every capability below the root, depth-first in insertion order.
    pub fn flatten(&self) -> &[FlatEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn collect(
    node: &MenuNode,
    depth: usize,
    parent: Option<&str>,
    path: &mut Vec<usize>,
    seen: &mut HashSet<String>,
    entries: &mut Vec<FlatEntry>,
    paths: &mut Vec<Vec<usize>>,
) -> Result<(), TaxonomyError> {
    if node.key.trim().is_empty() {
        return Err(TaxonomyError::EmptyKey {
            parent: parent.unwrap_or("<root>").to_string(),
        });
    }
    if !seen.insert(node.key.clone()) {
        return Err(TaxonomyError::DuplicateKey(node.key.clone()));
    }

    entries.push(FlatEntry {
        key: node.key.clone(),
        name: node.name.clone(),
        allowed_actions: node.allowed_actions,
        depth,
        parent: parent.map(str::to_string),
    });
    paths.push(path.clone());

    for (i, child) in node.children.iter().enumerate() {
        path.push(i);
        collect(child, depth + 1, Some(&node.key), path, seen, entries, paths)?;
        path.pop();
    }
    Ok(())
}
