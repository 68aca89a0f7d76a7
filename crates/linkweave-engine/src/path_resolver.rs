//! Prefix-aware path resolution.
//!
//! Turns `#:package.json`, `~:sibling.ts`, `../up.md` and friends into
//! absolute paths. Only strings are computed; nothing touches the disk.

use linkweave_core::{PathPrefixTable, PrefixBase, join_normalized};
use std::path::{Path, PathBuf};

/// Resolves possibly-prefixed relative paths against a workspace root and
/// the current document.
#[derive(Debug, Clone, Default)]
pub struct PathResolver {
    prefixes: PathPrefixTable,
}

impl PathResolver {
    /// Create a resolver over a prefix table
    pub fn new(prefixes: PathPrefixTable) -> Self {
        Self { prefixes }
    }

    /// Resolve `path` to an absolute path.
    ///
    /// - absolute input is returned unchanged;
    /// - the first matching prefix is stripped and the rest joined onto its
    ///   base (falling back to the workspace root, then to the bare remainder,
    ///   when the base cannot be computed);
    /// - unprefixed input is workspace-relative, else relative to the
    ///   document's directory, else returned unchanged.
    ///
    /// # Example
    /// ```
    /// use linkweave_engine::PathResolver;
    /// use std::path::{Path, PathBuf};
    ///
    /// let resolver = PathResolver::default();
    /// let doc = Path::new("/ws/src/a.ts");
    /// let ws = Path::new("/ws");
    ///
    /// assert_eq!(resolver.resolve("#:package.json", Some(doc), Some(ws)), PathBuf::from("/ws/package.json"));
    /// assert_eq!(resolver.resolve("~:b.ts", Some(doc), Some(ws)), PathBuf::from("/ws/src/b.ts"));
    /// assert_eq!(resolver.resolve("<:c.ts", Some(doc), Some(ws)), PathBuf::from("/ws/c.ts"));
    /// ```
    pub fn resolve(
        &self,
        path: &str,
        current_document: Option<&Path>,
        workspace_root: Option<&Path>,
    ) -> PathBuf {
        if Path::new(path).is_absolute() {
            return PathBuf::from(path);
        }

        let current_document = current_document.filter(|p| !p.as_os_str().is_empty());

        if let Some(entry) = self.prefixes.find_prefix(path) {
            let remainder = &path[entry.prefix.len()..];
            return Self::resolve_by_base(remainder, entry.base, current_document, workspace_root);
        }

        if let Some(root) = workspace_root {
            return join_normalized(root, path);
        }

        if let Some(document) = current_document {
            return join_normalized(&dirname(document), path);
        }

        PathBuf::from(path)
    }

    fn resolve_by_base(
        relative: &str,
        base: PrefixBase,
        current_document: Option<&Path>,
        workspace_root: Option<&Path>,
    ) -> PathBuf {
        let base_dir = match base {
            PrefixBase::Workspace => workspace_root.map(Path::to_path_buf),
            // child resolves exactly like current
            PrefixBase::Current | PrefixBase::Child => current_document.map(dirname),
            PrefixBase::Parent => current_document.map(|doc| dirname(&dirname(doc))),
        };

        match base_dir.as_deref().or(workspace_root) {
            Some(dir) => join_normalized(dir, relative),
            None => PathBuf::from(relative),
        }
    }

    /// Whether `path` starts with a configured prefix
    pub fn has_prefix(&self, path: &str) -> bool {
        self.prefixes.find_prefix(path).is_some()
    }

    /// True for prefixed paths and `./` / `../` relative paths; everything
    /// else (URLs, bare names) is treated as an opaque target.
    pub fn looks_like_path(&self, href: &str) -> bool {
        self.has_prefix(href) || href.starts_with("./") || href.starts_with("../")
    }

    /// All configured prefixes, in lookup order
    pub fn available_prefixes(&self) -> Vec<&str> {
        self.prefixes.iter().map(|p| p.prefix.as_str()).collect()
    }

    /// Human description of a prefix
    pub fn prefix_description(&self, prefix: &str) -> Option<&str> {
        self.prefixes.get(prefix).map(|p| p.description.as_str())
    }

    pub fn prefixes(&self) -> &PathPrefixTable {
        &self.prefixes
    }
}

/// Directory part of a path; a bare file name lives in `.`.
pub(crate) fn dirname(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if parent.as_os_str().is_empty() => PathBuf::from("."),
        Some(parent) => parent.to_path_buf(),
        None => path.to_path_buf(),
    }
}
