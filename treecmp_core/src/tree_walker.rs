use ignore::gitignore::{Gitignore, GitignoreBuilder};
use std::collections::BTreeMap;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use treecmp_common::{AppConfig, DirectoryNode, EntryKind, TreeCmpError, TypeConflictPolicy};

/// Builds a `DirectoryNode` tree by diffing two directory listings per level
pub struct TreeWalker {
    follow_symlinks: bool,
    type_conflict: TypeConflictPolicy,
    ignore: Option<Gitignore>,
}

impl TreeWalker {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            follow_symlinks: config.follow_symlinks,
            type_conflict: config.type_conflict,
            ignore: Self::build_ignore(&config.effective_ignore_patterns()),
        }
    }

    /// Build a Gitignore from the configured patterns
    fn build_ignore(patterns: &[String]) -> Option<Gitignore> {
        if patterns.is_empty() {
            return None;
        }

        let mut builder = GitignoreBuilder::new("");
        for pattern in patterns {
            if let Err(err) = builder.add_line(None, pattern) {
                warn!("Ignoring invalid pattern '{}': {}", pattern, err);
            } else {
                debug!("Added ignore pattern: {}", pattern);
            }
        }

        match builder.build() {
            Ok(ignore) => Some(ignore),
            Err(e) => {
                warn!("Failed to build ignore matcher: {}", e);
                None
            }
        }
    }

    /// Compare two roots recursively
    pub fn compare(&self, left_root: &Path, right_root: &Path) -> Result<DirectoryNode, TreeCmpError> {
        info!("Analyzing directories...");
        let root = self.compare_level(
            left_root.to_path_buf(),
            right_root.to_path_buf(),
            Path::new(""),
        )?;
        debug!("Built comparison tree with {} nodes", root.node_count());
        Ok(root)
    }

    fn compare_level(
        &self,
        left: PathBuf,
        right: PathBuf,
        relative: &Path,
    ) -> Result<DirectoryNode, TreeCmpError> {
        let left_entries = self.list(&left, relative)?;
        let mut right_entries = self.list(&right, relative)?;

        let mut node = DirectoryNode::new(left, right);

        for (name, left_kind) in left_entries {
            let Some(right_kind) = right_entries.remove(&name) else {
                node.left_only.insert(name, left_kind);
                continue;
            };

            match self.resolve(left_kind, right_kind) {
                Some(EntryKind::File) => {
                    node.common_files.insert(name);
                }
                Some(EntryKind::Dir) => {
                    node.common_subdirs.insert(name);
                }
                _ => {
                    warn!(
                        "Skipping {} ({:?} on the left, {:?} on the right)",
                        relative.join(&name).display(),
                        left_kind,
                        right_kind
                    );
                    node.common_other.insert(name);
                }
            }
        }
        node.right_only = right_entries;

        for name in &node.common_subdirs {
            let child = self.compare_level(
                node.left_path.join(name),
                node.right_path.join(name),
                &relative.join(name),
            )?;
            node.children.insert(name.clone(), child);
        }

        Ok(node)
    }

    /// Resolve the kind of a name present on both sides
    fn resolve(&self, left: EntryKind, right: EntryKind) -> Option<EntryKind> {
        match (left, right) {
            (EntryKind::Other, _) | (_, EntryKind::Other) => None,
            (l, r) if l == r => Some(l),
            (l, r) => match self.type_conflict {
                TypeConflictPolicy::Left => {
                    warn!("Type conflict ({:?} vs {:?}), using the left side's kind", l, r);
                    Some(l)
                }
                TypeConflictPolicy::Skip => None,
            },
        }
    }

    /// List the entries directly under `dir`, keyed by name
    fn list(&self, dir: &Path, relative: &Path) -> Result<BTreeMap<OsString, EntryKind>, TreeCmpError> {
        let list_err = |source| TreeCmpError::ListDir {
            path: dir.to_path_buf(),
            source,
        };

        let mut entries = BTreeMap::new();
        for entry in fs::read_dir(dir).map_err(list_err)? {
            let entry = entry.map_err(list_err)?;
            let name = entry.file_name();
            let kind = self.entry_kind(&entry);

            if self.is_ignored(&relative.join(&name), kind == EntryKind::Dir) {
                debug!("Ignored {}", relative.join(&name).display());
                continue;
            }

            entries.insert(name, kind);
        }

        Ok(entries)
    }

    fn entry_kind(&self, entry: &fs::DirEntry) -> EntryKind {
        let file_type = if self.follow_symlinks {
            fs::metadata(entry.path()).map(|meta| meta.file_type())
        } else {
            entry.file_type()
        };

        match file_type {
            Ok(ft) if ft.is_dir() => EntryKind::Dir,
            Ok(ft) if ft.is_file() => EntryKind::File,
            Ok(_) => EntryKind::Other,
            Err(e) => {
                debug!("Cannot resolve {}: {}", entry.path().display(), e);
                EntryKind::Other
            }
        }
    }

    fn is_ignored(&self, relative: &Path, is_dir: bool) -> bool {
        self.ignore
            .as_ref()
            .map_or(false, |ignore| ignore.matched(relative, is_dir).is_ignore())
    }
}
