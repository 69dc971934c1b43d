//! Flattens a comparison tree into sorted path lists.

use std::path::{Path, PathBuf};
use tracing::{debug, info};
use treecmp_common::{CommonFileList, DirectoryNode, TreeCmpError, UniqueEntry, UniqueFileSet};

/// Collect every entry unique to either side, depth-first, each side sorted
pub fn collect_unique(node: &DirectoryNode) -> UniqueFileSet {
    let mut unique = UniqueFileSet::default();
    collect_unique_into(node, &mut unique);
    sort_by_bytes(&mut unique.left, |entry| &entry.path);
    sort_by_bytes(&mut unique.right, |entry| &entry.path);
    debug!(
        "Found {} left-only and {} right-only entries",
        unique.left.len(),
        unique.right.len()
    );
    unique
}

fn collect_unique_into(node: &DirectoryNode, unique: &mut UniqueFileSet) {
    unique.left.extend(node.left_only.iter().map(|(name, kind)| UniqueEntry {
        path: node.left_path.join(name),
        kind: *kind,
    }));
    unique.right.extend(node.right_only.iter().map(|(name, kind)| UniqueEntry {
        path: node.right_path.join(name),
        kind: *kind,
    }));

    for child in node.children.values() {
        collect_unique_into(child, unique);
    }
}

/// Collect the left-side absolute path of every common file, sorted
pub fn collect_common_files(node: &DirectoryNode) -> Vec<PathBuf> {
    let mut files = Vec::new();
    collect_common_into(node, &mut files);
    sort_by_bytes(&mut files, |path| path);
    files
}

fn collect_common_into(node: &DirectoryNode, files: &mut Vec<PathBuf>) {
    files.extend(node.common_files.iter().map(|name| node.left_path.join(name)));
    for child in node.children.values() {
        collect_common_into(child, files);
    }
}

/// Common files relative to `left_root`, sorted
pub fn relative_common_files(
    node: &DirectoryNode,
    left_root: &Path,
) -> Result<CommonFileList, TreeCmpError> {
    info!("Building common files list...");
    let files = collect_common_files(node)
        .into_iter()
        .map(|path| {
            path.strip_prefix(left_root)
                .map(Path::to_path_buf)
                .map_err(|_| {
                    TreeCmpError::Path(format!(
                        "{} is not under {}",
                        path.display(),
                        left_root.display()
                    ))
                })
        })
        .collect::<Result<Vec<_>, _>>()?;
    debug!("Found {} common files", files.len());
    Ok(files)
}

/// Common entries excluded from hashing, as left-side paths
pub fn collect_skipped(node: &DirectoryNode) -> Vec<PathBuf> {
    let mut skipped: Vec<PathBuf> = node
        .common_other
        .iter()
        .map(|name| node.left_path.join(name))
        .collect();
    for child in node.children.values() {
        skipped.extend(collect_skipped(child));
    }
    sort_by_bytes(&mut skipped, |path| path);
    skipped
}

/// Sort by raw path bytes so output order matches a plain string sort
pub(crate) fn sort_by_bytes<T>(items: &mut [T], key: impl Fn(&T) -> &PathBuf) {
    items.sort_by(|a, b| key(a).as_os_str().cmp(key(b).as_os_str()));
}
