use crate::aggregator::{collect_skipped, collect_unique, relative_common_files, sort_by_bytes};
use crate::diff_engine::DiffEngine;
use crate::hasher::Hasher;
use crate::tree_walker::TreeWalker;
use std::fs;
use std::path::Path;
use tracing::{debug, info};
use treecmp_common::{AppConfig, RunResult, TreeCmpError};

/// Fail with `InvalidRoot` unless `path` is an existing directory
pub fn validate_root(path: &Path) -> Result<(), TreeCmpError> {
    if path.is_dir() {
        Ok(())
    } else {
        Err(TreeCmpError::InvalidRoot(path.to_path_buf()))
    }
}

/// Fail with `SameRoot` when both paths resolve to one directory
fn ensure_distinct(left_root: &Path, right_root: &Path) -> Result<(), TreeCmpError> {
    if fs::canonicalize(left_root)? == fs::canonicalize(right_root)? {
        return Err(TreeCmpError::SameRoot {
            left: left_root.to_path_buf(),
            right: right_root.to_path_buf(),
        });
    }
    Ok(())
}

/// Compare two directory trees and reclaim identical left-side files
///
/// Both roots are validated before any work starts. Any I/O failure after
/// that aborts the run.
pub fn compare(left_root: &Path, right_root: &Path, config: &AppConfig) -> Result<RunResult, TreeCmpError> {
    validate_root(left_root)?;
    validate_root(right_root)?;
    ensure_distinct(left_root, right_root)?;

    info!("Comparing:");
    info!("  Left:  {}", left_root.display());
    info!("  Right: {}", right_root.display());

    let walker = TreeWalker::new(config);
    let tree = walker.compare(left_root, right_root)?;

    let unique = collect_unique(&tree);
    let mut skipped = collect_skipped(&tree);
    let common = relative_common_files(&tree, left_root)?;

    let engine = DiffEngine::new(Hasher::new(config.hash_algorithm))
        .with_jobs(config.jobs)
        .with_reclaim(config.reclaim);
    let outcome = engine.diff(left_root, right_root, &common)?;

    skipped.extend(outcome.skipped);
    sort_by_bytes(&mut skipped, |path| path);

    debug!(
        "Run finished: {} unique, {} differing, {} reclaimed, {} skipped",
        unique.len(),
        outcome.differing.len(),
        outcome.reclaimed.len(),
        skipped.len()
    );

    Ok(RunResult {
        left_root: left_root.to_path_buf(),
        right_root: right_root.to_path_buf(),
        unique,
        differing: outcome.differing,
        reclaimed: outcome.reclaimed,
        skipped,
    })
}
