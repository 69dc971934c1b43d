use crate::hasher::Hasher;
use crate::size::human_size;
use rayon::prelude::*;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use treecmp_common::{DifferingPair, ReclaimMode, ReclaimedFile, TreeCmpError};

/// Result of diffing the common file list
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiffOutcome {
    pub differing: Vec<DifferingPair>,
    pub reclaimed: Vec<ReclaimedFile>,
    /// Left paths that resolve to the same file as their right counterpart
    pub skipped: Vec<PathBuf>,
}

/// Classification of one common path
#[derive(Debug)]
enum Verdict {
    Identical {
        relative_path: PathBuf,
        left_path: PathBuf,
        size: u64,
    },
    Differing(DifferingPair),
    /// Both sides resolve to one file on disk; never reclaimed
    SameFile(PathBuf),
}

/// Hashes common files pairwise and reclaims confirmed left-side duplicates
///
/// Runs in two passes: every pair is classified first, and deletions only
/// start once classification has finished without error.
pub struct DiffEngine {
    hasher: Hasher,
    jobs: usize,
    reclaim: ReclaimMode,
}

impl DiffEngine {
    pub fn new(hasher: Hasher) -> Self {
        Self {
            hasher,
            jobs: 1,
            reclaim: ReclaimMode::Delete,
        }
    }

    /// Number of hashing threads; 1 is sequential, 0 lets rayon decide
    pub fn with_jobs(mut self, jobs: usize) -> Self {
        self.jobs = jobs;
        self
    }

    pub fn with_reclaim(mut self, mode: ReclaimMode) -> Self {
        self.reclaim = mode;
        self
    }

    pub fn diff(
        &self,
        left_root: &Path,
        right_root: &Path,
        relative_paths: &[PathBuf],
    ) -> Result<DiffOutcome, TreeCmpError> {
        if relative_paths.is_empty() {
            debug!("No common files to hash");
            return Ok(DiffOutcome::default());
        }

        info!("Searching for file differences by computing hashes...");
        let verdicts = self.classify_all(left_root, right_root, relative_paths)?;

        let mut differing = Vec::new();
        let mut identical = Vec::new();
        let mut skipped = Vec::new();
        for verdict in verdicts {
            match verdict {
                Verdict::Differing(pair) => differing.push(pair),
                Verdict::SameFile(left_path) => skipped.push(left_path),
                Verdict::Identical {
                    relative_path,
                    left_path,
                    size,
                } => identical.push((relative_path, left_path, size)),
            }
        }

        info!(
            "{} identical, {} differing out of {} common files",
            identical.len(),
            differing.len(),
            relative_paths.len()
        );

        let reclaimed = self.reclaim_all(identical)?;
        Ok(DiffOutcome {
            differing,
            reclaimed,
            skipped,
        })
    }

    fn classify_all(
        &self,
        left_root: &Path,
        right_root: &Path,
        relative_paths: &[PathBuf],
    ) -> Result<Vec<Verdict>, TreeCmpError> {
        if self.jobs == 1 {
            return relative_paths
                .iter()
                .map(|relative| self.classify(left_root, right_root, relative, false))
                .collect();
        }

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.jobs)
            .build()
            .map_err(|e| TreeCmpError::Config(format!("Failed to build hashing pool: {}", e)))?;
        debug!("Hashing with {} threads", pool.current_num_threads());

        pool.install(|| {
            relative_paths
                .par_iter()
                .map(|relative| self.classify(left_root, right_root, relative, true))
                .collect()
        })
    }

    fn classify(
        &self,
        left_root: &Path,
        right_root: &Path,
        relative: &Path,
        parallel: bool,
    ) -> Result<Verdict, TreeCmpError> {
        let left_path = left_root.join(relative);
        let right_path = right_root.join(relative);

        // Followed symlinks can make both sides name one file
        if canonical(&left_path)? == canonical(&right_path)? {
            warn!(
                "Skipping {}: both sides resolve to the same file",
                relative.display()
            );
            return Ok(Verdict::SameFile(left_path));
        }

        let (left_fingerprint, right_fingerprint) = if parallel {
            let (left, right) = rayon::join(
                || self.hasher.hash(&left_path),
                || self.hasher.hash(&right_path),
            );
            (left?, right?)
        } else {
            (self.hasher.hash(&left_path)?, self.hasher.hash(&right_path)?)
        };

        let left_size = file_size(&left_path)?;

        if left_fingerprint == right_fingerprint {
            return Ok(Verdict::Identical {
                relative_path: relative.to_path_buf(),
                left_path,
                size: left_size,
            });
        }

        let right_size = file_size(&right_path)?;
        debug!("Differs: {}", relative.display());

        Ok(Verdict::Differing(DifferingPair {
            relative_path: relative.to_path_buf(),
            left_path,
            right_path,
            left_fingerprint,
            right_fingerprint,
            left_size,
            right_size,
        }))
    }

    fn reclaim_all(
        &self,
        identical: Vec<(PathBuf, PathBuf, u64)>,
    ) -> Result<Vec<ReclaimedFile>, TreeCmpError> {
        if self.reclaim == ReclaimMode::Keep {
            debug!("Reclamation disabled, keeping {} duplicates", identical.len());
            return Ok(Vec::new());
        }

        let mut reclaimed = Vec::with_capacity(identical.len());
        for (relative_path, left_path, size) in identical {
            match self.reclaim {
                ReclaimMode::Delete => {
                    fs::remove_file(&left_path).map_err(|source| TreeCmpError::Delete {
                        path: left_path.clone(),
                        source,
                    })?;
                    info!("Deleted {}", left_path.display());
                }
                ReclaimMode::Trash => {
                    trash::delete(&left_path).map_err(|e| TreeCmpError::Delete {
                        path: left_path.clone(),
                        source: io::Error::new(io::ErrorKind::Other, e.to_string()),
                    })?;
                    info!("Moved {} to trash", left_path.display());
                }
                ReclaimMode::DryRun | ReclaimMode::Keep => {
                    info!("DRY RUN: Would delete {}", left_path.display());
                }
            }

            reclaimed.push(ReclaimedFile {
                relative_path,
                left_path,
                size,
                mode: self.reclaim,
            });
        }

        let bytes: u64 = reclaimed.iter().map(|file| file.size).sum();
        info!("Reclaimed {} duplicates ({})", reclaimed.len(), human_size(bytes));
        Ok(reclaimed)
    }
}

fn canonical(path: &Path) -> Result<PathBuf, TreeCmpError> {
    fs::canonicalize(path).map_err(|source| TreeCmpError::Hash {
        path: path.to_path_buf(),
        source,
    })
}

fn file_size(path: &Path) -> Result<u64, TreeCmpError> {
    fs::metadata(path)
        .map(|meta| meta.len())
        .map_err(|source| TreeCmpError::Hash {
            path: path.to_path_buf(),
            source,
        })
}
