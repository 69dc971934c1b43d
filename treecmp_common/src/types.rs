use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::ffi::OsString;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Kind of a directory entry as seen by the tree walk
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntryKind {
    File,
    Dir,
    /// Sockets, devices, FIFOs, broken links, and unfollowed symlinks
    Other,
}

/// One directory level of a two-sided comparison
///
/// Each node owns its children exclusively. The tree is built once by the
/// walker and never mutated afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirectoryNode {
    pub left_path: PathBuf,
    pub right_path: PathBuf,
    /// Names present only on the left, with the kind each one has there
    pub left_only: BTreeMap<OsString, EntryKind>,
    pub right_only: BTreeMap<OsString, EntryKind>,
    pub common_files: BTreeSet<OsString>,
    pub common_subdirs: BTreeSet<OsString>,
    /// Names present on both sides that resolve to neither a file nor a directory
    pub common_other: BTreeSet<OsString>,
    /// Keyed by common subdirectory name; keys always equal `common_subdirs`
    pub children: BTreeMap<OsString, DirectoryNode>,
}

impl DirectoryNode {
    pub fn new(left_path: PathBuf, right_path: PathBuf) -> Self {
        Self {
            left_path,
            right_path,
            ..Self::default()
        }
    }

    /// Total number of nodes in this subtree, including self
    pub fn node_count(&self) -> usize {
        1 + self.children.values().map(DirectoryNode::node_count).sum::<usize>()
    }
}

/// An entry that exists under only one root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UniqueEntry {
    pub path: PathBuf,
    pub kind: EntryKind,
}

impl UniqueEntry {
    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Dir
    }
}

/// Entries unique to each side, each list sorted by path bytes
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UniqueFileSet {
    pub left: Vec<UniqueEntry>,
    pub right: Vec<UniqueEntry>,
}

impl UniqueFileSet {
    pub fn is_empty(&self) -> bool {
        self.left.is_empty() && self.right.is_empty()
    }

    pub fn len(&self) -> usize {
        self.left.len() + self.right.len()
    }
}

/// Sorted relative paths of every file present by name on both sides
pub type CommonFileList = Vec<PathBuf>;

/// Digest algorithm used to fingerprint file content
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HashAlgorithm {
    #[default]
    Sha1,
    Blake3,
}

impl HashAlgorithm {
    pub fn label(&self) -> &'static str {
        match self {
            HashAlgorithm::Sha1 => "sha1",
            HashAlgorithm::Blake3 => "blake3",
        }
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for HashAlgorithm {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sha1" => Ok(HashAlgorithm::Sha1),
            "blake3" => Ok(HashAlgorithm::Blake3),
            other => Err(format!("unknown hash algorithm: {other}")),
        }
    }
}

/// Hex digest of a file's content
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint {
    pub algorithm: HashAlgorithm,
    pub hex: String,
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.hex)
    }
}

/// How a name that is a file on one side and a directory on the other is resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeConflictPolicy {
    /// Use the left side's kind for both sides
    #[default]
    Left,
    /// Leave the name out of the comparison and log a warning
    Skip,
}

impl FromStr for TypeConflictPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "left" => Ok(TypeConflictPolicy::Left),
            "skip" => Ok(TypeConflictPolicy::Skip),
            other => Err(format!("unknown type conflict policy: {other}")),
        }
    }
}

/// What happens to the left copy of a confirmed-identical file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReclaimMode {
    /// Remove the file permanently
    #[default]
    Delete,
    /// Move the file to the platform trash
    Trash,
    /// Log what would be removed, touch nothing
    DryRun,
    /// Skip reclamation entirely
    Keep,
}

/// A common file whose fingerprints differ
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DifferingPair {
    pub relative_path: PathBuf,
    pub left_path: PathBuf,
    pub right_path: PathBuf,
    pub left_fingerprint: Fingerprint,
    pub right_fingerprint: Fingerprint,
    pub left_size: u64,
    pub right_size: u64,
}

/// A left-side duplicate that was (or would have been) reclaimed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReclaimedFile {
    pub relative_path: PathBuf,
    pub left_path: PathBuf,
    pub size: u64,
    pub mode: ReclaimMode,
}

/// Everything a single comparison run produces
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunResult {
    pub left_root: PathBuf,
    pub right_root: PathBuf,
    pub unique: UniqueFileSet,
    pub differing: Vec<DifferingPair>,
    pub reclaimed: Vec<ReclaimedFile>,
    /// Common entries left out of the comparison (special files, type conflicts)
    pub skipped: Vec<PathBuf>,
}

impl RunResult {
    pub fn has_differences(&self) -> bool {
        !self.unique.is_empty() || !self.differing.is_empty()
    }

    pub fn reclaimed_bytes(&self) -> u64 {
        self.reclaimed.iter().map(|file| file.size).sum()
    }
}
