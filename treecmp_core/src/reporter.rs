//! Rendering of run results.
//!
//! The text reporter writes the line protocol consumed by scripts:
//!
//! ```text
//! diff: <path>\t<algorithm>: <hex>\tsize: <human size>
//! unique: <path>[/]
//! NO DIFFERENCE FOUND :)
//! ```

use crate::size::human_size;
use serde::Serialize;
use std::io::Write;
use std::path::Path;
use treecmp_common::{DifferingPair, Fingerprint, RunResult, TreeCmpError, UniqueEntry};

pub const NO_DIFFERENCE: &str = "NO DIFFERENCE FOUND :)";

/// Sink for a finished comparison run
pub trait Reporter {
    fn report(&mut self, result: &RunResult) -> Result<(), TreeCmpError>;
}

/// Line-oriented reporter
pub struct TextReporter<W: Write> {
    out: W,
}

impl<W: Write> TextReporter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_diff_side(&mut self, path: &Path, fingerprint: &Fingerprint, size: u64) -> std::io::Result<()> {
        writeln!(
            self.out,
            "diff: {}\t{}: {}\tsize: {}",
            path.display(),
            fingerprint.algorithm.label(),
            fingerprint.hex,
            human_size(size)
        )
    }

    fn write_unique(&mut self, entries: &[UniqueEntry]) -> std::io::Result<()> {
        for entry in entries {
            let suffix = if entry.is_dir() { "/" } else { "" };
            writeln!(self.out, "unique: {}{}", entry.path.display(), suffix)?;
        }
        Ok(())
    }
}

impl<W: Write> Reporter for TextReporter<W> {
    fn report(&mut self, result: &RunResult) -> Result<(), TreeCmpError> {
        for pair in &result.differing {
            self.write_diff_side(&pair.left_path, &pair.left_fingerprint, pair.left_size)?;
            self.write_diff_side(&pair.right_path, &pair.right_fingerprint, pair.right_size)?;
        }

        self.write_unique(&result.unique.left)?;
        self.write_unique(&result.unique.right)?;

        if !result.has_differences() {
            writeln!(self.out, "{}", NO_DIFFERENCE)?;
        }

        self.out.flush()?;
        Ok(())
    }
}

/// Writes one pretty-printed JSON document per run
pub struct JsonReporter<W: Write> {
    out: W,
}

impl<W: Write> JsonReporter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

#[derive(Serialize)]
struct JsonReport {
    left: String,
    right: String,
    summary: JsonSummary,
    differing: Vec<JsonPair>,
    unique_left: Vec<JsonUnique>,
    unique_right: Vec<JsonUnique>,
    reclaimed: Vec<JsonReclaimed>,
    skipped: Vec<String>,
}

#[derive(Serialize)]
struct JsonSummary {
    differing: usize,
    left_only: usize,
    right_only: usize,
    reclaimed: usize,
    reclaimed_bytes: u64,
    skipped: usize,
    no_difference: bool,
}

#[derive(Serialize)]
struct JsonPair {
    path: String,
    algorithm: &'static str,
    left: JsonFileSide,
    right: JsonFileSide,
}

#[derive(Serialize)]
struct JsonFileSide {
    path: String,
    hash: String,
    size: u64,
}

#[derive(Serialize)]
struct JsonUnique {
    path: String,
    is_dir: bool,
}

#[derive(Serialize)]
struct JsonReclaimed {
    path: String,
    size: u64,
    dry_run: bool,
}

fn lossy(path: &Path) -> String {
    path.to_string_lossy().to_string()
}

fn json_pair(pair: &DifferingPair) -> JsonPair {
    JsonPair {
        path: lossy(&pair.relative_path),
        algorithm: pair.left_fingerprint.algorithm.label(),
        left: JsonFileSide {
            path: lossy(&pair.left_path),
            hash: pair.left_fingerprint.hex.clone(),
            size: pair.left_size,
        },
        right: JsonFileSide {
            path: lossy(&pair.right_path),
            hash: pair.right_fingerprint.hex.clone(),
            size: pair.right_size,
        },
    }
}

fn json_unique(entries: &[UniqueEntry]) -> Vec<JsonUnique> {
    entries
        .iter()
        .map(|entry| JsonUnique {
            path: lossy(&entry.path),
            is_dir: entry.is_dir(),
        })
        .collect()
}

fn build_json_report(result: &RunResult) -> JsonReport {
    JsonReport {
        left: lossy(&result.left_root),
        right: lossy(&result.right_root),
        summary: JsonSummary {
            differing: result.differing.len(),
            left_only: result.unique.left.len(),
            right_only: result.unique.right.len(),
            reclaimed: result.reclaimed.len(),
            reclaimed_bytes: result.reclaimed_bytes(),
            skipped: result.skipped.len(),
            no_difference: !result.has_differences(),
        },
        differing: result.differing.iter().map(json_pair).collect(),
        unique_left: json_unique(&result.unique.left),
        unique_right: json_unique(&result.unique.right),
        reclaimed: result
            .reclaimed
            .iter()
            .map(|file| JsonReclaimed {
                path: lossy(&file.left_path),
                size: file.size,
                dry_run: file.mode == treecmp_common::ReclaimMode::DryRun,
            })
            .collect(),
        skipped: result.skipped.iter().map(|path| lossy(path)).collect(),
    }
}

impl<W: Write> Reporter for JsonReporter<W> {
    fn report(&mut self, result: &RunResult) -> Result<(), TreeCmpError> {
        let report = build_json_report(result);
        serde_json::to_writer_pretty(&mut self.out, &report)
            .map_err(|e| TreeCmpError::Serialization(e.to_string()))?;
        writeln!(self.out)?;
        self.out.flush()?;
        Ok(())
    }
}
