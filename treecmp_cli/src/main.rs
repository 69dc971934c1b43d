use clap::Parser;
use std::io;
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use treecmp_common::{load_config, AppConfig, HashAlgorithm, ReclaimMode, TypeConflictPolicy};
use treecmp_core::{compare, human_size, validate_root, JsonReporter, Reporter, TextReporter};

#[derive(Parser, Debug)]
#[command(name = "treecmp")]
#[command(author = "treecmp Contributors")]
#[command(version = "0.1.0")]
#[command(
    about = "Compare two directory trees and reclaim identical files from the first one",
    long_about = None
)]
struct Cli {
    /// First (left) directory; identical files are deleted from here
    #[arg(long, default_value = "inspection")]
    dir1: PathBuf,

    /// Second (right) directory, never modified
    #[arg(long, default_value = "standard")]
    dir2: PathBuf,

    /// Ignore patterns (can be specified multiple times)
    #[arg(short, long)]
    ignore: Vec<String>,

    /// Do not skip version control directories (.git, .hg, CVS, ...)
    #[arg(long)]
    no_default_ignores: bool,

    /// Follow symbolic links
    #[arg(short = 'L', long)]
    follow_symlinks: bool,

    /// Digest used to fingerprint files
    #[arg(long)]
    algorithm: Option<HashAlgorithm>,

    /// How to treat a name that is a file on one side and a directory on the other
    #[arg(long, value_name = "left|skip")]
    type_conflict: Option<TypeConflictPolicy>,

    /// Hashing threads (0 = one per CPU)
    #[arg(short, long)]
    jobs: Option<usize>,

    /// Report identical files without deleting them
    #[arg(long, conflicts_with_all = ["keep", "trash"])]
    dry_run: bool,

    /// Do not reclaim identical files at all
    #[arg(long, conflicts_with = "trash")]
    keep: bool,

    /// Move identical files to the trash instead of deleting them
    #[arg(long)]
    trash: bool,

    /// Output results as JSON
    #[arg(long)]
    json: bool,

    /// Read configuration from next to the executable
    #[arg(long)]
    portable: bool,
}

impl Cli {
    /// Overlay command line flags on top of the loaded configuration
    fn apply(&self, config: &mut AppConfig) {
        config.ignore_patterns.extend(self.ignore.iter().cloned());
        if self.no_default_ignores {
            config.default_ignores = false;
        }
        if self.follow_symlinks {
            config.follow_symlinks = true;
        }
        if let Some(algorithm) = self.algorithm {
            config.hash_algorithm = algorithm;
        }
        if let Some(policy) = self.type_conflict {
            config.type_conflict = policy;
        }
        if let Some(jobs) = self.jobs {
            config.jobs = jobs;
        }
        if self.dry_run {
            config.reclaim = ReclaimMode::DryRun;
        } else if self.keep {
            config.reclaim = ReclaimMode::Keep;
        } else if self.trash {
            config.reclaim = ReclaimMode::Trash;
        }
    }
}

fn main() {
    // Logs go to stderr; stdout carries the report
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    // Invalid roots are rejected before touching configuration or the trees
    for root in [&cli.dir1, &cli.dir2] {
        if let Err(e) = validate_root(root) {
            println!("{}", e);
            std::process::exit(1);
        }
    }

    if let Err(e) = run(&cli) {
        error!("Comparison failed: {:#}", e);
        println!("error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let loaded = load_config(cli.portable)?;
    if loaded.exists {
        let kind = if loaded.portable { "portable " } else { "" };
        info!("Loaded {}configuration from {}", kind, loaded.path.display());
    }

    let mut config = loaded.config;
    cli.apply(&mut config);

    let result = compare(&cli.dir1, &cli.dir2, &config)?;

    let stdout = io::stdout();
    if cli.json {
        JsonReporter::new(stdout.lock()).report(&result)?;
    } else {
        TextReporter::new(stdout.lock()).report(&result)?;
    }

    if !result.reclaimed.is_empty() {
        info!(
            "{} {} identical files ({})",
            reclaim_verb(config.reclaim),
            result.reclaimed.len(),
            human_size(result.reclaimed_bytes())
        );
    }

    Ok(())
}

fn reclaim_verb(mode: ReclaimMode) -> &'static str {
    match mode {
        ReclaimMode::Delete => "Deleted",
        ReclaimMode::Trash => "Trashed",
        ReclaimMode::DryRun | ReclaimMode::Keep => "Would delete",
    }
}
