pub mod aggregator;
pub mod diff_engine;
pub mod hasher;
pub mod reporter;
pub mod session;
pub mod size;
pub mod tree_walker;

pub use diff_engine::{DiffEngine, DiffOutcome};
pub use hasher::Hasher;
pub use reporter::{JsonReporter, Reporter, TextReporter};
pub use session::{compare, validate_root};
pub use size::human_size;
pub use tree_walker::TreeWalker;
