/*!
 * StitchFS - Stitch directory contents into a single context file
 *
 * This library walks a directory tree, selects files through layered
 * gitignore-style rules, classifies their contents, and renders one
 * Markdown or plain-text artifact for use as context for Large Language
 * Models.
 */

pub mod classify;
pub mod config;
pub mod error;
pub mod ignore;
pub mod pattern;
pub mod report;
pub mod scanner;
pub mod types;
pub mod utils;
pub mod writer;


// Re-export main components for easier access
pub use classify::{classify, classify_all};
pub use config::{Config, OutputFormat, Preset};
pub use error::{Result, StitchError};
pub use ignore::IgnoreResolver;
pub use pattern::{PatternRule, PatternSet};
pub use report::{FileReportInfo, ReportFormat, Reporter, ScanReport};
pub use scanner::{ScanOutcome, Scanner};
pub use types::{Candidate, FileVerdict, SkippedEntry, TreeKind, TreeNode, Verdict};
pub use utils::format_file_size;
pub use writer::ContextWriter;

/// Version of the library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
