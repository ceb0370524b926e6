/*!
 * Core types and data structures for the stitchfs application
 */

use std::path::PathBuf;

/// The kind of a node in the rendered directory tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeKind {
    /// Directory containing other entries
    Directory,
    /// Regular file
    File,
    /// Symbolic link, with its target as read from the link itself
    Symlink {
        /// Target of the symlink
        target: String,
    },
}

/// One node of the directory tree built during the walk, used for rendering
/// the tree view. Children are stored in traversal order.
#[derive(Debug, Clone)]
pub struct TreeNode {
    /// Entry name (no path separators)
    pub name: String,
    /// What kind of entry this node represents
    pub kind: TreeKind,
    /// Child nodes, empty for leaves
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    /// Create a leaf or internal node with no children yet
    pub fn new(name: String, kind: TreeKind) -> Self {
        Self {
            name,
            kind,
            children: Vec::new(),
        }
    }

    /// True if this node represents a directory
    pub fn is_dir(&self) -> bool {
        self.kind == TreeKind::Directory
    }
}

/// A file that survived ignore, hidden and symlink filtering and is eligible
/// for content classification.
#[derive(Debug, Clone)]
pub struct Candidate {
    /// Absolute path used for reading
    pub abs_path: PathBuf,
    /// Path relative to the scan root, used for ordering and display
    pub rel_path: PathBuf,
}

/// An entry the walker could not fully examine (stat or listing failure).
/// Recorded for reporting; never aborts the walk.
#[derive(Debug, Clone)]
pub struct SkippedEntry {
    /// Path relative to the scan root
    pub rel_path: PathBuf,
    /// Why the entry was skipped
    pub reason: String,
}

/// Classification outcome for one candidate file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// Text content was decoded and will be included in the output
    Included {
        /// Decoded file content
        text: String,
        /// Name of the encoding actually used
        encoding: &'static str,
        /// True if undecodable sequences were replaced with U+FFFD
        lossy: bool,
    },
    /// Binary sniff fired; content is not included
    SkippedBinary,
    /// File size exceeds the configured ceiling
    SkippedOversize,
    /// Content could not be read
    SkippedUnreadable {
        /// Underlying cause, kept for diagnostics
        reason: String,
    },
}

/// The final classification for one candidate file. Created once by the
/// classifier and never mutated afterwards.
#[derive(Debug, Clone)]
pub struct FileVerdict {
    /// Path relative to the scan root
    pub rel_path: PathBuf,
    /// File size in bytes
    pub size: u64,
    /// Classification outcome
    pub verdict: Verdict,
}

impl FileVerdict {
    /// True if the file's content made it into the output
    pub fn is_included(&self) -> bool {
        matches!(self.verdict, Verdict::Included { .. })
    }
}
