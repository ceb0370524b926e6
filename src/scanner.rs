/*!
 * Deterministic directory traversal
 *
 * Walks the target tree depth-first with children sorted by name, consulting
 * the ignore resolver at every entry. Ignored directories are pruned before
 * descent, so nothing below them is ever evaluated; a negation rule cannot
 * re-include a path whose parent was pruned. The walk produces the candidate
 * file list and the tree used for rendering in a single pass, plus a record
 * of entries it could not examine.
 */

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use indicatif::ProgressBar;

use crate::config::Config;
use crate::error::Result;
use crate::ignore::IgnoreResolver;
use crate::types::{Candidate, SkippedEntry, TreeKind, TreeNode};

/// Everything one walk produces. Candidate order matches tree order and is
/// stable across runs for an unchanged filesystem.
#[derive(Debug)]
pub struct ScanOutcome {
    /// Root of the render tree
    pub tree: TreeNode,
    /// Files eligible for classification, in traversal order
    pub candidates: Vec<Candidate>,
    /// Entries the walker could not stat or list
    pub skipped: Vec<SkippedEntry>,
}

/// Walker over the target directory
pub struct Scanner {
    /// Scanner configuration
    config: Config,
    /// Ignore decision engine, read-only during the walk
    resolver: IgnoreResolver,
    /// Progress bar
    pub progress: Arc<ProgressBar>,
    /// Absolute path of the output artifact, excluded from the walk
    output_file_abs: Option<PathBuf>,
}

impl Scanner {
    /// Create a new scanner
    pub fn new(config: Config, resolver: IgnoreResolver, progress: Arc<ProgressBar>) -> Self {
        let output_file_abs = resolve_output_file(&config);
        Self {
            config,
            resolver,
            progress,
            output_file_abs,
        }
    }

    /// Walk the target directory and return the candidates, the render tree
    /// and the skipped entries.
    pub fn scan(&self) -> Result<ScanOutcome> {
        let abs_root = fs::canonicalize(&self.config.target_dir)?;
        let root_name = abs_root
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string();

        let mut tree = TreeNode::new(root_name, TreeKind::Directory);
        let mut candidates = Vec::new();
        let mut skipped = Vec::new();
        // Canonical identities of the directories currently open on the
        // traversal stack; guards against symlink cycles.
        let mut open_dirs = vec![abs_root.clone()];

        self.walk_directory(
            &abs_root,
            Path::new(""),
            &mut tree,
            &mut open_dirs,
            &mut candidates,
            &mut skipped,
        );

        Ok(ScanOutcome {
            tree,
            candidates,
            skipped,
        })
    }

    fn walk_directory(
        &self,
        abs_dir: &Path,
        rel_dir: &Path,
        node: &mut TreeNode,
        open_dirs: &mut Vec<PathBuf>,
        candidates: &mut Vec<Candidate>,
        skipped: &mut Vec<SkippedEntry>,
    ) {
        let reader = match fs::read_dir(abs_dir) {
            Ok(reader) => reader,
            Err(e) => {
                skipped.push(SkippedEntry {
                    rel_path: rel_dir.to_path_buf(),
                    reason: format!("cannot list directory: {}", e),
                });
                return;
            }
        };

        let mut entries = Vec::new();
        for entry in reader {
            match entry {
                Ok(entry) => entries.push(entry),
                Err(e) => skipped.push(SkippedEntry {
                    rel_path: rel_dir.to_path_buf(),
                    reason: format!("unreadable directory entry: {}", e),
                }),
            }
        }
        // Byte-order name sort keeps the walk independent of OS directory
        // ordering.
        entries.sort_by_key(|entry| entry.file_name());

        for entry in entries {
            let name = entry.file_name().to_string_lossy().to_string();
            let rel_path = rel_dir.join(entry.file_name());
            let abs_path = entry.path();

            // Hidden-file policy comes first and is independent of ignore
            // rules.
            if !self.config.include_hidden && name.starts_with('.') {
                continue;
            }

            let file_type = match entry.file_type() {
                Ok(file_type) => file_type,
                Err(e) => {
                    skipped.push(SkippedEntry {
                        rel_path,
                        reason: format!("cannot stat: {}", e),
                    });
                    continue;
                }
            };

            if file_type.is_symlink() {
                self.visit_symlink(&abs_path, &rel_path, name, node, open_dirs, candidates, skipped);
            } else if file_type.is_dir() {
                if self.resolver.is_ignored(&rel_path, true) {
                    continue;
                }
                self.progress.set_message(format!("Scanning {}", rel_path.display()));

                let mut child = TreeNode::new(name, TreeKind::Directory);
                // A real directory's canonical identity is its parent's plus
                // its own name; no extra syscall needed.
                let canonical = open_dirs
                    .last()
                    .map(|parent| parent.join(entry.file_name()))
                    .unwrap_or_else(|| abs_path.clone());
                open_dirs.push(canonical);
                self.walk_directory(&abs_path, &rel_path, &mut child, open_dirs, candidates, skipped);
                open_dirs.pop();
                node.children.push(child);
            } else if file_type.is_file() {
                if self.resolver.is_ignored(&rel_path, false) {
                    continue;
                }
                if self.is_output_file(&abs_path) {
                    continue;
                }
                candidates.push(Candidate {
                    abs_path,
                    rel_path,
                });
                node.children.push(TreeNode::new(name, TreeKind::File));
            }
            // Sockets, fifos and device files are not stitchable; skip them.
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn visit_symlink(
        &self,
        abs_path: &Path,
        rel_path: &Path,
        name: String,
        node: &mut TreeNode,
        open_dirs: &mut Vec<PathBuf>,
        candidates: &mut Vec<Candidate>,
        skipped: &mut Vec<SkippedEntry>,
    ) {
        if !self.config.follow_symlinks {
            if self.resolver.is_ignored(rel_path, false) {
                return;
            }
            node.children
                .push(TreeNode::new(name, TreeKind::Symlink { target: link_target(abs_path) }));
            return;
        }

        let target_meta = match fs::metadata(abs_path) {
            Ok(metadata) => metadata,
            Err(e) => {
                skipped.push(SkippedEntry {
                    rel_path: rel_path.to_path_buf(),
                    reason: format!("broken symlink: {}", e),
                });
                return;
            }
        };

        if target_meta.is_dir() {
            if self.resolver.is_ignored(rel_path, true) {
                return;
            }
            let canonical = match fs::canonicalize(abs_path) {
                Ok(canonical) => canonical,
                Err(e) => {
                    skipped.push(SkippedEntry {
                        rel_path: rel_path.to_path_buf(),
                        reason: format!("cannot resolve symlink: {}", e),
                    });
                    return;
                }
            };
            // A link back into a directory already open on the stack would
            // recurse forever; record it as a leaf instead.
            if open_dirs.contains(&canonical) {
                node.children
                    .push(TreeNode::new(name, TreeKind::Symlink { target: link_target(abs_path) }));
                return;
            }

            let mut child = TreeNode::new(name, TreeKind::Directory);
            open_dirs.push(canonical);
            self.walk_directory(abs_path, rel_path, &mut child, open_dirs, candidates, skipped);
            open_dirs.pop();
            node.children.push(child);
        } else if target_meta.is_file() {
            if self.resolver.is_ignored(rel_path, false) {
                return;
            }
            if self.is_output_file(abs_path) {
                return;
            }
            candidates.push(Candidate {
                abs_path: abs_path.to_path_buf(),
                rel_path: rel_path.to_path_buf(),
            });
            node.children.push(TreeNode::new(name, TreeKind::File));
        }
    }

    /// The artifact must never stitch itself in
    fn is_output_file(&self, abs_path: &Path) -> bool {
        match &self.output_file_abs {
            Some(output) => {
                abs_path == output || fs::canonicalize(abs_path).map_or(false, |p| p == *output)
            }
            None => false,
        }
    }
}

/// Best-effort absolute path of the output file, for self-exclusion. The
/// file may not exist yet, so only its parent is canonicalized.
fn resolve_output_file(config: &Config) -> Option<PathBuf> {
    if config.to_stdout {
        return None;
    }
    let file_name = config.output_file.file_name()?;
    let parent = match config.output_file.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::canonicalize(parent).ok().map(|p| p.join(file_name))
}

/// Target of a symlink as read from the link itself, empty if unreadable
fn link_target(abs_path: &Path) -> String {
    fs::read_link(abs_path)
        .map(|target| target.to_string_lossy().to_string())
        .unwrap_or_default()
}
