/*!
 * Artifact rendering for stitchfs
 *
 * Turns the render tree and the classified file list into the final
 * Markdown or plain-text artifact and writes it to the output file or
 * stdout. The renderer consumes already-made selection decisions; it adds
 * no filtering of its own.
 */

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};

use chrono::Local;

use crate::config::{Config, OutputFormat};
use crate::error::Result;
use crate::types::{FileVerdict, TreeKind, TreeNode, Verdict};
use crate::utils::{format_file_size, language_for_path};

/// Writer for the stitched context artifact
pub struct ContextWriter {
    /// Writer configuration
    config: Config,
}

impl ContextWriter {
    /// Create a new writer
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Render the artifact and write it to the configured destination
    pub fn write(&self, tree: &TreeNode, verdicts: &[FileVerdict]) -> Result<()> {
        let artifact = self.render(tree, verdicts);

        if self.config.to_stdout {
            io::stdout().write_all(artifact.as_bytes())?;
            return Ok(());
        }

        let file = File::create(&self.config.output_file).map_err(|e| {
            crate::error!(
                Writer,
                "Cannot create {}: {}",
                self.config.output_file.display(),
                e
            )
        })?;
        let mut writer = BufWriter::new(file);
        writer.write_all(artifact.as_bytes())?;
        writer.flush()?;
        Ok(())
    }

    /// Render the artifact as a string
    pub fn render(&self, tree: &TreeNode, verdicts: &[FileVerdict]) -> String {
        match self.config.format {
            OutputFormat::Md => self.render_markdown(tree, verdicts),
            OutputFormat::Txt => self.render_text(tree, verdicts),
        }
    }

    fn root_label(&self) -> String {
        fs::canonicalize(&self.config.target_dir)
            .unwrap_or_else(|_| self.config.target_dir.clone())
            .display()
            .to_string()
    }

    fn render_markdown(&self, tree: &TreeNode, verdicts: &[FileVerdict]) -> String {
        let included = verdicts.iter().filter(|v| v.is_included()).count();
        let mut out = String::new();

        out.push_str("# StitchFS Output\n\n");
        out.push_str(&format!("- **Root**: `{}`\n", self.root_label()));
        out.push_str(&format!(
            "- **Generated**: {}\n",
            Local::now().format("%Y-%m-%d %H:%M:%S")
        ));
        out.push_str(&format!("- **Files included**: {}\n\n", included));

        out.push_str("## Folder Tree\n\n```text\n");
        for line in render_tree_lines(tree) {
            out.push_str(&line);
            out.push('\n');
        }
        out.push_str("```\n\n## Files\n\n");

        for verdict in verdicts {
            out.push_str(&format!("### `{}`\n\n", verdict.rel_path.display()));

            match &verdict.verdict {
                Verdict::Included {
                    text,
                    encoding,
                    lossy,
                } => {
                    if *lossy {
                        out.push_str(&format!(
                            "_Decoded as {} with replacement characters._\n\n",
                            encoding
                        ));
                    }
                    let lang = language_for_path(&verdict.rel_path);
                    out.push_str(&format!("```{}\n", lang));
                    out.push_str(text);
                    if !text.ends_with('\n') {
                        out.push('\n');
                    }
                    out.push_str("```\n\n");
                }
                other => {
                    out.push_str("```\n");
                    out.push_str(&skip_note(other, verdict.size));
                    out.push_str("\n```\n\n");
                }
            }
        }

        out
    }

    fn render_text(&self, tree: &TreeNode, verdicts: &[FileVerdict]) -> String {
        let mut out = String::new();

        out.push_str("StitchFS output\n");
        out.push_str(&format!("Root: {}\n", self.root_label()));
        out.push_str(&format!(
            "Generated: {}\n",
            Local::now().format("%Y-%m-%d %H:%M:%S")
        ));
        out.push_str(&"=".repeat(80));
        out.push_str("\n\nFOLDER TREE\n");
        out.push_str(&"-".repeat(80));
        out.push('\n');
        for line in render_tree_lines(tree) {
            out.push_str(&line);
            out.push('\n');
        }

        out.push_str("\nFILES\n");
        out.push_str(&"-".repeat(80));
        out.push('\n');

        for verdict in verdicts {
            let rel = verdict.rel_path.display();
            out.push_str(&format!("--- BEGIN FILE: {} ---\n", rel));
            match &verdict.verdict {
                Verdict::Included {
                    text,
                    encoding,
                    lossy,
                } => {
                    if *lossy {
                        out.push_str(&format!(
                            "(decoded as {} with replacement characters)\n",
                            encoding
                        ));
                    }
                    out.push_str(text);
                    if !text.ends_with('\n') {
                        out.push('\n');
                    }
                }
                other => {
                    out.push_str(&skip_note(other, verdict.size));
                    out.push('\n');
                }
            }
            out.push_str(&format!("--- END FILE: {} ---\n\n", rel));
        }

        out
    }
}

/// Annotation written in place of content for non-included candidates
fn skip_note(verdict: &Verdict, size: u64) -> String {
    match verdict {
        Verdict::SkippedBinary => {
            format!("[Skipped: binary file ({})]", format_file_size(size))
        }
        Verdict::SkippedOversize => {
            format!("[Skipped: file exceeds size limit ({})]", format_file_size(size))
        }
        Verdict::SkippedUnreadable { reason } => {
            format!("[Skipped: unreadable ({})]", reason)
        }
        Verdict::Included { .. } => String::new(),
    }
}

/// Render the tree view, one line per node
fn render_tree_lines(tree: &TreeNode) -> Vec<String> {
    let mut lines = vec![format!("{}/", tree.name)];
    render_children(&tree.children, "", &mut lines);
    lines
}

fn render_children(children: &[TreeNode], prefix: &str, lines: &mut Vec<String>) {
    for (index, child) in children.iter().enumerate() {
        let is_last = index == children.len() - 1;
        let branch = if is_last { "└── " } else { "├── " };

        let label = match &child.kind {
            TreeKind::Directory => format!("{}/", child.name),
            TreeKind::File => child.name.clone(),
            TreeKind::Symlink { target } if !target.is_empty() => {
                format!("{} -> {}", child.name, target)
            }
            TreeKind::Symlink { .. } => child.name.clone(),
        };
        lines.push(format!("{}{}{}", prefix, branch, label));

        if child.is_dir() {
            let extension = if is_last { "    " } else { "│   " };
            render_children(&child.children, &format!("{}{}", prefix, extension), lines);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{TreeKind, TreeNode};

    fn sample_tree() -> TreeNode {
        let mut root = TreeNode::new("proj".into(), TreeKind::Directory);
        let mut src = TreeNode::new("src".into(), TreeKind::Directory);
        src.children
            .push(TreeNode::new("main.rs".into(), TreeKind::File));
        root.children.push(src);
        root.children
            .push(TreeNode::new("README.md".into(), TreeKind::File));
        root
    }

    #[test]
    fn test_tree_rendering_branches() {
        let lines = render_tree_lines(&sample_tree());
        assert_eq!(
            lines,
            vec![
                "proj/",
                "├── src/",
                "│   └── main.rs",
                "└── README.md",
            ]
        );
    }

    #[test]
    fn test_symlink_label_shows_target() {
        let mut root = TreeNode::new("proj".into(), TreeKind::Directory);
        root.children.push(TreeNode::new(
            "link".into(),
            TreeKind::Symlink {
                target: "../elsewhere".into(),
            },
        ));
        let lines = render_tree_lines(&root);
        assert_eq!(lines[1], "└── link -> ../elsewhere");
    }

    #[test]
    fn test_skip_note_wording() {
        assert_eq!(
            skip_note(&Verdict::SkippedBinary, 2048),
            "[Skipped: binary file (2.00 KB)]"
        );
        assert_eq!(
            skip_note(&Verdict::SkippedOversize, 3 * 1024 * 1024),
            "[Skipped: file exceeds size limit (3.00 MB)]"
        );
    }
}
