/*!
 * Configuration handling for stitchfs
 */

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use clap_complete::Shell;
use encoding_rs::Encoding;
use strum::{Display, EnumString};

use crate::error::Result;
use crate::utils::{parse_size, PRESET_NODE, PRESET_PYTHON};

/// Named bundle of ignore patterns for a language/stack ecosystem
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Display, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Preset {
    /// Interpreter caches, virtualenvs and build output
    Python,
    /// node_modules, bundler output and logs
    Node,
}

impl Preset {
    /// Ignore patterns bundled with this preset
    pub fn patterns(&self) -> &'static [&'static str] {
        match self {
            Self::Python => PRESET_PYTHON.as_slice(),
            Self::Node => PRESET_NODE.as_slice(),
        }
    }
}

/// Output artifact format
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Display, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum OutputFormat {
    /// Markdown with fenced code blocks
    Md,
    /// Plain text with BEGIN/END markers
    Txt,
}

impl OutputFormat {
    /// File extension for the artifact
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Md => "md",
            Self::Txt => "txt",
        }
    }
}

/// Command-line arguments for stitchfs
#[derive(Parser, Debug, Clone)]
#[clap(
    name = "stitchfs",
    version = env!("CARGO_PKG_VERSION"),
    about = "Stitch directory contents into a single context file",
    long_about = "Walks a directory tree and stitches a folder-tree view plus the contents of every included text file into one Markdown or plain-text artifact, for use as context for Large Language Models (LLMs)."
)]
pub struct Args {
    /// Root directory to stitch
    #[clap(default_value = ".")]
    pub root: String,

    /// Output file path (default: .stitchfs.context.<ext> in the current directory)
    #[clap(long)]
    pub output: Option<String>,

    /// Write to stdout instead of a file
    #[clap(long)]
    pub stdout: bool,

    /// Output format
    #[clap(long, value_enum, default_value_t = OutputFormat::Md)]
    pub format: OutputFormat,

    /// Path to a custom gitignore file to respect
    #[clap(long)]
    pub gitignore: Option<String>,

    /// Do not respect .gitignore even if present
    #[clap(long)]
    pub no_gitignore: bool,

    /// Language/stack preset of additional ignore patterns
    #[clap(long, value_enum)]
    pub preset: Option<Preset>,

    /// Extra ignore pattern, repeatable or comma-separated
    #[clap(long = "ignore", value_delimiter = ',')]
    pub ignore_patterns: Vec<String>,

    /// Include dotfiles and dot-directories
    #[clap(long)]
    pub include_hidden: bool,

    /// Skip files larger than SIZE (e.g. 500k, 2m)
    #[clap(long, default_value = "1m", value_name = "SIZE")]
    pub max_file_size: String,

    /// Follow symbolic links
    #[clap(long)]
    pub follow_symlinks: bool,

    /// Preferred text encoding for file contents
    #[clap(long, default_value = "utf-8")]
    pub encoding: String,

    /// Suppress the progress bar and final report
    #[clap(long)]
    pub quiet: bool,

    /// Generate shell completions
    #[clap(long = "generate", value_enum)]
    pub generate: Option<Shell>,
}

/// Application configuration
#[derive(Clone, Debug)]
pub struct Config {
    /// Root directory to process
    pub target_dir: PathBuf,

    /// Output file path
    pub output_file: PathBuf,

    /// Write the artifact to stdout instead of the output file
    pub to_stdout: bool,

    /// Output artifact format
    pub format: OutputFormat,

    /// Whether to respect a gitignore file
    pub use_gitignore: bool,

    /// Path to a custom gitignore file
    pub gitignore_path: Option<PathBuf>,

    /// Active ignore preset
    pub preset: Option<Preset>,

    /// User-supplied ignore patterns (highest precedence)
    pub extra_ignores: Vec<String>,

    /// Include dotfiles and dot-directories
    pub include_hidden: bool,

    /// Files strictly larger than this many bytes are skipped
    pub max_file_size: u64,

    /// Follow symbolic links during the walk
    pub follow_symlinks: bool,

    /// Preferred text encoding
    pub encoding: &'static Encoding,

    /// Suppress progress and report output
    pub quiet: bool,
}

impl Config {
    /// Create configuration from command-line arguments. Size and encoding
    /// values are resolved here so bad ones fail before any traversal.
    pub fn from_args(args: Args) -> Result<Self> {
        let max_file_size = parse_size(&args.max_file_size)?;

        let encoding = Encoding::for_label(args.encoding.as_bytes())
            .ok_or_else(|| crate::error!(Config, "Unknown encoding: {:?}", args.encoding))?;

        let output_file = match args.output {
            Some(path) => PathBuf::from(path),
            None => PathBuf::from(format!(".stitchfs.context.{}", args.format.extension())),
        };

        Ok(Self {
            target_dir: PathBuf::from(args.root),
            output_file,
            to_stdout: args.stdout,
            format: args.format,
            use_gitignore: !args.no_gitignore,
            gitignore_path: args.gitignore.map(PathBuf::from),
            preset: args.preset,
            extra_ignores: args.ignore_patterns,
            include_hidden: args.include_hidden,
            max_file_size,
            follow_symlinks: args.follow_symlinks,
            encoding,
            quiet: args.quiet,
        })
    }

    /// Validate the configuration before traversal starts
    pub fn validate(&self) -> Result<()> {
        crate::ensure!(
            self.target_dir.is_dir(),
            PathNotFound,
            "Target directory not found: {}",
            self.target_dir.display()
        );

        if !self.to_stdout {
            if let Some(parent) = self.output_file.parent() {
                crate::ensure!(
                    parent.as_os_str().is_empty() || parent.exists(),
                    PathNotFound,
                    "Output directory not found: {}",
                    parent.display()
                );
            }
        }

        if let Some(path) = &self.gitignore_path {
            crate::ensure!(
                path.is_file(),
                Config,
                "Custom gitignore file not found: {}",
                path.display()
            );
        }

        Ok(())
    }
}
