/*!
 * Utility functions for stitchfs
 */

use std::collections::HashMap;
use std::path::Path;

use once_cell::sync::Lazy;

use crate::error::Result;

/// Parse a human-friendly size string such as `512`, `500k`, `2m` or `1g`
/// into a byte count.
pub fn parse_size(input: &str) -> Result<u64> {
    let s = input.trim().to_lowercase();
    crate::ensure!(!s.is_empty(), Config, "Invalid size value: {:?}", input);

    let (number, factor) = match s.as_bytes()[s.len() - 1] {
        b'k' => (&s[..s.len() - 1], 1024u64),
        b'm' => (&s[..s.len() - 1], 1024 * 1024),
        b'g' => (&s[..s.len() - 1], 1024 * 1024 * 1024),
        _ => (s.as_str(), 1),
    };

    let value: f64 = number
        .parse()
        .map_err(|_| crate::error!(Config, "Invalid size value: {:?}", input))?;
    crate::ensure!(
        value.is_finite() && value >= 0.0,
        Config,
        "Invalid size value: {:?}",
        input
    );

    Ok((value * factor as f64) as u64)
}

/// Format a human-readable file size
pub fn format_file_size(size: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if size >= GB {
        format!("{:.2} GB", size as f64 / GB as f64)
    } else if size >= MB {
        format!("{:.2} MB", size as f64 / MB as f64)
    } else if size >= KB {
        format!("{:.2} KB", size as f64 / KB as f64)
    } else {
        format!("{} bytes", size)
    }
}

/// Patterns ignored regardless of gitignore, preset or user patterns.
/// Lowest precedence: a user negation can re-include any of these.
pub static DEFAULT_IGNORE: Lazy<Vec<&'static str>> = Lazy::new(|| {
    vec![
        // Version control metadata
        ".git/",
        ".svn/",
        ".hg/",
        // OS droppings
        ".DS_Store",
        "Thumbs.db",
        // IDE state
        ".idea/",
        ".vscode/",
        // Obvious binaries
        "*.exe",
        "*.dll",
        "*.bin",
    ]
});

/// Ignore patterns bundled with the `python` preset
pub static PRESET_PYTHON: Lazy<Vec<&'static str>> = Lazy::new(|| {
    vec![
        "__pycache__/",
        "*.py[cod]",
        ".mypy_cache/",
        ".pytest_cache/",
        ".tox/",
        ".venv/",
        "venv/",
        "env/",
        "build/",
        "dist/",
        "*.egg-info/",
    ]
});

/// Ignore patterns bundled with the `node` preset
pub static PRESET_NODE: Lazy<Vec<&'static str>> = Lazy::new(|| {
    vec![
        "node_modules/",
        "dist/",
        "build/",
        ".next/",
        ".nuxt/",
        ".cache/",
        "coverage/",
        "*.log",
    ]
});

/// Extension to fenced-code-block language tag
static LANG_BY_EXT: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("py", "python"),
        ("js", "javascript"),
        ("ts", "typescript"),
        ("tsx", "tsx"),
        ("jsx", "jsx"),
        ("json", "json"),
        ("yml", "yaml"),
        ("yaml", "yaml"),
        ("toml", "toml"),
        ("ini", "ini"),
        ("cfg", "ini"),
        ("md", "markdown"),
        ("sh", "bash"),
        ("zsh", "bash"),
        ("ps1", "powershell"),
        ("rb", "ruby"),
        ("go", "go"),
        ("rs", "rust"),
        ("java", "java"),
        ("kt", "kotlin"),
        ("c", "c"),
        ("h", "c"),
        ("cpp", "cpp"),
        ("hpp", "cpp"),
        ("cs", "csharp"),
        ("php", "php"),
        ("sql", "sql"),
        ("html", "html"),
        ("css", "css"),
        ("vue", "vue"),
        ("sv", "verilog"),
    ])
});

/// Language tag for a file's fenced code block, empty when unknown
pub fn language_for_path(path: &Path) -> &'static str {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_lowercase())
        .and_then(|ext| LANG_BY_EXT.get(ext.as_str()).copied())
        .unwrap_or("")
}
