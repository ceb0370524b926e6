/*!
 * Integration test for the full stitch pipeline
 */

use std::fs::{self, File};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use indicatif::ProgressBar;
use tempfile::tempdir;

use stitchfs::classify::classify_all;
use stitchfs::config::{Config, OutputFormat};
use stitchfs::ignore::IgnoreResolver;
use stitchfs::scanner::Scanner;
use stitchfs::writer::ContextWriter;

fn base_config(root: PathBuf, output: PathBuf) -> Config {
    Config {
        target_dir: root,
        output_file: output,
        to_stdout: false,
        format: OutputFormat::Md,
        use_gitignore: true,
        gitignore_path: None,
        preset: None,
        extra_ignores: vec![],
        include_hidden: false,
        max_file_size: 1024 * 1024,
        follow_symlinks: false,
        encoding: encoding_rs::UTF_8,
        quiet: true,
    }
}

#[test]
fn test_full_pipeline_produces_markdown_bundle() {
    let temp_dir = tempdir().unwrap();
    let root = temp_dir.path();

    // A small project: source, docs, a log the gitignore drops, a vendored
    // binary, and an oversize fixture.
    fs::create_dir_all(root.join("src")).unwrap();
    fs::write(root.join("src/lib.rs"), "pub fn answer() -> u32 { 42 }\n").unwrap();
    fs::write(root.join("README.md"), "# Demo\n").unwrap();
    fs::write(root.join("debug.log"), "noise\n").unwrap();
    fs::write(root.join("asset.dat"), [0u8, 159, 146, 150]).unwrap();
    fs::write(root.join(".gitignore"), "*.log\n").unwrap();

    let mut big = File::create(root.join("big.txt")).unwrap();
    for _ in 0..200 {
        big.write_all(b"0123456789abcdef\n").unwrap();
    }

    let output = root.join("bundle.md");
    let mut config = base_config(root.to_path_buf(), output.clone());
    config.max_file_size = 1024;

    let resolver = IgnoreResolver::from_config(&config).unwrap();
    let scanner = Scanner::new(config.clone(), resolver, Arc::new(ProgressBar::hidden()));
    let outcome = scanner.scan().unwrap();

    // Deterministic candidate order, gitignored log excluded
    let rels: Vec<String> = outcome
        .candidates
        .iter()
        .map(|c| c.rel_path.display().to_string())
        .collect();
    assert_eq!(rels, vec!["README.md", "asset.dat", "big.txt", "src/lib.rs"]);

    let verdicts = classify_all(&outcome.candidates, &config, &ProgressBar::hidden());
    ContextWriter::new(config).write(&outcome.tree, &verdicts).unwrap();

    let artifact = fs::read_to_string(&output).unwrap();

    // Tree section lists what was walked
    assert!(artifact.contains("## Folder Tree"));
    assert!(artifact.contains("├── README.md"));
    assert!(artifact.contains("└── lib.rs"));
    assert!(!artifact.contains("debug.log"));

    // Included files carry fenced content with a language tag
    assert!(artifact.contains("### `src/lib.rs`"));
    assert!(artifact.contains("```rust\npub fn answer() -> u32 { 42 }\n```"));

    // Skipped candidates are annotated, not silently dropped
    assert!(artifact.contains("### `asset.dat`"));
    assert!(artifact.contains("[Skipped: binary file"));
    assert!(artifact.contains("### `big.txt`"));
    assert!(artifact.contains("[Skipped: file exceeds size limit"));

    // The artifact itself was not stitched in
    assert!(!artifact.contains("### `bundle.md`"));
}

#[test]
fn test_full_pipeline_respects_configured_encoding() {
    let temp_dir = tempdir().unwrap();
    let root = temp_dir.path();

    // 0xE9 is not valid UTF-8 but decodes cleanly as windows-1252.
    fs::write(root.join("menu.txt"), b"caf\xe9\n").unwrap();

    let output = root.join("bundle.txt");
    let mut config = base_config(root.to_path_buf(), output.clone());
    config.format = OutputFormat::Txt;
    config.encoding = encoding_rs::Encoding::for_label(b"windows-1252").unwrap();

    let resolver = IgnoreResolver::from_config(&config).unwrap();
    let scanner = Scanner::new(config.clone(), resolver, Arc::new(ProgressBar::hidden()));
    let outcome = scanner.scan().unwrap();
    let verdicts = classify_all(&outcome.candidates, &config, &ProgressBar::hidden());
    ContextWriter::new(config).write(&outcome.tree, &verdicts).unwrap();

    let artifact = fs::read_to_string(&output).unwrap();
    assert!(artifact.contains("--- BEGIN FILE: menu.txt ---"));
    assert!(artifact.contains("café\n"));
    // Strict decode succeeded, so no replacement-character note
    assert!(!artifact.contains("replacement characters"));
}
