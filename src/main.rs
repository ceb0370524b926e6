/*!
 * Command-line interface for StitchFS
 */

use std::io;
use std::sync::Arc;
use std::time::Instant;

use clap::{CommandFactory, Parser};
use indicatif::{ProgressBar, ProgressStyle};

use stitchfs::classify::classify_all;
use stitchfs::config::{Args, Config};
use stitchfs::ignore::IgnoreResolver;
use stitchfs::report::{ReportFormat, Reporter, ScanReport};
use stitchfs::scanner::Scanner;
use stitchfs::writer::ContextWriter;

fn main() -> io::Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Generate shell completions and exit
    if let Some(shell) = args.generate {
        let mut cmd = Args::command();
        let name = cmd.get_name().to_string();
        clap_complete::generate(shell, &mut cmd, name, &mut io::stdout());
        return Ok(());
    }

    // Create and validate configuration; all configuration errors surface
    // here, before any traversal
    let config = Config::from_args(args)?;
    config.validate()?;

    // Build the ignore resolver once from configuration
    let resolver = IgnoreResolver::from_config(&config)?;

    // Create progress bar
    let progress = if config.quiet {
        ProgressBar::hidden()
    } else {
        ProgressBar::new(0)
    };
    progress.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} {prefix:.bold.cyan} {wide_msg:.dim.white} {pos}/{len} ({percent}%) ⏱️  Elapsed: {elapsed_precise}")
            .unwrap(),
    );
    progress.enable_steady_tick(std::time::Duration::from_millis(100));
    progress.set_prefix("📊 Scanning");
    progress.set_message(format!(
        "📂 Scanning directory: {}",
        config.target_dir.display()
    ));

    // Start timing scan, classification and write together
    let start_time = Instant::now();

    // Walk the tree
    let scanner = Scanner::new(config.clone(), resolver, Arc::new(progress.clone()));
    let outcome = scanner.scan()?;

    progress.set_length(outcome.candidates.len() as u64);
    progress.set_position(0);
    progress.set_prefix("📊 Processing");
    progress.set_message(format!(
        "🔎 Found {} files to process",
        outcome.candidates.len()
    ));

    // Classify candidates in parallel; results come back in walk order
    let verdicts = classify_all(&outcome.candidates, &config, &progress);

    // Render and write the artifact
    let writer = ContextWriter::new(config.clone());
    writer.write(&outcome.tree, &verdicts)?;

    let total_duration = start_time.elapsed();
    progress.finish_and_clear();

    // Per-entry walk failures are warnings, not errors
    if !config.quiet {
        for entry in &outcome.skipped {
            eprintln!("Warning: skipped {}: {}", entry.rel_path.display(), entry.reason);
        }
    }

    // Print the report, unless it would pollute a stdout artifact
    if !config.quiet && !config.to_stdout {
        let scan_report = ScanReport::from_results(
            config.output_file.display().to_string(),
            total_duration,
            &verdicts,
            &outcome.skipped,
        );
        let reporter = Reporter::new(ReportFormat::ConsoleTable);
        reporter.print_report(&scan_report);
    }

    Ok(())
}
