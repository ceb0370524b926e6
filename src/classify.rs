/*!
 * File content classification
 *
 * Decides, per candidate file, whether its content is included in the
 * artifact: the size ceiling is checked from metadata alone, a bounded
 * prefix is sniffed for binary content, and only then is the remainder read
 * and decoded. Classification never fails: every outcome is a verdict.
 */

use std::fs::{self, File};
use std::io::Read;

use encoding_rs::Encoding;
use indicatif::ProgressBar;
use rayon::prelude::*;

use crate::config::Config;
use crate::types::{Candidate, FileVerdict, Verdict};

/// How many bytes of a file the binary sniff examines
const SNIFF_LEN: u64 = 8192;

/// Proportion of non-text bytes in the sniffed prefix above which a file is
/// treated as binary. An embedded NUL is binary regardless of this ratio.
const NON_TEXT_RATIO: f64 = 0.30;

/// Classify every candidate in parallel. Results come back in candidate
/// order; classification has no shared mutable state, so the files can be
/// processed independently.
pub fn classify_all(
    candidates: &[Candidate],
    config: &Config,
    progress: &ProgressBar,
) -> Vec<FileVerdict> {
    candidates
        .par_iter()
        .map(|candidate| {
            let verdict = classify(candidate, config.max_file_size, config.encoding);
            progress.inc(1);
            progress.set_message(display_name(candidate));
            verdict
        })
        .collect()
}

/// Classify a single candidate file
pub fn classify(
    candidate: &Candidate,
    max_file_size: u64,
    encoding: &'static Encoding,
) -> FileVerdict {
    let metadata = match fs::metadata(&candidate.abs_path) {
        Ok(metadata) => metadata,
        Err(e) => return unreadable(candidate, 0, e.to_string()),
    };
    let size = metadata.len();

    // Strictly greater: a file of exactly the ceiling is still included.
    if size > max_file_size {
        return FileVerdict {
            rel_path: candidate.rel_path.clone(),
            size,
            verdict: Verdict::SkippedOversize,
        };
    }

    let mut file = match File::open(&candidate.abs_path) {
        Ok(file) => file,
        Err(e) => return unreadable(candidate, size, e.to_string()),
    };

    let mut bytes = Vec::with_capacity(size.min(SNIFF_LEN) as usize);
    if let Err(e) = (&mut file).take(SNIFF_LEN).read_to_end(&mut bytes) {
        return unreadable(candidate, size, e.to_string());
    }

    if looks_binary(&bytes) {
        return FileVerdict {
            rel_path: candidate.rel_path.clone(),
            size,
            verdict: Verdict::SkippedBinary,
        };
    }

    // Prefix passed the sniff; pull in the rest of the file.
    if let Err(e) = file.read_to_end(&mut bytes) {
        return unreadable(candidate, size, e.to_string());
    }

    let (text, encoding_used, lossy) = decode_text(&bytes, encoding);
    FileVerdict {
        rel_path: candidate.rel_path.clone(),
        size,
        verdict: Verdict::Included {
            text,
            encoding: encoding_used,
            lossy,
        },
    }
}

/// Binary sniff over a content prefix. An embedded NUL byte is the hard
/// signal; otherwise the proportion of control bytes outside the common
/// text set (BEL, BS, TAB, LF, FF, CR, ESC) decides.
pub fn looks_binary(sample: &[u8]) -> bool {
    if sample.is_empty() {
        return false;
    }
    if sample.contains(&0) {
        return true;
    }

    let non_text = sample
        .iter()
        .filter(|&&b| b < 0x20 && !matches!(b, 0x07..=0x0a | 0x0c | 0x0d | 0x1b))
        .count();

    non_text as f64 / sample.len() as f64 > NON_TEXT_RATIO
}

/// Two-step decode: strict with the preferred encoding first, then a
/// permissive pass that substitutes U+FFFD for undecodable sequences.
/// Returns the text, the encoding actually used and whether the permissive
/// pass was needed.
fn decode_text(bytes: &[u8], encoding: &'static Encoding) -> (String, &'static str, bool) {
    match encoding.decode_without_bom_handling_and_without_replacement(bytes) {
        Some(text) => (text.into_owned(), encoding.name(), false),
        None => {
            let (text, used, _) = encoding.decode(bytes);
            (text.into_owned(), used.name(), true)
        }
    }
}

fn unreadable(candidate: &Candidate, size: u64, reason: String) -> FileVerdict {
    FileVerdict {
        rel_path: candidate.rel_path.clone(),
        size,
        verdict: Verdict::SkippedUnreadable { reason },
    }
}

/// Progress-bar label for the file being processed, truncated to keep the
/// bar on one line.
fn display_name(candidate: &Candidate) -> String {
    let name = candidate.rel_path.to_string_lossy();
    if name.len() > 40 {
        format!("...{}", &name[name.len().saturating_sub(37)..])
    } else {
        name.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::path::{Path, PathBuf};

    use encoding_rs::UTF_8;
    use tempfile::tempdir;

    fn candidate(abs: &Path, rel: &str) -> Candidate {
        Candidate {
            abs_path: abs.to_path_buf(),
            rel_path: PathBuf::from(rel),
        }
    }

    fn write_file(dir: &Path, name: &str, bytes: &[u8]) -> PathBuf {
        let path = dir.join(name);
        let mut file = File::create(&path).unwrap();
        file.write_all(bytes).unwrap();
        path
    }

    #[test]
    fn test_plain_text_is_included_strict() {
        let dir = tempdir().unwrap();
        let path = write_file(dir.path(), "a.txt", b"hello world\n");
        let verdict = classify(&candidate(&path, "a.txt"), 1024, UTF_8);

        assert_eq!(verdict.size, 12);
        match verdict.verdict {
            Verdict::Included {
                ref text, lossy, ..
            } => {
                assert_eq!(text, "hello world\n");
                assert!(!lossy);
            }
            other => panic!("expected Included, got {:?}", other),
        }
    }

    #[test]
    fn test_size_boundary_is_strict() {
        let dir = tempdir().unwrap();
        let path = write_file(dir.path(), "exact.txt", &[b'x'; 64]);

        let at_limit = classify(&candidate(&path, "exact.txt"), 64, UTF_8);
        assert!(at_limit.is_included());

        let over_limit = classify(&candidate(&path, "exact.txt"), 63, UTF_8);
        assert_eq!(over_limit.verdict, Verdict::SkippedOversize);
    }

    #[test]
    fn test_nul_byte_means_binary() {
        let dir = tempdir().unwrap();
        let path = write_file(dir.path(), "blob", b"ab\x00cd");
        let verdict = classify(&candidate(&path, "blob"), 1024, UTF_8);
        assert_eq!(verdict.verdict, Verdict::SkippedBinary);
    }

    #[test]
    fn test_invalid_utf8_falls_back_to_lossy() {
        let dir = tempdir().unwrap();
        let path = write_file(dir.path(), "latin.txt", b"caf\xe9\n");
        let verdict = classify(&candidate(&path, "latin.txt"), 1024, UTF_8);

        match verdict.verdict {
            Verdict::Included { ref text, lossy, .. } => {
                assert!(lossy);
                assert!(text.contains('\u{FFFD}'));
            }
            other => panic!("expected lossy Included, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_file_is_unreadable() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("gone.txt");
        let verdict = classify(&candidate(&path, "gone.txt"), 1024, UTF_8);
        assert!(matches!(
            verdict.verdict,
            Verdict::SkippedUnreadable { .. }
        ));
    }

    #[test]
    fn test_empty_file_is_included() {
        let dir = tempdir().unwrap();
        let path = write_file(dir.path(), "empty", b"");
        let verdict = classify(&candidate(&path, "empty"), 1024, UTF_8);
        assert!(verdict.is_included());
    }

    #[test]
    fn test_sniff_control_byte_ratio() {
        assert!(!looks_binary(b"normal text with\ttabs\nand newlines\n"));
        assert!(looks_binary(&[0x01, 0x02, 0x03, b'a']));
        assert!(!looks_binary(&[]));
    }
}
