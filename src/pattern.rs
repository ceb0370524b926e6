/*!
 * Gitignore-style pattern parsing and matching
 *
 * Each pattern line becomes a `PatternRule`; an ordered group of rules from
 * one source (builtin defaults, a gitignore file, a preset, CLI patterns)
 * forms a `PatternSet`. Matching follows gitignore semantics: `*` and `?`
 * stop at path separators, `**` crosses them, a leading `/` (or any interior
 * `/`) anchors the pattern to the scan root, a trailing `/` restricts the
 * rule to directories, and a leading `!` negates it.
 */

use std::path::Path;

use globset::{GlobBuilder, GlobMatcher};

/// A single parsed ignore rule. Immutable once parsed.
#[derive(Debug, Clone)]
pub struct PatternRule {
    /// Original pattern line, kept for diagnostics
    raw: String,
    /// Compiled glob matcher
    matcher: GlobMatcher,
    /// Rule re-includes matching paths instead of excluding them
    negated: bool,
    /// Rule only applies to directories
    dir_only: bool,
}

impl PatternRule {
    /// Parse one pattern line. Returns `None` for blank and comment lines.
    /// Malformed globs degrade to literal matching; parsing never fails.
    fn parse(line: &str) -> Option<Self> {
        let line = line.trim_end();
        if line.trim().is_empty() || line.starts_with('#') {
            return None;
        }

        let (negated, rest) = match line.strip_prefix('!') {
            Some(rest) => (true, rest),
            None => (false, line),
        };

        let (dir_only, rest) = match rest.strip_suffix('/') {
            Some(stripped) if !stripped.ends_with('\\') => (true, stripped),
            _ => (false, rest),
        };

        // A leading slash anchors to the root; so does any interior slash,
        // per gitignore (`build/out` only matches at the top level).
        let (anchored, rest) = match rest.strip_prefix('/') {
            Some(stripped) => (true, stripped),
            None => (rest.contains('/'), rest),
        };
        if rest.is_empty() {
            return None;
        }

        let matcher = compile_glob(rest, anchored)
            .or_else(|| compile_glob(&globset::escape(rest), anchored))?;

        Some(Self {
            raw: line.to_string(),
            matcher,
            negated,
            dir_only,
        })
    }

    /// Does this rule match the given root-relative path?
    pub fn matches(&self, rel_path: &Path, is_dir: bool) -> bool {
        if self.dir_only && !is_dir {
            return false;
        }
        self.matcher.is_match(rel_path)
    }

    /// True if a match re-includes the path rather than excluding it
    pub fn negated(&self) -> bool {
        self.negated
    }

    /// The original pattern line
    pub fn raw(&self) -> &str {
        &self.raw
    }
}

/// Compile a stripped pattern into a matcher. Unanchored patterns are
/// compiled as `**/pattern` so they match any separator-aligned suffix.
fn compile_glob(pattern: &str, anchored: bool) -> Option<GlobMatcher> {
    let glob = if anchored {
        pattern.to_string()
    } else {
        format!("**/{}", pattern)
    };

    GlobBuilder::new(&glob)
        .literal_separator(true)
        .backslash_escape(true)
        .build()
        .ok()
        .map(|g| g.compile_matcher())
}

/// Ordered sequence of rules from a single source. Later rules override
/// earlier ones for the same path.
#[derive(Debug, Clone, Default)]
pub struct PatternSet {
    rules: Vec<PatternRule>,
}

impl PatternSet {
    /// Parse a sequence of pattern lines into a set, skipping blanks and
    /// comments.
    pub fn parse<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            rules: lines
                .into_iter()
                .filter_map(|line| PatternRule::parse(line.as_ref()))
                .collect(),
        }
    }

    /// The parsed rules, in source order
    pub fn rules(&self) -> &[PatternRule] {
        &self.rules
    }

    /// True if the set holds no rules
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn rule(line: &str) -> PatternRule {
        PatternRule::parse(line).expect("pattern should parse")
    }

    #[test]
    fn test_blank_and_comment_lines_are_skipped() {
        let set = PatternSet::parse(["", "   ", "# a comment", "*.log"]);
        assert_eq!(set.rules().len(), 1);
        assert_eq!(set.rules()[0].raw(), "*.log");
    }

    #[test]
    fn test_unanchored_pattern_matches_at_any_depth() {
        let r = rule("*.log");
        assert!(r.matches(Path::new("a.log"), false));
        assert!(r.matches(Path::new("deep/nested/b.log"), false));
        assert!(!r.matches(Path::new("a.txt"), false));
    }

    #[test]
    fn test_single_star_does_not_cross_separators() {
        let r = rule("src/*.rs");
        assert!(r.matches(Path::new("src/main.rs"), false));
        assert!(!r.matches(Path::new("src/deep/lib.rs"), false));
    }

    #[test]
    fn test_double_star_crosses_separators() {
        let r = rule("src/**/*.rs");
        assert!(r.matches(Path::new("src/a/b/lib.rs"), false));
    }

    #[test]
    fn test_question_mark_matches_one_non_separator() {
        let r = rule("file?.txt");
        assert!(r.matches(Path::new("file1.txt"), false));
        assert!(!r.matches(Path::new("file10.txt"), false));
        assert!(!r.matches(Path::new("file/.txt"), false));
    }

    #[test]
    fn test_character_class() {
        let r = rule("*.py[cod]");
        assert!(r.matches(Path::new("pkg/mod.pyc"), false));
        assert!(r.matches(Path::new("mod.pyo"), false));
        assert!(!r.matches(Path::new("mod.py"), false));
    }

    #[test]
    fn test_leading_slash_anchors_to_root() {
        let r = rule("/build");
        assert!(r.matches(Path::new("build"), true));
        assert!(!r.matches(Path::new("sub/build"), true));
    }

    #[test]
    fn test_interior_slash_anchors_to_root() {
        let r = rule("docs/api");
        assert!(r.matches(Path::new("docs/api"), true));
        assert!(!r.matches(Path::new("vendor/docs/api"), true));
    }

    #[test]
    fn test_directory_only_never_matches_a_file() {
        let r = rule("build/");
        assert!(r.matches(Path::new("build"), true));
        assert!(!r.matches(Path::new("build"), false));
    }

    #[test]
    fn test_negation_is_parsed() {
        let r = rule("!keep.log");
        assert!(r.negated());
        assert!(r.matches(Path::new("logs/keep.log"), false));
    }

    #[test]
    fn test_malformed_class_falls_back_to_literal() {
        let r = rule("oops[0-");
        assert!(r.matches(Path::new("oops[0-"), false));
        assert!(!r.matches(Path::new("oops0"), false));
    }
}
