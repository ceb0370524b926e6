/*!
 * Layered ignore-rule resolution
 *
 * Combines the builtin defaults, the gitignore file, the active preset and
 * user-supplied patterns into one ordered rule list and answers a single
 * ignored/not-ignored question per path. Precedence is positional: the four
 * sources are concatenated lowest-precedence first and the last matching
 * rule anywhere in the concatenation wins, exactly as a single gitignore
 * file with the sources pasted in that order would behave.
 */

use std::fs;
use std::path::Path;

use crate::config::Config;
use crate::error::Result;
use crate::pattern::PatternSet;
use crate::utils::DEFAULT_IGNORE;

/// Read-only ignore decision engine, built once before the walk starts.
#[derive(Debug, Clone)]
pub struct IgnoreResolver {
    /// Pattern sets in increasing precedence order:
    /// defaults, gitignore, preset, user patterns.
    sets: Vec<PatternSet>,
}

impl IgnoreResolver {
    /// Assemble a resolver from the four pattern sources, lowest precedence
    /// first.
    pub fn new(
        defaults: PatternSet,
        gitignore: PatternSet,
        preset: PatternSet,
        user: PatternSet,
    ) -> Self {
        Self {
            sets: vec![defaults, gitignore, preset, user],
        }
    }

    /// Build the resolver for a run. Reads the gitignore source if one is
    /// configured; an unreadable explicit gitignore path is a configuration
    /// error, a missing discovered one is not.
    pub fn from_config(config: &Config) -> Result<Self> {
        let defaults = PatternSet::parse(DEFAULT_IGNORE.iter());

        let gitignore = if config.use_gitignore {
            match &config.gitignore_path {
                Some(path) => PatternSet::parse(read_pattern_lines(path)?),
                None => {
                    let discovered = config.target_dir.join(".gitignore");
                    if discovered.is_file() {
                        PatternSet::parse(read_pattern_lines(&discovered)?)
                    } else {
                        PatternSet::default()
                    }
                }
            }
        } else {
            PatternSet::default()
        };

        let preset = match config.preset {
            Some(preset) => PatternSet::parse(preset.patterns().iter()),
            None => PatternSet::default(),
        };

        let user = PatternSet::parse(config.extra_ignores.iter());

        Ok(Self::new(defaults, gitignore, preset, user))
    }

    /// Decide whether a root-relative path is ignored. Scans every rule in
    /// concatenation order and keeps the last match; its polarity is the
    /// verdict. Unmatched paths are not ignored.
    pub fn is_ignored(&self, rel_path: &Path, is_dir: bool) -> bool {
        let mut verdict = None;

        for set in &self.sets {
            for rule in set.rules() {
                if rule.matches(rel_path, is_dir) {
                    verdict = Some(!rule.negated());
                }
            }
        }

        verdict.unwrap_or(false)
    }
}

/// Read a pattern file as lines, decoding permissively. Gitignore files are
/// not required to be valid UTF-8.
fn read_pattern_lines(path: &Path) -> Result<Vec<String>> {
    let bytes = fs::read(path)
        .map_err(|e| crate::error!(Config, "Cannot read ignore file {}: {}", path.display(), e))?;
    Ok(String::from_utf8_lossy(&bytes)
        .lines()
        .map(str::to_string)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::PatternSet;
    use std::path::Path;

    fn resolver_from(sets: [&[&str]; 4]) -> IgnoreResolver {
        let [defaults, gitignore, preset, user] = sets;
        IgnoreResolver::new(
            PatternSet::parse(defaults.iter()),
            PatternSet::parse(gitignore.iter()),
            PatternSet::parse(preset.iter()),
            PatternSet::parse(user.iter()),
        )
    }

    #[test]
    fn test_unmatched_paths_are_not_ignored() {
        let r = resolver_from([&[], &[], &[], &[]]);
        assert!(!r.is_ignored(Path::new("src/main.rs"), false));
    }

    #[test]
    fn test_last_match_wins_within_one_set() {
        let r = resolver_from([&[], &["*.log", "!keep.log"], &[], &[]]);
        assert!(r.is_ignored(Path::new("a.log"), false));
        assert!(!r.is_ignored(Path::new("keep.log"), false));
    }

    #[test]
    fn test_negation_order_matters() {
        let r = resolver_from([&[], &["!keep.log", "*.log"], &[], &[]]);
        // The later exclude overrides the earlier re-include.
        assert!(r.is_ignored(Path::new("keep.log"), false));
    }

    #[test]
    fn test_user_patterns_override_defaults() {
        let r = resolver_from([&["*.bin"], &[], &[], &["!firmware.bin"]]);
        assert!(r.is_ignored(Path::new("blob.bin"), false));
        assert!(!r.is_ignored(Path::new("firmware.bin"), false));
    }

    #[test]
    fn test_gitignore_overrides_defaults_and_preset_overrides_gitignore() {
        let r = resolver_from([&["tmp/"], &["!tmp/"], &["tmp/"], &[]]);
        assert!(r.is_ignored(Path::new("tmp"), true));

        let r = resolver_from([&["tmp/"], &["!tmp/"], &[], &[]]);
        assert!(!r.is_ignored(Path::new("tmp"), true));
    }

    #[test]
    fn test_directory_only_rule_ignores_dir_not_file() {
        let r = resolver_from([&[], &["build/"], &[], &[]]);
        assert!(r.is_ignored(Path::new("build"), true));
        assert!(!r.is_ignored(Path::new("build"), false));
    }
}
