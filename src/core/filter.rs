// Exclusion filter
//
// Commands matching any configured regex never reach the database.
// A pattern that doesn't compile is skipped, it never blocks the others.

use regex::Regex;

/// Compiled exclusion patterns, in configuration order
#[derive(Debug, Clone, Default)]
pub struct ExclusionFilter {
    compiled: Vec<Regex>,
    invalid: Vec<String>,
}

impl ExclusionFilter {
    // Build all the regex patterns once so we don't recompile them every time
    pub fn new<S: AsRef<str>>(patterns: &[S]) -> Self {
        let mut compiled = Vec::with_capacity(patterns.len());
        let mut invalid = Vec::new();

        for pattern in patterns {
            match Regex::new(pattern.as_ref()) {
                Ok(regex) => compiled.push(regex),
                Err(_) => invalid.push(pattern.as_ref().to_string()),
            }
        }

        Self { compiled, invalid }
    }

    /// True when the first matching pattern is found
    pub fn is_excluded(&self, command: &str) -> bool {
        self.compiled.iter().any(|regex| regex.is_match(command))
    }

    /// Patterns that failed to compile and are being ignored
    pub fn invalid_patterns(&self) -> &[String] {
        &self.invalid
    }

    pub fn len(&self) -> usize {
        self.compiled.len()
    }

    pub fn is_empty(&self) -> bool {
        self.compiled.is_empty()
    }
}

/// One-shot check that compiles `patterns` on the spot
///
/// Prefer [`ExclusionFilter`] when checking more than one command.
pub fn is_excluded<S: AsRef<str>>(command: &str, patterns: &[S]) -> bool {
    ExclusionFilter::new(patterns).is_excluded(command)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_and_prefix_patterns() {
        let filter = ExclusionFilter::new(&["^ls$", "^cd ", "bashtrack.*"]);

        let cases = [
            ("ls", true),
            ("ls -la", false),
            ("cd /tmp", true),
            ("bashtrack record", true),
            ("git status", false),
            ("echo hello", false),
        ];

        for (command, expected) in cases {
            assert_eq!(filter.is_excluded(command), expected, "command {:?}", command);
        }
    }

    #[test]
    fn test_unanchored_patterns_match_anywhere() {
        assert!(is_excluded("export GITHUB_TOKEN=abc", &[".*TOKEN.*"]));
        assert!(is_excluded("mysql --password hunter2", &["password"]));
    }

    #[test]
    fn test_invalid_pattern_is_skipped() {
        let filter = ExclusionFilter::new(&["(unclosed", "^rm "]);

        assert_eq!(filter.invalid_patterns(), &["(unclosed".to_string()]);
        assert_eq!(filter.len(), 1);
        assert!(filter.is_excluded("rm -rf build"));
        assert!(!filter.is_excluded("(unclosed"));
    }

    #[test]
    fn test_empty_pattern_list_excludes_nothing() {
        let none: [&str; 0] = [];
        assert!(!is_excluded("anything", &none));
        assert!(ExclusionFilter::default().is_empty());
    }
}
