//! Source-only diff filtering.
//!
//! Grounded verbatim on `docker_eval.py`'s `extract_source_only_patch` and
//! `_is_test_file`: SWE-bench applies its own `test_patch`, so only the
//! agent's source-code changes belong in the `model_patch` handed to the
//! grader — including the agent's own test edits would let it pass by
//! editing the tests rather than the code.

use regex::Regex;
use std::sync::OnceLock;

fn diff_header_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?m)^diff --git ").unwrap())
}

fn filepath_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"diff --git a/(.*?) b/").unwrap())
}

/// Filter a unified git diff to only the per-file sections whose path does
/// not look like a test file. Returns an empty string for blank input.
#[must_use]
pub fn extract_source_only_patch(diff: &str) -> String {
    if diff.trim().is_empty() {
        return String::new();
    }

    split_file_diffs(diff)
        .into_iter()
        .filter(|file_diff| {
            filepath_re()
                .captures(file_diff)
                .map(|caps| !is_test_file(&caps[1]))
                .unwrap_or(false)
        })
        .collect::<Vec<_>>()
        .join("")
}

/// Split a multi-file unified diff into its per-file sections, each
/// beginning with its own `diff --git` header — a lookahead split matching
/// Python's `re.split(r'(?=^diff --git )', diff, flags=re.MULTILINE)`.
fn split_file_diffs(diff: &str) -> Vec<String> {
    let header = diff_header_re();
    let starts: Vec<usize> = header.find_iter(diff).map(|m| m.start()).collect();
    if starts.is_empty() {
        return vec![diff.to_string()];
    }

    let mut sections = Vec::with_capacity(starts.len());
    for (i, &start) in starts.iter().enumerate() {
        let end = starts.get(i + 1).copied().unwrap_or(diff.len());
        let section = &diff[start..end];
        if !section.trim().is_empty() {
            sections.push(section.to_string());
        }
    }
    sections
}

/// Whether `filepath` (the `a/`-relative path from a diff header) looks
/// like a test file, per the same heuristics `_is_test_file` uses: a
/// `test_`-prefixed or `_test.py`-suffixed basename, a `tests`/`test`/
/// `testing` path segment, or a `conftest.py` basename.
#[must_use]
pub fn is_test_file(filepath: &str) -> bool {
    let parts: Vec<&str> = filepath.split('/').collect();
    let basename = parts.last().copied().unwrap_or(filepath);

    if basename.starts_with("test_") || basename.ends_with("_test.py") {
        return true;
    }
    if parts.iter().any(|segment| matches!(*segment, "tests" | "test" | "testing")) {
        return true;
    }
    basename == "conftest.py"
}

#[cfg(test)]
mod tests {
    use super::*;

    const TWO_FILE_DIFF: &str = "diff --git a/src/lib.rs b/src/lib.rs\n\
index 111..222 100644\n\
--- a/src/lib.rs\n\
+++ b/src/lib.rs\n\
@@ -1 +1 @@\n\
-old\n\
+new\n\
diff --git a/tests/test_lib.py b/tests/test_lib.py\n\
index 333..444 100644\n\
--- a/tests/test_lib.py\n\
+++ b/tests/test_lib.py\n\
@@ -1 +1 @@\n\
-old test\n\
+new test\n";

    #[test]
    fn empty_diff_yields_empty_string() {
        assert_eq!(extract_source_only_patch(""), "");
        assert_eq!(extract_source_only_patch("   \n"), "");
    }

    #[test]
    fn drops_test_file_sections_keeps_source() {
        let filtered = extract_source_only_patch(TWO_FILE_DIFF);
        assert!(filtered.contains("src/lib.rs"));
        assert!(!filtered.contains("test_lib.py"));
    }

    #[test]
    fn single_file_diff_with_no_test_changes_is_unchanged() {
        let diff = "diff --git a/a.py b/a.py\n--- a/a.py\n+++ b/a.py\n@@ -1 +1 @@\n-x\n+y\n";
        assert_eq!(extract_source_only_patch(diff), diff);
    }

    #[test]
    fn all_test_files_filtered_yields_empty_string() {
        let diff = "diff --git a/tests/test_a.py b/tests/test_a.py\n--- a\n+++ b\n@@ -1 +1 @@\n-x\n+y\n";
        assert_eq!(extract_source_only_patch(diff), "");
    }

    #[test]
    fn is_test_file_matches_prefix_suffix_segment_and_conftest() {
        assert!(is_test_file("test_foo.py"));
        assert!(is_test_file("pkg/foo_test.py"));
        assert!(is_test_file("pkg/tests/foo.py"));
        assert!(is_test_file("pkg/test/foo.py"));
        assert!(is_test_file("pkg/testing/foo.py"));
        assert!(is_test_file("pkg/conftest.py"));
        assert!(!is_test_file("pkg/contest.py"));
        assert!(!is_test_file("src/lib.rs"));
    }
}
