// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

const SIMPLE_DIFF: &str = "\
--- a/src/lib.rs
+++ b/src/lib.rs
@@ -1,3 +1,3 @@
 fn main() {
-    println!(\"hello\");
+    println!(\"goodbye\");
 }
";

#[test]
fn parses_single_hunk() {
    let patch = parse_unified(SIMPLE_DIFF).unwrap();
    assert_eq!(patch.hunks.len(), 1);

    let hunk = &patch.hunks[0];
    assert_eq!(hunk.old_start, 1);
    assert_eq!(hunk.old_count, 3);
    assert_eq!(hunk.new_count, 3);
    assert_eq!(hunk.lines.len(), 4);
}

#[test]
fn applies_single_hunk() {
    let content = "fn main() {\n    println!(\"hello\");\n}\n";
    let patch = parse_unified(SIMPLE_DIFF).unwrap();

    let updated = apply(content, &patch).unwrap();
    assert_eq!(updated, "fn main() {\n    println!(\"goodbye\");\n}\n");
}

#[test]
fn applies_to_empty_file() {
    let diff = "@@ -0,0 +1,2 @@\n+line one\n+line two\n";
    let patch = parse_unified(diff).unwrap();

    let updated = apply("", &patch).unwrap();
    assert_eq!(updated, "line one\nline two\n");
}

#[test]
fn applies_multiple_hunks_in_order() {
    let content = "a\nb\nc\nd\ne\nf\ng\nh\n";
    let diff = "\
@@ -1,2 +1,2 @@
 a
-b
+B
@@ -6,2 +6,3 @@
 f
 g
+G2
";
    let patch = parse_unified(diff).unwrap();
    let updated = apply(content, &patch).unwrap();
    assert_eq!(updated, "a\nB\nc\nd\ne\nf\ng\nG2\nh\n");
}

#[test]
fn range_without_count_defaults_to_one() {
    let diff = "@@ -1 +1 @@\n-old\n+new\n";
    let patch = parse_unified(diff).unwrap();

    assert_eq!(patch.hunks[0].old_count, 1);
    assert_eq!(apply("old\n", &patch).unwrap(), "new\n");
}

#[test]
fn preserves_missing_trailing_newline() {
    let diff = "@@ -1 +1 @@\n-old\n+new\n\\ No newline at end of file\n";
    let patch = parse_unified(diff).unwrap();

    assert_eq!(apply("old", &patch).unwrap(), "new");
}

#[test]
fn context_mismatch_is_rejected() {
    let patch = parse_unified(SIMPLE_DIFF).unwrap();
    let err = apply("completely\ndifferent\ncontent\n", &patch).unwrap_err();

    assert!(matches!(err, PatchError::HunkMismatch { index: 1, .. }), "{err}");
}

#[test]
fn removed_line_mismatch_is_rejected() {
    let diff = "@@ -1,2 +1,1 @@\n a\n-b\n";
    let patch = parse_unified(diff).unwrap();

    let err = apply("a\nX\n", &patch).unwrap_err();
    assert!(matches!(err, PatchError::HunkMismatch { .. }));
}

#[test]
fn hunk_past_end_of_file_is_rejected() {
    let diff = "@@ -10,1 +10,1 @@\n-x\n+y\n";
    let patch = parse_unified(diff).unwrap();

    assert!(apply("a\nb\n", &patch).is_err());
}

#[test]
fn declared_counts_must_match_body() {
    let diff = "@@ -1,5 +1,5 @@\n a\n-b\n+B\n";
    let err = parse_unified(diff).unwrap_err();
    assert!(matches!(err, PatchError::Malformed { .. }), "{err}");
}

#[test]
fn empty_diff_is_malformed() {
    assert!(parse_unified("").is_err());
    assert!(parse_unified("just some prose\n").is_err());
}

#[test]
fn git_style_headers_are_ignored() {
    let diff = "\
diff --git a/x b/x
index 000..111 100644
--- a/x
+++ b/x
@@ -1 +1 @@
-old
+new
";
    let patch = parse_unified(diff).unwrap();
    assert_eq!(patch.hunks.len(), 1);
}

#[test]
fn blank_context_lines_without_leading_space_are_tolerated() {
    let diff = "@@ -1,3 +1,3 @@\n a\n\n-b\n+B\n";
    let patch = parse_unified(diff).unwrap();

    let updated = apply("a\n\nb\n", &patch).unwrap();
    assert_eq!(updated, "a\n\nB\n");
}
