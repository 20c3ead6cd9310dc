// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Unified-diff parsing and application.
//!
//! The generation stage emits one diff per file; this module parses the hunk
//! structure and applies it to file content with strict context
//! verification. A hunk that does not match at its stated position is a
//! structured failure, not a fuzzy match.

/// A parsed single-file unified diff.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedPatch {
    pub hunks: Vec<Hunk>,
}

/// One `@@ -a,b +c,d @@` section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hunk {
    /// 1-based first line in the old file (0 for empty-file inserts).
    pub old_start: usize,
    pub old_count: usize,
    pub new_start: usize,
    pub new_count: usize,
    pub lines: Vec<HunkLine>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HunkLine {
    Context(String),
    Add(String),
    Remove(String),
}

#[derive(Debug, thiserror::Error)]
pub enum PatchError {
    #[error("malformed patch at line {line}: {reason}")]
    Malformed { line: usize, reason: String },
    #[error("hunk #{index} does not apply at line {line}")]
    HunkMismatch { index: usize, line: usize },
}

fn malformed(line: usize, reason: impl Into<String>) -> PatchError {
    PatchError::Malformed { line, reason: reason.into() }
}

/// Parse `-a,b` / `+c,d` range tokens; the count defaults to 1.
fn parse_range(token: &str, sign: char, lineno: usize) -> Result<(usize, usize), PatchError> {
    let rest = token
        .strip_prefix(sign)
        .ok_or_else(|| malformed(lineno, format!("expected range starting with {sign:?}")))?;
    let (start, count) = match rest.split_once(',') {
        Some((s, c)) => (s, Some(c)),
        None => (rest, None),
    };
    let start = start.parse::<usize>().map_err(|_| malformed(lineno, "bad range start"))?;
    let count = match count {
        Some(c) => c.parse::<usize>().map_err(|_| malformed(lineno, "bad range count"))?,
        None => 1,
    };
    Ok((start, count))
}

fn parse_hunk_header(line: &str, lineno: usize) -> Result<Hunk, PatchError> {
    // "@@ -a,b +c,d @@ optional section heading"
    let inner = line
        .strip_prefix("@@")
        .and_then(|rest| rest.split("@@").next())
        .ok_or_else(|| malformed(lineno, "bad hunk header"))?
        .trim();
    let mut parts = inner.split_whitespace();
    let old = parts.next().ok_or_else(|| malformed(lineno, "missing old range"))?;
    let new = parts.next().ok_or_else(|| malformed(lineno, "missing new range"))?;
    let (old_start, old_count) = parse_range(old, '-', lineno)?;
    let (new_start, new_count) = parse_range(new, '+', lineno)?;
    Ok(Hunk { old_start, old_count, new_start, new_count, lines: Vec::new() })
}

fn check_counts(hunk: &Hunk, lineno: usize) -> Result<(), PatchError> {
    let old = hunk
        .lines
        .iter()
        .filter(|l| matches!(l, HunkLine::Context(_) | HunkLine::Remove(_)))
        .count();
    let new = hunk
        .lines
        .iter()
        .filter(|l| matches!(l, HunkLine::Context(_) | HunkLine::Add(_)))
        .count();
    if old != hunk.old_count || new != hunk.new_count {
        return Err(malformed(lineno, "hunk body does not match declared counts"));
    }
    Ok(())
}

/// Parse a single-file unified diff. File headers (`---`/`+++`/`diff`/
/// `index`) are tolerated and ignored; at least one hunk is required.
pub fn parse_unified(diff: &str) -> Result<ParsedPatch, PatchError> {
    let mut hunks: Vec<Hunk> = Vec::new();
    let mut current: Option<(Hunk, usize)> = None;

    for (idx, line) in diff.lines().enumerate() {
        let lineno = idx + 1;
        if line.starts_with("diff ")
            || line.starts_with("index ")
            || line.starts_with("--- ")
            || line.starts_with("+++ ")
        {
            continue;
        }
        if line.starts_with("@@") {
            if let Some((hunk, at)) = current.take() {
                check_counts(&hunk, at)?;
                hunks.push(hunk);
            }
            current = Some((parse_hunk_header(line, lineno)?, lineno));
            continue;
        }
        match current.as_mut() {
            Some((hunk, _)) => {
                if let Some(text) = line.strip_prefix('+') {
                    hunk.lines.push(HunkLine::Add(text.to_string()));
                } else if let Some(text) = line.strip_prefix('-') {
                    hunk.lines.push(HunkLine::Remove(text.to_string()));
                } else if let Some(text) = line.strip_prefix(' ') {
                    hunk.lines.push(HunkLine::Context(text.to_string()));
                } else if line.starts_with('\\') {
                    // "\ No newline at end of file"
                } else if line.is_empty() {
                    // some emitters strip the leading space from blank context lines
                    hunk.lines.push(HunkLine::Context(String::new()));
                } else {
                    return Err(malformed(lineno, format!("unexpected line {line:?}")));
                }
            }
            None => {
                if !line.trim().is_empty() {
                    return Err(malformed(lineno, "content before first hunk header"));
                }
            }
        }
    }

    if let Some((hunk, at)) = current.take() {
        check_counts(&hunk, at)?;
        hunks.push(hunk);
    }
    if hunks.is_empty() {
        return Err(malformed(1, "no hunks found"));
    }
    Ok(ParsedPatch { hunks })
}

/// Apply a parsed patch to file content.
///
/// Context and removed lines must match the old content exactly at the
/// hunk's stated position. The trailing-newline state of the input is
/// preserved.
pub fn apply(content: &str, patch: &ParsedPatch) -> Result<String, PatchError> {
    let old: Vec<&str> = content.lines().collect();
    let mut out: Vec<String> = Vec::new();
    let mut cursor = 0usize;

    for (i, hunk) in patch.hunks.iter().enumerate() {
        let index = i + 1;
        let start = hunk.old_start.saturating_sub(1);
        if start < cursor || start > old.len() {
            return Err(PatchError::HunkMismatch { index, line: hunk.old_start });
        }
        out.extend(old[cursor..start].iter().map(|s| s.to_string()));
        cursor = start;

        for line in &hunk.lines {
            match line {
                HunkLine::Context(text) => {
                    if old.get(cursor).copied() != Some(text.as_str()) {
                        return Err(PatchError::HunkMismatch { index, line: cursor + 1 });
                    }
                    out.push(text.clone());
                    cursor += 1;
                }
                HunkLine::Remove(text) => {
                    if old.get(cursor).copied() != Some(text.as_str()) {
                        return Err(PatchError::HunkMismatch { index, line: cursor + 1 });
                    }
                    cursor += 1;
                }
                HunkLine::Add(text) => out.push(text.clone()),
            }
        }
    }

    out.extend(old[cursor..].iter().map(|s| s.to_string()));

    let mut result = out.join("\n");
    if (content.ends_with('\n') || content.is_empty()) && !result.is_empty() {
        result.push('\n');
    }
    Ok(result)
}

#[cfg(test)]
#[path = "patch_tests.rs"]
mod tests;
