// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Pattern-based codebase search over a local working tree.

use mend_core::SearchHit;
use std::path::{Path, PathBuf};

/// Directories never descended into.
const SKIP_DIRS: &[&str] = &[".git", ".hg", "target", "node_modules", ".mend"];

#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("invalid pattern {pattern:?}: {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Retrieval of pattern matches from the codebase under repair.
pub trait CodeSearch: Send + Sync {
    fn search(&self, patterns: &[String]) -> Result<Vec<SearchHit>, SearchError>;
}

/// Case-insensitive regex search over the working tree.
pub struct RegexSearch {
    root: PathBuf,
    max_hits_per_pattern: usize,
    max_file_bytes: u64,
}

impl RegexSearch {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into(), max_hits_per_pattern: 20, max_file_bytes: 1024 * 1024 }
    }

    pub fn with_max_hits_per_pattern(mut self, max: usize) -> Self {
        self.max_hits_per_pattern = max;
        self
    }

    fn collect_files(&self, dir: &Path, out: &mut Vec<PathBuf>) -> std::io::Result<()> {
        let mut entries: Vec<_> =
            std::fs::read_dir(dir)?.collect::<std::io::Result<Vec<_>>>()?;
        entries.sort_by_key(|e| e.file_name());
        for entry in entries {
            let path = entry.path();
            let name = entry.file_name();
            let name = name.to_string_lossy();
            if path.is_dir() {
                if SKIP_DIRS.contains(&name.as_ref()) {
                    continue;
                }
                self.collect_files(&path, out)?;
            } else if path.is_file() {
                if let Ok(meta) = entry.metadata() {
                    if meta.len() <= self.max_file_bytes {
                        out.push(path);
                    }
                }
            }
        }
        Ok(())
    }

    fn relative(&self, path: &Path) -> String {
        path.strip_prefix(&self.root)
            .unwrap_or(path)
            .to_string_lossy()
            .replace('\\', "/")
    }
}

impl CodeSearch for RegexSearch {
    fn search(&self, patterns: &[String]) -> Result<Vec<SearchHit>, SearchError> {
        let mut files = Vec::new();
        self.collect_files(&self.root, &mut files)?;

        let mut hits = Vec::new();
        for pattern in patterns {
            let re = regex::RegexBuilder::new(pattern)
                .case_insensitive(true)
                .build()
                .map_err(|source| SearchError::Pattern { pattern: pattern.clone(), source })?;

            let mut found = 0usize;
            'files: for path in &files {
                let bytes = match std::fs::read(path) {
                    Ok(bytes) => bytes,
                    Err(_) => continue,
                };
                // binary files are not worth excerpting
                if bytes.contains(&0) {
                    continue;
                }
                let text = String::from_utf8_lossy(&bytes);
                for (idx, line) in text.lines().enumerate() {
                    if re.is_match(line) {
                        let excerpt: String = line.trim().chars().take(200).collect();
                        hits.push(SearchHit {
                            path: self.relative(path),
                            line: (idx + 1) as u64,
                            excerpt,
                            pattern: pattern.clone(),
                        });
                        found += 1;
                        if found >= self.max_hits_per_pattern {
                            break 'files;
                        }
                    }
                }
            }
        }

        tracing::debug!(patterns = patterns.len(), hits = hits.len(), "search complete");
        Ok(hits)
    }
}

#[cfg(any(test, feature = "test-support"))]
mod fake {
    use super::*;
    use parking_lot::Mutex;

    /// Fixed-result search for tests.
    #[derive(Default)]
    pub struct FakeCodeSearch {
        hits: Mutex<Vec<SearchHit>>,
        queries: Mutex<Vec<Vec<String>>>,
    }

    impl FakeCodeSearch {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn set_hits(&self, hits: Vec<SearchHit>) {
            *self.hits.lock() = hits;
        }

        pub fn queries(&self) -> Vec<Vec<String>> {
            self.queries.lock().clone()
        }
    }

    impl CodeSearch for FakeCodeSearch {
        fn search(&self, patterns: &[String]) -> Result<Vec<SearchHit>, SearchError> {
            self.queries.lock().push(patterns.to_vec());
            Ok(self.hits.lock().clone())
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeCodeSearch;

#[cfg(test)]
#[path = "search_tests.rs"]
mod tests;
