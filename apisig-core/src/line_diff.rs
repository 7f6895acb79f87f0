//! Longest-common-subsequence line diff.
//!
//! Quadratic in the number of lines; callers diffing very large inputs
//! should cap them first.

use std::fmt;

use serde::Serialize;

/// A line that differs between the two inputs.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "op", content = "text", rename_all = "lowercase")]
pub enum DiffLine {
    Removed(String),
    Added(String),
}

/// One run of differing lines with optional surrounding context.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DiffHunk {
    /// 1-based line in the old input where the hunk starts.
    pub old_start: usize,
    /// 1-based line in the new input where the hunk starts.
    pub new_start: usize,
    pub context_before: Vec<String>,
    pub lines: Vec<DiffLine>,
    pub context_after: Vec<String>,
}

fn write_line(f: &mut fmt::Formatter<'_>, prefix: char, text: &str) -> fmt::Result {
    if text.trim().is_empty() {
        writeln!(f, "{}{}", prefix, text)
    } else {
        writeln!(f, "{} {}", prefix, text)
    }
}

impl fmt::Display for DiffHunk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "@@ -{} +{}", self.old_start, self.new_start)?;
        for line in &self.context_before {
            writeln!(f, "  {}", line)?;
        }
        for line in &self.lines {
            match line {
                DiffLine::Removed(text) => write_line(f, '-', text)?,
                DiffLine::Added(text) => write_line(f, '+', text)?,
            }
        }
        for line in &self.context_after {
            writeln!(f, "  {}", line)?;
        }
        Ok(())
    }
}

/// Diff two line sequences, with `window` lines of context around each hunk.
pub fn diff_lines<S: AsRef<str>>(before: &[S], after: &[S], window: usize) -> Vec<DiffHunk> {
    let before: Vec<&str> = before.iter().map(AsRef::as_ref).collect();
    let after: Vec<&str> = after.iter().map(AsRef::as_ref).collect();
    let (n, m) = (before.len(), after.len());

    // lcs[i][j]: length of the LCS of before[i..] and after[j..]
    let mut lcs = vec![vec![0usize; m + 1]; n + 1];
    for i in (0..n).rev() {
        for j in (0..m).rev() {
            lcs[i][j] = if before[i] == after[j] {
                lcs[i + 1][j + 1] + 1
            } else {
                lcs[i + 1][j].max(lcs[i][j + 1])
            };
        }
    }

    let mut hunks = Vec::new();
    let (mut i, mut j) = (0, 0);
    while i < n && j < m {
        if before[i] == after[j] {
            i += 1;
            j += 1;
            continue;
        }

        let mut hunk = DiffHunk {
            old_start: i + 1,
            new_start: j + 1,
            context_before: before[i.saturating_sub(window)..i].iter().map(|s| s.to_string()).collect(),
            lines: Vec::new(),
            context_after: Vec::new(),
        };
        while i < n && j < m && before[i] != after[j] {
            if lcs[i + 1][j] >= lcs[i][j + 1] {
                hunk.lines.push(DiffLine::Removed(before[i].to_string()));
                i += 1;
            } else {
                hunk.lines.push(DiffLine::Added(after[j].to_string()));
                j += 1;
            }
        }
        hunk.context_after = before[i..n.min(i + window)].iter().map(|s| s.to_string()).collect();
        hunks.push(hunk);
    }

    if i < n || j < m {
        let mut hunk = DiffHunk {
            old_start: i + 1,
            new_start: j + 1,
            context_before: Vec::new(),
            lines: Vec::new(),
            context_after: Vec::new(),
        };
        hunk.lines.extend(before[i..].iter().map(|s| DiffLine::Removed(s.to_string())));
        hunk.lines.extend(after[j..].iter().map(|s| DiffLine::Added(s.to_string())));
        hunks.push(hunk);
    }

    hunks
}

fn split_lines(text: &str) -> Vec<&str> {
    let mut lines: Vec<&str> = text.split('\n').collect();
    while lines.last().is_some_and(|l| l.is_empty()) {
        lines.pop();
    }
    lines
}

/// Diff two texts line by line. Empty when they are identical.
pub fn get_diff(before: &str, after: &str, window: usize) -> String {
    diff_lines(&split_lines(before), &split_lines(after), window)
        .iter()
        .map(|hunk| hunk.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_inputs() {
        let lines = ["a", "b", "c"];
        assert!(diff_lines(&lines, &lines, 2).is_empty());
        assert_eq!(get_diff("a\nb\n", "a\nb\n\n", 0), "");
    }

    #[test]
    fn test_single_replacement() {
        let hunks = diff_lines(&["a", "b", "c"], &["a", "x", "c"], 0);
        assert_eq!(hunks.len(), 1);
        assert_eq!(
            hunks[0].lines,
            vec![DiffLine::Removed("b".into()), DiffLine::Added("x".into())]
        );
        assert_eq!(hunks[0].to_string(), "@@ -2 +2\n- b\n+ x\n");
    }

    #[test]
    fn test_context_window() {
        let diff = get_diff("a\nb\nc\nd\ne\n", "a\nb\nX\nd\ne\n", 1);
        assert_eq!(diff, "@@ -3 +3\n  b\n- c\n+ X\n  d\n");
    }

    #[test]
    fn test_trailing_hunk() {
        let hunks = diff_lines(&["a"], &["a", "b", ""], 0);
        assert_eq!(hunks.len(), 1);
        assert_eq!(hunks[0].to_string(), "@@ -2 +2\n+ b\n+\n");

        let diff = get_diff("a\nb\nc", "a", 0);
        assert_eq!(diff, "@@ -2 +2\n- b\n- c\n");
    }
}
