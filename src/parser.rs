use regex::Regex;

use crate::types::{DiffLine, FileDiff, FileStatus};

/// Parse a raw unified diff (as returned by the Bitbucket diff endpoint)
/// into one FileDiff per changed file. File order follows the diff.
pub fn parse_diff(diff: &str) -> Vec<FileDiff> {
    let mut files = Vec::new();
    let lines: Vec<&str> = diff.lines().collect();
    let mut i = 0;

    while i < lines.len() {
        if lines[i].starts_with("diff --git ") {
            if let Some((file, consumed)) = parse_file(&lines[i..]) {
                files.push(file);
                i += consumed;
                continue;
            }
        }
        i += 1;
    }

    files
}

fn parse_file(lines: &[&str]) -> Option<(FileDiff, usize)> {
    if lines.is_empty() || !lines[0].starts_with("diff --git ") {
        return None;
    }

    let mut i = 0;
    let mut path = String::new();
    let mut old_path = None;
    let mut status = FileStatus::Modified;
    let mut diff_lines = Vec::new();

    // Format: diff --git a/path/to/file b/path/to/file
    let git_line = lines[i];
    if let Some(b_idx) = git_line.find(" b/") {
        path = git_line[b_idx + 3..].to_string();
    }
    i += 1;

    // Git metadata lines up to the first hunk
    while i < lines.len() {
        let line = lines[i];

        if line.starts_with("new file mode") {
            status = FileStatus::Added;
        } else if line.starts_with("deleted file mode") {
            status = FileStatus::Deleted;
        } else if let Some(from) = line.strip_prefix("rename from ") {
            status = FileStatus::Renamed;
            old_path = Some(from.to_string());
        } else if line.starts_with("similarity index ") {
            status = FileStatus::Renamed;
        } else if line.starts_with("--- ") {
            i += 1;
            if i < lines.len() && lines[i].starts_with("+++ ") {
                i += 1;
            }
            break;
        } else if line.starts_with("diff --git ") {
            // Next file started
            break;
        } else if line.starts_with("Binary files") {
            // Binary file, no content lines
            i += 1;
            break;
        }
        i += 1;
    }

    // Hunks, flattened into one line sequence per file
    while i < lines.len() {
        let line = lines[i];

        if line.starts_with("diff --git ") {
            break;
        }

        if line.starts_with("@@ ") {
            if let Some(consumed) = parse_hunk(&lines[i..], &mut diff_lines) {
                i += consumed;
                continue;
            }
        }

        i += 1;
    }

    Some((
        FileDiff {
            path,
            old_path,
            status,
            lines: diff_lines,
        },
        i,
    ))
}

/// Parse one hunk, appending its header and content lines to `out`.
/// Returns the number of input lines consumed, or None if the header
/// does not carry valid line numbers.
fn parse_hunk(lines: &[&str], out: &mut Vec<DiffLine>) -> Option<usize> {
    if lines.is_empty() || !lines[0].starts_with("@@ ") {
        return None;
    }

    let header = lines[0].to_string();

    // @@ -old_start,old_count +new_start,new_count @@ optional context
    let hunk_re = Regex::new(r"^@@ -(\d+)(?:,(\d+))? \+(\d+)(?:,(\d+))? @@").unwrap();
    let caps = hunk_re.captures(&header)?;

    let old_start: u32 = caps.get(1)?.as_str().parse().ok()?;
    let new_start: u32 = caps.get(3)?.as_str().parse().ok()?;

    out.push(DiffLine::info(header));

    let mut i = 1;
    let mut old_ln = old_start;
    let mut new_ln = new_start;

    while i < lines.len() {
        let line = lines[i];

        // Stop at the next hunk or the next file
        if line.starts_with("@@ ") || line.starts_with("diff --git ") {
            break;
        }

        if line.starts_with('\\') {
            // "\ No newline at end of file"
            i += 1;
            continue;
        }

        let parsed = if let Some(content) = line.strip_prefix('+') {
            let ln = new_ln;
            new_ln += 1;
            DiffLine::add(content.to_string(), ln)
        } else if let Some(content) = line.strip_prefix('-') {
            let ln = old_ln;
            old_ln += 1;
            DiffLine::del(content.to_string(), ln)
        } else if line.starts_with(' ') || line.is_empty() {
            let content = line.strip_prefix(' ').unwrap_or(line).to_string();
            let (o, n) = (old_ln, new_ln);
            old_ln += 1;
            new_ln += 1;
            DiffLine::context(content, o, n)
        } else {
            // Malformed line inside a hunk: keep it visible as Info
            // rather than failing the render
            DiffLine::info(line.to_string())
        };

        out.push(parsed);
        i += 1;
    }

    Some(i)
}
