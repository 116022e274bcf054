/// Represents the status of a file in the diff (from the diffstat endpoint)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileStatus {
    Added,
    Deleted,
    Modified,
    Renamed,
}

impl FileStatus {
    pub fn badge(&self) -> &'static str {
        match self {
            FileStatus::Added => "[A]",
            FileStatus::Deleted => "[D]",
            FileStatus::Modified => "[M]",
            FileStatus::Renamed => "[R]",
        }
    }

    pub fn color(&self) -> ratatui::style::Color {
        use ratatui::style::Color;
        match self {
            FileStatus::Added => Color::Green,
            FileStatus::Deleted => Color::Red,
            FileStatus::Modified => Color::Yellow,
            FileStatus::Renamed => Color::Cyan,
        }
    }

    /// Map a diffstat "status" field to a FileStatus
    pub fn from_diffstat(status: &str) -> Self {
        match status {
            "added" => FileStatus::Added,
            "removed" => FileStatus::Deleted,
            "renamed" => FileStatus::Renamed,
            _ => FileStatus::Modified,
        }
    }
}

/// Kind of a diff line. Context lines, hunk headers, and anything
/// unrecognized all render as Info.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Add,
    Del,
    Info,
}

/// A single line in a diff. Immutable once constructed.
#[derive(Debug, Clone)]
pub struct DiffLine {
    pub kind: LineKind,
    pub content: String,
    pub old_ln: Option<u32>,
    pub new_ln: Option<u32>,
}

impl DiffLine {
    pub fn add(content: String, new_ln: u32) -> Self {
        Self {
            kind: LineKind::Add,
            content,
            old_ln: None,
            new_ln: Some(new_ln),
        }
    }

    pub fn del(content: String, old_ln: u32) -> Self {
        Self {
            kind: LineKind::Del,
            content,
            old_ln: Some(old_ln),
            new_ln: None,
        }
    }

    pub fn context(content: String, old_ln: u32, new_ln: u32) -> Self {
        Self {
            kind: LineKind::Info,
            content,
            old_ln: Some(old_ln),
            new_ln: Some(new_ln),
        }
    }

    /// Hunk headers and other metadata lines carry no line numbers
    pub fn info(content: String) -> Self {
        Self {
            kind: LineKind::Info,
            content,
            old_ln: None,
            new_ln: None,
        }
    }
}

/// One changed file in a PR: path plus an ordered, flat line sequence
#[derive(Debug, Clone)]
pub struct FileDiff {
    pub path: String,
    pub old_path: Option<String>,
    pub status: FileStatus,
    pub lines: Vec<DiffLine>,
}

impl FileDiff {
    pub fn filename(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or(&self.path)
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    pub fn additions(&self) -> usize {
        self.lines
            .iter()
            .filter(|l| l.kind == LineKind::Add)
            .count()
    }

    pub fn deletions(&self) -> usize {
        self.lines
            .iter()
            .filter(|l| l.kind == LineKind::Del)
            .count()
    }

    pub fn stats_text(&self) -> String {
        format!("+{} -{}", self.additions(), self.deletions())
    }
}

/// Coordinates of a PR, parsed from a URL or built from a PullRequest
#[derive(Debug, Clone)]
pub struct PrInfo {
    pub workspace: String,
    pub repo: String,
    pub id: u32,
}

impl PrInfo {
    pub fn repo_full_name(&self) -> String {
        format!("{}/{}", self.workspace, self.repo)
    }
}

/// An open pull request, as fetched from the Bitbucket API.
/// Immutable snapshot; a refresh replaces the whole value.
#[derive(Debug, Clone)]
pub struct PullRequest {
    pub id: u32,
    pub title: String,
    pub author: String,
    pub description: String,
    pub status: String,
    pub branch: String,
    pub created: String,
    pub approvals: Vec<String>,
    pub comment_count: u32,
    pub reviewers: Vec<String>,
    pub workspace: String,
    pub repo: String,
}

impl PullRequest {
    /// Full repository name (workspace/repo)
    pub fn repo_full_name(&self) -> String {
        format!("{}/{}", self.workspace, self.repo)
    }

    pub fn approval_count(&self) -> usize {
        self.approvals.len()
    }

    /// Convert to PrInfo for fetching the diff
    pub fn to_pr_info(&self) -> PrInfo {
        PrInfo {
            workspace: self.workspace.clone(),
            repo: self.repo.clone(),
            id: self.id,
        }
    }

    pub fn web_url(&self) -> String {
        format!(
            "https://bitbucket.org/{}/pull-requests/{}",
            self.repo_full_name(),
            self.id
        )
    }

    /// Format the age of the PR (e.g., "2d", "3h", "5m")
    pub fn age(&self) -> String {
        use std::time::SystemTime;

        let created = chrono::DateTime::parse_from_rfc3339(&self.created)
            .map(|dt| dt.timestamp())
            .unwrap_or(0);

        let now = SystemTime::now()
            .duration_since(SystemTime::UNIX_EPOCH)
            .map(|d| d.as_secs() as i64)
            .unwrap_or(0);

        let diff_secs = now - created;

        if diff_secs < 3600 {
            format!("{}m", diff_secs / 60)
        } else if diff_secs < 86400 {
            format!("{}h", diff_secs / 3600)
        } else {
            format!("{}d", diff_secs / 86400)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_file() -> FileDiff {
        FileDiff {
            path: "src/ui/review.rs".to_string(),
            old_path: None,
            status: FileStatus::Modified,
            lines: vec![
                DiffLine::info("@@ -1,3 +1,4 @@".to_string()),
                DiffLine::context("fn main() {".to_string(), 1, 1),
                DiffLine::add("    launch();".to_string(), 2),
                DiffLine::del("    boot();".to_string(), 2),
                DiffLine::context("}".to_string(), 3, 4),
            ],
        }
    }

    #[test]
    fn test_filename() {
        let file = sample_file();
        assert_eq!(file.filename(), "review.rs");
    }

    #[test]
    fn test_filename_no_directory() {
        let mut file = sample_file();
        file.path = "README.md".to_string();
        assert_eq!(file.filename(), "README.md");
    }

    #[test]
    fn test_stats() {
        let file = sample_file();
        assert_eq!(file.additions(), 1);
        assert_eq!(file.deletions(), 1);
        assert_eq!(file.line_count(), 5);
        assert_eq!(file.stats_text(), "+1 -1");
    }

    #[test]
    fn test_line_constructors() {
        let add = DiffLine::add("x".to_string(), 7);
        assert_eq!(add.kind, LineKind::Add);
        assert_eq!(add.old_ln, None);
        assert_eq!(add.new_ln, Some(7));

        let del = DiffLine::del("x".to_string(), 3);
        assert_eq!(del.kind, LineKind::Del);
        assert_eq!(del.old_ln, Some(3));
        assert_eq!(del.new_ln, None);

        let ctx = DiffLine::context("x".to_string(), 3, 4);
        assert_eq!(ctx.kind, LineKind::Info);
        assert_eq!(ctx.old_ln, Some(3));
        assert_eq!(ctx.new_ln, Some(4));

        let info = DiffLine::info("@@".to_string());
        assert_eq!(info.kind, LineKind::Info);
        assert_eq!(info.old_ln, None);
        assert_eq!(info.new_ln, None);
    }

    #[test]
    fn test_file_status_from_diffstat() {
        assert_eq!(FileStatus::from_diffstat("added"), FileStatus::Added);
        assert_eq!(FileStatus::from_diffstat("removed"), FileStatus::Deleted);
        assert_eq!(FileStatus::from_diffstat("renamed"), FileStatus::Renamed);
        assert_eq!(FileStatus::from_diffstat("modified"), FileStatus::Modified);
        assert_eq!(FileStatus::from_diffstat("weird"), FileStatus::Modified);
    }

    fn sample_pr() -> PullRequest {
        PullRequest {
            id: 42,
            title: "Add review screen".to_string(),
            author: "Alex Doe".to_string(),
            description: "Renders diffs.".to_string(),
            status: "Open".to_string(),
            branch: "feature/review-screen".to_string(),
            created: "2026-08-01T12:00:00+00:00".to_string(),
            approvals: vec!["Sam Lee".to_string()],
            comment_count: 3,
            reviewers: vec!["Sam Lee".to_string(), "Kim Park".to_string()],
            workspace: "acme".to_string(),
            repo: "widgets".to_string(),
        }
    }

    #[test]
    fn test_repo_full_name() {
        assert_eq!(sample_pr().repo_full_name(), "acme/widgets");
    }

    #[test]
    fn test_web_url() {
        assert_eq!(
            sample_pr().web_url(),
            "https://bitbucket.org/acme/widgets/pull-requests/42"
        );
    }

    #[test]
    fn test_to_pr_info() {
        let info = sample_pr().to_pr_info();
        assert_eq!(info.workspace, "acme");
        assert_eq!(info.repo, "widgets");
        assert_eq!(info.id, 42);
    }

    #[test]
    fn test_approval_count() {
        assert_eq!(sample_pr().approval_count(), 1);
    }
}
