use std::collections::HashMap;
use std::time::Instant;

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use url::Url;

use crate::config::AuthSettings;
use crate::types::{FileDiff, FileStatus, PrInfo, PullRequest};

const BASE_URL: &str = "https://api.bitbucket.org/2.0";

/// Log request timing to file if BBTUI_DEBUG is set
#[inline]
fn perf_log(operation: &str, elapsed_ms: u128) {
    if std::env::var("BBTUI_DEBUG").is_ok() {
        use std::io::Write;
        if let Some(mut path) = dirs::config_dir() {
            path.push("bbtui");
            path.push("perf.log");
            if let Ok(mut file) = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path)
            {
                let _ = writeln!(file, "{:>6}ms  {}", elapsed_ms, operation);
            }
        }
    }
}

/// Parse a Bitbucket PR URL into workspace, repo, and PR id
pub fn parse_pr_url(url_str: &str) -> Result<PrInfo> {
    let url = Url::parse(url_str).context("Invalid URL")?;

    if url.host_str() != Some("bitbucket.org") {
        return Err(anyhow!("Only bitbucket.org URLs are supported"));
    }

    let segments: Vec<_> = url
        .path_segments()
        .ok_or_else(|| anyhow!("Invalid PR URL path"))?
        .collect();

    // Expected format: /workspace/repo/pull-requests/123
    if segments.len() < 4 || segments[2] != "pull-requests" {
        return Err(anyhow!(
            "Invalid PR URL format. Expected: https://bitbucket.org/workspace/repo/pull-requests/123"
        ));
    }

    let workspace = segments[0].to_string();
    let repo = segments[1].to_string();
    let id: u32 = segments[3]
        .parse()
        .context("PR id must be a valid integer")?;

    Ok(PrInfo {
        workspace,
        repo,
        id,
    })
}

// ---------------------------------------------------------------------------
// API payloads
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct Paginated<T> {
    #[serde(default = "Vec::new")]
    values: Vec<T>,
}

#[derive(Debug, Default, Deserialize)]
struct Account {
    #[serde(default)]
    display_name: String,
}

#[derive(Debug, Deserialize)]
struct Participant {
    #[serde(default)]
    user: Account,
    #[serde(default)]
    approved: bool,
}

#[derive(Debug, Default, Deserialize)]
struct Branch {
    #[serde(default)]
    name: String,
}

#[derive(Debug, Default, Deserialize)]
struct PrEndpoint {
    #[serde(default)]
    branch: Branch,
}

#[derive(Debug, Deserialize)]
struct PrPayload {
    id: u32,
    title: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    created_on: String,
    #[serde(default)]
    author: Account,
    #[serde(default)]
    source: PrEndpoint,
    #[serde(default)]
    participants: Vec<Participant>,
    #[serde(default)]
    reviewers: Vec<Account>,
    #[serde(default)]
    comment_count: u32,
}

impl PrPayload {
    fn into_pull_request(self, workspace: &str, repo: &str) -> PullRequest {
        let approvals: Vec<String> = self
            .participants
            .iter()
            .filter(|p| p.approved)
            .map(|p| p.user.display_name.clone())
            .collect();

        let status = if approvals.is_empty() {
            "Open".to_string()
        } else {
            "Approved".to_string()
        };

        PullRequest {
            id: self.id,
            title: self.title,
            author: self.author.display_name,
            description: self.description,
            status,
            branch: self.source.branch.name,
            created: self.created_on,
            approvals,
            comment_count: self.comment_count,
            reviewers: self
                .reviewers
                .into_iter()
                .map(|r| r.display_name)
                .collect(),
            workspace: workspace.to_string(),
            repo: repo.to_string(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct DiffstatPath {
    #[serde(default)]
    path: String,
}

#[derive(Debug, Deserialize)]
struct DiffstatEntry {
    #[serde(default)]
    status: String,
    #[serde(default)]
    new: Option<DiffstatPath>,
    #[serde(default)]
    old: Option<DiffstatPath>,
}

impl DiffstatEntry {
    fn path(&self) -> Option<&str> {
        self.new
            .as_ref()
            .map(|p| p.path.as_str())
            .filter(|p| !p.is_empty())
            .or_else(|| self.old.as_ref().map(|p| p.path.as_str()))
            .filter(|p| !p.is_empty())
    }
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Bitbucket Cloud REST API client with basic auth
/// (username + app password)
#[derive(Clone)]
pub struct BitbucketClient {
    http: reqwest::Client,
    username: String,
    app_password: String,
}

impl BitbucketClient {
    pub fn new(auth: &AuthSettings) -> Result<Self> {
        if !auth.is_configured() {
            return Err(anyhow!(
                "Bitbucket credentials not configured. Set auth.username and \
                 auth.app_password in {}",
                crate::config::Config::config_path()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| "~/.config/bbtui/config.toml".to_string())
            ));
        }

        Ok(Self {
            http: reqwest::Client::new(),
            username: auth.username.clone(),
            app_password: auth.app_password.clone(),
        })
    }

    fn get(&self, url: &str) -> reqwest::RequestBuilder {
        self.http
            .get(url)
            .basic_auth(&self.username, Some(&self.app_password))
    }

    /// List open PRs for a repository, newest first
    pub async fn list_open_prs(&self, workspace: &str, repo: &str) -> Result<Vec<PullRequest>> {
        let start = Instant::now();
        let url = format!("{}/repositories/{}/{}/pullrequests", BASE_URL, workspace, repo);

        let fields = [
            "+values.participants",
            "+values.description",
            "+values.source",
            "-values.links",
            "-values.summary",
            "-values.participants.links",
        ]
        .join(",");

        let response = self
            .get(&url)
            .query(&[
                ("q", "state=\"OPEN\""),
                ("pagelen", "25"),
                ("fields", &fields),
            ])
            .send()
            .await
            .context("Failed to fetch pull requests")?;

        perf_log(
            &format!("list_open_prs {}/{}", workspace, repo),
            start.elapsed().as_millis(),
        );

        let page: Paginated<PrPayload> = check_response(response, "pull requests")
            .await?
            .json()
            .await
            .context("Failed to parse pull request list JSON")?;

        Ok(page
            .values
            .into_iter()
            .map(|p| p.into_pull_request(workspace, repo))
            .collect())
    }

    /// Fetch a single PR by id
    pub async fn fetch_pr(&self, pr: &PrInfo) -> Result<PullRequest> {
        let start = Instant::now();
        let url = format!(
            "{}/repositories/{}/{}/pullrequests/{}",
            BASE_URL, pr.workspace, pr.repo, pr.id
        );

        let response = self
            .get(&url)
            .send()
            .await
            .context("Failed to fetch pull request")?;

        perf_log(&format!("fetch_pr #{}", pr.id), start.elapsed().as_millis());

        let payload: PrPayload = check_response(response, "pull request")
            .await?
            .json()
            .await
            .context("Failed to parse pull request JSON")?;

        Ok(payload.into_pull_request(&pr.workspace, &pr.repo))
    }

    /// Fetch the raw unified diff for a PR
    pub async fn fetch_diff(&self, pr: &PrInfo) -> Result<String> {
        let start = Instant::now();
        let url = format!(
            "{}/repositories/{}/{}/pullrequests/{}/diff",
            BASE_URL, pr.workspace, pr.repo, pr.id
        );

        let response = self
            .get(&url)
            .header(reqwest::header::ACCEPT, "text/plain")
            .send()
            .await
            .context("Failed to fetch PR diff")?;

        perf_log(&format!("fetch_diff #{}", pr.id), start.elapsed().as_millis());

        // A PR with no changes yields an empty body; the review screen
        // renders that as zero sections
        check_response(response, "PR diff")
            .await?
            .text()
            .await
            .context("Failed to read PR diff body")
    }

    /// Fetch per-file statuses for a PR from the diffstat endpoint
    pub async fn fetch_diffstat(&self, pr: &PrInfo) -> Result<HashMap<String, FileStatus>> {
        let start = Instant::now();
        let url = format!(
            "{}/repositories/{}/{}/pullrequests/{}/diffstat",
            BASE_URL, pr.workspace, pr.repo, pr.id
        );

        let response = self
            .get(&url)
            .send()
            .await
            .context("Failed to fetch PR diffstat")?;

        perf_log(
            &format!("fetch_diffstat #{}", pr.id),
            start.elapsed().as_millis(),
        );

        let page: Paginated<DiffstatEntry> = check_response(response, "PR diffstat")
            .await?
            .json()
            .await
            .context("Failed to parse diffstat JSON")?;

        Ok(page
            .values
            .iter()
            .filter_map(|e| {
                e.path()
                    .map(|p| (p.to_string(), FileStatus::from_diffstat(&e.status)))
            })
            .collect())
    }
}

/// Turn error responses into actionable messages
async fn check_response(
    response: reqwest::Response,
    what: &str,
) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    if status == reqwest::StatusCode::NOT_FOUND {
        return Err(anyhow!("{} not found (404)", what));
    }

    if status == reqwest::StatusCode::UNAUTHORIZED {
        return Err(anyhow!(
            "401 fetching {}: check auth.username and auth.app_password",
            what
        ));
    }

    let body = response.text().await.unwrap_or_default();
    if status == reqwest::StatusCode::FORBIDDEN && body.contains("whitelist") {
        return Err(anyhow!(
            "403 fetching {}, ensure your IP has been whitelisted",
            what
        ));
    }

    Err(anyhow!("Failed to fetch {}: HTTP {}", what, status))
}

/// Overwrite parsed file statuses with the authoritative diffstat ones.
/// Files missing from the diffstat keep their parsed status.
pub fn annotate_statuses(files: &mut [FileDiff], statuses: &HashMap<String, FileStatus>) {
    for file in files.iter_mut() {
        if let Some(status) = statuses.get(&file.path) {
            file.status = *status;
        }
    }
}
