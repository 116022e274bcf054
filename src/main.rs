mod bitbucket;
mod config;
mod parser;
mod types;
mod ui;

use anyhow::{bail, Context, Result};
use clap::Parser;

use crate::bitbucket::{annotate_statuses, parse_pr_url, BitbucketClient};
use crate::config::Config;
use crate::parser::parse_diff;
use crate::ui::App;

const LOGO: &str = r#"
  bbtui
"#;

#[derive(Parser)]
#[command(name = "bbtui")]
#[command(about = "A fast TUI for reviewing Bitbucket Cloud pull requests")]
#[command(version)]
struct Args {
    /// Bitbucket PR URL (e.g., https://bitbucket.org/workspace/repo/pull-requests/42)
    /// If not provided, shows the repository's open PRs
    pr_url: Option<String>,

    /// Repository to list PRs for, as workspace/slug.
    /// Falls back to the [defaults] section of the config file.
    #[arg(long, value_name = "WORKSPACE/SLUG")]
    repo: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    eprintln!("{}", LOGO);

    let config = Config::load();
    let client = BitbucketClient::new(&config.auth)?;

    match args.pr_url {
        Some(url) => {
            // Direct PR URL mode
            let pr_info = parse_pr_url(&url)?;
            eprintln!(
                "Fetching PR #{} from {}...",
                pr_info.id,
                pr_info.repo_full_name()
            );

            let (pr, diff_content, statuses) = tokio::try_join!(
                client.fetch_pr(&pr_info),
                client.fetch_diff(&pr_info),
                client.fetch_diffstat(&pr_info)
            )?;

            let mut files = parse_diff(&diff_content);
            annotate_statuses(&mut files, &statuses);

            eprintln!("Found {} changed files. Starting viewer...", files.len());

            let mut app = App::new_detail(config, client, pr, files);
            app.run()?;
        }
        None => {
            // PR list mode
            let (workspace, repo) = resolve_repo(&args, &config)?;
            eprintln!("Fetching open PRs for {}/{}...", workspace, repo);

            let prs = client.list_open_prs(&workspace, &repo).await?;
            if prs.is_empty() {
                eprintln!("No open PRs found for {}/{}.", workspace, repo);
                return Ok(());
            }

            eprintln!("Found {} open PRs. Starting viewer...", prs.len());

            let mut app = App::new_with_prs(config, client, workspace, repo, prs);
            app.run()?;
        }
    }

    Ok(())
}

/// The repository to list comes from --repo, then the config file's
/// [defaults] section, then the current directory's git remote.
fn resolve_repo(args: &Args, config: &Config) -> Result<(String, String)> {
    if let Some(ref arg) = args.repo {
        let (workspace, slug) = arg
            .split_once('/')
            .context("--repo must be in workspace/slug form")?;
        if workspace.is_empty() || slug.is_empty() {
            bail!("--repo must be in workspace/slug form");
        }
        return Ok((workspace.to_string(), slug.to_string()));
    }

    if let Some((workspace, slug)) = config.defaults.slug() {
        return Ok((workspace, slug));
    }

    if let Some((workspace, slug)) = repo_from_git_remote() {
        return Ok((workspace, slug));
    }

    let path = Config::config_path()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "~/.config/bbtui/config.toml".to_string());
    bail!(
        "No repository given. Pass --repo workspace/slug, set [defaults] \
         workspace and repo in {}, or run from a clone with a bitbucket.org \
         remote",
        path
    )
}

/// Workspace/slug from the current directory's origin remote, when it
/// points at bitbucket.org
fn repo_from_git_remote() -> Option<(String, String)> {
    let output = std::process::Command::new("git")
        .args(["remote", "get-url", "origin"])
        .stderr(std::process::Stdio::null())
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }
    let remote = String::from_utf8(output.stdout).ok()?;
    parse_remote_slug(remote.trim())
}

/// Parse workspace/slug out of an ssh or https bitbucket.org remote URL
fn parse_remote_slug(remote: &str) -> Option<(String, String)> {
    let rest = remote
        .strip_prefix("git@bitbucket.org:")
        .or_else(|| remote.strip_prefix("ssh://git@bitbucket.org/"))
        .or_else(|| {
            let no_scheme = remote.strip_prefix("https://")?;
            // Credentials may be embedded (https://user@bitbucket.org/...)
            let host_and_path = no_scheme.rsplit_once('@').map_or(no_scheme, |(_, h)| h);
            host_and_path.strip_prefix("bitbucket.org/")
        })?;

    let rest = rest.strip_suffix(".git").unwrap_or(rest);
    let (workspace, slug) = rest.split_once('/')?;
    if workspace.is_empty() || slug.is_empty() || slug.contains('/') {
        return None;
    }
    Some((workspace.to_string(), slug.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_remote_slug_ssh() {
        assert_eq!(
            parse_remote_slug("git@bitbucket.org:acme/widgets.git"),
            Some(("acme".to_string(), "widgets".to_string()))
        );
        assert_eq!(
            parse_remote_slug("ssh://git@bitbucket.org/acme/widgets.git"),
            Some(("acme".to_string(), "widgets".to_string()))
        );
    }

    #[test]
    fn test_parse_remote_slug_https() {
        assert_eq!(
            parse_remote_slug("https://bitbucket.org/acme/widgets.git"),
            Some(("acme".to_string(), "widgets".to_string()))
        );
        assert_eq!(
            parse_remote_slug("https://user@bitbucket.org/acme/widgets"),
            Some(("acme".to_string(), "widgets".to_string()))
        );
    }

    #[test]
    fn test_parse_remote_slug_rejects_other_hosts() {
        assert_eq!(parse_remote_slug("git@github.com:acme/widgets.git"), None);
        assert_eq!(parse_remote_slug("https://gitlab.com/acme/widgets"), None);
        assert_eq!(parse_remote_slug("git@bitbucket.org:acme"), None);
    }
}
