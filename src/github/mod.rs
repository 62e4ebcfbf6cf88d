//! Gateway to the GitHub REST API.
//!
//! Error policy is deliberately asymmetric and this module is its single home:
//! fetch methods return `Err` on any non-2xx status and callers propagate the
//! failure out of `main` (fatal, exit 1, no retry). Mutating methods
//! ([`GitHubClient::post_comment`], [`GitHubClient::add_labels`],
//! [`GitHubClient::dispatch_workflow`]) use the same `Result` shape but
//! callers log the failure and continue, so a lost comment never aborts a run.

pub mod types;

pub use types::{
    ChangedFile, Comment, CommitInfo, Issue, IssueLabel, PullRequestDetails, Release, RepoEntry,
    RepoOverview, Repository, User,
};

use base64::Engine;
use chrono::{Duration, SecondsFormat, Utc};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, instrument, warn};

const USER_AGENT: &str = "baubles-bot";
const ACCEPT_JSON: &str = "application/vnd.github.v3+json";
const PAGE_SIZE: usize = 100;

#[derive(Debug, Error)]
pub enum GitHubError {
    #[error("GitHub API request failed: {0}")]
    ApiRequest(#[from] reqwest::Error),

    #[error("GitHub API returned {status} for {url}: {body}")]
    Status {
        url: String,
        status: u16,
        body: String,
    },

    #[error("Failed to decode content of {path}: {reason}")]
    ContentDecode { path: String, reason: String },
}

/// Keep only suggested labels that already exist in the repository's label
/// set; labels are never created implicitly.
pub fn filter_known_labels(suggested: &[String], existing: &[String]) -> Vec<String> {
    suggested
        .iter()
        .filter(|label| existing.iter().any(|e| e == *label))
        .cloned()
        .collect()
}

pub struct GitHubClient {
    http: reqwest::Client,
    token: String,
    api_base: String,
}

impl GitHubClient {
    pub fn new(token: impl Into<String>, api_base: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            token: token.into(),
            api_base: api_base.into().trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.api_base, path)
    }

    async fn check_status(
        url: &str,
        response: reqwest::Response,
    ) -> Result<reqwest::Response, GitHubError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(GitHubError::Status {
            url: url.to_string(),
            status: status.as_u16(),
            body,
        })
    }

    async fn get(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<reqwest::Response, GitHubError> {
        let url = self.url(path);
        debug!(%url, "GET");
        let response = self
            .http
            .get(&url)
            .header("User-Agent", USER_AGENT)
            .header("Accept", ACCEPT_JSON)
            .bearer_auth(&self.token)
            .query(query)
            .send()
            .await?;
        Self::check_status(&url, response).await
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, GitHubError> {
        Ok(self.get(path, query).await?.json::<T>().await?)
    }

    async fn post(
        &self,
        path: &str,
        payload: &serde_json::Value,
    ) -> Result<reqwest::Response, GitHubError> {
        let url = self.url(path);
        debug!(%url, "POST");
        let response = self
            .http
            .post(&url)
            .header("User-Agent", USER_AGENT)
            .header("Accept", ACCEPT_JSON)
            .bearer_auth(&self.token)
            .json(payload)
            .send()
            .await?;
        Self::check_status(&url, response).await
    }

    /// Fetch a single issue. Primary resource: failure is fatal to the run.
    #[instrument(skip(self))]
    pub async fn issue(&self, repo: &str, number: u64) -> Result<Issue, GitHubError> {
        self.get_json(&format!("repos/{repo}/issues/{number}"), &[])
            .await
    }

    /// Fetch the ordered comment sequence of an issue.
    #[instrument(skip(self))]
    pub async fn issue_comments(
        &self,
        repo: &str,
        number: u64,
    ) -> Result<Vec<Comment>, GitHubError> {
        self.get_json(&format!("repos/{repo}/issues/{number}/comments"), &[])
            .await
    }

    /// List open issues created in the last `days` days, newest first,
    /// excluding pull requests (which the issues endpoint also returns).
    #[instrument(skip(self))]
    pub async fn open_issues(
        &self,
        repo: &str,
        days: i64,
        limit: usize,
    ) -> Result<Vec<Issue>, GitHubError> {
        let since = (Utc::now() - Duration::days(days))
            .to_rfc3339_opts(SecondsFormat::Secs, true);
        let query = [
            ("state", "open".to_string()),
            ("sort", "created".to_string()),
            ("direction", "desc".to_string()),
            ("since", since),
            ("per_page", limit.to_string()),
        ];
        let issues: Vec<Issue> = self.get_json(&format!("repos/{repo}/issues"), &query).await?;
        Ok(issues
            .into_iter()
            .filter(|issue| !issue.is_pull_request())
            .collect())
    }

    /// Fetch repository metadata plus latest release, top contributors, and
    /// recent commits. Only the repository record itself is load-bearing; the
    /// extras degrade to empty when their fetches fail.
    #[instrument(skip(self))]
    pub async fn repo_overview(&self, repo: &str) -> Result<RepoOverview, GitHubError> {
        let repository: Repository = self.get_json(&format!("repos/{repo}"), &[]).await?;

        let latest_release = match self
            .get_json::<Release>(&format!("repos/{repo}/releases/latest"), &[])
            .await
        {
            Ok(release) => Some(release),
            Err(e) => {
                debug!(error = %e, "no latest release available");
                None
            }
        };

        let five = [("per_page", "5".to_string())];
        let contributors = self
            .get_json::<Vec<User>>(&format!("repos/{repo}/contributors"), &five)
            .await
            .unwrap_or_else(|e| {
                debug!(error = %e, "could not fetch contributors");
                Vec::new()
            });
        let recent_commits = self
            .get_json::<Vec<CommitInfo>>(&format!("repos/{repo}/commits"), &five)
            .await
            .unwrap_or_else(|e| {
                debug!(error = %e, "could not fetch recent commits");
                Vec::new()
            });

        Ok(RepoOverview {
            repository,
            latest_release,
            contributors,
            recent_commits,
        })
    }

    /// Fetch pull-request metadata. Primary resource: failure is fatal.
    #[instrument(skip(self))]
    pub async fn pull_request(
        &self,
        repo: &str,
        number: u64,
    ) -> Result<PullRequestDetails, GitHubError> {
        self.get_json(&format!("repos/{repo}/pulls/{number}"), &[])
            .await
    }

    /// Walk the paginated changed-file listing of a pull request until a
    /// short page signals the end.
    #[instrument(skip(self))]
    pub async fn pull_request_files(
        &self,
        repo: &str,
        number: u64,
    ) -> Result<Vec<ChangedFile>, GitHubError> {
        let path = format!("repos/{repo}/pulls/{number}/files");
        let mut files = Vec::new();
        let mut page = 1usize;
        loop {
            let query = [
                ("page", page.to_string()),
                ("per_page", PAGE_SIZE.to_string()),
            ];
            let page_files: Vec<ChangedFile> = self.get_json(&path, &query).await?;
            let short_page = page_files.len() < PAGE_SIZE;
            files.extend(page_files);
            if short_page {
                break;
            }
            page += 1;
        }
        Ok(files)
    }

    /// Look up the diff of one file via the compare endpoint, for changed
    /// files whose listing entry carried no inline patch.
    #[instrument(skip(self))]
    pub async fn compare_patch(
        &self,
        repo: &str,
        base: &str,
        head: &str,
        file_path: &str,
    ) -> Result<Option<String>, GitHubError> {
        #[derive(Deserialize)]
        struct Comparison {
            #[serde(default)]
            files: Vec<ChangedFile>,
        }

        let comparison: Comparison = self
            .get_json(&format!("repos/{repo}/compare/{base}...{head}"), &[])
            .await?;
        Ok(comparison
            .files
            .into_iter()
            .find(|f| f.filename == file_path)
            .and_then(|f| f.patch))
    }

    /// Fetch a file's content from the contents API and decode its base64
    /// payload.
    #[instrument(skip(self))]
    pub async fn file_content(
        &self,
        repo: &str,
        file_path: &str,
        git_ref: &str,
    ) -> Result<String, GitHubError> {
        #[derive(Deserialize)]
        struct Contents {
            #[serde(default)]
            content: String,
        }

        let query = [("ref", git_ref.to_string())];
        let contents: Contents = self
            .get_json(&format!("repos/{repo}/contents/{file_path}"), &query)
            .await?;
        let stripped: String = contents
            .content
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect();
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(&stripped)
            .map_err(|e| GitHubError::ContentDecode {
                path: file_path.to_string(),
                reason: e.to_string(),
            })?;
        String::from_utf8(bytes).map_err(|e| GitHubError::ContentDecode {
            path: file_path.to_string(),
            reason: e.to_string(),
        })
    }

    /// List entries of a directory in the repository tree (top level when
    /// `path` is empty).
    #[instrument(skip(self))]
    pub async fn repo_entries(
        &self,
        repo: &str,
        path: &str,
    ) -> Result<Vec<RepoEntry>, GitHubError> {
        self.get_json(&format!("repos/{repo}/contents/{path}"), &[])
            .await
    }

    /// List the names of all labels defined in the repository.
    #[instrument(skip(self))]
    pub async fn list_labels(&self, repo: &str) -> Result<Vec<String>, GitHubError> {
        let labels: Vec<IssueLabel> = self.get_json(&format!("repos/{repo}/labels"), &[]).await?;
        Ok(labels.into_iter().map(|l| l.name).collect())
    }

    /// Post a comment on an issue or pull request. Side effect: callers log
    /// failures and keep going.
    #[instrument(skip(self, body))]
    pub async fn post_comment(
        &self,
        repo: &str,
        number: u64,
        body: &str,
    ) -> Result<(), GitHubError> {
        let payload = serde_json::json!({ "body": body });
        self.post(&format!("repos/{repo}/issues/{number}/comments"), &payload)
            .await?;
        Ok(())
    }

    /// Add labels to an issue as given; existence filtering is the caller's
    /// concern (see [`filter_known_labels`]). Side effect: non-fatal.
    #[instrument(skip(self))]
    pub async fn add_labels(
        &self,
        repo: &str,
        number: u64,
        labels: &[String],
    ) -> Result<(), GitHubError> {
        if labels.is_empty() {
            warn!("no labels to add");
            return Ok(());
        }
        let payload = serde_json::json!({ "labels": labels });
        self.post(&format!("repos/{repo}/issues/{number}/labels"), &payload)
            .await?;
        Ok(())
    }

    /// Trigger another automation pipeline asynchronously via workflow
    /// dispatch. Side effect: non-fatal.
    #[instrument(skip(self, inputs))]
    pub async fn dispatch_workflow(
        &self,
        repo: &str,
        workflow_file: &str,
        git_ref: &str,
        inputs: serde_json::Value,
    ) -> Result<(), GitHubError> {
        let payload = serde_json::json!({ "ref": git_ref, "inputs": inputs });
        self.post(
            &format!("repos/{repo}/actions/workflows/{workflow_file}/dispatches"),
            &payload,
        )
        .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_known_labels_drops_unknown() {
        let suggested = vec![
            "bug".to_string(),
            "made-up-label".to_string(),
            "enhancement".to_string(),
        ];
        let existing = vec![
            "bug".to_string(),
            "enhancement".to_string(),
            "question".to_string(),
        ];
        let valid = filter_known_labels(&suggested, &existing);
        assert_eq!(valid, vec!["bug".to_string(), "enhancement".to_string()]);
    }

    #[test]
    fn test_filter_known_labels_is_case_sensitive() {
        let suggested = vec!["Bug".to_string()];
        let existing = vec!["bug".to_string()];
        assert!(filter_known_labels(&suggested, &existing).is_empty());
    }

    #[test]
    fn test_filter_known_labels_empty_suggestions() {
        let existing = vec!["bug".to_string()];
        assert!(filter_known_labels(&[], &existing).is_empty());
    }

    #[test]
    fn test_url_joins_without_double_slash() {
        let client = GitHubClient::new("t", "https://api.github.com/");
        assert_eq!(
            client.url("repos/o/r/issues/1"),
            "https://api.github.com/repos/o/r/issues/1"
        );
    }

    #[tokio::test]
    async fn test_non_success_fetch_maps_to_status_error() {
        use std::io::{Read, Write};

        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let server = std::thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut buf = [0u8; 1024];
            let _ = stream.read(&mut buf);
            let body = "issue not found";
            let response = format!(
                "HTTP/1.1 404 Not Found\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                body.len(),
                body
            );
            stream.write_all(response.as_bytes()).unwrap();
        });

        let client = GitHubClient::new("token", format!("http://{addr}"));
        let err = client.issue("owner/repo", 1).await.unwrap_err();
        match err {
            GitHubError::Status { status, body, url } => {
                assert_eq!(status, 404);
                assert_eq!(body, "issue not found");
                assert!(url.ends_with("repos/owner/repo/issues/1"));
            }
            other => panic!("expected status error, got {other}"),
        }
        server.join().unwrap();
    }
}
