use chrono::{DateTime, Utc};
use serde::Deserialize;

/// A GitHub account, reduced to the only field the pipelines read.
#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub login: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IssueLabel {
    pub name: String,
}

/// Issue record as returned by the issues endpoints.
///
/// The listing endpoint also returns pull requests; those entries carry a
/// `pull_request` object and are filtered out by `is_pull_request`.
#[derive(Debug, Clone, Deserialize)]
pub struct Issue {
    pub number: u64,
    pub title: String,
    pub body: Option<String>,
    pub user: User,
    #[serde(default)]
    pub labels: Vec<IssueLabel>,
    pub state: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub pull_request: Option<serde_json::Value>,
}

impl Issue {
    pub fn is_pull_request(&self) -> bool {
        self.pull_request.is_some()
    }

    /// The issue body, or empty text when the author left it blank.
    pub fn body_text(&self) -> &str {
        self.body.as_deref().unwrap_or("")
    }

    pub fn label_names(&self) -> Vec<&str> {
        self.labels.iter().map(|l| l.name.as_str()).collect()
    }
}

/// One comment in an issue's ordered comment sequence.
#[derive(Debug, Clone, Deserialize)]
pub struct Comment {
    pub user: User,
    pub created_at: DateTime<Utc>,
    pub body: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CommitRef {
    pub sha: String,
}

/// Pull-request metadata from the pulls endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct PullRequestDetails {
    pub number: u64,
    pub title: String,
    pub body: Option<String>,
    pub user: User,
    pub base: CommitRef,
    pub head: CommitRef,
}

impl PullRequestDetails {
    pub fn body_text(&self) -> &str {
        self.body.as_deref().unwrap_or("")
    }
}

/// One entry from the paginated pulls/{n}/files listing. `patch` is absent
/// for binary files and for oversized diffs.
#[derive(Debug, Clone, Deserialize)]
pub struct ChangedFile {
    pub filename: String,
    pub status: String,
    pub patch: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Repository {
    pub full_name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Release {
    pub tag_name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CommitInfo {
    pub commit: CommitMessage,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CommitMessage {
    pub message: String,
}

/// Repository metadata bundle interpolated into the issue-analyzer prompt.
/// The optional parts degrade to empty when their sub-fetches fail.
#[derive(Debug, Clone)]
pub struct RepoOverview {
    pub repository: Repository,
    pub latest_release: Option<Release>,
    pub contributors: Vec<User>,
    pub recent_commits: Vec<CommitInfo>,
}

/// One entry from the repository contents listing endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct RepoEntry {
    pub path: String,
    #[serde(rename = "type")]
    pub kind: String,
}
