// GitHub REST API response types

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct GitHubOwner {
    pub login: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GitHubRepo {
    pub name: String,
    pub owner: GitHubOwner,
    pub description: Option<String>,
    pub homepage: Option<String>,
    #[serde(default)]
    pub stargazers_count: u64,
    pub html_url: String,
    pub language: Option<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GitHubReadme {
    pub content: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GitHubCommitItem {
    pub sha: Option<String>,
    pub html_url: Option<String>,
    pub commit: Option<GitHubCommit>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GitHubCommit {
    pub message: Option<String>,
    pub author: Option<GitHubCommitAuthor>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GitHubCommitAuthor {
    pub date: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GitHubPull {
    pub number: u64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
    pub closed_at: Option<String>,
    pub merged_at: Option<String>,
    pub user: Option<GitHubOwner>,
    #[serde(default)]
    pub html_url: String,
    pub body: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GitHubSearchResponse<T> {
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GitHubIssuePull {
    pub merged_at: Option<String>,
}

/// A pull request as returned by the issue search endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct GitHubSearchIssue {
    pub number: u64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
    pub closed_at: Option<String>,
    pub repository_url: Option<String>,
    pub pull_request: Option<GitHubIssuePull>,
    #[serde(default)]
    pub html_url: String,
    pub body: Option<String>,
}

impl GitHubSearchIssue {
    /// `(namespace, repository name)` taken from the last two segments of `repository_url`
    pub fn repository(&self) -> Option<(&str, &str)> {
        let mut segments = self
            .repository_url
            .as_deref()?
            .trim_end_matches('/')
            .rsplit('/');
        let repo = segments.next().filter(|s| !s.is_empty())?;
        let owner = segments.next().filter(|s| !s.is_empty())?;
        Some((owner, repo))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct GitHubAccount {
    pub login: String,
    pub id: u64,
    pub avatar_url: Option<String>,
    pub html_url: Option<String>,
}
