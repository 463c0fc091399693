use serde::{Deserialize, Serialize};

/// Per-repository summary for the dashboard
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RepoDetail {
    pub title: String,
    pub description: Option<String>,
    pub live_website_url: Option<String>,
    pub languages: Vec<String>,
    pub num_commits: u64,
    pub stars: u64,
    /// Base64 README content without line breaks
    pub readme: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CommitDetail {
    pub repo: String,
    pub message: Option<String>,
    pub timestamp: Option<String>,
    pub sha: Option<String>,
    pub url: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StarredRepository {
    pub name: String,
    pub description: Option<String>,
    pub stars: u64,
    pub url: String,
    pub language: Option<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StarsSummary {
    pub total_stars: u64,
    pub repositories: Vec<StarredRepository>,
}
