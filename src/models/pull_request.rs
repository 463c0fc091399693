use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PullRequestState {
    Open,
    Closed,
    Merged,
}

impl PullRequestState {
    /// Upstream `state` only knows open/closed, so merged has to be derived
    /// from the timestamps. A merge timestamp wins over a close timestamp.
    pub fn derive(merged_at: Option<&str>, closed_at: Option<&str>, upstream: &str) -> Self {
        if merged_at.is_some() {
            Self::Merged
        } else if closed_at.is_some() || upstream.eq_ignore_ascii_case("closed") {
            Self::Closed
        } else {
            Self::Open
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PullRequestDetail {
    pub repo: String,
    pub number: u64,
    pub title: String,
    pub state: PullRequestState,
    pub created_at: String,
    pub updated_at: String,
    pub closed_at: Option<String>,
    pub merged_at: Option<String>,
    pub user: String,
    pub url: String,
    pub body: Option<String>,
}

/// A namespace the user has merged pull requests into
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OrganizationContribution {
    pub org: String,
    pub org_id: Option<u64>,
    pub org_url: String,
    pub org_avatar_url: Option<String>,
    pub repos: Vec<String>,
}
