pub mod graphql;
pub mod pagination;
pub mod types;

use reqwest::header::{ACCEPT, LINK};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

use self::graphql::GraphQlRequest;
use self::pagination::{parse_link_header, LinkPagination};
use self::types::GitHubRepo;
use crate::error::AppError;
use crate::services::fan_out::{FanOut, ItemFailure};
use crate::utils::config::Config;
use crate::utils::http_client::create_http_client;

/// Page size used for every paged REST listing
pub const PER_PAGE: usize = 100;

const GITHUB_ACCEPT: &str = "application/vnd.github.v3+json";

/// Failure of a single upstream call
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("GitHub responded with status {0}")]
    Status(StatusCode),
    #[error("request to GitHub failed: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("unexpected payload: {0}")]
    Decode(String),
}

impl UpstreamError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Status(status) => Some(*status),
            _ => None,
        }
    }
}

impl From<UpstreamError> for AppError {
    fn from(err: UpstreamError) -> Self {
        match err {
            UpstreamError::Decode(msg) => AppError::UpstreamFormat(msg),
            other => {
                log::warn!("GitHub call failed: {}", other);
                AppError::NotFound
            }
        }
    }
}

/// Decoded body plus the pagination links that came with it
#[derive(Debug)]
pub struct Fetched<T> {
    pub body: T,
    pub links: LinkPagination,
}

/// Shared, token-less handle stored in app data.
/// Call [`GitHubApi::authorized`] to get a client that can talk to GitHub.
#[derive(Clone)]
pub struct GitHubApi {
    http: Client,
    base_url: String,
    token: Option<String>,
    concurrency: usize,
}

impl GitHubApi {
    pub fn new(
        http: Client,
        base_url: impl Into<String>,
        token: Option<String>,
        concurrency: usize,
    ) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token,
            concurrency: concurrency.max(1),
        }
    }

    pub fn from_config(config: &Config) -> reqwest::Result<Self> {
        Ok(Self::new(
            create_http_client(config.request_timeout_secs)?,
            config.github_api_url.clone(),
            config.github_token.clone(),
            config.max_concurrent_requests,
        ))
    }

    /// Fails with [`AppError::MissingToken`] before any request is made
    pub fn authorized(&self) -> Result<GitHubClient, AppError> {
        let token = self.token.clone().ok_or(AppError::MissingToken)?;
        Ok(GitHubClient {
            http: self.http.clone(),
            base_url: self.base_url.clone(),
            token,
            concurrency: self.concurrency,
        })
    }
}

#[derive(Clone)]
pub struct GitHubClient {
    http: Client,
    base_url: String,
    token: String,
    concurrency: usize,
}

impl GitHubClient {
    /// Maximum number of upstream requests a fan-out may keep in flight
    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    fn get(&self, path: &str) -> RequestBuilder {
        self.http
            .get(format!("{}{}", self.base_url, path))
            .bearer_auth(&self.token)
            .header(ACCEPT, GITHUB_ACCEPT)
    }

    /// GET a REST path and decode its JSON body, keeping the Link header
    pub async fn get_with_links<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<Fetched<T>, UpstreamError> {
        let response = self
            .get(path)
            .query(query)
            .send()
            .await
            .map_err(UpstreamError::Transport)?;

        let status = response.status();
        if !status.is_success() {
            return Err(UpstreamError::Status(status));
        }

        let links = response
            .headers()
            .get(LINK)
            .and_then(|v| v.to_str().ok())
            .map(parse_link_header)
            .unwrap_or_default();

        let bytes = response.bytes().await.map_err(UpstreamError::Transport)?;
        let body = serde_json::from_slice(&bytes).map_err(|e| UpstreamError::Decode(e.to_string()))?;

        Ok(Fetched { body, links })
    }

    pub async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, UpstreamError> {
        Ok(self.get_with_links(path, query).await?.body)
    }

    /// POST a GraphQL request. GraphQL-level `errors` are left in the body for
    /// the caller to inspect; only transport and HTTP failures are errors here.
    pub async fn graphql<T: DeserializeOwned>(
        &self,
        request: &GraphQlRequest,
    ) -> Result<T, UpstreamError> {
        let response = self
            .http
            .post(format!("{}/graphql", self.base_url))
            .bearer_auth(&self.token)
            .json(request)
            .send()
            .await
            .map_err(UpstreamError::Transport)?;

        let status = response.status();
        if !status.is_success() {
            return Err(UpstreamError::Status(status));
        }

        let bytes = response.bytes().await.map_err(UpstreamError::Transport)?;
        serde_json::from_slice(&bytes).map_err(|e| UpstreamError::Decode(e.to_string()))
    }

    /// List every repository owned by `username`, 100 per page until a short page.
    ///
    /// A failing first page means the user does not exist (or GitHub is
    /// unhappy) and is an error. Later page failures and entries that do not
    /// decode are absorbed as failures.
    pub async fn list_user_repos(
        &self,
        username: &str,
    ) -> Result<FanOut<Vec<GitHubRepo>>, AppError> {
        let path = format!("/users/{}/repos", urlencoding::encode(username));
        let mut repos = Vec::new();
        let mut failures = Vec::new();

        for page in 1u32.. {
            let query = [
                ("per_page", PER_PAGE.to_string()),
                ("type", "owner".to_string()),
                ("sort", "pushed".to_string()),
                ("page", page.to_string()),
            ];

            let raw: Vec<Value> = match self.get_json(&path, &query).await {
                Ok(raw) => raw,
                Err(err) if page == 1 => return Err(err.into()),
                Err(err) => {
                    failures.push(ItemFailure::new(
                        format!("{} repositories page {}", username, page),
                        "list_repositories",
                        err,
                    ));
                    break;
                }
            };

            let count = raw.len();
            for value in raw {
                let label = value
                    .get("name")
                    .and_then(Value::as_str)
                    .unwrap_or("<unnamed>")
                    .to_string();
                match serde_json::from_value::<GitHubRepo>(value) {
                    Ok(repo) => repos.push(repo),
                    Err(e) => failures.push(ItemFailure::new(label, "decode_repository", e)),
                }
            }

            if count < PER_PAGE {
                break;
            }
        }

        log::info!("📦 Listed {} repositories for {}", repos.len(), username);

        Ok(FanOut::new(repos, failures))
    }
}

/// `/repos/{owner}/{repo}` with both segments percent-encoded
pub fn repo_path(owner: &str, repo: &str) -> String {
    format!(
        "/repos/{}/{}",
        urlencoding::encode(owner),
        urlencoding::encode(repo)
    )
}
