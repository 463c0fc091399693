use std::collections::{BTreeMap, BTreeSet};

use crate::error::AppError;
use crate::models::pull_request::{OrganizationContribution, PullRequestDetail, PullRequestState};
use crate::services::fan_out::{bounded, FanOut, ItemFailure};
use crate::services::github::types::{
    GitHubAccount, GitHubPull, GitHubRepo, GitHubSearchIssue, GitHubSearchResponse,
};
use crate::services::github::{repo_path, GitHubClient, PER_PAGE};

/// The search API serves at most 1000 results
const MAX_SEARCH_PAGES: u32 = 10;

/// Pull requests the user opened in repositories they own
pub async fn fetch_own_pull_requests(
    client: &GitHubClient,
    username: &str,
) -> Result<FanOut<Vec<PullRequestDetail>>, AppError> {
    let listing = client.list_user_repos(username).await?;
    let mut failures = listing.failures;

    let per_repo = bounded(listing.value, client.concurrency(), |repo| async move {
        fetch_repo_pulls(client, &repo, username).await
    })
    .await;

    let mut pulls = Vec::new();
    for fetched in per_repo {
        pulls.extend(fetched.value);
        failures.extend(fetched.failures);
    }

    pulls.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    Ok(FanOut::new(pulls, failures))
}

async fn fetch_repo_pulls(
    client: &GitHubClient,
    repo: &GitHubRepo,
    username: &str,
) -> FanOut<Vec<PullRequestDetail>> {
    let path = format!("{}/pulls", repo_path(&repo.owner.login, &repo.name));
    let mut pulls = Vec::new();
    let mut failures = Vec::new();

    for page in 1u32.. {
        let query = [
            ("state", "all".to_string()),
            ("per_page", PER_PAGE.to_string()),
            ("page", page.to_string()),
        ];

        let items: Vec<GitHubPull> = match client.get_json(&path, &query).await {
            Ok(items) => items,
            Err(e) => {
                failures.push(ItemFailure::new(repo.name.clone(), "pulls", e));
                break;
            }
        };

        let count = items.len();
        pulls.extend(
            items
                .into_iter()
                .filter(|pull| {
                    pull.user
                        .as_ref()
                        .is_some_and(|u| u.login.eq_ignore_ascii_case(username))
                })
                .map(|pull| own_pull_detail(&repo.name, pull)),
        );

        if count < PER_PAGE {
            break;
        }
    }

    FanOut::new(pulls, failures)
}

fn own_pull_detail(repo: &str, pull: GitHubPull) -> PullRequestDetail {
    let state = PullRequestState::derive(
        pull.merged_at.as_deref(),
        pull.closed_at.as_deref(),
        &pull.state,
    );

    PullRequestDetail {
        repo: repo.to_string(),
        number: pull.number,
        title: pull.title,
        state,
        created_at: pull.created_at,
        updated_at: pull.updated_at,
        closed_at: pull.closed_at,
        merged_at: pull.merged_at,
        user: pull.user.map(|u| u.login).unwrap_or_default(),
        url: pull.html_url,
        body: pull.body,
    }
}

/// A pull request found by search, with the namespace of its repository
struct ExternalPull {
    namespace: String,
    detail: PullRequestDetail,
}

/// Pull requests the user opened in repositories owned by someone else
pub async fn fetch_external_pull_requests(
    client: &GitHubClient,
    username: &str,
) -> Result<FanOut<Vec<PullRequestDetail>>, AppError> {
    Ok(search_external_pulls(client, username)
        .await?
        .map(|pulls| pulls.into_iter().map(|p| p.detail).collect()))
}

async fn search_external_pulls(
    client: &GitHubClient,
    username: &str,
) -> Result<FanOut<Vec<ExternalPull>>, AppError> {
    let mut pulls = Vec::new();
    let mut failures = Vec::new();

    for page in 1..=MAX_SEARCH_PAGES {
        let query = [
            ("q", format!("type:pr author:{}", username)),
            ("per_page", PER_PAGE.to_string()),
            ("page", page.to_string()),
        ];

        let response: GitHubSearchResponse<GitHubSearchIssue> =
            match client.get_json("/search/issues", &query).await {
                Ok(response) => response,
                Err(e) if page == 1 => return Err(e.into()),
                Err(e) => {
                    failures.push(ItemFailure::new(
                        format!("search page {}", page),
                        "search_pull_requests",
                        e,
                    ));
                    break;
                }
            };

        let count = response.items.len();
        pulls.extend(
            response
                .items
                .into_iter()
                .filter_map(|issue| external_pull(issue, username)),
        );

        if count < PER_PAGE {
            break;
        }
    }

    log::info!("🔍 Found {} external pull requests for {}", pulls.len(), username);

    Ok(FanOut::new(pulls, failures))
}

/// `None` for results without a repository or living in the user's own namespace
fn external_pull(issue: GitHubSearchIssue, username: &str) -> Option<ExternalPull> {
    let (namespace, repo) = issue.repository()?;
    if namespace.eq_ignore_ascii_case(username) {
        return None;
    }
    let namespace = namespace.to_string();
    let repo = repo.to_string();

    let merged_at = issue.pull_request.and_then(|p| p.merged_at);
    let state = PullRequestState::derive(
        merged_at.as_deref(),
        issue.closed_at.as_deref(),
        &issue.state,
    );

    Some(ExternalPull {
        namespace,
        detail: PullRequestDetail {
            repo,
            number: issue.number,
            title: issue.title,
            state,
            created_at: issue.created_at,
            updated_at: issue.updated_at,
            closed_at: issue.closed_at,
            merged_at,
            user: username.to_string(),
            url: issue.html_url,
            body: issue.body,
        },
    })
}

/// Namespaces the user has merged pull requests into, with the repositories involved.
///
/// Namespaces are not checked to actually be organizations. Account metadata
/// is looked up once per namespace; a failed lookup leaves id and avatar empty.
pub async fn fetch_organization_contributions(
    client: &GitHubClient,
    username: &str,
) -> Result<FanOut<Vec<OrganizationContribution>>, AppError> {
    let external = search_external_pulls(client, username).await?;
    let mut failures = external.failures;

    let grouped = group_merged_by_namespace(external.value);

    let mut accounts: BTreeMap<String, Option<GitHubAccount>> = BTreeMap::new();
    let lookups = bounded(
        grouped.keys().cloned(),
        client.concurrency(),
        |namespace| async move {
            let path = format!("/users/{}", urlencoding::encode(&namespace));
            let account = client.get_json::<GitHubAccount>(&path, &[]).await;
            (namespace, account)
        },
    )
    .await;

    for (namespace, account) in lookups {
        match account {
            Ok(account) => {
                accounts.insert(namespace, Some(account));
            }
            Err(e) => {
                failures.push(ItemFailure::new(namespace.clone(), "org_metadata", e));
                accounts.insert(namespace, None);
            }
        }
    }

    let contributions = grouped
        .into_iter()
        .map(|(namespace, repos)| {
            let account = accounts.remove(&namespace).flatten();
            OrganizationContribution {
                org_url: account
                    .as_ref()
                    .and_then(|a| a.html_url.clone())
                    .unwrap_or_else(|| format!("https://github.com/{}", namespace)),
                org_id: account.as_ref().map(|a| a.id),
                org_avatar_url: account.and_then(|a| a.avatar_url),
                org: namespace,
                repos: repos.into_iter().collect(),
            }
        })
        .collect();

    Ok(FanOut::new(contributions, failures))
}

/// Merged pulls only, namespace -> distinct repository names (both sorted)
fn group_merged_by_namespace(pulls: Vec<ExternalPull>) -> BTreeMap<String, BTreeSet<String>> {
    let mut grouped: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
    for pull in pulls {
        if pull.detail.state == PullRequestState::Merged {
            grouped
                .entry(pull.namespace)
                .or_default()
                .insert(pull.detail.repo);
        }
    }
    grouped
}
