use std::cmp::Ordering;

use crate::error::AppError;
use crate::models::repository::CommitDetail;
use crate::services::fan_out::{bounded, FanOut, ItemFailure};
use crate::services::github::types::{GitHubCommitItem, GitHubRepo};
use crate::services::github::{repo_path, GitHubClient, PER_PAGE};

/// Every commit authored by `username` across the repositories they own,
/// newest first
pub async fn fetch_commit_history(
    client: &GitHubClient,
    username: &str,
) -> Result<FanOut<Vec<CommitDetail>>, AppError> {
    let listing = client.list_user_repos(username).await?;
    let mut failures = listing.failures;

    let per_repo = bounded(listing.value, client.concurrency(), |repo| async move {
        fetch_repo_commits(client, &repo, username).await
    })
    .await;

    let mut commits = Vec::new();
    for fetched in per_repo {
        commits.extend(fetched.value);
        failures.extend(fetched.failures);
    }

    sort_newest_first(&mut commits);

    log::info!("📝 Collected {} commits for {}", commits.len(), username);

    Ok(FanOut::new(commits, failures))
}

/// Page through one repository's commits by `author`, following `rel="next"`
/// when GitHub sends it and a full page otherwise. A failing page stops that
/// repository; 409 (empty repository) is not a failure.
async fn fetch_repo_commits(
    client: &GitHubClient,
    repo: &GitHubRepo,
    author: &str,
) -> FanOut<Vec<CommitDetail>> {
    let path = format!("{}/commits", repo_path(&repo.owner.login, &repo.name));
    let mut commits = Vec::new();
    let mut failures = Vec::new();

    let mut page = 1u64;
    loop {
        let query = [
            ("author", author.to_string()),
            ("per_page", PER_PAGE.to_string()),
            ("page", page.to_string()),
        ];

        let fetched = match client
            .get_with_links::<Vec<GitHubCommitItem>>(&path, &query)
            .await
        {
            Ok(fetched) => fetched,
            Err(e) if e.status().is_some_and(|s| s.as_u16() == 409) => break,
            Err(e) => {
                failures.push(ItemFailure::new(repo.name.clone(), "commits", e));
                break;
            }
        };

        let count = fetched.body.len();
        commits.extend(
            fetched
                .body
                .into_iter()
                .map(|item| to_commit_detail(&repo.name, item)),
        );

        match fetched.links.next_page {
            Some(next) if next > page => page = next,
            Some(_) => break,
            None if count == PER_PAGE => page += 1,
            None => break,
        }
    }

    FanOut::new(commits, failures)
}

fn to_commit_detail(repo: &str, item: GitHubCommitItem) -> CommitDetail {
    let (message, timestamp) = match item.commit {
        Some(commit) => (commit.message, commit.author.and_then(|a| a.date)),
        None => (None, None),
    };

    CommitDetail {
        repo: repo.to_string(),
        message,
        timestamp,
        sha: item.sha,
        url: item.html_url,
    }
}

/// ISO 8601 timestamps in the same zone sort correctly as strings.
/// Commits without a timestamp go last.
pub fn sort_newest_first(commits: &mut [CommitDetail]) {
    commits.sort_by(|a, b| match (&a.timestamp, &b.timestamp) {
        (Some(a), Some(b)) => b.cmp(a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
}
