use crate::error::AppError;
use crate::models::repository::{StarredRepository, StarsSummary};
use crate::services::fan_out::FanOut;
use crate::services::github::types::GitHubRepo;
use crate::services::github::GitHubClient;

pub async fn fetch_stars(
    client: &GitHubClient,
    username: &str,
) -> Result<FanOut<StarsSummary>, AppError> {
    Ok(client.list_user_repos(username).await?.map(summarize_stars))
}

/// Total stargazers plus the repositories, most starred first
pub fn summarize_stars(repos: Vec<GitHubRepo>) -> StarsSummary {
    let mut repositories: Vec<StarredRepository> = repos
        .into_iter()
        .map(|repo| StarredRepository {
            name: repo.name,
            description: repo.description,
            stars: repo.stargazers_count,
            url: repo.html_url,
            language: repo.language,
            created_at: repo.created_at,
            updated_at: repo.updated_at,
        })
        .collect();

    repositories.sort_by(|a, b| b.stars.cmp(&a.stars).then_with(|| a.name.cmp(&b.name)));

    StarsSummary {
        total_stars: repositories.iter().map(|r| r.stars).sum(),
        repositories,
    }
}
