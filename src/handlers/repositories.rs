use actix_web::{web, HttpResponse};

use super::{partial_json, username};
use crate::error::AppError;
use crate::services::commit_history::fetch_commit_history;
use crate::services::github::GitHubApi;
use crate::services::repo_details::fetch_repo_details;
use crate::services::stars::fetch_stars;

/// GET /{username}/repos
pub async fn get_repos(
    path: web::Path<String>,
    github: web::Data<GitHubApi>,
) -> Result<HttpResponse, AppError> {
    let username = username(path)?;
    let client = github.authorized()?;

    let details = fetch_repo_details(&client, &username).await?;
    log::info!("📦 Built {} repository details for {}", details.value.len(), username);

    Ok(partial_json(details, "repos"))
}

/// GET /{username}/commits
/// All commits by the user in their own repositories, newest first
pub async fn get_commits(
    path: web::Path<String>,
    github: web::Data<GitHubApi>,
) -> Result<HttpResponse, AppError> {
    let username = username(path)?;
    let client = github.authorized()?;

    let commits = fetch_commit_history(&client, &username).await?;
    Ok(partial_json(commits, "commits"))
}

/// GET /{username}/stars
pub async fn get_stars(
    path: web::Path<String>,
    github: web::Data<GitHubApi>,
) -> Result<HttpResponse, AppError> {
    let username = username(path)?;
    let client = github.authorized()?;

    let stars = fetch_stars(&client, &username).await?;
    Ok(partial_json(stars, "stars"))
}
