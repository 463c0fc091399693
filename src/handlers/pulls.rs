use actix_web::{web, HttpResponse};

use super::{partial_json, username};
use crate::error::AppError;
use crate::services::github::GitHubApi;
use crate::services::pull_requests::{
    fetch_external_pull_requests, fetch_organization_contributions, fetch_own_pull_requests,
};

/// GET /{username}/me/pulls
/// Pull requests the user opened in their own repositories
pub async fn get_own_pulls(
    path: web::Path<String>,
    github: web::Data<GitHubApi>,
) -> Result<HttpResponse, AppError> {
    let username = username(path)?;
    let client = github.authorized()?;

    let pulls = fetch_own_pull_requests(&client, &username).await?;
    Ok(partial_json(pulls, "own pulls"))
}

/// GET /{username}/prs
/// Pull requests the user opened in other people's repositories
pub async fn get_external_pulls(
    path: web::Path<String>,
    github: web::Data<GitHubApi>,
) -> Result<HttpResponse, AppError> {
    let username = username(path)?;
    let client = github.authorized()?;

    let pulls = fetch_external_pull_requests(&client, &username).await?;
    Ok(partial_json(pulls, "external pulls"))
}

/// GET /{username}/org-contributions
pub async fn get_org_contributions(
    path: web::Path<String>,
    github: web::Data<GitHubApi>,
) -> Result<HttpResponse, AppError> {
    let username = username(path)?;
    let client = github.authorized()?;

    let orgs = fetch_organization_contributions(&client, &username).await?;
    Ok(partial_json(orgs, "org contributions"))
}
