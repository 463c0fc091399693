use actix_web::{web, HttpRequest, HttpResponse};

use super::{excluded_languages, partial_json, query_values, username};
use crate::error::AppError;
use crate::services::github::GitHubApi;
use crate::services::language_stats::fetch_top_languages;

/// GET /{username}/languages
/// Top languages by bytes. `excluded` may be repeated or comma-separated.
pub async fn get_languages(
    req: HttpRequest,
    path: web::Path<String>,
    github: web::Data<GitHubApi>,
) -> Result<HttpResponse, AppError> {
    let username = username(path)?;
    let client = github.authorized()?;

    let excluded = query_values(&req, "excluded");
    let excluded = excluded_languages(excluded.iter().map(String::as_str));

    log::info!("📊 Computing top languages for {}", username);

    let stats = fetch_top_languages(&client, &username, &excluded).await?;
    Ok(partial_json(stats, "languages"))
}
