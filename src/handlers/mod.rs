pub mod contributions;
pub mod languages;
pub mod profile_views;
pub mod pulls;
pub mod repositories;

use std::collections::HashSet;

use actix_web::{web, HttpRequest, HttpResponse};
use serde::Serialize;

use crate::error::AppError;
use crate::services::fan_out::FanOut;
use crate::services::language_stats::default_excluded;
use crate::utils::validators::validate_username;

/// Response header carrying the number of absorbed sub-fetch failures
pub const PARTIAL_FAILURES_HEADER: &str = "X-Partial-Failures";

/// Register every route under `/{username}`
pub fn configure(cfg: &mut web::ServiceConfig) {
    // Malformed query values get the same JSON error body as everything else
    cfg.app_data(
        web::QueryConfig::default()
            .error_handler(|err, _req| AppError::BadRequest(err.to_string()).into()),
    );

    cfg.service(
        web::scope("/{username}")
            .route("/languages", web::get().to(languages::get_languages))
            .route("/contributions", web::get().to(contributions::get_contributions))
            .route("/stats", web::get().to(contributions::get_stats))
            .route("/repos", web::get().to(repositories::get_repos))
            .route("/commits", web::get().to(repositories::get_commits))
            .route("/stars", web::get().to(repositories::get_stars))
            .route("/me/pulls", web::get().to(pulls::get_own_pulls))
            .route("/prs", web::get().to(pulls::get_external_pulls))
            .route("/org-contributions", web::get().to(pulls::get_org_contributions))
            .route("/profile-views", web::get().to(profile_views::get_profile_views)),
    );
}

/// Username from the path, rejected early if GitHub could never accept it
pub(crate) fn username(path: web::Path<String>) -> Result<String, AppError> {
    let username = path.into_inner();
    validate_username(&username).map_err(|e| AppError::BadRequest(e.to_string()))?;
    Ok(username)
}

/// 200 with the value as JSON; absorbed failures are logged and counted in a header
pub(crate) fn partial_json<T: Serialize>(fan_out: FanOut<T>, context: &str) -> HttpResponse {
    fan_out.log_failures(context);

    let mut response = HttpResponse::Ok();
    if !fan_out.failures.is_empty() {
        response.insert_header((PARTIAL_FAILURES_HEADER, fan_out.failures.len().to_string()));
    }
    response.json(fan_out.value)
}

/// Language names from a list of possibly comma-separated values.
/// Nothing given means the default exclusions.
pub(crate) fn excluded_languages<'a>(
    values: impl IntoIterator<Item = &'a str>,
) -> HashSet<String> {
    let names: HashSet<String> = values
        .into_iter()
        .flat_map(|value| value.split(','))
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect();

    if names.is_empty() {
        default_excluded()
    } else {
        names
    }
}

/// Every value of `key` in the query string, so `?a=1&a=2` yields both
pub(crate) fn query_values(req: &HttpRequest, key: &str) -> Vec<String> {
    url::form_urlencoded::parse(req.query_string().as_bytes())
        .filter(|(k, _)| k == key)
        .map(|(_, v)| v.into_owned())
        .collect()
}

#[cfg(test)]
pub(crate) mod testing {
    use actix_web::web;

    use crate::services::github::GitHubApi;
    use crate::services::profile_views::ProfileViewStore;

    pub fn github_api(base_url: &str, token: Option<&str>) -> web::Data<GitHubApi> {
        web::Data::new(GitHubApi::new(
            reqwest::Client::new(),
            base_url,
            token.map(str::to_string),
            4,
        ))
    }

    pub async fn view_store(dir: &tempfile::TempDir) -> web::Data<ProfileViewStore> {
        web::Data::new(ProfileViewStore::load(dir.path().join("views.json")).await)
    }
}
