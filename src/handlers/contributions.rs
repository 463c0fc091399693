use actix_web::{web, HttpResponse};
use serde::Deserialize;

use super::{excluded_languages, partial_json, username};
use crate::error::AppError;
use crate::models::contribution::{ContributionsResponse, StatsResponse};
use crate::services::contribution_aggregation::fetch_contribution_history;
use crate::services::github::GitHubApi;
use crate::services::language_stats::fetch_top_languages;
use crate::services::profile_views::ProfileViewStore;
use crate::services::streaks;
use crate::utils::validators::validate_starting_year;

#[derive(Debug, Deserialize)]
pub struct ContributionsQuery {
    pub starting_year: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct StatsQuery {
    /// Comma-separated language names
    pub exclude: Option<String>,
}

/// GET /{username}/contributions
/// Raw yearly calendars plus total commits and streaks
pub async fn get_contributions(
    path: web::Path<String>,
    query: web::Query<ContributionsQuery>,
    github: web::Data<GitHubApi>,
) -> Result<HttpResponse, AppError> {
    let username = username(path)?;

    if let Some(year) = query.starting_year {
        validate_starting_year(year).map_err(|e| AppError::BadRequest(e.to_string()))?;
    }

    let client = github.authorized()?;
    let history = fetch_contribution_history(&client, &username, query.starting_year).await?;
    let summary = streaks::summarize(&history);

    log::info!(
        "✅ {} has {} commits, longest streak {}, current streak {}",
        username,
        summary.total_commits,
        summary.longest_streak,
        summary.current_streak
    );

    Ok(HttpResponse::Ok().json(ContributionsResponse {
        contributions: history,
        total_commits: summary.total_commits,
        longest_streak: summary.longest_streak,
        current_streak: summary.current_streak,
    }))
}

/// GET /{username}/stats
/// Languages, streaks and profile views in one response. Reading the view
/// counter here does not increment it.
pub async fn get_stats(
    path: web::Path<String>,
    query: web::Query<StatsQuery>,
    github: web::Data<GitHubApi>,
    views: web::Data<ProfileViewStore>,
) -> Result<HttpResponse, AppError> {
    let username = username(path)?;
    let client = github.authorized()?;

    let excluded = excluded_languages(query.exclude.as_deref());

    let (history, languages) = tokio::try_join!(
        fetch_contribution_history(&client, &username, None),
        fetch_top_languages(&client, &username, &excluded),
    )?;

    let summary = streaks::summarize(&history);
    let profile_visitors = views.get(&username).await;

    let stats = languages.map(|top_languages| StatsResponse {
        top_languages,
        total_commits: summary.total_commits,
        longest_streak: summary.longest_streak,
        current_streak: summary.current_streak,
        profile_visitors,
        contributions: history,
    });

    Ok(partial_json(stats, "stats"))
}

#[cfg(test)]
mod tests {
    use crate::handlers::configure;
    use crate::handlers::testing::{github_api, view_store};
    use crate::services::contribution_aggregation::testing::year_body;
    use crate::services::github::testing::repo_json;
    use actix_web::{http::StatusCode, test, App};
    use chrono::{Datelike, Utc};
    use mockito::Matcher;
    use serde_json::{json, Value};

    /// A user created this year with `count` contributions on Jan 1
    async fn mock_calendar(server: &mut mockito::ServerGuard, count: u32) {
        let year = Utc::now().year();
        server
            .mock("POST", "/graphql")
            .with_status(200)
            .with_body(year_body(year, &format!("{}-01-01T00:00:00Z", year), count).to_string())
            .create_async()
            .await;
    }

    #[actix_web::test]
    async fn test_contributions_route() {
        let mut server = mockito::Server::new_async().await;
        mock_calendar(&mut server, 6).await;

        let app = test::init_service(
            App::new()
                .app_data(github_api(&server.url(), Some("token")))
                .configure(configure),
        )
        .await;

        let req = test::TestRequest::get().uri("/alice/contributions").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["totalCommits"], 6);
        assert_eq!(body["longestStreak"], 1);
        let year = Utc::now().year().to_string();
        assert!(body["contributions"][&year]["data"]["user"].is_object());
    }

    #[actix_web::test]
    async fn test_starting_year_out_of_range() {
        let app = test::init_service(
            App::new()
                .app_data(github_api("http://127.0.0.1:9", Some("token")))
                .configure(configure),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/alice/contributions?starting_year=1850")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn test_non_numeric_starting_year_gets_json_error() {
        let app = test::init_service(
            App::new()
                .app_data(github_api("http://127.0.0.1:9", Some("token")))
                .configure(configure),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/alice/contributions?starting_year=abc")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "BAD_REQUEST");
    }

    #[actix_web::test]
    async fn test_contributions_of_unknown_user() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/graphql")
            .with_status(200)
            .with_body(r#"{"data":{"user":null}}"#)
            .create_async()
            .await;

        let app = test::init_service(
            App::new()
                .app_data(github_api(&server.url(), Some("token")))
                .configure(configure),
        )
        .await;

        let req = test::TestRequest::get().uri("/ghost/contributions").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "NOT_FOUND");
    }

    #[actix_web::test]
    async fn test_stats_route_reads_views_without_incrementing() {
        let mut server = mockito::Server::new_async().await;
        mock_calendar(&mut server, 2).await;
        server
            .mock("GET", "/users/alice/repos")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(json!([repo_json("alice", "repoA", 0)]).to_string())
            .create_async()
            .await;
        server
            .mock("GET", "/repos/alice/repoA/languages")
            .with_status(200)
            .with_body(r#"{"Rust": 600, "Shell": 200, "Markdown": 200}"#)
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let views = view_store(&dir).await;
        views.set_base("alice", 7).await;

        let app = test::init_service(
            App::new()
                .app_data(github_api(&server.url(), Some("token")))
                .app_data(views.clone())
                .configure(configure),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/alice/stats?exclude=Markdown,%20Shell")
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body["topLanguages"], json!([{ "name": "Rust", "percentage": 100.0 }]));
        assert_eq!(body["totalCommits"], 2);
        assert_eq!(body["profile_visitors"], 7);
        assert!(body["contributions"].is_object());
        assert_eq!(views.get("alice").await, 7);
    }
}
