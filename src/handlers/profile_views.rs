use actix_web::{web, HttpResponse};
use serde::Deserialize;

use super::username;
use crate::error::AppError;
use crate::models::profile_view::ProfileViewsResponse;
use crate::services::profile_views::ProfileViewStore;

#[derive(Debug, Deserialize)]
pub struct ProfileViewsQuery {
    #[serde(default = "default_increment")]
    pub increment: bool,
    /// Overwrites the counter, used to carry counts over from another service
    pub base: Option<u64>,
}

fn default_increment() -> bool {
    true
}

/// GET /{username}/profile-views
/// Works without a GitHub token
pub async fn get_profile_views(
    path: web::Path<String>,
    query: web::Query<ProfileViewsQuery>,
    views: web::Data<ProfileViewStore>,
) -> Result<HttpResponse, AppError> {
    let username = username(path)?;

    let (count, incremented) = match query.base {
        Some(base) => {
            log::info!("Setting base profile views for {} to {}", username, base);
            (views.set_base(&username, base).await, false)
        }
        None if query.increment => (views.increment(&username).await, true),
        None => (views.get(&username).await, false),
    };

    Ok(HttpResponse::Ok().json(ProfileViewsResponse {
        username,
        views: count,
        incremented,
    }))
}

#[cfg(test)]
mod tests {
    use crate::handlers::configure;
    use crate::handlers::testing::{github_api, view_store};
    use crate::models::profile_view::ProfileViewsResponse;
    use actix_web::{http::StatusCode, test, App};

    #[actix_web::test]
    async fn test_profile_views_flow() {
        let dir = tempfile::tempdir().unwrap();
        let app = test::init_service(
            App::new()
                .app_data(github_api("http://127.0.0.1:9", None))
                .app_data(view_store(&dir).await)
                .configure(configure),
        )
        .await;

        let call = |uri: &'static str| test::TestRequest::get().uri(uri).to_request();

        let first: ProfileViewsResponse =
            test::call_and_read_body_json(&app, call("/Alice/profile-views")).await;
        assert_eq!(
            first,
            ProfileViewsResponse {
                username: "Alice".to_string(),
                views: 1,
                incremented: true
            }
        );

        let read: ProfileViewsResponse =
            test::call_and_read_body_json(&app, call("/alice/profile-views?increment=false")).await;
        assert_eq!(read.views, 1);
        assert!(!read.incremented);

        let based: ProfileViewsResponse =
            test::call_and_read_body_json(&app, call("/alice/profile-views?base=50")).await;
        assert_eq!(based.views, 50);
        assert!(!based.incremented);

        let next: ProfileViewsResponse =
            test::call_and_read_body_json(&app, call("/ALICE/profile-views")).await;
        assert_eq!(next.views, 51);
    }

    #[actix_web::test]
    async fn test_negative_base_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let app = test::init_service(
            App::new()
                .app_data(view_store(&dir).await)
                .configure(configure),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/alice/profile-views?base=-3")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn test_malformed_increment_gets_json_error() {
        let dir = tempfile::tempdir().unwrap();
        let app = test::init_service(
            App::new()
                .app_data(view_store(&dir).await)
                .configure(configure),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/alice/profile-views?increment=maybe")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "BAD_REQUEST");
        assert!(body["message"].is_string());
    }
}
