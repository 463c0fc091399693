use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde_json::Value;

use crate::error::AppError;
use crate::models::repository::RepoDetail;
use crate::services::fan_out::{bounded, FanOut, ItemFailure};
use crate::services::github::types::{GitHubReadme, GitHubRepo};
use crate::services::github::{repo_path, GitHubClient, UpstreamError};
use crate::services::language_stats::fetch_repo_languages;
use crate::utils::validators::{extract_first_url, validate_url};

/// Statuses on the commits endpoint that mean "nothing to count"
const EMPTY_COMMIT_STATUSES: [u16; 3] = [403, 404, 409];

/// Build one [`RepoDetail`] per owned repository, in listing order.
///
/// README, languages and commit count are fetched concurrently for each
/// repository. A failing sub-fetch leaves its field empty and is reported.
pub async fn fetch_repo_details(
    client: &GitHubClient,
    username: &str,
) -> Result<FanOut<Vec<RepoDetail>>, AppError> {
    let listing = client.list_user_repos(username).await?;
    let mut failures = listing.failures;

    let mut built = bounded(
        listing.value.into_iter().enumerate(),
        client.concurrency(),
        |(index, repo)| async move { (index, build_repo_detail(client, repo).await) },
    )
    .await;

    built.sort_by_key(|(index, _)| *index);

    let mut details = Vec::with_capacity(built.len());
    for (_, detail) in built {
        failures.extend(detail.failures);
        details.push(detail.value);
    }

    Ok(FanOut::new(details, failures))
}

async fn build_repo_detail(client: &GitHubClient, repo: GitHubRepo) -> FanOut<RepoDetail> {
    let (readme, languages, commits) = tokio::join!(
        fetch_readme(client, &repo),
        fetch_repo_languages(client, &repo),
        fetch_commit_count(client, &repo.owner.login, &repo.name),
    );

    let mut failures = Vec::new();

    let readme = match readme {
        Ok(readme) => readme,
        Err(failure) => {
            failures.push(ItemFailure::new(repo.name.clone(), "readme", failure));
            None
        }
    };

    let languages = match languages {
        Ok(bytes) => {
            let mut ranked: Vec<(String, u64)> = bytes.into_iter().collect();
            ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
            ranked.into_iter().map(|(name, _)| name).collect()
        }
        Err(e) => {
            failures.push(ItemFailure::new(repo.name.clone(), "languages", e));
            Vec::new()
        }
    };

    let num_commits = match commits {
        Ok(count) => count,
        Err(e) => {
            failures.push(ItemFailure::new(repo.name.clone(), "commit_count", e));
            0
        }
    };

    let live_website_url = resolve_live_url(repo.homepage.as_deref(), repo.description.as_deref());

    FanOut::new(
        RepoDetail {
            title: repo.name,
            description: repo.description,
            live_website_url,
            languages,
            num_commits,
            stars: repo.stargazers_count,
            readme,
        },
        failures,
    )
}

/// The homepage if it is a proper http(s) URL, otherwise the first URL in the description
pub fn resolve_live_url(homepage: Option<&str>, description: Option<&str>) -> Option<String> {
    homepage
        .map(str::trim)
        .filter(|h| validate_url(h).is_ok())
        .map(str::to_string)
        .or_else(|| description.and_then(extract_first_url))
}

/// README as single-line base64. A repository without a README is `Ok(None)`.
async fn fetch_readme(client: &GitHubClient, repo: &GitHubRepo) -> Result<Option<String>, String> {
    let path = format!("{}/readme", repo_path(&repo.owner.login, &repo.name));

    match client.get_json::<GitHubReadme>(&path, &[]).await {
        Ok(readme) => match readme.content {
            Some(content) => normalize_base64(&content).map(Some),
            None => Ok(None),
        },
        Err(UpstreamError::Status(status)) if status.as_u16() == 404 => Ok(None),
        Err(e) => Err(e.to_string()),
    }
}

/// GitHub wraps base64 content at 60 columns; strip the line breaks and make
/// sure what is left actually decodes.
pub fn normalize_base64(content: &str) -> Result<String, String> {
    let compact: String = content.chars().filter(|c| !c.is_whitespace()).collect();
    STANDARD
        .decode(&compact)
        .map_err(|e| format!("README is not valid base64: {}", e))?;
    Ok(compact)
}

/// Number of commits, read off the `rel="last"` page number of a
/// `per_page=1` listing. Without a Link header the page length is the count.
pub async fn fetch_commit_count(
    client: &GitHubClient,
    owner: &str,
    repo: &str,
) -> Result<u64, UpstreamError> {
    let path = format!("{}/commits", repo_path(owner, repo));

    match client
        .get_with_links::<Vec<Value>>(&path, &[("per_page", "1".to_string())])
        .await
    {
        Ok(fetched) => Ok(fetched
            .links
            .last_page
            .unwrap_or(fetched.body.len() as u64)),
        Err(e)
            if e
                .status()
                .is_some_and(|s| EMPTY_COMMIT_STATUSES.contains(&s.as_u16())) =>
        {
            Ok(0)
        }
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::github::testing::{client_for, repo_json};
    use mockito::Matcher;
    use serde_json::json;

    #[test]
    fn test_homepage_wins() {
        assert_eq!(
            resolve_live_url(Some("https://alice.dev"), Some("see http://other.example")),
            Some("https://alice.dev".to_string())
        );
    }

    #[test]
    fn test_url_from_description() {
        assert_eq!(
            resolve_live_url(Some(""), Some("Live at https://demo.example/app now")),
            Some("https://demo.example/app".to_string())
        );
        assert_eq!(
            resolve_live_url(Some("alice.dev"), Some("demo: http://demo.example")),
            Some("http://demo.example".to_string())
        );
    }

    #[test]
    fn test_no_live_url() {
        assert_eq!(resolve_live_url(None, Some("just a library")), None);
        assert_eq!(resolve_live_url(None, None), None);
    }

    #[test]
    fn test_normalize_base64_strips_line_breaks() {
        assert_eq!(normalize_base64("aGVs\nbG8=\n").unwrap(), "aGVsbG8=");
        assert!(normalize_base64("not base64!!").is_err());
    }

    #[tokio::test]
    async fn test_commit_count_from_last_page() {
        let mut server = mockito::Server::new_async().await;
        let next = format!("{}/repositories/1/commits?per_page=1&page=2", server.url());
        let last = format!("{}/repositories/1/commits?per_page=1&page=7", server.url());
        server
            .mock("GET", "/repos/alice/repoA/commits")
            .match_query(Matcher::UrlEncoded("per_page".into(), "1".into()))
            .with_status(200)
            .with_header(
                "link",
                &format!(r#"<{}>; rel="next", <{}>; rel="last""#, next, last),
            )
            .with_body(r#"[{"sha": "abc"}]"#)
            .create_async()
            .await;

        let client = client_for(&server.url());
        assert_eq!(fetch_commit_count(&client, "alice", "repoA").await.unwrap(), 7);
    }

    #[tokio::test]
    async fn test_commit_count_without_link_header() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/repos/alice/tiny/commits")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"[{"sha": "abc"}]"#)
            .create_async()
            .await;

        let client = client_for(&server.url());
        assert_eq!(fetch_commit_count(&client, "alice", "tiny").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_empty_repository_has_no_commits() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/repos/alice/empty/commits")
            .match_query(Matcher::Any)
            .with_status(409)
            .with_body(r#"{"message": "Git Repository is empty."}"#)
            .create_async()
            .await;

        let client = client_for(&server.url());
        assert_eq!(fetch_commit_count(&client, "alice", "empty").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_repo_details_degrade_per_field() {
        let mut server = mockito::Server::new_async().await;
        let mut repo = repo_json("alice", "site", 12);
        repo["homepage"] = json!("https://alice.dev");
        repo["description"] = json!("Personal site");
        server
            .mock("GET", "/users/alice/repos")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(json!([repo]).to_string())
            .create_async()
            .await;
        server
            .mock("GET", "/repos/alice/site/readme")
            .with_status(200)
            .with_body(r#"{"content": "IyBTaXRl\n"}"#)
            .create_async()
            .await;
        server
            .mock("GET", "/repos/alice/site/languages")
            .with_status(502)
            .create_async()
            .await;
        server
            .mock("GET", "/repos/alice/site/commits")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"[{"sha": "abc"}]"#)
            .create_async()
            .await;

        let client = client_for(&server.url());
        let result = fetch_repo_details(&client, "alice").await.unwrap();

        assert_eq!(
            result.value,
            vec![RepoDetail {
                title: "site".to_string(),
                description: Some("Personal site".to_string()),
                live_website_url: Some("https://alice.dev".to_string()),
                languages: Vec::new(),
                num_commits: 1,
                stars: 12,
                readme: Some("IyBTaXRl".to_string()),
            }]
        );
        assert_eq!(result.failures.len(), 1);
        assert_eq!(result.failures[0].stage, "languages");
    }

    #[tokio::test]
    async fn test_missing_readme_is_not_a_failure() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/users/alice/repos")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(json!([repo_json("alice", "bare", 0)]).to_string())
            .create_async()
            .await;
        server
            .mock("GET", "/repos/alice/bare/readme")
            .with_status(404)
            .create_async()
            .await;
        server
            .mock("GET", "/repos/alice/bare/languages")
            .with_status(200)
            .with_body(r#"{"Go": 10, "Shell": 40}"#)
            .create_async()
            .await;
        server
            .mock("GET", "/repos/alice/bare/commits")
            .match_query(Matcher::Any)
            .with_status(409)
            .create_async()
            .await;

        let client = client_for(&server.url());
        let result = fetch_repo_details(&client, "alice").await.unwrap();

        assert!(result.failures.is_empty());
        assert_eq!(result.value[0].readme, None);
        assert_eq!(result.value[0].languages, vec!["Shell", "Go"]);
        assert_eq!(result.value[0].num_commits, 0);
    }
}
