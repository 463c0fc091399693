use std::collections::{HashMap, HashSet};

use crate::error::AppError;
use crate::models::language::LanguageStat;
use crate::services::fan_out::{bounded, FanOut, ItemFailure};
use crate::services::github::types::GitHubRepo;
use crate::services::github::{repo_path, GitHubClient, UpstreamError};

/// Languages left out when the caller does not say otherwise
pub const DEFAULT_EXCLUDED_LANGUAGES: [&str; 4] = ["Markdown", "JSON", "YAML", "XML"];

pub fn default_excluded() -> HashSet<String> {
    DEFAULT_EXCLUDED_LANGUAGES
        .iter()
        .map(|s| s.to_string())
        .collect()
}

/// Byte counts of one repository, as returned by `/repos/{owner}/{repo}/languages`
pub type LanguageBytes = HashMap<String, u64>;

/// Sum byte counts across every repository the user owns and turn them into
/// percentages. Repositories whose language breakdown cannot be fetched are
/// skipped and reported as failures.
pub async fn fetch_top_languages(
    client: &GitHubClient,
    username: &str,
    excluded: &HashSet<String>,
) -> Result<FanOut<Vec<LanguageStat>>, AppError> {
    let listing = client.list_user_repos(username).await?;
    let mut failures = listing.failures;

    let results = bounded(listing.value, client.concurrency(), |repo| async move {
        fetch_repo_languages(client, &repo)
            .await
            .map_err(|e| ItemFailure::new(repo.name.clone(), "languages", e))
    })
    .await;

    let mut totals = LanguageBytes::new();
    for result in results {
        match result {
            Ok(bytes) => {
                for (language, count) in bytes {
                    *totals.entry(language).or_insert(0) += count;
                }
            }
            Err(failure) => failures.push(failure),
        }
    }

    Ok(FanOut::new(compute_language_stats(&totals, excluded), failures))
}

/// Byte breakdown of a single repository
pub async fn fetch_repo_languages(
    client: &GitHubClient,
    repo: &GitHubRepo,
) -> Result<LanguageBytes, UpstreamError> {
    let path = format!("{}/languages", repo_path(&repo.owner.login, &repo.name));
    client.get_json(&path, &[]).await
}

/// Percentages of the post-exclusion byte total, rounded to two decimals.
///
/// Excluded languages count towards neither numerator nor denominator.
/// Sorted by percentage descending, then by name.
pub fn compute_language_stats(
    totals: &LanguageBytes,
    excluded: &HashSet<String>,
) -> Vec<LanguageStat> {
    let kept: Vec<(&String, u64)> = totals
        .iter()
        .filter(|(name, _)| !excluded.contains(name.as_str()))
        .map(|(name, &bytes)| (name, bytes))
        .collect();

    let total: u64 = kept.iter().map(|(_, bytes)| bytes).sum();
    if total == 0 {
        return Vec::new();
    }

    let mut stats: Vec<LanguageStat> = kept
        .into_iter()
        .map(|(name, bytes)| LanguageStat {
            name: name.clone(),
            percentage: round2(bytes as f64 / total as f64 * 100.0),
        })
        .collect();

    stats.sort_by(|a, b| {
        b.percentage
            .total_cmp(&a.percentage)
            .then_with(|| a.name.cmp(&b.name))
    });

    stats
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
