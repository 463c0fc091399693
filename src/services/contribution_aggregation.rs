use chrono::{Datelike, Utc};

use crate::error::AppError;
use crate::models::contribution::{ContributionHistory, YearlyContributionResponse};
use crate::services::github::graphql::contribution_calendar_query;
use crate::services::github::GitHubClient;

/// GitHub has no contribution data before this year
pub const EARLIEST_YEAR: i32 = 2005;

/// Fetch the contribution calendar for every year from the starting year up to now
pub async fn fetch_contribution_history(
    client: &GitHubClient,
    username: &str,
    starting_year: Option<i32>,
) -> Result<ContributionHistory, AppError> {
    fetch_contribution_history_until(client, username, starting_year, Utc::now().year()).await
}

/// Same as [`fetch_contribution_history`] with an explicit current year.
///
/// The current year is fetched first: it tells us whether the user exists and
/// when the account was created. That response is reused, so each year costs
/// exactly one GraphQL call.
pub async fn fetch_contribution_history_until(
    client: &GitHubClient,
    username: &str,
    starting_year: Option<i32>,
    current_year: i32,
) -> Result<ContributionHistory, AppError> {
    let current = fetch_year(client, username, current_year).await?;

    let created_year = current
        .user()
        .map(|user| user.created_at.year())
        .ok_or(AppError::NotFound)?;

    let first_year = starting_year.unwrap_or(created_year).max(EARLIEST_YEAR);

    log::info!(
        "📅 Fetching contributions for {} from {} to {}",
        username,
        first_year,
        current_year
    );

    let mut history = ContributionHistory::new();

    // One call per year, oldest first
    for year in first_year..current_year {
        let response = fetch_year(client, username, year).await?;
        history.insert(year, response);
    }

    history.insert(current_year, current);

    Ok(history)
}

async fn fetch_year(
    client: &GitHubClient,
    username: &str,
    year: i32,
) -> Result<YearlyContributionResponse, AppError> {
    let request = contribution_calendar_query(username, year);
    let response: YearlyContributionResponse = client.graphql(&request).await?;

    if let Some(errors) = &response.errors {
        log::warn!(
            "GraphQL returned {} error(s) for {} in {}",
            errors.len(),
            username,
            year
        );
    }

    Ok(response)
}
