use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One day of the contribution calendar
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContributionDay {
    pub contribution_count: u32,
    pub date: NaiveDate,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContributionWeek {
    #[serde(default)]
    pub contribution_days: Vec<ContributionDay>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ContributionCalendar {
    #[serde(default)]
    pub weeks: Vec<ContributionWeek>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContributionsCollection {
    #[serde(default)]
    pub contribution_years: Vec<i32>,
    pub contribution_calendar: Option<ContributionCalendar>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContributionUser {
    pub created_at: DateTime<Utc>,
    pub contributions_collection: Option<ContributionsCollection>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ContributionData {
    pub user: Option<ContributionUser>,
}

/// Raw GraphQL response for a single calendar year.
/// Serialized back out unchanged under `contributions`.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct YearlyContributionResponse {
    pub data: Option<ContributionData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<serde_json::Value>>,
}

/// Year -> raw response, ordered by year
pub type ContributionHistory = BTreeMap<i32, YearlyContributionResponse>;

impl YearlyContributionResponse {
    pub fn user(&self) -> Option<&ContributionUser> {
        self.data.as_ref().and_then(|d| d.user.as_ref())
    }

    /// All days of this year's calendar, in response order
    pub fn days(&self) -> impl Iterator<Item = &ContributionDay> {
        self.user()
            .and_then(|u| u.contributions_collection.as_ref())
            .and_then(|c| c.contribution_calendar.as_ref())
            .into_iter()
            .flat_map(|calendar| calendar.weeks.iter())
            .flat_map(|week| week.contribution_days.iter())
    }

    /// Build a response from a flat list of days (one week per seven days)
    #[cfg(test)]
    pub fn from_days(days: Vec<ContributionDay>) -> Self {
        let weeks = days
            .chunks(7)
            .map(|chunk| ContributionWeek {
                contribution_days: chunk.to_vec(),
            })
            .collect();

        Self {
            data: Some(ContributionData {
                user: Some(ContributionUser {
                    created_at: Utc::now(),
                    contributions_collection: Some(ContributionsCollection {
                        contribution_years: Vec::new(),
                        contribution_calendar: Some(ContributionCalendar { weeks }),
                    }),
                }),
            }),
            errors: None,
        }
    }
}

/// Body of `GET /{username}/contributions`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContributionsResponse {
    pub contributions: ContributionHistory,
    pub total_commits: u64,
    pub longest_streak: u32,
    pub current_streak: u32,
}

/// Body of `GET /{username}/stats`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsResponse {
    pub top_languages: Vec<super::language::LanguageStat>,
    pub total_commits: u64,
    pub longest_streak: u32,
    pub current_streak: u32,
    #[serde(rename = "profile_visitors")]
    pub profile_visitors: u64,
    pub contributions: ContributionHistory,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_graphql_calendar() {
        let raw = serde_json::json!({
            "data": {
                "user": {
                    "createdAt": "2019-04-02T10:00:00Z",
                    "contributionsCollection": {
                        "contributionYears": [2024, 2023],
                        "contributionCalendar": {
                            "weeks": [
                                { "contributionDays": [
                                    { "contributionCount": 3, "date": "2024-01-01" },
                                    { "contributionCount": 0, "date": "2024-01-02" }
                                ]}
                            ]
                        }
                    }
                }
            }
        });

        let response: YearlyContributionResponse = serde_json::from_value(raw).unwrap();
        let days: Vec<_> = response.days().collect();
        assert_eq!(days.len(), 2);
        assert_eq!(days[0].contribution_count, 3);
        assert_eq!(days[1].date, NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());
    }

    #[test]
    fn test_malformed_date_is_rejected() {
        let raw = serde_json::json!({
            "data": { "user": {
                "createdAt": "2019-04-02T10:00:00Z",
                "contributionsCollection": { "contributionCalendar": { "weeks": [
                    { "contributionDays": [{ "contributionCount": 1, "date": "2024-13-45" }] }
                ]}}
            }}
        });

        assert!(serde_json::from_value::<YearlyContributionResponse>(raw).is_err());
    }

    #[test]
    fn test_missing_user_yields_no_days() {
        let response: YearlyContributionResponse =
            serde_json::from_value(serde_json::json!({ "data": { "user": null } })).unwrap();
        assert!(response.user().is_none());
        assert_eq!(response.days().count(), 0);
    }
}
