use serde::Serialize;
use serde_json::{json, Value};

/// GitHub refuses contribution ranges longer than a year, so the calendar is
/// always requested one calendar year at a time.
const CONTRIBUTION_CALENDAR_QUERY: &str = r#"
    query($login: String!, $from: DateTime!, $to: DateTime!) {
        user(login: $login) {
            createdAt
            contributionsCollection(from: $from, to: $to) {
                contributionYears
                contributionCalendar {
                    weeks {
                        contributionDays {
                            contributionCount
                            date
                        }
                    }
                }
            }
        }
    }
"#;

/// Body of a GraphQL POST
#[derive(Debug, Clone, Serialize)]
pub struct GraphQlRequest {
    pub query: &'static str,
    pub variables: Value,
}

/// Build the per-year contribution calendar query for `username`
pub fn contribution_calendar_query(username: &str, year: i32) -> GraphQlRequest {
    GraphQlRequest {
        query: CONTRIBUTION_CALENDAR_QUERY,
        variables: json!({
            "login": username,
            "from": format!("{}-01-01T00:00:00Z", year),
            "to": format!("{}-12-31T23:59:59Z", year),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contribution_query_covers_calendar_year() {
        let request = contribution_calendar_query("octocat", 2023);
        assert_eq!(request.variables["login"], "octocat");
        assert_eq!(request.variables["from"], "2023-01-01T00:00:00Z");
        assert_eq!(request.variables["to"], "2023-12-31T23:59:59Z");
        assert!(request.query.contains("contributionCalendar"));
        assert!(request.query.contains("createdAt"));
    }

    #[test]
    fn test_username_is_not_interpolated() {
        let request = contribution_calendar_query("evil\") { viewer { login } }", 2023);
        assert!(!request.query.contains("evil"));
    }
}
