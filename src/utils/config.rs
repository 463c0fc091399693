use anyhow::{Context, Result};
use std::env;

#[derive(Clone, Debug)]
pub struct Config {
    pub github_token: Option<String>,
    pub host: String,
    pub port: u16,
    pub github_api_url: String,
    pub profile_views_file: String,
    pub request_timeout_secs: u64,
    pub max_concurrent_requests: usize,
    pub rate_limit_per_minute: u32,
    pub rate_limit_per_day: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            github_token: None,
            host: "0.0.0.0".to_string(),
            port: 8989,
            github_api_url: "https://api.github.com".to_string(),
            profile_views_file: "profile_views.json".to_string(),
            request_timeout_secs: 30,
            max_concurrent_requests: 10,
            rate_limit_per_minute: 15,
            rate_limit_per_day: 700,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();

        let defaults = Config::default();

        Ok(Config {
            github_token: env::var("GITHUB_TOKEN")
                .ok()
                .filter(|token| !token.trim().is_empty()),
            host: env::var("HOST").unwrap_or(defaults.host),
            port: parse_var("PORT", defaults.port)?,
            github_api_url: env::var("GITHUB_API_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or(defaults.github_api_url),
            profile_views_file: env::var("PROFILE_VIEWS_FILE")
                .unwrap_or(defaults.profile_views_file),
            request_timeout_secs: parse_var("REQUEST_TIMEOUT_SECS", defaults.request_timeout_secs)?,
            max_concurrent_requests: parse_var(
                "MAX_CONCURRENT_REQUESTS",
                defaults.max_concurrent_requests,
            )?
            .max(1),
            rate_limit_per_minute: parse_var("RATE_LIMIT_PER_MINUTE", defaults.rate_limit_per_minute)?,
            rate_limit_per_day: parse_var("RATE_LIMIT_PER_DAY", defaults.rate_limit_per_day)?,
        })
    }
}

fn parse_var<T>(name: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{} must be a number, got '{}'", name, raw)),
        Err(_) => Ok(default),
    }
}
