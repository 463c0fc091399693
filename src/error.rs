use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde::Serialize;
use thiserror::Error;

/// Application-level error type
#[derive(Debug, Error)]
pub enum AppError {
    /// The upstream API reported a non-2xx for the primary call, whether the
    /// user is missing or GitHub failed
    #[error("User not found or API error")]
    NotFound,
    #[error("GitHub token not configured")]
    MissingToken,
    #[error("{0}")]
    BadRequest(String),
    #[error("Rate limit exceeded, retry after {retry_after} seconds")]
    RateLimited {
        retry_after: u64,
        per_minute: u32,
        per_day: u32,
    },
    /// Upstream answered 2xx with a payload we could not decode
    #[error("Unexpected response format from GitHub API: {0}")]
    UpstreamFormat(String),
}

#[derive(Serialize)]
struct ErrorResponse {
    error: &'static str,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    retry_after: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    limits: Option<RateLimits>,
}

#[derive(Serialize)]
struct RateLimits {
    per_minute: u32,
    per_day: u32,
}

impl AppError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound => "NOT_FOUND",
            Self::MissingToken => "CONFIGURATION_ERROR",
            Self::BadRequest(_) => "BAD_REQUEST",
            Self::RateLimited { .. } => "RATE_LIMITED",
            Self::UpstreamFormat(_) => "UPSTREAM_FORMAT_ERROR",
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::MissingToken => StatusCode::INTERNAL_SERVER_ERROR,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            Self::UpstreamFormat(_) => StatusCode::BAD_GATEWAY,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let mut body = ErrorResponse {
            error: self.error_code(),
            message: self.to_string(),
            retry_after: None,
            limits: None,
        };

        let mut response = HttpResponse::build(self.status_code());

        if let Self::RateLimited {
            retry_after,
            per_minute,
            per_day,
        } = self
        {
            body.retry_after = Some(*retry_after);
            body.limits = Some(RateLimits {
                per_minute: *per_minute,
                per_day: *per_day,
            });
            response.insert_header(("Retry-After", retry_after.to_string()));
        }

        response.json(body)
    }
}
