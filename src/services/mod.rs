pub mod commit_history;
pub mod contribution_aggregation;
pub mod fan_out;
pub mod github;
pub mod language_stats;
pub mod profile_views;
pub mod pull_requests;
pub mod repo_details;
pub mod stars;
pub mod streaks;
