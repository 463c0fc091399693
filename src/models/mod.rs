pub mod contribution;
pub mod language;
pub mod profile_view;
pub mod pull_request;
pub mod repository;
