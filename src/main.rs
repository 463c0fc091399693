mod error;
mod handlers;
mod middleware;
mod models;
mod services;
mod utils;

use actix_cors::Cors;
use actix_web::{middleware::from_fn, middleware::Logger, web, App, HttpServer};

use middleware::rate_limit::{rate_limit, RateLimiter};
use services::github::GitHubApi;
use services::profile_views::ProfileViewStore;
use utils::config::Config;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file FIRST before anything else
    dotenv::dotenv().ok();

    // Initialize logger with default level if RUST_LOG not set
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    println!("=================================================");
    println!("🚀 GitHub Stats API");
    println!("=================================================");

    let config = Config::from_env().map_err(|e| {
        log::error!("Failed to load configuration: {:#}", e);
        std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string())
    })?;
    let host = config.host.clone();
    let port = config.port;

    println!("📝 Configuration loaded:");
    println!("   - Host: {}", host);
    println!("   - Port: {}", port);
    println!("   - GitHub API: {}", config.github_api_url);
    println!(
        "   - GitHub token: {}",
        if config.github_token.is_some() {
            "configured"
        } else {
            "MISSING (data routes will return 500)"
        }
    );
    println!("   - Profile views file: {}", config.profile_views_file);
    println!("   - Max concurrent upstream requests: {}", config.max_concurrent_requests);
    println!(
        "   - Rate limits: {}/minute, {}/day",
        config.rate_limit_per_minute, config.rate_limit_per_day
    );
    println!(
        "   - Log level: {}",
        std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string())
    );

    let github = GitHubApi::from_config(&config).map_err(|e| {
        log::error!("Failed to build HTTP client: {}", e);
        std::io::Error::new(std::io::ErrorKind::Other, e.to_string())
    })?;
    let github = web::Data::new(github);

    let views = web::Data::new(ProfileViewStore::load(&config.profile_views_file).await);
    let limiter = web::Data::new(RateLimiter::new(
        config.rate_limit_per_minute,
        config.rate_limit_per_day,
    ));

    println!("🌐 Starting HTTP server at http://{}:{}", host, port);
    println!("📍 Available endpoints:");
    for endpoint in [
        "languages",
        "contributions",
        "stats",
        "repos",
        "commits",
        "stars",
        "me/pulls",
        "prs",
        "org-contributions",
        "profile-views",
    ] {
        println!("   - GET  http://{}:{}/{{username}}/{}", host, port, endpoint);
    }
    println!("=================================================");

    log::info!("Server started at http://{}:{}", host, port);

    HttpServer::new(move || {
        App::new()
            .app_data(github.clone())
            .app_data(views.clone())
            .app_data(limiter.clone())
            .wrap(from_fn(rate_limit))
            .wrap(Logger::default())
            // Public read-only API, embeddable from any origin
            .wrap(Cors::permissive())
            .configure(handlers::configure)
    })
    .bind((host, port))?
    .run()
    .await
}
