use std::collections::{HashMap, VecDeque};
use std::time::{Duration, Instant};

use actix_web::body::MessageBody;
use actix_web::dev::{ServiceRequest, ServiceResponse};
use actix_web::middleware::Next;
use actix_web::{web, Error};
use tokio::sync::Mutex;

use crate::error::AppError;

const MINUTE: Duration = Duration::from_secs(60);
const DAY: Duration = Duration::from_secs(24 * 60 * 60);

#[derive(Default)]
struct ClientHits {
    minute: VecDeque<Instant>,
    day: VecDeque<Instant>,
}

impl ClientHits {
    fn prune(&mut self, now: Instant) {
        prune(&mut self.minute, MINUTE, now);
        prune(&mut self.day, DAY, now);
    }

    fn is_empty(&self) -> bool {
        self.minute.is_empty() && self.day.is_empty()
    }
}

#[derive(Default)]
struct Clients {
    hits: HashMap<String, ClientHits>,
    last_sweep: Option<Instant>,
}

impl Clients {
    /// Forget clients with no hits left in either window, at most once a minute
    fn sweep(&mut self, now: Instant) {
        let due = self
            .last_sweep
            .map_or(true, |last| now.saturating_duration_since(last) >= MINUTE);
        if !due {
            return;
        }

        self.hits.retain(|_, hits| {
            hits.prune(now);
            !hits.is_empty()
        });
        self.last_sweep = Some(now);
    }
}

/// Sliding-window limiter keyed by client address.
/// A limit of 0 disables that window.
pub struct RateLimiter {
    per_minute: u32,
    per_day: u32,
    clients: Mutex<Clients>,
}

impl RateLimiter {
    pub fn new(per_minute: u32, per_day: u32) -> Self {
        Self {
            per_minute,
            per_day,
            clients: Mutex::new(Clients::default()),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.per_minute > 0 || self.per_day > 0
    }

    /// Record a hit for `client`, or fail with the seconds until one frees up
    pub async fn check(&self, client: &str) -> Result<(), AppError> {
        self.check_at(client, Instant::now()).await
    }

    async fn check_at(&self, client: &str, now: Instant) -> Result<(), AppError> {
        let mut clients = self.clients.lock().await;
        clients.sweep(now);
        let hits = clients.hits.entry(client.to_string()).or_default();

        let wait = [
            retry_after(&mut hits.minute, self.per_minute, MINUTE, now),
            retry_after(&mut hits.day, self.per_day, DAY, now),
        ]
        .into_iter()
        .flatten()
        .max();

        if let Some(wait) = wait {
            log::warn!("🚦 Rate limit hit for {}, retry in {}s", client, wait);
            return Err(AppError::RateLimited {
                retry_after: wait,
                per_minute: self.per_minute,
                per_day: self.per_day,
            });
        }

        if self.per_minute > 0 {
            hits.minute.push_back(now);
        }
        if self.per_day > 0 {
            hits.day.push_back(now);
        }

        Ok(())
    }
}

/// Drop hits older than `window`; if the window is still full, return the
/// whole seconds until its oldest hit expires
fn retry_after(
    hits: &mut VecDeque<Instant>,
    limit: u32,
    window: Duration,
    now: Instant,
) -> Option<u64> {
    if limit == 0 {
        return None;
    }

    prune(hits, window, now);

    if hits.len() < limit as usize {
        return None;
    }

    let oldest = *hits.front()?;
    let remaining = window.saturating_sub(now.saturating_duration_since(oldest));
    let secs = remaining.as_secs() + u64::from(remaining.subsec_nanos() > 0);
    Some(secs.max(1))
}

fn prune(hits: &mut VecDeque<Instant>, window: Duration, now: Instant) {
    while hits
        .front()
        .is_some_and(|&oldest| now.saturating_duration_since(oldest) >= window)
    {
        hits.pop_front();
    }
}

/// Middleware applying the [`RateLimiter`] stored in app data to every request
pub async fn rate_limit(
    req: ServiceRequest,
    next: Next<impl MessageBody>,
) -> Result<ServiceResponse<impl MessageBody>, Error> {
    if let Some(limiter) = req.app_data::<web::Data<RateLimiter>>() {
        if limiter.is_enabled() {
            let client = req
                .connection_info()
                .realip_remote_addr()
                .unwrap_or("unknown")
                .to_string();
            limiter.check(&client).await?;
        }
    }

    next.call(req).await
}
