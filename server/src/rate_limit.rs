use std::{
    net::{IpAddr, Ipv4Addr},
    sync::Arc,
    time::{Duration, Instant},
};

use dashmap::DashMap;
use rocket::request::{self, FromRequest, Request};
use tracing::{debug, instrument, warn};

use crate::{
    config::env_or,
    error::{GameError, Result},
};

const WINDOW: Duration = Duration::from_secs(60);

/// Games created by one address in the current one-minute window.
#[derive(Debug)]
pub struct CreationWindow {
    started: Instant,
    used: u32,
}

impl CreationWindow {
    fn new(now: Instant) -> Self {
        Self { started: now, used: 0 }
    }

    fn is_expired(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.started) >= WINDOW
    }

    fn try_acquire(&mut self, capacity: u32, now: Instant) -> bool {
        if self.is_expired(now) {
            self.started = now;
            self.used = 0;
        }

        if self.used < capacity {
            self.used += 1;
            true
        } else {
            false
        }
    }
}

pub type RateLimiter = Arc<DashMap<IpAddr, CreationWindow>>;

pub fn create_rate_limiter() -> RateLimiter {
    Arc::new(DashMap::new())
}

/// Drops windows that have run out. Returns how many were removed.
pub fn prune_rate_limiter(rate_limiter: &RateLimiter) -> usize {
    prune_expired(rate_limiter, Instant::now())
}

fn prune_expired(rate_limiter: &RateLimiter, now: Instant) -> usize {
    let before = rate_limiter.len();
    rate_limiter.retain(|_, window| !window.is_expired(now));
    before.saturating_sub(rate_limiter.len())
}

/// Caller address. Proxy headers are honoured only with
/// `TRUST_PROXY_HEADERS=true`, otherwise any client could pick its own.
#[derive(Debug)]
pub struct ClientIp(pub IpAddr);

fn resolve_client_ip(
    trust_proxy: bool,
    forwarded_for: Option<&str>,
    real_ip: Option<&str>,
    socket: Option<IpAddr>,
) -> IpAddr {
    let proxied = trust_proxy
        .then(|| {
            forwarded_for
                .and_then(|header| header.split(',').next())
                .and_then(|ip| ip.trim().parse().ok())
                .or_else(|| real_ip.and_then(|ip| ip.trim().parse().ok()))
        })
        .flatten();

    proxied
        .or(socket)
        .unwrap_or(IpAddr::V4(Ipv4Addr::LOCALHOST))
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for ClientIp {
    type Error = ();

    async fn from_request(req: &'r Request<'_>) -> request::Outcome<Self, Self::Error> {
        let headers = req.headers();
        let ip = resolve_client_ip(
            env_or("TRUST_PROXY_HEADERS", false),
            headers.get_one("X-Forwarded-For"),
            headers.get_one("X-Real-IP"),
            req.remote().map(|addr| addr.ip()),
        );

        request::Outcome::Success(ClientIp(ip))
    }
}

#[instrument(level = "trace", skip(rate_limiter))]
pub fn check_rate_limit(rate_limiter: &RateLimiter, ip: &IpAddr) -> Result<()> {
    let capacity: u32 = env_or("RATE_LIMIT_GAMES_PER_MINUTE", 10);
    let now = Instant::now();

    let mut window = rate_limiter
        .entry(*ip)
        .or_insert_with(|| CreationWindow::new(now));

    if window.try_acquire(capacity, now) {
        debug!("{} has created {} of {} games this minute", ip, window.used, capacity);
        Ok(())
    } else {
        warn!("Rate limit exceeded for {} - rejecting request", ip);
        Err(GameError::RateLimited)
    }
}
