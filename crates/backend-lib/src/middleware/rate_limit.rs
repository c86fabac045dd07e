use crate::error::AppError;
use crate::storage::PresenceStore;
use crate::AppState;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Rate limiter middleware: fixed window per client IP.
///
/// Guards the mutation endpoints; the expected client cadence is one
/// heartbeat every 10 seconds per viewer.
pub async fn rate_limit<S: PresenceStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    // Get client IP
    let client_ip = request
        .headers()
        .get("x-real-ip")
        .and_then(|h| h.to_str().ok())
        .unwrap_or("unknown")
        .to_string();

    let max_requests = state.settings.rate_limit.max_requests;
    let window = Duration::from_secs(state.settings.rate_limit.window_secs);

    {
        // the shard guard must not be held across next.run
        let mut entry = state.rate_limits.entry(client_ip).or_insert_with(|| {
            RateLimitEntry {
                requests: 0,
                window_start: Instant::now(),
            }
        });

        // Check if window has expired
        if entry.window_start.elapsed() > window {
            entry.requests = 0;
            entry.window_start = Instant::now();
        }

        if entry.requests >= max_requests {
            return Err(AppError::RateLimitExceeded);
        }

        entry.requests += 1;
    }

    Ok(next.run(request).await)
}

/// Rate limit window for one client
#[derive(Debug)]
pub struct RateLimitEntry {
    requests: u32,
    window_start: Instant,
}
