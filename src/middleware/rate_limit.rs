use axum::{
    http::{
        HeaderMap, StatusCode,
        header::{CONTENT_LENGTH, CONTENT_TYPE},
    },
    middleware,
    response::{IntoResponse, Response},
    routing::MethodRouter,
};
use coursebook_config::AuthGovernorConfig;
use std::sync::Arc;
use std::time::Duration;
use tower_governor::GovernorLayer;
use tracing::{debug, warn};

use coursebook_core::AppError;

use crate::state::AppState;

const PRUNE_INTERVAL: Duration = Duration::from_secs(60);

/// Wraps `route` in a per-peer-IP limiter. `None` leaves the route unlimited.
///
/// Idle client entries are pruned once a minute until the router is dropped.
pub fn limited(
    route: MethodRouter<AppState>,
    config: Option<AuthGovernorConfig>,
) -> MethodRouter<AppState> {
    let Some(config) = config else {
        return route;
    };

    let limiter = Arc::downgrade(config.limiter());
    if let Ok(runtime) = tokio::runtime::Handle::try_current() {
        runtime.spawn(async move {
            loop {
                tokio::time::sleep(PRUNE_INTERVAL).await;
                let Some(limiter) = limiter.upgrade() else {
                    break;
                };
                limiter.retain_recent();
                debug!(clients = limiter.len(), "Pruned rate limiter");
            }
        });
    }

    route
        .layer(GovernorLayer::new(config))
        .layer(middleware::map_response(rate_limited_as_json))
}

/// Re-renders the limiter's plain-text 429 as the usual `{"error"}` body,
/// keeping its `retry-after` style headers.
async fn rate_limited_as_json(response: Response) -> Response {
    if response.status() != StatusCode::TOO_MANY_REQUESTS {
        return response;
    }

    let (parts, _) = response.into_parts();
    warn!("Rate limit exceeded");

    let mut json =
        AppError::too_many_requests("Too many requests, please try again later").into_response();
    copy_limit_headers(&parts.headers, json.headers_mut());
    json
}

fn copy_limit_headers(from: &HeaderMap, to: &mut HeaderMap) {
    for (name, value) in from {
        if name != CONTENT_TYPE && name != CONTENT_LENGTH {
            to.insert(name.clone(), value.clone());
        }
    }
}
