// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// FLORAN LEDGER (FLO) - HTTP FRONT DOOR
//
// warp routes for the five ledger endpoints, health, Prometheus metrics and
// static files. Every reply (rejections included) carries permissive CORS
// headers; any OPTIONS request is answered with an empty 200 before routing.
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use crate::handlers::{self, api_json};
use crate::metrics::FloMetrics;
use bytes::Bytes;
use flo_core::{safe_lock, SharedLedger};
use log::error;
use serde_json::json;
use std::convert::Infallible;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use warp::http::header::{HeaderMap, HeaderValue};
use warp::http::{Method, StatusCode};
use warp::Filter;

/// Helper to inject state into route handlers
fn with_state<T: Clone + Send>(state: T) -> impl Filter<Extract = (T,), Error = Infallible> + Clone {
    warp::any().map(move || state.clone())
}

/// Headers attached to every response.
pub fn cors_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert("Access-Control-Allow-Origin", HeaderValue::from_static("*"));
    headers.insert(
        "Access-Control-Allow-Methods",
        HeaderValue::from_static("GET, POST, OPTIONS"),
    );
    headers.insert(
        "Access-Control-Allow-Headers",
        HeaderValue::from_static("Content-Type"),
    );
    headers
}

/// Matches OPTIONS on any path. Other methods fall through as "not found"
/// so they do not mask the real rejection with a 405.
fn preflight() -> impl Filter<Extract = (), Error = warp::Rejection> + Clone {
    warp::method()
        .and_then(|method: Method| async move {
            if method == Method::OPTIONS {
                Ok(())
            } else {
                Err(warp::reject::not_found())
            }
        })
        .untuple_one()
}

/// Full route tree for one node.
pub fn routes(
    ledger: SharedLedger,
    metrics: Arc<FloMetrics>,
    static_dir: PathBuf,
) -> impl Filter<Extract = (impl warp::Reply,), Error = Infallible> + Clone {
    let started = Instant::now();

    // Preflight: any path, answered before reaching a handler
    let preflight_route = preflight().map(warp::reply);

    // 1. GET /api/assets
    let assets_route = warp::path!("api" / "assets")
        .and(warp::get())
        .and(with_state((ledger.clone(), metrics.clone())))
        .map(|(l, m): (SharedLedger, Arc<FloMetrics>)| handlers::list_assets(&l, &m));

    // 2. POST /api/login
    let login_route = warp::path!("api" / "login")
        .and(warp::post())
        .and(with_state((ledger.clone(), metrics.clone())))
        .and(warp::body::bytes())
        .map(|(l, m): (SharedLedger, Arc<FloMetrics>), body: Bytes| handlers::login(&l, &m, &body));

    // 3. POST /api/register
    let register_route = warp::path!("api" / "register")
        .and(warp::post())
        .and(with_state((ledger.clone(), metrics.clone())))
        .and(warp::body::bytes())
        .map(|(l, m): (SharedLedger, Arc<FloMetrics>), body: Bytes| {
            handlers::register(&l, &m, &body)
        });

    // 4. POST /api/transfer
    let transfer_route = warp::path!("api" / "transfer")
        .and(warp::post())
        .and(with_state((ledger.clone(), metrics.clone())))
        .and(warp::body::bytes())
        .map(|(l, m): (SharedLedger, Arc<FloMetrics>), body: Bytes| {
            handlers::transfer(&l, &m, &body)
        });

    // 5. POST /api/daily-reward
    let daily_reward_route = warp::path!("api" / "daily-reward")
        .and(warp::post())
        .and(with_state((ledger.clone(), metrics.clone())))
        .and(warp::body::bytes())
        .map(|(l, m): (SharedLedger, Arc<FloMetrics>), body: Bytes| {
            handlers::daily_reward(&l, &m, &body)
        });

    // 6. GET /api/health
    let health_route = warp::path!("api" / "health")
        .and(warp::get())
        .and(with_state(ledger.clone()))
        .map(move |l: SharedLedger| handlers::health(&l, started));

    // 7. GET /metrics (Prometheus endpoint)
    let metrics_route = warp::path!("metrics")
        .and(warp::get())
        .and(with_state((metrics, ledger)))
        .map(|(m, l): (Arc<FloMetrics>, SharedLedger)| {
            {
                let guard = safe_lock(&l);
                m.update_ledger_metrics(&guard);
            }
            match m.export() {
                Ok(output) => warp::reply::with_header(
                    output,
                    "Content-Type",
                    "text/plain; version=0.0.4",
                ),
                Err(e) => warp::reply::with_header(
                    format!("# Error exporting metrics: {}", e),
                    "Content-Type",
                    "text/plain",
                ),
            }
        });

    // 8. Everything else: files from the static directory ("/" → index.html)
    let static_route = warp::fs::dir(static_dir);

    let api = assets_route
        .or(login_route)
        .or(register_route)
        .or(transfer_route)
        .or(daily_reward_route)
        .or(health_route)
        .boxed();

    preflight_route
        .or(api)
        .or(metrics_route)
        .or(static_route)
        .with(warp::log("flo::api"))
        .recover(handle_rejection)
        .with(warp::reply::with::headers(cors_headers()))
}

/// Turn unmatched requests into JSON errors.
async fn handle_rejection(err: warp::Rejection) -> Result<impl warp::Reply, Infallible> {
    let (status, message) = if err.is_not_found() {
        (StatusCode::NOT_FOUND, "not found")
    } else if err.find::<warp::reject::MethodNotAllowed>().is_some() {
        (StatusCode::METHOD_NOT_ALLOWED, "method not allowed")
    } else {
        error!("⚠️ Unhandled rejection: {:?}", err);
        (StatusCode::INTERNAL_SERVER_ERROR, "internal server error")
    };
    Ok(api_json(
        status,
        json!({
            "success": false,
            "message": message
        }),
    ))
}
