// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// FLORAN LEDGER (FLO) - REQUEST HANDLERS
//
// One function per endpoint: decode the body, take the ledger lock for a
// single ledger operation, release it, reply with JSON.
// Bodies arrive as raw bytes so a malformed payload is answered here with
// a 400 instead of bubbling up as a warp rejection. Decoding is lenient:
// only the first JSON value is read, keys match case-insensitively and a
// null field keeps its zero value.
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use crate::metrics::FloMetrics;
use chrono::Local;
use flo_core::{safe_lock, LedgerError, SharedLedger, DAILY_REWARD_FLO};
use log::{debug, info, warn};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use std::time::Instant;
use thiserror::Error;
use warp::http::StatusCode;
use warp::reply::{Json, WithStatus};

/// Body of /api/login and /api/register. Missing fields decode as "".
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CredentialsRequest {
    pub username: String,
    pub password: String,
}

/// Body of /api/transfer. A missing amount decodes as 0.0.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct TransferRequest {
    pub from: String,
    pub to: String,
    pub amount: f64,
}

/// Body of /api/daily-reward
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct DailyRewardRequest {
    pub username: String,
}

/// Everything a handler can fail with.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("malformed request body: {0}")]
    BadRequest(#[from] serde_json::Error),
    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

impl ApiError {
    /// HTTP status for this failure.
    /// A repeated daily claim is answered with 200 and `success: false`.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Ledger(LedgerError::InvalidCredentials) => StatusCode::UNAUTHORIZED,
            Self::Ledger(LedgerError::UsernameTaken { .. }) => StatusCode::CONFLICT,
            Self::Ledger(LedgerError::InsufficientFunds { .. }) => StatusCode::BAD_REQUEST,
            Self::Ledger(LedgerError::AlreadyClaimed { .. }) => StatusCode::OK,
        }
    }

    pub fn client_message(&self) -> &'static str {
        match self {
            Self::BadRequest(_) => "invalid request body",
            Self::Ledger(e) => e.client_message(),
        }
    }
}

/// JSON reply with an explicit status code.
pub fn api_json(status: StatusCode, body: serde_json::Value) -> WithStatus<Json> {
    warp::reply::with_status(warp::reply::json(&body), status)
}

fn error_reply(err: &ApiError) -> WithStatus<Json> {
    api_json(
        err.status(),
        json!({
            "success": false,
            "message": err.client_message()
        }),
    )
}

/// Decode the first JSON value of `body` into `T`.
///
/// Anything after that value is ignored. Object keys are lowercased before
/// matching and null fields are dropped, so they fall back to the default.
/// A top-level `null` decodes as an empty object; any other non-object is an error.
pub fn parse_body<T: DeserializeOwned>(body: &[u8]) -> Result<T, serde_json::Error> {
    let first = serde_json::Deserializer::from_slice(body)
        .into_iter::<Value>()
        .next()
        .unwrap_or_else(|| Err(serde::de::Error::custom("empty request body")))?;

    let normalized = match first {
        Value::Null => Value::Object(Map::new()),
        Value::Object(fields) => Value::Object(
            fields
                .into_iter()
                .filter(|(_, v)| !v.is_null())
                .map(|(k, v)| (k.to_lowercase(), v))
                .collect(),
        ),
        other => {
            return Err(serde::de::Error::custom(format!(
                "expected a JSON object, found {}",
                other
            )))
        }
    };
    serde_json::from_value(normalized)
}

fn decode<T: DeserializeOwned>(body: &[u8], metrics: &FloMetrics) -> Result<T, ApiError> {
    parse_body(body).map_err(|e| {
        metrics.api_bad_requests_total.inc();
        debug!("Rejected malformed body: {}", e);
        ApiError::from(e)
    })
}

/// GET /api/assets
pub fn list_assets(ledger: &SharedLedger, metrics: &FloMetrics) -> WithStatus<Json> {
    metrics.api_requests_total.inc();
    let assets = safe_lock(ledger).list_assets();
    api_json(
        StatusCode::OK,
        json!({
            "success": true,
            "assets": assets
        }),
    )
}

/// POST /api/login
pub fn login(ledger: &SharedLedger, metrics: &FloMetrics, body: &[u8]) -> WithStatus<Json> {
    metrics.api_requests_total.inc();
    let req: CredentialsRequest = match decode(body, metrics) {
        Ok(req) => req,
        Err(e) => return error_reply(&e),
    };

    let outcome = safe_lock(ledger).authenticate(&req.username, &req.password);
    match outcome {
        Ok(user) => {
            metrics.logins_total.inc();
            debug!("🔓 Login: {}", user.username);
            api_json(
                StatusCode::OK,
                json!({
                    "success": true,
                    "user": user
                }),
            )
        }
        Err(e) => {
            metrics.login_failures_total.inc();
            warn!("🔒 Failed login for '{}'", req.username);
            error_reply(&e.into())
        }
    }
}

/// POST /api/register
pub fn register(ledger: &SharedLedger, metrics: &FloMetrics, body: &[u8]) -> WithStatus<Json> {
    metrics.api_requests_total.inc();
    let req: CredentialsRequest = match decode(body, metrics) {
        Ok(req) => req,
        Err(e) => return error_reply(&e),
    };

    let outcome = safe_lock(ledger).register(&req.username, &req.password);
    match outcome {
        Ok(()) => {
            metrics.registrations_total.inc();
            info!("👤 Registered new user '{}'", req.username);
            api_json(
                StatusCode::OK,
                json!({
                    "success": true,
                    "message": "registered"
                }),
            )
        }
        Err(e) => {
            metrics.registration_conflicts_total.inc();
            debug!("Registration refused: {}", e);
            error_reply(&e.into())
        }
    }
}

/// POST /api/transfer
pub fn transfer(ledger: &SharedLedger, metrics: &FloMetrics, body: &[u8]) -> WithStatus<Json> {
    metrics.api_requests_total.inc();
    let req: TransferRequest = match decode(body, metrics) {
        Ok(req) => req,
        Err(e) => return error_reply(&e),
    };

    let outcome = {
        let mut l = safe_lock(ledger);
        let opens_account = !l.has_account(&req.to);
        l.transfer(&req.from, &req.to, req.amount)
            .map(|()| opens_account)
    };
    match outcome {
        Ok(opens_account) => {
            metrics.transfers_total.inc();
            if opens_account {
                info!("🆕 Account '{}' created by incoming transfer", req.to);
            }
            info!("💸 Transfer: {} → {} ({} FLO)", req.from, req.to, req.amount);
            api_json(
                StatusCode::OK,
                json!({
                    "success": true,
                    "message": "transfer ok"
                }),
            )
        }
        Err(e) => {
            metrics.transfers_rejected_total.inc();
            debug!("Transfer refused: {}", e);
            error_reply(&e.into())
        }
    }
}

/// POST /api/daily-reward
pub fn daily_reward(ledger: &SharedLedger, metrics: &FloMetrics, body: &[u8]) -> WithStatus<Json> {
    metrics.api_requests_total.inc();
    let req: DailyRewardRequest = match decode(body, metrics) {
        Ok(req) => req,
        Err(e) => return error_reply(&e),
    };

    let outcome = {
        let mut l = safe_lock(ledger);
        // Date is read under the lock the midnight payout also takes
        let today = Local::now().date_naive();
        l.claim_daily_reward(&req.username, today).map(|new_balance| {
            let claimed_at = l
                .claim_record(&req.username, today)
                .map(|r| r.formatted())
                .unwrap_or_default();
            (new_balance, claimed_at)
        })
    };
    match outcome {
        Ok((new_balance, claimed_at)) => {
            metrics.daily_claims_total.inc();
            info!(
                "🎁 Daily reward: {} (+{} FLO, balance {}) at {}",
                req.username, DAILY_REWARD_FLO, new_balance, claimed_at
            );
            api_json(
                StatusCode::OK,
                json!({
                    "success": true,
                    "message": format!("claimed {} FLO", DAILY_REWARD_FLO),
                    "newBalance": new_balance
                }),
            )
        }
        Err(e) => {
            metrics.daily_claims_repeated_total.inc();
            error_reply(&e.into())
        }
    }
}

/// GET /api/health
pub fn health(ledger: &SharedLedger, started: Instant) -> WithStatus<Json> {
    let l = safe_lock(ledger);
    api_json(
        StatusCode::OK,
        json!({
            "success": true,
            "status": "healthy",
            "accounts": l.account_count(),
            "registeredUsers": l.credential_count(),
            "uptimeSeconds": started.elapsed().as_secs(),
            "version": env!("CARGO_PKG_VERSION")
        }),
    )
}
