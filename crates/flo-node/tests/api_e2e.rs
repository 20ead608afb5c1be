// ========================================
// END-TO-END API TESTS FOR FLO-NODE
// ========================================
//
// Drives the full warp route tree (CORS, handlers, static files, rejection
// handler) in-process with warp::test. No sockets are opened.
//
// Usage:
//   cargo test -p flo-node --test api_e2e
//
// ========================================

use flo_core::{safe_lock, shared, Ledger, SharedLedger};
use flo_node::{routes, DailyPayoutScheduler, FloMetrics};
use serde_json::{json, Value};
use std::path::PathBuf;
use std::sync::Arc;
use warp::http::StatusCode;
use warp::test::request;

struct Node {
    ledger: SharedLedger,
    metrics: Arc<FloMetrics>,
    static_dir: PathBuf,
}

impl Node {
    fn new() -> Self {
        Self::with_static_dir(PathBuf::from("."))
    }

    fn with_static_dir(static_dir: PathBuf) -> Self {
        Node {
            ledger: shared(Ledger::with_demo_genesis()),
            metrics: FloMetrics::new().expect("metrics"),
            static_dir,
        }
    }

    async fn post(&self, path: &str, body: &str) -> (StatusCode, Value) {
        let api = routes(self.ledger.clone(), self.metrics.clone(), self.static_dir.clone());
        let resp = request()
            .method("POST")
            .path(path)
            .header("content-type", "application/json")
            .body(body.to_string())
            .reply(&api)
            .await;
        let status = resp.status();
        let json = serde_json::from_slice(resp.body()).expect("JSON body");
        (status, json)
    }

    async fn get_json(&self, path: &str) -> (StatusCode, Value) {
        let api = routes(self.ledger.clone(), self.metrics.clone(), self.static_dir.clone());
        let resp = request().method("GET").path(path).reply(&api).await;
        let status = resp.status();
        let json = serde_json::from_slice(resp.body()).expect("JSON body");
        (status, json)
    }

    fn balance(&self, user: &str) -> f64 {
        safe_lock(&self.ledger).balance_of(user)
    }
}

fn balance_in(assets: &Value, user: &str) -> Option<f64> {
    assets["assets"]
        .as_array()?
        .iter()
        .find(|a| a["userId"] == user)
        .and_then(|a| a["balance"].as_f64())
}

// ========================================
// ASSETS
// ========================================

#[tokio::test]
async fn test_list_assets_returns_seeded_accounts() {
    let node = Node::new();
    let (status, body) = node.get_json("/api/assets").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["assets"].as_array().map(|a| a.len()), Some(10));
    assert_eq!(balance_in(&body, "user1"), Some(1250.0));
    assert_eq!(balance_in(&body, "user10"), Some(420.0));
    assert_eq!(balance_in(&body, "admin"), None);
}

// ========================================
// LOGIN / REGISTER
// ========================================

#[tokio::test]
async fn test_admin_login() {
    let node = Node::new();
    let (status, body) = node
        .post("/api/login", r#"{"username":"admin","password":"123456"}"#)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["user"]["username"], "admin");
    assert!(body["user"].get("password").is_none());
}

#[tokio::test]
async fn test_bad_login_is_401() {
    let node = Node::new();
    let (status, body) = node
        .post("/api/login", r#"{"username":"admin","password":"654321"}"#)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, json!({"success": false, "message": "invalid credentials"}));
}

#[tokio::test]
async fn test_register_login_and_list() {
    let node = Node::new();
    let creds = r#"{"username":"frank","password":"s3cret"}"#;

    let (status, body) = node.post("/api/register", creds).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"success": true, "message": "registered"}));

    let (status, body) = node.post("/api/login", creds).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["balance"], 1000.0);

    let (_, assets) = node.get_json("/api/assets").await;
    assert_eq!(balance_in(&assets, "frank"), Some(1000.0));
}

#[tokio::test]
async fn test_duplicate_register_is_409() {
    let node = Node::new();
    node.post("/api/register", r#"{"username":"gina","password":"a"}"#).await;
    let (status, body) = node
        .post("/api/register", r#"{"username":"gina","password":"b"}"#)
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body, json!({"success": false, "message": "username taken"}));
}

// ========================================
// TRANSFER
// ========================================

#[tokio::test]
async fn test_transfer_user1_to_user2() {
    let node = Node::new();
    let (status, body) = node
        .post("/api/transfer", r#"{"from":"user1","to":"user2","amount":250.0}"#)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"success": true, "message": "transfer ok"}));
    assert_eq!(node.balance("user1"), 1000.0);
    assert_eq!(node.balance("user2"), 1230.0);
}

#[tokio::test]
async fn test_overdraft_is_400_and_unchanged() {
    let node = Node::new();
    let (status, body) = node
        .post("/api/transfer", r#"{"from":"user10","to":"user2","amount":420.01}"#)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"success": false, "message": "insufficient funds"}));
    assert_eq!(node.balance("user10"), 420.0);
    assert_eq!(node.balance("user2"), 980.0);
}

#[tokio::test]
async fn test_negative_transfer_is_accepted() {
    // Amount sign is not validated; the sender gains.
    let node = Node::new();
    let (status, _) = node
        .post("/api/transfer", r#"{"from":"user8","to":"user9","amount":-20}"#)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(node.balance("user8"), 800.0);
    assert_eq!(node.balance("user9"), 1430.0);
}

// ========================================
// DAILY REWARD
// ========================================

#[tokio::test]
async fn test_daily_reward_then_repeat() {
    let node = Node::new();
    let body = r#"{"username":"user1"}"#;

    let (status, first) = node.post("/api/daily-reward", body).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["success"], true);
    assert_eq!(first["newBalance"], 1350.0);
    assert_eq!(node.balance("user1"), 1350.0);

    let (status, second) = node.post("/api/daily-reward", body).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(second, json!({"success": false, "message": "already claimed"}));
    assert_eq!(node.balance("user1"), 1350.0);
}

#[tokio::test]
async fn test_payout_reopens_daily_reward() {
    let node = Node::new();
    node.post("/api/register", r#"{"username":"hank","password":"p"}"#).await;
    node.post("/api/daily-reward", r#"{"username":"hank"}"#).await;
    assert_eq!(node.balance("hank"), 1100.0);

    DailyPayoutScheduler::new(node.ledger.clone(), node.metrics.clone(), 100.0).fire();
    assert_eq!(node.balance("hank"), 1200.0);

    let (_, again) = node.post("/api/daily-reward", r#"{"username":"hank"}"#).await;
    assert_eq!(again["success"], true);
    assert_eq!(again["newBalance"], 1300.0);
}

// ========================================
// MALFORMED INPUT / ROUTING
// ========================================

#[tokio::test]
async fn test_malformed_bodies_are_400() {
    let node = Node::new();
    for path in ["/api/login", "/api/register", "/api/transfer", "/api/daily-reward"] {
        let (status, body) = node.post(path, "{not json").await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", path);
        assert_eq!(body, json!({"success": false, "message": "invalid request body"}));
    }
    assert_eq!(node.metrics.api_bad_requests_total.get(), 4);
}

#[tokio::test]
async fn test_lenient_bodies_are_accepted() {
    let node = Node::new();
    let (status, body) = node
        .post("/api/login", r#"{"Username":"admin","Password":"123456"}"#)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["username"], "admin");

    let (status, body) = node
        .post("/api/daily-reward", r#"{"username":"user1","extra":null} {"ignored":true}"#)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["newBalance"], 1350.0);
    assert_eq!(node.metrics.api_bad_requests_total.get(), 0);
}

#[tokio::test]
async fn test_unknown_path_is_404_with_cors() {
    let node = Node::new();
    let api = routes(node.ledger.clone(), node.metrics.clone(), node.static_dir.clone());
    let resp = request().path("/no/such/file.txt").reply(&api).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(resp.headers()["access-control-allow-origin"], "*");
}

#[tokio::test]
async fn test_wrong_method_on_api_route() {
    let node = Node::new();
    let api = routes(node.ledger.clone(), node.metrics.clone(), node.static_dir.clone());
    let resp = request().method("GET").path("/api/transfer").reply(&api).await;
    assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
}

// ========================================
// STATIC FILES / HEALTH / METRICS
// ========================================

#[tokio::test]
async fn test_root_serves_index_html() {
    let dir = tempfile::tempdir().expect("tempdir");
    std::fs::write(dir.path().join("index.html"), "<h1>FLO wallet</h1>").expect("write index");
    std::fs::write(dir.path().join("app.js"), "console.log('flo')").expect("write js");
    let node = Node::with_static_dir(dir.path().to_path_buf());
    let api = routes(node.ledger.clone(), node.metrics.clone(), node.static_dir.clone());

    let resp = request().path("/").reply(&api).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.body().as_ref(), b"<h1>FLO wallet</h1>");
    assert_eq!(resp.headers()["access-control-allow-origin"], "*");

    let resp = request().path("/app.js").reply(&api).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.body().as_ref(), b"console.log('flo')");
}

#[tokio::test]
async fn test_health_reports_counts() {
    let node = Node::new();
    let (status, body) = node.get_json("/api/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["accounts"], 10);
    assert_eq!(body["registeredUsers"], 1);
}

#[tokio::test]
async fn test_metrics_endpoint_reflects_activity() {
    let node = Node::new();
    node.post("/api/transfer", r#"{"from":"user1","to":"user2","amount":1}"#).await;

    let api = routes(node.ledger.clone(), node.metrics.clone(), node.static_dir.clone());
    let resp = request().path("/metrics").reply(&api).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let text = String::from_utf8(resp.body().to_vec()).expect("utf8");
    assert!(text.contains("flo_transfers_total 1"));
    assert!(text.contains("flo_accounts_total 10"));
}
