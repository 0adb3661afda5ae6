use std::sync::Arc;

use chrono::{Duration as ChronoDuration, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use reqwest::StatusCode;
use serde_json::json;

use bizconsole_api::app::{build_app, services::AppServices};
use bizconsole_auth::{JwtClaims, MenuTaxonomy, SubjectId, SubjectRole};

const JWT_SECRET: &str = "test-secret";

struct TestServer {
    base_url: String,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn() -> Self {
        // Same router as prod, in-memory store, ephemeral port.
        let services = Arc::new(AppServices::in_memory(Arc::new(
            MenuTaxonomy::builtin().clone(),
        )));
        let app = build_app(services, JWT_SECRET);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { base_url, handle }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn mint_jwt(subject: &str, role: u8) -> String {
    let now = Utc::now();
    let claims = JwtClaims {
        sub: SubjectId::parse(subject).unwrap(),
        role: SubjectRole::new(role),
        issued_at: now - ChronoDuration::seconds(1),
        expires_at: now + ChronoDuration::minutes(10),
    };

    jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(JWT_SECRET.as_bytes()),
    )
    .expect("failed to encode jwt")
}

fn admin() -> String {
    mint_jwt("owner", 1)
}

async fn batch_update(
    client: &reqwest::Client,
    srv: &TestServer,
    token: &str,
    body: serde_json::Value,
) -> reqwest::Response {
    client
        .put(srv.url("/permissions/batch-update"))
        .bearer_auth(token)
        .json(&body)
        .send()
        .await
        .unwrap()
}

#[tokio::test]
async fn health_is_public() {
    let srv = TestServer::spawn().await;
    let res = reqwest::get(srv.url("/health")).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn auth_required_for_protected_endpoints() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client.get(srv.url("/menu")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = client
        .get(srv.url("/menu"))
        .bearer_auth("not-a-token")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn batch_update_then_read_back_filtered() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let token = admin();

    let res = batch_update(
        &client,
        &srv,
        &token,
        json!({
            "subjectId": "emp-100",
            "permissions": {
                "salesAllCategory": { "view": true, "delete": true, "edit": false, "frobnicate": true },
                "noSuchMenu": { "view": true },
                "gstRates": { "view": false }
            }
        }),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["success"], true);

    let res = client
        .get(srv.url("/permissions/emp-100"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(
        body,
        json!({
            "success": true,
            "permissions": [ { "key": "salesAllCategory", "actions": ["view", "delete"] } ]
        })
    );
}

#[tokio::test]
async fn batch_update_is_a_full_replace() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let token = admin();

    batch_update(
        &client,
        &srv,
        &token,
        json!({ "subjectId": "emp-1", "permissions": { "gstRates": { "view": true } } }),
    )
    .await;
    batch_update(
        &client,
        &srv,
        &token,
        json!({ "subjectId": "emp-1", "permissions": { "dashboard": { "view": true } } }),
    )
    .await;

    let body: serde_json::Value = client
        .get(srv.url("/permissions/emp-1"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let keys: Vec<_> = body["permissions"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["key"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(keys, vec!["dashboard"]);
}

#[tokio::test]
async fn non_administrators_cannot_write() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = batch_update(
        &client,
        &srv,
        &mint_jwt("emp-2", 2),
        json!({ "subjectId": "emp-2", "permissions": { "dashboard": { "view": true } } }),
    )
    .await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["success"], false);

    let res = client
        .delete(srv.url("/permissions/emp-2"))
        .bearer_auth(mint_jwt("emp-2", 2))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn malformed_payloads_are_rejected() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let token = admin();

    let res = batch_update(
        &client,
        &srv,
        &token,
        json!({ "subjectId": "bad id!", "permissions": {} }),
    )
    .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["success"], false);

    let res = batch_update(&client, &srv, &token, json!({ "permissions": [] })).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = client
        .get(srv.url("/permissions/bad%20id"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn subjects_read_only_their_own_grants() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    batch_update(
        &client,
        &srv,
        &admin(),
        json!({ "subjectId": "emp-3", "permissions": { "rentalOrders": { "view": true, "add": true } } }),
    )
    .await;

    let own = client
        .get(srv.url("/permissions/emp-3"))
        .bearer_auth(mint_jwt("emp-3", 2))
        .send()
        .await
        .unwrap();
    assert_eq!(own.status(), StatusCode::OK);

    let other = client
        .get(srv.url("/permissions/emp-3"))
        .bearer_auth(mint_jwt("emp-4", 2))
        .send()
        .await
        .unwrap();
    assert_eq!(other.status(), StatusCode::FORBIDDEN);

    let me: serde_json::Value = client
        .get(srv.url("/me/permissions"))
        .bearer_auth(mint_jwt("emp-3", 2))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(me["administrator"], false);
    assert_eq!(me["permissions"][0]["actions"], json!(["view", "add"]));
}

#[tokio::test]
async fn explain_reports_decisions() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    batch_update(
        &client,
        &srv,
        &admin(),
        json!({ "subjectId": "emp-5", "permissions": { "salesAllCategory": { "view": true, "edit": true } } }),
    )
    .await;

    let staff = mint_jwt("emp-5", 2);
    let explain = |key: &'static str, action: &'static str| {
        let client = client.clone();
        let url = srv.url(&format!("/me/permissions/explain?key={key}&action={action}"));
        let staff = staff.clone();
        async move {
            let body: serde_json::Value = client
                .get(url)
                .bearer_auth(staff)
                .send()
                .await
                .unwrap()
                .json()
                .await
                .unwrap();
            body["decision"].clone()
        }
    };

    let d = explain("salesAllCategory", "edit").await;
    assert_eq!(d["granted"], true);
    assert_eq!(d["reason"], "granted");

    let d = explain("salesAllCategory", "delete").await;
    assert_eq!(d["granted"], false);
    assert_eq!(d["reason"], "action_not_granted");

    let d = explain("gstRates", "view").await;
    assert_eq!(d["reason"], "key_not_granted");

    let admin_decision: serde_json::Value = client
        .get(srv.url("/me/permissions/explain?key=anything"))
        .bearer_auth(admin())
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(admin_decision["decision"]["reason"], "administrator_bypass");
    assert_eq!(admin_decision["decision"]["action"], "view");
}

#[tokio::test]
async fn matrix_and_permissions_share_the_read_rule() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    batch_update(
        &client,
        &srv,
        &admin(),
        json!({ "subjectId": "emp-7", "permissions": { "employeePermissions": { "view": true } } }),
    )
    .await;
    batch_update(
        &client,
        &srv,
        &admin(),
        json!({ "subjectId": "emp-6", "permissions": { "gstRates": { "delete": true } } }),
    )
    .await;

    let get_as = |path: &'static str, token: String| {
        let client = client.clone();
        let url = srv.url(path);
        async move { client.get(url).bearer_auth(token).send().await.unwrap() }
    };

    // Another subject's grants stay hidden on both endpoints, even with
    // access to the editor screen.
    let res = get_as("/permissions/emp-6", mint_jwt("emp-7", 2)).await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    let res = get_as("/permissions/emp-6/matrix", mint_jwt("emp-7", 2)).await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["success"], false);

    // The subject may read its own grants through either endpoint.
    let res = get_as("/permissions/emp-6", mint_jwt("emp-6", 2)).await;
    assert_eq!(res.status(), StatusCode::OK);
    let res = get_as("/permissions/emp-6/matrix", mint_jwt("emp-6", 2)).await;
    assert_eq!(res.status(), StatusCode::OK);

    // Administrators may read anyone.
    let res = get_as("/permissions/emp-6/matrix", admin()).await;
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    let rows = body["matrix"]["rows"].as_array().unwrap();
    assert_eq!(rows.len(), MenuTaxonomy::builtin().len());
    assert_eq!(rows[0]["key"], "dashboard");
    let gst = rows.iter().find(|r| r["key"] == "gstRates").unwrap();
    let delete = gst["toggles"]
        .as_array()
        .unwrap()
        .iter()
        .find(|t| t["action"] == "delete")
        .unwrap();
    assert_eq!(delete["enabled"], true);
}

#[tokio::test]
async fn explain_without_key_is_a_json_bad_request() {
    let srv = TestServer::spawn().await;
    let res = reqwest::Client::new()
        .get(srv.url("/me/permissions/explain"))
        .bearer_auth(mint_jwt("emp-5", 2))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert!(body["message"].as_str().unwrap().contains("key"));
}

#[tokio::test]
async fn menu_lists_flattened_taxonomy() {
    let srv = TestServer::spawn().await;
    let body: serde_json::Value = reqwest::Client::new()
        .get(srv.url("/menu"))
        .bearer_auth(mint_jwt("emp-8", 2))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(body["version"], MenuTaxonomy::builtin().version());
    let sales = body["entries"]
        .as_array()
        .unwrap()
        .iter()
        .find(|e| e["key"] == "salesAllCategory")
        .unwrap();
    assert_eq!(sales["allowedActions"], json!(["view", "add", "edit", "delete"]));
    assert_eq!(sales["parent"], "sales");
}

#[tokio::test]
async fn deleting_a_subject_clears_grants() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let token = admin();

    batch_update(
        &client,
        &srv,
        &token,
        json!({ "subjectId": "emp-9", "permissions": { "dashboard": { "view": true } } }),
    )
    .await;

    let res = client
        .delete(srv.url("/permissions/emp-9"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let body: serde_json::Value = client
        .get(srv.url("/permissions/emp-9"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["permissions"], json!([]));
}
