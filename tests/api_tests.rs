//! HTTP API tests
//!
//! Full route table over MemoryStorage, with a fake identity provider.

use std::sync::Arc;

use actix_web::http::{StatusCode, header};
use actix_web::{App, test};
use async_trait::async_trait;
use serde_json::Value;

use qrshorten::api::jwt::JwtService;
use qrshorten::api::services::AppServices;
use qrshorten::api::services::types::ShortenResponse;
use qrshorten::config::AppConfig;
use qrshorten::errors::{QrShortenError, Result};
use qrshorten::runtime::lifetime::startup::build_app_services;
use qrshorten::services::{DisabledQrPublisher, IdentityProvider};
use qrshorten::storage::{ExternalProfile, Repositories};

const GOOD_CODE: &str = "good-code";

struct FakeProvider;

#[async_trait]
impl IdentityProvider for FakeProvider {
    fn name(&self) -> &str {
        "google"
    }

    fn authorize_url(&self, state: &str) -> Result<String> {
        Ok(format!("https://idp.example.com/auth?state={}", state))
    }

    async fn exchange(&self, code: &str) -> Result<ExternalProfile> {
        if code != GOOD_CODE {
            return Err(QrShortenError::upstream("token exchange failed"));
        }
        Ok(ExternalProfile {
            provider_id: "g-1".to_string(),
            email: "alice@example.com".to_string(),
            name: "Alice".to_string(),
        })
    }
}

fn setup() -> (AppServices, Repositories) {
    let mut config = AppConfig::default();
    config.auth.jwt_secret = "test-secret".to_string();
    let repos = Repositories::in_memory();
    let services = build_app_services(
        &config,
        &repos,
        Arc::new(FakeProvider),
        Arc::new(DisabledQrPublisher),
    );
    (services, repos)
}

async fn seed_token(services: &AppServices, repos: &Repositories, email: &str) -> String {
    let user = repos
        .users
        .find_or_create_user(&ExternalProfile {
            provider_id: format!("pid-{}", email),
            email: email.to_string(),
            name: email.to_string(),
        })
        .await
        .unwrap();
    services.jwt.issue_token(user.id).unwrap()
}

fn bearer(token: &str) -> (header::HeaderName, String) {
    (header::AUTHORIZATION, format!("Bearer {}", token))
}

#[actix_web::test]
async fn test_health() {
    let (services, _repos) = setup();
    let app = test::init_service(App::new().configure(|cfg| services.configure(cfg))).await;

    let req = test::TestRequest::get().uri("/api/health").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["storage"], "memory");
}

#[actix_web::test]
async fn test_protected_routes_require_bearer_token() {
    let (services, _repos) = setup();
    let app = test::init_service(App::new().configure(|cfg| services.configure(cfg))).await;

    for (method, uri) in [
        ("GET", "/api/profile"),
        ("POST", "/api/shorten"),
        ("GET", "/api/my-links"),
        ("DELETE", "/api/links/1"),
        ("GET", "/api/stats"),
    ] {
        let req = test::TestRequest::default()
            .method(method.parse().unwrap())
            .uri(uri)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED, "{} {}", method, uri);
        let body: Value = test::read_body_json(resp).await;
        assert!(body["error"].is_string());
    }
}

#[actix_web::test]
async fn test_malformed_authorization_headers() {
    let (services, _repos) = setup();
    let app = test::init_service(App::new().configure(|cfg| services.configure(cfg))).await;

    let req = test::TestRequest::get().uri("/api/my-links").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let no_header_body = test::read_body(resp).await;

    let foreign = JwtService::new("another-secret", 72).issue_token(1).unwrap();
    let expired = JwtService::new("test-secret", 72)
        .issue_token_at(1, 1_000_000)
        .unwrap();
    let values = [
        "Bearer".to_string(),
        "Bearer ".to_string(),
        "Basic abc".to_string(),
        "bearer abc".to_string(),
        "Bearer not.a.jwt".to_string(),
        "Bearer a.b.c".to_string(),
        format!("Bearer {}", foreign),
        format!("Bearer {}", expired),
    ];

    // 缺失与无效 token 的响应体完全一致
    for value in values {
        let req = test::TestRequest::get()
            .uri("/api/my-links")
            .insert_header((header::AUTHORIZATION, value.as_str()))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED, "{:?}", value);
        assert_eq!(test::read_body(resp).await, no_header_body, "{:?}", value);
    }
}

#[actix_web::test]
async fn test_shorten_list_redirect_stats_delete() {
    let (services, repos) = setup();
    let token = seed_token(&services, &repos, "owner@example.com").await;
    let app = test::init_service(App::new().configure(|cfg| services.configure(cfg))).await;

    // shorten
    let req = test::TestRequest::post()
        .uri("/api/shorten")
        .insert_header(bearer(&token))
        .set_json(serde_json::json!({ "long_url": "https://example.com/page" }))
        .to_request();
    let created: ShortenResponse = test::call_and_read_body_json(&app, req).await;
    assert_eq!(created.short_url.len(), 8);
    assert_eq!(
        created.full_short_url,
        format!("http://localhost:8080/{}", created.short_url)
    );
    assert!(created.qr_url.is_none());

    // redirect twice
    for _ in 0..2 {
        let req = test::TestRequest::get()
            .uri(&format!("/{}", created.short_url))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FOUND);
        assert_eq!(
            resp.headers().get(header::LOCATION).unwrap(),
            "https://example.com/page"
        );
        assert_eq!(resp.headers().get(header::CACHE_CONTROL).unwrap(), "no-store");
    }

    // list
    let req = test::TestRequest::get()
        .uri("/api/my-links")
        .insert_header(bearer(&token))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["status"], "success");
    let links = body["data"].as_array().unwrap();
    assert_eq!(links.len(), 1);
    assert_eq!(links[0]["short_code"], created.short_url.as_str());
    assert_eq!(links[0]["click_count"], 2);
    let link_id = links[0]["id"].as_i64().unwrap();

    // stats
    let req = test::TestRequest::get()
        .uri("/api/stats")
        .insert_header(bearer(&token))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["total_links"], 1);
    assert_eq!(body["total_clicks"], 2);

    // delete
    let req = test::TestRequest::delete()
        .uri(&format!("/api/links/{}", link_id))
        .insert_header(bearer(&token))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["message"], "link deleted");

    let req = test::TestRequest::get()
        .uri(&format!("/{}", created.short_url))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_shorten_rejects_empty_url() {
    let (services, repos) = setup();
    let token = seed_token(&services, &repos, "empty@example.com").await;
    let app = test::init_service(App::new().configure(|cfg| services.configure(cfg))).await;

    let req = test::TestRequest::post()
        .uri("/api/shorten")
        .insert_header(bearer(&token))
        .set_json(serde_json::json!({ "long_url": "  " }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let req = test::TestRequest::post()
        .uri("/api/shorten")
        .insert_header(bearer(&token))
        .insert_header((header::CONTENT_TYPE, "application/json"))
        .set_payload("{not json")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_delete_foreign_link_is_not_found() {
    let (services, repos) = setup();
    let alice = seed_token(&services, &repos, "alice@example.com").await;
    let bob = seed_token(&services, &repos, "bob@example.com").await;
    let app = test::init_service(App::new().configure(|cfg| services.configure(cfg))).await;

    let req = test::TestRequest::post()
        .uri("/api/shorten")
        .insert_header(bearer(&alice))
        .set_json(serde_json::json!({ "long_url": "https://example.com" }))
        .to_request();
    let created: ShortenResponse = test::call_and_read_body_json(&app, req).await;
    let link = repos
        .links
        .find_by_code(&created.short_url)
        .await
        .unwrap()
        .unwrap();

    let req = test::TestRequest::delete()
        .uri(&format!("/api/links/{}", link.id))
        .insert_header(bearer(&bob))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let req = test::TestRequest::delete()
        .uri("/api/links/not-a-number")
        .insert_header(bearer(&bob))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    assert!(repos.links.find_by_code(&created.short_url).await.unwrap().is_some());
}

#[actix_web::test]
async fn test_redirect_unknown_and_invalid_codes() {
    let (services, _repos) = setup();
    let app = test::init_service(App::new().configure(|cfg| services.configure(cfg))).await;

    for uri in ["/unknown1", "/bad.code"] {
        let req = test::TestRequest::get().uri(uri).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND, "{}", uri);
    }
}

#[actix_web::test]
async fn test_sign_in_flow() {
    let (services, _repos) = setup();
    let app = test::init_service(App::new().configure(|cfg| services.configure(cfg))).await;

    let req = test::TestRequest::get().uri("/api/auth/google").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    let location = resp
        .headers()
        .get(header::LOCATION)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(location.starts_with("https://idp.example.com/auth?state="));

    let state_cookie = resp
        .response()
        .cookies()
        .find(|c| c.name() == "qs_oauth_state")
        .unwrap()
        .into_owned();
    assert!(state_cookie.http_only().unwrap_or(false));
    let state = state_cookie.value().to_string();
    assert!(location.ends_with(&state));

    let req = test::TestRequest::get()
        .uri(&format!(
            "/api/auth/google/callback?code={}&state={}",
            GOOD_CODE, state
        ))
        .cookie(state_cookie)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    let redirect = url::Url::parse(
        resp.headers()
            .get(header::LOCATION)
            .unwrap()
            .to_str()
            .unwrap(),
    )
    .unwrap();
    assert_eq!(redirect.path(), "/dashboard");
    let token = redirect
        .query_pairs()
        .find(|(k, _)| k == "token")
        .map(|(_, v)| v.into_owned())
        .unwrap();

    let req = test::TestRequest::get()
        .uri("/api/profile")
        .insert_header(bearer(&token))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["email"], "alice@example.com");
    assert_eq!(body["name"], "Alice");
}

#[actix_web::test]
async fn test_callback_with_mismatched_state() {
    let (services, _repos) = setup();
    let app = test::init_service(App::new().configure(|cfg| services.configure(cfg))).await;

    let req = test::TestRequest::get()
        .uri(&format!(
            "/api/auth/google/callback?code={}&state=forged",
            GOOD_CODE
        ))
        .cookie(actix_web::cookie::Cookie::new("qs_oauth_state", "expected"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    // 没有 cookie
    let req = test::TestRequest::get()
        .uri(&format!(
            "/api/auth/google/callback?code={}&state=forged",
            GOOD_CODE
        ))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn test_unknown_provider() {
    let (services, _repos) = setup();
    let app = test::init_service(App::new().configure(|cfg| services.configure(cfg))).await;

    let req = test::TestRequest::get().uri("/api/auth/github").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
