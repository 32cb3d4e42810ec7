mod common;

use axum::http::StatusCode;
use serde_json::{Value, json};
use std::time::Duration;

use common::{test_app, wait_for_clicks};

async fn seed(server: &axum_test::TestServer, aliases: &[&str]) {
    for alias in aliases {
        let response = server
            .post("/shorten")
            .json(&json!({"longUrl": format!("https://{alias}.com"), "customAlias": alias}))
            .await;
        assert_eq!(response.status_code(), StatusCode::OK);
    }
}

fn keys(items: &[Value]) -> Vec<&str> {
    items
        .iter()
        .map(|item| item["shortKey"].as_str().unwrap())
        .collect()
}

#[tokio::test]
async fn test_list_urls_pages_in_creation_order() {
    let app = test_app().build();
    seed(&app.server, &["one", "two", "three"]).await;

    let first = app.server.get("/admin/urls?page=0&size=2").await;
    assert_eq!(first.status_code(), StatusCode::OK);
    let first = first.json::<Vec<Value>>();
    assert_eq!(keys(&first), vec!["one", "two"]);
    assert_eq!(first[0]["longUrl"], "https://one.com");
    assert_eq!(first[0]["clickCount"], 0);

    let second = app.server.get("/admin/urls?page=1&size=2").await.json::<Vec<Value>>();
    assert_eq!(keys(&second), vec!["three"]);
}

#[tokio::test]
async fn test_list_urls_defaults() {
    let app = test_app().build();
    seed(&app.server, &["solo"]).await;

    let items = app.server.get("/admin/urls").await.json::<Vec<Value>>();
    assert_eq!(keys(&items), vec!["solo"]);
}

#[tokio::test]
async fn test_list_urls_rejects_bad_paging() {
    let app = test_app().build();

    for query in ["size=0", "size=1001", "page=-1", "page=abc"] {
        let response = app.server.get(&format!("/admin/urls?{query}")).await;
        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST, "{query}");
        assert_eq!(response.json::<Value>()["code"], "ERR_INVALID_REQUEST");
    }
}

#[tokio::test]
async fn test_top_clicked_and_summary() {
    let app = test_app().build();
    seed(&app.server, &["cold", "hot", "warm"]).await;

    for _ in 0..3 {
        app.server.get("/hot").await;
    }
    app.server.get("/warm").await;

    assert_eq!(wait_for_clicks(&app.server, "hot", 3).await, 3);
    assert_eq!(wait_for_clicks(&app.server, "warm", 1).await, 1);

    let top = app
        .server
        .get("/admin/analytics/top-clicked?size=10")
        .await
        .json::<Vec<Value>>();
    assert_eq!(keys(&top), vec!["hot", "warm", "cold"]);

    let summary = app.server.get("/admin/analytics/summary").await;
    assert_eq!(summary.status_code(), StatusCode::OK);
    assert_eq!(
        summary.json::<Value>(),
        json!({"totalUrls": 3, "totalClicks": 4})
    );
}

#[tokio::test]
async fn test_delete_url_then_not_found() {
    let app = test_app().build();
    seed(&app.server, &["gone"]).await;

    // Warm the cache so deletion must evict it.
    assert_eq!(app.server.get("/gone").await.status_code(), StatusCode::FOUND);

    let deleted = app.server.delete("/admin/urls/gone").await;
    assert_eq!(deleted.status_code(), StatusCode::OK);
    assert!(deleted.text().is_empty());

    assert_eq!(
        app.server.get("/gone").await.status_code(),
        StatusCode::NOT_FOUND
    );

    let again = app.server.delete("/admin/urls/gone").await;
    assert_eq!(again.status_code(), StatusCode::NOT_FOUND);
    assert_eq!(again.json::<Value>()["code"], "ERR_NOT_FOUND");
}

#[tokio::test]
async fn test_delete_expired_reports_count() {
    let app = test_app().build();
    seed(&app.server, &["keep"]).await;
    for alias in ["old1", "old2"] {
        app.server
            .post("/shorten")
            .json(&json!({"longUrl": "https://old.com", "customAlias": alias, "expiryDays": 0}))
            .await;
    }

    tokio::time::sleep(Duration::from_millis(5)).await;

    let response = app.server.delete("/admin/expired").await;
    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(response.text(), "Deleted expired entries: 2");
    assert_eq!(app.repository.len(), 1);

    let again = app.server.delete("/admin/expired").await;
    assert_eq!(again.text(), "Deleted expired entries: 0");
}
