//! Integration tests for feed paging, refresh and the own-recipes list,
//! driving `App` against a mock recipe server.

use dapur::api::RecipeClient;
use dapur::app::{App, AppEvent, Effect, NoticeKind};
use dapur::auth::StaticTokenStore;
use dapur::config::Settings;
use dapur::feed::{FeedPhase, FeedSettings};
use dapur::image::LocalFileSource;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn recipe_json(id: &str) -> Value {
    json!({
        "_id": id,
        "title": format!("Recipe {id}"),
        "ingredients": ["1 onion", "2 carrots", "salt"],
        "steps": ["Boil", "Serve"],
        "image": format!("https://cdn.example.com/{id}.jpg"),
        "user": { "_id": "u1", "username": "sari", "profileImage": null },
        "createdAt": "2024-05-01T10:00:00.000Z"
    })
}

fn page_json(ids: &[&str], total_pages: u32) -> Value {
    json!({
        "Recipes": ids.iter().map(|id| recipe_json(id)).collect::<Vec<_>>(),
        "totalPages": total_pages
    })
}

async fn mount_page(server: &MockServer, page: u32, body: Value, times: u64) {
    Mock::given(method("GET"))
        .and(path("/api/recipe"))
        .and(query_param("page", page.to_string()))
        .and(query_param("limit", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .expect(times)
        .mount(server)
        .await;
}

fn app_for(server: &MockServer, floor: Duration) -> (App, mpsc::Receiver<AppEvent>) {
    let auth = Arc::new(StaticTokenStore::signed_in("secret-token"));
    let api = Arc::new(
        RecipeClient::new(
            &format!("{}/api", server.uri()),
            auth.clone(),
            Duration::from_secs(5),
        )
        .unwrap(),
    );
    let settings = Settings {
        feed: FeedSettings {
            page_limit: 2,
            refresh_floor: floor,
        },
        ..Settings::default()
    };
    let (tx, rx) = mpsc::channel(32);
    let app = App::new(
        api,
        auth,
        Arc::new(LocalFileSource::new("/nonexistent")),
        settings,
        tx,
    );
    (app, rx)
}

fn feed_ids(app: &App) -> Vec<String> {
    app.feed.items().iter().map(|r| r.id.clone()).collect()
}

#[tokio::test]
async fn test_paging_merges_overlap_and_stops_at_last_page() {
    let server = MockServer::start().await;
    mount_page(&server, 1, page_json(&["a", "b"], 2), 1).await;
    // An insert between fetches shifted "b" onto page 2
    mount_page(&server, 2, page_json(&["b", "c"], 2), 1).await;

    let (mut app, mut rx) = app_for(&server, Duration::from_millis(10));
    app.feed.load_initial();
    assert!(app.settle(&mut rx).await.is_empty());
    assert!(app.feed.has_more());

    assert!(app.feed.load_more());
    app.settle(&mut rx).await;
    assert_eq!(feed_ids(&app), vec!["a", "b", "c"]);
    assert_eq!((app.feed.page(), app.feed.total_pages()), (2, 2));

    // No third request: the mocks above expect exactly one call each
    assert!(!app.feed.load_more());
    assert_eq!(app.feed.phase(), FeedPhase::Idle);

    let author = app.feed.items()[0].author.as_ref().unwrap();
    assert_eq!(author.username(), Some("sari"));
}

#[tokio::test]
async fn test_refresh_replaces_items_and_respects_floor() {
    let server = MockServer::start().await;
    mount_page(&server, 1, page_json(&["a", "b"], 3), 2).await;
    mount_page(&server, 2, page_json(&["c", "d"], 3), 1).await;

    let floor = Duration::from_millis(200);
    let (mut app, mut rx) = app_for(&server, floor);
    app.feed.load_initial();
    app.settle(&mut rx).await;
    app.feed.load_more();
    app.settle(&mut rx).await;
    assert_eq!(app.feed.items().len(), 4);

    let started = Instant::now();
    assert!(app.feed.refresh());
    assert!(app.feed.is_refreshing());
    app.settle(&mut rx).await;

    assert!(started.elapsed() >= floor);
    assert!(!app.feed.is_refreshing());
    assert_eq!(feed_ids(&app), vec!["a", "b"]);
    assert_eq!(app.feed.page(), 1);
    assert!(app.feed.has_more());
}

#[tokio::test]
async fn test_initial_load_failure_surfaces_server_message() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/recipe"))
        .respond_with(
            ResponseTemplate::new(500).set_body_json(json!({ "message": "Database offline" })),
        )
        .mount(&server)
        .await;

    let (mut app, mut rx) = app_for(&server, Duration::from_millis(10));
    app.feed.load_initial();
    let effects = app.settle(&mut rx).await;

    match effects.as_slice() {
        [Effect::Notify(notice)] => {
            assert_eq!(notice.kind, NoticeKind::Error);
            assert_eq!(notice.message, "Database offline");
        }
        other => panic!("Expected one error notice, got {:?}", other),
    }
    assert!(app.feed.items().is_empty());
    assert!(!app.feed.has_more());
}

#[tokio::test]
async fn test_load_more_failure_is_silent() {
    let server = MockServer::start().await;
    mount_page(&server, 1, page_json(&["a", "b"], 3), 1).await;
    Mock::given(method("GET"))
        .and(path("/api/recipe"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let (mut app, mut rx) = app_for(&server, Duration::from_millis(10));
    app.feed.load_initial();
    app.settle(&mut rx).await;

    app.feed.load_more();
    assert!(app.settle(&mut rx).await.is_empty());
    assert_eq!(feed_ids(&app), vec!["a", "b"]);
    assert_eq!(app.feed.page(), 1);
}

#[tokio::test]
async fn test_own_recipes_load_sends_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/recipe/user"))
        .and(header("authorization", "Bearer secret-token"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([recipe_json("m1"), recipe_json("m2")])),
        )
        .expect(1)
        .mount(&server)
        .await;

    let (mut app, mut rx) = app_for(&server, Duration::from_millis(10));
    app.profile.load();
    assert!(app.settle(&mut rx).await.is_empty());
    let ids: Vec<&str> = app.profile.items().iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["m1", "m2"]);
}
