//! Integration tests for the fetch-and-checkpoint loop

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use social_post_downloader::auth::{Credentials, TokenManager};
use social_post_downloader::fetcher::{FetchError, PostFetcher};
use social_post_downloader::output::{PostCollection, TargetPaths};
use social_post_downloader::resume::CursorStore;
use social_post_downloader::shutdown::ShutdownCoordinator;
use social_post_downloader::transport::ThrottledClient;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn credentials() -> Credentials {
    Credentials {
        client_id: "client".to_string(),
        client_secret: "secret".to_string(),
        username: "user".to_string(),
        password: "pass".to_string(),
    }
}

fn fetcher(server: &MockServer, out_dir: &Path, max_retries: u32) -> PostFetcher {
    let transport = Arc::new(ThrottledClient::new(Duration::ZERO, max_retries).unwrap());
    let tokens = TokenManager::new(transport.clone(), credentials(), server.uri());
    PostFetcher::new(transport, tokens, server.uri(), out_dir)
        .with_page_size(2)
        .with_lookback_days(7)
}

async fn mount_token(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "access_token": "tok",
            "refresh_token": "ref",
            "expires_in": 3600,
        })))
        .mount(server)
        .await;
}

fn post_json(id: i64, content: Option<&str>) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "content": content,
        "externalLink": format!("https://twitter.com/u/status/{id}"),
        "author": {"authorFullName": "A", "avatar": null},
        "parent": null,
        "postType": "TWEET",
        "topics": [7],
        "postDynamics": [{"name": "likes", "value": "0"}],
    })
}

fn page_json(posts: &[serde_json::Value], total_count: i64) -> serde_json::Value {
    serde_json::json!({"data": posts, "meta": {"totalCount": total_count}})
}

fn collection(path: &Path) -> PostCollection {
    PostCollection::load(path).unwrap()
}

#[tokio::test]
async fn single_page_run_terminates_and_partitions() {
    let server = MockServer::start().await;
    let dir = tempfile::TempDir::new().unwrap();
    mount_token(&server).await;

    let posts = [
        post_json(1, Some("first")),
        post_json(2, None),
        post_json(3, Some("third")),
    ];
    Mock::given(method("GET"))
        .and(path("/v3/posts"))
        .and(query_param("topics", "7"))
        .and(query_param("sortBy", "publishedDate-ascending"))
        .and(query_param("limit", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_json(&posts, 1)))
        .expect(1)
        .mount(&server)
        .await;

    let summary = fetcher(&server, dir.path(), 1).fetch("7").await.unwrap();
    assert_eq!(summary.pages, 1);
    assert_eq!(summary.with_content, 2);
    assert_eq!(summary.without_content, 1);
    assert!(!summary.interrupted);

    let paths = TargetPaths::new(dir.path(), "7");
    let all = collection(&paths.all_posts_file());
    let with = collection(&paths.with_content_file());
    let without = collection(&paths.without_content_file());
    assert_eq!(all.data.len(), 3);
    assert_eq!(all.meta.total_count, 3);
    assert_eq!(with.data.len(), 2);
    assert_eq!(without.data.len(), 1);
    assert_eq!(without.data[0].id, 2);

    let cursor = CursorStore::new(paths.cursor_file()).load().unwrap().unwrap();
    assert_eq!(cursor.since_id, Some(3));
    assert_eq!(cursor.topics, "7");
}

#[tokio::test]
async fn multi_page_run_advances_the_position_marker() {
    let server = MockServer::start().await;
    let dir = tempfile::TempDir::new().unwrap();
    mount_token(&server).await;

    // Mounted first so the sinceId match takes priority over the first-page
    // catch-all.
    let second = [post_json(3, Some("c")), post_json(4, None)];
    Mock::given(method("GET"))
        .and(path("/v3/posts"))
        .and(query_param("sinceId", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_json(&second, 1)))
        .expect(1)
        .mount(&server)
        .await;

    let first = [post_json(1, Some("a")), post_json(2, Some("b"))];
    Mock::given(method("GET"))
        .and(path("/v3/posts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_json(&first, 5)))
        .expect(1)
        .mount(&server)
        .await;

    let summary = fetcher(&server, dir.path(), 1).fetch("7").await.unwrap();
    assert_eq!(summary.pages, 2);
    assert_eq!(summary.total(), 4);

    let paths = TargetPaths::new(dir.path(), "7");
    let all = collection(&paths.all_posts_file());
    let ids: Vec<i64> = all.data.iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![1, 2, 3, 4]);

    let cursor = CursorStore::new(paths.cursor_file()).load().unwrap().unwrap();
    assert_eq!(cursor.since_id, Some(4));
}

#[tokio::test]
async fn failed_run_keeps_committed_state_and_resumes_cleanly() {
    let server = MockServer::start().await;
    let dir = tempfile::TempDir::new().unwrap();
    mount_token(&server).await;

    // Second page fails persistently; first page succeeds once.
    Mock::given(method("GET"))
        .and(path("/v3/posts"))
        .and(query_param("sinceId", "2"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;
    let first = [post_json(1, Some("a")), post_json(2, None)];
    Mock::given(method("GET"))
        .and(path("/v3/posts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_json(&first, 9)))
        .up_to_n_times(1)
        .mount(&server)
        .await;

    let err = fetcher(&server, dir.path(), 2).fetch("7").await.unwrap_err();
    assert!(matches!(err, FetchError::Transport(_)));

    // On-disk state reflects exactly the committed first page.
    let paths = TargetPaths::new(dir.path(), "7");
    assert_eq!(collection(&paths.all_posts_file()).data.len(), 2);
    let cursor = CursorStore::new(paths.cursor_file()).load().unwrap().unwrap();
    assert_eq!(cursor.since_id, Some(2));

    // A later run picks up from the persisted cursor and completes.
    server.reset().await;
    mount_token(&server).await;
    let second = [post_json(3, Some("c"))];
    Mock::given(method("GET"))
        .and(path("/v3/posts"))
        .and(query_param("sinceId", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_json(&second, 1)))
        .expect(1)
        .mount(&server)
        .await;

    let summary = fetcher(&server, dir.path(), 1).fetch("7").await.unwrap();
    assert_eq!(summary.pages, 1);

    let all = collection(&paths.all_posts_file());
    let ids: Vec<i64> = all.data.iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![1, 2, 3]);
    assert_eq!(all.meta.total_count, 3);
}

#[tokio::test]
async fn empty_page_with_remaining_records_stops_the_loop() {
    let server = MockServer::start().await;
    let dir = tempfile::TempDir::new().unwrap();
    mount_token(&server).await;

    Mock::given(method("GET"))
        .and(path("/v3/posts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_json(&[], 10)))
        .expect(1)
        .mount(&server)
        .await;

    let summary = fetcher(&server, dir.path(), 1).fetch("7").await.unwrap();
    assert_eq!(summary.pages, 1);
    assert_eq!(summary.total(), 0);
}

#[tokio::test]
async fn shutdown_request_stops_at_the_page_boundary() {
    let server = MockServer::start().await;
    let dir = tempfile::TempDir::new().unwrap();
    mount_token(&server).await;

    // The server reports more records, but shutdown is already requested, so
    // exactly one page is fetched and committed.
    let first = [post_json(1, Some("a")), post_json(2, None)];
    Mock::given(method("GET"))
        .and(path("/v3/posts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_json(&first, 9)))
        .expect(1)
        .mount(&server)
        .await;

    let shutdown = ShutdownCoordinator::shared();
    shutdown.request();

    let summary = fetcher(&server, dir.path(), 1)
        .with_shutdown(shutdown)
        .fetch("7")
        .await
        .unwrap();
    assert_eq!(summary.pages, 1);
    assert!(summary.interrupted);

    let paths = TargetPaths::new(dir.path(), "7");
    let cursor = CursorStore::new(paths.cursor_file()).load().unwrap().unwrap();
    assert_eq!(cursor.since_id, Some(2));
}

#[tokio::test]
async fn unparseable_page_is_an_invalid_page_error() {
    let server = MockServer::start().await;
    let dir = tempfile::TempDir::new().unwrap();
    mount_token(&server).await;

    Mock::given(method("GET"))
        .and(path("/v3/posts"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let err = fetcher(&server, dir.path(), 1).fetch("7").await.unwrap_err();
    assert!(matches!(err, FetchError::InvalidPage(_)));
}
