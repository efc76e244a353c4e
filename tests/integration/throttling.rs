//! Integration tests for per-host request spacing

use std::time::{Duration, Instant};

use social_post_downloader::transport::ThrottledClient;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn consecutive_requests_to_one_host_are_spaced_by_the_delay() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v3/posts"))
        .respond_with(ResponseTemplate::new(200))
        .expect(3)
        .mount(&server)
        .await;

    let delay = Duration::from_millis(250);
    let client = ThrottledClient::new(delay, 1).unwrap();
    let url = format!("{}/v3/posts", server.uri());

    let start = Instant::now();
    for _ in 0..3 {
        client.send(client.get(&url)).await.unwrap();
    }

    // Three requests means two enforced gaps.
    assert!(
        start.elapsed() >= delay * 2,
        "requests were not spaced: {:?}",
        start.elapsed()
    );
}

#[tokio::test]
async fn failed_attempts_also_stamp_the_host_clock() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v3/posts"))
        .respond_with(ResponseTemplate::new(500))
        .expect(2)
        .mount(&server)
        .await;

    let delay = Duration::from_millis(200);
    // Backoff is zeroed so the measured spacing comes from the throttle alone.
    let client = ThrottledClient::new(delay, 2)
        .unwrap()
        .with_backoff(Duration::ZERO);
    let url = format!("{}/v3/posts", server.uri());

    let start = Instant::now();
    let _ = client.send(client.get(&url)).await;
    assert!(
        start.elapsed() >= delay,
        "second attempt was not throttled: {:?}",
        start.elapsed()
    );
}
