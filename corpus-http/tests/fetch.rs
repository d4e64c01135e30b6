use corpus_http::{HttpClient, HttpError, PageFetcher};
use std::time::Duration;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer, retries: usize) -> HttpClient {
    HttpClient::new(&server.uri())
        .expect("mock base url")
        .with_timeout(Duration::from_secs(5))
        .with_retries(retries)
}

#[tokio::test]
async fn success_body_is_decoded_as_utf8() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/listing"))
        .and(query_param("page", "1"))
        .and(header("user-agent", "MedicalDataCollector/1.0"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(
                "<p>مرحبا</p>".as_bytes().to_vec(),
                "text/html; charset=windows-1256",
            ),
        )
        .expect(1)
        .mount(&server)
        .await;

    let page = client_for(&server, 0)
        .fetch_page("/listing?page=1")
        .await
        .expect("page");

    assert!(page.is_success());
    assert_eq!(page.charset.as_deref(), Some("windows-1256"));
    assert_eq!(page.body, "<p>مرحبا</p>");
}

#[tokio::test]
async fn not_found_is_returned_without_retrying() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let page = client_for(&server, 3)
        .fetch_page(&format!("{}/missing", server.uri()))
        .await
        .expect("non-success is still a page");

    assert_eq!(page.status, 404);
    assert!(!page.is_success());
}

#[tokio::test]
async fn server_errors_are_retried_within_budget() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .expect(1)
        .mount(&server)
        .await;

    let page = client_for(&server, 2).fetch_page("/flaky").await.unwrap();
    assert_eq!(page.status, 200);
    assert_eq!(page.body, "ok");
}

#[tokio::test]
async fn exhausted_budget_surfaces_last_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/down"))
        .respond_with(ResponseTemplate::new(500))
        .expect(2)
        .mount(&server)
        .await;

    let page = client_for(&server, 1).fetch_page("/down").await.unwrap();
    assert_eq!(page.status, 500);
}

#[tokio::test]
async fn unreachable_host_is_a_network_error() {
    // Port 9 (discard) on localhost is expected to refuse connections.
    let client = HttpClient::new("http://127.0.0.1:9")
        .unwrap()
        .with_timeout(Duration::from_secs(2))
        .with_retries(0);

    let err = client.fetch_page("/x").await.unwrap_err();
    assert!(matches!(err, HttpError::Network(_)));
}
