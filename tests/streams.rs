//! SSE subscription behavior: topic normalization, liveness states, and
//! teardown.

mod common;

use std::time::Duration;

use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, ResponseTemplate};

use common::init_logging;
use foodfast_client::config::ClientConfig;
use foodfast_client::stream::{ConnectionState, StreamSubscriber};

async fn subscriber_for(server: &wiremock::MockServer) -> StreamSubscriber {
    init_logging();
    let config = ClientConfig::for_base_url(&server.uri()).unwrap();
    StreamSubscriber::new(config)
}

fn sse_response(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .insert_header("content-type", "text/event-stream")
        .set_body_string(body)
}

#[tokio::test]
async fn announcements_are_unwrapped_and_control_frames_dropped() {
    let server = wiremock::MockServer::start().await;

    let body = concat!(
        "event: ping\n",
        "data: connected\n",
        "\n",
        "data: {\"id\":1,\"title\":\"Welcome\",\"message\":\"Grand opening\"}\n",
        "\n",
        "data: {\"type\":\"connected\",\"message\":\"Connected to announcements\"}\n",
        "\n",
        ": keepalive\n",
        "\n",
        "id: 9\n",
        "data: {\"announcement\":{\"id\":2,\"title\":\"Deal\",\"message\":\"Half off\",\"priority\":\"high\"}}\n",
        "\n",
    );
    Mock::given(method("GET"))
        .and(path("/api/v1/announcements/stream"))
        .respond_with(sse_response(body))
        .expect(1)
        .mount(&server)
        .await;

    let subscriber = subscriber_for(&server).await;
    let mut subscription = subscriber.announcements();

    let first = subscription.next().await.unwrap();
    assert_eq!(first.id, 1);
    assert_eq!(first.title, "Welcome");

    // the wrapped broadcast arrives as the inner record, not the envelope
    let second = subscription.next().await.unwrap();
    assert_eq!(second.id, 2);
    assert_eq!(second.title, "Deal");

    // body exhausted: the push channel is gone and says so
    assert!(subscription.next().await.is_none());
    assert_eq!(subscription.state(), ConnectionState::ClosedError);
    assert_eq!(subscription.last_event_id().as_deref(), Some("9"));
}

#[tokio::test]
async fn order_feed_normalizes_order_id_to_id() {
    let server = wiremock::MockServer::start().await;

    let body = concat!(
        "data: {\"order_id\":42,\"customer_id\":7,\"status\":\"confirmed\",\"total_amount\":18.5,\"restaurant_name\":\"Shawarma Palace\"}\n",
        "\n",
        "data: {\"status\":\"confirmed\"}\n",
        "\n",
        "data: {\"id\":43,\"status\":\"preparing\"}\n",
        "\n",
    );
    Mock::given(method("GET"))
        .and(path("/api/v1/orders/stream"))
        .respond_with(sse_response(body))
        .expect(1)
        .mount(&server)
        .await;

    let subscriber = subscriber_for(&server).await;
    let mut subscription = subscriber.order_feed();

    let first = subscription.next().await.unwrap();
    assert_eq!(first.id, 42);
    assert_eq!(first.restaurant_name.as_deref(), Some("Shawarma Palace"));

    // the id-less payload was skipped, not dispatched
    let second = subscription.next().await.unwrap();
    assert_eq!(second.id, 43);

    assert!(subscription.next().await.is_none());
}

#[tokio::test]
async fn location_stream_delivers_coordinates_in_order() {
    let server = wiremock::MockServer::start().await;

    let body = concat!(
        "data: {\"latitude\":31.95,\"longitude\":35.91}\n",
        "\n",
        "data: {\"latitude\":31.9502,\"longitude\":35.9099}\n",
        "\n",
    );
    Mock::given(method("GET"))
        .and(path("/api/v1/tracking/order/5/stream"))
        .and(query_param("customer_id", "7"))
        .respond_with(sse_response(body))
        .expect(1)
        .mount(&server)
        .await;

    let subscriber = subscriber_for(&server).await;
    let mut subscription = subscriber.order_location(5, 7);

    let first = subscription.next().await.unwrap();
    let second = subscription.next().await.unwrap();
    assert!(second.latitude > first.latitude);
    assert!(subscription.next().await.is_none());
}

#[tokio::test]
async fn refused_connection_parks_in_closed_error() {
    // no mock mounted: the server answers 404
    let server = wiremock::MockServer::start().await;
    let subscriber = subscriber_for(&server).await;

    let mut subscription = subscriber.order_feed();
    assert!(subscription.next().await.is_none());
    assert_eq!(subscription.state(), ConnectionState::ClosedError);
}

/// Minimal SSE endpoint that sends one event and then holds the connection
/// open, which wiremock cannot do.
async fn hold_open_sse_server(first_event: &'static str) -> String {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut buf = [0u8; 1024];
        let _ = socket.read(&mut buf).await;
        let response = format!(
            "HTTP/1.1 200 OK\r\ncontent-type: text/event-stream\r\ncache-control: no-cache\r\n\r\n{first_event}"
        );
        socket.write_all(response.as_bytes()).await.unwrap();
        // stay connected until the client hangs up
        let mut drain = [0u8; 64];
        loop {
            match socket.read(&mut drain).await {
                Ok(0) | Err(_) => break,
                Ok(_) => {}
            }
        }
    });
    format!("http://{addr}")
}

#[tokio::test]
async fn liveness_reports_open_while_connected_and_intentional_on_close() {
    init_logging();
    let base = hold_open_sse_server("data: {\"id\":1,\"title\":\"t\",\"message\":\"m\"}\n\n").await;
    let config = ClientConfig::for_base_url(&base).unwrap();
    let subscriber = StreamSubscriber::new(config);

    let mut subscription = subscriber.announcements();
    let watch = subscription.state_changes();

    // an event came through, so the connection is demonstrably open
    let first = subscription.next().await.unwrap();
    assert_eq!(first.id, 1);
    assert_eq!(subscription.state(), ConnectionState::Open);

    subscription.close();
    assert_eq!(*watch.borrow(), ConnectionState::ClosedIntentional);
}

#[tokio::test]
async fn close_is_idempotent_and_marks_intentional() {
    let server = wiremock::MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/announcements/stream"))
        .respond_with(
            sse_response(": keepalive\n\n").set_delay(Duration::from_secs(30)),
        )
        .mount(&server)
        .await;

    let subscriber = subscriber_for(&server).await;
    let mut subscription = subscriber.announcements();

    subscription.close();
    assert_eq!(subscription.state(), ConnectionState::ClosedIntentional);
    // a second close on the same handle is a no-op
    subscription.close();
    assert_eq!(subscription.state(), ConnectionState::ClosedIntentional);
}
