//! Unit tests for the backend module
//!
//! The etcd client is exercised through its pure helpers and against a fake
//! keys API served on loopback.

#![allow(clippy::panic, clippy::unwrap_used)]

use std::time::Duration;

use reqwest::{StatusCode, Url};
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::{TcpListener, TcpStream},
    task::JoinHandle,
};

use crate::backend::{
    BackendError, Entry, EtcdBackend, KvBackend, MemoryBackend, Operation,
    etcd::{describe_error, key_url, leaves_from_body},
    is_under_prefix,
};

#[test]
fn prefix_matching_is_directory_based() {
    assert!(is_under_prefix("/app/prod/db/host", "/app/prod"));
    assert!(is_under_prefix("/app/prod/db/host", "/app/prod/"));
    assert!(is_under_prefix("/app/prod", "/app/prod"));
    assert!(!is_under_prefix("/app/production/db", "/app/prod"));
    assert!(is_under_prefix("/anything/at/all", "/"));
    assert!(is_under_prefix("/anything", ""));
}

#[test]
fn key_url_encodes_each_segment() {
    let endpoint = Url::parse("http://127.0.0.1:4001").unwrap();

    let url = key_url(&endpoint, "/my app/dev/db/host").unwrap();
    assert_eq!(
        url.as_str(),
        "http://127.0.0.1:4001/v2/keys/my%20app/dev/db/host"
    );

    let url = key_url(&endpoint, "/app/dev/what?#").unwrap();
    assert_eq!(url.path(), "/v2/keys/app/dev/what%3F%23");
}

#[test]
fn key_url_for_root_targets_keys_directory() {
    let endpoint = Url::parse("https://etcd.internal:2379").unwrap();

    let url = key_url(&endpoint, "/").unwrap();
    assert_eq!(url.as_str(), "https://etcd.internal:2379/v2/keys/");
}

#[test]
fn key_url_refuses_relative_segments() {
    let endpoint = Url::parse("http://127.0.0.1:4001").unwrap();

    for key in ["/app/dev/../x", "/app/dev/./x", "/app/.."] {
        assert!(
            matches!(key_url(&endpoint, key), Err(BackendError::Rejected { .. })),
            "{key} was addressed"
        );
    }
}

#[test]
fn listing_body_is_flattened_to_leaves() {
    let body = r#"{
        "action": "get",
        "node": {
            "key": "/app/dev",
            "dir": true,
            "nodes": [
                {"key": "/app/dev/name", "value": "svc", "modifiedIndex": 4},
                {
                    "key": "/app/dev/db",
                    "dir": true,
                    "nodes": [
                        {"key": "/app/dev/db/host", "value": "localhost"},
                        {"key": "/app/dev/db/port", "value": "5432"}
                    ]
                },
                {"key": "/app/dev/empty", "dir": true}
            ]
        }
    }"#;

    let mut entries = leaves_from_body(body).unwrap();
    entries.sort();

    let keys: Vec<&str> = entries.iter().map(|e| e.key.as_str()).collect();
    assert_eq!(
        keys,
        vec!["/app/dev/db/host", "/app/dev/db/port", "/app/dev/name"]
    );
    assert_eq!(entries[1].value, "5432");
}

#[test]
fn root_listing_without_key_field_parses() {
    let body = r#"{"action": "get", "node": {"dir": true, "nodes": [{"key": "/a", "value": "1"}]}}"#;

    let entries = leaves_from_body(body).unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].key, "/a");
}

#[test]
fn etcd_error_body_is_described() {
    let body = r#"{"errorCode": 104, "message": "Not a directory", "cause": "/app/dev/db", "index": 12}"#;

    let details = describe_error(StatusCode::FORBIDDEN, body);
    assert_eq!(details, "Not a directory (/app/dev/db, etcd code 104)");

    let details = describe_error(StatusCode::BAD_GATEWAY, "upstream down\n");
    assert_eq!(details, "HTTP 502 Bad Gateway: upstream down");
}

#[test]
fn etcd_backend_requires_hosts() {
    let result = EtcdBackend::new(&[], None, Duration::from_secs(1));
    assert!(matches!(result, Err(BackendError::Connection { .. })));
}

#[test]
fn etcd_backend_chooses_scheme() {
    let hosts = vec!["127.0.0.1:4001".to_string(), "https://10.0.0.2:2379".to_string()];
    let backend = EtcdBackend::new(&hosts, None, Duration::from_secs(1)).unwrap();

    let endpoints: Vec<&str> = backend.endpoints().iter().map(Url::as_str).collect();
    assert_eq!(endpoints, vec!["http://127.0.0.1:4001/", "https://10.0.0.2:2379/"]);
}

#[test]
fn etcd_backend_rejects_garbage_tls_material() {
    let tls = crate::backend::TlsMaterial {
        ca_certificates: vec![b"not a certificate".to_vec()],
        client_certificate: b"nope".to_vec(),
        client_key: b"nope".to_vec(),
    };
    let hosts = vec!["127.0.0.1:4001".to_string()];

    let result = EtcdBackend::new(&hosts, Some(&tls), Duration::from_secs(1));
    assert!(matches!(result, Err(BackendError::Tls { .. })));
}

#[tokio::test]
async fn memory_backend_basic_operations() {
    let backend = MemoryBackend::new();

    backend.set("/a/b", "1").await.unwrap();
    assert_eq!(backend.get("/a/b").await.unwrap(), "1");

    backend.delete("/a/b").await.unwrap();
    assert!(matches!(
        backend.get("/a/b").await,
        Err(BackendError::NotFound { .. })
    ));
    assert!(matches!(
        backend.delete("/a/b").await,
        Err(BackendError::NotFound { .. })
    ));
}

#[tokio::test]
async fn memory_backend_lists_by_directory() {
    let backend = MemoryBackend::with_entries([
        ("/app/dev/a", "1"),
        ("/app/dev/b/c", "2"),
        ("/app/development/x", "3"),
    ]);

    let mut entries = backend.list_by_prefix("/app/dev").await.unwrap();
    entries.sort();

    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].key, "/app/dev/a");
    assert_eq!(entries[1].key, "/app/dev/b/c");
}

#[tokio::test]
async fn memory_backend_injected_faults() {
    let backend = MemoryBackend::with_entries([("/k", "v")]);
    backend.fail_on(Operation::Delete, "/k").await;

    assert!(matches!(
        backend.delete("/k").await,
        Err(BackendError::Rejected { .. })
    ));
    assert_eq!(backend.get("/k").await.unwrap(), "v");

    backend.clear_faults().await;
    backend.delete("/k").await.unwrap();
    assert!(backend.snapshot().await.is_empty());
}

/// A request as received by the fake keys API.
#[derive(Debug)]
struct SeenRequest {
    request_line: String,
    headers: Vec<(String, String)>,
    body: String,
}

impl SeenRequest {
    fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

/// Serves one canned `(status, body)` per connection and records the requests.
async fn fake_etcd(
    responses: Vec<(u16, &'static str)>,
) -> (String, JoinHandle<Vec<SeenRequest>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let host = listener.local_addr().unwrap().to_string();

    let handle = tokio::spawn(async move {
        let mut seen = Vec::new();

        for (status, body) in responses {
            let (mut stream, _) = listener.accept().await.unwrap();
            seen.push(read_request(&mut stream).await);

            let response = format!(
                "HTTP/1.1 {status} Fake\r\ncontent-type: application/json\r\n\
                 content-length: {}\r\nconnection: close\r\n\r\n{body}",
                body.len()
            );
            stream.write_all(response.as_bytes()).await.unwrap();
            let _ = stream.shutdown().await;
        }

        seen
    });

    (host, handle)
}

async fn read_request(stream: &mut TcpStream) -> SeenRequest {
    let mut buffer = Vec::new();
    let mut chunk = [0u8; 1024];

    let header_end = loop {
        let read = stream.read(&mut chunk).await.unwrap();
        assert!(read > 0, "connection closed before the request head");
        buffer.extend_from_slice(&chunk[..read]);

        if let Some(position) = buffer.windows(4).position(|window| window == b"\r\n\r\n") {
            break position + 4;
        }
    };

    let head = String::from_utf8(buffer[..header_end].to_vec()).unwrap();
    let mut lines = head.split("\r\n").filter(|line| !line.is_empty());
    let request_line = lines.next().unwrap().to_string();
    let headers: Vec<(String, String)> = lines
        .filter_map(|line| line.split_once(':'))
        .map(|(name, value)| (name.trim().to_ascii_lowercase(), value.trim().to_string()))
        .collect();

    let length = headers
        .iter()
        .find(|(name, _)| name == "content-length")
        .and_then(|(_, value)| value.parse::<usize>().ok())
        .unwrap_or(0);

    while buffer.len() < header_end + length {
        let read = stream.read(&mut chunk).await.unwrap();
        assert!(read > 0, "connection closed before the request body");
        buffer.extend_from_slice(&chunk[..read]);
    }

    let body = String::from_utf8(buffer[header_end..header_end + length].to_vec()).unwrap();

    SeenRequest {
        request_line,
        headers,
        body,
    }
}

/// An address nothing listens on.
async fn refused_host() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap().to_string()
}

fn etcd_over(hosts: &[String]) -> EtcdBackend {
    EtcdBackend::new(hosts, None, Duration::from_secs(5)).unwrap()
}

#[tokio::test]
async fn etcd_get_fails_over_past_refusing_host() {
    let dead = refused_host().await;
    let (live, server) = fake_etcd(vec![(
        200,
        r#"{"action": "get", "node": {"key": "/app/dev/a", "value": "1"}}"#,
    )])
    .await;
    let backend = etcd_over(&[dead, live]);

    let value = backend.get("/app/dev/a").await.unwrap();

    assert_eq!(value, "1");
    let seen = server.await.unwrap();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].request_line, "GET /v2/keys/app/dev/a HTTP/1.1");
}

#[tokio::test]
async fn etcd_every_host_refusing_is_a_connection_error() {
    let hosts = vec![refused_host().await, refused_host().await];
    let backend = etcd_over(&hosts);

    let result = backend.get("/app/dev/a").await;

    assert!(matches!(result, Err(BackendError::Connection { .. })));
}

#[tokio::test]
async fn etcd_list_of_missing_directory_is_empty() {
    let (host, server) = fake_etcd(vec![(
        404,
        r#"{"errorCode": 100, "message": "Key not found", "cause": "/app/dev", "index": 3}"#,
    )])
    .await;
    let backend = etcd_over(&[host]);

    let entries = backend.list_by_prefix("/app/dev").await.unwrap();

    assert!(entries.is_empty());
    let seen = server.await.unwrap();
    assert_eq!(
        seen[0].request_line,
        "GET /v2/keys/app/dev?recursive=true HTTP/1.1"
    );
}

#[tokio::test]
async fn etcd_list_flattens_recursive_listing() {
    let (host, server) = fake_etcd(vec![(
        200,
        r#"{"action": "get", "node": {"key": "/app/dev", "dir": true, "nodes": [
            {"key": "/app/dev/db", "dir": true, "nodes": [{"key": "/app/dev/db/host", "value": "x"}]},
            {"key": "/app/dev/port", "value": "5432"}
        ]}}"#,
    )])
    .await;
    let backend = etcd_over(&[host]);

    let mut entries = backend.list_by_prefix("/app/dev").await.unwrap();
    entries.sort();

    assert_eq!(
        entries,
        vec![
            Entry::new("/app/dev/db/host", "x"),
            Entry::new("/app/dev/port", "5432"),
        ]
    );
    server.await.unwrap();
}

#[tokio::test]
async fn etcd_delete_of_missing_key_is_not_found() {
    let (host, server) = fake_etcd(vec![(
        404,
        r#"{"errorCode": 100, "message": "Key not found", "cause": "/app/dev/gone", "index": 3}"#,
    )])
    .await;
    let backend = etcd_over(&[host]);

    let result = backend.delete("/app/dev/gone").await;

    assert!(matches!(result, Err(BackendError::NotFound { key }) if key == "/app/dev/gone"));
    let seen = server.await.unwrap();
    assert_eq!(seen[0].request_line, "DELETE /v2/keys/app/dev/gone HTTP/1.1");
}

#[tokio::test]
async fn etcd_set_puts_form_encoded_value() {
    let (host, server) = fake_etcd(vec![(
        200,
        r#"{"action": "set", "node": {"key": "/app/dev/db/url", "value": "a=b c"}}"#,
    )])
    .await;
    let backend = etcd_over(&[host]);

    backend.set("/app/dev/db/url", "a=b c").await.unwrap();

    let seen = server.await.unwrap();
    assert_eq!(seen[0].request_line, "PUT /v2/keys/app/dev/db/url HTTP/1.1");
    assert_eq!(
        seen[0].header("content-type"),
        Some("application/x-www-form-urlencoded")
    );
    assert_eq!(seen[0].body, "value=a%3Db+c");
}

#[tokio::test]
async fn etcd_error_status_is_rejected_with_message() {
    let (host, server) = fake_etcd(vec![(
        403,
        r#"{"errorCode": 104, "message": "Not a directory", "cause": "/app/dev/db", "index": 12}"#,
    )])
    .await;
    let backend = etcd_over(&[host]);

    let result = backend.set("/app/dev/db/host", "x").await;

    let Err(BackendError::Rejected { key, details }) = result else {
        panic!("expected a rejection, got {result:?}");
    };
    assert_eq!(key, "/app/dev/db/host");
    assert_eq!(details, "Not a directory (/app/dev/db, etcd code 104)");
    server.await.unwrap();
}
