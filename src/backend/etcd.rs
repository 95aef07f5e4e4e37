use std::{fmt, time::Duration};

use async_trait::async_trait;
use reqwest::{Certificate, Client, Identity, RequestBuilder, Response, StatusCode, Url};
use serde::Deserialize;
use tracing::{debug, instrument, warn};

use super::{BackendError, Entry, KvBackend};

const KEYS_ROOT: [&str; 2] = ["v2", "keys"];

/// Already-loaded TLS credentials for a secured etcd cluster.
///
/// All buffers are PEM encoded.
#[derive(Clone, Default)]
pub struct TlsMaterial {
    /// Certificate authorities used to verify the cluster.
    pub ca_certificates: Vec<Vec<u8>>,
    /// Client certificate presented to the cluster.
    pub client_certificate: Vec<u8>,
    /// Private key for `client_certificate`.
    pub client_key: Vec<u8>,
}

impl fmt::Debug for TlsMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TlsMaterial")
            .field("ca_certificates", &self.ca_certificates.len())
            .field("client_certificate", &self.client_certificate.len())
            .field("client_key", &"<redacted>")
            .finish()
    }
}

/// Client for the etcd v2 keys API.
///
/// Requests go to the first endpoint that accepts a connection; an endpoint
/// that refuses the connection is skipped in favour of the next one.
/// Anything the cluster actually answered is returned as-is, never re-sent.
#[derive(Debug, Clone)]
pub struct EtcdBackend {
    client: Client,
    endpoints: Vec<Url>,
}

#[derive(Debug, Deserialize)]
struct KeysResponse {
    node: Node,
}

#[derive(Debug, Deserialize)]
struct Node {
    key: Option<String>,
    value: Option<String>,
    #[serde(default)]
    dir: bool,
    #[serde(default)]
    nodes: Vec<Node>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(rename = "errorCode")]
    error_code: u64,
    message: String,
    cause: Option<String>,
}

impl EtcdBackend {
    /// Builds a client for the given `host:port` endpoints.
    ///
    /// Endpoints use `https` when TLS material is supplied and `http`
    /// otherwise; an endpoint that already carries a scheme is used verbatim.
    ///
    /// # Errors
    /// * `BackendError::Tls` - if the certificates or key cannot be parsed
    /// * `BackendError::Connection` - if no endpoint is given or one is malformed
    pub fn new(
        hosts: &[String],
        tls: Option<&TlsMaterial>,
        timeout: Duration,
    ) -> Result<Self, BackendError> {
        if hosts.is_empty() {
            return Err(BackendError::Connection {
                endpoint: "<none>".to_string(),
                details: "no etcd hosts configured".to_string(),
            });
        }

        let scheme = if tls.is_some() { "https" } else { "http" };
        let endpoints = hosts
            .iter()
            .map(|host| parse_endpoint(host, scheme))
            .collect::<Result<Vec<_>, _>>()?;

        let mut builder = Client::builder().timeout(timeout);
        if let Some(tls) = tls {
            for ca in &tls.ca_certificates {
                let certificate = Certificate::from_pem(ca).map_err(|e| BackendError::Tls {
                    details: format!("certificate authority: {e}"),
                })?;
                builder = builder.add_root_certificate(certificate);
            }

            let mut identity_pem = tls.client_certificate.clone();
            identity_pem.push(b'\n');
            identity_pem.extend_from_slice(&tls.client_key);
            let identity = Identity::from_pem(&identity_pem).map_err(|e| BackendError::Tls {
                details: format!("client certificate/key: {e}"),
            })?;
            builder = builder.identity(identity);
        }

        let client = builder.build().map_err(|e| BackendError::Tls {
            details: e.to_string(),
        })?;

        Ok(Self { client, endpoints })
    }

    /// The endpoints requests are sent to, in failover order.
    pub fn endpoints(&self) -> &[Url] {
        &self.endpoints
    }

    async fn send<F>(&self, key: &str, request: F) -> Result<Response, BackendError>
    where
        F: Fn(&Client, Url) -> RequestBuilder,
    {
        let mut last_error = None;

        for endpoint in &self.endpoints {
            let url = key_url(endpoint, key)?;
            debug!(%url, "sending etcd request");

            match request(&self.client, url).send().await {
                Ok(response) => return Ok(response),
                Err(e) if e.is_connect() => {
                    warn!(%endpoint, error = %e, "etcd endpoint unreachable, trying next");
                    last_error = Some(BackendError::Connection {
                        endpoint: endpoint.to_string(),
                        details: e.to_string(),
                    });
                }
                Err(e) => {
                    return Err(BackendError::Connection {
                        endpoint: endpoint.to_string(),
                        details: e.to_string(),
                    });
                }
            }
        }

        Err(last_error.unwrap_or_else(|| BackendError::Connection {
            endpoint: "<none>".to_string(),
            details: "no etcd hosts configured".to_string(),
        }))
    }
}

#[async_trait]
impl KvBackend for EtcdBackend {
    #[instrument(skip(self))]
    async fn get(&self, key: &str) -> Result<String, BackendError> {
        let response = self.send(key, |client, url| client.get(url)).await?;
        let body = decode_keys_response(key, check_status(key, response).await?).await?;

        match body.node {
            Node {
                dir: false,
                value: Some(value),
                ..
            } => Ok(value),
            _ => Err(BackendError::NotFound {
                key: key.to_string(),
            }),
        }
    }

    #[instrument(skip(self, value))]
    async fn set(&self, key: &str, value: &str) -> Result<(), BackendError> {
        let response = self
            .send(key, |client, url| client.put(url).form(&[("value", value)]))
            .await?;
        check_status(key, response).await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete(&self, key: &str) -> Result<(), BackendError> {
        let response = self.send(key, |client, url| client.delete(url)).await?;
        check_status(key, response).await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn list_by_prefix(&self, prefix: &str) -> Result<Vec<Entry>, BackendError> {
        let response = self
            .send(prefix, |client, url| {
                client.get(url).query(&[("recursive", "true")])
            })
            .await?;

        let response = match check_status(prefix, response).await {
            Ok(response) => response,
            Err(BackendError::NotFound { .. }) => return Ok(Vec::new()),
            Err(e) => return Err(e),
        };

        let body = response
            .text()
            .await
            .map_err(|e| BackendError::InvalidResponse {
                key: prefix.to_string(),
                details: e.to_string(),
            })?;
        let entries = leaves_from_body(&body).map_err(|e| BackendError::InvalidResponse {
            key: prefix.to_string(),
            details: e.to_string(),
        })?;

        debug!(count = entries.len(), "listed etcd keys");
        Ok(entries)
    }
}

fn parse_endpoint(host: &str, scheme: &str) -> Result<Url, BackendError> {
    let raw = if host.contains("://") {
        host.to_string()
    } else {
        format!("{scheme}://{host}")
    };

    Url::parse(&raw).map_err(|e| BackendError::Connection {
        endpoint: host.to_string(),
        details: format!("invalid endpoint: {e}"),
    })
}

/// Maps a storage key onto the keys API path below `endpoint`, encoding
/// each segment.
///
/// Keys with `.` or `..` segments are refused; URL normalization would
/// resolve them against their parent.
pub(super) fn key_url(endpoint: &Url, key: &str) -> Result<Url, BackendError> {
    if key.split('/').any(|segment| segment == "." || segment == "..") {
        return Err(BackendError::Rejected {
            key: key.to_string(),
            details: "relative path segments cannot be addressed".to_string(),
        });
    }

    let mut url = endpoint.clone();

    {
        let mut segments = url
            .path_segments_mut()
            .map_err(|()| BackendError::Connection {
                endpoint: endpoint.to_string(),
                details: "endpoint cannot be used as a base URL".to_string(),
            })?;
        segments.clear().extend(KEYS_ROOT);

        let mut pushed = false;
        for segment in key.split('/').filter(|segment| !segment.is_empty()) {
            segments.push(segment);
            pushed = true;
        }

        if !pushed {
            segments.push("");
        }
    }

    Ok(url)
}

async fn check_status(key: &str, response: Response) -> Result<Response, BackendError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    if status == StatusCode::NOT_FOUND {
        return Err(BackendError::NotFound {
            key: key.to_string(),
        });
    }

    let body = response
        .text()
        .await
        .unwrap_or_else(|e| format!("unreadable response body: {e}"));

    Err(BackendError::Rejected {
        key: key.to_string(),
        details: describe_error(status, &body),
    })
}

pub(super) fn describe_error(status: StatusCode, body: &str) -> String {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(ErrorBody {
            error_code,
            message,
            cause: Some(cause),
        }) => format!("{message} ({cause}, etcd code {error_code})"),
        Ok(ErrorBody {
            error_code,
            message,
            cause: None,
        }) => format!("{message} (etcd code {error_code})"),
        Err(_) => format!("HTTP {status}: {}", body.trim()),
    }
}

async fn decode_keys_response(key: &str, response: Response) -> Result<KeysResponse, BackendError> {
    response
        .json::<KeysResponse>()
        .await
        .map_err(|e| BackendError::InvalidResponse {
            key: key.to_string(),
            details: e.to_string(),
        })
}

fn collect_leaves(node: Node, entries: &mut Vec<Entry>) {
    if node.dir {
        for child in node.nodes {
            collect_leaves(child, entries);
        }
        return;
    }

    if let (Some(key), Some(value)) = (node.key, node.value) {
        entries.push(Entry { key, value });
    }
}

/// Flattens a raw keys API listing body into leaf entries.
pub(super) fn leaves_from_body(body: &str) -> Result<Vec<Entry>, serde_json::Error> {
    let response: KeysResponse = serde_json::from_str(body)?;
    let mut entries = Vec::new();
    collect_leaves(response.node, &mut entries);
    Ok(entries)
}
