//! HTTP GET transport for the device's `remote.cgi` command endpoint.
//!
//! Builds the command URL from the configured host, issues the request,
//! classifies the response, and applies the side effects of a delivered
//! command (record toggle commit, reported variables).

use std::future::Future;
use std::ops::Range;

use futures_util::StreamExt;
use reqwest::header::{ACCEPT, ACCEPT_ENCODING, CONNECTION};
use serde::Serialize;

use crate::error::AppError;
use crate::model::DeviceCommand;
use crate::state::AppState;
use crate::variables::ReportedState;

/// Statuses the device answers with when it accepted a command. It reports
/// some informational conditions as 4xx, so anything below 500 counts.
// TODO: narrow to 2xx once the device's 4xx usage is documented; bad command
// syntax currently passes as success.
pub const ACCEPTED_STATUS: Range<u16> = 200..500;

pub const REMOTE_PATH: &str = "remote.cgi";

// ── Endpoint ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scheme {
    Http,
    Https,
}

/// Base URL derived from the configured host string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteEndpoint {
    base_url: String,
    scheme: Scheme,
}

impl RemoteEndpoint {
    /// Parse a host such as `10.0.0.5`, `device.local/` or `https://10.0.0.5`.
    /// `http://` is assumed when no scheme is given.
    pub fn parse(host: &str) -> Result<Self, AppError> {
        let host = host.trim();
        if host.is_empty() {
            return Err(AppError::host_not_configured());
        }
        let base = host.trim_end_matches('/');
        let lower = base.to_ascii_lowercase();
        let (base_url, scheme) = if lower.starts_with("https://") {
            (base.to_string(), Scheme::Https)
        } else if lower.starts_with("http://") {
            (base.to_string(), Scheme::Http)
        } else {
            (format!("http://{base}"), Scheme::Http)
        };
        Ok(Self { base_url, scheme })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn scheme(&self) -> Scheme {
        self.scheme
    }

    pub fn command_url(&self, query: &str) -> String {
        format!("{}/{REMOTE_PATH}?{query}", self.base_url)
    }
}

// ── Transport seam ───────────────────────────────────────────────

/// A fully collected HTTP response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub reason: String,
    pub body: String,
}

/// Issues one GET and collects the whole body. Errors are connection-level
/// only; any status is returned as a response.
pub trait Transport: Send + Sync {
    fn get(
        &self,
        scheme: Scheme,
        url: &str,
    ) -> impl Future<Output = Result<RawResponse, AppError>> + Send;
}

/// reqwest-backed transport with one client per scheme.
///
/// Redirects are not followed: a 3xx is the device's answer and is classified
/// like any other status. No timeout is set.
pub struct HttpTransport {
    plain: reqwest::Client,
    secure: reqwest::Client,
}

impl HttpTransport {
    pub fn new() -> Result<Self, AppError> {
        let plain = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .pool_max_idle_per_host(0)
            .build()?;
        let secure = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .pool_max_idle_per_host(0)
            .https_only(true)
            .build()?;
        Ok(Self { plain, secure })
    }

    fn client(&self, scheme: Scheme) -> &reqwest::Client {
        match scheme {
            Scheme::Http => &self.plain,
            Scheme::Https => &self.secure,
        }
    }
}

/// The phrase the device actually sent. hyper only keeps it when it differs
/// from the canonical one, so fall back to that.
fn reason_phrase(response: &reqwest::Response) -> String {
    response
        .extensions()
        .get::<hyper::ext::ReasonPhrase>()
        .map_or_else(
            || response.status().canonical_reason().unwrap_or_default().to_string(),
            |r| String::from_utf8_lossy(r.as_bytes()).into_owned(),
        )
}

impl Transport for HttpTransport {
    async fn get(&self, scheme: Scheme, url: &str) -> Result<RawResponse, AppError> {
        let response = self
            .client(scheme)
            .get(url)
            .header(ACCEPT, "*/*")
            .header(ACCEPT_ENCODING, "identity")
            .header(CONNECTION, "close")
            .send()
            .await?;

        let status = response.status();
        let reason = reason_phrase(&response);
        let mut body = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            body.extend_from_slice(&chunk?);
        }

        Ok(RawResponse {
            status: status.as_u16(),
            reason,
            body: String::from_utf8_lossy(&body).into_owned(),
        })
    }
}

// ── Send ─────────────────────────────────────────────────────────

/// Result of a delivered command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SendOutcome {
    pub query: String,
    pub url: String,
    pub status: u16,
}

/// Map a response onto the accepted-status policy.
pub fn classify(response: RawResponse) -> Result<u16, AppError> {
    if ACCEPTED_STATUS.contains(&response.status) {
        Ok(response.status)
    } else {
        Err(AppError::RemoteRejection {
            status: response.status,
            reason: response.reason,
            body: response.body,
        })
    }
}

/// Send one command to the configured device.
///
/// The host is read once, up front; a blank host fails before the transport
/// is touched. On success the record toggle commit is applied and the
/// reported variables are overwritten. On failure nothing is updated.
pub async fn send<T: Transport>(
    state: &AppState<T>,
    command: &DeviceCommand,
) -> Result<SendOutcome, AppError> {
    let endpoint = RemoteEndpoint::parse(&state.host())?;
    let query = command.query();
    let url = endpoint.command_url(&query);

    tracing::debug!(%url, "Sending command");

    let status = match state.transport.get(endpoint.scheme(), &url).await.and_then(classify) {
        Ok(status) => status,
        Err(e) => {
            tracing::error!(%url, error = %e, "Command failed");
            return Err(e);
        }
    };

    state.toggles.commit(command);
    state
        .variables
        .publish(ReportedState::new(query.clone(), status).into_pairs());

    tracing::info!(%query, status, "Command delivered");
    Ok(SendOutcome { query, url, status })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing, clippy::panic)]
pub(crate) mod tests {
    use std::collections::VecDeque;

    use parking_lot::Mutex;

    use super::*;
    use crate::settings::DeviceConfig;
    use crate::variables::{LAST_COMMAND, LAST_STATUS};

    /// Scripted transport: returns queued responses in order and records
    /// every URL it was asked for.
    #[derive(Default)]
    pub(crate) struct ScriptedTransport {
        responses: Mutex<VecDeque<Result<RawResponse, AppError>>>,
        pub(crate) requests: Mutex<Vec<(Scheme, String)>>,
    }

    impl ScriptedTransport {
        pub(crate) fn respond(self, status: u16) -> Self {
            self.responses.lock().push_back(Ok(RawResponse {
                status,
                reason: reqwest::StatusCode::from_u16(status)
                    .ok()
                    .and_then(|s| s.canonical_reason())
                    .unwrap_or_default()
                    .to_string(),
                body: String::new(),
            }));
            self
        }

        pub(crate) fn respond_with_body(self, status: u16, body: &str) -> Self {
            self.responses.lock().push_back(Ok(RawResponse {
                status,
                reason: String::new(),
                body: body.to_string(),
            }));
            self
        }

        pub(crate) fn fail(self, message: &str) -> Self {
            self.responses.lock().push_back(Err(AppError::Transport {
                message: message.to_string(),
            }));
            self
        }

        pub(crate) fn urls(&self) -> Vec<String> {
            self.requests.lock().iter().map(|(_, u)| u.clone()).collect()
        }
    }

    impl Transport for ScriptedTransport {
        async fn get(&self, scheme: Scheme, url: &str) -> Result<RawResponse, AppError> {
            self.requests.lock().push((scheme, url.to_string()));
            self.responses.lock().pop_front().unwrap_or(Ok(RawResponse {
                status: 200,
                reason: "OK".to_string(),
                body: String::new(),
            }))
        }
    }

    pub(crate) fn state_with(host: &str, transport: ScriptedTransport) -> AppState<ScriptedTransport> {
        AppState::new(DeviceConfig { host: host.to_string() }, transport).unwrap()
    }

    #[test]
    fn endpoint_defaults_to_http() {
        let ep = RemoteEndpoint::parse("10.0.0.5").unwrap();
        assert_eq!(ep.scheme(), Scheme::Http);
        assert_eq!(ep.command_url("cue=1"), "http://10.0.0.5/remote.cgi?cue=1");
    }

    #[test]
    fn endpoint_keeps_explicit_scheme_and_strips_trailing_slashes() {
        let ep = RemoteEndpoint::parse("https://10.0.0.5").unwrap();
        assert_eq!(ep.scheme(), Scheme::Https);
        assert_eq!(ep.command_url("cue=1"), "https://10.0.0.5/remote.cgi?cue=1");

        let ep = RemoteEndpoint::parse("  https://10.0.0.5///  ").unwrap();
        assert_eq!(ep.command_url("cue=1"), "https://10.0.0.5/remote.cgi?cue=1");

        let ep = RemoteEndpoint::parse("device.local/").unwrap();
        assert_eq!(ep.command_url("next"), "http://device.local/remote.cgi?next");

        let ep = RemoteEndpoint::parse("HTTPS://Device.local").unwrap();
        assert_eq!(ep.scheme(), Scheme::Https);
        assert_eq!(ep.base_url(), "HTTPS://Device.local");
    }

    #[test]
    fn blank_host_is_configuration_error() {
        assert!(matches!(
            RemoteEndpoint::parse("   "),
            Err(AppError::Configuration { .. })
        ));
        assert!(matches!(
            RemoteEndpoint::parse(""),
            Err(AppError::Configuration { .. })
        ));
    }

    #[test]
    fn classification_boundaries() {
        let resp = |status| RawResponse {
            status,
            reason: String::new(),
            body: String::new(),
        };
        assert_eq!(classify(resp(200)).unwrap(), 200);
        assert_eq!(classify(resp(302)).unwrap(), 302);
        assert_eq!(classify(resp(404)).unwrap(), 404);
        assert_eq!(classify(resp(499)).unwrap(), 499);
        assert!(classify(resp(500)).is_err());
        assert!(classify(resp(503)).is_err());
        assert!(classify(resp(199)).is_err());
    }

    #[tokio::test]
    async fn not_found_counts_as_delivered() {
        let state = state_with("10.0.0.5", ScriptedTransport::default().respond(404));
        let outcome = send(&state, &DeviceCommand::Cue { number: 1 }).await.unwrap();
        assert_eq!(outcome.status, 404);
        assert_eq!(outcome.url, "http://10.0.0.5/remote.cgi?cue=1");
        assert_eq!(state.variables.get(LAST_COMMAND).as_deref(), Some("cue=1"));
        assert_eq!(state.variables.get(LAST_STATUS).as_deref(), Some("HTTP 404"));
    }

    #[tokio::test]
    async fn server_error_propagates_and_leaves_variables_alone() {
        let state = state_with(
            "10.0.0.5",
            ScriptedTransport::default()
                .respond(200)
                .respond_with_body(503, "busy"),
        );
        send(&state, &DeviceCommand::NextCue).await.unwrap();

        let err = send(&state, &DeviceCommand::PreviousCue).await.unwrap_err();
        match err {
            AppError::RemoteRejection { status, body, .. } => {
                assert_eq!(status, 503);
                assert_eq!(body, "busy");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(state.variables.get(LAST_COMMAND).as_deref(), Some("next"));
        assert_eq!(state.variables.get(LAST_STATUS).as_deref(), Some("HTTP 200"));
    }

    #[tokio::test]
    async fn blank_host_never_reaches_transport() {
        let state = state_with("  ", ScriptedTransport::default());
        let err = send(&state, &DeviceCommand::NextCue).await.unwrap_err();
        assert!(matches!(err, AppError::Configuration { .. }));
        assert!(state.transport.requests.lock().is_empty());
        assert_eq!(state.variables.get(LAST_COMMAND).as_deref(), Some(""));
    }

    #[tokio::test]
    async fn transport_failure_propagates() {
        let state = state_with("10.0.0.5", ScriptedTransport::default().fail("connection refused"));
        let err = send(&state, &DeviceCommand::Record).await.unwrap_err();
        assert!(matches!(err, AppError::Transport { .. }));
        assert!(!state.toggles.recording());
    }

    #[tokio::test]
    async fn secure_scheme_is_passed_to_transport() {
        let state = state_with("https://10.0.0.5/", ScriptedTransport::default());
        send(&state, &DeviceCommand::NextCue).await.unwrap();
        let requests = state.transport.requests.lock().clone();
        assert_eq!(
            requests,
            vec![(Scheme::Https, "https://10.0.0.5/remote.cgi?next".to_string())]
        );
    }

    #[tokio::test]
    async fn host_change_applies_to_next_command() {
        let state = state_with("10.0.0.5", ScriptedTransport::default());
        send(&state, &DeviceCommand::NextCue).await.unwrap();
        state.update_config(DeviceConfig {
            host: "10.0.0.6".to_string(),
        });
        send(&state, &DeviceCommand::NextCue).await.unwrap();
        assert_eq!(
            state.transport.urls(),
            vec![
                "http://10.0.0.5/remote.cgi?next".to_string(),
                "http://10.0.0.6/remote.cgi?next".to_string(),
            ]
        );
    }

    /// A raw server so the status line carries a non-standard reason phrase.
    #[tokio::test]
    async fn rejection_reports_device_reason_phrase() {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }
            socket
                .write_all(
                    b"HTTP/1.1 503 Device Busy\r\nContent-Length: 4\r\nConnection: close\r\n\r\nbusy",
                )
                .await
                .unwrap();
            socket.shutdown().await.unwrap();
        });

        let state = AppState::with_http(DeviceConfig::new(format!("127.0.0.1:{port}"))).unwrap();
        let err = send(&state, &DeviceCommand::NextCue).await.unwrap_err();
        match &err {
            AppError::RemoteRejection { status, reason, body } => {
                assert_eq!(*status, 503);
                assert_eq!(reason, "Device Busy");
                assert_eq!(body, "busy");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(err.to_string(), "HTTP 503 Device Busy - busy");
    }

    /// End to end against a local server: URL, headers, and status policy.
    #[tokio::test]
    async fn http_transport_sends_expected_request() {
        use axum::extract::RawQuery;
        use axum::http::{HeaderMap, StatusCode};
        use axum::routing::get;
        use axum::Router;

        let seen: std::sync::Arc<Mutex<Vec<(Option<String>, HeaderMap)>>> =
            std::sync::Arc::default();
        let seen_handler = seen.clone();
        let app = Router::new().route(
            "/remote.cgi",
            get(move |RawQuery(query): RawQuery, headers: HeaderMap| {
                let seen = seen_handler.clone();
                async move {
                    let status = if query.as_deref() == Some("cue=7") {
                        StatusCode::SERVICE_UNAVAILABLE
                    } else {
                        StatusCode::NOT_FOUND
                    };
                    seen.lock().push((query, headers));
                    (status, "device says hi")
                }
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        let state = AppState::with_http(DeviceConfig {
            host: format!("127.0.0.1:{port}/"),
        })
        .unwrap();

        let outcome = send(&state, &DeviceCommand::NextCue).await.unwrap();
        assert_eq!(outcome.status, 404);
        assert_eq!(state.variables.get(LAST_STATUS).as_deref(), Some("HTTP 404"));

        let err = send(&state, &DeviceCommand::Cue { number: 7 }).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "HTTP 503 Service Unavailable - device says hi"
        );
        assert_eq!(state.variables.get(LAST_COMMAND).as_deref(), Some("next"));

        let seen = seen.lock();
        assert_eq!(seen.len(), 2);
        let (query, headers) = &seen[0];
        assert_eq!(query.as_deref(), Some("next"));
        assert_eq!(headers.get("accept").unwrap(), "*/*");
        assert_eq!(headers.get("accept-encoding").unwrap(), "identity");
        assert_eq!(headers.get("connection").unwrap(), "close");
    }
}
