use crate::error::{AppError, Result};
use crate::event::AppEvent;
use crate::session::SessionRecord;
use reqwest::header::CONTENT_TYPE;
use serde_json::Value;
use std::sync::mpsc;
use std::time::Duration;
use tokio::runtime::Handle;
use tracing::{info, warn};

/// Posts session records to the question endpoint.
#[derive(Clone)]
pub struct SubmitClient {
    endpoint: String,
    http: reqwest::Client,
    tx: mpsc::Sender<AppEvent>,
    runtime_handle: Handle,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SubmitResponse {
    pub status: u16,
    pub body: String,
}

impl SubmitResponse {
    pub fn json(&self) -> Option<Value> {
        serde_json::from_str(&self.body).ok()
    }
}

impl SubmitClient {
    pub fn new(
        endpoint: impl Into<String>,
        timeout: Duration,
        tx: mpsc::Sender<AppEvent>,
        runtime_handle: Handle,
    ) -> Result<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            endpoint: endpoint.into(),
            http,
            tx,
            runtime_handle,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Serializes `record` now and posts it in the background. The outcome
    /// arrives as `SubmitSucceeded` or `SubmitFailed`.
    pub fn submit(&self, record: &SessionRecord) -> Result<()> {
        let body = record.to_json()?;
        let fragments = record.fragments().len();
        let client = self.clone();

        self.runtime_handle.spawn(async move {
            info!(endpoint = %client.endpoint, fragments, "submitting question");
            let event = match client.post(body).await {
                Ok(response) => {
                    match response.json() {
                        Some(json) => info!(status = response.status, "endpoint response: {json}"),
                        None => info!(status = response.status, "endpoint response: {}", response.body),
                    }
                    AppEvent::SubmitSucceeded {
                        status: response.status,
                        body: response.body,
                    }
                }
                Err(err) => {
                    warn!("submission failed: {err}");
                    AppEvent::SubmitFailed(err.to_string())
                }
            };
            let _ = client.tx.send(event);
        });
        Ok(())
    }

    pub async fn post(&self, body: String) -> Result<SubmitResponse> {
        let response = self
            .http
            .post(&self.endpoint)
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(AppError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(SubmitResponse {
            status: status.as_u16(),
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{Filter, FragmentType};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::sync::oneshot;

    /// Accepts one connection, captures the raw request and answers with
    /// `status_line` and `body`.
    async fn one_shot_server(
        status_line: &'static str,
        body: &'static str,
    ) -> (String, oneshot::Receiver<String>) {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("listener should bind");
        let address = listener.local_addr().expect("listener should have an address");
        let (request_tx, request_rx) = oneshot::channel();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.expect("client should connect");
            let mut raw = Vec::new();
            let mut chunk = [0u8; 4096];
            loop {
                let read = socket.read(&mut chunk).await.expect("request should be readable");
                if read == 0 {
                    break;
                }
                raw.extend_from_slice(&chunk[..read]);
                if request_complete(&raw) {
                    break;
                }
            }
            let response = format!(
                "{status_line}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                body.len()
            );
            socket
                .write_all(response.as_bytes())
                .await
                .expect("response should be written");
            let _ = request_tx.send(String::from_utf8_lossy(&raw).into_owned());
        });

        (format!("http://{address}/questions"), request_rx)
    }

    fn request_complete(raw: &[u8]) -> bool {
        let text = String::from_utf8_lossy(raw);
        let Some(header_end) = text.find("\r\n\r\n") else {
            return false;
        };
        let content_length = text[..header_end]
            .lines()
            .find_map(|line| {
                let (name, value) = line.split_once(':')?;
                name.eq_ignore_ascii_case("content-length")
                    .then(|| value.trim().parse::<usize>().ok())
                    .flatten()
            })
            .unwrap_or(0);
        raw.len() >= header_end + 4 + content_length
    }

    fn client_for(endpoint: String) -> (SubmitClient, mpsc::Receiver<AppEvent>) {
        let (tx, rx) = mpsc::channel();
        let client = SubmitClient::new(endpoint, Duration::from_secs(5), tx, Handle::current())
            .expect("client should build");
        (client, rx)
    }

    fn sample_record() -> SessionRecord {
        let mut record = SessionRecord::new();
        record.append("Questão 1", FragmentType::Question);
        record.set_filter(Filter::confirmed(vec!["Quimica".into()], "Ácidos", "pH", "ENEM", "2020"));
        record
    }

    #[tokio::test]
    async fn post_sends_json_body_with_content_type() {
        let (endpoint, request_rx) = one_shot_server("HTTP/1.1 201 Created", r#"{"id":"abc"}"#).await;
        let (client, _rx) = client_for(endpoint);

        let body = sample_record().to_json().expect("record should serialize");
        let response = client.post(body).await.expect("post should succeed");
        assert_eq!(response.status, 201);
        assert_eq!(response.json(), Some(serde_json::json!({"id": "abc"})));

        let request = request_rx.await.expect("server should capture the request");
        assert!(request.starts_with("POST /questions "));
        assert!(request.to_ascii_lowercase().contains("content-type: application/json"));
        assert!(request.contains("\"subAssunto\":[\"pH\"]"));
        assert!(request.contains("Questão 1"));
    }

    #[tokio::test]
    async fn non_success_status_is_an_error() {
        let (endpoint, _request_rx) =
            one_shot_server("HTTP/1.1 422 Unprocessable Entity", r#"{"detail":"bad filter"}"#).await;
        let (client, _rx) = client_for(endpoint);

        let error = client
            .post("{}".to_string())
            .await
            .expect_err("422 should be an error");
        match error {
            AppError::Status { status, body } => {
                assert_eq!(status, 422);
                assert!(body.contains("bad filter"));
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn submit_reports_outcome_over_channel() {
        let (endpoint, _request_rx) = one_shot_server("HTTP/1.1 200 OK", r#"{"ok":true}"#).await;
        let (client, rx) = client_for(endpoint);

        client.submit(&sample_record()).expect("submit should start");
        let event = tokio::task::spawn_blocking(move || rx.recv_timeout(Duration::from_secs(5)))
            .await
            .expect("receiver task should join")
            .expect("submit should send an event");
        match event {
            AppEvent::SubmitSucceeded { status, body } => {
                assert_eq!(status, 200);
                assert!(body.contains("ok"));
            }
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn unreachable_endpoint_reports_failure() {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("listener should bind");
        let address = listener.local_addr().expect("listener should have an address");
        drop(listener);

        let (client, rx) = client_for(format!("http://{address}/questions"));
        client.submit(&sample_record()).expect("submit should start");
        let event = tokio::task::spawn_blocking(move || rx.recv_timeout(Duration::from_secs(10)))
            .await
            .expect("receiver task should join")
            .expect("submit should send an event");
        assert!(matches!(event, AppEvent::SubmitFailed(_)));
    }
}
