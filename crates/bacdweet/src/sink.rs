use crate::{ForwardError, TelemetryDocument};
use clap::ValueEnum;
use log::{debug, warn};
use serde::Serialize;
use std::future::Future;
use std::time::Duration;

/// Somewhere a thing's documents are pushed to.
pub trait TelemetrySink: Send + Sync + 'static {
    fn push(
        &self,
        subject: &str,
        document: &TelemetryDocument,
    ) -> impl Future<Output = Result<(), ForwardError>> + Send;
}

/// Pushes `document` for `subject`, logging instead of returning a failure.
/// No retry; the next cycle's document is the next attempt.
pub async fn forward<S: TelemetrySink>(sink: &S, subject: &str, document: &TelemetryDocument) {
    debug!("{subject} {document}");
    if let Err(err) = sink.push(subject, document).await {
        warn!("{subject}: forward failed: {err}");
    }
}

/// Posts each document as JSON to `{base}/dweet/for/{thing}`.
#[derive(Debug, Clone)]
pub struct DweetSink {
    http: reqwest::Client,
    base_url: String,
}

impl DweetSink {
    pub const DEFAULT_BASE_URL: &'static str = "https://dweet.io";

    /// `timeout` bounds a whole request, connect to response.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ForwardError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_owned(),
        })
    }

    pub fn endpoint(&self, thing: &str) -> String {
        format!("{}/dweet/for/{thing}", self.base_url)
    }
}

impl TelemetrySink for DweetSink {
    async fn push(&self, subject: &str, document: &TelemetryDocument) -> Result<(), ForwardError> {
        let response = self
            .http
            .post(self.endpoint(subject))
            .json(document)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ForwardError::Status(status));
        }
        Ok(())
    }
}

/// Writes one JSON line per document to stdout.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

#[derive(Serialize)]
struct LogLine<'a> {
    thing: &'a str,
    content: &'a TelemetryDocument,
}

impl LogSink {
    pub fn line(subject: &str, document: &TelemetryDocument) -> Result<String, ForwardError> {
        Ok(serde_json::to_string(&LogLine {
            thing: subject,
            content: document,
        })?)
    }
}

impl TelemetrySink for LogSink {
    async fn push(&self, subject: &str, document: &TelemetryDocument) -> Result<(), ForwardError> {
        println!("{}", Self::line(subject, document)?);
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SinkKind {
    Dweet,
    Log,
}

/// The sink picked on the command line.
#[derive(Debug, Clone)]
pub enum ConfiguredSink {
    Dweet(DweetSink),
    Log(LogSink),
}

impl TelemetrySink for ConfiguredSink {
    async fn push(&self, subject: &str, document: &TelemetryDocument) -> Result<(), ForwardError> {
        match self {
            Self::Dweet(sink) => sink.push(subject, document).await,
            Self::Log(sink) => sink.push(subject, document).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{forward, DweetSink, LogSink, TelemetrySink};
    use crate::testing::RecordingSink;
    use crate::{DisplayValue, ForwardError, TelemetryDocument};
    use std::time::Duration;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    fn lobby() -> TelemetryDocument {
        let mut doc = TelemetryDocument::new();
        doc.insert("temp", DisplayValue::Float(22.0));
        doc.insert("occupied", DisplayValue::from("yes"));
        doc
    }

    fn request_complete(raw: &[u8]) -> bool {
        let text = String::from_utf8_lossy(raw);
        let Some(head_end) = text.find("\r\n\r\n") else {
            return false;
        };
        let body_len = text[..head_end]
            .lines()
            .filter_map(|line| line.split_once(':'))
            .find(|(name, _)| name.eq_ignore_ascii_case("content-length"))
            .and_then(|(_, value)| value.trim().parse::<usize>().ok())
            .unwrap_or(0);
        raw.len() >= head_end + 4 + body_len
    }

    /// Accepts one HTTP request, answers with `status_line` and returns the
    /// raw request.
    async fn serve_once(status_line: &'static str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        let server = tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let mut raw = Vec::new();
            let mut buf = [0u8; 1024];
            while !request_complete(&raw) {
                let n = stream.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                raw.extend_from_slice(&buf[..n]);
            }
            let reply =
                format!("{status_line}\r\ncontent-length: 0\r\nconnection: close\r\n\r\n");
            stream.write_all(reply.as_bytes()).await.unwrap();
            String::from_utf8(raw).unwrap()
        });
        (base, server)
    }

    #[tokio::test]
    async fn dweet_posts_json_document() {
        let (base, server) = serve_once("HTTP/1.1 200 OK").await;
        let sink = DweetSink::new(&format!("{base}/"), Duration::from_secs(5)).unwrap();
        sink.push("lobby", &lobby()).await.unwrap();

        let request = server.await.unwrap();
        assert!(request.starts_with("POST /dweet/for/lobby HTTP/1.1\r\n"));
        assert!(request
            .to_ascii_lowercase()
            .contains("content-type: application/json"));
        assert!(request.ends_with(r#"{"temp":22.0,"occupied":"yes"}"#));
    }

    #[tokio::test]
    async fn non_success_status_is_an_error() {
        let (base, server) = serve_once("HTTP/1.1 503 Service Unavailable").await;
        let sink = DweetSink::new(&base, Duration::from_secs(5)).unwrap();
        let err = sink.push("lobby", &lobby()).await.unwrap_err();
        assert!(matches!(err, ForwardError::Status(s) if s.as_u16() == 503));
        server.await.unwrap();
    }

    #[tokio::test]
    async fn unreachable_sink_is_an_error() {
        // bind then drop, so nothing listens on the port
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        drop(listener);

        let sink = DweetSink::new(&base, Duration::from_secs(5)).unwrap();
        assert!(matches!(
            sink.push("lobby", &lobby()).await,
            Err(ForwardError::Http(_))
        ));
    }

    #[test]
    fn endpoint_trims_trailing_slash() {
        let sink = DweetSink::new("https://dweet.io/", Duration::from_secs(1)).unwrap();
        assert_eq!(sink.endpoint("lobby"), "https://dweet.io/dweet/for/lobby");
    }

    #[test]
    fn log_line_wraps_the_document() {
        assert_eq!(
            LogSink::line("lobby", &lobby()).unwrap(),
            r#"{"thing":"lobby","content":{"temp":22.0,"occupied":"yes"}}"#
        );
    }

    #[tokio::test]
    async fn forward_swallows_failures() {
        let sink = RecordingSink::failing();
        forward(&sink, "lobby", &lobby()).await;
        assert_eq!(sink.count_for("lobby"), 1);
    }
}
