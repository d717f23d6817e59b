use super::debug::HttpDebugConfig;
use crate::trace::{SessionTrace, TraceKind};
use reqwest::Client;
use reqwest::header::HeaderMap;
use serde::Serialize;
use std::fmt;
use std::io::{self, Write};
#[cfg(test)]
use std::sync::{Arc, Mutex};

const DEBUG_PREFIX: &str = "[http-debug]";

#[derive(Clone)]
pub struct HttpClient {
    inner: Client,
    debug: HttpDebugConfig,
    sink: LogSink,
    trace: Option<SessionTrace>,
}

#[derive(Clone)]
enum LogSink {
    Stderr,
    #[cfg(test)]
    Buffer(Arc<Mutex<Vec<String>>>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponseData {
    pub status: u16,
    pub body: String,
}

impl fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpClient")
            .field("debug", &self.debug)
            .field("trace", &self.trace.is_some())
            .finish()
    }
}

impl HttpClient {
    pub fn new(inner: Client, debug: HttpDebugConfig) -> Self {
        Self {
            inner,
            debug,
            sink: LogSink::Stderr,
            trace: None,
        }
    }

    pub fn with_trace(mut self, trace: SessionTrace) -> Self {
        self.trace = Some(trace);
        self
    }

    pub async fn post_json<T: Serialize + ?Sized>(
        &self,
        url: &str,
        query: &[(&str, &str)],
        payload: &T,
    ) -> Result<HttpResponseData, reqwest::Error> {
        let body_json = serde_json::to_string(payload)
            .unwrap_or_else(|err| format!("{{\"_serialization_error\":\"{err}\"}}"));

        let request = self.inner.post(url).query(query).json(payload).build()?;
        self.log_exchange(TraceKind::HttpIn, |debug| {
            request_lines(debug, &request, &body_json)
        });

        let response = match self.inner.execute(request).await {
            Ok(response) => response,
            Err(err) => {
                if let Some(trace) = &self.trace {
                    trace.record(TraceKind::HttpErr, &err.to_string());
                }
                return Err(err);
            }
        };
        let status = response.status().as_u16();
        let headers = response.headers().clone();
        let body = response.text().await?;

        self.log_exchange(TraceKind::HttpOut, |debug| {
            response_lines(debug, status, &headers, &body)
        });

        Ok(HttpResponseData { status, body })
    }

    /// Renders one side of the exchange for stderr (when verbose) and for the
    /// session trace, each with its own redaction settings.
    fn log_exchange(&self, kind: TraceKind, render: impl Fn(HttpDebugConfig) -> Vec<String>) {
        if self.debug.enabled {
            self.emit_debug(&render(self.debug));
        }
        if let Some(trace) = &self.trace {
            trace.record_all(kind, &render(HttpDebugConfig::for_trace()));
        }
    }

    fn emit_debug(&self, lines: &[String]) {
        match &self.sink {
            LogSink::Stderr => {
                let mut stderr = io::stderr().lock();
                for line in lines {
                    let _ = writeln!(stderr, "{DEBUG_PREFIX} {line}");
                }
            }
            #[cfg(test)]
            LogSink::Buffer(buffer) => {
                if let Ok(mut b) = buffer.lock() {
                    b.extend(lines.iter().map(|line| format!("{DEBUG_PREFIX} {line}")));
                }
            }
        }
    }

    #[cfg(test)]
    pub fn with_buffer_sink(
        inner: Client,
        debug: HttpDebugConfig,
    ) -> (Self, Arc<Mutex<Vec<String>>>) {
        let buffer = Arc::new(Mutex::new(Vec::new()));
        let client = Self {
            inner,
            debug,
            sink: LogSink::Buffer(Arc::clone(&buffer)),
            trace: None,
        };
        (client, buffer)
    }
}

fn request_lines(debug: HttpDebugConfig, request: &reqwest::Request, body_json: &str) -> Vec<String> {
    let mut lines = vec![format!("> {} {}", request.method(), debug.url(request.url()))];
    lines.extend(header_lines('>', debug, request.headers()));
    append_body_lines(&mut lines, '>', &debug.body(body_json));
    lines
}

fn response_lines(
    debug: HttpDebugConfig,
    status: u16,
    headers: &HeaderMap,
    body: &str,
) -> Vec<String> {
    let mut lines = vec![format!("< HTTP {status}")];
    lines.extend(header_lines('<', debug, headers));
    append_body_lines(&mut lines, '<', &debug.body(body));
    lines
}

fn header_lines(direction: char, debug: HttpDebugConfig, headers: &HeaderMap) -> Vec<String> {
    headers
        .iter()
        .map(|(name, value)| {
            format!(
                "{direction} {}: {}",
                name.as_str(),
                debug.header(name.as_str(), value)
            )
        })
        .collect()
}

fn append_body_lines(lines: &mut Vec<String>, direction: char, body: &str) {
    lines.push(direction.to_string());
    if body.is_empty() {
        lines.push(format!("{direction} <empty body>"));
        return;
    }

    lines.extend(body.lines().map(|line| format!("{direction} {line}")));
}

#[cfg(test)]
mod tests {
    use super::{HttpClient, HttpResponseData, request_lines, response_lines};
    use crate::http::debug::HttpDebugConfig;
    use crate::trace::SessionTrace;
    use reqwest::Client;
    use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
    use reqwest::{Method, Url};
    use serde_json::json;
    use std::fs;
    use tempfile::tempdir;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn post_json_logs_redacted_exchange_when_enabled() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/test"))
            .and(query_param("key", "super-secret"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "application/json")
                    .set_body_json(json!({"api_key":"response-secret","ok":true})),
            )
            .mount(&server)
            .await;

        let (client, logs) =
            HttpClient::with_buffer_sink(Client::new(), HttpDebugConfig::from_verbose(true));

        let response = client
            .post_json(
                &format!("{}/v1/test", server.uri()),
                &[("key", "super-secret")],
                &json!({"token":"request-secret"}),
            )
            .await
            .expect("request should succeed");

        assert_eq!(
            response,
            HttpResponseData {
                status: 200,
                body: "{\"api_key\":\"response-secret\",\"ok\":true}".to_string(),
            }
        );

        let logged = logs.lock().expect("logs lock").join("\n");
        assert!(logged.contains("[http-debug] > POST"));
        assert!(logged.contains("[http-debug] < HTTP 200"));
        assert!(logged.contains("***REDACTED***"));
        assert!(!logged.contains("super-secret"));
        assert!(!logged.contains("request-secret"));
        assert!(!logged.contains("response-secret"));
    }

    #[tokio::test]
    async fn post_json_emits_no_debug_lines_when_disabled() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/test"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok":true})))
            .mount(&server)
            .await;

        let (client, logs) =
            HttpClient::with_buffer_sink(Client::new(), HttpDebugConfig::disabled());

        client
            .post_json(&format!("{}/v1/test", server.uri()), &[], &json!({"ok":true}))
            .await
            .expect("request should succeed");

        assert!(logs.lock().expect("logs lock").is_empty());
    }

    #[tokio::test]
    async fn post_json_writes_redacted_exchange_to_trace() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/test"))
            .respond_with(
                ResponseTemplate::new(503)
                    .insert_header("x-api-key", "response-secret")
                    .set_body_string("overloaded"),
            )
            .mount(&server)
            .await;

        let dir = tempdir().expect("tempdir");
        let trace = SessionTrace::create_in_dir("http-test", dir.path()).expect("trace");
        let client =
            HttpClient::new(Client::new(), HttpDebugConfig::disabled()).with_trace(trace.clone());

        let response = client
            .post_json(
                &format!("{}/v1/test", server.uri()),
                &[("key", "super-secret")],
                &json!({"contents":"hello"}),
            )
            .await
            .expect("request should complete");

        assert_eq!(response.status, 503);
        let trace_text = fs::read_to_string(trace.file_path()).expect("read trace file");
        assert!(trace_text.contains("[ai.http.in "));
        assert!(trace_text.contains("\"contents\":\"hello\""));
        assert!(trace_text.contains("< HTTP 503"));
        assert!(trace_text.contains("< overloaded"));
        assert!(!trace_text.contains("super-secret"));
        assert!(!trace_text.contains("response-secret"));
    }

    #[test]
    fn request_lines_render_method_headers_and_body() {
        let mut request = reqwest::Request::new(
            Method::POST,
            Url::parse("https://example.com/v1/test?key=secret&view=full").expect("valid url"),
        );
        request
            .headers_mut()
            .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let lines = request_lines(
            HttpDebugConfig::from_verbose(true),
            &request,
            r#"{"message":"hello"}"#,
        );

        assert!(lines[0].starts_with("> POST https://example.com/v1/test?key="));
        assert!(lines[0].ends_with("&view=full"));
        assert!(!lines[0].contains("secret"));
        assert_eq!(
            &lines[1..],
            [
                "> content-type: application/json",
                ">",
                "> {\"message\":\"hello\"}",
            ]
        );
    }

    #[test]
    fn response_lines_mark_empty_body() {
        let lines = response_lines(
            HttpDebugConfig::from_verbose(true),
            204,
            &HeaderMap::new(),
            "",
        );
        assert_eq!(lines, ["< HTTP 204", "<", "< <empty body>"]);
    }

    #[test]
    fn response_lines_truncate_long_bodies() {
        let debug = HttpDebugConfig {
            enabled: true,
            redact_secrets: true,
            max_body_chars: 8,
        };
        let lines = response_lines(debug, 200, &HeaderMap::new(), "abcdefghijklmnop");
        assert_eq!(lines.last().map(String::as_str), Some("< abcdefgh... <truncated 8 chars>"));
    }
}
