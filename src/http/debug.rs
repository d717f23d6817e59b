use reqwest::Url;
use reqwest::header::HeaderValue;
use serde_json::Value;

const REDACTION: &str = "***REDACTED***";
const SENSITIVE_KEYS: [&str; 10] = [
    "key",
    "api_key",
    "apikey",
    "token",
    "access_token",
    "authorization",
    "secret",
    "password",
    "x-api-key",
    "x-goog-api-key",
];

/// How HTTP exchanges are rendered for logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HttpDebugConfig {
    pub enabled: bool,
    pub redact_secrets: bool,
    pub max_body_chars: usize,
}

impl HttpDebugConfig {
    pub fn from_verbose(verbose: bool) -> Self {
        Self {
            enabled: verbose,
            redact_secrets: true,
            max_body_chars: 4_000,
        }
    }

    pub fn disabled() -> Self {
        Self::from_verbose(false)
    }

    /// Rendering used for the session trace: always redacted, generous body limit.
    pub fn for_trace() -> Self {
        Self {
            enabled: true,
            redact_secrets: true,
            max_body_chars: 64_000,
        }
    }

    pub fn url(&self, url: &Url) -> String {
        if !self.redact_secrets {
            return url.as_str().to_string();
        }

        let pairs: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| {
                let value = if is_sensitive_key(&k) {
                    REDACTION.to_string()
                } else {
                    v.into_owned()
                };
                (k.into_owned(), value)
            })
            .collect();

        let mut redacted = url.clone();
        redacted.set_query(None);
        if !pairs.is_empty() {
            redacted.query_pairs_mut().extend_pairs(pairs);
        }

        redacted.as_str().to_string()
    }

    pub fn header(&self, name: &str, value: &HeaderValue) -> String {
        if self.redact_secrets && is_sensitive_key(name) {
            return REDACTION.to_string();
        }

        value
            .to_str()
            .map(ToString::to_string)
            .unwrap_or_else(|_| "<non-utf8>".to_string())
    }

    pub fn body(&self, raw: &str) -> String {
        let body = if self.redact_secrets {
            redact_json_text(raw)
        } else {
            raw.to_string()
        };
        truncate_for_log(&body, self.max_body_chars)
    }
}

fn redact_json_text(raw: &str) -> String {
    match serde_json::from_str::<Value>(raw) {
        Ok(mut json) => {
            redact_json_value(&mut json);
            serde_json::to_string(&json).unwrap_or_else(|_| raw.to_string())
        }
        Err(_) => raw.to_string(),
    }
}

fn redact_json_value(value: &mut Value) {
    match value {
        Value::Object(map) => {
            for (key, item) in map {
                if is_sensitive_key(key) {
                    *item = Value::String(REDACTION.to_string());
                } else {
                    redact_json_value(item);
                }
            }
        }
        Value::Array(items) => items.iter_mut().for_each(redact_json_value),
        _ => {}
    }
}

pub fn truncate_for_log(input: &str, max_chars: usize) -> String {
    let count = input.chars().count();
    if count <= max_chars {
        return input.to_string();
    }

    let truncated = input.chars().take(max_chars).collect::<String>();
    format!("{truncated}... <truncated {} chars>", count - max_chars)
}

fn is_sensitive_key(key: &str) -> bool {
    let key = key.to_ascii_lowercase();
    SENSITIVE_KEYS.contains(&key.as_str())
}
