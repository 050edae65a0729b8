use std::{thread, time::Duration};

use rand::{thread_rng, Rng};
use reqwest::blocking::Client;
use reqwest::StatusCode;
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::ProviderConfig;
use crate::error::{Result, TranslateError};

/// Something that turns text in one language into another.
pub trait Provider {
    fn translate(&self, from: &str, to: &str, text: &str) -> Result<String>;
}

impl<P: Provider + ?Sized> Provider for &P {
    fn translate(&self, from: &str, to: &str, text: &str) -> Result<String> {
        (**self).translate(from, to, text)
    }
}

impl<P: Provider + ?Sized> Provider for Box<P> {
    fn translate(&self, from: &str, to: &str, text: &str) -> Result<String> {
        (**self).translate(from, to, text)
    }
}

const MAX_DELAY_MS: u64 = 30_000;

fn backoff(base_delay_ms: u64, attempt: usize) -> Duration {
    let jitter: u64 = thread_rng().gen_range(0..200);
    let factor = u32::try_from(attempt)
        .ok()
        .and_then(|a| 2_u64.checked_pow(a))
        .unwrap_or(u64::MAX);
    let ms = base_delay_ms.saturating_mul(factor).min(MAX_DELAY_MS) + jitter;
    Duration::from_millis(ms)
}

/// Client for the public Google translate endpoint.
pub struct GoogleProvider {
    client: Client,
    endpoint: String,
    max_retries: usize,
    base_delay_ms: u64,
}

impl GoogleProvider {
    pub fn new(cfg: &ProviderConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(cfg.timeout_secs))
            .build()
            .map_err(|e| TranslateError::ProviderFailure(e.to_string()))?;

        Ok(Self {
            client,
            endpoint: cfg.endpoint.clone(),
            max_retries: cfg.max_retries.max(1),
            base_delay_ms: cfg.base_delay_ms,
        })
    }
}

impl Provider for GoogleProvider {
    fn translate(&self, from: &str, to: &str, text: &str) -> Result<String> {
        if text.trim().is_empty() {
            return Ok(text.to_string());
        }

        let mut last_err = String::from("no attempt made");

        for attempt in 0..self.max_retries {
            let more = attempt + 1 < self.max_retries;

            debug!(from, to, attempt, "calling translation provider");

            let res = self
                .client
                .get(&self.endpoint)
                .query(&[("client", "gtx"), ("sl", from), ("tl", to), ("dt", "t"), ("q", text)])
                .send();

            let resp = match res {
                Ok(r) => r,
                Err(err) => {
                    last_err = err.to_string();
                    if more {
                        thread::sleep(backoff(self.base_delay_ms, attempt));
                        continue;
                    }
                    break;
                }
            };

            let status = resp.status();
            let body = match resp.text() {
                Ok(t) => t,
                Err(err) => {
                    last_err = err.to_string();
                    if more {
                        thread::sleep(backoff(self.base_delay_ms, attempt));
                        continue;
                    }
                    break;
                }
            };

            if !status.is_success() {
                last_err = extract_error_message(status, &body);
                if should_retry_http(status) && more {
                    warn!(status = status.as_u16(), attempt, "provider request failed, retrying");
                    thread::sleep(backoff(self.base_delay_ms, attempt));
                    continue;
                }
                break;
            }

            return parse_response(&body);
        }

        Err(TranslateError::ProviderFailure(last_err))
    }
}

/// The endpoint answers with nested arrays; the first element holds one
/// `[translated, original, ...]` segment per sentence.
fn parse_response(body: &str) -> Result<String> {
    let v: Value = serde_json::from_str(body)
        .map_err(|_| TranslateError::ProviderFailure("invalid JSON from provider".into()))?;

    let segments = v
        .get(0)
        .and_then(|s| s.as_array())
        .ok_or_else(|| TranslateError::ProviderFailure("provider response has no segments".into()))?;

    let out: String = segments
        .iter()
        .filter_map(|seg| seg.get(0).and_then(|t| t.as_str()))
        .collect();

    Ok(out)
}

fn should_retry_http(status: StatusCode) -> bool {
    status == StatusCode::REQUEST_TIMEOUT
        || status == StatusCode::TOO_MANY_REQUESTS
        || status.is_server_error()
}

fn extract_error_message(status: StatusCode, body_text: &str) -> String {
    if let Ok(v) = serde_json::from_str::<Value>(body_text) {
        if let Some(msg) = v
            .get("error")
            .and_then(|e| e.get("message"))
            .and_then(|m| m.as_str())
        {
            return format!("HTTP {}: {}", status.as_u16(), msg);
        }
    }

    let trimmed = body_text.trim();
    let snippet: String = if trimmed.chars().count() > 400 {
        format!("{}...", trimmed.chars().take(400).collect::<String>())
    } else {
        trimmed.to_string()
    };

    format!("HTTP {}: {}", status.as_u16(), snippet)
}
