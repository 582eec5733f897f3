use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Method, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use pinorama_types::{
    ErrorBody, HealthResponse, Introspection, PersistResponse, SearchParams, SearchResponse,
    ADMIN_SECRET_HEADER,
};

use crate::ClientError;

pub const DEFAULT_URL: &str = "http://127.0.0.1:6200";

/// Connection and retry settings
#[derive(Clone, Debug, PartialEq)]
pub struct ClientOptions {
    /// Server base URL, including any route prefix
    pub url: String,
    pub admin_secret: Option<String>,
    /// Per-request timeout
    pub timeout: Duration,
    /// Retries after the first attempt
    pub max_retries: u32,
    /// Delay before the first retry
    pub backoff: Duration,
    /// Multiplier applied to the delay after each retry
    pub backoff_factor: f64,
    /// Upper bound of the delay
    pub backoff_max: Duration,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            url: DEFAULT_URL.to_string(),
            admin_secret: None,
            timeout: Duration::from_secs(10),
            max_retries: 5,
            backoff: Duration::from_secs(1),
            backoff_factor: 2.0,
            backoff_max: Duration::from_secs(30),
        }
    }
}

/// Delay before retry number `attempt` (0-based)
pub fn backoff_delay(options: &ClientOptions, attempt: u32) -> Duration {
    let factor = options.backoff_factor.max(1.0).powi(attempt.min(64) as i32);
    let millis = options.backoff.as_millis() as f64 * factor;
    let capped = millis.min(options.backoff_max.as_millis() as f64);
    Duration::from_millis(capped as u64)
}

/// Client for the pinorama server routes
///
/// Connection failures, timeouts and 5xx responses are retried with
/// exponential backoff; 4xx responses fail immediately.
#[derive(Clone, Debug)]
pub struct PinoramaClient {
    http: reqwest::Client,
    options: ClientOptions,
    base: String,
}

impl PinoramaClient {
    pub fn new(options: ClientOptions) -> Result<Self, ClientError> {
        let base = options.url.trim_end_matches('/').to_string();
        if !(base.starts_with("http://") || base.starts_with("https://")) {
            return Err(ClientError::InvalidUrl(options.url.clone()));
        }

        let mut headers = HeaderMap::new();
        if let Some(secret) = options.admin_secret.as_deref().filter(|s| !s.is_empty()) {
            let value = HeaderValue::from_str(secret)
                .map_err(|_| ClientError::InvalidSecret)?;
            headers.insert(ADMIN_SECRET_HEADER, value);
        }

        let http = reqwest::Client::builder()
            .timeout(options.timeout)
            .default_headers(headers)
            .build()?;

        Ok(Self {
            http,
            options,
            base,
        })
    }

    pub fn url(&self) -> &str {
        &self.base
    }

    pub fn options(&self) -> &ClientOptions {
        &self.options
    }

    pub async fn bulk(&self, records: &[Value]) -> Result<(), ClientError> {
        self.send(Method::POST, "/bulk", Some(records)).await?;
        Ok(())
    }

    pub async fn search(&self, params: &SearchParams) -> Result<SearchResponse, ClientError> {
        self.json(Method::POST, "/search", Some(params)).await
    }

    pub async fn introspection(&self) -> Result<Introspection, ClientError> {
        self.json::<_, ()>(Method::GET, "/introspection", None).await
    }

    pub async fn styles(&self) -> Result<String, ClientError> {
        let response = self.send::<()>(Method::GET, "/styles.css", None).await?;
        response.text().await.map_err(ClientError::Decode)
    }

    pub async fn clear(&self) -> Result<(), ClientError> {
        self.send::<()>(Method::POST, "/clear", None).await?;
        Ok(())
    }

    pub async fn persist(&self) -> Result<PersistResponse, ClientError> {
        self.json::<_, ()>(Method::POST, "/persist", None).await
    }

    pub async fn health(&self) -> Result<HealthResponse, ClientError> {
        self.json::<_, ()>(Method::GET, "/health", None).await
    }

    async fn json<T, B>(&self, method: Method, path: &str, body: Option<&B>) -> Result<T, ClientError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let response = self.send(method, path, body).await?;
        response.json::<T>().await.map_err(ClientError::Decode)
    }

    async fn send<B>(&self, method: Method, path: &str, body: Option<&B>) -> Result<Response, ClientError>
    where
        B: Serialize + ?Sized,
    {
        let url = format!("{}{}", self.base, path);
        let mut attempt = 0;

        loop {
            let mut request = self.http.request(method.clone(), &url);
            if let Some(body) = body {
                request = request.json(body);
            }

            let error = match request.send().await {
                Ok(response) if response.status().is_success() => return Ok(response),
                Ok(response) => {
                    let status = response.status();
                    let error = ClientError::Status {
                        status: status.as_u16(),
                        message: error_message(response).await,
                    };
                    if !status.is_server_error() {
                        return Err(error);
                    }
                    error
                }
                Err(e) if e.is_connect() || e.is_timeout() => ClientError::Transport(e),
                Err(e) => return Err(ClientError::Transport(e)),
            };

            if attempt >= self.options.max_retries {
                return Err(ClientError::RetriesExhausted {
                    attempts: attempt + 1,
                    last: Box::new(error),
                });
            }

            let delay = backoff_delay(&self.options, attempt);
            tracing::warn!(
                url = %url,
                attempt = attempt + 1,
                delay_ms = delay.as_millis() as u64,
                error = %error,
                "Request failed, retrying"
            );
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }
}

/// Server error message, from the JSON error body when there is one
async fn error_message(response: Response) -> String {
    let text = response.text().await.unwrap_or_default();
    match serde_json::from_str::<ErrorBody>(&text) {
        Ok(body) => body.message,
        Err(_) => text,
    }
}
