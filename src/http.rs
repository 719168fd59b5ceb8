use std::collections::HashMap;

use reqwest::{
    header,
    header::{HeaderMap, HeaderName, HeaderValue},
    Client, ClientBuilder, Method,
};
use serde::{de::DeserializeOwned, Serialize};
use tokio::time::Duration;
use tracing::{event, Level};

use crate::error::{EndpointFailure, Result, ToggleError};

/// The environment variable to change the default timeout for toggle requests.
const TOGGLE_TIMEOUT_MS: &str = "HYPHEN_TOGGLE_TIMEOUT_MS";

const API_KEY_HEADER: &str = "x-api-key";

fn create_http_connection_client() -> Client {
    let mut headers = HeaderMap::new();
    headers.insert(header::CONNECTION, HeaderValue::from_static("keep-alive"));
    let timeout = std::env::var(TOGGLE_TIMEOUT_MS)
        .unwrap_or_else(|_| "3000".to_string())
        .parse::<u64>()
        .unwrap_or(3000);
    ClientBuilder::new()
        .pool_idle_timeout(Some(Duration::from_secs(60)))
        .tcp_keepalive(Some(Duration::from_secs(30)))
        .timeout(Duration::from_millis(timeout))
        .default_headers(headers)
        .build()
        .expect("should be able to build the http client")
}

/// Caller supplied headers, in any of the shapes callers tend to have at hand.
#[derive(Debug, Clone)]
pub enum RequestHeaders {
    Map(HeaderMap),
    Pairs(Vec<(String, String)>),
    Record(HashMap<String, String>),
}

impl From<HeaderMap> for RequestHeaders {
    fn from(headers: HeaderMap) -> Self {
        RequestHeaders::Map(headers)
    }
}

impl From<Vec<(String, String)>> for RequestHeaders {
    fn from(headers: Vec<(String, String)>) -> Self {
        RequestHeaders::Pairs(headers)
    }
}

impl From<HashMap<String, String>> for RequestHeaders {
    fn from(headers: HashMap<String, String>) -> Self {
        RequestHeaders::Record(headers)
    }
}

impl RequestHeaders {
    /// Copies the headers into `target`. Later entries replace earlier ones
    /// with the same name; entries that are not valid HTTP headers are dropped.
    fn merge_into(self, target: &mut HeaderMap) {
        match self {
            RequestHeaders::Map(headers) => {
                for (name, value) in headers.iter() {
                    target.insert(name.clone(), value.clone());
                }
            }
            RequestHeaders::Pairs(pairs) => {
                for (name, value) in pairs {
                    insert_raw(target, &name, &value);
                }
            }
            RequestHeaders::Record(record) => {
                for (name, value) in record {
                    insert_raw(target, &name, &value);
                }
            }
        }
    }
}

fn insert_raw(target: &mut HeaderMap, name: &str, value: &str) {
    match (
        HeaderName::from_bytes(name.as_bytes()),
        HeaderValue::from_str(value),
    ) {
        (Ok(name), Ok(value)) => {
            target.insert(name, value);
        }
        _ => event!(Level::WARN, "Dropping invalid request header {}", name),
    }
}

/// Extra settings for a single request. The method defaults to POST.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    pub method: Option<Method>,
    pub headers: Option<RequestHeaders>,
    /// Raw body, used only when no payload is passed.
    pub body: Option<String>,
}

impl RequestOptions {
    pub fn with_headers(headers: impl Into<RequestHeaders>) -> Self {
        Self {
            headers: Some(headers.into()),
            ..Default::default()
        }
    }
}

#[derive(Clone)]
pub struct HorizonHttpClient {
    http_client: Client,
}

impl HorizonHttpClient {
    pub fn new() -> Self {
        Self {
            http_client: create_http_connection_client(),
        }
    }

    /// Sends the request to each horizon URL in order and returns the first
    /// successful JSON response.
    pub async fn send<T, P>(
        &self,
        horizon_urls: &[String],
        public_api_key: Option<&str>,
        path: &str,
        payload: Option<&P>,
        options: RequestOptions,
    ) -> Result<T>
    where
        T: DeserializeOwned,
        P: Serialize + ?Sized,
    {
        if horizon_urls.is_empty() {
            return Err(ToggleError::NoEndpointsConfigured);
        }

        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        if let Some(extra) = options.headers {
            extra.merge_into(&mut headers);
        }
        if let Some(key) = public_api_key.filter(|key| !key.is_empty()) {
            let value =
                HeaderValue::from_str(key).map_err(|_| ToggleError::InvalidCredential)?;
            headers.insert(HeaderName::from_static(API_KEY_HEADER), value);
        }

        let body = match payload {
            Some(payload) => {
                Some(serde_json::to_string(payload).map_err(ToggleError::InvalidPayload)?)
            }
            None => options.body,
        };
        let method = options.method.unwrap_or(Method::POST);
        let path = normalize_path(path);

        let mut failures = Vec::with_capacity(horizon_urls.len());
        for base_url in horizon_urls {
            let url = format!("{}{}", base_url.trim_end_matches('/'), path);
            event!(Level::DEBUG, "Sending {} request to {}", method, url);

            match self
                .attempt(&url, method.clone(), headers.clone(), body.clone())
                .await
            {
                // The first 2xx JSON answer wins, even if it does not fit `T`.
                Ok(parsed) => {
                    return serde_json::from_value(parsed).map_err(ToggleError::InvalidResponse)
                }
                Err(message) => {
                    event!(Level::WARN, "Horizon request to {} failed: {}", url, message);
                    failures.push(EndpointFailure { url, message });
                }
            }
        }

        let err = ToggleError::AllEndpointsFailed(failures);
        event!(Level::ERROR, "{}", err);
        Err(err)
    }

    async fn attempt(
        &self,
        url: &str,
        method: Method,
        headers: HeaderMap,
        body: Option<String>,
    ) -> std::result::Result<serde_json::Value, String> {
        let mut request = self.http_client.request(method, url).headers(headers);
        if let Some(body) = body {
            request = request.body(body);
        }

        let response = request
            .send()
            .await
            .map_err(|err| format!("failed to send request: {}", err))?;

        let status = response.status();
        if !status.is_success() {
            return Err(format!(
                "HTTP {}: {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or_default()
            ));
        }

        response
            .json::<serde_json::Value>()
            .await
            .map_err(|err| format!("error parsing response: {}", err))
    }
}

impl Default for HorizonHttpClient {
    fn default() -> Self {
        Self::new()
    }
}

fn normalize_path(path: &str) -> String {
    if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{}", path)
    }
}
