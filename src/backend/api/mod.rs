//! Thin wrappers over the SmartPol REST service.
//!
//! Every resource module adds `impl<T: Transport> ApiClient<T>` blocks with the
//! calls for that resource. Calls never cache and never retry: a non-2xx answer
//! becomes [`ApiError::Status`] carrying the per-action message the UI shows.

pub mod auth;
pub mod candidates;
pub mod corporations;
pub mod departments;
pub mod leaders;
pub mod reports;
pub mod voters;

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::future::Future;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("network error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("{message} ({status})")]
    Status { status: u16, message: String },
    #[error("unexpected response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ApiError {
    /// Text shown inline in forms and banners.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Status { message, .. } => message.clone(),
            ApiError::Transport(_) => "No se pudo conectar con el servidor".to_string(),
            ApiError::Decode(_) => "Respuesta inesperada del servidor".to_string(),
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Patch,
    Delete,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(&'static str, String)>,
    pub body: Option<serde_json::Value>,
    pub bearer: Option<String>,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self { method, path: path.into(), query: Vec::new(), body: None, bearer: None }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::Get, path)
    }

    pub fn query(mut self, key: &'static str, value: impl ToString) -> Self {
        self.query.push((key, value.to_string()));
        self
    }

    pub fn json<B: Serialize>(mut self, body: &B) -> Result<Self, ApiError> {
        self.body = Some(serde_json::to_value(body)?);
        Ok(self)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl ApiResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// The seam between the resource wrappers and the wire.
pub trait Transport {
    fn send(&self, request: ApiRequest) -> impl Future<Output = Result<ApiResponse, ApiError>>;
}

#[derive(Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }
}

impl Transport for HttpTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, ApiError> {
        let url = format!("{}{}", self.base_url, request.path);
        let mut builder = match request.method {
            Method::Get => self.client.get(&url),
            Method::Post => self.client.post(&url),
            Method::Patch => self.client.patch(&url),
            Method::Delete => self.client.delete(&url),
        };
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(token) = &request.bearer {
            builder = builder.header("Authorization", format!("Bearer {}", token));
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        tracing::debug!(method = ?request.method, %url, "sending request");
        let response = builder.send().await?;
        let status = response.status().as_u16();
        let body = response.bytes().await?.to_vec();
        Ok(ApiResponse { status, body })
    }
}

/// Client shared by all resource wrappers. Holds the bearer token of the
/// current session, if any.
#[derive(Clone)]
pub struct ApiClient<T = HttpTransport> {
    transport: T,
    token: Option<String>,
}

impl<T: Transport> ApiClient<T> {
    pub fn new(transport: T) -> Self {
        Self { transport, token: None }
    }

    pub fn set_token(&mut self, token: Option<String>) {
        self.token = token;
    }

    async fn dispatch(&self, mut request: ApiRequest, failure: &str) -> Result<ApiResponse, ApiError> {
        if request.bearer.is_none() {
            request.bearer = self.token.clone();
        }
        let method = request.method;
        let path = request.path.clone();
        let response = self.transport.send(request).await.map_err(|e| {
            tracing::error!(?method, %path, error = %e, "request failed");
            e
        })?;
        if !response.is_success() {
            tracing::warn!(?method, %path, status = response.status, "{}", failure);
            return Err(ApiError::Status { status: response.status, message: failure.to_string() });
        }
        Ok(response)
    }

    pub(crate) async fn fetch<R: DeserializeOwned>(&self, request: ApiRequest, failure: &str) -> Result<R, ApiError> {
        let response = self.dispatch(request, failure).await?;
        Ok(serde_json::from_slice(&response.body)?)
    }

    pub(crate) async fn execute(&self, request: ApiRequest, failure: &str) -> Result<(), ApiError> {
        self.dispatch(request, failure).await.map(|_| ())
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::collections::{HashMap, VecDeque};
    use std::sync::{Arc, Mutex};

    /// Canned transport. Responses are queued per `(method, path)`; the last
    /// queued response for a route keeps answering once the others are used.
    #[derive(Clone, Default)]
    pub struct MockTransport {
        routes: Arc<Mutex<HashMap<(Method, String), VecDeque<ApiResponse>>>>,
        requests: Arc<Mutex<Vec<ApiRequest>>>,
    }

    impl MockTransport {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn respond(&self, method: Method, path: &str, status: u16, body: serde_json::Value) -> &Self {
            let response = ApiResponse { status, body: serde_json::to_vec(&body).unwrap() };
            self.routes
                .lock()
                .unwrap()
                .entry((method, path.to_string()))
                .or_default()
                .push_back(response);
            self
        }

        pub fn requests(&self) -> Vec<ApiRequest> {
            self.requests.lock().unwrap().clone()
        }

        pub fn calls(&self) -> Vec<(Method, String)> {
            self.requests().into_iter().map(|r| (r.method, r.path)).collect()
        }
    }

    impl Transport for MockTransport {
        async fn send(&self, request: ApiRequest) -> Result<ApiResponse, ApiError> {
            let key = (request.method, request.path.clone());
            self.requests.lock().unwrap().push(request);
            let mut routes = self.routes.lock().unwrap();
            let response = match routes.get_mut(&key) {
                Some(queue) if queue.len() > 1 => queue.pop_front(),
                Some(queue) => queue.front().cloned(),
                None => None,
            };
            Ok(response.unwrap_or(ApiResponse { status: 404, body: b"{}".to_vec() }))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::MockTransport;
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_non_success_maps_to_status_error() {
        let transport = MockTransport::new();
        transport.respond(Method::Get, "/leaders", 500, json!({"message": "boom"}));
        let client = ApiClient::new(transport);

        let err = client.leaders().await.unwrap_err();
        assert_eq!(err.status(), Some(500));
        assert_eq!(err.user_message(), "Error al obtener líderes");
    }

    #[tokio::test]
    async fn test_token_attached_as_bearer() {
        let transport = MockTransport::new();
        transport.respond(Method::Get, "/departments", 200, json!([]));
        let mut client = ApiClient::new(transport.clone());
        client.set_token(Some("abc".into()));

        client.departments().await.unwrap();
        assert_eq!(transport.requests()[0].bearer.as_deref(), Some("abc"));
    }

    #[tokio::test]
    async fn test_malformed_body_is_decode_error() {
        let transport = MockTransport::new();
        transport.respond(Method::Get, "/corporations", 200, json!({"not": "a list"}));
        let client = ApiClient::new(transport);

        let err = client.corporations().await.unwrap_err();
        assert!(matches!(err, ApiError::Decode(_)));
    }
}
