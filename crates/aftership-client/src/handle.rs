//! Service handle.
//!
//! A [`ServiceHandle`] is the live representation of one configured service:
//! its effective API key and base URL plus the HTTP session that carries the
//! key header on every request. All six services share this one type; what
//! differs between them comes from the [`Service`] constant table.

use crate::error::{ClientError, ClientResult};
use crate::request::{ApiResponse, Body, RequestOptions};
use aftership_config::{GlobalSettings, Service};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE, USER_AGENT};
use reqwest::{Client, Method};
use std::fmt;
use tracing::{debug, instrument, warn};

/// User agent sent by every session.
pub const CLIENT_USER_AGENT: &str = concat!("aftership-rust-client/", env!("CARGO_PKG_VERSION"));

/// Authenticated session for one service.
pub struct ServiceHandle {
    service: Service,
    api_key: String,
    base_url: String,
    /// `None` once closed.
    session: Option<Client>,
}

impl ServiceHandle {
    /// Build a handle. Performs no network I/O.
    pub fn new(
        service: Service,
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        settings: &GlobalSettings,
    ) -> ClientResult<Self> {
        let api_key = api_key.into();
        let base_url = base_url.into().trim_end_matches('/').to_string();

        let invalid_key_header = |message: String| ClientError::InvalidHeader {
            name: service.api_key_header().to_string(),
            message,
        };
        let key_name = HeaderName::from_bytes(service.api_key_header().as_bytes())
            .map_err(|e| invalid_key_header(e.to_string()))?;
        let key_value =
            HeaderValue::from_str(&api_key).map_err(|e| invalid_key_header(e.to_string()))?;

        let mut headers = HeaderMap::new();
        headers.insert(key_name, sensitive(key_value));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(USER_AGENT, HeaderValue::from_static(CLIENT_USER_AGENT));

        let mut builder = Client::builder().default_headers(headers);
        if settings.timeout > 0 {
            builder = builder.timeout(settings.timeout_duration());
        }
        if !settings.verify_tls {
            warn!(service = %service, "TLS certificate verification disabled");
            builder = builder.danger_accept_invalid_certs(true);
        }
        let session = builder.build()?;

        debug!(service = %service, base_url = %base_url, "Opened service session");

        Ok(Self {
            service,
            api_key,
            base_url,
            session: Some(session),
        })
    }

    /// Service this handle addresses.
    pub fn service(&self) -> Service {
        self.service
    }

    /// Effective API key.
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// Effective base URL, without a trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Whether [`close`](Self::close) has been called.
    pub fn is_closed(&self) -> bool {
        self.session.is_none()
    }

    /// Build a full URL by appending an endpoint path to the base URL.
    pub fn url(&self, endpoint: &str) -> String {
        let path = endpoint.trim_start_matches('/');
        format!("{}/{}", self.base_url, path)
    }

    /// Release the session. Closing twice is a no-op.
    pub fn close(&mut self) {
        if self.session.take().is_some() {
            debug!(service = %self.service, "Closed service session");
        }
    }

    /// Make a request.
    ///
    /// Non-2xx answers become [`ClientError::HttpStatus`] with the body kept.
    #[instrument(skip(self, options), fields(service = %self.service))]
    pub async fn request(
        &self,
        method: Method,
        endpoint: &str,
        options: RequestOptions,
    ) -> ClientResult<ApiResponse> {
        let session = self.session.as_ref().ok_or(ClientError::SessionClosed {
            service: self.service,
        })?;

        let url = self.url(endpoint);
        debug!("{} {}", method, url);

        let mut request = session.request(method, &url);
        if !options.query.is_empty() {
            request = request.query(&options.query);
        }
        for (name, value) in &options.headers {
            let name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| {
                ClientError::InvalidHeader {
                    name: name.clone(),
                    message: e.to_string(),
                }
            })?;
            let value = HeaderValue::from_str(value).map_err(|e| ClientError::InvalidHeader {
                name: name.to_string(),
                message: e.to_string(),
            })?;
            request = request.header(name, value);
        }
        match options.body {
            Some(Body::Json(value)) => request = request.json(&value),
            Some(Body::Form(fields)) => request = request.form(&fields),
            None => {}
        }
        if let Some(timeout) = options.timeout {
            request = request.timeout(timeout);
        }

        let response = request.send().await?;
        self.handle_response(response).await
    }

    /// Make a GET request.
    pub async fn get(&self, endpoint: &str) -> ClientResult<ApiResponse> {
        self.request(Method::GET, endpoint, RequestOptions::new()).await
    }

    /// Make a GET request with query parameters, headers or a timeout.
    pub async fn get_with(
        &self,
        endpoint: &str,
        options: RequestOptions,
    ) -> ClientResult<ApiResponse> {
        self.request(Method::GET, endpoint, options).await
    }

    /// Make a POST request.
    pub async fn post(&self, endpoint: &str, options: RequestOptions) -> ClientResult<ApiResponse> {
        self.request(Method::POST, endpoint, options).await
    }

    /// Make a PUT request.
    pub async fn put(&self, endpoint: &str, options: RequestOptions) -> ClientResult<ApiResponse> {
        self.request(Method::PUT, endpoint, options).await
    }

    /// Make a PATCH request.
    pub async fn patch(&self, endpoint: &str, options: RequestOptions) -> ClientResult<ApiResponse> {
        self.request(Method::PATCH, endpoint, options).await
    }

    /// Make a DELETE request.
    pub async fn delete(&self, endpoint: &str) -> ClientResult<ApiResponse> {
        self.request(Method::DELETE, endpoint, RequestOptions::new()).await
    }

    /// Make a DELETE request with options.
    pub async fn delete_with(
        &self,
        endpoint: &str,
        options: RequestOptions,
    ) -> ClientResult<ApiResponse> {
        self.request(Method::DELETE, endpoint, options).await
    }

    async fn handle_response(&self, response: reqwest::Response) -> ClientResult<ApiResponse> {
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await?.to_vec();

        if !status.is_success() {
            let body = String::from_utf8_lossy(&body).into_owned();
            warn!(
                "{} API error ({})",
                self.service.display_name(),
                status.as_u16()
            );
            debug!(body = %body, "Error response body");
            return Err(ClientError::HttpStatus {
                service: self.service,
                status: status.as_u16(),
                body,
            });
        }

        Ok(ApiResponse {
            status: status.as_u16(),
            headers,
            body,
        })
    }
}

impl fmt::Debug for ServiceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceHandle")
            .field("service", &self.service)
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("closed", &self.is_closed())
            .finish()
    }
}

fn sensitive(mut value: HeaderValue) -> HeaderValue {
    value.set_sensitive(true);
    value
}
