//! Client layer: token resolution, request dispatch, and the public API.

use std::error::Error as StdError;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tracing::{debug, warn};
use url::Url;

use crate::domain::{ApiToken, ClientId, ClientSecret, SendMessage, UnixTimestamp, ValidationError};

mod store;

pub use store::{MemoryTokenStore, TokenStore};

const DEFAULT_BASE_URL: &str = "https://rest.smsportal.com/v1/";

/// Fixed key under which the bearer token is stored in a [`TokenStore`].
pub const TOKEN_STORE_KEY: &str = "smsportal.api_token";

/// Default connect timeout applied to every request.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(2);
/// Default overall request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(6);

const DEFAULT_SEND_ERROR: &str = "Error sending SMS message";

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

type BoxError = Box<dyn StdError + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HttpMethod {
    Get,
    Post,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum RequestAuth {
    Basic { client_id: String, secret: String },
    Bearer(String),
}

#[derive(Debug, Clone)]
struct HttpRequest {
    method: HttpMethod,
    url: String,
    auth: RequestAuth,
    body: Option<String>,
}

#[derive(Debug, Clone)]
struct HttpResponse {
    status: u16,
    body: String,
}

trait HttpTransport: Send + Sync {
    fn send<'a>(&'a self, request: HttpRequest) -> BoxFuture<'a, Result<HttpResponse, BoxError>>;
}

#[derive(Debug, Clone)]
struct ReqwestTransport {
    client: reqwest::Client,
}

impl HttpTransport for ReqwestTransport {
    fn send<'a>(&'a self, request: HttpRequest) -> BoxFuture<'a, Result<HttpResponse, BoxError>> {
        Box::pin(async move {
            let method = match request.method {
                HttpMethod::Get => reqwest::Method::GET,
                HttpMethod::Post => reqwest::Method::POST,
            };

            let mut builder = self
                .client
                .request(method, &request.url)
                .header(reqwest::header::ACCEPT, "application/json")
                .header(reqwest::header::CONTENT_TYPE, "application/json");

            builder = match request.auth {
                RequestAuth::Basic { client_id, secret } => {
                    builder.basic_auth(client_id, Some(secret))
                }
                RequestAuth::Bearer(token) => builder.bearer_auth(token),
            };

            if let Some(body) = request.body {
                builder = builder.body(body);
            }

            let response = builder.send().await?;
            let status = response.status().as_u16();
            let body = response.text().await?;
            Ok(HttpResponse { status, body })
        })
    }
}

#[derive(Debug, thiserror::Error)]
/// Errors returned by [`SmsPortalClient`].
pub enum SmsPortalError {
    /// HTTP client / transport failure (DNS, TLS, timeouts, etc).
    #[error("transport error: {0}")]
    Transport(#[source] BoxError),

    /// Non-successful HTTP status code returned by the server.
    #[error("unexpected HTTP status: {status}")]
    HttpStatus { status: u16, body: Option<String> },

    /// The `Authentication` endpoint did not return a token.
    #[error("authentication failed for client id {client_id}")]
    Authentication { client_id: String },

    /// SMSPortal reported a send failure; `detail` carries the serialized
    /// fault list from `errors` or `ErrorReport.Faults` when present.
    #[error("send failed: {detail}")]
    Send { detail: String },

    /// Response body could not be parsed as the expected format.
    #[error("parse error: {0}")]
    Parse(#[source] BoxError),

    /// One of the domain constructors rejected an invalid value.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),
}

#[derive(Clone)]
/// Builder for [`SmsPortalClient`].
///
/// Use this when you need to customize the base URL, timeouts, user-agent,
/// or attach a [`TokenStore`].
pub struct SmsPortalClientBuilder {
    client_id: ClientId,
    secret: ClientSecret,
    base_url: String,
    connect_timeout: Duration,
    timeout: Duration,
    user_agent: Option<String>,
    store: Option<Arc<dyn TokenStore>>,
}

impl SmsPortalClientBuilder {
    /// Create a builder with the default base URL and timeouts.
    pub fn new(client_id: ClientId, secret: ClientSecret) -> Self {
        Self {
            client_id,
            secret,
            base_url: DEFAULT_BASE_URL.to_owned(),
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            timeout: DEFAULT_TIMEOUT,
            user_agent: None,
            store: None,
        }
    }

    /// Override the SMSPortal base URL.
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Override the connect timeout.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Override the overall request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Override the HTTP `User-Agent` header.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Attach an external token store shared across client instances.
    pub fn token_store(mut self, store: Arc<dyn TokenStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Build a [`SmsPortalClient`].
    pub fn build(self) -> Result<SmsPortalClient, SmsPortalError> {
        let base_url = parse_base_url(&self.base_url)?;

        let mut builder = reqwest::Client::builder()
            .connect_timeout(self.connect_timeout)
            .timeout(self.timeout);
        if let Some(user_agent) = self.user_agent {
            builder = builder.user_agent(user_agent);
        }

        let client = builder
            .build()
            .map_err(|err| SmsPortalError::Transport(Box::new(err)))?;

        Ok(SmsPortalClient {
            client_id: self.client_id,
            secret: self.secret,
            base_url,
            http: Arc::new(ReqwestTransport { client }),
            store: self.store,
            token: Arc::new(Mutex::new(None)),
        })
    }
}

fn parse_base_url(input: &str) -> Result<Url, SmsPortalError> {
    Url::parse(input).map_err(|_| {
        SmsPortalError::Validation(ValidationError::InvalidBaseUrl {
            input: input.to_owned(),
        })
    })
}

#[derive(Clone)]
/// High-level SMSPortal client.
///
/// The client authenticates against `Authentication` with Basic credentials,
/// keeps the issued bearer token in memory (and in an optional
/// [`TokenStore`]), and attaches it to every `get`/`post`/`send_message`
/// call. A stale token is never reused; it triggers re-authentication.
///
/// Cloned clients share the in-memory token. No refresh locking is performed
/// across the network call, so concurrent callers may both refresh; the last
/// writer wins.
pub struct SmsPortalClient {
    client_id: ClientId,
    secret: ClientSecret,
    base_url: Url,
    http: Arc<dyn HttpTransport>,
    store: Option<Arc<dyn TokenStore>>,
    token: Arc<Mutex<Option<ApiToken>>>,
}

impl SmsPortalClient {
    /// Create a client with the default base URL and timeouts.
    ///
    /// For more customization, use [`SmsPortalClient::builder`].
    pub fn new(client_id: ClientId, secret: ClientSecret) -> Result<Self, SmsPortalError> {
        Self::builder(client_id, secret).build()
    }

    /// Start building a client with custom settings.
    pub fn builder(client_id: ClientId, secret: ClientSecret) -> SmsPortalClientBuilder {
        SmsPortalClientBuilder::new(client_id, secret)
    }

    pub fn client_id(&self) -> &ClientId {
        &self.client_id
    }

    pub fn set_client_id(&mut self, client_id: ClientId) {
        self.client_id = client_id;
    }

    pub fn secret(&self) -> &ClientSecret {
        &self.secret
    }

    pub fn set_secret(&mut self, secret: ClientSecret) {
        self.secret = secret;
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    pub fn set_base_url(&mut self, base_url: impl Into<String>) -> Result<(), SmsPortalError> {
        self.base_url = parse_base_url(&base_url.into())?;
        Ok(())
    }

    pub fn token_store(&self) -> Option<&Arc<dyn TokenStore>> {
        self.store.as_ref()
    }

    pub fn set_token_store(&mut self, store: Option<Arc<dyn TokenStore>>) {
        self.store = store;
    }

    /// The current in-memory token, if any (it may already be stale).
    pub fn api_token(&self) -> Option<ApiToken> {
        self.token_slot().clone()
    }

    /// Replace the in-memory token. Shared by all clones of this client.
    pub fn set_api_token(&self, token: Option<ApiToken>) {
        *self.token_slot() = token;
    }

    fn token_slot(&self) -> MutexGuard<'_, Option<ApiToken>> {
        self.token.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Ensure a valid bearer token is held, resolving in order: memory,
    /// token store, live authentication call.
    ///
    /// A fresh token is written back to the store (best effort) with the
    /// vendor-derived TTL.
    pub async fn authorize(&self) -> Result<ApiToken, SmsPortalError> {
        let now = UnixTimestamp::now();

        if let Some(token) = self.resolve_from_memory(now) {
            debug!("using in-memory bearer token");
            return Ok(token);
        }

        if let Some(token) = self.resolve_from_store(now).await {
            debug!("adopted bearer token from store");
            *self.token_slot() = Some(token.clone());
            return Ok(token);
        }

        self.authenticate(now).await
    }

    fn resolve_from_memory(&self, now: UnixTimestamp) -> Option<ApiToken> {
        self.token_slot()
            .as_ref()
            .filter(|token| token.is_valid_at(now))
            .cloned()
    }

    async fn resolve_from_store(&self, now: UnixTimestamp) -> Option<ApiToken> {
        let store = self.store.as_ref()?;
        match store.get(TOKEN_STORE_KEY).await {
            Ok(Some(token)) if token.is_valid_at(now) => Some(token),
            Ok(_) => None,
            Err(err) => {
                warn!(error = %err, "token store read failed; treating as miss");
                None
            }
        }
    }

    async fn authenticate(&self, now: UnixTimestamp) -> Result<ApiToken, SmsPortalError> {
        let url = self.endpoint_url("Authentication", &[])?;
        let response = self
            .http
            .send(HttpRequest {
                method: HttpMethod::Get,
                url,
                auth: RequestAuth::Basic {
                    client_id: self.client_id.as_str().to_owned(),
                    secret: self.secret.as_str().to_owned(),
                },
                body: None,
            })
            .await
            .map_err(SmsPortalError::Transport)?;

        if !(200..=299).contains(&response.status) {
            return Err(http_status_error(response));
        }

        let token = crate::transport::decode_authentication_json_response(&response.body, now)
            .map_err(|err| SmsPortalError::Parse(Box::new(err)))?
            .ok_or_else(|| SmsPortalError::Authentication {
                client_id: self.client_id.as_str().to_owned(),
            })?;

        debug!(expires_at = token.expires_at.value(), "acquired fresh bearer token");
        *self.token_slot() = Some(token.clone());

        if let Some(store) = self.store.as_ref() {
            if let Err(err) = store.put(TOKEN_STORE_KEY, &token, token.ttl()).await {
                warn!(error = %err, "token store write failed; continuing without it");
            }
        }

        Ok(token)
    }

    /// Authenticated GET returning the parsed JSON object.
    pub async fn get(
        &self,
        endpoint: &str,
        params: &[(&str, &str)],
    ) -> Result<serde_json::Map<String, serde_json::Value>, SmsPortalError> {
        let token = self.authorize().await?;
        let url = self.endpoint_url(endpoint, params)?;
        let response = self
            .dispatch(HttpRequest {
                method: HttpMethod::Get,
                url,
                auth: RequestAuth::Bearer(token.token),
                body: None,
            })
            .await?;

        if !(200..=299).contains(&response.status) {
            return Err(http_status_error(response));
        }
        parse_json_object(&response.body)
    }

    /// Authenticated POST of a JSON payload, returning the parsed JSON object.
    pub async fn post(
        &self,
        endpoint: &str,
        payload: &serde_json::Value,
    ) -> Result<serde_json::Map<String, serde_json::Value>, SmsPortalError> {
        let body = serde_json::to_string(payload)
            .map_err(|err| SmsPortalError::Parse(Box::new(err)))?;
        let response = self.post_body(endpoint, body).await?;

        if !(200..=299).contains(&response.status) {
            return Err(http_status_error(response));
        }
        parse_json_object(&response.body)
    }

    /// Send one or more SMS messages through the `BulkMessages` endpoint.
    ///
    /// Failure detection follows the vendor's conventions: a non-2xx HTTP
    /// status, a `statusCode` field other than 200, or a present `errors` /
    /// `ErrorReport.Faults` field all raise [`SmsPortalError::Send`] carrying
    /// the serialized fault detail. Otherwise the parsed response object is
    /// returned as-is.
    pub async fn send_message(
        &self,
        request: SendMessage,
    ) -> Result<serde_json::Map<String, serde_json::Value>, SmsPortalError> {
        let body = crate::transport::encode_send_message_body(&request);
        let response = self.post_body("BulkMessages", body).await?;

        let http_ok = (200..=299).contains(&response.status);
        let parsed = if http_ok {
            parse_json_object(&response.body)?
        } else {
            // A failed send may still carry a structured fault report.
            parse_json_object(&response.body).unwrap_or_default()
        };

        let fault = crate::transport::extract_fault_report(&parsed);
        let vendor_status_ok =
            !matches!(crate::transport::response_status_code(&parsed), Some(code) if code != 200);

        if !http_ok || !vendor_status_ok || fault.is_some() {
            return Err(SmsPortalError::Send {
                detail: fault.unwrap_or_else(|| DEFAULT_SEND_ERROR.to_owned()),
            });
        }

        Ok(parsed)
    }

    async fn post_body(
        &self,
        endpoint: &str,
        body: String,
    ) -> Result<HttpResponse, SmsPortalError> {
        let token = self.authorize().await?;
        let url = self.endpoint_url(endpoint, &[])?;
        self.dispatch(HttpRequest {
            method: HttpMethod::Post,
            url,
            auth: RequestAuth::Bearer(token.token),
            body: Some(body),
        })
        .await
    }

    async fn dispatch(&self, request: HttpRequest) -> Result<HttpResponse, SmsPortalError> {
        self.http
            .send(request)
            .await
            .map_err(SmsPortalError::Transport)
    }

    fn endpoint_url(&self, endpoint: &str, params: &[(&str, &str)]) -> Result<String, SmsPortalError> {
        let mut url = self.base_url.join(endpoint).map_err(|_| {
            SmsPortalError::Validation(ValidationError::InvalidEndpoint {
                input: endpoint.to_owned(),
            })
        })?;

        if !params.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in params {
                pairs.append_pair(key, value);
            }
        }

        Ok(url.into())
    }
}

fn http_status_error(response: HttpResponse) -> SmsPortalError {
    let body = if response.body.trim().is_empty() {
        None
    } else {
        Some(response.body)
    };
    SmsPortalError::HttpStatus {
        status: response.status,
        body,
    }
}

fn parse_json_object(
    body: &str,
) -> Result<serde_json::Map<String, serde_json::Value>, SmsPortalError> {
    match serde_json::from_str(body) {
        Ok(serde_json::Value::Object(map)) => Ok(map),
        Ok(other) => Err(SmsPortalError::Parse(
            format!("expected a JSON object, got: {other}").into(),
        )),
        Err(err) => Err(SmsPortalError::Parse(Box::new(err))),
    }
}
