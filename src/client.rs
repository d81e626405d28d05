//! Authenticated HTTP client for the Armis REST API.
//!
//! `ArmisClient` owns one `reqwest::Client`, one `Authenticator` and one
//! `SessionStore`. Every request goes through two stages:
//!
//! - `build_request` makes sure a valid token is cached (refreshing lazily
//!   through the session store when it has expired) and attaches it with the
//!   fixed JSON headers. No request is built with a token known to be expired.
//! - `execute` sends the request and classifies the response: 2xx returns the
//!   raw body, anything else becomes `ArmisError::Api`.
//!
//! There is no 401 retry. A token that expires while a request is in flight
//! is bounded by the safety margin, and the rejection surfaces as a normal
//! `Api` error.
//!
//! The client is `Send + Sync`; share it between tasks behind an `Arc`.

use std::borrow::Cow;
use std::time::Duration;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use reqwest::header::{self, HeaderValue};
use reqwest::{Client, Method, Request};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use tracing::{debug, warn};

use crate::auth::{Authenticator, SecretKey};
use crate::error::{ArmisError, Result};
use crate::session::SessionStore;

const DEFAULT_BASE_URL: &str = "https://api.armis.com";

const DEFAULT_API_VERSION: &str = "v1";

/// Covers TCP + TLS handshake only.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Full round-trip limit for the default HTTP client, token exchange included.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

fn build_http_client() -> Result<Client> {
    Ok(Client::builder()
        .connect_timeout(CONNECT_TIMEOUT)
        .timeout(REQUEST_TIMEOUT)
        .build()?)
}

/// Percent-encodes a caller-supplied identifier so that it occupies exactly
/// one path segment. `/`, `?` and `#` inside it are escaped; `.` and `..`
/// cannot be escaped (URL parsers resolve `%2E%2E` too) and are rejected.
fn item_segment(id: &str) -> Result<Cow<'_, str>> {
    if matches!(id, "" | "." | "..") {
        return Err(ArmisError::InvalidIdentifier(id.to_string()));
    }
    Ok(urlencoding::encode(id))
}

/// Construction-time options for [`ArmisClient`].
///
/// ```ignore
/// let options = ClientOptions::default()
///     .base_url("https://acme.armis.com")
///     .http_client(my_reqwest_client);
/// ```
#[derive(Debug, Clone)]
pub struct ClientOptions {
    base_url: String,
    api_version: String,
    http_client: Option<Client>,
}

impl Default for ClientOptions {
    fn default() -> Self {
        ClientOptions {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
            http_client: None,
        }
    }
}

impl ClientOptions {
    /// Root URL of the Armis tenant, without the `/api/...` suffix.
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// API version path segment, `"v1"` by default.
    pub fn api_version(mut self, api_version: impl Into<String>) -> Self {
        self.api_version = api_version.into();
        self
    }

    /// Transport to use for every request, including the token exchange.
    /// Configure timeouts, proxies and TLS on it before passing it in.
    pub fn http_client(mut self, client: Client) -> Self {
        self.http_client = Some(client);
        self
    }
}

/// Standard Armis response envelope: `{"success": true, "data": ...}`.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiResponse<T> {
    /// Whether the API reports the call as successful. Missing means `false`.
    #[serde(default)]
    pub success: bool,
    /// The endpoint-specific payload.
    pub data: T,
}

/// Paging parameters shared by the list endpoints.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct PageParams {
    /// Offset of the first item.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<u64>,
    /// Maximum number of items to return.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub length: Option<u64>,
}

/// Authenticated client for one Armis tenant.
#[derive(Debug)]
pub struct ArmisClient {
    client: Client,
    base_url: String,
    api_version: String,
    authenticator: Authenticator,
    session: SessionStore,
}

impl ArmisClient {
    /// Connects to the default host and authenticates.
    pub async fn new(secret_key: &str) -> Result<Self> {
        Self::with_options(secret_key, ClientOptions::default()).await
    }

    /// Builds a client and performs the first token exchange.
    ///
    /// The client is only returned once it holds a valid token.
    ///
    /// # Errors
    ///
    /// - `ArmisError::MissingCredential`: `secret_key` is empty.
    /// - `ArmisError::Auth`: the exchange failed; retry with corrected
    ///   credentials or options.
    /// - `ArmisError::Network`: the default HTTP client could not be built.
    pub async fn with_options(secret_key: &str, options: ClientOptions) -> Result<Self> {
        let secret = SecretKey::new(secret_key);
        if secret.is_empty() {
            return Err(ArmisError::MissingCredential);
        }

        let client = match options.http_client {
            Some(client) => client,
            None => build_http_client()?,
        };
        let base_url = options.base_url.trim_end_matches('/').to_string();
        let authenticator =
            Authenticator::new(client.clone(), &base_url, &options.api_version, secret);

        let armis = ArmisClient {
            client,
            base_url,
            api_version: options.api_version,
            authenticator,
            session: SessionStore::new(),
        };
        armis
            .session
            .refresh(Utc::now(), || armis.authenticator.exchange())
            .await?;
        Ok(armis)
    }

    /// Identifier of the authenticated account, for audit logging.
    pub async fn principal_id(&self) -> i64 {
        self.session
            .snapshot()
            .await
            .map(|issued| issued.principal_id)
            .unwrap_or_default()
    }

    /// When the cached token stops being presented (safety margin applied).
    pub async fn token_expires_at(&self) -> Option<DateTime<Utc>> {
        self.session.snapshot().await.map(|issued| issued.expires_at)
    }

    /// Prefixes a resource path with the API version: `collectors/` becomes
    /// `/api/v1/collectors/`.
    pub fn api_path(&self, resource: &str) -> String {
        format!(
            "/api/{}/{}",
            self.api_version,
            resource.trim_start_matches('/')
        )
    }

    /// Versioned path to one item of a collection: `("users", "a+b@x.io")`
    /// becomes `/api/v1/users/a%2Bb%40x.io/`.
    ///
    /// # Errors
    ///
    /// - `ArmisError::InvalidIdentifier`: `id` is empty, `.` or `..`.
    pub fn api_item_path(&self, collection: &str, id: &str) -> Result<String> {
        let segment = item_segment(id)?;
        Ok(self.api_path(&format!("{}/{segment}/", collection.trim_matches('/'))))
    }

    /// Returns a valid token, refreshing through the session store if the
    /// cached one has expired.
    ///
    /// A refresh can commit a token whose margin-adjusted expiry has already
    /// passed; that token is never presented and the request fails with `Auth`.
    async fn bearer_token(&self) -> Result<String> {
        let now = Utc::now();
        if let Some(token) = self.session.fresh_token(now).await {
            return Ok(token);
        }

        debug!("access token expired, refreshing before request");
        self.session
            .refresh(now, || self.authenticator.exchange())
            .await?;
        match self.session.fresh_token(Utc::now()).await {
            Some(token) => Ok(token),
            None => {
                warn!("refreshed access token expires within the safety margin");
                Err(ArmisError::Auth {
                    message: "issued access token expires within the safety margin".to_string(),
                    source: None,
                })
            }
        }
    }

    /// Builds an authenticated request for `path` (which already includes the
    /// version prefix, see [`ArmisClient::api_path`]).
    ///
    /// The token is sent verbatim as the `Authorization` value; the server's
    /// token already carries its scheme.
    pub async fn build_request<Q, B>(
        &self,
        method: Method,
        path: &str,
        query: Option<&Q>,
        body: Option<&B>,
    ) -> Result<Request>
    where
        Q: Serialize + ?Sized,
        B: Serialize + ?Sized,
    {
        let token = self.bearer_token().await?;
        let mut authorization = HeaderValue::from_str(&token)
            .map_err(|e| ArmisError::auth("access token is not a valid header value", e))?;
        authorization.set_sensitive(true);

        let url = format!("{}{}", self.base_url, path);
        let mut req = self
            .client
            .request(method, url)
            .header(header::AUTHORIZATION, authorization)
            .header(header::ACCEPT, "application/json")
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(params) = query {
            req = req.query(params);
        }
        if let Some(payload) = body {
            req = req.body(serde_json::to_vec(payload)?);
        }
        Ok(req.build()?)
    }

    /// Sends a built request and returns the body of a 2xx response.
    ///
    /// # Errors
    ///
    /// - `ArmisError::Api`: any non-2xx status, with the raw body.
    /// - `ArmisError::Network`: the request did not complete.
    pub async fn execute(&self, request: Request) -> Result<Bytes> {
        let method = request.method().clone();
        let path = request.url().path().to_string();

        let response = self.client.execute(request).await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response.bytes().await?);
        }

        let body = response.text().await.unwrap_or_default();
        warn!(%method, path = %path, status = status.as_u16(), "API request failed");
        Err(ArmisError::Api { status, body })
    }

    /// Builds, sends and decodes one JSON request. The verb helpers below
    /// all delegate here.
    async fn send_json<T, Q, B>(
        &self,
        method: Method,
        path: &str,
        query: Option<&Q>,
        body: Option<&B>,
    ) -> Result<T>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
        B: Serialize + ?Sized,
    {
        let request = self.build_request(method, path, query, body).await?;
        let bytes = self.execute(request).await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Sends an authenticated GET request and deserializes the JSON response.
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.send_json::<T, (), ()>(Method::GET, path, None, None)
            .await
    }

    /// GET with query-string parameters serialized from `query`.
    pub async fn get_with_query<T, Q>(&self, path: &str, query: &Q) -> Result<T>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        self.send_json::<T, Q, ()>(Method::GET, path, Some(query), None)
            .await
    }

    /// Sends an authenticated POST request with a JSON body.
    pub async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        self.send_json::<T, (), B>(Method::POST, path, None, Some(body))
            .await
    }

    /// Sends an authenticated PUT request with a JSON body.
    pub async fn put<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        self.send_json::<T, (), B>(Method::PUT, path, None, Some(body))
            .await
    }

    /// Sends an authenticated PATCH request with a JSON body.
    pub async fn patch<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        self.send_json::<T, (), B>(Method::PATCH, path, None, Some(body))
            .await
    }

    /// Sends an authenticated DELETE request. The response body is discarded.
    pub async fn delete(&self, path: &str) -> Result<()> {
        let request = self
            .build_request::<(), ()>(Method::DELETE, path, None, None)
            .await?;
        self.execute(request).await?;
        Ok(())
    }
}
