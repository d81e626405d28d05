//! Secret-key authentication against the Armis access-token endpoint.
//!
//! `Authenticator::exchange` trades the long-lived secret key for a
//! short-lived access token by POSTing `secret_key=<secret>` as form data to
//! `{base}/api/{version}/access_token/`. The response envelope is:
//!
//! ```json
//! {"success": true, "data": {"access_token": "...", "expiration_utc": "...", "user_id": 7}}
//! ```
//!
//! The authenticator only computes a new `IssuedToken`; publishing it to the
//! shared session is `SessionStore`'s job.

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use reqwest::{Client, header};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{ArmisError, Result};
use crate::session::IssuedToken;

/// Subtracted from the server-reported expiration so that a token is never
/// presented close to its real expiry (clock skew, request latency).
pub const SAFETY_MARGIN: Duration = Duration::minutes(5);

/// The long-lived API secret key.
///
/// Immutable once constructed. `Debug` never prints the value.
#[derive(Clone)]
pub struct SecretKey(String);

impl SecretKey {
    /// Wraps a secret key string.
    pub fn new(secret: impl Into<String>) -> Self {
        SecretKey(secret.into())
    }

    /// True when no secret was supplied. Whitespace is passed through to the
    /// server unchanged.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretKey(<redacted>)")
    }
}

/// Form body sent to the token endpoint.
#[derive(Serialize)]
pub struct TokenRequest<'a> {
    secret_key: &'a str,
}

/// Envelope returned by the token endpoint.
///
/// `data` is optional because failure responses may omit it.
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    /// Whether the exchange succeeded.
    pub success: bool,
    /// Token payload, present on success.
    #[serde(default)]
    pub data: Option<TokenData>,
}

/// Payload of a successful token response.
#[derive(Debug, Deserialize)]
pub struct TokenData {
    /// Opaque token, sent verbatim as the `Authorization` header.
    pub access_token: String,
    /// RFC 3339 timestamp, usually with fractional seconds.
    pub expiration_utc: String,
    /// ID of the account the secret key belongs to.
    pub user_id: i64,
}

/// Builds the access-token URL for a base URL and API version.
pub fn token_url(base_url: &str, api_version: &str) -> String {
    format!(
        "{}/api/{}/access_token/",
        base_url.trim_end_matches('/'),
        api_version
    )
}

/// Parses a token endpoint body into an `IssuedToken`, applying the safety
/// margin to the reported expiration.
///
/// Every failure maps to `ArmisError::Auth`: malformed JSON,
/// `success: false`, a missing `data` object, or an unparsable timestamp.
pub fn parse_token_response(body: &str) -> Result<IssuedToken> {
    let envelope: TokenResponse = serde_json::from_str(body)
        .map_err(|e| ArmisError::auth("malformed access token response", e))?;

    if !envelope.success {
        return Err(ArmisError::Auth {
            message: format!("token endpoint reported failure: {body}"),
            source: None,
        });
    }

    let data = envelope.data.ok_or_else(|| ArmisError::Auth {
        message: "access token response has no data".to_string(),
        source: None,
    })?;

    let expiration = DateTime::parse_from_rfc3339(&data.expiration_utc).map_err(|e| {
        ArmisError::auth(
            format!("invalid expiration_utc {:?}", data.expiration_utc),
            e,
        )
    })?;

    Ok(IssuedToken {
        access_token: data.access_token,
        expires_at: expiration.with_timezone(&Utc) - SAFETY_MARGIN,
        principal_id: data.user_id,
    })
}

/// Performs the secret-key exchange against one Armis tenant.
#[derive(Debug, Clone)]
pub struct Authenticator {
    client: Client,
    token_url: String,
    secret: SecretKey,
}

impl Authenticator {
    /// Exchanges `secret` at `{base_url}/api/{api_version}/access_token/`
    /// over `client`.
    pub fn new(client: Client, base_url: &str, api_version: &str, secret: SecretKey) -> Self {
        Authenticator {
            client,
            token_url: token_url(base_url, api_version),
            secret,
        }
    }

    /// The endpoint this authenticator exchanges against.
    pub fn url(&self) -> &str {
        &self.token_url
    }

    /// Exchanges the secret key for a new access token.
    ///
    /// The body is read as text before the status is checked so that the
    /// server's explanation survives into the error.
    pub async fn exchange(&self) -> Result<IssuedToken> {
        debug!(url = %self.token_url, "exchanging secret key for access token");

        let form = TokenRequest {
            secret_key: self.secret.expose(),
        };
        let response = self
            .client
            .post(&self.token_url)
            .header(header::ACCEPT, "application/json")
            .form(&form)
            .send()
            .await
            .map_err(|e| ArmisError::auth("failed to reach the access token endpoint", e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ArmisError::auth("failed to read access token response", e))?;

        if !status.is_success() {
            warn!(status = status.as_u16(), "access token request rejected");
            return Err(ArmisError::auth(
                format!("token exchange rejected ({status})"),
                ArmisError::Api { status, body },
            ));
        }

        let issued = parse_token_response(&body).inspect_err(|e| {
            warn!(error = %e, "access token response unusable");
        })?;
        info!(
            principal_id = issued.principal_id,
            expires_at = %issued.expires_at,
            "obtained access token"
        );
        Ok(issued)
    }
}
