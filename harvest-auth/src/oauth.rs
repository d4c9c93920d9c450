//! OAuth 2.0 Authorization Flow Manager with PKCE Support
//!
//! Implements the authorization-code flow (RFC 6749) with PKCE (RFC 7636)
//! for the delegated credential path.
//!
//! # Security
//!
//! - Generates cryptographically random state and code verifier
//! - Validates the callback state parameter before exchanging the code
//! - Never logs tokens, codes, or verifiers

use crate::error::{CredentialError, Result};
use crate::types::{AppSecret, Credential};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use harvest_http::{HttpClient, HttpMethod, HttpRequest};
use rand::Rng;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};
use url::Url;

/// OAuth 2.0 provider configuration.
#[derive(Debug, Clone)]
pub struct OAuthConfig {
    /// OAuth client ID
    pub client_id: String,
    /// OAuth client secret (optional for public clients)
    pub client_secret: Option<String>,
    /// Redirect URI for the OAuth callback
    pub redirect_uri: String,
    /// Scopes to request
    pub scopes: Vec<String>,
    /// Authorization endpoint URL
    pub auth_url: String,
    /// Token endpoint URL
    pub token_url: String,
}

impl From<AppSecret> for OAuthConfig {
    fn from(secret: AppSecret) -> Self {
        Self {
            client_id: secret.client_id,
            client_secret: secret.client_secret,
            redirect_uri: secret.redirect_uri,
            scopes: secret.scopes,
            auth_url: secret.auth_uri,
            token_url: secret.token_uri,
        }
    }
}

/// PKCE (Proof Key for Code Exchange) verifier.
///
/// The verifier stays local for the duration of the flow; only the challenge
/// derived from it is sent during authorization.
#[derive(Debug, Clone)]
pub struct PkceVerifier {
    verifier: String,
    state: String,
}

impl PkceVerifier {
    /// Create a new verifier with cryptographically secure random values.
    pub fn new() -> Self {
        let mut rng = rand::thread_rng();

        // Code verifier must be 43-128 characters per RFC 7636
        let mut verifier_bytes = [0u8; 32];
        rng.fill(&mut verifier_bytes);
        let verifier = URL_SAFE_NO_PAD.encode(verifier_bytes);

        // State for CSRF protection
        let mut state_bytes = [0u8; 16];
        rng.fill(&mut state_bytes);
        let state = URL_SAFE_NO_PAD.encode(state_bytes);

        Self { verifier, state }
    }

    pub fn verifier(&self) -> &str {
        &self.verifier
    }

    pub fn state(&self) -> &str {
        &self.state
    }

    /// Compute the S256 code challenge: BASE64URL(SHA256(code_verifier))
    pub fn challenge(&self) -> String {
        use sha2::{Digest, Sha256};
        let mut hasher = Sha256::new();
        hasher.update(self.verifier.as_bytes());
        URL_SAFE_NO_PAD.encode(hasher.finalize())
    }
}

impl Default for PkceVerifier {
    fn default() -> Self {
        Self::new()
    }
}

/// Token endpoint response body.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    expires_in: i64,
}

/// OAuth 2.0 flow manager.
///
/// Handles authorization-URL construction, code exchange, and token refresh
/// against a single provider configuration.
pub struct OAuthFlowManager {
    config: OAuthConfig,
    http: Arc<dyn HttpClient>,
}

impl OAuthFlowManager {
    pub fn new(config: OAuthConfig, http: Arc<dyn HttpClient>) -> Self {
        Self { config, http }
    }

    /// Build the authorization URL with a fresh PKCE challenge.
    ///
    /// Returns the URL to present to the user and the verifier that must be
    /// kept for the subsequent code exchange.
    pub fn build_auth_url(&self) -> Result<(String, PkceVerifier)> {
        let verifier = PkceVerifier::new();
        let challenge = verifier.challenge();

        let mut url = Url::parse(&self.config.auth_url)
            .map_err(|e| CredentialError::Other(format!("Invalid auth URL: {}", e)))?;

        {
            let mut query = url.query_pairs_mut();
            query.append_pair("client_id", &self.config.client_id);
            query.append_pair("redirect_uri", &self.config.redirect_uri);
            query.append_pair("response_type", "code");
            query.append_pair("scope", &self.config.scopes.join(" "));
            query.append_pair("state", verifier.state());
            query.append_pair("code_challenge", &challenge);
            query.append_pair("code_challenge_method", "S256");
            // Request a refresh token
            query.append_pair("access_type", "offline");
        }

        debug!("Built authorization URL");
        Ok((url.to_string(), verifier))
    }

    /// Exchange an authorization code for a credential.
    ///
    /// # Errors
    ///
    /// - [`CredentialError::StateMismatch`] if the callback state does not
    ///   match the one issued with the authorization URL
    /// - [`CredentialError::TokenEndpoint`] if the endpoint rejects the code
    #[instrument(skip(self, code, verifier))]
    pub async fn exchange_code(
        &self,
        code: &str,
        state: &str,
        verifier: &PkceVerifier,
    ) -> Result<Credential> {
        if state != verifier.state() {
            warn!("OAuth state mismatch on code exchange");
            return Err(CredentialError::StateMismatch {
                expected: verifier.state().to_string(),
                actual: state.to_string(),
            });
        }

        let mut params = HashMap::new();
        params.insert("grant_type", "authorization_code");
        params.insert("code", code);
        params.insert("redirect_uri", &self.config.redirect_uri);
        params.insert("client_id", &self.config.client_id);
        params.insert("code_verifier", verifier.verifier());
        if let Some(ref client_secret) = self.config.client_secret {
            params.insert("client_secret", client_secret);
        }

        debug!("Exchanging authorization code for tokens");
        let response = self.token_request(&params).await?;

        info!(
            expires_in = response.expires_in,
            "Authorization code exchanged"
        );
        Ok(Credential::delegated(
            response.access_token,
            response.refresh_token,
            response.expires_in,
        ))
    }

    /// Refresh an access token using a refresh token.
    ///
    /// The provider may omit the refresh token in its response; the returned
    /// credential then keeps the one that was used for the refresh.
    #[instrument(skip(self, refresh_token))]
    pub async fn refresh_access_token(&self, refresh_token: &str) -> Result<Credential> {
        let mut params = HashMap::new();
        params.insert("grant_type", "refresh_token");
        params.insert("refresh_token", refresh_token);
        params.insert("client_id", &self.config.client_id);
        if let Some(ref client_secret) = self.config.client_secret {
            params.insert("client_secret", client_secret);
        }

        debug!("Refreshing access token");
        let response = self.token_request(&params).await?;

        info!(expires_in = response.expires_in, "Access token refreshed");
        Ok(Credential::delegated(
            response.access_token,
            response
                .refresh_token
                .or_else(|| Some(refresh_token.to_string())),
            response.expires_in,
        ))
    }

    async fn token_request(&self, params: &HashMap<&str, &str>) -> Result<TokenResponse> {
        let encoded = serde_urlencoded::to_string(params)
            .map_err(|e| CredentialError::Other(format!("Failed to encode token request: {}", e)))?;

        let request =
            HttpRequest::new(HttpMethod::Post, self.config.token_url.clone()).form(encoded);

        let response = self.http.execute(request).await?;

        if !response.is_success() {
            let message = response
                .text()
                .unwrap_or_else(|_| "Unable to read error response".to_string());
            warn!(status = response.status, "Token endpoint returned an error");
            return Err(CredentialError::TokenEndpoint {
                status: response.status,
                message,
            });
        }

        response
            .json()
            .map_err(|e| CredentialError::Other(format!("Failed to parse token response: {}", e)))
    }
}
