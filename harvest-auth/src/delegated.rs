//! Delegated credential provider
//!
//! Manages an interactive OAuth credential with an on-disk token cache. Each
//! acquisition classifies the cache into an explicit state and walks the
//! state machine:
//!
//! ```text
//! NoCache                 -> NeedsInteractiveAuth
//! CachedValid             -> return immediately
//! CachedExpiredRefreshable-> refresh -> CachedValid
//!                                   \-> (refresh failed) NeedsInteractiveAuth
//! CachedExpiredTerminal   -> NeedsInteractiveAuth
//! NeedsInteractiveAuth    -> interactive grant -> CachedValid
//! ```
//!
//! Every transition that reaches `CachedValid` persists the credential to the
//! cache file, overwriting any prior content, so the cache always reflects
//! the most recently obtained credential state.

use crate::cache::TokenCache;
use crate::error::{CredentialError, Result};
use crate::oauth::{OAuthConfig, OAuthFlowManager};
use crate::provider::CredentialProvider;
use crate::types::{AppSecret, Credential};
use async_trait::async_trait;
use harvest_http::HttpClient;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::fs;
use tracing::{info, instrument, warn};

/// Default application-secret file name inside the credentials directory.
pub const APP_SECRET_FILE: &str = "client-secret.json";

/// Default token cache file name inside the credentials directory.
pub const TOKEN_CACHE_FILE: &str = "token-cache.json";

/// Outcome of the interactive authorization round trip.
///
/// The host captures the OAuth callback and hands back the authorization
/// code together with the state parameter for CSRF validation.
#[derive(Debug, Clone)]
pub struct AuthorizationGrant {
    pub code: String,
    pub state: String,
}

/// Host-supplied interactive authorization.
///
/// The provider builds the authorization URL; the host presents it (browser,
/// terminal prompt) and returns the grant from the callback.
#[async_trait]
pub trait InteractiveAuthorizer: Send + Sync {
    async fn authorize(&self, auth_url: &str) -> Result<AuthorizationGrant>;
}

/// File layout for the delegated acquisition path.
#[derive(Debug, Clone)]
pub struct DelegatedConfig {
    /// Directory holding the app-secret and token-cache files
    pub credentials_dir: PathBuf,
    /// Application-secret file name
    pub secret_file: String,
    /// Token cache file name
    pub cache_file: String,
}

impl DelegatedConfig {
    pub fn new(credentials_dir: impl Into<PathBuf>) -> Self {
        Self {
            credentials_dir: credentials_dir.into(),
            secret_file: APP_SECRET_FILE.to_string(),
            cache_file: TOKEN_CACHE_FILE.to_string(),
        }
    }

    pub fn secret_path(&self) -> PathBuf {
        self.credentials_dir.join(&self.secret_file)
    }

    pub fn cache_path(&self) -> PathBuf {
        self.credentials_dir.join(&self.cache_file)
    }
}

impl Default for DelegatedConfig {
    fn default() -> Self {
        Self::new(crate::default_credentials_dir())
    }
}

/// Classification of the token cache at acquisition time.
#[derive(Debug)]
enum CacheState {
    NoCache,
    Valid(Credential),
    ExpiredRefreshable(Credential),
    ExpiredTerminal,
}

fn classify(cached: Option<Credential>) -> CacheState {
    match cached {
        None => CacheState::NoCache,
        Some(credential) if !credential.is_expired() => CacheState::Valid(credential),
        Some(credential) if credential.is_refreshable() => {
            CacheState::ExpiredRefreshable(credential)
        }
        Some(_) => CacheState::ExpiredTerminal,
    }
}

/// Credential provider for the delegated (interactive) path.
pub struct DelegatedProvider {
    config: DelegatedConfig,
    http: Arc<dyn HttpClient>,
    authorizer: Arc<dyn InteractiveAuthorizer>,
    cache: TokenCache,
}

impl DelegatedProvider {
    pub fn new(
        config: DelegatedConfig,
        http: Arc<dyn HttpClient>,
        authorizer: Arc<dyn InteractiveAuthorizer>,
    ) -> Self {
        let cache = TokenCache::new(config.cache_path());
        Self {
            config,
            http,
            authorizer,
            cache,
        }
    }

    async fn load_secret(&self) -> Result<AppSecret> {
        let path = self.config.secret_path();

        let bytes = match fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(CredentialError::MissingKeyFile { path })
            }
            Err(e) => return Err(CredentialError::CacheIo { path, source: e }),
        };

        serde_json::from_slice(&bytes).map_err(|e| CredentialError::MalformedKeyFile {
            path,
            reason: e.to_string(),
        })
    }

    async fn interactive_grant(&self, flow: &OAuthFlowManager) -> Result<Credential> {
        let (auth_url, verifier) = flow.build_auth_url()?;
        info!("Running interactive authorization");

        let grant = self.authorizer.authorize(&auth_url).await?;

        // State verification happens inside the exchange
        flow.exchange_code(&grant.code, &grant.state, &verifier).await
    }
}

#[async_trait]
impl CredentialProvider for DelegatedProvider {
    #[instrument(skip(self), fields(dir = %self.config.credentials_dir.display()))]
    async fn acquire(&self) -> Result<Credential> {
        fs::create_dir_all(&self.config.credentials_dir)
            .await
            .map_err(|e| CredentialError::CacheIo {
                path: self.config.credentials_dir.clone(),
                source: e,
            })?;

        let secret = self.load_secret().await?;
        let flow = OAuthFlowManager::new(OAuthConfig::from(secret), self.http.clone());

        match classify(self.cache.load().await?) {
            CacheState::Valid(credential) => {
                info!("Using cached credential");
                return Ok(credential);
            }
            CacheState::ExpiredRefreshable(credential) => {
                if let Some(refresh_token) = credential.refresh_token.as_deref() {
                    match flow.refresh_access_token(refresh_token).await {
                        Ok(refreshed) => {
                            self.cache.store(&refreshed).await?;
                            info!("Cached credential refreshed");
                            return Ok(refreshed);
                        }
                        Err(e) => {
                            warn!(error = %e, "Token refresh failed, falling back to interactive authorization");
                        }
                    }
                }
            }
            CacheState::ExpiredTerminal => {
                info!("Cached credential expired with no refresh token");
            }
            CacheState::NoCache => {
                info!("No cached credential");
            }
        }

        let credential = self.interactive_grant(&flow).await?;
        self.cache.store(&credential).await?;
        info!("Interactive authorization completed and cached");
        Ok(credential)
    }
}
