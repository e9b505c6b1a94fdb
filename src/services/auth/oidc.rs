//! OIDC provider access: discovery document fetch and the signing-key cache.
//!
//! The key cache maps `kid` to a ready-to-use `DecodingKey`. Entries expire after the
//! configured TTL and are refreshed lazily on a miss or expiry. A refresh replaces the
//! whole set, so a key the provider no longer publishes is dropped. Overlapping refreshes
//! may fetch the key set twice; the map itself stays consistent.

use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use jsonwebtoken::DecodingKey;
use jsonwebtoken::jwk::{AlgorithmParameters, Jwk, JwkSet};
use serde::Deserialize;
use thiserror::Error;

use crate::config::AuthorizerConfig;

#[derive(Debug, Error)]
pub enum OidcError {
    #[error("identity provider request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("identity provider returned status {status} for {url}")]
    Status { status: u16, url: String },
    #[error("signing key not found for kid '{0}'")]
    KeyNotFound(String),
    #[error("unusable signing key: {0}")]
    InvalidKey(String),
    #[error("invalid trust bundle: {0}")]
    TrustBundle(String),
}

/// Subset of the OpenID Provider Metadata we rely on.
#[derive(Debug, Clone, Deserialize)]
pub struct DiscoveryDocument {
    #[serde(default)]
    pub issuer: Option<String>,
    pub jwks_uri: String,
}

#[derive(Clone)]
struct CachedKey {
    decoding_key: DecodingKey,
    expires_at: Instant,
}

/// HTTP client + key cache for one OIDC authority.
#[derive(Clone)]
pub struct OidcProvider {
    client: reqwest::Client,
    authority: String,
    keys: Arc<DashMap<String, CachedKey>>,
    key_ttl: Duration,
}

impl std::fmt::Debug for OidcProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OidcProvider")
            .field("authority", &self.authority)
            .field("cached_keys", &self.keys.len())
            .field("key_ttl", &self.key_ttl)
            .finish()
    }
}

impl OidcProvider {
    pub fn new(client: reqwest::Client, authority: impl Into<String>, key_ttl: Duration) -> Self {
        Self {
            client,
            authority: authority.into(),
            keys: Arc::new(DashMap::new()),
            key_ttl,
        }
    }

    /// Build from config: request timeout and optional custom trust bundle (`SSL_CERT_FILE`).
    pub fn from_config(config: &AuthorizerConfig) -> Result<Self, OidcError> {
        let client = build_client(config.oidc_timeout, config.ssl_cert_file.as_deref())?;
        Ok(Self::new(client, config.authority.clone(), config.jwks_cache_ttl))
    }

    pub fn authority(&self) -> &str {
        &self.authority
    }

    pub fn discovery_url(&self) -> String {
        format!(
            "{}/.well-known/openid-configuration",
            self.authority.trim_end_matches('/')
        )
    }

    /// Fetch the discovery document. Anything but 200 is a failure.
    pub async fn discover(&self) -> Result<DiscoveryDocument, OidcError> {
        let url = self.discovery_url();
        let resp = self.client.get(&url).send().await?;
        if resp.status() != reqwest::StatusCode::OK {
            return Err(OidcError::Status {
                status: resp.status().as_u16(),
                url,
            });
        }
        Ok(resp.json().await?)
    }

    /// Resolve the verification key for `kid`, refreshing the key set on a miss or expiry.
    pub async fn signing_key(&self, jwks_uri: &str, kid: &str) -> Result<DecodingKey, OidcError> {
        if let Some(entry) = self.keys.get(kid)
            && entry.expires_at > Instant::now()
        {
            return Ok(entry.decoding_key.clone());
        }

        self.refresh_keys(jwks_uri).await?;

        self.keys
            .get(kid)
            .filter(|entry| entry.expires_at > Instant::now())
            .map(|entry| entry.decoding_key.clone())
            .ok_or_else(|| OidcError::KeyNotFound(kid.to_string()))
    }

    async fn refresh_keys(&self, jwks_uri: &str) -> Result<(), OidcError> {
        let resp = self.client.get(jwks_uri).send().await?;
        if !resp.status().is_success() {
            return Err(OidcError::Status {
                status: resp.status().as_u16(),
                url: jwks_uri.to_string(),
            });
        }
        let jwks: JwkSet = resp.json().await?;

        let expires_at = Instant::now() + self.key_ttl;
        let mut fresh = HashMap::with_capacity(jwks.keys.len());
        for jwk in &jwks.keys {
            let Some(kid) = jwk.common.key_id.clone() else {
                continue;
            };
            match decoding_key(jwk) {
                Ok(decoding_key) => {
                    fresh.insert(
                        kid,
                        CachedKey {
                            decoding_key,
                            expires_at,
                        },
                    );
                }
                Err(err) => {
                    tracing::debug!(kid = %kid, error = %err, "skipping unusable jwk");
                }
            }
        }

        // the published set is authoritative: keys rotated out stop verifying
        self.keys.retain(|kid, _| fresh.contains_key(kid));
        let loaded = fresh.len();
        for (kid, key) in fresh {
            self.keys.insert(kid, key);
        }
        tracing::debug!(jwks_uri, loaded, "refreshed signing keys");
        Ok(())
    }

    #[cfg(test)]
    fn cached_kids(&self) -> Vec<String> {
        self.keys.iter().map(|e| e.key().clone()).collect()
    }
}

// Only RSA keys can back RS256 verification.
fn decoding_key(jwk: &Jwk) -> Result<DecodingKey, OidcError> {
    match &jwk.algorithm {
        AlgorithmParameters::RSA(_) => {
            DecodingKey::from_jwk(jwk).map_err(|e| OidcError::InvalidKey(e.to_string()))
        }
        _ => Err(OidcError::InvalidKey("expected RSA key".to_string())),
    }
}

fn build_client(
    timeout: Duration,
    ssl_cert_file: Option<&Path>,
) -> Result<reqwest::Client, OidcError> {
    let mut builder = reqwest::Client::builder().timeout(timeout);

    if let Some(path) = ssl_cert_file {
        let pem = fs::read(path)
            .map_err(|e| OidcError::TrustBundle(format!("{}: {e}", path.display())))?;
        let certs = reqwest::Certificate::from_pem_bundle(&pem)
            .map_err(|e| OidcError::TrustBundle(e.to_string()))?;
        for cert in certs {
            builder = builder.add_root_certificate(cert);
        }
    }

    builder
        .build()
        .map_err(|e| OidcError::TrustBundle(e.to_string()))
}
