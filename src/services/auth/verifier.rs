use jsonwebtoken::{Algorithm, Validation, decode, decode_header};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::config::AuthorizerConfig;
use crate::services::auth::claims::Claims;
use crate::services::auth::oidc::{OidcError, OidcProvider};

/// The only signature algorithm accepted for identity tokens.
pub const APPROVED_ALGORITHM: Algorithm = Algorithm::RS256;

// Errors returned by identity-token verification. Every variant means "not verified".
#[derive(Debug, Error)]
pub enum VerifyError {
    #[error(transparent)]
    Provider(#[from] OidcError),
    #[error("jwt verification failed: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),
    #[error("unsupported algorithm {0:?}")]
    UnsupportedAlgorithm(Algorithm),
    #[error("missing 'kid' in token header")]
    MissingKeyId,
    #[error("missing or empty '{0}' claim")]
    MissingClaim(&'static str),
    #[error("invalid 'iat' claim")]
    InvalidIssuedAt,
}

impl VerifyError {
    /// True when the identity provider itself could not be reached or answered badly.
    pub fn is_provider_unreachable(&self) -> bool {
        matches!(
            self,
            Self::Provider(
                OidcError::Transport(_) | OidcError::Status { .. } | OidcError::TrustBundle(_)
            )
        )
    }
}

/// RS256 identity-token verifier bound to one authority + client id.
///
/// `jsonwebtoken::Validation` checks:
/// - signature
/// - `exp` / `nbf` (with leeway)
/// - `iss` (exact match with the authority) and `aud` (client id)
/// - presence of `exp`, `iss`, `aud`, `sub`
///
/// `iat` (when present) and a non-empty `sub` are checked here.
#[derive(Clone)]
pub struct IdTokenVerifier {
    provider: OidcProvider,
    validation: Validation,
    leeway_seconds: u64,
}

impl std::fmt::Debug for IdTokenVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdTokenVerifier")
            .field("provider", &self.provider)
            .field("validation", &self.validation)
            .finish()
    }
}

impl IdTokenVerifier {
    pub fn new(provider: OidcProvider, client_id: &str, leeway_seconds: u64) -> Self {
        let mut validation = Validation::new(APPROVED_ALGORITHM);
        validation.set_issuer(&[provider.authority()]);
        validation.set_audience(&[client_id]);
        validation.set_required_spec_claims(&["exp", "iss", "aud", "sub"]);
        validation.validate_exp = true;
        validation.validate_nbf = true;
        validation.leeway = leeway_seconds;

        Self {
            provider,
            validation,
            leeway_seconds,
        }
    }

    pub fn from_config(config: &AuthorizerConfig) -> Result<Self, OidcError> {
        let provider = OidcProvider::from_config(config)?;
        Ok(Self::new(provider, &config.client_id, config.leeway_seconds))
    }

    /// Verify an identity token end to end and return its claims.
    pub async fn verify(&self, token: &str) -> Result<Claims, VerifyError> {
        // Reject other algorithms before touching the network.
        let header = decode_header(token)?;
        if header.alg != APPROVED_ALGORITHM {
            return Err(VerifyError::UnsupportedAlgorithm(header.alg));
        }
        let kid = header.kid.as_deref().ok_or(VerifyError::MissingKeyId)?;

        let discovery = self.provider.discover().await?;
        let key = self.provider.signing_key(&discovery.jwks_uri, kid).await?;

        let data = decode::<Map<String, Value>>(token, &key, &self.validation)?;
        let claims = data.claims;

        validate_iat(&claims, self.leeway_seconds)?;

        let subject = claims
            .get("sub")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or(VerifyError::MissingClaim("sub"))?
            .to_string();

        Ok(Claims::new(subject, claims))
    }
}

fn validate_iat(claims: &Map<String, Value>, leeway_seconds: u64) -> Result<(), VerifyError> {
    let Some(iat) = claims.get("iat") else {
        return Ok(());
    };
    // NumericDate may carry a fractional part
    let iat = iat.as_f64().ok_or(VerifyError::InvalidIssuedAt)?;
    let leeway = i64::try_from(leeway_seconds).unwrap_or(i64::MAX);
    let limit = chrono::Utc::now().timestamp().saturating_add(leeway);
    if iat > limit as f64 {
        return Err(VerifyError::InvalidIssuedAt);
    }
    Ok(())
}
