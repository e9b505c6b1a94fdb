//! Request authorizer: identity token → allow/deny policy for one resource.
//!
//! Fail-closed: every failure (no token, provider down, bad signature/claims,
//! non-admin on an admin-only path) becomes the same `Deny` policy. The reason
//! is only logged, never returned to the caller.

use thiserror::Error;

use crate::config::AuthorizerConfig;
use crate::services::auth::claims::Claims;
use crate::services::auth::oidc::OidcError;
use crate::services::auth::policy::{AuthorizerEvent, AuthorizerResponse};
use crate::services::auth::token::get_id_token;
use crate::services::auth::verifier::{IdTokenVerifier, VerifyError};

#[derive(Debug, Error)]
pub enum DenyReason {
    #[error("missing identity token")]
    MissingCredential,
    #[error("identity provider unreachable: {0}")]
    ProviderUnreachable(VerifyError),
    #[error("invalid identity token: {0}")]
    TokenInvalid(VerifyError),
    #[error("'{subject}' is not a member of the admin group")]
    InsufficientPrivilege { subject: String },
}

impl From<VerifyError> for DenyReason {
    fn from(e: VerifyError) -> Self {
        if e.is_provider_unreachable() {
            Self::ProviderUnreachable(e)
        } else {
            Self::TokenInvalid(e)
        }
    }
}

#[derive(Clone, Debug)]
pub struct Authorizer {
    verifier: IdTokenVerifier,
    admin_group: String,
    groups_path: String,
    admin_path_prefixes: Vec<String>,
}

impl Authorizer {
    pub fn new(verifier: IdTokenVerifier, config: &AuthorizerConfig) -> Self {
        Self {
            verifier,
            admin_group: config.admin_group.clone(),
            groups_path: config.jwt_groups_prop.clone(),
            admin_path_prefixes: config.admin_path_prefixes.clone(),
        }
    }

    pub fn from_config(config: &AuthorizerConfig) -> Result<Self, OidcError> {
        let verifier = IdTokenVerifier::from_config(config)?;
        Ok(Self::new(verifier, config))
    }

    /// Decide for a gateway event. Never fails; errors collapse to `Deny` for `methodArn`.
    pub async fn authorize(&self, event: &AuthorizerEvent) -> AuthorizerResponse {
        let token = get_id_token(&event.headers);
        self.authorize_token(&event.resource, &event.method_arn, token.as_deref())
            .await
    }

    /// Same as [`Authorizer::authorize`] with the token already extracted.
    ///
    /// `resource` is the request path used for the admin-only check;
    /// `method_arn` is what the returned statement refers to.
    pub async fn authorize_token(
        &self,
        resource: &str,
        method_arn: &str,
        token: Option<&str>,
    ) -> AuthorizerResponse {
        match self.evaluate(resource, token).await {
            Ok(username) => {
                tracing::info!(
                    effect = "Allow",
                    resource = %method_arn,
                    principal = %username,
                    "authorization completed"
                );
                AuthorizerResponse::allow(method_arn, &username)
            }
            Err(reason) => {
                if let DenyReason::ProviderUnreachable(_) = reason {
                    tracing::error!(
                        effect = "Deny",
                        resource = %method_arn,
                        reason = %reason,
                        "authorization completed"
                    );
                } else {
                    tracing::warn!(
                        effect = "Deny",
                        resource = %method_arn,
                        reason = %reason,
                        "authorization completed"
                    );
                }
                AuthorizerResponse::deny(method_arn)
            }
        }
    }

    async fn evaluate(&self, resource: &str, token: Option<&str>) -> Result<String, DenyReason> {
        let token = token.ok_or(DenyReason::MissingCredential)?;
        let claims = self.verifier.verify(token).await?;

        if self.requires_admin(resource) && !self.is_admin(&claims) {
            return Err(DenyReason::InsufficientPrivilege {
                subject: claims.subject().to_string(),
            });
        }

        Ok(claims.subject().to_string())
    }

    pub fn is_admin(&self, claims: &Claims) -> bool {
        claims.is_member(&self.groups_path, &self.admin_group)
    }

    /// Plain prefix match, so `/models` also covers `/models/{id}` and `/modelsfoo`.
    pub fn requires_admin(&self, resource: &str) -> bool {
        self.admin_path_prefixes
            .iter()
            .any(|prefix| resource.starts_with(prefix.as_str()))
    }
}
