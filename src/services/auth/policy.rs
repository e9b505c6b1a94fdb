//! IAM-style policy documents returned by the request authorizer.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

pub const POLICY_VERSION: &str = "2012-10-17";
pub const INVOKE_ACTION: &str = "execute-api:Invoke";
/// Principal used when no verified subject exists.
pub const DEFAULT_PRINCIPAL: &str = "username";

/// Authorizer input as delivered by the API gateway.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorizerEvent {
    pub resource: String,
    pub method_arn: String,
    // gateways send `"headers": null` when the request has none
    #[serde(default, deserialize_with = "null_as_empty")]
    pub headers: HashMap<String, String>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<HashMap<String, String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<HashMap<String, String>>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Effect {
    Allow,
    Deny,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Statement {
    pub action: String,
    pub effect: Effect,
    pub resource: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PolicyDocument {
    pub version: String,
    pub statement: Vec<Statement>,
}

/// Context handed to downstream handlers on `Allow`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecisionContext {
    pub username: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorizerResponse {
    pub principal_id: String,
    pub policy_document: PolicyDocument,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<DecisionContext>,
}

impl AuthorizerResponse {
    pub fn allow(resource: &str, username: &str) -> Self {
        Self {
            principal_id: username.to_string(),
            policy_document: PolicyDocument::single(Effect::Allow, resource),
            context: Some(DecisionContext {
                username: username.to_string(),
            }),
        }
    }

    pub fn deny(resource: &str) -> Self {
        Self {
            principal_id: DEFAULT_PRINCIPAL.to_string(),
            policy_document: PolicyDocument::single(Effect::Deny, resource),
            context: None,
        }
    }

    /// Effect of the (single) statement. Anything malformed reads as `Deny`.
    pub fn effect(&self) -> Effect {
        match self.policy_document.statement.as_slice() {
            [statement] => statement.effect,
            _ => Effect::Deny,
        }
    }

    pub fn is_allowed(&self) -> bool {
        self.effect() == Effect::Allow
    }
}

impl PolicyDocument {
    fn single(effect: Effect, resource: &str) -> Self {
        Self {
            version: POLICY_VERSION.to_string(),
            statement: vec![Statement {
                action: INVOKE_ACTION.to_string(),
                effect,
                resource: resource.to_string(),
            }],
        }
    }
}
