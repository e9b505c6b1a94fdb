/*
 * Responsibility
 * - Handler から見える「認可済みコンテキスト」の型
 * - middleware が Authorizer の Allow 判定後に request extensions に格納する
 */

use crate::services::auth::policy::DecisionContext;

/// 認可済みのリクエストに付与されるコンテキスト
///
/// - `username` は検証済み ID トークンの `sub`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthCtx {
    pub username: String,
}

impl AuthCtx {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
        }
    }
}

impl From<DecisionContext> for AuthCtx {
    fn from(ctx: DecisionContext) -> Self {
        Self::new(ctx.username)
    }
}
