//! ID トークン検証 (Authorizer) → AuthCtx を extensions に入れる
//!
//! - `/models`, `/serve` など保護対象のルートに route_layer で掛ける
//! - Authorizer の判定が Deny なら 403。理由はログにのみ残す
//! - Allow なら DecisionContext (username) を AuthCtx として handler に渡す

use axum::{
    Router,
    body::Body,
    extract::{OriginalUri, State},
    http::Request,
    middleware::{self, Next},
    response::Response,
};

use crate::api::v1::extractors::AuthCtx;
use crate::error::AppError;
use crate::services::auth::token::id_token_from_headers;
use crate::state::AppState;

/// 保護対象の Router に Authorizer を適用する。
///
/// 例：
/// ```ignore
/// let protected = middleware::auth::access::apply(protected, state.clone());
/// ```
pub fn apply(router: Router<AppState>, state: AppState) -> Router<AppState> {
    // route_layer: マッチしたルートにのみ適用 (404 は認可前に返る)
    router.route_layer(middleware::from_fn_with_state(state, access_middleware))
}

async fn access_middleware(
    State(state): State<AppState>,
    OriginalUri(original_uri): OriginalUri,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let token = id_token_from_headers(req.headers());

    // resource: nest 後のパス (admin prefix 判定用)
    // method_arn: 元のメソッド + パス (policy の Resource)
    let resource = req.uri().path().to_string();
    let method_arn = format!("{} {}", req.method(), original_uri.path());

    let decision = state
        .authorizer
        .authorize_token(&resource, &method_arn, token.as_deref())
        .await;

    let allowed = decision.is_allowed();
    let Some(ctx) = decision.context.filter(|_| allowed) else {
        return Err(AppError::Forbidden);
    };

    // middleware → extractor への受け渡し
    req.extensions_mut().insert(AuthCtx::from(ctx));

    Ok(next.run(req).await)
}
