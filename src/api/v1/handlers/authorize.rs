/*
 * Responsibility
 * - POST /authorize (API gateway の token authorizer 契約)
 * - event を受けて policy document を返す。判定結果に関わらず 200
 */
use axum::{Json, extract::State};

use crate::services::auth::{AuthorizerEvent, AuthorizerResponse};
use crate::state::AppState;

pub async fn authorize(
    State(state): State<AppState>,
    Json(event): Json<AuthorizerEvent>,
) -> Json<AuthorizerResponse> {
    Json(state.authorizer.authorize(&event).await)
}
