/*
 * Responsibility
 * - v1 の URL 構造を定義
 * - /health, /authorize は公開、/models と /serve は Authorizer を route_layer で適用
 */
use axum::{
    Router,
    routing::{any, get, post},
};

use crate::api::v1::handlers::{
    authorize::authorize,
    health::health,
    models::{create_model, delete_model, get_model, list_models, update_model},
    passthrough::passthrough,
};
use crate::middleware;
use crate::state::AppState;

pub fn routes(state: AppState) -> Router<AppState> {
    let public = Router::new()
        .route("/health", get(health))
        .route("/authorize", post(authorize));

    let protected = Router::new()
        .route("/models", get(list_models).post(create_model))
        .route(
            "/models/{model_id}",
            get(get_model).put(update_model).delete(delete_model),
        )
        .route("/serve/{*path}", any(passthrough));
    let protected = middleware::auth::access::apply(protected, state);

    public.merge(protected)
}
