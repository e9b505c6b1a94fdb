/*
 * Responsibility
 * - Router に紐づける共有コンテキスト (AppState)
 *   - authorizer / passthrough client / model directory
 * - Clone 前提で持つ (内部は Arc/Clone cheap)
 */
use std::sync::Arc;

use crate::services::auth::Authorizer;
use crate::services::models::ModelDirectory;
use crate::services::passthrough::PassthroughClient;

#[derive(Clone)]
pub struct AppState {
    pub authorizer: Arc<Authorizer>,
    pub passthrough: PassthroughClient,
    pub models: Arc<dyn ModelDirectory>,
}

impl AppState {
    pub fn new(
        authorizer: Arc<Authorizer>,
        passthrough: PassthroughClient,
        models: Arc<dyn ModelDirectory>,
    ) -> Self {
        Self {
            authorizer,
            passthrough,
            models,
        }
    }
}
