/// Factory: build the request `Authorizer` from application `Config`.
use std::sync::Arc;

use crate::config::Config;
use crate::error::AppError;
use crate::services::auth::Authorizer;

pub fn build_authorizer(config: &Config) -> Result<Arc<Authorizer>, AppError> {
    let authorizer = Authorizer::from_config(&config.authorizer).map_err(|e| {
        tracing::error!(error = %e, "failed to build identity provider client");
        AppError::Internal
    })?;

    Ok(Arc::new(authorizer))
}
