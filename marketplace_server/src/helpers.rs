use actix_web::HttpRequest;
use log::*;

use crate::{config::ServerConfig, errors::ServerError};

/// Checks the shared admin api key on an admin-only request. With no key configured, every admin request is
/// refused.
pub fn require_admin(req: &HttpRequest, config: &ServerConfig) -> Result<(), ServerError> {
    let Some(expected) = config.admin_api_key.as_deref() else {
        warn!("💻️ Rejecting admin request: no admin api key is configured");
        return Err(ServerError::Unauthorized);
    };
    let provided = req.headers().get("x-api-key").and_then(|v| v.to_str().ok());
    if provided == Some(expected) {
        Ok(())
    } else {
        debug!("💻️ Rejecting admin request: missing or invalid api key");
        Err(ServerError::Unauthorized)
    }
}
