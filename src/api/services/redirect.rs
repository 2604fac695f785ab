use std::sync::Arc;

use actix_web::{HttpResponse, web};
use tracing::debug;

use crate::errors::{QrShortenError, Result};
use crate::services::LinkService;
use crate::services::code_generator::is_valid_short_code;

use super::helpers::found;

pub struct RedirectService;

impl RedirectService {
    /// GET /{code}: 302 to the destination, counting the visit
    pub async fn handle_redirect(
        path: web::Path<String>,
        links: web::Data<Arc<LinkService>>,
    ) -> Result<HttpResponse> {
        let code = path.into_inner();

        // 非法短码直接 404，不查库
        if !is_valid_short_code(&code) {
            debug!("Invalid short code rejected: {}", code);
            return Err(QrShortenError::not_found("link not found"));
        }

        let long_url = links.resolve(&code).await?;
        debug!("Redirecting '{}' -> '{}'", code, long_url);
        Ok(found(&long_url))
    }
}
