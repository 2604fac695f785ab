//! 链接管理接口（需要登录）

use std::sync::Arc;

use actix_web::{HttpResponse, web};
use tracing::trace;

use crate::api::middleware::AuthenticatedUser;
use crate::errors::Result;
use crate::services::{LinkService, StatsService};

use super::helpers::json_ok;
use super::types::{
    LinkListResponse, MessageResponse, ShortenRequest, ShortenResponse, StatsResponse,
};

/// POST /api/shorten
pub async fn shorten(
    user: AuthenticatedUser,
    body: web::Json<ShortenRequest>,
    links: web::Data<Arc<LinkService>>,
) -> Result<HttpResponse> {
    let link = links.create(user.id(), &body.long_url).await?;
    Ok(json_ok(&ShortenResponse::from(link)))
}

/// GET /api/my-links
pub async fn my_links(
    user: AuthenticatedUser,
    links: web::Data<Arc<LinkService>>,
) -> Result<HttpResponse> {
    let data = links.list_by_owner(user.id()).await?;
    trace!("User {} listed {} links", user.id(), data.len());
    Ok(json_ok(&LinkListResponse::success(data)))
}

/// DELETE /api/links/{id}
pub async fn delete_link(
    user: AuthenticatedUser,
    path: web::Path<i64>,
    links: web::Data<Arc<LinkService>>,
) -> Result<HttpResponse> {
    links.delete_by_owner(user.id(), path.into_inner()).await?;
    Ok(json_ok(&MessageResponse {
        message: "link deleted".to_string(),
    }))
}

/// GET /api/stats
pub async fn stats(
    user: AuthenticatedUser,
    stats: web::Data<Arc<StatsService>>,
) -> Result<HttpResponse> {
    let summary = stats.summarize(user.id()).await?;
    Ok(json_ok(&StatsResponse::from(summary)))
}
