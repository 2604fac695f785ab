//! Query operations for SeaOrmStorage
//!
//! This module contains all read-only database operations.

use sea_orm::sea_query::Alias;
use sea_orm::{
    ColumnTrait, EntityTrait, ExprTrait, FromQueryResult, QueryFilter, QueryOrder, QuerySelect,
};
use tracing::debug;

use super::converters::{model_to_link, model_to_user};
use super::{SeaOrmStorage, retry};
use crate::errors::{QrShortenError, Result};
use crate::storage::models::{Link, LinkTotals, User};

use migration::entities::{link, user};

/// 用于统计查询的结果结构体（DSL 聚合查询）
#[derive(Debug, FromQueryResult)]
struct TotalsResult {
    total_links: i64,
    total_clicks: Option<i64>,
}

impl SeaOrmStorage {
    pub(super) async fn query_user_by_id(&self, id: i64) -> Result<Option<User>> {
        let db = &self.db;
        let model = retry::with_retry(&format!("find_user({})", id), self.retry_config, || async {
            user::Entity::find_by_id(id).one(db).await
        })
        .await
        .map_err(|e| QrShortenError::database_operation(format!("查询用户失败: {}", e)))?;

        Ok(model.map(model_to_user))
    }

    pub(super) async fn query_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let db = &self.db;
        let model = retry::with_retry("find_user_by_email", self.retry_config, || async {
            user::Entity::find()
                .filter(user::Column::Email.eq(email))
                .one(db)
                .await
        })
        .await
        .map_err(|e| QrShortenError::database_operation(format!("查询用户失败: {}", e)))?;

        Ok(model.map(model_to_user))
    }

    pub(super) async fn query_link_by_code(&self, code: &str) -> Result<Option<Link>> {
        let db = &self.db;
        let model = retry::with_retry(&format!("find_link({})", code), self.retry_config, || async {
            link::Entity::find()
                .filter(link::Column::ShortCode.eq(code))
                .one(db)
                .await
        })
        .await
        .map_err(|e| QrShortenError::database_operation(format!("查询短链接失败: {}", e)))?;

        Ok(model.map(model_to_link))
    }

    /// 按 id 升序返回，不分页
    pub(super) async fn query_links_by_owner(&self, owner_id: i64) -> Result<Vec<Link>> {
        let db = &self.db;
        let models = retry::with_retry(
            &format!("list_links({})", owner_id),
            self.retry_config,
            || async {
                link::Entity::find()
                    .filter(link::Column::UserId.eq(owner_id))
                    .order_by_asc(link::Column::Id)
                    .all(db)
                    .await
            },
        )
        .await
        .map_err(|e| QrShortenError::database_operation(format!("查询链接列表失败: {}", e)))?;

        debug!("Loaded {} links for user {}", models.len(), owner_id);
        Ok(models.into_iter().map(model_to_link).collect())
    }

    /// COUNT + SUM 聚合（SeaORM DSL）
    pub(super) async fn query_totals_by_owner(&self, owner_id: i64) -> Result<LinkTotals> {
        // Postgres 的 SUM(bigint) 是 numeric，MySQL 是 DECIMAL，统一转成 i64
        let sum = link::Column::ClickCount.sum();
        let sum = match self.backend_name.as_str() {
            "postgres" => sum.cast_as(Alias::new("BIGINT")),
            "mysql" => sum.cast_as(Alias::new("SIGNED")),
            _ => sum,
        };

        let db = &self.db;
        let result = retry::with_retry(
            &format!("aggregate({})", owner_id),
            self.retry_config,
            || {
                let sum = sum.clone();
                async move {
                    link::Entity::find()
                        .select_only()
                        .column_as(link::Column::Id.count(), "total_links")
                        .column_as(sum, "total_clicks")
                        .filter(link::Column::UserId.eq(owner_id))
                        .into_model::<TotalsResult>()
                        .one(db)
                        .await
                }
            },
        )
        .await
        .map_err(|e| QrShortenError::database_operation(format!("统计查询失败: {}", e)))?;

        Ok(result
            .map(|r| LinkTotals {
                total_links: r.total_links,
                total_clicks: r.total_clicks.unwrap_or(0),
            })
            .unwrap_or_default())
    }
}
