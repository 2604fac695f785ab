//! Mutation operations for SeaOrmStorage
//!
//! Every write here is a single statement.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, ExprTrait, QueryFilter};
use tracing::{debug, info};

use super::converters::{model_to_link, model_to_user, new_link_to_active_model};
use super::{SeaOrmStorage, is_unique_violation, retry};
use crate::errors::{QrShortenError, Result};
use crate::storage::models::{ExternalProfile, Link, LinkTotals, NewLink, User};
use crate::storage::traits::{LinkRepository, UserRepository};

use migration::entities::{link, user};

#[async_trait]
impl UserRepository for SeaOrmStorage {
    async fn find_user_by_id(&self, id: i64) -> Result<Option<User>> {
        self.query_user_by_id(id).await
    }

    async fn find_or_create_user(&self, profile: &ExternalProfile) -> Result<User> {
        if let Some(existing) = self.query_user_by_email(&profile.email).await? {
            return Ok(existing);
        }

        let active = user::ActiveModel {
            id: sea_orm::ActiveValue::NotSet,
            email: sea_orm::ActiveValue::Set(profile.email.clone()),
            name: sea_orm::ActiveValue::Set(profile.name.clone()),
            provider_id: sea_orm::ActiveValue::Set(profile.provider_id.clone()),
            created_at: sea_orm::ActiveValue::Set(Utc::now()),
        };

        let db = &self.db;
        let inserted = retry::with_retry("create_user", self.retry_config, || {
            let active = active.clone();
            async move { active.insert(db).await }
        })
        .await;

        match inserted {
            Ok(model) => {
                info!("User created: {} ({})", model.id, model.email);
                Ok(model_to_user(model))
            }
            // 并发首次登录：另一请求已插入，重新读取
            Err(e) if is_unique_violation(&e) => self
                .query_user_by_email(&profile.email)
                .await?
                .ok_or_else(|| {
                    QrShortenError::database_operation(format!(
                        "创建用户冲突但按 email 未找到: {}",
                        e
                    ))
                }),
            Err(e) => Err(QrShortenError::database_operation(format!(
                "创建用户失败: {}",
                e
            ))),
        }
    }
}

#[async_trait]
impl LinkRepository for SeaOrmStorage {
    async fn find_by_code(&self, code: &str) -> Result<Option<Link>> {
        self.query_link_by_code(code).await
    }

    async fn insert_link(&self, new_link: NewLink) -> Result<Link> {
        let active = new_link_to_active_model(&new_link);
        let db = &self.db;

        let result = retry::with_retry(
            &format!("insert_link({})", new_link.short_code),
            self.retry_config,
            || {
                let active = active.clone();
                async move { active.insert(db).await }
            },
        )
        .await;

        match result {
            Ok(model) => {
                debug!("Link inserted: {} -> {}", model.short_code, model.long_url);
                Ok(model_to_link(model))
            }
            Err(e) if is_unique_violation(&e) => Err(QrShortenError::duplicate_code(format!(
                "short code already exists: {}",
                new_link.short_code
            ))),
            Err(e) => Err(QrShortenError::database_operation(format!(
                "插入短链接失败: {}",
                e
            ))),
        }
    }

    async fn increment_clicks(&self, link_id: i64, delta: i64) -> Result<bool> {
        let db = &self.db;
        // UPDATE links SET click_count = click_count + ? WHERE id = ?
        let result = retry::with_retry(
            &format!("increment_clicks({})", link_id),
            self.retry_config,
            || async {
                link::Entity::update_many()
                    .col_expr(
                        link::Column::ClickCount,
                        Expr::col(link::Column::ClickCount).add(delta),
                    )
                    .filter(link::Column::Id.eq(link_id))
                    .exec(db)
                    .await
            },
        )
        .await
        .map_err(|e| QrShortenError::database_operation(format!("更新点击数失败: {}", e)))?;

        Ok(result.rows_affected > 0)
    }

    async fn list_by_owner(&self, owner_id: i64) -> Result<Vec<Link>> {
        self.query_links_by_owner(owner_id).await
    }

    async fn delete_owned_link(&self, owner_id: i64, link_id: i64) -> Result<bool> {
        let db = &self.db;
        let result = retry::with_retry(
            &format!("delete_link({})", link_id),
            self.retry_config,
            || async {
                link::Entity::delete_many()
                    .filter(link::Column::Id.eq(link_id))
                    .filter(link::Column::UserId.eq(owner_id))
                    .exec(db)
                    .await
            },
        )
        .await
        .map_err(|e| QrShortenError::database_operation(format!("删除短链接失败: {}", e)))?;

        if result.rows_affected > 0 {
            info!("Link {} deleted by user {}", link_id, owner_id);
        }
        Ok(result.rows_affected > 0)
    }

    async fn aggregate_by_owner(&self, owner_id: i64) -> Result<LinkTotals> {
        self.query_totals_by_owner(owner_id).await
    }
}
