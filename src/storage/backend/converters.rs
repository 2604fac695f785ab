use crate::storage::models::{Link, NewLink, User};
use migration::entities::{link, user};

pub fn model_to_link(model: link::Model) -> Link {
    Link {
        id: model.id,
        user_id: model.user_id,
        long_url: model.long_url,
        short_code: model.short_code,
        short_url: model.short_url,
        qr_url: model.qr_url,
        click_count: model.click_count.max(0),
        created_at: model.created_at,
    }
}

pub fn model_to_user(model: user::Model) -> User {
    User {
        id: model.id,
        email: model.email,
        name: model.name,
        provider_id: model.provider_id,
        created_at: model.created_at,
    }
}

/// id 由数据库分配，点击数从 0 开始
pub fn new_link_to_active_model(link: &NewLink) -> link::ActiveModel {
    use sea_orm::ActiveValue::*;

    link::ActiveModel {
        id: NotSet,
        user_id: Set(link.user_id),
        long_url: Set(link.long_url.clone()),
        short_code: Set(link.short_code.clone()),
        short_url: Set(link.short_url.clone()),
        qr_url: Set(link.qr_url.clone()),
        click_count: Set(0),
        created_at: Set(link.created_at),
    }
}
