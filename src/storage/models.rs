use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub name: String,
    pub provider_id: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub id: i64,
    pub user_id: i64,
    pub long_url: String,
    pub short_code: String,
    pub short_url: String,
    pub qr_url: Option<String>,
    #[serde(default)]
    pub click_count: i64,
    pub created_at: DateTime<Utc>,
}

/// Link row before the store assigns its id; `click_count` starts at 0
#[derive(Debug, Clone)]
pub struct NewLink {
    pub user_id: i64,
    pub long_url: String,
    pub short_code: String,
    pub short_url: String,
    pub qr_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl NewLink {
    pub fn into_link(self, id: i64) -> Link {
        Link {
            id,
            user_id: self.user_id,
            long_url: self.long_url,
            short_code: self.short_code,
            short_url: self.short_url,
            qr_url: self.qr_url,
            click_count: 0,
            created_at: self.created_at,
        }
    }
}

/// 外部身份提供方返回的用户资料
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalProfile {
    pub provider_id: String,
    pub email: String,
    pub name: String,
}

/// 单个用户的链接聚合
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LinkTotals {
    pub total_links: i64,
    pub total_clicks: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkSummary {
    pub total_links: i64,
    pub total_clicks: i64,
    pub links: Vec<Link>,
}
