//! Request / response bodies

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::storage::{Link, LinkSummary, User};

#[derive(Debug, Deserialize)]
pub struct ShortenRequest {
    #[serde(default)]
    pub long_url: String,
}

/// `short_url` carries the bare code, `full_short_url` the absolute URL
#[derive(Debug, Serialize, Deserialize)]
pub struct ShortenResponse {
    pub short_url: String,
    pub full_short_url: String,
    pub qr_url: Option<String>,
}

impl From<Link> for ShortenResponse {
    fn from(link: Link) -> Self {
        Self {
            short_url: link.short_code,
            full_short_url: link.short_url,
            qr_url: link.qr_url,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LinkListResponse {
    pub status: String,
    pub data: Vec<Link>,
}

impl LinkListResponse {
    pub fn success(data: Vec<Link>) -> Self {
        Self {
            status: "success".to_string(),
            data,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StatsResponse {
    pub total_links: i64,
    pub total_clicks: i64,
    pub data: Vec<Link>,
}

impl From<LinkSummary> for StatsResponse {
    fn from(summary: LinkSummary) -> Self {
        Self {
            total_links: summary.total_links,
            total_clicks: summary.total_clicks,
            data: summary.links,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ProfileResponse {
    pub id: i64,
    pub name: String,
    pub email: String,
}

impl From<User> for ProfileResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub state: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub storage: String,
    pub started_at: DateTime<Utc>,
    pub uptime_secs: i64,
}
