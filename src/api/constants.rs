//! API 模块常量定义

/// OAuth state Cookie 名称
pub const STATE_COOKIE_NAME: &str = "qs_oauth_state";

/// state Cookie 有效期（秒）
pub const STATE_COOKIE_MAX_AGE_SECS: i64 = 600;

/// state Cookie 作用路径
pub const STATE_COOKIE_PATH: &str = "/api/auth";

/// 公开 API 前缀
pub const API_PREFIX: &str = "/api";

/// 所有 401 响应共用的错误信息，不区分缺失与无效 token
pub const UNAUTHORIZED_MESSAGE: &str = "unauthorized";
