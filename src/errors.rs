use std::fmt;

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde::Serialize;
use tracing::error;

/// Error categories exposed across the HTTP boundary.
///
/// Every internal failure collapses into one of these before a response is
/// written; the variant-level detail of [`QrShortenError`] never reaches
/// the client for the upstream/exhausted kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    ValidationError,
    Unauthorized,
    NotFound,
    UpstreamFailure,
    ResourceExhausted,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QrShortenError {
    Validation(String),
    Unauthorized(String),
    NotFound(String),
    Upstream(String),
    DatabaseConfig(String),
    DatabaseConnection(String),
    DatabaseOperation(String),
    /// Insert hit the unique index on `short_code`; the caller retries
    DuplicateCode(String),
    ResourceExhausted(String),
    Config(String),
    FileOperation(String),
    Serialization(String),
}

impl QrShortenError {
    /// 获取错误代码
    pub fn code(&self) -> &'static str {
        match self {
            QrShortenError::Validation(_) => "E001",
            QrShortenError::Unauthorized(_) => "E002",
            QrShortenError::NotFound(_) => "E003",
            QrShortenError::Upstream(_) => "E004",
            QrShortenError::DatabaseConfig(_) => "E005",
            QrShortenError::DatabaseConnection(_) => "E006",
            QrShortenError::DatabaseOperation(_) => "E007",
            QrShortenError::DuplicateCode(_) => "E008",
            QrShortenError::ResourceExhausted(_) => "E009",
            QrShortenError::Config(_) => "E010",
            QrShortenError::FileOperation(_) => "E011",
            QrShortenError::Serialization(_) => "E012",
        }
    }

    /// 获取错误类型名称
    pub fn error_type(&self) -> &'static str {
        match self {
            QrShortenError::Validation(_) => "Validation Error",
            QrShortenError::Unauthorized(_) => "Unauthorized",
            QrShortenError::NotFound(_) => "Resource Not Found",
            QrShortenError::Upstream(_) => "Upstream Failure",
            QrShortenError::DatabaseConfig(_) => "Database Configuration Error",
            QrShortenError::DatabaseConnection(_) => "Database Connection Error",
            QrShortenError::DatabaseOperation(_) => "Database Operation Error",
            QrShortenError::DuplicateCode(_) => "Duplicate Short Code",
            QrShortenError::ResourceExhausted(_) => "Resource Exhausted",
            QrShortenError::Config(_) => "Configuration Error",
            QrShortenError::FileOperation(_) => "File Operation Error",
            QrShortenError::Serialization(_) => "Serialization Error",
        }
    }

    /// 获取错误详情
    pub fn message(&self) -> &str {
        match self {
            QrShortenError::Validation(msg)
            | QrShortenError::Unauthorized(msg)
            | QrShortenError::NotFound(msg)
            | QrShortenError::Upstream(msg)
            | QrShortenError::DatabaseConfig(msg)
            | QrShortenError::DatabaseConnection(msg)
            | QrShortenError::DatabaseOperation(msg)
            | QrShortenError::DuplicateCode(msg)
            | QrShortenError::ResourceExhausted(msg)
            | QrShortenError::Config(msg)
            | QrShortenError::FileOperation(msg)
            | QrShortenError::Serialization(msg) => msg,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            QrShortenError::Validation(_) => ErrorKind::ValidationError,
            QrShortenError::Unauthorized(_) => ErrorKind::Unauthorized,
            QrShortenError::NotFound(_) => ErrorKind::NotFound,
            QrShortenError::DuplicateCode(_) | QrShortenError::ResourceExhausted(_) => {
                ErrorKind::ResourceExhausted
            }
            QrShortenError::Upstream(_)
            | QrShortenError::DatabaseConfig(_)
            | QrShortenError::DatabaseConnection(_)
            | QrShortenError::DatabaseOperation(_)
            | QrShortenError::Config(_)
            | QrShortenError::FileOperation(_)
            | QrShortenError::Serialization(_) => ErrorKind::UpstreamFailure,
        }
    }

    pub fn http_status(&self) -> StatusCode {
        match self.kind() {
            ErrorKind::ValidationError => StatusCode::BAD_REQUEST,
            ErrorKind::Unauthorized => StatusCode::UNAUTHORIZED,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::UpstreamFailure | ErrorKind::ResourceExhausted => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Message safe to hand to an API client.
    pub fn public_message(&self) -> &str {
        match self {
            QrShortenError::Validation(msg)
            | QrShortenError::Unauthorized(msg)
            | QrShortenError::NotFound(msg) => msg,
            QrShortenError::Upstream(_) => "upstream service failure",
            QrShortenError::ResourceExhausted(_) => "could not allocate a short code",
            _ => "internal server error",
        }
    }

    /// 格式化为简洁输出
    pub fn format_simple(&self) -> String {
        format!("{}: {}", self.error_type(), self.message())
    }
}

impl fmt::Display for QrShortenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for QrShortenError {}

// 便捷的构造函数
impl QrShortenError {
    pub fn validation<T: Into<String>>(msg: T) -> Self {
        QrShortenError::Validation(msg.into())
    }

    pub fn unauthorized<T: Into<String>>(msg: T) -> Self {
        QrShortenError::Unauthorized(msg.into())
    }

    pub fn not_found<T: Into<String>>(msg: T) -> Self {
        QrShortenError::NotFound(msg.into())
    }

    pub fn upstream<T: Into<String>>(msg: T) -> Self {
        QrShortenError::Upstream(msg.into())
    }

    pub fn database_config<T: Into<String>>(msg: T) -> Self {
        QrShortenError::DatabaseConfig(msg.into())
    }

    pub fn database_connection<T: Into<String>>(msg: T) -> Self {
        QrShortenError::DatabaseConnection(msg.into())
    }

    pub fn database_operation<T: Into<String>>(msg: T) -> Self {
        QrShortenError::DatabaseOperation(msg.into())
    }

    pub fn duplicate_code<T: Into<String>>(msg: T) -> Self {
        QrShortenError::DuplicateCode(msg.into())
    }

    pub fn resource_exhausted<T: Into<String>>(msg: T) -> Self {
        QrShortenError::ResourceExhausted(msg.into())
    }

    pub fn config<T: Into<String>>(msg: T) -> Self {
        QrShortenError::Config(msg.into())
    }

    pub fn file_operation<T: Into<String>>(msg: T) -> Self {
        QrShortenError::FileOperation(msg.into())
    }

    pub fn serialization<T: Into<String>>(msg: T) -> Self {
        QrShortenError::Serialization(msg.into())
    }
}

// 为常见的错误类型实现 From trait
impl From<sea_orm::DbErr> for QrShortenError {
    fn from(err: sea_orm::DbErr) -> Self {
        QrShortenError::DatabaseOperation(err.to_string())
    }
}

impl From<std::io::Error> for QrShortenError {
    fn from(err: std::io::Error) -> Self {
        QrShortenError::FileOperation(err.to_string())
    }
}

impl From<serde_json::Error> for QrShortenError {
    fn from(err: serde_json::Error) -> Self {
        QrShortenError::Serialization(err.to_string())
    }
}

/// JSON body of every error response
#[derive(Debug, Serialize)]
pub struct ErrorBody<'a> {
    pub error: &'a str,
}

impl ResponseError for QrShortenError {
    fn status_code(&self) -> StatusCode {
        self.http_status()
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            error!("{} [{}]", self, self.code());
        }
        HttpResponse::build(status)
            .insert_header(("Content-Type", "application/json; charset=utf-8"))
            .json(ErrorBody {
                error: self.public_message(),
            })
    }
}

pub type Result<T> = std::result::Result<T, QrShortenError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_mapping() {
        assert_eq!(
            QrShortenError::validation("x").kind(),
            ErrorKind::ValidationError
        );
        assert_eq!(
            QrShortenError::database_operation("x").kind(),
            ErrorKind::UpstreamFailure
        );
        assert_eq!(
            QrShortenError::duplicate_code("x").kind(),
            ErrorKind::ResourceExhausted
        );
    }

    #[test]
    fn test_http_status_mapping() {
        assert_eq!(
            QrShortenError::unauthorized("bad token").http_status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            QrShortenError::not_found("gone").http_status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            QrShortenError::resource_exhausted("full").http_status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_public_message_hides_internal_detail() {
        let err = QrShortenError::database_operation("UNIQUE constraint failed: links.short_code");
        assert_eq!(err.public_message(), "internal server error");

        let err = QrShortenError::upstream("image host returned 503: token=abc");
        assert_eq!(err.public_message(), "upstream service failure");

        let err = QrShortenError::validation("long_url must not be empty");
        assert_eq!(err.public_message(), "long_url must not be empty");
    }

    #[test]
    fn test_display_uses_simple_format() {
        let err = QrShortenError::not_found("link 7");
        assert_eq!(err.to_string(), "Resource Not Found: link 7");
    }
}
