//! Business logic behind the HTTP handlers

pub mod auth_service;
pub mod code_generator;
pub mod identity;
pub mod link_service;
pub mod qr;
pub mod stats_service;

pub use auth_service::{AuthService, SignInStart};
pub use code_generator::{CodeGenerator, RandomCodeGenerator};
pub use identity::{IdentityProvider, OAuthProvider};
pub use link_service::LinkService;
pub use qr::{DisabledQrPublisher, ImageHostPublisher, QrPublisher};
pub use stats_service::StatsService;
