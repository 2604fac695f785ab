pub mod auth;
pub mod request_id;

pub use auth::{AuthGuard, AuthenticatedUser};
pub use request_id::{RequestId, RequestIdMiddleware};
