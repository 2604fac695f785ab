use actix_service::{Service, Transform};
use actix_web::{
    Error, FromRequest, HttpMessage, HttpRequest, HttpResponse,
    body::EitherBody,
    dev::{Payload, ServiceRequest, ServiceResponse},
    http::header::{AUTHORIZATION, CONTENT_TYPE},
};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use std::rc::Rc;
use std::sync::Arc;
use tracing::{info, trace};

use crate::api::constants::UNAUTHORIZED_MESSAGE;
use crate::api::jwt::JwtService;
use crate::errors::{ErrorBody, QrShortenError};

/// Caller identity placed in request extensions by [`AuthGuard`].
///
/// Handlers take the caller id only from here, never from body or query.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AuthenticatedUser(pub i64);

impl AuthenticatedUser {
    pub fn id(&self) -> i64 {
        self.0
    }
}

impl FromRequest for AuthenticatedUser {
    type Error = QrShortenError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(
            req.extensions()
                .get::<AuthenticatedUser>()
                .copied()
                .ok_or_else(|| QrShortenError::unauthorized(UNAUTHORIZED_MESSAGE)),
        )
    }
}

/// 从 `Authorization: Bearer <token>` 中取出 token，格式不对返回 None
pub fn extract_bearer_token(header: Option<&str>) -> Option<&str> {
    let token = header?.strip_prefix("Bearer ")?;
    if token.is_empty() || token.contains(char::is_whitespace) {
        return None;
    }
    Some(token)
}

/// Bearer-token guard for the protected scope
#[derive(Clone)]
pub struct AuthGuard {
    jwt: Arc<JwtService>,
}

impl AuthGuard {
    pub fn new(jwt: Arc<JwtService>) -> Self {
        Self { jwt }
    }
}

impl<S, B> Transform<S, ServiceRequest> for AuthGuard
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = AuthGuardMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthGuardMiddleware {
            service: Rc::new(service),
            jwt: self.jwt.clone(),
        }))
    }
}

pub struct AuthGuardMiddleware<S> {
    service: Rc<S>,
    jwt: Arc<JwtService>,
}

impl<S, B> AuthGuardMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    /// `reason` 只写日志，响应体对所有失败保持一致
    fn handle_unauthorized(req: ServiceRequest, reason: &str) -> ServiceResponse<EitherBody<B>> {
        info!("Authentication failed for {}: {}", req.path(), reason);
        req.into_response(
            HttpResponse::Unauthorized()
                .insert_header((CONTENT_TYPE, "application/json; charset=utf-8"))
                .json(ErrorBody {
                    error: UNAUTHORIZED_MESSAGE,
                })
                .map_into_right_body(),
        )
    }
}

impl<S, B> Service<ServiceRequest> for AuthGuardMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(
        &self,
        ctx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.service.poll_ready(ctx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let srv = self.service.clone();
        let jwt = self.jwt.clone();

        Box::pin(async move {
            let header = req
                .headers()
                .get(AUTHORIZATION)
                .and_then(|h| h.to_str().ok());

            let Some(token) = extract_bearer_token(header) else {
                return Ok(Self::handle_unauthorized(
                    req,
                    "missing or malformed Authorization header",
                ));
            };

            let user_id = match jwt.verify_token(token) {
                Ok(id) => id,
                Err(e) => {
                    let reason = format!("token rejected ({})", e);
                    return Ok(Self::handle_unauthorized(req, &reason));
                }
            };

            trace!("Authenticated user {}", user_id);
            req.extensions_mut().insert(AuthenticatedUser(user_id));

            let res = srv.call(req).await?;
            Ok(res.map_into_left_body())
        })
    }
}
