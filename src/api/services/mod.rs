pub mod auth;
pub mod health;
pub mod helpers;
pub mod links;
pub mod redirect;
pub mod types;

use std::sync::Arc;

use actix_web::web;

use crate::api::constants::API_PREFIX;
use crate::api::jwt::JwtService;
use crate::api::middleware::AuthGuard;
use crate::services::{AuthService, LinkService, StatsService};

pub use auth::SecureCookies;
pub use health::{AppStartTime, HealthService};
pub use redirect::RedirectService;

/// Everything a worker's `App` needs, shared across workers.
#[derive(Clone)]
pub struct AppServices {
    pub links: Arc<LinkService>,
    pub stats: Arc<StatsService>,
    pub auth: Arc<AuthService>,
    pub jwt: Arc<JwtService>,
    pub start_time: AppStartTime,
    pub secure_cookies: bool,
}

impl AppServices {
    /// Registers shared state and every route.
    ///
    /// `/{code}` goes last so it never shadows `/api/...`.
    pub fn configure(&self, cfg: &mut web::ServiceConfig) {
        let guard = AuthGuard::new(self.jwt.clone());

        cfg.app_data(web::Data::new(self.links.clone()))
            .app_data(web::Data::new(self.stats.clone()))
            .app_data(web::Data::new(self.auth.clone()))
            .app_data(web::Data::new(self.start_time.clone()))
            .app_data(web::Data::new(SecureCookies(self.secure_cookies)))
            .app_data(web::JsonConfig::default().error_handler(helpers::json_error_handler))
            .app_data(web::PathConfig::default().error_handler(helpers::path_error_handler))
            .app_data(web::QueryConfig::default().error_handler(helpers::query_error_handler))
            .service(
                web::scope(API_PREFIX)
                    .route("/health", web::get().to(HealthService::health_check))
                    .route("/auth/{provider}", web::get().to(auth::begin))
                    .route("/auth/{provider}/callback", web::get().to(auth::callback))
                    .service(
                        web::resource("/profile")
                            .wrap(guard.clone())
                            .route(web::get().to(auth::profile)),
                    )
                    .service(
                        web::resource("/shorten")
                            .wrap(guard.clone())
                            .route(web::post().to(links::shorten)),
                    )
                    .service(
                        web::resource("/my-links")
                            .wrap(guard.clone())
                            .route(web::get().to(links::my_links)),
                    )
                    .service(
                        web::resource("/links/{id}")
                            .wrap(guard.clone())
                            .route(web::delete().to(links::delete_link)),
                    )
                    .service(
                        web::resource("/stats")
                            .wrap(guard)
                            .route(web::get().to(links::stats)),
                    ),
            )
            .route("/{code}", web::get().to(RedirectService::handle_redirect))
            .route("/{code}", web::head().to(RedirectService::handle_redirect));
    }
}
